/// Problems detected on the client before any remote call is made.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The message is shown to the user verbatim.
    #[error("{0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_displays_message_only() {
        let err = CoreError::Validation("Please select a category".into());
        assert_eq!(err.to_string(), "Please select a category");
    }
}
