//! Navigation targets returned by controllers.
//!
//! Controllers never route on their own; they hand one of these back and
//! the caller performs the navigation.

/// Where the caller should send the user next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Sign-in view, returning to `redirect` afterwards.
    Login { redirect: String },
    /// Detail view of a single print.
    PrintDetail { print_id: String },
}

impl Navigation {
    /// Login redirect that brings the user back to the given print.
    pub fn login_for_print(print_id: &str) -> Self {
        Self::Login {
            redirect: print_path(print_id),
        }
    }

    /// Path (with query) to navigate to.
    pub fn path(&self) -> String {
        match self {
            Self::Login { redirect } => format!("/login?redirect={redirect}"),
            Self::PrintDetail { print_id } => print_path(print_id),
        }
    }
}

/// Path of a print's detail view.
pub fn print_path(print_id: &str) -> String {
    format!("/prints/{print_id}")
}
