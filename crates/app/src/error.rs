use showcase_backend::BackendError;
use showcase_core::error::CoreError;

use crate::config::ConfigError;
use crate::viewer::LoadError;

/// Step of the upload pipeline that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    ModelFile,
    PreviewImage,
    PrintRecord,
}

impl std::fmt::Display for UploadStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::ModelFile => "Failed to upload model",
            Self::PreviewImage => "Failed to upload image",
            Self::PrintRecord => "Failed to create print",
        })
    }
}

/// Application-level error type for controllers.
///
/// Wraps [`CoreError`] for client-detected problems and [`BackendError`] for
/// remote failures. The `Display` output is the text shown to the user.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `showcase_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A failed persistence call.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// A step of the upload pipeline failed.
    #[error("{stage}: {source}")]
    Upload {
        stage: UploadStage,
        #[source]
        source: BackendError,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Load(#[from] LoadError),

    /// A background task ended without reporting back.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience type alias for controller return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// `true` for errors raised before any remote call was issued.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Core(CoreError::Validation(_)))
    }
}
