//! Application-wide error types.

use thiserror::Error;

/// Application error types.
///
/// Library crates keep their own precise error enums; this is the shape the
/// surrounding application presents to users.
#[derive(Debug, Error)]
pub enum AppError {
    /// Input rejected before any work was done.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration could not be loaded or is inconsistent.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An artifact could not be produced from valid input.
    #[error("Render error: {0}")]
    Render(String),

    /// Reading input or writing an artifact failed.
    #[error("I/O error: {0}")]
    Io(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the process exit code for this error.
    ///
    /// Values follow the BSD `sysexits.h` convention.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 65,
            Self::Configuration(_) => 78,
            Self::Io(_) => 74,
            Self::Render(_) | Self::Internal(_) => 70,
        }
    }

    /// Returns the error code for structured output.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Render(_) => "RENDER_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true if the caller can fix this by changing its input.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Configuration(_))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_exit_codes() {
        assert_eq!(AppError::Validation(String::new()).exit_code(), 65);
        assert_eq!(AppError::Configuration(String::new()).exit_code(), 78);
        assert_eq!(AppError::Io(String::new()).exit_code(), 74);
        assert_eq!(AppError::Render(String::new()).exit_code(), 70);
        assert_eq!(AppError::Internal(String::new()).exit_code(), 70);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AppError::Validation(String::new()).error_code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(
            AppError::Configuration(String::new()).error_code(),
            "CONFIGURATION_ERROR"
        );
        assert_eq!(AppError::Render(String::new()).error_code(), "RENDER_ERROR");
        assert_eq!(AppError::Io(String::new()).error_code(), "IO_ERROR");
        assert_eq!(
            AppError::Internal(String::new()).error_code(),
            "INTERNAL_ERROR"
        );
    }

    #[test]
    fn test_user_errors() {
        assert!(AppError::Validation("bad layout".into()).is_user_error());
        assert!(AppError::Configuration("missing".into()).is_user_error());
        assert!(!AppError::Render("pdf".into()).is_user_error());
        assert!(!AppError::Io("disk".into()).is_user_error());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::Validation("msg".into()).to_string(),
            "Validation error: msg"
        );
        assert_eq!(
            AppError::Configuration("msg".into()).to_string(),
            "Configuration error: msg"
        );
        assert_eq!(AppError::Render("msg".into()).to_string(), "Render error: msg");
        assert_eq!(AppError::Io("msg".into()).to_string(), "I/O error: msg");
        assert_eq!(
            AppError::Internal("msg".into()).to_string(),
            "Internal error: msg"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let err: AppError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, AppError::Io(ref msg) if msg == "gone"));
    }
}
