//! Unified error handling for gadgeter
//!
//! Every engine call resolves to a definite outcome: either an
//! [`InjectionOutcome`](crate::inject::InjectionOutcome) or one of the
//! variants below. Nothing is retried internally; callers decide whether
//! to try another fallback level, abort, or report.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Main error type for injection operations
#[derive(Debug, Error)]
pub enum InjectError {
    /// The method hooked by the requested fallback level is absent
    #[error("Level {level} target `{method}` not found in class")]
    TargetNotFound { level: u8, method: &'static str },

    /// A located method carries neither `.registers` nor `.locals`,
    /// or carries one whose count cannot be read
    #[error("Method `{method}` at line {line} has no usable register declaration")]
    MalformedRegisterDeclaration { method: String, line: usize },

    /// The class text unit does not exist on disk
    #[error("Class unit '{}' does not exist", .0.display())]
    MissingBackingUnit(PathBuf),

    /// Fallback level outside 1..=3
    #[error("Invalid fallback level {0} (expected 1, 2 or 3)")]
    InvalidFallbackLevel(u8),

    /// Class name could not be mapped to a unit under the disassembly root
    #[error("Class '{class}' not found under '{}'", .root.display())]
    ClassNotFound { class: String, root: PathBuf },

    /// Every fallback level the caller asked for reported `TargetNotFound`
    #[error("No injection site found after trying levels {tried:?}")]
    FallbacksExhausted { tried: Vec<u8> },

    /// File I/O error
    #[error("File I/O error for '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Generic error for cases not covered above
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for injection operations
pub type Result<T> = std::result::Result<T, InjectError>;

impl InjectError {
    /// Whether a caller may retry the same unit with another fallback level
    pub fn is_recoverable(&self) -> bool {
        matches!(self, InjectError::TargetNotFound { .. })
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            InjectError::FallbacksExhausted { .. } => {
                "None of attachBaseContext, <clinit> or onCreate could be patched in this class. \
                 Pick the Application or launcher Activity class."
                    .to_string()
            }
            InjectError::MalformedRegisterDeclaration { method, .. } => {
                format!("Method `{method}` has no body to patch (abstract or native?)")
            }
            InjectError::MissingBackingUnit(path) => {
                format!("'{}' does not exist. Disassemble the dex first.", path.display())
            }
            _ => self.to_string(),
        }
    }
}

/// Convert IO errors with path context
impl InjectError {
    pub fn from_io_error(path: impl Into<String>, error: io::Error) -> Self {
        InjectError::IoError {
            path: path.into(),
            source: error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = InjectError::TargetNotFound {
            level: 1,
            method: "attachBaseContext",
        };
        assert_eq!(
            err.to_string(),
            "Level 1 target `attachBaseContext` not found in class"
        );

        let err = InjectError::InvalidFallbackLevel(7);
        assert_eq!(err.to_string(), "Invalid fallback level 7 (expected 1, 2 or 3)");
    }

    #[test]
    fn test_is_recoverable() {
        let err = InjectError::TargetNotFound {
            level: 3,
            method: "onCreate",
        };
        assert!(err.is_recoverable());

        let err = InjectError::MalformedRegisterDeclaration {
            method: "onCreate".to_string(),
            line: 4,
        };
        assert!(!err.is_recoverable());

        let err = InjectError::MissingBackingUnit(PathBuf::from("/nope.smali"));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_user_message() {
        let err = InjectError::MissingBackingUnit(PathBuf::from("/tmp/A.smali"));
        assert!(err.user_message().contains("Disassemble"));

        let err = InjectError::FallbacksExhausted { tried: vec![1, 3] };
        assert!(err.user_message().contains("attachBaseContext"));
    }

    #[test]
    fn test_from_io_error() {
        let err = InjectError::from_io_error(
            "/tmp/x.smali",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("/tmp/x.smali"));
    }
}
