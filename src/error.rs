//! Error types for signscribe.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SignError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Failed to parse configuration: {message}")]
    ConfigParse { message: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Per-frame errors
    #[error("Malformed frame: expected {expected}, got {actual}")]
    MalformedFrame { expected: String, actual: String },

    #[error("Classifier {classifier} unavailable: {message}")]
    ClassifierUnavailable { classifier: String, message: String },

    // Startup errors
    #[error("Invalid label set configuration: {message}")]
    LabelSetConfig { message: String },

    // Collaborator errors
    #[error("Frame source error: {message}")]
    FrameSource { message: String },

    #[error("Replay line {line}: {message}")]
    Replay { line: usize, message: String },

    #[error("Display sink error: {message}")]
    Sink { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

impl SignError {
    /// Whether the driver may skip the offending frame and keep going.
    ///
    /// Malformed frames, classifier failures and transient source errors only
    /// cost one frame. Configuration and sink failures stop the loop.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SignError::MalformedFrame { .. }
                | SignError::ClassifierUnavailable { .. }
                | SignError::FrameSource { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SignError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_config_invalid_value_display() {
        let error = SignError::ConfigInvalidValue {
            key: "timing.tick_ms".to_string(),
            message: "must be positive".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid configuration value for timing.tick_ms: must be positive"
        );
    }

    #[test]
    fn test_malformed_frame_display() {
        let error = SignError::MalformedFrame {
            expected: "128x128".to_string(),
            actual: "64x64".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Malformed frame: expected 128x128, got 64x64"
        );
    }

    #[test]
    fn test_classifier_unavailable_display() {
        let error = SignError::ClassifierUnavailable {
            classifier: "dru".to_string(),
            message: "empty score vector".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Classifier dru unavailable: empty score vector"
        );
    }

    #[test]
    fn test_label_set_config_display() {
        let error = SignError::LabelSetConfig {
            message: "group MNS is empty".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid label set configuration: group MNS is empty"
        );
    }

    #[test]
    fn test_replay_display() {
        let error = SignError::Replay {
            line: 7,
            message: "missing field `dru`".to_string(),
        };
        assert_eq!(error.to_string(), "Replay line 7: missing field `dru`");
    }

    #[test]
    fn test_recoverable_classification() {
        assert!(
            SignError::MalformedFrame {
                expected: "a".into(),
                actual: "b".into()
            }
            .is_recoverable()
        );
        assert!(
            SignError::ClassifierUnavailable {
                classifier: "primary".into(),
                message: "x".into()
            }
            .is_recoverable()
        );
        assert!(
            SignError::FrameSource {
                message: "camera busy".into()
            }
            .is_recoverable()
        );
        assert!(
            !SignError::LabelSetConfig {
                message: "x".into()
            }
            .is_recoverable()
        );
        assert!(
            !SignError::Sink {
                message: "closed".into()
            }
            .is_recoverable()
        );
    }

    #[test]
    fn test_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: SignError = io_error.into();
        assert!(error.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_toml_error() {
        let toml_error = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let error: SignError = toml_error.into();
        assert!(error.to_string().contains("Configuration error"));

        let error_trait: &dyn std::error::Error = &error;
        assert!(error_trait.source().is_some());
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<SignError>();
        assert_sync::<SignError>();
    }
}
