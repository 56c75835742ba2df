use crate::config::Section;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for tradecfg operations
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid {section} configuration: {field} {reason}")]
    Validation {
        section: Section,
        field: &'static str,
        reason: String,
    },

    #[error("Malformed config file {}: {details}", .path.display())]
    MalformedFile { path: PathBuf, details: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ConfigError {
    pub fn validation<S: Into<String>>(section: Section, field: &'static str, reason: S) -> Self {
        Self::Validation {
            section,
            field,
            reason: reason.into(),
        }
    }

    pub fn malformed<P: Into<PathBuf>, S: Into<String>>(path: P, details: S) -> Self {
        Self::MalformedFile {
            path: path.into(),
            details: details.into(),
        }
    }

    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        Self::SerializationError(msg.into())
    }

    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Field name carried by a validation failure
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Section carried by a validation failure
    pub fn section(&self) -> Option<Section> {
        match self {
            Self::Validation { section, .. } => Some(*section),
            _ => None,
        }
    }
}

/// Result type alias for tradecfg operations
pub type Result<T> = std::result::Result<T, ConfigError>;
