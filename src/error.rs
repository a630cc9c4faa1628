//! Error taxonomy for topology loading.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ArmError>;

#[derive(Debug, Error)]
pub enum ArmError {
    /// A field the provider schema guarantees is absent or has the wrong shape.
    #[error("malformed {resource} document: missing or invalid '{path}'")]
    MalformedDocument { resource: String, path: String },

    /// A managed disk or network interface reference did not resolve.
    #[error("{kind} not found: {key}")]
    ResourceNotFound { kind: &'static str, key: String },

    /// The transport collaborator failed (az CLI, process spawn, task join).
    #[error("transport error: {0}")]
    Transport(String),

    #[error("error parsing JSON at path={path}: {message}")]
    Parse { path: String, message: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ArmError {
    pub fn malformed(resource: impl Into<String>, path: impl Into<String>) -> ArmError {
        ArmError::MalformedDocument {
            resource: resource.into(),
            path: path.into(),
        }
    }

    pub fn not_found(kind: &'static str, key: impl Into<String>) -> ArmError {
        ArmError::ResourceNotFound {
            kind,
            key: key.into(),
        }
    }
}

impl From<serde_path_to_error::Error<serde_json::Error>> for ArmError {
    fn from(e: serde_path_to_error::Error<serde_json::Error>) -> Self {
        ArmError::Parse {
            path: e.path().to_string(),
            message: e.inner().to_string(),
        }
    }
}
