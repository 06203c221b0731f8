//! Error taxonomy shared by every stage of order generation.
//!
//! Manifest entries with empty keys or values are not errors; they are
//! skipped with a warning by [`crate::ManifestBuilder::add_entry`].

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, OrderError>;

#[derive(Debug, Error)]
pub enum OrderError {
    /// A template root, descriptor, image, certificate or key does not exist.
    #[error("no such file or directory: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Bad passphrase, malformed certificate or key, or a failed signing step.
    #[error("crypto error: {0}")]
    Crypto(String),

    #[error("{} is not a valid JSON descriptor: {source}", .path.display())]
    Descriptor {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("invalid config {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },
}

impl OrderError {
    /// Maps an I/O failure on `path`, keeping missing files distinguishable.
    pub fn io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    pub fn crypto(message: impl Into<String>) -> Self {
        Self::Crypto(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_files_map_to_not_found() {
        let err = OrderError::io(
            Path::new("certs/signerCert.pem"),
            io::Error::from(io::ErrorKind::NotFound),
        );
        assert!(err.is_not_found());
        assert!(err.to_string().contains("certs/signerCert.pem"));
    }

    #[test]
    fn other_io_failures_keep_their_source() {
        let err = OrderError::io(
            Path::new("model.order"),
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(err, OrderError::Io { .. }));
    }
}
