//! Error types for the storage layer

use thiserror::Error;

/// Result type for storage operations
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur while reading or writing a binary log or JSON snapshot
#[derive(Error, Debug)]
pub enum StorageError {
    /// Invalid magic number in binary format
    #[error("Invalid magic number: expected {expected:?}, found {found:?}")]
    InvalidMagic {
        /// Expected magic number
        expected: [u8; 4],
        /// Found magic number
        found: [u8; 4],
    },

    /// Checksum verification failed
    #[error("Checksum verification failed: expected {expected:08x}, computed {computed:08x}")]
    ChecksumMismatch {
        /// Expected checksum
        expected: u32,
        /// Computed checksum
        computed: u32,
    },

    /// Invalid file format or corrupted data
    #[error("Invalid format: {reason}")]
    InvalidFormat {
        /// Reason for invalid format
        reason: String,
    },

    /// I/O error
    #[error("I/O error: {source}")]
    Io {
        #[from]
        /// Source I/O error
        source: std::io::Error,
    },

    /// JSON (de)serialization error
    #[cfg(feature = "serde")]
    #[error("JSON error: {source}")]
    Json {
        #[from]
        /// Source JSON error
        source: serde_json::Error,
    },

    /// Generic operation error
    #[error("Operation failed: {message}")]
    OperationError {
        /// Error message
        message: String,
    },
}

impl StorageError {
    /// Create an invalid format error
    pub fn invalid_format(reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            reason: reason.into(),
        }
    }

    /// Create a generic operation error
    pub fn operation_failed(message: impl Into<String>) -> Self {
        Self::OperationError {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = StorageError::invalid_format("test reason");
        assert!(matches!(err, StorageError::InvalidFormat { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = StorageError::InvalidMagic {
            expected: [0x53, 0x50, 0x4b, 0x31],
            found: [0x00, 0x00, 0x00, 0x00],
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Invalid magic number"));
    }
}
