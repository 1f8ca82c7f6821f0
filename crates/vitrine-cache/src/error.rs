//! Session storage errors.

/// Result type for session storage operations.
pub type StorageResult<T, E = StorageError> = std::result::Result<T, E>;

/// Failure reported by a [`SessionStorage`](crate::SessionStorage) backend.
///
/// These never reach fetch callers: the cache store logs and absorbs them.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Writing would exceed the storage quota.
    #[error("Storage quota exceeded: {required} bytes needed, {quota} available")]
    QuotaExceeded { required: usize, quota: usize },

    /// The backend cannot be reached or refused the operation.
    #[error("Storage unavailable: {reason}")]
    Unavailable { reason: String },

    /// A stored entry could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StorageError {
    /// Create an unavailable error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }
}

impl From<StorageError> for vitrine_core::Error {
    fn from(error: StorageError) -> Self {
        let message = error.to_string();
        vitrine_core::Error::from_source(vitrine_core::ErrorKind::Cache, error)
            .with_message(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_message() {
        let error = StorageError::QuotaExceeded {
            required: 10,
            quota: 4,
        };
        assert!(error.to_string().contains("10 bytes"));
    }

    #[test]
    fn test_into_core_error() {
        let error: vitrine_core::Error = StorageError::unavailable("private mode").into();
        assert_eq!(error.kind(), vitrine_core::ErrorKind::Cache);
        assert!(error.message.unwrap().contains("private mode"));
    }
}
