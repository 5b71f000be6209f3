//! Object key validation shared by all backends.

use crate::traits::{StorageError, StorageResult};

/// Reject keys that are empty, absolute, or try to climb out of the bucket.
pub(crate) fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("Storage key is empty".to_string()));
    }
    if key.starts_with('/') || key.split('/').any(|segment| segment == "..") {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    if key.contains('\0') || key.contains('\\') {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key_accepts_prefixed_keys() {
        assert!(validate_key("landscape/AbC-_x.mp4").is_ok());
        assert!(validate_key("other/a..b.mp4").is_ok());
    }

    #[test]
    fn test_validate_key_rejects_traversal() {
        assert!(matches!(
            validate_key("../etc/passwd"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            validate_key("portrait/../../x"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            validate_key("/absolute.mp4"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(validate_key(""), Err(StorageError::InvalidKey(_))));
    }
}
