//! Custom validation functions for configuration.

use std::path::Path;

use validator::ValidationError;

/// Validate that a configured path is not empty.
pub fn validate_path(path: &Path) -> Result<(), ValidationError> {
    if path.as_os_str().is_empty() {
        Err(ValidationError::new("empty_path"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_path() {
        assert!(validate_path(Path::new("")).is_err());
        assert!(validate_path(Path::new("programs/a.mdf")).is_ok());
    }
}
