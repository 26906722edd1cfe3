use crate::error::{DataSplitError, Result};

/// Checks that `name` can be used as exactly one path segment under the
/// destination root.
pub fn validate_segment(name: &str) -> Result<()> {
    let invalid = |reason: &str| {
        Err(DataSplitError::InvalidName {
            name: name.to_string(),
            reason: reason.to_string(),
        })
    };

    if name.is_empty() {
        return invalid("name is empty");
    }

    if name == "." || name == ".." {
        return invalid("relative directory references are not allowed");
    }

    if name.contains('/') || name.contains('\\') {
        return invalid("path separators are not allowed");
    }

    if name.chars().any(|c| c.is_control()) {
        return invalid("control characters are not allowed");
    }

    // Windows drive prefixes such as "C:" would re-root the joined path
    #[cfg(windows)]
    {
        if name.contains(':') {
            return invalid("':' is not allowed");
        }
    }

    Ok(())
}

/// Trims surrounding whitespace and validates the result as a model name.
pub fn normalize_model_name(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DataSplitError::validation("a model name"));
    }

    validate_segment(trimmed)?;
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_segments() {
        for name in ["resnet50", "My Model", "v1.2", "model_é", ".hidden"] {
            assert!(validate_segment(name).is_ok(), "Should accept: {}", name);
        }
    }

    #[test]
    fn test_invalid_segments() {
        for name in ["", ".", "..", "a/b", "a\\b", "tab\there", "nul\0"] {
            assert!(validate_segment(name).is_err(), "Should reject: {:?}", name);
        }
    }

    #[test]
    fn test_model_name_is_trimmed() {
        assert_eq!(normalize_model_name("  resnet  ").unwrap(), "resnet");
    }

    #[test]
    fn test_blank_model_name_is_validation_error() {
        let err = normalize_model_name("   ").unwrap_err();
        assert!(matches!(err, DataSplitError::Validation { .. }));
        assert!(err.is_validation());
    }

    #[test]
    fn test_traversal_model_name_rejected() {
        let err = normalize_model_name("../etc").unwrap_err();
        assert!(matches!(err, DataSplitError::InvalidName { .. }));
    }
}
