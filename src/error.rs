use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataSplitError {
    #[error("Missing required input: {field}")]
    Validation { field: String },

    #[error("Invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to create directory {path}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot read archive {path}: {message}")]
    CorruptArchive { path: PathBuf, message: String },

    #[error("Archive entry escapes the staging area: {entry}")]
    UnsafeEntry { archive: PathBuf, entry: String },

    #[error("Failed to copy {source_path} to {dest_path}")]
    Copy {
        source_path: PathBuf,
        dest_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory listing failed: {message}")]
    Listing { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Another run is already in progress")]
    Busy,
}

impl DataSplitError {
    pub fn validation<S: Into<String>>(field: S) -> Self {
        DataSplitError::Validation {
            field: field.into(),
        }
    }

    /// True for input problems caught before the filesystem is touched.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DataSplitError::Validation { .. } | DataSplitError::InvalidName { .. }
        )
    }
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for DataSplitError {
    fn user_message(&self) -> String {
        match self {
            DataSplitError::Validation { field } => {
                format!("Please provide {}", field)
            }
            DataSplitError::InvalidName { name, reason } => {
                format!("Invalid name '{}': {}", name, reason)
            }
            DataSplitError::CreateDirectory { path, source } => {
                format!("Could not create {}: {}", path.display(), source)
            }
            DataSplitError::CorruptArchive { path, message } => {
                format!("An error occurred reading {}: {}", path.display(), message)
            }
            DataSplitError::UnsafeEntry { archive, entry } => {
                format!(
                    "Archive {} contains an unsafe entry path: {}",
                    archive.display(),
                    entry
                )
            }
            DataSplitError::Copy {
                source_path,
                dest_path,
                source,
            } => {
                format!(
                    "Failed to copy {} to {}: {}",
                    source_path.display(),
                    dest_path.display(),
                    source
                )
            }
            DataSplitError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            _ => format!("An error occurred: {}", self),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            DataSplitError::Validation { .. } => Some(
                "Pass a model name with --model and at least one archive path (or --from-list)."
                    .to_string(),
            ),
            DataSplitError::InvalidName { .. } => Some(
                "Use a model name without path separators, control characters, '.' or '..'."
                    .to_string(),
            ),
            DataSplitError::CorruptArchive { .. } => Some(
                "Check that the file is a valid ZIP archive and is not truncated.".to_string(),
            ),
            DataSplitError::UnsafeEntry { .. } => Some(
                "Repack the archive so every entry uses a relative path.".to_string(),
            ),
            DataSplitError::CreateDirectory { .. } | DataSplitError::Copy { .. } => Some(
                "Ensure you have write permission and free space in the destination root."
                    .to_string(),
            ),
            DataSplitError::Config { .. } => Some(
                "Check your configuration file syntax or regenerate one with --generate-config."
                    .to_string(),
            ),
            DataSplitError::Busy => Some(
                "Wait for the current run to finish before starting another.".to_string(),
            ),
            _ => None,
        }
    }
}

impl From<zip::result::ZipError> for DataSplitError {
    fn from(error: zip::result::ZipError) -> Self {
        match error {
            zip::result::ZipError::Io(e) => DataSplitError::Io(e),
            other => DataSplitError::CorruptArchive {
                path: PathBuf::new(),
                message: other.to_string(),
            },
        }
    }
}

impl From<walkdir::Error> for DataSplitError {
    fn from(error: walkdir::Error) -> Self {
        DataSplitError::Listing {
            message: error.to_string(),
        }
    }
}

impl From<toml::de::Error> for DataSplitError {
    fn from(error: toml::de::Error) -> Self {
        DataSplitError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DataSplitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_friendly_messages() {
        let error = DataSplitError::validation("a model name");
        assert!(error.user_message().contains("a model name"));
        assert!(error.suggestion().is_some());
        assert!(error.is_validation());
    }

    #[test]
    fn test_processing_errors_are_not_validation() {
        let error = DataSplitError::CorruptArchive {
            path: PathBuf::from("broken.zip"),
            message: "invalid Zip archive".to_string(),
        };
        assert!(!error.is_validation());
        assert!(error.user_message().contains("broken.zip"));
    }

    #[test]
    fn test_zip_error_conversion() {
        let zip_error = zip::result::ZipError::FileNotFound;
        let error = DataSplitError::from(zip_error);
        assert!(matches!(error, DataSplitError::CorruptArchive { .. }));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_error = toml::from_str::<toml::Value>("not = [valid").unwrap_err();
        let error = DataSplitError::from(toml_error);
        assert!(matches!(error, DataSplitError::Config { .. }));
    }
}
