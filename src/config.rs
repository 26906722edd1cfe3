use crate::error::{DataSplitError, Result};
use crate::names::validate_segment;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub output: OutputConfig,
    pub staging: StagingConfig,
    pub split: SplitConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Destination root; relative paths resolve against the working directory.
    pub root: PathBuf,
    pub preserve_timestamps: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StagingConfig {
    pub dir_name: String,
    pub clean_before_run: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Sort category files by name before splitting instead of using listing order.
    pub sort_entries: bool,
    pub exclude_categories: Vec<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("res"),
            preserve_timestamps: true,
        }
    }
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            dir_name: "Extracted".to_string(),
            clean_before_run: false,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(DataSplitError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| DataSplitError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| DataSplitError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["datasplit.toml", ".datasplit.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref root) = cli_args.root {
            self.output.root = root.clone();
        }

        if let Some(preserve) = cli_args.preserve_timestamps {
            self.output.preserve_timestamps = preserve;
        }

        if let Some(clean) = cli_args.clean_staging {
            self.staging.clean_before_run = clean;
        }

        if let Some(sort) = cli_args.sort_entries {
            self.split.sort_entries = sort;
        }

        if let Some(ref exclude) = cli_args.exclude_categories {
            self.split.exclude_categories.extend(exclude.iter().cloned());
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| DataSplitError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| DataSplitError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.output.root.as_os_str().is_empty() {
            return Err(DataSplitError::Config {
                message: "Output root must not be empty".to_string(),
            });
        }

        validate_segment(&self.staging.dir_name).map_err(|e| DataSplitError::Config {
            message: format!("Invalid staging directory name: {}", e),
        })?;

        self.compiled_exclusions()?;

        Ok(())
    }

    pub fn compiled_exclusions(&self) -> Result<Vec<Regex>> {
        self.split
            .exclude_categories
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| DataSplitError::Config {
                    message: format!("Invalid category exclusion pattern '{}': {}", pattern, e),
                })
            })
            .collect()
    }

    pub fn staging_directory(&self) -> PathBuf {
        self.output.root.join(&self.staging.dir_name)
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub root: Option<PathBuf>,
    pub preserve_timestamps: Option<bool>,
    pub clean_staging: Option<bool>,
    pub sort_entries: Option<bool>,
    pub exclude_categories: Option<Vec<String>>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(mut self, root: Option<PathBuf>) -> Self {
        self.root = root;
        self
    }

    pub fn with_preserve_timestamps(mut self, preserve: Option<bool>) -> Self {
        self.preserve_timestamps = preserve;
        self
    }

    pub fn with_clean_staging(mut self, clean: Option<bool>) -> Self {
        self.clean_staging = clean;
        self
    }

    pub fn with_sort_entries(mut self, sort: Option<bool>) -> Self {
        self.sort_entries = sort;
        self
    }

    pub fn with_exclude_categories(mut self, exclude: Option<Vec<String>>) -> Self {
        self.exclude_categories = exclude;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.output.root, PathBuf::from("res"));
        assert_eq!(config.staging.dir_name, "Extracted");
        assert!(!config.staging.clean_before_run);
        assert!(!config.split.sort_entries);
        assert!(config.split.exclude_categories.is_empty());
        assert_eq!(config.staging_directory(), PathBuf::from("res").join("Extracted"));
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.staging.dir_name = "../escape".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.split.exclude_categories.push("([unclosed".to_string());
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.output.root = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_file_operations() {
        let mut config = Config::default();
        config.split.sort_entries = true;
        config.split.exclude_categories.push("^__MACOSX$".to_string());
        let temp_file = NamedTempFile::new().unwrap();

        config.save_to_file(temp_file.path()).unwrap();

        let loaded = Config::load_from_file(temp_file.path()).unwrap();
        assert!(loaded.split.sort_entries);
        assert_eq!(loaded.split.exclude_categories, vec!["^__MACOSX$"]);
    }

    #[test]
    fn test_missing_config_file() {
        let result = Config::load_from_file("/definitely/not/here/datasplit.toml");
        assert!(matches!(result, Err(DataSplitError::Config { .. })));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = Config::default();

        let overrides = CliOverrides::new()
            .with_root(Some(PathBuf::from("/data/out")))
            .with_sort_entries(Some(true))
            .with_clean_staging(Some(true))
            .with_exclude_categories(Some(vec!["^\\.".to_string()]));

        config.merge_with_cli_args(&overrides);

        assert_eq!(config.output.root, PathBuf::from("/data/out"));
        assert!(config.split.sort_entries);
        assert!(config.staging.clean_before_run);
        assert!(config.output.preserve_timestamps);
        assert_eq!(config.compiled_exclusions().unwrap().len(), 1);
    }

    #[test]
    fn test_sample_config_generation() {
        let sample = Config::create_sample_config();
        assert!(sample.contains("[output]"));
        assert!(sample.contains("[staging]"));
        assert!(sample.contains("[split]"));
    }
}
