use crate::config::{CliOverrides, Config};
use crate::error::{DataSplitError, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "datasplit")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Extract ZIP datasets and organize them into train/test splits")]
#[command(
    long_about = "DataSplit extracts one or more ZIP archives into a staging area and copies \
                  every top-level category folder into <root>/<model>/<category>/{train,test} \
                  using a fixed 80/20 split."
)]
#[command(after_help = "EXAMPLES:\n  \
    datasplit --model resnet cats.zip dogs.zip\n  \
    datasplit -m resnet --root /data/res --sort archives/*.zip\n  \
    datasplit -m resnet --from-list archives.txt --dry-run\n  \
    datasplit --generate-config --config datasplit.toml")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// ZIP archives to process, in order
    pub archives: Vec<PathBuf>,

    /// Model name used as the destination directory
    #[arg(short, long)]
    pub model: Option<String>,

    /// Read additional archive paths from a file, one per line
    #[arg(long, value_name = "FILE")]
    pub from_list: Option<PathBuf>,

    /// Destination root (defaults to ./res)
    #[arg(short, long, env = "DATASPLIT_ROOT")]
    pub root: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Sort category files by name before splitting
    #[arg(long)]
    pub sort: bool,

    /// Remove the staging area before extracting
    #[arg(long)]
    pub clean_staging: bool,

    /// Regex patterns for staged folders that are not categories
    #[arg(short = 'x', long, value_delimiter = ',')]
    pub exclude_category: Option<Vec<String>>,

    /// Do not copy modification times onto copied files
    #[arg(long)]
    pub no_preserve_timestamps: bool,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Show the planned split without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long)]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_root(self.root.clone())
            .with_preserve_timestamps(self.no_preserve_timestamps.then_some(false))
            .with_clean_staging(self.clean_staging.then_some(true))
            .with_sort_entries(self.sort.then_some(true))
            .with_exclude_categories(self.exclude_category.clone())
    }

    pub fn model_name(&self) -> &str {
        self.model.as_deref().unwrap_or("")
    }

    /// Positional archives followed by the entries of `--from-list`.
    pub fn archive_paths(&self) -> Result<Vec<PathBuf>> {
        let mut paths = self.archives.clone();

        if let Some(ref list) = self.from_list {
            let content = std::fs::read_to_string(list).map_err(|e| DataSplitError::Config {
                message: format!("Failed to read archive list {}: {}", list.display(), e),
            })?;
            paths.extend(parse_archive_list(&content));
        }

        Ok(paths)
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Default tracing filter when RUST_LOG is unset.
    pub fn log_filter(&self) -> &'static str {
        match self.verbosity_level() {
            0 => "datasplit=warn",
            1 => "datasplit=info",
            _ => "datasplit=debug",
        }
    }
}

/// Newline-separated paths; blank lines are skipped.
pub fn parse_archive_list(content: &str) -> Vec<PathBuf> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_invocation() {
        let cli = Cli::try_parse_from(["datasplit", "--model", "resnet", "a.zip", "b.zip"]).unwrap();
        assert_eq!(cli.model_name(), "resnet");
        assert_eq!(
            cli.archive_paths().unwrap(),
            vec![PathBuf::from("a.zip"), PathBuf::from("b.zip")]
        );
        assert!(!cli.sort);
        assert_eq!(cli.verbosity_level(), 0);
    }

    #[test]
    fn test_missing_model_is_empty_name() {
        let cli = Cli::try_parse_from(["datasplit", "a.zip"]).unwrap();
        assert_eq!(cli.model_name(), "");
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["datasplit", "-m", "x", "-q", "-v", "a.zip"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides_only_set_flags() {
        let cli = Cli::try_parse_from(["datasplit", "-m", "x", "a.zip"]).unwrap();
        let overrides = cli.create_cli_overrides();
        assert!(overrides.sort_entries.is_none());
        assert!(overrides.clean_staging.is_none());
        assert!(overrides.preserve_timestamps.is_none());

        let cli = Cli::try_parse_from([
            "datasplit",
            "-m",
            "x",
            "--sort",
            "--clean-staging",
            "--no-preserve-timestamps",
            "-x",
            "^__MACOSX$,^\\.",
            "a.zip",
        ])
        .unwrap();
        let overrides = cli.create_cli_overrides();
        assert_eq!(overrides.sort_entries, Some(true));
        assert_eq!(overrides.clean_staging, Some(true));
        assert_eq!(overrides.preserve_timestamps, Some(false));
        assert_eq!(overrides.exclude_categories.unwrap().len(), 2);
    }

    #[test]
    fn test_from_list_appends_paths() {
        let mut list = NamedTempFile::new().unwrap();
        writeln!(list, "first.zip\n\n  second.zip  \n").unwrap();

        let cli = Cli::try_parse_from([
            "datasplit",
            "-m",
            "x",
            "--from-list",
            list.path().to_str().unwrap(),
            "zero.zip",
        ])
        .unwrap();

        assert_eq!(
            cli.archive_paths().unwrap(),
            vec![
                PathBuf::from("zero.zip"),
                PathBuf::from("first.zip"),
                PathBuf::from("second.zip")
            ]
        );
    }

    #[test]
    fn test_log_filter_follows_verbosity() {
        let cli = Cli::try_parse_from(["datasplit", "-m", "x", "-vv", "a.zip"]).unwrap();
        assert_eq!(cli.verbosity_level(), 2);
        assert_eq!(cli.log_filter(), "datasplit=debug");
    }
}
