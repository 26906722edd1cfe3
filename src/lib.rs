pub mod archive;
pub mod cli;
pub mod config;
pub mod error;
pub mod names;
pub mod organizer;
pub mod pipeline;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, OutputConfig, SplitConfig, StagingConfig};
pub use error::{DataSplitError, Result, UserFriendlyError};

// Core functionality re-exports
pub use archive::{ArchiveEntry, ExtractionProgress, ZipExtractor};
pub use organizer::{split_entries, train_count, Category, CategoryScanner, FileCopier, SplitPlan, Subset};
pub use pipeline::{
    ArchiveSummary, CategorySummary, DryRunPlan, Organizer, PipelineEvent, ProcessReport,
};
pub use ui::{OutputFormatter, OutputMode, ProgressManager};

use indicatif::ProgressBar;
use std::cell::RefCell;
use std::path::Path;

/// Main library interface: an [`Organizer`] wired to terminal output.
pub struct DataSplit {
    config: Config,
    organizer: Organizer,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
}

impl DataSplit {
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Result<Self> {
        let organizer = Organizer::new(&config)?;
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet && output_mode == OutputMode::Human);

        Ok(Self {
            config,
            organizer,
            output_formatter,
            progress_manager,
        })
    }

    /// Create a DataSplit instance from CLI arguments
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        };

        Self::new(config, output_mode, cli_args.verbose, cli_args.quiet)
    }

    /// Extract every archive in order and split the staged categories for `model_name`.
    pub fn process<P: AsRef<Path>>(&self, model_name: &str, archive_paths: &[P]) -> Result<ProcessReport> {
        let formatter = &self.output_formatter;
        let progress = &self.progress_manager;
        let extraction_bar: RefCell<Option<ProgressBar>> = RefCell::new(None);
        let copy_bar: RefCell<Option<ProgressBar>> = RefCell::new(None);

        let result = self.organizer.process_with_events(
            model_name,
            archive_paths,
            Some(&|event: PipelineEvent<'_>| match event {
                PipelineEvent::ArchiveMissing { path } => {
                    progress.suspend(|| formatter.warning(&format!("File not found: {}", path.display())));
                }
                PipelineEvent::ArchiveStarted { path, index, total } => {
                    progress.suspend(|| {
                        formatter.start_operation(&format!(
                            "Extracting {} ({}/{})",
                            path.display(),
                            index + 1,
                            total
                        ))
                    });
                    *extraction_bar.borrow_mut() = Some(progress.create_extraction_progress(0));
                }
                PipelineEvent::Extracting(state) => {
                    if let Some(ref pb) = *extraction_bar.borrow() {
                        ui::progress::update_extraction_progress(pb, state);
                    }
                }
                PipelineEvent::ArchiveExtracted { path, entries } => {
                    if let Some(pb) = extraction_bar.borrow_mut().take() {
                        ui::progress::finish_progress_with_summary(
                            &pb,
                            &format!("Extracted {} entries", entries),
                            pb.elapsed(),
                        );
                    }
                    progress.suspend(|| formatter.debug(&format!("Staged {}", path.display())));
                }
                PipelineEvent::CategoryStarted { name, total_files } => {
                    *copy_bar.borrow_mut() = Some(progress.create_copy_progress(name, total_files as u64));
                }
                PipelineEvent::FileCopied { .. } => {
                    if let Some(ref pb) = *copy_bar.borrow() {
                        pb.inc(1);
                    }
                }
                PipelineEvent::CategoryFinished(summary) => {
                    if let Some(pb) = copy_bar.borrow_mut().take() {
                        pb.finish_and_clear();
                    }
                    progress.suspend(|| {
                        formatter.info(&format!(
                            "{}: {} train, {} test",
                            summary.name, summary.train_files, summary.test_files
                        ))
                    });
                }
            }),
        );

        for bar in [extraction_bar.into_inner(), copy_bar.into_inner()].into_iter().flatten() {
            bar.abandon();
        }
        self.progress_manager.clear();

        result
    }

    /// Describe what `process` would do without touching the filesystem.
    pub fn plan<P: AsRef<Path>>(&self, model_name: &str, archive_paths: &[P]) -> Result<DryRunPlan> {
        self.organizer.plan(model_name, archive_paths)
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config)?;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn organizer(&self) -> &Organizer {
        &self.organizer
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &DataSplitError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}
