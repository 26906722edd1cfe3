use crate::archive::{ExtractionProgress, ZipExtractor};
use crate::config::Config;
use crate::error::{DataSplitError, Result};
use crate::names::normalize_model_name;
use crate::organizer::{split_entries, train_count, CategoryScanner, FileCopier, Subset};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

#[derive(Debug, Clone, Serialize)]
pub struct CategorySummary {
    pub name: String,
    pub train_files: usize,
    pub test_files: usize,
}

impl CategorySummary {
    pub fn total_files(&self) -> usize {
        self.train_files + self.test_files
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ArchiveSummary {
    pub path: PathBuf,
    pub entries_extracted: usize,
    pub categories: Vec<CategorySummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessReport {
    pub model: String,
    pub destination: PathBuf,
    pub archives: Vec<ArchiveSummary>,
    pub missing: Vec<PathBuf>,
    pub files_copied: usize,
    pub bytes_copied: u64,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl ProcessReport {
    pub fn has_warnings(&self) -> bool {
        !self.missing.is_empty()
    }
}

/// Notifications emitted while a batch runs.
#[derive(Debug)]
pub enum PipelineEvent<'a> {
    ArchiveMissing { path: &'a Path },
    ArchiveStarted { path: &'a Path, index: usize, total: usize },
    Extracting(&'a ExtractionProgress),
    ArchiveExtracted { path: &'a Path, entries: usize },
    CategoryStarted { name: &'a str, total_files: usize },
    FileCopied { category: &'a str, subset: Subset, file: &'a Path },
    CategoryFinished(&'a CategorySummary),
}

#[derive(Debug, Clone, Serialize)]
pub struct PlannedCategory {
    pub name: String,
    pub train_files: usize,
    pub test_files: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlannedArchive {
    pub path: PathBuf,
    pub exists: bool,
    pub categories: Vec<PlannedCategory>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DryRunPlan {
    pub model: String,
    pub destination: PathBuf,
    pub staging: PathBuf,
    pub archives: Vec<PlannedArchive>,
}

/// Extracts archives into a shared staging area and copies each staged
/// category into `<root>/<model>/<category>/{train,test}`.
pub struct Organizer {
    root: PathBuf,
    staging: PathBuf,
    clean_staging: bool,
    extractor: ZipExtractor,
    scanner: CategoryScanner,
    copier: FileCopier,
    running: AtomicBool,
}

struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Organizer {
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            root: config.output.root.clone(),
            staging: config.staging_directory(),
            clean_staging: config.staging.clean_before_run,
            extractor: ZipExtractor::new(),
            scanner: CategoryScanner::new(config.compiled_exclusions()?, config.split.sort_entries),
            copier: FileCopier::new().with_preserve_timestamps(config.output.preserve_timestamps),
            running: AtomicBool::new(false),
        })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn process<P: AsRef<Path>>(&self, model_name: &str, archive_paths: &[P]) -> Result<ProcessReport> {
        self.process_with_events(model_name, archive_paths, None)
    }

    pub fn process_with_events<P: AsRef<Path>>(
        &self,
        model_name: &str,
        archive_paths: &[P],
        on_event: Option<&dyn Fn(PipelineEvent<'_>)>,
    ) -> Result<ProcessReport> {
        let (model, archives) = validate_inputs(model_name, archive_paths)?;
        self.check_model_dir(&model)?;
        let _guard = self.acquire()?;

        let started_at = Utc::now();
        let start = Instant::now();

        create_dir(&self.root)?;

        if self.clean_staging && self.staging.exists() {
            tracing::info!("Clearing staging area {}", self.staging.display());
            fs::remove_dir_all(&self.staging)?;
        }

        let mut report = ProcessReport {
            model: model.clone(),
            destination: self.root.join(&model),
            archives: Vec::new(),
            missing: Vec::new(),
            files_copied: 0,
            bytes_copied: 0,
            started_at,
            duration_ms: 0,
        };

        let total = archives.len();
        for (index, archive) in archives.iter().enumerate() {
            if !archive.exists() {
                tracing::info!("Skipping missing archive {}", archive.display());
                notify(on_event, PipelineEvent::ArchiveMissing { path: archive });
                report.missing.push(archive.clone());
                continue;
            }

            tracing::info!("Processing archive {}/{}: {}", index + 1, total, archive.display());
            notify(
                on_event,
                PipelineEvent::ArchiveStarted {
                    path: archive,
                    index,
                    total,
                },
            );

            let progress_callback = |progress: &ExtractionProgress| {
                notify(on_event, PipelineEvent::Extracting(progress));
            };
            let extraction =
                self.extractor
                    .extract_into(archive, &self.staging, Some(&progress_callback))?;
            notify(
                on_event,
                PipelineEvent::ArchiveExtracted {
                    path: archive,
                    entries: extraction.entries_processed,
                },
            );

            let (categories, files, bytes) = self.organize(&model, on_event)?;
            report.files_copied += files;
            report.bytes_copied += bytes;
            report.archives.push(ArchiveSummary {
                path: archive.clone(),
                entries_extracted: extraction.entries_processed,
                categories,
            });
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            "Data organized for model '{}': {} files copied",
            report.model,
            report.files_copied
        );

        Ok(report)
    }

    /// Splits every category currently staged, not only the ones the last
    /// archive contributed.
    fn organize(
        &self,
        model: &str,
        on_event: Option<&dyn Fn(PipelineEvent<'_>)>,
    ) -> Result<(Vec<CategorySummary>, usize, u64)> {
        let model_dir = self.root.join(model);
        let mut summaries = Vec::new();
        let mut files_copied = 0;
        let mut bytes_copied = 0;

        for category in self.scanner.scan_categories(&self.staging)? {
            let category_dir = model_dir.join(&category.dir_name);
            let train_dir = category_dir.join(Subset::Train.dir_name());
            let test_dir = category_dir.join(Subset::Test.dir_name());
            create_dir(&train_dir)?;
            create_dir(&test_dir)?;

            let files = self.scanner.list_files(&category.path)?;
            notify(
                on_event,
                PipelineEvent::CategoryStarted {
                    name: &category.name,
                    total_files: files.len(),
                },
            );

            let plan = split_entries(files);
            for (subset, file) in plan.assignments() {
                let dest_dir = match subset {
                    Subset::Train => &train_dir,
                    Subset::Test => &test_dir,
                };
                let (_, bytes) = self.copier.copy_into(file, dest_dir)?;
                bytes_copied += bytes;
                files_copied += 1;
                notify(
                    on_event,
                    PipelineEvent::FileCopied {
                        category: &category.name,
                        subset,
                        file,
                    },
                );
            }

            let summary = CategorySummary {
                name: category.name.clone(),
                train_files: plan.train.len(),
                test_files: plan.test.len(),
            };
            tracing::debug!(
                "Category {}: {} train, {} test",
                summary.name,
                summary.train_files,
                summary.test_files
            );
            notify(on_event, PipelineEvent::CategoryFinished(&summary));
            summaries.push(summary);
        }

        Ok((summaries, files_copied, bytes_copied))
    }

    /// Reads each archive's listing and reports the categories and split
    /// sizes it would produce on its own. Nothing is written.
    pub fn plan<P: AsRef<Path>>(&self, model_name: &str, archive_paths: &[P]) -> Result<DryRunPlan> {
        let (model, archives) = validate_inputs(model_name, archive_paths)?;
        self.check_model_dir(&model)?;

        let mut planned = Vec::with_capacity(archives.len());
        for archive in archives {
            if !archive.exists() {
                planned.push(PlannedArchive {
                    path: archive,
                    exists: false,
                    categories: Vec::new(),
                });
                continue;
            }

            let entries = self.extractor.list_entries(&archive)?;
            let mut file_counts: BTreeMap<String, usize> = BTreeMap::new();

            for entry in entries {
                let parts: Vec<String> = entry
                    .path
                    .components()
                    .filter_map(|c| match c {
                        Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                        _ => None,
                    })
                    .collect();

                match parts.len() {
                    0 => {}
                    1 if entry.is_dir => {
                        file_counts.entry(parts[0].clone()).or_insert(0);
                    }
                    1 => {}
                    2 if !entry.is_dir => {
                        *file_counts.entry(parts[0].clone()).or_insert(0) += 1;
                    }
                    _ => {
                        file_counts.entry(parts[0].clone()).or_insert(0);
                    }
                }
            }

            let categories = file_counts
                .into_iter()
                .filter(|(name, _)| !self.scanner.is_excluded(name))
                .map(|(name, total)| {
                    let train_files = train_count(total);
                    PlannedCategory {
                        name,
                        train_files,
                        test_files: total - train_files,
                    }
                })
                .collect();

            planned.push(PlannedArchive {
                path: archive,
                exists: true,
                categories,
            });
        }

        Ok(DryRunPlan {
            destination: self.root.join(&model),
            staging: self.staging.clone(),
            model,
            archives: planned,
        })
    }

    /// The model directory shares the root with the staging area and must not
    /// be the staging area itself. Compared case-insensitively.
    fn check_model_dir(&self, model: &str) -> Result<()> {
        let collides = self
            .staging
            .file_name()
            .map_or(false, |staging| staging.to_string_lossy().eq_ignore_ascii_case(model));

        if collides {
            return Err(DataSplitError::InvalidName {
                name: model.to_string(),
                reason: "the name is reserved for the staging area".to_string(),
            });
        }

        Ok(())
    }

    fn acquire(&self) -> Result<RunGuard<'_>> {
        self.running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| DataSplitError::Busy)?;
        Ok(RunGuard(&self.running))
    }
}

/// Checks the model name and archive list before anything touches the
/// filesystem. Blank archive entries are dropped.
pub fn validate_inputs<P: AsRef<Path>>(
    model_name: &str,
    archive_paths: &[P],
) -> Result<(String, Vec<PathBuf>)> {
    let model = normalize_model_name(model_name)?;

    let archives: Vec<PathBuf> = archive_paths
        .iter()
        .map(|p| p.as_ref())
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .collect();

    if archives.is_empty() {
        return Err(DataSplitError::validation("at least one archive"));
    }

    Ok((model, archives))
}

fn notify(on_event: Option<&dyn Fn(PipelineEvent<'_>)>, event: PipelineEvent<'_>) {
    if let Some(callback) = on_event {
        callback(event);
    }
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| DataSplitError::CreateDirectory {
        path: path.to_path_buf(),
        source: e,
    })
}
