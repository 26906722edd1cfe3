use crate::error::{DataSplitError, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

#[derive(Debug, Clone)]
pub struct ExtractionProgress {
    pub entries_processed: usize,
    pub total_entries: usize,
    pub bytes_written: u64,
    pub current_entry: Option<String>,
}

impl ExtractionProgress {
    pub fn new(total_entries: usize) -> Self {
        Self {
            entries_processed: 0,
            total_entries,
            bytes_written: 0,
            current_entry: None,
        }
    }

    pub fn update_entry(&mut self, name: String, bytes: u64) {
        self.entries_processed += 1;
        self.bytes_written += bytes;
        self.current_entry = Some(name);
    }
}

/// Central-directory view of one archive entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub path: PathBuf,
    pub is_dir: bool,
}

pub struct ZipExtractor;

impl ZipExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extracts every entry of `archive_path` below `destination`, keeping the
    /// archive's relative layout. Files already present at the same relative
    /// path are overwritten.
    pub fn extract_into(
        &self,
        archive_path: &Path,
        destination: &Path,
        progress_callback: Option<&dyn Fn(&ExtractionProgress)>,
    ) -> Result<ExtractionProgress> {
        let mut archive = self.open(archive_path)?;
        let mut progress = ExtractionProgress::new(archive.len());

        fs::create_dir_all(destination).map_err(|e| DataSplitError::CreateDirectory {
            path: destination.to_path_buf(),
            source: e,
        })?;

        for index in 0..archive.len() {
            let mut entry = archive
                .by_index(index)
                .map_err(|e| corrupt(archive_path, e))?;

            let relative = entry
                .enclosed_name()
                .ok_or_else(|| DataSplitError::UnsafeEntry {
                    archive: archive_path.to_path_buf(),
                    entry: entry.name().to_string(),
                })?;
            let out_path = destination.join(&relative);

            let bytes = if entry.is_dir() {
                create_dir(&out_path)?;
                0
            } else {
                if let Some(parent) = out_path.parent() {
                    create_dir(parent)?;
                }

                let mut out_file = fs::File::create(&out_path)?;
                io::copy(&mut entry, &mut out_file).map_err(|e| {
                    if e.kind() == io::ErrorKind::InvalidData {
                        DataSplitError::CorruptArchive {
                            path: archive_path.to_path_buf(),
                            message: e.to_string(),
                        }
                    } else {
                        DataSplitError::Io(e)
                    }
                })?
            };

            progress.update_entry(relative.display().to_string(), bytes);

            if let Some(callback) = progress_callback {
                callback(&progress);
            }
        }

        tracing::debug!(
            "Extracted {} entries ({} bytes) from {}",
            progress.entries_processed,
            progress.bytes_written,
            archive_path.display()
        );

        Ok(progress)
    }

    /// Lists entries without writing anything to disk.
    pub fn list_entries(&self, archive_path: &Path) -> Result<Vec<ArchiveEntry>> {
        let mut archive = self.open(archive_path)?;
        let mut entries = Vec::with_capacity(archive.len());

        for index in 0..archive.len() {
            let entry = archive
                .by_index(index)
                .map_err(|e| corrupt(archive_path, e))?;

            let path = entry
                .enclosed_name()
                .ok_or_else(|| DataSplitError::UnsafeEntry {
                    archive: archive_path.to_path_buf(),
                    entry: entry.name().to_string(),
                })?;

            entries.push(ArchiveEntry {
                path,
                is_dir: entry.is_dir(),
            });
        }

        Ok(entries)
    }

    fn open(&self, archive_path: &Path) -> Result<ZipArchive<fs::File>> {
        if !archive_path.is_file() {
            return Err(DataSplitError::CorruptArchive {
                path: archive_path.to_path_buf(),
                message: "not a regular file".to_string(),
            });
        }

        let file = fs::File::open(archive_path).map_err(|e| DataSplitError::CorruptArchive {
            path: archive_path.to_path_buf(),
            message: e.to_string(),
        })?;

        ZipArchive::new(file).map_err(|e| corrupt(archive_path, e))
    }
}

impl Default for ZipExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn corrupt(archive_path: &Path, error: zip::result::ZipError) -> DataSplitError {
    DataSplitError::CorruptArchive {
        path: archive_path.to_path_buf(),
        message: error.to_string(),
    }
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| DataSplitError::CreateDirectory {
        path: path.to_path_buf(),
        source: e,
    })
}
