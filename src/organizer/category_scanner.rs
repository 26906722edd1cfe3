use crate::error::{DataSplitError, Result};
use regex::Regex;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A top-level directory of the staging area.
#[derive(Debug, Clone)]
pub struct Category {
    pub name: String,
    pub dir_name: OsString,
    pub path: PathBuf,
}

pub struct CategoryScanner {
    exclusions: Vec<Regex>,
    sort_entries: bool,
}

impl CategoryScanner {
    pub fn new(exclusions: Vec<Regex>, sort_entries: bool) -> Self {
        Self {
            exclusions,
            sort_entries,
        }
    }

    pub fn with_sort_entries(mut self, sort: bool) -> Self {
        self.sort_entries = sort;
        self
    }

    /// Directories directly under `staging`, in listing order unless sorting
    /// is enabled. Plain files at the top level are ignored.
    pub fn scan_categories(&self, staging: &Path) -> Result<Vec<Category>> {
        if !staging.is_dir() {
            return Err(DataSplitError::Listing {
                message: format!("{} is not a directory", staging.display()),
            });
        }

        let mut categories = Vec::new();

        for entry in self.immediate_children(staging) {
            let entry = entry?;
            let path = entry.path();

            // is_dir follows symlinks so linked category folders still count
            if !path.is_dir() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            if self.is_excluded(&name) {
                tracing::debug!("Skipping excluded category {}", name);
                continue;
            }

            categories.push(Category {
                name,
                dir_name: entry.file_name().to_os_string(),
                path: path.to_path_buf(),
            });
        }

        Ok(categories)
    }

    /// Regular files directly inside a category directory. Nested
    /// directories are not descended into.
    pub fn list_files(&self, category_dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in self.immediate_children(category_dir) {
            let entry = entry?;
            if entry.path().is_file() {
                files.push(entry.into_path());
            } else {
                tracing::debug!("Ignoring non-file entry {}", entry.path().display());
            }
        }

        Ok(files)
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.exclusions.iter().any(|pattern| pattern.is_match(name))
    }

    fn immediate_children(&self, dir: &Path) -> walkdir::IntoIter {
        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false);

        if self.sort_entries {
            walker.sort_by_file_name().into_iter()
        } else {
            walker.into_iter()
        }
    }
}

impl Default for CategoryScanner {
    fn default() -> Self {
        Self::new(Vec::new(), false)
    }
}
