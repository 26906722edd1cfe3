#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Writes a ZIP archive; names ending in `/` become directory entries.
pub fn write_zip(path: &Path, entries: &[&str]) {
    let file = File::create(path).expect("create archive");
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default();

    for name in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options).expect("add directory");
        } else {
            writer.start_file(*name, options).expect("start file");
            writer.write_all(name.as_bytes()).expect("write entry");
        }
    }

    writer.finish().expect("finish archive");
}

/// `count` files named `{prefix}{i}.jpg` inside `category/`.
pub fn category_entries(category: &str, prefix: &str, count: usize) -> Vec<String> {
    (1..=count)
        .map(|i| format!("{}/{}{}.jpg", category, prefix, i))
        .collect()
}

pub fn write_category_zip(path: &Path, categories: &[(&str, usize)]) {
    let entries: Vec<String> = categories
        .iter()
        .flat_map(|(name, count)| category_entries(name, "f", *count))
        .collect();
    let refs: Vec<&str> = entries.iter().map(String::as_str).collect();
    write_zip(path, &refs);
}

/// Sorted file names directly inside `dir`.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("read dir")
        .map(|entry| entry.expect("dir entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

pub fn subset_dir(root: &Path, model: &str, category: &str, subset: &str) -> PathBuf {
    root.join(model).join(category).join(subset)
}
