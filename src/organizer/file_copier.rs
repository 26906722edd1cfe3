use crate::error::{DataSplitError, Result};
use std::fs;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

pub struct FileCopier {
    preserve_timestamps: bool,
    buffer_size: usize,
}

impl FileCopier {
    pub fn new() -> Self {
        Self {
            preserve_timestamps: true,
            buffer_size: 64 * 1024,
        }
    }

    pub fn with_preserve_timestamps(mut self, preserve: bool) -> Self {
        self.preserve_timestamps = preserve;
        self
    }

    /// Copies `source` into `dest_dir` under its own file name, replacing any
    /// file already there. Returns the destination path and bytes written.
    pub fn copy_into(&self, source: &Path, dest_dir: &Path) -> Result<(PathBuf, u64)> {
        let file_name = source
            .file_name()
            .ok_or_else(|| DataSplitError::Listing {
                message: format!("{} has no file name", source.display()),
            })?;
        let dest = dest_dir.join(file_name);

        let bytes = self
            .copy_file_with_buffer(source, &dest)
            .map_err(|e| DataSplitError::Copy {
                source_path: source.to_path_buf(),
                dest_path: dest.clone(),
                source: e,
            })?;

        if self.preserve_timestamps {
            if let Ok(modified) = fs::metadata(source).and_then(|m| m.modified()) {
                let _ = filetime::set_file_mtime(&dest, filetime::FileTime::from_system_time(modified));
            }
        }

        Ok((dest, bytes))
    }

    fn copy_file_with_buffer(&self, source: &Path, dest: &Path) -> io::Result<u64> {
        let source_file = fs::File::open(source)?;
        let dest_file = fs::File::create(dest)?;

        let mut reader = BufReader::with_capacity(self.buffer_size, source_file);
        let mut writer = BufWriter::with_capacity(self.buffer_size, dest_file);

        let mut total_bytes = 0u64;
        let mut buffer = vec![0u8; 8192];

        loop {
            let bytes_read = reader.read(&mut buffer)?;
            if bytes_read == 0 {
                break;
            }

            writer.write_all(&buffer[..bytes_read])?;
            total_bytes += bytes_read as u64;
        }

        writer.flush()?;

        Ok(total_bytes)
    }
}

impl Default for FileCopier {
    fn default() -> Self {
        Self::new()
    }
}
