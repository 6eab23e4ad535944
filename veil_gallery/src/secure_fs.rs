//! Veil Gallery - Filesystem Operations
//!
//! Rooted file I/O for the producer: atomic writes and image discovery.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::normalize_extension;
use crate::error::{GalleryError, GalleryResult};

/// Filesystem handler rooted at one directory
pub struct SecureFs {
    /// Root directory
    root: PathBuf,
}

impl SecureFs {
    /// Create new SecureFs with root directory
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    /// Get full path for a relative file
    pub fn full_path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Create the root directory and any missing parents
    pub fn ensure_root(&self) -> GalleryResult<()> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    /// Write file atomically
    pub fn write_file(&self, relative_path: &str, data: &[u8]) -> GalleryResult<PathBuf> {
        let path = self.full_path(relative_path);

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write to a sibling temp file, then rename over the target
        let mut temp_name = path.as_os_str().to_owned();
        temp_name.push(".tmp");
        let temp_path = PathBuf::from(temp_name);

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)?;

        file.write_all(data)?;
        file.sync_all()?;

        fs::rename(&temp_path, &path)?;

        Ok(path)
    }

    /// Read file
    pub fn read_file(&self, relative_path: &str) -> GalleryResult<Vec<u8>> {
        let path = self.full_path(relative_path);

        match fs::read(&path) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(GalleryError::NotFound(path.display().to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// List regular files directly under the root whose extension matches,
    /// case-insensitively. Sub-directories are not descended into.
    pub fn list_images(&self, extensions: &[String]) -> GalleryResult<Vec<String>> {
        if !self.root.is_dir() {
            return Err(GalleryError::InputDirMissing(self.root.display().to_string()));
        }

        let wanted: Vec<String> = extensions.iter().map(|e| normalize_extension(e)).collect();
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.root).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| GalleryError::Io(e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let matches = entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| wanted.contains(&normalize_extension(e)))
                .unwrap_or(false);

            if matches {
                if let Some(name) = entry.file_name().to_str() {
                    files.push(name.to_string());
                }
            }
        }

        files.sort();
        Ok(files)
    }
}
