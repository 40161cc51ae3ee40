//! Atomically replaced output files for saving resource files.
//!
//! This module provides the [`crate::file::output::Output`] type used by
//! [`crate::res::ResEditor::save`]. The complete file size is known before anything is
//! written (the editor serializes into a buffer first), so a temporary file next to the target
//! is created at its final size, filled, synced and then renamed over the target.
//!
//! # Resource Management
//!
//! Until [`crate::file::output::Output::finalize`] succeeds the target path is never touched.
//! An [`crate::file::output::Output`] that is dropped without being finalized removes its
//! temporary file, so a failed or interrupted save leaves an existing file as it was.
//!
//! # Usage Examples
//!
//! ```rust,ignore
//! use toolres::file::output::Output;
//!
//! let mut output = Output::create("Res", 12)?;
//! output.write_at(0, b"RESF")?;
//! output.write_u32_le_at(4, 101)?;
//! output.write_u32_le_at(8, u32::MAX)?;
//! output.finalize()?;
//! # Ok::<(), toolres::Error>(())
//! ```
//!
//! # Thread Safety
//!
//! [`crate::file::output::Output`] owns its temporary file and is meant to be used by the
//! thread that created it.

use std::{
    io::{Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use log::debug;
use tempfile::NamedTempFile;

use crate::{Error, Result};

/// An output file staged in a temporary file and moved over its target on finalization.
pub struct Output {
    file: NamedTempFile,

    size: u64,

    target_path: PathBuf,
}

impl Output {
    /// Stage a file of `size` zero bytes that will replace `target_path`.
    ///
    /// The temporary file is created in the directory of `target_path` so the final rename
    /// stays on one filesystem.
    ///
    /// # Errors
    /// Returns [`crate::Error::WriteFailed`] if the temporary file can not be created or
    /// sized.
    pub fn create<P: AsRef<Path>>(target_path: P, size: u64) -> Result<Self> {
        let target_path = target_path.as_ref().to_path_buf();
        let dir = match target_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let file = NamedTempFile::new_in(&dir).map_err(|e| Error::WriteFailed {
            message: format!("Failed to create temporary file in {}: {e}", dir.display()),
        })?;

        file.as_file()
            .set_len(size)
            .map_err(|e| Error::WriteFailed {
                message: format!("Failed to set file size: {e}"),
            })?;

        Ok(Self {
            file,
            size,
            target_path,
        })
    }

    /// Replace `target_path` with a file containing exactly `data`.
    ///
    /// # Errors
    /// Returns [`crate::Error::WriteFailed`] or [`crate::Error::WriteFinalizationFailed`]
    /// if any step fails. An existing target is left unchanged in that case.
    pub fn write_file<P: AsRef<Path>>(target_path: P, data: &[u8]) -> Result<()> {
        let mut output = Output::create(target_path, data.len() as u64)?;
        output.write_at(0, data)?;
        debug!(
            "Writing {} bytes to {}",
            data.len(),
            output.target_path().display()
        );
        output.finalize()
    }

    /// Copy `data` into the file at `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::WriteFailed`] if the write would exceed the file size or the
    /// underlying write fails.
    pub fn write_at(&mut self, offset: u64, data: &[u8]) -> Result<()> {
        match offset.checked_add(data.len() as u64) {
            Some(end) if end <= self.size => {}
            _ => {
                return Err(Error::WriteFailed {
                    message: format!(
                        "Write would exceed file size: offset={}, len={}, file_size={}",
                        offset,
                        data.len(),
                        self.size
                    ),
                })
            }
        }

        let file = self.file.as_file_mut();
        file.seek(SeekFrom::Start(offset))
            .and_then(|_| file.write_all(data))
            .map_err(|e| Error::WriteFailed {
                message: format!("Failed to write {} bytes at {offset}: {e}", data.len()),
            })
    }

    /// Write a little-endian `u32` at `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::WriteFailed`] if the write would exceed the file size.
    pub fn write_u32_le_at(&mut self, offset: u64, value: u32) -> Result<()> {
        self.write_at(offset, &value.to_le_bytes())
    }

    /// Returns the file size.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Sync the temporary file to disk and move it over the target.
    ///
    /// # Errors
    /// Returns [`crate::Error::WriteFinalizationFailed`] if the sync or the rename fails. The
    /// temporary file is removed and the target is unchanged in that case.
    pub fn finalize(self) -> Result<()> {
        self.file
            .as_file()
            .sync_all()
            .map_err(|e| Error::WriteFinalizationFailed {
                message: format!("Failed to sync output file: {e}"),
            })?;

        self.file
            .persist(&self.target_path)
            .map_err(|e| Error::WriteFinalizationFailed {
                message: format!(
                    "Failed to move output file to {}: {}",
                    self.target_path.display(),
                    e.error
                ),
            })?;
        Ok(())
    }

    /// Returns the path the file will replace.
    pub fn target_path(&self) -> &Path {
        &self.target_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn write_operations() {
        let temp_dir = tempdir().unwrap();
        let target_path = temp_dir.path().join("Res");

        let mut output = Output::create(&target_path, 16).unwrap();
        assert_eq!(output.size(), 16);

        output.write_at(0, b"RESF").unwrap();
        output.write_u32_le_at(4, 101).unwrap();

        assert!(output.write_at(12, b"too long").is_err());
        assert!(output.write_at(u64::MAX, b"x").is_err());
        assert!(!target_path.exists());

        output.finalize().unwrap();
        let contents = std::fs::read(&target_path).unwrap();
        assert_eq!(contents.len(), 16);
        assert_eq!(&contents[0..4], b"RESF");
        assert_eq!(&contents[4..8], &[0x65, 0x00, 0x00, 0x00]);
        assert_eq!(&contents[8..16], &[0; 8]);
    }

    #[test]
    fn finalization() {
        let temp_dir = tempdir().unwrap();
        let target_path = temp_dir.path().join("Res");

        Output::write_file(&target_path, b"RESF\x65\x00\x00\x00\xff\xff\xff\xff").unwrap();

        let contents = std::fs::read(&target_path).unwrap();
        assert_eq!(contents.len(), 12);
        assert_eq!(&contents[0..4], b"RESF");
    }

    #[test]
    fn unfinalized_output_keeps_existing_file() {
        let temp_dir = tempdir().unwrap();
        let target_path = temp_dir.path().join("Res");
        std::fs::write(&target_path, b"previous").unwrap();

        {
            let mut output = Output::create(&target_path, 8).unwrap();
            output.write_at(0, b"RESF").unwrap();
        }

        assert_eq!(std::fs::read(&target_path).unwrap(), b"previous");
        let entries = std::fs::read_dir(temp_dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn failed_rename_keeps_existing_directory() {
        let temp_dir = tempdir().unwrap();
        let target_path = temp_dir.path().join("Res");
        std::fs::create_dir(&target_path).unwrap();
        std::fs::write(target_path.join("inner"), b"kept").unwrap();

        let result = Output::write_file(&target_path, b"RESF");
        assert!(matches!(
            result,
            Err(Error::WriteFinalizationFailed { .. })
        ));
        assert_eq!(std::fs::read(target_path.join("inner")).unwrap(), b"kept");
        let entries = std::fs::read_dir(temp_dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }
}
