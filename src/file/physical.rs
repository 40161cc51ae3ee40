//! Physical file backend for memory-mapped resource files.
//!
//! This module provides the [`crate::file::physical::Physical`] backend that implements the
//! [`crate::file::Backend`] trait for resource files on disk. The file is mapped as a private
//! copy-on-write view: loading relocates the reference slots of every record in place, and
//! those writes must never reach the file itself. Pages that are never relocated (bodies
//! without references) stay shared with the page cache.
//!
//! # Usage Examples
//!
//! ```rust,ignore
//! use toolres::file::{Physical, Backend};
//! use std::path::Path;
//!
//! let physical = Physical::new(Path::new("Res"))?;
//! let marker = physical.data_slice(0, 4)?;
//! assert_eq!(marker, b"RESF");
//! # Ok::<(), toolres::Error>(())
//! ```
//!
//! # Thread Safety
//!
//! [`crate::file::physical::Physical`] is [`Send`] and [`Sync`]. Mutable access goes through
//! `&mut self`, so relocation has finished before the image is shared.

use super::Backend;
use crate::{Error::FileError, Result};

use memmap2::{MmapMut, MmapOptions};
use std::{fs, path::Path};

/// Resource image backed by a private memory mapping of a file
#[derive(Debug)]
pub struct Physical {
    data: MmapMut,
}

impl Physical {
    /// Map the file at `path` as a private copy-on-write image.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file can not be opened or mapped.
    pub fn new(path: impl AsRef<Path>) -> Result<Physical> {
        let file = match fs::File::open(path) {
            Ok(file) => file,
            Err(error) => return Err(FileError(error)),
        };

        let mmap = unsafe { MmapOptions::new().map_copy(&file) }.map_err(FileError)?;

        Ok(Physical { data: mmap })
    }
}

impl Backend for Physical {
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        let Some(offset_end) = offset.checked_add(len) else {
            return Err(out_of_bounds_error!());
        };

        if offset_end > self.data.len() {
            return Err(out_of_bounds_error!());
        }

        Ok(&self.data[offset..offset_end])
    }

    fn data(&self) -> &[u8] {
        self.data.as_ref()
    }

    fn data_mut(&mut self) -> &mut [u8] {
        self.data.as_mut()
    }

    fn len(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use std::{io::Write, path::PathBuf};

    use super::*;

    #[test]
    fn physical() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"RESF\x65\x00\x00\x00\xff\xff\xff\xff").unwrap();
        file.flush().unwrap();

        let mut physical = Physical::new(file.path()).unwrap();
        assert_eq!(physical.len(), 12);
        assert_eq!(physical.data_slice(0, 4).unwrap(), b"RESF");

        if physical.data_slice(8, 8).is_ok() {
            panic!("This should not work!")
        }

        // Writes stay private to the mapping
        physical.data_mut()[0] = b'X';
        assert_eq!(physical.data()[0], b'X');
        assert_eq!(&std::fs::read(file.path()).unwrap()[..4], b"RESF");
    }

    #[test]
    fn physical_invalid_file_path() {
        let result = Physical::new(PathBuf::from("/nonexistent/path/to/Res"));
        match result {
            Err(FileError(io_error)) => {
                assert_eq!(io_error.kind(), std::io::ErrorKind::NotFound);
            }
            _ => panic!("Expected FileError"),
        }
    }
}
