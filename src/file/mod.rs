//! Resource image access and binary I/O.
//!
//! This module abstracts over the sources a resource file can be read from and provides the
//! low-level primitives the codec is built on.
//!
//! # Architecture
//!
//! - **Backend system** - Pluggable data sources (memory-mapped files, memory buffers)
//! - **Image** - An immutable-after-load resource image shared by read-only records
//! - **I/O helpers** - Bounds-checked little-endian access and a cursor based parser
//! - **Output** - Atomic memory-mapped output files for saving
//!
//! # Key Components
//!
//! - [`crate::file::Image`] - Loaded resource file contents
//! - [`crate::file::Backend`] - Trait for different data sources
//! - [`crate::file::parser::Parser`] - Cursor based reader for headers and tables
//! - [`crate::file::io`] - Little-endian read/write helpers
//! - [`crate::file::output::Output`] - Output file staged in a temporary file and renamed over its target
//!
//! # Examples
//!
//! ```rust,no_run
//! use toolres::file::Image;
//! use std::path::Path;
//!
//! let image = Image::from_file(Path::new("Res"))?;
//! println!("Loaded {} bytes", image.len());
//! # Ok::<(), toolres::Error>(())
//! ```
//!
//! # Thread Safety
//!
//! Backends are [`Send`] + [`Sync`]. An [`crate::file::Image`] is only mutated while it is
//! being relocated, before it is wrapped in an [`std::sync::Arc`] and shared by records.

pub mod io;
pub mod output;
pub mod parser;

mod memory;
mod physical;

use std::{fmt, path::Path};

use crate::{Error::Empty, Result};
pub use memory::Memory;
pub use physical::Physical;

/// A source of resource bytes.
pub trait Backend: Send + Sync {
    /// Returns `len` bytes starting at `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the range exceeds the data.
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]>;

    /// Returns the complete data.
    fn data(&self) -> &[u8];

    /// Returns the complete data for in-place relocation.
    fn data_mut(&mut self) -> &mut [u8];

    /// Returns the size of the data in bytes.
    fn len(&self) -> usize;
}

/// The raw contents of a resource file.
///
/// Read-only records borrow their bytes from an image. The image may have had its reference
/// slots rewritten into image-absolute positions during loading, see
/// [`crate::res::ResFile`].
pub struct Image {
    data: Box<dyn Backend>,
}

impl Image {
    /// Maps the file at `path`.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file can not be opened and
    /// [`crate::Error::Empty`] if it has no content.
    pub fn from_file(file: &Path) -> Result<Image> {
        let input = Physical::new(file)?;

        Self::load(input)
    }

    /// Wraps an in-memory copy of a resource file.
    ///
    /// # Errors
    /// Returns [`crate::Error::Empty`] if `data` is empty.
    pub fn from_mem(data: Vec<u8>) -> Result<Image> {
        let input = Memory::new(data);

        Self::load(input)
    }

    fn load<T: Backend + 'static>(data: T) -> Result<Image> {
        if data.len() == 0 {
            return Err(Empty);
        }

        Ok(Image {
            data: Box::new(data),
        })
    }

    /// Returns the size of the image in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the image holds no data. Never the case for a loaded image.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.len() == 0
    }

    /// Returns the image bytes.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.data.data()
    }

    /// Returns `len` bytes starting at `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the range exceeds the image.
    pub fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        self.data.data_slice(offset, len)
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        self.data.data_mut()
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image").field("len", &self.len()).finish()
    }
}
