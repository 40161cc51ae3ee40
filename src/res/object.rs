//! Top level resource objects.
//!
//! Every template in a resource file is an object: a 36 byte header naming its class,
//! version and template name, followed by a class specific body. [`ResObject`] gives access
//! to the header and lets components be inserted into and removed from the body. Typed
//! wrappers such as [`crate::res::ResMenu`] and [`crate::res::ResWindow`] are built on top.
//!
//! # Header layout
//!
//! | Offset | Field |
//! |--------|-------|
//! | 0 | class id |
//! | 4 | flags |
//! | 8 | version |
//! | 12 | name, 12 bytes NUL terminated |
//! | 24 | total size |
//! | 28 | body offset |
//! | 32 | body size |

use std::{
    borrow::Cow,
    ops::{Deref, DerefMut},
};

use bitflags::bitflags;

use crate::{
    file::io::read_le_at,
    res::{handle::ResourceHandle, storage::OwnedRecord},
    Error, Result,
};

/// Size of an object header.
pub const HEADER_SIZE: usize = 36;
/// Header offset of the class id.
pub const HEADER_CLASS_ID: usize = 0;
/// Header offset of the object flags.
pub const HEADER_FLAGS: usize = 4;
/// Header offset of the version.
pub const HEADER_VERSION: usize = 8;
/// Header offset of the template name.
pub const HEADER_NAME: usize = 12;
/// Size of the template name field, including its terminator.
pub const NAME_SIZE: usize = 12;
/// Header offset of the total size.
pub const HEADER_TOTAL_SIZE: usize = 24;
/// Header offset of the body offset.
pub const HEADER_BODY_OFFSET: usize = 28;
/// Header offset of the body size.
pub const HEADER_BODY_SIZE: usize = 32;

bitflags! {
    /// Flags stored in an object header.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ObjectFlags: u32 {
        /// Create the object when the resource file is loaded
        const CREATE_ON_LOAD = 1;
        /// Show the object when it is created
        const SHOW_ON_CREATE = 2;
        /// The object is shared between all clients that create it
        const SHARED = 4;
        /// The object is an ancestor object
        const ANCESTOR = 8;
    }
}

/// A top level object.
#[derive(Debug, Clone)]
pub struct ResObject {
    handle: ResourceHandle,
}

impl ResObject {
    /// Create an object with an empty body of `body_size` bytes.
    ///
    /// `name` is truncated to 11 bytes.
    #[must_use]
    pub fn new(name: &str, class_id: u32, version: i32, body_size: usize) -> Self {
        Self::from_record(Self::new_record(name, class_id, version, body_size))
    }

    /// Returns the record of a new object, ready for class specific set up.
    pub(crate) fn new_record(
        name: &str,
        class_id: u32,
        version: i32,
        body_size: usize,
    ) -> OwnedRecord {
        let mut record = OwnedRecord::zeroed(HEADER_SIZE, body_size);
        write_header(&mut record, HEADER_CLASS_ID, class_id);
        write_header(&mut record, HEADER_VERSION, version as u32);
        write_name(&mut record, name);
        record
    }

    /// Wrap a record made by [`ResObject::new_record`].
    pub(crate) fn from_record(record: OwnedRecord) -> Self {
        ResObject {
            handle: ResourceHandle::from_owned(record),
        }
    }

    /// Wrap a handle to a record with an object header.
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] if the record has no complete header.
    pub fn from_handle(handle: ResourceHandle) -> Result<Self> {
        if handle.storage().body_offset() < HEADER_SIZE {
            return Err(malformed_error!(
                "Object record has a header of {} bytes",
                handle.storage().body_offset()
            ));
        }
        Ok(ResObject { handle })
    }

    /// Returns the underlying handle.
    #[must_use]
    pub fn handle(&self) -> &ResourceHandle {
        &self.handle
    }

    /// Consume the object, returning its handle.
    #[must_use]
    pub fn into_handle(self) -> ResourceHandle {
        self.handle
    }

    fn header_word(&self, offset: usize) -> u32 {
        let mut offset = offset;
        read_le_at::<u32>(self.handle.storage().bytes(), &mut offset).unwrap_or(0)
    }

    /// Returns the class id.
    #[must_use]
    pub fn class_id(&self) -> u32 {
        self.header_word(HEADER_CLASS_ID)
    }

    /// Returns the object flags.
    #[must_use]
    pub fn flags(&self) -> ObjectFlags {
        ObjectFlags::from_bits_retain(self.header_word(HEADER_FLAGS))
    }

    /// Set the object flags.
    ///
    /// # Errors
    /// See [`ResourceHandle::make_writeable`].
    pub fn set_flags(&mut self, flags: ObjectFlags) -> Result<()> {
        write_header(self.handle.make_writeable()?, HEADER_FLAGS, flags.bits());
        Ok(())
    }

    /// Returns the class version.
    #[must_use]
    pub fn version(&self) -> i32 {
        self.header_word(HEADER_VERSION) as i32
    }

    /// Set the class version.
    ///
    /// # Errors
    /// See [`ResourceHandle::make_writeable`].
    pub fn set_version(&mut self, version: i32) -> Result<()> {
        write_header(self.handle.make_writeable()?, HEADER_VERSION, version as u32);
        Ok(())
    }

    /// Returns the raw template name without its terminator.
    #[must_use]
    pub fn name_bytes(&self) -> &[u8] {
        let field = self
            .handle
            .storage()
            .bytes()
            .get(HEADER_NAME..HEADER_NAME + NAME_SIZE)
            .unwrap_or(&[]);
        let len = field.iter().position(|&b| b == 0).unwrap_or(field.len());
        &field[..len]
    }

    /// Returns the template name.
    #[must_use]
    pub fn name(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.name_bytes())
    }

    /// Set the template name, truncated to 11 bytes.
    ///
    /// # Errors
    /// See [`ResourceHandle::make_writeable`].
    pub fn set_name(&mut self, name: &str) -> Result<()> {
        write_name(self.handle.make_writeable()?, name);
        Ok(())
    }

    /// Returns the size of the body.
    #[must_use]
    pub fn body_size(&self) -> usize {
        self.handle.storage().body_size()
    }

    /// Check that the object is of class `class_id`.
    ///
    /// # Errors
    /// Returns [`Error::ClassMismatch`] otherwise.
    pub fn check_class_id(&self, class_id: u32) -> Result<()> {
        if self.class_id() == class_id {
            Ok(())
        } else {
            Err(Error::ClassMismatch {
                name: self.name().into_owned(),
                found: self.class_id(),
                expected: class_id,
            })
        }
    }

    /// Insert the body of `component` at body offset `offset`.
    ///
    /// # Errors
    /// Returns [`Error::RangeError`] for an offset past the end of the body, or any error of
    /// making this object or the component writeable.
    pub fn insert_component(&mut self, offset: usize, component: &ResourceHandle) -> Result<()> {
        let incoming = component.to_owned_record()?;
        self.handle.make_writeable()?.insert(offset, &incoming)
    }

    /// Replace the `old_size` bytes at `offset` with the body of `component`.
    ///
    /// # Errors
    /// See [`ResObject::insert_component`].
    pub fn replace_component(
        &mut self,
        offset: usize,
        old_size: usize,
        component: &ResourceHandle,
    ) -> Result<()> {
        let incoming = component.to_owned_record()?;
        self.handle
            .make_writeable()?
            .replace(offset, old_size, &incoming)
    }

    /// Remove the `size` bytes at `offset` together with their texts and relocations.
    ///
    /// # Errors
    /// See [`ResObject::insert_component`].
    pub fn erase_component(&mut self, offset: usize, size: usize) -> Result<()> {
        self.handle.make_writeable()?.erase(offset, size)
    }

    /// Returns a handle to the `size` byte component at `offset`.
    ///
    /// # Errors
    /// Returns [`Error::RangeError`] if the component does not lie inside the body.
    pub fn component(&self, offset: usize, size: usize) -> Result<ResourceHandle> {
        Ok(ResourceHandle::from_storage(
            self.handle.storage().component(offset, size)?,
        ))
    }
}

impl Deref for ResObject {
    type Target = ResourceHandle;

    fn deref(&self) -> &Self::Target {
        &self.handle
    }
}

impl DerefMut for ResObject {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.handle
    }
}

/// `record` must carry a complete object header.
fn write_header(record: &mut OwnedRecord, offset: usize, value: u32) {
    record.bytes_mut()[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

/// `record` must carry a complete object header.
fn write_name(record: &mut OwnedRecord, name: &str) {
    let bytes = name.as_bytes();
    let len = bytes.len().min(NAME_SIZE - 1);
    let field = &mut record.bytes_mut()[HEADER_NAME..HEADER_NAME + NAME_SIZE];
    field.fill(0);
    field[..len].copy_from_slice(&bytes[..len]);
}
