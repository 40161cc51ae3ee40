//! Copy-on-write handles to record storage.
//!
//! A [`ResourceHandle`] is the value every typed resource wraps. Cloning a handle shares the
//! underlying [`RecordStorage`]. Reads go straight to the shared storage, writes go through
//! [`ResourceHandle::make_writeable`], which gives the handle its own owned copy first when
//! the storage is shared or read-only. Other handles keep seeing the storage as it was.

use std::sync::Arc;

use log::debug;

use crate::{
    res::{
        arena::TextKind,
        reference::SpriteArea,
        relocation::Relocation,
        storage::{OwnedRecord, RecordStorage},
    },
    Error, Result,
};

/// A shared, copy-on-write reference to a record.
#[derive(Debug, Clone)]
pub struct ResourceHandle {
    storage: Arc<RecordStorage>,
    type_relocations: Option<&'static [Relocation]>,
}

impl ResourceHandle {
    /// Wrap a writeable record.
    #[must_use]
    pub fn from_owned(record: OwnedRecord) -> Self {
        Self::from_storage(RecordStorage::Owned(record))
    }

    /// Wrap any record storage.
    #[must_use]
    pub fn from_storage(storage: RecordStorage) -> Self {
        ResourceHandle {
            storage: Arc::new(storage),
            type_relocations: None,
        }
    }

    /// Attach the relocation table of the record's type.
    ///
    /// The table is used to make a read-only record writeable when the loader did not keep
    /// the record's own table.
    #[must_use]
    pub fn with_type_relocations(mut self, relocations: &'static [Relocation]) -> Self {
        self.type_relocations = Some(relocations);
        self
    }

    /// Returns the type relocation table attached to this handle.
    #[must_use]
    pub fn type_relocations(&self) -> Option<&'static [Relocation]> {
        self.type_relocations
    }

    /// Returns the shared storage.
    #[must_use]
    pub fn storage(&self) -> &RecordStorage {
        &self.storage
    }

    /// Returns true if the record is a read-only view of a loaded file.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.storage.is_read_only()
    }

    /// Returns true if the record is owned and no other handle shares it.
    #[must_use]
    pub fn unique(&self) -> bool {
        !self.storage.is_read_only() && Arc::strong_count(&self.storage) == 1
    }

    /// Returns true if both handles share the same storage.
    #[must_use]
    pub fn ptr_eq(&self, other: &ResourceHandle) -> bool {
        Arc::ptr_eq(&self.storage, &other.storage)
    }

    /// Return a second handle sharing this writeable record.
    ///
    /// # Errors
    /// Returns [`Error::InvalidOperation`] for a read-only record, which has to be made
    /// writeable first.
    pub fn share(&self) -> Result<ResourceHandle> {
        if self.storage.is_read_only() {
            return Err(Error::InvalidOperation(
                "A read-only record can not be shared for writing".to_string(),
            ));
        }
        Ok(self.clone())
    }

    /// Returns exclusive access to an owned copy of the record.
    ///
    /// Read-only storage is copied out of its image using the loader's relocation table or
    /// the type relocation table of this handle. Shared storage is cloned.
    ///
    /// # Errors
    /// Returns [`Error::InvalidOperation`] if a read-only record has no relocation table and
    /// [`Error::Malformed`] if its image data is inconsistent.
    pub fn make_writeable(&mut self) -> Result<&mut OwnedRecord> {
        self.promote(self.type_relocations)
    }

    /// Same as [`ResourceHandle::make_writeable`], promoting a read-only record with
    /// `relocations` if the loader did not keep its table.
    ///
    /// # Errors
    /// See [`ResourceHandle::make_writeable`].
    pub fn make_writeable_with(&mut self, relocations: &[Relocation]) -> Result<&mut OwnedRecord> {
        self.promote(Some(relocations))
    }

    fn promote(&mut self, table: Option<&[Relocation]>) -> Result<&mut OwnedRecord> {
        if let RecordStorage::Borrowed(view) = &*self.storage {
            let owned = view.to_owned_record(table)?;
            self.storage = Arc::new(RecordStorage::Owned(owned));
        } else if Arc::strong_count(&self.storage) > 1 {
            debug!("Copying shared record before modification");
        }

        match Arc::make_mut(&mut self.storage) {
            RecordStorage::Owned(record) => Ok(record),
            RecordStorage::Borrowed(_) => Err(Error::InvalidOperation(
                "Record is still read-only".to_string(),
            )),
        }
    }

    /// Returns an owned copy of the record without changing this handle.
    ///
    /// # Errors
    /// Same as [`ResourceHandle::make_writeable`].
    pub fn to_owned_record(&self) -> Result<OwnedRecord> {
        match &*self.storage {
            RecordStorage::Owned(record) => Ok(record.clone()),
            RecordStorage::Borrowed(view) => view.to_owned_record(self.type_relocations),
        }
    }

    /// Returns the signed word at `offset`.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if the field lies outside of the body.
    pub fn int_value(&self, offset: usize) -> Result<i32> {
        self.storage.int_value(offset)
    }

    /// Returns the unsigned word at `offset`.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if the field lies outside of the body.
    pub fn uint_value(&self, offset: usize) -> Result<u32> {
        self.storage.uint_value(offset)
    }

    /// Returns the byte at `offset`.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if the field lies outside of the body.
    pub fn byte_value(&self, offset: usize) -> Result<u8> {
        self.storage.byte_value(offset)
    }

    /// Returns the unsigned half word at `offset`.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if the field lies outside of the body.
    pub fn ushort_value(&self, offset: usize) -> Result<u16> {
        self.storage.ushort_value(offset)
    }

    /// Returns true if any bit of `mask` is set in the word at `offset`.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if the field lies outside of the body.
    pub fn flag(&self, offset: usize, mask: u32) -> Result<bool> {
        self.storage.flag(offset, mask)
    }

    /// Returns the bits of `mask` in the word at `offset`.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if the field lies outside of the body.
    pub fn flag_value(&self, offset: usize, mask: u32) -> Result<u32> {
        self.storage.flag_value(offset, mask)
    }

    /// Returns the string or message referenced at `offset`.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] or [`Error::Malformed`] for a slot or text that can
    /// not be read.
    pub fn text(&self, offset: usize) -> Result<Option<&str>> {
        self.storage.text(offset)
    }

    /// Returns the body offset referenced by the object slot at `offset`.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] or [`Error::Malformed`] for a slot that can not be read.
    pub fn object_ref(&self, offset: usize) -> Result<Option<usize>> {
        self.storage.object_ref(offset)
    }

    /// Returns the sprite area referenced at `offset`.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] for a slot that can not be read.
    pub fn sprite_area_ref(&self, offset: usize) -> Result<Option<SpriteArea>> {
        self.storage.sprite_area_ref(offset)
    }

    /// Write a signed word.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if the field lies outside of the body, or any error of
    /// [`ResourceHandle::make_writeable`].
    pub fn set_int(&mut self, offset: usize, value: i32) -> Result<()> {
        self.make_writeable()?.set_int(offset, value)
    }

    /// Write an unsigned word.
    ///
    /// # Errors
    /// See [`ResourceHandle::set_int`].
    pub fn set_uint(&mut self, offset: usize, value: u32) -> Result<()> {
        self.make_writeable()?.set_uint(offset, value)
    }

    /// Write a byte.
    ///
    /// # Errors
    /// See [`ResourceHandle::set_int`].
    pub fn set_byte(&mut self, offset: usize, value: u8) -> Result<()> {
        self.make_writeable()?.set_byte(offset, value)
    }

    /// Write an unsigned half word.
    ///
    /// # Errors
    /// See [`ResourceHandle::set_int`].
    pub fn set_ushort(&mut self, offset: usize, value: u16) -> Result<()> {
        self.make_writeable()?.set_ushort(offset, value)
    }

    /// Set or clear the bits of `mask` in the word at `offset`.
    ///
    /// # Errors
    /// See [`ResourceHandle::set_int`].
    pub fn set_flag(&mut self, offset: usize, mask: u32, on: bool) -> Result<()> {
        self.make_writeable()?.set_flag(offset, mask, on)
    }

    /// Replace the bits of `mask` in the word at `offset`.
    ///
    /// # Errors
    /// See [`ResourceHandle::set_int`].
    pub fn set_flag_value(&mut self, offset: usize, mask: u32, value: u32) -> Result<()> {
        self.make_writeable()?.set_flag_value(offset, mask, value)
    }

    /// Set the string referenced at `offset`.
    ///
    /// # Errors
    /// See [`OwnedRecord::set_text`].
    pub fn set_string(&mut self, offset: usize, value: Option<&str>) -> Result<()> {
        self.make_writeable()?
            .set_text(offset, value, TextKind::String)
    }

    /// Set the message referenced at `offset`.
    ///
    /// # Errors
    /// See [`OwnedRecord::set_text`].
    pub fn set_message(&mut self, offset: usize, value: Option<&str>) -> Result<()> {
        self.make_writeable()?
            .set_text(offset, value, TextKind::Message)
    }

    /// Set a string with a buffer size word at `offset + 4`.
    ///
    /// # Errors
    /// See [`OwnedRecord::set_text_with_length`].
    pub fn set_string_with_length(
        &mut self,
        offset: usize,
        value: Option<&str>,
        max: Option<i32>,
    ) -> Result<()> {
        self.make_writeable()?
            .set_text_with_length(offset, value, max, TextKind::String)
    }

    /// Set a message with a buffer size word at `offset + 4`.
    ///
    /// # Errors
    /// See [`OwnedRecord::set_text_with_length`].
    pub fn set_message_with_length(
        &mut self,
        offset: usize,
        value: Option<&str>,
        max: Option<i32>,
    ) -> Result<()> {
        self.make_writeable()?
            .set_text_with_length(offset, value, max, TextKind::Message)
    }

    /// Point the object slot at `offset` to a body offset.
    ///
    /// # Errors
    /// See [`OwnedRecord::set_object_ref`].
    pub fn set_object_ref(&mut self, offset: usize, target: Option<usize>) -> Result<()> {
        self.make_writeable()?.set_object_ref(offset, target)
    }

    /// Set the sprite area slot at `offset`.
    ///
    /// # Errors
    /// See [`OwnedRecord::set_sprite_area_ref`].
    pub fn set_sprite_area_ref(&mut self, offset: usize, area: Option<SpriteArea>) -> Result<()> {
        self.make_writeable()?.set_sprite_area_ref(offset, area)
    }
}
