//! Record storage: owned records and read-only image views.
//!
//! A record is a byte buffer made of an optional header followed by a body of typed fields.
//! Top level objects have a 36 byte header, components embedded in another record's body
//! (menu items, gadgets, shortcuts) have none and a body offset of 0.
//!
//! # Key Components
//!
//! - [`OwnedRecord`] - A writeable record: bytes plus [`RecordData`]
//! - [`ImageView`] - A read-only record inside a relocated [`Image`]
//! - [`RecordStorage`] - Either of the two, the value shared by resource handles
//!
//! # Read-only views
//!
//! The slots of a view have been rewritten to image-absolute positions when the file was
//! loaded: `0` is null, texts are NUL-terminated strings at that position and object
//! references point to the referenced body byte. Reading a field therefore never copies.
//! Writing requires turning the view into an [`OwnedRecord`], which needs the relocation
//! table of the record: either the one kept by the loader or a table supplied by the
//! caller.
//!
//! # Structural edits
//!
//! [`OwnedRecord::insert`], [`OwnedRecord::replace`] and [`OwnedRecord::erase`] validate the
//! range and collect everything they need before the first byte changes. The header of a
//! top level record is kept in sync with the new body size.

use std::sync::Arc;

use log::debug;

use crate::{
    file::{
        io::{read_c_str, read_le_at, write_le_at, ResIO},
        Image,
    },
    res::{
        arena::TextKind,
        data::RecordData,
        object::{HEADER_BODY_OFFSET, HEADER_BODY_SIZE, HEADER_SIZE},
        reference::{Reference, SpriteArea},
        relocation::{Relocation, RelocationEntry, RelocationKind, RelocationTable},
    },
    Error, Result,
};

fn read_field<T: ResIO>(body: &[u8], offset: usize) -> Result<T> {
    let mut offset = offset;
    read_le_at(body, &mut offset)
}

fn write_field<T: ResIO>(body: &mut [u8], offset: usize, value: T) -> Result<()> {
    let mut offset = offset;
    write_le_at(body, &mut offset, value)
}

fn range_error(offset: usize, size: usize, limit: usize) -> Error {
    Error::RangeError {
        offset,
        size,
        limit,
    }
}

fn check_range(offset: usize, size: usize, limit: usize) -> Result<()> {
    match offset.checked_add(size) {
        Some(end) if end <= limit => Ok(()),
        _ => Err(range_error(offset, size, limit)),
    }
}

/// A writeable record.
///
/// Relocation slots in `bytes` hold zero, their targets live in [`RecordData`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedRecord {
    bytes: Vec<u8>,
    body_offset: usize,
    data: RecordData,
}

impl OwnedRecord {
    /// Create a record of zeros with a `body_offset` byte header and a `body_size` byte body.
    #[must_use]
    pub fn zeroed(body_offset: usize, body_size: usize) -> Self {
        let mut record = OwnedRecord {
            bytes: vec![0; body_offset + body_size],
            body_offset,
            data: RecordData::new(),
        };
        record.sync_header();
        record
    }

    /// Assemble a record from its parts.
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] if `body_offset` lies past the end of `bytes`.
    pub fn from_parts(bytes: Vec<u8>, body_offset: usize, data: RecordData) -> Result<Self> {
        if body_offset > bytes.len() {
            return Err(malformed_error!(
                "Body offset {} past the end of a record of {} bytes",
                body_offset,
                bytes.len()
            ));
        }
        Ok(OwnedRecord {
            bytes,
            body_offset,
            data,
        })
    }

    /// Returns the header and body bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Returns the body bytes.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.bytes[self.body_offset..]
    }

    /// Returns the offset of the body in the record.
    #[must_use]
    pub fn body_offset(&self) -> usize {
        self.body_offset
    }

    /// Returns the size of the body in bytes.
    #[must_use]
    pub fn body_size(&self) -> usize {
        self.bytes.len() - self.body_offset
    }

    /// Returns the relocations and texts.
    #[must_use]
    pub fn data(&self) -> &RecordData {
        &self.data
    }

    /// Returns the relocation table.
    #[must_use]
    pub fn relocations(&self) -> &RelocationTable {
        self.data.relocations()
    }

    /// Write a signed word into the body.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if the field lies outside of the body.
    pub fn set_int(&mut self, offset: usize, value: i32) -> Result<()> {
        let body_offset = self.body_offset;
        write_field(&mut self.bytes[body_offset..], offset, value)
    }

    /// Write an unsigned word into the body.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if the field lies outside of the body.
    pub fn set_uint(&mut self, offset: usize, value: u32) -> Result<()> {
        let body_offset = self.body_offset;
        write_field(&mut self.bytes[body_offset..], offset, value)
    }

    /// Write a byte into the body.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if the field lies outside of the body.
    pub fn set_byte(&mut self, offset: usize, value: u8) -> Result<()> {
        let body_offset = self.body_offset;
        write_field(&mut self.bytes[body_offset..], offset, value)
    }

    /// Write an unsigned half word into the body.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if the field lies outside of the body.
    pub fn set_ushort(&mut self, offset: usize, value: u16) -> Result<()> {
        let body_offset = self.body_offset;
        write_field(&mut self.bytes[body_offset..], offset, value)
    }

    /// Set or clear the bits of `mask` in the word at `offset`.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if the field lies outside of the body.
    pub fn set_flag(&mut self, offset: usize, mask: u32, on: bool) -> Result<()> {
        let word: u32 = read_field(self.body(), offset)?;
        self.set_uint(offset, if on { word | mask } else { word & !mask })
    }

    /// Replace the bits of `mask` in the word at `offset` with those of `value`.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if the field lies outside of the body.
    pub fn set_flag_value(&mut self, offset: usize, mask: u32, value: u32) -> Result<()> {
        let word: u32 = read_field(self.body(), offset)?;
        self.set_uint(offset, (word & !mask) | (value & mask))
    }

    /// Returns the text referenced by the slot at `offset`.
    ///
    /// # Errors
    /// See [`RecordData::text`].
    pub fn text(&self, offset: usize) -> Result<Option<&str>> {
        self.data.text(offset)
    }

    /// Set the text referenced by the slot at `offset`.
    ///
    /// # Errors
    /// Returns [`Error::RangeError`] if the slot lies outside of the body, otherwise see
    /// [`RecordData::set_text`].
    pub fn set_text(&mut self, offset: usize, value: Option<&str>, kind: TextKind) -> Result<()> {
        check_range(offset, 4, self.body_size())?;
        self.data.set_text(offset, value, kind)
    }

    /// Set a text together with its buffer size word at `offset + 4`.
    ///
    /// The buffer size becomes `max` if given, or stays as it is, and is then grown to hold
    /// `value` and its terminator. It is never reduced below that.
    ///
    /// # Errors
    /// Same as [`OwnedRecord::set_text`].
    pub fn set_text_with_length(
        &mut self,
        offset: usize,
        value: Option<&str>,
        max: Option<i32>,
        kind: TextKind,
    ) -> Result<()> {
        check_range(offset, 8, self.body_size())?;
        self.data.set_text(offset, value, kind)?;

        let needed = value.map_or(0, |v| i32::try_from(v.len() + 1).unwrap_or(i32::MAX));
        let current = match max {
            Some(max) => max,
            None => read_field::<i32>(self.body(), offset + 4)?,
        };
        self.set_int(offset + 4, current.max(needed))
    }

    /// Returns the body offset referenced by the object slot at `offset`.
    #[must_use]
    pub fn object_ref(&self, offset: usize) -> Option<usize> {
        self.data.object_ref(offset)
    }

    /// Point the object slot at `offset` to the body offset `target`.
    ///
    /// # Errors
    /// Returns [`Error::RangeError`] if the slot or the target lie outside of the body and
    /// [`Error::InvalidOperation`] if the slot holds another kind of reference.
    pub fn set_object_ref(&mut self, offset: usize, target: Option<usize>) -> Result<()> {
        check_range(offset, 4, self.body_size())?;
        if let Some(target) = target {
            check_range(target, 0, self.body_size())?;
        }
        self.data.set_object_ref(offset, target)
    }

    /// Returns the sprite area referenced by the slot at `offset`.
    #[must_use]
    pub fn sprite_area_ref(&self, offset: usize) -> Option<SpriteArea> {
        self.data.sprite_area_ref(offset)
    }

    /// Set the sprite area slot at `offset`.
    ///
    /// # Errors
    /// Returns [`Error::RangeError`] if the slot lies outside of the body and
    /// [`Error::InvalidOperation`] if the slot holds another kind of reference.
    pub fn set_sprite_area_ref(&mut self, offset: usize, area: Option<SpriteArea>) -> Result<()> {
        check_range(offset, 4, self.body_size())?;
        self.data.set_sprite_area_ref(offset, area)
    }

    pub(crate) fn init_text(&mut self, offset: usize, kind: TextKind, value: Option<&str>) {
        self.data.init_text(offset, kind, value);
    }

    pub(crate) fn init_object_ref(&mut self, offset: usize, target: Option<usize>) {
        self.data.init_object_ref(offset, target);
    }

    pub(crate) fn init_sprite_area_ref(&mut self, offset: usize, area: Option<SpriteArea>) {
        self.data.init_sprite_area_ref(offset, area);
    }

    /// Set the body word at `offset` of a record under construction.
    ///
    /// `offset` must lie inside the body.
    pub(crate) fn init_word(&mut self, offset: usize, value: u32) {
        let at = self.body_offset + offset;
        self.bytes[at..at + 4].copy_from_slice(&value.to_le_bytes());
    }

    /// Splice the body of `other` into this body at `offset`.
    ///
    /// Relocations at or after `offset` move up, then the relocations and texts of `other`
    /// are added at their new position.
    ///
    /// # Errors
    /// Returns [`Error::RangeError`] if `offset` lies past the end of the body and
    /// [`Error::Malformed`] if `other` holds an invalid text.
    pub fn insert(&mut self, offset: usize, other: &OwnedRecord) -> Result<()> {
        check_range(offset, 0, self.body_size())?;
        let incoming = other.data.detach()?;

        let at = self.body_offset + offset;
        let len = other.body_size();
        self.bytes
            .splice(at..at, other.body().iter().copied());
        self.data.relocations_mut().fix_after_insert(offset, len);
        self.data.attach(offset, incoming);
        self.sync_header();

        debug!("Inserted {} bytes at body offset {}", len, offset);
        Ok(())
    }

    /// Replace the `old_size` bytes at `offset` with the body of `other`.
    ///
    /// # Errors
    /// Returns [`Error::RangeError`] if the range lies outside of the body and
    /// [`Error::Malformed`] if a text involved is invalid.
    pub fn replace(&mut self, offset: usize, old_size: usize, other: &OwnedRecord) -> Result<()> {
        check_range(offset, old_size, self.body_size())?;
        let incoming = other.data.detach()?;

        self.data.remove_data(offset, old_size)?;

        let at = self.body_offset + offset;
        let new_size = other.body_size();
        self.bytes
            .splice(at..at + old_size, other.body().iter().copied());

        let diff = isize::try_from(new_size).unwrap_or(isize::MAX)
            - isize::try_from(old_size).unwrap_or(isize::MAX);
        self.data
            .relocations_mut()
            .fix_offsets(offset, old_size, diff);
        self.data.attach(offset, incoming);
        self.sync_header();

        debug!(
            "Replaced {} bytes at body offset {} with {} bytes",
            old_size, offset, new_size
        );
        Ok(())
    }

    /// Remove the `size` bytes at `offset` together with the texts and relocations they own.
    ///
    /// # Errors
    /// Returns [`Error::RangeError`] if the range lies outside of the body and
    /// [`Error::Malformed`] if a text involved is invalid.
    pub fn erase(&mut self, offset: usize, size: usize) -> Result<()> {
        check_range(offset, size, self.body_size())?;
        self.data.remove_data(offset, size)?;

        let at = self.body_offset + offset;
        self.bytes.drain(at..at + size);
        self.data.relocations_mut().fix_offsets(
            offset,
            size,
            -isize::try_from(size).unwrap_or(isize::MAX),
        );
        self.sync_header();

        debug!("Erased {} bytes at body offset {}", size, offset);
        Ok(())
    }

    /// Copy the `size` bytes at `offset` out as a header-less record.
    ///
    /// # Errors
    /// Returns [`Error::RangeError`] if the range lies outside of the body and
    /// [`Error::Malformed`] if a text involved is invalid.
    pub fn component(&self, offset: usize, size: usize) -> Result<OwnedRecord> {
        check_range(offset, size, self.body_size())?;
        Ok(OwnedRecord {
            bytes: self.body()[offset..offset + size].to_vec(),
            body_offset: 0,
            data: self.data.component(offset, size)?,
        })
    }

    /// Rebuild text tables that are not tightly packed, see [`RecordData::normalise`].
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] if a text target is invalid.
    pub fn normalise(&mut self) -> Result<bool> {
        self.data.normalise()
    }

    fn sync_header(&mut self) {
        if self.body_offset < HEADER_SIZE {
            return;
        }
        let body_size = u32::try_from(self.body_size()).unwrap_or(u32::MAX);
        let body_offset = u32::try_from(self.body_offset).unwrap_or(u32::MAX);
        self.bytes[HEADER_BODY_SIZE..HEADER_BODY_SIZE + 4].copy_from_slice(&body_size.to_le_bytes());
        self.bytes[HEADER_BODY_OFFSET..HEADER_BODY_OFFSET + 4]
            .copy_from_slice(&body_offset.to_le_bytes());
    }
}

/// A read-only record inside a relocated image.
#[derive(Debug, Clone)]
pub struct ImageView {
    image: Arc<Image>,
    header_pos: usize,
    body_offset: usize,
    size: usize,
    relocations: Option<Arc<[Relocation]>>,
}

impl ImageView {
    /// Create a view of the `size` byte record at `header_pos`.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if the record does not lie inside the image.
    pub(crate) fn new(
        image: Arc<Image>,
        header_pos: usize,
        body_offset: usize,
        size: usize,
        relocations: Option<Arc<[Relocation]>>,
    ) -> Result<Self> {
        image.data_slice(header_pos, size)?;
        if body_offset > size {
            return Err(out_of_bounds_error!());
        }
        Ok(ImageView {
            image,
            header_pos,
            body_offset,
            size,
            relocations,
        })
    }

    /// Returns the header and body bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        self.image
            .data()
            .get(self.header_pos..self.header_pos + self.size)
            .unwrap_or(&[])
    }

    /// Returns the body bytes.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        self.bytes().get(self.body_offset..).unwrap_or(&[])
    }

    /// Returns the offset of the body in the record.
    #[must_use]
    pub fn body_offset(&self) -> usize {
        self.body_offset
    }

    /// Returns the size of the body in bytes.
    #[must_use]
    pub fn body_size(&self) -> usize {
        self.size - self.body_offset
    }

    /// Returns the relocations kept by the loader.
    #[must_use]
    pub fn relocations(&self) -> Option<&[Relocation]> {
        self.relocations.as_deref()
    }

    fn body_pos(&self) -> usize {
        self.header_pos + self.body_offset
    }

    /// Returns the text at the image position held by the slot at `offset`.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if the slot or the text lie outside of the image and
    /// [`Error::Malformed`] if the text is unterminated.
    pub fn text(&self, offset: usize) -> Result<Option<&str>> {
        let word: u32 = read_field(self.body(), offset)?;
        if word == 0 {
            return Ok(None);
        }
        read_c_str(self.image.data(), word as usize).map(Some)
    }

    /// Returns the body offset referenced by the object slot at `offset`.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if the slot lies outside of the body and
    /// [`Error::Malformed`] if the reference points before the body.
    pub fn object_ref(&self, offset: usize) -> Result<Option<usize>> {
        let word: u32 = read_field(self.body(), offset)?;
        Ok(Reference::from_image(RelocationKind::ObjectRef, word, self.body_pos())?.object_offset())
    }

    /// Returns the sprite area referenced by the slot at `offset`.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if the slot lies outside of the body.
    pub fn sprite_area_ref(&self, offset: usize) -> Result<Option<SpriteArea>> {
        let word: u32 = read_field(self.body(), offset)?;
        Ok((word != 0).then_some(SpriteArea(word)))
    }

    /// A view of the header-less sub-record at `[offset, offset + size)` of the body.
    ///
    /// # Errors
    /// Returns [`Error::RangeError`] if the range lies outside of the body.
    pub fn component(&self, offset: usize, size: usize) -> Result<ImageView> {
        check_range(offset, size, self.body_size())?;
        let relocations = self.relocations.as_ref().map(|relocations| {
            relocations
                .iter()
                .filter(|r| r.offset >= offset && r.offset < offset + size)
                .map(|r| Relocation::new(r.offset - offset, r.kind))
                .collect::<Arc<[Relocation]>>()
        });
        Ok(ImageView {
            image: Arc::clone(&self.image),
            header_pos: self.body_pos() + offset,
            body_offset: 0,
            size,
            relocations,
        })
    }

    /// Copy the view into a writeable record.
    ///
    /// The relocations kept by the loader are used if there are any, otherwise `table`.
    /// Texts are copied out of the image, object references leaving the view become null.
    ///
    /// # Errors
    /// Returns [`Error::InvalidOperation`] if no relocation table is available and
    /// [`Error::Malformed`] if a slot or text lies outside of the image.
    pub fn to_owned_record(&self, table: Option<&[Relocation]>) -> Result<OwnedRecord> {
        let Some(relocations) = self.relocations().or(table) else {
            return Err(Error::InvalidOperation(
                "Read-only record has no relocation table to make it writeable".to_string(),
            ));
        };

        let mut bytes = self.bytes().to_vec();
        let mut data = RecordData::new();
        let body_size = self.body_size();
        let body_pos = self.body_pos();

        for relocation in relocations {
            let slot = self.body_offset + relocation.offset;
            let word: u32 = read_field(&bytes, slot).map_err(|_| {
                malformed_error!(
                    "Relocation at {} outside of a body of {} bytes",
                    relocation.offset,
                    body_size
                )
            })?;

            let target = match relocation.kind {
                RelocationKind::ObjectRef => (word as usize)
                    .checked_sub(body_pos)
                    .filter(|&offset| word != 0 && offset <= body_size)
                    .map_or(Reference::Null, Reference::Object),
                kind => Reference::from_image(kind, word, body_pos)?,
            };

            let target = match (target, relocation.kind.text_kind()) {
                (Reference::Text(pos), Some(kind)) => {
                    Reference::Text(data.push_text(kind, read_c_str(self.image.data(), pos)?))
                }
                (target, _) => target,
            };

            write_field(&mut bytes, slot, 0_u32)?;
            data.relocations_mut().insert_entry(RelocationEntry {
                offset: relocation.offset,
                kind: relocation.kind,
                target,
            });
        }

        debug!(
            "Copied read-only record of {} bytes with {} relocations",
            self.size,
            relocations.len()
        );
        OwnedRecord::from_parts(bytes, self.body_offset, data)
    }
}

/// The storage shared by resource handles.
#[derive(Debug, Clone)]
pub enum RecordStorage {
    /// A writeable record
    Owned(OwnedRecord),
    /// A read-only view of a loaded image
    Borrowed(ImageView),
}

impl RecordStorage {
    /// Returns true for a read-only view.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        matches!(self, RecordStorage::Borrowed(_))
    }

    /// Returns the header and body bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        match self {
            RecordStorage::Owned(record) => record.bytes(),
            RecordStorage::Borrowed(view) => view.bytes(),
        }
    }

    /// Returns the body bytes.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        match self {
            RecordStorage::Owned(record) => record.body(),
            RecordStorage::Borrowed(view) => view.body(),
        }
    }

    /// Returns the offset of the body in the record.
    #[must_use]
    pub fn body_offset(&self) -> usize {
        match self {
            RecordStorage::Owned(record) => record.body_offset(),
            RecordStorage::Borrowed(view) => view.body_offset(),
        }
    }

    /// Returns the size of the body in bytes.
    #[must_use]
    pub fn body_size(&self) -> usize {
        match self {
            RecordStorage::Owned(record) => record.body_size(),
            RecordStorage::Borrowed(view) => view.body_size(),
        }
    }

    /// Returns the signed word at `offset`.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if the field lies outside of the body.
    pub fn int_value(&self, offset: usize) -> Result<i32> {
        read_field(self.body(), offset)
    }

    /// Returns the unsigned word at `offset`.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if the field lies outside of the body.
    pub fn uint_value(&self, offset: usize) -> Result<u32> {
        read_field(self.body(), offset)
    }

    /// Returns the byte at `offset`.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if the field lies outside of the body.
    pub fn byte_value(&self, offset: usize) -> Result<u8> {
        read_field(self.body(), offset)
    }

    /// Returns the unsigned half word at `offset`.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if the field lies outside of the body.
    pub fn ushort_value(&self, offset: usize) -> Result<u16> {
        read_field(self.body(), offset)
    }

    /// Returns true if any bit of `mask` is set in the word at `offset`.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if the field lies outside of the body.
    pub fn flag(&self, offset: usize, mask: u32) -> Result<bool> {
        Ok(self.uint_value(offset)? & mask != 0)
    }

    /// Returns the bits of `mask` in the word at `offset`.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if the field lies outside of the body.
    pub fn flag_value(&self, offset: usize, mask: u32) -> Result<u32> {
        Ok(self.uint_value(offset)? & mask)
    }

    /// Returns the string or message referenced by the slot at `offset`.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] or [`Error::Malformed`] for slots or texts that can
    /// not be read.
    pub fn text(&self, offset: usize) -> Result<Option<&str>> {
        match self {
            RecordStorage::Owned(record) => record.text(offset),
            RecordStorage::Borrowed(view) => view.text(offset),
        }
    }

    /// Returns the body offset referenced by the object slot at `offset`.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] or [`Error::Malformed`] for a read-only slot that can
    /// not be read.
    pub fn object_ref(&self, offset: usize) -> Result<Option<usize>> {
        match self {
            RecordStorage::Owned(record) => Ok(record.object_ref(offset)),
            RecordStorage::Borrowed(view) => view.object_ref(offset),
        }
    }

    /// Returns the sprite area referenced by the slot at `offset`.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] for a read-only slot outside of the body.
    pub fn sprite_area_ref(&self, offset: usize) -> Result<Option<SpriteArea>> {
        match self {
            RecordStorage::Owned(record) => Ok(record.sprite_area_ref(offset)),
            RecordStorage::Borrowed(view) => view.sprite_area_ref(offset),
        }
    }

    /// Extract the `size` bytes at `offset` as a header-less record.
    ///
    /// Owned storage is copied, a read-only view yields a narrower view.
    ///
    /// # Errors
    /// Returns [`Error::RangeError`] if the range lies outside of the body.
    pub fn component(&self, offset: usize, size: usize) -> Result<RecordStorage> {
        Ok(match self {
            RecordStorage::Owned(record) => RecordStorage::Owned(record.component(offset, size)?),
            RecordStorage::Borrowed(view) => RecordStorage::Borrowed(view.component(offset, size)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component_with_text(size: usize, text: &str) -> OwnedRecord {
        let mut record = OwnedRecord::zeroed(0, size);
        record.set_int(0, 7).unwrap();
        record.set_text(4, Some(text), TextKind::Message).unwrap();
        record
    }

    #[test]
    fn typed_fields() {
        let mut record = OwnedRecord::zeroed(0, 8);
        record.set_int(0, -1).unwrap();
        record.set_ushort(4, 0x1234).unwrap();
        record.set_byte(6, 0xAB).unwrap();

        let storage = RecordStorage::Owned(record.clone());
        assert_eq!(storage.int_value(0).unwrap(), -1);
        assert_eq!(storage.uint_value(0).unwrap(), u32::MAX);
        assert_eq!(storage.ushort_value(4).unwrap(), 0x1234);
        assert_eq!(storage.byte_value(6).unwrap(), 0xAB);
        assert!(matches!(storage.int_value(6), Err(Error::OutOfBounds { .. })));

        record.set_uint(0, 0).unwrap();
        record.set_flag(0, 0x100, true).unwrap();
        record.set_flag_value(0, 6, 4).unwrap();
        let storage = RecordStorage::Owned(record);
        assert!(storage.flag(0, 0x100).unwrap());
        assert_eq!(storage.flag_value(0, 6).unwrap(), 4);
        assert_eq!(storage.uint_value(0).unwrap(), 0x104);
    }

    #[test]
    fn header_follows_body_size() {
        let mut record = OwnedRecord::zeroed(HEADER_SIZE, 8);
        assert_eq!(read_field::<u32>(record.bytes(), HEADER_BODY_SIZE).unwrap(), 8);
        assert_eq!(read_field::<u32>(record.bytes(), HEADER_BODY_OFFSET).unwrap(), 36);

        record.insert(8, &component_with_text(12, "text")).unwrap();
        assert_eq!(record.body_size(), 20);
        assert_eq!(read_field::<u32>(record.bytes(), HEADER_BODY_SIZE).unwrap(), 20);

        record.erase(8, 12).unwrap();
        assert_eq!(read_field::<u32>(record.bytes(), HEADER_BODY_SIZE).unwrap(), 8);
        assert!(record.relocations().is_empty());
        assert!(record.data().arena().messages().is_empty());
    }

    #[test]
    fn init_word_writes_body_not_header() {
        let mut record = OwnedRecord::zeroed(HEADER_SIZE, 8);
        record.init_word(0, u32::MAX);
        record.init_word(4, 0x0700_0110);

        let storage = RecordStorage::Owned(record.clone());
        assert_eq!(storage.int_value(0).unwrap(), -1);
        assert_eq!(storage.uint_value(4).unwrap(), 0x0700_0110);
        assert_eq!(read_field::<u32>(record.bytes(), HEADER_BODY_SIZE).unwrap(), 8);
        assert_eq!(read_field::<u32>(record.bytes(), HEADER_BODY_OFFSET).unwrap(), 36);
    }

    #[test]
    fn insert_replace_erase() {
        let mut record = OwnedRecord::zeroed(0, 16);
        record.set_text(0, Some("parent"), TextKind::Message).unwrap();
        record.set_object_ref(8, Some(16)).unwrap();

        record.insert(16, &component_with_text(8, "first")).unwrap();
        record.insert(16, &component_with_text(8, "zero")).unwrap();
        assert_eq!(record.body_size(), 32);
        assert_eq!(record.object_ref(8), Some(32));
        assert_eq!(record.text(20).unwrap(), Some("zero"));
        assert_eq!(record.text(28).unwrap(), Some("first"));

        record.replace(16, 8, &component_with_text(12, "longer")).unwrap();
        assert_eq!(record.body_size(), 36);
        assert_eq!(record.text(20).unwrap(), Some("longer"));
        assert_eq!(record.text(32).unwrap(), Some("first"));
        assert_eq!(record.object_ref(8), Some(36));

        record.erase(16, 12).unwrap();
        assert_eq!(record.body_size(), 24);
        assert_eq!(record.text(20).unwrap(), Some("first"));
        assert_eq!(record.text(0).unwrap(), Some("parent"));
        assert_eq!(record.object_ref(8), Some(24));
        assert_eq!(record.data().arena().messages().used(), 13);
    }

    #[test]
    fn range_checks_come_first() {
        let mut record = OwnedRecord::zeroed(0, 16);
        record.set_text(0, Some("keep"), TextKind::String).unwrap();
        let before = record.clone();

        assert!(matches!(
            record.insert(17, &component_with_text(8, "x")),
            Err(Error::RangeError { offset: 17, .. })
        ));
        assert!(matches!(
            record.erase(12, 8),
            Err(Error::RangeError { limit: 16, .. })
        ));
        assert!(record.replace(usize::MAX, 2, &component_with_text(8, "x")).is_err());
        assert!(record.set_text(14, Some("x"), TextKind::String).is_err());
        assert!(record.set_object_ref(4, Some(20)).is_err());
        assert_eq!(record, before);
    }

    #[test]
    fn component_is_rebased() {
        let mut record = OwnedRecord::zeroed(0, 8);
        record.insert(8, &component_with_text(8, "inner")).unwrap();

        let component = record.component(8, 8).unwrap();
        assert_eq!(component.body_offset(), 0);
        assert_eq!(component.body_size(), 8);
        assert_eq!(component.text(4).unwrap(), Some("inner"));
        assert_eq!(RecordStorage::Owned(component).int_value(0).unwrap(), 7);
    }

    fn relocated_image() -> Arc<Image> {
        // header of 4 bytes, body: message slot -> 16, object slot -> 12, sprite slot, value
        #[rustfmt::skip]
        let data = vec![
            0xEE, 0xEE, 0xEE, 0xEE,
            0x10, 0x00, 0x00, 0x00,
            0x0C, 0x00, 0x00, 0x00,
            0x01, 0x00, 0x00, 0x00,
            b'H', b'i', 0x00, 0x00,
        ];
        Arc::new(Image::from_mem(data).unwrap())
    }

    #[test]
    fn image_view_reads() {
        let view = ImageView::new(relocated_image(), 0, 4, 16, None).unwrap();
        assert_eq!(view.body_size(), 12);
        assert_eq!(view.text(0).unwrap(), Some("Hi"));
        assert_eq!(view.object_ref(4).unwrap(), Some(8));
        assert_eq!(view.sprite_area_ref(8).unwrap(), Some(SpriteArea(1)));
        assert!(view.text(12).is_err());

        assert!(matches!(
            view.to_owned_record(None),
            Err(Error::InvalidOperation(_))
        ));
    }

    #[test]
    fn image_view_promotion() {
        let table = [
            Relocation::message(0),
            Relocation::object(4),
            Relocation::sprite_area(8),
        ];
        let view = ImageView::new(relocated_image(), 0, 4, 16, None).unwrap();
        let record = view.to_owned_record(Some(&table)).unwrap();

        assert_eq!(record.body(), &[0u8; 12]);
        assert_eq!(record.text(0).unwrap(), Some("Hi"));
        assert_eq!(record.object_ref(4), Some(8));
        assert_eq!(record.sprite_area_ref(8), Some(SpriteArea(1)));

        let part = view.component(4, 8).unwrap();
        assert_eq!(part.object_ref(0).unwrap(), Some(4));
        let kept = ImageView::new(relocated_image(), 0, 4, 16, Some(table.into()))
            .unwrap()
            .component(4, 8)
            .unwrap();
        assert_eq!(kept.relocations().unwrap(), &[Relocation::object(0), Relocation::sprite_area(4)]);
        let owned = kept.to_owned_record(None).unwrap();
        assert_eq!(owned.object_ref(0), Some(4));
    }
}
