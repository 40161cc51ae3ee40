//! Relocation tables.
//!
//! Every record that holds references (texts, sub-records, sprite areas) carries a relocation
//! table listing the body offsets of those 4-byte slots and the kind of reference each one
//! holds. The table is what allows a record to be moved between its on-disk offset form and
//! the in-memory form, and what has to be kept exact while bytes are inserted into or removed
//! from the body.
//!
//! # Key Components
//!
//! - [`RelocationKind`] - The four reference kinds of the file format
//! - [`Relocation`] - A bare `(offset, kind)` pair as stored on disk and in type tables
//! - [`RelocationEntry`] - A relocation together with its in-memory [`Reference`] target
//! - [`RelocationTable`] - Ordered entries with the fix-up operations used by structural edits
//!
//! # Fix-up rules
//!
//! Offsets and object targets are relative to the body start, so moving a body to a new
//! buffer never requires rebasing. Inserting `len` bytes at `at` shifts every entry and every
//! object target at or after `at`. Replacing or erasing `[at, at + old_len)` shifts everything
//! at or after the end of the range by the size difference; object targets inside the range
//! collapse onto `at`. Text targets are positions inside an arena and only move when that
//! arena is edited, see [`RelocationTable::fix_text_pointers`].

use strum::{Display, EnumCount, EnumIter};

use crate::{
    config::ResourceConfig,
    file::io::{read_le_at, write_le_at},
    res::{arena::TextKind, reference::Reference},
    Result,
};

/// Kind of reference held by a relocatable slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumCount)]
#[repr(i32)]
pub enum RelocationKind {
    /// Offset into the string table
    StringRef = 1,
    /// Offset into the message table
    MessageRef = 2,
    /// Reference to an external sprite area
    SpriteAreaRef = 3,
    /// Offset of a sub-record inside the same body
    ObjectRef = 4,
}

impl RelocationKind {
    /// Returns the value stored in a relocation array.
    #[must_use]
    pub fn raw(self) -> i32 {
        self as i32
    }

    /// Returns the arena a text reference of this kind lives in.
    #[must_use]
    pub fn text_kind(self) -> Option<TextKind> {
        match self {
            RelocationKind::StringRef => Some(TextKind::String),
            RelocationKind::MessageRef => Some(TextKind::Message),
            _ => None,
        }
    }
}

impl TryFrom<i32> for RelocationKind {
    type Error = crate::Error;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            1 => Ok(RelocationKind::StringRef),
            2 => Ok(RelocationKind::MessageRef),
            3 => Ok(RelocationKind::SpriteAreaRef),
            4 => Ok(RelocationKind::ObjectRef),
            _ => Err(malformed_error!("Unknown relocation type {}", value)),
        }
    }
}

/// A relocatable slot: body offset and reference kind.
///
/// This is the on-disk relocation record and the element type of the type relocation tables
/// that typed components publish for promoting read-only records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Relocation {
    /// Offset of the slot from the body start
    pub offset: usize,
    /// Kind of reference held by the slot
    pub kind: RelocationKind,
}

impl Relocation {
    /// Size of a relocation record on disk.
    pub const SIZE: usize = 8;

    /// Create a relocation for the slot at `offset`.
    #[must_use]
    pub const fn new(offset: usize, kind: RelocationKind) -> Self {
        Relocation { offset, kind }
    }

    /// A string table reference at `offset`.
    #[must_use]
    pub const fn string(offset: usize) -> Self {
        Self::new(offset, RelocationKind::StringRef)
    }

    /// A message table reference at `offset`.
    #[must_use]
    pub const fn message(offset: usize) -> Self {
        Self::new(offset, RelocationKind::MessageRef)
    }

    /// A sub-record reference at `offset`.
    #[must_use]
    pub const fn object(offset: usize) -> Self {
        Self::new(offset, RelocationKind::ObjectRef)
    }

    /// A sprite area reference at `offset`.
    #[must_use]
    pub const fn sprite_area(offset: usize) -> Self {
        Self::new(offset, RelocationKind::SpriteAreaRef)
    }

    /// Parse a packed relocation array (`int32 count` followed by `count` records).
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the array is truncated and
    /// [`crate::Error::Malformed`] for negative counts, negative offsets or unknown kinds.
    pub fn read_array(data: &[u8], offset: &mut usize) -> Result<Vec<Relocation>> {
        let count = read_le_at::<i32>(data, offset)?;
        let Ok(count) = usize::try_from(count) else {
            return Err(malformed_error!("Negative relocation count {}", count));
        };
        let available = data.len().saturating_sub(*offset) / Self::SIZE;
        if count > available {
            return Err(malformed_error!(
                "Relocation table claims {} entries, only {} fit",
                count,
                available
            ));
        }

        let mut relocations = Vec::with_capacity(count);
        for _ in 0..count {
            let slot = read_le_at::<i32>(data, offset)?;
            let kind = RelocationKind::try_from(read_le_at::<i32>(data, offset)?)?;
            let Ok(slot) = usize::try_from(slot) else {
                return Err(malformed_error!("Negative relocation offset {}", slot));
            };
            relocations.push(Relocation::new(slot, kind));
        }

        Ok(relocations)
    }

    /// Append a packed relocation array to `out`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if a value does not fit in an `int32`.
    pub fn write_array(relocations: &[Relocation], out: &mut Vec<u8>) -> Result<()> {
        let start = out.len();
        out.resize(start + 4 + relocations.len() * Self::SIZE, 0);

        let mut offset = start;
        let count = i32::try_from(relocations.len())
            .map_err(|_| malformed_error!("Too many relocations: {}", relocations.len()))?;
        write_le_at(out, &mut offset, count)?;
        for relocation in relocations {
            let slot = i32::try_from(relocation.offset)
                .map_err(|_| malformed_error!("Relocation offset {} too large", relocation.offset))?;
            write_le_at(out, &mut offset, slot)?;
            write_le_at(out, &mut offset, relocation.kind.raw())?;
        }
        Ok(())
    }
}

/// A relocation together with its current target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelocationEntry {
    /// Offset of the slot from the body start
    pub offset: usize,
    /// Kind of reference held by the slot
    pub kind: RelocationKind,
    /// Current target of the slot
    pub target: Reference,
}

impl RelocationEntry {
    /// Returns the `(offset, kind)` pair of this entry.
    #[must_use]
    pub fn relocation(&self) -> Relocation {
        Relocation::new(self.offset, self.kind)
    }
}

/// Ordered relocation entries of one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelocationTable {
    entries: Vec<RelocationEntry>,
}

impl RelocationTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the entries in table order.
    pub fn iter(&self) -> std::slice::Iter<'_, RelocationEntry> {
        self.entries.iter()
    }

    /// Register the slot at `offset` with a null target.
    ///
    /// A slot that is already registered keeps its position in the table and is reset to
    /// `kind` with a null target.
    pub fn add(&mut self, offset: usize, kind: RelocationKind) {
        self.insert_entry(RelocationEntry {
            offset,
            kind,
            target: Reference::Null,
        });
    }

    pub(crate) fn insert_entry(&mut self, entry: RelocationEntry) {
        match self.entries.iter_mut().find(|e| e.offset == entry.offset) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// Remove the entry for the slot at `offset`, if there is one.
    pub fn erase(&mut self, offset: usize) -> Option<RelocationEntry> {
        let index = self.entries.iter().position(|e| e.offset == offset)?;
        Some(self.entries.remove(index))
    }

    /// Remove all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns the entry for the slot at `offset`.
    #[must_use]
    pub fn find(&self, offset: usize) -> Option<&RelocationEntry> {
        self.entries.iter().find(|e| e.offset == offset)
    }

    /// Set the target of the slot at `offset`. Returns false if the slot is not registered.
    pub fn set_target(&mut self, offset: usize, target: Reference) -> bool {
        match self.entries.iter_mut().find(|e| e.offset == offset) {
            Some(entry) => {
                entry.target = target;
                true
            }
            None => false,
        }
    }

    /// Returns the `(offset, kind)` pairs in table order.
    #[must_use]
    pub fn relocations(&self) -> Vec<Relocation> {
        self.entries.iter().map(RelocationEntry::relocation).collect()
    }

    /// Returns the first entry whose slot lies in `[start, end)`.
    pub(crate) fn first_in(&self, start: usize, end: usize) -> Option<RelocationEntry> {
        self.entries
            .iter()
            .find(|e| e.offset >= start && e.offset < end)
            .copied()
    }

    /// Shift entries and object targets after `len` bytes were inserted at `at`.
    pub fn fix_after_insert(&mut self, at: usize, len: usize) {
        for entry in &mut self.entries {
            if entry.offset >= at {
                entry.offset += len;
            }
            if let Reference::Object(target) = &mut entry.target {
                if *target >= at {
                    *target += len;
                }
            }
        }
    }

    /// Shift entries and object targets after `[at, at + old_len)` was resized by `diff`.
    ///
    /// Entries inside the range must already have been removed.
    pub fn fix_offsets(&mut self, at: usize, old_len: usize, diff: isize) {
        let end = at + old_len;
        for entry in &mut self.entries {
            if entry.offset >= end {
                entry.offset = entry.offset.saturating_add_signed(diff);
            }
            if let Reference::Object(target) = &mut entry.target {
                if *target >= end {
                    *target = target.saturating_add_signed(diff);
                } else if *target > at {
                    *target = at;
                }
            }
        }
    }

    /// Shift the text targets of `kind` that lie strictly after `from` by `by` bytes.
    ///
    /// Called whenever bytes are inserted into or removed from an arena, with `from` the
    /// edit position. The text being edited starts at `from` and so stays put.
    pub fn fix_text_pointers(&mut self, kind: TextKind, from: usize, by: isize) {
        let relocation_kind = kind.relocation_kind();
        for entry in &mut self.entries {
            if entry.kind != relocation_kind {
                continue;
            }
            if let Reference::Text(pos) = &mut entry.target {
                if *pos > from {
                    *pos = pos.saturating_add_signed(by);
                }
            }
        }
    }

    /// Build a table from disk relocations, decoding every slot of `body`.
    ///
    /// Each slot is replaced by zero, so the in-memory body never holds a stale offset.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if a slot lies outside of the body or holds an
    /// invalid offset.
    pub fn offsets_to_pointers(
        relocations: &[Relocation],
        body: &mut [u8],
        config: &ResourceConfig,
    ) -> Result<RelocationTable> {
        let mut table = RelocationTable::new();
        for relocation in relocations {
            let mut offset = relocation.offset;
            let word = read_le_at::<i32>(body, &mut offset).map_err(|_| {
                malformed_error!(
                    "Relocation at {} outside of a body of {} bytes",
                    relocation.offset,
                    body.len()
                )
            })?;
            let target = Reference::decode(relocation.kind, word, config)?;

            let mut offset = relocation.offset;
            write_le_at(body, &mut offset, 0_i32)?;

            table.insert_entry(RelocationEntry {
                offset: relocation.offset,
                kind: relocation.kind,
                target,
            });
        }
        Ok(table)
    }

    /// Write the disk form of every target into `body`.
    ///
    /// `body` is the copy being serialized; the live record is left untouched.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if a slot lies outside of `body` and
    /// [`crate::Error::Malformed`] if a target does not fit the format.
    pub fn pointers_to_offsets(&self, body: &mut [u8]) -> Result<()> {
        for entry in &self.entries {
            let mut offset = entry.offset;
            write_le_at(body, &mut offset, entry.target.encode()?)?;
        }
        Ok(())
    }

    pub(crate) fn entries_mut(&mut self) -> std::slice::IterMut<'_, RelocationEntry> {
        self.entries.iter_mut()
    }
}

impl<'a> IntoIterator for &'a RelocationTable {
    type Item = &'a RelocationEntry;
    type IntoIter = std::slice::Iter<'a, RelocationEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
