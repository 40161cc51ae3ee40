//! Relocation table and text arenas of an owned record.
//!
//! [`RecordData`] is the part of a writeable record that lives outside of its body: the
//! relocation entries with their targets and the string and message tables the text
//! targets point into. All reference bookkeeping of structural edits happens here, the
//! body bytes themselves are handled by [`crate::res::OwnedRecord`].

use std::collections::HashSet;

use log::warn;

use crate::{
    res::{
        arena::{StringArena, TextBuffer, TextKind},
        reference::{Reference, SpriteArea},
        relocation::{RelocationEntry, RelocationKind, RelocationTable},
    },
    Error, Result,
};

/// A relocation entry detached from its record, carrying a copy of the text it points to.
#[derive(Debug, Clone)]
pub(crate) struct DetachedEntry {
    entry: RelocationEntry,
    text: Option<String>,
}

/// Relocations and texts of one owned record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordData {
    relocations: RelocationTable,
    arena: StringArena,
}

impl RecordData {
    /// Create empty data.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Combine a relocation table with the arena its text targets point into.
    #[must_use]
    pub fn from_parts(relocations: RelocationTable, arena: StringArena) -> Self {
        RecordData { relocations, arena }
    }

    /// Returns the relocation table.
    #[must_use]
    pub fn relocations(&self) -> &RelocationTable {
        &self.relocations
    }

    pub(crate) fn relocations_mut(&mut self) -> &mut RelocationTable {
        &mut self.relocations
    }

    /// Append `text` to the `kind` table without registering a reference to it.
    pub(crate) fn push_text(&mut self, kind: TextKind, text: &str) -> usize {
        self.arena.buffer_mut(kind).push(text)
    }

    /// Returns the text arena.
    #[must_use]
    pub fn arena(&self) -> &StringArena {
        &self.arena
    }

    /// Returns the text referenced by the slot at `offset`.
    ///
    /// A slot without a relocation entry or with a null target has no text.
    ///
    /// # Errors
    /// Returns [`Error::InvalidOperation`] if the slot holds an object or sprite area
    /// reference and [`Error::Malformed`] if the target is not a valid text.
    pub fn text(&self, offset: usize) -> Result<Option<&str>> {
        let Some(entry) = self.relocations.find(offset) else {
            return Ok(None);
        };
        let Some(kind) = entry.kind.text_kind() else {
            return Err(Error::InvalidOperation(format!(
                "Slot {} holds a {} reference, not a text",
                offset, entry.kind
            )));
        };

        match entry.target {
            Reference::Text(pos) => self.arena.buffer(kind).text(pos).map(Some),
            _ => Ok(None),
        }
    }

    /// Set the text referenced by the slot at `offset`.
    ///
    /// The slot is registered as a `kind` reference if it is not registered yet. A slot that
    /// references the other text table moves its text over. `None` removes the text and
    /// leaves a null reference. A text that overlaps the text of another slot stays in
    /// place and the slot gets a text of its own.
    ///
    /// # Errors
    /// Returns [`Error::InvalidOperation`] if `value` contains a NUL byte or the slot holds
    /// an object or sprite area reference, and [`Error::Malformed`] if the current target is
    /// not a valid text. Nothing is changed in either case.
    pub fn set_text(&mut self, offset: usize, value: Option<&str>, kind: TextKind) -> Result<()> {
        if let Some(value) = value {
            if value.as_bytes().contains(&0) {
                return Err(Error::InvalidOperation(format!(
                    "Text for slot {offset} contains a NUL byte"
                )));
            }
        }

        let Some(entry) = self.relocations.find(offset).copied() else {
            self.init_text(offset, kind, value);
            return Ok(());
        };

        let Some(current_kind) = entry.kind.text_kind() else {
            return Err(Error::InvalidOperation(format!(
                "Slot {} holds a {} reference, not a text",
                offset, entry.kind
            )));
        };

        let current = match entry.target {
            Reference::Text(pos) => Some((pos, self.arena.buffer(current_kind).text_size(pos)?)),
            _ => None,
        };

        let shared = match current {
            Some((pos, size)) => self.overlaps_other_text(offset, current_kind, pos, size)?,
            None => false,
        };

        if current_kind != kind {
            if let Some((pos, size)) = current.filter(|_| !shared) {
                self.remove_chars(current_kind, pos, size)?;
            }
            self.init_text(offset, kind, value);
            return Ok(());
        }

        match (current, value) {
            (None, None) => {}
            (None, Some(value)) => {
                let pos = self.arena.buffer_mut(kind).push(value);
                self.relocations.set_target(offset, Reference::Text(pos));
            }
            (Some(_), None) if shared => {
                self.relocations.set_target(offset, Reference::Null);
            }
            (Some((pos, size)), None) => {
                self.remove_chars(kind, pos, size)?;
                self.relocations.set_target(offset, Reference::Null);
            }
            (Some(_), Some(value)) if shared => {
                let pos = self.arena.buffer_mut(kind).push(value);
                self.relocations.set_target(offset, Reference::Text(pos));
            }
            (Some((pos, size)), Some(value)) => {
                let new_size = value.len() + 1;
                if new_size < size {
                    self.remove_chars(kind, pos, size - new_size)?;
                } else if new_size > size {
                    self.insert_chars(kind, pos, new_size - size)?;
                }
                self.arena.buffer_mut(kind).write(pos, value)?;
            }
        }

        Ok(())
    }

    /// Returns true if a slot other than `offset` references any byte of the `kind` text at
    /// `[pos, pos + size)`.
    fn overlaps_other_text(
        &self,
        offset: usize,
        kind: TextKind,
        pos: usize,
        size: usize,
    ) -> Result<bool> {
        let relocation_kind = kind.relocation_kind();
        let buffer = self.arena.buffer(kind);
        for entry in &self.relocations {
            if entry.offset == offset || entry.kind != relocation_kind {
                continue;
            }
            if let Reference::Text(other) = entry.target {
                if other < pos + size && pos < other + buffer.text_size(other)? {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Open a gap of `count` bytes at `at` in the `kind` table, moving the texts after it.
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] if `at` is outside of the table.
    pub fn insert_chars(&mut self, kind: TextKind, at: usize, count: usize) -> Result<()> {
        self.arena.buffer_mut(kind).insert(at, count)?;
        self.relocations
            .fix_text_pointers(kind, at, isize::try_from(count).unwrap_or(isize::MAX));
        Ok(())
    }

    /// Remove `count` bytes at `at` from the `kind` table, moving the texts after it.
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] if the range is outside of the table.
    pub fn remove_chars(&mut self, kind: TextKind, at: usize, count: usize) -> Result<()> {
        self.arena.buffer_mut(kind).remove(at, count)?;
        let by = isize::try_from(count).unwrap_or(isize::MAX);
        self.relocations.fix_text_pointers(kind, at, -by);
        Ok(())
    }

    /// Register a fresh text slot, appending `value` to the table.
    ///
    /// Used by constructors of new records. `value` must not contain a NUL byte.
    pub(crate) fn init_text(&mut self, offset: usize, kind: TextKind, value: Option<&str>) {
        let target = match value {
            Some(value) => Reference::Text(self.arena.buffer_mut(kind).push(value)),
            None => Reference::Null,
        };
        self.relocations.insert_entry(RelocationEntry {
            offset,
            kind: kind.relocation_kind(),
            target,
        });
    }

    /// Register a fresh object reference slot.
    pub(crate) fn init_object_ref(&mut self, offset: usize, target: Option<usize>) {
        self.relocations.insert_entry(RelocationEntry {
            offset,
            kind: RelocationKind::ObjectRef,
            target: target.map_or(Reference::Null, Reference::Object),
        });
    }

    /// Register a fresh sprite area reference slot.
    pub(crate) fn init_sprite_area_ref(&mut self, offset: usize, area: Option<SpriteArea>) {
        self.relocations.insert_entry(RelocationEntry {
            offset,
            kind: RelocationKind::SpriteAreaRef,
            target: area.map_or(Reference::Null, Reference::SpriteArea),
        });
    }

    /// Returns the body offset referenced by the object slot at `offset`.
    #[must_use]
    pub fn object_ref(&self, offset: usize) -> Option<usize> {
        self.relocations
            .find(offset)
            .and_then(|entry| entry.target.object_offset())
    }

    /// Point the object slot at `offset` to `target`, registering the slot if needed.
    ///
    /// # Errors
    /// Returns [`Error::InvalidOperation`] if the slot holds another kind of reference.
    pub fn set_object_ref(&mut self, offset: usize, target: Option<usize>) -> Result<()> {
        self.set_reference(
            offset,
            RelocationKind::ObjectRef,
            target.map_or(Reference::Null, Reference::Object),
        )
    }

    /// Returns the sprite area referenced by the slot at `offset`.
    #[must_use]
    pub fn sprite_area_ref(&self, offset: usize) -> Option<SpriteArea> {
        match self.relocations.find(offset)?.target {
            Reference::SpriteArea(area) => Some(area),
            _ => None,
        }
    }

    /// Set the sprite area slot at `offset`, registering the slot if needed.
    ///
    /// # Errors
    /// Returns [`Error::InvalidOperation`] if the slot holds another kind of reference.
    pub fn set_sprite_area_ref(&mut self, offset: usize, area: Option<SpriteArea>) -> Result<()> {
        self.set_reference(
            offset,
            RelocationKind::SpriteAreaRef,
            area.map_or(Reference::Null, Reference::SpriteArea),
        )
    }

    fn set_reference(&mut self, offset: usize, kind: RelocationKind, target: Reference) -> Result<()> {
        match self.relocations.find(offset) {
            Some(entry) if entry.kind != kind => Err(Error::InvalidOperation(format!(
                "Slot {} holds a {} reference, not a {}",
                offset, entry.kind, kind
            ))),
            Some(_) => {
                self.relocations.set_target(offset, target);
                Ok(())
            }
            None => {
                self.relocations.insert_entry(RelocationEntry {
                    offset,
                    kind,
                    target,
                });
                Ok(())
            }
        }
    }

    /// Copy out the data of the sub-record at `[start, start + size)`.
    ///
    /// Relocations are rebased to the sub-record start and its texts are copied into fresh
    /// tables. Object references leaving the range become null.
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] if a text target is invalid.
    pub fn component(&self, start: usize, size: usize) -> Result<RecordData> {
        let end = start + size;
        let mut data = RecordData::new();

        for entry in &self.relocations {
            if entry.offset < start || entry.offset >= end {
                continue;
            }

            let target = match entry.target {
                Reference::Text(pos) => {
                    let Some(kind) = entry.kind.text_kind() else {
                        return Err(malformed_error!("Text target on {} slot", entry.kind));
                    };
                    let text = self.arena.buffer(kind).text(pos)?;
                    Reference::Text(data.arena.buffer_mut(kind).push(text))
                }
                Reference::Object(target) if target >= start && target <= end => {
                    Reference::Object(target - start)
                }
                Reference::Object(_) => Reference::Null,
                other => other,
            };

            data.relocations.insert_entry(RelocationEntry {
                offset: entry.offset - start,
                kind: entry.kind,
                target,
            });
        }

        Ok(data)
    }

    /// Copy every relocation of `other` into this record, shifted to `at`, together with
    /// the texts they reference.
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] if a text of `other` is invalid. Nothing is changed in
    /// that case.
    pub fn add_data_from(&mut self, at: usize, other: &RecordData) -> Result<()> {
        let detached = other.detach()?;
        self.attach(at, detached);
        Ok(())
    }

    /// Copy out every entry together with its text.
    pub(crate) fn detach(&self) -> Result<Vec<DetachedEntry>> {
        self.relocations
            .iter()
            .map(|entry| {
                let text = match (entry.target, entry.kind.text_kind()) {
                    (Reference::Text(pos), Some(kind)) => {
                        Some(self.arena.buffer(kind).text(pos)?.to_owned())
                    }
                    (Reference::Text(_), None) => {
                        return Err(malformed_error!("Text target on {} slot", entry.kind))
                    }
                    _ => None,
                };
                Ok(DetachedEntry {
                    entry: *entry,
                    text,
                })
            })
            .collect()
    }

    /// Add detached entries shifted to `at`.
    pub(crate) fn attach(&mut self, at: usize, detached: Vec<DetachedEntry>) {
        for DetachedEntry { entry, text } in detached {
            let target = match (entry.target, text, entry.kind.text_kind()) {
                (Reference::Text(_), Some(text), Some(kind)) => {
                    Reference::Text(self.arena.buffer_mut(kind).push(&text))
                }
                (Reference::Object(target), _, _) => Reference::Object(target + at),
                (other, _, _) => other,
            };
            self.relocations.insert_entry(RelocationEntry {
                offset: entry.offset + at,
                kind: entry.kind,
                target,
            });
        }
    }

    /// Remove every relocation whose slot lies in `[start, start + size)` together with the
    /// texts it references.
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] if a text in the range is invalid. Nothing is changed in
    /// that case.
    pub fn remove_data(&mut self, start: usize, size: usize) -> Result<()> {
        let end = start + size;
        for entry in &self.relocations {
            if entry.offset >= start && entry.offset < end {
                if let (Reference::Text(pos), Some(kind)) = (entry.target, entry.kind.text_kind()) {
                    self.arena.buffer(kind).text(pos)?;
                }
            }
        }

        while let Some(entry) = self.relocations.first_in(start, end) {
            self.relocations.erase(entry.offset);
            if let (Reference::Text(pos), Some(kind)) = (entry.target, entry.kind.text_kind()) {
                let size = self.arena.buffer(kind).text_size(pos)?;
                if !self.overlaps_other_text(entry.offset, kind, pos, size)? {
                    self.remove_chars(kind, pos, size)?;
                }
            }
        }

        Ok(())
    }

    /// Make every text table hold exactly the live texts, each referenced once.
    ///
    /// A table is kept as it is when the referenced texts tile it without gaps or sharing.
    /// Otherwise it is rebuilt compactly in relocation table order. Returns true if any table
    /// was rebuilt.
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] if a text target is invalid.
    pub fn normalise(&mut self) -> Result<bool> {
        let mut rebuilt = false;
        for kind in [TextKind::String, TextKind::Message] {
            if self.is_packed(kind)? {
                continue;
            }

            let relocation_kind = kind.relocation_kind();
            let old = self.arena.buffer(kind).clone();
            let mut fresh = TextBuffer::new();
            for entry in self.relocations.entries_mut() {
                if entry.kind != relocation_kind {
                    continue;
                }
                if let Reference::Text(pos) = entry.target {
                    entry.target = Reference::Text(fresh.push(old.text(pos)?));
                }
            }

            warn!(
                "Rebuilt {:?} table: {} bytes used by live texts, {} stored",
                kind,
                fresh.used(),
                old.used()
            );
            *self.arena.buffer_mut(kind) = fresh;
            rebuilt = true;
        }
        Ok(rebuilt)
    }

    fn is_packed(&self, kind: TextKind) -> Result<bool> {
        let relocation_kind = kind.relocation_kind();
        let buffer = self.arena.buffer(kind);

        let mut positions: Vec<usize> = self
            .relocations
            .iter()
            .filter(|entry| entry.kind == relocation_kind)
            .filter_map(|entry| entry.target.text_position())
            .collect();
        positions.sort_unstable();

        let mut next = 0;
        for pos in positions {
            if pos != next {
                return Ok(false);
            }
            next = pos + buffer.text_size(pos)?;
        }
        Ok(next == buffer.used())
    }

    /// Returns the number of table bytes occupied by live texts of `kind`.
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] if a text target is invalid.
    pub fn live_text_size(&self, kind: TextKind) -> Result<usize> {
        let relocation_kind = kind.relocation_kind();
        let positions: HashSet<usize> = self
            .relocations
            .iter()
            .filter(|entry| entry.kind == relocation_kind)
            .filter_map(|entry| entry.target.text_position())
            .collect();

        positions
            .into_iter()
            .map(|pos| self.arena.buffer(kind).text_size(pos))
            .sum()
    }

    /// Check that every relocation addresses a slot of a `body_size` body and every target
    /// lies inside its table or the body.
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] describing the first violation.
    pub fn verify(&self, body_size: usize) -> Result<()> {
        for entry in &self.relocations {
            if entry.offset + 4 > body_size {
                return Err(malformed_error!(
                    "Relocation at {} outside of a body of {} bytes",
                    entry.offset,
                    body_size
                ));
            }
            match (entry.target, entry.kind.text_kind()) {
                (Reference::Text(pos), Some(kind)) => {
                    self.arena.buffer(kind).text(pos)?;
                }
                (Reference::Text(_), None) => {
                    return Err(malformed_error!("Text target on {} slot", entry.kind));
                }
                (Reference::Object(target), _) if target > body_size => {
                    return Err(malformed_error!(
                        "Object reference at {} to {} outside of a body of {} bytes",
                        entry.offset,
                        target,
                        body_size
                    ));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizes_match(data: &RecordData) -> bool {
        [TextKind::String, TextKind::Message].into_iter().all(|kind| {
            data.live_text_size(kind).unwrap() == data.arena().buffer(kind).used()
        })
    }

    #[test]
    fn grow_and_shrink_text() {
        let mut data = RecordData::new();
        data.set_text(4, Some("Hello"), TextKind::Message).unwrap();
        data.set_text(12, Some("World"), TextKind::Message).unwrap();
        assert_eq!(data.text(4).unwrap(), Some("Hello"));

        data.set_text(4, Some("Hello, World!"), TextKind::Message)
            .unwrap();
        assert_eq!(data.text(4).unwrap(), Some("Hello, World!"));
        assert_eq!(data.text(12).unwrap(), Some("World"));
        assert!(sizes_match(&data));

        data.set_text(4, Some("Hi"), TextKind::Message).unwrap();
        assert_eq!(data.text(4).unwrap(), Some("Hi"));
        assert_eq!(data.text(12).unwrap(), Some("World"));
        assert_eq!(data.arena().messages().used(), 9);
        assert!(sizes_match(&data));
    }

    #[test]
    fn null_texts() {
        let mut data = RecordData::new();
        data.set_text(0, None, TextKind::String).unwrap();
        assert_eq!(data.relocations().len(), 1);
        assert_eq!(data.text(0).unwrap(), None);

        data.set_text(0, Some("!Sprite"), TextKind::String).unwrap();
        data.set_text(8, Some("next"), TextKind::String).unwrap();
        data.set_text(0, None, TextKind::String).unwrap();
        assert_eq!(data.text(0).unwrap(), None);
        assert_eq!(data.text(8).unwrap(), Some("next"));
        assert_eq!(data.arena().strings().used(), 5);

        assert!(data.set_text(8, Some("a\0b"), TextKind::String).is_err());
        assert_eq!(data.text(8).unwrap(), Some("next"));
    }

    #[test]
    fn retype_text() {
        let mut data = RecordData::new();
        data.set_text(0, Some("text"), TextKind::String).unwrap();
        data.set_text(0, Some("message"), TextKind::Message).unwrap();
        assert!(data.arena().strings().is_empty());
        assert_eq!(data.text(0).unwrap(), Some("message"));
        assert_eq!(
            data.relocations().find(0).unwrap().kind,
            RelocationKind::MessageRef
        );
    }

    #[test]
    fn references_keep_their_kind() {
        let mut data = RecordData::new();
        data.set_object_ref(36, Some(164)).unwrap();
        data.set_sprite_area_ref(140, Some(SpriteArea::CLIENT))
            .unwrap();

        assert_eq!(data.object_ref(36), Some(164));
        assert_eq!(data.sprite_area_ref(140), Some(SpriteArea::CLIENT));
        assert!(data.set_text(36, Some("x"), TextKind::String).is_err());
        assert!(data.text(36).is_err());
        assert!(data.set_sprite_area_ref(36, None).is_err());

        data.set_object_ref(36, None).unwrap();
        assert_eq!(data.object_ref(36), None);
    }

    #[test]
    fn component_copy() {
        let mut data = RecordData::new();
        data.set_text(4, Some("title"), TextKind::Message).unwrap();
        data.set_text(40, Some("item"), TextKind::Message).unwrap();
        data.set_text(48, Some("show"), TextKind::String).unwrap();
        data.set_object_ref(52, Some(80)).unwrap();
        data.set_object_ref(56, Some(0)).unwrap();

        let component = data.component(32, 40).unwrap();
        assert_eq!(component.relocations().len(), 4);
        assert_eq!(component.text(8).unwrap(), Some("item"));
        assert_eq!(component.text(16).unwrap(), Some("show"));
        assert_eq!(component.object_ref(20), None);
        assert_eq!(component.object_ref(24), None);
        assert_eq!(component.arena().messages().used(), 5);
    }

    #[test]
    fn add_and_remove_data() {
        let mut item = RecordData::new();
        item.set_text(8, Some("Quit"), TextKind::Message).unwrap();
        item.set_text(32, None, TextKind::Message).unwrap();

        let mut menu = RecordData::new();
        menu.set_text(4, Some("Menu"), TextKind::Message).unwrap();
        menu.add_data_from(32, &item).unwrap();
        menu.add_data_from(72, &item).unwrap();

        assert_eq!(menu.relocations().len(), 5);
        assert_eq!(menu.text(40).unwrap(), Some("Quit"));
        assert_eq!(menu.text(80).unwrap(), Some("Quit"));
        assert!(sizes_match(&menu));

        menu.remove_data(32, 40).unwrap();
        assert_eq!(menu.relocations().len(), 3);
        assert_eq!(menu.text(4).unwrap(), Some("Menu"));
        assert_eq!(menu.text(80).unwrap(), Some("Quit"));
        assert!(sizes_match(&menu));
    }

    #[test]
    fn normalise_shared_texts() {
        let mut relocations = RelocationTable::new();
        relocations.add(0, RelocationKind::StringRef);
        relocations.add(4, RelocationKind::StringRef);
        relocations.set_target(0, Reference::Text(0));
        relocations.set_target(4, Reference::Text(0));
        let arena = StringArena::from_tables(TextBuffer::from_bytes(b"same\0orphan\0"), TextBuffer::new());

        let mut data = RecordData::from_parts(relocations, arena);
        assert!(data.normalise().unwrap());
        assert_eq!(data.arena().strings().used(), 10);
        assert_eq!(data.text(0).unwrap(), Some("same"));
        assert_eq!(data.text(4).unwrap(), Some("same"));

        data.set_text(0, Some("changed"), TextKind::String).unwrap();
        assert_eq!(data.text(4).unwrap(), Some("same"));
        assert!(!data.normalise().unwrap());
    }

    fn shared(text: &[u8], slots: &[usize]) -> RecordData {
        let mut relocations = RelocationTable::new();
        for &slot in slots {
            relocations.add(slot, RelocationKind::StringRef);
            relocations.set_target(slot, Reference::Text(0));
        }
        let arena = StringArena::from_tables(TextBuffer::from_bytes(text), TextBuffer::new());
        RecordData::from_parts(relocations, arena)
    }

    #[test]
    fn edit_shared_text_in_place() {
        let mut data = shared(b"same\0", &[0, 4]);
        data.set_text(0, Some("changed"), TextKind::String).unwrap();
        assert_eq!(data.text(0).unwrap(), Some("changed"));
        assert_eq!(data.text(4).unwrap(), Some("same"));

        let mut data = shared(b"same\0", &[0, 4]);
        data.set_text(0, Some("s"), TextKind::String).unwrap();
        assert_eq!(data.text(4).unwrap(), Some("same"));

        let mut data = shared(b"same\0", &[0, 4]);
        data.set_text(0, None, TextKind::String).unwrap();
        assert_eq!(data.text(0).unwrap(), None);
        assert_eq!(data.text(4).unwrap(), Some("same"));

        let mut data = shared(b"same\0", &[0, 4]);
        data.set_text(0, Some("moved"), TextKind::Message).unwrap();
        assert_eq!(data.text(0).unwrap(), Some("moved"));
        assert_eq!(data.text(4).unwrap(), Some("same"));
    }

    #[test]
    fn edit_text_inside_another() {
        let mut relocations = RelocationTable::new();
        relocations.add(0, RelocationKind::StringRef);
        relocations.add(4, RelocationKind::StringRef);
        relocations.set_target(0, Reference::Text(0));
        relocations.set_target(4, Reference::Text(6));
        let arena =
            StringArena::from_tables(TextBuffer::from_bytes(b"Hello World\0"), TextBuffer::new());
        let mut data = RecordData::from_parts(relocations, arena);

        data.set_text(4, Some("There"), TextKind::String).unwrap();
        assert_eq!(data.text(0).unwrap(), Some("Hello World"));
        assert_eq!(data.text(4).unwrap(), Some("There"));
    }

    #[test]
    fn remove_one_of_shared_slots() {
        let mut data = shared(b"same\0next\0", &[0, 8]);
        data.relocations_mut().add(12, RelocationKind::StringRef);
        data.relocations_mut().set_target(12, Reference::Text(5));

        data.remove_data(0, 4).unwrap();
        assert_eq!(data.relocations().len(), 2);
        assert_eq!(data.text(8).unwrap(), Some("same"));
        assert_eq!(data.text(12).unwrap(), Some("next"));

        data.remove_data(8, 4).unwrap();
        assert_eq!(data.text(12).unwrap(), Some("next"));
        assert_eq!(data.arena().strings().used(), 5);
    }

    #[test]
    fn verify_targets() {
        let mut data = RecordData::new();
        data.set_text(4, Some("ok"), TextKind::String).unwrap();
        data.set_object_ref(8, Some(12)).unwrap();
        assert!(data.verify(12).is_ok());
        assert!(data.verify(11).is_err());

        data.set_object_ref(8, Some(40)).unwrap();
        assert!(data.verify(12).is_err());
    }
}
