//! String and message arenas.
//!
//! The texts referenced by a record live outside of its body in two tables: strings
//! (validation strings, object names and other literal values) and messages (user visible
//! texts that may be translated). Each table is a [`TextBuffer`], a byte buffer of
//! NUL-terminated texts that is kept padded with zeros to a multiple of four bytes, exactly
//! the way it is written to disk.
//!
//! Buffers know nothing about the references into them. Callers that insert or remove bytes
//! are responsible for fixing the text targets of their relocation table, see
//! [`crate::res::RecordData`].

use crate::{file::io::read_c_str, res::relocation::RelocationKind, Result};

/// Rounds `len` up to the next word boundary.
#[must_use]
pub const fn padded(len: usize) -> usize {
    (len + 3) & !3
}

/// Selects one of the two text tables of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextKind {
    /// The string table
    String,
    /// The message table
    Message,
}

impl TextKind {
    /// Returns the relocation kind of references into this table.
    #[must_use]
    pub fn relocation_kind(self) -> RelocationKind {
        match self {
            TextKind::String => RelocationKind::StringRef,
            TextKind::Message => RelocationKind::MessageRef,
        }
    }
}

/// A word-padded buffer of NUL-terminated texts.
///
/// `data` always has the length `padded(used)` and every byte past `used` is zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    data: Vec<u8>,
    used: usize,
}

impl TextBuffer {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer holding a copy of `bytes`, all of which count as used.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut data = bytes.to_vec();
        data.resize(padded(bytes.len()), 0);
        TextBuffer {
            data,
            used: bytes.len(),
        }
    }

    /// Returns the number of bytes occupied by texts.
    #[must_use]
    pub fn used(&self) -> usize {
        self.used
    }

    /// Returns true if no text is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.used == 0
    }

    /// Returns the used bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.used]
    }

    /// Returns the used bytes followed by the zero padding.
    #[must_use]
    pub fn padded_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Returns the text starting at `pos`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `pos` is not the start of a terminated text
    /// inside the used part of the buffer.
    pub fn text(&self, pos: usize) -> Result<&str> {
        if pos >= self.used {
            return Err(malformed_error!(
                "Text position {} outside of a table of {} bytes",
                pos,
                self.used
            ));
        }
        read_c_str(self.as_bytes(), pos)
    }

    /// Returns the size of the text at `pos` including its terminator.
    ///
    /// # Errors
    /// Same as [`TextBuffer::text`].
    pub fn text_size(&self, pos: usize) -> Result<usize> {
        Ok(self.text(pos)?.len() + 1)
    }

    /// Open a gap of `count` zero bytes at `at`.
    ///
    /// Returns true if the padded size changed, which is when a fixed size table would have
    /// to be reallocated.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `at` lies past the used bytes.
    pub fn insert(&mut self, at: usize, count: usize) -> Result<bool> {
        if at > self.used {
            return Err(malformed_error!(
                "Insert at {} past the end of a table of {} bytes",
                at,
                self.used
            ));
        }

        let old_used = self.used;
        let new_used = old_used + count;
        let grown = padded(new_used) != self.data.len();

        self.data.resize(padded(new_used), 0);
        self.data.copy_within(at..old_used, at + count);
        self.data[at..at + count].fill(0);
        self.used = new_used;

        Ok(grown)
    }

    /// Remove `count` bytes starting at `at`.
    ///
    /// Returns true if the padded size changed.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the range lies outside of the used bytes.
    pub fn remove(&mut self, at: usize, count: usize) -> Result<bool> {
        let end = match at.checked_add(count) {
            Some(end) if end <= self.used => end,
            _ => {
                return Err(malformed_error!(
                    "Remove of {}+{} outside of a table of {} bytes",
                    at,
                    count,
                    self.used
                ))
            }
        };

        let old_used = self.used;
        let new_used = old_used - count;
        let shrunk = padded(new_used) != self.data.len();

        self.data.copy_within(end..old_used, at);
        self.data[new_used..].fill(0);
        self.data.truncate(padded(new_used));
        self.used = new_used;

        Ok(shrunk)
    }

    /// Copy `text` and a terminator to `at`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the bytes do not fit in the used part.
    pub fn write(&mut self, at: usize, text: &str) -> Result<()> {
        let end = at + text.len() + 1;
        if end > self.used {
            return Err(malformed_error!(
                "Text of {} bytes at {} does not fit a table of {} bytes",
                text.len() + 1,
                at,
                self.used
            ));
        }
        self.data[at..end - 1].copy_from_slice(text.as_bytes());
        self.data[end - 1] = 0;
        Ok(())
    }

    /// Append `text` and a terminator, returning its position.
    pub fn push(&mut self, text: &str) -> usize {
        let at = self.used;
        let new_used = at + text.len() + 1;
        self.data.resize(padded(new_used), 0);
        self.data[at..at + text.len()].copy_from_slice(text.as_bytes());
        self.data[new_used - 1] = 0;
        self.used = new_used;
        at
    }
}

/// The string and message tables of one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringArena {
    strings: TextBuffer,
    messages: TextBuffer,
}

impl StringArena {
    /// Create empty tables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an arena from existing tables.
    #[must_use]
    pub fn from_tables(strings: TextBuffer, messages: TextBuffer) -> Self {
        StringArena { strings, messages }
    }

    /// Returns the table of `kind`.
    #[must_use]
    pub fn buffer(&self, kind: TextKind) -> &TextBuffer {
        match kind {
            TextKind::String => &self.strings,
            TextKind::Message => &self.messages,
        }
    }

    /// Returns the table of `kind` for modification.
    pub fn buffer_mut(&mut self, kind: TextKind) -> &mut TextBuffer {
        match kind {
            TextKind::String => &mut self.strings,
            TextKind::Message => &mut self.messages,
        }
    }

    /// Returns the string table.
    #[must_use]
    pub fn strings(&self) -> &TextBuffer {
        &self.strings
    }

    /// Returns the message table.
    #[must_use]
    pub fn messages(&self) -> &TextBuffer {
        &self.messages
    }
}
