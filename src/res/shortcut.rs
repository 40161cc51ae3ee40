//! Keyboard shortcuts of window templates.

use std::ops::{Deref, DerefMut};

use bitflags::bitflags;

use crate::{
    res::{
        arena::TextKind, collection::Component, handle::ResourceHandle, relocation::Relocation,
        storage::OwnedRecord,
    },
    Result,
};

bitflags! {
    /// Flags of a keyboard shortcut.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ShortcutFlags: u32 {
        /// The object shown by the shortcut is shown transient
        const TRANSIENT = 1;
    }
}

const FLAGS: usize = 0;
const KEY_CODE: usize = 4;
const EVENT: usize = 8;
const SHOW: usize = 12;

/// A keyboard shortcut of a window, identified by its key code.
#[derive(Debug, Clone)]
pub struct ResShortcut {
    handle: ResourceHandle,
}

impl ResShortcut {
    /// Size of a shortcut record.
    pub const SIZE: usize = 16;

    /// Relocations of a shortcut.
    pub const RELOCATIONS: &'static [Relocation] = &[Relocation::string(SHOW)];

    /// Create a shortcut for `key_code` raising `event`.
    #[must_use]
    pub fn new(key_code: i32, event: i32) -> Self {
        let mut record = OwnedRecord::zeroed(0, Self::SIZE);
        record.init_word(KEY_CODE, key_code as u32);
        record.init_word(EVENT, event as u32);
        record.init_text(SHOW, TextKind::String, None);
        ResShortcut {
            handle: ResourceHandle::from_owned(record).with_type_relocations(Self::RELOCATIONS),
        }
    }

    /// Returns the shortcut flags.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for a truncated shortcut.
    pub fn flags(&self) -> Result<ShortcutFlags> {
        Ok(ShortcutFlags::from_bits_retain(self.uint_value(FLAGS)?))
    }

    /// Set the shortcut flags.
    ///
    /// # Errors
    /// See [`ResourceHandle::set_uint`].
    pub fn set_flags(&mut self, flags: ShortcutFlags) -> Result<()> {
        self.set_uint(FLAGS, flags.bits())
    }

    /// Returns the key code.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for a truncated shortcut.
    pub fn key_code(&self) -> Result<i32> {
        self.int_value(KEY_CODE)
    }

    /// Set the key code.
    ///
    /// # Errors
    /// See [`ResourceHandle::set_int`].
    pub fn set_key_code(&mut self, key_code: i32) -> Result<()> {
        self.set_int(KEY_CODE, key_code)
    }

    /// Returns the event raised by the shortcut, 0 for none.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for a truncated shortcut.
    pub fn event(&self) -> Result<i32> {
        self.int_value(EVENT)
    }

    /// Set the event raised by the shortcut.
    ///
    /// # Errors
    /// See [`ResourceHandle::set_int`].
    pub fn set_event(&mut self, event: i32) -> Result<()> {
        self.set_int(EVENT, event)
    }

    /// Returns the name of the object shown by the shortcut.
    ///
    /// # Errors
    /// See [`ResourceHandle::text`].
    pub fn show(&self) -> Result<Option<&str>> {
        self.text(SHOW)
    }

    /// Set the name of the object shown by the shortcut.
    ///
    /// # Errors
    /// See [`ResourceHandle::set_string`].
    pub fn set_show(&mut self, name: Option<&str>) -> Result<()> {
        self.set_string(SHOW, name)
    }
}

impl Component for ResShortcut {
    fn from_handle(handle: ResourceHandle) -> Result<Self> {
        Ok(ResShortcut {
            handle: handle.with_type_relocations(Self::RELOCATIONS),
        })
    }
}

impl From<ResShortcut> for ResourceHandle {
    fn from(shortcut: ResShortcut) -> Self {
        shortcut.handle
    }
}

impl Deref for ResShortcut {
    type Target = ResourceHandle;

    fn deref(&self) -> &Self::Target {
        &self.handle
    }
}

impl DerefMut for ResShortcut {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.handle
    }
}
