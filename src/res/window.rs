//! Window templates.
//!
//! A window body is a fixed 164 byte block followed by its keyboard shortcuts and then its
//! gadgets. Both runs are located through object references in the fixed block, so they
//! follow the body around as it is edited. A first shortcut is placed in front of the
//! gadgets, a first gadget at the end of the body.

use std::ops::{Deref, DerefMut};

use bitflags::bitflags;

use crate::{
    res::{
        arena::TextKind,
        collection::{Collection, Component, ItemKind, ItemSize, Items, Start},
        gadget::ResGadget,
        object::ResObject,
        reference::SpriteArea,
        shortcut::ResShortcut,
    },
    Error, Result,
};

bitflags! {
    /// Flags of a window object.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct WindowFlags: u32 {
        /// Raise an event before the window is shown
        const GENERATE_ABOUT_TO_BE_SHOWN = 1;
        /// Show the window automatically when it is opened
        const AUTO_SHOW = 2;
        /// Close the window automatically
        const AUTO_CLOSE = 4;
        /// Raise an event when the window has been hidden
        const GENERATE_HAS_BEEN_HIDDEN = 8;
        /// The window is a toolbar
        const TOOLBAR = 16;
    }
}

const FLAGS: usize = 0;
const HELP_MESSAGE: usize = 4;
const POINTER_SHAPE: usize = 12;
const POINTER_X_HOT: usize = 20;
const POINTER_Y_HOT: usize = 24;
const MENU: usize = 28;
const SHORTCUT_COUNT: usize = 32;
const SHORTCUT_START: usize = 36;
const GADGET_COUNT: usize = 40;
const GADGET_START: usize = 44;
const DEFAULT_FOCUS: usize = 48;
const SHOW_EVENT: usize = 52;
const HIDE_EVENT: usize = 56;
const TOOLBAR_IBL: usize = 60;
const TOOLBAR_ITL: usize = 64;
const TOOLBAR_EBL: usize = 68;
const TOOLBAR_ETL: usize = 72;
const VISIBLE_AREA: usize = 76;
const SCROLL_X: usize = 92;
const SCROLL_Y: usize = 96;
const BEHIND: usize = 100;
const WINDOW_FLAGS: usize = 104;
const COLOURS: usize = 108;
const SCROLL_COLOURS: usize = 112;
const WORK_AREA: usize = 116;
const TITLE_FLAGS: usize = 132;
const BUTTON_TYPE: usize = 136;
const SPRITE_AREA: usize = 140;
const MIN_WIDTH: usize = 144;
const MIN_HEIGHT: usize = 146;
const TITLE_TEXT: usize = 148;
const TITLE_VALIDATION: usize = 152;
const TITLE_BUFLEN: usize = 156;
const WINDOW_BODY_SIZE: usize = 164;

const SHORTCUTS: Collection = Collection {
    count_field: SHORTCUT_COUNT,
    start: Start::Referenced(SHORTCUT_START),
    id_offset: 4,
    item: ItemSize::Fixed(ResShortcut::SIZE),
    kind: ItemKind::Shortcut,
};

const GADGETS: Collection = Collection {
    count_field: GADGET_COUNT,
    start: Start::Referenced(GADGET_START),
    id_offset: 24,
    item: ItemSize::Gadget,
    kind: ItemKind::Gadget,
};

/// A window template.
#[derive(Debug, Clone)]
pub struct ResWindow {
    object: ResObject,
}

impl ResWindow {
    /// Class id of window objects.
    pub const CLASS_ID: u32 = 0x82880;
    /// Current version of the window class.
    pub const VERSION: i32 = 102;

    /// Create a window named `name` with the default layout of a new window.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self::build(name, false)
    }

    /// Create a window named `name` set up as a toolbar.
    #[must_use]
    pub fn new_toolbar(name: &str) -> Self {
        Self::build(name, true)
    }

    fn build(name: &str, toolbar: bool) -> Self {
        let mut record = ResObject::new_record(name, Self::CLASS_ID, Self::VERSION, WINDOW_BODY_SIZE);
        let (flags, visible, window_flags, work, title, buflen) = if toolbar {
            (16, [154, 828, 554, 1228], 0x8000_0032_u32, (-1000, 1000), None, 0)
        } else {
            (6, [32, 840, 724, 1264], 0xff00_0012, (-1024, 1280), Some("Window object"), 14)
        };

        let words: [(usize, i32); 16] = [
            (FLAGS, flags),
            (DEFAULT_FOCUS, -1),
            (SHOW_EVENT, -1),
            (HIDE_EVENT, -1),
            (VISIBLE_AREA, visible[0]),
            (VISIBLE_AREA + 4, visible[1]),
            (VISIBLE_AREA + 8, visible[2]),
            (VISIBLE_AREA + 12, visible[3]),
            (BEHIND, -1),
            (COLOURS, 0x0107_0207),
            (SCROLL_COLOURS, 0x000c_0103),
            (WORK_AREA + 4, work.0),
            (WORK_AREA + 8, work.1),
            (TITLE_FLAGS, 0x119),
            (MIN_WIDTH, 0x0064_0064),
            (TITLE_BUFLEN, buflen),
        ];
        for (offset, value) in words {
            record.init_word(offset, value as u32);
        }
        record.init_word(WINDOW_FLAGS, window_flags);

        record.init_text(HELP_MESSAGE, TextKind::Message, None);
        record.init_text(POINTER_SHAPE, TextKind::String, None);
        record.init_text(MENU, TextKind::String, None);
        for offset in [TOOLBAR_IBL, TOOLBAR_ITL, TOOLBAR_EBL, TOOLBAR_ETL] {
            record.init_text(offset, TextKind::String, None);
        }
        record.init_text(TITLE_VALIDATION, TextKind::String, None);
        record.init_sprite_area_ref(SPRITE_AREA, Some(SpriteArea::CLIENT));
        record.init_text(TITLE_TEXT, TextKind::Message, title);
        record.init_object_ref(SHORTCUT_START, None);
        record.init_object_ref(GADGET_START, None);
        ResWindow {
            object: ResObject::from_record(record),
        }
    }

    /// Returns the window object flags.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] for a truncated window.
    pub fn window_object_flags(&self) -> Result<WindowFlags> {
        Ok(WindowFlags::from_bits_retain(self.uint_value(FLAGS)?))
    }

    /// Set the window object flags.
    ///
    /// # Errors
    /// See [`crate::res::ResourceHandle::set_uint`].
    pub fn set_window_object_flags(&mut self, flags: WindowFlags) -> Result<()> {
        self.set_uint(FLAGS, flags.bits())
    }

    /// Returns `true` if the window is a toolbar.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] for a truncated window.
    pub fn is_toolbar(&self) -> Result<bool> {
        Ok(self.window_object_flags()?.contains(WindowFlags::TOOLBAR))
    }

    /// Returns the help message.
    ///
    /// # Errors
    /// See [`crate::res::ResourceHandle::text`].
    pub fn help_message(&self) -> Result<Option<&str>> {
        self.object.text(HELP_MESSAGE)
    }

    /// Set the help message and its buffer size.
    ///
    /// # Errors
    /// See [`crate::res::ResourceHandle::set_message_with_length`].
    pub fn set_help_message(&mut self, value: Option<&str>, max: Option<i32>) -> Result<()> {
        self.set_message_with_length(HELP_MESSAGE, value, max)
    }

    /// Returns the help message buffer size.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] for a truncated window.
    pub fn max_help_message(&self) -> Result<i32> {
        self.int_value(HELP_MESSAGE + 4)
    }

    /// Returns the name of the pointer sprite.
    ///
    /// # Errors
    /// See [`crate::res::ResourceHandle::text`].
    pub fn pointer_shape(&self) -> Result<Option<&str>> {
        self.object.text(POINTER_SHAPE)
    }

    /// Set the name of the pointer sprite and its buffer size.
    ///
    /// # Errors
    /// See [`crate::res::ResourceHandle::set_string_with_length`].
    pub fn set_pointer_shape(&mut self, value: Option<&str>, max: Option<i32>) -> Result<()> {
        self.set_string_with_length(POINTER_SHAPE, value, max)
    }

    /// Returns the pointer hot spot.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] for a truncated window.
    pub fn pointer_hot_spot(&self) -> Result<(i32, i32)> {
        Ok((self.int_value(POINTER_X_HOT)?, self.int_value(POINTER_Y_HOT)?))
    }

    /// Set the pointer hot spot.
    ///
    /// # Errors
    /// See [`crate::res::ResourceHandle::set_int`].
    pub fn set_pointer_hot_spot(&mut self, x: i32, y: i32) -> Result<()> {
        self.set_int(POINTER_X_HOT, x)?;
        self.set_int(POINTER_Y_HOT, y)
    }

    /// Returns the name of the window menu.
    ///
    /// # Errors
    /// See [`crate::res::ResourceHandle::text`].
    pub fn menu(&self) -> Result<Option<&str>> {
        self.object.text(MENU)
    }

    /// Set the name of the window menu.
    ///
    /// # Errors
    /// See [`crate::res::ResourceHandle::set_string`].
    pub fn set_menu(&mut self, name: Option<&str>) -> Result<()> {
        self.set_string(MENU, name)
    }

    /// Returns the component id of the gadget with the initial focus, -1 for none.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] for a truncated window.
    pub fn default_focus(&self) -> Result<i32> {
        self.int_value(DEFAULT_FOCUS)
    }

    /// Set the gadget with the initial focus.
    ///
    /// # Errors
    /// See [`crate::res::ResourceHandle::set_int`].
    pub fn set_default_focus(&mut self, id: i32) -> Result<()> {
        self.set_int(DEFAULT_FOCUS, id)
    }

    /// Returns the event raised when the window is shown, -1 for the default.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] for a truncated window.
    pub fn show_event(&self) -> Result<i32> {
        self.int_value(SHOW_EVENT)
    }

    /// Set the event raised when the window is shown.
    ///
    /// # Errors
    /// See [`crate::res::ResourceHandle::set_int`].
    pub fn set_show_event(&mut self, event: i32) -> Result<()> {
        self.set_int(SHOW_EVENT, event)
    }

    /// Returns the event raised when the window is hidden, -1 for the default.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] for a truncated window.
    pub fn hide_event(&self) -> Result<i32> {
        self.int_value(HIDE_EVENT)
    }

    /// Set the event raised when the window is hidden.
    ///
    /// # Errors
    /// See [`crate::res::ResourceHandle::set_int`].
    pub fn set_hide_event(&mut self, event: i32) -> Result<()> {
        self.set_int(HIDE_EVENT, event)
    }

    /// Returns the names of the internal bottom-left, internal top-left, external
    /// bottom-left and external top-left toolbars.
    ///
    /// # Errors
    /// See [`crate::res::ResourceHandle::text`].
    pub fn toolbars(&self) -> Result<[Option<&str>; 4]> {
        Ok([
            self.object.text(TOOLBAR_IBL)?,
            self.object.text(TOOLBAR_ITL)?,
            self.object.text(TOOLBAR_EBL)?,
            self.object.text(TOOLBAR_ETL)?,
        ])
    }

    /// Set the name of the internal bottom-left toolbar.
    ///
    /// # Errors
    /// See [`crate::res::ResourceHandle::set_string`].
    pub fn set_internal_bl_toolbar(&mut self, name: Option<&str>) -> Result<()> {
        self.set_string(TOOLBAR_IBL, name)
    }

    /// Set the name of the internal top-left toolbar.
    ///
    /// # Errors
    /// See [`crate::res::ResourceHandle::set_string`].
    pub fn set_internal_tl_toolbar(&mut self, name: Option<&str>) -> Result<()> {
        self.set_string(TOOLBAR_ITL, name)
    }

    /// Set the name of the external bottom-left toolbar.
    ///
    /// # Errors
    /// See [`crate::res::ResourceHandle::set_string`].
    pub fn set_external_bl_toolbar(&mut self, name: Option<&str>) -> Result<()> {
        self.set_string(TOOLBAR_EBL, name)
    }

    /// Set the name of the external top-left toolbar.
    ///
    /// # Errors
    /// See [`crate::res::ResourceHandle::set_string`].
    pub fn set_external_tl_toolbar(&mut self, name: Option<&str>) -> Result<()> {
        self.set_string(TOOLBAR_ETL, name)
    }

    /// Returns the visible area as `(xmin, ymin, xmax, ymax)`.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] for a truncated window.
    pub fn visible_area(&self) -> Result<(i32, i32, i32, i32)> {
        self.rect(VISIBLE_AREA)
    }

    /// Set the visible area.
    ///
    /// # Errors
    /// See [`crate::res::ResourceHandle::set_int`].
    pub fn set_visible_area(&mut self, xmin: i32, ymin: i32, xmax: i32, ymax: i32) -> Result<()> {
        self.set_rect(VISIBLE_AREA, [xmin, ymin, xmax, ymax])
    }

    /// Returns the scroll offsets.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] for a truncated window.
    pub fn scroll(&self) -> Result<(i32, i32)> {
        Ok((self.int_value(SCROLL_X)?, self.int_value(SCROLL_Y)?))
    }

    /// Set the scroll offsets.
    ///
    /// # Errors
    /// See [`crate::res::ResourceHandle::set_int`].
    pub fn set_scroll(&mut self, x: i32, y: i32) -> Result<()> {
        self.set_int(SCROLL_X, x)?;
        self.set_int(SCROLL_Y, y)
    }

    /// Returns the window handle the window opens behind, -1 for the top of the stack.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] for a truncated window.
    pub fn behind(&self) -> Result<i32> {
        self.int_value(BEHIND)
    }

    /// Set the window the window opens behind.
    ///
    /// # Errors
    /// See [`crate::res::ResourceHandle::set_int`].
    pub fn set_behind(&mut self, behind: i32) -> Result<()> {
        self.set_int(BEHIND, behind)
    }

    /// Returns the window manager flags.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] for a truncated window.
    pub fn window_flags(&self) -> Result<u32> {
        self.uint_value(WINDOW_FLAGS)
    }

    /// Set the window manager flags.
    ///
    /// # Errors
    /// See [`crate::res::ResourceHandle::set_uint`].
    pub fn set_window_flags(&mut self, flags: u32) -> Result<()> {
        self.set_uint(WINDOW_FLAGS, flags)
    }

    /// Returns the title foreground, title background, work foreground and work
    /// background colours.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] for a truncated window.
    pub fn colours(&self) -> Result<[u8; 4]> {
        Ok([
            self.byte_value(COLOURS)?,
            self.byte_value(COLOURS + 1)?,
            self.byte_value(COLOURS + 2)?,
            self.byte_value(COLOURS + 3)?,
        ])
    }

    /// Set the title and work area colours.
    ///
    /// # Errors
    /// See [`crate::res::ResourceHandle::set_byte`].
    pub fn set_colours(&mut self, colours: [u8; 4]) -> Result<()> {
        for (index, colour) in colours.into_iter().enumerate() {
            self.set_byte(COLOURS + index, colour)?;
        }
        Ok(())
    }

    /// Returns the scroll bar outer, scroll bar inner and title focus colours.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] for a truncated window.
    pub fn scroll_colours(&self) -> Result<[u8; 3]> {
        Ok([
            self.byte_value(SCROLL_COLOURS)?,
            self.byte_value(SCROLL_COLOURS + 1)?,
            self.byte_value(SCROLL_COLOURS + 2)?,
        ])
    }

    /// Set the scroll bar and title focus colours.
    ///
    /// # Errors
    /// See [`crate::res::ResourceHandle::set_byte`].
    pub fn set_scroll_colours(&mut self, colours: [u8; 3]) -> Result<()> {
        for (index, colour) in colours.into_iter().enumerate() {
            self.set_byte(SCROLL_COLOURS + index, colour)?;
        }
        Ok(())
    }

    /// Returns the work area extent as `(xmin, ymin, xmax, ymax)`.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] for a truncated window.
    pub fn work_area(&self) -> Result<(i32, i32, i32, i32)> {
        self.rect(WORK_AREA)
    }

    /// Set the work area extent.
    ///
    /// # Errors
    /// See [`crate::res::ResourceHandle::set_int`].
    pub fn set_work_area(&mut self, xmin: i32, ymin: i32, xmax: i32, ymax: i32) -> Result<()> {
        self.set_rect(WORK_AREA, [xmin, ymin, xmax, ymax])
    }

    /// Returns the title bar flags.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] for a truncated window.
    pub fn title_flags(&self) -> Result<u32> {
        self.uint_value(TITLE_FLAGS)
    }

    /// Set the title bar flags.
    ///
    /// # Errors
    /// See [`crate::res::ResourceHandle::set_uint`].
    pub fn set_title_flags(&mut self, flags: u32) -> Result<()> {
        self.set_uint(TITLE_FLAGS, flags)
    }

    /// Returns the work area button type.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] for a truncated window.
    pub fn button_type(&self) -> Result<u32> {
        self.uint_value(BUTTON_TYPE)
    }

    /// Set the work area button type.
    ///
    /// # Errors
    /// See [`crate::res::ResourceHandle::set_uint`].
    pub fn set_button_type(&mut self, button_type: u32) -> Result<()> {
        self.set_uint(BUTTON_TYPE, button_type)
    }

    /// Returns the sprite area used by the window.
    ///
    /// # Errors
    /// See [`crate::res::ResourceHandle::sprite_area_ref`].
    pub fn sprite_area(&self) -> Result<Option<SpriteArea>> {
        self.sprite_area_ref(SPRITE_AREA)
    }

    /// Set the sprite area used by the window.
    ///
    /// # Errors
    /// See [`crate::res::ResourceHandle::set_sprite_area_ref`].
    pub fn set_sprite_area(&mut self, area: Option<SpriteArea>) -> Result<()> {
        self.set_sprite_area_ref(SPRITE_AREA, area)
    }

    /// Returns the minimum width and height.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] for a truncated window.
    pub fn min_size(&self) -> Result<(u16, u16)> {
        Ok((self.ushort_value(MIN_WIDTH)?, self.ushort_value(MIN_HEIGHT)?))
    }

    /// Set the minimum width and height.
    ///
    /// # Errors
    /// See [`crate::res::ResourceHandle::set_ushort`].
    pub fn set_min_size(&mut self, width: u16, height: u16) -> Result<()> {
        self.set_ushort(MIN_WIDTH, width)?;
        self.set_ushort(MIN_HEIGHT, height)
    }

    /// Returns the title text.
    ///
    /// # Errors
    /// See [`crate::res::ResourceHandle::text`].
    pub fn title_text(&self) -> Result<Option<&str>> {
        self.object.text(TITLE_TEXT)
    }

    /// Set the title text, growing the title buffer if the text does not fit.
    ///
    /// # Errors
    /// See [`crate::res::ResourceHandle::set_message`].
    pub fn set_title_text(&mut self, value: Option<&str>) -> Result<()> {
        let needed = value.map_or(0, |v| i32::try_from(v.len() + 1).unwrap_or(i32::MAX));
        let buflen = self.title_buflen()?;
        self.set_message(TITLE_TEXT, value)?;
        if needed > buflen {
            self.set_int(TITLE_BUFLEN, needed)?;
        }
        Ok(())
    }

    /// Returns the title validation string.
    ///
    /// # Errors
    /// See [`crate::res::ResourceHandle::text`].
    pub fn title_validation(&self) -> Result<Option<&str>> {
        self.object.text(TITLE_VALIDATION)
    }

    /// Set the title validation string.
    ///
    /// # Errors
    /// See [`crate::res::ResourceHandle::set_string`].
    pub fn set_title_validation(&mut self, value: Option<&str>) -> Result<()> {
        self.set_string(TITLE_VALIDATION, value)
    }

    /// Returns the size of the title buffer.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] for a truncated window.
    pub fn title_buflen(&self) -> Result<i32> {
        self.int_value(TITLE_BUFLEN)
    }

    /// Set the size of the title buffer.
    ///
    /// # Errors
    /// See [`crate::res::ResourceHandle::set_int`].
    pub fn set_title_buflen(&mut self, len: i32) -> Result<()> {
        self.set_int(TITLE_BUFLEN, len)
    }

    fn rect(&self, offset: usize) -> Result<(i32, i32, i32, i32)> {
        Ok((
            self.int_value(offset)?,
            self.int_value(offset + 4)?,
            self.int_value(offset + 8)?,
            self.int_value(offset + 12)?,
        ))
    }

    fn set_rect(&mut self, offset: usize, values: [i32; 4]) -> Result<()> {
        let record = self.object.make_writeable()?;
        for (index, value) in values.into_iter().enumerate() {
            record.set_int(offset + index * 4, value)?;
        }
        Ok(())
    }

    // Gadgets

    /// Returns the number of gadgets.
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] for a negative count.
    pub fn gadget_count(&self) -> Result<usize> {
        GADGETS.count(&self.object)
    }

    /// Returns the index of the gadget with component id `id`.
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] if the gadgets do not fit in the body.
    pub fn find_gadget(&self, id: i32) -> Result<Option<usize>> {
        GADGETS.find(&self.object, id)
    }

    /// Returns `true` if the window has a gadget with component id `id`.
    ///
    /// # Errors
    /// See [`ResWindow::find_gadget`].
    pub fn contains_gadget(&self, id: i32) -> Result<bool> {
        Ok(self.find_gadget(id)?.is_some())
    }

    /// Returns the gadget with component id `id`.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if there is no such gadget.
    pub fn gadget(&self, id: i32) -> Result<ResGadget> {
        let index = self.gadget_index(id)?;
        self.gadget_at(index)
    }

    /// Returns the gadget at `index`.
    ///
    /// # Errors
    /// Returns [`Error::RangeError`] if `index` is not less than the gadget count.
    pub fn gadget_at(&self, index: usize) -> Result<ResGadget> {
        ResGadget::from_handle(GADGETS.item_at(&self.object, index)?)
    }

    /// Iterate over the gadgets in order.
    #[must_use]
    pub fn gadgets(&self) -> Items<'_, ResGadget> {
        Items::new(&self.object, GADGETS)
    }

    /// Append `gadget` to the window.
    ///
    /// # Errors
    /// Returns [`Error::AlreadyExists`] if a gadget with the same component id exists.
    pub fn add_gadget(&mut self, gadget: &ResGadget) -> Result<()> {
        let count = self.gadget_count()?;
        self.insert_gadget(count, gadget)
    }

    /// Insert `gadget` before the gadget at `index`.
    ///
    /// # Errors
    /// Returns [`Error::RangeError`] if `index` is past the last gadget and
    /// [`Error::AlreadyExists`] if a gadget with the same component id exists.
    pub fn insert_gadget(&mut self, index: usize, gadget: &ResGadget) -> Result<()> {
        let id = gadget.component_id()?;
        let body_end = self.body_size();
        GADGETS.insert(&mut self.object, index, gadget, id, body_end)
    }

    /// Replace the gadget with the component id of `gadget`.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if there is no such gadget.
    pub fn replace_gadget(&mut self, gadget: &ResGadget) -> Result<()> {
        let id = gadget.component_id()?;
        let index = self.gadget_index(id)?;
        GADGETS.replace(&mut self.object, index, gadget, id)
    }

    /// Replace the gadget at `index`.
    ///
    /// # Errors
    /// Returns [`Error::RangeError`] for a bad index and [`Error::AlreadyExists`] if the
    /// component id of `gadget` is used by another gadget.
    pub fn replace_gadget_at(&mut self, index: usize, gadget: &ResGadget) -> Result<()> {
        let id = gadget.component_id()?;
        GADGETS.replace(&mut self.object, index, gadget, id)
    }

    /// Remove the gadget with component id `id`.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if there is no such gadget.
    pub fn erase_gadget(&mut self, id: i32) -> Result<()> {
        let index = self.gadget_index(id)?;
        GADGETS.erase(&mut self.object, index)
    }

    /// Remove the gadget at `index`.
    ///
    /// # Errors
    /// Returns [`Error::RangeError`] if `index` is not less than the gadget count.
    pub fn erase_gadget_at(&mut self, index: usize) -> Result<()> {
        GADGETS.erase(&mut self.object, index)
    }

    fn gadget_index(&self, id: i32) -> Result<usize> {
        self.find_gadget(id)?
            .ok_or_else(|| Error::NotFound(ItemKind::Gadget.item_ref(&self.object, id)))
    }

    // Keyboard shortcuts

    /// Returns the number of keyboard shortcuts.
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] for a negative count.
    pub fn shortcut_count(&self) -> Result<usize> {
        SHORTCUTS.count(&self.object)
    }

    /// Returns the index of the shortcut for `key_code`.
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] if the shortcuts do not fit in the body.
    pub fn find_shortcut(&self, key_code: i32) -> Result<Option<usize>> {
        SHORTCUTS.find(&self.object, key_code)
    }

    /// Returns `true` if the window has a shortcut for `key_code`.
    ///
    /// # Errors
    /// See [`ResWindow::find_shortcut`].
    pub fn contains_shortcut(&self, key_code: i32) -> Result<bool> {
        Ok(self.find_shortcut(key_code)?.is_some())
    }

    /// Returns the shortcut for `key_code`.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if there is no such shortcut.
    pub fn shortcut(&self, key_code: i32) -> Result<ResShortcut> {
        let index = self.shortcut_index(key_code)?;
        self.shortcut_at(index)
    }

    /// Returns the shortcut at `index`.
    ///
    /// # Errors
    /// Returns [`Error::RangeError`] if `index` is not less than the shortcut count.
    pub fn shortcut_at(&self, index: usize) -> Result<ResShortcut> {
        ResShortcut::from_handle(SHORTCUTS.item_at(&self.object, index)?)
    }

    /// Iterate over the shortcuts in order.
    #[must_use]
    pub fn shortcuts(&self) -> Items<'_, ResShortcut> {
        Items::new(&self.object, SHORTCUTS)
    }

    /// Append `shortcut` to the window.
    ///
    /// # Errors
    /// Returns [`Error::AlreadyExists`] if there is a shortcut for the same key.
    pub fn add_shortcut(&mut self, shortcut: &ResShortcut) -> Result<()> {
        let count = self.shortcut_count()?;
        self.insert_shortcut(count, shortcut)
    }

    /// Insert `shortcut` before the shortcut at `index`.
    ///
    /// # Errors
    /// Returns [`Error::RangeError`] if `index` is past the last shortcut and
    /// [`Error::AlreadyExists`] if there is a shortcut for the same key.
    pub fn insert_shortcut(&mut self, index: usize, shortcut: &ResShortcut) -> Result<()> {
        let key_code = shortcut.key_code()?;
        let location = match GADGETS.layout(&self.object)?.first() {
            Some(&(offset, _)) => offset,
            None => self.body_size(),
        };
        SHORTCUTS.insert(&mut self.object, index, shortcut, key_code, location)
    }

    /// Replace the shortcut for the key code of `shortcut`.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if there is no such shortcut.
    pub fn replace_shortcut(&mut self, shortcut: &ResShortcut) -> Result<()> {
        let key_code = shortcut.key_code()?;
        let index = self.shortcut_index(key_code)?;
        SHORTCUTS.replace(&mut self.object, index, shortcut, key_code)
    }

    /// Replace the shortcut at `index`.
    ///
    /// # Errors
    /// Returns [`Error::RangeError`] for a bad index and [`Error::AlreadyExists`] if another
    /// shortcut uses the key code of `shortcut`.
    pub fn replace_shortcut_at(&mut self, index: usize, shortcut: &ResShortcut) -> Result<()> {
        let key_code = shortcut.key_code()?;
        SHORTCUTS.replace(&mut self.object, index, shortcut, key_code)
    }

    /// Remove the shortcut for `key_code`.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if there is no such shortcut.
    pub fn erase_shortcut(&mut self, key_code: i32) -> Result<()> {
        let index = self.shortcut_index(key_code)?;
        SHORTCUTS.erase(&mut self.object, index)
    }

    /// Remove the shortcut at `index`.
    ///
    /// # Errors
    /// Returns [`Error::RangeError`] if `index` is not less than the shortcut count.
    pub fn erase_shortcut_at(&mut self, index: usize) -> Result<()> {
        SHORTCUTS.erase(&mut self.object, index)
    }

    fn shortcut_index(&self, key_code: i32) -> Result<usize> {
        self.find_shortcut(key_code)?
            .ok_or_else(|| Error::NotFound(ItemKind::Shortcut.item_ref(&self.object, key_code)))
    }
}

impl TryFrom<ResObject> for ResWindow {
    type Error = Error;

    fn try_from(object: ResObject) -> Result<Self> {
        object.check_class_id(Self::CLASS_ID)?;
        Ok(ResWindow { object })
    }
}

impl From<ResWindow> for ResObject {
    fn from(window: ResWindow) -> Self {
        window.object
    }
}

impl Deref for ResWindow {
    type Target = ResObject;

    fn deref(&self) -> &Self::Target {
        &self.object
    }
}

impl DerefMut for ResWindow {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.object
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        res::gadget::{ActionButton, Label},
        ItemRef,
    };

    fn label(id: i32, text: &str) -> ResGadget {
        let mut label = Label::new();
        label.set_component_id(id).unwrap();
        label.set_label(Some(text)).unwrap();
        label.set_help_message(Some(&format!("Help {id}"))).unwrap();
        label.into()
    }

    #[test]
    fn defaults() {
        let window = ResWindow::new("Main");
        assert_eq!(window.class_id(), ResWindow::CLASS_ID);
        assert_eq!(window.body_size(), 164);
        assert_eq!(window.uint_value(FLAGS).unwrap(), 6);
        assert_eq!(window.default_focus().unwrap(), -1);
        assert_eq!(window.show_event().unwrap(), -1);
        assert_eq!(window.hide_event().unwrap(), -1);
        assert_eq!(window.behind().unwrap(), -1);
        assert_eq!(window.visible_area().unwrap(), (32, 840, 724, 1264));
        assert_eq!(window.work_area().unwrap(), (0, -1024, 1280, 0));
        assert_eq!(window.window_flags().unwrap(), 0xff00_0012);
        assert_eq!(window.title_flags().unwrap(), 0x119);
        assert_eq!(window.min_size().unwrap(), (100, 100));
        assert_eq!(window.colours().unwrap(), [7, 2, 7, 1]);
        assert_eq!(window.title_text().unwrap(), Some("Window object"));
        assert_eq!(window.title_buflen().unwrap(), 14);
        assert_eq!(window.title_validation().unwrap(), None);
        assert_eq!(window.menu().unwrap(), None);
        assert_eq!(window.sprite_area().unwrap(), Some(SpriteArea::CLIENT));
        assert_eq!(window.gadget_count().unwrap(), 0);
        assert_eq!(window.shortcut_count().unwrap(), 0);
        assert_eq!(window.object_ref(GADGET_START).unwrap(), None);
    }

    #[test]
    fn toolbar_defaults() {
        let toolbar = ResWindow::new_toolbar("Tools");
        assert!(toolbar.is_toolbar().unwrap());
        assert_eq!(toolbar.visible_area().unwrap(), (154, 828, 554, 1228));
        assert_eq!(toolbar.window_flags().unwrap(), 0x8000_0032);
        assert_eq!(toolbar.title_text().unwrap(), None);
        assert_eq!(toolbar.title_buflen().unwrap(), 0);
    }

    #[test]
    fn title_buffer_grows() {
        let mut window = ResWindow::new("Main");
        window.set_title_text(Some("Short")).unwrap();
        assert_eq!(window.title_buflen().unwrap(), 14);
        window.set_title_text(Some("A much longer title")).unwrap();
        assert_eq!(window.title_buflen().unwrap(), 20);
        assert_eq!(window.title_text().unwrap(), Some("A much longer title"));
    }

    #[test]
    fn erase_middle_gadget() {
        let mut window = ResWindow::new("Main");
        for (id, text) in [(1, "One"), (2, "Two"), (3, "Three")] {
            window.add_gadget(&label(id, text)).unwrap();
        }
        assert_eq!(window.gadget_count().unwrap(), 3);
        assert_eq!(window.object_ref(GADGET_START).unwrap(), Some(164));

        window.erase_gadget(2).unwrap();
        assert_eq!(window.gadget_count().unwrap(), 2);
        assert_eq!(window.find_gadget(2).unwrap(), None);

        for (id, text) in [(1, "One"), (3, "Three")] {
            let gadget = Label::try_from(window.gadget(id).unwrap()).unwrap();
            assert_eq!(gadget.label().unwrap(), Some(text));
            assert_eq!(gadget.help_message().unwrap(), Some(format!("Help {id}").as_str()));
        }
        assert!(window.data_is_consistent());
    }

    #[test]
    fn shortcuts_go_before_gadgets() {
        let mut window = ResWindow::new("Main");
        window.add_gadget(&label(1, "One")).unwrap();

        let mut shortcut = ResShortcut::new(0x1B, 0x10);
        shortcut.set_show(Some("Info")).unwrap();
        window.add_shortcut(&shortcut).unwrap();
        window.add_shortcut(&ResShortcut::new(0x0D, 0x11)).unwrap();

        assert_eq!(window.object_ref(SHORTCUT_START).unwrap(), Some(164));
        assert_eq!(window.object_ref(GADGET_START).unwrap(), Some(164 + 32));
        assert_eq!(window.shortcut(0x1B).unwrap().show().unwrap(), Some("Info"));
        assert_eq!(window.shortcut_at(1).unwrap().event().unwrap(), 0x11);

        let label = Label::try_from(window.gadget(1).unwrap()).unwrap();
        assert_eq!(label.label().unwrap(), Some("One"));

        window.erase_shortcut(0x1B).unwrap();
        window.erase_shortcut(0x0D).unwrap();
        assert_eq!(window.object_ref(SHORTCUT_START).unwrap(), None);
        assert_eq!(window.object_ref(GADGET_START).unwrap(), Some(164));
        assert!(matches!(
            window.shortcut(0x0D),
            Err(Error::NotFound(ItemRef::Shortcut { key_code: 0x0D, .. }))
        ));
        assert!(window.data_is_consistent());
    }

    #[test]
    fn gadget_at_front_moves_start() {
        let mut window = ResWindow::new("Main");
        window.add_gadget(&label(1, "One")).unwrap();
        window.insert_gadget(0, &label(2, "Two")).unwrap();

        let ids: Vec<i32> = window
            .gadgets()
            .map(|gadget| gadget.unwrap().component_id().unwrap())
            .collect();
        assert_eq!(ids, [2, 1]);

        window.erase_gadget_at(0).unwrap();
        window.erase_gadget_at(0).unwrap();
        assert_eq!(window.object_ref(GADGET_START).unwrap(), None);
        assert_eq!(window.body_size(), 164);
    }

    #[test]
    fn replace_gadget_with_another_type() {
        let mut window = ResWindow::new("Main");
        window.add_gadget(&label(1, "One")).unwrap();
        window.add_gadget(&label(2, "Two")).unwrap();

        let mut button = ActionButton::new();
        button.set_component_id(1).unwrap();
        button.set_text(Some("OK")).unwrap();
        window.replace_gadget(&button).unwrap();

        assert_eq!(window.body_size(), 164 + 52 + 40);
        let button = ActionButton::try_from(window.gadget_at(0).unwrap()).unwrap();
        assert_eq!(button.text().unwrap(), Some("OK"));
        let second = Label::try_from(window.gadget_at(1).unwrap()).unwrap();
        assert_eq!(second.label().unwrap(), Some("Two"));
        assert!(matches!(
            Label::try_from(window.gadget(1).unwrap()),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn duplicate_gadget_leaves_window_unchanged() {
        let mut window = ResWindow::new("Main");
        window.add_gadget(&label(1, "One")).unwrap();
        let before = window.storage().bytes().to_vec();

        assert!(matches!(
            window.add_gadget(&label(1, "Again")),
            Err(Error::AlreadyExists(ItemRef::Gadget { id: 1, .. }))
        ));
        assert_eq!(window.storage().bytes(), &before[..]);
        assert_eq!(window.gadget_count().unwrap(), 1);
    }

    impl ResWindow {
        fn data_is_consistent(&self) -> bool {
            match self.storage() {
                crate::res::RecordStorage::Owned(record) => {
                    record.data().verify(record.body_size()).is_ok()
                }
                crate::res::RecordStorage::Borrowed(_) => true,
            }
        }
    }
}
