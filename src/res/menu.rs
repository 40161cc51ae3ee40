//! Menu templates and their items.
//!
//! A menu body is a 32 byte header followed by `item_count` items of 40 bytes each.

use std::ops::{Deref, DerefMut};

use bitflags::bitflags;

use crate::{
    res::{
        arena::TextKind,
        collection::{Collection, Component, ItemKind, ItemSize, Items, Start},
        handle::ResourceHandle,
        object::ResObject,
        relocation::Relocation,
        storage::OwnedRecord,
    },
    Error, Result,
};

bitflags! {
    /// Flags of a menu object.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MenuFlags: u32 {
        /// Raise an event before the menu is shown
        const GENERATE_ABOUT_TO_BE_SHOWN = 1;
        /// Raise an event when the menu has been hidden
        const GENERATE_HAS_BEEN_HIDDEN = 2;
    }
}

bitflags! {
    /// Flags of a menu item.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MenuItemFlags: u32 {
        /// The item shows a tick
        const TICKED = 1;
        /// A dotted line follows the item
        const DOTTED = 2;
        /// The item is greyed out
        const FADED = 256;
        /// The item text is a sprite name
        const SPRITE = 512;
        /// The item has a submenu arrow
        const HAS_SUBMENU = 1024;
        /// Moving over the arrow raises the submenu event
        const GEN_SUBMENU_EVENT = 2048;
        /// The click object is shown transient
        const SHOW_TRANSIENT = 4096;
    }
}

const MENU_FLAGS: usize = 0;
const MENU_TITLE: usize = 4;
const MENU_HELP: usize = 12;
const MENU_SHOWN_EVENT: usize = 20;
const MENU_HIDDEN_EVENT: usize = 24;
const MENU_ITEM_COUNT: usize = 28;
const MENU_BODY_SIZE: usize = 32;

const ITEM_FLAGS: usize = 0;
const ITEM_COMPONENT_ID: usize = 4;
const ITEM_TEXT: usize = 8;
const ITEM_CLICK_SHOW: usize = 16;
const ITEM_SUBMENU_SHOW: usize = 20;
const ITEM_SUBMENU_EVENT: usize = 24;
const ITEM_CLICK_EVENT: usize = 28;
const ITEM_HELP: usize = 32;

const ITEMS: Collection = Collection {
    count_field: MENU_ITEM_COUNT,
    start: Start::Fixed(MENU_BODY_SIZE),
    id_offset: ITEM_COMPONENT_ID,
    item: ItemSize::Fixed(ResMenuItem::SIZE),
    kind: ItemKind::MenuItem,
};

/// An entry of a menu.
#[derive(Debug, Clone)]
pub struct ResMenuItem {
    handle: ResourceHandle,
}

impl ResMenuItem {
    /// Size of a menu item.
    pub const SIZE: usize = 40;

    /// Relocations of a menu item.
    pub const RELOCATIONS: &'static [Relocation] = &[
        Relocation::message(ITEM_TEXT),
        Relocation::string(ITEM_CLICK_SHOW),
        Relocation::string(ITEM_SUBMENU_SHOW),
        Relocation::message(ITEM_HELP),
    ];

    /// Create an item with empty text and component id 0.
    #[must_use]
    pub fn new() -> Self {
        let mut record = OwnedRecord::zeroed(0, Self::SIZE);
        record.init_text(ITEM_TEXT, TextKind::Message, Some(""));
        record.init_text(ITEM_CLICK_SHOW, TextKind::String, None);
        record.init_text(ITEM_SUBMENU_SHOW, TextKind::String, None);
        record.init_text(ITEM_HELP, TextKind::Message, None);
        ResMenuItem {
            handle: ResourceHandle::from_owned(record).with_type_relocations(Self::RELOCATIONS),
        }
    }

    /// Create an item with the given component id and text.
    ///
    /// # Errors
    /// Returns [`Error::InvalidOperation`] if `text` contains a NUL byte.
    pub fn with_text(component_id: i32, text: &str) -> Result<Self> {
        let mut item = Self::new();
        item.set_component_id(component_id)?;
        item.set_text(Some(text), None)?;
        Ok(item)
    }

    /// Returns the item flags.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] for a truncated item.
    pub fn flags(&self) -> Result<MenuItemFlags> {
        Ok(MenuItemFlags::from_bits_retain(self.uint_value(ITEM_FLAGS)?))
    }

    /// Set the item flags.
    ///
    /// # Errors
    /// See [`ResourceHandle::set_uint`].
    pub fn set_flags(&mut self, flags: MenuItemFlags) -> Result<()> {
        self.set_uint(ITEM_FLAGS, flags.bits())
    }

    /// Returns the component id, which identifies the item in its menu.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] for a truncated item.
    pub fn component_id(&self) -> Result<i32> {
        self.int_value(ITEM_COMPONENT_ID)
    }

    /// Set the component id.
    ///
    /// # Errors
    /// See [`ResourceHandle::set_int`].
    pub fn set_component_id(&mut self, id: i32) -> Result<()> {
        self.set_int(ITEM_COMPONENT_ID, id)
    }

    /// Returns the item text.
    ///
    /// # Errors
    /// See [`ResourceHandle::text`].
    pub fn text(&self) -> Result<Option<&str>> {
        self.handle.text(ITEM_TEXT)
    }

    /// Set the item text and its buffer size.
    ///
    /// With `max` of `None` the buffer size is kept, growing it if the text does not fit.
    ///
    /// # Errors
    /// See [`ResourceHandle::set_message_with_length`].
    pub fn set_text(&mut self, value: Option<&str>, max: Option<i32>) -> Result<()> {
        self.set_message_with_length(ITEM_TEXT, value, max)
    }

    /// Returns the text buffer size.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] for a truncated item.
    pub fn max_text(&self) -> Result<i32> {
        self.int_value(ITEM_TEXT + 4)
    }

    /// Returns the name of the object shown on a click.
    ///
    /// # Errors
    /// See [`ResourceHandle::text`].
    pub fn click_show(&self) -> Result<Option<&str>> {
        self.handle.text(ITEM_CLICK_SHOW)
    }

    /// Set the name of the object shown on a click.
    ///
    /// # Errors
    /// See [`ResourceHandle::set_string`].
    pub fn set_click_show(&mut self, name: Option<&str>) -> Result<()> {
        self.set_string(ITEM_CLICK_SHOW, name)
    }

    /// Returns the name of the submenu object.
    ///
    /// # Errors
    /// See [`ResourceHandle::text`].
    pub fn submenu_show(&self) -> Result<Option<&str>> {
        self.handle.text(ITEM_SUBMENU_SHOW)
    }

    /// Set the name of the submenu object.
    ///
    /// # Errors
    /// See [`ResourceHandle::set_string`].
    pub fn set_submenu_show(&mut self, name: Option<&str>) -> Result<()> {
        self.set_string(ITEM_SUBMENU_SHOW, name)
    }

    /// Returns the event raised when the submenu arrow is entered.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] for a truncated item.
    pub fn submenu_event(&self) -> Result<i32> {
        self.int_value(ITEM_SUBMENU_EVENT)
    }

    /// Set the event raised when the submenu arrow is entered.
    ///
    /// # Errors
    /// See [`ResourceHandle::set_int`].
    pub fn set_submenu_event(&mut self, event: i32) -> Result<()> {
        self.set_int(ITEM_SUBMENU_EVENT, event)
    }

    /// Returns the event raised on a click.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] for a truncated item.
    pub fn click_event(&self) -> Result<i32> {
        self.int_value(ITEM_CLICK_EVENT)
    }

    /// Set the event raised on a click.
    ///
    /// # Errors
    /// See [`ResourceHandle::set_int`].
    pub fn set_click_event(&mut self, event: i32) -> Result<()> {
        self.set_int(ITEM_CLICK_EVENT, event)
    }

    /// Returns the help message.
    ///
    /// # Errors
    /// See [`ResourceHandle::text`].
    pub fn help_message(&self) -> Result<Option<&str>> {
        self.handle.text(ITEM_HELP)
    }

    /// Set the help message and its buffer size.
    ///
    /// # Errors
    /// See [`ResourceHandle::set_message_with_length`].
    pub fn set_help_message(&mut self, value: Option<&str>, max: Option<i32>) -> Result<()> {
        self.set_message_with_length(ITEM_HELP, value, max)
    }

    /// Returns the help message buffer size.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] for a truncated item.
    pub fn max_help_message(&self) -> Result<i32> {
        self.int_value(ITEM_HELP + 4)
    }
}

impl Default for ResMenuItem {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for ResMenuItem {
    fn from_handle(handle: ResourceHandle) -> Result<Self> {
        if handle.storage().body_size() != Self::SIZE {
            return Err(malformed_error!(
                "Menu item of {} bytes",
                handle.storage().body_size()
            ));
        }
        Ok(ResMenuItem {
            handle: handle.with_type_relocations(Self::RELOCATIONS),
        })
    }
}

impl From<ResMenuItem> for ResourceHandle {
    fn from(item: ResMenuItem) -> Self {
        item.handle
    }
}

impl Deref for ResMenuItem {
    type Target = ResourceHandle;

    fn deref(&self) -> &Self::Target {
        &self.handle
    }
}

impl DerefMut for ResMenuItem {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.handle
    }
}

/// A menu template.
#[derive(Debug, Clone)]
pub struct ResMenu {
    object: ResObject,
}

impl ResMenu {
    /// Class id of menu objects.
    pub const CLASS_ID: u32 = 0x828c0;
    /// Current version of the menu class.
    pub const VERSION: i32 = 102;

    /// Create an empty menu named `name`.
    #[must_use]
    pub fn new(name: &str) -> Self {
        let mut record = ResObject::new_record(name, Self::CLASS_ID, Self::VERSION, MENU_BODY_SIZE);
        record.init_text(MENU_TITLE, TextKind::Message, None);
        record.init_text(MENU_HELP, TextKind::Message, None);
        record.init_word(MENU_SHOWN_EVENT, u32::MAX);
        record.init_word(MENU_HIDDEN_EVENT, u32::MAX);
        ResMenu {
            object: ResObject::from_record(record),
        }
    }

    /// Returns the menu flags.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] for a truncated menu.
    pub fn menu_flags(&self) -> Result<MenuFlags> {
        Ok(MenuFlags::from_bits_retain(self.uint_value(MENU_FLAGS)?))
    }

    /// Set the menu flags.
    ///
    /// # Errors
    /// See [`ResourceHandle::set_uint`].
    pub fn set_menu_flags(&mut self, flags: MenuFlags) -> Result<()> {
        self.set_uint(MENU_FLAGS, flags.bits())
    }

    /// Returns the title, `None` for the default title.
    ///
    /// # Errors
    /// See [`ResourceHandle::text`].
    pub fn title(&self) -> Result<Option<&str>> {
        self.object.text(MENU_TITLE)
    }

    /// Set the title and its buffer size.
    ///
    /// # Errors
    /// See [`ResourceHandle::set_message_with_length`].
    pub fn set_title(&mut self, value: Option<&str>, max: Option<i32>) -> Result<()> {
        self.set_message_with_length(MENU_TITLE, value, max)
    }

    /// Returns the title buffer size.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] for a truncated menu.
    pub fn max_title(&self) -> Result<i32> {
        self.int_value(MENU_TITLE + 4)
    }

    /// Returns the help message.
    ///
    /// # Errors
    /// See [`ResourceHandle::text`].
    pub fn help_message(&self) -> Result<Option<&str>> {
        self.object.text(MENU_HELP)
    }

    /// Set the help message and its buffer size.
    ///
    /// # Errors
    /// See [`ResourceHandle::set_message_with_length`].
    pub fn set_help_message(&mut self, value: Option<&str>, max: Option<i32>) -> Result<()> {
        self.set_message_with_length(MENU_HELP, value, max)
    }

    /// Returns the help message buffer size.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] for a truncated menu.
    pub fn max_help_message(&self) -> Result<i32> {
        self.int_value(MENU_HELP + 4)
    }

    /// Returns the event raised before the menu is shown, -1 for the default.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] for a truncated menu.
    pub fn about_to_be_shown_event(&self) -> Result<i32> {
        self.int_value(MENU_SHOWN_EVENT)
    }

    /// Set the event raised before the menu is shown.
    ///
    /// # Errors
    /// See [`ResourceHandle::set_int`].
    pub fn set_about_to_be_shown_event(&mut self, event: i32) -> Result<()> {
        self.set_int(MENU_SHOWN_EVENT, event)
    }

    /// Returns the event raised when the menu has been hidden, -1 for the default.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] for a truncated menu.
    pub fn has_been_hidden_event(&self) -> Result<i32> {
        self.int_value(MENU_HIDDEN_EVENT)
    }

    /// Set the event raised when the menu has been hidden.
    ///
    /// # Errors
    /// See [`ResourceHandle::set_int`].
    pub fn set_has_been_hidden_event(&mut self, event: i32) -> Result<()> {
        self.set_int(MENU_HIDDEN_EVENT, event)
    }

    /// Returns the number of items.
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] for a negative count.
    pub fn item_count(&self) -> Result<usize> {
        ITEMS.count(&self.object)
    }

    /// Returns the index of the item with component id `id`.
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] if the items do not fit in the body.
    pub fn find(&self, id: i32) -> Result<Option<usize>> {
        ITEMS.find(&self.object, id)
    }

    /// Returns `true` if the menu has an item with component id `id`.
    ///
    /// # Errors
    /// See [`ResMenu::find`].
    pub fn contains(&self, id: i32) -> Result<bool> {
        Ok(self.find(id)?.is_some())
    }

    /// Returns the item with component id `id`.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if there is no such item.
    pub fn item(&self, id: i32) -> Result<ResMenuItem> {
        let index = self.index_of(id)?;
        self.item_at(index)
    }

    /// Returns the item at `index`.
    ///
    /// # Errors
    /// Returns [`Error::RangeError`] if `index` is not less than the item count.
    pub fn item_at(&self, index: usize) -> Result<ResMenuItem> {
        ResMenuItem::from_handle(ITEMS.item_at(&self.object, index)?)
    }

    /// Iterate over the items in order.
    #[must_use]
    pub fn items(&self) -> Items<'_, ResMenuItem> {
        Items::new(&self.object, ITEMS)
    }

    /// Append `item` to the menu.
    ///
    /// # Errors
    /// Returns [`Error::AlreadyExists`] if an item with the same component id exists.
    pub fn add(&mut self, item: &ResMenuItem) -> Result<()> {
        let count = self.item_count()?;
        self.insert(count, item)
    }

    /// Insert `item` before the item at `index`.
    ///
    /// # Errors
    /// Returns [`Error::RangeError`] if `index` is past the last item and
    /// [`Error::AlreadyExists`] if an item with the same component id exists.
    pub fn insert(&mut self, index: usize, item: &ResMenuItem) -> Result<()> {
        let id = item.component_id()?;
        ITEMS.insert(&mut self.object, index, item, id, MENU_BODY_SIZE)
    }

    /// Replace the item with the component id of `item`.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if there is no such item.
    pub fn replace(&mut self, item: &ResMenuItem) -> Result<()> {
        let id = item.component_id()?;
        let index = self.index_of(id)?;
        ITEMS.replace(&mut self.object, index, item, id)
    }

    /// Replace the item at `index`.
    ///
    /// # Errors
    /// Returns [`Error::RangeError`] for a bad index and [`Error::AlreadyExists`] if the
    /// component id of `item` is used by another item.
    pub fn replace_at(&mut self, index: usize, item: &ResMenuItem) -> Result<()> {
        let id = item.component_id()?;
        ITEMS.replace(&mut self.object, index, item, id)
    }

    /// Remove the item with component id `id`.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if there is no such item.
    pub fn erase(&mut self, id: i32) -> Result<()> {
        let index = self.index_of(id)?;
        ITEMS.erase(&mut self.object, index)
    }

    /// Remove the item at `index`.
    ///
    /// # Errors
    /// Returns [`Error::RangeError`] if `index` is not less than the item count.
    pub fn erase_at(&mut self, index: usize) -> Result<()> {
        ITEMS.erase(&mut self.object, index)
    }

    fn index_of(&self, id: i32) -> Result<usize> {
        self.find(id)?
            .ok_or_else(|| Error::NotFound(ItemKind::MenuItem.item_ref(&self.object, id)))
    }
}

impl TryFrom<ResObject> for ResMenu {
    type Error = Error;

    fn try_from(object: ResObject) -> Result<Self> {
        object.check_class_id(Self::CLASS_ID)?;
        Ok(ResMenu { object })
    }
}

impl From<ResMenu> for ResObject {
    fn from(menu: ResMenu) -> Self {
        menu.object
    }
}

impl Deref for ResMenu {
    type Target = ResObject;

    fn deref(&self) -> &Self::Target {
        &self.object
    }
}

impl DerefMut for ResMenu {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.object
    }
}
