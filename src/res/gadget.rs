//! Window gadgets.
//!
//! A gadget is a component of a window body. Every gadget starts with the same 36 byte
//! header; the type specific fields follow. The header stores the gadget type in the low
//! half of its `type_and_size` word and, optionally, the gadget size in the high half.
//!
//! # Header layout
//!
//! | Offset | Field |
//! |--------|-------|
//! | 0 | flags, bits 30 and 31 common to all gadgets |
//! | 4 | type and size |
//! | 8 | bounding box: xmin, ymin, xmax, ymax |
//! | 24 | component id |
//! | 28 | help message |
//! | 32 | help message buffer size |
//!
//! [`ResGadget`] covers the header. [`ActionButton`], [`Label`], [`DisplayField`] and
//! [`Button`] add typed access to their own fields and check the gadget type when they are
//! created from a [`ResGadget`].

use std::ops::{Deref, DerefMut};

use bitflags::bitflags;
use strum::{Display, EnumCount, EnumIter, IntoEnumIterator};

use crate::{
    res::{
        arena::TextKind, collection::Component, handle::ResourceHandle, relocation::Relocation,
        storage::OwnedRecord,
    },
    Error, Result,
};

bitflags! {
    /// Flags common to all gadgets.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct GadgetFlags: u32 {
        /// The gadget is placed at the back of the window
        const BACK = 1 << 30;
        /// The gadget is faded
        const FADED = 1 << 31;
    }
}

/// The standard gadget types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumCount)]
#[repr(u32)]
pub enum GadgetType {
    /// A push button raising an event
    ActionButton = 128,
    /// A check box
    OptionButton = 192,
    /// A box with a label around other gadgets
    LabelledBox = 256,
    /// A text label
    Label = 320,
    /// One of a group of mutually exclusive buttons
    RadioButton = 384,
    /// A read-only text field
    DisplayField = 448,
    /// An editable text field
    WritableField = 512,
    /// A slider bar
    Slider = 576,
    /// An item that can be dragged
    Draggable = 640,
    /// A pop-up menu button
    PopUp = 704,
    /// An adjuster arrow
    Adjuster = 768,
    /// A numeric field with adjusters
    NumberRange = 832,
    /// A text field with a menu of values
    StringSet = 896,
    /// A plain icon
    Button = 960,
}

impl GadgetType {
    /// Returns the type value stored in a gadget header.
    #[must_use]
    pub fn id(self) -> u32 {
        self as u32
    }

    /// Returns the standard type with the given header value.
    #[must_use]
    pub fn from_id(id: u32) -> Option<GadgetType> {
        GadgetType::iter().find(|t| t.id() == id)
    }

    /// Returns the size of a gadget of this type.
    #[must_use]
    pub fn size(self) -> usize {
        match self {
            GadgetType::ActionButton => 52,
            GadgetType::OptionButton
            | GadgetType::RadioButton
            | GadgetType::Slider
            | GadgetType::Draggable
            | GadgetType::Button => 56,
            GadgetType::LabelledBox | GadgetType::Label | GadgetType::PopUp => 40,
            GadgetType::DisplayField => 44,
            GadgetType::WritableField => 60,
            GadgetType::Adjuster => 36,
            GadgetType::NumberRange => 68,
            GadgetType::StringSet => 64,
        }
    }

    /// Returns the relocations of a gadget of this type.
    #[must_use]
    pub fn relocations(self) -> &'static [Relocation] {
        const HELP_ONLY: &[Relocation] = &[Relocation::message(HELP_MESSAGE)];
        const LABELLED: &[Relocation] = &[Relocation::message(HELP_MESSAGE), Relocation::message(36)];
        const RADIO_BUTTON: &[Relocation] =
            &[Relocation::message(HELP_MESSAGE), Relocation::message(40)];
        const WRITABLE_FIELD: &[Relocation] = &[
            Relocation::message(HELP_MESSAGE),
            Relocation::message(36),
            Relocation::message(44),
        ];
        const DRAGGABLE: &[Relocation] = &[
            Relocation::message(HELP_MESSAGE),
            Relocation::message(36),
            Relocation::string(44),
        ];
        const POP_UP: &[Relocation] = &[Relocation::message(HELP_MESSAGE), Relocation::string(36)];
        const STRING_SET: &[Relocation] = &[
            Relocation::message(HELP_MESSAGE),
            Relocation::message(36),
            Relocation::message(40),
            Relocation::message(44),
            Relocation::message(52),
        ];

        match self {
            GadgetType::ActionButton => ActionButton::RELOCATIONS,
            GadgetType::Label => Label::RELOCATIONS,
            GadgetType::DisplayField => DisplayField::RELOCATIONS,
            GadgetType::Button => Button::RELOCATIONS,
            GadgetType::OptionButton | GadgetType::LabelledBox => LABELLED,
            GadgetType::RadioButton => RADIO_BUTTON,
            GadgetType::WritableField => WRITABLE_FIELD,
            GadgetType::Draggable => DRAGGABLE,
            GadgetType::PopUp => POP_UP,
            GadgetType::StringSet => STRING_SET,
            GadgetType::Slider | GadgetType::Adjuster | GadgetType::NumberRange => HELP_ONLY,
        }
    }
}

/// Returns the size of a gadget from its `type_and_size` header word.
///
/// A size stored in the high half wins, otherwise the size of the standard type is used.
///
/// # Errors
/// Returns [`Error::UnknownGadgetType`] for a non-standard type without a stored size.
pub fn gadget_size(type_and_size: u32) -> Result<usize> {
    let stored = (type_and_size >> 16) as usize;
    if stored != 0 {
        return Ok(stored);
    }
    let type_id = type_and_size & 0xFFFF;
    GadgetType::from_id(type_id)
        .map(GadgetType::size)
        .ok_or(Error::UnknownGadgetType(type_id))
}

const FLAGS: usize = 0;
const TYPE_AND_SIZE: usize = 4;
const BBOX: usize = 8;
const COMPONENT_ID: usize = 24;
const HELP_MESSAGE: usize = 28;

/// Size of the header shared by all gadgets.
pub const GADGET_HEADER_SIZE: usize = 36;

/// A window gadget of any type.
#[derive(Debug, Clone)]
pub struct ResGadget {
    handle: ResourceHandle,
}

impl ResGadget {
    /// Create a gadget of `type_id` with a body of `size` bytes.
    ///
    /// The size is stored in the header, so gadgets of non-standard types can be created.
    #[must_use]
    pub fn new(type_id: u32, size: usize) -> Self {
        let relocations = GadgetType::from_id(type_id).map(GadgetType::relocations);
        Self::from_record(Self::new_record(type_id, size), relocations)
    }

    /// Returns the record of a new gadget, ready for type specific set up.
    pub(crate) fn new_record(type_id: u32, size: usize) -> OwnedRecord {
        let size = size.max(GADGET_HEADER_SIZE);
        let mut record = OwnedRecord::zeroed(0, size);
        let type_and_size = (type_id & 0xFFFF) | (u32::try_from(size).unwrap_or(0) << 16);
        record.init_word(TYPE_AND_SIZE, type_and_size);
        record.init_text(HELP_MESSAGE, TextKind::Message, None);
        record
    }

    /// Wrap a record made by [`ResGadget::new_record`].
    pub(crate) fn from_record(record: OwnedRecord, relocations: Option<&'static [Relocation]>) -> Self {
        let mut handle = ResourceHandle::from_owned(record);
        if let Some(relocations) = relocations {
            handle = handle.with_type_relocations(relocations);
        }
        ResGadget { handle }
    }

    /// Returns the underlying handle.
    #[must_use]
    pub fn handle(&self) -> &ResourceHandle {
        &self.handle
    }

    /// Returns the gadget flags, including the type specific bits.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] for a truncated gadget.
    pub fn flags(&self) -> Result<GadgetFlags> {
        Ok(GadgetFlags::from_bits_retain(self.uint_value(FLAGS)?))
    }

    /// Set the gadget flags.
    ///
    /// # Errors
    /// See [`ResourceHandle::set_uint`].
    pub fn set_flags(&mut self, flags: GadgetFlags) -> Result<()> {
        self.handle.set_uint(FLAGS, flags.bits())
    }

    /// Returns the gadget type.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] for a truncated gadget.
    pub fn type_id(&self) -> Result<u32> {
        Ok(self.uint_value(TYPE_AND_SIZE)? & 0xFFFF)
    }

    /// Returns the standard type of the gadget, if it has one.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] for a truncated gadget.
    pub fn gadget_type(&self) -> Result<Option<GadgetType>> {
        Ok(GadgetType::from_id(self.type_id()?))
    }

    /// Returns the size of the gadget.
    ///
    /// # Errors
    /// See [`gadget_size`].
    pub fn size(&self) -> Result<usize> {
        gadget_size(self.uint_value(TYPE_AND_SIZE)?)
    }

    /// Returns the bounding box as `(xmin, ymin, xmax, ymax)`.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] for a truncated gadget.
    pub fn bbox(&self) -> Result<(i32, i32, i32, i32)> {
        Ok((
            self.int_value(BBOX)?,
            self.int_value(BBOX + 4)?,
            self.int_value(BBOX + 8)?,
            self.int_value(BBOX + 12)?,
        ))
    }

    /// Set the bounding box.
    ///
    /// # Errors
    /// See [`ResourceHandle::set_int`].
    pub fn set_bbox(&mut self, xmin: i32, ymin: i32, xmax: i32, ymax: i32) -> Result<()> {
        let record = self.handle.make_writeable()?;
        record.set_int(BBOX, xmin)?;
        record.set_int(BBOX + 4, ymin)?;
        record.set_int(BBOX + 8, xmax)?;
        record.set_int(BBOX + 12, ymax)
    }

    /// Returns the component id.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] for a truncated gadget.
    pub fn component_id(&self) -> Result<i32> {
        self.int_value(COMPONENT_ID)
    }

    /// Set the component id.
    ///
    /// # Errors
    /// See [`ResourceHandle::set_int`].
    pub fn set_component_id(&mut self, id: i32) -> Result<()> {
        self.handle.set_int(COMPONENT_ID, id)
    }

    /// Returns the help message.
    ///
    /// # Errors
    /// See [`ResourceHandle::text`].
    pub fn help_message(&self) -> Result<Option<&str>> {
        self.text(HELP_MESSAGE)
    }

    /// Set the help message, growing its buffer size if needed.
    ///
    /// # Errors
    /// See [`ResourceHandle::set_message_with_length`].
    pub fn set_help_message(&mut self, value: Option<&str>) -> Result<()> {
        self.handle
            .set_message_with_length(HELP_MESSAGE, value, None)
    }

    /// Returns the buffer size of the help message.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] for a truncated gadget.
    pub fn max_help(&self) -> Result<i32> {
        self.int_value(HELP_MESSAGE + 4)
    }

    fn check_type(&self, expected: GadgetType) -> Result<()> {
        let found = self.type_id()?;
        if found == expected.id() {
            Ok(())
        } else {
            Err(Error::TypeMismatch {
                found,
                expected: expected.id(),
            })
        }
    }
}

impl Component for ResGadget {
    fn from_handle(handle: ResourceHandle) -> Result<Self> {
        let type_and_size = handle.uint_value(TYPE_AND_SIZE)?;
        gadget_size(type_and_size)?;
        let handle = match GadgetType::from_id(type_and_size & 0xFFFF) {
            Some(gadget_type) if handle.type_relocations().is_none() => {
                handle.with_type_relocations(gadget_type.relocations())
            }
            _ => handle,
        };
        Ok(ResGadget { handle })
    }
}

impl Deref for ResGadget {
    type Target = ResourceHandle;

    fn deref(&self) -> &Self::Target {
        &self.handle
    }
}

impl DerefMut for ResGadget {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.handle
    }
}

macro_rules! typed_gadget {
    ($name:ident, $gadget_type:expr) => {
        impl TryFrom<ResGadget> for $name {
            type Error = Error;

            fn try_from(gadget: ResGadget) -> Result<Self> {
                gadget.check_type($gadget_type)?;
                Ok($name {
                    gadget: ResGadget {
                        handle: gadget.handle.with_type_relocations(Self::RELOCATIONS),
                    },
                })
            }
        }

        impl From<$name> for ResGadget {
            fn from(typed: $name) -> Self {
                typed.gadget
            }
        }

        impl Deref for $name {
            type Target = ResGadget;

            fn deref(&self) -> &Self::Target {
                &self.gadget
            }
        }

        impl DerefMut for $name {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.gadget
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

bitflags! {
    /// Flags of an action button.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ActionButtonFlags: u32 {
        /// The button is the default button of the window
        const DEFAULT = 1;
        /// The button is the cancel button of the window
        const CANCEL = 2;
        /// Clicking the button does not close the window
        const LOCAL = 4;
        /// The object shown by a click is shown transient
        const TRANSIENT = 8;
    }
}

/// A push button raising an event when clicked.
#[derive(Debug, Clone)]
pub struct ActionButton {
    gadget: ResGadget,
}

impl ActionButton {
    /// Relocations of an action button.
    pub const RELOCATIONS: &'static [Relocation] = &[
        Relocation::message(HELP_MESSAGE),
        Relocation::message(36),
        Relocation::string(44),
    ];

    /// Create an action button with no text.
    #[must_use]
    pub fn new() -> Self {
        let mut record =
            ResGadget::new_record(GadgetType::ActionButton.id(), GadgetType::ActionButton.size());
        record.init_text(36, TextKind::Message, None);
        record.init_text(44, TextKind::String, None);
        ActionButton {
            gadget: ResGadget::from_record(record, Some(Self::RELOCATIONS)),
        }
    }

    /// Returns the action button flags.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] for a truncated gadget.
    pub fn button_flags(&self) -> Result<ActionButtonFlags> {
        Ok(ActionButtonFlags::from_bits_truncate(self.uint_value(FLAGS)?))
    }

    /// Set the action button flags, keeping the other gadget flags.
    ///
    /// # Errors
    /// See [`ResourceHandle::set_flag_value`].
    pub fn set_button_flags(&mut self, flags: ActionButtonFlags) -> Result<()> {
        self.set_flag_value(FLAGS, ActionButtonFlags::all().bits(), flags.bits())
    }

    /// Returns the button text.
    ///
    /// # Errors
    /// See [`ResourceHandle::text`].
    pub fn text(&self) -> Result<Option<&str>> {
        self.gadget.text(36)
    }

    /// Set the button text, growing its buffer size if needed.
    ///
    /// # Errors
    /// See [`ResourceHandle::set_message_with_length`].
    pub fn set_text(&mut self, value: Option<&str>) -> Result<()> {
        self.set_message_with_length(36, value, None)
    }

    /// Returns the buffer size of the button text.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] for a truncated gadget.
    pub fn max_text_len(&self) -> Result<i32> {
        self.int_value(40)
    }

    /// Returns the name of the object shown on a click.
    ///
    /// # Errors
    /// See [`ResourceHandle::text`].
    pub fn click_show(&self) -> Result<Option<&str>> {
        self.gadget.text(44)
    }

    /// Set the name of the object shown on a click.
    ///
    /// # Errors
    /// See [`ResourceHandle::set_string`].
    pub fn set_click_show(&mut self, value: Option<&str>) -> Result<()> {
        self.set_string(44, value)
    }

    /// Returns the event raised on a click, 0 for the default event.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] for a truncated gadget.
    pub fn event(&self) -> Result<i32> {
        self.int_value(48)
    }

    /// Set the event raised on a click.
    ///
    /// # Errors
    /// See [`ResourceHandle::set_int`].
    pub fn set_event(&mut self, event: i32) -> Result<()> {
        self.set_int(48, event)
    }
}

typed_gadget!(ActionButton, GadgetType::ActionButton);

/// Horizontal placement of a text inside its gadget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Justification {
    /// Left aligned
    Left,
    /// Right aligned
    Right,
    /// Centred
    Centre,
}

impl Justification {
    fn from_bits(bits: u32) -> Justification {
        match bits {
            1 => Justification::Right,
            2 => Justification::Centre,
            _ => Justification::Left,
        }
    }

    fn bits(self) -> u32 {
        match self {
            Justification::Left => 0,
            Justification::Right => 1,
            Justification::Centre => 2,
        }
    }
}

const JUSTIFICATION_MASK: u32 = 6;

/// A text label.
#[derive(Debug, Clone)]
pub struct Label {
    gadget: ResGadget,
}

impl Label {
    /// Relocations of a label.
    pub const RELOCATIONS: &'static [Relocation] =
        &[Relocation::message(HELP_MESSAGE), Relocation::message(36)];

    /// Create a label with no text.
    #[must_use]
    pub fn new() -> Self {
        let mut record = ResGadget::new_record(GadgetType::Label.id(), GadgetType::Label.size());
        record.init_text(36, TextKind::Message, None);
        Label {
            gadget: ResGadget::from_record(record, Some(Self::RELOCATIONS)),
        }
    }

    /// Returns the label text.
    ///
    /// # Errors
    /// See [`ResourceHandle::text`].
    pub fn label(&self) -> Result<Option<&str>> {
        self.gadget.text(36)
    }

    /// Set the label text.
    ///
    /// # Errors
    /// See [`ResourceHandle::set_message`].
    pub fn set_label(&mut self, value: Option<&str>) -> Result<()> {
        self.set_message(36, value)
    }

    /// Returns the placement of the text.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] for a truncated gadget.
    pub fn justification(&self) -> Result<Justification> {
        Ok(Justification::from_bits(
            self.flag_value(FLAGS, JUSTIFICATION_MASK)? >> 1,
        ))
    }

    /// Set the placement of the text.
    ///
    /// # Errors
    /// See [`ResourceHandle::set_flag_value`].
    pub fn set_justification(&mut self, value: Justification) -> Result<()> {
        self.set_flag_value(FLAGS, JUSTIFICATION_MASK, value.bits() << 1)
    }
}

typed_gadget!(Label, GadgetType::Label);

/// A read-only text field.
#[derive(Debug, Clone)]
pub struct DisplayField {
    gadget: ResGadget,
}

impl DisplayField {
    /// Relocations of a display field.
    pub const RELOCATIONS: &'static [Relocation] =
        &[Relocation::message(HELP_MESSAGE), Relocation::message(36)];

    /// Create a display field with no text.
    #[must_use]
    pub fn new() -> Self {
        let mut record =
            ResGadget::new_record(GadgetType::DisplayField.id(), GadgetType::DisplayField.size());
        record.init_text(36, TextKind::Message, None);
        DisplayField {
            gadget: ResGadget::from_record(record, Some(Self::RELOCATIONS)),
        }
    }

    /// Returns the text shown.
    ///
    /// # Errors
    /// See [`ResourceHandle::text`].
    pub fn text(&self) -> Result<Option<&str>> {
        self.gadget.text(36)
    }

    /// Set the text shown, growing its buffer size if needed.
    ///
    /// # Errors
    /// See [`ResourceHandle::set_message_with_length`].
    pub fn set_text(&mut self, value: Option<&str>) -> Result<()> {
        self.set_message_with_length(36, value, None)
    }

    /// Returns the buffer size of the text.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] for a truncated gadget.
    pub fn max_text_len(&self) -> Result<i32> {
        self.int_value(40)
    }

    /// Returns the placement of the text.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] for a truncated gadget.
    pub fn justification(&self) -> Result<Justification> {
        Ok(Justification::from_bits(
            self.flag_value(FLAGS, JUSTIFICATION_MASK)? >> 1,
        ))
    }

    /// Set the placement of the text.
    ///
    /// # Errors
    /// See [`ResourceHandle::set_flag_value`].
    pub fn set_justification(&mut self, value: Justification) -> Result<()> {
        self.set_flag_value(FLAGS, JUSTIFICATION_MASK, value.bits() << 1)
    }
}

typed_gadget!(DisplayField, GadgetType::DisplayField);

/// A plain icon with an optional value and validation string.
#[derive(Debug, Clone)]
pub struct Button {
    gadget: ResGadget,
}

impl Button {
    /// Relocations of a button.
    pub const RELOCATIONS: &'static [Relocation] = &[
        Relocation::message(HELP_MESSAGE),
        Relocation::message(40),
        Relocation::string(48),
    ];

    /// Icon flags of a new button: foreground colour 7, indirected text.
    pub const DEFAULT_BUTTON_FLAGS: u32 = 0x0700_0110;

    /// Create a button with no value.
    #[must_use]
    pub fn new() -> Self {
        let mut record = ResGadget::new_record(GadgetType::Button.id(), GadgetType::Button.size());
        record.init_word(36, Self::DEFAULT_BUTTON_FLAGS);
        record.init_text(40, TextKind::Message, None);
        record.init_text(48, TextKind::String, None);
        Button {
            gadget: ResGadget::from_record(record, Some(Self::RELOCATIONS)),
        }
    }

    /// Returns the icon flags.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] for a truncated gadget.
    pub fn button_flags(&self) -> Result<u32> {
        self.uint_value(36)
    }

    /// Set the icon flags.
    ///
    /// # Errors
    /// See [`ResourceHandle::set_uint`].
    pub fn set_button_flags(&mut self, flags: u32) -> Result<()> {
        self.set_uint(36, flags)
    }

    /// Returns the button value.
    ///
    /// # Errors
    /// See [`ResourceHandle::text`].
    pub fn value(&self) -> Result<Option<&str>> {
        self.gadget.text(40)
    }

    /// Set the button value, growing its buffer size if needed.
    ///
    /// # Errors
    /// See [`ResourceHandle::set_message_with_length`].
    pub fn set_value(&mut self, value: Option<&str>) -> Result<()> {
        self.set_message_with_length(40, value, None)
    }

    /// Returns the buffer size of the value.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] for a truncated gadget.
    pub fn max_value(&self) -> Result<i32> {
        self.int_value(44)
    }

    /// Returns the validation string.
    ///
    /// # Errors
    /// See [`ResourceHandle::text`].
    pub fn validation(&self) -> Result<Option<&str>> {
        self.gadget.text(48)
    }

    /// Set the validation string, growing its buffer size if needed.
    ///
    /// # Errors
    /// See [`ResourceHandle::set_string_with_length`].
    pub fn set_validation(&mut self, value: Option<&str>) -> Result<()> {
        self.set_string_with_length(48, value, None)
    }

    /// Returns the buffer size of the validation string.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] for a truncated gadget.
    pub fn max_validation(&self) -> Result<i32> {
        self.int_value(52)
    }
}

typed_gadget!(Button, GadgetType::Button);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::res::storage::RecordStorage;

    #[test]
    fn sizes() {
        assert_eq!(GadgetType::COUNT, 14);
        assert_eq!(gadget_size(128).unwrap(), 52);
        assert_eq!(gadget_size(768).unwrap(), 36);
        assert_eq!(gadget_size(960).unwrap(), 56);
        assert_eq!(gadget_size(0x0050_0080).unwrap(), 0x50);
        assert_eq!(gadget_size(0x0030_4000).unwrap(), 0x30);
        assert!(matches!(
            gadget_size(0x4000),
            Err(Error::UnknownGadgetType(0x4000))
        ));

        for gadget_type in GadgetType::iter() {
            assert_eq!(GadgetType::from_id(gadget_type.id()), Some(gadget_type));
            let relocations = gadget_type.relocations();
            assert_eq!(relocations[0], Relocation::message(28));
            assert!(relocations.iter().all(|r| r.offset + 4 <= gadget_type.size()));
        }
    }

    #[test]
    fn header() {
        let mut gadget = ResGadget::new(0x4000, 40);
        assert_eq!(gadget.type_id().unwrap(), 0x4000);
        assert_eq!(gadget.size().unwrap(), 40);
        assert_eq!(gadget.gadget_type().unwrap(), None);
        assert_eq!(gadget.help_message().unwrap(), None);

        gadget.set_component_id(3).unwrap();
        gadget.set_bbox(0, -40, 100, 0).unwrap();
        gadget.set_flags(GadgetFlags::FADED).unwrap();
        gadget.set_help_message(Some("Help")).unwrap();

        assert_eq!(gadget.component_id().unwrap(), 3);
        assert_eq!(gadget.bbox().unwrap(), (0, -40, 100, 0));
        assert!(gadget.flags().unwrap().contains(GadgetFlags::FADED));
        assert_eq!(gadget.help_message().unwrap(), Some("Help"));
        assert_eq!(gadget.max_help().unwrap(), 5);
    }

    fn registered_slots(gadget: &ResGadget) -> Vec<Relocation> {
        match gadget.handle.storage() {
            RecordStorage::Owned(record) => record.relocations().relocations(),
            RecordStorage::Borrowed(_) => panic!("new gadget is read-only"),
        }
    }

    #[test]
    fn new_gadgets_register_their_slots() {
        let cases = [
            (ActionButton::new().gadget, ActionButton::RELOCATIONS),
            (Label::new().gadget, Label::RELOCATIONS),
            (DisplayField::new().gadget, DisplayField::RELOCATIONS),
            (Button::new().gadget, Button::RELOCATIONS),
        ];
        for (gadget, expected) in cases {
            let mut slots = registered_slots(&gadget);
            slots.sort_by_key(|r| r.offset);
            assert_eq!(slots, expected);
            assert_eq!(gadget.size().unwrap(), gadget.gadget_type().unwrap().unwrap().size());
        }
        assert_eq!(Button::new().gadget.uint_value(36).unwrap(), Button::DEFAULT_BUTTON_FLAGS);
    }

    #[test]
    fn action_button() {
        let mut button = ActionButton::new();
        assert_eq!(button.size().unwrap(), 52);
        button.set_text(Some("OK")).unwrap();
        button.set_click_show(Some("Dialog")).unwrap();
        button.set_event(0x100).unwrap();
        button
            .set_button_flags(ActionButtonFlags::DEFAULT | ActionButtonFlags::LOCAL)
            .unwrap();
        button.set_flags(GadgetFlags::FADED | GadgetFlags::from_bits_retain(5)).unwrap();

        assert_eq!(button.text().unwrap(), Some("OK"));
        assert_eq!(button.max_text_len().unwrap(), 3);
        assert_eq!(button.click_show().unwrap(), Some("Dialog"));
        assert_eq!(button.event().unwrap(), 0x100);
        assert_eq!(
            button.button_flags().unwrap(),
            ActionButtonFlags::DEFAULT | ActionButtonFlags::LOCAL
        );

        let gadget: ResGadget = button.into();
        assert!(Label::try_from(gadget.clone()).is_err());
        let button = ActionButton::try_from(gadget).unwrap();
        assert_eq!(button.text().unwrap(), Some("OK"));
    }

    #[test]
    fn label_justification() {
        let mut label = Label::new();
        assert_eq!(label.justification().unwrap(), Justification::Left);
        label.set_justification(Justification::Centre).unwrap();
        label.set_label(Some("Name")).unwrap();
        assert_eq!(label.justification().unwrap(), Justification::Centre);
        assert_eq!(label.flag_value(0, 6).unwrap(), 4);
        assert_eq!(label.label().unwrap(), Some("Name"));
    }

    #[test]
    fn display_field_and_button() {
        let mut field = DisplayField::new();
        field.set_text(Some("42")).unwrap();
        field.set_justification(Justification::Right).unwrap();
        assert_eq!(field.text().unwrap(), Some("42"));
        assert_eq!(field.max_text_len().unwrap(), 3);
        assert_eq!(field.justification().unwrap(), Justification::Right);

        let mut button = Button::new();
        assert_eq!(button.button_flags().unwrap(), 0x0700_0110);
        button.set_value(Some("value")).unwrap();
        button.set_validation(Some("R2")).unwrap();
        assert_eq!(button.value().unwrap(), Some("value"));
        assert_eq!(button.max_value().unwrap(), 6);
        assert_eq!(button.validation().unwrap(), Some("R2"));
        assert_eq!(button.max_validation().unwrap(), 3);

        let mismatch = DisplayField::try_from(ResGadget::from(button));
        assert!(matches!(
            mismatch,
            Err(Error::TypeMismatch {
                found: 960,
                expected: 448
            })
        ));
    }
}
