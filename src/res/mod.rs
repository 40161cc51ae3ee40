//! The resource object model.
//!
//! A resource file holds templates for toolbox objects. Each template is a record: a fixed
//! header, a class specific body and, optionally, a string table, a message table and a
//! relocation table that marks which body words are references to texts, to other parts of
//! the body or to a sprite area.
//!
//! # Architecture
//!
//! The model is built bottom-up:
//!
//! - [`RelocationTable`] - Which body slots hold references, and what they point to
//! - [`StringArena`] - The string and message tables, as growable NUL-terminated text buffers
//! - [`RecordData`] - Relocations and arena of one record, kept consistent on every edit
//! - [`RecordStorage`] - A record that is either owned ([`OwnedRecord`]) or a read-only view
//!   into a loaded file ([`ImageView`])
//! - [`ResourceHandle`] - Shared, copy-on-write access to a record
//! - [`ResObject`], [`ResMenu`], [`ResWindow`], [`ResGadget`], [`ResShortcut`] - Typed
//!   templates and components
//! - [`ResFile`] and [`ResEditor`] - Loading and saving whole files
//!
//! # References
//!
//! In an owned record the targets of all reference slots live in the relocation table as a
//! [`Reference`], never in the slot bytes. Edits that move bytes around therefore only have
//! to fix the table. Offsets are turned into disk form when a record is written, into a copy
//! of the body.
//!
//! # Examples
//!
//! ```rust
//! use toolres::res::{ResMenu, ResMenuItem};
//!
//! let mut menu = ResMenu::new("Main");
//! menu.set_title(Some("Application"), None)?;
//! menu.add(&ResMenuItem::with_text(1, "Info")?)?;
//! menu.add(&ResMenuItem::with_text(2, "Quit")?)?;
//!
//! assert_eq!(menu.item_count()?, 2);
//! assert_eq!(menu.item(2)?.text()?, Some("Quit"));
//! # Ok::<(), toolres::Error>(())
//! ```

pub mod arena;
pub mod codec;
pub mod collection;
pub mod data;
pub mod editor;
pub mod gadget;
pub mod handle;
pub mod menu;
pub mod object;
pub mod reference;
pub mod relocation;
pub mod resfile;
pub mod shortcut;
pub mod storage;
pub mod window;

pub use arena::{StringArena, TextBuffer, TextKind};
pub use codec::{DataHeader, FileHeader, FILE_VERSION, RESF_MARKER};
pub use collection::{Component, Items};
pub use data::RecordData;
pub use editor::ResEditor;
pub use gadget::{
    gadget_size, ActionButton, ActionButtonFlags, Button, DisplayField, GadgetFlags, GadgetType,
    Justification, Label, ResGadget,
};
pub use handle::ResourceHandle;
pub use menu::{MenuFlags, MenuItemFlags, ResMenu, ResMenuItem};
pub use object::{ObjectFlags, ResObject};
pub use reference::{Reference, SpriteArea, NULL_OFFSET};
pub use relocation::{Relocation, RelocationEntry, RelocationKind, RelocationTable};
pub use resfile::ResFile;
pub use shortcut::{ResShortcut, ShortcutFlags};
pub use storage::{ImageView, OwnedRecord, RecordStorage};
pub use window::{ResWindow, WindowFlags};
