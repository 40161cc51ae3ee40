//! # toolres Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the toolres library. Import this module to get quick access to the essential
//! types for loading, editing and saving resource files.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all toolres operations
pub use crate::Error;

/// Identifies the object or component an error refers to
pub use crate::ItemRef;

/// The result type used throughout toolres
pub use crate::Result;

/// Options applied while loading resource files
pub use crate::ResourceConfig;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// Read-only, zero-copy view of a resource file
pub use crate::ResFile;

/// Editable collection of resource objects
pub use crate::ResEditor;

/// Low-level file access
pub use crate::{Image, Parser};

// ================================================================================================
// Records and Handles
// ================================================================================================

/// Copy-on-write access to a record
pub use crate::res::{ImageView, OwnedRecord, RecordStorage, ResourceHandle};

/// Reference targets and relocations
pub use crate::res::{Reference, Relocation, RelocationKind, SpriteArea};

// ================================================================================================
// Objects and Components
// ================================================================================================

/// Generic object template
pub use crate::res::{ObjectFlags, ResObject};

/// Menu templates
pub use crate::res::{MenuFlags, MenuItemFlags, ResMenu, ResMenuItem};

/// Window templates
pub use crate::res::{ResShortcut, ResWindow, ShortcutFlags, WindowFlags};

/// Gadgets
pub use crate::res::{
    ActionButton, ActionButtonFlags, Button, DisplayField, GadgetFlags, GadgetType,
    Justification, Label, ResGadget,
};

/// Component collections
pub use crate::res::{Component, Items};
