// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
//#![deny(unsafe_code)]
// - 'file/physical.rs' uses mmap to map a file into memory

//! # toolres
//!
//! An object model for toolbox resource files: the binary templates that describe windows,
//! menus and their components.
//!
//! Every template is a variable-length record whose body contains reference slots. A
//! reference points to a text in the record's string or message table, to another part of the
//! body (the start of the gadget list of a window, for example) or to an external sprite area.
//! `toolres` keeps those references consistent while texts grow and shrink and while
//! components are inserted into and removed from a body, and it shares records between
//! handles until one of them is modified.
//!
//! ## Features
//!
//! - **Zero-copy loading** - [`ResFile`] maps a file and serves its templates without copying
//! - **Copy-on-write editing** - handles share records until the first modification
//! - **Component collections** - menu items, gadgets and keyboard shortcuts are inserted,
//!   replaced and removed inside their parent's body
//! - **Byte exact saving** - [`ResEditor`] writes files that load back to the same bytes
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use toolres::prelude::*;
//!
//! let mut editor = ResEditor::load("Res", &ResourceConfig::default())?;
//!
//! let mut window = ResWindow::try_from(editor.object("Main")?.clone())?;
//! window.set_title_text(Some("Hello, World!"))?;
//!
//! let mut label = Label::new();
//! label.set_component_id(1)?;
//! label.set_label(Some("Greetings"))?;
//! window.add_gadget(&label)?;
//!
//! editor.replace(window)?;
//! editor.save("Res")?;
//! # Ok::<(), toolres::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`res`] - The object model, the codec and the file level types
//! - [`file`] - Image backends, little-endian I/O helpers and the output writer
//! - [`ResourceConfig`] - Options applied while loading
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Logging
//!
//! The crate reports through the [`log`] facade: loading, saving and structural edits at
//! `debug` level, rebuilt text tables at `warn` level. It never installs a logger itself.

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit tests
#[cfg(test)]
pub(crate) mod test;

/// Resource image access, binary I/O helpers and output files.
pub mod file;

/// Load configuration.
pub mod config;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use toolres::prelude::*;
///
/// let mut menu = ResMenu::new("Main");
/// menu.add(&ResMenuItem::with_text(1, "Quit")?)?;
///
/// let mut editor = ResEditor::new();
/// editor.add(menu)?;
/// let bytes = editor.save_to_vec()?;
///
/// let res = ResFile::from_mem(bytes, &ResourceConfig::default())?;
/// assert!(res.contains("Main"));
/// # Ok::<(), toolres::Error>(())
/// ```
pub mod prelude;

pub mod res;

/// `toolres` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `toolres` Error type
///
/// # Examples
///
/// ```rust
/// use toolres::{Error, ResEditor, ResourceConfig};
///
/// match ResEditor::load_from_mem(b"NOPE", &ResourceConfig::default()) {
///     Ok(editor) => println!("Loaded {} objects", editor.len()),
///     Err(Error::Malformed { message, .. }) => println!("Malformed: {}", message),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
pub use error::{Error, ItemRef};

pub use config::ResourceConfig;

/// Low-level cursor for reading resource file structures.
pub use file::{parser::Parser, Image};

pub use res::{ResEditor, ResFile, ResObject, ResourceHandle};
