use std::fmt;

use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! out_of_bounds_error {
    () => {
        crate::Error::OutOfBounds {
            file: file!(),
            line: line!(),
        }
    };
}

/// Identifies the object or component an [`Error::NotFound`] or [`Error::AlreadyExists`]
/// refers to.
///
/// Components are always described together with the name of the object that owns them,
/// so a caller editing several templates at once can tell which one rejected the change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemRef {
    /// A top level object, identified by its template name
    Object(String),
    /// A menu entry, identified by its component id
    MenuItem {
        /// Name of the menu template
        menu: String,
        /// Component id of the entry
        id: i32,
    },
    /// A window gadget, identified by its component id
    Gadget {
        /// Name of the window template
        window: String,
        /// Component id of the gadget
        id: i32,
    },
    /// A window keyboard shortcut, identified by its key code
    Shortcut {
        /// Name of the window template
        window: String,
        /// Key code of the shortcut
        key_code: i32,
    },
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemRef::Object(name) => write!(f, "object '{name}'"),
            ItemRef::MenuItem { menu, id } => write!(f, "menu item {id} in '{menu}'"),
            ItemRef::Gadget { window, id } => write!(f, "gadget {id} in '{window}'"),
            ItemRef::Shortcut { window, key_code } => {
                write!(f, "shortcut 0x{key_code:x} in '{window}'")
            }
        }
    }
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// # Error Categories
///
/// ## Format Errors
/// - [`Error::Malformed`] - Corrupted resource file or inconsistent record tables
/// - [`Error::OutOfBounds`] - Attempted to read beyond the end of a buffer
/// - [`Error::Empty`] - Empty input provided
///
/// ## Typed View Errors
/// - [`Error::ClassMismatch`] - Object is not of the requested class
/// - [`Error::TypeMismatch`] - Gadget is not of the requested type
/// - [`Error::UnknownGadgetType`] - Gadget size can not be determined
///
/// ## Editing Errors
/// - [`Error::NotFound`] / [`Error::AlreadyExists`] - Collection lookups and uniqueness
/// - [`Error::InvalidOperation`] - Read-only record can not be modified
/// - [`Error::RangeError`] - Structural edit outside of a record body
///
/// ## I/O Errors
/// - [`Error::FileError`] - Filesystem I/O errors
/// - [`Error::WriteFailed`] / [`Error::WriteFinalizationFailed`] - Output file errors
///
/// # Examples
///
/// ```rust,no_run
/// use toolres::{Error, ResEditor, ResourceConfig};
/// use std::path::Path;
///
/// match ResEditor::load(Path::new("Res"), &ResourceConfig::default()) {
///     Ok(editor) => println!("Loaded {} objects", editor.len()),
///     Err(Error::Malformed { message, file, line }) => {
///         eprintln!("Malformed file: {} ({}:{})", message, file, line);
///     }
///     Err(Error::FileError(io_err)) => eprintln!("I/O error: {}", io_err),
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The resource data is damaged and could not be parsed.
    ///
    /// Raised for a bad file marker, truncated records, relocation tables that do not fit
    /// and references that point outside of their tables. The error includes the source
    /// location where the malformation was detected.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while reading or writing a buffer.
    #[error("Out of Bound access would have occurred - {file}:{line}")]
    OutOfBounds {
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    /// File I/O error.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// A typed object view was requested for an object of another class.
    #[error("Object '{name}' has class 0x{found:x}, expected 0x{expected:x}")]
    ClassMismatch {
        /// Name of the object
        name: String,
        /// Class id stored in the object header
        found: u32,
        /// Class id the caller asked for
        expected: u32,
    },

    /// A typed gadget view was requested for a gadget of another type.
    #[error("Gadget has type {found}, expected {expected}")]
    TypeMismatch {
        /// Type stored in the gadget header
        found: u32,
        /// Type the caller asked for
        expected: u32,
    },

    /// A gadget has neither a stored size nor a type with a known size.
    #[error("Unknown gadget type {0} without a stored size")]
    UnknownGadgetType(u32),

    /// The requested object or component does not exist.
    #[error("{0} not found")]
    NotFound(ItemRef),

    /// An object or component with the same identity already exists.
    #[error("{0} already exists")]
    AlreadyExists(ItemRef),

    /// The operation is not allowed on this record.
    ///
    /// Raised when a read-only record without relocation information has to become
    /// writeable, or when a reference is added to a read-only record.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// A structural edit addressed bytes outside of the record body.
    #[error("Range {offset}+{size} is outside of a body of {limit} bytes")]
    RangeError {
        /// Start of the edit relative to the body
        offset: usize,
        /// Number of bytes the edit covers
        size: usize,
        /// Size of the body
        limit: usize,
    },

    /// Failed to create or write the output file.
    #[error("Failed to write output file: {message}")]
    WriteFailed {
        /// Description of the failure
        message: String,
    },

    /// Failed to flush and finalize the output file.
    #[error("Failed to finalize output file: {message}")]
    WriteFinalizationFailed {
        /// Description of the failure
        message: String,
    },
}
