//! Typed references held in relocation table entries.
//!
//! A 4-byte slot in a record body that is listed in the relocation table does not hold a
//! plain number. On disk it holds an offset (into the string table, the message table or the
//! body itself) or the `-1` sentinel. In an owned in-memory record the slot bytes are unused
//! and the target lives in the relocation entry as a [`Reference`]. In a read-only image the
//! slot holds an image-absolute position, with `0` for null.
//!
//! [`Reference::decode`] and [`Reference::encode`] are the only places where the disk form is
//! interpreted, so the `-1` sentinel is handled in exactly one spot.

use crate::{config::ResourceConfig, res::relocation::RelocationKind, Result};

/// Word stored on disk for a reference that points nowhere.
pub const NULL_OFFSET: i32 = -1;

/// Opaque handle for an externally owned sprite area.
///
/// The resource engine only stores and round-trips this value. It is supplied by
/// [`ResourceConfig::sprite_area`] at load time and written back as `0` on save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpriteArea(pub u32);

impl SpriteArea {
    /// The client application's own sprite area, the default resolution target.
    pub const CLIENT: SpriteArea = SpriteArea(1);
}

/// The target of a relocatable slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reference {
    /// No target. Stored as `-1` on disk.
    #[default]
    Null,
    /// Position of a NUL-terminated text in the string or message arena, depending on the
    /// entry kind.
    Text(usize),
    /// Offset of a sub-record relative to the start of the owning body.
    Object(usize),
    /// An external sprite area.
    SpriteArea(SpriteArea),
}

impl Reference {
    /// Returns true for [`Reference::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Reference::Null)
    }

    /// Returns the arena position of a text reference.
    #[must_use]
    pub fn text_position(&self) -> Option<usize> {
        match self {
            Reference::Text(pos) => Some(*pos),
            _ => None,
        }
    }

    /// Returns the body offset of an object reference.
    #[must_use]
    pub fn object_offset(&self) -> Option<usize> {
        match self {
            Reference::Object(offset) => Some(*offset),
            _ => None,
        }
    }

    /// Decodes the disk word of a slot of the given kind.
    ///
    /// `-1` always becomes [`Reference::Null`]. Sprite area slots resolve to the area of
    /// `config`, whatever value they hold.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for any other negative offset.
    pub fn decode(kind: RelocationKind, word: i32, config: &ResourceConfig) -> Result<Reference> {
        if word == NULL_OFFSET {
            return Ok(Reference::Null);
        }

        if kind == RelocationKind::SpriteAreaRef {
            return Ok(Reference::SpriteArea(config.sprite_area));
        }

        let Ok(offset) = usize::try_from(word) else {
            return Err(malformed_error!("Negative {} offset {}", kind, word));
        };

        Ok(match kind {
            RelocationKind::StringRef | RelocationKind::MessageRef => Reference::Text(offset),
            _ => Reference::Object(offset),
        })
    }

    /// Encodes the reference as its disk word.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if an offset does not fit in an `int32`.
    pub fn encode(&self) -> Result<i32> {
        match self {
            Reference::Null => Ok(NULL_OFFSET),
            Reference::Text(offset) | Reference::Object(offset) => i32::try_from(*offset)
                .map_err(|_| malformed_error!("Offset {} does not fit the file format", offset)),
            Reference::SpriteArea(_) => Ok(0),
        }
    }

    /// Decodes a slot of a relocated image.
    ///
    /// `word` is an image-absolute position (`0` = null) and `body_pos` the image position of
    /// the owning body, used to turn object references back into body offsets. Text
    /// references keep their image position.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for an object reference before the body.
    pub fn from_image(kind: RelocationKind, word: u32, body_pos: usize) -> Result<Reference> {
        if word == 0 {
            return Ok(Reference::Null);
        }

        let pos = word as usize;
        match kind {
            RelocationKind::StringRef | RelocationKind::MessageRef => Ok(Reference::Text(pos)),
            RelocationKind::ObjectRef => pos
                .checked_sub(body_pos)
                .map(Reference::Object)
                .ok_or_else(|| malformed_error!("Object reference {} before body {}", pos, body_pos)),
            RelocationKind::SpriteAreaRef => Ok(Reference::SpriteArea(SpriteArea(word))),
        }
    }
}
