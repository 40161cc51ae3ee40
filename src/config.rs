//! Load configuration for resource files
//!
//! The original toolbox resolves sprite area references through a process wide pointer. Here
//! that resolution, together with the checks performed while loading, is described by an
//! explicit [`ResourceConfig`] passed to every load entry point.

use crate::{res::SpriteArea, Error, Result};

/// Configuration used when loading resource files
///
/// Loading always validates the container structure (marker, headers, table bounds). The
/// flags here control the additional work done on top of that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct ResourceConfig {
    /// Handle stored in every non-null sprite area reference of a loaded record.
    /// Must be non-zero: a zero slot means "no sprite area" in a relocated image.
    pub sprite_area: SpriteArea,
    /// Rebuild string and message tables that are not tightly packed (shared or orphaned
    /// texts). Keeps later edits from affecting texts that happen to share storage
    pub normalise_text: bool,
    /// Reject relocations whose targets lie outside of their string, message or body tables
    pub verify_references: bool,
    /// Keep relocation tables of read-only records so they can be promoted to writeable ones
    pub keep_relocations: bool,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            sprite_area: SpriteArea::CLIENT,
            normalise_text: true,
            verify_references: true,
            keep_relocations: true,
        }
    }
}

impl ResourceConfig {
    /// Creates a configuration with every check enabled
    #[must_use]
    pub fn strict() -> Self {
        Self::default()
    }

    /// Creates a configuration that loads texts exactly as stored
    ///
    /// Tables are neither verified nor rebuilt, which keeps a load/save round trip of a file
    /// produced by another tool byte-identical.
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            sprite_area: SpriteArea::CLIENT,
            normalise_text: false,
            verify_references: false,
            keep_relocations: true,
        }
    }

    /// Creates a configuration for pure viewing of read-only files
    ///
    /// Relocation tables are dropped after the image is relocated, so records served by a
    /// [`crate::res::ResFile`] can only be promoted with an explicit type relocation table.
    #[must_use]
    pub fn raw() -> Self {
        Self {
            sprite_area: SpriteArea::CLIENT,
            normalise_text: false,
            verify_references: true,
            keep_relocations: false,
        }
    }

    /// Use `area` for sprite area references
    #[must_use]
    pub fn with_sprite_area(mut self, area: SpriteArea) -> Self {
        self.sprite_area = area;
        self
    }

    /// Enable or disable text table normalisation
    #[must_use]
    pub fn with_normalise_text(mut self, normalise: bool) -> Self {
        self.normalise_text = normalise;
        self
    }

    /// Enable or disable reference verification
    #[must_use]
    pub fn with_verify_references(mut self, verify: bool) -> Self {
        self.verify_references = verify;
        self
    }

    /// Enable or disable keeping relocation tables for read-only records
    #[must_use]
    pub fn with_keep_relocations(mut self, keep: bool) -> Self {
        self.keep_relocations = keep;
        self
    }

    /// Check that the configuration can be used for loading
    ///
    /// # Errors
    /// Returns [`Error::InvalidOperation`] if the sprite area handle is zero, which a
    /// relocated image could not tell apart from a null reference.
    pub fn validate(&self) -> Result<()> {
        if self.sprite_area.0 == 0 {
            return Err(Error::InvalidOperation(
                "Sprite area handle must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}
