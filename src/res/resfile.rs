//! Read-only, zero-copy access to resource files.
//!
//! [`ResFile`] keeps the whole file as one [`Image`]. While loading, every reference slot in
//! the image is rewritten into an image-absolute position (`0` for null), which lets objects
//! and components read their texts straight from the image without any copying. Objects
//! handed out by a `ResFile` share the image; modifying one turns it into an owned copy, see
//! [`crate::res::ResourceHandle::make_writeable`].

use std::{path::Path, slice, sync::Arc};

use log::debug;

use crate::{
    config::ResourceConfig,
    file::{
        io::{read_c_bytes, read_le_at, write_le_at},
        Image,
    },
    res::{
        codec::{self, FileHeader, RecordLayout},
        handle::ResourceHandle,
        object::ResObject,
        reference::Reference,
        relocation::Relocation,
        storage::{ImageView, RecordStorage},
    },
    Error, ItemRef, Result,
};

/// A loaded resource file whose objects are read-only views of the file image.
///
/// # Examples
///
/// ```rust,no_run
/// use toolres::{ResFile, ResourceConfig};
///
/// let res = ResFile::from_file("Res", &ResourceConfig::default())?;
/// for object in res.objects() {
///     println!("{} ({:#x})", object.name(), object.class_id());
/// }
/// # Ok::<(), toolres::Error>(())
/// ```
#[derive(Debug)]
pub struct ResFile {
    image: Arc<Image>,
    header: FileHeader,
    objects: Vec<ResObject>,
}

impl ResFile {
    /// Map and load the resource file at `path`.
    ///
    /// # Errors
    /// Returns [`Error::FileError`] if the file can not be mapped, [`Error::Empty`] for an
    /// empty file, [`Error::Malformed`] if the content is not a valid resource file and
    /// [`Error::InvalidOperation`] for a zero sprite area in `config`.
    pub fn from_file(path: impl AsRef<Path>, config: &ResourceConfig) -> Result<Self> {
        Self::load(Image::from_file(path.as_ref())?, config)
    }

    /// Load a resource file from memory.
    ///
    /// # Errors
    /// Same as [`ResFile::from_file`], without the file errors.
    pub fn from_mem(data: Vec<u8>, config: &ResourceConfig) -> Result<Self> {
        Self::load(Image::from_mem(data)?, config)
    }

    fn load(mut image: Image, config: &ResourceConfig) -> Result<Self> {
        config.validate()?;
        let (header, layouts) = codec::scan(image.data())?;
        for layout in &layouts {
            relocate(image.data_mut(), layout, config)?;
        }

        let image = Arc::new(image);
        let objects = layouts
            .into_iter()
            .map(|layout| {
                let relocations = config
                    .keep_relocations
                    .then(|| Arc::<[Relocation]>::from(layout.relocations));
                let view = ImageView::new(
                    Arc::clone(&image),
                    layout.header_pos,
                    layout.body_offset,
                    layout.size,
                    relocations,
                )?;
                ResObject::from_handle(ResourceHandle::from_storage(RecordStorage::Borrowed(view)))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "Loaded read-only resource file of {} bytes with {} objects",
            image.len(),
            objects.len()
        );
        Ok(ResFile {
            image,
            header,
            objects,
        })
    }

    /// Returns the format version stored in the file.
    #[must_use]
    pub fn version(&self) -> u32 {
        self.header.version
    }

    /// Returns the number of objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns true if the file has no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Iterate over the objects in file order.
    pub fn objects(&self) -> slice::Iter<'_, ResObject> {
        self.objects.iter()
    }

    /// Returns the object named `name`.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&ResObject> {
        self.objects
            .iter()
            .find(|object| object.name_bytes() == name.as_bytes())
    }

    /// Returns true if there is an object named `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Returns a handle to the object named `name`, sharing the image.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if there is no such object.
    pub fn object(&self, name: &str) -> Result<ResObject> {
        self.find(name)
            .cloned()
            .ok_or_else(|| Error::NotFound(ItemRef::Object(name.to_string())))
    }

    /// Returns the relocated file image.
    #[must_use]
    pub fn image(&self) -> &Image {
        &self.image
    }
}

impl<'a> IntoIterator for &'a ResFile {
    type Item = &'a ResObject;
    type IntoIter = slice::Iter<'a, ResObject>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects()
    }
}

/// Rewrite the reference slots of one record into image positions.
fn relocate(data: &mut [u8], layout: &RecordLayout, config: &ResourceConfig) -> Result<()> {
    let body_pos = layout.body_pos();
    let body_size = layout.body_size();

    for relocation in &layout.relocations {
        if relocation.offset + 4 > body_size {
            return Err(malformed_error!(
                "Relocation at {} outside of a body of {} bytes",
                relocation.offset,
                body_size
            ));
        }

        let mut slot = body_pos + relocation.offset;
        let word = read_le_at::<i32>(data, &mut slot)?;
        let position = match Reference::decode(relocation.kind, word, config)? {
            Reference::Null => 0,
            Reference::Text(pos) => {
                let kind = relocation
                    .kind
                    .text_kind()
                    .ok_or_else(|| malformed_error!("Text target on {} slot", relocation.kind))?;
                let table = layout.table(kind);
                if pos >= table.len() {
                    return Err(malformed_error!(
                        "{:?} reference at {} to {} outside of a table of {} bytes",
                        kind,
                        relocation.offset,
                        pos,
                        table.len()
                    ));
                }
                if config.verify_references {
                    read_c_bytes(&data[table.clone()], pos)?;
                }
                table.start + pos
            }
            Reference::Object(offset) => {
                if config.verify_references && offset > body_size {
                    return Err(malformed_error!(
                        "Object reference at {} to {} outside of a body of {} bytes",
                        relocation.offset,
                        offset,
                        body_size
                    ));
                }
                body_pos + offset
            }
            Reference::SpriteArea(area) => area.0 as usize,
        };

        let position = u32::try_from(position)
            .map_err(|_| malformed_error!("Image position {} too large", position))?;
        let mut slot = body_pos + relocation.offset;
        write_le_at(data, &mut slot, position)?;
    }
    Ok(())
}
