//! Editable collections of resource objects.

use std::{path::Path, slice};

use log::debug;

use crate::{
    config::ResourceConfig,
    file::{output::Output, Image},
    res::{codec, object::ResObject},
    Error, ItemRef, Result,
};

/// An editable set of resource objects that can be loaded from and saved to a resource file.
///
/// Every object is loaded as an owned copy, so the file is not needed after loading.
///
/// # Examples
///
/// ```rust,no_run
/// use toolres::{ResEditor, ResourceConfig};
/// use toolres::res::ResMenu;
///
/// let mut editor = ResEditor::load("Res", &ResourceConfig::default())?;
/// let mut menu = ResMenu::try_from(editor.object("Main")?.clone())?;
/// menu.set_title(Some("Edited"), None)?;
/// editor.replace(menu)?;
/// editor.save("Res")?;
/// # Ok::<(), toolres::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ResEditor {
    objects: Vec<ResObject>,
}

impl ResEditor {
    /// Create an editor without objects.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the resource file at `path`.
    ///
    /// # Errors
    /// Returns [`Error::FileError`] if the file can not be read, [`Error::Empty`] for an empty
    /// file and [`Error::Malformed`] if it is not a valid resource file.
    pub fn load(path: impl AsRef<Path>, config: &ResourceConfig) -> Result<Self> {
        let image = Image::from_file(path.as_ref())?;
        Self::load_from_mem(image.data(), config)
    }

    /// Load a resource file from memory.
    ///
    /// # Errors
    /// Returns [`Error::InvalidOperation`] for a zero sprite area in `config`,
    /// [`Error::Empty`] for empty input and [`Error::Malformed`] if `data` is not a valid
    /// resource file.
    pub fn load_from_mem(data: &[u8], config: &ResourceConfig) -> Result<Self> {
        config.validate()?;
        if data.is_empty() {
            return Err(Error::Empty);
        }

        let (_, layouts) = codec::scan(data)?;
        let objects = layouts
            .iter()
            .map(|layout| codec::read_object(data, layout, config))
            .collect::<Result<Vec<_>>>()?;

        debug!("Loaded {} objects for editing", objects.len());
        Ok(ResEditor { objects })
    }

    /// Save all objects to `path`.
    ///
    /// The file is written to a temporary file next to `path` and renamed over it once
    /// complete. If writing fails, an existing file at `path` is left unchanged.
    ///
    /// # Errors
    /// Returns [`Error::InvalidOperation`] for a read-only object without relocation table
    /// and [`Error::WriteFailed`] or [`Error::WriteFinalizationFailed`] if the file can
    /// not be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let data = self.save_to_vec()?;
        Output::write_file(path, &data)
    }

    /// Serialize all objects into a resource file image.
    ///
    /// # Errors
    /// Returns [`Error::InvalidOperation`] for a read-only object without relocation table
    /// and [`Error::Malformed`] if a reference does not fit the file format.
    pub fn save_to_vec(&self) -> Result<Vec<u8>> {
        codec::write_file(self.objects.iter())
    }

    /// Returns the number of objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns true if there are no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Iterate over the objects in file order.
    pub fn objects(&self) -> slice::Iter<'_, ResObject> {
        self.objects.iter()
    }

    /// Returns the index of the object named `name`.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<usize> {
        self.objects
            .iter()
            .position(|object| object.name_bytes() == name.as_bytes())
    }

    /// Returns true if there is an object named `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Returns the object named `name`.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if there is no such object.
    pub fn object(&self, name: &str) -> Result<&ResObject> {
        let index = self.index_of(name)?;
        Ok(&self.objects[index])
    }

    /// Returns the object named `name` for modification in place.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if there is no such object.
    pub fn object_mut(&mut self, name: &str) -> Result<&mut ResObject> {
        let index = self.index_of(name)?;
        Ok(&mut self.objects[index])
    }

    /// Append `object`.
    ///
    /// # Errors
    /// Returns [`Error::AlreadyExists`] if an object with the same name exists.
    pub fn add(&mut self, object: impl Into<ResObject>) -> Result<()> {
        let position = self.objects.len();
        self.insert(position, object)
    }

    /// Insert `object` before the object at `position`.
    ///
    /// # Errors
    /// Returns [`Error::RangeError`] if `position` is past the last object and
    /// [`Error::AlreadyExists`] if an object with the same name exists.
    pub fn insert(&mut self, position: usize, object: impl Into<ResObject>) -> Result<()> {
        let object = object.into();
        if position > self.objects.len() {
            return Err(Error::RangeError {
                offset: position,
                size: 1,
                limit: self.objects.len(),
            });
        }
        let name = object.name();
        if self.contains(&name) {
            return Err(Error::AlreadyExists(ItemRef::Object(name.into_owned())));
        }

        debug!("Adding object '{}' at {}", name, position);
        self.objects.insert(position, object);
        Ok(())
    }

    /// Replace the object with the same name as `object`.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if there is no such object.
    pub fn replace(&mut self, object: impl Into<ResObject>) -> Result<()> {
        let object = object.into();
        let index = self.index_of(&object.name())?;
        self.objects[index] = object;
        Ok(())
    }

    /// Remove and return the object named `name`.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if there is no such object.
    pub fn erase(&mut self, name: &str) -> Result<ResObject> {
        let index = self.index_of(name)?;
        debug!("Removing object '{}'", name);
        Ok(self.objects.remove(index))
    }

    /// Remove all objects.
    pub fn clear(&mut self) {
        self.objects.clear();
    }

    fn index_of(&self, name: &str) -> Result<usize> {
        self.find(name)
            .ok_or_else(|| Error::NotFound(ItemRef::Object(name.to_string())))
    }
}

impl<'a> IntoIterator for &'a ResEditor {
    type Item = &'a ResObject;
    type IntoIter = slice::Iter<'a, ResObject>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects()
    }
}
