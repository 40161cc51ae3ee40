//! Counted runs of components inside an object body.
//!
//! Menu items, window gadgets and keyboard shortcuts are stored inline in their parent's
//! body: a field holds the number of items, another fixes (or references) where the first
//! one starts, and the items follow each other without gaps. A `Collection` describes such
//! a run and implements lookup, insertion, replacement and removal on a [`ResObject`].
//! The typed collections of [`crate::res::ResMenu`] and [`crate::res::ResWindow`] are
//! thin layers over it.

use std::marker::PhantomData;

use crate::{
    res::{gadget::gadget_size, handle::ResourceHandle, object::ResObject},
    Error, ItemRef, Result,
};

/// Where the first item of a run is stored.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Start {
    /// At a fixed body offset
    Fixed(usize),
    /// At the body offset referenced by an object slot
    Referenced(usize),
}

/// How the size of an item is determined.
#[derive(Debug, Clone, Copy)]
pub(crate) enum ItemSize {
    /// Every item has the same size
    Fixed(usize),
    /// Every item is a gadget that stores its type and size in its header
    Gadget,
}

/// Kind of item, used to describe errors.
#[derive(Debug, Clone, Copy)]
pub(crate) enum ItemKind {
    MenuItem,
    Gadget,
    Shortcut,
}

impl ItemKind {
    pub(crate) fn item_ref(self, owner: &ResObject, id: i32) -> ItemRef {
        let owner = owner.name().into_owned();
        match self {
            ItemKind::MenuItem => ItemRef::MenuItem { menu: owner, id },
            ItemKind::Gadget => ItemRef::Gadget { window: owner, id },
            ItemKind::Shortcut => ItemRef::Shortcut {
                window: owner,
                key_code: id,
            },
        }
    }
}

/// Layout of a run of components in an object body.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Collection {
    pub(crate) count_field: usize,
    pub(crate) start: Start,
    pub(crate) id_offset: usize,
    pub(crate) item: ItemSize,
    pub(crate) kind: ItemKind,
}

impl Collection {
    /// Returns the number of items.
    pub(crate) fn count(&self, object: &ResObject) -> Result<usize> {
        let count = object.int_value(self.count_field)?;
        usize::try_from(count).map_err(|_| malformed_error!("Negative item count {}", count))
    }

    fn start_offset(&self, object: &ResObject) -> Result<Option<usize>> {
        match self.start {
            Start::Fixed(offset) => Ok(Some(offset)),
            Start::Referenced(slot) => object.object_ref(slot),
        }
    }

    fn item_size(&self, object: &ResObject, offset: usize) -> Result<usize> {
        match self.item {
            ItemSize::Fixed(size) => Ok(size),
            ItemSize::Gadget => gadget_size(object.uint_value(offset + 4)?),
        }
    }

    /// Returns the body offset and size of every item.
    pub(crate) fn layout(&self, object: &ResObject) -> Result<Vec<(usize, usize)>> {
        let count = self.count(object)?;
        if count == 0 {
            return Ok(Vec::new());
        }
        let Some(mut offset) = self.start_offset(object)? else {
            return Err(malformed_error!("{} items without a start", count));
        };

        let body_size = object.body_size();
        let mut items = Vec::with_capacity(count.min(body_size / 4 + 1));
        for _ in 0..count {
            let size = self.item_size(object, offset)?;
            if size == 0 || offset + size > body_size {
                return Err(malformed_error!(
                    "Item of {} bytes at {} outside of a body of {} bytes",
                    size,
                    offset,
                    body_size
                ));
            }
            items.push((offset, size));
            offset += size;
        }
        Ok(items)
    }

    /// Returns the index of the item with id `id`.
    pub(crate) fn find(&self, object: &ResObject, id: i32) -> Result<Option<usize>> {
        for (index, (offset, _)) in self.layout(object)?.into_iter().enumerate() {
            if object.int_value(offset + self.id_offset)? == id {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }

    /// Returns a handle to the item at `index`.
    pub(crate) fn item_at(&self, object: &ResObject, index: usize) -> Result<ResourceHandle> {
        let layout = self.layout(object)?;
        let Some(&(offset, size)) = layout.get(index) else {
            return Err(Error::RangeError {
                offset: index,
                size: 1,
                limit: layout.len(),
            });
        };
        object.component(offset, size)
    }

    /// Insert `item` with id `id` before the item at `index`.
    ///
    /// `empty_location` is where the first item of an empty run goes.
    pub(crate) fn insert(
        &self,
        object: &mut ResObject,
        index: usize,
        item: &ResourceHandle,
        id: i32,
        empty_location: usize,
    ) -> Result<()> {
        let layout = self.layout(object)?;
        if index > layout.len() {
            return Err(Error::RangeError {
                offset: index,
                size: 1,
                limit: layout.len(),
            });
        }
        if self.find(object, id)?.is_some() {
            return Err(Error::AlreadyExists(self.kind.item_ref(object, id)));
        }

        let location = match (layout.get(index), layout.last()) {
            (Some(&(offset, _)), _) => offset,
            (None, Some(&(offset, size))) => offset + size,
            (None, None) => empty_location,
        };

        object.insert_component(location, item)?;
        object.set_int(self.count_field, count_value(layout.len() + 1)?)?;
        if let Start::Referenced(slot) = self.start {
            if index == 0 {
                object.set_object_ref(slot, Some(location))?;
            }
        }
        Ok(())
    }

    /// Replace the item at `index` with `item`, whose id is `id`.
    pub(crate) fn replace(
        &self,
        object: &mut ResObject,
        index: usize,
        item: &ResourceHandle,
        id: i32,
    ) -> Result<()> {
        let layout = self.layout(object)?;
        let Some(&(offset, size)) = layout.get(index) else {
            return Err(Error::RangeError {
                offset: index,
                size: 1,
                limit: layout.len(),
            });
        };
        if let Some(existing) = self.find(object, id)? {
            if existing != index {
                return Err(Error::AlreadyExists(self.kind.item_ref(object, id)));
            }
        }
        object.replace_component(offset, size, item)
    }

    /// Remove the item at `index`.
    pub(crate) fn erase(&self, object: &mut ResObject, index: usize) -> Result<()> {
        let layout = self.layout(object)?;
        let Some(&(offset, size)) = layout.get(index) else {
            return Err(Error::RangeError {
                offset: index,
                size: 1,
                limit: layout.len(),
            });
        };

        object.erase_component(offset, size)?;
        let remaining = layout.len() - 1;
        object.set_int(self.count_field, count_value(remaining)?)?;
        if let Start::Referenced(slot) = self.start {
            if remaining == 0 {
                object.set_object_ref(slot, None)?;
            }
        }
        Ok(())
    }
}

fn count_value(count: usize) -> Result<i32> {
    i32::try_from(count).map_err(|_| malformed_error!("Too many items: {}", count))
}

/// A typed component that can be built from a handle.
pub trait Component: Sized {
    /// Wrap a handle to a component record.
    ///
    /// # Errors
    /// Returns an error if the record is not a valid component of this type.
    fn from_handle(handle: ResourceHandle) -> Result<Self>;
}

/// Iterator over the items of a collection.
///
/// Yields an error and stops if the collection is damaged.
pub struct Items<'a, T> {
    object: &'a ResObject,
    collection: Collection,
    layout: Option<std::vec::IntoIter<(usize, usize)>>,
    failed: bool,
    _marker: PhantomData<T>,
}

impl<'a, T: Component> Items<'a, T> {
    pub(crate) fn new(object: &'a ResObject, collection: Collection) -> Self {
        Items {
            object,
            collection,
            layout: None,
            failed: false,
            _marker: PhantomData,
        }
    }
}

impl<T: Component> Iterator for Items<'_, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        if self.layout.is_none() {
            match self.collection.layout(self.object) {
                Ok(layout) => self.layout = Some(layout.into_iter()),
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }

        let (offset, size) = self.layout.as_mut()?.next()?;
        let item = self
            .object
            .component(offset, size)
            .and_then(T::from_handle);
        if item.is_err() {
            self.failed = true;
        }
        Some(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::res::storage::OwnedRecord;

    const RUN: Collection = Collection {
        count_field: 0,
        start: Start::Fixed(4),
        id_offset: 0,
        item: ItemSize::Fixed(8),
        kind: ItemKind::MenuItem,
    };

    fn item(id: i32) -> ResourceHandle {
        let mut record = OwnedRecord::zeroed(0, 8);
        record.set_int(0, id).unwrap();
        ResourceHandle::from_owned(record)
    }

    fn ids(object: &ResObject) -> Vec<i32> {
        RUN.layout(object)
            .unwrap()
            .into_iter()
            .map(|(offset, _)| object.int_value(offset).unwrap())
            .collect()
    }

    #[test]
    fn run_ends_at_body_end() {
        let mut object = ResObject::new("Run", 0x1234, 100, 4);
        RUN.insert(&mut object, 0, &item(1), 1, 4).unwrap();
        RUN.insert(&mut object, 1, &item(2), 2, 4).unwrap();
        RUN.insert(&mut object, 1, &item(3), 3, 4).unwrap();
        assert_eq!(ids(&object), [1, 3, 2]);
        assert_eq!(RUN.layout(&object).unwrap().last(), Some(&(20, 8)));

        RUN.erase(&mut object, 1).unwrap();
        assert_eq!(ids(&object), [1, 2]);
        assert_eq!(object.body_size(), 20);
        assert_eq!(RUN.find(&object, 2).unwrap(), Some(1));

        assert!(matches!(
            RUN.insert(&mut object, 0, &item(2), 2, 4),
            Err(Error::AlreadyExists(_))
        ));
        RUN.erase(&mut object, 0).unwrap();
        RUN.erase(&mut object, 0).unwrap();
        assert_eq!(RUN.count(&object).unwrap(), 0);
        assert_eq!(object.body_size(), 4);
    }
}
