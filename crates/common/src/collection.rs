// Ordered, ID-keyed collections shared by every document type.
//
// The vector is the source of truth for order; the position map is an
// accelerator rebuilt after every structural change.

use std::collections::HashMap;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DomainError;

/// An entity stored in an [`IdList`].
pub trait Identified {
    /// Human-readable entity name used in error messages.
    const ENTITY: &'static str;

    fn id(&self) -> &str;
}

#[derive(Debug, Clone)]
pub struct IdList<T> {
    items: Vec<T>,
    positions: HashMap<String, usize>,
}

impl<T> Default for IdList<T> {
    fn default() -> Self {
        Self { items: Vec::new(), positions: HashMap::new() }
    }
}

impl<T: PartialEq> PartialEq for IdList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<T: Identified> IdList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an existing list, rejecting duplicate IDs.
    pub fn from_items(items: Vec<T>) -> Result<Self, DomainError> {
        let mut list = Self { items: Vec::with_capacity(items.len()), positions: HashMap::new() };
        for item in items {
            list.insert(item)?;
        }
        Ok(list)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.positions.get(id).map(|&position| &self.items[position])
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(Identified::id)
    }

    /// Append a new element. Fails with `DuplicateId` if the ID is taken.
    pub fn insert(&mut self, item: T) -> Result<(), DomainError> {
        let id = item.id().to_owned();
        if self.positions.contains_key(&id) {
            return Err(DomainError::duplicate(T::ENTITY, id));
        }
        self.positions.insert(id, self.items.len());
        self.items.push(item);
        Ok(())
    }

    /// Mutate one element in place. Fails with `NotFound` if absent.
    ///
    /// The closure must not change the element's ID.
    pub fn update<F>(&mut self, id: &str, apply: F) -> Result<(), DomainError>
    where
        F: FnOnce(&mut T),
    {
        let position =
            *self.positions.get(id).ok_or_else(|| DomainError::not_found(T::ENTITY, id))?;
        apply(&mut self.items[position]);
        debug_assert_eq!(self.items[position].id(), id, "update must not re-key an element");
        Ok(())
    }

    /// Remove the element with `id`. Absent IDs are a silent no-op.
    pub fn remove(&mut self, id: &str) -> Option<T> {
        let position = self.positions.remove(id)?;
        let removed = self.items.remove(position);
        self.reindex();
        Some(removed)
    }

    /// Replace the list with the elements named in `order`, in that order.
    ///
    /// Unknown IDs are skipped, unmentioned elements are dropped, and an ID
    /// repeated in `order` is taken once.
    pub fn reorder<S: AsRef<str>>(&mut self, order: &[S]) {
        let mut slots: Vec<Option<T>> =
            std::mem::take(&mut self.items).into_iter().map(Some).collect();
        let mut reordered = Vec::with_capacity(order.len().min(slots.len()));
        for id in order {
            if let Some(&position) = self.positions.get(id.as_ref()) {
                if let Some(item) = slots[position].take() {
                    reordered.push(item);
                }
            }
        }
        self.items = reordered;
        self.reindex();
    }

    /// Visit every element mutably. The closure must not change IDs.
    pub fn modify_each<F>(&mut self, mut apply: F)
    where
        F: FnMut(&mut T),
    {
        for item in &mut self.items {
            apply(item);
        }
        self.reindex();
    }

    fn reindex(&mut self) {
        self.positions.clear();
        for (position, item) in self.items.iter().enumerate() {
            self.positions.insert(item.id().to_owned(), position);
        }
    }
}

impl<'a, T> IntoIterator for &'a IdList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: Serialize> Serialize for IdList<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.items.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for IdList<T>
where
    T: Deserialize<'de> + Identified,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let items = Vec::<T>::deserialize(deserializer)?;
        Self::from_items(items).map_err(de::Error::custom)
    }
}
