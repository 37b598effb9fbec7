
use crate::{
    error::{DomainError, ErrorClass},
    value::Value,
};
use thiserror::Error as ThisError;

///
/// CollectionError
///

#[derive(Debug, ThisError)]
pub enum CollectionError {
    #[error("collection is empty")]
    EmptyCollection,

    #[error("no element at key {key}")]
    UnknownElement { key: usize },
}

impl CollectionError {
    pub(crate) const fn class(&self) -> ErrorClass {
        match self {
            Self::EmptyCollection | Self::UnknownElement { .. } => ErrorClass::NotFound,
        }
    }
}

///
/// Collection
///
/// Ordered, keyed sequence of elements.
///
/// Keys are assigned at creation (0, 1, …) and travel with their element:
/// `filter` and `slice` keep the original keys, so `get` on a derived
/// collection uses the source's keys. Nothing mutates in place; every
/// transformation returns a new collection.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Collection<T> {
    entries: Vec<(usize, T)>,
}

impl<T> Collection<T> {
    #[must_use]
    pub fn new(items: Vec<T>) -> Self {
        Self {
            entries: items.into_iter().enumerate().collect(),
        }
    }

    #[must_use]
    pub const fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub const fn count(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn contains(&self, item: &T) -> bool
    where
        T: PartialEq,
    {
        self.entries.iter().any(|(_, element)| element == item)
    }

    #[must_use]
    pub fn contains_key(&self, key: usize) -> bool {
        self.entries.iter().any(|(k, _)| *k == key)
    }

    pub fn first(&self) -> Result<&T, DomainError> {
        self.entries
            .first()
            .map(|(_, element)| element)
            .ok_or_else(|| CollectionError::EmptyCollection.into())
    }

    pub fn last(&self) -> Result<&T, DomainError> {
        self.entries
            .last()
            .map(|(_, element)| element)
            .ok_or_else(|| CollectionError::EmptyCollection.into())
    }

    pub fn get(&self, key: usize) -> Result<&T, DomainError> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, element)| element)
            .ok_or_else(|| CollectionError::UnknownElement { key }.into())
    }

    pub fn keys(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.iter().map(|(key, _)| *key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, element)| element)
    }

    /// Key/element pairs in order.
    pub fn entries(&self) -> impl Iterator<Item = (usize, &T)> {
        self.entries.iter().map(|(key, element)| (*key, element))
    }

    /// Elements matching `predicate`, keys preserved.
    #[must_use]
    pub fn filter(&self, predicate: impl Fn(&T) -> bool) -> Self
    where
        T: Clone,
    {
        Self {
            entries: self
                .entries
                .iter()
                .filter(|(_, element)| predicate(element))
                .cloned()
                .collect(),
        }
    }

    /// Up to `limit` elements starting at position `offset`, keys preserved.
    ///
    /// `limit == 0` means "everything from `offset`". An offset past the
    /// end yields an empty collection.
    #[must_use]
    pub fn slice(&self, offset: usize, limit: usize) -> Self
    where
        T: Clone,
    {
        let take = if limit == 0 { usize::MAX } else { limit };

        Self {
            entries: self
                .entries
                .iter()
                .skip(offset)
                .take(take)
                .cloned()
                .collect(),
        }
    }

    /// Element-wise transform, keys preserved.
    #[must_use]
    pub fn map<U>(&self, f: impl Fn(&T) -> U) -> Collection<U> {
        Collection {
            entries: self
                .entries
                .iter()
                .map(|(key, element)| (*key, f(element)))
                .collect(),
        }
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        self.entries.into_iter().map(|(_, element)| element).collect()
    }
}

impl Collection<Value> {
    /// Collection view of a loose value: a list yields its elements, `Null`
    /// yields nothing, and any other value becomes a single element.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::List(items) => Self::new(items),
            Value::Null => Self::empty(),
            other => Self::new(vec![other]),
        }
    }
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> FromIterator<T> for Collection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<T> From<Vec<T>> for Collection<T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

impl<T> IntoIterator for Collection<T> {
    type Item = T;
    type IntoIter = std::iter::Map<std::vec::IntoIter<(usize, T)>, fn((usize, T)) -> T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries
            .into_iter()
            .map(into_element::<T> as fn((usize, T)) -> T)
    }
}

fn into_element<T>((_, element): (usize, T)) -> T {
    element
}
