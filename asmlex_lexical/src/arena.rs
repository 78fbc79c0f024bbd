//! Contains the definition of [`Arena`] and [`ID`].

use std::{
    fmt::Debug,
    marker::PhantomData,
    ops::{Index, IndexMut},
};

/// Represents a handle to a particular entry in the [`Arena`] of type `T`.
pub(crate) struct ID<T> {
    index: usize,
    _marker: PhantomData<T>,
}

impl<T> ID<T> {
    fn new(index: usize) -> Self {
        Self {
            index,
            _marker: PhantomData,
        }
    }
}

impl<T> Debug for ID<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ID").field(&self.index).finish()
    }
}

impl<T> Clone for ID<T> {
    fn clone(&self) -> Self { *self }
}

impl<T> Copy for ID<T> {}

impl<T> PartialEq for ID<T> {
    fn eq(&self, other: &Self) -> bool { self.index == other.index }
}

impl<T> Eq for ID<T> {}

impl<T> std::hash::Hash for ID<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) { self.index.hash(state) }
}

/// Represents a collection of items of type `T` that can be referenced by an [`ID`].
///
/// Items are never removed, so an [`ID`] handed out stays valid for as long as the arena lives,
/// no matter how many items are inserted afterwards.
#[derive(Debug, Clone)]
pub(crate) struct Arena<T> {
    items: Vec<T>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self { Self { items: Vec::new() } }
}

impl<T> Arena<T> {
    /// Inserts a new item into the [`Arena`] and returns its [`ID`].
    pub(crate) fn insert(&mut self, item: T) -> ID<T> {
        let index = self.items.len();
        self.items.push(item);
        ID::new(index)
    }

    pub(crate) fn get(&self, id: ID<T>) -> Option<&T> { self.items.get(id.index) }

    pub(crate) fn get_mut(&mut self, id: ID<T>) -> Option<&mut T> { self.items.get_mut(id.index) }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<T> { self.items.iter_mut() }
}

impl<T> Index<ID<T>> for Arena<T> {
    type Output = T;

    fn index(&self, id: ID<T>) -> &Self::Output { self.get(id).unwrap() }
}

impl<T> IndexMut<ID<T>> for Arena<T> {
    fn index_mut(&mut self, id: ID<T>) -> &mut Self::Output { self.get_mut(id).unwrap() }
}
