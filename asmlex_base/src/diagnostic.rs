//! A module for handling the diagnostics reported while processing a source file.

use std::sync::RwLock;

/// Represents a trait responsible for receiving the diagnostics reported by a phase.
pub trait Handler<T> {
    /// Receives a diagnostic and handles it.
    fn receive(&self, diagnostic: T);
}

/// Is a struct that implements [`Handler`] trait by storing all diagnostics in a vector.
#[derive(Debug)]
pub struct Storage<T: Send + Sync> {
    diagnostics: RwLock<Vec<T>>,
}

impl<T: Send + Sync> Storage<T> {
    /// Creates a new empty [`Storage`]
    #[must_use]
    pub fn new() -> Self {
        Self {
            diagnostics: RwLock::new(Vec::new()),
        }
    }

    /// Consumes the [`Storage`] and returns the received diagnostics in order.
    pub fn into_vec(self) -> Vec<T> { self.diagnostics.into_inner().unwrap() }

    /// Returns the number of diagnostics received so far.
    pub fn len(&self) -> usize { self.diagnostics.read().unwrap().len() }

    /// Returns `true` if no diagnostic has been received.
    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

impl<T: Send + Sync> Default for Storage<T> {
    fn default() -> Self { Self::new() }
}

impl<T: Send + Sync, U> Handler<U> for Storage<T>
where
    U: Into<T>,
{
    fn receive(&self, diagnostic: U) { self.diagnostics.write().unwrap().push(diagnostic.into()); }
}

/// Is a struct that implements [`Handler`] trait by discarding every diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Dummy;

impl<T> Handler<T> for Dummy {
    fn receive(&self, _diagnostic: T) {}
}
