//! Contains the [`Context`] shared by all the token streams of one compilation unit.

use std::sync::{Arc, RwLock};

use crate::token::Token;

/// Is a deduplicated, append-only list of constant right-hand sides.
///
/// Each distinct token list gets a stable index; lists are compared with
/// [`Token::structurally_eq`], so two definitions spelled differently but scanning to the same
/// kinds and values share one index.
#[derive(Debug, Clone, Default)]
struct ConstantPool {
    values: Vec<Vec<Token>>,
}

impl ConstantPool {
    fn add(&mut self, tokens: &[Token]) -> usize {
        let existing = self.values.iter().position(|value| {
            value.len() == tokens.len()
                && value
                    .iter()
                    .zip(tokens)
                    .all(|(lhs, rhs)| lhs.structurally_eq(rhs))
        });

        existing.unwrap_or_else(|| {
            self.values.push(tokens.iter().map(Token::unchecked).collect());
            self.values.len() - 1
        })
    }
}

/// Is the state that outlives a single token stream: the constant value pool.
///
/// Cloning a [`Context`] yields another handle to the same pool. Every stream scanned or replayed
/// for one compilation unit should receive a handle to the same context, and the pool must be
/// cleared (or a new context created) before an unrelated unit is processed; nothing clears it
/// implicitly. Streams sharing a context must be driven from a single thread at a time.
#[derive(Debug, Clone, Default)]
pub struct Context {
    constants: Arc<RwLock<ConstantPool>>,
}

impl Context {
    /// Creates a new context with an empty constant pool.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Adds a constant value to the pool, returning the index of an existing structurally equal
    /// value if there is one.
    pub fn add_constant_value(&self, tokens: &[Token]) -> usize {
        self.constants.write().unwrap().add(tokens)
    }

    /// Gets a copy of the constant value stored at the given index.
    #[must_use]
    pub fn constant_value(&self, index: usize) -> Option<Vec<Token>> {
        self.constants.read().unwrap().values.get(index).cloned()
    }

    /// Returns the number of distinct constant values in the pool.
    #[must_use]
    pub fn constant_count(&self) -> usize { self.constants.read().unwrap().values.len() }

    /// Removes every constant value from the pool. Indices handed out before are meaningless
    /// afterwards.
    pub fn clear_constant_pool(&self) { self.constants.write().unwrap().values.clear(); }
}
