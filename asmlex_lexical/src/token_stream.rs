//! Contains the [`TokenStream`] engine and its related types.
//!
//! A stream owns a token sequence, a cursor into it and a registry of replacements. Identifiers
//! bound to a replacement are expanded lazily, at the moment traversal reaches them, by rewriting
//! the sequence in place; cursors saved earlier stay valid across the rewrite.

use std::collections::HashMap;

use asmlex_base::source_file::Location;

use crate::{
    context::Context,
    sequence::{NodeID, Sequence},
    token::{Token, TokenKind, Value},
};

/// The deepest chain of nested replacements expanded for a single source token.
pub const MAX_EXPANSION_DEPTH: usize = 64;

/// Is the content an identifier expands to.
#[derive(Debug, Clone, PartialEq)]
pub enum Replacement {
    /// A captured token list spliced in as is.
    Tokens(Vec<Token>),

    /// Another identifier; the replaced token is renamed.
    Identifier(String),

    /// A single string literal.
    String(String),

    /// A single integer literal.
    Integer(i64),

    /// A single floating point literal.
    Float(f64),
}

impl Replacement {
    /// Materializes the tokens of the replacement; scalars become one synthetic token.
    fn tokens(&self, location: Location) -> Vec<Token> {
        let scalar = |kind, value, text: String| vec![Token::new(kind, location, value, text)];

        match self {
            Self::Tokens(tokens) => tokens.iter().map(|x| x.relocated(location)).collect(),
            Self::Identifier(identifier) => scalar(
                TokenKind::Identifier,
                Value::Text(identifier.to_lowercase()),
                identifier.clone(),
            ),
            Self::String(string) => scalar(
                TokenKind::String,
                Value::Text(string.clone()),
                format!("{string:?}"),
            ),
            Self::Integer(integer) => scalar(
                TokenKind::Integer,
                Value::Integer(*integer),
                integer.to_string(),
            ),
            Self::Float(float) => scalar(TokenKind::Float, Value::Float(*float), float.to_string()),
        }
    }
}

/// Is an opaque cursor into the sequence of one particular [`TokenStream`].
///
/// A position stays meaningful while the stream that handed it out lives and isn't reloaded;
/// expansions performed meanwhile don't move it. Handing it to any other stream panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    sequence: u64,

    /// `None` is the terminal position.
    node: Option<NodeID>,
}

/// Is a navigable, backtrackable stream of tokens with lazy replacement expansion.
///
/// A stream is populated once, either by scanning a text source (see [`TokenStream::scan`]) or
/// by replaying an existing token list (see [`TokenStream::replay`]). Afterwards the sequence only
/// changes through expansions triggered by the traversal methods themselves.
#[derive(Debug, Clone)]
pub struct TokenStream {
    sequence: Sequence,
    position: Position,
    replacements: HashMap<String, Replacement>,
    context: Context,
    invalid_token: Token,
}

impl TokenStream {
    /// Creates a stream replaying the given tokens, with its own cursor and an empty replacement
    /// registry.
    #[must_use]
    pub fn replay(tokens: impl IntoIterator<Item = Token>, context: &Context) -> Self {
        let sequence = Sequence::new(tokens.into_iter().map(Token::into_unchecked));
        let position = Position {
            sequence: sequence.id(),
            node: sequence.head(),
        };

        Self {
            sequence,
            position,
            replacements: HashMap::new(),
            context: context.clone(),
            invalid_token: Token::default(),
        }
    }

    /// Replaces the whole sequence with the given tokens and rewinds the cursor.
    ///
    /// Positions obtained before the reload are rejected afterwards. Registered replacements are
    /// kept.
    pub fn load(&mut self, tokens: impl IntoIterator<Item = Token>) {
        self.sequence = Sequence::new(tokens.into_iter().map(Token::into_unchecked));
        self.position = Position {
            sequence: self.sequence.id(),
            node: self.sequence.head(),
        };
    }

    /// Gets the context the stream interns its constant values into.
    #[must_use]
    pub fn context(&self) -> &Context { &self.context }

    /// Returns the token under the cursor and moves the cursor past it.
    ///
    /// Pending expansions at the cursor are performed first, so the returned token is never an
    /// identifier that still has to be replaced. At the end of the sequence an
    /// [`TokenKind::Invalid`] token is returned and the cursor stays put.
    pub fn next(&mut self) -> &Token {
        let Some(id) = self.resolve(self.position.node) else {
            return &self.invalid_token;
        };

        self.position.node = self.sequence.next(id);
        &self.sequence.node(id).token
    }

    /// Returns the token `ahead` positions past the cursor without moving the cursor.
    ///
    /// `peek(0)` is the token [`TokenStream::next`] would return. Expansions on the way are
    /// performed.
    pub fn peek(&mut self, ahead: usize) -> &Token {
        let mut current = self.position.node;

        for _ in 0..ahead {
            let Some(id) = self.resolve(current) else {
                return &self.invalid_token;
            };

            current = self.sequence.next(id);
        }

        match self.resolve(current) {
            Some(id) => &self.sequence.node(id).token,
            None => &self.invalid_token,
        }
    }

    /// Consumes `count` tokens, stopping early at the end of the sequence.
    pub fn advance_by(&mut self, count: usize) {
        for _ in 0..count {
            let Some(id) = self.resolve(self.position.node) else {
                break;
            };

            self.position.node = self.sequence.next(id);
        }
    }

    /// Checks whether the cursor is at the terminal position, i.e. no further token can be
    /// produced.
    pub fn at_end(&mut self) -> bool { self.resolve(self.position.node).is_none() }

    /// Takes a snapshot of the cursor.
    #[must_use]
    pub fn save_position(&self) -> Position { self.position }

    /// Moves the cursor back (or forward) to a saved position. Expansions performed since the
    /// snapshot are kept.
    ///
    /// # Panics
    /// The position doesn't belong to this stream's current sequence.
    pub fn restore_position(&mut self, position: Position) {
        self.check_position(position);
        self.position = position;
    }

    /// Gets the position of the live token right before the given one.
    ///
    /// Returns `None` when the given position is the first one.
    ///
    /// # Panics
    /// The position doesn't belong to this stream's current sequence.
    #[must_use]
    pub fn previous_position(&self, position: Position) -> Option<Position> {
        self.check_position(position);

        let mut current = match position.node {
            Some(id) => self.sequence.prev(id),
            None => self.sequence.tail(),
        };

        while let Some(id) = current {
            if !self.sequence.node(id).removed {
                return Some(Position {
                    sequence: position.sequence,
                    node: Some(id),
                });
            }

            current = self.sequence.prev(id);
        }

        None
    }

    /// Copies the tokens in the half-open range `[start, end)`.
    ///
    /// The copies carry no expansion marks; identifiers not yet expanded are copied verbatim.
    ///
    /// # Panics
    /// Either position doesn't belong to this stream, or `end` comes before `start`.
    #[must_use]
    pub fn capture_slice(&self, start: Position, end: Position) -> Vec<Token> {
        self.check_position(start);
        self.check_position(end);

        let mut tokens = Vec::new();
        let mut current = start.node;

        while current != end.node {
            let id = current.expect("the end position comes before the start position");
            let node = self.sequence.node(id);

            if !node.removed {
                tokens.push(node.token.unchecked());
            }

            current = node.next;
        }

        tokens
    }

    /// Creates an independent stream over `[start, end)` that shares this stream's context.
    ///
    /// # Panics
    /// See [`TokenStream::capture_slice`].
    #[must_use]
    pub fn replay_slice(&self, start: Position, end: Position) -> Self {
        Self::replay(self.capture_slice(start, end), &self.context)
    }

    /// Binds an identifier to a token list. A later registration for the same identifier wins.
    pub fn register_replacement(&mut self, identifier: &str, tokens: Vec<Token>) {
        self.insert_replacement(identifier, Replacement::Tokens(tokens));
    }

    /// Binds an identifier to another identifier.
    pub fn register_replacement_identifier(&mut self, identifier: &str, new_identifier: &str) {
        self.insert_replacement(
            identifier,
            Replacement::Identifier(new_identifier.to_owned()),
        );
    }

    /// Binds an identifier to a string literal.
    pub fn register_replacement_string(&mut self, identifier: &str, value: &str) {
        self.insert_replacement(identifier, Replacement::String(value.to_owned()));
    }

    /// Binds an identifier to an integer literal.
    pub fn register_replacement_integer(&mut self, identifier: &str, value: i64) {
        self.insert_replacement(identifier, Replacement::Integer(value));
    }

    /// Binds an identifier to a floating point literal.
    pub fn register_replacement_float(&mut self, identifier: &str, value: f64) {
        self.insert_replacement(identifier, Replacement::Float(value));
    }

    /// Binds an identifier to the constant value stored in the context under `index`, as carried
    /// by an [`TokenKind::EquValue`] token.
    ///
    /// # Panics
    /// The context holds no constant value with that index.
    pub fn register_constant_replacement(&mut self, identifier: &str, index: usize) {
        let tokens = self
            .context
            .constant_value(index)
            .unwrap_or_else(|| panic!("no constant value with index {index}"));

        self.register_replacement(identifier, tokens);
    }

    /// Binds an identifier to any kind of [`Replacement`].
    pub fn insert_replacement(&mut self, identifier: &str, replacement: Replacement) {
        self.replacements.insert(identifier.to_lowercase(), replacement);
    }

    /// Adds a constant value to the context's pool; see [`Context::add_constant_value`].
    pub fn add_constant_value(&self, tokens: &[Token]) -> usize {
        self.context.add_constant_value(tokens)
    }

    /// Empties the context's constant pool; see [`Context::clear_constant_pool`].
    pub fn clear_constant_pool(&self) { self.context.clear_constant_pool(); }

    /// Clears the expansion mark of every token so that identifiers are looked up again, e.g.
    /// after the replacements changed. Tokens produced by an expansion still never re-expand an
    /// identifier of their own expansion chain.
    pub fn reset_expansion_marks(&mut self) {
        for node in self.sequence.nodes_mut() {
            node.token.checked = false;
        }
    }

    fn check_position(&self, position: Position) {
        assert_eq!(
            position.sequence,
            self.sequence.id(),
            "the position belongs to a different token sequence"
        );
    }

    /// Finds the first live token at or after `current`, expanding it until it needs no further
    /// replacement. Returns `None` at the end of the sequence.
    fn resolve(&mut self, mut current: Option<NodeID>) -> Option<NodeID> {
        while let Some(id) = current {
            let node = self.sequence.node(id);

            if node.removed {
                current = node.next;
                continue;
            }

            if node.token.checked {
                return Some(id);
            }

            if !self.expand(id) {
                self.sequence.node_mut(id).token.checked = true;
            }
        }

        None
    }

    /// Checks whether the next live token is [`TokenKind::Equ`], i.e. the token at `id` names the
    /// constant being defined and must stay an identifier.
    fn precedes_equ(&self, id: NodeID) -> bool {
        let mut current = self.sequence.next(id);

        while let Some(next) = current {
            let node = self.sequence.node(next);

            if !node.removed {
                return node.token.kind() == TokenKind::Equ;
            }

            current = node.next;
        }

        false
    }

    /// Splices the replacement of the identifier at `id` into the sequence.
    ///
    /// The first replacement token overwrites the identifier's node so that positions pointing
    /// at it see the expansion from its start; the rest is linked after it. Returns `false` when
    /// nothing was expanded.
    fn expand(&mut self, id: NodeID) -> bool {
        let node = self.sequence.node(id);

        if node.token.kind() != TokenKind::Identifier
            || node.expanded_from.len() >= MAX_EXPANSION_DEPTH
            || self.precedes_equ(id)
        {
            return false;
        }

        let name = node.token.identifier_value();

        let Some(replacement) = self.replacements.get(name) else {
            return false;
        };

        if node.expanded_from.iter().any(|x| x == name) {
            return false;
        }

        let mut expanded_from = node.expanded_from.clone();
        expanded_from.push(name.to_owned());

        let mut tokens = replacement.tokens(node.token.location()).into_iter();

        let node = self.sequence.node_mut(id);
        let Some(first) = tokens.next() else {
            node.removed = true;
            return true;
        };

        node.token = first;
        node.expanded_from = expanded_from.clone();

        let mut last = id;
        for token in tokens {
            last = self
                .sequence
                .insert_after(last, token, expanded_from.clone());
        }

        true
    }
}
