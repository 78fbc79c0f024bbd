//! Is a module containing the [`Token`] type and all of its related types.

use std::fmt::Display;

use asmlex_base::source_file::Location;
use enum_as_inner::EnumAsInner;
use getset::{CopyGetters, Getters};
use strum_macros::EnumIter;

/// Is an enumeration of every kind of token the scanner produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
#[allow(missing_docs)]
pub enum TokenKind {
    Invalid,
    Identifier,
    Integer,
    String,
    Float,
    LParen,
    RParen,
    Plus,
    Minus,
    Mult,
    Div,
    Mod,
    Caret,
    Tilde,
    LeftShift,
    RightShift,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    Equal,
    NotEqual,
    BitAnd,
    BitOr,
    LogAnd,
    LogOr,
    Exclamation,
    Question,
    Colon,
    LBrack,
    RBrack,
    Comma,
    Assign,
    Equ,
    EquValue,
    Hash,
    LBrace,
    RBrace,
    Dollar,
    NumberString,
    Degree,
    Separator,
}

impl TokenKind {
    /// Gets the fixed spelling of an operator or punctuation kind.
    ///
    /// Returns `None` for the kinds whose text varies (literals, identifiers, directive values).
    /// [`TokenKind::Separator`] is spelled `::` even though line ends produce it as well.
    #[must_use]
    pub fn spelling(self) -> Option<&'static str> {
        let spelling = match self {
            Self::LParen => "(",
            Self::RParen => ")",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Mult => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Caret => "^",
            Self::Tilde => "~",
            Self::LeftShift => "<<",
            Self::RightShift => ">>",
            Self::Less => "<",
            Self::Greater => ">",
            Self::LessEqual => "<=",
            Self::GreaterEqual => ">=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::LogAnd => "&&",
            Self::LogOr => "||",
            Self::Exclamation => "!",
            Self::Question => "?",
            Self::Colon => ":",
            Self::LBrack => "[",
            Self::RBrack => "]",
            Self::Comma => ",",
            Self::Assign => "=",
            Self::Hash => "#",
            Self::LBrace => "{",
            Self::RBrace => "}",
            Self::Dollar => "$",
            Self::Degree => "°",
            Self::Separator => "::",
            Self::Invalid
            | Self::Identifier
            | Self::Integer
            | Self::String
            | Self::Float
            | Self::Equ
            | Self::EquValue
            | Self::NumberString => return None,
        };

        Some(spelling)
    }
}

/// Is the value a [`Token`] carries next to its original text.
#[derive(Debug, Clone, PartialEq, EnumAsInner)]
pub enum Value {
    /// Operators, punctuation and separators carry no value.
    Empty,

    /// Integer literals and the pool index of an [`TokenKind::EquValue`].
    Integer(i64),

    /// Floating point literals.
    Float(f64),

    /// Identifiers (lowercased), decoded string literals, number strings and the description of
    /// an invalid token.
    Text(String),
}

impl Value {
    /// Compares two values by variant and payload, comparing floats by their bit pattern.
    #[must_use]
    pub fn structurally_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Empty, Self::Empty) => true,
            (Self::Integer(lhs), Self::Integer(rhs)) => lhs == rhs,
            (Self::Float(lhs), Self::Float(rhs)) => lhs.to_bits() == rhs.to_bits(),
            (Self::Text(lhs), Self::Text(rhs)) => lhs == rhs,
            _ => false,
        }
    }
}

/// Represents a single classified lexical unit.
///
/// The [`Token::original_text`] is always the exact source slice the token was scanned from, so
/// it round-trips notations such as `$00FF` or `1_000` that the parsed value doesn't preserve.
#[derive(Debug, Clone, Getters, CopyGetters)]
pub struct Token {
    /// Gets the kind of the token.
    #[get_copy = "pub"]
    kind: TokenKind,

    /// Gets the location of the first character of the token.
    #[get_copy = "pub"]
    location: Location,

    /// Gets the value of the token.
    #[get = "pub"]
    value: Value,

    /// Gets the verbatim source text of the token.
    #[get = "pub"]
    original_text: String,

    /// Set once the stream has verified that this token needs no further expansion.
    pub(crate) checked: bool,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub fn new(
        kind: TokenKind,
        location: Location,
        value: Value,
        original_text: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            location,
            value,
            original_text: original_text.into(),
            checked: false,
        }
    }

    /// Creates a token of a kind with a fixed spelling.
    ///
    /// # Panics
    /// The kind has no fixed spelling, see [`TokenKind::spelling`].
    #[must_use]
    pub fn punctuation(kind: TokenKind, location: Location) -> Self {
        let spelling = kind
            .spelling()
            .unwrap_or_else(|| panic!("{kind:?} has no fixed spelling"));

        Self::new(kind, location, Value::Empty, spelling)
    }

    /// Gets the identifier carried by an [`TokenKind::Identifier`] token.
    ///
    /// # Panics
    /// The token doesn't carry a text value.
    #[must_use]
    pub fn identifier_value(&self) -> &str { self.text("an identifier") }

    /// Gets the decoded text of a string literal, number string or invalid token.
    ///
    /// # Panics
    /// The token doesn't carry a text value.
    #[must_use]
    pub fn string_value(&self) -> &str { self.text("a string") }

    /// Gets the integer value of the token.
    ///
    /// # Panics
    /// The token doesn't carry an integer value.
    #[must_use]
    pub fn int_value(&self) -> i64 {
        *self.value.as_integer().unwrap_or_else(|| {
            panic!("requested an integer value from a {:?} token", self.kind)
        })
    }

    /// Gets the floating point value of the token.
    ///
    /// # Panics
    /// The token doesn't carry a float value.
    #[must_use]
    pub fn float_value(&self) -> f64 {
        *self
            .value
            .as_float()
            .unwrap_or_else(|| panic!("requested a float value from a {:?} token", self.kind))
    }

    /// Compares the kind and the value of two tokens, ignoring location and original text.
    #[must_use]
    pub fn structurally_eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.value.structurally_eq(&other.value)
    }

    /// Returns a copy of this token with its expansion mark cleared.
    pub(crate) fn unchecked(&self) -> Self {
        Self {
            checked: false,
            ..self.clone()
        }
    }

    pub(crate) fn into_unchecked(mut self) -> Self {
        self.checked = false;
        self
    }

    /// Returns an unchecked copy of this token moved to the given location.
    pub(crate) fn relocated(&self, location: Location) -> Self {
        Self {
            location,
            ..self.unchecked()
        }
    }

    fn text(&self, requested: &str) -> &str {
        self.value.as_text().map_or_else(
            || panic!("requested {requested} value from a {:?} token", self.kind),
            String::as_str,
        )
    }
}

impl Default for Token {
    fn default() -> Self { Self::new(TokenKind::Invalid, Location::default(), Value::Empty, "") }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.location == other.location
            && self.value == other.value
            && self.original_text == other.original_text
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.original_text)
    }
}
