//! Contains all kinds of lexical errors that can occur while scanning the source code.
//!
//! None of them stops the scanner: each one is reported alongside an
//! [`TokenKind::Invalid`](crate::token::TokenKind::Invalid) token covering the offending text.

use std::fmt::Display;

use asmlex_base::{
    log::{Message, Severity, SourceLineDisplay},
    source_file::Location,
};
use derive_more::From;
use enum_as_inner::EnumAsInner;

use crate::scanner::LiteralError;

/// A string literal isn't closed before the end of its line.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnterminatedString {
    /// The location of the opening quote.
    pub location: Location,

    /// The text of the line containing the literal.
    pub line: String,

    /// The number of characters from the opening quote to the end of the line.
    pub length: usize,
}

impl Display for UnterminatedString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\n{}",
            Message::new(Severity::Error, "found an unterminated string literal"),
            SourceLineDisplay::new(
                self.location,
                &self.line,
                self.length,
                Some("add a closing `\"` before the end of the line")
            )
        )
    }
}

/// The source ends inside a `/*` comment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnterminatedComment {
    /// The location of the opening `/*`.
    pub location: Location,

    /// The text of the line containing the opening `/*`.
    pub line: String,
}

impl Display for UnterminatedComment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\n{}",
            Message::new(Severity::Error, "found an unclosed `/*` comment"),
            SourceLineDisplay::new(self.location, &self.line, 2, Option::<i32>::None)
        )
    }
}

/// A string or character literal contains an unknown escape sequence.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InvalidEscape {
    /// The location of the backslash.
    pub location: Location,

    /// The text of the line containing the literal.
    pub line: String,

    /// The character following the backslash.
    pub escape: char,
}

impl Display for InvalidEscape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\n{}",
            Message::new(
                Severity::Error,
                format!("found an unknown escape sequence `\\{}`", self.escape)
            ),
            SourceLineDisplay::new(
                self.location,
                &self.line,
                2,
                Some("supported escapes are \\\", \\', \\\\, \\n, \\r, \\t and \\0")
            )
        )
    }
}

/// A character literal doesn't contain exactly one character.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InvalidCharacterLiteral {
    /// The location of the opening quote.
    pub location: Location,

    /// The text of the line containing the literal.
    pub line: String,

    /// The number of characters of the literal, quotes included.
    pub length: usize,
}

impl Display for InvalidCharacterLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\n{}",
            Message::new(
                Severity::Error,
                "a character literal must contain exactly one character"
            ),
            SourceLineDisplay::new(self.location, &self.line, self.length, Option::<i32>::None)
        )
    }
}

/// A numeric literal can't be converted to a value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MalformedNumber {
    /// The location of the first character of the literal.
    pub location: Location,

    /// The text of the line containing the literal.
    pub line: String,

    /// The number of characters of the literal.
    pub length: usize,

    /// Why the conversion failed.
    pub reason: LiteralError,
}

impl Display for MalformedNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\n{}",
            Message::new(Severity::Error, "found a malformed numeric literal"),
            SourceLineDisplay::new(self.location, &self.line, self.length, Some(self.reason))
        )
    }
}

/// A character that can't start any token.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnexpectedCharacter {
    /// The location of the character.
    pub location: Location,

    /// The text of the line containing the character.
    pub line: String,

    /// The offending character.
    pub character: char,
}

impl Display for UnexpectedCharacter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\n{}",
            Message::new(
                Severity::Error,
                format!("found an unexpected character `{}`", self.character)
            ),
            SourceLineDisplay::new(self.location, &self.line, 1, Option::<i32>::None)
        )
    }
}

/// Is an enumeration containing all kinds of lexical errors that can occur while scanning the
/// source code.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, EnumAsInner, From)]
#[allow(missing_docs)]
pub enum Error {
    UnterminatedString(UnterminatedString),
    UnterminatedComment(UnterminatedComment),
    InvalidEscape(InvalidEscape),
    InvalidCharacterLiteral(InvalidCharacterLiteral),
    MalformedNumber(MalformedNumber),
    UnexpectedCharacter(UnexpectedCharacter),
}

impl Error {
    /// Gets the location the error points at.
    #[must_use]
    pub fn location(&self) -> Location {
        match self {
            Self::UnterminatedString(err) => err.location,
            Self::UnterminatedComment(err) => err.location,
            Self::InvalidEscape(err) => err.location,
            Self::InvalidCharacterLiteral(err) => err.location,
            Self::MalformedNumber(err) => err.location,
            Self::UnexpectedCharacter(err) => err.location,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnterminatedString(err) => write!(f, "{err}"),
            Self::UnterminatedComment(err) => write!(f, "{err}"),
            Self::InvalidEscape(err) => write!(f, "{err}"),
            Self::InvalidCharacterLiteral(err) => write!(f, "{err}"),
            Self::MalformedNumber(err) => write!(f, "{err}"),
            Self::UnexpectedCharacter(err) => write!(f, "{err}"),
        }
    }
}
