//! Contains the ANSI escape codes used to colour and style console output.

use std::fmt::Display;

/// Represents a style that can be applied to the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub enum Style {
    Bold,
}

/// Represents a foreground colour that can be applied to the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub enum Color {
    Red,
    Green,
    Yellow,
    Cyan,
}

impl Style {
    /// Applies the style to the given displayable object.
    pub fn with<T>(self, display: T) -> Painted<T> {
        let code = match self {
            Self::Bold => "\x1B[1m",
        };

        Painted { code, display }
    }
}

impl Color {
    /// Applies the colour to the given displayable object.
    pub fn with<T>(self, display: T) -> Painted<T> {
        let code = match self {
            Self::Red => "\x1B[31m",
            Self::Green => "\x1B[32m",
            Self::Yellow => "\x1B[33m",
            Self::Cyan => "\x1B[36m",
        };

        Painted { code, display }
    }
}

/// Is a displayable object wrapped in an escape code and a trailing reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Painted<T> {
    code: &'static str,
    display: T,
}

impl<T: Display> Display for Painted<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}\x1B[0m", self.code, self.display)
    }
}
