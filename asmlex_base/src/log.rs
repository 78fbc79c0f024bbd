//! Provides the functions related to logging/printing messages to the console.

use std::fmt::Display;

use derive_new::new;
use formatting::{Color, Style};

use crate::source_file::Location;

pub mod formatting;

/// Represents the severity of a log message to be printed to the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum Severity {
    Error,
    Info,
    Warning,
}

/// Is a struct implementing [`Display`] that represents a log message to be displayed to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, new)]
pub struct Message<T> {
    /// The severity of the log message.
    pub severity: Severity,

    /// The message to be displayed.
    pub display: T,
}

impl<T: Display> Display for Message<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let log_header = Style::Bold.with(match self.severity {
            Severity::Error => Color::Red.with("[error]:"),
            Severity::Info => Color::Green.with("[info]:"),
            Severity::Warning => Color::Yellow.with("[warning]:"),
        });

        let message_part = Style::Bold.with(&self.display);

        write!(f, "{log_header} {message_part}")
    }
}

fn get_digit(mut number: usize) -> usize {
    let mut digit = 0;

    while number > 0 {
        number /= 10;
        digit += 1;
    }

    digit
}

/// Structure implementing [`Display`] that prints a source line and underlines a run of
/// characters in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, new)]
pub struct SourceLineDisplay<'a, T> {
    /// The location of the first underlined character.
    pub location: Location,

    /// The text of the line the location points into, without its terminator.
    pub line: &'a str,

    /// The number of characters to underline (at least one is always underlined).
    pub length: usize,

    /// The help message to be displayed under the line.
    pub help_display: Option<T>,
}

impl<'a, T: Display> Display for SourceLineDisplay<'a, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let gutter_width = get_digit(self.location.line);
        let pipe = Style::Bold.with(Color::Cyan.with("┃"));

        writeln!(
            f,
            "{:gutter_width$} {} {}",
            "",
            Style::Bold.with(Color::Cyan.with("-->")),
            self.location
        )?;
        writeln!(f, "{:gutter_width$} {pipe}", "")?;

        write!(
            f,
            "{} {pipe} ",
            Style::Bold.with(Color::Cyan.with(self.location.line))
        )?;
        for char in self.line.chars() {
            // if the char is tab, print 4 spaces
            if char == '\t' {
                write!(f, "    ")?;
            } else {
                write!(f, "{char}")?;
            }
        }
        writeln!(f)?;

        write!(f, "{:gutter_width$} {pipe} ", "")?;

        let start = self.location.column.saturating_sub(1);
        let end = start + self.length.max(1);
        let mut chars = self.line.chars().chain(std::iter::repeat(' '));

        for index in 0..end {
            let width = if chars.next() == Some('\t') { 4 } else { 1 };
            let mark = if index < start { " " } else { "^" };

            for _ in 0..width {
                if index < start {
                    write!(f, "{mark}")?;
                } else {
                    write!(f, "{}", Style::Bold.with(Color::Red.with(mark)))?;
                }
            }
        }

        if let Some(help) = &self.help_display {
            write!(f, " {}: {help}", Style::Bold.with("help"))?;
        }

        writeln!(f)
    }
}
