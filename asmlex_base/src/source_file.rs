#![allow(clippy::future_not_send)]

//! Contains the code related to the source code input.

use std::{
    fmt::{Debug, Display},
    fs::File,
    ops::Range,
    path::PathBuf,
    sync::Arc,
};

use getset::Getters;
use memmap::MmapOptions;
use ouroboros::self_referencing;
use thiserror::Error;

/// Represents an error that occurs when loading/creating a source file.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum Error {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    Utf8Error(#[from] std::str::Utf8Error),
}

/// Represents an assembly source file mapped into memory.
#[derive(Getters)]
pub struct SourceFile {
    source: MappedSource,

    /// Gets the full path to the source file.
    #[get = "pub"]
    full_path: PathBuf,

    /// Byte ranges of every line, terminators included.
    lines: Vec<Range<usize>>,
}

impl Debug for SourceFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceFile")
            .field("full_path", &self.full_path)
            .field("lines", &self.lines.len())
            .finish()
    }
}

#[self_referencing]
struct MappedSource {
    file: File,
    mapped: Option<memmap::Mmap>,

    #[borrows(mapped)]
    mapped_str: &'this str,
}

impl MappedSource {
    fn create(file: File) -> Result<Self, Error> {
        let mapped = if file.metadata()?.len() == 0 {
            None
        } else {
            Some(unsafe { MmapOptions::new().map(&file)? })
        };
        MappedSourceTryBuilder {
            file,
            mapped,
            mapped_str_builder: |mapped| {
                mapped
                    .as_ref()
                    .map_or(Ok(""), |mapped| std::str::from_utf8(mapped).map_err(Error::from))
            },
        }
        .try_build()
    }

    fn content(&self) -> &str { self.borrow_mapped_str() }
}

impl SourceFile {
    fn new(full_path: PathBuf, source: MappedSource) -> Arc<Self> {
        let lines = get_line_byte_positions(source.content());
        Arc::new(Self {
            source,
            full_path,
            lines,
        })
    }

    /// Gets the content of the source file.
    #[must_use]
    pub fn content(&self) -> &str { self.source.content() }

    /// Gets the line of the source file at the given line number, without its terminator.
    ///
    /// The line number starts at 1.
    #[must_use]
    pub fn get_line(&self, line: usize) -> Option<&str> {
        let range = self.lines.get(line.checked_sub(1)?)?;
        let line = &self.source.content()[range.clone()];
        let line = line.strip_suffix('\n').unwrap_or(line);

        Some(line.strip_suffix('\r').unwrap_or(line))
    }

    /// Gets the number of lines in the source file.
    #[must_use]
    pub fn line_count(&self) -> usize { self.lines.len() }

    /// Gets a [`Lines`] reader that hands out the lines of this file in order.
    #[must_use]
    pub fn lines(&self) -> Lines { Lines::new(self) }

    /// Loads the source file from the given file path.
    ///
    /// # Errors
    /// - [`Error::IoError`]: Error occurred when mapping the file to memory.
    /// - [`Error::Utf8Error`]: Error occurred when converting the mapped bytes to a string.
    pub fn load(file: File, path: PathBuf) -> Result<Arc<Self>, Error> {
        let source = MappedSource::create(file)?;
        Ok(Self::new(path, source))
    }

    /// Creates a temporary source file and writes the given displayable object to it.
    ///
    /// # Errors
    /// - [`Error::IoError`]: Error occurred when creating the temporary file, writing to, and
    ///   mapping it to memory.
    /// - [`Error::Utf8Error`]: Error occurred when converting the mapped bytes to a string.
    pub fn temp(display: impl Display) -> Result<Arc<Self>, Error> {
        use std::io::Write;

        let mut tempfile = tempfile::Builder::new()
            .prefix("asmlex")
            .suffix(".asm")
            .tempfile()?;

        write!(tempfile.as_file_mut(), "{display}")?;
        let path = tempfile.path().to_owned();

        Self::load(tempfile.into_file(), path)
    }
}

/// Is a struct pointing to a particular location in a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Location {
    /// The line number of the location (starts at 1).
    pub line: usize,

    /// The column number of the location (starts at 1).
    pub column: usize,
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Represents a sequential supplier of source lines.
///
/// Lines are handed out once, in order, without their line terminators. No rewinding is
/// required by the consumers of this trait.
pub trait TextSource {
    /// Reads the next line, or returns `None` when the source is exhausted.
    fn read_line(&mut self) -> Option<String>;

    /// Checks whether another call to [`TextSource::read_line`] would return `None`.
    fn is_at_end(&self) -> bool;
}

/// Is a [`TextSource`] reading the lines of a [`SourceFile`].
#[derive(Debug, Clone, Copy)]
pub struct Lines<'a> {
    source_file: &'a SourceFile,
    next_line: usize,
}

impl<'a> Lines<'a> {
    fn new(source_file: &'a SourceFile) -> Self {
        Self {
            source_file,
            next_line: 1,
        }
    }
}

impl<'a> TextSource for Lines<'a> {
    fn read_line(&mut self) -> Option<String> {
        let line = self.source_file.get_line(self.next_line)?;
        self.next_line += 1;

        Some(line.to_owned())
    }

    fn is_at_end(&self) -> bool { self.next_line > self.source_file.line_count() }
}

fn get_line_byte_positions(text: &str) -> Vec<Range<usize>> {
    let mut current_position = 0;
    let mut results = Vec::new();

    let mut skip = false;

    for (byte, char) in text.char_indices() {
        if skip {
            skip = false;
            continue;
        }

        // ordinary lf
        if char == '\n' {
            #[allow(clippy::range_plus_one)]
            results.push(current_position..byte + 1);

            current_position = byte + 1;
        }

        // crlf
        if char == '\r' {
            if text.as_bytes().get(byte + 1) == Some(&b'\n') {
                #[allow(clippy::range_plus_one)]
                results.push(current_position..byte + 2);

                current_position = byte + 2;

                skip = true;
            } else {
                #[allow(clippy::range_plus_one)]
                results.push(current_position..byte + 1);

                current_position = byte + 1;
            }
        }
    }

    // a trailing terminator doesn't open another line
    if current_position < text.len() || results.is_empty() {
        results.push(current_position..text.len());
    }

    results
}

#[cfg(test)]
mod tests;
