//! Drives the lexical engine from the command line: scans an assembly source file, applies the
//! command line definitions and `equ` constants, and prints the resulting token stream.

use std::{
    cell::Cell, collections::HashSet, fmt::Display, fs::File, path::PathBuf, process::ExitCode,
};

use asmlex_base::{
    diagnostic::Handler,
    log::{Message, Severity},
    source_file::SourceFile,
};
use asmlex_lexical::{
    context::Context,
    scanner::{convert_float, convert_integer},
    token::{Token, TokenKind, Value},
    token_stream::{Replacement, TokenStream},
};
pub use clap::Parser;
use thiserror::Error;

/// A `NAME=VALUE` definition given on the command line.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Define {
    /// The identifier being defined.
    pub name: String,

    /// The unparsed text of the value.
    pub value: String,
}

/// Is an error that occurs when parsing a [`Define`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Error)]
#[allow(missing_docs)]
pub enum DefineError {
    #[error("expected `NAME=VALUE`, found `{0}`")]
    MissingValue(String),

    #[error("`{0}` is not a valid identifier")]
    InvalidName(String),

    #[error("`{0}` is neither a number, a quoted string nor an identifier")]
    InvalidValue(String),
}

fn is_identifier(text: &str) -> bool {
    let mut characters = text.chars();

    characters
        .next()
        .is_some_and(|x| x.is_ascii_alphabetic() || matches!(x, '_' | '.' | '@'))
        && characters.all(|x| x.is_ascii_alphanumeric() || matches!(x, '_' | '.' | '@'))
}

impl Define {
    /// Parses a `NAME=VALUE` argument.
    ///
    /// # Errors
    /// See [`DefineError`].
    pub fn parse(text: &str) -> Result<Self, DefineError> {
        let (name, value) = text
            .split_once('=')
            .ok_or_else(|| DefineError::MissingValue(text.to_owned()))?;

        if !is_identifier(name) {
            return Err(DefineError::InvalidName(name.to_owned()));
        }

        let define = Self {
            name: name.to_owned(),
            value: value.to_owned(),
        };

        define.replacement()?;
        Ok(define)
    }

    /// Interprets the value as an integer, a float, a `"quoted"` string or an identifier, in that
    /// order. Like in the source, only a value starting with a digit, `$` or `.` is a number.
    ///
    /// # Errors
    /// [`DefineError::InvalidValue`]: the value fits none of them.
    pub fn replacement(&self) -> Result<Replacement, DefineError> {
        let value = self.value.trim();
        let magnitude = value.strip_prefix('-').unwrap_or(value);

        if magnitude
            .chars()
            .next()
            .is_some_and(|x| x.is_ascii_digit() || matches!(x, '$' | '.'))
        {
            if let Ok(integer) = convert_integer(magnitude) {
                let integer = if magnitude.len() == value.len() {
                    integer
                } else {
                    integer.wrapping_neg()
                };

                return Ok(Replacement::Integer(integer));
            }

            if let Ok(float) = convert_float(value) {
                return Ok(Replacement::Float(float));
            }
        }

        if let Some(string) = value
            .strip_prefix('"')
            .and_then(|x| x.strip_suffix('"'))
        {
            return Ok(Replacement::String(string.to_owned()));
        }

        if is_identifier(value) {
            return Ok(Replacement::Identifier(value.to_owned()));
        }

        Err(DefineError::InvalidValue(self.value.clone()))
    }
}

/// The arguments to the program.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, clap::Parser)]
#[clap(
    name = "asmlex",
    about = "Scans an assembly source file and prints its token stream."
)]
pub struct Argument {
    /// The assembly source file to scan.
    pub file: PathBuf,

    /// Replaces every occurrence of NAME with VALUE; may be given multiple times.
    #[clap(short = 'D', long = "define", value_name = "NAME=VALUE", value_parser = Define::parse)]
    pub defines: Vec<Define>,

    /// Doesn't substitute `NAME equ VALUE` constants while printing.
    #[clap(long = "no-equ")]
    pub no_equ: bool,

    /// Prints the original source text of each token instead of its value.
    #[clap(long = "original")]
    pub original: bool,
}

/// A struct that implements [`Handler`] but prints all the message to the standard error stream.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Printer {
    printed: Cell<bool>,
}

impl Printer {
    /// Creates a new [`Printer`].
    fn new() -> Self {
        Self {
            printed: Cell::new(false),
        }
    }

    fn has_printed(&self) -> bool { self.printed.get() }
}

impl<E: Display> Handler<E> for Printer {
    fn receive(&self, error: E) {
        eprintln!("{error}");
        self.printed.set(true);
    }
}

/// Formats a token as `line:column kind payload`.
#[must_use]
pub fn describe(token: &Token, original: bool) -> String {
    let payload = if original {
        token.original_text().to_owned()
    } else {
        match token.value() {
            Value::Empty => token.original_text().to_owned(),
            Value::Integer(integer) => integer.to_string(),
            Value::Float(float) => float.to_string(),
            Value::Text(text) => text.clone(),
        }
    };

    format!(
        "{:<8} {:<13} {}",
        token.location().to_string(),
        format!("{:?}", token.kind()),
        payload.escape_debug()
    )
}

/// Walks the stream to its end, registering every `NAME equ VALUE` constant as a replacement for
/// `NAME` unless `substitute_equ` is off, and returns the description of every token produced.
pub fn walk(stream: &mut TokenStream, substitute_equ: bool, original: bool) -> Vec<String> {
    let mut lines = Vec::new();

    while !stream.at_end() {
        if substitute_equ {
            register_equ(stream);
        }

        lines.push(describe(stream.next(), original));
    }

    lines
}

fn register_equ(stream: &mut TokenStream) {
    let name = stream.peek(0).clone();

    if name.kind() != TokenKind::Identifier
        || stream.peek(1).kind() != TokenKind::Equ
        || stream.peek(2).kind() != TokenKind::EquValue
    {
        return;
    }

    if let Ok(index) = usize::try_from(stream.peek(2).int_value()) {
        stream.register_constant_replacement(name.identifier_value(), index);
    }
}

/// Gets the names, lowercased, that are defined more than once; the last definition of each wins.
#[must_use]
pub fn redefined_names(defines: &[Define]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut redefined = Vec::new();

    for define in defines {
        let name = define.name.to_lowercase();

        if !seen.insert(name.clone()) && !redefined.contains(&name) {
            redefined.push(name);
        }
    }

    redefined
}

fn report(argument: &Argument, error: impl Display) -> ExitCode {
    let msg = Message::new(
        Severity::Error,
        format!("{}: {error}", argument.file.display()),
    );

    eprintln!("{msg}");
    ExitCode::FAILURE
}

/// Runs the program with the given arguments.
pub fn run(argument: Argument) -> ExitCode {
    let file = match File::open(&argument.file) {
        Ok(file) => file,
        Err(error) => return report(&argument, error),
    };

    let source_file = match SourceFile::load(file, argument.file.clone()) {
        Ok(file) => file,
        Err(error) => return report(&argument, error),
    };

    for name in redefined_names(&argument.defines) {
        eprintln!(
            "{}",
            Message::new(
                Severity::Warning,
                format!("`{name}` is defined more than once; the last definition is used")
            )
        );
    }

    let printer = Printer::new();
    let context = Context::new();

    let mut token_stream = TokenStream::scan(&mut source_file.lines(), &context, &printer);

    for define in &argument.defines {
        match define.replacement() {
            Ok(replacement) => token_stream.insert_replacement(&define.name, replacement),
            Err(error) => return report(&argument, error),
        }
    }

    for line in walk(&mut token_stream, !argument.no_equ, argument.original) {
        println!("{line}");
    }

    eprintln!(
        "{}",
        Message::new(
            Severity::Info,
            format!(
                "{}: {} constant value(s) pooled",
                argument.file.display(),
                context.constant_count()
            )
        )
    );

    if printer.has_printed() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
