//! Contains the scanner that populates a [`TokenStream`] from a line-based text source.

use asmlex_base::{
    diagnostic::Handler,
    source_file::{Location, TextSource},
};
use lazy_static::lazy_static;
use strum::IntoEnumIterator;
use thiserror::Error;

use crate::{
    context::Context,
    error::{
        self, InvalidCharacterLiteral, InvalidEscape, MalformedNumber, UnexpectedCharacter,
        UnterminatedComment, UnterminatedString,
    },
    token::{Token, TokenKind, Value},
    token_stream::TokenStream,
};

/// Is an error that occurs when converting the text of a numeric literal into its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Error)]
pub enum LiteralError {
    /// The value doesn't fit in 64 bits.
    #[error("the value doesn't fit in 64 bits")]
    Overflow,

    /// The base prefix or suffix isn't followed by any digit.
    #[error("the literal has no digits")]
    NoDigits,

    /// A character isn't a digit of the literal's base.
    #[error("`{0}` is not a digit in base {1}")]
    InvalidDigit(char, u32),

    /// The text isn't a floating point number.
    #[error("the text is not a floating point number")]
    MalformedFloat,
}

/// Converts the text of an integer literal into its value.
///
/// The base is selected by a `$`, `0x`, `0o` or `0b` prefix, or else by an `h`, `o` or `b`
/// suffix, and defaults to 10. Letters are case-insensitive and `_` may group digits. Non-decimal
/// literals may use all 64 bits; their bit pattern is reinterpreted as signed.
///
/// # Errors
/// - [`LiteralError::NoDigits`]: nothing but the base markers was given.
/// - [`LiteralError::InvalidDigit`]: a character isn't a digit of the selected base.
/// - [`LiteralError::Overflow`]: the value doesn't fit in 64 bits.
pub fn convert_integer(text: &str) -> Result<i64, LiteralError> {
    let text = text.to_ascii_lowercase();

    let (digits, radix) = if let Some(digits) = text.strip_prefix('$') {
        (digits, 16)
    } else if let Some(digits) = text.strip_prefix("0x") {
        (digits, 16)
    } else if let Some(digits) = text.strip_prefix("0o") {
        (digits, 8)
    } else if text.starts_with("0b") && !text.ends_with('h') {
        (&text[2..], 2)
    } else if let Some(digits) = text.strip_suffix('h') {
        (digits, 16)
    } else if let Some(digits) = text.strip_suffix('b') {
        (digits, 2)
    } else if let Some(digits) = text.strip_suffix('o') {
        (digits, 8)
    } else {
        (text.as_str(), 10)
    };

    let mut result: u64 = 0;
    let mut has_digits = false;

    for character in digits.chars().filter(|x| *x != '_') {
        let digit = character
            .to_digit(radix)
            .ok_or(LiteralError::InvalidDigit(character, radix))?;

        result = result
            .checked_mul(u64::from(radix))
            .and_then(|x| x.checked_add(u64::from(digit)))
            .ok_or(LiteralError::Overflow)?;
        has_digits = true;
    }

    if !has_digits {
        return Err(LiteralError::NoDigits);
    }

    if radix == 10 {
        i64::try_from(result).map_err(|_| LiteralError::Overflow)
    } else {
        Ok(i64::from_ne_bytes(result.to_ne_bytes()))
    }
}

/// Converts the text of a floating point literal into its value; `_` may group digits.
///
/// # Errors
/// - [`LiteralError::MalformedFloat`]: the text isn't a floating point number.
/// - [`LiteralError::Overflow`]: the value is too large to be represented.
pub fn convert_float(text: &str) -> Result<f64, LiteralError> {
    let text: String = text.chars().filter(|x| *x != '_').collect();
    let value = text
        .parse::<f64>()
        .map_err(|_| LiteralError::MalformedFloat)?;

    if value.is_finite() {
        Ok(value)
    } else {
        Err(LiteralError::Overflow)
    }
}

lazy_static! {
    /// Every operator and punctuation spelling, longest first.
    static ref OPERATORS: Vec<(Vec<char>, TokenKind)> = {
        let mut operators: Vec<_> = TokenKind::iter()
            .filter_map(|kind| kind.spelling().map(|x| (x.chars().collect::<Vec<_>>(), kind)))
            .collect();

        operators.sort_by(|lhs, rhs| rhs.0.len().cmp(&lhs.0.len()));
        operators
    };
}

fn is_identifier_start(character: char) -> bool {
    character.is_ascii_alphabetic() || matches!(character, '_' | '.' | '@')
}

fn is_identifier_character(character: char) -> bool {
    character.is_ascii_alphanumeric() || matches!(character, '_' | '.' | '@')
}

/// The result of reading a quoted literal.
struct Quoted {
    decoded: String,
    terminated: bool,

    /// The column of the first unknown escape sequence and its character.
    invalid_escape: Option<(usize, char)>,
}

/// Turns the lines of a [`TextSource`] into tokens.
struct Scanner<'a, S> {
    source: &'a mut S,
    context: &'a Context,
    handler: &'a dyn Handler<error::Error>,

    line: Vec<char>,
    line_text: String,
    line_number: usize,

    /// The zero-based index of the next character in `line`.
    column: usize,
    exhausted: bool,

    tokens: Vec<Token>,
    line_has_tokens: bool,
    pending_separator: Option<Location>,
}

impl<'a, S: TextSource> Scanner<'a, S> {
    fn new(source: &'a mut S, context: &'a Context, handler: &'a dyn Handler<error::Error>) -> Self {
        let mut scanner = Self {
            source,
            context,
            handler,
            line: Vec::new(),
            line_text: String::new(),
            line_number: 0,
            column: 0,
            exhausted: false,
            tokens: Vec::new(),
            line_has_tokens: false,
            pending_separator: None,
        };

        scanner.advance_line();
        scanner
    }

    fn tokenize(mut self) -> Vec<Token> {
        loop {
            self.skip_insignificant();

            if self.exhausted {
                break;
            }

            let token = self.scan_token();
            let is_equ = token.kind() == TokenKind::Equ;
            self.emit(token);

            if is_equ {
                let value = self.scan_equ_value();
                self.emit(value);
            }
        }

        self.tokens
    }

    fn location(&self) -> Location { self.location_at(self.column) }

    fn location_at(&self, column: usize) -> Location {
        Location {
            line: self.line_number,
            column: column + 1,
        }
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.line.get(self.column + offset).copied()
    }

    fn text(&self, start: usize, end: usize) -> String { self.line[start..end].iter().collect() }

    /// Moves to the next line of the source, marking the source exhausted at its end.
    fn advance_line(&mut self) {
        if self.line_has_tokens {
            self.pending_separator = Some(self.location_at(self.line.len()));
            self.line_has_tokens = false;
        }

        match self.source.read_line() {
            Some(line) => {
                self.line = line.chars().collect();
                self.line_text = line;
                self.line_number += 1;
                self.column = 0;
            }
            None => {
                self.line.clear();
                self.column = 0;
                self.exhausted = true;
            }
        }
    }

    fn emit(&mut self, token: Token) {
        if let Some(location) = self.pending_separator.take() {
            let after_separator = self
                .tokens
                .last()
                .map_or(true, |x| x.kind() == TokenKind::Separator);

            if !after_separator {
                self.tokens.push(Token::new(
                    TokenKind::Separator,
                    location,
                    Value::Empty,
                    "\n",
                ));
            }
        }

        self.tokens.push(token);
        self.line_has_tokens = true;
    }

    fn at_comment(&self) -> bool {
        match self.peek_char(0) {
            Some(';') => true,
            Some('/') => matches!(self.peek_char(1), Some('/' | '*')),
            _ => false,
        }
    }

    /// Skips whitespace, comments and line ends until the next token or the end of the source.
    fn skip_insignificant(&mut self) {
        while !self.exhausted {
            match (self.peek_char(0), self.peek_char(1)) {
                (None, _) => self.advance_line(),
                (Some(character), _) if character.is_whitespace() => self.column += 1,
                (Some(';'), _) | (Some('/'), Some('/')) => self.column = self.line.len(),
                (Some('/'), Some('*')) => self.skip_block_comment(),
                _ => return,
            }
        }
    }

    fn skip_block_comment(&mut self) {
        let location = self.location();
        let line = self.line_text.clone();
        let separator_before = self.pending_separator;
        let mut text = String::from("/*");

        self.column += 2;

        loop {
            if self.exhausted {
                // the invalid token stands for the whole comment, line ends included
                self.pending_separator = separator_before;
                self.handler
                    .receive(UnterminatedComment { location, line }.into());
                self.emit(Token::new(
                    TokenKind::Invalid,
                    location,
                    Value::Text("unterminated block comment".to_owned()),
                    text,
                ));
                return;
            }

            match (self.peek_char(0), self.peek_char(1)) {
                (Some('*'), Some('/')) => {
                    self.column += 2;
                    return;
                }
                (Some(character), _) => {
                    text.push(character);
                    self.column += 1;
                }
                (None, _) => {
                    text.push('\n');
                    self.advance_line();
                }
            }
        }
    }

    /// Scans one token starting at the current, non-blank character.
    fn scan_token(&mut self) -> Token {
        let character = self.line[self.column];
        let next = self.peek_char(1);

        match character {
            '"' => self.scan_string(),
            '\'' => self.scan_character(),
            '$' if next.is_some_and(|x| x.is_ascii_hexdigit()) => self.scan_number(),
            '.' if next.is_some_and(|x| x.is_ascii_digit()) => self.scan_number(),
            character if character.is_ascii_digit() => self.scan_number(),
            character if is_identifier_start(character) => self.scan_identifier(),
            _ => self.scan_operator(),
        }
    }

    fn scan_identifier(&mut self) -> Token {
        let start = self.column;

        while self.peek_char(0).is_some_and(is_identifier_character) {
            self.column += 1;
        }

        let text = self.text(start, self.column);
        let lowered = text.to_lowercase();

        if lowered == "equ" {
            Token::new(TokenKind::Equ, self.location_at(start), Value::Empty, text)
        } else {
            Token::new(
                TokenKind::Identifier,
                self.location_at(start),
                Value::Text(lowered),
                text,
            )
        }
    }

    /// Scans the rest of an `equ` line into the constant pool and returns the
    /// [`TokenKind::EquValue`] token carrying the pool index.
    fn scan_equ_value(&mut self) -> Token {
        while self.peek_char(0).is_some_and(char::is_whitespace) {
            self.column += 1;
        }

        let start = self.column;
        let mut end = start;
        let mut tokens = Vec::new();

        loop {
            while self.peek_char(0).is_some_and(char::is_whitespace) {
                self.column += 1;
            }

            let at_separator = self.peek_char(0) == Some(':') && self.peek_char(1) == Some(':');

            if self.peek_char(0).is_none() || at_separator || self.at_comment() {
                break;
            }

            tokens.push(self.scan_token());
            end = self.column;
        }

        #[allow(clippy::cast_possible_wrap)]
        let index = self.context.add_constant_value(&tokens) as i64;

        Token::new(
            TokenKind::EquValue,
            self.location_at(start),
            Value::Integer(index),
            self.text(start, end),
        )
    }

    /// Reads a literal delimited by `quote` on the current line, decoding escape sequences.
    fn read_quoted(&mut self, quote: char) -> Quoted {
        let mut quoted = Quoted {
            decoded: String::new(),
            terminated: false,
            invalid_escape: None,
        };

        self.column += 1;

        while let Some(character) = self.peek_char(0) {
            if character == quote {
                self.column += 1;
                quoted.terminated = true;
                break;
            }

            match (character, self.peek_char(1)) {
                ('\\', Some(escape)) => {
                    let decoded = match escape {
                        '"' | '\'' | '\\' => escape,
                        'n' => '\n',
                        'r' => '\r',
                        't' => '\t',
                        '0' => '\0',
                        _ => {
                            quoted.invalid_escape.get_or_insert((self.column, escape));
                            escape
                        }
                    };

                    quoted.decoded.push(decoded);
                    self.column += 2;
                }
                (character, _) => {
                    quoted.decoded.push(character);
                    self.column += 1;
                }
            }
        }

        quoted
    }

    /// Reports the problems of a quoted literal and returns the invalid token for it, if any.
    fn check_quoted(&self, quoted: &Quoted, start: usize) -> Option<Token> {
        let location = self.location_at(start);
        let original_text = self.text(start, self.column);

        let description = if !quoted.terminated {
            self.handler.receive(
                UnterminatedString {
                    location,
                    line: self.line_text.clone(),
                    length: self.column - start,
                }
                .into(),
            );
            "unterminated literal"
        } else if let Some((column, escape)) = quoted.invalid_escape {
            self.handler.receive(
                InvalidEscape {
                    location: self.location_at(column),
                    line: self.line_text.clone(),
                    escape,
                }
                .into(),
            );
            "unknown escape sequence"
        } else {
            return None;
        };

        Some(Token::new(
            TokenKind::Invalid,
            location,
            Value::Text(description.to_owned()),
            original_text,
        ))
    }

    fn scan_string(&mut self) -> Token {
        let start = self.column;
        let quoted = self.read_quoted('"');

        self.check_quoted(&quoted, start).unwrap_or_else(|| {
            Token::new(
                TokenKind::String,
                self.location_at(start),
                Value::Text(quoted.decoded),
                self.text(start, self.column),
            )
        })
    }

    fn scan_character(&mut self) -> Token {
        let start = self.column;
        let quoted = self.read_quoted('\'');

        if let Some(invalid) = self.check_quoted(&quoted, start) {
            return invalid;
        }

        let location = self.location_at(start);
        let original_text = self.text(start, self.column);
        let mut characters = quoted.decoded.chars();

        match (characters.next(), characters.next()) {
            (Some(character), None) => Token::new(
                TokenKind::Integer,
                location,
                Value::Integer(i64::from(u32::from(character))),
                original_text,
            ),
            _ => {
                self.handler.receive(
                    InvalidCharacterLiteral {
                        location,
                        line: self.line_text.clone(),
                        length: self.column - start,
                    }
                    .into(),
                );

                Token::new(
                    TokenKind::Invalid,
                    location,
                    Value::Text("invalid character literal".to_owned()),
                    original_text,
                )
            }
        }
    }

    /// Finds the end of the numeric literal starting at the current column.
    ///
    /// Returns the end column, whether the literal is a float and whether its shape is valid.
    fn measure_number(&self) -> (usize, bool, bool) {
        let start = self.column;
        let line = &self.line;

        if line[start] == '$' {
            let mut end = start + 1;
            while line
                .get(end)
                .is_some_and(|x| x.is_ascii_alphanumeric() || *x == '_')
            {
                end += 1;
            }
            return (end, false, true);
        }

        let mut is_hex = line[start] == '0'
            && line
                .get(start + 1)
                .is_some_and(|x| x.eq_ignore_ascii_case(&'x'));
        let mut found_point = false;
        let mut found_exponent = false;
        let mut found_exponent_sign = false;
        let mut malformed = false;

        let mut end = start;
        while let Some(character) = line.get(end).map(char::to_ascii_lowercase) {
            if !(character.is_ascii_alphanumeric() || character == '.' || character == '_') {
                break;
            }

            if character == '.' {
                malformed |= found_point || found_exponent;
                found_point = true;
            } else if character == 'h' && !found_exponent_sign {
                is_hex = true;
            } else if character == 'e' && !is_hex {
                malformed |= found_exponent;

                if !found_exponent && matches!(line.get(end + 1), Some('+' | '-')) {
                    end += 1;
                    malformed |= !line
                        .get(end + 1)
                        .is_some_and(char::is_ascii_alphanumeric);
                    found_exponent_sign = true;
                }
                found_exponent = true;
            }

            end += 1;
        }

        // exponent markers of a hex literal are plain digits
        let is_float = found_point || (found_exponent && !is_hex);
        (end, is_float, !(malformed && is_float))
    }

    fn scan_number(&mut self) -> Token {
        let start = self.column;
        let (end, is_float, valid) = self.measure_number();
        self.column = end;

        let location = self.location_at(start);
        let text = self.text(start, end);

        let converted = if !valid {
            Err(LiteralError::MalformedFloat)
        } else if is_float {
            convert_float(&text).map(Value::Float)
        } else {
            convert_integer(&text).map(Value::Integer)
        };

        match converted {
            Ok(value) => {
                let kind = if is_float {
                    TokenKind::Float
                } else {
                    TokenKind::Integer
                };

                Token::new(kind, location, value, text)
            }

            // digits of another notation, e.g. local label references; left to the consumer
            Err(LiteralError::InvalidDigit(..)) if !is_float && !text.starts_with('$') => {
                Token::new(
                    TokenKind::NumberString,
                    location,
                    Value::Text(text.clone()),
                    text,
                )
            }

            Err(reason) => {
                self.handler.receive(
                    MalformedNumber {
                        location,
                        line: self.line_text.clone(),
                        length: end - start,
                        reason,
                    }
                    .into(),
                );

                Token::new(
                    TokenKind::Invalid,
                    location,
                    Value::Text(reason.to_string()),
                    text,
                )
            }
        }
    }

    fn scan_operator(&mut self) -> Token {
        let start = self.column;
        let location = self.location();

        let matched = OPERATORS.iter().find(|(spelling, _)| {
            spelling
                .iter()
                .enumerate()
                .all(|(offset, character)| self.peek_char(offset) == Some(*character))
        });

        if let Some((spelling, kind)) = matched {
            self.column += spelling.len();
            return Token::punctuation(*kind, location);
        }

        let character = self.line[start];
        self.column += 1;

        self.handler.receive(
            UnexpectedCharacter {
                location,
                line: self.line_text.clone(),
                character,
            }
            .into(),
        );

        Token::new(
            TokenKind::Invalid,
            location,
            Value::Text(format!("unexpected character `{character}`")),
            character.to_string(),
        )
    }
}

impl TokenStream {
    /// Scans every line of the given source into a new stream.
    ///
    /// Scanning completes before the stream is returned. Malformed input never stops it: each
    /// problem is reported to `handler` and becomes an [`TokenKind::Invalid`] token holding the
    /// offending text. Right-hand sides of `equ` directives are interned into `context`.
    #[must_use]
    pub fn scan(
        source: &mut impl TextSource,
        context: &Context,
        handler: &dyn Handler<error::Error>,
    ) -> Self {
        let tokens = Scanner::new(source, context, handler).tokenize();
        Self::replay(tokens, context)
    }
}

#[cfg(test)]
mod tests;
