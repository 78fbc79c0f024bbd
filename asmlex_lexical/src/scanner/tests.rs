use asmlex_base::{
    diagnostic::Storage,
    source_file::{Location, SourceFile},
};
use proptest::{prop_assert_eq, proptest};

use super::{convert_float, convert_integer, LiteralError};
use crate::{
    context::Context,
    error::Error,
    token::{Token, TokenKind, Value},
    token_stream::TokenStream,
};

/// Scans the given source, returning every token and every diagnostic reported.
fn scan_with(source: &str, context: &Context) -> (Vec<Token>, Vec<Error>) {
    let source_file = SourceFile::temp(source).unwrap();
    let storage: Storage<Error> = Storage::new();

    let mut stream = TokenStream::scan(&mut source_file.lines(), context, &storage);

    let mut tokens = Vec::new();
    while !stream.at_end() {
        tokens.push(stream.next().clone());
    }

    (tokens, storage.into_vec())
}

fn scan(source: &str) -> (Vec<Token>, Vec<Error>) { scan_with(source, &Context::new()) }

fn kinds(tokens: &[Token]) -> Vec<TokenKind> { tokens.iter().map(Token::kind).collect() }

#[test]
fn dollar_hex_literal() {
    let (tokens, errors) = scan("$FF");

    assert!(errors.is_empty());
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind(), TokenKind::Integer);
    assert_eq!(tokens[0].int_value(), 255);
    assert_eq!(tokens[0].original_text(), "$FF");
}

#[test]
fn longest_operator_wins() {
    let (tokens, errors) = scan("A << 2");

    assert!(errors.is_empty());
    assert_eq!(
        kinds(&tokens),
        [TokenKind::Identifier, TokenKind::LeftShift, TokenKind::Integer]
    );
    assert_eq!(tokens[0].identifier_value(), "a");
    assert_eq!(tokens[0].original_text(), "A");
    assert_eq!(tokens[1].location(), Location { line: 1, column: 3 });
    assert_eq!(tokens[2].int_value(), 2);

    let (tokens, _) = scan("a<=b>=c!=d==e&&f||g>>h");
    let operators = tokens
        .iter()
        .map(Token::kind)
        .filter(|x| *x != TokenKind::Identifier)
        .collect::<Vec<_>>();

    assert_eq!(
        operators,
        [
            TokenKind::LessEqual,
            TokenKind::GreaterEqual,
            TokenKind::NotEqual,
            TokenKind::Equal,
            TokenKind::LogAnd,
            TokenKind::LogOr,
            TokenKind::RightShift
        ]
    );
}

#[test]
fn unterminated_string_is_a_single_invalid_token() {
    let (tokens, errors) = scan("\"abc");

    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind(), TokenKind::Invalid);
    assert_eq!(tokens[0].original_text(), "\"abc");

    assert_eq!(errors.len(), 1);
    let error = errors[0].as_unterminated_string().unwrap();
    assert_eq!(error.location, Location { line: 1, column: 1 });
    assert_eq!(error.length, 4);
}

#[test]
fn unterminated_string_stops_at_line_end() {
    let (tokens, errors) = scan("\"abc\nlabel");

    assert_eq!(
        kinds(&tokens),
        [TokenKind::Invalid, TokenKind::Separator, TokenKind::Identifier]
    );
    assert_eq!(errors.len(), 1);
}

#[test]
fn string_escapes_are_decoded() {
    let (tokens, errors) = scan(r#""a\"b\\c\n""#);

    assert!(errors.is_empty());
    assert_eq!(tokens[0].kind(), TokenKind::String);
    assert_eq!(tokens[0].string_value(), "a\"b\\c\n");
    assert_eq!(tokens[0].original_text(), r#""a\"b\\c\n""#);
}

#[test]
fn unknown_escape_is_reported() {
    let (tokens, errors) = scan(r#""a\qb""#);

    assert_eq!(kinds(&tokens), [TokenKind::Invalid]);
    assert_eq!(
        errors[0].as_invalid_escape().map(|x| (x.escape, x.location)),
        Some(('q', Location { line: 1, column: 3 }))
    );
}

#[test]
fn character_literals_are_integers() {
    let (tokens, errors) = scan(r"'A' '\n' 'ab'");

    assert_eq!(
        kinds(&tokens),
        [TokenKind::Integer, TokenKind::Integer, TokenKind::Invalid]
    );
    assert_eq!(tokens[0].int_value(), 65);
    assert_eq!(tokens[1].int_value(), 10);
    assert!(errors[0].as_invalid_character_literal().is_some());
}

#[test]
fn number_bases() {
    let (tokens, errors) = scan("0x1F 1Fh 0b101 101b 0o17 17o 1_000 0EEh 0b1h");

    assert!(errors.is_empty());
    assert_eq!(
        tokens.iter().map(Token::int_value).collect::<Vec<_>>(),
        [31, 31, 5, 5, 15, 15, 1000, 0xEE, 0xB1]
    );
}

#[test]
fn floats() {
    let (tokens, errors) = scan("1.5 .25 2e3 1.5e-2");

    assert!(errors.is_empty());
    assert_eq!(kinds(&tokens), [TokenKind::Float; 4]);
    assert_eq!(
        tokens.iter().map(Token::float_value).collect::<Vec<_>>(),
        [1.5, 0.25, 2000.0, 0.015]
    );
}

#[test]
fn exponent_digits_of_hex_literal_are_not_floats() {
    let (tokens, errors) = scan("1e5h 0x1e5");

    assert!(errors.is_empty());
    assert_eq!(
        tokens.iter().map(Token::int_value).collect::<Vec<_>>(),
        [0x1E5, 0x1E5]
    );
}

#[test]
fn foreign_digits_become_number_strings() {
    let (tokens, errors) = scan("1abc 12f");

    assert!(errors.is_empty());
    assert_eq!(kinds(&tokens), [TokenKind::NumberString; 2]);
    assert_eq!(tokens[0].string_value(), "1abc");
}

#[test]
fn overflowing_number_is_invalid() {
    let (tokens, errors) = scan("99999999999999999999 1.5.5");

    assert_eq!(kinds(&tokens), [TokenKind::Invalid, TokenKind::Invalid]);
    assert_eq!(
        errors
            .iter()
            .map(|x| x.as_malformed_number().map(|x| x.reason))
            .collect::<Vec<_>>(),
        [
            Some(LiteralError::Overflow),
            Some(LiteralError::MalformedFloat)
        ]
    );
}

#[test]
fn malformed_float_is_invalid() {
    let (tokens, errors) = scan("1.5f .5e 1e");

    assert_eq!(kinds(&tokens), [TokenKind::Invalid; 3]);
    assert_eq!(
        errors
            .iter()
            .map(|x| x.as_malformed_number().map(|x| x.reason))
            .collect::<Vec<_>>(),
        [Some(LiteralError::MalformedFloat); 3]
    );
}

#[test]
fn dollar_without_hex_digit_is_punctuation() {
    let (tokens, errors) = scan("$ $G");

    assert!(errors.is_empty());
    assert_eq!(
        kinds(&tokens),
        [TokenKind::Dollar, TokenKind::Dollar, TokenKind::Identifier]
    );
}

#[test]
fn comments_are_skipped() {
    let (tokens, errors) = scan("a ; one\nb // two\nc /* three\nfour */ d");

    assert!(errors.is_empty());
    assert_eq!(
        tokens
            .iter()
            .filter(|x| x.kind() == TokenKind::Identifier)
            .map(Token::identifier_value)
            .collect::<Vec<_>>(),
        ["a", "b", "c", "d"]
    );
    assert_eq!(tokens.last().unwrap().location(), Location { line: 4, column: 9 });
}

#[test]
fn unterminated_block_comment() {
    let (tokens, errors) = scan("a /* never\nclosed");

    assert_eq!(kinds(&tokens), [TokenKind::Identifier, TokenKind::Invalid]);
    assert_eq!(
        errors[0].as_unterminated_comment().map(|x| x.location),
        Some(Location { line: 1, column: 3 })
    );
}

#[test]
fn separator_before_unterminated_block_comment_is_kept() {
    let (tokens, errors) = scan("a\n/* never");

    assert_eq!(
        kinds(&tokens),
        [TokenKind::Identifier, TokenKind::Separator, TokenKind::Invalid]
    );
    assert_eq!(errors.len(), 1);
}

#[test]
fn line_ends_separate_statements() {
    let (tokens, errors) = scan("a\n\n  ; comment only\nb :: c\n");

    assert!(errors.is_empty());
    assert_eq!(
        kinds(&tokens),
        [
            TokenKind::Identifier,
            TokenKind::Separator,
            TokenKind::Identifier,
            TokenKind::Separator,
            TokenKind::Identifier
        ]
    );
    assert_eq!(tokens[1].original_text(), "\n");
    assert_eq!(tokens[3].original_text(), "::");
}

#[test]
fn single_line_has_no_trailing_separator() {
    let (tokens, _) = scan("X+1\n");

    assert_eq!(
        kinds(&tokens),
        [TokenKind::Identifier, TokenKind::Plus, TokenKind::Integer]
    );
}

#[test]
fn separator_is_not_doubled() {
    let (tokens, _) = scan("a ::\nb");

    assert_eq!(
        kinds(&tokens),
        [
            TokenKind::Identifier,
            TokenKind::Separator,
            TokenKind::Identifier
        ]
    );
}

#[test]
fn equ_value_goes_to_the_pool() {
    let context = Context::new();
    let (tokens, errors) = scan_with("Max EQU $10 + 2 ; limit\nb", &context);

    assert!(errors.is_empty());
    assert_eq!(
        kinds(&tokens),
        [
            TokenKind::Identifier,
            TokenKind::Equ,
            TokenKind::EquValue,
            TokenKind::Separator,
            TokenKind::Identifier
        ]
    );

    let value = &tokens[2];
    assert_eq!(value.original_text(), "$10 + 2");
    assert_eq!(value.location(), Location { line: 1, column: 9 });

    let index = usize::try_from(value.int_value()).unwrap();
    let constant = context.constant_value(index).unwrap();

    assert_eq!(
        kinds(&constant),
        [TokenKind::Integer, TokenKind::Plus, TokenKind::Integer]
    );
    assert_eq!(constant[0].int_value(), 16);
}

#[test]
fn equal_equ_values_share_an_index() {
    let context = Context::new();
    let (tokens, _) = scan_with("a equ 255\nb equ $FF :: c equ 0xff", &context);

    let indices = tokens
        .iter()
        .filter(|x| x.kind() == TokenKind::EquValue)
        .map(Token::int_value)
        .collect::<Vec<_>>();

    assert_eq!(indices, [0, 0, 0]);
    assert_eq!(context.constant_count(), 1);
}

#[test]
fn unexpected_character_is_reported() {
    let (tokens, errors) = scan("a ` b");

    assert_eq!(
        kinds(&tokens),
        [TokenKind::Identifier, TokenKind::Invalid, TokenKind::Identifier]
    );
    assert_eq!(
        errors[0].as_unexpected_character().map(|x| x.character),
        Some('`')
    );
}

#[test]
fn columns_count_characters() {
    let (tokens, _) = scan("\"é\" °x");

    assert_eq!(
        kinds(&tokens),
        [TokenKind::String, TokenKind::Degree, TokenKind::Identifier]
    );
    assert_eq!(tokens[1].location(), Location { line: 1, column: 5 });
    assert_eq!(tokens[2].location(), Location { line: 1, column: 6 });
}

#[test]
fn diagnostics_render_the_source_line() {
    let (_, errors) = scan("  \"open");
    let rendered = errors[0].to_string();

    assert!(rendered.contains("unterminated string literal"));
    assert!(rendered.contains("1:3"));
    assert!(rendered.contains("\"open"));
}

#[test]
fn convert_integer_errors() {
    assert_eq!(convert_integer("0x"), Err(LiteralError::NoDigits));
    assert_eq!(convert_integer("12a"), Err(LiteralError::InvalidDigit('a', 10)));
    assert_eq!(convert_integer("102b"), Err(LiteralError::InvalidDigit('2', 2)));
    assert_eq!(convert_integer("9223372036854775808"), Err(LiteralError::Overflow));
    assert_eq!(convert_integer("0x1_0000_0000_0000_0000"), Err(LiteralError::Overflow));
    assert_eq!(convert_integer("$FFFFFFFFFFFFFFFF"), Ok(-1));
}

#[test]
fn convert_float_errors() {
    assert_eq!(convert_float("1e400"), Err(LiteralError::Overflow));
    assert_eq!(convert_float("1.2.3"), Err(LiteralError::MalformedFloat));
    assert_eq!(convert_float("1_000.5"), Ok(1000.5));
}

proptest! {
    #[test]
    fn decimal_round_trips(value in 0..=i64::MAX) {
        prop_assert_eq!(convert_integer(&value.to_string()), Ok(value));
    }

    #[test]
    fn hex_notations_agree(value: u64) {
        let dollar = convert_integer(&format!("${value:X}"));

        prop_assert_eq!(dollar, convert_integer(&format!("0x{value:x}")));
        prop_assert_eq!(dollar, convert_integer(&format!("0{value:X}h")));
        prop_assert_eq!(dollar.map(|x| x.to_ne_bytes()), Ok(value.to_ne_bytes()));
    }

    #[test]
    fn value_and_spelling_survive_scanning(value in 0..=u32::MAX) {
        let (tokens, errors) = scan(&format!("${value:X}"));

        prop_assert_eq!(errors.len(), 0);
        prop_assert_eq!(tokens[0].value(), &Value::Integer(i64::from(value)));
        prop_assert_eq!(tokens[0].original_text(), &format!("${value:X}"));
    }
}
