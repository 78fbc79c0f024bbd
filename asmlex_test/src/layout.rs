//! Contains strategies producing the insignificant text placed between generated inputs.

use proptest::{
    prop_oneof,
    strategy::{BoxedStrategy, Strategy},
};

/// Produces a non-empty run of spaces and tabs.
#[must_use]
pub fn blanks() -> BoxedStrategy<String> { "[ \t]{1,4}".boxed() }

/// Produces a run of spaces and tabs, optionally followed by a comment ending the line.
///
/// A comment is always preceded by a blank and never contains a line terminator.
#[must_use]
pub fn line_tail() -> BoxedStrategy<String> {
    prop_oneof![
        "[ \t]{0,3}",
        "[ \t]{1,3};[^\r\n]{0,16}",
        "[ \t]{1,3}//[^\r\n]{0,16}",
    ]
    .boxed()
}
