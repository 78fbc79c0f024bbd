//! This module provides a trait [`Input`] for representing inputs generated for property based
//! testing.

use proptest::test_runner::{TestCaseError, TestCaseResult};

/// Represents an input generated for testing purposes whose expected output can be checked.
pub trait Input<Output> {
    /// Verifies that the given output complies with this input.
    ///
    /// # Errors
    /// [`proptest::test_runner::TestCaseError`]: for any reason the assertion fails.
    fn assert(self, output: Output) -> TestCaseResult;
}

impl<T, U> Input<Option<T>> for Option<U>
where
    U: Input<T>,
{
    fn assert(self, output: Option<T>) -> TestCaseResult {
        match (self, output) {
            (Some(input), Some(output)) => input.assert(output),
            (None, None) => Ok(()),
            (Some(_), None) => Err(TestCaseError::fail("expected Some, found None")),
            (None, Some(_)) => Err(TestCaseError::fail("expected None, found Some")),
        }
    }
}

impl<'a, 'b, T, U> Input<&'b [T]> for &'a [U]
where
    for<'c, 'd> &'c U: Input<&'d T>,
    T: std::fmt::Debug,
{
    fn assert(self, output: &'b [T]) -> TestCaseResult {
        if self.len() != output.len() {
            return Err(TestCaseError::fail(format!(
                "expected {} outputs, found {}: {output:?}",
                self.len(),
                output.len()
            )));
        }

        for (index, (input, output)) in self.iter().zip(output).enumerate() {
            input
                .assert(output)
                .map_err(|err| TestCaseError::fail(format!("at index {index}: {err}")))?;
        }

        Ok(())
    }
}
