use super::Error;

/// Error when the number of `?` placeholders in a statement does not equal
/// the number of supplied arguments.
///
/// Arguments are never truncated or padded to make the counts agree.
#[derive(Debug)]
pub(super) struct ArgumentCountMismatch {
    placeholders: usize,
    arguments: usize,
}

impl std::error::Error for ArgumentCountMismatch {}

impl core::fmt::Display for ArgumentCountMismatch {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "argument count out of range: statement has {} placeholders but {} arguments were supplied",
            self.placeholders, self.arguments
        )
    }
}

impl Error {
    /// Creates an argument count mismatch error.
    pub fn argument_count_mismatch(placeholders: usize, arguments: usize) -> Error {
        Error::from(super::ErrorKind::ArgumentCountMismatch(
            ArgumentCountMismatch {
                placeholders,
                arguments,
            },
        ))
    }

    /// Returns `true` if this error is an argument count mismatch.
    pub fn is_argument_count_mismatch(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::ArgumentCountMismatch(_))
    }
}
