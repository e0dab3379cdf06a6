use super::Error;

/// Error when an object references a row that does not exist and may not be
/// created implicitly.
#[derive(Debug)]
pub(super) struct KeyNotFoundError {
    context: Box<str>,
}

impl std::error::Error for KeyNotFoundError {}

impl core::fmt::Display for KeyNotFoundError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "key not found: {}", self.context)
    }
}

impl Error {
    /// Creates a key not found error.
    pub fn key_not_found(context: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::KeyNotFound(KeyNotFoundError {
            context: context.into().into(),
        }))
    }

    /// Returns `true` if this error is a key not found error.
    pub fn is_key_not_found(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::KeyNotFound(_))
    }
}
