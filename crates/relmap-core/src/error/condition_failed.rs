use super::Error;

/// Error when a conditional write matched no row.
///
/// Raised by versioned updates whose expected predecessor version is no
/// longer the current version of the row.
#[derive(Debug)]
pub(super) struct ConditionFailedError {
    context: Box<str>,
}

impl std::error::Error for ConditionFailedError {}

impl core::fmt::Display for ConditionFailedError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "condition failed: {}", self.context)
    }
}

impl Error {
    /// Creates a condition failed error.
    pub fn condition_failed(context: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::ConditionFailed(ConditionFailedError {
            context: context.into().into(),
        }))
    }

    /// Returns `true` if this error is a condition failed error.
    pub fn is_condition_failed(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::ConditionFailed(_))
    }
}
