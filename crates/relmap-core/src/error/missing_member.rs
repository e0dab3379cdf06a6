use super::Error;

/// Error when a class has no property with the requested name.
#[derive(Debug)]
pub(super) struct MissingMemberError {
    class: Box<str>,
    member: Box<str>,
}

impl std::error::Error for MissingMemberError {}

impl core::fmt::Display for MissingMemberError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "missing member: {}.{}", self.class, self.member)
    }
}

impl Error {
    /// Creates a missing member error.
    pub fn missing_member(class: impl Into<String>, member: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::MissingMember(MissingMemberError {
            class: class.into().into(),
            member: member.into().into(),
        }))
    }

    /// Returns `true` if this error is a missing member error.
    pub fn is_missing_member(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::MissingMember(_))
    }
}
