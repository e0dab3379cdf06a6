use std::fmt;

/// The closed set of methods a predicate may call.
///
/// Collection combinators take an optional lambda argument; string methods
/// take their operand as a plain expression.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    Any,
    All,
    Where,
    Count,
    StartsWith,
    EndsWith,
    Contains,
    Like,
    ILike,
    ToLower,
    ToUpper,
}

impl Method {
    /// Returns true for the collection combinators `Any`, `All`, `Where` and
    /// `Count`.
    pub fn is_combinator(self) -> bool {
        matches!(self, Method::Any | Method::All | Method::Where | Method::Count)
    }

    /// Number of arguments the method accepts, as an inclusive range.
    pub fn arity(self) -> (usize, usize) {
        match self {
            Method::Any | Method::Count => (0, 1),
            Method::All | Method::Where => (1, 1),
            Method::StartsWith
            | Method::EndsWith
            | Method::Contains
            | Method::Like
            | Method::ILike => (1, 1),
            Method::ToLower | Method::ToUpper => (0, 0),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
