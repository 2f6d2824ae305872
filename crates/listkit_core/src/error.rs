use std::fmt;

/// Failure classes the list UI distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListErrorKind {
    /// Network or transport failure; retry-capable.
    Transport,
    /// The session is no longer accepted by the backend.
    Unauthorized,
    /// The backend rejected the request with a user-facing message.
    Rejected,
    /// The payload did not match the expected item schema.
    Decode,
}

/// A failed page fetch or mutation, as the reducer sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListError {
    pub kind: ListErrorKind,
    pub message: String,
}

impl ListError {
    pub fn new(kind: ListErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind == ListErrorKind::Unauthorized
    }
}

impl fmt::Display for ListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
