use std::fmt;

use listkit_core::{ListError, ListErrorKind, ListId, MutationId, Page, PageRequest};

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent<T> {
    PageFetched {
        request: PageRequest,
        result: Result<Page<T>, FetchError>,
    },
    MutationCompleted {
        mutation_id: MutationId,
        result: Result<(), FetchError>,
    },
    DebounceElapsed {
        list_id: ListId,
        generation: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    UnknownResource { resource: String },
    /// A scope name collides with a paging parameter.
    ReservedParameter { name: String },
    Unauthorized,
    /// 4xx carrying a user-facing message.
    Rejected { status: u16 },
    HttpStatus(u16),
    Timeout,
    Network,
    Decode,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::UnknownResource { resource } => write!(f, "unknown resource {resource}"),
            FailureKind::ReservedParameter { name } => write!(f, "reserved parameter {name}"),
            FailureKind::Unauthorized => write!(f, "unauthorized"),
            FailureKind::Rejected { status } => write!(f, "rejected with status {status}"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "malformed payload"),
        }
    }
}

impl From<FetchError> for ListError {
    fn from(err: FetchError) -> Self {
        let kind = match err.kind {
            FailureKind::Unauthorized => ListErrorKind::Unauthorized,
            FailureKind::Rejected { .. } => ListErrorKind::Rejected,
            FailureKind::Decode => ListErrorKind::Decode,
            FailureKind::InvalidUrl
            | FailureKind::UnknownResource { .. }
            | FailureKind::ReservedParameter { .. }
            | FailureKind::HttpStatus(_)
            | FailureKind::Timeout
            | FailureKind::Network => ListErrorKind::Transport,
        };
        // Rejections carry the backend's wording verbatim.
        let message = match kind {
            ListErrorKind::Rejected => err.message,
            _ => err.to_string(),
        };
        ListError::new(kind, message)
    }
}
