use crate::{FetchKey, ListError, ListId, Phase};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Error,
}

/// Transient user notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListView<T> {
    pub list_id: ListId,
    pub key: FetchKey,
    pub raw_query: String,
    pub items: Vec<T>,
    pub phase: Phase,
    pub has_more: bool,
    pub is_fetching_first: bool,
    pub is_fetching_more: bool,
    pub is_empty: bool,
    pub error: Option<ListError>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppViewModel<T> {
    pub signed_in_as: Option<String>,
    pub lists: Vec<ListView<T>>,
    pub toasts: Vec<Toast>,
    pub pending_mutations: usize,
    pub dirty: bool,
}
