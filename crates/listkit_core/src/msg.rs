use std::time::{Duration, Instant};

use crate::{
    ListError, ListId, Mutation, MutationId, Page, PageRequest, Scope, SessionContext,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg<T> {
    /// User signed in; every key is scoped to them from now on.
    LoggedIn(SessionContext),
    /// User signed out; all list state is torn down.
    LoggedOut,
    /// A list view appeared.
    Mounted {
        list_id: ListId,
        resource: String,
        scope: Scope,
        quiet_period: Duration,
    },
    /// A list view went away.
    Unmounted { list_id: ListId },
    /// User edited the search box (raw, undebounced text).
    QueryTyped {
        list_id: ListId,
        text: String,
        at: Instant,
    },
    /// A debounce timer armed earlier has fired.
    DebounceElapsed { list_id: ListId, generation: u64 },
    /// A scoping id of the list changed. An empty value removes it.
    ScopeChanged {
        list_id: ListId,
        name: String,
        value: String,
    },
    /// The sentinel after the last row entered or left the viewport.
    SentinelVisibility { list_id: ListId, visible: bool },
    /// User clicked "load more".
    LoadMoreClicked { list_id: ListId },
    /// User clicked retry on a failed list.
    RetryClicked { list_id: ListId },
    /// Engine delivered a page.
    PageLoaded { request: PageRequest, page: Page<T> },
    /// Engine failed to deliver a page.
    PageFailed {
        request: PageRequest,
        error: ListError,
    },
    /// User triggered a create/update/delete.
    MutationRequested(Mutation),
    MutationSucceeded { mutation_id: MutationId },
    MutationFailed {
        mutation_id: MutationId,
        error: ListError,
    },
    /// User dismissed the oldest notification.
    ToastDismissed,
}
