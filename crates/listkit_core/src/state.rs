use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;

use listkit_logging::listkit_debug;

use crate::view_model::{AppViewModel, ListView, Toast, ToastLevel};
use crate::{
    Accumulator, Debouncer, Effect, FetchKey, ListId, ListItem, Mutation, MutationId,
    PageRequest, Scope, SentinelLoader, SessionContext, USER_SCOPE,
};

/// What one mounted list view owns. The pages themselves live in the shared
/// accumulator of `key`.
#[derive(Debug, Clone, PartialEq)]
pub struct ListController {
    pub(crate) resource: String,
    pub(crate) scope: Scope,
    pub(crate) debouncer: Debouncer,
    pub(crate) sentinel: SentinelLoader,
    pub(crate) key: FetchKey,
}

impl ListController {
    pub(crate) fn new(
        resource: String,
        scope: Scope,
        quiet_period: Duration,
        session: Option<&SessionContext>,
    ) -> Self {
        let debouncer = Debouncer::new(quiet_period);
        let key = compose_key(&resource, &scope, session, &debouncer);
        Self {
            resource,
            scope,
            debouncer,
            sentinel: SentinelLoader::new(),
            key,
        }
    }

    /// Key derived from the controller's scope, the session, and the settled
    /// query.
    pub(crate) fn derived_key(&self, session: Option<&SessionContext>) -> FetchKey {
        compose_key(&self.resource, &self.scope, session, &self.debouncer)
    }

    pub fn key(&self) -> &FetchKey {
        &self.key
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn debouncer(&self) -> &Debouncer {
        &self.debouncer
    }

    pub fn sentinel(&self) -> &SentinelLoader {
        &self.sentinel
    }

    fn view<T: ListItem>(&self, list_id: ListId, accumulator: &Accumulator<T>) -> ListView<T> {
        ListView {
            list_id,
            key: accumulator.key().clone(),
            raw_query: self.debouncer.raw().to_string(),
            items: accumulator.current_items().cloned().collect(),
            phase: accumulator.phase(),
            has_more: accumulator.has_more(),
            is_fetching_first: accumulator.is_fetching_first(),
            is_fetching_more: accumulator.is_fetching_more(),
            is_empty: accumulator.is_empty_result(),
            error: accumulator.error().cloned(),
        }
    }
}

fn compose_key(
    resource: &str,
    scope: &Scope,
    session: Option<&SessionContext>,
    debouncer: &Debouncer,
) -> FetchKey {
    let mut key = FetchKey::new(resource).with_scopes(scope.clone());
    if let Some(session) = session {
        key = key.with_scope(USER_SCOPE, session.user_id());
    }
    key.with_query(debouncer.settled().clone())
}

/// Application state: mounted list views and one accumulator per fetch key
/// they consume.
///
/// An accumulator lives as long as at least one list consumes its key, so
/// lists sharing a key share its pages and its single in-flight request.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState<T> {
    pub(crate) session: Option<SessionContext>,
    pub(crate) lists: BTreeMap<ListId, ListController>,
    pub(crate) caches: BTreeMap<FetchKey, Accumulator<T>>,
    pub(crate) pending_mutations: BTreeMap<MutationId, Mutation>,
    next_mutation_id: MutationId,
    next_generation: u64,
    toasts: VecDeque<Toast>,
    dirty: bool,
}

impl<T> Default for AppState<T> {
    fn default() -> Self {
        Self {
            session: None,
            lists: BTreeMap::new(),
            caches: BTreeMap::new(),
            pending_mutations: BTreeMap::new(),
            next_mutation_id: 0,
            next_generation: 0,
            toasts: VecDeque::new(),
            dirty: false,
        }
    }
}

impl<T: ListItem> AppState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: SessionContext) -> Self {
        Self {
            session: Some(session),
            ..Self::default()
        }
    }

    pub fn view(&self) -> AppViewModel<T> {
        AppViewModel {
            signed_in_as: self.session.as_ref().map(|s| s.user_id().to_string()),
            lists: self
                .lists
                .iter()
                .filter_map(|(list_id, controller)| {
                    let accumulator = self.caches.get(&controller.key)?;
                    Some(controller.view(*list_id, accumulator))
                })
                .collect(),
            toasts: self.toasts.iter().cloned().collect(),
            pending_mutations: self.pending_mutations.len(),
            dirty: self.dirty,
        }
    }

    pub fn session(&self) -> Option<&SessionContext> {
        self.session.as_ref()
    }

    pub fn list(&self, list_id: ListId) -> Option<&ListController> {
        self.lists.get(&list_id)
    }

    /// The accumulator a mounted list currently reads from.
    pub fn accumulator(&self, list_id: ListId) -> Option<&Accumulator<T>> {
        self.caches.get(&self.lists.get(&list_id)?.key)
    }

    pub fn is_cached(&self, key: &FetchKey) -> bool {
        self.caches.contains_key(key)
    }

    /// Returns whether anything changed since the last call, clearing the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn push_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toasts.push_back(Toast {
            level,
            message: message.into(),
        });
        self.mark_dirty();
    }

    pub(crate) fn dismiss_toast(&mut self) -> bool {
        self.toasts.pop_front().is_some()
    }

    pub(crate) fn allocate_mutation_id(&mut self) -> MutationId {
        self.next_mutation_id += 1;
        self.next_mutation_id
    }

    pub(crate) fn allocate_generation(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    pub(crate) fn list_parts(
        &mut self,
        list_id: ListId,
    ) -> Option<(&mut ListController, &mut Accumulator<T>)> {
        let controller = self.lists.get_mut(&list_id)?;
        let accumulator = self.caches.get_mut(&controller.key)?;
        Some((controller, accumulator))
    }

    /// Makes sure an accumulator exists for `key`; a new one starts fetching.
    pub(crate) fn attach(&mut self, key: FetchKey) -> Option<PageRequest> {
        if self.caches.contains_key(&key) {
            listkit_debug!("{} shared with another list", key);
            return None;
        }
        let generation = self.allocate_generation();
        let mut accumulator = Accumulator::new(key.clone(), generation);
        let first = accumulator.start();
        self.caches.insert(key, accumulator);
        first
    }

    /// Drops the accumulator of `key` once no mounted list consumes it.
    pub(crate) fn release(&mut self, key: &FetchKey) {
        if self.lists.values().any(|controller| &controller.key == key) {
            return;
        }
        if self.caches.remove(key).is_some() {
            listkit_debug!("{} no longer consumed; pages dropped", key);
        }
    }

    pub(crate) fn fetch(&self, request: PageRequest) -> Effect {
        Effect::FetchPage {
            request,
            session: self.session.clone(),
        }
    }
}
