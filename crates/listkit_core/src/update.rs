use listkit_logging::{listkit_debug, listkit_info, listkit_warn};

use crate::state::ListController;
use crate::view_model::ToastLevel;
use crate::{Applied, AppState, Effect, FetchKey, ListId, ListItem, Msg, PageRequest};

/// Pure update function: applies a message to state and returns any effects.
pub fn update<T: ListItem>(mut state: AppState<T>, msg: Msg<T>) -> (AppState<T>, Vec<Effect>) {
    let effects = match msg {
        Msg::LoggedIn(session) => {
            listkit_info!("signed in as {}", session.user_id());
            state.session = Some(session);
            state.mark_dirty();
            rekey_all(&mut state)
        }
        Msg::LoggedOut => {
            listkit_info!("signed out");
            sign_out(&mut state, false)
        }
        Msg::Mounted {
            list_id,
            resource,
            scope,
            quiet_period,
        } => {
            let mut effects = Vec::with_capacity(2);
            if unmount(&mut state, list_id) {
                listkit_debug!("list {} remounted", list_id);
                effects.push(Effect::CancelDebounce { list_id });
            }
            let controller =
                ListController::new(resource, scope, quiet_period, state.session.as_ref());
            let key = controller.key.clone();
            state.lists.insert(list_id, controller);
            let first = state.attach(key);
            effects.extend(first.map(|request| state.fetch(request)));
            state.mark_dirty();
            effects
        }
        Msg::Unmounted { list_id } => {
            if unmount(&mut state, list_id) {
                state.mark_dirty();
                vec![Effect::CancelDebounce { list_id }]
            } else {
                Vec::new()
            }
        }
        Msg::QueryTyped { list_id, text, at } => match state.lists.get_mut(&list_id) {
            Some(controller) => {
                let timer = controller.debouncer.keystroke(text, at);
                state.mark_dirty();
                vec![Effect::ScheduleDebounce { list_id, timer }]
            }
            None => Vec::new(),
        },
        Msg::DebounceElapsed {
            list_id,
            generation,
        } => {
            let settled = state
                .lists
                .get_mut(&list_id)
                .and_then(|controller| controller.debouncer.fire(generation));
            match settled {
                Some(_) => rekey(&mut state, list_id),
                None => Vec::new(),
            }
        }
        Msg::ScopeChanged {
            list_id,
            name,
            value,
        } => match state.lists.get_mut(&list_id) {
            Some(controller) => {
                if value.is_empty() {
                    controller.scope.remove(&name);
                } else {
                    controller.scope.insert(name, value);
                }
                rekey(&mut state, list_id)
            }
            None => Vec::new(),
        },
        Msg::SentinelVisibility { list_id, visible } => {
            let request = state
                .list_parts(list_id)
                .and_then(|(controller, accumulator)| {
                    controller.sentinel.set_visible(visible, accumulator)
                });
            fetch_and_mark(&mut state, request)
        }
        Msg::LoadMoreClicked { list_id } => {
            let request = state
                .list_parts(list_id)
                .and_then(|(_, accumulator)| accumulator.request_more());
            fetch_and_mark(&mut state, request)
        }
        Msg::RetryClicked { list_id } => {
            let request = state
                .list_parts(list_id)
                .and_then(|(_, accumulator)| accumulator.retry());
            fetch_and_mark(&mut state, request)
        }
        Msg::PageLoaded { request, page } => {
            let Some(accumulator) = state.caches.get_mut(&request.key) else {
                listkit_debug!("page for unconsumed key {} dropped", request.key);
                return (state, Vec::new());
            };
            match accumulator.apply_page(&request, page) {
                Applied::Stale => Vec::new(),
                Applied::Accepted => {
                    // Every visible sentinel of the key may ask; the
                    // accumulator lets at most one request through.
                    let next: Vec<PageRequest> = state
                        .lists
                        .values_mut()
                        .filter(|controller| controller.key == request.key)
                        .filter_map(|controller| controller.sentinel.after_page(accumulator))
                        .collect();
                    state.mark_dirty();
                    next.into_iter().map(|request| state.fetch(request)).collect()
                }
            }
        }
        Msg::PageFailed { request, error } => {
            let Some(accumulator) = state.caches.get_mut(&request.key) else {
                return (state, Vec::new());
            };
            let unauthorized = error.is_unauthorized();
            match accumulator.apply_failure(&request, error) {
                Applied::Stale => Vec::new(),
                Applied::Accepted if unauthorized => sign_out(&mut state, true),
                Applied::Accepted => {
                    state.mark_dirty();
                    Vec::new()
                }
            }
        }
        Msg::MutationRequested(mutation) => {
            let mutation_id = state.allocate_mutation_id();
            listkit_info!("mutation {} requested: {}", mutation_id, mutation.label);
            state.pending_mutations.insert(mutation_id, mutation.clone());
            state.mark_dirty();
            vec![Effect::RunMutation {
                mutation_id,
                mutation,
                session: state.session.clone(),
            }]
        }
        Msg::MutationSucceeded { mutation_id } => {
            let Some(mutation) = state.pending_mutations.remove(&mutation_id) else {
                listkit_debug!("completion of unknown mutation {} ignored", mutation_id);
                return (state, Vec::new());
            };
            let stale: Vec<FetchKey> = state
                .caches
                .keys()
                .filter(|key| mutation.affects(key))
                .cloned()
                .collect();
            let mut requests = Vec::with_capacity(stale.len());
            for key in stale {
                let generation = state.allocate_generation();
                if let Some(accumulator) = state.caches.get_mut(&key) {
                    requests.push(accumulator.invalidate(generation));
                }
            }
            listkit_info!(
                "mutation {} succeeded; {} key(s) invalidated",
                mutation_id,
                requests.len()
            );
            state.push_toast(ToastLevel::Info, format!("{} succeeded", mutation.label));
            requests
                .into_iter()
                .map(|request| state.fetch(request))
                .collect()
        }
        Msg::MutationFailed { mutation_id, error } => {
            let Some(mutation) = state.pending_mutations.remove(&mutation_id) else {
                return (state, Vec::new());
            };
            listkit_warn!("mutation {} ({}) failed: {}", mutation_id, mutation.label, error);
            if error.is_unauthorized() {
                sign_out(&mut state, true)
            } else {
                state.push_toast(ToastLevel::Error, error.message);
                Vec::new()
            }
        }
        Msg::ToastDismissed => {
            if state.dismiss_toast() {
                state.mark_dirty();
            }
            Vec::new()
        }
    };

    (state, effects)
}

fn fetch_and_mark<T: ListItem>(state: &mut AppState<T>, request: Option<PageRequest>) -> Vec<Effect> {
    match request {
        Some(request) => {
            state.mark_dirty();
            vec![state.fetch(request)]
        }
        None => Vec::new(),
    }
}

/// Removes a list and releases its key; returns whether it was mounted.
fn unmount<T: ListItem>(state: &mut AppState<T>, list_id: ListId) -> bool {
    match state.lists.remove(&list_id) {
        Some(controller) => {
            state.release(&controller.key);
            true
        }
        None => false,
    }
}

/// Moves a list to the key derived from its current inputs, if that changed.
fn rekey<T: ListItem>(state: &mut AppState<T>, list_id: ListId) -> Vec<Effect> {
    let session = state.session.clone();
    let Some(controller) = state.lists.get_mut(&list_id) else {
        return Vec::new();
    };
    let key = controller.derived_key(session.as_ref());
    if key == controller.key {
        return Vec::new();
    }
    let previous = std::mem::replace(&mut controller.key, key.clone());
    listkit_debug!("list {} moves from {} to {}", list_id, previous, key);
    state.release(&previous);
    let first = state.attach(key);
    state.mark_dirty();
    first.map(|request| state.fetch(request)).into_iter().collect()
}

fn rekey_all<T: ListItem>(state: &mut AppState<T>) -> Vec<Effect> {
    let list_ids: Vec<ListId> = state.lists.keys().copied().collect();
    list_ids
        .into_iter()
        .flat_map(|list_id| rekey(state, list_id))
        .collect()
}

/// Drops the session together with every list, cached page and pending
/// mutation.
fn sign_out<T: ListItem>(state: &mut AppState<T>, redirect: bool) -> Vec<Effect> {
    state.session = None;
    state.pending_mutations.clear();
    state.caches.clear();
    let mut effects: Vec<Effect> = std::mem::take(&mut state.lists)
        .into_keys()
        .map(|list_id| Effect::CancelDebounce { list_id })
        .collect();
    if redirect {
        listkit_warn!("session rejected by backend; redirecting to login");
        effects.push(Effect::RedirectToLogin);
    }
    state.mark_dirty();
    effects
}
