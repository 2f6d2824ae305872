use listkit_core::{Effect, Msg};
use listkit_engine::{EngineEvent, EngineHandle};
use listkit_logging::{listkit_info, listkit_warn};

use super::records::Record;

/// Turns reducer effects into engine commands.
pub struct EffectRunner {
    engine: EngineHandle<Record>,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle<Record>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &EngineHandle<Record> {
        &self.engine
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::FetchPage { request, session } => {
                    listkit_info!(
                        "FetchPage key={} page={} generation={}",
                        request.key,
                        request.page_index,
                        request.generation
                    );
                    self.engine.fetch_page(request, session);
                }
                Effect::ScheduleDebounce { list_id, timer } => {
                    self.engine.schedule_debounce(list_id, timer);
                }
                Effect::CancelDebounce { list_id } => {
                    self.engine.cancel_debounce(list_id);
                }
                Effect::RunMutation {
                    mutation_id,
                    mutation,
                    session,
                } => {
                    listkit_info!("RunMutation id={} label={}", mutation_id, mutation.label);
                    self.engine.mutate(mutation_id, mutation, session);
                }
                Effect::RedirectToLogin => {
                    listkit_warn!("session rejected by the backend");
                    println!("Session expired. Sign in again with `login <user> <token>`.");
                }
            }
        }
    }
}

pub fn event_to_msg(event: EngineEvent<Record>) -> Msg<Record> {
    match event {
        EngineEvent::PageFetched { request, result } => match result {
            Ok(page) => Msg::PageLoaded { request, page },
            Err(err) => {
                listkit_warn!("page {} of {} failed: {}", request.page_index, request.key, err);
                Msg::PageFailed {
                    request,
                    error: err.into(),
                }
            }
        },
        EngineEvent::MutationCompleted {
            mutation_id,
            result,
        } => match result {
            Ok(()) => Msg::MutationSucceeded { mutation_id },
            Err(err) => {
                listkit_warn!("mutation {} failed: {}", mutation_id, err);
                Msg::MutationFailed {
                    mutation_id,
                    error: err.into(),
                }
            }
        },
        EngineEvent::DebounceElapsed {
            list_id,
            generation,
        } => Msg::DebounceElapsed {
            list_id,
            generation,
        },
    }
}
