use std::collections::HashMap;
use std::io;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use listkit_core::{DebounceTimer, ListId, Mutation, MutationId, PageRequest, SessionContext};
use listkit_logging::{listkit_debug, listkit_trace};
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

use crate::decode::decode_page;
use crate::{EngineEvent, ItemDecoder, MutationClient, PageFetcher};

enum EngineCommand {
    FetchPage {
        request: PageRequest,
        session: Option<SessionContext>,
    },
    Mutate {
        mutation_id: MutationId,
        mutation: Mutation,
        session: Option<SessionContext>,
    },
    ScheduleDebounce {
        list_id: ListId,
        timer: DebounceTimer,
    },
    CancelDebounce {
        list_id: ListId,
    },
}

struct Workers<T> {
    fetcher: Arc<dyn PageFetcher>,
    mutations: Arc<dyn MutationClient>,
    decoder: Arc<dyn ItemDecoder<T>>,
}

/// Runs fetches, mutations and debounce timers on a background tokio
/// runtime; results come back as [`EngineEvent`]s.
pub struct EngineHandle<T> {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent<T>>,
}

impl<T: Send + 'static> EngineHandle<T> {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        mutations: Arc<dyn MutationClient>,
        decoder: Arc<dyn ItemDecoder<T>>,
    ) -> io::Result<Self> {
        let runtime = Runtime::new()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let workers = Workers {
            fetcher,
            mutations,
            decoder,
        };

        thread::Builder::new()
            .name("listkit-engine".to_string())
            .spawn(move || run(runtime, workers, cmd_rx, event_tx))?;

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn fetch_page(&self, request: PageRequest, session: Option<SessionContext>) {
        self.send(EngineCommand::FetchPage { request, session });
    }

    pub fn mutate(
        &self,
        mutation_id: MutationId,
        mutation: Mutation,
        session: Option<SessionContext>,
    ) {
        self.send(EngineCommand::Mutate {
            mutation_id,
            mutation,
            session,
        });
    }

    pub fn schedule_debounce(&self, list_id: ListId, timer: DebounceTimer) {
        self.send(EngineCommand::ScheduleDebounce { list_id, timer });
    }

    pub fn cancel_debounce(&self, list_id: ListId) {
        self.send(EngineCommand::CancelDebounce { list_id });
    }

    pub fn try_recv(&self) -> Option<EngineEvent<T>> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent<T>> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            listkit_debug!("engine thread gone; command dropped");
        }
    }
}

fn run<T: Send + 'static>(
    runtime: Runtime,
    workers: Workers<T>,
    cmd_rx: mpsc::Receiver<EngineCommand>,
    event_tx: mpsc::Sender<EngineEvent<T>>,
) {
    let mut timers: HashMap<ListId, CancellationToken> = HashMap::new();

    while let Ok(command) = cmd_rx.recv() {
        let event_tx = event_tx.clone();
        match command {
            EngineCommand::FetchPage { request, session } => {
                let fetcher = workers.fetcher.clone();
                let decoder = workers.decoder.clone();
                runtime.spawn(async move {
                    let result = fetcher
                        .fetch_page(&request, session.as_ref())
                        .await
                        .and_then(|raw| {
                            decode_page(decoder.as_ref(), request.key.resource(), raw)
                        });
                    let _ = event_tx.send(EngineEvent::PageFetched { request, result });
                });
            }
            EngineCommand::Mutate {
                mutation_id,
                mutation,
                session,
            } => {
                let mutations = workers.mutations.clone();
                runtime.spawn(async move {
                    let result = mutations.execute(&mutation, session.as_ref()).await;
                    let _ = event_tx.send(EngineEvent::MutationCompleted {
                        mutation_id,
                        result,
                    });
                });
            }
            EngineCommand::ScheduleDebounce { list_id, timer } => {
                let token = CancellationToken::new();
                if let Some(previous) = timers.insert(list_id, token.clone()) {
                    previous.cancel();
                }
                let deadline = tokio::time::Instant::from_std(timer.deadline);
                runtime.spawn(async move {
                    let slept = token
                        .run_until_cancelled(tokio::time::sleep_until(deadline))
                        .await;
                    if slept.is_some() {
                        let _ = event_tx.send(EngineEvent::DebounceElapsed {
                            list_id,
                            generation: timer.generation,
                        });
                    } else {
                        listkit_trace!("debounce timer of list {} cancelled", list_id);
                    }
                });
            }
            EngineCommand::CancelDebounce { list_id } => {
                if let Some(token) = timers.remove(&list_id) {
                    token.cancel();
                }
            }
        }
    }

    for token in timers.values() {
        token.cancel();
    }
    listkit_debug!("engine command channel closed; shutting down");
}

