use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context};
use clap::Parser;
use listkit_core::{
    update, AppState, DebounceState, InvalidationTarget, ListId, Msg, Mutation, MutationMethod,
    Scope, SessionContext,
};
use listkit_engine::{
    EndpointCatalog, EngineHandle, FetchSettings, HttpBackend, ReqwestMutationClient,
    ReqwestPageFetcher,
};
use listkit_logging::{listkit_info, listkit_warn, redact};

use super::commands::{parse_command, parse_scope_pair, Command, HELP};
use super::config::{load_config, AppConfig, ResourceConfig};
use super::effects::{event_to_msg, EffectRunner};
use super::logging;
use super::records::{Record, RecordDecoder};
use super::render::render;

const MAIN_LIST: ListId = 1;
const POLL: Duration = Duration::from_millis(20);

/// Browse one paginated resource of the backend from the terminal.
#[derive(Debug, Parser)]
#[command(name = "listkit", version, about)]
pub struct Args {
    /// RON file describing the backend and its list resources.
    #[arg(long, default_value = "listkit.ron")]
    config: PathBuf,
    /// Overrides `base_url` from the config file.
    #[arg(long)]
    base_url: Option<String>,
    /// Resource to mount; defaults to the first configured one.
    #[arg(long)]
    resource: Option<String>,
    /// Scoping id such as `lineId=line-A`; repeatable.
    #[arg(long = "scope", value_parser = parse_scope_pair)]
    scopes: Vec<(String, String)>,
    #[arg(long, env = "LISTKIT_USER")]
    user: Option<String>,
    #[arg(long, env = "LISTKIT_TOKEN", hide_env_values = true)]
    token: Option<String>,
}

pub fn run_app(args: Args) -> anyhow::Result<()> {
    let mut config = load_config(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }
    logging::initialize(config.log_destination, config.level()?);

    let resource = match &args.resource {
        Some(name) => config.resource(name)?.clone(),
        None => config
            .resources
            .first()
            .cloned()
            .ok_or_else(|| anyhow!("no resources configured"))?,
    };
    let scope: Scope = args.scopes.into_iter().collect();

    let state = match (args.user, args.token) {
        (Some(user), Some(token)) => {
            listkit_info!("starting signed in as {} token={}", user, redact(&token));
            AppState::with_session(SessionContext::new(user, token))
        }
        (None, Some(_)) => {
            listkit_warn!("--token given without --user; starting signed out");
            AppState::new()
        }
        _ => AppState::new(),
    };

    let engine = start_engine(&config).context("starting engine")?;
    let (input_tx, input_rx) = mpsc::channel();
    spawn_stdin_reader(input_tx);

    let mut app = App {
        state,
        runner: EffectRunner::new(engine),
        config,
        resource,
        scope,
    };
    println!("{HELP}");
    app.mount();
    app.run(input_rx);
    Ok(())
}

fn start_engine(config: &AppConfig) -> anyhow::Result<EngineHandle<Record>> {
    let backend = HttpBackend::new(&config.base_url, &FetchSettings::default())?;
    let catalog: EndpointCatalog = config.resources.iter().map(ResourceConfig::endpoint).collect();
    let decoder = RecordDecoder::new(
        config
            .resources
            .iter()
            .map(|resource| (resource.resource.clone(), resource.kind)),
    );
    let engine = EngineHandle::new(
        Arc::new(ReqwestPageFetcher::new(backend.clone(), catalog)),
        Arc::new(ReqwestMutationClient::new(backend)),
        Arc::new(decoder),
    )?;
    Ok(engine)
}

enum Input {
    Line(String),
    Closed,
}

fn spawn_stdin_reader(tx: mpsc::Sender<Input>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(Input::Line(line)).is_err() {
                        return;
                    }
                }
                Err(err) => {
                    listkit_warn!("stdin read failed: {}", err);
                    break;
                }
            }
        }
        let _ = tx.send(Input::Closed);
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

struct App {
    state: AppState<Record>,
    runner: EffectRunner,
    config: AppConfig,
    resource: ResourceConfig,
    scope: Scope,
}

impl App {
    fn run(&mut self, input_rx: mpsc::Receiver<Input>) {
        let mut input_open = true;
        loop {
            if input_open {
                while let Some(event) = self.runner.engine().try_recv() {
                    self.dispatch(event_to_msg(event));
                }
                match input_rx.recv_timeout(POLL) {
                    Ok(Input::Line(line)) => {
                        if self.handle_line(&line) == Flow::Quit {
                            break;
                        }
                    }
                    Ok(Input::Closed) | Err(mpsc::RecvTimeoutError::Disconnected) => {
                        input_open = false;
                    }
                    Err(mpsc::RecvTimeoutError::Timeout) => {}
                }
            } else {
                // Piped input: let outstanding work land before exiting.
                if !self.is_busy() {
                    break;
                }
                if let Some(event) = self.runner.engine().recv_timeout(POLL) {
                    self.dispatch(event_to_msg(event));
                }
            }
        }
        listkit_info!("bye");
    }

    fn dispatch(&mut self, msg: Msg<Record>) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        self.runner.enqueue(effects);
        if state.consume_dirty() {
            print!("{}", render(&state.view()));
        }
        self.state = state;
    }

    fn mount(&mut self) {
        self.dispatch(Msg::Mounted {
            list_id: MAIN_LIST,
            resource: self.resource.resource.clone(),
            scope: self.scope.clone(),
            quiet_period: self.config.quiet_period(),
        });
    }

    fn is_busy(&self) -> bool {
        let view = self.state.view();
        view.pending_mutations > 0
            || view
                .lists
                .iter()
                .any(|list| list.is_fetching_first || list.is_fetching_more)
            || self.state.list(MAIN_LIST).is_some_and(|list| {
                matches!(list.debouncer().state(), DebounceState::Typing { .. })
            })
    }

    fn handle_line(&mut self, line: &str) -> Flow {
        if line.trim().is_empty() {
            return Flow::Continue;
        }
        let command = match parse_command(line) {
            Ok(command) => command,
            Err(err) => {
                println!("{err}");
                return Flow::Continue;
            }
        };

        match command {
            Command::Type(text) => self.dispatch(Msg::QueryTyped {
                list_id: MAIN_LIST,
                text,
                at: Instant::now(),
            }),
            Command::More => self.dispatch(Msg::LoadMoreClicked { list_id: MAIN_LIST }),
            Command::Show => self.dispatch(Msg::SentinelVisibility {
                list_id: MAIN_LIST,
                visible: true,
            }),
            Command::Hide => self.dispatch(Msg::SentinelVisibility {
                list_id: MAIN_LIST,
                visible: false,
            }),
            Command::Scope { name, value } => {
                if value.is_empty() {
                    self.scope.remove(&name);
                } else {
                    self.scope.insert(name.clone(), value.clone());
                }
                self.dispatch(Msg::ScopeChanged {
                    list_id: MAIN_LIST,
                    name,
                    value,
                });
            }
            Command::Retry => self.dispatch(Msg::RetryClicked { list_id: MAIN_LIST }),
            Command::Delete(id) => match self.delete_mutation(&id) {
                Ok(mutation) => self.dispatch(Msg::MutationRequested(mutation)),
                Err(reason) => println!("{reason}"),
            },
            Command::Login { user_id, token } => {
                self.dispatch(Msg::LoggedIn(SessionContext::new(user_id, token)));
                // Sign-out tears lists down; bring the view back.
                if self.state.list(MAIN_LIST).is_none() {
                    self.mount();
                }
            }
            Command::Logout => self.dispatch(Msg::LoggedOut),
            Command::Dismiss => self.dispatch(Msg::ToastDismissed),
            Command::Help => println!("{HELP}"),
            Command::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    fn delete_mutation(&self, id: &str) -> Result<Mutation, String> {
        let path = self
            .resource
            .delete_path_for(id)
            .ok_or_else(|| format!("rows of {} cannot be deleted", self.resource.resource))?;
        let list = self.state.list(MAIN_LIST).ok_or("no list is mounted")?;
        let target = InvalidationTarget::from(list.key());
        Ok(Mutation::new(format!("Delete {id}"), MutationMethod::Delete, path).invalidating(target))
    }
}
