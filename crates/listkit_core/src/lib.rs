//! Listkit core: pure pagination state machines and the list reducer.
mod accumulator;
mod debounce;
mod effect;
mod error;
mod invalidation;
mod key;
mod msg;
mod page;
mod sentinel;
mod session;
mod state;
mod update;
mod view_model;

pub use accumulator::{Accumulator, Applied, ListId, PageRequest, Phase};
pub use debounce::{DebounceState, DebounceTimer, Debouncer, DEFAULT_QUIET_PERIOD};
pub use effect::Effect;
pub use error::{ListError, ListErrorKind};
pub use invalidation::{InvalidationTarget, Mutation, MutationId, MutationMethod};
pub use key::{Cursor, FetchKey, Query, Scope};
pub use msg::Msg;
pub use page::{ListItem, Page};
pub use sentinel::SentinelLoader;
pub use session::{SessionContext, USER_SCOPE};
pub use state::{AppState, ListController};
pub use update::update;
pub use view_model::{AppViewModel, ListView, Toast, ToastLevel};
