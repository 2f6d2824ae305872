use crate::{DebounceTimer, ListId, Mutation, MutationId, PageRequest, SessionContext};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchPage {
        request: PageRequest,
        session: Option<SessionContext>,
    },
    ScheduleDebounce {
        list_id: ListId,
        timer: DebounceTimer,
    },
    CancelDebounce {
        list_id: ListId,
    },
    RunMutation {
        mutation_id: MutationId,
        mutation: Mutation,
        session: Option<SessionContext>,
    },
    RedirectToLogin,
}
