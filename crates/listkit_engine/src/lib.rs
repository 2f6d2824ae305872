//! Listkit engine: HTTP boundary and effect execution.
mod decode;
mod engine;
mod fetch;
mod http;
mod mutate;
mod types;

pub use decode::{decode_page, DecodeError, ItemDecoder, SerdeItemDecoder};
pub use engine::EngineHandle;
pub use fetch::{
    EndpointCatalog, ListEndpoint, ListMethod, PageFetcher, ReqwestPageFetcher, PAGING_PARAMS,
};
pub use http::{FetchSettings, HttpBackend};
pub use mutate::{MutationClient, ReqwestMutationClient};
pub use types::{EngineEvent, FailureKind, FetchError};
