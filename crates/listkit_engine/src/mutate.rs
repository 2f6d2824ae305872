use listkit_core::{Mutation, MutationMethod, SessionContext};
use listkit_logging::listkit_info;
use reqwest::Method;

use crate::{FetchError, HttpBackend};

#[async_trait::async_trait]
pub trait MutationClient: Send + Sync {
    async fn execute(
        &self,
        mutation: &Mutation,
        session: Option<&SessionContext>,
    ) -> Result<(), FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestMutationClient {
    backend: HttpBackend,
}

impl ReqwestMutationClient {
    pub fn new(backend: HttpBackend) -> Self {
        Self { backend }
    }
}

#[async_trait::async_trait]
impl MutationClient for ReqwestMutationClient {
    async fn execute(
        &self,
        mutation: &Mutation,
        session: Option<&SessionContext>,
    ) -> Result<(), FetchError> {
        let url = self.backend.url(&mutation.path)?;
        let method = match mutation.method {
            MutationMethod::Post => Method::POST,
            MutationMethod::Put => Method::PUT,
            MutationMethod::Patch => Method::PATCH,
            MutationMethod::Delete => Method::DELETE,
        };
        let builder = self.backend.request(method, url, session);
        let builder = match &mutation.body {
            Some(body) => HttpBackend::with_json(builder, body)?,
            None => builder,
        };
        self.backend.send(builder).await?;
        listkit_info!("{} accepted by backend", mutation.label);
        Ok(())
    }
}
