use std::collections::BTreeMap;

use listkit_core::{Page, PageRequest, SessionContext};
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::{FailureKind, FetchError, HttpBackend};

/// Parameter names the fetcher owns; scopes may not use them.
pub const PAGING_PARAMS: [&str; 3] = ["cursor", "limit", "query"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum ListMethod {
    /// Parameters travel in the query string; a null cursor is omitted.
    #[default]
    Get,
    /// Parameters travel as a JSON body; a null cursor is sent as `null`.
    Post,
}

/// How one resource's list endpoint is called.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListEndpoint {
    pub resource: String,
    pub path: String,
    #[serde(default)]
    pub method: ListMethod,
    pub page_size: String,
}

#[derive(Debug, Clone, Default)]
pub struct EndpointCatalog {
    endpoints: BTreeMap<String, ListEndpoint>,
}

impl EndpointCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, endpoint: ListEndpoint) {
        self.endpoints.insert(endpoint.resource.clone(), endpoint);
    }

    pub fn get(&self, resource: &str) -> Option<&ListEndpoint> {
        self.endpoints.get(resource)
    }
}

impl FromIterator<ListEndpoint> for EndpointCatalog {
    fn from_iter<I: IntoIterator<Item = ListEndpoint>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for endpoint in iter {
            catalog.insert(endpoint);
        }
        catalog
    }
}

#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches one raw page; items are validated later by an item decoder.
    async fn fetch_page(
        &self,
        request: &PageRequest,
        session: Option<&SessionContext>,
    ) -> Result<Page<Value>, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestPageFetcher {
    backend: HttpBackend,
    catalog: EndpointCatalog,
}

impl ReqwestPageFetcher {
    pub fn new(backend: HttpBackend, catalog: EndpointCatalog) -> Self {
        Self { backend, catalog }
    }
}

#[async_trait::async_trait]
impl PageFetcher for ReqwestPageFetcher {
    async fn fetch_page(
        &self,
        request: &PageRequest,
        session: Option<&SessionContext>,
    ) -> Result<Page<Value>, FetchError> {
        let resource = request.key.resource();
        let endpoint = self.catalog.get(resource).ok_or_else(|| {
            FetchError::new(
                FailureKind::UnknownResource {
                    resource: resource.to_string(),
                },
                "no endpoint configured",
            )
        })?;
        if let Some(name) = request
            .key
            .scope()
            .keys()
            .find(|name| PAGING_PARAMS.contains(&name.as_str()))
        {
            return Err(FetchError::new(
                FailureKind::ReservedParameter { name: name.clone() },
                "scope name collides with a paging parameter",
            ));
        }
        let mut url = self.backend.url(&endpoint.path)?;

        let builder = match endpoint.method {
            ListMethod::Get => {
                {
                    let mut pairs = url.query_pairs_mut();
                    if let Some(cursor) = &request.cursor {
                        pairs.append_pair("cursor", cursor.as_str());
                    }
                    pairs.append_pair("limit", &endpoint.page_size);
                    pairs.append_pair("query", request.key.query().as_str());
                    for (name, value) in request.key.scope() {
                        pairs.append_pair(name, value);
                    }
                }
                self.backend.request(Method::GET, url, session)
            }
            ListMethod::Post => {
                let body = post_body(request, endpoint);
                HttpBackend::with_json(self.backend.request(Method::POST, url, session), &body)?
            }
        };

        let body = self.backend.send(builder).await?;
        serde_json::from_slice::<Page<Value>>(&body)
            .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))
    }
}

fn post_body(request: &PageRequest, endpoint: &ListEndpoint) -> Value {
    let mut body = Map::new();
    body.insert(
        "cursor".to_string(),
        request
            .cursor
            .as_ref()
            .map_or(Value::Null, |cursor| json!(cursor.as_str())),
    );
    body.insert("limit".to_string(), json!(endpoint.page_size));
    body.insert("query".to_string(), json!(request.key.query().as_str()));
    for (name, value) in request.key.scope() {
        body.insert(name.clone(), json!(value));
    }
    Value::Object(body)
}
