use std::time::Duration;

use listkit_core::SessionContext;
use listkit_logging::listkit_debug;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::Value;
use url::Url;

use crate::{FailureKind, FetchError};

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Shared HTTP client bound to the backend's base URL.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(base_url: &str, settings: &FetchSettings) -> Result<Self, FetchError> {
        let mut base_url = Url::parse(base_url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        // Without a trailing slash `join` would replace the last segment.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> Result<Url, FetchError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    pub(crate) fn request(
        &self,
        method: Method,
        url: Url,
        session: Option<&SessionContext>,
    ) -> RequestBuilder {
        listkit_debug!("{} {}", method, url);
        let builder = self.client.request(method, url);
        match session {
            Some(session) => builder.bearer_auth(session.token()),
            None => builder,
        }
    }

    pub(crate) fn with_json(builder: RequestBuilder, body: &Value) -> Result<RequestBuilder, FetchError> {
        let payload = serde_json::to_vec(body)
            .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))?;
        Ok(builder.header(CONTENT_TYPE, "application/json").body(payload))
    }

    /// Sends the request and returns the body of a successful response.
    pub(crate) async fn send(&self, builder: RequestBuilder) -> Result<Vec<u8>, FetchError> {
        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_reqwest_error)?;

        if status.is_success() {
            return Ok(body.to_vec());
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(FetchError::new(FailureKind::Unauthorized, status.to_string()));
        }
        if status.is_client_error() {
            let message = rejection_message(&body).unwrap_or_else(|| status.to_string());
            return Err(FetchError::new(
                FailureKind::Rejected {
                    status: status.as_u16(),
                },
                message,
            ));
        }
        Err(FetchError::new(
            FailureKind::HttpStatus(status.as_u16()),
            status.to_string(),
        ))
    }
}

fn rejection_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    match value.get("message")? {
        Value::String(message) => Some(message.clone()),
        // Some validators answer with one message per field.
        Value::Array(messages) => {
            let joined: Vec<&str> = messages.iter().filter_map(Value::as_str).collect();
            (!joined.is_empty()).then(|| joined.join("; "))
        }
        _ => None,
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_trailing_slash() {
        let backend = HttpBackend::new("http://localhost:4000/api", &FetchSettings::default()).unwrap();
        assert_eq!(backend.url("/orders/list").unwrap().as_str(), "http://localhost:4000/api/orders/list");
    }

    #[test]
    fn rejection_message_reads_string_or_list() {
        assert_eq!(
            rejection_message(br#"{"message":"Name is required"}"#),
            Some("Name is required".to_string())
        );
        assert_eq!(
            rejection_message(br#"{"message":["a","b"]}"#),
            Some("a; b".to_string())
        );
        assert_eq!(rejection_message(b"not json"), None);
    }

    #[test]
    fn invalid_base_url_is_reported() {
        let err = HttpBackend::new("::nope", &FetchSettings::default()).unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidUrl);
    }
}
