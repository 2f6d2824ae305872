use std::marker::PhantomData;

use listkit_core::Page;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{FailureKind, FetchError};

/// Turns a raw list item into a verified, typed item.
pub trait ItemDecoder<T>: Send + Sync {
    fn decode(&self, resource: &str, value: Value) -> Result<T, DecodeError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{resource}: {reason}")]
pub struct DecodeError {
    pub resource: String,
    pub reason: String,
}

impl DecodeError {
    pub fn new(resource: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            reason: reason.into(),
        }
    }
}

/// Decodes every item of every resource into the same serde type.
pub struct SerdeItemDecoder<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> SerdeItemDecoder<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for SerdeItemDecoder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DeserializeOwned> ItemDecoder<T> for SerdeItemDecoder<T> {
    fn decode(&self, resource: &str, value: Value) -> Result<T, DecodeError> {
        serde_json::from_value(value).map_err(|err| DecodeError::new(resource, err.to_string()))
    }
}

/// Validates a whole page; one bad item fails the page.
pub fn decode_page<T>(
    decoder: &dyn ItemDecoder<T>,
    resource: &str,
    page: Page<Value>,
) -> Result<Page<T>, FetchError> {
    let list = page
        .list
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            decoder
                .decode(resource, value)
                .map_err(|err| FetchError::new(FailureKind::Decode, format!("item {index} of {err}")))
        })
        .collect::<Result<Vec<T>, FetchError>>()?;
    Ok(Page::new(list, page.last_cursor, page.has_more))
}

#[cfg(test)]
mod tests {
    use super::*;
    use listkit_core::Cursor;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Position {
        id: String,
        title: String,
    }

    #[test]
    fn page_with_valid_items_decodes() {
        let raw = Page::new(
            vec![json!({"id": "p1", "title": "Clerk", "extra": 1})],
            Some(Cursor::new("p1")),
            true,
        );
        let page = decode_page(&SerdeItemDecoder::<Position>::new(), "positions", raw).unwrap();
        assert_eq!(
            page.list,
            vec![Position {
                id: "p1".to_string(),
                title: "Clerk".to_string()
            }]
        );
        assert!(page.has_more);
    }

    #[test]
    fn one_bad_item_fails_the_page() {
        let raw = Page::new(
            vec![json!({"id": "p1", "title": "Clerk"}), json!({"id": 2})],
            None,
            false,
        );
        let err = decode_page(&SerdeItemDecoder::<Position>::new(), "positions", raw).unwrap_err();
        assert_eq!(err.kind, FailureKind::Decode);
        assert!(err.message.starts_with("item 1 of positions:"));
    }
}
