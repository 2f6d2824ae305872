use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Cursor;

/// An item that can live in an accumulated list.
pub trait ListItem: Clone + fmt::Debug + PartialEq {
    /// Server-assigned identity, used for diagnostics only.
    fn item_id(&self) -> &str;
}

/// One page as returned by a list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub list: Vec<T>,
    pub last_cursor: Option<Cursor>,
    pub has_more: bool,
}

impl<T> Page<T> {
    pub fn new(list: Vec<T>, last_cursor: Option<Cursor>, has_more: bool) -> Self {
        Self {
            list,
            last_cursor,
            has_more,
        }
    }

    /// Cursor for the following page; `None` once the list is exhausted.
    pub fn next_cursor(&self) -> Option<&Cursor> {
        if self.has_more {
            self.last_cursor.as_ref()
        } else {
            None
        }
    }
}
