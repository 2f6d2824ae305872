#![allow(dead_code)]

use std::sync::Once;

use listkit_core::{Cursor, ListItem, Page, PageRequest};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(listkit_logging::initialize_for_tests);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: String,
    pub name: String,
}

impl ListItem for Row {
    fn item_id(&self) -> &str {
        &self.id
    }
}

pub fn rows(prefix: &str, count: usize) -> Vec<Row> {
    (1..=count)
        .map(|n| Row {
            id: format!("{prefix}-{n}"),
            name: format!("{prefix} item {n}"),
        })
        .collect()
}

/// In-memory stand-in for a list endpoint using the last item id as cursor.
pub struct FakeBackend {
    pub rows: Vec<Row>,
    pub page_size: usize,
}

impl FakeBackend {
    pub fn new(rows: Vec<Row>, page_size: usize) -> Self {
        Self { rows, page_size }
    }

    pub fn serve(&self, request: &PageRequest) -> Page<Row> {
        let query = request.key.query().as_str();
        let matching: Vec<&Row> = self
            .rows
            .iter()
            .filter(|row| query.is_empty() || row.name.contains(query))
            .collect();
        let start = match &request.cursor {
            None => 0,
            Some(cursor) => matching
                .iter()
                .position(|row| row.id == cursor.as_str())
                .map_or(matching.len(), |idx| idx + 1),
        };
        let end = (start + self.page_size).min(matching.len());
        let list: Vec<Row> = matching[start..end].iter().map(|row| (*row).clone()).collect();
        let last_cursor = list.last().map(|row| Cursor::new(row.id.clone()));
        Page::new(list, last_cursor, end < matching.len())
    }

    pub fn delete(&mut self, id: &str) {
        self.rows.retain(|row| row.id != id);
    }
}
