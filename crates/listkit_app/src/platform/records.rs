use std::collections::BTreeMap;

use listkit_core::ListItem;
use listkit_engine::{DecodeError, ItemDecoder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Which record schema a resource's items follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum RecordKind {
    Notification,
    Inventory,
    Position,
    Prescription,
    Order,
    JobPost,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub read: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    pub quantity: i64,
    #[serde(default)]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub department: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub patient_name: String,
    pub medicine: String,
    #[serde(default)]
    pub dosage: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub reference: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPost {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub open: bool,
}

/// Closed set of list rows the terminal knows how to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Notification(Notification),
    Inventory(InventoryItem),
    Position(Position),
    Prescription(Prescription),
    Order(Order),
    JobPost(JobPost),
}

impl Record {
    pub fn summary(&self) -> String {
        match self {
            Record::Notification(n) => {
                let marker = if n.read { " " } else { "*" };
                format!("{marker} {}", n.title)
            }
            Record::Inventory(item) => match &item.unit {
                Some(unit) => format!("{} ({} {unit})", item.name, item.quantity),
                None => format!("{} ({})", item.name, item.quantity),
            },
            Record::Position(p) => match &p.department {
                Some(department) => format!("{} / {department}", p.title),
                None => p.title.clone(),
            },
            Record::Prescription(rx) => match &rx.dosage {
                Some(dosage) => format!("{}: {} {dosage}", rx.patient_name, rx.medicine),
                None => format!("{}: {}", rx.patient_name, rx.medicine),
            },
            Record::Order(order) => format!("{} [{}]", order.reference, order.status),
            Record::JobPost(post) => {
                let state = if post.open { "open" } else { "closed" };
                match &post.location {
                    Some(location) => format!("{} @ {location} ({state})", post.title),
                    None => format!("{} ({state})", post.title),
                }
            }
        }
    }
}

impl ListItem for Record {
    fn item_id(&self) -> &str {
        match self {
            Record::Notification(n) => &n.id,
            Record::Inventory(item) => &item.id,
            Record::Position(p) => &p.id,
            Record::Prescription(rx) => &rx.id,
            Record::Order(order) => &order.id,
            Record::JobPost(post) => &post.id,
        }
    }
}

/// Validates raw items against the schema configured for their resource.
pub struct RecordDecoder {
    kinds: BTreeMap<String, RecordKind>,
}

impl RecordDecoder {
    pub fn new(kinds: impl IntoIterator<Item = (String, RecordKind)>) -> Self {
        Self {
            kinds: kinds.into_iter().collect(),
        }
    }
}

impl ItemDecoder<Record> for RecordDecoder {
    fn decode(&self, resource: &str, value: Value) -> Result<Record, DecodeError> {
        let kind = self
            .kinds
            .get(resource)
            .ok_or_else(|| DecodeError::new(resource, "no record kind configured"))?;
        match kind {
            RecordKind::Notification => parse(resource, value).map(Record::Notification),
            RecordKind::Inventory => parse(resource, value).map(Record::Inventory),
            RecordKind::Position => parse(resource, value).map(Record::Position),
            RecordKind::Prescription => parse(resource, value).map(Record::Prescription),
            RecordKind::Order => parse(resource, value).map(Record::Order),
            RecordKind::JobPost => parse(resource, value).map(Record::JobPost),
        }
    }
}

fn parse<T: DeserializeOwned>(resource: &str, value: Value) -> Result<T, DecodeError> {
    serde_json::from_value(value).map_err(|err| DecodeError::new(resource, err.to_string()))
}

/// Backends hand out ids as strings or integers; rows always carry strings.
fn id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(text) => text,
        Id::Number(number) => number.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn decoder() -> RecordDecoder {
        RecordDecoder::new([
            ("inventory".to_string(), RecordKind::Inventory),
            ("job-posts".to_string(), RecordKind::JobPost),
        ])
    }

    #[test]
    fn decodes_by_configured_kind_and_normalizes_ids() {
        let record = decoder()
            .decode(
                "inventory",
                json!({"id": 42, "name": "Gauze", "quantity": 12, "unit": "box"}),
            )
            .unwrap();
        assert_eq!(record.item_id(), "42");
        assert_eq!(record.summary(), "Gauze (12 box)");
    }

    #[test]
    fn rejects_items_missing_required_fields() {
        let err = decoder()
            .decode("job-posts", json!({"id": "jp-1"}))
            .unwrap_err();
        assert_eq!(err.resource, "job-posts");
        assert!(err.reason.contains("title"));
    }

    #[test]
    fn unknown_resource_is_a_decode_error() {
        let err = decoder().decode("districts", json!({"id": "d1"})).unwrap_err();
        assert_eq!(err.reason, "no record kind configured");
    }
}
