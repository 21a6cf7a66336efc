use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use teloxide::types::MessageId;

/// One entry of a shipment's tracking history as returned by the Correos API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub event_date: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub event_time: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub summary_text: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub extended_text: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub phase: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub des_phase: String,
}

impl Event {
    /// Two events describe the same moment when date and time match, whatever
    /// the rest of the payload says.
    pub fn same_moment(&self, other: &Self) -> bool {
        self.event_date == other.event_date && self.event_time == other.event_time
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Top-level body of a Correos search-engine response.
#[derive(Debug, Default, Deserialize)]
pub struct ShipmentResponse {
    #[serde(default)]
    pub shipment: Option<Vec<Shipment>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Shipment {
    #[serde(default)]
    pub events: Option<Vec<Event>>,
}

impl ShipmentResponse {
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }

    /// Events of the first shipment record, oldest first. Empty when the
    /// carrier knows nothing about the number.
    pub fn into_events(self) -> Vec<Event> {
        self.shipment
            .and_then(|records| records.into_iter().next())
            .and_then(|record| record.events)
            .unwrap_or_default()
    }
}

/// On-disk state: tracked numbers plus the last event seen for each.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TrackingData {
    #[serde(default)]
    pub numbers: BTreeSet<String>,
    #[serde(default)]
    pub shipments: BTreeMap<String, Event>,
}

/// An inbound Telegram update reduced to what the router needs.
#[derive(Debug, Clone)]
pub struct InboundUpdate {
    pub id: u32,
    pub chat_id: i64,
    pub kind: InboundKind,
}

#[derive(Debug, Clone)]
pub enum InboundKind {
    Text(String),
    Callback {
        callback_id: String,
        data: String,
        message_id: Option<MessageId>,
    },
    /// Anything else (stickers, edits, member changes). Only advances the cursor.
    Other,
}
