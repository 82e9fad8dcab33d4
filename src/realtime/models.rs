use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Frame sent by the realtime server: `{"type": "...", "data": ...}`.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub(crate) struct ErrorData {
    pub code: u16,
    pub message: String,
}

/// A change pushed to a subscribed channel.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct RealtimeEvent {
    /// Event names, most specific first, e.g.
    /// `databases.db1.collections.tasks.documents.doc1.create`.
    pub events: Vec<String>,
    pub channels: Vec<String>,
    /// Server time; Appwrite has sent both ISO strings and unix seconds here.
    pub timestamp: Value,
    /// The affected resource.
    pub payload: Map<String, Value>,
}

impl RealtimeEvent {
    pub fn first_event(&self) -> Option<&str> {
        self.events.first().map(String::as_str)
    }

    pub fn first_payload_key(&self) -> Option<&str> {
        self.payload.keys().next().map(String::as_str)
    }
}
