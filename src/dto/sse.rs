use serde::Serialize;
use utoipa::ToSchema;

use crate::dto::assignments::AssignmentsSnapshot;

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    pub event: Option<String>,
    pub data: String,
}

impl ServerEvent {
    /// Build an event from an already serialised data field.
    pub fn new(event: Option<String>, data: String) -> Self {
        Self { event, data }
    }

    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Initial metadata sent to an SSE client when it connects.
pub struct Handshake {
    /// Tournament the stream is scoped to.
    pub tournament_id: String,
    /// Identifier of this connection, useful when correlating logs.
    pub connection_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when every slot of a ring has been emptied.
pub struct RingClearedEvent {
    pub ring_number: u32,
    pub assignments: AssignmentsSnapshot,
}
