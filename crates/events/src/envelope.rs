use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tutoria_core::AccessRequestId;

use crate::Event;

/// Envelope for an event, containing stream metadata.
///
/// This is the unit a store appends to an access request's history.
///
/// - **Append-only**: `sequence_number` is monotonically increasing per stream,
///   starting at 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    event_id: Uuid,
    stream_id: AccessRequestId,
    event_type: String,

    /// Monotonically increasing position in the stream.
    sequence_number: u64,

    payload: E,
}

impl<E> EventEnvelope<E> {
    pub fn new(
        event_id: Uuid,
        stream_id: AccessRequestId,
        event_type: impl Into<String>,
        sequence_number: u64,
        payload: E,
    ) -> Self {
        Self {
            event_id,
            stream_id,
            event_type: event_type.into(),
            sequence_number,
            payload,
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn stream_id(&self) -> AccessRequestId {
        self.stream_id
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }
}

impl<E: Event> EventEnvelope<E> {
    /// Wrap a typed event, deriving the type name from the event itself.
    pub fn wrap(stream_id: AccessRequestId, sequence_number: u64, payload: E) -> Self {
        Self::new(
            Uuid::now_v7(),
            stream_id,
            payload.event_type(),
            sequence_number,
            payload,
        )
    }
}
