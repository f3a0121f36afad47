//! Domain events emitted by portal aggregates and the envelopes they are
//! recorded in.

pub mod envelope;
pub mod event;

pub use envelope::EventEnvelope;
pub use event::Event;
