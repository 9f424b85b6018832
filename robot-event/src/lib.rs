//! Robot stream protocol: envelope wire shape and event kinds.
//!
//! This crate defines the decoded form of one inbound text frame from the
//! controller's stream endpoint. It does not depend on any transport;
//! `robot-stream` decodes frames through [`Envelope::decode`] and routes
//! them by [`EventKind`].

pub mod envelope;
pub mod kind;

pub use envelope::{DecodeError, Envelope, Position};
pub use kind::EventKind;
