//! Real-time event stream client for the robot controller.
//!
//! [`StreamClient`] owns one persistent WebSocket session: it connects to the
//! controller's stream endpoint, runs a single receive loop that decodes each
//! text frame into a [`robot_event::Envelope`], and dispatches it to every
//! subscriber registered for the frame's [`robot_event::EventKind`].
//!
//! The command layer and CLI sit on top of this crate; they register
//! subscribers and drive `connect`/`disconnect`. There is no automatic
//! reconnect: after a transport fault the client settles in `Disconnected`
//! and the caller decides whether to call [`StreamClient::connect`] again.

pub mod client;
pub mod registry;

pub use client::{ConnectionState, StreamClient, StreamError};
pub use registry::{Handler, LifecycleHandler, SubscriptionId, SubscriptionRegistry};
