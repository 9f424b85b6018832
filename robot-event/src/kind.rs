//! Event kind: the `type` discriminator of an inbound frame.

use std::fmt;

/// Classification of one inbound stream message.
///
/// The wire value is compared case-insensitively; anything outside the
/// recognized set (including an absent `type` field) is [`EventKind::Unknown`].
/// Unknown frames still decode into a valid [`crate::Envelope`] so callers can
/// observe and log them, but they match no dispatch entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Status,
    TaskUpdate,
    TaskCompleted,
    TaskFailed,
    Error,
    Heartbeat,
    Unknown,
}

impl EventKind {
    /// All kinds a subscriber can usefully register for.
    pub const RECOGNIZED: [EventKind; 6] = [
        EventKind::Status,
        EventKind::TaskUpdate,
        EventKind::TaskCompleted,
        EventKind::TaskFailed,
        EventKind::Error,
        EventKind::Heartbeat,
    ];

    /// Parses a wire discriminator, case-insensitively. Allocation-free:
    /// this runs once per received frame.
    pub fn parse(raw: &str) -> Self {
        for kind in Self::RECOGNIZED {
            if raw.eq_ignore_ascii_case(kind.as_str()) {
                return kind;
            }
        }
        EventKind::Unknown
    }

    /// Canonical lowercase name as sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Status => "status",
            EventKind::TaskUpdate => "task_update",
            EventKind::TaskCompleted => "task_completed",
            EventKind::TaskFailed => "task_failed",
            EventKind::Error => "error",
            EventKind::Heartbeat => "heartbeat",
            EventKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
