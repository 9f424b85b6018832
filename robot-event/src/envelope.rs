//! Envelope: one decoded inbound frame (type discriminator + sparse fields).
//!
//! Every field other than the discriminator is optional and decoding is
//! schema-tolerant: unknown wire fields are ignored, missing fields stay
//! `None`. Absence is meaningful: a missing boolean flag is *not* `false`,
//! so nothing here defaults to a zero value.

use serde::Deserialize;
use thiserror::Error;

use crate::kind::EventKind;

/// A frame that did not parse into a valid envelope. The frame is dropped;
/// decode failures never yield a partial envelope.
#[derive(Debug, Error)]
#[error("invalid envelope frame: {0}")]
pub struct DecodeError(#[from] serde_json::Error);

/// Gantry position, raw axis units and/or millimeter-scaled.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Position {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub x_mm: Option<f64>,
    pub y_mm: Option<f64>,
    pub z_mm: Option<f64>,
}

impl Position {
    /// X in millimeters, preferring the pre-scaled field when present.
    pub fn x_millimeters(&self) -> Option<f64> {
        self.x_mm.or(self.x)
    }

    pub fn y_millimeters(&self) -> Option<f64> {
        self.y_mm.or(self.y)
    }

    pub fn z_millimeters(&self) -> Option<f64> {
        self.z_mm.or(self.z)
    }
}

/// One decoded inbound stream message. Immutable once constructed.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Envelope {
    /// Raw `type` discriminator as received; see [`Envelope::kind`].
    #[serde(rename = "type")]
    pub message_type: Option<String>,

    pub position: Option<Position>,

    pub hardware_initialized: Option<bool>,
    pub homed: Option<bool>,
    pub emergency_stopped: Option<bool>,
    pub worker_enabled: Option<bool>,
    pub vacuum_enabled: Option<bool>,

    pub task_id: Option<String>,
    pub status: Option<String>,
    pub progress: Option<i64>,
    pub message: Option<String>,
    pub result: Option<String>,
    pub error: Option<String>,
    pub details: Option<String>,

    pub severity: Option<String>,
    pub code: Option<String>,

    /// Seconds since epoch.
    pub timestamp: Option<i64>,
}

impl Envelope {
    /// Decodes one raw text frame.
    pub fn decode(text: &str) -> Result<Envelope, DecodeError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Classifies the frame by its discriminator (absent → `Unknown`).
    pub fn kind(&self) -> EventKind {
        self.message_type
            .as_deref()
            .map(EventKind::parse)
            .unwrap_or(EventKind::Unknown)
    }
}
