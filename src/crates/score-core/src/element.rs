use serde::{Deserialize, Serialize};

use crate::token::Token;

/// Instrument name used when a part has no resolvable name
pub const UNKNOWN_INSTRUMENT: &str = "Unknown";

/// One element of a parsed score, in document order.
///
/// Offsets and durations are in quarter lengths (a quarter note is 1.0) and
/// offsets are relative to the start of the piece.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoreElement {
    /// Switches the instrument for the elements that follow
    Instrument { name: Option<String> },
    /// A single pitch, e.g. `C4` or `F#5`
    Note { pitch: String, offset: f64 },
    /// Several pitches sounding together for one duration
    Chord {
        pitches: Vec<String>,
        duration: f64,
        offset: f64,
    },
}

impl ScoreElement {
    pub fn instrument(name: impl Into<String>) -> Self {
        ScoreElement::Instrument {
            name: Some(name.into()),
        }
    }

    pub fn note(pitch: impl Into<String>, offset: f64) -> Self {
        ScoreElement::Note {
            pitch: pitch.into(),
            offset,
        }
    }

    pub fn chord<S: Into<String>>(
        pitches: impl IntoIterator<Item = S>,
        duration: f64,
        offset: f64,
    ) -> Self {
        ScoreElement::Chord {
            pitches: pitches.into_iter().map(Into::into).collect(),
            duration,
            offset,
        }
    }
}

/// Resolve an optional instrument name, falling back to [`UNKNOWN_INSTRUMENT`]
pub fn resolve_instrument_name(name: Option<&str>) -> String {
    match name.map(str::trim) {
        Some(n) if !n.is_empty() => n.to_string(),
        _ => UNKNOWN_INSTRUMENT.to_string(),
    }
}

/// A token tagged with where it occurred and which instrument produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedEvent {
    pub token: Token,
    pub offset: f64,
    pub instrument: String,
}

impl AnnotatedEvent {
    pub fn new(token: Token, offset: f64, instrument: impl Into<String>) -> Self {
        AnnotatedEvent {
            token,
            offset,
            instrument: instrument.into(),
        }
    }
}
