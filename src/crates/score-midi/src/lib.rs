//! Standard MIDI File reader for score-features
//!
//! Parses SMF data with `midly` and flattens it into the score elements the
//! token extractor consumes: one instrument marker per part followed by that
//! part's notes and chords in onset order.

pub mod instruments;
pub mod midi;
pub mod note;

pub use midi::{parse_score, read_score, ReadError, ReaderOptions, Score, DEFAULT_QUANTIZE_DIVISIONS};
pub use note::key_to_pitch;
