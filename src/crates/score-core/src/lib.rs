//! Core types for turning symbolic music scores into model features
//!
//! This crate walks parsed scores, derives a canonical token for every note
//! and chord, groups tokens by instrument and encodes each instrument's
//! stream as integer codes and normalized values.
//!
//! # Examples
//!
//! ```
//! use score_core::{encode, extract_tokens, group_by_instrument, FeatureRange, MinMaxScaler, ScoreElement};
//!
//! let extraction = extract_tokens(vec![
//!     ScoreElement::instrument("Piano"),
//!     ScoreElement::note("C4", 0.0),
//!     ScoreElement::chord(["C4", "E4", "G4"], 1.0, 1.0),
//! ]);
//! let groups = group_by_instrument(extraction.events);
//! let piano = groups.get("Piano").unwrap();
//!
//! let encoded = encode(piano.iter().map(|(token, _)| token)).unwrap();
//! assert_eq!(encoded.codes, vec![0, 1]);
//!
//! let (_, scaled) = MinMaxScaler::fit_codes(&encoded.codes, FeatureRange::default()).unwrap();
//! assert_eq!(scaled, vec![0.0, 1.0]);
//! ```
//!
//! # Main Components
//!
//! - **ScoreElement**: instrument markers, notes and chords in document order
//! - **Token**: canonical string identity of a note or chord
//! - **extract_tokens**: score traversal producing annotated tokens
//! - **InstrumentGrouper**: per-instrument partition of a corpus
//! - **CodeMapping**: first-seen token/code bijection
//! - **MinMaxScaler**: rescaling of codes into a feature range

pub mod element;
pub mod encoder;
pub mod error;
pub mod extract;
pub mod group;
pub mod scaler;
pub mod token;

pub use element::{resolve_instrument_name, AnnotatedEvent, ScoreElement, UNKNOWN_INSTRUMENT};
pub use encoder::{encode, CodeMapping, Encoded};
pub use error::{ElementError, FeatureError, Result};
pub use extract::{extract_tokens, Extraction, TraversalState};
pub use group::{group_by_instrument, Grouping, InstrumentGrouper, InstrumentGroups, TimedToken};
pub use scaler::{FeatureRange, MinMaxScaler};
pub use token::{format_quarter_length, Token, TokenError};
