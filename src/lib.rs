//! Corpus pipeline turning directories of MIDI files into per-instrument
//! feature arrays for model training.
//!
//! The heavy lifting lives in two workspace crates: `score-midi` reads files
//! into score elements and `score-core` tokenizes, groups and encodes them.
//! This crate wires them together, persists the results and can map model
//! output back to tokens.

pub mod artifacts;
pub mod config;
pub mod decode;
pub mod discovery;
pub mod error;
pub mod pipeline;


pub use artifacts::{ArtifactFormat, ArtifactWriter, InstrumentEntry, Manifest};
pub use config::PipelineConfig;
pub use decode::InstrumentDecoder;
pub use discovery::discover_files;
pub use error::{ConfigError, CorpusError, DecodeError};
pub use pipeline::{encode_instrument, group_extractions, CorpusPipeline, EncodedInstrument};
