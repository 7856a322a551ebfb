use std::io;
use std::path::PathBuf;

use score_core::FeatureError;
use score_midi::ReadError;

/// Problems with the run configuration; always fatal
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no input file extensions configured")]
    NoExtensions,

    #[error(transparent)]
    Range(#[from] FeatureError),
}

/// Errors raised while running the corpus pipeline.
///
/// `FileParse` and `Instrument` are recovered inside the run and only show up
/// in its manifest; the rest abort the run.
#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to list input directory {}: {source}", path.display())]
    InputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not parse {}: {source}", path.display())]
    FileParse {
        path: PathBuf,
        #[source]
        source: ReadError,
    },

    #[error("instrument {instrument}: {source}")]
    Instrument {
        instrument: String,
        #[source]
        source: FeatureError,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Errors raised while mapping normalized values back to tokens
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("failed to load {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no artifacts for instrument '{0}'")]
    UnknownInstrument(String),

    #[error("value {0} does not map to a code")]
    OutOfRange(f64),

    #[error(transparent)]
    Feature(#[from] FeatureError),
}
