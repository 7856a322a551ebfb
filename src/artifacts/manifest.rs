use serde::{Deserialize, Serialize};
use std::path::Path;

use score_core::{FeatureRange, MinMaxScaler};

use super::ArtifactFormat;

/// File name of the run manifest inside the output directory
pub const MANIFEST_FILE: &str = "manifest.json";

/// Summary of one pipeline run, written next to the artifacts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub format: ArtifactFormat,
    pub feature_range: FeatureRange,
    /// Input files found in the input directory
    pub files_found: usize,
    pub failed_files: Vec<FailedFile>,
    pub skipped_elements: usize,
    /// Instruments that were declared but produced no events
    pub omitted_instruments: Vec<String>,
    pub failed_instruments: Vec<FailedInstrument>,
    pub instruments: Vec<InstrumentEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedFile {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedInstrument {
    pub instrument: String,
    pub error: String,
}

/// Artifacts and fitted parameters for one instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentEntry {
    pub instrument: String,
    pub events: usize,
    pub vocabulary_size: usize,
    pub scaler: MinMaxScaler,
    /// Normalized values, one per event
    pub values_file: String,
    /// Tokens ordered by code
    pub labels_file: String,
}

impl Manifest {
    pub fn new(format: ArtifactFormat, feature_range: FeatureRange) -> Self {
        Manifest {
            format,
            feature_range,
            files_found: 0,
            failed_files: Vec::new(),
            skipped_elements: 0,
            omitted_instruments: Vec::new(),
            failed_instruments: Vec::new(),
            instruments: Vec::new(),
        }
    }

    pub fn load(dir: &Path) -> std::io::Result<Self> {
        let content = std::fs::read(dir.join(MANIFEST_FILE))?;
        serde_json::from_slice(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    pub fn instrument(&self, name: &str) -> Option<&InstrumentEntry> {
        self.instruments.iter().find(|entry| entry.instrument == name)
    }
}
