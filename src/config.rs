use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use score_core::FeatureRange;
use score_midi::{ReaderOptions, DEFAULT_QUANTIZE_DIVISIONS};

use crate::artifacts::ArtifactFormat;
use crate::error::ConfigError;

/// Settings for one pipeline run.
///
/// Can be loaded from a JSON file; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory scanned for input files
    pub input_dir: PathBuf,
    /// Where artifacts go (default: the input directory)
    pub output_dir: Option<PathBuf>,
    /// Recognized file extensions, compared case-insensitively
    pub extensions: Vec<String>,
    pub range_min: f64,
    pub range_max: f64,
    pub format: ArtifactFormat,
    /// Quantization grid in divisions per quarter note, 0 to disable
    pub quantize_divisions: u32,
    /// Extract files on the rayon thread pool
    pub parallel: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            input_dir: PathBuf::from("."),
            output_dir: None,
            extensions: vec!["mid".to_string(), "midi".to_string()],
            range_min: 0.0,
            range_max: 1.0,
            format: ArtifactFormat::Npy,
            quantize_divisions: DEFAULT_QUANTIZE_DIVISIONS,
            parallel: false,
        }
    }
}

impl PipelineConfig {
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        PipelineConfig {
            input_dir: input_dir.into(),
            ..Self::default()
        }
    }

    /// Load a JSON config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.extensions.iter().all(|e| e.trim().is_empty()) {
            return Err(ConfigError::NoExtensions);
        }
        self.feature_range()?;
        Ok(())
    }

    pub fn feature_range(&self) -> Result<FeatureRange, ConfigError> {
        Ok(FeatureRange::new(self.range_min, self.range_max)?)
    }

    pub fn output_dir(&self) -> &Path {
        self.output_dir.as_deref().unwrap_or(&self.input_dir)
    }

    pub fn reader_options(&self) -> ReaderOptions {
        ReaderOptions {
            quantize_divisions: self.quantize_divisions,
        }
    }

    /// Whether `path` carries one of the recognized extensions
    pub fn accepts(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        self.extensions
            .iter()
            .map(|e| e.trim().trim_start_matches('.'))
            .any(|e| !e.is_empty() && e.eq_ignore_ascii_case(ext))
    }
}
