//! Map normalized values (e.g. model output) back to symbolic tokens using
//! the artifacts of a previous run.

use std::path::Path;

use score_core::{CodeMapping, MinMaxScaler, Token};

use crate::artifacts::{read_labels, Manifest, MANIFEST_FILE};
use crate::error::DecodeError;

/// The persisted inverse mapping and scaler of one instrument
#[derive(Debug, Clone)]
pub struct InstrumentDecoder {
    pub instrument: String,
    pub mapping: CodeMapping,
    pub scaler: MinMaxScaler,
}

impl InstrumentDecoder {
    /// Load the decoder for `instrument` from an artifact directory
    pub fn load(dir: &Path, instrument: &str) -> Result<Self, DecodeError> {
        let manifest = Manifest::load(dir).map_err(|source| DecodeError::Load {
            path: dir.join(MANIFEST_FILE),
            source,
        })?;
        let entry = manifest
            .instrument(instrument)
            .ok_or_else(|| DecodeError::UnknownInstrument(instrument.to_string()))?;

        let labels_path = dir.join(&entry.labels_file);
        let labels = read_labels(&labels_path, manifest.format).map_err(|source| {
            DecodeError::Load {
                path: labels_path.clone(),
                source,
            }
        })?;
        let mapping = CodeMapping::from_inverse(labels.into_iter().map(Token::from))?;

        Ok(InstrumentDecoder {
            instrument: entry.instrument.clone(),
            mapping,
            scaler: entry.scaler,
        })
    }

    /// Token for a single normalized value
    pub fn decode_value(&self, value: f64) -> Result<&Token, DecodeError> {
        let code = self
            .scaler
            .inverse_code(value)
            .ok_or(DecodeError::OutOfRange(value))?;
        Ok(self.mapping.decode(code)?)
    }

    pub fn decode_values(&self, values: &[f64]) -> Result<Vec<&Token>, DecodeError> {
        values.iter().map(|&v| self.decode_value(v)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use score_core::{FeatureError, FeatureRange};

    fn decoder(tokens: &[&str]) -> InstrumentDecoder {
        let codes: Vec<u32> = (0..tokens.len() as u32).collect();
        let (scaler, _) = MinMaxScaler::fit_codes(&codes, FeatureRange::default()).unwrap();
        InstrumentDecoder {
            instrument: "Piano".to_string(),
            mapping: CodeMapping::from_inverse(tokens.iter().map(|t| Token::new(*t))).unwrap(),
            scaler,
        }
    }

    #[test]
    fn test_decode_values() {
        let decoder = decoder(&["C4", "E4", "C4.E4.G4;1.0"]);
        let tokens: Vec<&str> = decoder
            .decode_values(&[0.0, 1.0, 0.5, 0.49])
            .unwrap()
            .into_iter()
            .map(|t| t.as_str())
            .collect();
        assert_eq!(tokens, vec!["C4", "C4.E4.G4;1.0", "E4", "E4"]);
    }

    #[test]
    fn test_values_outside_the_table() {
        let decoder = decoder(&["C4", "E4"]);
        assert!(matches!(
            decoder.decode_value(-0.9),
            Err(DecodeError::OutOfRange(_))
        ));
        assert!(matches!(
            decoder.decode_value(3.0),
            Err(DecodeError::Feature(FeatureError::UnknownCode { code: 3, len: 2 }))
        ));
    }

    #[test]
    fn test_missing_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            InstrumentDecoder::load(dir.path(), "Piano"),
            Err(DecodeError::Load { .. })
        ));
    }
}
