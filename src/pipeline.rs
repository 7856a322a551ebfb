//! Corpus pipeline: discover files, extract tokens, group by instrument,
//! encode and normalize each group, then persist the artifacts.

use log::{debug, info, warn};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

use score_core::{
    encode, extract_tokens, CodeMapping, Extraction, FeatureError, FeatureRange, Grouping,
    InstrumentGrouper, MinMaxScaler, TimedToken,
};
use score_midi::read_score;

use crate::artifacts::{ArtifactWriter, FailedFile, FailedInstrument, InstrumentEntry, Manifest};
use crate::config::PipelineConfig;
use crate::discovery::discover_files;
use crate::error::CorpusError;

/// Extraction result for one input file
#[derive(Debug)]
pub struct FileExtraction {
    pub path: PathBuf,
    pub outcome: Result<Extraction, CorpusError>,
}

/// Codes, normalized values and fitted parameters for one instrument
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedInstrument {
    pub instrument: String,
    pub codes: Vec<u32>,
    pub values: Vec<f64>,
    pub mapping: CodeMapping,
    pub scaler: MinMaxScaler,
}

/// Encode one instrument's tokens and rescale the codes into `range`
pub fn encode_instrument(
    instrument: &str,
    events: &[TimedToken],
    range: FeatureRange,
) -> Result<EncodedInstrument, FeatureError> {
    let encoded = encode(events.iter().map(|(token, _)| token)).map_err(|e| match e {
        FeatureError::EmptyGroup(_) => FeatureError::EmptyGroup(instrument.to_string()),
        other => other,
    })?;

    debug!(
        "{}: {} unique tokens, {} codes",
        instrument,
        encoded.mapping.len(),
        encoded.codes.len()
    );

    let (scaler, values) = MinMaxScaler::fit_codes(&encoded.codes, range)?;

    Ok(EncodedInstrument {
        instrument: instrument.to_string(),
        codes: encoded.codes,
        values,
        mapping: encoded.mapping,
        scaler,
    })
}

/// Merge per-file extractions, in order, into one instrument grouping
pub fn group_extractions<I>(extractions: I) -> Grouping
where
    I: IntoIterator<Item = Extraction>,
{
    let mut grouper = InstrumentGrouper::new();
    for extraction in extractions {
        for name in &extraction.instruments {
            grouper.declare(name);
        }
        grouper.extend(extraction.events);
    }
    grouper.finish()
}

pub struct CorpusPipeline {
    config: PipelineConfig,
    range: FeatureRange,
}

impl CorpusPipeline {
    pub fn new(config: PipelineConfig) -> Result<Self, CorpusError> {
        config.validate()?;
        let range = config.feature_range()?;
        Ok(CorpusPipeline { config, range })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Read one file and extract its tokens
    pub fn extract_file(&self, path: &Path) -> Result<Extraction, CorpusError> {
        let score = read_score(path, &self.config.reader_options()).map_err(|source| {
            CorpusError::FileParse {
                path: path.to_path_buf(),
                source,
            }
        })?;

        debug!(
            "{}: {} parts, {} notes",
            path.display(),
            score.part_count,
            score.note_count
        );

        Ok(extract_tokens(score.elements))
    }

    /// Extract every file, returning outcomes in the order of `files`
    pub fn extract_all(&self, files: &[PathBuf]) -> Vec<FileExtraction> {
        let extract = |path: &PathBuf| FileExtraction {
            path: path.clone(),
            outcome: self.extract_file(path),
        };

        if self.config.parallel {
            files.par_iter().map(extract).collect()
        } else {
            files.iter().map(extract).collect()
        }
    }

    /// Run the whole pipeline and return the manifest that was written.
    ///
    /// Unparsable files and failing instruments are recorded in the manifest
    /// and skipped. Only an unreadable input directory or an unwritable
    /// output directory fails the run.
    pub fn run(&self) -> Result<Manifest, CorpusError> {
        let input_dir = &self.config.input_dir;
        let files = discover_files(input_dir, &self.config).map_err(|source| {
            CorpusError::InputDir {
                path: input_dir.clone(),
                source,
            }
        })?;
        info!("Found {} input files in {}", files.len(), input_dir.display());

        let mut manifest = Manifest::new(self.config.format, self.range);
        manifest.files_found = files.len();

        let mut extractions = Vec::with_capacity(files.len());
        for file in self.extract_all(&files) {
            match file.outcome {
                Ok(extraction) => {
                    manifest.skipped_elements += extraction.skipped.len();
                    extractions.push(extraction);
                }
                Err(err) => {
                    warn!("Skipping file: {}", err);
                    manifest.failed_files.push(FailedFile {
                        path: file.path.display().to_string(),
                        error: err.to_string(),
                    });
                }
            }
        }

        let grouping = group_extractions(extractions);
        info!(
            "Collected {} events across {} instruments",
            grouping.groups.event_count(),
            grouping.groups.len()
        );
        manifest.omitted_instruments = grouping.omitted;

        let output_dir = self.config.output_dir();
        let mut writer = ArtifactWriter::new(output_dir, self.config.format).map_err(|source| {
            CorpusError::Write {
                path: output_dir.to_path_buf(),
                source,
            }
        })?;

        for (instrument, events) in grouping.groups {
            info!("Processing instrument: {} ({} events)", instrument, events.len());
            match self.encode_and_write(&mut writer, &instrument, &events) {
                Ok(entry) => manifest.instruments.push(entry),
                Err(err) => {
                    warn!("Skipping instrument {}: {}", instrument, err);
                    manifest.failed_instruments.push(FailedInstrument {
                        instrument,
                        error: err.to_string(),
                    });
                }
            }
        }

        let manifest_path = writer.write_manifest(&manifest).map_err(|source| {
            CorpusError::Write {
                path: output_dir.to_path_buf(),
                source,
            }
        })?;
        info!(
            "Wrote artifacts for {} instruments, manifest at {}",
            manifest.instruments.len(),
            manifest_path.display()
        );

        Ok(manifest)
    }

    fn encode_and_write(
        &self,
        writer: &mut ArtifactWriter,
        instrument: &str,
        events: &[TimedToken],
    ) -> Result<InstrumentEntry, CorpusError> {
        let encoded = encode_instrument(instrument, events, self.range).map_err(|source| {
            CorpusError::Instrument {
                instrument: instrument.to_string(),
                source,
            }
        })?;

        writer
            .write_instrument(&encoded)
            .map_err(|source| CorpusError::Write {
                path: writer.dir().to_path_buf(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use score_core::{ScoreElement, Token};

    fn timed(tokens: &[&str]) -> Vec<TimedToken> {
        tokens
            .iter()
            .enumerate()
            .map(|(i, t)| (Token::new(*t), i as f64))
            .collect()
    }

    #[test]
    fn test_encode_instrument() {
        let encoded =
            encode_instrument("Piano", &timed(&["A", "B"]), FeatureRange::default()).unwrap();
        assert_eq!(encoded.codes, vec![0, 1]);
        assert_eq!(encoded.values, vec![0.0, 1.0]);
        assert_eq!(encoded.mapping.decode(0).unwrap().as_str(), "A");
        assert_eq!(encoded.mapping.decode(1).unwrap().as_str(), "B");
    }

    #[test]
    fn test_encode_single_token_instrument() {
        let encoded = encode_instrument("Harp", &timed(&["C4", "C4", "C4"]), FeatureRange::default())
            .unwrap();
        assert_eq!(encoded.codes, vec![0, 0, 0]);
        assert_eq!(encoded.values, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_empty_instrument_names_the_group() {
        let result = encode_instrument("Harp", &[], FeatureRange::default());
        assert_eq!(result, Err(FeatureError::EmptyGroup("Harp".to_string())));
    }

    #[test]
    fn test_malformed_elements_are_skipped_and_empty_instruments_omitted() {
        let extraction = extract_tokens(vec![
            ScoreElement::instrument("Piano"),
            ScoreElement::note("C4", 0.0),
            ScoreElement::chord(["E4", "G4"], f64::NAN, 1.0),
            ScoreElement::note("E 4", 2.0),
            ScoreElement::note("D4", 3.0),
            ScoreElement::instrument("Harp"),
            ScoreElement::Chord {
                pitches: Vec::new(),
                duration: 1.0,
                offset: 0.0,
            },
        ]);
        assert_eq!(extraction.skipped.len(), 3);
        assert_eq!(extraction.skipped[2].instrument, "Harp");

        let grouping = group_extractions(vec![extraction]);
        assert_eq!(grouping.omitted, vec!["Harp"]);
        assert!(!grouping.groups.contains("Harp"));

        let piano: Vec<&str> = grouping
            .groups
            .get("Piano")
            .unwrap()
            .iter()
            .map(|(token, _)| token.as_str())
            .collect();
        assert_eq!(piano, vec!["C4", "D4"]);
    }

    #[test]
    fn test_group_extractions_across_files() {
        let first = extract_tokens(vec![
            ScoreElement::instrument("Piano"),
            ScoreElement::chord(["C4", "E4", "G4"], 1.0, 0.0),
            ScoreElement::instrument("Harp"),
        ]);
        let second = extract_tokens(vec![
            ScoreElement::instrument("Violin"),
            ScoreElement::note("A4", 0.0),
            ScoreElement::instrument("Piano"),
            ScoreElement::note("C4", 0.0),
            ScoreElement::chord(["C4", "E4", "G4"], 1.0, 2.0),
        ]);

        let grouping = group_extractions(vec![first, second]);
        let order: Vec<&str> = grouping.groups.instruments().collect();
        assert_eq!(order, vec!["Piano", "Violin"]);
        assert_eq!(grouping.omitted, vec!["Harp"]);

        let piano = grouping.groups.get("Piano").unwrap();
        let encoded = encode_instrument("Piano", piano, FeatureRange::default()).unwrap();
        // the same chord in two files is one token
        assert_eq!(encoded.codes, vec![0, 1, 0]);
        assert_eq!(encoded.mapping.len(), 2);
    }
}
