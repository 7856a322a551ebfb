//! Persistence of per-instrument feature arrays and their inverse mappings.

pub mod manifest;
pub mod npy;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::pipeline::EncodedInstrument;

pub use manifest::{FailedFile, FailedInstrument, InstrumentEntry, Manifest, MANIFEST_FILE};

/// Prefix of the normalized value artifact
pub const VALUES_PREFIX: &str = "encoded_notes_";

/// Prefix of the inverse mapping artifact
pub const LABELS_PREFIX: &str = "label_encoder_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactFormat {
    /// NumPy `.npy` arrays
    Npy,
    /// JSON arrays
    Json,
}

impl ArtifactFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ArtifactFormat::Npy => "npy",
            ArtifactFormat::Json => "json",
        }
    }
}

/// Turn an instrument name into something safe to put in a file name
pub fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned
    }
}

/// Writes artifacts into one directory, keeping file names unique per run
#[derive(Debug)]
pub struct ArtifactWriter {
    dir: PathBuf,
    format: ArtifactFormat,
    used_stems: HashSet<String>,
}

impl ArtifactWriter {
    /// Create the output directory if needed
    pub fn new(dir: &Path, format: ArtifactFormat) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(ArtifactWriter {
            dir: dir.to_path_buf(),
            format,
            used_stems: HashSet::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Reserve a file stem for `instrument`, suffixing `_2`, `_3`, ... on collisions
    fn reserve_stem(&mut self, instrument: &str) -> String {
        let base = sanitize_name(instrument);
        let mut stem = base.clone();
        let mut n = 2;
        while !self.used_stems.insert(stem.clone()) {
            stem = format!("{}_{}", base, n);
            n += 1;
        }
        stem
    }

    /// Write the normalized values and the full inverse mapping of one instrument.
    ///
    /// On failure no artifact of the instrument is left behind.
    pub fn write_instrument(&mut self, encoded: &EncodedInstrument) -> io::Result<InstrumentEntry> {
        let stem = self.reserve_stem(&encoded.instrument);
        let ext = self.format.extension();
        let values_file = format!("{}{}.{}", VALUES_PREFIX, stem, ext);
        let labels_file = format!("{}{}.{}", LABELS_PREFIX, stem, ext);

        let labels: Vec<&str> = encoded.mapping.inverse().iter().map(|t| t.as_str()).collect();

        let values_path = self.dir.join(&values_file);
        write_values(&values_path, self.format, &encoded.values)?;
        if let Err(err) = write_labels(&self.dir.join(&labels_file), self.format, &labels) {
            // an instrument either has both artifacts or neither
            let _ = fs::remove_file(&values_path);
            return Err(err);
        }

        Ok(InstrumentEntry {
            instrument: encoded.instrument.clone(),
            events: encoded.values.len(),
            vocabulary_size: labels.len(),
            scaler: encoded.scaler,
            values_file,
            labels_file,
        })
    }

    pub fn write_manifest(&self, manifest: &Manifest) -> io::Result<PathBuf> {
        let path = self.dir.join(MANIFEST_FILE);
        let mut out = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut out, manifest)?;
        out.write_all(b"\n")?;
        out.flush()?;
        Ok(path)
    }
}

fn write_values(path: &Path, format: ArtifactFormat, values: &[f64]) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    match format {
        ArtifactFormat::Npy => npy::write_f64_array(&mut out, values)?,
        ArtifactFormat::Json => serde_json::to_writer(&mut out, values)?,
    }
    out.flush()
}

fn write_labels(path: &Path, format: ArtifactFormat, labels: &[&str]) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    match format {
        ArtifactFormat::Npy => npy::write_str_array(&mut out, labels)?,
        ArtifactFormat::Json => serde_json::to_writer_pretty(&mut out, labels)?,
    }
    out.flush()
}

/// Read a normalized value artifact
pub fn read_values(path: &Path, format: ArtifactFormat) -> io::Result<Vec<f64>> {
    let bytes = fs::read(path)?;
    match format {
        ArtifactFormat::Npy => npy::read_f64_array(&bytes),
        ArtifactFormat::Json => Ok(serde_json::from_slice(&bytes)?),
    }
}

/// Read an inverse mapping artifact, ordered by code
pub fn read_labels(path: &Path, format: ArtifactFormat) -> io::Result<Vec<String>> {
    let bytes = fs::read(path)?;
    match format {
        ArtifactFormat::Npy => npy::read_str_array(&bytes),
        ArtifactFormat::Json => Ok(serde_json::from_slice(&bytes)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("Piano"), "Piano");
        assert_eq!(sanitize_name("Acoustic Guitar"), "Acoustic_Guitar");
        assert_eq!(sanitize_name("Lead/Rhythm"), "Lead_Rhythm");
        assert_eq!(sanitize_name("Honky-Tonk Piano"), "Honky-Tonk_Piano");
        assert_eq!(sanitize_name("   "), "_");
    }

    #[test]
    fn test_reserve_stem_disambiguates() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = ArtifactWriter::new(dir.path(), ArtifactFormat::Json).unwrap();
        assert_eq!(writer.reserve_stem("Lead/Rhythm"), "Lead_Rhythm");
        assert_eq!(writer.reserve_stem("Lead Rhythm"), "Lead_Rhythm_2");
        assert_eq!(writer.reserve_stem("Lead_Rhythm"), "Lead_Rhythm_3");
        assert_eq!(writer.reserve_stem("Piano"), "Piano");
    }

    #[test]
    fn test_writer_creates_nested_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("out").join("features");
        let writer = ArtifactWriter::new(&nested, ArtifactFormat::Npy).unwrap();
        assert!(writer.dir().is_dir());
    }

    fn encoded(instrument: &str, tokens: &[&str]) -> EncodedInstrument {
        let timed: Vec<_> = tokens
            .iter()
            .enumerate()
            .map(|(i, t)| (score_core::Token::new(*t), i as f64))
            .collect();
        crate::pipeline::encode_instrument(instrument, &timed, score_core::FeatureRange::default())
            .unwrap()
    }

    #[test]
    fn test_write_instrument() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = ArtifactWriter::new(dir.path(), ArtifactFormat::Npy).unwrap();
        let entry = writer.write_instrument(&encoded("Piano", &["C4", "E4", "C4"])).unwrap();

        assert_eq!(entry.events, 3);
        assert_eq!(entry.vocabulary_size, 2);
        assert_eq!(
            read_values(&dir.path().join(&entry.values_file), ArtifactFormat::Npy).unwrap(),
            vec![0.0, 1.0, 0.0]
        );
        assert_eq!(
            read_labels(&dir.path().join(&entry.labels_file), ArtifactFormat::Npy).unwrap(),
            vec!["C4", "E4"]
        );
    }

    #[test]
    fn test_failed_labels_remove_values() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("label_encoder_Harp.json")).unwrap();

        let mut writer = ArtifactWriter::new(dir.path(), ArtifactFormat::Json).unwrap();
        assert!(writer.write_instrument(&encoded("Harp", &["G3"])).is_err());
        assert!(!dir.path().join("encoded_notes_Harp.json").exists());

        let entry = writer.write_instrument(&encoded("Violin", &["E5"])).unwrap();
        assert!(dir.path().join(&entry.values_file).is_file());
        assert!(dir.path().join(&entry.labels_file).is_file());
    }

    #[test]
    fn test_json_artifacts_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let values_path = dir.path().join("values.json");
        let labels_path = dir.path().join("labels.json");

        write_values(&values_path, ArtifactFormat::Json, &[0.0, 0.5, 1.0]).unwrap();
        write_labels(&labels_path, ArtifactFormat::Json, &["C4", "E4", "G4"]).unwrap();

        assert_eq!(
            read_values(&values_path, ArtifactFormat::Json).unwrap(),
            vec![0.0, 0.5, 1.0]
        );
        assert_eq!(
            read_labels(&labels_path, ArtifactFormat::Json).unwrap(),
            vec!["C4", "E4", "G4"]
        );
    }
}
