use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::PipelineConfig;

/// List the input files directly inside `dir`, sorted by file name.
///
/// Only regular files with a recognized extension are returned; the sort
/// keeps the corpus order identical from run to run.
pub fn discover_files(dir: &Path, config: &PipelineConfig) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if entry.file_type()?.is_file() && config.accepts(&path) {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}
