pub mod patterns;

use std::{
    fs, io,
    path::{Path, PathBuf},
};

pub use patterns::{PatternError, PatternHeader, PatternReader};

#[derive(Debug, thiserror::Error)]
#[error("failed to read {}: {source}", path.display())]
pub struct LoadError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Reads a whole input file into memory.
pub fn load_text(path: &Path) -> Result<Vec<u8>, LoadError> {
    fs::read(path).map_err(|source| LoadError {
        path: path.to_path_buf(),
        source,
    })
}

/// File name of an input path, used to label results.
pub fn text_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
