use std::fs;
use std::path::PathBuf;

use log::debug;

use crate::error::BuildError;

/// Persists named artifacts under a destination root.
#[derive(Debug)]
pub struct ArtifactWriter {
    dist: PathBuf,
}

impl ArtifactWriter {
    pub fn new(dist: impl Into<PathBuf>) -> Self {
        Self { dist: dist.into() }
    }

    /// Write one artifact, overwriting any prior build's output at the same
    /// destination. Missing parent directories are created.
    ///
    /// Returns the full destination path on success.
    pub fn write(&self, name: &str, contents: &str) -> Result<PathBuf, BuildError> {
        let destination = self.dist.join(name);
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(|source| BuildError::Write {
                destination: destination.clone(),
                source,
            })?;
        }
        fs::write(&destination, contents).map_err(|source| BuildError::Write {
            destination: destination.clone(),
            source,
        })?;
        debug!("Wrote {} bytes to {:?}", contents.len(), destination);
        Ok(destination)
    }
}

/// Derive the minified twin's artifact name: `lib.dev.js` becomes
/// `lib.dev.min.js`; names without an extension get a `.min` suffix.
pub fn minified_name(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, extension)) => format!("{stem}.min.{extension}"),
        None => format!("{name}.min"),
    }
}
