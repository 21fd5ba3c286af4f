use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure taxonomy for a single build run.
///
/// Each pipeline stage reports through exactly one of these variants, and all
/// of them are terminal for the stage that raised them.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A module listed by the profile could not be resolved under the source
    /// root.
    #[error("module not found: {reference}")]
    NotFound { reference: String },

    /// The remote minification service did not return compacted text.
    #[error("minification service failure: {detail}")]
    Service { detail: String },

    /// An artifact could not be persisted at its destination.
    #[error("failed to write artifact {}: {source}", .destination.display())]
    Write {
        destination: PathBuf,
        #[source]
        source: io::Error,
    },
}
