use std::fs;
use std::path::PathBuf;

use log::debug;

use crate::error::BuildError;

/// A module reference resolved to its source text.
#[derive(Debug, Clone)]
pub struct LoadedModule {
    /// Path-like name the profile listed the module under.
    pub reference: String,
    /// Raw module text, read once per build.
    pub source: String,
}

/// Resolves an ordered list of module references to source text under a
/// single lookup root.
#[derive(Debug)]
pub struct ModuleLoader {
    root: PathBuf,
}

impl ModuleLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Load every reference, preserving the caller's order.
    ///
    /// The first unresolvable reference aborts the whole load; callers never
    /// observe a partial module list.
    pub fn load(&self, references: &[String]) -> Result<Vec<LoadedModule>, BuildError> {
        let mut modules = Vec::with_capacity(references.len());
        for reference in references {
            let path = self.root.join(reference);
            debug!("Resolving module '{}' at {:?}", reference, path);
            let source = fs::read_to_string(&path).map_err(|err| {
                debug!("Failed to read {:?}: {}", path, err);
                BuildError::NotFound {
                    reference: reference.clone(),
                }
            })?;
            modules.push(LoadedModule {
                reference: reference.clone(),
                source,
            });
        }
        Ok(modules)
    }
}
