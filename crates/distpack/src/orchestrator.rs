use std::fmt;
use std::path::PathBuf;

use anyhow::{Result, anyhow};
use log::{debug, info, warn};

use crate::assembler::assemble;
use crate::config::{Config, ProfileConfig};
use crate::emit::{ArtifactWriter, minified_name};
use crate::error::BuildError;
use crate::loader::ModuleLoader;
use crate::minifier::{HttpMinifier, Minify};

/// Pipeline stages, in execution order.
///
/// A build walks Idle → Loading → Assembling → Writing → (minify profiles)
/// Minifying → Writing → Done, or jumps to Failed from whichever stage
/// raised the terminal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStage {
    Idle,
    Loading,
    Assembling,
    Writing,
    Minifying,
    Done,
    Failed,
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Assembling => "assembling",
            Self::Writing => "writing",
            Self::Minifying => "minifying",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Outcome of a successful build.
#[derive(Debug)]
pub struct BuildReport {
    /// Name of the profile that was built
    pub profile: String,
    /// Destination paths of every artifact written, in write order
    pub artifacts: Vec<PathBuf>,
}

/// Drives one build profile through the pipeline: resolve modules, assemble
/// the bundle, persist artifacts, and (for minify profiles) produce the
/// minified twin through the remote service.
///
/// All configuration is passed in explicitly; independent orchestrators can
/// run concurrently as long as their profiles write distinct artifacts.
pub struct BuildOrchestrator {
    config: Config,
    minifier: Box<dyn Minify>,
    stage: BuildStage,
}

impl BuildOrchestrator {
    /// Create an orchestrator backed by the HTTP minification client the
    /// config describes.
    pub fn new(config: Config) -> Self {
        let minifier = HttpMinifier::new(
            config.minify.url.clone(),
            config.minify.timeout(),
            config.minify.retries,
        );
        Self::with_minifier(config, Box::new(minifier))
    }

    /// Create an orchestrator with an injected compaction capability.
    pub fn with_minifier(config: Config, minifier: Box<dyn Minify>) -> Self {
        Self {
            config,
            minifier,
            stage: BuildStage::Idle,
        }
    }

    /// The stage the most recent build reached. Not persisted across runs.
    pub fn stage(&self) -> BuildStage {
        self.stage
    }

    fn enter(&mut self, stage: BuildStage) {
        debug!("Build stage: {} -> {}", self.stage, stage);
        self.stage = stage;
    }

    /// Record the failure of the current stage and produce the build's
    /// terminal error, annotated with the stage name.
    fn fail(&mut self, err: BuildError) -> anyhow::Error {
        let stage = self.stage;
        self.enter(BuildStage::Failed);
        anyhow::Error::new(err).context(format!("build failed in {stage} stage"))
    }

    fn profile(&self, name: &str) -> Result<ProfileConfig> {
        self.config.profile(name).cloned().ok_or_else(|| {
            anyhow!(
                "unknown profile '{}' (known profiles: {})",
                name,
                self.config.profile_names().join(", ")
            )
        })
    }

    /// Run the named profile to completion, writing one artifact (plain
    /// profiles) or two (minify profiles).
    ///
    /// The plain bundle lands on disk before minification is attempted, so a
    /// service failure never costs the unminified artifact. Artifact writes
    /// are independent of each other: a failed write is recorded, the
    /// remaining writes are still attempted, and the build then reports the
    /// first write failure.
    pub fn build(&mut self, profile_name: &str) -> Result<BuildReport> {
        self.enter(BuildStage::Idle);
        let profile = self.profile(profile_name)?;
        info!(
            "Building profile '{}' ({} modules)",
            profile.name,
            profile.modules.len()
        );

        self.enter(BuildStage::Loading);
        let loader = ModuleLoader::new(&self.config.src);
        let modules = match loader.load(&profile.modules) {
            Ok(modules) => modules,
            Err(err) => return Err(self.fail(err)),
        };

        self.enter(BuildStage::Assembling);
        let bundle = assemble(&modules);
        debug!(
            "Assembled bundle of {} bytes from {} modules",
            bundle.len(),
            modules.len()
        );

        self.enter(BuildStage::Writing);
        let writer = ArtifactWriter::new(&self.config.dist);
        let mut artifacts = Vec::new();
        let mut write_error: Option<BuildError> = None;

        match writer.write(&profile.output, &bundle) {
            Ok(path) => {
                info!("Wrote bundle artifact {:?}", path);
                artifacts.push(path);
            }
            Err(err) => {
                warn!("{err}");
                write_error = Some(err);
            }
        }

        if profile.minify {
            self.enter(BuildStage::Minifying);
            let compacted = match self.minifier.compact(&bundle) {
                Ok(compacted) => compacted,
                Err(err) => return Err(self.fail(err)),
            };
            debug!("Minified bundle: {} -> {} bytes", bundle.len(), compacted.len());

            self.enter(BuildStage::Writing);
            match writer.write(&minified_name(&profile.output), &compacted) {
                Ok(path) => {
                    info!("Wrote minified artifact {:?}", path);
                    artifacts.push(path);
                }
                Err(err) => {
                    warn!("{err}");
                    write_error.get_or_insert(err);
                }
            }
        }

        if let Some(err) = write_error {
            return Err(self.fail(err));
        }

        self.enter(BuildStage::Done);
        Ok(BuildReport {
            profile: profile.name,
            artifacts,
        })
    }

    /// Resolve and assemble the named profile without writing artifacts or
    /// invoking the minification service.
    pub fn assemble_to_string(&mut self, profile_name: &str) -> Result<String> {
        self.enter(BuildStage::Idle);
        let profile = self.profile(profile_name)?;

        self.enter(BuildStage::Loading);
        let loader = ModuleLoader::new(&self.config.src);
        let modules = match loader.load(&profile.modules) {
            Ok(modules) => modules,
            Err(err) => return Err(self.fail(err)),
        };

        self.enter(BuildStage::Assembling);
        let bundle = assemble(&modules);

        self.enter(BuildStage::Done);
        Ok(bundle)
    }
}

impl fmt::Debug for BuildOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildOrchestrator")
            .field("config", &self.config)
            .field("stage", &self.stage)
            .finish_non_exhaustive()
    }
}
