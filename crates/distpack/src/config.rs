use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::combine::Combine;
use crate::dirs::{system_config_file, user_distpack_config_dir};
use crate::minifier::DEFAULT_MINIFY_URL;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root directory module references resolve against
    pub src: PathBuf,

    /// Destination root for build artifacts
    pub dist: PathBuf,

    /// Remote minification service settings
    pub minify: MinifyConfig,

    /// Build profiles, looked up by name
    #[serde(rename = "profile")]
    pub profiles: Vec<ProfileConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            src: PathBuf::from("src"),
            dist: PathBuf::from("dist"),
            minify: MinifyConfig::default(),
            profiles: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MinifyConfig {
    /// Endpoint of the remote compaction service
    pub url: String,

    /// Bounded wait on the remote call, in seconds
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Extra attempts after a failed service call
    pub retries: u32,
}

impl Default for MinifyConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_MINIFY_URL.to_owned(),
            timeout_secs: 30,
            retries: 0,
        }
    }
}

impl MinifyConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// One named build profile: which modules go into the bundle, in what order,
/// and whether a minified twin is produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Profile name used for lookup from the CLI
    pub name: String,

    /// Artifact name, relative to the dist root
    pub output: String,

    /// Whether a minified twin is produced alongside the bundle
    #[serde(default)]
    pub minify: bool,

    /// Ordered module references; bundle order follows this list exactly
    pub modules: Vec<String>,
}

impl Combine for Config {
    fn combine(self, other: Self) -> Self {
        let default = Config::default();
        Self {
            // For scalars and collections alike, higher precedence (self)
            // replaces lower precedence (other) if self has non-default values
            src: if self.src == default.src { other.src } else { self.src },
            dist: if self.dist == default.dist {
                other.dist
            } else {
                self.dist
            },
            minify: self.minify.combine(other.minify),
            profiles: if self.profiles.is_empty() {
                other.profiles
            } else {
                self.profiles
            },
        }
    }
}

impl Combine for MinifyConfig {
    fn combine(self, other: Self) -> Self {
        let default = Self::default();
        Self {
            url: if self.url == default.url { other.url } else { self.url },
            timeout_secs: if self.timeout_secs == default.timeout_secs {
                other.timeout_secs
            } else {
                self.timeout_secs
            },
            retries: if self.retries == default.retries {
                other.retries
            } else {
                self.retries
            },
        }
    }
}

/// Configuration values from environment variables with DISTPACK_ prefix
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub src: Option<PathBuf>,
    pub dist: Option<PathBuf>,
    pub minify_url: Option<String>,
    pub minify_timeout_secs: Option<u64>,
    pub minify_retries: Option<u32>,
}

impl EnvConfig {
    /// Load configuration from environment variables with DISTPACK_ prefix
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(src) = env::var("DISTPACK_SRC") {
            if !src.trim().is_empty() {
                config.src = Some(PathBuf::from(src.trim()));
            }
        }

        if let Ok(dist) = env::var("DISTPACK_DIST") {
            if !dist.trim().is_empty() {
                config.dist = Some(PathBuf::from(dist.trim()));
            }
        }

        if let Ok(url) = env::var("DISTPACK_MINIFY_URL") {
            if !url.trim().is_empty() {
                config.minify_url = Some(url.trim().to_owned());
            }
        }

        if let Ok(timeout) = env::var("DISTPACK_MINIFY_TIMEOUT_SECS") {
            match timeout.trim().parse::<u64>() {
                Ok(value) => config.minify_timeout_secs = Some(value),
                Err(_) => log::warn!("Ignoring invalid DISTPACK_MINIFY_TIMEOUT_SECS: {timeout}"),
            }
        }

        if let Ok(retries) = env::var("DISTPACK_MINIFY_RETRIES") {
            match retries.trim().parse::<u32>() {
                Ok(value) => config.minify_retries = Some(value),
                Err(_) => log::warn!("Ignoring invalid DISTPACK_MINIFY_RETRIES: {retries}"),
            }
        }

        config
    }

    /// Apply environment config to base config
    pub fn apply_to(self, mut config: Config) -> Config {
        if let Some(src) = self.src {
            config.src = src;
        }
        if let Some(dist) = self.dist {
            config.dist = dist;
        }
        if let Some(url) = self.minify_url {
            config.minify.url = url;
        }
        if let Some(timeout_secs) = self.minify_timeout_secs {
            config.minify.timeout_secs = timeout_secs;
        }
        if let Some(retries) = self.minify_retries {
            config.minify.retries = retries;
        }
        config
    }
}

impl Config {
    /// Look up a profile by name.
    pub fn profile(&self, name: &str) -> Option<&ProfileConfig> {
        self.profiles.iter().find(|profile| profile.name == name)
    }

    /// Names of all configured profiles, in declaration order.
    pub fn profile_names(&self) -> Vec<&str> {
        self.profiles.iter().map(|p| p.name.as_str()).collect()
    }

    /// Reject profile lists a build could not act on unambiguously.
    pub fn validate(&self) -> Result<()> {
        for (index, profile) in self.profiles.iter().enumerate() {
            if profile.name.is_empty() {
                return Err(anyhow!("profile #{} has an empty name", index + 1));
            }
            if profile.output.is_empty() {
                return Err(anyhow!("profile '{}' has an empty output name", profile.name));
            }
            if profile.modules.is_empty() {
                return Err(anyhow!("profile '{}' lists no modules", profile.name));
            }
        }
        for (index, profile) in self.profiles.iter().enumerate() {
            if self.profiles[..index].iter().any(|p| p.name == profile.name) {
                return Err(anyhow!("duplicate profile name '{}'", profile.name));
            }
        }
        Ok(())
    }

    /// Load a single config file from a path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {:?}", path))?;

        Ok(config)
    }

    fn try_load_and_combine<P: AsRef<Path>>(
        config: &mut Self,
        path: P,
        context: &str,
    ) -> Result<()> {
        if path.as_ref().exists() {
            log::debug!("Loading {} from: {:?}", context, path.as_ref());
            let loaded = Self::load_from_file(&path)
                .with_context(|| format!("Failed to load {} from {:?}", context, path.as_ref()))?;
            *config = loaded.combine(config.clone());
        }
        Ok(())
    }

    /// Load configuration with hierarchical precedence:
    /// 1. CLI-provided config path (highest precedence)
    /// 2. Environment variables (DISTPACK_*)
    /// 3. Project config (distpack.toml in current directory)
    /// 4. User config (~/.config/distpack/distpack.toml)
    /// 5. System config (/etc/distpack/distpack.toml or equivalent)
    /// 6. Default values (lowest precedence)
    pub fn load(cli_config_path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        // 1. Load system config (lowest precedence)
        if let Some(system_config_path) = system_config_file() {
            Self::try_load_and_combine(&mut config, &system_config_path, "system config")?;
        }

        // 2. Load user config
        if let Some(user_config_dir) = user_distpack_config_dir() {
            let user_config_path = user_config_dir.join("distpack.toml");
            Self::try_load_and_combine(&mut config, &user_config_path, "user config")?;
        }

        // 3. Load project config (distpack.toml in current directory)
        let project_config_path = PathBuf::from("distpack.toml");
        Self::try_load_and_combine(&mut config, &project_config_path, "project config")?;

        // 4. Apply environment variables
        let env_config = EnvConfig::from_env();
        config = env_config.apply_to(config);

        // 5. Load CLI-provided config (highest precedence)
        if let Some(cli_config_path) = cli_config_path {
            Self::try_load_and_combine(&mut config, cli_config_path, "CLI config")?;
        }

        config.validate().context("Invalid final configuration")?;

        Ok(config)
    }
}
