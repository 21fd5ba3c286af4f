use std::fmt;
use std::thread;
use std::time::Duration;

use log::{debug, warn};

use crate::error::BuildError;

/// Default endpoint of the public minification service.
pub const DEFAULT_MINIFY_URL: &str = "http://javascript-minifier.com/raw";

/// Base delay for the retry backoff ladder; doubles after each failed attempt.
const BACKOFF_BASE: Duration = Duration::from_millis(500);

/// Remote text-compaction capability.
///
/// The orchestrator only ever talks to this trait, so builds can be exercised
/// against a deterministic stand-in instead of the network.
pub trait Minify {
    /// Compact `source` into a shorter, semantically equivalent form.
    fn compact(&self, source: &str) -> Result<String, BuildError>;
}

/// HTTP client for the remote minification service.
///
/// One synchronous POST per compaction call, with a bounded wait so a stalled
/// service cannot hang the build. `retries` extra attempts are made with
/// doubling backoff before the failure is surfaced.
pub struct HttpMinifier {
    agent: ureq::Agent,
    url: String,
    retries: u32,
}

impl HttpMinifier {
    pub fn new(url: impl Into<String>, timeout: Duration, retries: u32) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            url: url.into(),
            retries,
        }
    }

    fn request(&self, source: &str) -> Result<String, BuildError> {
        let response = self
            .agent
            .post(&self.url)
            .send_form(&[("input", source)])
            .map_err(|err| match err {
                ureq::Error::Status(code, _) => BuildError::Service {
                    detail: format!("service returned HTTP {code}"),
                },
                ureq::Error::Transport(transport) => BuildError::Service {
                    detail: format!("transport failure: {transport}"),
                },
            })?;
        response.into_string().map_err(|err| BuildError::Service {
            detail: format!("failed to read service response: {err}"),
        })
    }
}

impl Minify for HttpMinifier {
    fn compact(&self, source: &str) -> Result<String, BuildError> {
        let attempts = self.retries + 1;
        let mut backoff = BACKOFF_BASE;
        let mut last_error = None;

        for attempt in 1..=attempts {
            debug!("Minification attempt {}/{} against {}", attempt, attempts, self.url);
            match self.request(source) {
                Ok(compacted) => return Ok(compacted),
                Err(err) => {
                    warn!("Minification attempt {}/{} failed: {}", attempt, attempts, err);
                    last_error = Some(err);
                    if attempt < attempts {
                        thread::sleep(backoff);
                        backoff *= 2;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| BuildError::Service {
            detail: "minification attempts exhausted".to_owned(),
        }))
    }
}

impl fmt::Debug for HttpMinifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpMinifier")
            .field("url", &self.url)
            .field("retries", &self.retries)
            .finish_non_exhaustive()
    }
}
