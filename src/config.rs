use std::env;
use std::path::PathBuf;

use anyhow::Result;

/// Default header carrying the shared API key.
pub const DEFAULT_API_KEY_HEADER: &str = "x-api-key";

/// Which prediction backend the public API forwards to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backend {
    /// Hosted scoring endpoint (default)
    Remote,
    /// Artifact bundle loaded into this process
    Local,
    /// Random predictions over the demo label space, for wiring tests only
    Mock,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Remote => "remote",
            Backend::Local => "local",
            Backend::Mock => "mock",
        }
    }
}

/// Central configuration loaded from environment variables.
///
/// Secrets come from env vars only. The .env file is loaded at startup via
/// dotenvy, and the environment is read once.
#[derive(Debug, Clone)]
pub struct Config {
    /// Shared secret callers must present (TOPICAST_API_KEY)
    pub api_key: String,
    /// Header name the shared secret is read from (TOPICAST_API_KEY_HEADER)
    pub api_key_header: String,
    pub backend: Backend,
    /// Hosted scoring endpoint URL (TOPICAST_REMOTE_ENDPOINT)
    pub remote_endpoint: String,
    /// Bearer token for the hosted endpoint (TOPICAST_REMOTE_API_KEY)
    pub remote_api_key: String,
    /// Directory holding the trained artifact bundle (TOPICAST_ARTIFACT_DIR)
    pub artifact_dir: PathBuf,
    /// Bearer token the scoring server requires, if set (SCORING_API_KEY)
    pub scoring_api_key: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Nothing is required here; each command calls the `require_*` checks
    /// it needs.
    pub fn load() -> Result<Self> {
        let backend = match env::var("TOPICAST_BACKEND").as_deref() {
            Ok("local") => Backend::Local,
            Ok("mock") => Backend::Mock,
            // "remote", empty or unset all default to the hosted endpoint
            Ok("remote") | Ok("") | Err(_) => Backend::Remote,
            Ok(other) => anyhow::bail!(
                "Unknown TOPICAST_BACKEND {other:?}. Expected one of: remote, local, mock."
            ),
        };

        let artifact_dir = env::var("TOPICAST_ARTIFACT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| crate::artifacts::default_artifact_dir());

        let api_key_header = env::var("TOPICAST_API_KEY_HEADER")
            .ok()
            .filter(|h| !h.trim().is_empty())
            .map(|h| h.trim().to_ascii_lowercase())
            .unwrap_or_else(|| DEFAULT_API_KEY_HEADER.to_string());

        Ok(Self {
            api_key: env::var("TOPICAST_API_KEY").unwrap_or_default(),
            api_key_header,
            backend,
            remote_endpoint: env::var("TOPICAST_REMOTE_ENDPOINT").unwrap_or_default(),
            remote_api_key: env::var("TOPICAST_REMOTE_API_KEY").unwrap_or_default(),
            artifact_dir,
            scoring_api_key: env::var("SCORING_API_KEY").unwrap_or_default(),
        })
    }

    /// Check that the shared API key is configured.
    /// The public API refuses to start without one.
    pub fn require_api_key(&self) -> Result<()> {
        if self.api_key.is_empty() {
            anyhow::bail!(
                "TOPICAST_API_KEY not set. Add it to your .env file.\n\
                 See .env.example for the required variables."
            );
        }
        if axum::http::HeaderName::from_bytes(self.api_key_header.as_bytes()).is_err() {
            anyhow::bail!(
                "TOPICAST_API_KEY_HEADER {:?} is not a valid header name.",
                self.api_key_header
            );
        }
        Ok(())
    }

    /// Check that the artifact bundle exists on disk.
    pub fn require_artifacts(&self) -> Result<()> {
        let missing = crate::artifacts::missing_files(&self.artifact_dir);
        if !missing.is_empty() {
            anyhow::bail!(
                "Artifact bundle incomplete in {} (missing: {})\n\
                 Run `topicast prepare` and place the trained classifier.onnx there,\n\
                 or set TOPICAST_ARTIFACT_DIR.",
                self.artifact_dir.display(),
                missing.join(", ")
            );
        }
        Ok(())
    }

    /// Validate that the chosen backend has what it needs.
    /// Remote: endpoint URL must be set. Local: artifacts must exist.
    pub fn require_backend(&self) -> Result<()> {
        match self.backend {
            Backend::Remote => {
                if self.remote_endpoint.is_empty() {
                    anyhow::bail!(
                        "TOPICAST_REMOTE_ENDPOINT not set. Point it at the hosted scoring endpoint,\n\
                         or set TOPICAST_BACKEND=local to serve the artifact bundle in-process."
                    );
                }
                Ok(())
            }
            Backend::Local => self.require_artifacts(),
            Backend::Mock => Ok(()),
        }
    }
}
