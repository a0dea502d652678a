//! Wrapper around the `ollama` command line tool
//!
//! Model listing and pulling go through the CLI rather than the HTTP API so
//! they work the same way the user would run them by hand.

use std::ffi::OsStr;
use std::path::PathBuf;
use std::process::{Output, Stdio};

use tokio::process::Command;
use tracing::{debug, info};

/// Default name of the runtime binary on PATH
pub const DEFAULT_RUNTIME_BINARY: &str = "ollama";

/// Error type for model registry operations
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("'{0}' was not found on PATH")]
    NotInstalled(String),
    #[error("failed to run '{binary}': {source}")]
    Io {
        binary: String,
        #[source]
        source: std::io::Error,
    },
    #[error("'ollama list' exited with {code:?}: {stderr}")]
    ListFailed { code: Option<i32>, stderr: String },
    #[error("failed to pull model '{model}': {stderr}")]
    PullFailed { model: String, stderr: String },
}

/// Outcome of [`RuntimeCli::ensure_model`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelStatus {
    AlreadyPresent,
    Pulled,
}

/// Handle to the runtime CLI binary
#[derive(Debug, Clone)]
pub struct RuntimeCli {
    binary: PathBuf,
}

impl Default for RuntimeCli {
    fn default() -> Self {
        Self::new(DEFAULT_RUNTIME_BINARY)
    }
}

impl RuntimeCli {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &std::path::Path {
        &self.binary
    }

    async fn run<I, S>(&self, args: I) -> Result<Output, RegistryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let binary = self.binary.display().to_string();
        Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| {
                if source.kind() == std::io::ErrorKind::NotFound {
                    RegistryError::NotInstalled(binary)
                } else {
                    RegistryError::Io { binary, source }
                }
            })
    }

    /// Raw `ollama list` output. Success requires exit code 0.
    pub async fn list_raw(&self) -> Result<String, RegistryError> {
        let output = self.run(["list"]).await?;
        if !output.status.success() {
            return Err(RegistryError::ListFailed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Names of the locally installed models.
    pub async fn list_models(&self) -> Result<Vec<String>, RegistryError> {
        let raw = self.list_raw().await?;
        Ok(parse_model_list(&raw))
    }

    /// Download a model. Blocks until the pull finishes.
    pub async fn pull(&self, model: &str) -> Result<(), RegistryError> {
        info!(model, "Pulling model");
        let output = self.run(["pull", model]).await?;
        if !output.status.success() {
            return Err(RegistryError::PullFailed {
                model: model.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }

    /// Make sure `model` is installed, pulling it when it is missing.
    ///
    /// Pull failures are reported once and never retried.
    pub async fn ensure_model(&self, model: &str) -> Result<ModelStatus, RegistryError> {
        let installed = self.list_models().await?;
        debug!(model, installed = ?installed, "Checking installed models");

        if is_model_present(&installed, model) {
            println!("✅ Model '{}' is already available", model);
            return Ok(ModelStatus::AlreadyPresent);
        }

        println!("🔄 Downloading model '{}'...", model);
        self.pull(model).await?;
        println!("✅ Model '{}' downloaded", model);
        Ok(ModelStatus::Pulled)
    }
}

/// Parse the table printed by `ollama list`.
///
/// The first line is a header (`NAME  ID  SIZE  MODIFIED`); every other
/// non-empty line starts with the model name.
pub fn parse_model_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .skip(1)
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

/// Exact model match.
///
/// A requested name without a tag means `<name>:latest`, the same tag
/// `ollama run` would use, so `phi` matches `phi:latest` but neither
/// `phi:2.7b` nor `phi3:latest`.
pub fn is_model_present(installed: &[String], requested: &str) -> bool {
    let requested = requested.trim();
    let latest = (!requested.contains(':')).then(|| format!("{}:latest", requested));
    installed
        .iter()
        .any(|name| name == requested || latest.as_deref() == Some(name.as_str()))
}
