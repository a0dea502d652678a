//! Makes sure the Ollama runtime is installed and answering
//!
//! Detection is done by running `ollama list`. When that fails the runtime
//! is installed with the platform's usual method and checked again.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{info, warn};

use crate::ollama::{RegistryError, RuntimeCli};

pub const INSTALL_SCRIPT: &str = "curl -fsSL https://ollama.com/install.sh | sh";
pub const WINDOWS_INSTALLER_URL: &str = "https://ollama.com/download/windows";
pub const MANUAL_INSTALL_HINT: &str = "Please install Ollama manually from https://ollama.com/";

/// Host operating system family
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Platform {
    Linux,
    MacOs,
    Windows,
    Other(String),
}

impl Platform {
    pub fn detect() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    pub fn from_os(os: &str) -> Self {
        match os {
            "linux" => Platform::Linux,
            "macos" | "darwin" => Platform::MacOs,
            "windows" => Platform::Windows,
            other => Platform::Other(other.to_string()),
        }
    }
}

/// Error type for runtime installation
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("unsupported operating system '{0}'")]
    UnsupportedPlatform(String),
    #[error("installation failed: {0}")]
    Install(String),
    #[error("installer download failed: {0}")]
    Download(#[from] reqwest::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Ollama was installed but is not on PATH; restart your terminal and try again")]
    NotOnPath,
    #[error("Ollama was installed but is not working: {0}")]
    Unhealthy(String),
}

/// How long to wait around an installation
#[derive(Debug, Clone)]
pub struct WaitPolicy {
    /// Pause after installing before the final health check
    pub settle: Duration,
    /// Pause after launching the Windows installer before polling
    pub installer_grace: Duration,
    /// Polls of `ollama list` after the Windows installer
    pub poll_attempts: u32,
    pub poll_interval: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            settle: Duration::from_secs(3),
            installer_grace: Duration::from_secs(10),
            poll_attempts: 5,
            poll_interval: Duration::from_secs(10),
        }
    }
}

/// Installs and verifies the runtime
pub struct Bootstrapper {
    cli: RuntimeCli,
    platform: Platform,
    wait: WaitPolicy,
}

impl Bootstrapper {
    pub fn new(cli: RuntimeCli) -> Self {
        Self {
            cli,
            platform: Platform::detect(),
            wait: WaitPolicy::default(),
        }
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_wait_policy(mut self, wait: WaitPolicy) -> Self {
        self.wait = wait;
        self
    }

    /// Check the runtime and install it when missing or broken.
    pub async fn ensure_runtime_available(&self) -> Result<(), BootstrapError> {
        match self.cli.list_raw().await {
            Ok(_) => {
                println!("✅ Ollama is installed and working");
                return Ok(());
            }
            Err(RegistryError::NotInstalled(_)) => {
                println!("❌ Ollama is not installed on this system.");
            }
            Err(e) => {
                println!("❌ Ollama is installed but not working correctly: {}", e);
            }
        }

        if let Err(e) = self.install().await {
            println!("❌ Error while installing Ollama: {}", e);
            println!("{}", MANUAL_INSTALL_HINT);
            return Err(e);
        }
        self.verify().await
    }

    async fn install(&self) -> Result<(), BootstrapError> {
        println!("🔄 Installing Ollama...");
        match &self.platform {
            Platform::Linux => {
                println!("Linux detected, running the install script...");
                run_shell(INSTALL_SCRIPT).await
            }
            Platform::MacOs => {
                println!("macOS detected...");
                if command_succeeds("brew", &["--version"]).await {
                    run_program("brew", &["install", "ollama"]).await
                } else {
                    run_shell(INSTALL_SCRIPT).await
                }
            }
            Platform::Windows => self.install_windows().await,
            Platform::Other(os) => Err(BootstrapError::UnsupportedPlatform(os.clone())),
        }
    }

    async fn install_windows(&self) -> Result<(), BootstrapError> {
        println!("Windows detected, downloading the Ollama installer...");
        let installer = installer_path();
        let bytes = reqwest::get(WINDOWS_INSTALLER_URL)
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        if let Some(parent) = installer.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&installer, &bytes).await?;
        println!("Installer saved to {}", installer.display());

        println!("Running the installer. Please finish the setup wizard when it appears...");
        let status = Command::new(&installer).status().await?;
        if !status.success() {
            return Err(BootstrapError::Install(format!("installer exited with {}", status)));
        }

        println!("Waiting for the installation to complete...");
        tokio::time::sleep(self.wait.installer_grace).await;

        for attempt in 1..=self.wait.poll_attempts {
            match self.cli.list_raw().await {
                Err(RegistryError::NotInstalled(_)) if attempt < self.wait.poll_attempts => {
                    println!(
                        "Waiting for Ollama to become available... ({}/{})",
                        attempt, self.wait.poll_attempts
                    );
                    tokio::time::sleep(self.wait.poll_interval).await;
                }
                Err(RegistryError::NotInstalled(_)) => {
                    warn!("Ollama still not callable after the installer finished");
                    println!("⚠️  The installation may still be in progress. If this keeps failing:");
                    println!("1. Finish the Ollama installation manually");
                    println!("2. Make sure Ollama is running");
                    println!("3. Run this program again");
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// Final health check after an install: `ollama list` must exit 0.
    async fn verify(&self) -> Result<(), BootstrapError> {
        tokio::time::sleep(self.wait.settle).await;
        match self.cli.list_raw().await {
            Ok(_) => {
                info!("Ollama installed and running");
                println!("✅ Ollama installed and running");
                Ok(())
            }
            Err(RegistryError::NotInstalled(_)) => Err(BootstrapError::NotOnPath),
            Err(e) => Err(BootstrapError::Unhealthy(e.to_string())),
        }
    }
}

/// `<downloads>/ollama-installer.exe`, falling back to `~/Downloads`.
pub fn installer_path() -> PathBuf {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ollama-installer.exe")
}

async fn run_shell(script: &str) -> Result<(), BootstrapError> {
    run_program("sh", &["-c", script]).await
}

async fn run_program(program: &str, args: &[&str]) -> Result<(), BootstrapError> {
    info!(program, ?args, "Running installer command");
    let status = Command::new(program).args(args).status().await?;
    if status.success() {
        Ok(())
    } else {
        Err(BootstrapError::Install(format!("'{} {}' exited with {}", program, args.join(" "), status)))
    }
}

async fn command_succeeds(program: &str, args: &[&str]) -> bool {
    Command::new(program)
        .args(args)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|s| s.success())
        .unwrap_or(false)
}
