//! Narrow interfaces for the raw host facts the probes consume.
//!
//! Each trait fetches one kind of fact and may fail with a [`HostError`].
//! Probes decide what a failure means; nothing here is surfaced to the caller.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

/// Message that marks an absent device. The optical drive probe compares
/// against this exact text.
pub const NO_SUCH_FILE_OR_DIRECTORY: &str = "no such file or directory";

#[derive(Debug, Error)]
pub enum HostError {
    #[error("{0} is unavailable")]
    Unavailable(String),

    #[error("{0} is not supported on this platform")]
    Unsupported(&'static str),

    #[error("no such file or directory")]
    DeviceNotFound,

    #[error("command exited with {status}: {stderr}")]
    CommandFailed { status: String, stderr: String },

    #[error("command timed out after {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type HostResult<T> = Result<T, HostError>;

pub trait Displays: Send + Sync {
    /// Number of active displays.
    fn count(&self) -> HostResult<usize>;

    /// Width and height of the primary display in pixels.
    fn primary_bounds(&self) -> HostResult<(u32, u32)>;
}

pub trait HostStats: Send + Sync {
    fn uptime_seconds(&self) -> HostResult<u64>;

    fn total_memory_bytes(&self) -> HostResult<u64>;
}

pub trait Storage: Send + Sync {
    /// Free bytes available to the current user on the volume at `path`.
    fn available_bytes(&self, path: &Path) -> HostResult<u64>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Trimmed standard output.
    pub stdout: String,
    pub stderr: String,
}

pub trait CommandRunner: Send + Sync {
    /// Run a shell command line. A spawn failure, a non-zero exit or a
    /// timeout is an error.
    fn run(&self, command: &str) -> HostResult<CommandOutput>;
}

pub trait OpticalDrive: Send + Sync {
    /// Succeeds when an optical drive is present. An absent drive is
    /// reported as [`HostError::DeviceNotFound`].
    fn detect(&self) -> HostResult<()>;
}

/// Platform facts resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    /// Volume holding the operating system: `/` on POSIX, `C:\` on Windows.
    pub system_volume: PathBuf,
}

impl Platform {
    pub fn detect() -> Self {
        let system_volume = if cfg!(windows) { "C:\\" } else { "/" };
        Self {
            system_volume: PathBuf::from(system_volume),
        }
    }

    pub fn with_system_volume(mut self, path: impl Into<PathBuf>) -> Self {
        self.system_volume = path.into();
        self
    }
}

/// Every collaborator a probe may need.
#[derive(Clone)]
pub struct Host {
    pub platform: Platform,
    pub displays: Arc<dyn Displays>,
    pub stats: Arc<dyn HostStats>,
    pub storage: Arc<dyn Storage>,
    pub commands: Arc<dyn CommandRunner>,
    pub optical: Arc<dyn OpticalDrive>,
}

impl Host {
    /// Wire the real collaborators for the running OS.
    ///
    /// `runtime` drives the shell commands; `command_timeout` bounds each one.
    pub fn system(
        platform: Platform,
        command_timeout: Duration,
        runtime: tokio::runtime::Handle,
    ) -> Self {
        let sysinfo = Arc::new(crate::system::SysinfoHost);
        Self {
            platform,
            displays: crate::system::displays(),
            stats: sysinfo.clone(),
            storage: sysinfo,
            commands: Arc::new(crate::system::ShellRunner::new(runtime, command_timeout)),
            optical: crate::system::optical_drive(),
        }
    }
}
