//! Scripted collaborators for probe tests.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::host::{
    CommandOutput, CommandRunner, Displays, Host, HostError, HostResult, HostStats, OpticalDrive,
    Platform, Storage,
};

fn unavailable<T>(what: &str) -> HostResult<T> {
    Err(HostError::Unavailable(what.to_string()))
}

#[derive(Debug, Default)]
pub struct FixedDisplays {
    pub count: Option<usize>,
    pub bounds: Option<(u32, u32)>,
}

impl Displays for FixedDisplays {
    fn count(&self) -> HostResult<usize> {
        self.count.map_or_else(|| unavailable("display count"), Ok)
    }

    fn primary_bounds(&self) -> HostResult<(u32, u32)> {
        self.bounds.map_or_else(|| unavailable("display bounds"), Ok)
    }
}

#[derive(Debug, Default)]
pub struct FixedStats {
    pub uptime: Option<u64>,
    pub memory: Option<u64>,
}

impl HostStats for FixedStats {
    fn uptime_seconds(&self) -> HostResult<u64> {
        self.uptime.map_or_else(|| unavailable("uptime"), Ok)
    }

    fn total_memory_bytes(&self) -> HostResult<u64> {
        self.memory.map_or_else(|| unavailable("memory"), Ok)
    }
}

#[derive(Debug, Default)]
pub struct FixedStorage {
    pub free: Option<u64>,
    pub queried: Mutex<Vec<PathBuf>>,
}

impl FixedStorage {
    pub fn free(bytes: u64) -> Self {
        Self { free: Some(bytes), ..Self::default() }
    }
}

impl Storage for FixedStorage {
    fn available_bytes(&self, path: &Path) -> HostResult<u64> {
        self.queried.lock().unwrap().push(path.to_path_buf());
        self.free.map_or_else(|| unavailable("disk"), Ok)
    }
}

/// Replies to every command with the same stdout, or fails.
#[derive(Debug, Default)]
pub struct FixedCommand {
    pub stdout: Option<String>,
    pub commands: Mutex<Vec<String>>,
}

impl FixedCommand {
    pub fn replying(stdout: &str) -> Self {
        Self { stdout: Some(stdout.to_string()), ..Self::default() }
    }

    pub fn failing() -> Self {
        Self::default()
    }
}

impl CommandRunner for FixedCommand {
    fn run(&self, command: &str) -> HostResult<CommandOutput> {
        self.commands.lock().unwrap().push(command.to_string());
        match &self.stdout {
            Some(stdout) => Ok(CommandOutput {
                stdout: stdout.clone(),
                stderr: String::new(),
            }),
            None => Err(HostError::CommandFailed {
                status: "exit status: 127".to_string(),
                stderr: "bash: command not found".to_string(),
            }),
        }
    }
}

#[derive(Debug)]
pub enum FixedOptical {
    Present,
    Absent,
    Failing(String),
}

impl OpticalDrive for FixedOptical {
    fn detect(&self) -> HostResult<()> {
        match self {
            FixedOptical::Present => Ok(()),
            FixedOptical::Absent => Err(HostError::DeviceNotFound),
            FixedOptical::Failing(msg) => Err(HostError::Other(msg.clone())),
        }
    }
}

/// A host on which every query fails.
pub fn host() -> Host {
    Host {
        platform: Platform::detect(),
        displays: Arc::new(FixedDisplays::default()),
        stats: Arc::new(FixedStats::default()),
        storage: Arc::new(FixedStorage::default()),
        commands: Arc::new(FixedCommand::failing()),
        optical: Arc::new(FixedOptical::Failing("unsupported".to_string())),
    }
}
