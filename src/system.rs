use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use hostname::get as get_hostname;
use log::debug;
use sysinfo::{Disks, System};
use tokio::time::timeout;

use crate::host::{
    CommandOutput, CommandRunner, Displays, HostError, HostResult, HostStats, OpticalDrive,
    Storage,
};

#[derive(Debug, Clone, serde::Serialize)]
pub struct SystemInfo {
    pub os_name: String,
    pub os_version: String,
    pub kernel_version: String,
    pub architecture: String,
    pub hostname: String,
}

pub fn get_system_info() -> SystemInfo {
    let hostname = get_hostname()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "unknown".to_string());

    let os_name = System::name().unwrap_or_else(|| "Unknown OS".to_string());
    let os_version = System::os_version().unwrap_or_else(|| "Unknown Version".to_string());
    let kernel_version = System::kernel_version().unwrap_or_else(|| "Unknown Kernel".to_string());
    let architecture = if cfg!(target_arch = "x86_64") {
        "64-bit"
    } else if cfg!(target_arch = "x86") {
        "32-bit"
    } else if cfg!(target_arch = "aarch64") {
        "ARM64"
    } else if cfg!(target_arch = "arm") {
        "ARM32"
    } else {
        "Unknown"
    };

    SystemInfo {
        os_name,
        os_version,
        kernel_version,
        architecture: architecture.to_string(),
        hostname,
    }
}

/// Uptime, memory and disk facts from the `sysinfo` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct SysinfoHost;

impl HostStats for SysinfoHost {
    fn uptime_seconds(&self) -> HostResult<u64> {
        // sysinfo reports 0 when the boot time cannot be read
        match System::uptime() {
            0 => Err(HostError::Unavailable("uptime".to_string())),
            secs => Ok(secs),
        }
    }

    fn total_memory_bytes(&self) -> HostResult<u64> {
        let mut sys = System::new();
        sys.refresh_memory();
        match sys.total_memory() {
            0 => Err(HostError::Unavailable("total memory".to_string())),
            bytes => Ok(bytes),
        }
    }
}

impl Storage for SysinfoHost {
    fn available_bytes(&self, path: &Path) -> HostResult<u64> {
        let disks = Disks::new_with_refreshed_list();
        debug!("sysinfo found {} disks", disks.list().len());
        let mounts = disks
            .list()
            .iter()
            .map(|disk| (disk.mount_point(), disk.available_space()));
        containing_volume(mounts, path)
            .ok_or_else(|| HostError::Unavailable(format!("disk holding {}", path.display())))
    }
}

/// Free bytes of the mount that holds `path`: the deepest mount point that
/// is a prefix of it.
pub fn containing_volume<'a, I>(mounts: I, path: &Path) -> Option<u64>
where
    I: IntoIterator<Item = (&'a Path, u64)>,
{
    mounts
        .into_iter()
        .filter(|(mount_point, _)| path.starts_with(mount_point))
        .max_by_key(|(mount_point, _)| mount_point.components().count())
        .map(|(_, available)| available)
}

/// Runs command lines through `bash -c`, each bounded by a timeout.
pub struct ShellRunner {
    runtime: tokio::runtime::Handle,
    timeout: Duration,
}

impl ShellRunner {
    pub fn new(runtime: tokio::runtime::Handle, timeout: Duration) -> Self {
        Self { runtime, timeout }
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, command: &str) -> HostResult<CommandOutput> {
        debug!("Running command: {}", command);
        let mut cmd = tokio::process::Command::new("bash");
        cmd.arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = match self.runtime.block_on(timeout(self.timeout, cmd.output())) {
            Ok(result) => result?,
            Err(_) => return Err(HostError::Timeout(self.timeout)),
        };

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        if !output.status.success() {
            return Err(HostError::CommandFailed {
                status: output.status.to_string(),
                stderr,
            });
        }
        Ok(CommandOutput { stdout, stderr })
    }
}

#[cfg(target_os = "linux")]
pub fn displays() -> Arc<dyn Displays> {
    Arc::new(crate::linux::SysfsDisplays::default())
}

#[cfg(target_os = "windows")]
pub fn displays() -> Arc<dyn Displays> {
    Arc::new(crate::windows::Win32Displays)
}

#[cfg(not(any(target_os = "linux", target_os = "windows")))]
pub fn displays() -> Arc<dyn Displays> {
    Arc::new(Unsupported)
}

#[cfg(target_os = "linux")]
pub fn optical_drive() -> Arc<dyn OpticalDrive> {
    Arc::new(crate::linux::DevCdrom::default())
}

#[cfg(target_os = "windows")]
pub fn optical_drive() -> Arc<dyn OpticalDrive> {
    Arc::new(crate::windows::WmiCdrom)
}

#[cfg(not(any(target_os = "linux", target_os = "windows")))]
pub fn optical_drive() -> Arc<dyn OpticalDrive> {
    Arc::new(Unsupported)
}

#[cfg(not(any(target_os = "linux", target_os = "windows")))]
struct Unsupported;

#[cfg(not(any(target_os = "linux", target_os = "windows")))]
impl Displays for Unsupported {
    fn count(&self) -> HostResult<usize> {
        Err(HostError::Unsupported("display enumeration"))
    }

    fn primary_bounds(&self) -> HostResult<(u32, u32)> {
        Err(HostError::Unsupported("display enumeration"))
    }
}

#[cfg(not(any(target_os = "linux", target_os = "windows")))]
impl OpticalDrive for Unsupported {
    fn detect(&self) -> HostResult<()> {
        Err(HostError::Unsupported("optical drive detection"))
    }
}
