use std::path::PathBuf;
use std::sync::Arc;

use log::debug;

use crate::host::{HostStats, Storage};
use crate::probe::Probe;
use crate::verdict::PartialVerdict;

pub const MIB: u64 = 1024 * 1024;
/// Roughly 200 GB; user machines rarely have less free on the system volume.
pub const MIN_FREE_MIB: u64 = 200_000;
/// VMs get a lot of RAM relative to their small virtual disks.
pub const MAX_RAM_TO_FREE_DISK_RATIO: f64 = 0.075;

pub struct AvailableDiskSpace {
    storage: Arc<dyn Storage>,
    volume: PathBuf,
}

impl AvailableDiskSpace {
    pub fn new(storage: Arc<dyn Storage>, volume: PathBuf) -> Self {
        Self { storage, volume }
    }
}

pub fn free_space_verdict(free_bytes: u64) -> PartialVerdict {
    if free_bytes / MIB < MIN_FREE_MIB {
        PartialVerdict::definitely_vm()
    } else {
        PartialVerdict::user(0.7)
    }
}

impl Probe for AvailableDiskSpace {
    fn name(&self) -> &str {
        super::AVAILABLE_DISK_SPACE
    }

    fn run(&self) -> PartialVerdict {
        match self.storage.available_bytes(&self.volume) {
            Ok(free) => free_space_verdict(free),
            Err(e) => {
                debug!("Free space on {} unavailable: {}", self.volume.display(), e);
                PartialVerdict::neutral()
            }
        }
    }
}

pub struct RamVsDiskSpace {
    stats: Arc<dyn HostStats>,
    storage: Arc<dyn Storage>,
    volume: PathBuf,
}

impl RamVsDiskSpace {
    pub fn new(stats: Arc<dyn HostStats>, storage: Arc<dyn Storage>, volume: PathBuf) -> Self {
        Self { stats, storage, volume }
    }
}

/// Zero free bytes yields an infinite ratio and therefore a VM verdict.
pub fn ram_to_disk_verdict(total_memory: u64, free_bytes: u64) -> PartialVerdict {
    let ratio = total_memory as f64 / free_bytes as f64;
    if ratio > MAX_RAM_TO_FREE_DISK_RATIO {
        PartialVerdict::definitely_vm()
    } else {
        PartialVerdict::user(0.5)
    }
}

impl Probe for RamVsDiskSpace {
    fn name(&self) -> &str {
        super::RAM_VS_DISK_SPACE
    }

    fn run(&self) -> PartialVerdict {
        let memory = self.stats.total_memory_bytes();
        let free = self.storage.available_bytes(&self.volume);
        match (memory, free) {
            (Ok(memory), Ok(free)) => ram_to_disk_verdict(memory, free),
            (Err(e), _) | (_, Err(e)) => {
                debug!("RAM/disk ratio unavailable: {}", e);
                PartialVerdict::neutral()
            }
        }
    }
}
