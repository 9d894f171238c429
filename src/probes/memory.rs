use std::sync::Arc;

use log::debug;

use crate::host::HostStats;
use crate::probe::Probe;
use crate::verdict::PartialVerdict;

pub const GIB: u64 = 1024 * 1024 * 1024;

/// Physical DIMMs come in whole gigabytes; a VM can be given any amount.
pub struct RamWholeGbSlots {
    stats: Arc<dyn HostStats>,
}

impl RamWholeGbSlots {
    pub fn new(stats: Arc<dyn HostStats>) -> Self {
        Self { stats }
    }
}

pub fn whole_gb_verdict(total_memory: u64) -> PartialVerdict {
    // also trips on machines with less than 1 GiB
    if total_memory % GIB != 0 {
        PartialVerdict::definitely_vm()
    } else {
        PartialVerdict::user(0.2)
    }
}

impl Probe for RamWholeGbSlots {
    fn name(&self) -> &str {
        super::RAM_WHOLE_GB_SLOTS
    }

    fn run(&self) -> PartialVerdict {
        match self.stats.total_memory_bytes() {
            Ok(total) => whole_gb_verdict(total),
            Err(e) => {
                debug!("Total memory unavailable: {}", e);
                PartialVerdict::neutral()
            }
        }
    }
}

/// Paired DIMMs give an even number of gigabytes. Not in the default battery.
pub struct RamEvenGbSlots {
    stats: Arc<dyn HostStats>,
}

impl RamEvenGbSlots {
    pub fn new(stats: Arc<dyn HostStats>) -> Self {
        Self { stats }
    }
}

pub fn even_gb_verdict(total_memory: u64) -> PartialVerdict {
    if (total_memory / GIB) % 2 != 0 {
        PartialVerdict::definitely_vm()
    } else {
        PartialVerdict::user(0.2)
    }
}

impl Probe for RamEvenGbSlots {
    fn name(&self) -> &str {
        super::RAM_EVEN_GB_SLOTS
    }

    fn run(&self) -> PartialVerdict {
        match self.stats.total_memory_bytes() {
            Ok(total) => even_gb_verdict(total),
            Err(e) => {
                debug!("Total memory unavailable: {}", e);
                PartialVerdict::neutral()
            }
        }
    }
}
