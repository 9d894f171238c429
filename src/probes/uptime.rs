use std::sync::Arc;

use log::debug;

use crate::host::HostStats;
use crate::probe::Probe;
use crate::verdict::PartialVerdict;

/// Below this the machine was probably just spun up.
pub const FRESH_BOOT_SECS: u64 = 10 * 60;
/// Above this the machine is rarely a desktop someone shuts down.
pub const LONG_UPTIME_SECS: u64 = 2 * 24 * 60 * 60;

/// Very short and very long uptimes are suspicious.
pub struct Uptime {
    stats: Arc<dyn HostStats>,
}

impl Uptime {
    pub fn new(stats: Arc<dyn HostStats>) -> Self {
        Self { stats }
    }
}

pub fn uptime_verdict(secs: u64) -> PartialVerdict {
    if secs < FRESH_BOOT_SECS {
        PartialVerdict::vm(0.7)
    } else if secs > LONG_UPTIME_SECS {
        PartialVerdict::vm(0.4)
    } else {
        PartialVerdict::user(0.6)
    }
}

impl Probe for Uptime {
    fn name(&self) -> &str {
        super::UPTIME
    }

    fn run(&self) -> PartialVerdict {
        match self.stats.uptime_seconds() {
            Ok(secs) => uptime_verdict(secs),
            Err(e) => {
                debug!("Uptime unavailable: {}", e);
                PartialVerdict::neutral()
            }
        }
    }
}
