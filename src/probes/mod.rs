//! Concrete host probes and the default battery.
//!
//! Each probe turns one raw host fact into a [`PartialVerdict`]. A failed
//! host query never escapes a probe; it becomes the probe's fallback verdict.
//!
//! [`PartialVerdict`]: crate::verdict::PartialVerdict

pub mod disk;
pub mod display;
pub mod kernel;
pub mod memory;
pub mod optical;
pub mod uptime;

#[cfg(test)]
pub(crate) mod fakes;

use std::sync::Arc;

use crate::config::ConfigError;
use crate::host::Host;
use crate::probe::{Battery, Probe};

pub use disk::{AvailableDiskSpace, RamVsDiskSpace};
pub use display::{AspectRatio, MultipleScreens};
pub use kernel::KernelModules;
pub use memory::{RamEvenGbSlots, RamWholeGbSlots};
pub use optical::OpticalDriveAbsence;
pub use uptime::Uptime;

pub const MULTIPLE_SCREENS: &str = "multiple_screens";
pub const ASPECT_RATIO: &str = "aspect_ratio";
pub const KERNEL_MODULES: &str = "kernel_modules";
pub const UPTIME: &str = "uptime";
pub const AVAILABLE_DISK_SPACE: &str = "available_disk_space";
pub const RAM_WHOLE_GB_SLOTS: &str = "ram_whole_gb_slots";
pub const RAM_VS_DISK_SPACE: &str = "ram_vs_disk_space";
pub const OPTICAL_DRIVE_ABSENCE: &str = "optical_drive_absence";
pub const RAM_EVEN_GB_SLOTS: &str = "ram_even_gb_slots";

/// Probes run when nothing else is configured, in evaluation order.
pub const DEFAULT_BATTERY: [&str; 8] = [
    MULTIPLE_SCREENS,
    ASPECT_RATIO,
    KERNEL_MODULES,
    UPTIME,
    AVAILABLE_DISK_SPACE,
    RAM_WHOLE_GB_SLOTS,
    RAM_VS_DISK_SPACE,
    OPTICAL_DRIVE_ABSENCE,
];

/// Every probe that can be named in a battery.
pub const ALL_PROBES: [&str; 9] = [
    MULTIPLE_SCREENS,
    ASPECT_RATIO,
    KERNEL_MODULES,
    UPTIME,
    AVAILABLE_DISK_SPACE,
    RAM_WHOLE_GB_SLOTS,
    RAM_VS_DISK_SPACE,
    OPTICAL_DRIVE_ABSENCE,
    RAM_EVEN_GB_SLOTS,
];

pub fn is_known(name: &str) -> bool {
    ALL_PROBES.contains(&name)
}

/// Build a single probe by name, wired to the host's collaborators.
pub fn build(name: &str, host: &Host) -> Option<Box<dyn Probe>> {
    let volume = host.platform.system_volume.clone();
    let probe: Box<dyn Probe> = match name {
        MULTIPLE_SCREENS => Box::new(MultipleScreens::new(Arc::clone(&host.displays))),
        ASPECT_RATIO => Box::new(AspectRatio::new(Arc::clone(&host.displays))),
        KERNEL_MODULES => Box::new(KernelModules::new(Arc::clone(&host.commands))),
        UPTIME => Box::new(Uptime::new(Arc::clone(&host.stats))),
        AVAILABLE_DISK_SPACE => Box::new(AvailableDiskSpace::new(Arc::clone(&host.storage), volume)),
        RAM_WHOLE_GB_SLOTS => Box::new(RamWholeGbSlots::new(Arc::clone(&host.stats))),
        RAM_VS_DISK_SPACE => Box::new(RamVsDiskSpace::new(
            Arc::clone(&host.stats),
            Arc::clone(&host.storage),
            volume,
        )),
        OPTICAL_DRIVE_ABSENCE => Box::new(OpticalDriveAbsence::new(Arc::clone(&host.optical))),
        RAM_EVEN_GB_SLOTS => Box::new(RamEvenGbSlots::new(Arc::clone(&host.stats))),
        _ => return None,
    };
    Some(probe)
}

/// Build an ordered battery. Unknown names are rejected.
pub fn battery(names: &[String], host: &Host) -> Result<Battery, ConfigError> {
    names
        .iter()
        .map(|name| build(name, host).ok_or_else(|| ConfigError::UnknownProbe(name.clone())))
        .collect()
}
