use std::sync::Arc;

use log::debug;

use crate::host::{NO_SUCH_FILE_OR_DIRECTORY, OpticalDrive};
use crate::probe::Probe;
use crate::verdict::PartialVerdict;

/// Hypervisors attach a virtual CD-ROM by default; modern desktops lack one.
pub struct OpticalDriveAbsence {
    optical: Arc<dyn OpticalDrive>,
}

impl OpticalDriveAbsence {
    pub fn new(optical: Arc<dyn OpticalDrive>) -> Self {
        Self { optical }
    }
}

impl Probe for OpticalDriveAbsence {
    fn name(&self) -> &str {
        super::OPTICAL_DRIVE_ABSENCE
    }

    fn run(&self) -> PartialVerdict {
        // only the exact "not found" message counts as absent
        match self.optical.detect() {
            Err(e) if e.to_string() == NO_SUCH_FILE_OR_DIRECTORY => PartialVerdict::scored(0.2, 0.8),
            Err(e) => {
                debug!("Optical drive detection failed: {}", e);
                PartialVerdict::scored(0.8, 0.2)
            }
            Ok(()) => PartialVerdict::scored(0.8, 0.2),
        }
    }
}
