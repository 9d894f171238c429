use std::fs;
use std::io;
use std::path::PathBuf;

use crate::host::{HostError, HostResult, OpticalDrive};

pub const CDROM_DEVICE: &str = "/dev/cdrom";

/// Optical drive presence via the `/dev/cdrom` device node.
#[derive(Debug, Clone)]
pub struct DevCdrom {
    path: PathBuf,
}

impl Default for DevCdrom {
    fn default() -> Self {
        Self::at(CDROM_DEVICE)
    }
}

impl DevCdrom {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl OpticalDrive for DevCdrom {
    fn detect(&self) -> HostResult<()> {
        match fs::metadata(&self.path) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(HostError::DeviceNotFound),
            Err(e) => Err(e.into()),
        }
    }
}
