use log::debug;
use serde::Deserialize;
use wmi::{COMLibrary, WMIConnection};

use crate::host::{HostError, HostResult, OpticalDrive};

#[derive(Deserialize)]
#[serde(rename = "Win32_CDROMDrive")]
#[serde(rename_all = "PascalCase")]
struct CdromDrive {
    drive: Option<String>,
}

/// Optical drive presence via the `Win32_CDROMDrive` WMI class.
#[derive(Debug, Clone, Copy, Default)]
pub struct WmiCdrom;

impl OpticalDrive for WmiCdrom {
    fn detect(&self) -> HostResult<()> {
        let com = COMLibrary::new().map_err(|e| HostError::Other(format!("COM init failed: {e}")))?;
        let conn = WMIConnection::new(com.into())
            .map_err(|e| HostError::Other(format!("WMI connection failed: {e}")))?;
        let drives: Vec<CdromDrive> = conn
            .query()
            .map_err(|e| HostError::Other(format!("WMI query failed: {e}")))?;
        let letters: Vec<&str> = drives.iter().filter_map(|d| d.drive.as_deref()).collect();
        debug!("WMI reported {} optical drive(s): {:?}", drives.len(), letters);
        if drives.is_empty() {
            return Err(HostError::DeviceNotFound);
        }
        Ok(())
    }
}
