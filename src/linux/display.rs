use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::host::{Displays, HostError, HostResult};

pub const DRM_CLASS_PATH: &str = "/sys/class/drm";

/// Active displays read from DRM connectors in sysfs.
///
/// A connector counts when its `status` is `connected` and it is not
/// `disabled`. The first such connector (by name) is the primary display.
///
/// Sysfs does not expose the mode a connector is currently driven at, so the
/// bounds are its preferred mode (the first line of `modes`). A console set
/// to a different resolution than its preferred one reports the preferred one.
#[derive(Debug, Clone)]
pub struct SysfsDisplays {
    root: PathBuf,
}

impl Default for SysfsDisplays {
    fn default() -> Self {
        Self::with_root(DRM_CLASS_PATH)
    }
}

impl SysfsDisplays {
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn active_connectors(&self) -> HostResult<Vec<PathBuf>> {
        let mut connectors = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            // card0 is the device, card0-HDMI-A-1 a connector on it
            if !name.starts_with("card") || !name.contains('-') {
                continue;
            }
            let path = entry.path();
            let status = read_trimmed(&path.join("status"));
            let enabled = read_trimmed(&path.join("enabled"));
            if status == "connected" && enabled != "disabled" {
                debug!("Active display connector: {}", name);
                connectors.push(path);
            }
        }
        connectors.sort();
        Ok(connectors)
    }
}

impl Displays for SysfsDisplays {
    fn count(&self) -> HostResult<usize> {
        Ok(self.active_connectors()?.len())
    }

    fn primary_bounds(&self) -> HostResult<(u32, u32)> {
        let connectors = self.active_connectors()?;
        let primary = connectors
            .first()
            .ok_or_else(|| HostError::Unavailable("active display".to_string()))?;
        let modes = fs::read_to_string(primary.join("modes"))?;
        modes
            .lines()
            .next()
            .and_then(parse_mode)
            .ok_or_else(|| HostError::Unavailable(format!("mode of {}", primary.display())))
    }
}

fn read_trimmed(path: &Path) -> String {
    fs::read_to_string(path)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// Parse a DRM mode line such as `1920x1080` or `1920x1080i`.
fn parse_mode(line: &str) -> Option<(u32, u32)> {
    let (w, h) = line.trim().split_once('x')?;
    let h: String = h.chars().take_while(|c| c.is_ascii_digit()).collect();
    Some((w.parse().ok()?, h.parse().ok()?))
}
