use winapi::um::winuser::{GetSystemMetrics, SM_CMONITORS, SM_CXSCREEN, SM_CYSCREEN};

use crate::host::{Displays, HostError, HostResult};

/// Display facts from `GetSystemMetrics`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Win32Displays;

impl Displays for Win32Displays {
    fn count(&self) -> HostResult<usize> {
        let monitors = unsafe { GetSystemMetrics(SM_CMONITORS) };
        Ok(monitors.max(0) as usize)
    }

    fn primary_bounds(&self) -> HostResult<(u32, u32)> {
        let (width, height) = unsafe { (GetSystemMetrics(SM_CXSCREEN), GetSystemMetrics(SM_CYSCREEN)) };
        // GetSystemMetrics returns 0 on failure
        if width <= 0 || height <= 0 {
            return Err(HostError::Unavailable("primary display metrics".to_string()));
        }
        Ok((width as u32, height as u32))
    }
}
