use std::sync::Arc;

use log::debug;

use crate::host::Displays;
use crate::probe::Probe;
use crate::verdict::PartialVerdict;

/// Absolute tolerance for comparing aspect ratios.
pub const FLOAT_EQUALITY_THRESHOLD: f64 = 1e-9;

/// Ratios found on real monitors: 16:10, 16:9, 4:3, 3:2, 32:9.
pub const COMMON_ASPECT_RATIOS: [(f64, f64); 5] =
    [(16.0, 10.0), (16.0, 9.0), (4.0, 3.0), (3.0, 2.0), (32.0, 9.0)];

fn are_floats_equal(a: f64, b: f64) -> bool {
    (a - b).abs() <= FLOAT_EQUALITY_THRESHOLD
}

/// More than one active display means a person is sitting at it.
pub struct MultipleScreens {
    displays: Arc<dyn Displays>,
}

impl MultipleScreens {
    pub fn new(displays: Arc<dyn Displays>) -> Self {
        Self { displays }
    }
}

impl Probe for MultipleScreens {
    fn name(&self) -> &str {
        super::MULTIPLE_SCREENS
    }

    fn run(&self) -> PartialVerdict {
        match self.displays.count() {
            Ok(count) if count > 1 => PartialVerdict::definitely_user(),
            Ok(_) => PartialVerdict::neutral(),
            Err(e) => {
                debug!("Display count unavailable: {}", e);
                PartialVerdict::neutral()
            }
        }
    }
}

/// Odd resolutions on the primary display are typical of VM consoles.
pub struct AspectRatio {
    displays: Arc<dyn Displays>,
}

impl AspectRatio {
    pub fn new(displays: Arc<dyn Displays>) -> Self {
        Self { displays }
    }
}

pub fn ratio_verdict(ratio: f64) -> PartialVerdict {
    let common = COMMON_ASPECT_RATIOS
        .iter()
        .any(|(w, h)| are_floats_equal(ratio, w / h));
    if common {
        PartialVerdict::user(0.9)
    } else {
        PartialVerdict::definitely_vm()
    }
}

impl Probe for AspectRatio {
    fn name(&self) -> &str {
        super::ASPECT_RATIO
    }

    fn run(&self) -> PartialVerdict {
        let (width, height) = match self.displays.primary_bounds() {
            Ok(bounds) => bounds,
            Err(e) => {
                debug!("Primary display bounds unavailable: {}", e);
                return PartialVerdict::neutral();
            }
        };
        if height == 0 {
            debug!("Primary display reports zero height ({}x{})", width, height);
            return PartialVerdict::neutral();
        }
        ratio_verdict(f64::from(width) / f64::from(height))
    }
}
