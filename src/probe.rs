use crate::verdict::PartialVerdict;

/// A single host check.
///
/// Implementations must absorb failures of their underlying host query and
/// degrade to [`PartialVerdict::neutral`] (or their documented fallback);
/// the engine performs no error handling of its own.
pub trait Probe: Send + Sync {
    /// Stable identifier used in config, logs and reports.
    fn name(&self) -> &str;

    /// Inspect the host and return this probe's opinion.
    fn run(&self) -> PartialVerdict;
}

/// Ordered list of probes handed to the engine.
pub type Battery = Vec<Box<dyn Probe>>;

/// A probe backed by a named closure.
pub struct FnProbe<F> {
    name: String,
    check: F,
}

impl<F> FnProbe<F>
where
    F: Fn() -> PartialVerdict + Send + Sync,
{
    pub fn new(name: impl Into<String>, check: F) -> Self {
        Self { name: name.into(), check }
    }

    /// Box the probe for direct use in a [`Battery`].
    pub fn boxed(name: impl Into<String>, check: F) -> Box<dyn Probe>
    where
        F: 'static,
    {
        Box::new(Self::new(name, check))
    }
}

impl<F> Probe for FnProbe<F>
where
    F: Fn() -> PartialVerdict + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self) -> PartialVerdict {
        (self.check)()
    }
}
