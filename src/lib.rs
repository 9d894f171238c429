//! vmcheck: classify the host as a virtual machine or a physical user machine.
//!
//! A battery of [`probe::Probe`]s each inspects one host property and returns a
//! [`verdict::PartialVerdict`]. The [`engine::DecisionEngine`] runs them in
//! order. Any absolute verdict ends the pass immediately. Otherwise the
//! weighted scores are summed and compared.
//!
//! - **[`verdict`]**: partial verdicts and their merge.
//! - **[`probe`]**: the probe trait and closure-backed probes.
//! - **[`engine`]**: short-circuit evaluation and score accumulation.
//! - **[`probes`]**: the concrete host probes and the default battery.
//! - **[`host`]**: collaborator traits that fetch raw host facts.
//! - **[`system`]**: real collaborators backed by sysinfo, sysfs, Win32 and bash.
//! - **[`config`]**: YAML configuration with env overrides.

pub mod config;
pub mod engine;
pub mod host;
pub mod probe;
pub mod probes;
pub mod system;
pub mod verdict;

#[cfg(target_os = "linux")]
pub mod linux;
#[cfg(target_os = "windows")]
pub mod windows;

use std::time::Duration;

/// Classify the running host with the default battery.
///
/// Must be called from outside an async context. The kernel module probe
/// drives its shell command on a private runtime whose worker owns the
/// IO and timer drivers.
pub fn classify() -> bool {
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            log::warn!("Could not start runtime for command probes: {}", e);
            return engine::classify(&[]);
        }
    };
    let host = host::Host::system(
        host::Platform::detect(),
        Duration::from_secs(config::DEFAULT_COMMAND_TIMEOUT_SECS),
        runtime.handle().clone(),
    );
    let names: Vec<String> = probes::DEFAULT_BATTERY.iter().map(|n| n.to_string()).collect();
    match probes::battery(&names, &host) {
        Ok(battery) => engine::DecisionEngine::new(battery).classify(),
        Err(e) => {
            log::error!("Default battery failed to build: {}", e);
            false
        }
    }
}
