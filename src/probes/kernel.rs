use std::sync::Arc;

use log::debug;

use crate::host::CommandRunner;
use crate::probe::Probe;
use crate::verdict::PartialVerdict;

/// Counts VirtualBox guest and VME driver modules shipped with the running kernel.
pub const VM_MODULE_COMMAND: &str = r#"find /lib/modules/$(uname -r) -type f -name '*.ko*' 2>/dev/null | grep "vboxguest\|/vme/" | wc -l"#;

/// Guest driver modules are near proof of virtualization. POSIX only; on
/// other platforms the command fails and the probe has no opinion.
pub struct KernelModules {
    commands: Arc<dyn CommandRunner>,
}

impl KernelModules {
    pub fn new(commands: Arc<dyn CommandRunner>) -> Self {
        Self { commands }
    }
}

impl Probe for KernelModules {
    fn name(&self) -> &str {
        super::KERNEL_MODULES
    }

    fn run(&self) -> PartialVerdict {
        let output = match self.commands.run(VM_MODULE_COMMAND) {
            Ok(output) => output,
            Err(e) => {
                debug!("Kernel module lookup failed: {}", e);
                return PartialVerdict::neutral();
            }
        };
        // unparseable output counts as no modules found
        let suspect_modules: u64 = output.stdout.trim().parse().unwrap_or(0);
        debug!("Suspect kernel modules: {}", suspect_modules);
        if suspect_modules > 0 {
            PartialVerdict::definitely_vm()
        } else {
            PartialVerdict::user(0.8)
        }
    }
}
