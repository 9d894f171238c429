use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use vmcheck::engine::{self, Absolute, DecisionEngine};
use vmcheck::host::{
    CommandOutput, CommandRunner, Displays, Host, HostError, HostResult, HostStats, OpticalDrive,
    Platform, Storage,
};
use vmcheck::probe::{Battery, FnProbe, Probe};
use vmcheck::probes;
use vmcheck::verdict::PartialVerdict;

const GIB: u64 = 1024 * 1024 * 1024;

fn fixed(verdict: PartialVerdict) -> Box<dyn Probe> {
    FnProbe::boxed("fixed", move || verdict)
}

fn battery_of(verdicts: &[PartialVerdict]) -> Battery {
    verdicts.iter().copied().map(fixed).collect()
}

macro_rules! verdict_test {
    ($name:ident, [$($verdict:expr),* $(,)?], $is_vm:expr) => {
        #[test]
        fn $name() {
            let battery = battery_of(&[$($verdict),*]);
            assert_eq!(engine::classify(&battery), $is_vm);
        }
    };
}

// ── Short-circuit ──

verdict_test!(user_first_wins, [PartialVerdict::definitely_user(), PartialVerdict::definitely_vm()], false);
verdict_test!(vm_first_wins, [PartialVerdict::definitely_vm(), PartialVerdict::definitely_user()], true);
verdict_test!(
    user_overrides_heavy_vm_scores,
    [PartialVerdict::vm(10.0), PartialVerdict::definitely_user()],
    false
);
verdict_test!(
    vm_overrides_heavy_user_scores,
    [PartialVerdict::user(10.0), PartialVerdict::definitely_vm()],
    true
);

// ── Score accumulation ──

verdict_test!(empty_battery, [], false);
verdict_test!(all_neutral, [PartialVerdict::neutral(), PartialVerdict::neutral()], false);
verdict_test!(tie_is_physical, [PartialVerdict::vm(0.5), PartialVerdict::user(0.5)], false);
verdict_test!(vm_majority, [PartialVerdict::scored(0.8, 0.2), PartialVerdict::vm(0.7)], true);
verdict_test!(
    reference_mix_is_physical,
    [
        PartialVerdict::vm(0.7),
        PartialVerdict::vm(0.4),
        PartialVerdict::user(0.6),
        PartialVerdict::user(0.7),
        PartialVerdict::user(0.5),
    ],
    false
);

#[test]
fn later_probes_are_not_invoked_after_short_circuit() {
    for (absolute, expected) in [
        (PartialVerdict::definitely_user(), false),
        (PartialVerdict::definitely_vm(), true),
    ] {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let battery: Battery = vec![
            FnProbe::boxed("weak", || PartialVerdict::user(0.2)),
            FnProbe::boxed("absolute", move || absolute),
            FnProbe::boxed("spy", move || {
                counter.fetch_add(1, Ordering::SeqCst);
                PartialVerdict::neutral()
            }),
        ];

        let evaluation = DecisionEngine::new(battery).evaluate();
        assert_eq!(evaluation.is_vm, expected);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(evaluation.results.len(), 2);
        assert_eq!(evaluation.decided_by.unwrap().probe, "absolute");
    }
}

#[test]
fn accumulation_ignores_order() {
    let verdicts = [
        PartialVerdict::vm(0.7),
        PartialVerdict::user(0.6),
        PartialVerdict::scored(0.8, 0.2),
        PartialVerdict::user(0.9),
        PartialVerdict::neutral(),
    ];
    let expected = engine::classify(&battery_of(&verdicts));

    let mut rotated = verdicts.to_vec();
    for _ in 0..verdicts.len() {
        rotated.rotate_left(1);
        assert_eq!(engine::classify(&battery_of(&rotated)), expected);
        let reversed: Vec<_> = rotated.iter().rev().copied().collect();
        assert_eq!(engine::classify(&battery_of(&reversed)), expected);
    }
}

// ── Real probes against scripted collaborators ──

#[derive(Default)]
struct CountingDisplays {
    count: usize,
    bounds: (u32, u32),
    bounds_calls: AtomicUsize,
}

impl Displays for CountingDisplays {
    fn count(&self) -> HostResult<usize> {
        Ok(self.count)
    }

    fn primary_bounds(&self) -> HostResult<(u32, u32)> {
        self.bounds_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.bounds)
    }
}

struct Machine {
    uptime: u64,
    memory: u64,
    free: u64,
    modules: &'static str,
    optical: bool,
}

impl HostStats for Machine {
    fn uptime_seconds(&self) -> HostResult<u64> {
        Ok(self.uptime)
    }

    fn total_memory_bytes(&self) -> HostResult<u64> {
        Ok(self.memory)
    }
}

impl Storage for Machine {
    fn available_bytes(&self, _path: &std::path::Path) -> HostResult<u64> {
        Ok(self.free)
    }
}

impl CommandRunner for Machine {
    fn run(&self, _command: &str) -> HostResult<CommandOutput> {
        Ok(CommandOutput {
            stdout: self.modules.to_string(),
            stderr: String::new(),
        })
    }
}

impl OpticalDrive for Machine {
    fn detect(&self) -> HostResult<()> {
        if self.optical { Ok(()) } else { Err(HostError::DeviceNotFound) }
    }
}

fn host(displays: Arc<CountingDisplays>, machine: Machine) -> Host {
    let machine = Arc::new(machine);
    Host {
        platform: Platform::detect().with_system_volume(PathBuf::from("/")),
        displays,
        stats: machine.clone(),
        storage: machine.clone(),
        commands: machine.clone(),
        optical: machine,
    }
}

fn desktop() -> Machine {
    Machine {
        uptime: 3 * 60 * 60,
        memory: 16 * GIB,
        free: 800 * GIB,
        modules: "0",
        optical: false,
    }
}

fn default_battery(host: &Host) -> Battery {
    let names: Vec<String> = probes::DEFAULT_BATTERY.iter().map(|n| n.to_string()).collect();
    probes::battery(&names, host).unwrap()
}

#[test]
fn two_displays_short_circuit_before_aspect_ratio() {
    let displays = Arc::new(CountingDisplays { count: 2, bounds: (1920, 1080), ..Default::default() });
    let host = host(displays.clone(), desktop());
    let battery = vec![
        probes::build(probes::MULTIPLE_SCREENS, &host).unwrap(),
        probes::build(probes::ASPECT_RATIO, &host).unwrap(),
    ];

    let evaluation = engine::evaluate(&battery);
    assert!(!evaluation.is_vm);
    assert_eq!(evaluation.decided_by.unwrap().verdict, Absolute::User);
    assert_eq!(displays.bounds_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn desktop_with_one_display_is_physical() {
    let displays = Arc::new(CountingDisplays { count: 1, bounds: (2560, 1440), ..Default::default() });
    let evaluation = DecisionEngine::new(default_battery(&host(displays, desktop()))).evaluate();

    assert!(!evaluation.is_vm);
    assert!(evaluation.decided_by.is_none());
    assert_eq!(evaluation.results.len(), 8);
    // 0.9 + 0.8 + 0.6 + 0.7 + 0.2 + 0.5 + 0.8 user against 0.2 vm
    assert!((evaluation.accumulated.score_user - 4.5).abs() < 1e-9);
    assert!((evaluation.accumulated.score_vm - 0.2).abs() < 1e-9);
}

#[test]
fn guest_modules_end_the_pass() {
    let displays = Arc::new(CountingDisplays { count: 1, bounds: (1920, 1200), ..Default::default() });
    let machine = Machine { modules: "3", ..desktop() };
    let evaluation = DecisionEngine::new(default_battery(&host(displays, machine))).evaluate();

    assert!(evaluation.is_vm);
    let decided = evaluation.decided_by.unwrap();
    assert_eq!(decided.probe, probes::KERNEL_MODULES);
    assert_eq!(decided.verdict, Absolute::Vm);
    assert_eq!(evaluation.results.len(), 3);
}

#[test]
fn odd_console_resolution_is_vm() {
    let displays = Arc::new(CountingDisplays { count: 1, bounds: (1280, 800 + 7), ..Default::default() });
    let evaluation = DecisionEngine::new(default_battery(&host(displays, desktop()))).evaluate();
    assert!(evaluation.is_vm);
    assert_eq!(evaluation.decided_by.unwrap().probe, probes::ASPECT_RATIO);
}

#[test]
fn small_disk_is_vm() {
    let displays = Arc::new(CountingDisplays { count: 1, bounds: (1920, 1080), ..Default::default() });
    let machine = Machine { free: 60 * GIB, ..desktop() };
    let evaluation = DecisionEngine::new(default_battery(&host(displays, machine))).evaluate();
    assert!(evaluation.is_vm);
    assert_eq!(evaluation.decided_by.unwrap().probe, probes::AVAILABLE_DISK_SPACE);
}

#[test]
fn evaluation_serializes_for_reports() {
    let evaluation = engine::evaluate(&battery_of(&[PartialVerdict::vm(0.7), PartialVerdict::definitely_vm()]));
    let json = serde_json::to_value(&evaluation).unwrap();
    assert_eq!(json["is_vm"], true);
    assert_eq!(json["decided_by"]["verdict"], "vm");
    assert_eq!(json["results"].as_array().unwrap().len(), 2);
    assert_eq!(json["accumulated"]["score_vm"], 0.7);
}
