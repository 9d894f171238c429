use log::{debug, info};

use crate::probe::{Battery, Probe};
use crate::verdict::{AccumulatedVerdict, PartialVerdict};

/// Which side an absolute verdict came down on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Absolute {
    User,
    Vm,
}

/// The probe that ended evaluation early.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ShortCircuit {
    pub probe: String,
    pub verdict: Absolute,
}

/// One executed probe and what it said.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ProbeResult {
    pub probe: String,
    pub verdict: PartialVerdict,
}

/// Outcome of a full engine pass with enough detail to explain it.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Evaluation {
    pub is_vm: bool,
    pub decided_by: Option<ShortCircuit>,
    pub accumulated: AccumulatedVerdict,
    /// Probes that actually ran, in order. Probes after a short-circuit are absent.
    pub results: Vec<ProbeResult>,
}

/// Runs a battery of probes and renders the final classification.
pub struct DecisionEngine {
    battery: Battery,
}

impl DecisionEngine {
    pub fn new(battery: Battery) -> Self {
        Self { battery }
    }

    pub fn battery(&self) -> &[Box<dyn Probe>] {
        &self.battery
    }

    /// `true` when the host is classified as a VM.
    pub fn classify(&self) -> bool {
        evaluate(&self.battery).is_vm
    }

    pub fn evaluate(&self) -> Evaluation {
        evaluate(&self.battery)
    }
}

/// Classify with a borrowed battery.
pub fn classify(battery: &[Box<dyn Probe>]) -> bool {
    evaluate(battery).is_vm
}

/// Invoke probes strictly in order.
///
/// A `definitely_user` verdict stops the pass with `false`, then a
/// `definitely_vm` verdict stops it with `true`. Later probes are never run.
/// Without a short-circuit the accumulated VM score must strictly exceed the
/// user score.
pub fn evaluate(battery: &[Box<dyn Probe>]) -> Evaluation {
    let mut accumulated = AccumulatedVerdict::default();
    let mut results = Vec::with_capacity(battery.len());

    for probe in battery {
        let verdict = probe.run();
        debug!("probe {}: {}", probe.name(), verdict);
        results.push(ProbeResult {
            probe: probe.name().to_string(),
            verdict,
        });

        let absolute = if verdict.definitely_user {
            Some(Absolute::User)
        } else if verdict.definitely_vm {
            Some(Absolute::Vm)
        } else {
            None
        };

        if let Some(absolute) = absolute {
            info!(
                "Probe {} is conclusive ({:?}); skipping {} remaining probe(s)",
                probe.name(),
                absolute,
                battery.len() - results.len()
            );
            return Evaluation {
                is_vm: absolute == Absolute::Vm,
                decided_by: Some(ShortCircuit {
                    probe: probe.name().to_string(),
                    verdict: absolute,
                }),
                accumulated,
                results,
            };
        }

        accumulated = accumulated + verdict;
    }

    let is_vm = accumulated.leans_vm();
    info!(
        "No conclusive probe; vm {:.2} vs user {:.2} => {}",
        accumulated.score_vm,
        accumulated.score_user,
        if is_vm { "vm" } else { "user" }
    );
    Evaluation {
        is_vm,
        decided_by: None,
        accumulated,
        results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::FnProbe;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn spy(name: &str, verdict: PartialVerdict, calls: &Arc<AtomicUsize>) -> Box<dyn Probe> {
        let calls = Arc::clone(calls);
        FnProbe::boxed(name.to_string(), move || {
            calls.fetch_add(1, Ordering::SeqCst);
            verdict
        })
    }

    #[test]
    fn empty_battery_is_not_vm() {
        let eval = evaluate(&[]);
        assert!(!eval.is_vm);
        assert!(eval.decided_by.is_none());
        assert!(eval.results.is_empty());
    }

    #[test]
    fn definitely_user_stops_the_pass() {
        let later = Arc::new(AtomicUsize::new(0));
        let battery = vec![
            FnProbe::boxed("weak", || PartialVerdict::vm(5.0)),
            FnProbe::boxed("user", PartialVerdict::definitely_user),
            spy("vm", PartialVerdict::definitely_vm(), &later),
        ];

        let eval = evaluate(&battery);
        assert!(!eval.is_vm);
        assert_eq!(later.load(Ordering::SeqCst), 0);
        assert_eq!(
            eval.decided_by,
            Some(ShortCircuit { probe: "user".into(), verdict: Absolute::User })
        );
        assert_eq!(eval.results.len(), 2);
        assert_eq!(eval.accumulated, PartialVerdict::vm(5.0));
    }

    #[test]
    fn definitely_vm_stops_the_pass() {
        let later = Arc::new(AtomicUsize::new(0));
        let battery = vec![
            FnProbe::boxed("weak", || PartialVerdict::user(5.0)),
            FnProbe::boxed("vm", PartialVerdict::definitely_vm),
            spy("user", PartialVerdict::definitely_user(), &later),
        ];

        assert!(classify(&battery));
        assert_eq!(later.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn user_flag_wins_over_vm_flag_in_same_verdict() {
        let battery = vec![FnProbe::boxed("both", || PartialVerdict {
            definitely_vm: true,
            definitely_user: true,
            ..PartialVerdict::default()
        })];
        assert!(!classify(&battery));
    }

    #[test]
    fn scores_decide_without_absolute_signal() {
        let battery = vec![
            FnProbe::boxed("a", || PartialVerdict::vm(0.7)),
            FnProbe::boxed("b", || PartialVerdict::user(0.6)),
        ];
        let eval = evaluate(&battery);
        assert!(eval.is_vm);
        assert!(eval.decided_by.is_none());
        assert_eq!(eval.results.len(), 2);
    }

    #[test]
    fn tie_is_not_vm() {
        let battery = vec![
            FnProbe::boxed("a", || PartialVerdict::scored(0.5, 0.25)),
            FnProbe::boxed("b", || PartialVerdict::user(0.25)),
        ];
        assert!(!classify(&battery));
    }

    #[test]
    fn every_probe_runs_once_without_short_circuit() {
        let calls = Arc::new(AtomicUsize::new(0));
        let engine = DecisionEngine::new(vec![
            spy("a", PartialVerdict::vm(0.1), &calls),
            spy("b", PartialVerdict::neutral(), &calls),
            spy("c", PartialVerdict::user(0.1), &calls),
        ]);
        engine.classify();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(engine.battery().len(), 3);
    }
}
