use std::ops::Add;

/// The opinion of a single probe about the host.
///
/// At most one absolute flag is set. When one is, the scores are zero and
/// never consulted.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize)]
pub struct PartialVerdict {
    pub definitely_vm: bool,
    pub definitely_user: bool,
    pub score_vm: f64,
    pub score_user: f64,
}

/// Running sum of every non-absolute verdict seen so far.
pub type AccumulatedVerdict = PartialVerdict;

impl PartialVerdict {
    /// No opinion.
    pub fn neutral() -> Self {
        Self::default()
    }

    pub fn definitely_vm() -> Self {
        Self { definitely_vm: true, ..Self::default() }
    }

    pub fn definitely_user() -> Self {
        Self { definitely_user: true, ..Self::default() }
    }

    pub fn vm(score: f64) -> Self {
        Self::scored(score, 0.0)
    }

    pub fn user(score: f64) -> Self {
        Self::scored(0.0, score)
    }

    /// Weighted verdict; negative weights are clamped to zero.
    pub fn scored(score_vm: f64, score_user: f64) -> Self {
        Self {
            score_vm: score_vm.max(0.0),
            score_user: score_user.max(0.0),
            ..Self::default()
        }
    }

    pub fn is_absolute(&self) -> bool {
        self.definitely_vm || self.definitely_user
    }

    pub fn is_neutral(&self) -> bool {
        *self == Self::neutral()
    }

    /// Point-wise merge: flags are OR-ed, scores are summed.
    pub fn combine(self, other: Self) -> Self {
        Self {
            definitely_vm: self.definitely_vm || other.definitely_vm,
            definitely_user: self.definitely_user || other.definitely_user,
            score_vm: self.score_vm + other.score_vm,
            score_user: self.score_user + other.score_user,
        }
    }

    /// Final decision over accumulated scores. A tie is not a VM.
    pub fn leans_vm(&self) -> bool {
        self.score_vm > self.score_user
    }
}

impl Add for PartialVerdict {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        self.combine(other)
    }
}

impl std::fmt::Display for PartialVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.definitely_user {
            write!(f, "definitely user")
        } else if self.definitely_vm {
            write!(f, "definitely vm")
        } else if self.is_neutral() {
            write!(f, "no opinion")
        } else {
            write!(f, "vm {:.2} / user {:.2}", self.score_vm, self.score_user)
        }
    }
}
