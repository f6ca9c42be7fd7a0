//! Checkpoint results, the scorecard, and the final verdict.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Total score at or above this value is a PASSED verdict.
///
/// A single tunable constant, deliberately not derived from the
/// category maxima.
pub const PASS_THRESHOLD: i32 = 80;

/// Outcome of one checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckpointStatus {
    Passed,
    Failed,
    Warning,
}

/// One scored validation rule within an evaluation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointResult {
    /// Checkpoint name (e.g. "skill_invocation").
    pub name: String,

    pub status: CheckpointStatus,

    /// Human-readable outcome summary.
    pub message: String,

    /// Optional structured payload (e.g. fetched pages).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl CheckpointResult {
    pub fn passed(name: &str, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status: CheckpointStatus::Passed,
            message: message.into(),
            details: None,
        }
    }

    pub fn failed(name: &str, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status: CheckpointStatus::Failed,
            message: message.into(),
            details: None,
        }
    }

    pub fn warning(name: &str, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status: CheckpointStatus::Warning,
            message: message.into(),
            details: None,
        }
    }

    /// Attach a structured details payload.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// The five-category point accumulator plus derived total.
///
/// `security` can go negative (per-violation penalties are not
/// clamped) and `usability` is a reserved slot no checkpoint writes;
/// both are kept as documented behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreCard {
    pub accuracy: i32,
    pub security: i32,
    pub efficiency: i32,
    pub currency: i32,
    pub usability: i32,

    /// Sum of the five categories; only valid after [`finalize`].
    ///
    /// [`finalize`]: ScoreCard::finalize
    pub total: i32,
}

impl ScoreCard {
    /// Recompute `total` from the category values.
    ///
    /// Called once when the evaluation completes; the running total is
    /// never trusted mid-run.
    pub fn finalize(&mut self) {
        self.total = self.accuracy + self.security + self.efficiency + self.currency + self.usability;
    }
}

/// Nominal category ceilings, reported alongside the scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaxScores {
    pub accuracy: i32,
    pub security: i32,
    pub efficiency: i32,
    pub currency: i32,
    pub usability: i32,
}

impl Default for MaxScores {
    fn default() -> Self {
        Self {
            accuracy: 40,
            security: 20,
            efficiency: 15,
            currency: 15,
            usability: 10,
        }
    }
}

/// Pass/fail verdict for one evaluated run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VerdictStatus {
    Passed,
    Failed,
}

impl VerdictStatus {
    /// Derive the verdict from a finalized total.
    pub fn from_total(total: i32) -> Self {
        if total >= PASS_THRESHOLD {
            VerdictStatus::Passed
        } else {
            VerdictStatus::Failed
        }
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, VerdictStatus::Passed)
    }

    /// Lowercase form persisted into the execution record.
    pub fn record_str(&self) -> &'static str {
        match self {
            VerdictStatus::Passed => "passed",
            VerdictStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for VerdictStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerdictStatus::Passed => write!(f, "PASSED"),
            VerdictStatus::Failed => write!(f, "FAILED"),
        }
    }
}

/// Final output of one evaluation run. Immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerdictReport {
    pub status: VerdictStatus,

    pub scores: ScoreCard,

    pub max_scores: MaxScores,

    /// Checkpoint records in evaluation order.
    pub checkpoints: Vec<CheckpointResult>,

    /// Collected failure diagnostics in emission order.
    pub failures: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scorecard_finalize_sums_categories() {
        let mut scores = ScoreCard {
            accuracy: 25,
            security: 20,
            efficiency: 5,
            currency: 11,
            usability: 0,
            total: 999, // stale value must be overwritten
        };
        scores.finalize();
        assert_eq!(scores.total, 61);
    }

    #[test]
    fn test_scorecard_negative_security_sums() {
        let mut scores = ScoreCard {
            accuracy: 40,
            security: -40,
            ..Default::default()
        };
        scores.finalize();
        assert_eq!(scores.total, 0);
    }

    #[test]
    fn test_verdict_threshold_inclusive() {
        assert_eq!(VerdictStatus::from_total(80), VerdictStatus::Passed);
        assert_eq!(VerdictStatus::from_total(79), VerdictStatus::Failed);
        assert_eq!(VerdictStatus::from_total(-20), VerdictStatus::Failed);
    }

    #[test]
    fn test_verdict_status_serialization() {
        assert_eq!(
            serde_json::to_string(&VerdictStatus::Passed).expect("serialize"),
            "\"PASSED\""
        );
        assert_eq!(VerdictStatus::Passed.record_str(), "passed");
        assert_eq!(VerdictStatus::Failed.to_string(), "FAILED");
    }

    #[test]
    fn test_checkpoint_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&CheckpointStatus::Warning).expect("serialize"),
            "\"warning\""
        );
    }
}
