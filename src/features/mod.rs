pub mod brand;
pub mod heuristics;
pub mod ml;
pub mod threat_intel;
pub mod tld_risk;

use crate::verdict::Verdict;
use serde::{Deserialize, Serialize};

/// Severity ladder shared by every detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// One detector finding: a human-readable message plus its score
/// contribution. Signals are the only channel a detector has to influence
/// the aggregate score and the flag list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub category: String,
    pub severity: Severity,
    pub message: String,
    pub score_delta: i32,
}

impl Signal {
    pub fn new(category: &str, severity: Severity, message: String, score_delta: i32) -> Self {
        Self {
            category: category.to_string(),
            severity,
            message,
            score_delta,
        }
    }
}

/// Per-component outcome: the component's own aggregate score, its vote,
/// and the signals backing both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorReport {
    pub detector: String,
    pub score: i32,
    pub vote: Verdict,
    pub confidence: f32,
    pub signals: Vec<Signal>,
}

impl DetectorReport {
    /// Report for a component that failed internally. The vote degrades to
    /// SUSPICIOUS rather than aborting the analysis.
    pub fn degraded(detector: &str) -> Self {
        Self {
            detector: detector.to_string(),
            score: 0,
            vote: Verdict::Suspicious,
            confidence: 0.0,
            signals: vec![Signal::new(
                detector,
                Severity::Medium,
                format!(
                    "{} detector failed internally; component treated as suspicious",
                    detector
                ),
                0,
            )],
        }
    }
}
