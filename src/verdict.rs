use serde::{Deserialize, Serialize};
use std::fmt;

/// Final three-way classification of a URL, also used for component votes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Safe,
    Suspicious,
    Malicious,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Safe => write!(f, "SAFE"),
            Verdict::Suspicious => write!(f, "SUSPICIOUS"),
            Verdict::Malicious => write!(f, "MALICIOUS"),
        }
    }
}

/// The four top-level component votes, in the fixed order the consensus
/// inspects them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ComponentVotes {
    pub heuristic: Verdict,
    pub ml: Verdict,
    pub brand: Verdict,
    pub tld: Verdict,
}

impl ComponentVotes {
    pub fn as_array(&self) -> [Verdict; 4] {
        [self.heuristic, self.ml, self.brand, self.tld]
    }
}

/// Consensus decision over the component votes. A threat-intel hit
/// overrides the vote count entirely; two safe votes outweigh two
/// suspicious ones, and ambiguous splits fall back to SUSPICIOUS, never
/// SAFE.
pub fn decide(votes: &ComponentVotes, known_bad: bool) -> Verdict {
    if known_bad {
        return Verdict::Malicious;
    }

    let mut safe = 0;
    let mut malicious = 0;
    for vote in votes.as_array() {
        match vote {
            Verdict::Safe => safe += 1,
            Verdict::Malicious => malicious += 1,
            Verdict::Suspicious => {}
        }
    }

    if malicious >= 2 {
        Verdict::Malicious
    } else if safe >= 2 {
        Verdict::Safe
    } else {
        Verdict::Suspicious
    }
}

/// Discrete confidence level, 1 (weak) to 5 (strong): distance of the
/// score from the 50 midpoint, boosted when many signals agree in the
/// same direction. Monotone non-decreasing in `agreeing_signals` for a
/// fixed score.
pub fn confidence_level(score: u8, agreeing_signals: usize) -> u8 {
    let extremity = (i32::from(score) - 50).unsigned_abs();
    let mut level = 1 + (extremity / 17) as u8;

    if agreeing_signals >= 4 {
        level += 1;
    }
    if agreeing_signals >= 6 {
        level += 1;
    }

    level.clamp(1, 5)
}
