use crate::config::EngineConfig;
use crate::features::brand::BrandMatcher;
use crate::features::heuristics::LexicalHeuristics;
use crate::features::ml::EnsembleScorer;
use crate::features::threat_intel::{ThreatConfidence, ThreatIntel};
use crate::features::tld_risk::TldReputationScorer;
use crate::features::{DetectorReport, Signal};
use crate::url_record::UrlRecord;
use crate::verdict::{self, ComponentVotes, Verdict};
use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};

/// Per-component sub-scores exposed alongside the verdict so callers can
/// render the vote breakdown without re-deriving it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostics {
    pub heuristic_score: i32,
    pub brand_score: i32,
    pub tld_score: i32,
    /// Combined model probability as a 0-100 percentage.
    pub ml_score: u8,
    pub char_score: f64,
    pub feature_score: f64,
    pub ml_confidence: f32,
    pub is_known_bad: bool,
    pub threat_confidence: Option<ThreatConfidence>,
    pub reason_count: usize,
    pub votes: ComponentVotes,
}

/// Everything one analysis produces. Created fresh per call; nothing in
/// here refers back into the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub url: String,
    pub score: u8,
    pub verdict: Verdict,
    /// Discrete confidence level, 1-5.
    pub confidence: u8,
    pub flags: Vec<String>,
    pub signals: Vec<Signal>,
    pub diagnostics: Diagnostics,
}

/// The analysis pipeline: one URL in, one verdict out. Holds the static
/// tables, which are immutable after construction, so a single engine can
/// be shared across threads.
pub struct AnalysisEngine {
    heuristics: LexicalHeuristics,
    ml: EnsembleScorer,
    brand: BrandMatcher,
    tld: TldReputationScorer,
    threat: ThreatIntel,
}

impl Default for AnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisEngine {
    pub fn new() -> Self {
        Self {
            heuristics: LexicalHeuristics::new(),
            ml: EnsembleScorer::new(),
            brand: BrandMatcher::new(),
            tld: TldReputationScorer::new(),
            threat: ThreatIntel::new(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            heuristics: LexicalHeuristics::new(),
            ml: EnsembleScorer::new(),
            brand: match &config.brands {
                Some(brands) => BrandMatcher::from_brands(brands.clone()),
                None => BrandMatcher::new(),
            },
            tld: match &config.tlds {
                Some(table) => TldReputationScorer::from_table(table.clone()),
                None => TldReputationScorer::new(),
            },
            threat: match &config.blocklist {
                Some(entries) => ThreatIntel::from_entries(entries.clone()),
                None => ThreatIntel::new(),
            },
        }
    }

    /// Analyze one URL. Total over all string inputs: malformed input
    /// degrades, detector panics are isolated, and the worst case is a
    /// low-confidence SUSPICIOUS, never a missing or fabricated verdict.
    pub fn analyze(&self, url: &str) -> AnalysisResult {
        let record = UrlRecord::parse(url);
        log::debug!(
            "analyzing '{}' (host '{}', malformed: {})",
            record.raw,
            record.host,
            record.malformed
        );

        // Fixed component order; a panicking component degrades to a
        // SUSPICIOUS vote instead of aborting the analysis.
        let heuristic = run_isolated("lexical", || self.heuristics.analyze(&record));
        let brand = run_isolated("brand", || self.brand.analyze(&record));
        let tld = run_isolated("tld", || self.tld.analyze(&record));
        let (ml_breakdown, ml_report) =
            match panic::catch_unwind(AssertUnwindSafe(|| self.ml.breakdown(&record))) {
                Ok(breakdown) => {
                    let report = self.ml.report(&breakdown);
                    (Some(breakdown), report)
                }
                Err(_) => {
                    log::warn!("ml detector panicked; degrading its vote to SUSPICIOUS");
                    (None, DetectorReport::degraded("ml"))
                }
            };
        let threat = run_isolated("threat-intel", || self.threat.analyze(&record));

        let threat_confidence = self.threat.lookup(&record.host);
        let is_known_bad = threat_confidence.is_some();

        let votes = ComponentVotes {
            heuristic: heuristic.vote,
            ml: ml_report.vote,
            brand: brand.vote,
            tld: tld.vote,
        };

        // Flag order is the component order; each component's internal
        // order is fixed, so identical input yields identical output.
        let mut signals = Vec::new();
        let mut raw_score = 0i32;
        for report in [&heuristic, &brand, &tld, &ml_report, &threat] {
            raw_score += report.score;
            signals.extend(report.signals.iter().cloned());
        }
        let score = raw_score.clamp(0, 100) as u8;

        let mut verdict = verdict::decide(&votes, is_known_bad);

        // A record we could not parse is never vouched for.
        let degraded_to_floor = record.malformed && verdict == Verdict::Safe;
        if degraded_to_floor {
            verdict = Verdict::Suspicious;
        }

        let agreeing = if score >= 50 {
            signals.iter().filter(|s| s.score_delta > 0).count()
        } else {
            signals.iter().filter(|s| s.score_delta < 0).count()
        };
        let confidence = if degraded_to_floor {
            1
        } else {
            verdict::confidence_level(score, agreeing)
        };

        log::info!(
            "verdict for '{}': {} (score {}, confidence {}/5, {} flags)",
            record.raw,
            verdict,
            score,
            confidence,
            signals.len()
        );

        AnalysisResult {
            url: url.to_string(),
            score,
            verdict,
            confidence,
            flags: signals.iter().map(|s| s.message.clone()).collect(),
            signals,
            diagnostics: Diagnostics {
                heuristic_score: heuristic.score,
                brand_score: brand.score,
                tld_score: tld.score,
                ml_score: ml_breakdown
                    .map(|bd| (bd.probability * 100.0).round() as u8)
                    .unwrap_or(50),
                char_score: ml_breakdown.map(|bd| bd.char_score).unwrap_or(0.5),
                feature_score: ml_breakdown.map(|bd| bd.feature_score).unwrap_or(0.5),
                ml_confidence: ml_breakdown.map(|bd| bd.confidence as f32).unwrap_or(0.0),
                is_known_bad,
                threat_confidence,
                reason_count: ml_report.signals.len()
                    + heuristic.signals.len()
                    + brand.signals.len()
                    + tld.signals.len()
                    + threat.signals.len(),
                votes,
            },
        }
    }
}

fn run_isolated<F>(name: &str, f: F) -> DetectorReport
where
    F: FnOnce() -> DetectorReport,
{
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|_| {
        log::warn!("{} detector panicked; degrading its vote to SUSPICIOUS", name);
        DetectorReport::degraded(name)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_url_is_safe_with_low_score() {
        let engine = AnalysisEngine::new();
        let result = engine.analyze("https://www.google.com");
        assert_eq!(result.verdict, Verdict::Safe);
        assert!(result.score <= 15, "score was {}", result.score);
        assert!(result.flags.len() <= 1);
    }

    #[test]
    fn test_phishing_composite_is_malicious() {
        let engine = AnalysisEngine::new();
        let result = engine.analyze("https://paypa1-secure.tk/login");
        assert_eq!(result.verdict, Verdict::Malicious);
        assert!(result.score >= 80, "score was {}", result.score);

        let flags = result.flags.join(" | ");
        assert!(flags.contains("paypal"), "missing brand flag: {}", flags);
        assert!(flags.contains(".tk"), "missing TLD flag: {}", flags);
        assert!(flags.contains("'login'"), "missing credential flag: {}", flags);
    }

    #[test]
    fn test_blocklist_override_dominates() {
        let engine = AnalysisEngine::new();
        // A domain that looks harmless lexically but sits on the blocklist
        let result = engine.analyze("https://facebook-security-check.net");
        assert_eq!(result.verdict, Verdict::Malicious);
        assert!(result.diagnostics.is_known_bad);
        assert!(result.score >= 90);
    }

    #[test]
    fn test_homograph_is_flagged() {
        let engine = AnalysisEngine::new();
        let result = engine.analyze("https://g\u{043e}\u{043e}gle.com");
        assert!(matches!(
            result.verdict,
            Verdict::Malicious | Verdict::Suspicious
        ));
        assert!(result
            .flags
            .iter()
            .any(|f| f.contains("Unicode") || f.contains("lookalike") || f.contains("punycode")));
    }

    #[test]
    fn test_empty_input_never_safe() {
        let engine = AnalysisEngine::new();
        let result = engine.analyze("");
        assert_ne!(result.verdict, Verdict::Safe);
        assert_eq!(result.confidence, 1);
    }

    #[test]
    fn test_totality_over_garbage() {
        let engine = AnalysisEngine::new();
        for input in [
            "",
            " ",
            "not a url at all",
            "http://",
            "\u{0000}\u{0001}\u{0002}",
            "::::////????",
            "%%%25%25",
        ] {
            let result = engine.analyze(input);
            assert!(result.score <= 100);
            assert!((1..=5).contains(&result.confidence));
        }
    }

    #[test]
    fn test_idempotent() {
        let engine = AnalysisEngine::new();
        let a = engine.analyze("https://paypa1-secure.tk/login");
        let b = engine.analyze("https://paypa1-secure.tk/login");
        assert_eq!(a.score, b.score);
        assert_eq!(a.verdict, b.verdict);
        assert_eq!(a.flags, b.flags);
    }

    #[test]
    fn test_oversized_input() {
        let engine = AnalysisEngine::new();
        let result = engine.analyze(&format!("https://example.com/{}", "x".repeat(10_000)));
        assert!(result.score <= 100);
        assert!(result
            .flags
            .iter()
            .any(|f| f.contains("inspection cap")));
    }

    #[test]
    fn test_diagnostics_votes_match_component_reports() {
        let engine = AnalysisEngine::new();
        let result = engine.analyze("https://bit.ly/x3Yz123");
        // Shortener: lexical and ml lean suspicious, brand and tld stay safe,
        // and the two affirmative safe votes carry the consensus.
        assert_eq!(result.diagnostics.votes.heuristic, Verdict::Suspicious);
        assert_eq!(result.diagnostics.votes.ml, Verdict::Suspicious);
        assert_eq!(result.diagnostics.votes.brand, Verdict::Safe);
        assert_eq!(result.diagnostics.votes.tld, Verdict::Safe);
        assert_eq!(result.verdict, Verdict::Safe);
    }
}
