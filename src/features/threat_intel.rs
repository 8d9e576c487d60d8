use crate::features::{DetectorReport, Severity, Signal};
use crate::url_record::UrlRecord;
use crate::verdict::Verdict;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Score contribution of a confirmed blocklist hit. Near-maximal so a hit
/// dominates the aggregate regardless of what the other detectors saw.
const KNOWN_BAD_DELTA: i32 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreatConfidence {
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreatEntry {
    pub domain: String,
    pub confidence: ThreatConfidence,
}

#[derive(Debug, Deserialize)]
struct BlocklistFile {
    entries: Vec<ThreatEntry>,
}

/// Exact-match lookup against a local blocklist of known-bad domains.
/// The table is built once at construction and read-only afterwards.
#[derive(Debug, Clone)]
pub struct ThreatIntel {
    domains: HashMap<String, ThreatConfidence>,
}

impl Default for ThreatIntel {
    fn default() -> Self {
        Self::new()
    }
}

impl ThreatIntel {
    pub fn new() -> Self {
        let bundled = include_str!("../../data/blocklist.toml");
        let file: BlocklistFile =
            toml::from_str(bundled).expect("bundled blocklist.toml must parse");
        Self::from_entries(file.entries)
    }

    pub fn from_entries(entries: Vec<ThreatEntry>) -> Self {
        let domains = entries
            .into_iter()
            .map(|e| (normalize_domain(&e.domain), e.confidence))
            .collect();
        Self { domains }
    }

    /// Confidence for a hostname, if it is a known-bad domain.
    pub fn lookup(&self, host: &str) -> Option<ThreatConfidence> {
        self.domains.get(&normalize_domain(host)).copied()
    }

    pub fn analyze(&self, record: &UrlRecord) -> DetectorReport {
        let mut report = DetectorReport {
            detector: "threat-intel".to_string(),
            score: 0,
            vote: Verdict::Safe,
            confidence: 0.0,
            signals: Vec::new(),
        };

        if let Some(confidence) = self.lookup(&record.host) {
            report.score = KNOWN_BAD_DELTA;
            report.vote = Verdict::Malicious;
            report.confidence = 0.95;
            report.signals.push(Signal::new(
                "threat-intel",
                Severity::Critical,
                format!(
                    "Domain '{}' is a known malicious domain (confidence: {:?})",
                    record.lookup_host(),
                    confidence
                ),
                KNOWN_BAD_DELTA,
            ));
        }

        report
    }
}

/// Lowercase, strip a `www.` prefix and any trailing dot.
fn normalize_domain(domain: &str) -> String {
    let lower = domain.trim().to_lowercase();
    let lower = lower.trim_end_matches('.');
    lower.strip_prefix("www.").unwrap_or(lower).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intel() -> ThreatIntel {
        ThreatIntel::from_entries(vec![
            ThreatEntry {
                domain: "evil-login.example".to_string(),
                confidence: ThreatConfidence::Critical,
            },
            ThreatEntry {
                domain: "WWW.Sketchy.Example.".to_string(),
                confidence: ThreatConfidence::Medium,
            },
        ])
    }

    #[test]
    fn test_exact_match() {
        assert_eq!(
            intel().lookup("evil-login.example"),
            Some(ThreatConfidence::Critical)
        );
        assert_eq!(intel().lookup("benign.example"), None);
    }

    #[test]
    fn test_normalization_on_both_sides() {
        let intel = intel();
        // Entry was stored with www. prefix and trailing dot
        assert_eq!(intel.lookup("sketchy.example"), Some(ThreatConfidence::Medium));
        // Lookup side normalizes too
        assert_eq!(
            intel.lookup("www.evil-login.example."),
            Some(ThreatConfidence::Critical)
        );
    }

    #[test]
    fn test_subdomain_is_not_an_exact_match() {
        assert_eq!(intel().lookup("a.evil-login.example"), None);
    }

    #[test]
    fn test_hit_produces_critical_signal() {
        let record = UrlRecord::parse("https://evil-login.example/claim");
        let report = intel().analyze(&record);
        assert_eq!(report.vote, Verdict::Malicious);
        assert_eq!(report.score, KNOWN_BAD_DELTA);
        assert_eq!(report.signals[0].severity, Severity::Critical);
    }

    #[test]
    fn test_bundled_blocklist_parses() {
        let intel = ThreatIntel::new();
        assert!(intel.lookup("secure-paypal-alerts.com").is_some());
    }
}
