use crate::features::{DetectorReport, Severity, Signal};
use crate::host_utils;
use crate::url_record::UrlRecord;
use crate::verdict::Verdict;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TldRisk {
    /// Restricted registries (.gov, .edu, .mil).
    Trusted,
    /// Ordinary commercial TLDs and anything unknown.
    Standard,
    /// TLDs with elevated abuse rates.
    Suspicious,
    /// Free or near-free TLDs dominated by abuse.
    HighRisk,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TldInfo {
    pub risk_level: TldRisk,
    pub score_delta: i32,
    pub description: String,
}

impl TldInfo {
    fn new(risk_level: TldRisk, score_delta: i32, description: &str) -> Self {
        Self {
            risk_level,
            score_delta,
            description: description.to_string(),
        }
    }
}

/// Table-lookup scorer: TLD string to reputation category and fixed delta.
#[derive(Debug, Clone)]
pub struct TldReputationScorer {
    tld_lookup: HashMap<String, TldInfo>,
}

impl Default for TldReputationScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl TldReputationScorer {
    pub fn new() -> Self {
        Self::from_table(default_tld_table())
    }

    pub fn from_table(table: HashMap<String, TldInfo>) -> Self {
        let tld_lookup = table
            .into_iter()
            .map(|(tld, info)| (tld.to_lowercase(), info))
            .collect();
        Self { tld_lookup }
    }

    /// Risk info for one TLD. Unknown TLDs are Standard with zero delta.
    pub fn get_tld_risk(&self, tld: &str) -> TldInfo {
        self.tld_lookup
            .get(&tld.to_lowercase())
            .cloned()
            .unwrap_or_else(|| TldInfo::new(TldRisk::Standard, 0, "unrecognized TLD"))
    }

    pub fn analyze(&self, record: &UrlRecord) -> DetectorReport {
        let host = record.lookup_host();
        let mut signals = Vec::new();
        let mut score = 0;
        let mut vote = Verdict::Safe;
        let mut confidence = 0.0f32;

        // IP literals have no TLD to rate; the lexical detector owns that case.
        if !host.is_empty() && !host_utils::is_ip_literal(host) {
            if let Some(tld) = host_utils::tld_of(host) {
                let info = self.get_tld_risk(tld);
                score = info.score_delta;
                confidence = 0.8;

                match info.risk_level {
                    TldRisk::Trusted | TldRisk::Standard => {}
                    TldRisk::Suspicious => {
                        vote = Verdict::Suspicious;
                        signals.push(Signal::new(
                            "tld",
                            Severity::Medium,
                            format!("Suspicious TLD reputation: .{} ({})", tld, info.description),
                            info.score_delta,
                        ));
                    }
                    TldRisk::HighRisk => {
                        vote = Verdict::Malicious;
                        signals.push(Signal::new(
                            "tld",
                            Severity::High,
                            format!("High-risk TLD: .{} ({})", tld, info.description),
                            info.score_delta,
                        ));
                    }
                }
            }
        }

        DetectorReport {
            detector: "tld".to_string(),
            score,
            vote,
            confidence,
            signals,
        }
    }
}

pub fn default_tld_table() -> HashMap<String, TldInfo> {
    let mut tlds = HashMap::new();

    for tld in ["gov", "edu", "mil", "int"] {
        tlds.insert(
            tld.to_string(),
            TldInfo::new(TldRisk::Trusted, 0, "restricted registry"),
        );
    }

    for tld in ["com", "org", "net", "io", "dev", "app", "co"] {
        tlds.insert(
            tld.to_string(),
            TldInfo::new(TldRisk::Standard, 0, "standard commercial registry"),
        );
    }

    for (tld, desc) in [
        ("info", "heavily abused for spam"),
        ("biz", "high spam rates"),
        ("cc", "frequently abused"),
        ("ws", "popular with spammers"),
        ("tv", "often misused for spam"),
        ("icu", "high abuse rate"),
        ("site", "often abused for phishing"),
        ("fun", "high spam abuse"),
        ("shop", "high spam abuse"),
        ("digital", "commonly abused for tech scams"),
        ("top", "high phishing rate"),
        ("xyz", "high phishing rate"),
        ("click", "often abused for redirect spam"),
        ("link", "often abused for redirect spam"),
        ("buzz", "high abuse rate"),
    ] {
        tlds.insert(tld.to_string(), TldInfo::new(TldRisk::Suspicious, 20, desc));
    }

    for (tld, desc) in [
        ("tk", "free Tokelau domain, very high abuse"),
        ("ml", "free Mali domain, very high abuse"),
        ("ga", "free Gabon domain, very high abuse"),
        ("cf", "free Central African Republic domain, very high abuse"),
        ("gq", "free Equatorial Guinea domain, very high abuse"),
        ("work", "very high phishing rate"),
        ("zip", "file-extension collision, high abuse"),
        ("country", "very high abuse rate"),
    ] {
        tlds.insert(tld.to_string(), TldInfo::new(TldRisk::HighRisk, 30, desc));
    }

    tlds
}
