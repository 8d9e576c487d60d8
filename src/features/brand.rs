use crate::features::{DetectorReport, Severity, Signal};
use crate::host_utils;
use crate::url_record::UrlRecord;
use crate::verdict::Verdict;
use serde::{Deserialize, Serialize};
use strsim::levenshtein;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandEntry {
    pub name: String,
    /// Registered domains the brand legitimately operates.
    pub domains: Vec<String>,
}

impl BrandEntry {
    fn new(name: &str, domains: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            domains: domains.iter().map(|d| d.to_string()).collect(),
        }
    }
}

/// How close an impersonating label is to the brand it imitates.
/// Declaration order is match priority: smaller is closer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Closeness {
    /// Identical after character-substitution folding, or the brand name
    /// on a foreign TLD.
    Exact,
    /// Levenshtein distance 1.
    OneEdit,
    /// The brand name embedded in a longer label or subdomain.
    Embedded,
    /// Levenshtein distance 2.
    TwoEdits,
}

/// Compares the hostname's registrable label against a curated brand list
/// using substitution folding and edit distance.
#[derive(Debug, Clone)]
pub struct BrandMatcher {
    brands: Vec<BrandEntry>,
}

impl Default for BrandMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl BrandMatcher {
    pub fn new() -> Self {
        Self::from_brands(default_brand_list())
    }

    pub fn from_brands(brands: Vec<BrandEntry>) -> Self {
        let brands = brands
            .into_iter()
            .map(|b| BrandEntry {
                name: b.name.to_lowercase(),
                domains: b.domains.iter().map(|d| d.to_lowercase()).collect(),
            })
            .collect();
        Self { brands }
    }

    /// True if the host is one of the brand's registered domains or a
    /// subdomain of one.
    fn is_legitimate(&self, host: &str) -> bool {
        self.brands.iter().any(|brand| {
            brand
                .domains
                .iter()
                .any(|d| host == d || host.ends_with(&format!(".{}", d)))
        })
    }

    pub fn analyze(&self, record: &UrlRecord) -> DetectorReport {
        let host = record.lookup_host();
        let mut report = DetectorReport {
            detector: "brand".to_string(),
            score: 0,
            vote: Verdict::Safe,
            confidence: 0.0,
            signals: Vec::new(),
        };

        if host.is_empty() || host_utils::is_ip_literal(host) {
            return report;
        }

        // The genuine article is never an impersonation.
        if self.is_legitimate(host) {
            return report;
        }

        // Match against the homograph-folded skeleton so Cyrillic lookalikes
        // land on the brand they imitate.
        let skeleton = record.unicode.safe_display_host.to_lowercase();
        let skeleton = host_utils::strip_www(skeleton.trim_end_matches('.'));
        let base = host_utils::registrable_label(skeleton);
        let folded = fold_substitutions(base);

        // Boundary-aware pieces for the embedded check, so `paypal-secure`
        // matches paypal but `purchase` does not match chase.
        let host_labels: Vec<&str> = skeleton.split('.').collect();
        let folded_segments: Vec<&str> = folded
            .split(|c: char| !c.is_ascii_alphabetic())
            .filter(|s| !s.is_empty())
            .collect();

        let mut best: Option<(&BrandEntry, Closeness)> = None;
        for brand in &self.brands {
            let name = brand.name.as_str();
            let closeness = if base == name || folded == name {
                Some(Closeness::Exact)
            } else if name.len() >= 4
                && (levenshtein(base, name) == 1 || levenshtein(&folded, name) == 1)
            {
                Some(Closeness::OneEdit)
            } else if folded_segments.contains(&name) || host_labels.contains(&name) {
                Some(Closeness::Embedded)
            } else if name.len() >= 5 && levenshtein(&folded, name) == 2 {
                Some(Closeness::TwoEdits)
            } else {
                None
            };

            if let Some(closeness) = closeness {
                let better = match best {
                    Some((_, current)) => closeness < current,
                    None => true,
                };
                if better {
                    best = Some((brand, closeness));
                }
            }
        }

        if let Some((brand, closeness)) = best {
            let (delta, severity, vote, how) = match closeness {
                Closeness::Exact => (
                    40,
                    Severity::High,
                    Verdict::Malicious,
                    "is a disguised spelling of",
                ),
                Closeness::OneEdit => (
                    40,
                    Severity::High,
                    Verdict::Malicious,
                    "is one character away from",
                ),
                Closeness::Embedded => (
                    35,
                    Severity::High,
                    Verdict::Malicious,
                    "embeds the name of",
                ),
                Closeness::TwoEdits => (
                    32,
                    Severity::Medium,
                    Verdict::Suspicious,
                    "closely resembles",
                ),
            };
            report.score = delta;
            report.vote = vote;
            report.confidence = 0.85;
            report.signals.push(Signal::new(
                "brand",
                severity,
                format!(
                    "Possible typosquat: '{}' {} brand '{}' but is not an official domain",
                    host, how, brand.name
                ),
                delta,
            ));
        }

        report
    }
}

/// Fold the character substitutions typosquatters lean on, so
/// `paypa1` and `paypal` compare equal.
fn fold_substitutions(label: &str) -> String {
    label
        .replace("rn", "m")
        .replace("vv", "w")
        .chars()
        .map(|ch| match ch {
            '0' => 'o',
            '1' => 'l',
            '3' => 'e',
            '5' => 's',
            '7' => 't',
            '@' => 'a',
            '$' => 's',
            other => other,
        })
        .collect()
}

pub fn default_brand_list() -> Vec<BrandEntry> {
    vec![
        BrandEntry::new("paypal", &["paypal.com", "paypal.me"]),
        BrandEntry::new("google", &["google.com", "google.co.uk", "gmail.com", "youtube.com"]),
        BrandEntry::new("apple", &["apple.com", "icloud.com"]),
        BrandEntry::new("microsoft", &["microsoft.com", "outlook.com", "live.com", "office.com"]),
        BrandEntry::new("amazon", &["amazon.com", "amazon.co.uk", "amazon.de", "aws.amazon.com"]),
        BrandEntry::new("facebook", &["facebook.com", "fb.com", "messenger.com"]),
        BrandEntry::new("instagram", &["instagram.com"]),
        BrandEntry::new("whatsapp", &["whatsapp.com"]),
        BrandEntry::new("netflix", &["netflix.com"]),
        BrandEntry::new("linkedin", &["linkedin.com"]),
        BrandEntry::new("twitter", &["twitter.com", "x.com"]),
        BrandEntry::new("ebay", &["ebay.com", "ebay.co.uk"]),
        BrandEntry::new("chase", &["chase.com", "jpmorgan.com"]),
        BrandEntry::new("wellsfargo", &["wellsfargo.com"]),
        BrandEntry::new("coinbase", &["coinbase.com"]),
        BrandEntry::new("binance", &["binance.com"]),
        BrandEntry::new("dropbox", &["dropbox.com"]),
        BrandEntry::new("steam", &["steampowered.com", "steamcommunity.com"]),
    ]
}
