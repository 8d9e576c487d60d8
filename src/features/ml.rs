use crate::features::{DetectorReport, Severity, Signal};
use crate::host_utils;
use crate::url_record::UrlRecord;
use crate::verdict::Verdict;
use serde::{Deserialize, Serialize};

/// Probability at or below this votes SAFE.
const SAFE_CUTOFF: f64 = 0.30;
/// Probability at or below this votes SUSPICIOUS; above it, MALICIOUS.
const SUSPICIOUS_CUTOFF: f64 = 0.60;

/// Logistic weights for the 24-dimension feature vector. Calibrated by
/// hand against the labeled URL corpus the bundled tables came from; the
/// sign and rough magnitude of each weight is what matters, not a trained
/// optimum.
const FEATURE_WEIGHTS: [f64; 24] = [
    0.6,  // url length
    0.5,  // host length
    0.4,  // path length
    0.8,  // subdomain count
    -1.2, // https
    2.5,  // IP-literal host
    1.0,  // host entropy
    0.6,  // path entropy
    0.4,  // query parameter count
    2.0,  // '@' in URL
    0.5,  // dot count
    1.2,  // dash count
    0.8,  // explicit port
    2.6,  // shortener host
    2.2,  // suspicious TLD
    2.0,  // punycode host
    2.4,  // mixed-script host
    2.2,  // confusable characters
    2.6,  // zero-width characters
    1.6,  // credential keyword in path
    1.8,  // URL embedded in query
    1.2,  // redirect parameter
    1.0,  // excessive subdomain depth
    1.5,  // unparsable input
];
const FEATURE_BIAS: f64 = -2.6;

// Character-statistics model over the registrable host.
const CHAR_W_ENTROPY: f64 = 3.0;
const CHAR_W_DIGIT_RATIO: f64 = 2.0;
const CHAR_W_CONSONANT_RUN: f64 = 1.2;
const CHAR_W_HYPHENS: f64 = 1.2;
const CHAR_BIAS: f64 = -2.4;

/// Weight of the character model in the combined probability; the
/// feature-vector model carries the rest.
const CHAR_BLEND: f64 = 0.4;

const SHORTENERS: &[&str] = &["bit.ly", "tinyurl.com", "t.co", "goo.gl", "ow.ly"];
const SUSPICIOUS_TLDS: &[&str] = &["tk", "ml", "ga", "cf", "gq", "xyz", "icu", "top"];
const CREDENTIAL_KEYWORDS: &[&str] = &[
    "login", "signin", "verify", "account", "secure", "update", "confirm", "password", "banking",
    "wallet",
];
const REDIRECT_PARAMS: &[&str] = &["redirect", "url", "next", "goto", "continue", "return"];

/// Diagnostic breakdown of one scoring pass.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MlBreakdown {
    pub char_score: f64,
    pub feature_score: f64,
    pub probability: f64,
    pub vote: Verdict,
    /// Distance from the decision midpoint, 0.0 (coin flip) to 1.0.
    pub confidence: f64,
}

/// Deterministic stand-in for a trained classifier: a character-statistics
/// model and a fixed-feature-vector model blended into one probability.
/// Pure function of the record; no I/O, no state.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnsembleScorer;

impl EnsembleScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn breakdown(&self, record: &UrlRecord) -> MlBreakdown {
        let char_score = self.char_score(record.lookup_host());
        let feature_score = sigmoid(
            FEATURE_WEIGHTS
                .iter()
                .zip(self.feature_vector(record))
                .map(|(w, x)| w * x)
                .sum::<f64>()
                + FEATURE_BIAS,
        );
        let probability = CHAR_BLEND * char_score + (1.0 - CHAR_BLEND) * feature_score;

        let vote = if probability <= SAFE_CUTOFF {
            Verdict::Safe
        } else if probability <= SUSPICIOUS_CUTOFF {
            Verdict::Suspicious
        } else {
            Verdict::Malicious
        };

        MlBreakdown {
            char_score,
            feature_score,
            probability,
            vote,
            confidence: (probability - 0.5).abs() * 2.0,
        }
    }

    /// Report derived from a breakdown. Emits a single signal only when the
    /// model leans toward risk, so a confidently-benign read does not move
    /// the aggregate score.
    pub fn report(&self, breakdown: &MlBreakdown) -> DetectorReport {
        let mut signals = Vec::new();
        if breakdown.probability > SAFE_CUTOFF {
            let severity = if breakdown.probability > SUSPICIOUS_CUTOFF {
                Severity::High
            } else {
                Severity::Medium
            };
            let delta = (breakdown.probability * 30.0).round() as i32;
            signals.push(Signal::new(
                "ml",
                severity,
                format!(
                    "Statistical model scores this URL {:.0}% likely phishing",
                    breakdown.probability * 100.0
                ),
                delta,
            ));
        }

        DetectorReport {
            detector: "ml".to_string(),
            score: signals.iter().map(|s| s.score_delta).sum(),
            vote: breakdown.vote,
            confidence: breakdown.confidence as f32,
            signals,
        }
    }

    pub fn analyze(&self, record: &UrlRecord) -> DetectorReport {
        self.report(&self.breakdown(record))
    }

    /// Logistic over hostname character statistics. `www.` is stripped so
    /// the model rates the registrable part, not the boilerplate prefix.
    fn char_score(&self, host: &str) -> f64 {
        let host = host_utils::strip_www(host);
        if host.is_empty() {
            return 0.0;
        }

        let entropy = (host_utils::shannon_entropy(host) / 5.0).min(1.0);
        let total = host.chars().count();
        let digits = host.chars().filter(char::is_ascii_digit).count();
        let digit_ratio = digits as f64 / total as f64;
        let consonant_run = (host_utils::longest_consonant_run(host) as f64 / 8.0).min(1.0);
        let hyphens = (host.matches('-').count() as f64 / 3.0).min(1.0);

        sigmoid(
            CHAR_W_ENTROPY * entropy
                + CHAR_W_DIGIT_RATIO * digit_ratio
                + CHAR_W_CONSONANT_RUN * consonant_run
                + CHAR_W_HYPHENS * hyphens
                + CHAR_BIAS,
        )
    }

    /// The fixed 24-dimension vector. Dimensions 0-14 follow the original
    /// model's normalizations; 15-23 are flag presences.
    pub fn feature_vector(&self, record: &UrlRecord) -> [f64; 24] {
        let host = &record.host;
        let path = &record.path;
        let query = record.query.as_deref().unwrap_or("");
        let path_lower = path.to_lowercase();
        let query_lower = query.to_lowercase();
        let lookup = record.lookup_host();

        let query_params = if record.query.is_some() {
            1 + query.matches('&').count()
        } else {
            0
        };

        let suspicious_tld = host_utils::tld_of(lookup)
            .map(|tld| SUSPICIOUS_TLDS.contains(&tld))
            .unwrap_or(false);
        let shortener = SHORTENERS
            .iter()
            .any(|s| lookup == *s || lookup.ends_with(&format!(".{}", s)));
        let credential = CREDENTIAL_KEYWORDS.iter().any(|kw| path_lower.contains(kw));
        let embedded = query_lower.contains("http://") || query_lower.contains("https://");
        let redirect = REDIRECT_PARAMS.iter().any(|p| {
            query_lower.starts_with(&format!("{}=", p)) || query_lower.contains(&format!("&{}=", p))
        });

        [
            (record.input_len() as f64 / 500.0).min(1.0),
            (host.len() as f64 / 100.0).min(1.0),
            (path.len() as f64 / 200.0).min(1.0),
            (host.matches('.').count().saturating_sub(1) as f64 / 5.0).min(1.0),
            flag(record.scheme == "https"),
            flag(host_utils::is_ip_literal(host)),
            (host_utils::shannon_entropy(host) / 5.0).min(1.0),
            (host_utils::shannon_entropy(path) / 5.0).min(1.0),
            (query_params as f64 / 10.0).min(1.0),
            flag(record.raw.contains('@')),
            (record.raw.matches('.').count() as f64 / 10.0).min(1.0),
            (record.raw.matches('-').count() as f64 / 10.0).min(1.0),
            flag(record.port.is_some()),
            flag(shortener),
            flag(suspicious_tld),
            flag(record.unicode.is_punycode),
            flag(record.unicode.has_mixed_script),
            flag(record.unicode.has_confusables),
            flag(record.unicode.has_zero_width),
            flag(credential),
            flag(embedded),
            flag(redirect),
            flag(host_utils::subdomain_depth(host) > 3),
            flag(record.malformed),
        ]
    }
}

fn flag(condition: bool) -> f64 {
    if condition {
        1.0
    } else {
        0.0
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
