use crate::features::{DetectorReport, Severity, Signal};
use crate::host_utils;
use crate::url_record::UrlRecord;
use crate::verdict::Verdict;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref PERCENT_ESCAPE_RE: Regex = Regex::new(r"%[0-9A-Fa-f]{2}").unwrap();
}

const CATEGORY: &str = "lexical";

/// Aggregate score at or below this votes SAFE.
const SAFE_THRESHOLD: i32 = 10;
/// Aggregate score at or below this votes SUSPICIOUS; anything higher
/// votes MALICIOUS.
const SUSPICIOUS_THRESHOLD: i32 = 25;

/// Runs ~25 independent, side-effect-free pattern checks against one URL
/// record. Each check yields at most one signal with a fixed delta.
#[derive(Debug, Clone)]
pub struct LexicalHeuristics {
    suspicious_tlds: Vec<String>,
    shorteners: Vec<String>,
    free_hosts: Vec<String>,
    credential_keywords: Vec<String>,
    sensitive_params: Vec<String>,
    redirect_params: Vec<String>,
    executable_exts: Vec<String>,
}

impl Default for LexicalHeuristics {
    fn default() -> Self {
        Self::new()
    }
}

impl LexicalHeuristics {
    pub fn new() -> Self {
        Self {
            suspicious_tlds: to_strings(&["tk", "ml", "ga", "cf", "gq", "xyz", "icu", "top"]),
            shorteners: to_strings(&[
                "bit.ly",
                "tinyurl.com",
                "t.co",
                "goo.gl",
                "ow.ly",
                "is.gd",
                "buff.ly",
                "cutt.ly",
                "rebrand.ly",
                "rb.gy",
                "shorturl.at",
                "tiny.cc",
            ]),
            free_hosts: to_strings(&[
                "000webhostapp.com",
                "weebly.com",
                "wixsite.com",
                "yolasite.com",
                "webnode.page",
                "byethost.com",
                "blogspot.com",
            ]),
            credential_keywords: to_strings(&[
                "login",
                "log-in",
                "signin",
                "sign-in",
                "verify",
                "verification",
                "validate",
                "account",
                "secure",
                "update",
                "confirm",
                "password",
                "banking",
                "wallet",
                "webscr",
                "recover",
                "unlock",
                "suspended",
            ]),
            sensitive_params: to_strings(&[
                "password", "passwd", "pwd", "token", "apikey", "api_key", "ssn", "card", "cvv",
                "pin",
            ]),
            redirect_params: to_strings(&[
                "redirect",
                "redirect_uri",
                "redirect_url",
                "url",
                "next",
                "goto",
                "dest",
                "destination",
                "continue",
                "return",
                "returnurl",
            ]),
            executable_exts: to_strings(&[".exe", ".scr", ".apk", ".bat", ".cmd", ".msi", ".jar", ".vbs"]),
        }
    }

    pub fn analyze(&self, record: &UrlRecord) -> DetectorReport {
        // Fixed check order keeps the flag list stable for identical input.
        let candidates = [
            self.check_malformed(record),
            self.check_dangerous_scheme(record),
            self.check_plain_http(record),
            self.check_missing_scheme(record),
            self.check_ip_host(record),
            self.check_userinfo(record),
            self.check_nonstandard_port(record),
            self.check_subdomain_depth(record),
            self.check_suspicious_tld(record),
            self.check_shortener(record),
            self.check_free_host(record),
            self.check_credential_path(record),
            self.check_sensitive_params(record),
            self.check_embedded_url(record),
            self.check_redirect_param(record),
            self.check_host_entropy(record),
            self.check_path_entropy(record),
            self.check_length(record),
            self.check_over_length(record),
            self.check_hyphens(record),
            self.check_digit_heavy_host(record),
            self.check_percent_escapes(record),
            self.check_double_encoding(record),
            self.check_punycode(record),
            self.check_mixed_script(record),
            self.check_confusables(record),
            self.check_zero_width(record),
            self.check_executable_path(record),
        ];

        let signals: Vec<Signal> = candidates.into_iter().flatten().collect();
        let score: i32 = signals.iter().map(|s| s.score_delta).sum::<i32>().clamp(0, 100);

        let vote = if score <= SAFE_THRESHOLD {
            Verdict::Safe
        } else if score <= SUSPICIOUS_THRESHOLD {
            Verdict::Suspicious
        } else {
            Verdict::Malicious
        };

        let confidence = if signals.is_empty() {
            0.0
        } else {
            (0.5 + 0.1 * signals.len() as f32).min(1.0)
        };

        DetectorReport {
            detector: "lexical".to_string(),
            score,
            vote,
            confidence,
            signals,
        }
    }

    fn check_malformed(&self, record: &UrlRecord) -> Option<Signal> {
        record.malformed.then(|| {
            Signal::new(
                CATEGORY,
                Severity::Medium,
                "URL could not be fully parsed; analyzed on a best-effort basis".to_string(),
                15,
            )
        })
    }

    fn check_dangerous_scheme(&self, record: &UrlRecord) -> Option<Signal> {
        matches!(record.scheme.as_str(), "javascript" | "data" | "vbscript" | "file").then(|| {
            Signal::new(
                CATEGORY,
                Severity::Critical,
                format!("Dangerous URL scheme: {}:", record.scheme),
                30,
            )
        })
    }

    fn check_plain_http(&self, record: &UrlRecord) -> Option<Signal> {
        (record.scheme == "http").then(|| {
            Signal::new(
                CATEGORY,
                Severity::Medium,
                "Connection is plain HTTP, not HTTPS".to_string(),
                18,
            )
        })
    }

    fn check_missing_scheme(&self, record: &UrlRecord) -> Option<Signal> {
        (!record.had_scheme).then(|| {
            Signal::new(
                CATEGORY,
                Severity::Low,
                "No scheme given; assumed https for analysis".to_string(),
                8,
            )
        })
    }

    fn check_ip_host(&self, record: &UrlRecord) -> Option<Signal> {
        host_utils::is_ip_literal(&record.host).then(|| {
            Signal::new(
                CATEGORY,
                Severity::High,
                format!("Host is a raw IP address: {}", record.host),
                28,
            )
        })
    }

    fn check_userinfo(&self, record: &UrlRecord) -> Option<Signal> {
        record.has_userinfo.then(|| {
            Signal::new(
                CATEGORY,
                Severity::High,
                "URL contains a user@host trick that can disguise the real destination".to_string(),
                20,
            )
        })
    }

    fn check_nonstandard_port(&self, record: &UrlRecord) -> Option<Signal> {
        match record.port {
            Some(port) if port != 80 && port != 443 => Some(Signal::new(
                CATEGORY,
                Severity::Medium,
                format!("Non-standard port: {}", port),
                12,
            )),
            _ => None,
        }
    }

    fn check_subdomain_depth(&self, record: &UrlRecord) -> Option<Signal> {
        let depth = host_utils::subdomain_depth(&record.host);
        (depth > 3).then(|| {
            Signal::new(
                CATEGORY,
                Severity::Medium,
                format!("Excessive subdomain depth ({} levels)", depth),
                12,
            )
        })
    }

    fn check_suspicious_tld(&self, record: &UrlRecord) -> Option<Signal> {
        let tld = host_utils::tld_of(record.lookup_host())?;
        self.suspicious_tlds.iter().any(|s| s.as_str() == tld).then(|| {
            Signal::new(
                CATEGORY,
                Severity::High,
                format!("Suspicious TLD: .{}", tld),
                25,
            )
        })
    }

    fn check_shortener(&self, record: &UrlRecord) -> Option<Signal> {
        let host = record.lookup_host();
        self.shorteners
            .iter()
            .find(|s| host == s.as_str() || host.ends_with(&format!(".{}", s)))
            .map(|s| {
                Signal::new(
                    CATEGORY,
                    Severity::Medium,
                    format!("URL shortener hides the destination: {}", s),
                    18,
                )
            })
    }

    fn check_free_host(&self, record: &UrlRecord) -> Option<Signal> {
        let host = record.lookup_host();
        self.free_hosts
            .iter()
            .find(|s| host == s.as_str() || host.ends_with(&format!(".{}", s)))
            .map(|s| {
                Signal::new(
                    CATEGORY,
                    Severity::Medium,
                    format!("Free hosting provider: {}", s),
                    15,
                )
            })
    }

    fn check_credential_path(&self, record: &UrlRecord) -> Option<Signal> {
        let path = record.path.to_lowercase();
        self.credential_keywords
            .iter()
            .find(|kw| path.contains(kw.as_str()))
            .map(|kw| {
                Signal::new(
                    CATEGORY,
                    Severity::Medium,
                    format!("Credential-harvesting keyword in path: '{}'", kw),
                    12,
                )
            })
    }

    fn check_sensitive_params(&self, record: &UrlRecord) -> Option<Signal> {
        let query = record.query.as_deref()?.to_lowercase();
        self.sensitive_params
            .iter()
            .find(|p| query.contains(&format!("{}=", p)))
            .map(|p| {
                Signal::new(
                    CATEGORY,
                    Severity::High,
                    format!("Sensitive parameter in query string: '{}'", p),
                    15,
                )
            })
    }

    fn check_embedded_url(&self, record: &UrlRecord) -> Option<Signal> {
        let query = record.query.as_deref()?.to_lowercase();
        (query.contains("http://") || query.contains("https://") || query.contains("http%3a"))
            .then(|| {
                Signal::new(
                    CATEGORY,
                    Severity::High,
                    "Query string embeds another URL".to_string(),
                    18,
                )
            })
    }

    fn check_redirect_param(&self, record: &UrlRecord) -> Option<Signal> {
        let query = record.query.as_deref()?.to_lowercase();
        self.redirect_params
            .iter()
            .find(|p| query.starts_with(&format!("{}=", p)) || query.contains(&format!("&{}=", p)))
            .map(|p| {
                Signal::new(
                    CATEGORY,
                    Severity::Medium,
                    format!("Redirect parameter in query string: '{}'", p),
                    10,
                )
            })
    }

    fn check_host_entropy(&self, record: &UrlRecord) -> Option<Signal> {
        let host = record.lookup_host();
        if host.len() < 8 || host_utils::is_ip_literal(host) {
            return None;
        }
        let entropy = host_utils::shannon_entropy(host);
        (entropy > 4.0).then(|| {
            Signal::new(
                CATEGORY,
                Severity::Medium,
                format!("High-entropy hostname ({:.2} bits/char)", entropy),
                12,
            )
        })
    }

    fn check_path_entropy(&self, record: &UrlRecord) -> Option<Signal> {
        record
            .path
            .split('/')
            .filter(|seg| seg.len() >= 16)
            .map(|seg| host_utils::shannon_entropy(seg))
            .find(|&entropy| entropy > 4.0)
            .map(|entropy| {
                Signal::new(
                    CATEGORY,
                    Severity::Low,
                    format!("High-entropy path segment ({:.2} bits/char)", entropy),
                    10,
                )
            })
    }

    fn check_length(&self, record: &UrlRecord) -> Option<Signal> {
        let len = record.input_len();
        (len > 100).then(|| {
            Signal::new(
                CATEGORY,
                Severity::Low,
                format!("Unusually long URL ({} characters)", len),
                8,
            )
        })
    }

    fn check_over_length(&self, record: &UrlRecord) -> Option<Signal> {
        record.over_length.then(|| {
            Signal::new(
                CATEGORY,
                Severity::Medium,
                "Input exceeds the inspection cap; only the leading portion was analyzed"
                    .to_string(),
                10,
            )
        })
    }

    fn check_hyphens(&self, record: &UrlRecord) -> Option<Signal> {
        let hyphens = record.host.matches('-').count();
        (hyphens >= 4).then(|| {
            Signal::new(
                CATEGORY,
                Severity::Low,
                format!("Hostname contains {} hyphens", hyphens),
                10,
            )
        })
    }

    fn check_digit_heavy_host(&self, record: &UrlRecord) -> Option<Signal> {
        let host = record.lookup_host();
        if host.len() < 6 || host_utils::is_ip_literal(host) {
            return None;
        }
        let total = host.chars().filter(|c| *c != '.').count();
        let digits = host.chars().filter(char::is_ascii_digit).count();
        (total > 0 && digits * 10 > total * 3).then(|| {
            Signal::new(
                CATEGORY,
                Severity::Medium,
                "Hostname is unusually digit-heavy".to_string(),
                10,
            )
        })
    }

    fn check_percent_escapes(&self, record: &UrlRecord) -> Option<Signal> {
        let count = PERCENT_ESCAPE_RE.find_iter(&record.raw).count();
        (count >= 3).then(|| {
            Signal::new(
                CATEGORY,
                Severity::Medium,
                format!("Heavy percent-encoding ({} escapes)", count),
                10,
            )
        })
    }

    fn check_double_encoding(&self, record: &UrlRecord) -> Option<Signal> {
        record.raw.contains("%25").then(|| {
            Signal::new(
                CATEGORY,
                Severity::High,
                "Double percent-encoding detected".to_string(),
                12,
            )
        })
    }

    fn check_punycode(&self, record: &UrlRecord) -> Option<Signal> {
        record.unicode.is_punycode.then(|| {
            Signal::new(
                "unicode",
                Severity::High,
                format!(
                    "Hostname uses punycode encoding; displays as '{}'",
                    record.unicode.safe_display_host
                ),
                20,
            )
        })
    }

    fn check_mixed_script(&self, record: &UrlRecord) -> Option<Signal> {
        record.unicode.has_mixed_script.then(|| {
            Signal::new(
                "unicode",
                Severity::High,
                "Hostname mixes Unicode scripts within a label (homograph pattern)".to_string(),
                25,
            )
        })
    }

    fn check_confusables(&self, record: &UrlRecord) -> Option<Signal> {
        record.unicode.has_confusables.then(|| {
            Signal::new(
                "unicode",
                Severity::High,
                format!(
                    "Hostname contains lookalike characters; genuine form would be '{}'",
                    record.unicode.safe_display_host
                ),
                22,
            )
        })
    }

    fn check_zero_width(&self, record: &UrlRecord) -> Option<Signal> {
        record.unicode.has_zero_width.then(|| {
            Signal::new(
                "unicode",
                Severity::Critical,
                "Hostname contains invisible zero-width characters".to_string(),
                25,
            )
        })
    }

    fn check_executable_path(&self, record: &UrlRecord) -> Option<Signal> {
        let path = record.path.to_lowercase();
        self.executable_exts
            .iter()
            .find(|ext| path.ends_with(ext.as_str()))
            .map(|ext| {
                Signal::new(
                    CATEGORY,
                    Severity::High,
                    format!("Path points at an executable download ({})", ext),
                    15,
                )
            })
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(url: &str) -> DetectorReport {
        LexicalHeuristics::new().analyze(&UrlRecord::parse(url))
    }

    #[test]
    fn test_clean_url_votes_safe() {
        let report = analyze("https://www.google.com");
        assert_eq!(report.score, 0);
        assert_eq!(report.vote, Verdict::Safe);
        assert!(report.signals.is_empty());
    }

    #[test]
    fn test_ip_host_plus_http() {
        let report = analyze("http://192.168.1.1/login.php");
        assert_eq!(report.vote, Verdict::Malicious);
        let messages: Vec<&str> = report.signals.iter().map(|s| s.message.as_str()).collect();
        assert!(messages.iter().any(|m| m.contains("raw IP address")));
        assert!(messages.iter().any(|m| m.contains("plain HTTP")));
        assert!(messages.iter().any(|m| m.contains("Credential-harvesting")));
    }

    #[test]
    fn test_shortener_is_suspicious_not_malicious() {
        let report = analyze("https://bit.ly/x3Yz123");
        assert_eq!(report.score, 18);
        assert_eq!(report.vote, Verdict::Suspicious);
    }

    #[test]
    fn test_suspicious_tld_and_credential_path() {
        let report = analyze("https://paypa1-secure.tk/login");
        assert!(report.score > SUSPICIOUS_THRESHOLD);
        assert_eq!(report.vote, Verdict::Malicious);
        let messages: Vec<&str> = report.signals.iter().map(|s| s.message.as_str()).collect();
        assert!(messages.iter().any(|m| m.contains(".tk")));
        assert!(messages.iter().any(|m| m.contains("'login'")));
    }

    #[test]
    fn test_dangerous_scheme() {
        let report = analyze("javascript:alert(document.cookie)");
        assert!(report.signals.iter().any(|s| s.severity == Severity::Critical));
    }

    #[test]
    fn test_embedded_url_and_redirect() {
        let report = analyze("https://example.com/out?redirect=https://evil.example");
        let messages: Vec<&str> = report.signals.iter().map(|s| s.message.as_str()).collect();
        assert!(messages.iter().any(|m| m.contains("embeds another URL")));
        assert!(messages.iter().any(|m| m.contains("Redirect parameter")));
    }

    #[test]
    fn test_userinfo_trick() {
        let report = analyze("https://paypal.com@evil.example/signin");
        assert!(report
            .signals
            .iter()
            .any(|s| s.message.contains("user@host")));
    }

    #[test]
    fn test_score_clamped_to_100() {
        let report =
            analyze("http://paypal.com@192.168.1.1:8081/login/verify.exe?password=1&redirect=http://evil.tk");
        assert!(report.score <= 100);
        assert_eq!(report.vote, Verdict::Malicious);
    }

    #[test]
    fn test_malformed_input_is_flagged_not_fatal() {
        let report = analyze("");
        assert!(report
            .signals
            .iter()
            .any(|s| s.message.contains("could not be fully parsed")));
        assert_eq!(report.vote, Verdict::Suspicious);
    }

    #[test]
    fn test_homograph_signals_present() {
        let report = analyze("https://g\u{043e}\u{043e}gle.com");
        let messages: Vec<&str> = report.signals.iter().map(|s| s.message.as_str()).collect();
        assert!(messages.iter().any(|m| m.contains("punycode")));
        assert!(messages.iter().any(|m| m.contains("mixes Unicode scripts")));
        assert!(messages.iter().any(|m| m.contains("lookalike characters")));
        assert_eq!(report.vote, Verdict::Malicious);
    }

    #[test]
    fn test_deterministic_signal_order() {
        let a = analyze("http://login.verify.account.example.tk/update?password=x");
        let b = analyze("http://login.verify.account.example.tk/update?password=x");
        let msgs_a: Vec<&String> = a.signals.iter().map(|s| &s.message).collect();
        let msgs_b: Vec<&String> = b.signals.iter().map(|s| &s.message).collect();
        assert_eq!(msgs_a, msgs_b);
    }
}
