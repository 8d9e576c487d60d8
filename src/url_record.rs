use crate::unicode_analysis::{self, UnicodeAnalysis};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

/// Inputs longer than this are analyzed up to the cap and flagged.
pub const MAX_INSPECTED_LEN: usize = 2048;

lazy_static! {
    static ref SCHEME_RE: Regex = Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*:").unwrap();
}

/// Structured view of one input URL. Parsing is total: malformed input
/// produces a best-effort record with `malformed` set, never an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlRecord {
    pub raw: String,
    pub scheme: String,
    /// Hostname as parsed, lowercased; IDN hosts appear in punycode form.
    pub host: String,
    pub port: Option<u16>,
    pub path: String,
    pub query: Option<String>,
    pub fragment: Option<String>,
    pub has_userinfo: bool,
    pub had_scheme: bool,
    pub malformed: bool,
    pub over_length: bool,
    pub unicode: UnicodeAnalysis,
}

impl UrlRecord {
    pub fn parse(input: &str) -> Self {
        let over_length = input.len() > MAX_INSPECTED_LEN;
        let capped = cap_at_char_boundary(input, MAX_INSPECTED_LEN);
        let trimmed = capped.trim();

        let had_scheme = SCHEME_RE.is_match(trimmed);
        let candidate = if had_scheme {
            trimmed.to_string()
        } else {
            // Scheme-less input is analyzed as if it were https, and the
            // omission itself is reported as a lexical signal.
            format!("https://{}", trimmed)
        };

        let mut record = match Url::parse(&candidate) {
            Ok(parsed) => Self::from_parsed(input, &parsed, had_scheme, over_length),
            Err(_) => Self::from_fallback(input, trimmed, had_scheme, over_length),
        };

        record.unicode = unicode_analysis::analyze_hostname(&record.host);
        record
    }

    fn from_parsed(raw: &str, parsed: &Url, had_scheme: bool, over_length: bool) -> Self {
        Self {
            raw: raw.to_string(),
            scheme: parsed.scheme().to_ascii_lowercase(),
            host: parsed.host_str().unwrap_or("").to_ascii_lowercase(),
            port: parsed.port(),
            path: parsed.path().to_string(),
            query: parsed.query().map(str::to_string),
            fragment: parsed.fragment().map(str::to_string),
            has_userinfo: !parsed.username().is_empty() || parsed.password().is_some(),
            had_scheme,
            malformed: false,
            over_length,
            unicode: UnicodeAnalysis::clean(""),
        }
    }

    /// Manual split for input the strict parser rejects. Keeps whatever
    /// structure is recoverable so the detectors still have something to
    /// inspect.
    fn from_fallback(raw: &str, trimmed: &str, had_scheme: bool, over_length: bool) -> Self {
        let (scheme, rest) = match trimmed.split_once("://") {
            Some((s, r)) => (s.to_ascii_lowercase(), r),
            None => match SCHEME_RE.find(trimmed) {
                Some(m) => (
                    trimmed[..m.end() - 1].to_ascii_lowercase(),
                    &trimmed[m.end()..],
                ),
                None => (String::new(), trimmed),
            },
        };

        let (before_fragment, fragment) = match rest.split_once('#') {
            Some((b, f)) => (b, Some(f.to_string())),
            None => (rest, None),
        };
        let (before_query, query) = match before_fragment.split_once('?') {
            Some((b, q)) => (b, Some(q.to_string())),
            None => (before_fragment, None),
        };
        let (authority, path) = match before_query.split_once('/') {
            Some((a, p)) => (a, format!("/{}", p)),
            None => (before_query, String::from("/")),
        };

        let has_userinfo = authority.contains('@');
        let host_port = authority.rsplit('@').next().unwrap_or(authority);
        let (host, port) = match host_port.rsplit_once(':') {
            Some((h, p)) if p.chars().all(|c| c.is_ascii_digit()) && !p.is_empty() => {
                (h, p.parse::<u16>().ok())
            }
            _ => (host_port, None),
        };

        Self {
            raw: raw.to_string(),
            scheme,
            host: host.trim_end_matches('.').to_lowercase(),
            port,
            path,
            query,
            fragment,
            has_userinfo,
            had_scheme,
            malformed: true,
            over_length,
            unicode: UnicodeAnalysis::clean(""),
        }
    }

    /// Hostname normalized for table lookups: lowercase, no `www.` prefix,
    /// no trailing dot.
    pub fn lookup_host(&self) -> &str {
        crate::host_utils::strip_www(self.host.trim_end_matches('.'))
    }

    /// Total length of the original input in bytes.
    pub fn input_len(&self) -> usize {
        self.raw.len()
    }
}

fn cap_at_char_boundary(input: &str, max: usize) -> &str {
    if input.len() <= max {
        return input;
    }
    let mut end = max;
    while end > 0 && !input.is_char_boundary(end) {
        end -= 1;
    }
    &input[..end]
}
