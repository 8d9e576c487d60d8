use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use unicode_normalization::UnicodeNormalization;
use unicode_script::{Script, UnicodeScript};

/// Outcome of inspecting a hostname for IDN and homograph tricks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnicodeAnalysis {
    pub has_risk: bool,
    pub is_punycode: bool,
    pub has_mixed_script: bool,
    pub has_confusables: bool,
    pub has_zero_width: bool,
    /// Hostname with confusable characters folded to their Latin skeleton
    /// and invisible characters removed.
    pub safe_display_host: String,
}

impl UnicodeAnalysis {
    pub fn clean(host: &str) -> Self {
        Self {
            has_risk: false,
            is_punycode: false,
            has_mixed_script: false,
            has_confusables: false,
            has_zero_width: false,
            safe_display_host: host.to_string(),
        }
    }
}

pub struct UnicodeAnalyzer {
    confusable_map: HashMap<char, char>,
    zero_width_chars: Vec<char>,
}

impl Default for UnicodeAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl UnicodeAnalyzer {
    pub fn new() -> Self {
        let mut confusable_map = HashMap::new();

        // Cyrillic to Latin
        confusable_map.insert('а', 'a');
        confusable_map.insert('е', 'e');
        confusable_map.insert('о', 'o');
        confusable_map.insert('р', 'p');
        confusable_map.insert('с', 'c');
        confusable_map.insert('х', 'x');
        confusable_map.insert('у', 'y');
        confusable_map.insert('і', 'i');
        confusable_map.insert('ѕ', 's');
        confusable_map.insert('ј', 'j');
        confusable_map.insert('һ', 'h');
        confusable_map.insert('ԁ', 'd');
        confusable_map.insert('ѡ', 'w');
        confusable_map.insert('ԛ', 'q');
        confusable_map.insert('ь', 'b');

        // Greek to Latin
        confusable_map.insert('α', 'a');
        confusable_map.insert('ο', 'o');
        confusable_map.insert('ν', 'v');
        confusable_map.insert('ι', 'i');
        confusable_map.insert('κ', 'k');
        confusable_map.insert('ρ', 'p');
        confusable_map.insert('τ', 't');
        confusable_map.insert('υ', 'u');
        confusable_map.insert('ω', 'w');

        // Mathematical alphanumerics (lowercase bold block, most common in abuse)
        for (i, ch) in ('𝐚'..='𝐳').enumerate() {
            confusable_map.insert(ch, (b'a' + i as u8) as char);
        }

        Self {
            confusable_map,
            zero_width_chars: vec!['\u{200B}', '\u{200C}', '\u{200D}', '\u{2060}', '\u{FEFF}'],
        }
    }

    /// Inspect a hostname. Accepts either Unicode or punycode (`xn--`) form;
    /// punycode labels are decoded before the character checks run.
    pub fn analyze(&self, host: &str) -> UnicodeAnalysis {
        if host.is_empty() {
            return UnicodeAnalysis::clean(host);
        }

        let is_punycode = host
            .split('.')
            .any(|label| label.to_ascii_lowercase().starts_with("xn--"));

        // Decoding never fails hard: idna reports errors alongside a
        // best-effort string, which is all the character checks need.
        let decoded = if is_punycode {
            let (unicode, _errors) = idna::domain_to_unicode(host);
            unicode
        } else {
            host.to_string()
        };

        let has_zero_width = decoded
            .chars()
            .any(|ch| self.zero_width_chars.contains(&ch));
        let has_confusables = decoded
            .chars()
            .any(|ch| self.confusable_map.contains_key(&ch));
        let has_mixed_script = self.has_mixed_script_label(&decoded);

        let safe_display_host: String = decoded
            .chars()
            .filter(|ch| !self.zero_width_chars.contains(ch))
            .map(|ch| *self.confusable_map.get(&ch).unwrap_or(&ch))
            .collect();

        UnicodeAnalysis {
            has_risk: is_punycode || has_mixed_script || has_confusables || has_zero_width,
            is_punycode,
            has_mixed_script,
            has_confusables,
            has_zero_width,
            safe_display_host,
        }
    }

    /// More than one real script inside a single label is the classic
    /// homograph shape; whole-host mixing across labels is legitimate.
    fn has_mixed_script_label(&self, host: &str) -> bool {
        let normalized: String = host.nfc().collect();
        for label in normalized.split('.') {
            let mut scripts = std::collections::HashSet::new();
            for ch in label.chars() {
                if ch == '-' || ch.is_ascii_digit() {
                    continue;
                }
                let script = ch.script();
                if script == Script::Common || script == Script::Inherited {
                    continue;
                }
                scripts.insert(script);
            }
            if scripts.len() > 1 {
                return true;
            }
        }
        false
    }
}

lazy_static! {
    static ref DEFAULT_ANALYZER: UnicodeAnalyzer = UnicodeAnalyzer::new();
}

/// Analyze a hostname with the default confusable tables.
pub fn analyze_hostname(host: &str) -> UnicodeAnalysis {
    DEFAULT_ANALYZER.analyze(host)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_ascii_host_is_clean() {
        let result = analyze_hostname("www.google.com");
        assert!(!result.has_risk);
        assert!(!result.is_punycode);
        assert!(!result.has_mixed_script);
        assert!(!result.has_confusables);
        assert!(!result.has_zero_width);
        assert_eq!(result.safe_display_host, "www.google.com");
    }

    #[test]
    fn test_cyrillic_homograph() {
        // "gооgle.com" with two Cyrillic о characters
        let result = analyze_hostname("g\u{043e}\u{043e}gle.com");
        assert!(result.has_risk);
        assert!(result.has_mixed_script);
        assert!(result.has_confusables);
        assert_eq!(result.safe_display_host, "google.com");
    }

    #[test]
    fn test_punycode_label_detected_and_decoded() {
        // The ASCII form of the Cyrillic homograph round-trips through idna.
        let ascii = idna::domain_to_ascii("g\u{043e}\u{043e}gle.com").unwrap();
        assert!(ascii.starts_with("xn--"));
        let result = analyze_hostname(&ascii);
        assert!(result.is_punycode);
        assert!(result.has_risk);
        assert!(result.has_confusables);
        assert_eq!(result.safe_display_host, "google.com");
    }

    #[test]
    fn test_zero_width_characters() {
        let result = analyze_hostname("goo\u{200B}gle.com");
        assert!(result.has_zero_width);
        assert_eq!(result.safe_display_host, "google.com");
    }

    #[test]
    fn test_pure_cyrillic_label_is_not_mixed() {
        // A fully Cyrillic label is a legitimate IDN, not a mixed-script one.
        let result = analyze_hostname("почта.рф");
        assert!(!result.has_mixed_script);
    }

    #[test]
    fn test_empty_host() {
        let result = analyze_hostname("");
        assert!(!result.has_risk);
        assert_eq!(result.safe_display_host, "");
    }
}
