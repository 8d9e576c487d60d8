use std::net::{Ipv4Addr, Ipv6Addr};

/// Second-level labels that act as a public suffix under a two-letter ccTLD
/// (e.g. `co.uk`, `com.au`).
const SECOND_LEVEL_SUFFIXES: &[&str] = &["co", "com", "org", "net", "ac", "gov", "edu"];

/// Shannon entropy of a string in bits per character.
pub fn shannon_entropy(text: &str) -> f64 {
    if text.is_empty() {
        return 0.0;
    }

    let mut freq = std::collections::HashMap::new();
    let mut len = 0usize;
    for ch in text.chars() {
        *freq.entry(ch).or_insert(0u32) += 1;
        len += 1;
    }

    let len = len as f64;
    freq.values()
        .map(|&count| {
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// True if the host is a bare IPv4 or IPv6 literal.
pub fn is_ip_literal(host: &str) -> bool {
    let bare = host.trim_start_matches('[').trim_end_matches(']');
    bare.parse::<Ipv4Addr>().is_ok() || bare.parse::<Ipv6Addr>().is_ok()
}

/// Strip a single leading `www.` label.
pub fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

/// The TLD (final label) of a hostname, if it has one.
pub fn tld_of(host: &str) -> Option<&str> {
    let parts: Vec<&str> = host.split('.').collect();
    if parts.len() >= 2 {
        parts.last().copied().filter(|t| !t.is_empty())
    } else {
        None
    }
}

/// The registrable label of a hostname: the label directly left of the
/// public suffix, with subdomains excluded. `login.paypal.com` -> `paypal`,
/// `amazon.co.uk` -> `amazon`.
pub fn registrable_label(host: &str) -> &str {
    let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();
    match labels.len() {
        0 => "",
        1 => labels[0],
        2 => labels[0],
        n => {
            let tld = labels[n - 1];
            let second = labels[n - 2];
            if tld.len() == 2 && SECOND_LEVEL_SUFFIXES.contains(&second) {
                labels[n - 3]
            } else {
                labels[n - 2]
            }
        }
    }
}

/// Number of labels beyond the registrable domain. `a.b.example.com` -> 2.
pub fn subdomain_depth(host: &str) -> usize {
    let labels = host.split('.').filter(|l| !l.is_empty()).count();
    labels.saturating_sub(2)
}

/// Longest run of ASCII consonants, used as a gibberish indicator.
pub fn longest_consonant_run(text: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for ch in text.chars() {
        if ch.is_ascii_alphabetic() && !matches!(ch.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u' | 'y') {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entropy() {
        assert_eq!(shannon_entropy(""), 0.0);
        assert_eq!(shannon_entropy("aaaa"), 0.0);
        // Uniform distribution over four symbols is exactly 2 bits.
        assert!((shannon_entropy("abcd") - 2.0).abs() < 1e-9);
        assert!(shannon_entropy("x9k2qz7f") > shannon_entropy("aaaabbbb"));
    }

    #[test]
    fn test_ip_literal() {
        assert!(is_ip_literal("192.168.1.1"));
        assert!(is_ip_literal("[::1]"));
        assert!(!is_ip_literal("example.com"));
        assert!(!is_ip_literal("999.999.999.999"));
    }

    #[test]
    fn test_registrable_label() {
        assert_eq!(registrable_label("paypal.com"), "paypal");
        assert_eq!(registrable_label("login.paypal.com"), "paypal");
        assert_eq!(registrable_label("amazon.co.uk"), "amazon");
        assert_eq!(registrable_label("localhost"), "localhost");
        assert_eq!(registrable_label(""), "");
    }

    #[test]
    fn test_subdomain_depth() {
        assert_eq!(subdomain_depth("example.com"), 0);
        assert_eq!(subdomain_depth("www.example.com"), 1);
        assert_eq!(subdomain_depth("a.b.c.example.com"), 3);
    }

    #[test]
    fn test_consonant_run() {
        assert_eq!(longest_consonant_run("google"), 2);
        assert_eq!(longest_consonant_run("xkcdqrst"), 8);
        assert_eq!(longest_consonant_run(""), 0);
    }
}
