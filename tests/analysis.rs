use qrshield::{analyze_hostname, AnalysisEngine, Verdict};

#[test]
fn analysis_is_total_over_adversarial_inputs() {
    let engine = AnalysisEngine::new();
    let inputs = [
        String::new(),
        " ".to_string(),
        "\u{0000}\u{0001}\u{0002}\u{0003}".to_string(),
        "%".repeat(300),
        ":".repeat(300),
        "a".repeat(3000),
        format!("https://{}.com", "sub.".repeat(200)),
        format!("https://example.com/?q={}", "%41".repeat(1000)),
        "ht!tp://bro ken/ pa th".to_string(),
        "https://ドメイン.テスト/パス".to_string(),
    ];

    for input in &inputs {
        let result = engine.analyze(input);
        assert!(result.score <= 100);
        assert!((1..=5).contains(&result.confidence));
        assert_eq!(result.flags.len(), result.signals.len());
    }
}

#[test]
fn identical_input_yields_identical_result() {
    let engine = AnalysisEngine::new();
    for url in [
        "https://www.google.com",
        "https://paypa1-secure.tk/login",
        "http://192.168.1.1/admin",
        "not-even-a-url",
    ] {
        let a = engine.analyze(url);
        let b = engine.analyze(url);
        assert_eq!(a.score, b.score);
        assert_eq!(a.verdict, b.verdict);
        assert_eq!(a.confidence, b.confidence);
        assert_eq!(a.flags, b.flags);
    }
}

#[test]
fn blocklisted_domain_is_always_malicious() {
    let engine = AnalysisEngine::new();
    // Lexically bland presentations of a blocklisted domain
    for url in [
        "https://secure-paypal-alerts.com",
        "https://www.secure-paypal-alerts.com/",
        "https://secure-paypal-alerts.com./help",
    ] {
        let result = engine.analyze(url);
        assert_eq!(result.verdict, Verdict::Malicious, "failed for {}", url);
        assert!(result.diagnostics.is_known_bad);
    }
}

#[test]
fn legitimate_brand_domains_never_trigger_brand_signal() {
    let engine = AnalysisEngine::new();
    for url in [
        "https://paypal.com",
        "https://www.paypal.com/signin",
        "https://apple.com",
        "https://www.amazon.com/dp/B08ABC123",
        "https://accounts.google.com",
    ] {
        let result = engine.analyze(url);
        assert!(
            !result.flags.iter().any(|f| f.contains("typosquat")),
            "brand signal on legitimate domain {}: {:?}",
            url,
            result.flags
        );
    }
}

#[test]
fn benign_reference_urls_stay_safe() {
    let engine = AnalysisEngine::new();
    for url in [
        "https://www.google.com",
        "https://github.com/user/repo",
        "https://en.wikipedia.org/wiki/Rust_(programming_language)",
        "https://stackoverflow.com/questions/123",
    ] {
        let result = engine.analyze(url);
        assert_eq!(result.verdict, Verdict::Safe, "misfired on {}", url);
    }
}

#[test]
fn google_reference_example() {
    let engine = AnalysisEngine::new();
    let result = engine.analyze("https://www.google.com");
    assert_eq!(result.verdict, Verdict::Safe);
    assert!(result.score <= 15);
    assert!(result.flags.len() <= 1);
}

#[test]
fn paypal_typosquat_reference_example() {
    let engine = AnalysisEngine::new();
    let result = engine.analyze("https://paypa1-secure.tk/login");
    assert_eq!(result.verdict, Verdict::Malicious);
    assert!(result.score >= 80, "score was {}", result.score);

    let flags = result.flags.join(" | ");
    assert!(flags.contains("paypal"));
    assert!(flags.contains(".tk"));
    assert!(flags.contains("login"));
}

#[test]
fn cyrillic_homograph_reference_example() {
    let engine = AnalysisEngine::new();
    let host = "g\u{043e}\u{043e}gle.com";

    let unicode = analyze_hostname(host);
    assert!(unicode.has_mixed_script);
    assert!(unicode.has_confusables);
    assert_eq!(unicode.safe_display_host, "google.com");

    let result = engine.analyze(&format!("https://{}/", host));
    assert!(matches!(
        result.verdict,
        Verdict::Malicious | Verdict::Suspicious
    ));
    assert!(result
        .flags
        .iter()
        .any(|f| f.contains("lookalike") || f.contains("Unicode") || f.contains("punycode")));
}

#[test]
fn empty_and_garbage_input_never_report_safe() {
    let engine = AnalysisEngine::new();
    for input in ["", "   ", "\u{0007}", "http://"] {
        let result = engine.analyze(input);
        assert_ne!(result.verdict, Verdict::Safe, "fabricated SAFE for {:?}", input);
    }
}

#[test]
fn shared_engine_is_consistent_across_threads() {
    use std::sync::Arc;

    let engine = Arc::new(AnalysisEngine::new());
    let expected = engine.analyze("https://paypa1-secure.tk/login");

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            std::thread::spawn(move || engine.analyze("https://paypa1-secure.tk/login"))
        })
        .collect();

    for handle in handles {
        let result = handle.join().unwrap();
        assert_eq!(result.score, expected.score);
        assert_eq!(result.verdict, expected.verdict);
        assert_eq!(result.flags, expected.flags);
    }
}
