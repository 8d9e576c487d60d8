use clap::{Arg, Command};
use log::LevelFilter;
use qrshield::unicode_analysis;
use qrshield::{AnalysisEngine, AnalysisResult, EngineConfig, Verdict};
use std::process;

fn main() {
    let matches = Command::new("qrshield")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Offline phishing URL analyzer with multi-detector consensus voting")
        .arg(
            Arg::new("url")
                .value_name("URL")
                .num_args(0..)
                .help("URLs to analyze"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path (YAML)"),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Write the bundled tables as a starting config file")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Emit results as JSON")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("unicode")
                .long("unicode")
                .help("Run only the hostname Unicode analysis")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let verbose = matches.get_flag("verbose");
    env_logger::Builder::from_default_env()
        .filter_level(if verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        })
        .init();

    if let Some(path) = matches.get_one::<String>("generate-config") {
        match EngineConfig::bundled().to_file(path) {
            Ok(()) => {
                println!("Configuration written to {}", path);
                return;
            }
            Err(e) => {
                eprintln!("Failed to write configuration: {}", e);
                process::exit(1);
            }
        }
    }

    let urls: Vec<String> = matches
        .get_many::<String>("url")
        .map(|v| v.cloned().collect())
        .unwrap_or_default();
    if urls.is_empty() {
        eprintln!("No URLs given. Try: qrshield https://example.com");
        process::exit(2);
    }

    if matches.get_flag("unicode") {
        for url in &urls {
            let analysis = unicode_analysis::analyze_hostname(url);
            if matches.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&analysis).unwrap());
            } else {
                println!("{}", url);
                println!("  punycode:      {}", analysis.is_punycode);
                println!("  mixed script:  {}", analysis.has_mixed_script);
                println!("  confusables:   {}", analysis.has_confusables);
                println!("  zero-width:    {}", analysis.has_zero_width);
                println!("  safe display:  {}", analysis.safe_display_host);
            }
        }
        return;
    }

    let engine = match matches.get_one::<String>("config") {
        Some(path) => match EngineConfig::from_file(path) {
            Ok(config) => AnalysisEngine::from_config(&config),
            Err(e) => {
                eprintln!("Failed to load config {}: {}", path, e);
                process::exit(1);
            }
        },
        None => AnalysisEngine::new(),
    };

    let mut worst = Verdict::Safe;
    for url in &urls {
        let result = engine.analyze(url);
        if matches.get_flag("json") {
            println!("{}", serde_json::to_string_pretty(&result).unwrap());
        } else {
            print_result(&result);
        }
        worst = match (worst, result.verdict) {
            (_, Verdict::Malicious) | (Verdict::Malicious, _) => Verdict::Malicious,
            (_, Verdict::Suspicious) | (Verdict::Suspicious, _) => Verdict::Suspicious,
            _ => Verdict::Safe,
        };
    }

    process::exit(match worst {
        Verdict::Safe => 0,
        Verdict::Suspicious => 1,
        Verdict::Malicious => 2,
    });
}

fn print_result(result: &AnalysisResult) {
    let marker = match result.verdict {
        Verdict::Safe => "✅",
        Verdict::Suspicious => "⚠️",
        Verdict::Malicious => "❌",
    };
    println!(
        "{} {} -> {} (score {}/100, confidence {}/5)",
        marker, result.url, result.verdict, result.score, result.confidence
    );
    for flag in &result.flags {
        println!("   • {}", flag);
    }
    let d = &result.diagnostics;
    println!(
        "   votes: lexical={} ml={} brand={} tld={}  (model score {}%)",
        d.votes.heuristic, d.votes.ml, d.votes.brand, d.votes.tld, d.ml_score
    );
    if d.is_known_bad {
        println!("   domain is on the known-bad blocklist");
    }
}
