pub mod config;
pub mod engine;
pub mod features;
pub mod host_utils;
pub mod unicode_analysis;
pub mod url_record;
pub mod verdict;

pub use config::EngineConfig;
pub use engine::{AnalysisEngine, AnalysisResult, Diagnostics};
pub use features::{DetectorReport, Severity, Signal};
pub use unicode_analysis::{analyze_hostname, UnicodeAnalysis};
pub use url_record::UrlRecord;
pub use verdict::{ComponentVotes, Verdict};
