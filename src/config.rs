use crate::features::brand::{self, BrandEntry};
use crate::features::threat_intel::ThreatEntry;
use crate::features::tld_risk::{self, TldInfo};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Optional overrides for the engine's static tables. Any section left
/// out falls back to the bundled defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub brands: Option<Vec<BrandEntry>>,
    #[serde(default)]
    pub tlds: Option<HashMap<String, TldInfo>>,
    #[serde(default)]
    pub blocklist: Option<Vec<ThreatEntry>>,
}

impl EngineConfig {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: EngineConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// The bundled tables written out explicitly, as a starting point for
    /// a customized config file.
    pub fn bundled() -> Self {
        Self {
            brands: Some(brand::default_brand_list()),
            tlds: Some(tld_risk::default_tld_table()),
            blocklist: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_round_trips() {
        let yaml = serde_yaml::to_string(&EngineConfig::default()).unwrap();
        let parsed: EngineConfig = serde_yaml::from_str(&yaml).unwrap();
        assert!(parsed.brands.is_none());
        assert!(parsed.tlds.is_none());
        assert!(parsed.blocklist.is_none());
    }

    #[test]
    fn test_bundled_config_serializes() {
        let yaml = serde_yaml::to_string(&EngineConfig::bundled()).unwrap();
        assert!(yaml.contains("paypal.com"));
        let parsed: EngineConfig = serde_yaml::from_str(&yaml).unwrap();
        assert!(!parsed.brands.unwrap().is_empty());
    }

    #[test]
    fn test_partial_config_parses() {
        let yaml = "brands:\n  - name: examplecorp\n    domains: [examplecorp.com]\n";
        let parsed: EngineConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(parsed.brands.unwrap()[0].name, "examplecorp");
        assert!(parsed.tlds.is_none());
    }
}
