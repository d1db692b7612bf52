//! Contract configuration
use aquatrace_core::LedgerError;
use aquatrace_scoring::EU_DIRECTIVE_98_83_EC;
use serde::{Deserialize, Serialize};

/// Alert type written on every quality alert
pub const QUALITY_VIOLATION: &str = "QUALITY_VIOLATION";

/// Tunables for one deployment of the quality contract.
///
/// ```yaml
/// regulation: EU_DIRECTIVE_98_83_EC
/// alert_actions: [INSPECTION_REQUIRED, NOTIFY_AUTHORITIES]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Threshold document records are scored against
    pub regulation: String,
    /// Follow-up actions attached to every raised alert
    pub alert_actions: Vec<String>,
    pub alert_type: String,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            regulation: EU_DIRECTIVE_98_83_EC.to_string(),
            alert_actions: vec![
                "INSPECTION_REQUIRED".to_string(),
                "NOTIFY_AUTHORITIES".to_string(),
            ],
            alert_type: QUALITY_VIOLATION.to_string(),
        }
    }
}

impl ContractConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, LedgerError> {
        let config: ContractConfig = serde_yaml::from_str(yaml)
            .map_err(|e| LedgerError::Deserialization(format!("contract config: {}", e)))?;
        crate::keys::validate_identifier("regulation", &config.regulation)?;
        Ok(config)
    }

    pub fn with_regulation(mut self, regulation: impl Into<String>) -> Self {
        self.regulation = regulation.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ContractConfig::default();
        assert_eq!(config.regulation, "EU_DIRECTIVE_98_83_EC");
        assert_eq!(config.alert_actions.len(), 2);
        assert_eq!(config.alert_type, "QUALITY_VIOLATION");
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = ContractConfig::from_yaml("regulation: FR_ARRETE_2007_01_11\n").unwrap();
        assert_eq!(config.regulation, "FR_ARRETE_2007_01_11");
        assert_eq!(config.alert_actions, ContractConfig::default().alert_actions);
    }

    #[test]
    fn test_bad_regulation_rejected() {
        let err = ContractConfig::from_yaml("regulation: \"EU:98\"\n").unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        let err = ContractConfig::from_yaml("alert_actions: 7\n").unwrap_err();
        assert!(matches!(err, LedgerError::Deserialization(_)));
    }
}
