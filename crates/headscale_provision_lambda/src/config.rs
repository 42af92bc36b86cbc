use headscale_provision_core::config_paths::validate_stack_name;
use headscale_provision_core::contract::DEFAULT_STACK_NAME;
use headscale_provision_core::provisioning_graph::ReconcilerKind;
use thiserror::Error;

pub const RECONCILER_ENV: &str = "RECONCILER";
pub const DEFAULT_STACK_NAME_ENV: &str = "DEFAULT_STACK_NAME";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("RECONCILER must be configured")]
    MissingReconciler,
    #[error("invalid RECONCILER: {0}")]
    InvalidReconciler(String),
    #[error("invalid DEFAULT_STACK_NAME: {0}")]
    InvalidStackName(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub reconciler: ReconcilerKind,
    pub default_stack_name: String,
}

impl RuntimeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let reconciler = lookup(RECONCILER_ENV)
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::MissingReconciler)?
            .parse::<ReconcilerKind>()
            .map_err(ConfigError::InvalidReconciler)?;

        let default_stack_name = lookup(DEFAULT_STACK_NAME_ENV)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_STACK_NAME.to_string());
        validate_stack_name(&default_stack_name)
            .map_err(|error| ConfigError::InvalidStackName(error.to_string()))?;

        Ok(Self {
            reconciler,
            default_stack_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |name| values.get(name).cloned()
    }

    #[test]
    fn defaults_stack_name() {
        let config = RuntimeConfig::from_lookup(lookup_from(&[("RECONCILER", "network-config")]))
            .expect("config should load");
        assert_eq!(
            config,
            RuntimeConfig {
                reconciler: ReconcilerKind::NetworkConfig,
                default_stack_name: "headscale".to_string(),
            }
        );
    }

    #[test]
    fn reads_stack_name_override() {
        let config = RuntimeConfig::from_lookup(lookup_from(&[
            ("RECONCILER", "zone-domain"),
            ("DEFAULT_STACK_NAME", "tailnet-prod"),
        ]))
        .expect("config should load");
        assert_eq!(config.default_stack_name, "tailnet-prod");
    }

    #[test]
    fn requires_reconciler() {
        let error = RuntimeConfig::from_lookup(lookup_from(&[])).expect_err("missing reconciler");
        assert_eq!(error, ConfigError::MissingReconciler);
    }

    #[test]
    fn rejects_unknown_reconciler() {
        let error = RuntimeConfig::from_lookup(lookup_from(&[("RECONCILER", "vpc")]))
            .expect_err("unknown reconciler");
        assert!(error.to_string().contains("vpc"));
    }

    #[test]
    fn rejects_stack_name_with_separator() {
        let error = RuntimeConfig::from_lookup(lookup_from(&[
            ("RECONCILER", "network-config"),
            ("DEFAULT_STACK_NAME", "a/b"),
        ]))
        .expect_err("separator is rejected");
        assert!(matches!(error, ConfigError::InvalidStackName(_)));
    }
}
