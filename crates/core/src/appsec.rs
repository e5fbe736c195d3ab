//! Application Security configurations, security policies and rate policies

use crate::report::{cell, value_cell, Table};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Keys the configs list may be wrapped in
pub const CONFIG_KEYS: &[&str] = &["configurations", "configs"];

/// Security configuration from `appsec/v1/configs`
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppSecConfig {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub config_id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub config_name: Option<String>,
    /// Either a bare version number or `{"version": n, ...}`
    #[serde(default)]
    pub latest_version: Option<Value>,
}

impl AppSecConfig {
    pub fn config_id(&self) -> Option<u64> {
        self.id.or(self.config_id)
    }

    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().or(self.config_name.as_deref())
    }

    pub fn latest_version(&self) -> Option<u64> {
        match self.latest_version.as_ref()? {
            Value::Number(n) => n.as_u64(),
            Value::Object(map) => map.get("version").and_then(Value::as_u64),
            _ => None,
        }
        .filter(|v| *v > 0)
    }
}

/// Rate policy from `appsec/v1/configs/{id}/versions/{v}/rate-policies`
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RatePolicy {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub average_threshold: Option<u64>,
    #[serde(default)]
    pub burst_threshold: Option<u64>,
    #[serde(default)]
    pub client_identifier: Option<Value>,
}

/// Per-configuration counts gathered by the reporter
#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct ConfigSummary {
    pub config_id: Option<u64>,
    pub config_name: Option<String>,
    pub latest_version: Option<u64>,
    pub policies: usize,
    pub rate_policies: Vec<RatePolicy>,
}

impl ConfigSummary {
    pub fn new(config: &AppSecConfig) -> Self {
        Self {
            config_id: config.config_id(),
            config_name: config.display_name().map(str::to_string),
            latest_version: config.latest_version(),
            ..Default::default()
        }
    }
}

/// Rows for `appsec_summary.csv`
pub fn appsec_summary_table(configs: &[ConfigSummary]) -> Table {
    let mut table = Table::new(&[
        "config_id",
        "config_name",
        "latest_version",
        "num_policies",
        "num_rate_policies",
    ]);
    for c in configs {
        table.push(vec![
            cell(c.config_id),
            cell(c.config_name.clone()),
            cell(c.latest_version),
            c.policies.to_string(),
            c.rate_policies.len().to_string(),
        ]);
    }
    table
}

/// Rows for `rate_policies.csv`, one per rate policy across every configuration
pub fn rate_policies_table(configs: &[ConfigSummary]) -> Table {
    let mut table = Table::new(&[
        "config_id",
        "policy_id",
        "name",
        "average_threshold",
        "burst_threshold",
        "client_identifier",
    ]);
    for c in configs {
        for p in &c.rate_policies {
            table.push(vec![
                cell(c.config_id),
                cell(p.id),
                cell(p.name.clone()),
                cell(p.average_threshold),
                cell(p.burst_threshold),
                value_cell(p.client_identifier.as_ref()),
            ]);
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::parse_items;
    use serde_json::json;

    #[test]
    fn test_config_field_fallbacks() {
        let configs: Vec<AppSecConfig> = parse_items(
            &json!({"configurations": [
                {"id": 11, "name": "Main", "latestVersion": 4},
                {"configId": 12, "configName": "Legacy", "latestVersion": {"version": 9}},
                {"id": 13, "name": "Never versioned"}
            ]}),
            CONFIG_KEYS,
        );

        assert_eq!(configs.len(), 3);
        assert_eq!(configs[0].config_id(), Some(11));
        assert_eq!(configs[0].latest_version(), Some(4));
        assert_eq!(configs[1].config_id(), Some(12));
        assert_eq!(configs[1].display_name(), Some("Legacy"));
        assert_eq!(configs[1].latest_version(), Some(9));
        assert_eq!(configs[2].latest_version(), None);
    }

    #[test]
    fn test_summary_tables() {
        let config = AppSecConfig {
            id: Some(11),
            name: Some("Main".to_string()),
            latest_version: Some(json!(4)),
            ..Default::default()
        };
        let mut summary = ConfigSummary::new(&config);
        summary.policies = 2;
        summary.rate_policies = parse_items(
            &json!({"ratePolicies": [
                {"id": 501, "name": "Origin Error", "averageThreshold": 5, "burstThreshold": 8, "clientIdentifier": "ip"}
            ]}),
            &["ratePolicies"],
        );

        let appsec = appsec_summary_table(std::slice::from_ref(&summary));
        let rates = rate_policies_table(&[summary]);

        assert_eq!(
            appsec.rows[0],
            vec!["11", "Main", "4", "2", "1"]
                .into_iter()
                .map(String::from)
                .collect::<Vec<_>>()
        );
        assert_eq!(rates.len(), 1);
        assert_eq!(rates.get(0, "config_id"), Some("11"));
        assert_eq!(rates.get(0, "client_identifier"), Some("ip"));
    }
}
