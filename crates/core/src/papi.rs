//! Property Manager (PAPI) models and transformations
//!
//! Covers contract/group pairing, property version selection, hostname records
//! and rule-tree behavior classification. No I/O happens here.

use crate::domain::apex_of;
use crate::report::Table;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

// ============================================================================
// Domain Models (Input from API)
// ============================================================================

/// Contract from `papi/v1/contracts`
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    #[serde(default)]
    pub contract_id: Option<String>,
    #[serde(default)]
    pub contract_type_name: Option<String>,
}

/// Group from `papi/v1/groups`
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub group_name: Option<String>,
    #[serde(default)]
    pub contract_ids: Option<Vec<String>>,
}

/// Property from `papi/v1/properties`
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    #[serde(default)]
    pub property_id: Option<String>,
    #[serde(default)]
    pub property_name: Option<String>,
    #[serde(default)]
    pub contract_id: Option<String>,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub latest_version: Option<u64>,
    #[serde(default)]
    pub production_version: Option<u64>,
    #[serde(default)]
    pub staging_version: Option<u64>,
}

/// Entry from `papi/v1/properties/{id}/versions`
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PropertyVersion {
    #[serde(default)]
    pub property_version: Option<u64>,
    #[serde(default)]
    pub production_status: Option<String>,
    #[serde(default)]
    pub staging_status: Option<String>,
    #[serde(default)]
    pub updated_date: Option<String>,
}

/// Hostname bound to a property version
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PropertyHostname {
    #[serde(default)]
    pub cname_from: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub cname_to: Option<String>,
    #[serde(default)]
    pub edge_hostname_id: Option<String>,
}

impl PropertyHostname {
    /// `cnameFrom`, falling back to `hostname`
    pub fn name(&self) -> Option<&str> {
        self.cname_from
            .as_deref()
            .or(self.hostname.as_deref())
            .filter(|n| !n.is_empty())
    }
}

// ============================================================================
// Output Models
// ============================================================================

/// A contract/group pair accepted by the properties endpoint
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ContractGroupPair {
    pub contract_id: String,
    pub contract_type: String,
    pub group_id: String,
    pub group_name: String,
}

/// A pair that was tested against the properties endpoint
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Combination {
    #[serde(flatten)]
    pub pair: ContractGroupPair,
    pub properties_count: usize,
}

/// One hostname of one property version
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct HostnameRecord {
    pub apex: String,
    pub hostname: String,
    pub property_name: String,
    pub property_id: String,
    pub property_version: u64,
}

/// Behaviors of interest found in a property's rule tree
#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct RuleSummary {
    pub cache: Vec<Value>,
    pub redirects: Vec<Value>,
    pub headers: Vec<Value>,
    pub hsts: Vec<Value>,
}

/// Rule summaries keyed by (property id, property version)
pub type RulesByVersion = HashMap<(String, u64), RuleSummary>;

impl RuleSummary {
    pub fn has_cache(&self) -> bool {
        !self.cache.is_empty()
    }

    pub fn has_redirects(&self) -> bool {
        !self.redirects.is_empty()
    }

    pub fn has_headers(&self) -> bool {
        !self.headers.is_empty()
    }

    pub fn has_hsts(&self) -> bool {
        !self.hsts.is_empty()
    }
}

// ============================================================================
// Pure Transformation Functions
// ============================================================================

/// Every (contract, group) pair where the group lists the contract.
///
/// Order follows contracts first, then groups, as returned by the API.
pub fn contract_group_pairs(contracts: &[Contract], groups: &[Group]) -> Vec<ContractGroupPair> {
    let mut pairs = Vec::new();

    for contract in contracts {
        let Some(contract_id) = contract.contract_id.as_deref() else {
            continue;
        };

        for group in groups {
            let Some(group_id) = group.group_id.as_deref() else {
                continue;
            };

            let matches = group
                .contract_ids
                .as_ref()
                .is_some_and(|ids| ids.iter().any(|id| id == contract_id));

            if matches {
                pairs.push(ContractGroupPair {
                    contract_id: contract_id.to_string(),
                    contract_type: contract
                        .contract_type_name
                        .clone()
                        .unwrap_or_else(|| "Unknown".to_string()),
                    group_id: group_id.to_string(),
                    group_name: group
                        .group_name
                        .clone()
                        .unwrap_or_else(|| "Unknown".to_string()),
                });
            }
        }
    }

    pairs
}

/// Version to inventory: latest, else production, else staging
pub fn select_version(property: &Property) -> Option<u64> {
    [
        property.latest_version,
        property.production_version,
        property.staging_version,
    ]
    .into_iter()
    .flatten()
    .find(|v| *v > 0)
}

/// Drop properties without an id and keep the first occurrence of each id
pub fn dedupe_properties(properties: Vec<Property>) -> Vec<Property> {
    let mut seen = HashSet::new();
    properties
        .into_iter()
        .filter(|p| match p.property_id.as_deref() {
            Some(id) => seen.insert(id.to_string()),
            None => false,
        })
        .collect()
}

/// Hostname records for one property version. Hostnames with no name are skipped.
pub fn hostname_records(
    property: &Property,
    version: u64,
    hostnames: &[PropertyHostname],
) -> Vec<HostnameRecord> {
    let property_id = property.property_id.clone().unwrap_or_default();
    let property_name = property.property_name.clone().unwrap_or_default();

    hostnames
        .iter()
        .filter_map(|h| h.name())
        .map(|name| HostnameRecord {
            apex: apex_of(name),
            hostname: name.to_string(),
            property_name: property_name.clone(),
            property_id: property_id.clone(),
            property_version: version,
        })
        .collect()
}

/// Every node of a rule tree, root included (depth-first over `children`)
pub fn flatten_rules(root: &Value) -> Vec<&Value> {
    let mut nodes = Vec::new();
    let mut stack = vec![root];

    while let Some(current) = stack.pop() {
        nodes.push(current);
        if let Some(Value::Array(children)) = current.get("children") {
            stack.extend(children.iter());
        }
    }

    nodes
}

fn is_hsts_behavior(name: &str, options: &Value) -> bool {
    match name {
        "hsts" | "httpStrictTransportSecurity" | "setHsts" => true,
        "setResponseHeader" => options
            .get("headerName")
            .and_then(Value::as_str)
            .is_some_and(|h| h.eq_ignore_ascii_case("strict-transport-security")),
        _ => false,
    }
}

fn is_empty_options(options: &Value) -> bool {
    match options {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Classify the behaviors of a rule tree into cache, redirect, header and HSTS groups
pub fn summarize_rules(root: &Value) -> RuleSummary {
    let mut summary = RuleSummary::default();

    for node in flatten_rules(root) {
        let Some(Value::Array(behaviors)) = node.get("behaviors") else {
            continue;
        };

        for behavior in behaviors {
            let Some(name) = behavior.get("name").and_then(Value::as_str) else {
                continue;
            };
            let options = behavior
                .get("options")
                .cloned()
                .unwrap_or_else(|| Value::Object(Map::new()));

            match name {
                "caching" => summary.cache.push(options),
                "redirect" | "responseCode" if !is_empty_options(&options) => {
                    summary.redirects.push(options)
                }
                "modifyOutgoingResponseHeader" | "modifyOutgoingRequestHeader" => {
                    let mut entry = Map::new();
                    entry.insert("name".to_string(), Value::String(name.to_string()));
                    if let Value::Object(opts) = options {
                        entry.extend(opts);
                    }
                    summary.headers.push(Value::Object(entry));
                }
                _ if is_hsts_behavior(name, &options) => summary.hsts.push(options),
                _ => {}
            }
        }
    }

    summary
}

/// Rows for `usage_summary.csv`
pub fn usage_summary_table(records: &[HostnameRecord]) -> Table {
    let mut table = Table::new(&[
        "apex",
        "hostname",
        "property_name",
        "property_id",
        "property_version",
    ]);
    for r in records {
        table.push(vec![
            r.apex.clone(),
            r.hostname.clone(),
            r.property_name.clone(),
            r.property_id.clone(),
            r.property_version.to_string(),
        ]);
    }
    table
}

/// Rows for `hostnames.csv`
pub fn hostnames_table(records: &[HostnameRecord]) -> Table {
    let mut table = Table::new(&[
        "hostname",
        "apex",
        "property_name",
        "property_id",
        "property_version",
    ]);
    for r in records {
        table.push(vec![
            r.hostname.clone(),
            r.apex.clone(),
            r.property_name.clone(),
            r.property_id.clone(),
            r.property_version.to_string(),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::parse_items;
    use serde_json::json;

    fn contract(id: &str) -> Contract {
        Contract {
            contract_id: Some(id.to_string()),
            contract_type_name: Some("DIRECT_CUSTOMER".to_string()),
        }
    }

    fn group(id: &str, contracts: &[&str]) -> Group {
        Group {
            group_id: Some(id.to_string()),
            group_name: Some(format!("Group {id}")),
            contract_ids: Some(contracts.iter().map(|c| c.to_string()).collect()),
        }
    }

    fn property(id: &str, name: &str, latest: Option<u64>) -> Property {
        Property {
            property_id: Some(id.to_string()),
            property_name: Some(name.to_string()),
            contract_id: Some("ctr_1".to_string()),
            group_id: Some("grp_1".to_string()),
            latest_version: latest,
            ..Default::default()
        }
    }

    #[test]
    fn test_contract_group_pairs_matches_membership() {
        let contracts = vec![contract("ctr_1"), contract("ctr_2")];
        let groups = vec![
            group("grp_a", &["ctr_1"]),
            group("grp_b", &["ctr_1", "ctr_2"]),
            group("grp_c", &[]),
        ];

        let pairs = contract_group_pairs(&contracts, &groups);

        let ids: Vec<(&str, &str)> = pairs
            .iter()
            .map(|p| (p.contract_id.as_str(), p.group_id.as_str()))
            .collect();
        assert_eq!(
            ids,
            vec![("ctr_1", "grp_a"), ("ctr_1", "grp_b"), ("ctr_2", "grp_b")]
        );
        assert_eq!(pairs[0].group_name, "Group grp_a");
    }

    #[test]
    fn test_contract_group_pairs_skips_missing_ids() {
        let contracts = vec![Contract::default(), contract("ctr_1")];
        let groups = vec![
            Group {
                group_id: None,
                group_name: None,
                contract_ids: Some(vec!["ctr_1".to_string()]),
            },
            Group {
                group_id: Some("grp_x".to_string()),
                group_name: None,
                contract_ids: None,
            },
        ];

        assert!(contract_group_pairs(&contracts, &groups).is_empty());
    }

    #[test]
    fn test_select_version_fallbacks() {
        let mut p = property("prp_1", "site", Some(7));
        assert_eq!(select_version(&p), Some(7));

        p.latest_version = None;
        p.production_version = Some(5);
        p.staging_version = Some(6);
        assert_eq!(select_version(&p), Some(5));

        p.production_version = None;
        assert_eq!(select_version(&p), Some(6));

        p.staging_version = None;
        assert_eq!(select_version(&p), None);
    }

    #[test]
    fn test_dedupe_properties() {
        let props = vec![
            property("prp_1", "first", Some(1)),
            property("prp_2", "second", Some(1)),
            property("prp_1", "duplicate", Some(1)),
            Property::default(),
        ];

        let deduped = dedupe_properties(props);

        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].property_name.as_deref(), Some("first"));
    }

    #[test]
    fn test_hostname_records_prefers_cname_from() {
        let hostnames: Vec<PropertyHostname> = parse_items(
            &json!({"hostnames": {"items": [
                {"cnameFrom": "www.example.co.uk", "cnameTo": "www.example.co.uk.edgekey.net"},
                {"hostname": "api.example.com"},
                {"cnameTo": "orphan.edgesuite.net"}
            ]}}),
            &["hostnames"],
        );

        let records = hostname_records(&property("prp_1", "site", Some(3)), 3, &hostnames);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].hostname, "www.example.co.uk");
        assert_eq!(records[0].apex, "example.co.uk");
        assert_eq!(records[0].property_version, 3);
        assert_eq!(records[1].apex, "example.com");
    }

    #[test]
    fn test_flatten_rules_visits_all_nodes() {
        let rules = json!({
            "name": "default",
            "children": [
                {"name": "a", "children": [{"name": "a1"}]},
                {"name": "b", "children": null}
            ]
        });

        let mut names: Vec<&str> = flatten_rules(&rules)
            .into_iter()
            .filter_map(|n| n.get("name").and_then(Value::as_str))
            .collect();
        names.sort();

        assert_eq!(names, vec!["a", "a1", "b", "default"]);
    }

    #[test]
    fn test_summarize_rules_classifies_behaviors() {
        let rules = json!({
            "name": "default",
            "behaviors": [
                {"name": "caching", "options": {"behavior": "MAX_AGE", "ttl": "1d"}},
                {"name": "origin", "options": {"hostname": "origin.example.com"}}
            ],
            "children": [{
                "name": "redirects",
                "behaviors": [
                    {"name": "redirect", "options": {"destinationHostname": "OTHER"}},
                    {"name": "responseCode", "options": {}},
                    {"name": "modifyOutgoingResponseHeader", "options": {"action": "ADD"}},
                    {"name": "setResponseHeader", "options": {"headerName": "Strict-Transport-Security"}},
                    {"name": "setResponseHeader", "options": {"headerName": "X-Frame-Options"}},
                    {"name": "httpStrictTransportSecurity", "options": {"enable": true}}
                ]
            }]
        });

        let summary = summarize_rules(&rules);

        assert_eq!(summary.cache.len(), 1);
        assert_eq!(summary.redirects.len(), 1);
        assert_eq!(summary.headers.len(), 1);
        assert_eq!(summary.hsts.len(), 2);
        assert_eq!(
            summary.headers[0],
            json!({"name": "modifyOutgoingResponseHeader", "action": "ADD"})
        );
    }

    #[test]
    fn test_summarize_rules_empty_tree() {
        let summary = summarize_rules(&json!({}));
        assert_eq!(summary, RuleSummary::default());
        assert!(!summary.has_cache() && !summary.has_hsts());
    }

    #[test]
    fn test_usage_and_hostname_tables_column_order() {
        let records = vec![HostnameRecord {
            apex: "example.com".to_string(),
            hostname: "www.example.com".to_string(),
            property_name: "site".to_string(),
            property_id: "prp_1".to_string(),
            property_version: 4,
        }];

        let usage = usage_summary_table(&records);
        let hosts = hostnames_table(&records);

        assert_eq!(usage.rows[0][0], "example.com");
        assert_eq!(hosts.rows[0][0], "www.example.com");
        assert_eq!(hosts.get(0, "property_version"), Some("4"));
    }
}
