//! Optional products: Edge DNS, EdgeWorkers, Cloudlets, Cloud Wrapper and network lists
//!
//! Identifier fields are kept as raw JSON because their types differ between API
//! versions (numbers on some accounts, strings on others).

use crate::report::{cell, value_cell, Table};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const EDGEDNS_ZONE_KEYS: &[&str] = &["zones"];
pub const EDGEWORKER_KEYS: &[&str] = &["edgeWorkerIds", "edgeworkers"];
pub const CLOUDLET_POLICY_KEYS: &[&str] = &["policies"];
pub const CLOUD_WRAPPER_KEYS: &[&str] = &["containers", "configurations"];
pub const NETWORK_LIST_KEYS: &[&str] = &["networkLists"];

/// Edge DNS zone
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDnsZone {
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub zone_type: Option<String>,
    #[serde(default)]
    pub contract_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// EdgeWorker id record
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EdgeWorker {
    #[serde(default)]
    pub edge_worker_id: Option<Value>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub group_id: Option<Value>,
    #[serde(default)]
    pub last_modified_time: Option<String>,
}

/// Cloudlets policy
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CloudletPolicy {
    #[serde(default)]
    pub policy_id: Option<Value>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub cloudlet_type: Option<String>,
    #[serde(default)]
    pub cloudlet_code: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Cloud Wrapper container or configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CloudWrapperItem {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub container_id: Option<Value>,
    #[serde(default)]
    pub config_id: Option<Value>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub config_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

/// Network list (IP or GEO)
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkList {
    #[serde(default)]
    pub unique_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub list_type: Option<String>,
    #[serde(default)]
    pub element_count: Option<u64>,
}

fn first_present(values: &[Option<&Value>]) -> String {
    values
        .iter()
        .flatten()
        .find(|v| !v.is_null())
        .map(|v| value_cell(Some(v)))
        .unwrap_or_default()
}

/// Rows for `edgedns_zones.csv`
pub fn edgedns_zones_table(zones: &[EdgeDnsZone]) -> Table {
    let mut table = Table::new(&["zone", "type_or_contract", "status"]);
    for z in zones {
        table.push(vec![
            cell(z.zone.clone().or_else(|| z.name.clone())),
            cell(z.zone_type.clone().or_else(|| z.contract_id.clone())),
            cell(z.status.clone()),
        ]);
    }
    table
}

/// Rows for `gtm_domains.csv`
pub fn gtm_domains_table(domains: &[String]) -> Table {
    let mut table = Table::new(&["gtm_domain"]);
    for d in domains {
        table.push(vec![d.clone()]);
    }
    table
}

/// Rows for `edgeworkers.csv`
pub fn edgeworkers_table(workers: &[EdgeWorker]) -> Table {
    let mut table = Table::new(&["edgeworker_id", "name", "group_id", "last_modified"]);
    for w in workers {
        table.push(vec![
            value_cell(w.edge_worker_id.as_ref()),
            cell(w.name.clone()),
            value_cell(w.group_id.as_ref()),
            cell(w.last_modified_time.clone()),
        ]);
    }
    table
}

/// Rows for `cloudlets_policies.csv`
pub fn cloudlets_policies_table(policies: &[CloudletPolicy]) -> Table {
    let mut table = Table::new(&["policy_id", "name", "cloudlet_type", "status"]);
    for p in policies {
        table.push(vec![
            value_cell(p.policy_id.as_ref()),
            cell(p.name.clone()),
            cell(p.cloudlet_type.clone().or_else(|| p.cloudlet_code.clone())),
            cell(p.status.clone()),
        ]);
    }
    table
}

/// Rows for `cloud_wrapper.csv`
pub fn cloud_wrapper_table(items: &[CloudWrapperItem]) -> Table {
    let mut table = Table::new(&["id", "name", "status"]);
    for c in items {
        table.push(vec![
            first_present(&[
                c.id.as_ref(),
                c.container_id.as_ref(),
                c.config_id.as_ref(),
            ]),
            cell(c.name.clone().or_else(|| c.config_name.clone())),
            cell(c.status.clone().or_else(|| c.state.clone())),
        ]);
    }
    table
}

/// Rows for `network_lists.csv`
pub fn network_lists_table(lists: &[NetworkList]) -> Table {
    let mut table = Table::new(&["id", "name", "type", "element_count"]);
    for l in lists {
        table.push(vec![
            cell(l.unique_id.clone()),
            cell(l.name.clone()),
            cell(l.list_type.clone()),
            cell(l.element_count),
        ]);
    }
    table
}
