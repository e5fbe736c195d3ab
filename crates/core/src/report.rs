//! Tabular report model shared by every CSV the reporter writes

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

pub const USAGE_SUMMARY_CSV: &str = "usage_summary.csv";
pub const HOSTNAMES_CSV: &str = "hostnames.csv";
pub const CPS_CERTS_CSV: &str = "cps_certs.csv";
pub const APPSEC_SUMMARY_CSV: &str = "appsec_summary.csv";
pub const RATE_POLICIES_CSV: &str = "rate_policies.csv";
pub const EDGEDNS_ZONES_CSV: &str = "edgedns_zones.csv";
pub const GTM_DOMAINS_CSV: &str = "gtm_domains.csv";
pub const EDGEWORKERS_CSV: &str = "edgeworkers.csv";
pub const CLOUDLETS_POLICIES_CSV: &str = "cloudlets_policies.csv";
pub const CLOUD_WRAPPER_CSV: &str = "cloud_wrapper.csv";
pub const NETWORK_LISTS_CSV: &str = "network_lists.csv";
pub const REPORT_SUMMARY_JSON: &str = "report_summary.json";
pub const CHECKLISTS_DIR: &str = "checklists";
pub const GTM_DIR: &str = "gtm";

/// In-memory CSV: a header row plus string cells
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at `row`/`header`, for lookups by column name
    pub fn get(&self, row: usize, header: &str) -> Option<&str> {
        let col = self.headers.iter().position(|h| h == header)?;
        self.rows.get(row)?.get(col).map(String::as_str)
    }
}

/// Optional scalar as a CSV cell; `None` is an empty cell
pub fn cell<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Raw JSON value as a CSV cell. Strings lose their quotes and `null` is empty.
pub fn value_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Counts and files for `report_summary.json`
#[derive(Debug, Default, Clone, Serialize, PartialEq)]
pub struct ReportSummary {
    pub generated_at: String,
    pub properties: usize,
    pub hostnames: usize,
    pub apex_domains: usize,
    pub certificates: usize,
    pub appsec_configs: usize,
    pub rate_policies: usize,
    pub gtm_domains: usize,
    pub products: BTreeMap<String, usize>,
    pub files: Vec<String>,
}
