//! Certificate Provisioning System (CPS) enrollments

use crate::domain::apex_of;
use crate::report::{cell, value_cell, Table};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

/// Media type the enrollments list endpoint expects
pub const ENROLLMENTS_ACCEPT: &str = "application/vnd.akamai.cps.enrollments.v11+json";

/// Certificate signing request block of an enrollment
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Csr {
    #[serde(default)]
    pub cn: Option<String>,
    #[serde(default)]
    pub sans: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfiguration {
    #[serde(default)]
    pub san_entries: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct CertificateInfo {
    #[serde(default)]
    pub cn: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct DeploymentSchedule {
    #[serde(default)]
    pub network: Option<String>,
}

/// Enrollment from `cps/v2/enrollments`
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub csr: Option<Csr>,
    #[serde(default)]
    pub network_configuration: Option<NetworkConfiguration>,
    #[serde(default)]
    pub certificate: Option<CertificateInfo>,
    #[serde(default)]
    pub deployment_schedule: Option<DeploymentSchedule>,
}

impl Enrollment {
    /// SANs from the CSR, falling back to the network configuration
    pub fn sans(&self) -> Vec<String> {
        let from_csr = self.csr.as_ref().and_then(|c| c.sans.clone());
        let from_network = self
            .network_configuration
            .as_ref()
            .and_then(|n| n.san_entries.clone());

        from_csr
            .filter(|s| !s.is_empty())
            .or(from_network)
            .unwrap_or_default()
    }

    /// Common name from the CSR, falling back to the issued certificate
    pub fn common_name(&self) -> Option<String> {
        self.csr
            .as_ref()
            .and_then(|c| c.cn.clone())
            .filter(|cn| !cn.is_empty())
            .or_else(|| self.certificate.as_ref().and_then(|c| c.cn.clone()))
            .filter(|cn| !cn.is_empty())
    }
}

/// Flattened CPS view used by the report and the checklists
#[derive(Debug, Clone, PartialEq)]
pub struct CpsSummary {
    /// Rows for `cps_certs.csv`
    pub table: Table,
    /// CN and SAN names grouped by apex domain
    pub names_by_apex: BTreeMap<String, Vec<String>>,
}

/// `contractId` query value for CPS: the PAPI id without its `ctr_` prefix
pub fn contract_param(contract_id: &str) -> &str {
    contract_id.strip_prefix("ctr_").unwrap_or(contract_id)
}

/// Keep the first enrollment for each id. Enrollments without an id are all kept.
pub fn dedupe_enrollments(enrollments: Vec<Enrollment>) -> Vec<Enrollment> {
    let mut seen = HashSet::new();
    enrollments
        .into_iter()
        .filter(|e| match &e.id {
            Some(id) => seen.insert(id.to_string()),
            None => true,
        })
        .collect()
}

pub fn summarize_enrollments(enrollments: &[Enrollment]) -> CpsSummary {
    let mut table = Table::new(&["enrollment_id", "common_name", "sans", "status", "network"]);
    let mut names_by_apex: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for enrollment in enrollments {
        let sans = enrollment.sans();
        let common_name = enrollment.common_name();

        for name in common_name.iter().chain(sans.iter()) {
            if name.is_empty() {
                continue;
            }
            names_by_apex
                .entry(apex_of(name))
                .or_default()
                .push(name.clone());
        }

        table.push(vec![
            value_cell(enrollment.id.as_ref()),
            common_name.unwrap_or_default(),
            sans.join(";"),
            cell(enrollment.status.clone()),
            cell(
                enrollment
                    .deployment_schedule
                    .as_ref()
                    .and_then(|d| d.network.clone()),
            ),
        ]);
    }

    CpsSummary {
        table,
        names_by_apex,
    }
}
