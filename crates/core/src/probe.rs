//! API permission probing: which endpoints a credential can reach

use serde::Serialize;

/// Endpoints probed by `check`, with a human-readable product name
pub const PROBES: &[(&str, &str)] = &[
    ("papi/v1/contracts", "Contracts API"),
    ("papi/v1/groups", "Groups API"),
    ("papi/v1/properties", "Properties API (PAPI)"),
    ("cps/v2/enrollments", "Certificate Provisioning System (CPS)"),
    ("appsec/v1/configs", "Application Security (AppSec)"),
    ("gtm/v1/domains", "Global Traffic Management (GTM)"),
    ("config-dns/v2/zones", "Edge DNS"),
    ("edgeworkers/v1/ids", "EdgeWorkers"),
    ("cloudlets/v2/policies", "Cloudlets"),
    ("cloud-wrapper/v1/locations", "Cloud Wrapper"),
    ("network-list/v2/network-lists", "Network Lists"),
];

/// Outcome of probing one endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "status", rename_all = "snake_case")]
pub enum ProbeOutcome {
    Accessible,
    /// The endpoint answered but wants query parameters (e.g. PAPI properties)
    NeedsParameters,
    Unauthorized,
    Forbidden,
    Failed(u16),
    Unreachable,
}

impl ProbeOutcome {
    pub fn from_status(status: u16) -> Self {
        match status {
            200..=299 => Self::Accessible,
            400 => Self::NeedsParameters,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            other => Self::Failed(other),
        }
    }

    pub fn is_accessible(&self) -> bool {
        matches!(self, Self::Accessible)
    }

    pub fn label(&self) -> String {
        match self {
            Self::Accessible => "accessible".to_string(),
            Self::NeedsParameters => "bad request (needs parameters)".to_string(),
            Self::Unauthorized => "unauthorized".to_string(),
            Self::Forbidden => "forbidden".to_string(),
            Self::Failed(status) => format!("failed ({status})"),
            Self::Unreachable => "unreachable".to_string(),
        }
    }
}

/// Result row for one probed endpoint
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProbeResult {
    pub path: String,
    pub description: String,
    #[serde(flatten)]
    pub outcome: ProbeOutcome,
}

/// Output of the `check` command
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProbeReport {
    pub host: String,
    pub results: Vec<ProbeResult>,
    pub accessible: usize,
    pub inaccessible: usize,
}

pub fn build_report(host: &str, results: Vec<ProbeResult>) -> ProbeReport {
    let accessible = results.iter().filter(|r| r.outcome.is_accessible()).count();
    ProbeReport {
        host: host.to_string(),
        inaccessible: results.len() - accessible,
        accessible,
        results,
    }
}
