use crate::api::degrade;
use crate::client::{segment, EdgeGridClient};
use crate::prelude::*;
use akamai_reporter_core::envelope::extract_items;
use akamai_reporter_core::gtm::{self, domain_names};
use serde_json::Value;

/// GTM domain names visible to the credentials
pub async fn list_domains(client: &EdgeGridClient) -> Vec<String> {
    let value = degrade("GTM domains", client.get_json("gtm/v1/domains", &[]).await);
    domain_names(&value)
}

/// Everything exported for one GTM domain, as raw upstream objects
#[derive(Debug, Default)]
pub struct DomainExport {
    pub datacenters: Vec<Value>,
    pub liveness_tests: Vec<Value>,
    pub cidr_maps: Vec<Value>,
    pub as_maps: Vec<Value>,
    pub geo_maps: Vec<Value>,
    /// Listing entry paired with the full property object (`Null` for unnamed entries)
    pub properties: Vec<(Value, Value)>,
}

impl DomainExport {
    /// Keyed collections, in the order they are written
    pub fn collections(&self) -> [(&'static str, &[Value]); 5] {
        [
            (gtm::DATACENTERS, self.datacenters.as_slice()),
            (gtm::LIVENESS_TESTS, self.liveness_tests.as_slice()),
            (gtm::CIDR_MAPS, self.cidr_maps.as_slice()),
            (gtm::AS_MAPS, self.as_maps.as_slice()),
            (gtm::GEO_MAPS, self.geo_maps.as_slice()),
        ]
    }
}

async fn list(client: &EdgeGridClient, domain: &str, resource: &str) -> Vec<Value> {
    let path = f!("gtm/v1/domains/{}/{resource}", segment(domain));
    let value = degrade(&f!("GTM {resource} for {domain}"), client.get_json(&path, &[]).await);
    extract_items(&value, &[])
}

pub async fn export_domain(client: &EdgeGridClient, domain: &str) -> DomainExport {
    let mut export = DomainExport {
        datacenters: list(client, domain, "datacenters").await,
        liveness_tests: list(client, domain, "liveness-tests").await,
        cidr_maps: list(client, domain, "cidr-maps").await,
        as_maps: list(client, domain, "as-maps").await,
        geo_maps: list(client, domain, "geo-maps").await,
        properties: Vec::new(),
    };

    for summary in list(client, domain, "properties").await {
        let Some(name) = gtm::property_name(&summary) else {
            export.properties.push((summary, Value::Null));
            continue;
        };
        let path = f!(
            "gtm/v1/domains/{}/properties/{}",
            segment(domain),
            segment(&name)
        );
        let full = degrade(
            &f!("GTM property {name} in {domain}"),
            client.get_json(&path, &[]).await,
        );
        export.properties.push((summary, full));
    }

    log::debug!(
        "GTM {domain}: {} datacenters, {} properties",
        export.datacenters.len(),
        export.properties.len()
    );
    export
}
