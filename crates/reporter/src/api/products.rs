use crate::api::degrade;
use crate::client::EdgeGridClient;
use crate::prelude::*;
use akamai_reporter_core::envelope::parse_items;
use akamai_reporter_core::products::{
    CloudWrapperItem, CloudletPolicy, EdgeDnsZone, EdgeWorker, NetworkList, CLOUDLET_POLICY_KEYS,
    CLOUD_WRAPPER_KEYS, EDGEDNS_ZONE_KEYS, EDGEWORKER_KEYS, NETWORK_LIST_KEYS,
};
use serde::de::DeserializeOwned;

async fn fetch<T: DeserializeOwned>(
    client: &EdgeGridClient,
    path: &str,
    keys: &[&str],
) -> Result<Vec<T>> {
    let value = client.get_json(path, &[]).await?;
    Ok(parse_items(&value, keys))
}

/// Try each path in order; the first non-empty list wins
async fn first_non_empty<T: DeserializeOwned>(
    client: &EdgeGridClient,
    what: &str,
    paths: &[&str],
    keys: &[&str],
) -> Vec<T> {
    for path in paths {
        let items: Vec<T> = degrade(&f!("{what} ({path})"), fetch(client, path, keys).await);
        if !items.is_empty() {
            return items;
        }
    }
    Vec::new()
}

/// Edge DNS zones, falling back to the v1 API
pub async fn edgedns_zones(client: &EdgeGridClient) -> Vec<EdgeDnsZone> {
    first_non_empty(
        client,
        "Edge DNS zones",
        &["config-dns/v2/zones", "config-dns/v1/zones"],
        EDGEDNS_ZONE_KEYS,
    )
    .await
}

pub async fn edgeworkers(client: &EdgeGridClient) -> Vec<EdgeWorker> {
    first_non_empty(
        client,
        "EdgeWorkers",
        &["edgeworkers/v1/ids", "edgeworkers/v1/edgeworkers"],
        EDGEWORKER_KEYS,
    )
    .await
}

pub async fn cloudlet_policies(client: &EdgeGridClient) -> Vec<CloudletPolicy> {
    degrade(
        "Cloudlets policies",
        fetch(client, "cloudlets/v2/policies", CLOUDLET_POLICY_KEYS).await,
    )
}

pub async fn cloud_wrapper(client: &EdgeGridClient) -> Vec<CloudWrapperItem> {
    first_non_empty(
        client,
        "Cloud Wrapper",
        &["cloud-wrapper/v1/containers", "cloud-wrapper/v1/configurations"],
        CLOUD_WRAPPER_KEYS,
    )
    .await
}

pub async fn network_lists(client: &EdgeGridClient) -> Vec<NetworkList> {
    degrade(
        "Network lists",
        fetch(client, "network-list/v2/network-lists", NETWORK_LIST_KEYS).await,
    )
}
