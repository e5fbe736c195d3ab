use crate::api::degrade;
use crate::client::EdgeGridClient;
use crate::prelude::*;
use akamai_reporter_core::appsec::{AppSecConfig, ConfigSummary, RatePolicy, CONFIG_KEYS};
use akamai_reporter_core::envelope::{extract_items, parse_items};

pub async fn list_configs(client: &EdgeGridClient) -> Result<Vec<AppSecConfig>> {
    let value = client.get_json("appsec/v1/configs", &[]).await?;
    Ok(parse_items(&value, CONFIG_KEYS))
}

/// Number of security policies in a configuration version
pub async fn count_policies(client: &EdgeGridClient, config_id: u64, version: u64) -> Result<usize> {
    let value = client
        .get_json(
            &f!("appsec/v1/configs/{config_id}/versions/{version}/security-policies"),
            &[],
        )
        .await?;
    Ok(extract_items(&value, &["policies"]).len())
}

pub async fn list_rate_policies(
    client: &EdgeGridClient,
    config_id: u64,
    version: u64,
) -> Result<Vec<RatePolicy>> {
    let value = client
        .get_json(
            &f!("appsec/v1/configs/{config_id}/versions/{version}/rate-policies"),
            &[],
        )
        .await?;
    Ok(parse_items(&value, &["ratePolicies"]))
}

/// Security configurations with their policy and rate policy counts
pub async fn collect(client: &EdgeGridClient) -> Vec<ConfigSummary> {
    let configs = degrade("AppSec configurations", list_configs(client).await);
    log::info!("Found {} AppSec configurations", configs.len());

    let mut summaries = Vec::with_capacity(configs.len());
    for config in &configs {
        let mut summary = ConfigSummary::new(config);

        if let (Some(id), Some(version)) = (summary.config_id, summary.latest_version) {
            summary.policies = degrade(
                &f!("Security policies for config {id}"),
                count_policies(client, id, version).await,
            );
            summary.rate_policies = degrade(
                &f!("Rate policies for config {id}"),
                list_rate_policies(client, id, version).await,
            );
        }

        summaries.push(summary);
    }
    summaries
}
