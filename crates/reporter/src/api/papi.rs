use crate::client::{segment, EdgeGridClient};
use crate::prelude::*;
use akamai_reporter_core::envelope::parse_items;
use akamai_reporter_core::papi::{
    contract_group_pairs, dedupe_properties, select_version, Combination, Contract, Group,
    Property, PropertyHostname, PropertyVersion,
};
use serde_json::Value;

pub async fn list_contracts(client: &EdgeGridClient) -> Result<Vec<Contract>> {
    let value = client.get_json("papi/v1/contracts", &[]).await?;
    Ok(parse_items(&value, &["contracts"]))
}

pub async fn list_groups(client: &EdgeGridClient) -> Result<Vec<Group>> {
    let value = client.get_json("papi/v1/groups", &[]).await?;
    Ok(parse_items(&value, &["groups"]))
}

pub async fn list_properties(
    client: &EdgeGridClient,
    contract_id: &str,
    group_id: &str,
) -> Result<Vec<Property>> {
    let value = client
        .get_json(
            "papi/v1/properties",
            &[("contractId", contract_id), ("groupId", group_id)],
        )
        .await?;
    Ok(parse_items(&value, &["properties"]))
}

pub async fn list_property_versions(
    client: &EdgeGridClient,
    property: &Property,
) -> Result<Vec<PropertyVersion>> {
    let id = property.property_id.as_deref().unwrap_or_default();
    let value = client
        .get_json(
            &f!("papi/v1/properties/{}/versions", segment(id)),
            &scope(property),
        )
        .await?;
    Ok(parse_items(&value, &["versions"]))
}

pub async fn get_hostnames(
    client: &EdgeGridClient,
    property: &Property,
    version: u64,
) -> Result<Vec<PropertyHostname>> {
    let id = property.property_id.as_deref().unwrap_or_default();
    let value = client
        .get_json(
            &f!("papi/v1/properties/{}/versions/{version}/hostnames", segment(id)),
            &scope(property),
        )
        .await?;
    Ok(parse_items(&value, &["hostnames"]))
}

/// Root rule of a property version, or `Null` when the response has none
pub async fn get_rules(client: &EdgeGridClient, property: &Property, version: u64) -> Result<Value> {
    let id = property.property_id.as_deref().unwrap_or_default();
    let value = client
        .get_json(
            &f!("papi/v1/properties/{}/versions/{version}/rules", segment(id)),
            &scope(property),
        )
        .await?;
    Ok(value.get("rules").cloned().unwrap_or(Value::Null))
}

fn scope(property: &Property) -> Vec<(&str, &str)> {
    let mut params = Vec::new();
    if let Some(contract_id) = property.contract_id.as_deref() {
        params.push(("contractId", contract_id));
    }
    if let Some(group_id) = property.group_id.as_deref() {
        params.push(("groupId", group_id));
    }
    params
}

/// Version to inventory. Falls back to the versions listing when the property
/// record carries no version numbers.
pub async fn resolve_version(client: &EdgeGridClient, property: &Property) -> Option<u64> {
    if let Some(version) = select_version(property) {
        return Some(version);
    }

    let name = property.property_name.as_deref().unwrap_or_default();
    let versions = crate::api::degrade(
        &f!("Versions of property {name}"),
        list_property_versions(client, property).await,
    );
    versions
        .iter()
        .filter_map(|v| v.property_version)
        .max()
}

/// Result of contract/group discovery
#[derive(Debug, Default)]
pub struct Discovery {
    pub contracts: Vec<Contract>,
    pub combinations: Vec<Combination>,
    /// Properties from every working pair, de-duplicated by id
    pub properties: Vec<Property>,
}

/// Test every valid contract/group pair against the properties endpoint.
///
/// Contract and group listing failures are fatal. A pair whose property listing
/// fails is skipped.
pub async fn discover(client: &EdgeGridClient) -> Result<Discovery> {
    let contracts = list_contracts(client)
        .await
        .context("Failed to list PAPI contracts")?;
    let groups = list_groups(client)
        .await
        .context("Failed to list PAPI groups")?;

    log::info!(
        "Found {} contracts and {} groups",
        contracts.len(),
        groups.len()
    );

    let mut combinations = Vec::new();
    let mut properties = Vec::new();

    for pair in contract_group_pairs(&contracts, &groups) {
        match list_properties(client, &pair.contract_id, &pair.group_id).await {
            Ok(mut found) => {
                log::debug!(
                    "{} + {}: {} properties",
                    pair.contract_id,
                    pair.group_id,
                    found.len()
                );
                for property in found.iter_mut() {
                    property
                        .contract_id
                        .get_or_insert_with(|| pair.contract_id.clone());
                    property
                        .group_id
                        .get_or_insert_with(|| pair.group_id.clone());
                }
                combinations.push(Combination {
                    pair,
                    properties_count: found.len(),
                });
                properties.extend(found);
            }
            Err(err) => {
                log::debug!("{} + {} rejected: {err}", pair.contract_id, pair.group_id);
            }
        }
    }

    Ok(Discovery {
        contracts,
        combinations,
        properties: dedupe_properties(properties),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AkamaiConfig, CredentialSource};
    use akamai_reporter_core::edgegrid::Credentials;
    use axum::http::{StatusCode, Uri};
    use axum::response::{IntoResponse, Response};
    use axum::{Json, Router};
    use serde_json::json;

    async fn client_for(app: Router) -> EdgeGridClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        EdgeGridClient::new(&AkamaiConfig {
            credentials: Credentials::new(f!("http://{addr}"), "ct", "cs", "at"),
            account_switch_key: None,
            source: CredentialSource::Environment,
        })
        .unwrap()
    }

    /// Three valid pairs: ctr_A+grp_1 and ctr_B+grp_2 work, ctr_B+grp_1 is rejected
    async fn two_contracts(uri: Uri) -> Response {
        let body = match (uri.path(), uri.query().unwrap_or_default()) {
            ("/papi/v1/contracts", _) => json!({"contracts": {"items": [
                {"contractId": "ctr_A"}, {"contractId": "ctr_B"}
            ]}}),
            ("/papi/v1/groups", _) => json!({"groups": {"items": [
                {"groupId": "grp_1", "contractIds": ["ctr_A", "ctr_B"]},
                {"groupId": "grp_2", "contractIds": ["ctr_B"]}
            ]}}),
            ("/papi/v1/properties", "contractId=ctr_A&groupId=grp_1") => {
                json!({"properties": {"items": [
                    {"propertyId": "prp_1", "propertyName": "www"},
                    {"propertyId": "prp_2", "propertyName": "api"}
                ]}})
            }
            ("/papi/v1/properties", "contractId=ctr_B&groupId=grp_2") => {
                json!({"properties": {"items": [
                    {"propertyId": "prp_2", "propertyName": "api"},
                    {"propertyId": "prp_3", "propertyName": "static", "contractId": "ctr_X"}
                ]}})
            }
            _ => return (StatusCode::FORBIDDEN, "denied").into_response(),
        };
        Json(body).into_response()
    }

    #[tokio::test]
    async fn test_discover_merges_working_pairs_and_skips_rejected() {
        let client = client_for(Router::new().fallback(two_contracts)).await;

        let discovery = discover(&client).await.unwrap();

        let pairs: Vec<(&str, &str, usize)> = discovery
            .combinations
            .iter()
            .map(|c| {
                (
                    c.pair.contract_id.as_str(),
                    c.pair.group_id.as_str(),
                    c.properties_count,
                )
            })
            .collect();
        assert_eq!(pairs, [("ctr_A", "grp_1", 2), ("ctr_B", "grp_2", 2)]);
        assert_eq!(discovery.contracts.len(), 2);

        let ids: Vec<&str> = discovery
            .properties
            .iter()
            .filter_map(|p| p.property_id.as_deref())
            .collect();
        assert_eq!(ids, ["prp_1", "prp_2", "prp_3"]);

        let api = &discovery.properties[1];
        assert_eq!(api.contract_id.as_deref(), Some("ctr_A"));
        assert_eq!(api.group_id.as_deref(), Some("grp_1"));
        let static_site = &discovery.properties[2];
        assert_eq!(static_site.contract_id.as_deref(), Some("ctr_X"));
        assert_eq!(static_site.group_id.as_deref(), Some("grp_2"));
    }

    #[tokio::test]
    async fn test_discover_fails_when_groups_unavailable() {
        let app = Router::new().fallback(|uri: Uri| async move {
            match uri.path() {
                "/papi/v1/contracts" => {
                    Json(json!({"contracts": {"items": []}})).into_response()
                }
                _ => (StatusCode::UNAUTHORIZED, "no").into_response(),
            }
        });
        let client = client_for(app).await;

        let err = discover(&client).await.unwrap_err();

        assert!(err.to_string().contains("Failed to list PAPI groups"));
    }
}
