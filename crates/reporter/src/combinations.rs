use crate::api::papi::Discovery;
use crate::client::EdgeGridClient;
use crate::config::AkamaiConfig;
use crate::prelude::{println, *};
use colored::Colorize;

#[derive(Debug, Clone, clap::Args)]
pub struct CombinationsOptions {
    /// Output as JSON
    #[clap(long)]
    json: bool,
}

/// Discovery that fails with [`Error::NoContractGroups`] when no pair works
pub async fn working_combinations(client: &EdgeGridClient) -> Result<Discovery> {
    let discovery = crate::api::papi::discover(client).await?;

    if discovery.combinations.is_empty() {
        return Err(Error::NoContractGroups.into());
    }

    Ok(discovery)
}

pub async fn run(options: CombinationsOptions, global: crate::Global) -> Result<()> {
    let config = AkamaiConfig::resolve(&global)?;
    let client = EdgeGridClient::new(&config)?;

    let discovery = working_combinations(&client).await?;

    if options.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&discovery.combinations)?
        );
        return Ok(());
    }

    println!(
        "Found {} working contract/group combination(s):\n",
        discovery.combinations.len()
    );

    let mut table = new_table();
    table.add_row(prettytable::row![
        "Contract".bold().cyan(),
        "Type".bold().cyan(),
        "Group".bold().cyan(),
        "Group Name".bold().cyan(),
        "Properties".bold().cyan()
    ]);
    for c in &discovery.combinations {
        table.add_row(prettytable::row![
            c.pair.contract_id.green(),
            c.pair.contract_type,
            c.pair.group_id.bright_yellow(),
            c.pair.group_name.bright_white(),
            c.properties_count
        ]);
    }
    table.printstd();

    println!(
        "\n{} unique properties",
        discovery.properties.len().to_string().green()
    );

    Ok(())
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

    async fn spawn(app: Router) -> EdgeGridClient {
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

    async fn one_pair(uri: Uri) -> Response {
        match uri.path() {
            "/papi/v1/contracts" => Json(json!({"contracts": {"items": [
                {"contractId": "ctr_1-ABC", "contractTypeName": "DIRECT"}
            ]}}))
            .into_response(),
            "/papi/v1/groups" => Json(json!({"groups": {"items": [
                {"groupId": "grp_1", "groupName": "Main", "contractIds": ["ctr_1-ABC"]}
            ]}}))
            .into_response(),
            "/papi/v1/properties" => Json(json!({"properties": {"items": [
                {"propertyId": "prp_1"}, {"propertyId": "prp_2"}
            ]}}))
            .into_response(),
            _ => StatusCode::NOT_FOUND.into_response(),
        }
    }

    async fn groups_without_contracts(uri: Uri) -> Response {
        match uri.path() {
            "/papi/v1/contracts" => Json(json!({"contracts": {"items": [
                {"contractId": "ctr_1-ABC"}
            ]}}))
            .into_response(),
            "/papi/v1/groups" => Json(json!({"groups": {"items": [
                {"groupId": "grp_1", "contractIds": ["ctr_9-OTHER"]}
            ]}}))
            .into_response(),
            _ => StatusCode::FORBIDDEN.into_response(),
        }
    }

    #[tokio::test]
    async fn test_working_combinations_json_shape() {
        let client = spawn(Router::new().fallback(one_pair)).await;

        let discovery = working_combinations(&client).await.unwrap();

        let value = serde_json::to_value(&discovery.combinations).unwrap();
        assert_eq!(
            value,
            json!([{
                "contract_id": "ctr_1-ABC",
                "contract_type": "DIRECT",
                "group_id": "grp_1",
                "group_name": "Main",
                "properties_count": 2
            }])
        );
    }

    #[tokio::test]
    async fn test_no_working_pair_is_no_contract_groups() {
        let client = spawn(Router::new().fallback(groups_without_contracts)).await;

        let err = working_combinations(&client).await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::NoContractGroups)
        ));
    }
}
