use crate::api::degrade;
use crate::client::EdgeGridClient;
use crate::prelude::*;
use akamai_reporter_core::cps::{contract_param, dedupe_enrollments, Enrollment, ENROLLMENTS_ACCEPT};
use akamai_reporter_core::envelope::parse_items;
use akamai_reporter_core::papi::Contract;

async fn enrollments_for(client: &EdgeGridClient, contract: Option<&str>) -> Result<Vec<Enrollment>> {
    let params: Vec<(&str, &str)> = contract
        .map(|id| vec![("contractId", contract_param(id))])
        .unwrap_or_default();
    let value = client
        .get_json_accept("cps/v2/enrollments", &params, Some(ENROLLMENTS_ACCEPT))
        .await?;
    Ok(parse_items(&value, &["enrollments"]))
}

/// CPS enrollments across every contract, de-duplicated by id.
///
/// With no contracts a single unscoped call is made.
pub async fn list_enrollments(client: &EdgeGridClient, contracts: &[Contract]) -> Vec<Enrollment> {
    let ids: Vec<&str> = contracts
        .iter()
        .filter_map(|c| c.contract_id.as_deref())
        .collect();

    let mut enrollments = Vec::new();
    if ids.is_empty() {
        enrollments = degrade("CPS enrollments", enrollments_for(client, None).await);
    } else {
        for id in ids {
            enrollments.extend(degrade(
                &f!("CPS enrollments for {id}"),
                enrollments_for(client, Some(id)).await,
            ));
        }
    }

    let enrollments = dedupe_enrollments(enrollments);
    log::info!("Found {} CPS enrollments", enrollments.len());
    enrollments
}
