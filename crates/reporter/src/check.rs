use crate::client::EdgeGridClient;
use crate::config::AkamaiConfig;
use crate::prelude::{println, *};
use akamai_reporter_core::probe::{build_report, ProbeOutcome, ProbeReport, ProbeResult, PROBES};
use colored::Colorize;

#[derive(Debug, Clone, clap::Args)]
pub struct CheckOptions {
    /// Output as JSON
    #[clap(long)]
    json: bool,
}

/// Probe every known endpoint once
pub async fn probe_all(client: &EdgeGridClient) -> ProbeReport {
    let mut results = Vec::with_capacity(PROBES.len());

    for (path, description) in PROBES {
        let outcome = match client.probe(path).await {
            Ok(status) => ProbeOutcome::from_status(status),
            Err(err) => {
                log::debug!("{path}: {err}");
                ProbeOutcome::Unreachable
            }
        };
        results.push(ProbeResult {
            path: path.to_string(),
            description: description.to_string(),
            outcome,
        });
    }

    build_report(client.host(), results)
}

fn colored_outcome(outcome: &ProbeOutcome) -> colored::ColoredString {
    let label = outcome.label();
    match outcome {
        ProbeOutcome::Accessible => label.green(),
        ProbeOutcome::NeedsParameters => label.yellow(),
        ProbeOutcome::Unauthorized | ProbeOutcome::Forbidden => label.red(),
        ProbeOutcome::Failed(_) | ProbeOutcome::Unreachable => label.bright_black(),
    }
}

pub async fn run(options: CheckOptions, global: crate::Global) -> Result<()> {
    let config = AkamaiConfig::resolve(&global)?;
    let client = EdgeGridClient::new(&config)?;

    let report = probe_all(&client).await;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Akamai host: {}\n", report.host.bright_white());

        let mut table = new_table();
        table.add_row(prettytable::row![
            "API".bold().cyan(),
            "Endpoint".bold().cyan(),
            "Result".bold().cyan()
        ]);
        for result in &report.results {
            table.add_row(prettytable::row![
                result.description,
                result.path.bright_black(),
                colored_outcome(&result.outcome)
            ]);
        }
        table.printstd();

        println!(
            "\n{} accessible, {} not accessible",
            report.accessible.to_string().green(),
            report.inaccessible.to_string().red()
        );
    }

    ensure_accessible(&report)
}

fn ensure_accessible(report: &ProbeReport) -> Result<()> {
    if report.accessible == 0 {
        return Err(eyre!(
            "No Akamai API is accessible with these credentials. Check the API client's \
             permissions in Akamai Control Center."
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CredentialSource;
    use akamai_reporter_core::edgegrid::Credentials;
    use axum::http::{StatusCode, Uri};
    use axum::Router;

    async fn status_for(uri: Uri) -> StatusCode {
        match uri.path() {
            "/papi/v1/contracts" | "/papi/v1/groups" => StatusCode::OK,
            "/papi/v1/properties" => StatusCode::BAD_REQUEST,
            "/gtm/v1/domains" => StatusCode::UNAUTHORIZED,
            "/cloudlets/v2/policies" => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::FORBIDDEN,
        }
    }

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

    #[tokio::test]
    async fn test_probe_all_classifies_each_endpoint() {
        let client = client_for(Router::new().fallback(status_for)).await;

        let report = probe_all(&client).await;

        let outcome = |path: &str| {
            report
                .results
                .iter()
                .find(|r| r.path == path)
                .map(|r| r.outcome)
        };
        assert_eq!(report.results.len(), PROBES.len());
        assert_eq!(report.accessible, 2);
        assert_eq!(outcome("papi/v1/properties"), Some(ProbeOutcome::NeedsParameters));
        assert_eq!(outcome("gtm/v1/domains"), Some(ProbeOutcome::Unauthorized));
        assert_eq!(outcome("cloudlets/v2/policies"), Some(ProbeOutcome::Failed(500)));
        assert_eq!(outcome("edgeworkers/v1/ids"), Some(ProbeOutcome::Forbidden));
        assert!(ensure_accessible(&report).is_ok());
    }

    #[tokio::test]
    async fn test_nothing_accessible_is_an_error() {
        let client =
            client_for(Router::new().fallback(|| async { StatusCode::FORBIDDEN })).await;

        let report = probe_all(&client).await;

        assert_eq!(report.accessible, 0);
        assert_eq!(report.inaccessible, PROBES.len());
        let err = ensure_accessible(&report).unwrap_err();
        assert!(err.to_string().contains("No Akamai API is accessible"));
    }

    #[test]
    fn test_colored_outcome_keeps_label() {
        colored::control::set_override(false);
        assert_eq!(
            colored_outcome(&ProbeOutcome::Failed(502)).to_string(),
            "failed (502)"
        );
    }
}
