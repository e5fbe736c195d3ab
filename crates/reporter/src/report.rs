use crate::api::{self, degrade};
use crate::client::EdgeGridClient;
use crate::config::AkamaiConfig;
use crate::output::OutputWriter;
use crate::prelude::{println, *};
use akamai_reporter_core::appsec::{appsec_summary_table, rate_policies_table};
use akamai_reporter_core::checklist::{generate_checklist, group_by_apex};
use akamai_reporter_core::cps::summarize_enrollments;
use akamai_reporter_core::domain::safe_file_component;
use akamai_reporter_core::gtm as gtm_rows;
use akamai_reporter_core::papi::{
    hostname_records, hostnames_table, summarize_rules, usage_summary_table, RulesByVersion,
};
use akamai_reporter_core::products::{
    cloud_wrapper_table, cloudlets_policies_table, edgedns_zones_table, edgeworkers_table,
    gtm_domains_table, network_lists_table,
};
use akamai_reporter_core::report::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, clap::Args)]
pub struct ReportOptions {
    /// Directory the reports are written to
    #[clap(long, default_value = "./out")]
    out_dir: PathBuf,

    /// Fetch property rule trees and summarize them in the checklists
    #[clap(long, default_value = "false")]
    include_rules: bool,

    /// Also inventory Edge DNS, GTM, EdgeWorkers, Cloudlets, Cloud Wrapper and network lists
    #[clap(long, default_value = "false")]
    include_products: bool,
}

pub async fn run(options: ReportOptions, global: crate::Global) -> Result<()> {
    let config = AkamaiConfig::resolve(&global)?;
    let client = EdgeGridClient::new(&config)?;
    log::info!("Connecting to Akamai host: {}", client.host());

    if global.debug {
        log::debug!("Output directory: {}", options.out_dir.display());
        log::debug!("Include rules: {}", options.include_rules);
        log::debug!("Include products: {}", options.include_products);
    }

    let mut writer = OutputWriter::new(&options.out_dir);
    let summary = generate(&client, &options, &mut writer).await?;

    log::info!(
        "{} properties, {} hostnames across {} apex domains, {} certificates, {} AppSec configurations",
        summary.properties,
        summary.hostnames,
        summary.apex_domains,
        summary.certificates,
        summary.appsec_configs
    );

    let root = std::fs::canonicalize(writer.root())
        .with_context(|| f!("Failed to resolve {}", writer.root().display()))?;
    println!("Wrote reports to {}", root.display());

    Ok(())
}

/// Fetch everything and write every report file.
///
/// Only PAPI contract/group listing failures abort; everything else degrades to
/// empty sections.
pub async fn generate(
    client: &EdgeGridClient,
    options: &ReportOptions,
    writer: &mut OutputWriter,
) -> Result<ReportSummary> {
    let mut summary = ReportSummary {
        generated_at: chrono::Utc::now().to_rfc3339(),
        ..Default::default()
    };

    // PAPI
    let discovery = api::papi::discover(client).await?;
    if discovery.combinations.is_empty() {
        log::warn!("No working contract/group combination found, the property inventory will be empty");
    }
    log::info!(
        "Found {} properties across {} contract/group combinations",
        discovery.properties.len(),
        discovery.combinations.len()
    );

    let mut records = Vec::new();
    let mut rules = RulesByVersion::new();
    let mut inventoried = 0;

    for property in &discovery.properties {
        let name = property.property_name.as_deref().unwrap_or_default();
        let Some(version) = api::papi::resolve_version(client, property).await else {
            log::warn!("Skipping property {name}: no version to inventory");
            continue;
        };

        let hostnames = degrade(
            &f!("Hostnames of {name} v{version}"),
            api::papi::get_hostnames(client, property, version).await,
        );
        records.extend(hostname_records(property, version, &hostnames));
        inventoried += 1;

        if options.include_rules {
            let tree = degrade(
                &f!("Rules of {name} v{version}"),
                api::papi::get_rules(client, property, version).await,
            );
            if !tree.is_null() {
                let id = property.property_id.clone().unwrap_or_default();
                rules.insert((id, version), summarize_rules(&tree));
            }
        }
    }

    // CPS
    let enrollments = api::cps::list_enrollments(client, &discovery.contracts).await;
    let cps = summarize_enrollments(&enrollments);

    // AppSec
    let appsec = api::appsec::collect(client).await;

    writer.write_table(USAGE_SUMMARY_CSV, &usage_summary_table(&records))?;
    writer.write_table(HOSTNAMES_CSV, &hostnames_table(&records))?;
    writer.write_table(CPS_CERTS_CSV, &cps.table)?;
    writer.write_table(APPSEC_SUMMARY_CSV, &appsec_summary_table(&appsec))?;
    writer.write_table(RATE_POLICIES_CSV, &rate_policies_table(&appsec))?;

    if options.include_products {
        write_products(client, writer, &mut summary).await?;
    }

    // Checklists
    let by_apex = group_by_apex(&records);
    for (apex, apex_records) in &by_apex {
        let markdown = generate_checklist(apex, apex_records, &rules, &cps.names_by_apex);
        let file = Path::new(CHECKLISTS_DIR).join(f!("{}.md", safe_file_component(apex)));
        writer.write_text(file, &markdown)?;
    }
    log::info!("Generated {} migration checklists", by_apex.len());

    summary.properties = inventoried;
    summary.hostnames = records.len();
    summary.apex_domains = by_apex.len();
    summary.certificates = enrollments.len();
    summary.appsec_configs = appsec.len();
    summary.rate_policies = appsec.iter().map(|c| c.rate_policies.len()).sum();
    summary.files = writer.written().to_vec();
    summary.files.push(REPORT_SUMMARY_JSON.to_string());

    writer.write_json(REPORT_SUMMARY_JSON, &summary)?;

    Ok(summary)
}

async fn write_products(
    client: &EdgeGridClient,
    writer: &mut OutputWriter,
    summary: &mut ReportSummary,
) -> Result<()> {
    let zones = api::products::edgedns_zones(client).await;
    writer.write_table(EDGEDNS_ZONES_CSV, &edgedns_zones_table(&zones))?;
    summary.products.insert("edgedns_zones".to_string(), zones.len());

    let domains = api::gtm::list_domains(client).await;
    writer.write_table(GTM_DOMAINS_CSV, &gtm_domains_table(&domains))?;
    summary.gtm_domains = domains.len();

    let workers = api::products::edgeworkers(client).await;
    writer.write_table(EDGEWORKERS_CSV, &edgeworkers_table(&workers))?;
    summary.products.insert("edgeworkers".to_string(), workers.len());

    let policies = api::products::cloudlet_policies(client).await;
    writer.write_table(CLOUDLETS_POLICIES_CSV, &cloudlets_policies_table(&policies))?;
    summary
        .products
        .insert("cloudlets_policies".to_string(), policies.len());

    let wrappers = api::products::cloud_wrapper(client).await;
    writer.write_table(CLOUD_WRAPPER_CSV, &cloud_wrapper_table(&wrappers))?;
    summary
        .products
        .insert("cloud_wrapper".to_string(), wrappers.len());

    let lists = api::products::network_lists(client).await;
    writer.write_table(NETWORK_LISTS_CSV, &network_lists_table(&lists))?;
    summary.products.insert("network_lists".to_string(), lists.len());

    for domain in &domains {
        write_gtm_domain(client, writer, domain).await?;
    }

    Ok(())
}

/// `gtm/<domain>/`: one CSV + JSON pair per collection, then properties and targets
async fn write_gtm_domain(
    client: &EdgeGridClient,
    writer: &mut OutputWriter,
    domain: &str,
) -> Result<()> {
    let export = api::gtm::export_domain(client, domain).await;
    let dir = Path::new(GTM_DIR).join(safe_file_component(domain));

    for (name, items) in export.collections() {
        let table = match name {
            gtm_rows::DATACENTERS => gtm_rows::keyed_table(items, gtm_rows::DATACENTER_COLUMNS),
            gtm_rows::LIVENESS_TESTS => {
                gtm_rows::keyed_table(items, gtm_rows::LIVENESS_TEST_COLUMNS)
            }
            _ => gtm_rows::maps_table(items),
        };
        writer.write_table(dir.join(f!("{name}.csv")), &table)?;
        writer.write_json(dir.join(f!("{name}.json")), items)?;
    }

    writer.write_table(
        dir.join(f!("{}.csv", gtm_rows::PROPERTIES)),
        &gtm_rows::properties_table(&export.properties),
    )?;

    let mut stems = HashSet::new();
    for (listing, full) in &export.properties {
        let Some(name) = gtm_rows::property_name(listing) else {
            continue;
        };
        let name = unique_stem(&mut stems, &name);
        writer.write_json(dir.join(f!("property_{name}.json")), full)?;
        writer.write_table(
            dir.join(f!("property_{name}_targets.csv")),
            &gtm_rows::targets_table(full),
        )?;
    }

    Ok(())
}

/// File-safe stem for `name`, suffixed `_2`, `_3`... when an earlier name already
/// maps to the same stem
fn unique_stem(used: &mut HashSet<String>, name: &str) -> String {
    let base = safe_file_component(name);
    let mut stem = base.clone();
    let mut n = 1;
    while !used.insert(stem.clone()) {
        n += 1;
        stem = f!("{base}_{n}");
    }
    if n > 1 {
        log::warn!("GTM property '{name}' clashes with another file name, writing it as {stem}");
    }
    stem
}
