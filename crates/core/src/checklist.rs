//! Markdown migration checklists, one per apex domain

use crate::papi::{HostnameRecord, RulesByVersion};
use std::collections::{BTreeMap, BTreeSet};

/// Group hostname records by apex domain (sorted by apex)
pub fn group_by_apex(records: &[HostnameRecord]) -> BTreeMap<String, Vec<HostnameRecord>> {
    let mut grouped: BTreeMap<String, Vec<HostnameRecord>> = BTreeMap::new();
    for record in records {
        grouped
            .entry(record.apex.clone())
            .or_default()
            .push(record.clone());
    }
    grouped
}

/// Render the Cloudflare migration checklist for one apex domain.
///
/// # Arguments
/// * `apex` - Apex domain the checklist is for
/// * `records` - Hostname records under that apex
/// * `rules` - Rule summaries; property versions without one get no rules section
/// * `cps_names_by_apex` - CPS certificate names grouped by apex
pub fn generate_checklist(
    apex: &str,
    records: &[HostnameRecord],
    rules: &RulesByVersion,
    cps_names_by_apex: &BTreeMap<String, Vec<String>>,
) -> String {
    let mut lines: Vec<String> = vec![
        format!("# Cloudflare migration checklist for {apex}"),
        String::new(),
        "- Create zone in Cloudflare".to_string(),
        "- Set DNS nameservers or use partial (CNAME) setup as applicable".to_string(),
        "- Enable Universal SSL or upload cert matching SANs".to_string(),
    ];

    if let Some(names) = cps_names_by_apex.get(apex) {
        let unique: BTreeSet<&str> = names.iter().map(String::as_str).collect();
        lines.push(format!(
            "  - CPS SANs: {}",
            unique.into_iter().collect::<Vec<_>>().join(", ")
        ));
    }

    lines.extend(
        [
            "- Enable WAF managed rules; recreate custom WAF rules",
            "- Recreate cache rules and overrides",
            "- Recreate redirects (Transform or Rulesets)",
            "- Recreate header rules; enable HSTS if present",
            "",
            "## Hostnames",
        ]
        .map(String::from),
    );

    let mut by_hostname: Vec<&HostnameRecord> = records.iter().collect();
    by_hostname.sort_by(|a, b| a.hostname.cmp(&b.hostname));
    for r in by_hostname {
        lines.push(format!(
            "- {} (property {} v{})",
            r.hostname, r.property_name, r.property_version
        ));
    }

    lines.push(String::new());
    lines.push("## Rules summary".to_string());

    let versions: BTreeSet<(&str, u64, &str)> = records
        .iter()
        .map(|r| {
            (
                r.property_name.as_str(),
                r.property_version,
                r.property_id.as_str(),
            )
        })
        .collect();

    for (name, version, id) in versions {
        let Some(summary) = rules.get(&(id.to_string(), version)) else {
            continue;
        };

        lines.push(format!("### {name} v{version}"));
        if summary.has_cache() {
            lines.push("- Cache behaviors present".to_string());
        }
        if summary.has_redirects() {
            lines.push("- Redirect rules present".to_string());
        }
        if summary.has_headers() {
            lines.push("- Header modifications present".to_string());
        }
        if summary.has_hsts() {
            lines.push("- HSTS present".to_string());
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::papi::RuleSummary;
    use serde_json::json;

    fn record(hostname: &str, property: &str, id: &str, version: u64) -> HostnameRecord {
        HostnameRecord {
            apex: "example.com".to_string(),
            hostname: hostname.to_string(),
            property_name: property.to_string(),
            property_id: id.to_string(),
            property_version: version,
        }
    }

    #[test]
    fn test_generate_checklist_without_rules_or_certs() {
        let records = vec![
            record("www.example.com", "site", "prp_1", 3),
            record("api.example.com", "api", "prp_2", 1),
        ];

        let md = generate_checklist(
            "example.com",
            &records,
            &RulesByVersion::new(),
            &BTreeMap::new(),
        );

        let expected = "\
# Cloudflare migration checklist for example.com

- Create zone in Cloudflare
- Set DNS nameservers or use partial (CNAME) setup as applicable
- Enable Universal SSL or upload cert matching SANs
- Enable WAF managed rules; recreate custom WAF rules
- Recreate cache rules and overrides
- Recreate redirects (Transform or Rulesets)
- Recreate header rules; enable HSTS if present

## Hostnames
- api.example.com (property api v1)
- www.example.com (property site v3)

## Rules summary";
        assert_eq!(md, expected);
    }

    #[test]
    fn test_generate_checklist_cps_sans_sorted_unique() {
        let mut cps = BTreeMap::new();
        cps.insert(
            "example.com".to_string(),
            vec![
                "www.example.com".to_string(),
                "api.example.com".to_string(),
                "www.example.com".to_string(),
            ],
        );

        let md = generate_checklist(
            "example.com",
            &[record("www.example.com", "site", "prp_1", 3)],
            &RulesByVersion::new(),
            &cps,
        );

        assert!(md.contains(
            "- Enable Universal SSL or upload cert matching SANs\n  - CPS SANs: api.example.com, www.example.com\n"
        ));
    }

    #[test]
    fn test_generate_checklist_rules_once_per_property_version() {
        let records = vec![
            record("www.example.com", "site", "prp_1", 3),
            record("static.example.com", "site", "prp_1", 3),
            record("api.example.com", "api", "prp_2", 1),
        ];
        let mut rules = RulesByVersion::new();
        rules.insert(
            ("prp_1".to_string(), 3),
            RuleSummary {
                cache: vec![json!({"behavior": "MAX_AGE"})],
                hsts: vec![json!({"enable": true})],
                ..Default::default()
            },
        );
        rules.insert(("prp_2".to_string(), 1), RuleSummary::default());

        let md = generate_checklist("example.com", &records, &rules, &BTreeMap::new());

        assert_eq!(md.matches("### site v3").count(), 1);
        assert!(md.contains("### site v3\n- Cache behaviors present\n- HSTS present\n"));
        assert!(md.contains("### api v1\n\n"));
        assert!(md.find("### api v1") < md.find("### site v3"));
        assert!(!md.contains("Redirect rules present"));
    }

    #[test]
    fn test_group_by_apex() {
        let mut other = record("www.other.org", "other", "prp_9", 1);
        other.apex = "other.org".to_string();
        let records = vec![record("www.example.com", "site", "prp_1", 3), other];

        let grouped = group_by_apex(&records);

        assert_eq!(
            grouped.keys().collect::<Vec<_>>(),
            vec!["example.com", "other.org"]
        );
    }
}
