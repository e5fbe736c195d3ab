//! Global Traffic Management (GTM) domain exports
//!
//! GTM objects are written to JSON verbatim, so rows are built straight from the
//! raw `serde_json::Value` items. Most CSV headers are the upstream field names.

use crate::envelope::extract_items;
use crate::report::{value_cell, Table};
use serde_json::Value;

pub const DATACENTERS: &str = "datacenters";
pub const LIVENESS_TESTS: &str = "liveness_tests";
pub const CIDR_MAPS: &str = "cidr_maps";
pub const AS_MAPS: &str = "as_maps";
pub const GEO_MAPS: &str = "geo_maps";
pub const PROPERTIES: &str = "properties";

pub const DATACENTER_COLUMNS: &[&str] = &[
    "datacenterId",
    "nickname",
    "city",
    "stateOrProvince",
    "country",
    "continent",
    "latitude",
    "longitude",
    "virtual",
    "cloneOf",
    "scorePenalty",
    "weight",
];

pub const LIVENESS_TEST_COLUMNS: &[&str] = &[
    "name",
    "testInterval",
    "testObject",
    "testObjectProtocol",
    "testObjectPort",
    "testTimeout",
    "httpError3xx",
    "httpError4xx",
    "httpError5xx",
    "requestString",
    "responseString",
    "peerCertificateVerification",
];

/// Domain names from `gtm/v1/domains`. Items are strings or `{"name": ...}` objects.
pub fn domain_names(value: &Value) -> Vec<String> {
    extract_items(value, &["items", "domains"])
        .into_iter()
        .filter_map(|item| match item {
            Value::String(name) => Some(name),
            Value::Object(map) => map.get("name").and_then(Value::as_str).map(String::from),
            _ => None,
        })
        .filter(|name| !name.is_empty())
        .collect()
}

/// One row per item, one column per key
pub fn keyed_table(items: &[Value], columns: &[&str]) -> Table {
    let mut table = Table::new(columns);
    for item in items {
        table.push(columns.iter().map(|c| value_cell(item.get(*c))).collect());
    }
    table
}

/// Rows for `cidr_maps.csv`, `as_maps.csv` and `geo_maps.csv`
pub fn maps_table(maps: &[Value]) -> Table {
    let mut table = Table::new(&["name", "defaultDatacenter", "assignmentsCount"]);
    for m in maps {
        let assignments = m
            .get("assignments")
            .and_then(Value::as_array)
            .map_or(0, Vec::len);
        table.push(vec![
            value_cell(m.get("name")),
            value_cell(m.get("defaultDatacenter").and_then(|d| d.get("datacenterId"))),
            assignments.to_string(),
        ]);
    }
    table
}

/// `propertyName`, falling back to `name`
pub fn property_name(property: &Value) -> Option<String> {
    ["propertyName", "name"]
        .iter()
        .filter_map(|k| property.get(*k).and_then(Value::as_str))
        .find(|n| !n.is_empty())
        .map(String::from)
}

/// Map reference on a property: either the map name or an object carrying it
fn map_reference(property: &Value, key: &str) -> String {
    match property.get(key) {
        Some(Value::Object(map)) => value_cell(map.get("name")),
        other => value_cell(other),
    }
}

/// Traffic targets of a full property object
pub fn traffic_targets(full: &Value) -> Vec<Value> {
    full.get("trafficTargets")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

/// Rows for `properties.csv`: the listing entry plus the target count of its full object
pub fn properties_table(properties: &[(Value, Value)]) -> Table {
    let mut table = Table::new(&[
        "propertyName",
        "type",
        "ipv6",
        "handoutMode",
        "failoverOrder",
        "healthThreshold",
        "geoMap",
        "asMap",
        "cidrMap",
        "ttl",
        "trafficTargetsCount",
    ]);
    for (summary, full) in properties {
        table.push(vec![
            property_name(summary).unwrap_or_default(),
            value_cell(summary.get("type")),
            value_cell(summary.get("ipv6")),
            value_cell(summary.get("handoutMode")),
            value_cell(summary.get("failoverOrder")),
            value_cell(summary.get("healthThreshold")),
            map_reference(summary, "geoMap"),
            map_reference(summary, "asMap"),
            map_reference(summary, "cidrMap"),
            value_cell(summary.get("ttl")),
            traffic_targets(full).len().to_string(),
        ]);
    }
    table
}

/// Rows for `property_<name>_targets.csv`
pub fn targets_table(full: &Value) -> Table {
    let mut table = Table::new(&[
        "datacenterId",
        "enabled",
        "weight",
        "servers",
        "handoutCName",
        "name",
    ]);
    for t in traffic_targets(full) {
        let servers = t
            .get("servers")
            .and_then(Value::as_array)
            .map(|s| {
                s.iter()
                    .map(|v| value_cell(Some(v)))
                    .collect::<Vec<_>>()
                    .join(";")
            })
            .unwrap_or_default();
        table.push(vec![
            value_cell(t.get("datacenterId")),
            value_cell(t.get("enabled")),
            value_cell(t.get("weight")),
            servers,
            value_cell(t.get("handoutCName")),
            value_cell(t.get("name")),
        ]);
    }
    table
}
