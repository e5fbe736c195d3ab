//! Hostname helpers: apex (registrable domain) extraction and file-safe names

use regex::Regex;
use std::net::IpAddr;
use std::sync::LazyLock;

static UNSAFE_FILE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]").expect("valid regex"));

/// Registrable domain of a hostname.
///
/// IP addresses, single labels and bare public suffixes come back unchanged.
pub fn apex_of(hostname: &str) -> String {
    let host = hostname.trim().trim_end_matches('.').to_lowercase();
    let host = host.strip_prefix("*.").unwrap_or(&host).to_string();

    if host.is_empty() || host.parse::<IpAddr>().is_ok() {
        return host;
    }

    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
        return host;
    }

    let suffix_labels = icann_suffix_labels(&host);
    if labels.len() <= suffix_labels {
        return host;
    }

    labels[labels.len() - suffix_labels - 1..].join(".")
}

/// Number of labels in the ICANN public suffix of `host`.
///
/// Private registry entries (`github.io`, `appspot.com`) are not treated as suffixes,
/// so `user.github.io` belongs to `github.io`. Unknown TLDs count as one label.
fn icann_suffix_labels(host: &str) -> usize {
    let mut candidate = host;
    loop {
        let Some(suffix) = psl::suffix(candidate.as_bytes()) else {
            return 1;
        };
        let len = suffix.as_bytes().len();
        let suffix_str = &candidate[candidate.len() - len..];

        if !matches!(suffix.typ(), Some(psl::Type::Private)) {
            return suffix_str.split('.').count();
        }

        match suffix_str.split_once('.') {
            Some((_, parent)) => candidate = parent,
            None => return 1,
        }
    }
}

/// Replace characters that are unsafe in a file name with `_`
pub fn safe_file_component(name: &str) -> String {
    let cleaned = UNSAFE_FILE_CHARS.replace_all(name, "_").to_string();
    match cleaned.as_str() {
        "" => "_".to_string(),
        "." | ".." => cleaned.replace('.', "_"),
        _ => cleaned,
    }
}
