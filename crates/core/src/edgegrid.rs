//! EdgeGrid request signing and credential parsing
//!
//! Akamai APIs authenticate every request with an `EG1-HMAC-SHA256` Authorization
//! header. Everything here is pure: the caller supplies the timestamp and nonce, so
//! the same inputs always produce the same header.

use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Signing algorithm identifier used as the header prefix
pub const ALGORITHM: &str = "EG1-HMAC-SHA256";

/// Maximum number of body bytes covered by the content hash
pub const MAX_BODY: usize = 131_072;

/// Environment variables holding EdgeGrid credentials, in reporting order
pub const ENV_HOST: &str = "AKAMAI_HOST";
pub const ENV_CLIENT_TOKEN: &str = "AKAMAI_CLIENT_TOKEN";
pub const ENV_CLIENT_SECRET: &str = "AKAMAI_CLIENT_SECRET";
pub const ENV_ACCESS_TOKEN: &str = "AKAMAI_ACCESS_TOKEN";

/// Errors raised while loading credentials or signing
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum EdgeGridError {
    #[error("section [{0}] not found in edgerc file")]
    SectionNotFound(String),

    #[error("section [{section}] is missing required key '{key}'")]
    MissingKey { section: String, key: String },

    #[error("invalid signing key: {0}")]
    InvalidKey(String),
}

/// EdgeGrid API client credentials
#[derive(Clone, PartialEq)]
pub struct Credentials {
    pub host: String,
    pub client_token: String,
    pub client_secret: String,
    pub access_token: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("host", &self.host)
            .field("client_token", &mask(&self.client_token))
            .field("client_secret", &"***")
            .field("access_token", &mask(&self.access_token))
            .finish()
    }
}

impl Credentials {
    pub fn new(
        host: impl Into<String>,
        client_token: impl Into<String>,
        client_secret: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            host: normalize_host(&host.into()),
            client_token: client_token.into().trim().to_string(),
            client_secret: client_secret.into().trim().to_string(),
            access_token: access_token.into().trim().to_string(),
        }
    }

    /// Build credentials from a variable lookup (usually the process environment).
    ///
    /// Empty values count as missing. On failure the names of every missing
    /// variable are returned, in a stable order.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Vec<String>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host = get(ENV_HOST);
        let client_token = get(ENV_CLIENT_TOKEN);
        let client_secret = get(ENV_CLIENT_SECRET);
        let access_token = get(ENV_ACCESS_TOKEN);

        match (host, client_token, client_secret, access_token) {
            (Some(h), Some(ct), Some(cs), Some(at)) => Ok(Self::new(h, ct, cs, at)),
            (h, ct, cs, at) => Err([
                (ENV_HOST, h.is_none()),
                (ENV_CLIENT_TOKEN, ct.is_none()),
                (ENV_CLIENT_SECRET, cs.is_none()),
                (ENV_ACCESS_TOKEN, at.is_none()),
            ]
            .into_iter()
            .filter(|(_, missing)| *missing)
            .map(|(name, _)| name.to_string())
            .collect()),
        }
    }

    /// Base URL for API calls. Bare hosts are reached over HTTPS.
    pub fn base_url(&self) -> String {
        if self.host.starts_with("http://") || self.host.starts_with("https://") {
            self.host.clone()
        } else {
            format!("https://{}", self.host)
        }
    }
}

/// A section read from an `.edgerc` file
#[derive(Debug, Clone, PartialEq)]
pub struct EdgercSection {
    pub credentials: Credentials,
    pub account_key: Option<String>,
}

/// Parse one section out of `.edgerc` (INI) contents.
///
/// Lines starting with `#` or `;` are comments. Values may be quoted. When a key
/// repeats inside the section the last value wins.
pub fn parse_edgerc(contents: &str, section: &str) -> Result<EdgercSection, EdgeGridError> {
    let mut current: Option<String> = None;
    let mut found = false;
    let mut values: std::collections::HashMap<String, String> = Default::default();

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            let name = name.trim().to_string();
            if name == section {
                found = true;
            }
            current = Some(name);
            continue;
        }

        if current.as_deref() != Some(section) {
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            values.insert(key.trim().to_string(), value.to_string());
        }
    }

    if !found {
        return Err(EdgeGridError::SectionNotFound(section.to_string()));
    }

    let required = |key: &str| -> Result<String, EdgeGridError> {
        values
            .get(key)
            .filter(|v| !v.is_empty())
            .cloned()
            .ok_or_else(|| EdgeGridError::MissingKey {
                section: section.to_string(),
                key: key.to_string(),
            })
    };

    let credentials = Credentials::new(
        required("host")?,
        required("client_token")?,
        required("client_secret")?,
        required("access_token")?,
    );

    Ok(EdgercSection {
        credentials,
        account_key: values.get("account_key").filter(|v| !v.is_empty()).cloned(),
    })
}

/// Strip whitespace and trailing slashes from a configured host
pub fn normalize_host(host: &str) -> String {
    host.trim().trim_end_matches('/').to_string()
}

/// Whether a host looks like an Akamai API hostname (`akab-...` or `akamai...`)
pub fn looks_like_akamai_host(host: &str) -> bool {
    let bare = host
        .trim_start_matches("https://")
        .trim_start_matches("http://");
    bare.starts_with("akab-") || bare.starts_with("akamai")
}

/// Show the first 8 characters of a secret-ish value followed by `...`
pub fn mask(value: &str) -> String {
    let prefix: String = value.chars().take(8).collect();
    format!("{prefix}...")
}

/// EdgeGrid timestamp: `20140321T19:34:21+0000`
pub fn format_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y%m%dT%H:%M:%S+0000").to_string()
}

/// The parts of an outgoing request that the signature covers
#[derive(Debug, Clone)]
pub struct SignableRequest<'a> {
    pub method: &'a str,
    pub scheme: &'a str,
    /// Host as sent on the wire, including a port when not the default
    pub host: &'a str,
    /// Path plus `?query` when the request has one
    pub path_and_query: &'a str,
    pub body: &'a [u8],
}

/// Content hash covers POST bodies only, truncated to [`MAX_BODY`] bytes
pub fn content_hash(method: &str, body: &[u8]) -> String {
    if !method.eq_ignore_ascii_case("POST") || body.is_empty() {
        return String::new();
    }

    let end = body.len().min(MAX_BODY);
    let digest = Sha256::digest(&body[..end]);
    base64::engine::general_purpose::STANDARD.encode(digest)
}

fn hmac_sha256_base64(key: &[u8], data: &[u8]) -> Result<String, EdgeGridError> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|e| EdgeGridError::InvalidKey(e.to_string()))?;
    mac.update(data);
    Ok(base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
}

/// Compute the `Authorization` header value for a request.
///
/// # Arguments
/// * `credentials` - Client credentials
/// * `request` - Method, scheme, host, path/query and body of the request
/// * `timestamp` - Output of [`format_timestamp`]
/// * `nonce` - Unique per request (a UUID in practice)
pub fn sign_request(
    credentials: &Credentials,
    request: &SignableRequest<'_>,
    timestamp: &str,
    nonce: &str,
) -> Result<String, EdgeGridError> {
    let auth_prefix = format!(
        "{ALGORITHM} client_token={};access_token={};timestamp={timestamp};nonce={nonce};",
        credentials.client_token, credentials.access_token
    );

    let data_to_sign = [
        request.method.to_uppercase(),
        request.scheme.to_lowercase(),
        request.host.to_string(),
        request.path_and_query.to_string(),
        // No headers are included in the signature.
        String::new(),
        content_hash(request.method, request.body),
        auth_prefix.clone(),
    ]
    .join("\t");

    let signing_key = hmac_sha256_base64(
        credentials.client_secret.as_bytes(),
        timestamp.as_bytes(),
    )?;
    let signature = hmac_sha256_base64(signing_key.as_bytes(), data_to_sign.as_bytes())?;

    Ok(format!("{auth_prefix}signature={signature}"))
}
