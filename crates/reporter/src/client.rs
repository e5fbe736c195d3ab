use crate::config::AkamaiConfig;
use crate::prelude::*;
use akamai_reporter_core::edgegrid::{self, Credentials, SignableRequest};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::Url;
use serde_json::Value;
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const USER_AGENT: &str = concat!("akamai-usage-reporter/", env!("CARGO_PKG_VERSION"));

/// Query parameter Akamai uses to act on a managed account
pub const ACCOUNT_SWITCH_KEY_PARAM: &str = "accountSwitchKey";

/// Percent-encode a value used as a single path segment
pub fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Async HTTP client that signs every request with EdgeGrid
pub struct EdgeGridClient {
    http: reqwest::Client,
    credentials: Credentials,
    base_url: Url,
    account_switch_key: Option<String>,
}

impl EdgeGridClient {
    pub fn new(config: &AkamaiConfig) -> Result<Self> {
        let base = config.credentials.base_url();
        let base_url = Url::parse(&f!("{base}/"))
            .map_err(|e| Error::Config(f!("Invalid Akamai host '{base}': {e}")))?;

        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| eyre!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            http,
            credentials: config.credentials.clone(),
            base_url,
            account_switch_key: config.account_switch_key.clone(),
        })
    }

    /// Configured API host, without scheme
    pub fn host(&self) -> &str {
        self.base_url.host_str().unwrap_or(&self.credentials.host)
    }

    /// Absolute URL for an API path, with `params` and the account switch key appended
    pub fn url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url> {
        let mut url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| eyre!("Invalid API path '{}': {}", path, e))?;

        if !params.is_empty() || self.account_switch_key.is_some() {
            let mut query = url.query_pairs_mut();
            for (key, value) in params {
                query.append_pair(key, value);
            }
            if let Some(key) = &self.account_switch_key {
                query.append_pair(ACCOUNT_SWITCH_KEY_PARAM, key);
            }
        }

        Ok(url)
    }

    fn authorization(&self, method: &str, url: &Url, body: &[u8]) -> Result<String> {
        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => f!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => return Err(eyre!("URL has no host: {}", url)),
        };
        let path_and_query = match url.query() {
            Some(query) => f!("{}?{query}", url.path()),
            None => url.path().to_string(),
        };

        let timestamp = edgegrid::format_timestamp(chrono::Utc::now());
        let nonce = uuid::Uuid::new_v4().to_string();

        edgegrid::sign_request(
            &self.credentials,
            &SignableRequest {
                method,
                scheme: url.scheme(),
                host: &host,
                path_and_query: &path_and_query,
                body,
            },
            &timestamp,
            &nonce,
        )
        .map_err(|e| eyre!("Failed to sign request: {}", e))
    }

    async fn send(
        &self,
        path: &str,
        params: &[(&str, &str)],
        accept: Option<&str>,
    ) -> Result<reqwest::Response> {
        let url = self.url(path, params)?;
        let authorization = self.authorization("GET", &url, &[])?;

        log::debug!("GET {}", url.path());

        self.http
            .get(url)
            .header(AUTHORIZATION, authorization)
            .header(ACCEPT, accept.unwrap_or("application/json"))
            .send()
            .await
            .map_err(|e| Error::Network(f!("GET {path}: {e}")).into())
    }

    /// Signed GET with a custom `Accept` header. Non-2xx responses become [`Error::Api`].
    pub async fn get_json_accept(
        &self,
        path: &str,
        params: &[(&str, &str)],
        accept: Option<&str>,
    ) -> Result<Value> {
        let response = self.send(path, params, accept).await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                path: path.to_string(),
                body,
            }
            .into());
        }

        log::debug!("{path} -> {status}");

        response
            .json::<Value>()
            .await
            .with_context(|| f!("Failed to parse response from {path}"))
    }

    pub async fn get_json(&self, path: &str, params: &[(&str, &str)]) -> Result<Value> {
        self.get_json_accept(path, params, None).await
    }

    /// Status code of a signed GET; non-2xx is not an error here
    pub async fn probe(&self, path: &str) -> Result<u16> {
        let response = self.send(path, &[], None).await?;
        Ok(response.status().as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CredentialSource;

    fn config(host: &str, switch_key: Option<&str>) -> AkamaiConfig {
        AkamaiConfig {
            credentials: Credentials::new(host, "akab-client", "secret", "akab-access"),
            account_switch_key: switch_key.map(String::from),
            source: CredentialSource::Environment,
        }
    }

    #[test]
    fn test_url_bare_host_uses_https() {
        let client = EdgeGridClient::new(&config("akab-host.luna.akamaiapis.net", None)).unwrap();

        let url = client.url("papi/v1/contracts", &[]).unwrap();

        assert_eq!(
            url.as_str(),
            "https://akab-host.luna.akamaiapis.net/papi/v1/contracts"
        );
        assert_eq!(client.host(), "akab-host.luna.akamaiapis.net");
    }

    #[test]
    fn test_url_appends_params_and_switch_key() {
        let client = EdgeGridClient::new(&config(
            "https://akab-host.luna.akamaiapis.net/",
            Some("1-ABC:1-DEF"),
        ))
        .unwrap();

        let url = client
            .url(
                "/papi/v1/properties",
                &[("contractId", "ctr_1-A"), ("groupId", "grp_2")],
            )
            .unwrap();

        assert_eq!(url.path(), "/papi/v1/properties");
        assert_eq!(
            url.query(),
            Some("contractId=ctr_1-A&groupId=grp_2&accountSwitchKey=1-ABC%3A1-DEF")
        );
    }

    #[test]
    fn test_url_keeps_explicit_port() {
        let client = EdgeGridClient::new(&config("http://127.0.0.1:8080", None)).unwrap();

        let url = client.url("gtm/v1/domains", &[]).unwrap();

        assert_eq!(url.as_str(), "http://127.0.0.1:8080/gtm/v1/domains");
        assert!(url.query().is_none());
    }

    #[test]
    fn test_authorization_header_shape() {
        let client = EdgeGridClient::new(&config("akab-host.luna.akamaiapis.net", None)).unwrap();
        let url = client.url("papi/v1/groups", &[]).unwrap();

        let header = client.authorization("GET", &url, &[]).unwrap();

        assert!(header.starts_with(
            "EG1-HMAC-SHA256 client_token=akab-client;access_token=akab-access;timestamp="
        ));
        assert!(header.contains(";nonce="));
        assert!(header.contains(";signature="));
    }

    #[test]
    fn test_segment_encodes_reserved_characters() {
        assert_eq!(segment("www prop/1"), "www%20prop%2F1");
        assert_eq!(segment("example.akadns.net"), "example.akadns.net");
    }
}
