use crate::prelude::*;
use akamai_reporter_core::edgegrid::{self, Credentials};
use std::path::{Path, PathBuf};

/// Env file read from the working directory
pub const ENV_FILE: &str = "akamai.env";

/// Overrides the location of [`ENV_FILE`]
pub const ENV_FILE_VAR: &str = "AKAMAI_ENV_FILE";

/// Load `akamai.env` (or `$AKAMAI_ENV_FILE`) into the process environment.
///
/// Variables that are already set are left alone. Returns the path that was loaded,
/// or `None` when there is no file.
pub fn load_env_file() -> std::result::Result<Option<PathBuf>, dotenvy::Error> {
    load_env_file_from(env_file_path(std::env::var_os(ENV_FILE_VAR)))
}

fn env_file_path(over: Option<std::ffi::OsString>) -> PathBuf {
    over.map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(ENV_FILE))
}

fn load_env_file_from(path: PathBuf) -> std::result::Result<Option<PathBuf>, dotenvy::Error> {
    if !path.is_file() {
        return Ok(None);
    }

    dotenvy::from_path(&path)?;
    Ok(Some(path))
}

/// Where the credentials came from
#[derive(Debug, Clone, PartialEq)]
pub enum CredentialSource {
    Environment,
    Edgerc { path: PathBuf, section: String },
}

/// Resolved Akamai configuration
#[derive(Debug, Clone)]
pub struct AkamaiConfig {
    pub credentials: Credentials,
    pub account_switch_key: Option<String>,
    pub source: CredentialSource,
}

impl AkamaiConfig {
    /// Resolve credentials from the environment, falling back to `.edgerc`
    pub fn resolve(global: &crate::Global) -> Result<Self> {
        let config = Self::resolve_with(
            |name| std::env::var(name).ok(),
            global.edgerc.as_deref(),
            &global.edgerc_section,
            global.account_switch_key.as_deref(),
        )?;
        config.log_summary();
        Ok(config)
    }

    /// Resolution with an injectable variable lookup.
    ///
    /// # Arguments
    /// * `lookup` - Reads `AKAMAI_*` variables
    /// * `edgerc` - Explicit `.edgerc` path; `None` means `~/.edgerc` if it exists
    /// * `section` - `.edgerc` section name
    /// * `switch_key` - Account switch key from the CLI/environment
    pub fn resolve_with<F>(
        lookup: F,
        edgerc: Option<&Path>,
        section: &str,
        switch_key: Option<&str>,
    ) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::resolve_from(lookup, edgerc, default_edgerc_path(), section, switch_key)
    }

    /// Same as [`AkamaiConfig::resolve_with`] with the implicit `.edgerc` location given.
    ///
    /// An explicit `.edgerc` that cannot be used is a configuration error. An implicit
    /// one that lacks the section only means the credentials are missing.
    fn resolve_from<F>(
        lookup: F,
        edgerc: Option<&Path>,
        default_edgerc: Option<PathBuf>,
        section: &str,
        switch_key: Option<&str>,
    ) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let switch_key = switch_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(String::from);

        let missing = match Credentials::from_lookup(lookup) {
            Ok(credentials) => {
                return Ok(Self {
                    credentials,
                    account_switch_key: switch_key,
                    source: CredentialSource::Environment,
                });
            }
            Err(missing) => missing,
        };

        let path = match edgerc {
            Some(path) => {
                if !path.is_file() {
                    return Err(Error::Config(f!(
                        "edgerc file not found: {}",
                        path.display()
                    ))
                    .into());
                }
                path.to_path_buf()
            }
            None => match default_edgerc.filter(|p| p.is_file()) {
                Some(path) => path,
                None => return Err(Error::MissingCredentials(missing).into()),
            },
        };

        log::debug!(
            "AKAMAI_* variables incomplete ({}), reading {} [{section}]",
            missing.join(", "),
            path.display()
        );

        let contents = std::fs::read_to_string(&path)
            .with_context(|| f!("Failed to read {}", path.display()))?;
        let parsed = match edgegrid::parse_edgerc(&contents, section) {
            Ok(parsed) => parsed,
            Err(e) if edgerc.is_some() => {
                return Err(Error::Config(f!("{}: {e}", path.display())).into());
            }
            Err(e) => {
                log::debug!("Ignoring {}: {e}", path.display());
                return Err(Error::MissingCredentials(missing).into());
            }
        };

        Ok(Self {
            credentials: parsed.credentials,
            account_switch_key: switch_key.or(parsed.account_key),
            source: CredentialSource::Edgerc {
                path,
                section: section.to_string(),
            },
        })
    }

    fn log_summary(&self) {
        match &self.source {
            CredentialSource::Environment => log::debug!("Using credentials from environment"),
            CredentialSource::Edgerc { path, section } => log::info!(
                "Using credentials from {} [{section}]",
                path.display()
            ),
        }
        log::debug!("Host: {}", self.credentials.host);
        log::debug!("Client token: {}", edgegrid::mask(&self.credentials.client_token));
        log::debug!("Access token: {}", edgegrid::mask(&self.credentials.access_token));
        if let Some(key) = &self.account_switch_key {
            log::info!("Using account switch key: {}", edgegrid::mask(key));
        }

        if !edgegrid::looks_like_akamai_host(&self.credentials.host) {
            log::warn!(
                "Host '{}' does not look like an Akamai API host (expected akab-... or akamai...)",
                self.credentials.host
            );
        }
    }
}

fn default_edgerc_path() -> Option<PathBuf> {
    dirs_next::home_dir().map(|home| home.join(".edgerc"))
}
