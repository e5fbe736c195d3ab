//! Per-product fetchers.
//!
//! Every fetcher except PAPI discovery degrades gracefully: a failed call is logged
//! as a warning and yields an empty result, so one missing entitlement never aborts
//! the whole report.

use crate::prelude::*;

pub mod appsec;
pub mod cps;
pub mod gtm;
pub mod papi;
pub mod products;

/// Unwrap a fetch result, logging a warning and returning the default on failure
pub fn degrade<T: Default>(what: &str, result: Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            match err.downcast_ref::<Error>() {
                Some(Error::Api { status, path, body }) => {
                    log::warn!("{what} unavailable: HTTP {status} on {path}");
                    log::debug!("{path} response body: {body}");
                }
                _ => log::warn!("{what} unavailable: {err}"),
            }
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degrade_passes_values_through() {
        let value = degrade("zones", Ok(vec![1, 2]));
        assert_eq!(value, vec![1, 2]);
    }

    #[test]
    fn test_degrade_returns_default_on_error() {
        let err: Result<Vec<u8>> = Err(Error::Api {
            status: 403,
            path: "gtm/v1/domains".to_string(),
            body: "{}".to_string(),
        }
        .into());

        assert!(degrade("GTM domains", err).is_empty());
    }
}
