//! Price job settings read from the environment.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::PricesError;
use crate::credentials::DEFAULT_ROTATION_THRESHOLD;

/// Default provider endpoint for the radius search.
pub const DEFAULT_API_URL: &str = "https://creativecommons.tankerkoenig.de/json/list.php";

/// Number of `APIKEYn` variables read.
pub const API_KEY_SLOTS: usize = 3;

/// Everything the scheduled jobs need.
#[derive(Debug, Clone, PartialEq)]
pub struct PricesConfig {
    /// Radius search endpoint.
    pub api_url: String,
    /// Non-empty keys from `APIKEY1..APIKEY3`, in order.
    pub api_keys: Vec<String>,
    /// Requests per key before rotating.
    pub rotation_threshold: u64,
    /// Time between price job runs.
    pub interval: Duration,
    /// Pause before each regional request.
    pub request_delay: Duration,
    /// Upper bound for one regional request.
    pub fetch_timeout: Duration,
    /// Sample message files to replay, from `MSG_MESSAGES`.
    pub messages: Vec<String>,
    /// Directory holding the sample messages.
    pub messages_dir: PathBuf,
    /// Time between replay runs.
    pub replay_interval: Duration,
    /// Pause after each replayed message.
    pub replay_delay: Duration,
}

impl Default for PricesConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_keys: Vec::new(),
            rotation_threshold: DEFAULT_ROTATION_THRESHOLD,
            interval: Duration::from_secs(300),
            request_delay: Duration::from_secs(15),
            fetch_timeout: Duration::from_secs(30),
            messages: Vec::new(),
            messages_dir: PathBuf::from("msg-examples"),
            replay_interval: Duration::from_secs(30),
            replay_delay: Duration::from_secs(10),
        }
    }
}

impl PricesConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`PricesError::Config`] if a numeric variable does not parse.
    pub fn from_env() -> Result<Self, PricesError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which returns a variable's
    /// value or `None` if unset.
    ///
    /// Empty keys and empty message names are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`PricesError::Config`] if a numeric variable does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, PricesError> {
        let defaults = Self::default();

        let api_keys = (1..=API_KEY_SLOTS)
            .filter_map(|slot| lookup(&format!("APIKEY{slot}")))
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .collect();

        let messages = lookup("MSG_MESSAGES")
            .map(|list| {
                list.split(';')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            api_url: lookup("PRICE_API_URL").unwrap_or(defaults.api_url),
            api_keys,
            rotation_threshold: parse_or(
                &lookup,
                "PRICE_ROTATION_THRESHOLD",
                defaults.rotation_threshold,
            )?,
            interval: seconds_or(&lookup, "PRICE_INTERVAL_SECS", defaults.interval)?,
            request_delay: seconds_or(&lookup, "PRICE_REQUEST_DELAY_SECS", defaults.request_delay)?,
            fetch_timeout: seconds_or(&lookup, "PRICE_FETCH_TIMEOUT_SECS", defaults.fetch_timeout)?,
            messages,
            messages_dir: lookup("MSG_EXAMPLES_DIR").map_or(defaults.messages_dir, PathBuf::from),
            replay_interval: seconds_or(&lookup, "MSG_INTERVAL_SECS", defaults.replay_interval)?,
            replay_delay: seconds_or(&lookup, "MSG_DELAY_SECS", defaults.replay_delay)?,
        })
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, PricesError>
where
    T::Err: std::fmt::Display,
{
    lookup(name).map_or(Ok(default), |raw| {
        raw.trim().parse().map_err(|e| PricesError::Config {
            message: format!("{name}={raw:?}: {e}"),
        })
    })
}

fn seconds_or(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: Duration,
) -> Result<Duration, PricesError> {
    parse_or(lookup, name, default.as_secs()).map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn unset_environment_gives_defaults() {
        let config = PricesConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, PricesConfig::default());
    }

    #[test]
    fn reads_keys_messages_and_durations() {
        let config = PricesConfig::from_lookup(lookup_from(&[
            ("APIKEY1", "first"),
            ("APIKEY2", "  "),
            ("APIKEY3", "third"),
            ("MSG_MESSAGES", "a.json; b.json;;"),
            ("MSG_EXAMPLES_DIR", "/srv/msgs"),
            ("PRICE_INTERVAL_SECS", "120"),
            ("PRICE_FETCH_TIMEOUT_SECS", " 5 "),
        ]))
        .unwrap();

        assert_eq!(config.api_keys, vec!["first", "third"]);
        assert_eq!(config.messages, vec!["a.json", "b.json"]);
        assert_eq!(config.messages_dir, PathBuf::from("/srv/msgs"));
        assert_eq!(config.interval, Duration::from_secs(120));
        assert_eq!(config.fetch_timeout, Duration::from_secs(5));
        assert_eq!(config.request_delay, Duration::from_secs(15));
    }

    #[test]
    fn bad_number_is_a_config_error() {
        let result = PricesConfig::from_lookup(lookup_from(&[("PRICE_INTERVAL_SECS", "soon")]));
        let Err(PricesError::Config { message }) = result else {
            panic!("expected a config error");
        };
        assert!(message.contains("PRICE_INTERVAL_SECS"));
    }
}
