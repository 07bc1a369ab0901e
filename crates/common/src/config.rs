//! Environment-driven service configuration.

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// 4-character location code of the airfield being watched.
    pub location: String,
    /// NATS server URL for the live feed.
    pub nats_url: String,
    /// Subject the feed publishes NOTAM messages on.
    pub nats_subject: String,
    /// Optional feed credentials.
    pub nats_user: Option<String>,
    pub nats_password: Option<String>,
    /// Bound on a single feed connection attempt.
    pub connect_timeout: Duration,
    /// Fixed delay before retrying a lost feed connection.
    pub reconnect_backoff: Duration,
    /// Templated listing URL for the fallback scrape; `{location}` is
    /// substituted with the location code.
    pub scrape_url_template: String,
    /// How often the fallback scraper runs.
    pub scrape_interval: Duration,
    /// Bound on a single scrape fetch.
    pub scrape_timeout: Duration,
    /// How often expired records are swept out of the store.
    pub sweep_interval: Duration,
    /// How long an operator override on a navaid flag lasts.
    pub override_ttl: Duration,
    /// HTTP read API port.
    pub http_port: u16,
    /// Prometheus exporter port.
    pub metrics_port: u16,
}

impl Config {
    /// Read configuration from the environment, falling back to defaults
    /// for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            location: env_or("NOTAM_LOCATION", "KMGM"),
            nats_url: env_or("NATS_URL", "nats://localhost:4222"),
            nats_subject: env_or("NATS_SUBJECT", "notam.feed"),
            nats_user: std::env::var("NATS_USER").ok(),
            nats_password: std::env::var("NATS_PASSWORD").ok(),
            connect_timeout: Duration::from_secs(env_parse("FEED_CONNECT_TIMEOUT_SECS", 10)?),
            reconnect_backoff: Duration::from_secs(env_parse("FEED_RECONNECT_BACKOFF_SECS", 10)?),
            scrape_url_template: env_or(
                "SCRAPE_URL_TEMPLATE",
                "https://notams.aim.faa.gov/notamSearch/search?designators={location}",
            ),
            scrape_interval: Duration::from_secs(env_parse("SCRAPE_INTERVAL_SECS", 600)?),
            scrape_timeout: Duration::from_secs(env_parse("SCRAPE_TIMEOUT_SECS", 15)?),
            sweep_interval: Duration::from_secs(env_parse("SWEEP_INTERVAL_SECS", 300)?),
            override_ttl: Duration::from_secs(env_parse("OVERRIDE_TTL_SECS", 1800)?),
            http_port: env_parse("HTTP_PORT", 8080)?,
            metrics_port: env_parse("METRICS_PORT", 9091)?,
        })
    }

    /// Listing URL for this config's location.
    pub fn scrape_url(&self) -> String {
        self.scrape_url_template.replace("{location}", &self.location)
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}
