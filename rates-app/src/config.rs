//! Configuration loading from environment.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;

use rates_hex::outbound::{SmtpConfig, SmtpTls};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATABASE_URL: &str = "sqlite://exchange.db?mode=rwc";
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_MAIL_FROM: &str = "noreply@gses2.app";

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub rate_api_url: String,
    pub staleness_threshold: Duration,
    pub fetch_timeout: Duration,
    pub smtp: SmtpConfig,
    pub broadcast_schedule: String,
    /// Per-peer request quota; no limiting when unset.
    pub rate_limit_per_minute: Option<u32>,
    /// OTLP collector; span export is off when unset.
    pub otlp_endpoint: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through `lookup`. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let fetch_timeout = Duration::from_secs(parse_or(
            &var,
            "RATE_FETCH_TIMEOUT_SECS",
            exchange_rates::DEFAULT_TIMEOUT.as_secs(),
        )?);

        let credentials = match (var("SMTP_USERNAME"), var("SMTP_PASSWORD")) {
            (Some(user), Some(pass)) => Some((user, pass)),
            (None, None) => None,
            _ => anyhow::bail!("SMTP_USERNAME and SMTP_PASSWORD must be set together"),
        };

        let smtp = SmtpConfig {
            host: var("SMTP_HOST")
                .ok_or_else(|| anyhow::anyhow!("SMTP_HOST environment variable is required"))?,
            port: parse_or(&var, "SMTP_PORT", DEFAULT_SMTP_PORT)?,
            credentials,
            tls: parse_or(&var, "SMTP_TLS", SmtpTls::default())?,
            from: var("MAIL_FROM").unwrap_or_else(|| DEFAULT_MAIL_FROM.to_string()),
            timeout: fetch_timeout,
        };

        Ok(Self {
            port: parse_or(&var, "PORT", DEFAULT_PORT)?,
            database_url: var("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            rate_api_url: var("RATE_API_URL")
                .unwrap_or_else(|| exchange_rates::DEFAULT_API_URL.to_string()),
            staleness_threshold: Duration::from_secs(parse_or(
                &var,
                "RATE_STALENESS_SECS",
                rates_hex::cache::DEFAULT_STALENESS_THRESHOLD.as_secs(),
            )?),
            fetch_timeout,
            smtp,
            broadcast_schedule: var("BROADCAST_SCHEDULE")
                .unwrap_or_else(|| rates_hex::scheduler::DEFAULT_SCHEDULE.to_string()),
            rate_limit_per_minute: var("RATE_LIMIT_PER_MINUTE")
                .map(|raw| parse("RATE_LIMIT_PER_MINUTE", &raw))
                .transpose()?,
            otlp_endpoint: var("OTEL_EXPORTER_OTLP_ENDPOINT"),
        })
    }
}

fn parse_or<T>(var: impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match var(key) {
        Some(raw) => parse(key, &raw),
        None => Ok(default),
    }
}

fn parse<T>(key: &str, raw: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| anyhow::anyhow!("{e}"))
        .with_context(|| format!("invalid {key}={raw:?}"))
}
