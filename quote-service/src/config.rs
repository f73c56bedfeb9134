use quote_flow::submission::{FINALIZE_DURATION, STEP_DURATION, SubmissionTimeline};
use std::{str::FromStr, time::Duration};
use tracing::warn;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Structured JSON for production.
    #[default]
    Json,
    /// Human-readable output for development.
    Pretty,
}

impl LogFormat {
    pub fn from_env() -> Self {
        Self::parse(std::env::var("LOG_FORMAT").ok().as_deref())
    }

    /// Anything other than `pretty` means JSON.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("pretty") => LogFormat::Pretty,
            _ => LogFormat::Json,
        }
    }
}

/// Runtime settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,
    pub submit_step: Duration,
    pub submit_complete: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            log_format: LogFormat::Json,
            submit_step: STEP_DURATION,
            submit_complete: FINALIZE_DURATION,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unparseable values fall back to their
    /// defaults with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("HOST")
                .filter(|host| !host.trim().is_empty())
                .unwrap_or(defaults.host),
            port: parse_or("PORT", lookup("PORT"), defaults.port),
            log_format: LogFormat::parse(lookup("LOG_FORMAT").as_deref()),
            submit_step: millis_or("SUBMIT_STEP_MS", lookup("SUBMIT_STEP_MS"), defaults.submit_step),
            submit_complete: millis_or(
                "SUBMIT_COMPLETE_MS",
                lookup("SUBMIT_COMPLETE_MS"),
                defaults.submit_complete,
            ),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn submission_timeline(&self) -> SubmissionTimeline {
        SubmissionTimeline::with_durations(self.submit_step, self.submit_complete)
    }
}

fn parse_or<T: FromStr + Copy + std::fmt::Display>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, default = %default, "invalid setting, using default");
            default
        }),
    }
}

fn millis_or(key: &str, raw: Option<String>, default: Duration) -> Duration {
    let millis = u64::try_from(default.as_millis()).unwrap_or(u64::MAX);
    Duration::from_millis(parse_or(key, raw, millis))
}
