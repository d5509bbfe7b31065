use std::time::Duration;
use tracing::warn;

pub const DEFAULT_GRAPHQL_URL: &str = "https://www.loom.com/graphql";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_GRAPHQL_URL: &str = "LOOM_GRAPHQL_URL";
pub const ENV_USER_AGENT: &str = "LOOM_USER_AGENT";
pub const ENV_TIMEOUT_SECS: &str = "LOOM_HTTP_TIMEOUT_SECS";

pub fn default_user_agent() -> String {
    format!("loom-transcript-mcp/{}", env!("CARGO_PKG_VERSION"))
}

/// Settings for talking to the Loom API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoomConfig {
    /// GraphQL endpoint every query is POSTed to.
    pub graphql_url: String,
    /// Sent as `User-Agent` on GraphQL requests.
    pub user_agent: String,
    /// Upper bound for any single upstream request, including the caption download.
    pub request_timeout: Duration,
}

impl Default for LoomConfig {
    fn default() -> Self {
        Self {
            graphql_url: DEFAULT_GRAPHQL_URL.to_string(),
            user_agent: default_user_agent(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl LoomConfig {
    /// Defaults overridden by `LOOM_GRAPHQL_URL`, `LOOM_USER_AGENT` and
    /// `LOOM_HTTP_TIMEOUT_SECS` when they are set.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = non_empty(lookup(ENV_GRAPHQL_URL)) {
            config.graphql_url = url;
        }
        if let Some(agent) = non_empty(lookup(ENV_USER_AGENT)) {
            config.user_agent = agent;
        }
        if let Some(raw) = non_empty(lookup(ENV_TIMEOUT_SECS)) {
            match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => config.request_timeout = Duration::from_secs(secs),
                _ => warn!(
                    value = %raw,
                    default_secs = DEFAULT_TIMEOUT_SECS,
                    "Ignoring invalid {}",
                    ENV_TIMEOUT_SECS
                ),
            }
        }

        config
    }

    pub fn with_graphql_url(mut self, url: impl Into<String>) -> Self {
        self.graphql_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
