//! Connection settings for one Grafana backend.

use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

/// Grafana URL used when none is configured.
pub const DEFAULT_GRAFANA_URL: &str = "http://localhost:3000";

/// Header carrying the organization id.
pub const ORG_ID_HEADER: &str = "x-grafana-org-id";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Username and password for HTTP basic auth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

/// Connection settings for one Grafana backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GrafanaConfig {
    /// Base URL of the instance. A trailing slash is tolerated and
    /// trimmed at instance construction.
    pub url: String,

    /// Service-account token, sent as a bearer `Authorization` header.
    /// Takes precedence over `basic_auth` when both are set.
    pub service_account_token: Option<String>,

    /// Basic-auth credentials, used only when no token is configured.
    pub basic_auth: Option<BasicAuth>,

    /// Organization id, sent as [`ORG_ID_HEADER`] on every request when
    /// set.
    pub org_id: Option<u64>,

    /// Request timeout for the client built by
    /// [`GrafanaConfig::http_client`].
    pub timeout: Duration,
}

impl Default for GrafanaConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_GRAFANA_URL.to_string(),
            service_account_token: None,
            basic_auth: None,
            org_id: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl GrafanaConfig {
    /// Build a configuration from the standard `GRAFANA_*` environment
    /// variables.
    ///
    /// `GRAFANA_SERVICE_ACCOUNT_TOKEN` wins over basic auth. When no
    /// token is set, `GRAFANA_USERNAME`/`GRAFANA_PASSWORD` are used and
    /// default to `admin`/`admin`, Grafana's out-of-the-box login.
    pub fn from_env() -> Self {
        let url = env_nonempty("GRAFANA_URL").unwrap_or_else(|| DEFAULT_GRAFANA_URL.to_string());
        let service_account_token = env_nonempty("GRAFANA_SERVICE_ACCOUNT_TOKEN");

        let basic_auth = if service_account_token.is_none() {
            Some(BasicAuth {
                username: env_nonempty("GRAFANA_USERNAME").unwrap_or_else(|| "admin".to_string()),
                password: env_nonempty("GRAFANA_PASSWORD").unwrap_or_else(|| "admin".to_string()),
            })
        } else {
            None
        };

        let org_id = env_nonempty("GRAFANA_ORG_ID").and_then(|v| v.parse().ok());

        Self {
            url,
            service_account_token,
            basic_auth,
            org_id,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Build the HTTP client used for requests to this instance.
    pub fn http_client(&self) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder()
            .user_agent(concat!("grafana-instance/", env!("CARGO_PKG_VERSION")))
            .timeout(self.timeout)
            .build()
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
