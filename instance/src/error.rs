use grafana_capability::CapabilityError;
use thiserror::Error;

/// Errors from capability-aware Grafana operations.
#[derive(Debug, Error)]
pub enum InstanceError {
    /// Capability discovery failed.
    #[error(transparent)]
    Capability(#[from] CapabilityError),

    /// Network request failed before a status line was received.
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a status the operation cannot use.
    #[error("Unexpected status {status}: {body}")]
    UnexpectedStatus {
        /// HTTP status code.
        status: u16,
        /// Raw response body, for diagnostics.
        body: String,
    },

    /// Response body did not decode as the expected resource.
    #[error("Failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// The aggregated surface does not serve this API group on this
    /// instance.
    #[error("API group {group} not available")]
    GroupNotAvailable {
        /// Group name as queried, e.g. `dashboard.grafana.app`.
        group: String,
    },
}

pub type Result<T> = std::result::Result<T, InstanceError>;
