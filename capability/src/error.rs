use thiserror::Error;

/// Errors from capability discovery.
#[derive(Debug, Error)]
pub enum CapabilityError {
    /// Network request failed before a status line was received. Callers
    /// must not cache anything on this variant; the backend state is
    /// unknown.
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The discovery endpoint answered with a status that carries no
    /// capability information (anything other than 200 or 404).
    #[error("Unexpected status {status} from discovery endpoint: {body}")]
    UnexpectedStatus {
        /// HTTP status code.
        status: u16,
        /// Raw response body, for diagnostics.
        body: String,
    },

    /// The endpoint exists but returned a body that is not a valid API
    /// group listing.
    #[error("Failed to decode API group listing: {0}")]
    Decode(#[source] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CapabilityError>;
