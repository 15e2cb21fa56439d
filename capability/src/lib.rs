//! API surface detection and capability caching for Grafana backends.
//!
//! Grafana is migrating resource by resource from its legacy REST API
//! (`/api/...`) to Kubernetes-style aggregated APIs
//! (`/apis/<group>/<version>/namespaces/<ns>/<resource>`). Which surface a
//! given instance serves depends on its version and feature toggles, so a
//! client has to find out at runtime and remember the answer.
//!
//! This crate provides the three pieces of that machinery:
//! - [`discovery`]: a single-request probe of `GET /apis` that classifies
//!   what the backend supports
//! - [`cache`]: a TTL cache of probe results plus per-group routing
//!   overrides, keyed by backend URL
//! - [`api_path`]: extraction of replacement paths from the HTTP 406
//!   error text a backend sends when a legacy endpoint has been retired
//!
//! Policy (when to probe, how to react to a 406) lives with the caller;
//! see the `grafana-instance` crate for the standard wiring.

#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod api_path;
pub mod cache;
pub mod discovery;
pub mod error;

pub use api_path::{KubernetesApiPath, parse_406_error, parse_kubernetes_api_path};
pub use cache::{
    ApiCapability, ApiGroupInfo, CapabilityCache, CapabilitySnapshot, DEFAULT_CACHE_TTL,
};
pub use discovery::{
    ApiGroup, ApiGroupList, GroupVersionInfo, discover_apis, snapshot_from_response,
};
pub use error::{CapabilityError, Result};

/// API groups Grafana serves through the aggregated surface.
pub const API_GROUP_DASHBOARD: &str = "dashboard.grafana.app";
pub const API_GROUP_FOLDER: &str = "folder.grafana.app";
pub const API_GROUP_IAM: &str = "iam.grafana.app";
pub const API_GROUP_USER_STORAGE: &str = "userstorage.grafana.app";
pub const API_GROUP_FEATURES: &str = "features.grafana.app";
