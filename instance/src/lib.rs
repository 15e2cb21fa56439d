//! Capability-aware Grafana client facade.
//!
//! Wraps one Grafana backend and routes each call to the API surface that
//! instance actually serves: the legacy REST API (`/api/...`) or the
//! Kubernetes-style aggregated API (`/apis/<group>/<version>/...`).
//! Surface detection, caching, and 406 handling come from the
//! `grafana-capability` crate; this crate adds credentials, configuration,
//! and the per-resource fetch flows.

#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod config;
pub mod dashboards;
pub mod error;
pub mod instance;

pub use config::{BasicAuth, DEFAULT_GRAFANA_URL, GrafanaConfig, ORG_ID_HEADER};
pub use dashboards::{DEFAULT_NAMESPACE, DashboardPayload, DashboardResource, ResourceMetadata};
pub use error::{InstanceError, Result};
pub use instance::GrafanaInstance;
