//! Dashboard access across both API surfaces.
//!
//! The two surfaces return structurally different payloads and nothing
//! here converts between them: callers get whichever shape the serving
//! surface produced, tagged by [`DashboardPayload`].

use std::collections::HashMap;

use grafana_capability::API_GROUP_DASHBOARD;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::Serialize;

use crate::error::InstanceError;
use crate::error::Result;
use crate::instance::GrafanaInstance;

/// Namespace used when the caller does not name one.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Metadata block of an aggregated-API resource.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceMetadata {
    pub name: String,
    pub namespace: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub uid: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub resource_version: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub creation_timestamp: String,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub annotations: HashMap<String, String>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub labels: HashMap<String, String>,
}

/// A dashboard as served by the aggregated API.
///
/// `spec` is the dashboard model itself and is left untyped; its schema
/// varies by API version.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardResource {
    pub kind: String,
    pub api_version: String,
    pub metadata: ResourceMetadata,
    pub spec: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<serde_json::Value>,
}

/// What a dashboard fetch produced, tagged by the surface that served it.
#[derive(Debug, Clone)]
pub enum DashboardPayload {
    /// Raw body of `GET /api/dashboards/uid/<uid>`.
    Legacy(serde_json::Value),
    /// Typed resource from the aggregated API.
    Kubernetes(DashboardResource),
}

impl GrafanaInstance {
    /// Fetch a dashboard through the aggregated API.
    ///
    /// `namespace` defaults to [`DEFAULT_NAMESPACE`]. Any non-200 answer
    /// is an error carrying the status and raw body.
    pub async fn get_kubernetes_dashboard(
        &self,
        uid: &str,
        version: &str,
        namespace: Option<&str>,
    ) -> Result<DashboardResource> {
        let namespace = namespace.unwrap_or(DEFAULT_NAMESPACE);
        let path = format!(
            "/apis/{API_GROUP_DASHBOARD}/{version}/namespaces/{namespace}/dashboards/{uid}"
        );

        let resp = self.authed_get(&path).send().await?;
        let status = resp.status();
        if status != StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            return Err(InstanceError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(InstanceError::Decode)
    }

    /// Fetch a dashboard from whichever surface this instance serves.
    ///
    /// With a `Kubernetes` override recorded for the dashboard group, the
    /// aggregated API is called directly at its preferred version and the
    /// legacy endpoint is never touched. Otherwise the legacy endpoint is
    /// tried first; when it answers 406 naming a replacement path, the
    /// override is recorded and the fetch retried against the aggregated
    /// surface in one go.
    pub async fn get_dashboard(&self, uid: &str) -> Result<DashboardPayload> {
        if self.should_use_kubernetes_api(API_GROUP_DASHBOARD) {
            let version = self.preferred_version(API_GROUP_DASHBOARD).await?;
            let dashboard = self.get_kubernetes_dashboard(uid, &version, None).await?;
            return Ok(DashboardPayload::Kubernetes(dashboard));
        }

        let resp = self
            .authed_get(&format!("/api/dashboards/uid/{uid}"))
            .send()
            .await?;
        let status = resp.status();

        if status == StatusCode::OK {
            let body = resp.text().await?;
            let value = serde_json::from_str(&body).map_err(InstanceError::Decode)?;
            return Ok(DashboardPayload::Legacy(value));
        }

        let body = resp.text().await.unwrap_or_default();
        if status == StatusCode::NOT_ACCEPTABLE {
            if let Some(path) = self.handle_not_acceptable(&body) {
                let dashboard = self
                    .get_kubernetes_dashboard(uid, &path.version, Some(&path.namespace))
                    .await?;
                return Ok(DashboardPayload::Kubernetes(dashboard));
            }
        }

        Err(InstanceError::UnexpectedStatus {
            status: status.as_u16(),
            body,
        })
    }
}
