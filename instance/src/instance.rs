//! Capability-aware access to one Grafana backend.
//!
//! [`GrafanaInstance`] ties together the three capability pieces: it runs
//! the discovery probe lazily with this instance's credentials, stores the
//! result in an injected [`CapabilityCache`], and records per-group
//! routing overrides when a live call reports that a legacy endpoint has
//! been retired (HTTP 406).
//!
//! The cache is shared by handing the same `Arc` to several instances,
//! not through hidden globals; [`GrafanaInstance::with_shared_cache`] is
//! the explicit opt-in for the process-wide one.

use std::sync::Arc;

use grafana_capability::ApiCapability;
use grafana_capability::ApiGroupInfo;
use grafana_capability::CapabilityCache;
use grafana_capability::CapabilitySnapshot;
use grafana_capability::KubernetesApiPath;
use grafana_capability::parse_kubernetes_api_path;
use grafana_capability::snapshot_from_response;

use crate::config::DEFAULT_GRAFANA_URL;
use crate::config::GrafanaConfig;
use crate::config::ORG_ID_HEADER;
use crate::error::InstanceError;
use crate::error::Result;

/// Capability-aware client for a single Grafana backend.
///
/// Cheap to clone; clones share the HTTP connection pool and the
/// capability cache.
#[derive(Clone, Debug)]
pub struct GrafanaInstance {
    config: GrafanaConfig,
    http: reqwest::Client,
    base_url: String,
    cache: Arc<CapabilityCache>,
}

impl GrafanaInstance {
    /// Create an instance backed by an explicit capability cache.
    ///
    /// Instances that should see each other's discoveries get clones of
    /// the same `Arc`; tests get a private cache each.
    pub fn new(config: GrafanaConfig, http: reqwest::Client, cache: Arc<CapabilityCache>) -> Self {
        let base_url = normalize_base_url(&config.url);
        Self {
            config,
            http,
            base_url,
            cache,
        }
    }

    /// Create an instance wired to the process-wide cache.
    pub fn with_shared_cache(config: GrafanaConfig, http: reqwest::Client) -> Self {
        Self::new(config, http, CapabilityCache::shared())
    }

    /// Base URL of the instance, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn config(&self) -> &GrafanaConfig {
        &self.config
    }

    pub fn http_client(&self) -> &reqwest::Client {
        &self.http
    }

    /// Probe `/apis` and cache the result for this instance's URL.
    ///
    /// Runs automatically on the first capability query, but can be called
    /// up front to pre-populate the cache. Replaces the whole cache entry,
    /// so overrides recorded earlier are discarded. Concurrent callers on
    /// a cold cache may each run their own probe; last write wins.
    pub async fn discover_capabilities(&self) -> Result<()> {
        let resp = self.authed_get("/apis").send().await?;
        let snapshot = snapshot_from_response(resp).await?;
        let group_count = snapshot.groups.len();
        let has_kubernetes_apis = snapshot.has_kubernetes_apis;
        self.cache.set(&self.base_url, snapshot);

        if has_kubernetes_apis {
            tracing::debug!(
                url = %self.base_url,
                groups = group_count,
                "Discovered kubernetes-style APIs"
            );
        } else {
            tracing::debug!(
                url = %self.base_url,
                "No kubernetes-style APIs available, using legacy APIs"
            );
        }

        Ok(())
    }

    /// Whether this instance serves the aggregated surface at all.
    ///
    /// Discovers lazily on a cache miss or expired snapshot. Discovery
    /// failures propagate; an instance that cannot be probed is not
    /// assumed to be modern.
    pub async fn has_kubernetes_apis(&self) -> Result<bool> {
        match self.snapshot().await? {
            Some(entry) => Ok(entry.has_kubernetes_apis),
            None => Ok(false),
        }
    }

    /// Discovery data for one API group, or `None` when the instance has
    /// no aggregated surface or does not list the group.
    pub async fn api_group_info(&self, group: &str) -> Result<Option<ApiGroupInfo>> {
        let Some(entry) = self.snapshot().await? else {
            return Ok(None);
        };
        if !entry.has_kubernetes_apis {
            return Ok(None);
        }
        Ok(entry.groups.get(group).cloned())
    }

    /// Version the backend nominates for `group`.
    pub async fn preferred_version(&self, group: &str) -> Result<String> {
        let info = self
            .api_group_info(group)
            .await?
            .ok_or_else(|| InstanceError::GroupNotAvailable {
                group: group.to_string(),
            })?;
        Ok(info.preferred_version)
    }

    /// Routing override recorded for `group`, `Unknown` when none.
    ///
    /// Never triggers discovery and never consults the snapshot TTL.
    pub fn capability(&self, group: &str) -> ApiCapability {
        self.cache.capability(&self.base_url, group)
    }

    /// Record a routing override for `group`.
    ///
    /// Typically called after a 406 proves the legacy endpoint is gone,
    /// or by an operator forcing a surface.
    pub fn set_capability(&self, group: &str, capability: ApiCapability) {
        self.cache.set_capability(&self.base_url, group, capability);
        tracing::debug!(
            url = %self.base_url,
            api_group = %group,
            capability = %capability,
            "Updated API capability"
        );
    }

    /// Whether calls for `group` should go straight to the aggregated
    /// surface.
    ///
    /// True only on an explicit `Kubernetes` override. Mere availability
    /// in the discovery data is not enough: the legacy surface stays the
    /// default until a live response proves it retired.
    pub fn should_use_kubernetes_api(&self, group: &str) -> bool {
        self.capability(group) == ApiCapability::Kubernetes
    }

    /// React to the body of an HTTP 406 from a legacy endpoint.
    ///
    /// When the text names an aggregated replacement path, the group is
    /// switched to `Kubernetes` for all future calls and the parsed path
    /// is returned so the caller can retry immediately. Text without a
    /// recognizable path changes nothing.
    pub fn handle_not_acceptable(&self, message: &str) -> Option<KubernetesApiPath> {
        let path = parse_kubernetes_api_path(message)?;
        self.set_capability(&path.group, ApiCapability::Kubernetes);
        Some(path)
    }

    /// Cached snapshot for this URL, discovering on miss. `None` only
    /// when the fresh snapshot expired before it could be read back.
    async fn snapshot(&self) -> Result<Option<CapabilitySnapshot>> {
        if let Some(entry) = self.cache.get(&self.base_url) {
            return Ok(Some(entry));
        }
        self.discover_capabilities().await?;
        Ok(self.cache.get(&self.base_url))
    }

    /// GET against this instance with the standard headers.
    ///
    /// Auth precedence: service-account token as a bearer header, else
    /// basic auth, else nothing. The org id header is added whenever an
    /// org id is configured.
    pub(crate) fn authed_get(&self, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{path}", self.base_url);
        let mut req = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json");

        if let Some(token) = &self.config.service_account_token {
            req = req.bearer_auth(token);
        } else if let Some(basic) = &self.config.basic_auth {
            req = req.basic_auth(&basic.username, Some(&basic.password));
        }

        if let Some(org_id) = self.config.org_id {
            req = req.header(ORG_ID_HEADER, org_id.to_string());
        }

        req
    }
}

fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    if trimmed.is_empty() {
        DEFAULT_GRAFANA_URL.to_string()
    } else {
        trimmed.to_string()
    }
}
