//! Capability cache for Grafana API surface detection.
//!
//! Grafana backends migrate from the legacy REST API (`/api/...`) to
//! Kubernetes-style aggregated APIs (`/apis/<group>/<version>/...`) one
//! deployment at a time, so which surface exists is a per-instance runtime
//! fact. This module caches that fact per backend URL so repeated calls do
//! not re-probe the discovery endpoint.
//!
//! Two kinds of state live in one entry per URL:
//! - a discovery snapshot (`CapabilitySnapshot`), expired by TTL
//! - per-API-group routing overrides (`ApiCapability`), recorded when a
//!   live response proves a surface works or is retired; overrides are
//!   read without consulting the TTL

// RwLock poisoning is exceptional (requires panic in critical section) - allow expect for internal locks
#![allow(clippy::expect_used)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::RwLock;
use std::time::Duration;
use std::time::Instant;

use once_cell::sync::OnceCell;

/// Default lifetime of a discovery snapshot. Short enough to notice a
/// backend upgrade quickly, long enough to keep probe traffic negligible.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);

// ─────────────────────────────────────────────────────────────────────────────
// Capability model
// ─────────────────────────────────────────────────────────────────────────────

/// Which API surface to use for a given API group.
///
/// `Unknown` is the absence of a decision, not a third surface: callers
/// treat it as "try the legacy surface first".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ApiCapability {
    /// No routing decision has been recorded for this group.
    #[default]
    Unknown,
    /// Use the legacy REST API (`/api/...`).
    Legacy,
    /// Use the Kubernetes-style aggregated API (`/apis/<group>/...`).
    Kubernetes,
}

impl ApiCapability {
    pub fn as_str(self) -> &'static str {
        match self {
            ApiCapability::Unknown => "unknown",
            ApiCapability::Legacy => "legacy",
            ApiCapability::Kubernetes => "kubernetes",
        }
    }
}

impl std::fmt::Display for ApiCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discovery result for a single aggregated API group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiGroupInfo {
    /// Whether the backend lists this group at all.
    pub available: bool,
    /// Version the backend nominates as the default (e.g. `v1beta1`).
    pub preferred_version: String,
    /// Every version the backend exposes, in server order.
    pub all_versions: Vec<String>,
}

/// Everything known about one backend instance's API surfaces.
#[derive(Debug, Clone)]
pub struct CapabilitySnapshot {
    /// Whether the instance serves the aggregated discovery endpoint at
    /// all. `false` is real information (a 404 from `/apis`), not a gap.
    pub has_kubernetes_apis: bool,
    /// Per-group discovery data, keyed by group name
    /// (e.g. `dashboard.grafana.app`). Empty when `has_kubernetes_apis`
    /// is false.
    pub groups: HashMap<String, ApiGroupInfo>,
    /// Per-group routing overrides. Independent of `groups`: an override
    /// may name a group discovery never listed, and it always wins.
    pub overrides: HashMap<String, ApiCapability>,
    /// When the snapshot was taken, for TTL expiry.
    pub discovered_at: Instant,
}

impl CapabilitySnapshot {
    /// Fresh snapshot with no group data and no overrides.
    pub fn new(has_kubernetes_apis: bool) -> Self {
        Self {
            has_kubernetes_apis,
            groups: HashMap::new(),
            overrides: HashMap::new(),
            discovered_at: Instant::now(),
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.discovered_at.elapsed() > ttl
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Cache
// ─────────────────────────────────────────────────────────────────────────────

/// Thread-safe TTL cache of capability snapshots, keyed by backend URL.
///
/// Keys are expected pre-normalized (no trailing slash); the cache compares
/// them byte-for-byte. All operations take `&self` and may be called from
/// any number of threads. The lock is never held across an `.await`: the
/// discovery probe lives in [`crate::discovery`] and callers store its
/// result here afterwards.
#[derive(Debug)]
pub struct CapabilityCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CapabilitySnapshot>>,
}

impl CapabilityCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Process-wide cache with [`DEFAULT_CACHE_TTL`].
    ///
    /// Sharing is opt-in: callers that want isolation (different TTLs,
    /// tests) construct their own cache with [`CapabilityCache::new`] and
    /// pass it around explicitly.
    pub fn shared() -> Arc<CapabilityCache> {
        static SHARED: OnceCell<Arc<CapabilityCache>> = OnceCell::new();
        SHARED
            .get_or_init(|| Arc::new(CapabilityCache::new(DEFAULT_CACHE_TTL)))
            .clone()
    }

    /// Snapshot for `url`, or `None` when missing or older than the TTL.
    ///
    /// Callers cannot distinguish the two cases; both mean "discover
    /// again". Expired entries are left in place until overwritten or
    /// invalidated.
    pub fn get(&self, url: &str) -> Option<CapabilitySnapshot> {
        let entries = self.entries.read().expect("lock");
        let entry = entries.get(url)?;
        if entry.is_expired(self.ttl) {
            return None;
        }
        Some(entry.clone())
    }

    /// Store `snapshot` under `url`, replacing any previous entry wholesale.
    ///
    /// Overrides recorded on the previous entry do not carry over; an
    /// explicit re-discovery starts the routing state from scratch.
    pub fn set(&self, url: &str, snapshot: CapabilitySnapshot) {
        let mut entries = self.entries.write().expect("lock");
        entries.insert(url.to_string(), snapshot);
    }

    /// Routing override for `(url, group)`, or `Unknown` when none is
    /// recorded.
    ///
    /// Deliberately ignores the TTL: an override is a fact learned from a
    /// live response and stays valid after the discovery snapshot expires.
    pub fn capability(&self, url: &str, group: &str) -> ApiCapability {
        let entries = self.entries.read().expect("lock");
        entries
            .get(url)
            .and_then(|entry| entry.overrides.get(group))
            .copied()
            .unwrap_or_default()
    }

    /// Record a routing override for `(url, group)`.
    ///
    /// When no entry exists yet, a minimal snapshot is created so the
    /// override has somewhere to live: `has_kubernetes_apis` is inferred
    /// from the capability, groups stay empty, and the timestamp is fresh.
    /// When an entry exists, only its override map is touched.
    pub fn set_capability(&self, url: &str, group: &str, capability: ApiCapability) {
        let mut entries = self.entries.write().expect("lock");
        let entry = entries.entry(url.to_string()).or_insert_with(|| {
            CapabilitySnapshot::new(capability == ApiCapability::Kubernetes)
        });
        entry.overrides.insert(group.to_string(), capability);
    }

    /// Drop the entry for `url`, including its overrides.
    pub fn invalidate(&self, url: &str) {
        let mut entries = self.entries.write().expect("lock");
        entries.remove(url);
    }

    /// Drop every entry.
    pub fn clear(&self) {
        let mut entries = self.entries.write().expect("lock");
        entries.clear();
    }
}

impl Default for CapabilityCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}
