//! Extraction of Kubernetes-style API paths from free-form text.
//!
//! When a Grafana backend retires a legacy endpoint it answers HTTP 406
//! with an error message that names the aggregated replacement, e.g.
//! `"this endpoint has been removed, use
//! /apis/dashboard.grafana.app/v1beta1/namespaces/default/dashboards
//! instead"`. Nothing about that message is structured, so the hint is
//! recovered by pattern matching. Callers treat a non-match as a normal
//! outcome, never as an error.
//!
//! The textual matcher stays behind these two functions so it can be
//! replaced with structured-field parsing if the backend ever grows one.

// The path pattern is a literal known to compile - allow expect for regex construction
#![allow(clippy::expect_used)]

use once_cell::sync::OnceCell;
use regex_lite::Regex;

/// One parsed `/apis/...` path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KubernetesApiPath {
    /// API group, e.g. `dashboard.grafana.app`.
    pub group: String,
    /// Version segment, e.g. `v1`, `v0alpha1`, `v2beta1`.
    pub version: String,
    /// Namespace segment, e.g. `default` or `org-2`.
    pub namespace: String,
    /// First resource segment after the namespace, e.g. `dashboards`.
    pub resource: String,
}

fn api_path_re() -> &'static Regex {
    static API_PATH_RE: OnceCell<Regex> = OnceCell::new();
    API_PATH_RE.get_or_init(|| {
        Regex::new(r"/apis/([a-z.]+)/(v[0-9]+(?:alpha|beta)?[0-9]*)/namespaces/([^/]+)/([^/\s]+)")
            .expect("valid api path regex")
    })
}

/// Find the first Kubernetes-style API path anywhere in `text`.
///
/// The match may be embedded in prose; anchoring is deliberately absent.
/// Returns `None` when no well-formed path is present.
pub fn parse_kubernetes_api_path(text: &str) -> Option<KubernetesApiPath> {
    let caps = api_path_re().captures(text)?;
    Some(KubernetesApiPath {
        group: caps[1].to_string(),
        version: caps[2].to_string(),
        namespace: caps[3].to_string(),
        resource: caps[4].to_string(),
    })
}

/// Extract the API group and version a 406 response redirects to.
///
/// Any text containing a well-formed aggregated path counts as a
/// redirection hint; namespace and resource are discarded because the
/// caller already knows which resource it was fetching.
pub fn parse_406_error(text: &str) -> Option<(String, String)> {
    parse_kubernetes_api_path(text).map(|path| (path.group, path.version))
}
