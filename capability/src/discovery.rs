//! Discovery probe for the aggregated API surface.
//!
//! A single `GET <base>/apis` answers the capability question for one
//! backend: 404 means the instance predates the aggregated APIs entirely
//! (a legitimate, cacheable negative), 200 carries the Kubernetes-style
//! API group listing. The probe itself never touches the cache; callers
//! decide where the snapshot goes.

use reqwest::StatusCode;
use serde::Deserialize;

use crate::cache::ApiGroupInfo;
use crate::cache::CapabilitySnapshot;
use crate::error::CapabilityError;
use crate::error::Result;

/// Top-level body of the `/apis` group listing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGroupList {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub groups: Vec<ApiGroup>,
}

/// One API group in the listing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGroup {
    pub name: String,
    #[serde(default)]
    pub versions: Vec<GroupVersionInfo>,
    #[serde(default)]
    pub preferred_version: GroupVersionInfo,
}

/// A `group/version` pair as the listing spells it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupVersionInfo {
    #[serde(default)]
    pub group_version: String,
    #[serde(default)]
    pub version: String,
}

impl From<ApiGroupList> for CapabilitySnapshot {
    fn from(list: ApiGroupList) -> Self {
        let mut snapshot = CapabilitySnapshot::new(true);
        for group in list.groups {
            let all_versions = group.versions.into_iter().map(|v| v.version).collect();
            snapshot.groups.insert(
                group.name,
                ApiGroupInfo {
                    available: true,
                    preferred_version: group.preferred_version.version,
                    all_versions,
                },
            );
        }
        snapshot
    }
}

/// Probe `base_url` for aggregated API support.
///
/// Sends exactly one unauthenticated request with `Accept:
/// application/json`. Callers that need credentials on the probe issue
/// the request themselves and classify it with
/// [`snapshot_from_response`].
pub async fn discover_apis(
    client: &reqwest::Client,
    base_url: &str,
) -> Result<CapabilitySnapshot> {
    let url = format!("{}/apis", base_url.trim_end_matches('/'));
    let resp = client
        .get(&url)
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await?;
    snapshot_from_response(resp).await
}

/// Classify a `/apis` response into a capability snapshot.
///
/// - 404: the instance has no aggregated surface; the returned snapshot
///   records that as a fact.
/// - 200: the body is decoded as an [`ApiGroupList`]; a body that does
///   not decode is [`CapabilityError::Decode`], which callers must not
///   confuse with the 404 case.
/// - anything else: [`CapabilityError::UnexpectedStatus`] with the raw
///   body attached.
pub async fn snapshot_from_response(resp: reqwest::Response) -> Result<CapabilitySnapshot> {
    let status = resp.status();
    if status == StatusCode::NOT_FOUND {
        return Ok(CapabilitySnapshot::new(false));
    }
    if status != StatusCode::OK {
        let body = resp.text().await.unwrap_or_default();
        return Err(CapabilityError::UnexpectedStatus {
            status: status.as_u16(),
            body,
        });
    }

    let body = resp.text().await?;
    let list: ApiGroupList = serde_json::from_str(&body).map_err(CapabilityError::Decode)?;
    Ok(CapabilitySnapshot::from(list))
}
