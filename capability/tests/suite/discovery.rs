use grafana_capability::CapabilityError;
use grafana_capability::discover_apis;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::header;
use wiremock::matchers::method;
use wiremock::matchers::path;

fn group_listing() -> serde_json::Value {
    json!({
        "kind": "APIGroupList",
        "apiVersion": "v1",
        "groups": [
            {
                "name": "dashboard.grafana.app",
                "versions": [
                    {"groupVersion": "dashboard.grafana.app/v1beta1", "version": "v1beta1"},
                    {"groupVersion": "dashboard.grafana.app/v0alpha1", "version": "v0alpha1"}
                ],
                "preferredVersion": {
                    "groupVersion": "dashboard.grafana.app/v1beta1",
                    "version": "v1beta1"
                }
            },
            {
                "name": "folder.grafana.app",
                "versions": [
                    {"groupVersion": "folder.grafana.app/v1", "version": "v1"}
                ],
                "preferredVersion": {
                    "groupVersion": "folder.grafana.app/v1",
                    "version": "v1"
                }
            }
        ]
    })
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn discovery_parses_group_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/apis"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(group_listing()))
        .expect(1)
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let snapshot = discover_apis(&client, &server.uri())
        .await
        .expect("discovery should succeed");

    assert!(snapshot.has_kubernetes_apis);
    assert_eq!(snapshot.groups.len(), 2);
    assert!(snapshot.overrides.is_empty());

    let dashboards = snapshot
        .groups
        .get("dashboard.grafana.app")
        .expect("dashboard group should be listed");
    assert!(dashboards.available);
    assert_eq!(dashboards.preferred_version, "v1beta1");
    assert_eq!(dashboards.all_versions, vec!["v1beta1", "v0alpha1"]);

    let folders = snapshot
        .groups
        .get("folder.grafana.app")
        .expect("folder group should be listed");
    assert_eq!(folders.preferred_version, "v1");
    assert_eq!(folders.all_versions, vec!["v1"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn discovery_treats_404_as_no_aggregated_surface() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/apis"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let snapshot = discover_apis(&client, &server.uri())
        .await
        .expect("a 404 is an answer, not a failure");

    assert!(!snapshot.has_kubernetes_apis);
    assert!(snapshot.groups.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn discovery_propagates_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/apis"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let err = discover_apis(&client, &server.uri())
        .await
        .expect_err("a 500 must not be classified");

    match err {
        CapabilityError::UnexpectedStatus { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("expected UnexpectedStatus, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn discovery_reports_malformed_bodies_distinctly() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/apis"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
        .expect(1)
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let err = discover_apis(&client, &server.uri())
        .await
        .expect_err("garbage on 200 is a decode failure");
    assert!(matches!(err, CapabilityError::Decode(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn discovery_tolerates_trailing_slash_in_base_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/apis"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let base = format!("{}/", server.uri());
    let snapshot = discover_apis(&client, &base)
        .await
        .expect("discovery should succeed");
    assert!(!snapshot.has_kubernetes_apis);
}
