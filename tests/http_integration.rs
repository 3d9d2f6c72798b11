//! Integration tests for the GCP-backed collaborators using wiremock
//!
//! These tests run the real client against mocked endpoints, covering
//! pagination, not-found handling on delete and operation polling.

use gcf_delete::backend::gcp::GcpBackend;
use gcf_delete::backend::{ConfigSource, FunctionResource, Inventory, ResourceDeleter, TopicBinding};
use gcf_delete::delete::confirm::TerminalPrompt;
use gcf_delete::delete::report::{OutcomeStatus, ResourceKind};
use gcf_delete::delete::{self, DeleteOptions};
use gcf_delete::gcp::auth::GcpCredentials;
use gcf_delete::gcp::client::{Endpoints, GcpClient};
use gcf_delete::gcp::is_not_found;
use gcf_delete::gcp::operations::PollSettings;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{bearer_token, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PROJECT: &str = "test-project";

fn backend(server: &MockServer) -> GcpBackend {
    let client = GcpClient::with_credentials(
        PROJECT,
        Endpoints::all(&server.uri()),
        GcpCredentials::from_static("test-token"),
    )
    .expect("client should build");

    GcpBackend::new(
        client,
        PollSettings {
            interval: Duration::from_millis(10),
            timeout: Duration::from_secs(5),
        },
    )
}

fn function_json(region: &str, id: &str) -> serde_json::Value {
    json!({
        "name": format!("projects/{PROJECT}/locations/{region}/functions/{id}"),
        "runtime": "nodejs18",
        "httpsTrigger": {"url": format!("https://{region}-{PROJECT}.cloudfunctions.net/{id}")}
    })
}

fn scheduled_function_json(region: &str, id: &str) -> serde_json::Value {
    json!({
        "name": format!("projects/{PROJECT}/locations/{region}/functions/{id}"),
        "runtime": "nodejs18",
        "labels": {"deployment-scheduled": "true"},
        "eventTrigger": {
            "eventType": "google.pubsub.topic.publish",
            "resource": format!("projects/{PROJECT}/topics/firebase-schedule-{id}-{region}")
        }
    })
}

const LIST_PATH: &str = "/v1/projects/test-project/locations/-/functions";

mod inventory_tests {
    use super::*;

    /// Test listing follows nextPageToken across pages
    #[tokio::test]
    async fn test_fetch_paginates() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(LIST_PATH))
            .and(query_param("pageToken", "page-2"))
            .and(bearer_token("test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "functions": [scheduled_function_json("us-central1", "reports-nightly")]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(LIST_PATH))
            .and(bearer_token("test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "functions": [
                    function_json("us-central1", "api-users"),
                    function_json("europe-west1", "api-orders")
                ],
                "nextPageToken": "page-2",
                "unreachable": ["projects/test-project/locations/asia-east2"]
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        let snapshot = backend(&server).fetch(PROJECT).await.expect("fetch should succeed");

        let ids: Vec<&str> = snapshot.functions.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["api-users", "api-orders", "reports-nightly"]);
        assert_eq!(snapshot.schedules.len(), 1);
        assert_eq!(snapshot.topics.len(), 1);
        assert_eq!(snapshot.topics[0].id, "firebase-schedule-reports-nightly-us-central1");
        assert_eq!(snapshot.unreachable_regions, vec!["asia-east2"]);
    }

    /// Test a 403 on listing surfaces as an error
    #[tokio::test]
    async fn test_fetch_permission_denied() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(LIST_PATH))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": {"code": 403, "message": "Permission denied", "status": "PERMISSION_DENIED"}
            })))
            .mount(&server)
            .await;

        let err = backend(&server).fetch(PROJECT).await.unwrap_err();
        assert!(format!("{err:#}").contains("403"));
        assert!(!is_not_found(&err));
    }

    /// Test the Firebase config yields the scheduler location
    #[tokio::test]
    async fn test_fetch_config() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1beta1/projects/test-project/adminSdkConfig"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "projectId": PROJECT,
                "storageBucket": "test-project.appspot.com",
                "locationId": "europe-west"
            })))
            .mount(&server)
            .await;

        let config = backend(&server).fetch_config(PROJECT).await.unwrap();
        assert_eq!(config.app_engine_location(), "europe-west1");
    }

    /// Test a backend bound to one project refuses another
    #[tokio::test]
    async fn test_fetch_other_project_rejected() {
        let server = MockServer::start().await;
        assert!(backend(&server).fetch("other-project").await.is_err());
    }
}

mod deleter_tests {
    use super::*;

    /// Test function delete polls the operation until done
    #[tokio::test]
    async fn test_delete_function_waits_for_operation() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/v1/projects/test-project/locations/us-central1/functions/api-users"))
            .and(bearer_token("test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "operations/op-123",
                "done": false
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/operations/op-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "operations/op-123",
                "done": false
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/operations/op-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "operations/op-123",
                "done": true,
                "response": {}
            })))
            .mount(&server)
            .await;

        let function = FunctionResource::new(PROJECT, "us-central1", "api-users");
        backend(&server)
            .delete_function(&function)
            .await
            .expect("delete should succeed");
    }

    /// Test an operation ending in an error is a failure
    #[tokio::test]
    async fn test_delete_function_operation_error() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/v1/projects/test-project/locations/us-central1/functions/api-users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "operations/op-9",
                "done": true,
                "error": {"code": 9, "message": "Function is being updated"}
            })))
            .mount(&server)
            .await;

        let function = FunctionResource::new(PROJECT, "us-central1", "api-users");
        let err = backend(&server).delete_function(&function).await.unwrap_err();
        assert!(format!("{err:#}").contains("Function is being updated"));
        assert!(!is_not_found(&err));
    }

    /// Test a 404 on delete is recognised as not-found
    #[tokio::test]
    async fn test_delete_topic_404_is_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/v1/projects/test-project/topics/firebase-schedule-fn-us-central1"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"code": 404, "message": "Resource not found (resource=firebase-schedule-fn-us-central1)."}
            })))
            .mount(&server)
            .await;

        let topic = TopicBinding {
            id: "firebase-schedule-fn-us-central1".to_string(),
            project: PROJECT.to_string(),
            target_service: FunctionResource::new(PROJECT, "us-central1", "fn").target(),
        };
        let err = backend(&server).delete_topic(&topic).await.unwrap_err();
        assert!(is_not_found(&err));
    }
}

mod end_to_end_tests {
    use super::*;
    use tokio::io::BufReader;

    /// Test a forced delete of a scheduled function removes job, topic and function
    #[tokio::test]
    async fn test_forced_delete_of_scheduled_function() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(LIST_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "functions": [
                    scheduled_function_json("us-central1", "reports-nightly"),
                    function_json("us-central1", "api-users")
                ]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1beta1/projects/test-project/adminSdkConfig"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "projectId": PROJECT,
                "locationId": "us-central"
            })))
            .mount(&server)
            .await;

        Mock::given(method("DELETE"))
            .and(path("/v1/projects/test-project/locations/us-central1/jobs/firebase-schedule-reports-nightly-us-central1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        // Topic already removed out of band
        Mock::given(method("DELETE"))
            .and(path("/v1/projects/test-project/topics/firebase-schedule-reports-nightly-us-central1"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("DELETE"))
            .and(path("/v1/projects/test-project/locations/us-central1/functions/reports-nightly"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "operations/op-1",
                "done": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("DELETE"))
            .and(path("/v1/projects/test-project/locations/us-central1/functions/api-users"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let backend = backend(&server);
        let options = DeleteOptions {
            project: PROJECT.to_string(),
            filters: vec!["reports".to_string()],
            region: None,
            force: true,
            concurrency: 2,
        };
        let mut prompt = TerminalPrompt::new(BufReader::new(&b""[..]), Vec::new(), false);

        let report = delete::run(&options, &backend, &backend, &backend, &mut prompt)
            .await
            .expect("delete should succeed");

        assert!(report.is_success());
        assert_eq!(
            report.outcome(ResourceKind::Topic, "firebase-schedule-reports-nightly-us-central1"),
            Some(&OutcomeStatus::AlreadyAbsent)
        );
        assert_eq!(
            report.outcome(ResourceKind::Function, "reports-nightly(us-central1)"),
            Some(&OutcomeStatus::Deleted)
        );
    }
}
