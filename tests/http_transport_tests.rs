
use data_components::clients::HttpTransport;
use data_components::config::DataConfig;
use data_components::{DataError, DataGql, DataRest, QueryRequest, TransportError};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::test_utils::init_test_logging;

#[tokio::test]
async fn gql_sends_query_parameters_over_get() {
    init_test_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/graphql"))
        .and(query_param("query", "query Repo($owner: String!) { repo(owner: $owner) { id } }"))
        .and(query_param("variables", r#"{"owner":"octo"}"#))
        .and(query_param("operationName", "Repo"))
        .and(header("authorization", "Bearer t0ken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "repo": { "id": "1" } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/graphql", server.uri());
    let request = QueryRequest::new(&url, "query Repo($owner: String!) { repo(owner: $owner) { id } }")
        .with_variable("owner", "octo")
        .with_operation_name("Repo")
        .with_credential("t0ken");

    let gql = DataGql::new(HttpTransport::new());
    let envelope = gql.fetch(&request).await.unwrap();

    assert_eq!(envelope.data(), Some(&json!({ "repo": { "id": "1" } })));
    assert!(envelope.schema_for("repo").is_some());
    assert_eq!(envelope.meta().fetched_from(), url);
}

#[tokio::test]
async fn gql_reports_error_status() {
    init_test_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let gql = DataGql::new(HttpTransport::new());
    let err = gql
        .fetch(&QueryRequest::new(format!("{}/graphql", server.uri()), "{ a }"))
        .await
        .unwrap_err();
    assert!(matches!(err, DataError::Status { status: 503, ref body } if body == "unavailable"));
}

#[tokio::test]
async fn gql_connection_failure_is_a_transport_error() {
    init_test_logging();
    let gql = DataGql::new(HttpTransport::new());
    let err = gql
        .fetch(&QueryRequest::new("http://127.0.0.1:1/graphql", "{ a }"))
        .await
        .unwrap_err();
    assert!(matches!(err, DataError::Transport(TransportError::Http(_))));
}

#[tokio::test]
async fn rest_wraps_body_and_uses_configured_credential() {
    init_test_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/items"))
        .and(query_param("page", "2"))
        .and(header("authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [1, 2] })))
        .mount(&server)
        .await;

    let rest = DataRest::with_config(HttpTransport::new(), DataConfig::default().with_rest_credential("abc"));
    let url = format!("{}/items", server.uri());
    let envelope = rest.fetch(&url, &[("page", "2")]).await.unwrap();

    assert_eq!(envelope.data(), Some(&json!({ "items": [1, 2] })));
    assert!(envelope.schema().is_none());
}

#[tokio::test]
async fn rest_empty_body_has_no_data() {
    init_test_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let rest = DataRest::new(HttpTransport::new());
    let envelope = rest.fetch(&server.uri(), &[]).await.unwrap();
    assert!(envelope.data().is_none());
}
