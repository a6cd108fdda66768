
use std::sync::Arc;

use data_components::clients::mock::{MockResponse, MockTransport};
use data_components::config::DataConfig;
use data_components::interceptors::FileInterceptor;
use data_components::{DataError, DataEvent, DataRest};
use serde_json::{json, Value};

use crate::test_utils::{mock_gql, mock_rest, repo_query};

#[tokio::test]
async fn rest_emits_changed_with_the_returned_envelope() {
    let (rest, _handle) = mock_rest(vec![MockResponse::json(r#"{"name":"widget"}"#)]);
    let mut events = rest.subscribe();

    let envelope = rest.fetch("https://api.example/widgets/1", &[]).await.unwrap();

    let event = events.recv().await.unwrap();
    assert_eq!(event.envelope(), Some(&envelope));
    assert_eq!(envelope.data(), Some(&json!({ "name": "widget" })));
}

#[tokio::test]
async fn rest_null_body_still_notifies() {
    let (rest, _handle) = mock_rest(vec![MockResponse::json("null")]);
    let mut events = rest.subscribe();

    let envelope = rest.fetch("https://api.example/nothing", &[]).await.unwrap();
    assert!(envelope.data().is_none());
    assert!(matches!(events.recv().await.unwrap(), DataEvent::Changed(_)));
}

#[tokio::test]
async fn rest_malformed_body_is_announced_as_failure() {
    let (rest, _handle) = mock_rest(vec![MockResponse::json("{not json")]);
    let mut events = rest.subscribe();

    let err = rest.fetch("https://api.example/broken", &[]).await.unwrap_err();
    assert!(matches!(err, DataError::MalformedResponse(..)));
    assert!(matches!(events.recv().await.unwrap(), DataEvent::Failed { .. }));
}

#[tokio::test]
async fn rest_rejects_invalid_url() {
    let (rest, handle) = mock_rest(vec![]);

    let err = rest.fetch("::nope::", &[]).await.unwrap_err();
    assert!(matches!(err, DataError::InvalidRequest(_)));
    assert!(handle.requests().is_empty());
}

#[tokio::test]
async fn file_interceptor_saves_each_envelope() {
    let dir = tempfile::tempdir().unwrap();
    let (gql, _handle) = mock_gql(vec![MockResponse::json(r#"{"data":{"repo":{"id":"1"}}}"#)]);
    let gql = gql.with_interceptor(Arc::new(FileInterceptor::new(dir.path().join("captures"))));

    gql.fetch(&repo_query()).await.unwrap();

    let entries: Vec<_> = std::fs::read_dir(dir.path().join("captures"))
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(entries.len(), 1);

    let saved: Value = serde_json::from_str(&std::fs::read_to_string(&entries[0]).unwrap()).unwrap();
    assert_eq!(saved["url"], "https://api.example/graphql");
    assert_eq!(saved["envelope"]["data"], json!({ "repo": { "id": "1" } }));
    assert_eq!(saved["envelope"]["schema"]["repo"]["kind"], "QUERYRESULT");
    assert_eq!(saved["envelope"]["meta"]["fetchedFrom"], "https://api.example/graphql");
}

#[tokio::test]
async fn interceptor_failure_does_not_fail_fetch() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "a file, not a directory").unwrap();

    let (gql, _handle) = mock_gql(vec![MockResponse::json(r#"{"data":{"repo":{"id":"1"}}}"#)]);
    let gql = gql.with_interceptor(Arc::new(FileInterceptor::new(blocker)));

    let envelope = gql.fetch(&repo_query()).await.unwrap();
    assert!(envelope.data().is_some());
}

#[tokio::test]
async fn rest_never_sends_the_graphql_credential() {
    std::env::set_var("DATA_GQL_CREDENTIAL", "gql-secret");
    std::env::remove_var("DATA_REST_CREDENTIAL");
    let config = DataConfig::from_env();
    assert_eq!(config.credential.as_deref(), Some("gql-secret"));

    let (transport, handle) = MockTransport::with_responses(vec![MockResponse::json("{}")]);
    let rest = DataRest::with_config(transport, config);
    rest.fetch("https://unrelated.example/x", &[]).await.unwrap();

    assert_eq!(handle.requests()[0].bearer, None);
}

#[tokio::test]
async fn rest_sends_its_own_credential() {
    let (transport, handle) = MockTransport::with_responses(vec![MockResponse::json("{}")]);
    let rest = DataRest::with_config(transport, DataConfig::default().with_credential("gql").with_rest_credential("rest"));
    rest.fetch("https://api.example/x", &[]).await.unwrap();

    assert_eq!(handle.requests()[0].bearer.as_deref(), Some("rest"));
}

#[tokio::test]
async fn file_interceptor_keeps_every_capture() {
    let dir = tempfile::tempdir().unwrap();
    let responses = (0..8).map(|i| MockResponse::json(format!(r#"{{"data":{{"repo":{{"id":"{}"}}}}}}"#, i))).collect();
    let (gql, _handle) = mock_gql(responses);
    let gql = gql.with_interceptor(Arc::new(FileInterceptor::new(dir.path().to_path_buf())));

    for _ in 0..8 {
        gql.fetch(&repo_query()).await.unwrap();
    }

    let mut ids: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| {
            let saved: Value = serde_json::from_str(&std::fs::read_to_string(e.unwrap().path()).unwrap()).unwrap();
            saved["envelope"]["data"]["repo"]["id"].as_str().unwrap().to_string()
        })
        .collect();
    ids.sort();
    assert_eq!(ids, (0..8).map(|i| i.to_string()).collect::<Vec<_>>());
}
