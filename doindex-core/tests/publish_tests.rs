// Tests for the hosted search index publisher

use doindex_core::config::SearchConfig;
use doindex_core::error::PublishError;
use doindex_core::publish::{AlgoliaIndex, IndexPublisher};
use doindex_core::record::Record;
use serde_json::{Value, json};
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(host: &str) -> SearchConfig {
    SearchConfig {
        app_id: "APPID".to_string(),
        api_key: "write-key".to_string(),
        index_name: "pages".to_string(),
        host: Some(host.to_string()),
    }
}

fn record(url: &str, views: u64) -> Record {
    Record {
        object_id: url.to_string(),
        url: url.to_string(),
        title: format!("Title of {}", url),
        description: None,
        section: None,
        headings: Vec::new(),
        content: "body".to_string(),
        views,
    }
}

fn index_for(server: &MockServer) -> AlgoliaIndex {
    AlgoliaIndex::new(&config(&server.uri()))
        .unwrap()
        .with_poll_interval(Duration::from_millis(5))
}

async fn mount_happy_path(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/1/indexes/pages/operation"))
        .and(header("x-algolia-api-key", "write-key"))
        .and(header("x-algolia-application-id", "APPID"))
        .and(body_partial_json(json!({"operation": "copy"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"taskID": 1, "updatedAt": "now"})))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path_regex(r"^/1/indexes/pages_tmp_\d+/batch$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"taskID": 2, "objectIDs": []})))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path_regex(r"^/1/indexes/pages_tmp_\d+/operation$"))
        .and(body_partial_json(json!({"operation": "move", "destination": "pages"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"taskID": 3, "updatedAt": "now"})))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/1/indexes/[^/]+/task/\d+$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "published"})))
        .mount(server)
        .await;
}

async fn batch_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path().ends_with("/batch"))
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

#[tokio::test]
async fn test_replace_all_copies_uploads_and_moves() {
    let server = MockServer::start().await;
    mount_happy_path(&server).await;

    let records = vec![record("/a.html", 5), record("/b.html", 0)];
    let receipt = index_for(&server).replace_all_objects(&records).await.unwrap();

    assert_eq!(receipt.index_name, "pages");
    assert_eq!(receipt.objects, 2);
    assert_eq!(receipt.task_ids, vec![1, 2, 3]);

    let batches = batch_bodies(&server).await;
    assert_eq!(batches.len(), 1);
    let requests = batches[0]["requests"].as_array().unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0]["action"], "updateObject");
    assert_eq!(requests[0]["body"]["objectID"], "/a.html");
    assert_eq!(requests[0]["body"]["views"], 5);
}

#[tokio::test]
async fn test_copy_keeps_settings_synonyms_and_rules() {
    let server = MockServer::start().await;
    mount_happy_path(&server).await;

    index_for(&server).replace_all_objects(&[]).await.unwrap();

    let copy: Value = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .find(|r| r.url.path() == "/1/indexes/pages/operation")
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .unwrap();
    assert_eq!(copy["scope"], json!(["settings", "synonyms", "rules"]));
    assert!(
        copy["destination"]
            .as_str()
            .unwrap()
            .starts_with("pages_tmp_")
    );
}

#[tokio::test]
async fn test_empty_record_set_still_replaces_index() {
    let server = MockServer::start().await;
    mount_happy_path(&server).await;

    let receipt = index_for(&server).replace_all_objects(&[]).await.unwrap();

    assert_eq!(receipt.objects, 0);
    assert_eq!(receipt.task_ids, vec![1, 3]);
    assert!(batch_bodies(&server).await.is_empty());
}

#[tokio::test]
async fn test_records_are_uploaded_in_chunks() {
    let server = MockServer::start().await;
    mount_happy_path(&server).await;

    let records: Vec<_> = (0..5).map(|i| record(&format!("/p{}.html", i), i)).collect();
    index_for(&server)
        .with_batch_size(2)
        .replace_all_objects(&records)
        .await
        .unwrap();

    let sizes: Vec<_> = batch_bodies(&server)
        .await
        .iter()
        .map(|b| b["requests"].as_array().unwrap().len())
        .collect();
    assert_eq!(sizes, vec![2, 2, 1]);
}

#[tokio::test]
async fn test_waits_until_task_is_published() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/1/indexes/pages/task/9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "notPublished"})))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/1/indexes/pages/task/9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "published"})))
        .with_priority(2)
        .mount(&server)
        .await;

    index_for(&server).wait_task("pages", 9).await.unwrap();

    let polls = server.received_requests().await.unwrap().len();
    assert_eq!(polls, 3);
}

#[tokio::test]
async fn test_rejected_credentials_are_unauthorized() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(json!({"message": "Invalid Application-ID or API key", "status": 403})),
        )
        .mount(&server)
        .await;

    let err = index_for(&server)
        .replace_all_objects(&[record("/a.html", 1)])
        .await
        .unwrap_err();

    match err {
        PublishError::Unauthorized { status, message } => {
            assert_eq!(status.as_u16(), 403);
            assert_eq!(message, "Invalid Application-ID or API key");
        }
        other => panic!("expected Unauthorized, got {:?}", other),
    }
}

#[tokio::test]
async fn test_quota_errors_are_distinct() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/1/indexes/pages/operation"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"taskID": 1})))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex(r"/task/\d+$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "published"})))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path_regex(r"/batch$"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({"message": "Record quota exceeded"})),
        )
        .mount(&server)
        .await;

    let err = index_for(&server)
        .replace_all_objects(&[record("/a.html", 1)])
        .await
        .unwrap_err();
    assert!(matches!(err, PublishError::QuotaExceeded { .. }));
}

#[tokio::test]
async fn test_unreachable_host_is_network_error() {
    let index = AlgoliaIndex::new(&config("http://127.0.0.1:1")).unwrap();
    let err = index.replace_all_objects(&[]).await.unwrap_err();
    assert!(matches!(err, PublishError::Network(_)));
}
