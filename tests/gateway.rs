mod common;

use common::TestService;
use reqwest::StatusCode;
use serde_json::{Value, json};

async fn create(client: &reqwest::Client, svc: &TestService, title: &str, content: &str) -> Value {
    let response = client
        .post(svc.url("/v1/notes"))
        .json(&json!({ "title": title, "content": content }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    response.json().await.unwrap()
}

#[tokio::test]
async fn create_and_get_round_trip_through_rpc() {
    let svc = TestService::start().await;
    let client = reqwest::Client::new();

    let created = create(&client, &svc, "A", "B").await;
    assert_ne!(created["id"], 0);
    assert_eq!(created["title"], "A");
    assert_eq!(created["content"], "B");
    assert_eq!(created["created_at"], created["updated_at"]);

    let id = created["id"].as_i64().unwrap();
    let fetched: Value = client
        .get(svc.url(&format!("/v1/notes/{id}")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched, created);

    svc.stop().await.unwrap();
}

#[tokio::test]
async fn not_found_keeps_its_kind() {
    let svc = TestService::start().await;
    let client = reqwest::Client::new();

    for request in [
        client.get(svc.url("/v1/notes/404")),
        client.delete(svc.url("/v1/notes/404")),
        client
            .patch(svc.url("/v1/notes/404"))
            .json(&json!({ "title": "x" })),
    ] {
        let response = request.send().await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body: Value = response.json().await.unwrap();
        assert_eq!(body["code"], tonic::Code::NotFound as i32);
    }

    svc.stop().await.unwrap();
}

#[tokio::test]
async fn invalid_argument_reports_field() {
    let svc = TestService::start().await;
    let client = reqwest::Client::new();

    let cases = [("", "body", "title"), ("head", "", "content"), ("", "", "title")];
    for (title, content, field) in cases {
        let response = client
            .post(svc.url("/v1/notes"))
            .json(&json!({ "title": title, "content": content }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body: Value = response.json().await.unwrap();
        assert_eq!(body["field"], field);
        assert_eq!(body["message"], format!("required field: {field}"));
    }

    svc.stop().await.unwrap();
}

#[tokio::test]
async fn patch_honours_update_mask() {
    let svc = TestService::start().await;
    let client = reqwest::Client::new();
    let id = create(&client, &svc, "T", "C").await["id"].as_i64().unwrap();
    let url = svc.url(&format!("/v1/notes/{id}"));

    let masked: Value = client
        .patch(&url)
        .json(&json!({ "title": "T2", "content": "C2", "update_mask": ["title"] }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(masked["title"], "T2");
    assert_eq!(masked["content"], "C");

    let unmasked: Value = client
        .put(&url)
        .json(&json!({ "title": "T3", "content": "C3" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(unmasked["title"], "T3");
    assert_eq!(unmasked["content"], "C3");
    assert_eq!(unmasked["created_at"], masked["created_at"]);

    svc.stop().await.unwrap();
}

#[tokio::test]
async fn delete_then_list() {
    let svc = TestService::start().await;
    let client = reqwest::Client::new();
    let keep = create(&client, &svc, "keep", "me").await;
    let gone = create(&client, &svc, "drop", "me").await;

    let response = client
        .delete(svc.url(&format!("/v1/notes/{}", gone["id"])))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.json::<Value>().await.unwrap(), json!({}));

    let listed: Value = client
        .get(svc.url("/v1/notes"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed["notes"], json!([keep]));

    svc.stop().await.unwrap();
}
