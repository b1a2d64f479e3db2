//! HTTP transport integration tests.
//!
//! Starts an axum server and exercises it with reqwest.

use book_catalog::{Record, RecordStore};
use serde_json::json;

use crate::support::{seeded_dispatcher, start_server};

#[tokio::test]
async fn health_check() {
    let (dispatcher, _) = seeded_dispatcher();
    let base = start_server(dispatcher).await;

    let resp = reqwest::get(format!("{base}/health")).await.unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["ok"], true);
    assert_eq!(body["operations"], json!(["insert", "query", "update", "delete"]));
}

#[tokio::test]
async fn rest_insert_returns_created_record() {
    let (dispatcher, store) = seeded_dispatcher();
    let base = start_server(dispatcher).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/books"))
        .json(&json!({ "name": "Neuromancer", "author": "William Gibson", "price": "14.5" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(
        body,
        json!({ "name": "Neuromancer", "author": "William Gibson", "price": 14.5 })
    );
    assert_eq!(store.load().unwrap().len(), 3);
}

#[tokio::test]
async fn rest_query_by_name_and_filter() {
    let (dispatcher, _) = seeded_dispatcher();
    let base = start_server(dispatcher).await;
    let client = reqwest::Client::new();

    let books: Vec<Record> = client
        .get(format!("{base}/books"))
        .query(&[("name", "DUNE")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(books, vec![Record::new("Dune", "Frank Herbert", 9.99)]);

    let books: Vec<Record> = client
        .get(format!("{base}/books"))
        .query(&[("filter", "price > 20")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(books, vec![Record::new("Dom Casmurro", "Machado de Assis", 45.0)]);
}

#[tokio::test]
async fn rest_update_and_delete() {
    let (dispatcher, store) = seeded_dispatcher();
    let base = start_server(dispatcher).await;
    let client = reqwest::Client::new();

    let resp = client
        .patch(format!("{base}/books/dune"))
        .json(&json!({ "price": 12.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let updated: Record = resp.json().await.unwrap();
    assert_eq!(updated, Record::new("Dune", "Frank Herbert", 12.0));

    let resp = client
        .delete(format!("{base}/books/Dune"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "deleted": 1 }));
    assert_eq!(store.load().unwrap().len(), 1);
}

#[tokio::test]
async fn validation_error_maps_to_400() {
    let (dispatcher, store) = seeded_dispatcher();
    let base = start_server(dispatcher).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/books"))
        .json(&json!({ "name": "X", "author": "Y", "price": "-5" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["kind"], "validation");
    assert_eq!(body["field"], "price");
    assert_eq!(body["retryable"], false);
    assert_eq!(store.load().unwrap().len(), 2);
}

#[tokio::test]
async fn not_found_maps_to_404() {
    let (dispatcher, _) = seeded_dispatcher();
    let base = start_server(dispatcher).await;
    let client = reqwest::Client::new();

    let resp = client
        .delete(format!("{base}/books/nonexistent"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["kind"], "not_found");
    assert!(body.get("field").is_none());
}

#[tokio::test]
async fn form_rpc_insert_and_query() {
    let (dispatcher, _) = seeded_dispatcher();
    let base = start_server(dispatcher).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/rpc/insert"))
        .header("content-type", "application/x-www-form-urlencoded")
        .body("nome=Neuromancer&autor=William+Gibson&preco=14.5")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "result": "inserted",
            "record": { "name": "Neuromancer", "author": "William Gibson", "price": 14.5 }
        })
    );

    let resp = client
        .post(format!("{base}/rpc/query"))
        .header("content-type", "application/x-www-form-urlencoded")
        .body("filter=author+~+gibson")
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["result"], "records");
    assert_eq!(body["records"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn form_rpc_rejects_unparsable_price() {
    let (dispatcher, _) = seeded_dispatcher();
    let base = start_server(dispatcher).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/rpc/update"))
        .header("content-type", "application/x-www-form-urlencoded")
        .body("name=Dune&price=abc")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["field"], "price");
}

#[tokio::test]
async fn form_rpc_unknown_operation_is_404() {
    let (dispatcher, _) = seeded_dispatcher();
    let base = start_server(dispatcher).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/rpc/upsert"))
        .header("content-type", "application/x-www-form-urlencoded")
        .body("name=Dune")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["kind"], "unknown_operation");
}

#[tokio::test]
async fn json_command_endpoint() {
    let (dispatcher, store) = seeded_dispatcher();
    let base = start_server(dispatcher).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/command"))
        .json(&json!({ "op": "update", "name": "dom casmurro", "author": "Machado" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "result": "updated",
            "record": { "name": "Dom Casmurro", "author": "Machado", "price": 45.0 }
        })
    );

    let resp = client
        .post(format!("{base}/command"))
        .json(&json!({ "op": "delete", "name": "dom casmurro" }))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "result": "deleted", "count": 1 }));
    assert_eq!(store.load().unwrap().len(), 1);
}

#[tokio::test]
async fn mistyped_json_body_is_a_validation_envelope() {
    let (dispatcher, store) = seeded_dispatcher();
    let base = start_server(dispatcher).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/books"))
        .json(&json!({ "name": "X", "author": "Y", "price": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    assert!(resp.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("application/json"));
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["kind"], "validation");
    assert_eq!(body["field"], "body");
    assert_eq!(body["retryable"], false);
    assert_eq!(store.load().unwrap().len(), 2);
}

#[tokio::test]
async fn truncated_json_body_is_a_validation_envelope() {
    let (dispatcher, store) = seeded_dispatcher();
    let base = start_server(dispatcher).await;
    let client = reqwest::Client::new();

    for (method, path) in [
        (reqwest::Method::POST, "/books"),
        (reqwest::Method::PATCH, "/books/dune"),
        (reqwest::Method::POST, "/command"),
    ] {
        let resp = client
            .request(method, format!("{base}{path}"))
            .header("content-type", "application/json")
            .body(r#"{"name": "Dune", "pri"#)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400, "{path}");
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["kind"], "validation", "{path}");
        assert_eq!(body["field"], "body", "{path}");
    }
    assert_eq!(
        store.load().unwrap(),
        vec![
            Record::new("Dune", "Frank Herbert", 9.99),
            Record::new("Dom Casmurro", "Machado de Assis", 45.0),
        ]
    );
}

#[tokio::test]
async fn unknown_command_is_a_validation_envelope() {
    let (dispatcher, _) = seeded_dispatcher();
    let base = start_server(dispatcher).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/command"))
        .json(&json!({ "op": "upsert", "name": "Dune" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["kind"], "validation");
    assert_eq!(body["field"], "body");
}

#[tokio::test]
async fn missing_content_type_is_a_validation_envelope() {
    let (dispatcher, _) = seeded_dispatcher();
    let base = start_server(dispatcher).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/books"))
        .body(r#"{"name": "X", "author": "Y", "price": 1}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["field"], "body");
}
