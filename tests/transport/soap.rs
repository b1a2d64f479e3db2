//! SOAP over HTTP: `POST /soap` with reqwest.

use book_catalog::transport::soap::SOAP_ENV_NS;
use book_catalog::{Record, RecordStore};

use crate::support::{seeded_dispatcher, start_server};

fn envelope(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<soapenv:Envelope xmlns:soapenv="{SOAP_ENV_NS}">
  <soapenv:Header/>
  <soapenv:Body>{body}</soapenv:Body>
</soapenv:Envelope>"#
    )
}

async fn post_soap(base: &str, xml: String) -> (reqwest::StatusCode, String, String) {
    let resp = reqwest::Client::new()
        .post(format!("{base}/soap"))
        .header("content-type", "text/xml; charset=utf-8")
        .body(xml)
        .send()
        .await
        .unwrap();
    let status = resp.status();
    let content_type = resp.headers()["content-type"].to_str().unwrap().to_string();
    (status, content_type, resp.text().await.unwrap())
}

#[tokio::test]
async fn legacy_update_request_updates_the_record() {
    let (dispatcher, store) = seeded_dispatcher();
    let base = start_server(dispatcher).await;

    let (status, content_type, body) = post_soap(
        &base,
        envelope(
            "<LivroUpdateRequest><nome>dom casmurro</nome><preco>50</preco></LivroUpdateRequest>",
        ),
    )
    .await;
    assert_eq!(status, 200);
    assert!(content_type.starts_with("text/xml"));
    assert!(body.contains("<BookUpdateResponse>"), "{body}");
    assert!(body.contains("<price>50</price>"), "{body}");
    assert_eq!(
        store.load().unwrap()[1],
        Record::new("Dom Casmurro", "Machado de Assis", 50.0)
    );
}

#[tokio::test]
async fn query_request_lists_matches() {
    let (dispatcher, _) = seeded_dispatcher();
    let base = start_server(dispatcher).await;

    let (status, _, body) = post_soap(
        &base,
        envelope("<BookQueryRequest><filter>price &lt; 10</filter></BookQueryRequest>"),
    )
    .await;
    assert_eq!(status, 200);
    assert!(body.contains("<name>Dune</name>"), "{body}");
    assert!(!body.contains("Dom Casmurro"), "{body}");
}

#[tokio::test]
async fn invalid_price_is_a_client_fault() {
    let (dispatcher, store) = seeded_dispatcher();
    let base = start_server(dispatcher).await;

    let (status, _, body) = post_soap(
        &base,
        envelope("<BookUpdateRequest><name>Dune</name><price>-1</price></BookUpdateRequest>"),
    )
    .await;
    assert_eq!(status, 400);
    assert!(body.contains("<faultcode>soapenv:Client</faultcode>"), "{body}");
    assert!(body.contains("<field>price</field>"), "{body}");
    assert_eq!(store.load().unwrap()[0].price, 9.99);
}

#[tokio::test]
async fn malformed_envelope_is_a_client_fault() {
    let (dispatcher, _) = seeded_dispatcher();
    let base = start_server(dispatcher).await;

    let (status, _, body) = post_soap(&base, "<Envelope><Body><BookDeleteRequest>".into()).await;
    assert_eq!(status, 400);
    assert!(body.contains("<faultcode>soapenv:Client</faultcode>"), "{body}");
    assert!(body.contains("<field>envelope</field>"), "{body}");
}

#[tokio::test]
async fn delete_of_unknown_name_is_not_found() {
    let (dispatcher, _) = seeded_dispatcher();
    let base = start_server(dispatcher).await;

    let (status, _, body) = post_soap(
        &base,
        envelope("<BookDeleteRequest><name>nonexistent</name></BookDeleteRequest>"),
    )
    .await;
    assert_eq!(status, 404);
    assert!(body.contains("<kind>not_found</kind>"), "{body}");
}
