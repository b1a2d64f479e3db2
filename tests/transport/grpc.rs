//! gRPC transport integration tests.
//!
//! Starts a tonic server and exercises it with the generated client.

use book_catalog::transport::grpc::{
    Book, CatalogServiceClient, DeleteRequest, FindRequest, HealthRequest, InsertRequest,
    QueryRequest, UpdateRequest,
};
use book_catalog::transport::{self, Dispatcher};
use book_catalog::RecordStore;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;

use crate::support::seeded_dispatcher;

/// Bind to port 0, spawn the gRPC server, and return a connected client.
async fn start_server(dispatcher: Dispatcher) -> CatalogServiceClient<tonic::transport::Channel> {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let grpc_svc = transport::grpc_server(dispatcher);
    tokio::spawn(async move {
        tonic::transport::Server::builder()
            .add_service(grpc_svc)
            .serve_with_incoming(TcpListenerStream::new(listener))
            .await
            .unwrap();
    });

    CatalogServiceClient::connect(format!("http://{addr}"))
        .await
        .unwrap()
}

fn book(name: &str, author: &str, price: f64) -> Book {
    Book {
        name: name.into(),
        author: author.into(),
        price,
    }
}

#[tokio::test]
async fn health_check() {
    let (dispatcher, _) = seeded_dispatcher();
    let mut client = start_server(dispatcher).await;

    let resp = client.health(HealthRequest {}).await.unwrap().into_inner();
    assert!(resp.ok);
    assert!(resp.operations.iter().any(|op| op == "find"));
}

#[tokio::test]
async fn insert_then_find() {
    let (dispatcher, _) = seeded_dispatcher();
    let mut client = start_server(dispatcher).await;

    let reply = client
        .insert(InsertRequest {
            name: "Neuromancer".into(),
            author: "William Gibson".into(),
            price: Some(14.5),
        })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(reply.book, Some(book("Neuromancer", "William Gibson", 14.5)));

    let reply = client
        .find(FindRequest {
            name: "neuromancer".into(),
        })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(reply.book, Some(book("Neuromancer", "William Gibson", 14.5)));
}

#[tokio::test]
async fn query_with_empty_fields_returns_everything() {
    let (dispatcher, _) = seeded_dispatcher();
    let mut client = start_server(dispatcher).await;

    let list = client
        .query(QueryRequest::default())
        .await
        .unwrap()
        .into_inner();
    assert_eq!(
        list.books,
        vec![
            book("Dune", "Frank Herbert", 9.99),
            book("Dom Casmurro", "Machado de Assis", 45.0),
        ]
    );

    let list = client
        .query(QueryRequest {
            name: String::new(),
            filter: "price < 10".into(),
        })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(list.books, vec![book("Dune", "Frank Herbert", 9.99)]);
}

#[tokio::test]
async fn update_and_delete() {
    let (dispatcher, store) = seeded_dispatcher();
    let mut client = start_server(dispatcher).await;

    let reply = client
        .update(UpdateRequest {
            name: "DUNE".into(),
            author: None,
            price: Some(11.0),
        })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(reply.book, Some(book("Dune", "Frank Herbert", 11.0)));

    let reply = client
        .delete(DeleteRequest {
            name: "dune".into(),
        })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(reply.deleted, 1);
    assert_eq!(store.load().unwrap().len(), 1);
}

#[tokio::test]
async fn errors_map_to_status_codes() {
    let (dispatcher, store) = seeded_dispatcher();
    let mut client = start_server(dispatcher).await;

    let status = client
        .insert(InsertRequest {
            name: "X".into(),
            author: "Y".into(),
            price: Some(-1.0),
        })
        .await
        .unwrap_err();
    assert_eq!(status.code(), tonic::Code::InvalidArgument);

    let status = client
        .insert(InsertRequest {
            name: "X".into(),
            author: "Y".into(),
            price: None,
        })
        .await
        .unwrap_err();
    assert_eq!(status.code(), tonic::Code::InvalidArgument);

    let status = client
        .update(UpdateRequest {
            name: "Dune".into(),
            author: None,
            price: None,
        })
        .await
        .unwrap_err();
    assert_eq!(status.code(), tonic::Code::InvalidArgument);

    let status = client
        .find(FindRequest {
            name: "nonexistent".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(status.code(), tonic::Code::NotFound);

    let status = client
        .delete(DeleteRequest {
            name: "nonexistent".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(status.code(), tonic::Code::NotFound);

    assert_eq!(store.load().unwrap().len(), 2);
}
