fn main() {
    // Only run gRPC codegen when the "grpc" feature is enabled.
    // Cargo sets CARGO_FEATURE_GRPC when compiling with --features grpc.
    if std::env::var("CARGO_FEATURE_GRPC").is_ok() {
        let method = |name: &str, route: &str, input: &str, output: &str| {
            tonic_build::manual::Method::builder()
                .name(name)
                .route_name(route)
                .input_type(format!("crate::transport::grpc::{input}"))
                .output_type(format!("crate::transport::grpc::{output}"))
                .codec_path("tonic::codec::ProstCodec")
                .build()
        };

        let service = tonic_build::manual::Service::builder()
            .name("CatalogService")
            .package("book_catalog")
            .method(method("insert", "Insert", "InsertRequest", "BookReply"))
            .method(method("query", "Query", "QueryRequest", "BookList"))
            .method(method("find", "Find", "FindRequest", "BookReply"))
            .method(method("update", "Update", "UpdateRequest", "BookReply"))
            .method(method("delete", "Delete", "DeleteRequest", "DeleteReply"))
            .method(method("health", "Health", "HealthRequest", "HealthReply"))
            .build();

        tonic_build::manual::Builder::new().compile(&[service]);
    }
}
