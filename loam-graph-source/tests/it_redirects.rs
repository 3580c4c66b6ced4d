//! End-to-end redirect behavior through the loader.
//!
//! The chain walk is owned by the fetcher's state machine, never by the HTTP
//! client's default policy, so every hop is observable from the mock server's
//! request log.

use loam_graph_ir::Graph;
use loam_graph_source::{SourceError, SourceLoader, SourceSpec, REQUEST_LIMIT};

const TURTLE_BODY: &str = "<http://example.org/a> <http://example.org/b> <http://example.org/c> .";

async fn mount_redirect(server: &wiremock::MockServer, path: &str, status: u16, target: &str) {
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .and(wiremock::matchers::path(path))
        .respond_with(wiremock::ResponseTemplate::new(status).insert_header("location", target))
        .mount(server)
        .await;
}

async fn mount_turtle(server: &wiremock::MockServer, path: &str) {
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .and(wiremock::matchers::path(path))
        .respond_with(
            wiremock::ResponseTemplate::new(200)
                .insert_header("content-type", "text/turtle")
                .set_body_string(TURTLE_BODY),
        )
        .mount(server)
        .await;
}

/// Three 302s, three 303s, three 308s, then a 200: ten requests, one
/// statement, and the request log matches the chain hop for hop.
#[tokio::test]
async fn test_full_redirect_chain_resolves() {
    let server = wiremock::MockServer::start().await;

    let chain = [
        ("/", 302, "/loc/302/0"),
        ("/loc/302/0", 302, "/loc/302/1"),
        ("/loc/302/1", 302, "/loc/302/2"),
        ("/loc/302/2", 303, "/loc/303/0"),
        ("/loc/303/0", 303, "/loc/303/1"),
        ("/loc/303/1", 303, "/loc/303/2"),
        ("/loc/303/2", 308, "/loc/308/0"),
        ("/loc/308/0", 308, "/loc/308/1"),
        ("/loc/308/1", 308, "/loc/308/2"),
    ];
    for (path, status, target) in chain {
        mount_redirect(&server, path, status, target).await;
    }
    mount_turtle(&server, "/loc/308/2").await;

    let loader = SourceLoader::new();
    let mut sink = Graph::new();
    let report = loader
        .load_into(
            SourceSpec::location(format!("{}/", server.uri())).format("turtle"),
            &mut sink,
        )
        .await
        .unwrap();

    assert_eq!(sink.len(), 1);
    let triple = sink.iter().next().unwrap();
    assert_eq!(triple.s.as_iri(), Some("http://example.org/a"));
    assert_eq!(triple.p.as_iri(), Some("http://example.org/b"));
    assert_eq!(triple.o.as_iri(), Some("http://example.org/c"));

    let fetch = report.fetch.unwrap();
    assert_eq!(fetch.status, 200);
    assert_eq!(fetch.hops, 9);
    assert_eq!(fetch.final_uri, format!("{}/loc/308/2", server.uri()));

    // Exactly ten requests, in chain order, all with the pinned Accept.
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 10);
    let expected_paths = [
        "/",
        "/loc/302/0",
        "/loc/302/1",
        "/loc/302/2",
        "/loc/303/0",
        "/loc/303/1",
        "/loc/303/2",
        "/loc/308/0",
        "/loc/308/1",
        "/loc/308/2",
    ];
    for (request, expected) in requests.iter().zip(expected_paths) {
        assert_eq!(request.url.path(), expected);
        assert_eq!(request.headers.get("accept").unwrap(), "text/turtle");
    }
}

#[tokio::test]
async fn test_chain_of_nine_redirects_succeeds() {
    let server = wiremock::MockServer::start().await;
    for i in 0..9 {
        let target = if i == 8 {
            "/data".to_string()
        } else {
            format!("/hop/{}", i + 1)
        };
        mount_redirect(&server, &format!("/hop/{i}"), 301, &target).await;
    }
    mount_turtle(&server, "/data").await;

    let loader = SourceLoader::new();
    let graph = loader
        .load(SourceSpec::location(format!("{}/hop/0", server.uri())).format("turtle"))
        .await
        .unwrap();

    assert_eq!(graph.len(), 1);
    assert_eq!(server.received_requests().await.unwrap().len(), 10);
}

#[tokio::test]
async fn test_chain_needing_eleventh_request_fails() {
    let server = wiremock::MockServer::start().await;
    for i in 0..10 {
        mount_redirect(&server, &format!("/hop/{i}"), 302, &format!("/hop/{}", i + 1)).await;
    }
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .and(wiremock::matchers::path("/hop/10"))
        .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(TURTLE_BODY))
        .expect(0)
        .mount(&server)
        .await;

    let loader = SourceLoader::new();
    let mut sink = Graph::new();
    let err = loader
        .load_into(
            SourceSpec::location(format!("{}/hop/0", server.uri())).format("turtle"),
            &mut sink,
        )
        .await
        .unwrap_err();

    match err {
        SourceError::TooManyRedirects { limit, .. } => assert_eq!(limit, REQUEST_LIMIT),
        other => panic!("expected TooManyRedirects, got {other:?}"),
    }
    assert!(sink.is_empty());
    assert_eq!(server.received_requests().await.unwrap().len(), 10);
}

#[tokio::test]
async fn test_terminal_server_error_reaches_caller() {
    let server = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .and(wiremock::matchers::path("/boom"))
        .respond_with(wiremock::ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let loader = SourceLoader::new();
    let mut sink = Graph::new();
    let err = loader
        .load_into(
            SourceSpec::location(format!("{}/boom", server.uri())).format("turtle"),
            &mut sink,
        )
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), Some(500));
    assert!(sink.is_empty(), "a failed fetch must deliver nothing");
}

#[tokio::test]
async fn test_redirect_into_server_error() {
    let server = wiremock::MockServer::start().await;
    mount_redirect(&server, "/start", 303, "/gone").await;
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .and(wiremock::matchers::path("/gone"))
        .respond_with(wiremock::ResponseTemplate::new(410))
        .mount(&server)
        .await;

    let loader = SourceLoader::new();
    let err = loader
        .load(SourceSpec::location(format!("{}/start", server.uri())).format("turtle"))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(410));
}
