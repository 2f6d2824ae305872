use std::time::Duration;

use listkit_core::{
    Cursor, FetchKey, InvalidationTarget, ListError, ListErrorKind, Mutation, MutationMethod,
    PageRequest, Query, SessionContext,
};
use listkit_engine::{
    EndpointCatalog, FailureKind, FetchSettings, HttpBackend, ListEndpoint, ListMethod,
    MutationClient, PageFetcher, ReqwestMutationClient, ReqwestPageFetcher,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn endpoint(resource: &str, path: &str, method: ListMethod) -> ListEndpoint {
    ListEndpoint {
        resource: resource.to_string(),
        path: path.to_string(),
        method,
        page_size: "20".to_string(),
    }
}

fn fetcher_for(server: &MockServer, endpoints: Vec<ListEndpoint>) -> ReqwestPageFetcher {
    let backend = HttpBackend::new(&server.uri(), &FetchSettings::default()).expect("backend");
    ReqwestPageFetcher::new(backend, endpoints.into_iter().collect::<EndpointCatalog>())
}

fn request(key: FetchKey, cursor: Option<&str>) -> PageRequest {
    PageRequest {
        key,
        generation: 0,
        page_index: usize::from(cursor.is_some()),
        cursor: cursor.map(Cursor::new),
    }
}

#[tokio::test]
async fn get_endpoint_sends_cursor_scope_and_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/inventory/list"))
        .and(query_param("cursor", "inv-20"))
        .and(query_param("limit", "20"))
        .and(query_param("query", "gauze"))
        .and(query_param("containerId", "c-4"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "list": [{"id": "inv-21"}],
            "lastCursor": "inv-21",
            "hasMore": false
        })))
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server, vec![endpoint("inventory", "inventory/list", ListMethod::Get)]);
    let key = FetchKey::new("inventory")
        .with_scope("containerId", "c-4")
        .with_query(Query::settle("gauze"));
    let session = SessionContext::new("u-1", "tok-1");

    let page = fetcher
        .fetch_page(&request(key, Some("inv-20")), Some(&session))
        .await
        .expect("page");
    assert_eq!(page.list, vec![json!({"id": "inv-21"})]);
    assert_eq!(page.last_cursor, Some(Cursor::new("inv-21")));
    assert!(!page.has_more);
}

#[tokio::test]
async fn post_endpoint_sends_null_cursor_for_first_page() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/orders/search"))
        .and(body_json(json!({
            "cursor": null,
            "limit": "20",
            "query": "",
            "lineId": "line-A"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "list": [],
            "lastCursor": null,
            "hasMore": false
        })))
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server, vec![endpoint("orders", "/orders/search", ListMethod::Post)]);
    let key = FetchKey::new("orders").with_scope("lineId", "line-A");

    let page = fetcher.fetch_page(&request(key, None), None).await.expect("page");
    assert!(page.list.is_empty());
    assert_eq!(page.last_cursor, None);
}

#[tokio::test]
async fn unauthorized_is_classified() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/positions"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server, vec![endpoint("positions", "positions", ListMethod::Get)]);
    let err = fetcher
        .fetch_page(&request(FetchKey::new("positions"), None), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Unauthorized);
    assert_eq!(ListError::from(err).kind, ListErrorKind::Unauthorized);
}

#[tokio::test]
async fn rejection_message_is_kept_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/prescriptions"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({"message": "Patient id is invalid"})),
        )
        .mount(&server)
        .await;

    let fetcher = fetcher_for(
        &server,
        vec![endpoint("prescriptions", "prescriptions", ListMethod::Get)],
    );
    let err = fetcher
        .fetch_page(&request(FetchKey::new("prescriptions"), None), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Rejected { status: 422 });

    let list_error = ListError::from(err);
    assert_eq!(list_error.kind, ListErrorKind::Rejected);
    assert_eq!(list_error.message, "Patient id is invalid");
}

#[tokio::test]
async fn server_error_and_garbage_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/garbage"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let fetcher = fetcher_for(
        &server,
        vec![
            endpoint("broken", "broken", ListMethod::Get),
            endpoint("garbage", "garbage", ListMethod::Get),
        ],
    );

    let err = fetcher
        .fetch_page(&request(FetchKey::new("broken"), None), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(503));
    assert_eq!(ListError::from(err).kind, ListErrorKind::Transport);

    let err = fetcher
        .fetch_page(&request(FetchKey::new("garbage"), None), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!({"list": [], "lastCursor": null, "hasMore": false})),
        )
        .mount(&server)
        .await;

    let settings = FetchSettings {
        request_timeout: Duration::from_millis(50),
        ..FetchSettings::default()
    };
    let backend = HttpBackend::new(&server.uri(), &settings).unwrap();
    let fetcher = ReqwestPageFetcher::new(
        backend,
        [endpoint("slow", "slow", ListMethod::Get)].into_iter().collect(),
    );

    let err = fetcher
        .fetch_page(&request(FetchKey::new("slow"), None), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn unknown_resource_fails_without_network() {
    let server = MockServer::start().await;
    let fetcher = fetcher_for(&server, Vec::new());
    let err = fetcher
        .fetch_page(&request(FetchKey::new("districts"), None), None)
        .await
        .unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::UnknownResource {
            resource: "districts".to_string()
        }
    );
}

#[tokio::test]
async fn scope_named_like_a_paging_parameter_is_never_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "list": [],
            "lastCursor": null,
            "hasMore": false
        })))
        .expect(0)
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server, vec![endpoint("orders", "orders/search", ListMethod::Post)]);
    let key = FetchKey::new("orders").with_scope("limit", "1000");
    let err = fetcher
        .fetch_page(&request(key, None), None)
        .await
        .unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::ReservedParameter {
            name: "limit".to_string()
        }
    );
    assert_eq!(ListError::from(err).kind, ListErrorKind::Transport);
}

#[tokio::test]
async fn delete_mutation_hits_path_with_auth() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/job-posts/jp-3"))
        .and(header("authorization", "Bearer tok-9"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let backend = HttpBackend::new(&server.uri(), &FetchSettings::default()).unwrap();
    let client = ReqwestMutationClient::new(backend);
    let mutation = Mutation::new("Delete job post", MutationMethod::Delete, "job-posts/jp-3")
        .invalidating(InvalidationTarget::resource("job-posts"));

    client
        .execute(&mutation, Some(&SessionContext::new("u", "tok-9")))
        .await
        .expect("mutation ok");
}

#[tokio::test]
async fn failed_mutation_surfaces_validation_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/positions"))
        .and(body_json(json!({"title": ""})))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"message": "Title is required"})),
        )
        .mount(&server)
        .await;

    let backend = HttpBackend::new(&server.uri(), &FetchSettings::default()).unwrap();
    let client = ReqwestMutationClient::new(backend);
    let mutation = Mutation::new("Create position", MutationMethod::Post, "positions")
        .with_body(json!({"title": ""}));

    let err = client.execute(&mutation, None).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Rejected { status: 400 });
    assert_eq!(err.message, "Title is required");
}
