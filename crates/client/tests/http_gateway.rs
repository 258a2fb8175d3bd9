use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;
use candidates_client::{CandidateGateway, GraphQlConfig, GraphQlGateway};
use candidates_core::{FetchError, FetchRequest, NameFilter, PageCursor, RequestId};
use serde_json::{json, Value};

#[derive(Debug, Clone)]
struct Captured {
    api_key: Option<String>,
    request_id: Option<String>,
    body: Value,
}

#[derive(Clone)]
struct Stub {
    status: StatusCode,
    body: String,
    captured: Arc<Mutex<Vec<Captured>>>,
}

async fn handle(State(stub): State<Stub>, headers: HeaderMap, body: String) -> impl IntoResponse {
    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    stub.captured.lock().unwrap().push(Captured {
        api_key: header_value("x-api-key"),
        request_id: header_value("x-request-id"),
        body: serde_json::from_str(&body).unwrap_or(Value::Null),
    });
    (
        stub.status,
        [(header::CONTENT_TYPE, "application/json")],
        stub.body.clone(),
    )
}

async fn serve(status: StatusCode, body: impl Into<String>) -> (GraphQlGateway, Arc<Mutex<Vec<Captured>>>) {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let stub = Stub {
        status,
        body: body.into(),
        captured: Arc::clone(&captured),
    };
    let app = Router::new().route("/graphql", post(handle)).with_state(stub);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

    let config = GraphQlConfig {
        endpoint: format!("http://{addr}/graphql"),
        api_key: "test-key".into(),
        timeout_secs: 5,
    };
    (GraphQlGateway::new(&config).unwrap(), captured)
}

fn request() -> FetchRequest {
    FetchRequest {
        id: RequestId::new(1),
        page: 1,
        limit: 10,
        cursor: PageCursor::After("tok1".into()),
        names: NameFilter::new("", "Doe"),
    }
}

#[tokio::test]
async fn test_lists_candidates_with_headers_and_variables() {
    let body = json!({
        "data": { "listCandidates": {
            "items": [
                { "id": "1", "firstName": "John", "lastName": "Doe", "email": "john@example.com", "status": "active" }
            ],
            "nextToken": "tok2"
        } }
    });
    let (gateway, captured) = serve(StatusCode::OK, body.to_string()).await;

    let page = gateway.list_candidates(&request()).await.unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].last_name.as_deref(), Some("Doe"));
    assert_eq!(page.next_token.as_deref(), Some("tok2"));

    let captured = captured.lock().unwrap();
    let sent = &captured[0];
    assert_eq!(sent.api_key.as_deref(), Some("test-key"));
    let request_id = sent.request_id.as_deref().unwrap();
    assert!(uuid::Uuid::parse_str(request_id).is_ok());
    assert_eq!(sent.body["operationName"], "ListCandidates");
    assert_eq!(
        sent.body["variables"],
        json!({ "limit": 10, "nextToken": "tok1", "lastName": "Doe" })
    );
}

#[tokio::test]
async fn test_each_call_gets_a_fresh_request_id() {
    let body = json!({ "data": { "listCandidates": { "items": [], "nextToken": null } } });
    let (gateway, captured) = serve(StatusCode::OK, body.to_string()).await;
    gateway.list_candidates(&request()).await.unwrap();
    gateway.list_candidates(&request()).await.unwrap();

    let captured = captured.lock().unwrap();
    assert_eq!(captured.len(), 2);
    assert_ne!(captured[0].request_id, captured[1].request_id);
}

#[tokio::test]
async fn test_graphql_errors_are_remote_errors() {
    let body = json!({
        "data": null,
        "errors": [{ "message": "Not Authorized to access listCandidates on type Query" }]
    });
    let (gateway, _) = serve(StatusCode::OK, body.to_string()).await;

    let err = gateway.list_candidates(&request()).await.unwrap_err();
    assert_eq!(
        err,
        FetchError::Remote(vec!["Not Authorized to access listCandidates on type Query".into()])
    );
}

#[tokio::test]
async fn test_http_status_is_a_network_error() {
    let (gateway, _) = serve(StatusCode::INTERNAL_SERVER_ERROR, "{}").await;

    let err = gateway.list_candidates(&request()).await.unwrap_err();
    assert_eq!(
        err,
        FetchError::Network("Response not successful: Received status code 500".into())
    );
}

#[tokio::test]
async fn test_undecodable_body_is_a_network_error() {
    let (gateway, _) = serve(StatusCode::OK, "<html>gateway timeout</html>").await;

    let err = gateway.list_candidates(&request()).await.unwrap_err();
    assert!(matches!(err, FetchError::Network(_)), "{err:?}");
}

#[tokio::test]
async fn test_connection_refused_is_a_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let gateway = GraphQlGateway::new(&GraphQlConfig {
        endpoint: format!("http://{addr}/graphql"),
        api_key: "test-key".into(),
        timeout_secs: 5,
    })
    .unwrap();

    let err = gateway.list_candidates(&request()).await.unwrap_err();
    assert!(matches!(err, FetchError::Network(_)));
}

#[tokio::test]
async fn test_missing_candidate_is_none() {
    let (gateway, captured) = serve(StatusCode::OK, r#"{ "data": { "getCandidate": null } }"#).await;

    assert_eq!(gateway.get_candidate("42").await.unwrap(), None);
    let captured = captured.lock().unwrap();
    assert_eq!(captured[0].body["operationName"], "GetCandidate");
    assert_eq!(captured[0].body["variables"], json!({ "id": "42" }));
}

#[tokio::test]
async fn test_candidate_detail_decodes_address_fields() {
    let body = json!({ "data": { "getCandidate": {
        "id": "42", "firstName": "Ada", "lastName": "Lovelace", "zipCode": "02139",
        "city": "Cambridge", "experience": 7
    } } });
    let (gateway, _) = serve(StatusCode::OK, body.to_string()).await;

    let detail = gateway.get_candidate("42").await.unwrap().unwrap();
    assert_eq!(detail.zip_code.as_deref(), Some("02139"));
    assert_eq!(detail.experience, Some(7));
}
