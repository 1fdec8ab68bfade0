// tests/integration/http_storage_test.rs

use super::fixtures::{init_tracing, message};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use docrelay::core::delta::{DeltaEvent, DeltaStorageService, HttpDeltaStorage};
use docrelay::core::service;
use docrelay::core::{DocRelayError, DocumentTarget, SequencedMessage};
use parking_lot::Mutex;
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_stream::StreamExt;

#[derive(Debug, Deserialize)]
struct DeltaRange {
    from: u64,
    to: u64,
}

/// One request as the delta endpoint saw it.
#[derive(Debug, Clone, PartialEq)]
struct SeenRequest {
    tenant_id: String,
    document_id: String,
    from: u64,
    to: u64,
    authorization: Option<String>,
}

#[derive(Clone)]
struct DeltaEndpoint {
    status: StatusCode,
    log: Vec<SequencedMessage>,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

async fn get_deltas(
    State(endpoint): State<DeltaEndpoint>,
    Path((tenant_id, document_id)): Path<(String, String)>,
    Query(range): Query<DeltaRange>,
    headers: HeaderMap,
) -> impl IntoResponse {
    endpoint.seen.lock().push(SeenRequest {
        tenant_id,
        document_id,
        from: range.from,
        to: range.to,
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    });
    (endpoint.status, Json(endpoint.log))
}

/// Serves `GET /deltas/{tenant}/{document}` with a fixed status and log,
/// recording every request it receives.
async fn serve(
    status: StatusCode,
    log: Vec<SequencedMessage>,
) -> (SocketAddr, Arc<Mutex<Vec<SeenRequest>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let endpoint = DeltaEndpoint {
        status,
        log,
        seen: Arc::clone(&seen),
    };
    let app = Router::new()
        .route("/deltas/{tenant}/{document}", get(get_deltas))
        .with_state(endpoint);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, seen)
}

fn log_of(seqs: &[u64]) -> Vec<SequencedMessage> {
    seqs.iter().map(|&s| message(s)).collect()
}

#[tokio::test]
async fn test_http_storage_requests_range_with_bearer_token() {
    init_tracing();
    let (addr, seen) = serve(StatusCode::OK, log_of(&[3, 1, 2])).await;
    let storage = HttpDeltaStorage::new(&format!("http://{addr}")).unwrap();

    let log = storage
        .get("my tenant", "doc-1", Some("tok"), 0, 5)
        .await
        .unwrap();
    let seqs: Vec<u64> = log.iter().map(|m| m.sequence_number).collect();
    assert_eq!(seqs, vec![1, 2, 3]);

    assert_eq!(
        seen.lock().clone(),
        vec![SeenRequest {
            tenant_id: "my tenant".to_string(),
            document_id: "doc-1".to_string(),
            from: 0,
            to: 5,
            authorization: Some("Bearer tok".to_string()),
        }]
    );
}

#[tokio::test]
async fn test_http_storage_without_token_sends_no_authorization() {
    let (addr, seen) = serve(StatusCode::OK, Vec::new()).await;
    let storage = HttpDeltaStorage::new(&format!("http://{addr}/")).unwrap();

    let log = storage.get("t", "d", None, 2, 9).await.unwrap();
    assert!(log.is_empty());

    let seen = seen.lock();
    assert_eq!((seen[0].from, seen[0].to), (2, 9));
    assert_eq!(seen[0].authorization, None);
}

#[tokio::test]
async fn test_http_storage_maps_error_status() {
    let (addr, _) = serve(StatusCode::INTERNAL_SERVER_ERROR, Vec::new()).await;
    let storage = HttpDeltaStorage::new(&format!("http://{addr}")).unwrap();

    let err = storage.get("t", "d", None, 0, 5).await.unwrap_err();
    assert!(matches!(err, DocRelayError::DeltaStorage(ref m) if m.contains("500")));
}

#[tokio::test]
async fn test_replay_service_streams_log_fetched_over_http() {
    init_tracing();
    let (addr, seen) = serve(StatusCode::OK, log_of(&[1, 2, 3])).await;
    let service = service::create_replay_document_service(&format!("http://{addr}"), 1, 4).unwrap();

    let target = DocumentTarget::new("t", "d").with_token("tok");
    let connection = service.connect_to_delta_stream(&target, None).await.unwrap();
    let mut events = connection.take_events().unwrap();

    let mut batches = Vec::new();
    while let Some(event) = events.next().await {
        match event {
            DeltaEvent::Op { messages, .. } => {
                batches.push(messages.iter().map(|m| m.sequence_number).collect::<Vec<_>>())
            }
            DeltaEvent::Error(e) => panic!("replay failed: {e}"),
        }
    }
    assert_eq!(batches, vec![vec![1], vec![2], vec![3]]);

    let seen = seen.lock();
    assert_eq!((seen[0].from, seen[0].to), (0, 4));
    assert_eq!(seen[0].authorization.as_deref(), Some("Bearer tok"));
}
