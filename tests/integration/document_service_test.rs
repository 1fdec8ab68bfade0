// tests/integration/document_service_test.rs

use super::fixtures::{RecordingErrorTracker, RecordingTransport, init_tracing, message, messages};
use docrelay::config::{Config, ServiceMode};
use docrelay::core::delta::{
    DeltaConnection, DeltaEvent, DeltaStorageService, InMemoryDeltaStorage, ReplayWindow,
};
use docrelay::core::service::{
    self, Credentials, DeltaTransport, DocumentService, LiveServiceOptions, ReplayDocumentService,
};
use docrelay::core::{DocRelayError, DocumentTarget, User};
use docrelay::server;
use std::io::Write;
use std::sync::Arc;
use tokio_stream::StreamExt;

fn target() -> DocumentTarget {
    DocumentTarget::new("tenant", "doc").with_token("tok")
}

fn alice() -> User {
    User {
        id: "alice".to_string(),
        name: Some("Alice".to_string()),
    }
}

async fn drain(connection: &dyn DeltaConnection) -> Vec<u64> {
    let mut events = connection.take_events().unwrap();
    let mut seqs = Vec::new();
    while let Some(event) = events.next().await {
        match event {
            DeltaEvent::Op { messages, .. } => {
                seqs.extend(messages.iter().map(|m| m.sequence_number))
            }
            DeltaEvent::Error(e) => panic!("unexpected error event: {e}"),
        }
    }
    seqs
}

fn live_service(
    transport: Arc<RecordingTransport>,
    tracker: Arc<RecordingErrorTracker>,
) -> Arc<dyn DocumentService> {
    let options = LiveServiceOptions {
        error_tracker: tracker,
        disable_cache: true,
        historian_api: false,
        credentials: Some(Credentials {
            user: "svc".to_string(),
            password: "pw".to_string(),
        }),
    };
    service::create_document_service(
        "http://deltas.test:3000",
        "http://git.test:3001",
        transport,
        options,
    )
    .unwrap()
}

#[tokio::test]
async fn test_live_service_passes_settings_to_transport() {
    init_tracing();
    let transport = Arc::new(RecordingTransport::default());
    let tracker = Arc::new(RecordingErrorTracker::default());
    let service = live_service(Arc::clone(&transport), Arc::clone(&tracker));

    let connection = service
        .connect_to_delta_stream(&target(), Some(alice()))
        .await
        .unwrap();
    assert_eq!(connection.document_id(), "doc");
    assert_eq!(connection.client_id(), "live-client-1");
    assert!(!connection.existing());
    assert_eq!(connection.parent_branch(), Some("main"));
    assert_eq!(connection.user(), Some(&alice()));
    assert_eq!(connection.initial_messages(), messages(2).as_slice());

    let requests = transport.requests.lock();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.target, target());
    assert_eq!(request.delta_url.as_str(), "http://deltas.test:3000/");
    assert_eq!(request.storage_url.as_str(), "http://git.test:3001/");
    assert!(request.disable_cache);
    assert!(!request.historian_api);
    assert_eq!(request.credentials.as_ref().map(|c| c.user.as_str()), Some("svc"));
    assert!(tracker.tracked.lock().is_empty());
}

#[tokio::test]
async fn test_live_service_tracks_and_returns_connect_failure() {
    let transport = Arc::new(RecordingTransport::failing());
    let tracker = Arc::new(RecordingErrorTracker::default());
    let service = live_service(transport, Arc::clone(&tracker));

    let err = match service.connect_to_delta_stream(&target(), None).await {
        Ok(_) => panic!("connect should fail"),
        Err(e) => e,
    };
    let expected = DocRelayError::Connection("socket refused".to_string());
    assert_eq!(err, expected);

    let tracked = tracker.tracked.lock();
    assert_eq!(tracked.len(), 1);
    assert_eq!(tracked[0].1, expected);
}

#[test]
fn test_live_service_rejects_invalid_endpoints() {
    let transport: Arc<dyn DeltaTransport> = Arc::new(RecordingTransport::default());
    let options = LiveServiceOptions::new(Arc::new(RecordingErrorTracker::default()));
    let result = service::create_document_service("::bad::", "http://git.test", transport, options);
    assert!(matches!(result, Err(DocRelayError::Connection(_))));
}

#[tokio::test(start_paused = true)]
async fn test_replay_service_ignores_user_and_replays_window() {
    let storage = Arc::new(InMemoryDeltaStorage::new());
    storage.append("tenant", "doc", messages(5));
    let service =
        service::create_replay_document_service_with_storage(storage, ReplayWindow::new(2, 5));

    let connection = service
        .connect_to_delta_stream(&target(), Some(alice()))
        .await
        .unwrap();
    assert!(connection.existing());
    assert!(connection.user().is_none());
    assert_eq!(connection.client_id(), "");

    assert_eq!(drain(&*connection).await, vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_replay_service_exposes_backing_log() {
    let storage = Arc::new(InMemoryDeltaStorage::new());
    storage.append("tenant", "doc", messages(4));
    let service = ReplayDocumentService::new(storage, ReplayWindow::new(0, 10));
    assert_eq!(service.window(), ReplayWindow::new(0, 10));

    let log = service
        .connect_to_delta_storage(&target())
        .await
        .unwrap()
        .get("tenant", "doc", None, 1, 4)
        .await
        .unwrap();
    assert_eq!(log, vec![message(2), message(3)]);
}

#[tokio::test(start_paused = true)]
async fn test_replay_connections_are_independent() {
    let storage = Arc::new(InMemoryDeltaStorage::new());
    storage.append("tenant", "doc", messages(3));
    let service = ReplayDocumentService::new(storage, ReplayWindow::new(0, 10));

    let first = service.connect_replay(&target());
    let second = service.connect_replay(&target());
    first.disconnect();

    assert_eq!(drain(&second).await, vec![1, 2, 3]);
    assert!(drain(&first).await.is_empty());
}

fn replay_config(log_file: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.document.tenant_id = "tenant".to_string();
    config.document.document_id = "doc".to_string();
    config.replay.from = 1;
    config.replay.log_file = Some(log_file.to_string_lossy().into_owned());
    config
}

#[tokio::test(start_paused = true)]
async fn test_server_builds_replay_service_from_log_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(serde_json::to_string(&messages(3)).unwrap().as_bytes())
        .unwrap();

    let config = replay_config(file.path());
    let service = server::build_document_service(&config, None).unwrap();
    let connection = service
        .connect_to_delta_stream(&config.document.target(), None)
        .await
        .unwrap();

    assert_eq!(drain(&*connection).await, vec![1, 2, 3]);
}

#[test]
fn test_server_reports_unreadable_log_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = replay_config(&dir.path().join("missing.json"));

    let err = match server::build_document_service(&config, None) {
        Ok(_) => panic!("build should fail"),
        Err(e) => e,
    };
    assert!(format!("{err:#}").contains("Failed to load replay log"));
}

#[test]
fn test_server_live_mode_requires_transport() {
    let mut config = Config::default();
    config.service.mode = ServiceMode::Live;

    let err = match server::build_document_service(&config, None) {
        Ok(_) => panic!("build should fail"),
        Err(e) => e,
    };
    assert!(err.to_string().contains("live mode requires a delta transport"));
}

#[tokio::test]
async fn test_server_live_mode_applies_live_settings() {
    let mut config = Config::default();
    config.service.mode = ServiceMode::Live;
    config.live.disable_cache = true;
    config.document.document_id = "doc".to_string();

    let transport = Arc::new(RecordingTransport::default());
    let dyn_transport: Arc<dyn DeltaTransport> = transport.clone();
    let service = server::build_document_service(&config, Some(dyn_transport)).unwrap();
    service
        .connect_to_delta_stream(&config.document.target(), None)
        .await
        .unwrap();

    let requests = transport.requests.lock();
    assert!(requests[0].disable_cache);
    assert!(requests[0].historian_api);
    assert_eq!(requests[0].target.tenant_id, "local");
}
