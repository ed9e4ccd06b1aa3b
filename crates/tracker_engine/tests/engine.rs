use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;
use tracker_core::{ItemId, RfpRecord};
use tracker_engine::{
    ApiError, ArtifactStore, ChannelEventSink, EngineEvent, EngineHandle, FailureKind,
    PipelineAction, ScanReport, TrackerApi, UploadRequest,
};

/// Backend stand-in with two fixed records.
struct FakeApi;

fn record(id: ItemId, status: &str) -> RfpRecord {
    serde_json::from_value(json!({"id": id, "title": format!("RFP {id}"), "status": status}))
        .unwrap()
}

#[async_trait::async_trait]
impl TrackerApi for FakeApi {
    async fn list_items(&self) -> Result<Vec<RfpRecord>, ApiError> {
        Ok(vec![record(1, "New"), record(2, "Ready to Submit")])
    }

    async fn scan(&self) -> Result<ScanReport, ApiError> {
        Ok(ScanReport { scanned_count: 2 })
    }

    async fn run_action(&self, item_id: ItemId, _action: PipelineAction) -> Result<(), ApiError> {
        if item_id == 1 {
            Ok(())
        } else {
            Err(ApiError::new(FailureKind::Rejected, "already processed"))
        }
    }

    async fn trigger_auto_run(&self, _item_id: ItemId) -> Result<(), ApiError> {
        Ok(())
    }

    async fn chat(&self, _item_id: ItemId, question: &str) -> Result<String, ApiError> {
        Ok(format!("echo: {question}"))
    }

    async fn upload(&self, _request: &UploadRequest) -> Result<ItemId, ApiError> {
        Ok(3)
    }

    async fn download_artifact(&self, item_id: ItemId) -> Result<Vec<u8>, ApiError> {
        Ok(format!("deck {item_id}").into_bytes())
    }
}

fn engine(output: PathBuf) -> (EngineHandle, mpsc::Receiver<EngineEvent>) {
    let (tx, rx) = mpsc::channel();
    let handle = EngineHandle::with_api(
        Arc::new(FakeApi),
        ArtifactStore::new(output),
        Arc::new(ChannelEventSink::new(tx)),
    )
    .expect("engine starts");
    (handle, rx)
}

fn next(rx: &mpsc::Receiver<EngineEvent>) -> EngineEvent {
    rx.recv_timeout(Duration::from_secs(5)).expect("engine event")
}

#[test]
fn fetch_reports_seq_and_missing_items() {
    let temp = TempDir::new().unwrap();
    let (engine, rx) = engine(temp.path().to_path_buf());

    engine.fetch_item(2, 7);
    match next(&rx) {
        EngineEvent::ItemFetched { item_id, seq, result } => {
            assert_eq!((item_id, seq), (2, 7));
            assert_eq!(result.unwrap().unwrap().status, "Ready to Submit");
        }
        other => panic!("unexpected event {other:?}"),
    }

    engine.fetch_item(99, 8);
    match next(&rx) {
        EngineEvent::ItemFetched { result, .. } => assert_eq!(result, Ok(None)),
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn action_failures_come_back_as_events() {
    let temp = TempDir::new().unwrap();
    let (engine, rx) = engine(temp.path().to_path_buf());

    engine.run_action(2, PipelineAction::Analyze);
    match next(&rx) {
        EngineEvent::ActionCompleted { item_id, action, result } => {
            assert_eq!(item_id, 2);
            assert_eq!(action, PipelineAction::Analyze);
            assert_eq!(result.unwrap_err().to_string(), "already processed");
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn download_saves_artifact_into_output_dir() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("downloads");
    let (engine, rx) = engine(output.clone());

    engine.download(5);
    match next(&rx) {
        EngineEvent::ArtifactSaved { item_id, result } => {
            assert_eq!(item_id, 5);
            let path = result.expect("saved");
            assert_eq!(path, output.join("proposal_5.pptx"));
            assert_eq!(std::fs::read(path).unwrap(), b"deck 5");
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn chat_answer_is_tagged_with_item() {
    let temp = TempDir::new().unwrap();
    let (engine, rx) = engine(temp.path().to_path_buf());

    engine.chat(1, "colour?");
    assert_eq!(
        next(&rx),
        EngineEvent::ChatAnswered {
            item_id: 1,
            result: Ok("echo: colour?".to_string())
        }
    );
}
