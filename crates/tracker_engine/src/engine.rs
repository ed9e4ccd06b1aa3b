use std::io;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;

use thiserror::Error;
use tracker_core::ItemId;
use tracker_logging::{tracker_debug, tracker_info, tracker_warn};

use crate::client::{artifact_file_name, ApiSettings, ReqwestApi, TrackerApi};
use crate::persist::ArtifactStore;
use crate::schedule::TokioScheduler;
use crate::{ApiError, EngineEvent, FailureKind, PipelineAction, UploadRequest};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub api: ApiSettings,
    pub output_dir: PathBuf,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("api client: {0}")]
    Api(#[from] ApiError),
    #[error("runtime: {0}")]
    Runtime(#[from] io::Error),
}

/// Receives engine results. Called from runtime worker threads.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

enum EngineCommand {
    LoadItems,
    Scan,
    FetchItem { item_id: ItemId, seq: u64 },
    RunAction { item_id: ItemId, action: PipelineAction },
    TriggerAutoRun { item_id: ItemId },
    Chat { item_id: ItemId, question: String },
    Upload(UploadRequest),
    Download { item_id: ItemId },
}

/// Front door of the I/O thread. Every call returns immediately; results
/// arrive later through the `EventSink`.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    runtime: tokio::runtime::Handle,
}

impl EngineHandle {
    pub fn new(config: EngineConfig, sink: Arc<dyn EventSink>) -> Result<Self, EngineError> {
        let api = ReqwestApi::new(config.api)?;
        Self::with_api(Arc::new(api), ArtifactStore::new(config.output_dir), sink)
    }

    pub fn with_api(
        api: Arc<dyn TrackerApi>,
        store: ArtifactStore,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, EngineError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("tracker-engine")
            .build()?;
        let handle = runtime.handle().clone();
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let store = Arc::new(store);

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let api = api.clone();
                let store = store.clone();
                let sink = sink.clone();
                runtime.spawn(async move {
                    handle_command(api.as_ref(), store.as_ref(), command, sink.as_ref()).await;
                });
            }
            tracker_debug!("Engine command channel closed; shutting down runtime");
        });

        Ok(Self {
            cmd_tx,
            runtime: handle,
        })
    }

    /// Scheduler that runs timers on the engine runtime.
    pub fn scheduler(&self) -> TokioScheduler {
        TokioScheduler::new(self.runtime.clone())
    }

    pub fn load_items(&self) {
        self.send(EngineCommand::LoadItems);
    }

    pub fn scan(&self) {
        self.send(EngineCommand::Scan);
    }

    pub fn fetch_item(&self, item_id: ItemId, seq: u64) {
        self.send(EngineCommand::FetchItem { item_id, seq });
    }

    pub fn run_action(&self, item_id: ItemId, action: PipelineAction) {
        self.send(EngineCommand::RunAction { item_id, action });
    }

    pub fn trigger_auto_run(&self, item_id: ItemId) {
        self.send(EngineCommand::TriggerAutoRun { item_id });
    }

    pub fn chat(&self, item_id: ItemId, question: impl Into<String>) {
        self.send(EngineCommand::Chat {
            item_id,
            question: question.into(),
        });
    }

    pub fn upload(&self, request: UploadRequest) {
        self.send(EngineCommand::Upload(request));
    }

    pub fn download(&self, item_id: ItemId) {
        self.send(EngineCommand::Download { item_id });
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            tracker_warn!("Engine thread is gone; dropping command");
        }
    }
}

async fn handle_command(
    api: &dyn TrackerApi,
    store: &ArtifactStore,
    command: EngineCommand,
    sink: &dyn EventSink,
) {
    let event = match command {
        EngineCommand::LoadItems => EngineEvent::ItemsLoaded(api.list_items().await),
        EngineCommand::Scan => EngineEvent::ScanCompleted(api.scan().await),
        EngineCommand::FetchItem { item_id, seq } => EngineEvent::ItemFetched {
            item_id,
            seq,
            result: api.fetch_item(item_id).await,
        },
        EngineCommand::RunAction { item_id, action } => {
            tracker_info!("Running {:?} for RFP {}", action, item_id);
            EngineEvent::ActionCompleted {
                item_id,
                action,
                result: api.run_action(item_id, action).await,
            }
        }
        EngineCommand::TriggerAutoRun { item_id } => {
            tracker_info!("Triggering automated run for RFP {}", item_id);
            EngineEvent::AutoRunTriggered {
                item_id,
                result: api.trigger_auto_run(item_id).await,
            }
        }
        EngineCommand::Chat { item_id, question } => EngineEvent::ChatAnswered {
            item_id,
            result: api.chat(item_id, &question).await,
        },
        EngineCommand::Upload(request) => EngineEvent::UploadCompleted(api.upload(&request).await),
        EngineCommand::Download { item_id } => EngineEvent::ArtifactSaved {
            item_id,
            result: download(api, store, item_id).await,
        },
    };
    sink.emit(event);
}

async fn download(
    api: &dyn TrackerApi,
    store: &ArtifactStore,
    item_id: ItemId,
) -> Result<PathBuf, ApiError> {
    let bytes = api.download_artifact(item_id).await?;
    let path = store
        .save(&artifact_file_name(item_id), &bytes)
        .map_err(|err| ApiError::new(FailureKind::Io, err.to_string()))?;
    tracker_info!("Saved {} bytes to {:?}", bytes.len(), path);
    Ok(path)
}
