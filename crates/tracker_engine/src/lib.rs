//! Tracker engine: backend HTTP client, I/O thread and poll timers.
mod client;
mod engine;
mod persist;
mod schedule;
mod types;

pub use client::{
    artifact_file_name, ApiSettings, ReqwestApi, TrackerApi, DEFAULT_BASE_URL,
    DEFAULT_WEBHOOK_URL,
};
pub use engine::{ChannelEventSink, EngineConfig, EngineError, EngineHandle, EventSink};
pub use persist::{prepare_output_dir, ArtifactStore, PersistError};
pub use schedule::{PollController, Scheduler, TaskHandle, TokioScheduler, DEFAULT_POLL_INTERVAL};
pub use types::{
    ApiError, EngineEvent, FailureKind, PipelineAction, ScanReport, UploadRequest,
};
