use std::fmt;
use std::path::PathBuf;

use thiserror::Error;
use tracker_core::{ItemId, RfpRecord};

/// Backend pipeline steps that can be run by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineAction {
    Analyze,
    Price,
    GenerateProposal,
}

impl PipelineAction {
    /// Path of the action endpoint relative to the API base.
    pub fn path(self, item_id: ItemId) -> String {
        match self {
            PipelineAction::Analyze => format!("api/agents/technical/{item_id}/analyze"),
            PipelineAction::Price => format!("api/agents/pricing/{item_id}/calculate"),
            PipelineAction::GenerateProposal => {
                format!("api/agents/main/{item_id}/generate-proposal")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub scanned_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub file: PathBuf,
    pub title: String,
    pub client: String,
    pub deadline: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    ItemsLoaded(Result<Vec<RfpRecord>, ApiError>),
    ScanCompleted(Result<ScanReport, ApiError>),
    ItemFetched {
        item_id: ItemId,
        seq: u64,
        result: Result<Option<RfpRecord>, ApiError>,
    },
    ActionCompleted {
        item_id: ItemId,
        action: PipelineAction,
        result: Result<(), ApiError>,
    },
    AutoRunTriggered {
        item_id: ItemId,
        result: Result<(), ApiError>,
    },
    ChatAnswered {
        item_id: ItemId,
        result: Result<String, ApiError>,
    },
    UploadCompleted(Result<ItemId, ApiError>),
    ArtifactSaved {
        item_id: ItemId,
        result: Result<PathBuf, ApiError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", describe_failure(.kind, .message))]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

fn describe_failure(kind: &FailureKind, message: &str) -> String {
    match kind {
        // The backend's own message is the most useful thing to show.
        FailureKind::Rejected => message.to_string(),
        _ if message.is_empty() => kind.to_string(),
        _ => format!("{kind}: {message}"),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    /// 2xx response whose body carried an `error` field.
    Rejected,
    Decode,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Io,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Rejected => write!(f, "rejected by server"),
            FailureKind::Decode => write!(f, "unexpected response"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Io => write!(f, "io error"),
        }
    }
}
