use crate::{Action, ItemId, UploadForm};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    LoadItems,
    Scan,
    FetchItem { item_id: ItemId, seq: u64 },
    RunAction { item_id: ItemId, action: Action },
    DownloadArtifact { item_id: ItemId },
    TriggerAutoRun { item_id: ItemId },
    StartPolling { item_id: ItemId },
    StopPolling,
    SendChat { item_id: ItemId, question: String },
    Upload(UploadForm),
}
