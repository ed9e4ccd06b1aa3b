use crate::{Action, ItemId, RfpRecord, ScanSummary, UploadForm};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User opened the dashboard or list; reload all items.
    DashboardRequested,
    /// Engine returned the item list.
    ItemsLoaded(Result<Vec<RfpRecord>, String>),
    /// User clicked Scan.
    ScanClicked,
    /// Engine finished the portal scan.
    ScanCompleted(Result<ScanSummary, String>),
    /// User opened the detail view of an item.
    ItemSelected(ItemId),
    /// User asked for a manual refresh of the open item.
    RefreshRequested,
    /// Engine returned the item for a refresh request. `Ok(None)` means the
    /// item is not in the backend list.
    ItemFetched {
        item_id: ItemId,
        seq: u64,
        result: Result<Option<RfpRecord>, String>,
    },
    /// User clicked a manual pipeline action.
    ActionClicked(Action),
    /// Engine finished a manual pipeline action.
    ActionCompleted {
        item_id: ItemId,
        action: Action,
        result: Result<(), String>,
    },
    /// Engine finished saving the proposal artifact; carries the saved path.
    DownloadCompleted(Result<String, String>),
    /// User launched an automated run for the open item.
    AutoRunClicked,
    /// Engine delivered (or failed to deliver) the automated-run trigger.
    AutoRunTriggerCompleted(Result<(), String>),
    /// User asked to observe the open item without triggering anything.
    WatchRequested,
    /// User stopped observing.
    StopWatchingClicked,
    /// Repeating timer fired.
    PollTick,
    /// User sent a chat question about the open item.
    ChatSubmitted(String),
    /// Engine returned the chat answer.
    ChatAnswered(Result<String, String>),
    /// User submitted the manual upload form.
    UploadSubmitted(UploadForm),
    /// Engine finished the upload; carries the new item id.
    UploadCompleted(Result<ItemId, String>),
}
