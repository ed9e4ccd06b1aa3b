use std::path::PathBuf;

use crate::view_model::{self, AppViewModel};
use crate::{Action, ItemId, PollSession, RefreshSequencer, RfpRecord};

/// Result of a portal scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSummary {
    pub scanned_count: u64,
}

/// Manual upload form contents.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadForm {
    pub file: PathBuf,
    pub title: String,
    pub client: String,
    pub deadline: String,
}

impl UploadForm {
    /// Name of the first required field that is empty.
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.file.as_os_str().is_empty() {
            Some("file")
        } else if self.title.trim().is_empty() {
            Some("title")
        } else if self.client.trim().is_empty() {
            Some("client")
        } else if self.deadline.trim().is_empty() {
            Some("deadline")
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Failure,
}

/// User-visible outcome message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    pub role: ChatRole,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub(crate) items: Vec<RfpRecord>,
    pub(crate) items_loaded: bool,
    pub(crate) loading_items: bool,
    pub(crate) scanning: bool,
    pub(crate) uploading: bool,
    pub(crate) selected: Option<ItemId>,
    pub(crate) record: Option<RfpRecord>,
    pub(crate) not_found: bool,
    pub(crate) poll: PollSession,
    pub(crate) sequencer: RefreshSequencer,
    pub(crate) outstanding_fetches: usize,
    pub(crate) busy: Option<Action>,
    /// The automated-run webhook has been called but has not answered yet.
    pub(crate) trigger_pending: bool,
    pub(crate) chat: Vec<ChatEntry>,
    pub(crate) chat_pending: bool,
    pub(crate) notices: Vec<Notice>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        view_model::build(self, self.dirty)
    }

    pub fn poll(&self) -> &PollSession {
        &self.poll
    }

    pub fn selected(&self) -> Option<ItemId> {
        self.selected
    }

    pub fn record(&self) -> Option<&RfpRecord> {
        self.record.as_ref()
    }

    pub fn items(&self) -> &[RfpRecord] {
        &self.items
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// True while any request started by the user is still outstanding.
    pub fn is_idle(&self) -> bool {
        !self.loading_items
            && !self.scanning
            && !self.uploading
            && !self.chat_pending
            && self.outstanding_fetches == 0
            && self.busy.is_none()
            && !self.trigger_pending
            && !self.poll.is_active()
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether state changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn push_notice(&mut self, level: NoticeLevel, text: impl Into<String>) {
        self.notices.push(Notice {
            level,
            text: text.into(),
        });
        self.mark_dirty();
    }

    pub(crate) fn push_failure(&mut self, prefix: &str, detail: &str) {
        self.push_notice(NoticeLevel::Failure, format!("{prefix}: {detail}"));
    }
}
