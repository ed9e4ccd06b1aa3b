use std::collections::BTreeSet;

use crate::{
    can_start_automated_run, permitted_actions, Action, AppState, ChatEntry, DashboardStats,
    ExtractedData, ItemId, Notice, RfpRecord, Stage,
};

/// Number of items shown in the dashboard's "recent" panel.
pub const RECENT_ITEM_COUNT: usize = 4;

/// Pipeline steps shown in the detail view, keyed by the stage that completes them.
pub const PIPELINE_STEPS: [(&str, Stage); 3] = [
    ("Technical Analysis", Stage::Processed),
    ("Pricing Calc", Stage::PricingComplete),
    ("Proposal Gen", Stage::ReadyToSubmit),
];

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub stats: DashboardStats,
    pub recent: Vec<ItemRowView>,
    pub items: Vec<ItemRowView>,
    pub items_loaded: bool,
    pub scanning: bool,
    pub uploading: bool,
    pub detail: Option<DetailView>,
    pub chat: Vec<ChatEntry>,
    pub chat_pending: bool,
    pub notices: Vec<Notice>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRowView {
    pub id: ItemId,
    pub title: String,
    pub client_name: String,
    pub deadline: String,
    pub status: String,
    pub stage: Stage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepView {
    pub number: u8,
    pub label: &'static str,
    pub completed: bool,
    pub processing: bool,
}

/// Detail screen for the selected item. `record` fields are absent until the
/// first refresh lands.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub id: ItemId,
    pub loaded: bool,
    pub not_found: bool,
    pub title: String,
    pub client_name: String,
    pub deadline: String,
    pub status: String,
    pub stage: Stage,
    pub source_file: Option<String>,
    pub polling: bool,
    pub busy: Option<Action>,
    pub permitted_actions: BTreeSet<Action>,
    pub can_start_automated_run: bool,
    pub steps: Vec<StepView>,
    pub data: ExtractedData,
}

impl ItemRowView {
    fn from_record(record: &RfpRecord) -> Self {
        Self {
            id: record.id,
            title: record.title.clone(),
            client_name: record.client_name.clone(),
            deadline: record.deadline.clone(),
            status: record.status.clone(),
            stage: record.stage(),
        }
    }
}

pub(crate) fn build(state: &AppState, dirty: bool) -> AppViewModel {
    let items: Vec<ItemRowView> = state.items.iter().map(ItemRowView::from_record).collect();
    AppViewModel {
        stats: DashboardStats::from_records(&state.items),
        recent: items.iter().take(RECENT_ITEM_COUNT).cloned().collect(),
        items,
        items_loaded: state.items_loaded,
        scanning: state.scanning,
        uploading: state.uploading,
        detail: state.selected.map(|id| build_detail(state, id)),
        chat: state.chat.clone(),
        chat_pending: state.chat_pending,
        notices: state.notices.clone(),
        dirty,
    }
}

fn build_detail(state: &AppState, id: ItemId) -> DetailView {
    let polling = state.poll.is_active();
    let record = state.record.as_ref();
    let stage = record.map(RfpRecord::stage).unwrap_or_default();
    let steps = PIPELINE_STEPS
        .iter()
        .map(|&(label, completes_at)| StepView {
            number: completes_at.index(),
            label,
            completed: stage >= completes_at,
            processing: polling && stage.index() + 1 == completes_at.index(),
        })
        .collect();

    DetailView {
        id,
        loaded: record.is_some(),
        not_found: state.not_found,
        title: record.map(|r| r.title.clone()).unwrap_or_default(),
        client_name: record.map(|r| r.client_name.clone()).unwrap_or_default(),
        deadline: record.map(|r| r.deadline.clone()).unwrap_or_default(),
        status: record.map(|r| r.status.clone()).unwrap_or_default(),
        stage,
        source_file: record
            .and_then(RfpRecord::source_file_name)
            .map(ToOwned::to_owned),
        polling,
        busy: state.busy,
        permitted_actions: if record.is_some() {
            permitted_actions(stage, polling)
        } else {
            BTreeSet::new()
        },
        can_start_automated_run: record.is_some() && can_start_automated_run(stage, polling),
        steps,
        data: record.map(RfpRecord::extracted).unwrap_or_default(),
    }
}
