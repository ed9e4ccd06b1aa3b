//! Tracker core: pure pipeline state machine and view-model helpers.
mod effect;
mod gate;
mod msg;
mod poll;
mod record;
mod stage;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use gate::{can_start_automated_run, permitted_actions, Action};
pub use msg::Msg;
pub use poll::{PollSession, RefreshSequencer};
pub use record::{
    display_value, DashboardStats, ExtractedData, ItemId, PriceComponents, PricingQuote,
    ProductMatch, Requirements, RfpRecord,
};
pub use stage::{
    stage_of, Stage, STATUS_NEW, STATUS_PRICING_COMPLETE, STATUS_PROCESSED,
    STATUS_READY_TO_SUBMIT,
};
pub use state::{AppState, ChatEntry, ChatRole, Notice, NoticeLevel, ScanSummary, UploadForm};
pub use update::update;
pub use view_model::{
    AppViewModel, DetailView, ItemRowView, StepView, PIPELINE_STEPS, RECENT_ITEM_COUNT,
};
