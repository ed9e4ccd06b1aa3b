/// Status labels emitted by the backend, in pipeline order.
pub const STATUS_NEW: &str = "New";
pub const STATUS_PROCESSED: &str = "Processed";
pub const STATUS_PRICING_COMPLETE: &str = "Pricing Complete";
pub const STATUS_READY_TO_SUBMIT: &str = "Ready to Submit";

/// Ordinal pipeline position of a tracked item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Stage {
    #[default]
    New,
    Processed,
    PricingComplete,
    ReadyToSubmit,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::New,
        Stage::Processed,
        Stage::PricingComplete,
        Stage::ReadyToSubmit,
    ];

    pub fn index(self) -> u8 {
        match self {
            Stage::New => 0,
            Stage::Processed => 1,
            Stage::PricingComplete => 2,
            Stage::ReadyToSubmit => 3,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Stage::ReadyToSubmit
    }

    /// The status label that maps onto this stage.
    pub fn status_label(self) -> &'static str {
        match self {
            Stage::New => STATUS_NEW,
            Stage::Processed => STATUS_PROCESSED,
            Stage::PricingComplete => STATUS_PRICING_COMPLETE,
            Stage::ReadyToSubmit => STATUS_READY_TO_SUBMIT,
        }
    }
}

/// Maps a status label to its stage. Unrecognized labels map to `Stage::New`.
pub fn stage_of(status: &str) -> Stage {
    match status {
        STATUS_PROCESSED => Stage::Processed,
        STATUS_PRICING_COMPLETE => Stage::PricingComplete,
        STATUS_READY_TO_SUBMIT => Stage::ReadyToSubmit,
        _ => Stage::New,
    }
}
