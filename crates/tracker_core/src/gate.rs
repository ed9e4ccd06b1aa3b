use std::collections::BTreeSet;

use crate::Stage;

/// Manual operations a user can request on a tracked item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Action {
    Analyze,
    Price,
    GenerateProposal,
    Download,
}

impl Action {
    pub fn label(self) -> &'static str {
        match self {
            Action::Analyze => "analyze",
            Action::Price => "price",
            Action::GenerateProposal => "proposal",
            Action::Download => "download",
        }
    }
}

/// Manual actions allowed for `stage`. An active poll session owns the item,
/// so nothing is permitted while it runs.
pub fn permitted_actions(stage: Stage, poll_active: bool) -> BTreeSet<Action> {
    if poll_active {
        return BTreeSet::new();
    }
    let action = match stage {
        Stage::New => Action::Analyze,
        Stage::Processed => Action::Price,
        Stage::PricingComplete => Action::GenerateProposal,
        Stage::ReadyToSubmit => Action::Download,
    };
    BTreeSet::from([action])
}

/// Whether an automated run may be triggered from `stage`.
pub fn can_start_automated_run(stage: Stage, poll_active: bool) -> bool {
    !poll_active && !stage.is_terminal()
}
