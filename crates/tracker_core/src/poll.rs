use crate::ItemId;

/// Client-side record of whether an automated run is being observed.
///
/// The session only tracks intent; the repeating timer itself lives with the
/// effect runner and is started/cancelled through `Effect::StartPolling` and
/// `Effect::StopPolling`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PollSession {
    item_id: Option<ItemId>,
    in_flight: Option<u64>,
}

impl PollSession {
    /// Activates the session for `item_id`. Returns `false` when a session is
    /// already active, in which case nothing changes.
    pub fn start(&mut self, item_id: ItemId) -> bool {
        if self.item_id.is_some() {
            return false;
        }
        self.item_id = Some(item_id);
        self.in_flight = None;
        true
    }

    /// Deactivates the session. Returns `true` if it was active.
    pub fn stop(&mut self) -> bool {
        self.in_flight = None;
        self.item_id.take().is_some()
    }

    pub fn is_active(&self) -> bool {
        self.item_id.is_some()
    }

    pub fn item_id(&self) -> Option<ItemId> {
        self.item_id
    }

    pub fn in_flight(&self) -> Option<u64> {
        self.in_flight
    }

    pub(crate) fn mark_in_flight(&mut self, seq: u64) {
        self.in_flight = Some(seq);
    }

    /// Clears the in-flight marker if `seq` is the outstanding poll refresh.
    pub(crate) fn settle(&mut self, seq: u64) {
        if self.in_flight == Some(seq) {
            self.in_flight = None;
        }
    }
}

/// Issues monotonically increasing refresh numbers and rejects results that
/// are not newer than the last one applied.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RefreshSequencer {
    last_issued: u64,
    last_applied: u64,
}

impl RefreshSequencer {
    pub fn issue(&mut self) -> u64 {
        self.last_issued += 1;
        self.last_issued
    }

    /// Returns `true` and records `seq` as applied if it is newer than every
    /// result applied so far.
    pub fn accept(&mut self, seq: u64) -> bool {
        if seq <= self.last_applied {
            return false;
        }
        self.last_applied = seq;
        true
    }

    pub fn last_applied(&self) -> u64 {
        self.last_applied
    }
}
