//! Major status with its turn counter

use crate::types::MajorStatus;
use tracing::warn;

/// A pokemon's major status plus the counter sleep and toxic need
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MajorStatusCounter {
    current: Option<MajorStatus>,
    turns: u32,
}

impl MajorStatusCounter {
    pub fn current(&self) -> Option<MajorStatus> {
        self.current
    }

    pub fn is(&self, status: MajorStatus) -> bool {
        self.current == Some(status)
    }

    pub fn turns(&self) -> u32 {
        self.turns
    }

    pub fn afflict(&mut self, status: MajorStatus) {
        self.current = Some(status);
        self.turns = 1;
    }

    /// Count another turn of sleep or toxic
    pub fn tick(&mut self) {
        let Some(status) = self.current else {
            return;
        };
        if !matches!(status, MajorStatus::Sleep | MajorStatus::Toxic) {
            return;
        }
        self.turns += 1;
        if let Some(max) = status.max_duration()
            && self.turns > max + 1
        {
            warn!(status = %status, turns = self.turns, "status counter past its maximum");
            self.turns = max + 1;
        }
    }

    pub fn cure(&mut self) {
        self.current = None;
        self.turns = 0;
    }

    /// Toxic's counter restarts when the pokemon leaves the field
    pub fn on_switch_out(&mut self) {
        if self.is(MajorStatus::Toxic) {
            self.turns = 1;
        }
    }
}
