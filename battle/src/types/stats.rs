//! Boost stages

use sleuth_protocol::BoostStat;

/// Boost stages (-6 to +6) for every boostable stat
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoostTable {
    stages: [i8; 7],
}

fn slot(stat: BoostStat) -> usize {
    match stat {
        BoostStat::Atk => 0,
        BoostStat::Def => 1,
        BoostStat::Spa => 2,
        BoostStat::Spd => 3,
        BoostStat::Spe => 4,
        BoostStat::Accuracy => 5,
        BoostStat::Evasion => 6,
    }
}

impl BoostTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, stat: BoostStat) -> i8 {
        self.stages[slot(stat)]
    }

    /// Set stage for a stat (clamped to -6..+6)
    pub fn set(&mut self, stat: BoostStat, value: i8) {
        self.stages[slot(stat)] = value.clamp(-6, 6);
    }

    /// Apply a boost to a stat, returns the change actually applied
    pub fn boost(&mut self, stat: BoostStat, amount: i8) -> i8 {
        let current = self.get(stat);
        let new_value = current.saturating_add(amount).clamp(-6, 6);
        self.set(stat, new_value);
        new_value - current
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn clear_positive(&mut self) {
        for stage in &mut self.stages {
            *stage = (*stage).min(0);
        }
    }

    pub fn clear_negative(&mut self) {
        for stage in &mut self.stages {
            *stage = (*stage).max(0);
        }
    }

    pub fn invert(&mut self) {
        for stage in &mut self.stages {
            *stage = -*stage;
        }
    }

    /// Exchange the given stats with another table (Guard/Power/Heart Swap)
    pub fn swap(&mut self, other: &mut BoostTable, stats: &[BoostStat]) {
        for stat in stats {
            let mine = self.get(*stat);
            self.set(*stat, other.get(*stat));
            other.set(*stat, mine);
        }
    }

    pub fn is_clear(&self) -> bool {
        self.stages.iter().all(|s| *s == 0)
    }
}
