//! Stat values and ranges

use crate::dex::BaseStats;
use sleuth_protocol::PokemonStats;

/// Inclusive bounds on a stat. Exact when `min == max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatRange {
    pub min: u32,
    pub max: u32,
}

impl StatRange {
    pub fn exact(value: u32) -> Self {
        StatRange {
            min: value,
            max: value,
        }
    }

    pub fn is_exact(&self) -> bool {
        self.min == self.max
    }

    pub fn contains(&self, value: u32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Stats of one pokemon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatTable {
    pub level: u8,
    pub hp: StatRange,
    pub atk: StatRange,
    pub def: StatRange,
    pub spa: StatRange,
    pub spd: StatRange,
    pub spe: StatRange,
}

fn hp_stat(base: u32, iv: u32, ev: u32, level: u32) -> u32 {
    (2 * base + iv + ev / 4) * level / 100 + level + 10
}

/// `nature` is the nature multiplier in tenths (9, 10 or 11)
fn other_stat(base: u32, iv: u32, ev: u32, level: u32, nature: u32) -> u32 {
    let raw = (2 * base + iv + ev / 4) * level / 100 + 5;
    raw * nature / 10
}

fn range(base: u32, level: u32) -> StatRange {
    StatRange {
        min: other_stat(base, 0, 0, level, 9),
        max: other_stat(base, 31, 252, level, 11),
    }
}

impl StatTable {
    /// Every stat spread a pokemon of this species and level could have
    pub fn from_base(base: &BaseStats, level: u8) -> Self {
        let lv = u32::from(level);
        StatTable {
            level,
            hp: StatRange {
                min: hp_stat(base.hp, 0, 0, lv),
                max: hp_stat(base.hp, 31, 252, lv),
            },
            atk: range(base.atk, lv),
            def: range(base.def, lv),
            spa: range(base.spa, lv),
            spd: range(base.spd, lv),
            spe: range(base.spe, lv),
        }
    }

    /// Exact stats as reported by a request
    pub fn exact(max_hp: u32, stats: &PokemonStats, level: u8) -> Self {
        StatTable {
            level,
            hp: StatRange::exact(max_hp),
            atk: StatRange::exact(stats.atk),
            def: StatRange::exact(stats.def),
            spa: StatRange::exact(stats.spa),
            spd: StatRange::exact(stats.spd),
            spe: StatRange::exact(stats.spe),
        }
    }
}
