//! Static game data records, as stored in the embedded dex JSON

use crate::types::{Type, Weather};
use serde::Deserialize;

/// Base stat spread of a species
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct BaseStats {
    pub hp: u32,
    pub atk: u32,
    pub def: u32,
    pub spa: u32,
    pub spd: u32,
    pub spe: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesData {
    pub name: String,
    pub types: Vec<Type>,
    pub base_stats: BaseStats,
    /// Ability ids the species can have
    pub abilities: Vec<String>,
    /// Move ids the species can learn. Absent means unrestricted.
    #[serde(default)]
    pub movepool: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum MoveCategory {
    Physical,
    Special,
    Status,
}

/// How a self-switching move hands over to the replacement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SelfSwitchKind {
    /// U-turn style, volatiles are dropped
    Normal,
    /// Baton Pass, passable volatiles carry over
    CopyVolatile,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveData {
    pub name: String,
    #[serde(rename = "type")]
    pub move_type: Type,
    pub category: MoveCategory,
    /// Base PP, before PP Ups
    pub pp: u32,
    #[serde(default = "default_target")]
    pub target: String,
    #[serde(default)]
    pub self_switch: Option<SelfSwitchKind>,
    /// Outrage-like rampage
    #[serde(default)]
    pub locked_move: bool,
    #[serde(default)]
    pub two_turn: bool,
    #[serde(default)]
    pub recharge: bool,
    /// Rollout-like consecutive use
    #[serde(default)]
    pub rollout: bool,
    /// Protect-like stalling move
    #[serde(default)]
    pub stall: bool,
}

fn default_target() -> String {
    "normal".to_string()
}

impl MoveData {
    /// PP with the maximum number of PP Ups applied
    pub fn max_pp(&self) -> u32 {
        if self.pp <= 1 { self.pp } else { self.pp * 8 / 5 }
    }

    pub fn is_status(&self) -> bool {
        self.category == MoveCategory::Status
    }

    /// Whether the move targets the opposing pokemon
    pub fn targets_foe(&self) -> bool {
        matches!(self.target.as_str(), "normal" | "any" | "allAdjacentFoes" | "randomNormal")
    }
}

/// End-of-turn effect of a held item
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ResidualItem {
    /// Leftovers
    Heal,
    /// Black Sludge: heals holders of the type, damages everyone else
    #[serde(rename_all = "camelCase")]
    TypeDependent { heal_type: Type },
    /// Sticky Barb
    Damage,
    /// Status orbs
    #[serde(rename_all = "camelCase")]
    Status {
        status: String,
        immune_types: Vec<Type>,
    },
}

/// Effect after the holder deals damage with a move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PostDamageItem {
    /// Life Orb
    Recoil,
    /// Shell Bell
    Drain,
}

/// Duration extension provided by a held item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ItemExtension {
    Weather { weather: Weather },
    Screens,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemData {
    pub name: String,
    #[serde(default)]
    pub residual: Option<ResidualItem>,
    #[serde(default)]
    pub post_damage: Option<PostDamageItem>,
    #[serde(default)]
    pub choice_lock: bool,
    #[serde(default)]
    pub extends: Option<ItemExtension>,
    #[serde(default)]
    pub plate_type: Option<Type>,
    #[serde(default)]
    pub berry: bool,
}

impl ItemData {
    /// Whether this item lengthens the given weather
    pub fn extends_weather(&self, weather: Weather) -> bool {
        self.extends == Some(ItemExtension::Weather { weather })
    }

    pub fn extends_screens(&self) -> bool {
        self.extends == Some(ItemExtension::Screens)
    }
}

/// What an ability does when its holder enters the field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum OnStart {
    /// Reveals itself with an |-ability| message
    Announce,
    Intimidate,
    Weather { weather: Weather },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AbsorbEffect {
    Immune,
    Heal,
    Boost,
    FlashFire,
}

/// Move types an ability blocks, and what it does instead
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Absorb {
    pub types: Vec<Type>,
    pub effect: AbsorbEffect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrapKind {
    /// Traps everything except another Shadow Tag
    ShadowTag,
    /// Traps grounded pokemon
    ArenaTrap,
    /// Traps Steel types
    MagnetPull,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResidualAbility {
    SpeedBoost,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbilityData {
    pub name: String,
    #[serde(default)]
    pub on_start: Option<OnStart>,
    #[serde(default)]
    pub absorb: Option<Absorb>,
    #[serde(default)]
    pub trap: Option<TrapKind>,
    #[serde(default)]
    pub residual: Option<ResidualAbility>,
    /// Mold Breaker
    #[serde(default)]
    pub ignores_abilities: bool,
    /// Klutz
    #[serde(default)]
    pub suppresses_item: bool,
    #[serde(default)]
    pub magic_guard: bool,
    /// Opposing moves cost an extra PP
    #[serde(default)]
    pub pressure: bool,
}
