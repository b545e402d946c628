//! Battle request types
//!
//! These types represent the JSON structure of |request| messages.

use super::battle::{HpStatus, PokemonDetails, PokemonIdent, SideId, to_id};
use serde::Deserialize;

/// A battle request describing our side and the decision expected from us
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleRequest {
    /// Request ID for synchronization
    pub rqid: Option<u64>,

    /// Active pokemon and their available moves
    #[serde(default)]
    pub active: Option<Vec<ActivePokemon>>,

    /// Information about our side/team
    pub side: Option<SideInfo>,

    /// Which active slots need to switch
    #[serde(default)]
    pub force_switch: Option<Vec<bool>>,

    /// Whether this is team preview
    #[serde(default)]
    pub team_preview: bool,

    /// Whether we're waiting for the opponent
    #[serde(default)]
    pub wait: bool,
}

impl BattleRequest {
    /// Check if this request requires a decision
    pub fn needs_decision(&self) -> bool {
        !self.wait && (self.team_preview || self.is_force_switch() || self.active.is_some())
    }

    /// Check if this is a force switch request
    pub fn is_force_switch(&self) -> bool {
        self.force_switch
            .as_ref()
            .map(|fs| fs.iter().any(|&b| b))
            .unwrap_or(false)
    }

    /// Our side id, if the request carries side info
    pub fn side_id(&self) -> Option<SideId> {
        self.side.as_ref().and_then(|s| s.side_id())
    }
}

/// Information about an active pokemon in battle
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivePokemon {
    /// Available moves
    #[serde(default)]
    pub moves: Vec<MoveSlot>,

    /// Whether the pokemon is trapped
    #[serde(default)]
    pub trapped: bool,

    /// Whether the pokemon might be trapped
    #[serde(default)]
    pub maybe_trapped: bool,
}

/// A move slot on an active pokemon
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveSlot {
    /// Display name of the move
    #[serde(rename = "move")]
    pub name: String,

    /// Move ID (lowercase, no spaces)
    pub id: String,

    /// Current PP
    #[serde(default)]
    pub pp: u32,

    /// Maximum PP
    #[serde(rename = "maxpp", default)]
    pub max_pp: u32,

    /// Target type (normal, self, allySide, etc.)
    #[serde(default)]
    pub target: String,

    /// Whether the move is disabled
    #[serde(default)]
    pub disabled: bool,
}

/// Information about our side
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SideInfo {
    /// Player's display name
    pub name: String,

    /// Player ID (p1, p2)
    pub id: String,

    /// Pokemon on this side, in the server's current order
    #[serde(default)]
    pub pokemon: Vec<SidePokemon>,
}

impl SideInfo {
    pub fn side_id(&self) -> Option<SideId> {
        SideId::parse(&self.id)
    }
}

/// A pokemon on our side
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SidePokemon {
    /// Pokemon identifier (e.g., "p1: Pikachu")
    pub ident: String,

    /// Details string (species, level, gender, shiny)
    pub details: String,

    /// Current condition (HP/MaxHP status)
    pub condition: String,

    /// Whether this pokemon is currently active
    #[serde(default)]
    pub active: bool,

    /// Stats (atk, def, spa, spd, spe)
    #[serde(default)]
    pub stats: PokemonStats,

    /// Known move ids
    #[serde(default)]
    pub moves: Vec<String>,

    /// Base ability
    #[serde(default)]
    pub base_ability: String,

    /// Current ability
    #[serde(default)]
    pub ability: String,

    /// Held item (empty when none)
    #[serde(default)]
    pub item: String,
}

impl SidePokemon {
    /// Check if the pokemon is fainted
    pub fn is_fainted(&self) -> bool {
        self.condition == "0 fnt" || self.condition.ends_with(" fnt")
    }

    pub fn ident(&self) -> Option<PokemonIdent> {
        PokemonIdent::parse(&self.ident)
    }

    pub fn parsed_details(&self) -> PokemonDetails {
        PokemonDetails::parse(&self.details)
    }

    pub fn hp_status(&self) -> Option<HpStatus> {
        HpStatus::parse(&self.condition)
    }

    /// Ability id, preferring the current ability over the base one
    pub fn ability_id(&self) -> String {
        if self.ability.is_empty() {
            to_id(&self.base_ability)
        } else {
            to_id(&self.ability)
        }
    }

    /// Get the species name from details
    pub fn species(&self) -> &str {
        self.details.split(',').next().unwrap_or(&self.details)
    }
}

/// Pokemon stats
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct PokemonStats {
    pub atk: u32,
    pub def: u32,
    pub spa: u32,
    pub spd: u32,
    pub spe: u32,
}
