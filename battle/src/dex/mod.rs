//! Static generation 4 game data: species, moves, items and abilities.
//!
//! Records are keyed by protocol id (`to_id` of the display name). The
//! default table is embedded at compile time and parsed on first use;
//! [`Dex::from_json`] accepts any table with the same layout.

mod data;

pub use data::{
    Absorb, AbsorbEffect, AbilityData, BaseStats, ItemData, ItemExtension, MoveCategory,
    MoveData, OnStart, PostDamageItem, ResidualAbility, ResidualItem, SelfSwitchKind,
    SpeciesData, TrapKind,
};

use crate::error::{BattleError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

const GEN4_JSON: &str = include_str!("../../data/gen4.json");

static GEN4: OnceLock<std::result::Result<Arc<Dex>, String>> = OnceLock::new();

/// Lookup tables for static game data
#[derive(Debug, Clone, Deserialize)]
pub struct Dex {
    species: HashMap<String, SpeciesData>,
    moves: HashMap<String, MoveData>,
    items: HashMap<String, ItemData>,
    abilities: HashMap<String, AbilityData>,
}

impl Dex {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// The embedded generation 4 table, shared between battles
    pub fn gen4() -> Result<Arc<Dex>> {
        GEN4.get_or_init(|| {
            Self::from_json(GEN4_JSON)
                .map(Arc::new)
                .map_err(|e| e.to_string())
        })
        .clone()
        .map_err(|e| BattleError::UnknownData {
            kind: "dex",
            name: e,
        })
    }

    pub fn species(&self, id: &str) -> Option<&SpeciesData> {
        self.species.get(id)
    }

    pub fn move_data(&self, id: &str) -> Option<&MoveData> {
        self.moves.get(id)
    }

    pub fn item(&self, id: &str) -> Option<&ItemData> {
        self.items.get(id)
    }

    pub fn ability(&self, id: &str) -> Option<&AbilityData> {
        self.abilities.get(id)
    }

    /// Like [`Dex::species`], but unknown ids are an error
    pub fn require_species(&self, id: &str) -> Result<&SpeciesData> {
        self.species(id).ok_or_else(|| BattleError::UnknownData {
            kind: "species",
            name: id.to_string(),
        })
    }

    pub fn require_move(&self, id: &str) -> Result<&MoveData> {
        self.move_data(id).ok_or_else(|| BattleError::UnknownData {
            kind: "move",
            name: id.to_string(),
        })
    }

    pub fn item_ids(&self) -> impl Iterator<Item = &String> {
        self.items.keys()
    }

    pub fn move_ids(&self) -> impl Iterator<Item = &String> {
        self.moves.keys()
    }

    /// Ids of every ability matching `pred`
    pub fn abilities_where(&self, pred: impl Fn(&AbilityData) -> bool) -> Vec<String> {
        self.abilities
            .iter()
            .filter(|(_, data)| pred(data))
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Ids of every item matching `pred`
    pub fn items_where(&self, pred: impl Fn(&ItemData) -> bool) -> Vec<String> {
        self.items
            .iter()
            .filter(|(_, data)| pred(data))
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Candidate moves for a species: its movepool, or every known move
    pub fn movepool(&self, species: &str) -> Vec<String> {
        match self.species(species).and_then(|s| s.movepool.as_ref()) {
            Some(pool) => pool.clone(),
            None => self.moves.keys().cloned().collect(),
        }
    }
}
