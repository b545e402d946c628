use super::{PossibilityClass, StatTable};
use crate::dex::Dex;
use crate::error::Result;
use crate::types::Type;

/// Species-derived traits: what a transform copies
#[derive(Debug)]
pub struct PokemonTraits {
    pub species: String,
    pub types: Vec<Type>,
    pub ability: PossibilityClass<String>,
    pub stats: StatTable,
}

impl PokemonTraits {
    /// Traits of an unseen pokemon: any of the species' abilities, stat ranges
    pub fn from_species(dex: &Dex, species: &str, level: u8) -> Result<Self> {
        let data = dex.require_species(species)?;
        Ok(PokemonTraits {
            species: species.to_string(),
            types: data.types.clone(),
            ability: PossibilityClass::new("ability", data.abilities.iter().cloned()),
            stats: StatTable::from_base(&data.base_stats, level),
        })
    }

    pub fn level(&self) -> u8 {
        self.stats.level
    }

    pub fn has_type(&self, t: Type) -> bool {
        self.types.contains(&t)
    }

    /// Copy without ability listeners
    pub fn snapshot(&self) -> Self {
        PokemonTraits {
            species: self.species.clone(),
            types: self.types.clone(),
            ability: self.ability.snapshot(),
            stats: self.stats,
        }
    }
}
