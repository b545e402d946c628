use super::{Hp, MajorStatusCounter, Move, Moveset, PokemonTraits, PossibilityClass, StatTable};
use crate::dex::Dex;
use crate::error::{BattleError, Result};
use crate::types::{MajorStatus, Type};
use sleuth_protocol::{PokemonDetails, SidePokemon, to_id};

/// Item id meaning "holds nothing"
pub const NO_ITEM: &str = "none";

/// One team member and everything believed about it
#[derive(Debug)]
pub struct Pokemon {
    pub nickname: String,
    pub gender: Option<char>,
    pub base_traits: PokemonTraits,
    pub item: PossibilityClass<String>,
    /// Last item it lost, for Recycle-style effects
    pub last_item: Option<String>,
    pub hp_type: PossibilityClass<Type>,
    pub moveset: Moveset,
    pub hp: Hp,
    pub major_status: MajorStatusCounter,
}

/// Species record id for a details species, falling back to the base forme
fn resolve_species(dex: &Dex, species: &str) -> Result<String> {
    let id = to_id(species);
    if dex.species(&id).is_some() {
        return Ok(id);
    }
    let base = species.split('-').next().map(to_id).unwrap_or_default();
    dex.require_species(&base)?;
    Ok(base)
}

/// Every item a hidden pokemon could hold, including none at all
fn item_universe(dex: &Dex) -> PossibilityClass<String> {
    let items = dex.item_ids().cloned().chain([NO_ITEM.to_string()]);
    PossibilityClass::new("item", items)
}

/// Split a request move id like "hiddenpowerfire60" into the dex id and,
/// for Hidden Power, its type
pub fn normalize_move_id(id: &str) -> (String, Option<Type>) {
    if let Some(rest) = id.strip_prefix("hiddenpower") {
        let type_name: String = rest.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
        return ("hiddenpower".to_string(), Type::from_protocol(&type_name));
    }
    if id.starts_with("return") {
        return ("return".to_string(), None);
    }
    (id.to_string(), None)
}

impl Pokemon {
    /// An opposing pokemon, seen only through its details line
    pub fn hidden(dex: &Dex, nickname: &str, details: &PokemonDetails) -> Result<Self> {
        let species = resolve_species(dex, &details.species)?;
        let traits = PokemonTraits::from_species(dex, &species, details.level)?;
        let pool = dex
            .movepool(&species)
            .into_iter()
            .filter_map(|id| dex.move_data(&id).map(|data| (id.clone(), data.max_pp())))
            .collect::<Vec<_>>();

        Ok(Pokemon {
            nickname: nickname.to_string(),
            gender: details.gender,
            base_traits: traits,
            item: item_universe(dex),
            last_item: None,
            hp_type: PossibilityClass::new("hidden power type", Type::hidden_power_types()),
            moveset: Moveset::new(pool, Moveset::MAX_SIZE),
            hp: Hp::percent(),
            major_status: MajorStatusCounter::default(),
        })
    }

    /// One of our own pokemon, fully described by a request
    pub fn known(dex: &Dex, data: &SidePokemon) -> Result<Self> {
        let details = data.parsed_details();
        let ident = data
            .ident()
            .ok_or_else(|| BattleError::UnknownPokemon(data.ident.clone()))?;
        let species = resolve_species(dex, &details.species)?;
        let traits = PokemonTraits::from_species(dex, &species, details.level)?;

        let mut pokemon = Pokemon {
            nickname: ident.name,
            gender: details.gender,
            base_traits: traits,
            item: item_universe(dex),
            last_item: None,
            hp_type: PossibilityClass::new("hidden power type", Type::hidden_power_types()),
            moveset: Moveset::known(Vec::new()),
            hp: Hp::exact(0, 0),
            major_status: MajorStatusCounter::default(),
        };
        pokemon.update_from_request(dex, data)?;
        Ok(pokemon)
    }

    /// Overwrite everything a request states authoritatively
    pub fn update_from_request(&mut self, dex: &Dex, data: &SidePokemon) -> Result<()> {
        let ability = data.ability_id();
        if !ability.is_empty() {
            self.base_traits.ability = PossibilityClass::definite("ability", ability);
        }
        let item = if data.item.is_empty() {
            NO_ITEM.to_string()
        } else {
            to_id(&data.item)
        };
        self.item = PossibilityClass::definite("item", item);

        if let Some(status) = data.hp_status() {
            if status.is_fainted() {
                self.hp.set(0, self.hp.max());
            } else {
                self.hp = Hp::exact(status.current, status.max);
            }
            match status.status.as_deref().and_then(MajorStatus::from_protocol) {
                Some(major) if !self.major_status.is(major) => self.major_status.afflict(major),
                Some(_) => {}
                None => self.major_status.cure(),
            }
        }
        self.base_traits.stats = StatTable::exact(self.hp.max(), &data.stats, self.base_traits.level());

        let mut moves = Vec::new();
        for id in &data.moves {
            let (id, hp_type) = normalize_move_id(id);
            if let Some(t) = hp_type {
                self.hp_type = PossibilityClass::definite("hidden power type", t);
            }
            // Keep PP already tracked for this move
            let slot = match self.moveset.get(&id) {
                Some(existing) => existing.clone(),
                None => Move::new(&id, dex.require_move(&id)?.max_pp()),
            };
            moves.push(slot);
        }
        self.moveset.set_known(moves);
        Ok(())
    }

    pub fn species(&self) -> &str {
        &self.base_traits.species
    }

    pub fn is_fainted(&self) -> bool {
        self.hp.is_fainted()
    }

    /// The item is revealed to be `id`
    pub fn reveal_item(&mut self, id: &str) -> Result<()> {
        self.item.narrow([id.to_string()])
    }

    /// The item was consumed or removed
    pub fn lose_item(&mut self, id: &str) -> Result<()> {
        self.reveal_item(id)?;
        self.last_item = Some(id.to_string());
        self.item = PossibilityClass::definite("item", NO_ITEM.to_string());
        Ok(())
    }

    /// A new item was handed over (Trick, Thief)
    pub fn receive_item(&mut self, id: &str) {
        self.item = PossibilityClass::definite("item", id.to_string());
    }

    /// Definite item id, if known and not "none"
    pub fn known_item(&self) -> Option<&str> {
        self.item
            .definite_value()
            .map(String::as_str)
            .filter(|id| *id != NO_ITEM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dex() -> std::sync::Arc<Dex> {
        Dex::gen4().unwrap()
    }

    #[test]
    fn test_hidden_pokemon_universe() {
        let dex = dex();
        let details = PokemonDetails::parse("Gengar, L84, M");
        let gengar = Pokemon::hidden(&dex, "Gengar", &details).unwrap();
        assert_eq!(gengar.species(), "gengar");
        assert_eq!(gengar.base_traits.level(), 84);
        assert!(gengar.base_traits.ability.is_definite());
        assert!(gengar.item.len() > 10);
        assert_eq!(gengar.hp_type.len(), 16);
        assert_eq!(gengar.moveset.unknown_slots(), 4);
    }

    #[test]
    fn test_lose_item_reveals_then_empties() {
        let dex = dex();
        let details = PokemonDetails::parse("Breloom, L82");
        let mut breloom = Pokemon::hidden(&dex, "Breloom", &details).unwrap();
        breloom.lose_item("lumberry").unwrap();
        assert_eq!(breloom.last_item.as_deref(), Some("lumberry"));
        assert_eq!(breloom.known_item(), None);
        assert!(breloom.item.is_set(&NO_ITEM.to_string()));
    }

    #[test]
    fn test_losing_a_ruled_out_item_fails() {
        let dex = dex();
        let details = PokemonDetails::parse("Breloom, L82");
        let mut breloom = Pokemon::hidden(&dex, "Breloom", &details).unwrap();
        breloom.item.remove(["lumberry".to_string()]).unwrap();
        assert!(matches!(
            breloom.lose_item("lumberry"),
            Err(BattleError::OverNarrowed { .. })
        ));
        assert_eq!(breloom.last_item, None);
    }

    #[test]
    fn test_normalize_hidden_power() {
        assert_eq!(
            normalize_move_id("hiddenpowerfire60"),
            ("hiddenpower".to_string(), Some(Type::Fire))
        );
        assert_eq!(normalize_move_id("surf"), ("surf".to_string(), None));
    }

    #[test]
    fn test_known_pokemon_from_request() {
        let dex = dex();
        let data: SidePokemon = serde_json::from_str(
            r#"{"ident":"p1: Starmie","details":"Starmie, L80","condition":"211/211",
                "active":true,"stats":{"atk":180,"def":200,"spa":236,"spd":200,"spe":260},
                "moves":["surf","thunderbolt","icebeam","recover"],
                "baseAbility":"naturalcure","item":"leftovers"}"#,
        )
        .unwrap();
        let starmie = Pokemon::known(&dex, &data).unwrap();
        assert_eq!(starmie.known_item(), Some("leftovers"));
        assert_eq!(starmie.hp.current(), 211);
        assert!(starmie.hp.is_exact());
        assert_eq!(starmie.moveset.size(), 4);
        assert_eq!(starmie.moveset.get("recover").unwrap().max_pp(), 16);
        assert_eq!(
            starmie.base_traits.ability.definite_value().map(String::as_str),
            Some("naturalcure")
        );
        assert!(starmie.base_traits.stats.spe.is_exact());
    }
}
