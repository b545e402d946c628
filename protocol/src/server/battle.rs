//! Shared types for battle protocol messages

use crate::ParseError;
use std::fmt;

/// Convert a display name into its protocol id ("Life Orb" -> "lifeorb").
pub fn to_id(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// One of the two sides of a singles battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SideId {
    P1,
    P2,
}

impl SideId {
    pub fn parse(s: &str) -> Option<Self> {
        if s.starts_with("p1") {
            Some(SideId::P1)
        } else if s.starts_with("p2") {
            Some(SideId::P2)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SideId::P1 => "p1",
            SideId::P2 => "p2",
        }
    }

    /// The other side
    pub fn opponent(self) -> Self {
        match self {
            SideId::P1 => SideId::P2,
            SideId::P2 => SideId::P1,
        }
    }

    /// Array index (p1 = 0, p2 = 1)
    pub fn index(self) -> usize {
        match self {
            SideId::P1 => 0,
            SideId::P2 => 1,
        }
    }
}

impl fmt::Display for SideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pokemon identifier in the form "POSITION: NAME" (e.g., "p1a: Pikachu")
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PokemonIdent {
    /// Side that owns this pokemon
    pub side: SideId,
    /// Position letter (a for the active slot, or None if inactive)
    pub position: Option<char>,
    /// Pokemon's name/nickname
    pub name: String,
}

impl PokemonIdent {
    /// Parse a pokemon ID string like "p1a: Pikachu" or "p1: Pikachu"
    pub fn parse(s: &str) -> Option<Self> {
        let (pos_part, name) = s.split_once(": ")?;
        let side = SideId::parse(pos_part)?;
        let position = pos_part.chars().nth(2);

        Some(PokemonIdent {
            side,
            position,
            name: name.to_string(),
        })
    }

    /// Ident referring to an active slot without a name ("p1a")
    pub fn parse_position(s: &str) -> Option<Self> {
        if let Some(ident) = Self::parse(s) {
            return Some(ident);
        }
        let side = SideId::parse(s)?;
        Some(PokemonIdent {
            side,
            position: s.chars().nth(2),
            name: String::new(),
        })
    }
}

impl fmt::Display for PokemonIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(pos) => write!(f, "{}{}: {}", self.side, pos, self.name),
            None => write!(f, "{}: {}", self.side, self.name),
        }
    }
}

/// Pokemon details string (species, level, gender, shiny)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PokemonDetails {
    pub species: String,
    pub level: u8,
    pub gender: Option<char>,
    pub shiny: bool,
}

impl PokemonDetails {
    /// Parse a details string like "Pikachu, L50, M, shiny"
    pub fn parse(s: &str) -> Self {
        let mut details = PokemonDetails {
            level: 100,
            ..Default::default()
        };
        let parts: Vec<&str> = s.split(", ").collect();

        if let Some(species) = parts.first() {
            details.species = species.to_string();
        }

        for part in parts.iter().skip(1) {
            if let Some(level_str) = part.strip_prefix('L') {
                details.level = level_str.parse().unwrap_or(100);
            } else if *part == "M" {
                details.gender = Some('M');
            } else if *part == "F" {
                details.gender = Some('F');
            } else if *part == "shiny" {
                details.shiny = true;
            }
        }

        details
    }
}

/// HP and status condition (e.g., "100/100", "50/100 slp", "0 fnt")
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HpStatus {
    /// Current HP (raw value for our side, percentage for the opponent)
    pub current: u32,
    /// Max HP (0 when fainted, since "0 fnt" carries none)
    pub max: u32,
    /// Status condition (slp, par, brn, psn, tox, frz, fnt)
    pub status: Option<String>,
}

impl HpStatus {
    /// Parse an HP status string like "100/100", "50/100 slp", or "0 fnt"
    pub fn parse(s: &str) -> Option<Self> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        let hp_part = parts.first()?;
        let status = parts.get(1).map(|s| s.to_string());

        if let Some((current_str, max_str)) = hp_part.split_once('/') {
            Some(HpStatus {
                current: current_str.parse().ok()?,
                max: max_str.parse().ok()?,
                status,
            })
        } else {
            Some(HpStatus {
                current: hp_part.parse().ok()?,
                max: 0,
                status,
            })
        }
    }

    pub fn is_fainted(&self) -> bool {
        self.status.as_deref() == Some("fnt") || (self.current == 0 && self.max == 0)
    }
}

/// Boostable stat abbreviation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoostStat {
    Atk,
    Def,
    Spa,
    Spd,
    Spe,
    Accuracy,
    Evasion,
}

impl BoostStat {
    pub const ALL: [BoostStat; 7] = [
        BoostStat::Atk,
        BoostStat::Def,
        BoostStat::Spa,
        BoostStat::Spd,
        BoostStat::Spe,
        BoostStat::Accuracy,
        BoostStat::Evasion,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "atk" => Some(BoostStat::Atk),
            "def" => Some(BoostStat::Def),
            "spa" => Some(BoostStat::Spa),
            "spd" => Some(BoostStat::Spd),
            "spe" => Some(BoostStat::Spe),
            "accuracy" => Some(BoostStat::Accuracy),
            "evasion" => Some(BoostStat::Evasion),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BoostStat::Atk => "atk",
            BoostStat::Def => "def",
            BoostStat::Spa => "spa",
            BoostStat::Spd => "spd",
            BoostStat::Spe => "spe",
            BoostStat::Accuracy => "accuracy",
            BoostStat::Evasion => "evasion",
        }
    }
}

/// Source of an effect, as carried by `[from]` tags and effect fields
/// ("item: Leftovers", "ability: Intimidate", "move: Protect", "psn").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Effect {
    Item(String),
    Ability(String),
    Move(String),
    Other(String),
}

impl Effect {
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if let Some(name) = s.strip_prefix("item: ") {
            Effect::Item(name.to_string())
        } else if let Some(name) = s.strip_prefix("ability: ") {
            Effect::Ability(name.to_string())
        } else if let Some(name) = s.strip_prefix("move: ") {
            Effect::Move(name.to_string())
        } else {
            Effect::Other(s.to_string())
        }
    }

    /// Display name without its kind prefix
    pub fn name(&self) -> &str {
        match self {
            Effect::Item(n) | Effect::Ability(n) | Effect::Move(n) | Effect::Other(n) => n,
        }
    }

    /// Protocol id of the name
    pub fn id(&self) -> String {
        to_id(self.name())
    }

    pub fn item_id(&self) -> Option<String> {
        match self {
            Effect::Item(n) => Some(to_id(n)),
            _ => None,
        }
    }

    pub fn ability_id(&self) -> Option<String> {
        match self {
            Effect::Ability(n) => Some(to_id(n)),
            _ => None,
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::Item(n) => write!(f, "item: {n}"),
            Effect::Ability(n) => write!(f, "ability: {n}"),
            Effect::Move(n) => write!(f, "move: {n}"),
            Effect::Other(n) => f.write_str(n),
        }
    }
}

/// Helper to parse a required PokemonIdent from message parts
pub fn parse_pokemon(parts: &[&str], index: usize) -> Result<PokemonIdent, anyhow::Error> {
    parts
        .get(index)
        .and_then(|s| PokemonIdent::parse(s))
        .ok_or_else(|| ParseError::MissingField("pokemon".to_string()).into())
}

/// Helper to parse an optional PokemonIdent (absent, empty, or a tag)
pub fn parse_optional_pokemon(parts: &[&str], index: usize) -> Option<PokemonIdent> {
    positional(parts, index).and_then(PokemonIdent::parse_position)
}

/// Helper to parse PokemonDetails from message parts
pub fn parse_details(parts: &[&str], index: usize) -> PokemonDetails {
    parts
        .get(index)
        .map(|s| PokemonDetails::parse(s))
        .unwrap_or_default()
}

/// Helper to parse a required HpStatus from message parts
pub fn parse_hp_status(parts: &[&str], index: usize) -> Result<HpStatus, anyhow::Error> {
    parts
        .get(index)
        .and_then(|s| HpStatus::parse(s))
        .ok_or_else(|| ParseError::MissingField("hp status".to_string()).into())
}

/// Positional argument at `index`, unless it is missing, empty, or a `[tag]`
pub fn positional<'a>(parts: &[&'a str], index: usize) -> Option<&'a str> {
    parts
        .get(index)
        .copied()
        .filter(|s| !s.is_empty() && !s.starts_with('['))
}

/// Value of the `[from]` tag, if any
pub fn parse_from(parts: &[&str]) -> Option<Effect> {
    parts
        .iter()
        .find_map(|p| p.strip_prefix("[from]"))
        .map(Effect::parse)
}

/// Value of the `[of]` tag, if any
pub fn parse_of(parts: &[&str]) -> Option<PokemonIdent> {
    parts
        .iter()
        .find_map(|p| p.strip_prefix("[of]"))
        .and_then(|s| PokemonIdent::parse_position(s.trim()))
}

/// Whether a bare flag tag such as `[upkeep]` is present
pub fn has_flag(parts: &[&str], flag: &str) -> bool {
    parts.iter().any(|p| *p == flag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_id() {
        assert_eq!(to_id("Life Orb"), "lifeorb");
        assert_eq!(to_id("U-turn"), "uturn");
        assert_eq!(to_id("King's Rock"), "kingsrock");
    }

    #[test]
    fn test_pokemon_ident() {
        let ident = PokemonIdent::parse("p2a: Mr. Mime").unwrap();
        assert_eq!(ident.side, SideId::P2);
        assert_eq!(ident.position, Some('a'));
        assert_eq!(ident.name, "Mr. Mime");
        assert_eq!(ident.to_string(), "p2a: Mr. Mime");

        let bench = PokemonIdent::parse("p1: Pikachu").unwrap();
        assert_eq!(bench.position, None);

        assert!(PokemonIdent::parse("p3a: Pikachu").is_none());
    }

    #[test]
    fn test_details_default_level() {
        let details = PokemonDetails::parse("Garchomp, F");
        assert_eq!(details.species, "Garchomp");
        assert_eq!(details.level, 100);
        assert_eq!(details.gender, Some('F'));

        let details = PokemonDetails::parse("Pikachu, L83, M, shiny");
        assert_eq!(details.level, 83);
        assert!(details.shiny);
    }

    #[test]
    fn test_hp_status() {
        let hp = HpStatus::parse("50/100 slp").unwrap();
        assert_eq!(hp.current, 50);
        assert_eq!(hp.max, 100);
        assert_eq!(hp.status.as_deref(), Some("slp"));

        let fainted = HpStatus::parse("0 fnt").unwrap();
        assert!(fainted.is_fainted());
    }

    #[test]
    fn test_effect_and_tags() {
        let parts = vec![
            "",
            "-heal",
            "p1a: Snorlax",
            "70/100",
            "[from] item: Leftovers",
            "[of] p2a: Blissey",
        ];
        assert_eq!(
            parse_from(&parts),
            Some(Effect::Item("Leftovers".to_string()))
        );
        assert_eq!(parse_of(&parts).unwrap().name, "Blissey");
        assert_eq!(positional(&parts, 4), None);
        assert_eq!(Effect::parse("psn"), Effect::Other("psn".to_string()));
        assert_eq!(Effect::parse("move: Protect").id(), "protect");
    }
}
