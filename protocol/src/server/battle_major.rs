//! Major battle action message parsers
//!
//! These are the primary actions in battle: moves, switches, faints, etc.

use super::battle::{
    Effect, has_flag, parse_details, parse_from, parse_hp_status, parse_optional_pokemon,
    parse_pokemon, positional,
};
use super::event::BattleEvent;
use anyhow::Result;

/// Parse |move|POKEMON|MOVE|TARGET with optional tags
pub fn parse_move(parts: &[&str]) -> Result<BattleEvent> {
    let user = parse_pokemon(parts, 2)?;
    let move_name = positional(parts, 3)
        .ok_or_else(|| anyhow::anyhow!("Missing move"))?
        .to_string();
    let target = parse_optional_pokemon(parts, 4);

    Ok(BattleEvent::Move {
        user,
        move_name,
        target,
        from: parse_from(parts),
        miss: has_flag(parts, "[miss]"),
        still: has_flag(parts, "[still]"),
    })
}

/// Parse |switch|POKEMON|DETAILS|HP STATUS
pub fn parse_switch(parts: &[&str]) -> Result<BattleEvent> {
    let ident = parse_pokemon(parts, 2)?;
    let details = parse_details(parts, 3);
    let hp = parse_hp_status(parts, 4)?;

    Ok(BattleEvent::Switch { ident, details, hp })
}

/// Parse |drag|POKEMON|DETAILS|HP STATUS
pub fn parse_drag(parts: &[&str]) -> Result<BattleEvent> {
    let ident = parse_pokemon(parts, 2)?;
    let details = parse_details(parts, 3);
    let hp = parse_hp_status(parts, 4)?;

    Ok(BattleEvent::Drag { ident, details, hp })
}

/// Parse |detailschange|POKEMON|DETAILS|HP STATUS
pub fn parse_detailschange(parts: &[&str]) -> Result<BattleEvent> {
    let ident = parse_pokemon(parts, 2)?;
    let details = parse_details(parts, 3);

    Ok(BattleEvent::DetailsChange { ident, details })
}

/// Parse |-formechange|POKEMON|SPECIES|HP STATUS
pub fn parse_formechange(parts: &[&str]) -> Result<BattleEvent> {
    let ident = parse_pokemon(parts, 2)?;
    let species = parts.get(3).unwrap_or(&"").to_string();

    Ok(BattleEvent::FormeChange {
        ident,
        species,
        from: parse_from(parts),
    })
}

/// Parse |cant|POKEMON|REASON or |cant|POKEMON|REASON|MOVE
pub fn parse_cant(parts: &[&str]) -> Result<BattleEvent> {
    let ident = parse_pokemon(parts, 2)?;
    let reason = Effect::parse(parts.get(3).unwrap_or(&""));
    let move_name = positional(parts, 4).map(|s| s.to_string());

    Ok(BattleEvent::Cant {
        ident,
        reason,
        move_name,
    })
}

/// Parse |faint|POKEMON
pub fn parse_faint(parts: &[&str]) -> Result<BattleEvent> {
    let ident = parse_pokemon(parts, 2)?;
    Ok(BattleEvent::Faint(ident))
}
