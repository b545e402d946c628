//! Battle initialization message parsers
//!
//! These messages are sent at the start of a battle to set up the game state.

use super::battle::SideId;
use super::event::BattleEvent;
use anyhow::Result;

/// Parse |player|SIDE|USERNAME|AVATAR|RATING
pub fn parse_player(parts: &[&str]) -> Result<BattleEvent> {
    let side = parts
        .get(2)
        .and_then(|s| SideId::parse(s))
        .ok_or_else(|| anyhow::anyhow!("Missing player"))?;

    let username = parts.get(3).unwrap_or(&"").to_string();

    Ok(BattleEvent::Player { side, username })
}

/// Parse |teamsize|SIDE|NUMBER
pub fn parse_teamsize(parts: &[&str]) -> Result<BattleEvent> {
    let side = parts
        .get(2)
        .and_then(|s| SideId::parse(s))
        .ok_or_else(|| anyhow::anyhow!("Missing player"))?;

    let size = parts
        .get(3)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| anyhow::anyhow!("Missing team size"))?;

    Ok(BattleEvent::TeamSize { side, size })
}

/// Parse |gen|GENNUM
pub fn parse_gen(parts: &[&str]) -> Result<BattleEvent> {
    let generation = parts
        .get(2)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| anyhow::anyhow!("Missing generation"))?;

    Ok(BattleEvent::Gen(generation))
}
