//! Battle progress message parsers
//!
//! These messages track the flow and state of a battle.

use super::event::BattleEvent;
use super::request::BattleRequest;
use anyhow::Result;

/// Parse |request|REQUEST (JSON). An empty body carries no request.
pub fn parse_request(parts: &[&str]) -> Result<Option<BattleEvent>> {
    // JSON may itself contain '|' characters
    let json_str = parts.get(2..).map(|p| p.join("|")).unwrap_or_default();
    if json_str.trim().is_empty() {
        return Ok(None);
    }
    let request: BattleRequest = serde_json::from_str(&json_str)?;
    Ok(Some(BattleEvent::Request(Box::new(request))))
}

/// Parse |upkeep
pub fn parse_upkeep(_parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::Upkeep)
}

/// Parse |turn|NUMBER
pub fn parse_turn(parts: &[&str]) -> Result<BattleEvent> {
    let turn = parts
        .get(2)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| anyhow::anyhow!("Missing turn number"))?;

    Ok(BattleEvent::Turn(turn))
}

/// Parse |win|USER
pub fn parse_win(parts: &[&str]) -> Result<BattleEvent> {
    let user = parts.get(2).unwrap_or(&"").to_string();
    Ok(BattleEvent::Win(user))
}

/// Parse |tie
pub fn parse_tie(_parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::Tie)
}
