//! Move usage and the events describing a pokemon's own action

use super::{inferences, reveal_ability, resolve};
use crate::error::Result;
use crate::inference::{inference_window, reject_all};
use crate::parser::{BattleParserContext, is_residual};
use crate::state::{BattleState, PokemonKey, normalize_move_id};
use sleuth_protocol::{BattleEvent, Effect, EventKind, PokemonIdent, to_id};
use tracing::debug;

fn move_id(name: &str) -> String {
    normalize_move_id(&to_id(name)).0
}

pub(crate) async fn use_move(
    ctx: &mut BattleParserContext,
    user: &PokemonIdent,
    move_name: &str,
    target: Option<&PokemonIdent>,
    from: Option<&Effect>,
    miss: bool,
) -> Result<()> {
    ctx.consume_expected(EventKind::Move).await?;
    let user = resolve(&ctx.state, user)?;
    let id = move_id(move_name);
    let target = target.and_then(|t| resolve(&ctx.state, t).ok());
    record_move(&mut ctx.state, user, &id, from.is_none())?;

    if miss {
        return Ok(());
    }
    let mut pending = Vec::new();
    if let Some(target) = target {
        pending.extend(inferences::absorb(&ctx.state, user, target, &id)?);
    }
    pending.extend(inferences::post_damage(&ctx.state, user, &id)?);
    if pending.is_empty() {
        return Ok(());
    }

    let mut hit = false;
    let mut observe = |state: &BattleState, event: &BattleEvent| {
        if target.is_some_and(|t| connects(state, event, t)) {
            hit = true;
        }
    };
    let unaccepted = inference_window(ctx, pending, move_window, &mut observe).await?;
    if hit {
        reject_all(&mut ctx.state, unaccepted)
    } else {
        debug!(move_id = %id, open = unaccepted.len(), "move never connected, inferences dropped");
        Ok(())
    }
}

/// Whether `event` shows a move connecting with `target`
fn connects(state: &BattleState, event: &BattleEvent, target: PokemonKey) -> bool {
    let (ident, connected) = match event {
        BattleEvent::Damage {
            ident, from: None, ..
        } => (ident, true),
        BattleEvent::Crit(ident)
        | BattleEvent::SuperEffective(ident)
        | BattleEvent::Resisted(ident) => (ident, true),
        BattleEvent::Activate {
            ident: Some(ident),
            effect,
            ..
        }
        | BattleEvent::VolatileEnd { ident, effect, .. } => (ident, effect.id() == "substitute"),
        _ => return false,
    };
    connected && resolve(state, ident).ok() == Some(target)
}

/// Events that can still belong to the move just used
fn move_window(state: &BattleState, event: &BattleEvent) -> bool {
    !matches!(
        event.kind(),
        EventKind::Move
            | EventKind::Switch
            | EventKind::Drag
            | EventKind::Cant
            | EventKind::Turn
            | EventKind::Upkeep
            | EventKind::Halt
            | EventKind::Request
            | EventKind::Win
            | EventKind::Tie
    ) && !is_residual(event, state.dex())
}

/// Bookkeeping for a move `key` executed. `direct` is false when another
/// effect called the move, which then costs no PP.
fn record_move(state: &mut BattleState, key: PokemonKey, id: &str, direct: bool) -> Result<()> {
    let data = state.dex().move_data(id).cloned();
    let continuing = state.volatile(key).is_some_and(|v| {
        [v.lock_move.kind(), v.rollout.kind(), v.two_turn.kind()]
            .into_iter()
            .any(|kind| kind.is_some_and(|m| m == id))
    });

    if direct && !continuing && id != "struggle" {
        let pressure = data.as_ref().is_some_and(|d| d.targets_foe())
            && state
                .opponent_of(key)
                .and_then(|foe| state.known_ability(foe))
                .and_then(|ability| state.dex().ability(ability))
                .is_some_and(|ability| ability.pressure);
        let cost = if pressure { 2 } else { 1 };
        if data.is_some() {
            state.moveset_mut(key)?.use_move(id, cost)?;
        } else {
            debug!(%key, move_id = id, "move missing from the dex, not tracked");
        }
    }

    let choice_item = state
        .pokemon(key)?
        .known_item()
        .and_then(|item| state.dex().item(item))
        .is_some_and(|item| item.choice_lock);
    let suppressed = state.item_suppressed(key);

    let Some(volatile) = state.volatile_mut(key) else {
        return Ok(());
    };
    volatile.last_move = Some(id.to_string());
    if direct && choice_item && !suppressed && volatile.choice_lock.is_none() {
        volatile.choice_lock = Some(id.to_string());
    }
    let Some(data) = data else {
        return Ok(());
    };
    if data.locked_move {
        continue_or_start(&mut volatile.lock_move, id);
    } else {
        volatile.lock_move.end();
    }
    if data.rollout {
        continue_or_start(&mut volatile.rollout, id);
    } else {
        volatile.rollout.end();
    }
    if volatile.two_turn.kind().is_some_and(|m| m == id) {
        volatile.two_turn.end();
    }
    if let Some(kind) = data.self_switch {
        state.team_mut(key.side).status.self_switch = Some(kind);
    }
    Ok(())
}

fn continue_or_start(status: &mut crate::state::VariableTempStatus<String>, id: &str) {
    if status.kind().is_some_and(|m| m == id) {
        status.tick();
    } else {
        status.start(id.to_string());
    }
}

pub(crate) async fn cant(
    ctx: &mut BattleParserContext,
    ident: &PokemonIdent,
    reason: &Effect,
    move_name: Option<&str>,
) -> Result<()> {
    ctx.consume_expected(EventKind::Cant).await?;
    let state = &mut ctx.state;
    let key = resolve(state, ident)?;
    match reason.id().as_str() {
        "recharge" => {
            if let Some(volatile) = state.volatile_mut(key) {
                volatile.must_recharge = false;
            }
        }
        "slp" => state.pokemon_mut(key)?.major_status.tick(),
        _ => {}
    }
    if let Some(ability) = reason.ability_id() {
        reveal_ability(state, key, &ability)?;
    }
    if let Some(name) = move_name {
        let id = move_id(name);
        if state.dex().move_data(&id).is_some() {
            state.moveset_mut(key)?.reveal(&id)?;
        }
    }
    if let Some(volatile) = state.volatile_mut(key) {
        volatile.inactive();
    }
    Ok(())
}

/// `|-fail|` after a Protect-like move breaks the stall streak
pub(crate) async fn fail(ctx: &mut BattleParserContext, ident: &PokemonIdent) -> Result<()> {
    ctx.consume_expected(EventKind::Fail).await?;
    let state = &mut ctx.state;
    let key = resolve(state, ident)?;
    let stalling = state
        .volatile(key)
        .and_then(|v| v.last_move.as_deref())
        .and_then(|m| state.dex().move_data(m))
        .is_some_and(|m| m.stall);
    if stalling && let Some(volatile) = state.volatile_mut(key) {
        volatile.stall(false);
    }
    Ok(())
}

pub(crate) async fn transform(
    ctx: &mut BattleParserContext,
    source: &PokemonIdent,
    target: &PokemonIdent,
) -> Result<()> {
    ctx.consume_expected(EventKind::Transform).await?;
    let state = &mut ctx.state;
    let source = resolve(state, source)?;
    let target = resolve(state, target)?;

    let mut traits = state.pokemon(target)?.base_traits.snapshot();
    traits.ability = state.ability(target)?.snapshot();
    traits.types = state.types(target)?;
    let moveset = state.moveset(target)?.transform_copy();
    let boosts = state.volatile(target).map(|v| v.boosts).unwrap_or_default();
    if let Some(volatile) = state.volatile_mut(source) {
        volatile.transform(traits, moveset, boosts);
    }
    debug!(%source, %target, "transformed");
    Ok(())
}

pub(crate) async fn prepare(
    ctx: &mut BattleParserContext,
    ident: &PokemonIdent,
    move_name: &str,
) -> Result<()> {
    ctx.consume_expected(EventKind::Prepare).await?;
    let key = resolve(&ctx.state, ident)?;
    if let Some(volatile) = ctx.state.volatile_mut(key) {
        volatile.two_turn.start(move_id(move_name));
    }
    Ok(())
}

pub(crate) async fn must_recharge(ctx: &mut BattleParserContext, ident: &PokemonIdent) -> Result<()> {
    ctx.consume_expected(EventKind::MustRecharge).await?;
    let key = resolve(&ctx.state, ident)?;
    if let Some(volatile) = ctx.state.volatile_mut(key) {
        volatile.must_recharge = true;
    }
    Ok(())
}

/// Effects lasting until the pokemon's next move
pub(crate) async fn single_move(
    ctx: &mut BattleParserContext,
    ident: &PokemonIdent,
    move_name: &str,
) -> Result<()> {
    ctx.consume_expected(EventKind::SingleMove).await?;
    let key = resolve(&ctx.state, ident)?;
    let Some(volatile) = ctx.state.volatile_mut(key) else {
        return Ok(());
    };
    match to_id(move_name).as_str() {
        "destinybond" => volatile.destiny_bond = true,
        "grudge" => volatile.grudge = true,
        "rage" => volatile.rage = true,
        _ => {}
    }
    Ok(())
}

/// Effects lasting until the end of the turn
pub(crate) async fn single_turn(
    ctx: &mut BattleParserContext,
    ident: &PokemonIdent,
    move_name: &str,
) -> Result<()> {
    ctx.consume_expected(EventKind::SingleTurn).await?;
    let key = resolve(&ctx.state, ident)?;
    let Some(volatile) = ctx.state.volatile_mut(key) else {
        return Ok(());
    };
    match to_id(move_name).as_str() {
        "protect" | "detect" | "endure" => volatile.stall(true),
        "roost" => volatile.roost = true,
        "snatch" => volatile.snatch = true,
        "magiccoat" => volatile.magic_coat = true,
        _ => {}
    }
    Ok(())
}
