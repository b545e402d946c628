//! Switches, forme changes and faints

use super::{inferences, resolve};
use crate::error::Result;
use crate::inference::{inference_window, reject_all};
use crate::parser::{BattleParserContext, is_residual};
use crate::state::{BattleState, PokemonKey};
use crate::types::Type;
use sleuth_protocol::{BattleEvent, EventKind, PokemonIdent};
use tracing::debug;

/// Handle a run of consecutive switches, then watch the events that follow
/// for abilities announcing themselves on entry.
pub(crate) async fn switch_batch(ctx: &mut BattleParserContext) -> Result<()> {
    let mut entered: Vec<PokemonKey> = Vec::new();
    while let Some(event) = ctx.try_peek().await? {
        let (ident, details, hp, dragged) = match &*event {
            BattleEvent::Switch { ident, details, hp } => (ident, details, hp, false),
            BattleEvent::Drag { ident, details, hp } => (ident, details, hp, true),
            _ => break,
        };
        ctx.consume()?;

        let state = &mut ctx.state;
        if dragged {
            // Roar and Whirlwind pass nothing over
            state.team_mut(ident.side).status.self_switch = None;
        }
        let key = state.switch_in(ident, details, hp)?;
        debug!(%key, species = %details.species, dragged, "switch in");
        entered.retain(|k| k.side != key.side);
        entered.push(key);
    }

    let mut pending = Vec::new();
    for key in entered {
        pending.extend(inferences::on_start(&ctx.state, key)?);
    }
    if pending.is_empty() {
        return Ok(());
    }
    let unaccepted = inference_window(ctx, pending, entry_window, &mut |_, _| {}).await?;
    reject_all(&mut ctx.state, unaccepted)
}

/// Events that can still belong to a switch-in
fn entry_window(state: &BattleState, event: &BattleEvent) -> bool {
    !matches!(
        event.kind(),
        EventKind::Switch
            | EventKind::Drag
            | EventKind::Move
            | EventKind::Cant
            | EventKind::Turn
            | EventKind::Upkeep
            | EventKind::Halt
            | EventKind::Request
            | EventKind::Win
            | EventKind::Tie
            | EventKind::Player
            | EventKind::TeamSize
            | EventKind::Gen
            | EventKind::Start
    ) && !is_residual(event, state.dex())
}

/// Permanent forme change (e.g. Shaymin-Sky reverting)
pub(crate) async fn details_change(
    ctx: &mut BattleParserContext,
    ident: &PokemonIdent,
    species: &str,
) -> Result<()> {
    ctx.consume_expected(EventKind::DetailsChange).await?;
    change_species(&mut ctx.state, ident, species)
}

/// Temporary forme change (e.g. Castform, Cherrim)
pub(crate) async fn forme_change(
    ctx: &mut BattleParserContext,
    ident: &PokemonIdent,
    species: &str,
) -> Result<()> {
    ctx.consume_expected(EventKind::FormeChange).await?;
    change_species(&mut ctx.state, ident, species)
}

fn change_species(state: &mut BattleState, ident: &PokemonIdent, species: &str) -> Result<()> {
    let key = resolve(state, ident)?;
    let id = sleuth_protocol::to_id(species);
    let types: Option<Vec<Type>> = state.dex().species(&id).map(|data| data.types.clone());
    match types {
        Some(types) => {
            if let Some(volatile) = state.volatile_mut(key) {
                volatile.override_types = Some(types);
            }
        }
        None => debug!(%key, species, "forme change to unknown species"),
    }
    Ok(())
}

pub(crate) async fn faint(ctx: &mut BattleParserContext, ident: &PokemonIdent) -> Result<()> {
    ctx.consume_expected(EventKind::Faint).await?;
    let key = resolve(&ctx.state, ident)?;
    let pokemon = ctx.state.pokemon_mut(key)?;
    let max = pokemon.hp.max();
    pokemon.hp.set(0, max);
    ctx.state.links.clear(key);
    debug!(%key, "fainted");
    Ok(())
}
