//! Weather, field-wide and side conditions

use super::{resolve, reveal_effect};
use crate::error::Result;
use crate::parser::BattleParserContext;
use crate::state::{BattleState, PokemonKey};
use crate::types::Weather;
use sleuth_protocol::{Effect, EventKind, PokemonIdent, SideId};
use tracing::debug;

fn weather_move(weather: Weather) -> &'static str {
    match weather {
        Weather::Sun => "sunnyday",
        Weather::Rain => "raindance",
        Weather::Sand => "sandstorm",
        Weather::Hail => "hail",
    }
}

/// The active pokemon whose last move summoned `weather`
fn weather_user(state: &BattleState, weather: Weather) -> Option<PokemonKey> {
    [SideId::P1, SideId::P2]
        .into_iter()
        .filter_map(|side| state.active_key(side))
        .find(|&key| {
            state
                .volatile(key)
                .and_then(|volatile| volatile.last_move.as_deref())
                == Some(weather_move(weather))
        })
}

pub(crate) async fn weather(
    ctx: &mut BattleParserContext,
    weather: Option<&str>,
    from: Option<&Effect>,
    of: Option<&PokemonIdent>,
    upkeep: bool,
) -> Result<()> {
    ctx.consume_expected(EventKind::Weather).await?;
    let state = &mut ctx.state;

    if upkeep {
        if let Some(inference) = state.room.weather_upkeep() {
            state.apply_duration_inference(inference)?;
        }
        return Ok(());
    }

    let Some(name) = weather else {
        if let Some(inference) = state.room.weather.end() {
            state.apply_duration_inference(inference)?;
        }
        return Ok(());
    };
    let Some(kind) = Weather::from_protocol(name) else {
        debug!(weather = name, "untracked weather");
        return Ok(());
    };

    match from {
        Some(effect @ Effect::Ability(_)) => {
            // Weather abilities last until replaced
            let holder = of.map(|ident| resolve(state, ident)).transpose()?;
            if let Some(holder) = holder {
                reveal_effect(state, holder, effect)?;
            }
            state.room.weather.start(kind, holder, None, true);
        }
        _ => {
            let source = weather_user(state, kind);
            let extender = state
                .dex()
                .items_where(|item| item.extends_weather(kind))
                .into_iter()
                .next();
            debug!(weather = %kind, ?source, "weather started");
            state.room.weather.start(kind, source, extender, false);
        }
    }
    Ok(())
}

pub(crate) async fn field_start(ctx: &mut BattleParserContext, effect: &Effect) -> Result<()> {
    ctx.consume_expected(EventKind::FieldStart).await?;
    if !ctx.state.room.start(effect.name()) {
        debug!(%effect, "untracked field condition");
    }
    Ok(())
}

pub(crate) async fn field_end(ctx: &mut BattleParserContext, effect: &Effect) -> Result<()> {
    ctx.consume_expected(EventKind::FieldEnd).await?;
    ctx.state.room.end(effect.name());
    Ok(())
}

pub(crate) async fn side_start(
    ctx: &mut BattleParserContext,
    side: SideId,
    condition: &Effect,
) -> Result<()> {
    ctx.consume_expected(EventKind::SideStart).await?;
    let state = &mut ctx.state;
    let id = condition.id();
    if id == "reflect" || id == "lightscreen" {
        let source = state.active_key(side);
        let extender = state
            .dex()
            .items_where(|item| item.extends_screens())
            .into_iter()
            .next();
        let status = &mut state.team_mut(side).status;
        let screen = if id == "reflect" {
            &mut status.reflect
        } else {
            &mut status.light_screen
        };
        screen.start((), source, extender, false);
        return Ok(());
    }
    if !state.team_mut(side).status.start(condition.name()) {
        debug!(%side, %condition, "untracked side condition");
    }
    Ok(())
}

pub(crate) async fn side_end(
    ctx: &mut BattleParserContext,
    side: SideId,
    condition: &Effect,
) -> Result<()> {
    ctx.consume_expected(EventKind::SideEnd).await?;
    let state = &mut ctx.state;
    if let Some(inference) = state.team_mut(side).status.end(condition.name()) {
        state.apply_duration_inference(inference)?;
    }
    Ok(())
}
