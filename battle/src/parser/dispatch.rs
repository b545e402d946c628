use super::handlers::{effects, field, moves, progress, residual, switching};
use super::{BattleParser, BattleParserContext, ParserFuture, TurnPhase};
use crate::dex::Dex;
use crate::error::{BattleError, Result};
use sleuth_protocol::{BattleEvent, Effect, EventKind, to_id};
use std::sync::Arc;
use tracing::{debug, error, trace};

/// Effects whose damage or healing only happens at the end of a turn
const RESIDUAL_EFFECTS: &[&str] = &[
    "psn",
    "tox",
    "brn",
    "sandstorm",
    "hail",
    "leechseed",
    "nightmare",
    "curse",
    "ingrain",
    "aquaring",
    "wish",
    "bind",
    "wrap",
    "firespin",
    "clamp",
    "whirlpool",
    "sandtomb",
    "magmastorm",
];

/// Abilities that heal or hurt their holder at the end of a turn
const RESIDUAL_ABILITIES: &[&str] = &["raindish", "icebody", "poisonheal", "solarpower"];

/// Whether `event` belongs to the end-of-turn residual phase
pub fn is_residual(event: &BattleEvent, dex: &Dex) -> bool {
    match event {
        BattleEvent::Weather {
            weather, upkeep, ..
        } => *upkeep || weather.is_none(),
        BattleEvent::Damage { from, .. } | BattleEvent::Heal { from, .. } => {
            from.as_ref().is_some_and(|effect| residual_effect(effect, dex))
        }
        BattleEvent::Status {
            from: Some(Effect::Item(_)),
            ..
        } => true,
        BattleEvent::Boost {
            from: Some(effect), ..
        } => effect
            .ability_id()
            .and_then(|id| dex.ability(&id))
            .is_some_and(|ability| ability.residual.is_some()),
        // Rapid Spin and friends carry a [from]; plain expiry does not
        BattleEvent::SideEnd { from: None, .. } => true,
        _ => false,
    }
}

fn residual_effect(effect: &Effect, dex: &Dex) -> bool {
    match effect {
        Effect::Item(_) => effect
            .item_id()
            .and_then(|id| dex.item(&id))
            .is_some_and(|item| item.residual.is_some()),
        Effect::Ability(name) => RESIDUAL_ABILITIES.contains(&to_id(name).as_str()),
        Effect::Move(name) | Effect::Other(name) => RESIDUAL_EFFECTS.contains(&to_id(name).as_str()),
    }
}

/// Route the next event to its handler
pub fn dispatch(ctx: &mut BattleParserContext) -> ParserFuture<'_, ()> {
    Box::pin(async move {
        let event = ctx.peek().await?;
        trace!(kind = %event.kind(), "dispatching");

        if ctx.phase == TurnPhase::Actions && is_residual(&event, ctx.state.dex()) {
            return residual::residual_window(ctx).await;
        }

        match &*event {
            BattleEvent::Player { side, username } => progress::player(ctx, *side, username).await,
            BattleEvent::TeamSize { side, size } => progress::team_size(ctx, *side, *size).await,
            BattleEvent::Gen(generation) => progress::generation(ctx, *generation).await,
            BattleEvent::Start => progress::start(ctx).await,
            BattleEvent::Request(request) => progress::request(ctx, request).await,
            BattleEvent::Turn(turn) => progress::turn(ctx, *turn).await,
            BattleEvent::Upkeep => residual::upkeep(ctx).await,
            BattleEvent::Win(winner) => progress::win(ctx, Some(winner.as_str())).await,
            BattleEvent::Tie => progress::win(ctx, None).await,
            BattleEvent::Halt(reason) => progress::halt(ctx, *reason).await,

            BattleEvent::Move {
                user,
                move_name,
                target,
                from,
                miss,
                ..
            } => {
                moves::use_move(ctx, user, move_name, target.as_ref(), from.as_ref(), *miss).await
            }
            BattleEvent::Switch { .. } | BattleEvent::Drag { .. } => {
                switching::switch_batch(ctx).await
            }
            BattleEvent::DetailsChange { ident, details } => {
                switching::details_change(ctx, ident, &details.species).await
            }
            BattleEvent::FormeChange { ident, species, .. } => {
                switching::forme_change(ctx, ident, species).await
            }
            BattleEvent::Cant {
                ident,
                reason,
                move_name,
            } => moves::cant(ctx, ident, reason, move_name.as_deref()).await,
            BattleEvent::Faint(ident) => switching::faint(ctx, ident).await,

            BattleEvent::Fail { ident, .. } => moves::fail(ctx, ident).await,
            BattleEvent::Block { ident, effect, .. } => {
                effects::reveal_only(ctx, EventKind::Block, ident, Some(effect)).await
            }
            BattleEvent::Damage {
                ident,
                hp,
                from,
                of,
            } => {
                effects::hp_change(ctx, EventKind::Damage, ident, hp, from.as_ref(), of.as_ref())
                    .await
            }
            BattleEvent::Heal {
                ident,
                hp,
                from,
                of,
            } => {
                effects::hp_change(ctx, EventKind::Heal, ident, hp, from.as_ref(), of.as_ref())
                    .await
            }
            BattleEvent::SetHp { ident, hp, from } => {
                effects::hp_change(ctx, EventKind::SetHp, ident, hp, from.as_ref(), None).await
            }
            BattleEvent::Status {
                ident,
                status,
                from,
                of,
            } => effects::status(ctx, ident, status, from.as_ref(), of.as_ref()).await,
            BattleEvent::CureStatus { ident, from, .. } => {
                effects::cure_status(ctx, ident, from.as_ref()).await
            }
            BattleEvent::CureTeam { ident, .. } => effects::cure_team(ctx, ident).await,
            BattleEvent::Boost {
                ident,
                stat,
                amount,
                from,
            } => effects::boost(ctx, EventKind::Boost, ident, *stat, *amount, from.as_ref()).await,
            BattleEvent::Unboost {
                ident,
                stat,
                amount,
                from,
            } => {
                effects::boost(ctx, EventKind::Unboost, ident, *stat, -*amount, from.as_ref())
                    .await
            }
            BattleEvent::SetBoost {
                ident,
                stat,
                amount,
                from,
            } => effects::set_boost(ctx, ident, *stat, *amount, from.as_ref()).await,
            BattleEvent::SwapBoost {
                source,
                target,
                stats,
            } => effects::swap_boost(ctx, source, target, stats).await,
            BattleEvent::CopyBoost { source, target } => {
                effects::copy_boost(ctx, source, target).await
            }
            BattleEvent::InvertBoost(ident)
            | BattleEvent::ClearBoost(ident)
            | BattleEvent::ClearPositiveBoost(ident)
            | BattleEvent::ClearNegativeBoost(ident) => {
                effects::reset_boosts(ctx, event.kind(), Some(ident)).await
            }
            BattleEvent::ClearAllBoost => {
                effects::reset_boosts(ctx, EventKind::ClearAllBoost, None).await
            }

            BattleEvent::Weather {
                weather,
                from,
                of,
                upkeep,
            } => field::weather(ctx, weather.as_deref(), from.as_ref(), of.as_ref(), *upkeep).await,
            BattleEvent::FieldStart { effect, .. } => field::field_start(ctx, effect).await,
            BattleEvent::FieldEnd { effect } => field::field_end(ctx, effect).await,
            BattleEvent::SideStart { side, condition } => {
                field::side_start(ctx, *side, condition).await
            }
            BattleEvent::SideEnd {
                side, condition, ..
            } => field::side_end(ctx, *side, condition).await,

            BattleEvent::VolatileStart {
                ident,
                effect,
                detail,
                from,
                of,
                ..
            } => {
                effects::volatile_start(
                    ctx,
                    ident,
                    effect,
                    detail.as_deref(),
                    from.as_ref(),
                    of.as_ref(),
                )
                .await
            }
            BattleEvent::VolatileEnd { ident, effect, .. } => {
                effects::volatile_end(ctx, ident, effect).await
            }
            BattleEvent::Immune { ident, from, .. } => {
                effects::reveal_only(ctx, EventKind::Immune, ident, from.as_ref()).await
            }
            BattleEvent::Item {
                ident,
                item,
                from,
                of,
            } => effects::item(ctx, ident, item, from.as_ref(), of.as_ref()).await,
            BattleEvent::EndItem { ident, item, .. } => effects::end_item(ctx, ident, item).await,
            BattleEvent::Ability {
                ident,
                ability,
                from,
                of,
            } => effects::ability(ctx, ident, ability, from.as_ref(), of.as_ref()).await,
            BattleEvent::EndAbility { ident, .. } => effects::end_ability(ctx, ident).await,
            BattleEvent::Transform { source, target } => {
                moves::transform(ctx, source, target).await
            }
            BattleEvent::Activate { ident, effect, .. } => {
                effects::activate(ctx, ident.as_ref(), effect).await
            }
            BattleEvent::Prepare {
                ident, move_name, ..
            } => moves::prepare(ctx, ident, move_name).await,
            BattleEvent::MustRecharge(ident) => moves::must_recharge(ctx, ident).await,
            BattleEvent::SingleMove { ident, move_name } => {
                moves::single_move(ctx, ident, move_name).await
            }
            BattleEvent::SingleTurn { ident, move_name } => {
                moves::single_turn(ctx, ident, move_name).await
            }

            BattleEvent::NoTarget(_)
            | BattleEvent::Miss { .. }
            | BattleEvent::Crit(_)
            | BattleEvent::SuperEffective(_)
            | BattleEvent::Resisted(_)
            | BattleEvent::FieldActivate(_)
            | BattleEvent::Hint(_)
            | BattleEvent::Center
            | BattleEvent::Message(_)
            | BattleEvent::Nothing
            | BattleEvent::HitCount { .. }
            | BattleEvent::Ohko => effects::ignore(ctx, event.kind()).await,
        }
    })
}

/// Keep running `parser` while the next event passes `filter`. Stops once
/// an iteration leaves the same event on top of the stream.
pub async fn event_loop(
    ctx: &mut BattleParserContext,
    parser: BattleParser,
    filter: fn(&BattleEvent) -> bool,
) -> Result<()> {
    loop {
        if ctx.state.game_over {
            return Ok(());
        }
        let Some(before) = ctx.try_peek().await? else {
            return Ok(());
        };
        if !filter(&before) {
            return Ok(());
        }

        parser(ctx).await?;
        ctx.state.settle_inferences()?;

        if ctx.state.game_over {
            return Ok(());
        }
        match ctx.try_peek().await? {
            Some(after) if Arc::ptr_eq(&before, &after) => return Ok(()),
            Some(_) => {}
            None => return Ok(()),
        }
    }
}

/// [`event_loop`] without a filter
pub async fn base_event_loop(ctx: &mut BattleParserContext, parser: BattleParser) -> Result<()> {
    event_loop(ctx, parser, |_| true).await
}

/// Parse a whole battle. The outcome also reaches the feeder: success
/// closes the stream, failure fails it with the same error.
pub async fn run_battle(ctx: &mut BattleParserContext) -> Result<()> {
    let result = drive(ctx).await;
    match &result {
        Ok(()) => {
            debug!(winner = ?ctx.state.winner, turn = ctx.state.turn, "battle parsed");
            ctx.close();
        }
        Err(e) => {
            error!(error = %e, turn = ctx.state.turn, "battle parser failed");
            ctx.fail(e.clone());
        }
    }
    result
}

async fn drive(ctx: &mut BattleParserContext) -> Result<()> {
    base_event_loop(ctx, dispatch).await?;
    if ctx.state.game_over {
        return Ok(());
    }
    match ctx.try_peek().await? {
        None => Ok(()),
        Some(event) => Err(BattleError::StuckParser(event.kind().to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::testing::{Harness, event};

    #[test]
    fn test_residual_markers() {
        let dex = Dex::gen4().unwrap();
        assert!(is_residual(&event("|-heal|p2a: Snorlax|56/100|[from] item: Leftovers"), &dex));
        assert!(is_residual(&event("|-weather|Sandstorm|[upkeep]"), &dex));
        assert!(is_residual(&event("|-weather|none"), &dex));
        assert!(is_residual(&event("|-damage|p1a: Heatran|88/100|[from] psn"), &dex));
        assert!(is_residual(&event("|-sideend|p1: me|Reflect"), &dex));
        assert!(is_residual(
            &event("|-boost|p2a: Ninjask|spe|1|[from] ability: Speed Boost"),
            &dex
        ));
        assert!(!is_residual(&event("|-damage|p2a: Snorlax|56/100|[from] item: Life Orb"), &dex));
        assert!(!is_residual(&event("|-damage|p2a: Snorlax|56/100"), &dex));
        assert!(!is_residual(
            &event("|-sideend|p1: me|Spikes|[from] move: Rapid Spin|[of] p1a: Starmie"),
            &dex
        ));
    }

    #[tokio::test]
    async fn test_game_over_ends_the_parser() {
        let harness = Harness::start(vec![]);
        harness
            .feed(&[
                "|player|p1|me|1",
                "|player|p2|them|2",
                "|win|them",
                "#halt gameover",
            ])
            .await
            .unwrap();
        let (ctx, result) = harness.finish().await;
        result.unwrap();
        assert!(ctx.state.game_over);
        assert_eq!(ctx.state.winner.as_deref(), Some("them"));
    }

    #[tokio::test]
    async fn test_parser_error_reaches_feeder() {
        let harness = Harness::start(vec![]);
        let fed = harness.feed(&["|move|p2a: Nobody|Tackle|p1a: Someone"]).await;
        assert!(matches!(fed, Err(BattleError::UnknownPokemon(_))));
        let (_, result) = harness.finish().await;
        assert!(matches!(result, Err(BattleError::UnknownPokemon(_))));
    }
}
