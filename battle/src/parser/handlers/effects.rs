//! Minor effects on a single pokemon: HP, status, boosts, volatiles, and
//! revealed items and abilities.

use super::{resolve, reveal_ability, reveal_effect, reveal_item};
use crate::error::Result;
use crate::parser::BattleParserContext;
use crate::state::{BattleState, LinkKind, PokemonKey};
use crate::types::{MajorStatus, Type};
use sleuth_protocol::{BoostStat, Effect, EventKind, HpStatus, PokemonIdent, SideId, to_id};
use tracing::{debug, trace};

/// Partial-trapping moves, which announce themselves through `|-activate|`
const PARTIAL_TRAPS: &[&str] = &[
    "bind",
    "wrap",
    "firespin",
    "clamp",
    "whirlpool",
    "sandtomb",
    "magmastorm",
];

/// Item transfer moves: the item shown is new to the holder
const ITEM_TRANSFERS: &[&str] = &["trick", "switcheroo", "thief", "covet"];

/// Events with nothing to track
pub(crate) async fn ignore(ctx: &mut BattleParserContext, kind: EventKind) -> Result<()> {
    ctx.consume_expected(kind).await?;
    trace!(%kind, "ignored");
    Ok(())
}

/// `|-damage|`, `|-heal|` or `|-sethp|`
pub(crate) async fn hp_change(
    ctx: &mut BattleParserContext,
    kind: EventKind,
    ident: &PokemonIdent,
    hp: &HpStatus,
    from: Option<&Effect>,
    of: Option<&PokemonIdent>,
) -> Result<()> {
    ctx.consume_expected(kind).await?;
    let state = &mut ctx.state;
    let key = resolve(state, ident)?;
    let pokemon = state.pokemon_mut(key)?;
    pokemon.hp.apply(hp);
    if kind == EventKind::Damage
        && let Some(volatile) = state.volatile_mut(key)
    {
        volatile.damaged = true;
    }

    let Some(effect) = from else {
        return Ok(());
    };
    // Damage from someone else's ability or item names them with [of];
    // healing always belongs to the pokemon being healed
    let holder = match (kind, of) {
        (EventKind::Damage, Some(of)) => resolve(state, of)?,
        _ => key,
    };
    reveal_effect(state, holder, effect)
}

/// `|-block|` and `|-immune|`: only the cause is informative
pub(crate) async fn reveal_only(
    ctx: &mut BattleParserContext,
    kind: EventKind,
    ident: &PokemonIdent,
    effect: Option<&Effect>,
) -> Result<()> {
    ctx.consume_expected(kind).await?;
    let Some(effect) = effect else {
        return Ok(());
    };
    let holder = resolve(&ctx.state, ident)?;
    reveal_effect(&mut ctx.state, holder, effect)
}

pub(crate) async fn status(
    ctx: &mut BattleParserContext,
    ident: &PokemonIdent,
    status: &str,
    from: Option<&Effect>,
    of: Option<&PokemonIdent>,
) -> Result<()> {
    ctx.consume_expected(EventKind::Status).await?;
    let state = &mut ctx.state;
    let key = resolve(state, ident)?;
    if let Some(status) = MajorStatus::from_protocol(status) {
        state.pokemon_mut(key)?.major_status.afflict(status);
    }
    if let Some(effect) = from {
        // Synchronize, Static and friends name their holder with [of]
        let holder = match (effect, of) {
            (Effect::Ability(_), Some(of)) => resolve(state, of)?,
            _ => key,
        };
        reveal_effect(state, holder, effect)?;
    }
    Ok(())
}

pub(crate) async fn cure_status(
    ctx: &mut BattleParserContext,
    ident: &PokemonIdent,
    from: Option<&Effect>,
) -> Result<()> {
    ctx.consume_expected(EventKind::CureStatus).await?;
    let state = &mut ctx.state;
    let key = resolve(state, ident)?;
    state.pokemon_mut(key)?.major_status.cure();
    if let Some(effect) = from {
        reveal_effect(state, key, effect)?;
    }
    Ok(())
}

/// Heal Bell and Aromatherapy
pub(crate) async fn cure_team(ctx: &mut BattleParserContext, ident: &PokemonIdent) -> Result<()> {
    ctx.consume_expected(EventKind::CureTeam).await?;
    let team = ctx.state.team_mut(ident.side);
    for index in 0..team.roster().len() {
        if let Some(pokemon) = team.pokemon_mut(index) {
            pokemon.major_status.cure();
        }
    }
    Ok(())
}

pub(crate) async fn boost(
    ctx: &mut BattleParserContext,
    kind: EventKind,
    ident: &PokemonIdent,
    stat: BoostStat,
    amount: i8,
    from: Option<&Effect>,
) -> Result<()> {
    ctx.consume_expected(kind).await?;
    let state = &mut ctx.state;
    let key = resolve(state, ident)?;
    if let Some(volatile) = state.volatile_mut(key) {
        volatile.boosts.boost(stat, amount);
    }
    if let Some(effect) = from {
        reveal_effect(state, key, effect)?;
    }
    Ok(())
}

pub(crate) async fn set_boost(
    ctx: &mut BattleParserContext,
    ident: &PokemonIdent,
    stat: BoostStat,
    amount: i8,
    from: Option<&Effect>,
) -> Result<()> {
    ctx.consume_expected(EventKind::SetBoost).await?;
    let state = &mut ctx.state;
    let key = resolve(state, ident)?;
    if let Some(volatile) = state.volatile_mut(key) {
        volatile.boosts.set(stat, amount);
    }
    if let Some(effect) = from {
        reveal_effect(state, key, effect)?;
    }
    Ok(())
}

/// Guard Swap, Power Swap and Heart Swap
pub(crate) async fn swap_boost(
    ctx: &mut BattleParserContext,
    source: &PokemonIdent,
    target: &PokemonIdent,
    stats: &[BoostStat],
) -> Result<()> {
    ctx.consume_expected(EventKind::SwapBoost).await?;
    let state = &mut ctx.state;
    let source = resolve(state, source)?;
    let target = resolve(state, target)?;
    let stats = if stats.is_empty() { &BoostStat::ALL[..] } else { stats };

    let (Some(mut ours), Some(mut theirs)) = (
        state.volatile(source).map(|v| v.boosts),
        state.volatile(target).map(|v| v.boosts),
    ) else {
        return Ok(());
    };
    ours.swap(&mut theirs, stats);
    if let Some(volatile) = state.volatile_mut(source) {
        volatile.boosts = ours;
    }
    if let Some(volatile) = state.volatile_mut(target) {
        volatile.boosts = theirs;
    }
    Ok(())
}

/// Psych Up
pub(crate) async fn copy_boost(
    ctx: &mut BattleParserContext,
    source: &PokemonIdent,
    target: &PokemonIdent,
) -> Result<()> {
    ctx.consume_expected(EventKind::CopyBoost).await?;
    let state = &mut ctx.state;
    let source = resolve(state, source)?;
    let target = resolve(state, target)?;
    let copied = state.volatile(target).map(|v| v.boosts).unwrap_or_default();
    if let Some(volatile) = state.volatile_mut(source) {
        volatile.boosts = copied;
    }
    Ok(())
}

/// The boost resets. `ident` is None for `|-clearallboost|`.
pub(crate) async fn reset_boosts(
    ctx: &mut BattleParserContext,
    kind: EventKind,
    ident: Option<&PokemonIdent>,
) -> Result<()> {
    ctx.consume_expected(kind).await?;
    let state = &mut ctx.state;
    let keys: Vec<PokemonKey> = match ident {
        Some(ident) => vec![resolve(state, ident)?],
        None => [SideId::P1, SideId::P2]
            .into_iter()
            .filter_map(|side| state.active_key(side))
            .collect(),
    };
    for key in keys {
        let Some(volatile) = state.volatile_mut(key) else {
            continue;
        };
        match kind {
            EventKind::InvertBoost => volatile.boosts.invert(),
            EventKind::ClearPositiveBoost => volatile.boosts.clear_positive(),
            EventKind::ClearNegativeBoost => volatile.boosts.clear_negative(),
            _ => volatile.boosts.clear(),
        }
    }
    Ok(())
}

pub(crate) async fn volatile_start(
    ctx: &mut BattleParserContext,
    ident: &PokemonIdent,
    effect: &Effect,
    detail: Option<&str>,
    from: Option<&Effect>,
    of: Option<&PokemonIdent>,
) -> Result<()> {
    ctx.consume_expected(EventKind::VolatileStart).await?;
    let state = &mut ctx.state;
    let key = resolve(state, ident)?;
    if let Some(ability) = effect.ability_id() {
        reveal_ability(state, key, &ability)?;
    }
    if let Some(effect) = from {
        let holder = match of {
            Some(of) => resolve(state, of)?,
            None => key,
        };
        reveal_effect(state, holder, effect)?;
    }
    let id = effect.id();

    if id == "disable"
        && let Some(name) = detail
    {
        let move_id = to_id(name);
        if state.dex().move_data(&move_id).is_some() {
            state.moveset_mut(key)?.reveal(&move_id)?;
        }
    }
    if id == "typechange"
        && let Some(types) = detail
    {
        let types: Vec<Type> = types.split('/').filter_map(Type::from_protocol).collect();
        if !types.is_empty()
            && let Some(volatile) = state.volatile_mut(key)
        {
            volatile.override_types = Some(types);
        }
    }

    let Some(volatile) = state.volatile_mut(key) else {
        return Ok(());
    };
    match id.as_str() {
        "aquaring" => volatile.aqua_ring = true,
        "attract" => volatile.attract = true,
        "bide" => volatile.bide.start(),
        "charge" => volatile.charge.start(),
        "confusion" => volatile.confusion.start(),
        "curse" => volatile.curse = true,
        "defensecurl" => volatile.defense_curl = true,
        "disable" => {
            volatile.disabled.start();
            volatile.disabled_move = detail.map(to_id);
        }
        "embargo" => volatile.embargo.start(),
        "encore" => {
            volatile.encore.start();
            volatile.encore_move = volatile.last_move.clone();
        }
        "flashfire" => volatile.flash_fire = true,
        "focusenergy" => volatile.focus_energy = true,
        "foresight" => volatile.foresight = true,
        "healblock" => volatile.heal_block.start(),
        "imprison" => volatile.imprison = true,
        "ingrain" => volatile.ingrain = true,
        "leechseed" => volatile.leech_seed = true,
        "magnetrise" => volatile.magnet_rise.start(),
        "minimize" => volatile.minimize = true,
        "miracleeye" => volatile.miracle_eye = true,
        "nightmare" => volatile.nightmare = true,
        "perish0" | "perish1" | "perish2" | "perish3" => {
            volatile.perish = id.trim_start_matches("perish").parse().unwrap_or(0);
        }
        "powertrick" => volatile.power_trick = !volatile.power_trick,
        "slowstart" => volatile.slow_start.start(),
        "stockpile1" | "stockpile2" | "stockpile3" => {
            volatile.stockpile = id.trim_start_matches("stockpile").parse().unwrap_or(0);
        }
        "substitute" => volatile.substitute = true,
        "taunt" => volatile.taunt.start(),
        "torment" => volatile.torment = true,
        "uproar" => volatile.uproar.start(),
        "yawn" => volatile.yawn.start(),
        other => debug!(%key, effect = other, "untracked volatile started"),
    }
    Ok(())
}

pub(crate) async fn volatile_end(
    ctx: &mut BattleParserContext,
    ident: &PokemonIdent,
    effect: &Effect,
) -> Result<()> {
    ctx.consume_expected(EventKind::VolatileEnd).await?;
    let state = &mut ctx.state;
    let key = resolve(state, ident)?;
    let Some(volatile) = state.volatile_mut(key) else {
        return Ok(());
    };
    match effect.id().as_str() {
        "attract" => volatile.attract = false,
        "bide" => volatile.bide.end(),
        "confusion" => volatile.confusion.end(),
        "disable" => {
            volatile.disabled.end();
            volatile.disabled_move = None;
        }
        "embargo" => volatile.embargo.end(),
        "encore" => {
            volatile.encore.end();
            volatile.encore_move = None;
        }
        "healblock" => volatile.heal_block.end(),
        "ingrain" => volatile.ingrain = false,
        "leechseed" => volatile.leech_seed = false,
        "magnetrise" => volatile.magnet_rise.end(),
        "nightmare" => volatile.nightmare = false,
        "slowstart" => volatile.slow_start.end(),
        "stockpile" => volatile.stockpile = 0,
        "substitute" => volatile.substitute = false,
        "taunt" => volatile.taunt.end(),
        "uproar" => volatile.uproar.end(),
        "yawn" => volatile.yawn.end(),
        id if PARTIAL_TRAPS.contains(&id) => volatile.partially_trapped.end(),
        other => debug!(%key, effect = other, "untracked volatile ended"),
    }
    Ok(())
}

pub(crate) async fn item(
    ctx: &mut BattleParserContext,
    ident: &PokemonIdent,
    item: &str,
    from: Option<&Effect>,
    of: Option<&PokemonIdent>,
) -> Result<()> {
    ctx.consume_expected(EventKind::Item).await?;
    let state = &mut ctx.state;
    let key = resolve(state, ident)?;
    let id = to_id(item);
    match from {
        Some(Effect::Move(name)) if ITEM_TRANSFERS.contains(&to_id(name).as_str()) => {
            state.pokemon_mut(key)?.receive_item(&id);
        }
        Some(effect @ Effect::Ability(_)) => {
            // Frisk: the item belongs to the frisked pokemon, the ability to [of]
            reveal_item(state, key, &id)?;
            if let Some(of) = of {
                let holder = resolve(state, of)?;
                reveal_effect(state, holder, effect)?;
            }
        }
        _ => reveal_item(state, key, &id)?,
    }
    Ok(())
}

pub(crate) async fn end_item(ctx: &mut BattleParserContext, ident: &PokemonIdent, item: &str) -> Result<()> {
    ctx.consume_expected(EventKind::EndItem).await?;
    let state = &mut ctx.state;
    let key = resolve(state, ident)?;
    let id = to_id(item);
    state.pokemon_mut(key)?.lose_item(&id)?;
    if let Some(volatile) = state.volatile_mut(key) {
        volatile.choice_lock = None;
    }
    Ok(())
}

pub(crate) async fn ability(
    ctx: &mut BattleParserContext,
    ident: &PokemonIdent,
    ability: &str,
    from: Option<&Effect>,
    of: Option<&PokemonIdent>,
) -> Result<()> {
    ctx.consume_expected(EventKind::Ability).await?;
    let state = &mut ctx.state;
    let key = resolve(state, ident)?;
    let id = to_id(ability);
    match (from, of) {
        // Trace: the holder has Trace, the ability shown belongs to [of]
        (Some(effect @ Effect::Ability(_)), Some(of)) => {
            reveal_effect(state, key, effect)?;
            let source = resolve(state, of)?;
            reveal_ability(state, source, &id)?;
            state.change_ability(key, &id)?;
        }
        // Role Play copies from [of], Worry Seed overwrites
        (Some(Effect::Move(name)), of) => {
            if to_id(name) == "roleplay"
                && let Some(of) = of
            {
                let source = resolve(state, of)?;
                reveal_ability(state, source, &id)?;
            }
            state.change_ability(key, &id)?;
        }
        _ => reveal_ability(state, key, &id)?,
    }
    Ok(())
}

/// Gastro Acid
pub(crate) async fn end_ability(ctx: &mut BattleParserContext, ident: &PokemonIdent) -> Result<()> {
    ctx.consume_expected(EventKind::EndAbility).await?;
    let key = resolve(&ctx.state, ident)?;
    if let Some(volatile) = ctx.state.volatile_mut(key) {
        volatile.gastro_acid = true;
    }
    Ok(())
}

pub(crate) async fn activate(
    ctx: &mut BattleParserContext,
    ident: Option<&PokemonIdent>,
    effect: &Effect,
) -> Result<()> {
    ctx.consume_expected(EventKind::Activate).await?;
    let Some(ident) = ident else {
        return Ok(());
    };
    let state = &mut ctx.state;
    let key = resolve(state, ident)?;
    let id = effect.id();

    if PARTIAL_TRAPS.contains(&id.as_str()) {
        if let Some(volatile) = state.volatile_mut(key) {
            volatile.partially_trapped.start();
        }
        return Ok(());
    }
    match id.as_str() {
        // Mean Look and Block
        "trapped" => link_trap(state, key),
        "substitute" => {}
        _ => reveal_effect(state, key, effect)?,
    }
    Ok(())
}

fn link_trap(state: &mut BattleState, victim: PokemonKey) {
    if let Some(trapper) = state.opponent_of(victim) {
        state.links.link(LinkKind::Trap, trapper, victim);
    }
}
