//! Minor battle action message parsers
//!
//! These are secondary effects in battle: damage, stat changes, status, etc.
//! In the official client, they're usually displayed in smaller font.

use super::battle::{
    BoostStat, Effect, PokemonIdent, SideId, has_flag, parse_from, parse_hp_status, parse_of,
    parse_optional_pokemon, parse_pokemon, positional,
};
use super::event::BattleEvent;
use anyhow::Result;

fn parse_boost_args(parts: &[&str]) -> Result<(PokemonIdent, BoostStat, i8)> {
    let ident = parse_pokemon(parts, 2)?;
    let stat = parts
        .get(3)
        .and_then(|s| BoostStat::parse(s))
        .ok_or_else(|| anyhow::anyhow!("Missing stat"))?;
    let amount = parts
        .get(4)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| anyhow::anyhow!("Missing amount"))?;
    Ok((ident, stat, amount))
}

fn parse_side(parts: &[&str], index: usize) -> Result<SideId> {
    parts
        .get(index)
        .and_then(|s| SideId::parse(s))
        .ok_or_else(|| anyhow::anyhow!("Missing side"))
}

fn parse_effect(parts: &[&str], index: usize) -> Effect {
    Effect::parse(parts.get(index).unwrap_or(&""))
}

/// Parse |-fail|POKEMON|ACTION
pub fn parse_fail(parts: &[&str]) -> Result<BattleEvent> {
    let ident = parse_pokemon(parts, 2)?;
    let action = positional(parts, 3).map(|s| s.to_string());

    Ok(BattleEvent::Fail {
        ident,
        action,
        from: parse_from(parts),
        of: parse_of(parts),
    })
}

/// Parse |-block|POKEMON|EFFECT|MOVE|ATTACKER
pub fn parse_block(parts: &[&str]) -> Result<BattleEvent> {
    let ident = parse_pokemon(parts, 2)?;
    let effect = parse_effect(parts, 3);
    let move_name = positional(parts, 4).map(|s| s.to_string());
    let attacker = parse_optional_pokemon(parts, 5);

    Ok(BattleEvent::Block {
        ident,
        effect,
        move_name,
        attacker,
    })
}

/// Parse |-notarget|POKEMON
pub fn parse_notarget(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::NoTarget(parse_optional_pokemon(parts, 2)))
}

/// Parse |-miss|SOURCE|TARGET
pub fn parse_miss(parts: &[&str]) -> Result<BattleEvent> {
    let source = parse_pokemon(parts, 2)?;
    let target = parse_optional_pokemon(parts, 3);

    Ok(BattleEvent::Miss { source, target })
}

/// Parse |-damage|POKEMON|HP STATUS
pub fn parse_damage(parts: &[&str]) -> Result<BattleEvent> {
    let ident = parse_pokemon(parts, 2)?;
    let hp = parse_hp_status(parts, 3)?;

    Ok(BattleEvent::Damage {
        ident,
        hp,
        from: parse_from(parts),
        of: parse_of(parts),
    })
}

/// Parse |-heal|POKEMON|HP STATUS
pub fn parse_heal(parts: &[&str]) -> Result<BattleEvent> {
    let ident = parse_pokemon(parts, 2)?;
    let hp = parse_hp_status(parts, 3)?;

    Ok(BattleEvent::Heal {
        ident,
        hp,
        from: parse_from(parts),
        of: parse_of(parts),
    })
}

/// Parse |-sethp|POKEMON|HP
pub fn parse_sethp(parts: &[&str]) -> Result<BattleEvent> {
    let ident = parse_pokemon(parts, 2)?;
    let hp = parse_hp_status(parts, 3)?;

    Ok(BattleEvent::SetHp {
        ident,
        hp,
        from: parse_from(parts),
    })
}

/// Parse |-status|POKEMON|STATUS
pub fn parse_status(parts: &[&str]) -> Result<BattleEvent> {
    let ident = parse_pokemon(parts, 2)?;
    let status = parts.get(3).unwrap_or(&"").to_string();

    Ok(BattleEvent::Status {
        ident,
        status,
        from: parse_from(parts),
        of: parse_of(parts),
    })
}

/// Parse |-curestatus|POKEMON|STATUS
pub fn parse_curestatus(parts: &[&str]) -> Result<BattleEvent> {
    let ident = parse_pokemon(parts, 2)?;
    let status = parts.get(3).unwrap_or(&"").to_string();

    Ok(BattleEvent::CureStatus {
        ident,
        status,
        from: parse_from(parts),
    })
}

/// Parse |-cureteam|POKEMON
pub fn parse_cureteam(parts: &[&str]) -> Result<BattleEvent> {
    let ident = parse_pokemon(parts, 2)?;
    Ok(BattleEvent::CureTeam {
        ident,
        from: parse_from(parts),
    })
}

/// Parse |-boost|POKEMON|STAT|AMOUNT
pub fn parse_boost(parts: &[&str]) -> Result<BattleEvent> {
    let (ident, stat, amount) = parse_boost_args(parts)?;
    Ok(BattleEvent::Boost {
        ident,
        stat,
        amount,
        from: parse_from(parts),
    })
}

/// Parse |-unboost|POKEMON|STAT|AMOUNT
pub fn parse_unboost(parts: &[&str]) -> Result<BattleEvent> {
    let (ident, stat, amount) = parse_boost_args(parts)?;
    Ok(BattleEvent::Unboost {
        ident,
        stat,
        amount,
        from: parse_from(parts),
    })
}

/// Parse |-setboost|POKEMON|STAT|AMOUNT
pub fn parse_setboost(parts: &[&str]) -> Result<BattleEvent> {
    let (ident, stat, amount) = parse_boost_args(parts)?;
    Ok(BattleEvent::SetBoost {
        ident,
        stat,
        amount,
        from: parse_from(parts),
    })
}

/// Parse |-swapboost|SOURCE|TARGET|STATS
pub fn parse_swapboost(parts: &[&str]) -> Result<BattleEvent> {
    let source = parse_pokemon(parts, 2)?;
    let target = parse_pokemon(parts, 3)?;
    let stats: Vec<BoostStat> = positional(parts, 4)
        .map(|s| {
            s.split(',')
                .filter_map(|s| BoostStat::parse(s.trim()))
                .collect()
        })
        .unwrap_or_else(|| BoostStat::ALL.to_vec());

    Ok(BattleEvent::SwapBoost {
        source,
        target,
        stats,
    })
}

/// Parse |-invertboost|POKEMON
pub fn parse_invertboost(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::InvertBoost(parse_pokemon(parts, 2)?))
}

/// Parse |-clearboost|POKEMON
pub fn parse_clearboost(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::ClearBoost(parse_pokemon(parts, 2)?))
}

/// Parse |-clearallboost
pub fn parse_clearallboost(_parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::ClearAllBoost)
}

/// Parse |-clearpositiveboost|TARGET|POKEMON|EFFECT
pub fn parse_clearpositiveboost(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::ClearPositiveBoost(parse_pokemon(parts, 2)?))
}

/// Parse |-clearnegativeboost|POKEMON
pub fn parse_clearnegativeboost(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::ClearNegativeBoost(parse_pokemon(parts, 2)?))
}

/// Parse |-copyboost|SOURCE|TARGET
pub fn parse_copyboost(parts: &[&str]) -> Result<BattleEvent> {
    let source = parse_pokemon(parts, 2)?;
    let target = parse_pokemon(parts, 3)?;

    Ok(BattleEvent::CopyBoost { source, target })
}

/// Parse |-weather|WEATHER
pub fn parse_weather(parts: &[&str]) -> Result<BattleEvent> {
    let weather = positional(parts, 2)
        .filter(|w| *w != "none")
        .map(|s| s.to_string());

    Ok(BattleEvent::Weather {
        weather,
        from: parse_from(parts),
        of: parse_of(parts),
        upkeep: has_flag(parts, "[upkeep]"),
    })
}

/// Parse |-fieldstart|CONDITION
pub fn parse_fieldstart(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::FieldStart {
        effect: parse_effect(parts, 2),
        from: parse_from(parts),
        of: parse_of(parts),
    })
}

/// Parse |-fieldend|CONDITION
pub fn parse_fieldend(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::FieldEnd {
        effect: parse_effect(parts, 2),
    })
}

/// Parse |-sidestart|SIDE|CONDITION
pub fn parse_sidestart(parts: &[&str]) -> Result<BattleEvent> {
    let side = parse_side(parts, 2)?;
    let condition = parse_effect(parts, 3);

    Ok(BattleEvent::SideStart { side, condition })
}

/// Parse |-sideend|SIDE|CONDITION
pub fn parse_sideend(parts: &[&str]) -> Result<BattleEvent> {
    let side = parse_side(parts, 2)?;
    let condition = parse_effect(parts, 3);

    Ok(BattleEvent::SideEnd {
        side,
        condition,
        from: parse_from(parts),
        of: parse_of(parts),
    })
}

/// Parse |-start|POKEMON|EFFECT|DETAIL
pub fn parse_start(parts: &[&str]) -> Result<BattleEvent> {
    let ident = parse_pokemon(parts, 2)?;
    let effect = parse_effect(parts, 3);
    let detail = positional(parts, 4).map(|s| s.to_string());

    Ok(BattleEvent::VolatileStart {
        ident,
        effect,
        detail,
        from: parse_from(parts),
        of: parse_of(parts),
        silent: has_flag(parts, "[silent]"),
    })
}

/// Parse |-end|POKEMON|EFFECT
pub fn parse_end(parts: &[&str]) -> Result<BattleEvent> {
    let ident = parse_pokemon(parts, 2)?;
    let effect = parse_effect(parts, 3);

    Ok(BattleEvent::VolatileEnd {
        ident,
        effect,
        from: parse_from(parts),
        of: parse_of(parts),
        silent: has_flag(parts, "[silent]"),
    })
}

/// Parse |-crit|POKEMON
pub fn parse_crit(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::Crit(parse_pokemon(parts, 2)?))
}

/// Parse |-supereffective|POKEMON
pub fn parse_supereffective(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::SuperEffective(parse_pokemon(parts, 2)?))
}

/// Parse |-resisted|POKEMON
pub fn parse_resisted(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::Resisted(parse_pokemon(parts, 2)?))
}

/// Parse |-immune|POKEMON
pub fn parse_immune(parts: &[&str]) -> Result<BattleEvent> {
    let ident = parse_pokemon(parts, 2)?;
    Ok(BattleEvent::Immune {
        ident,
        from: parse_from(parts),
        of: parse_of(parts),
    })
}

/// Parse |-item|POKEMON|ITEM with optional [from]EFFECT
pub fn parse_item(parts: &[&str]) -> Result<BattleEvent> {
    let ident = parse_pokemon(parts, 2)?;
    let item = parts.get(3).unwrap_or(&"").to_string();

    Ok(BattleEvent::Item {
        ident,
        item,
        from: parse_from(parts),
        of: parse_of(parts),
    })
}

/// Parse |-enditem|POKEMON|ITEM with optional [from]EFFECT or [eat]
pub fn parse_enditem(parts: &[&str]) -> Result<BattleEvent> {
    let ident = parse_pokemon(parts, 2)?;
    let item = parts.get(3).unwrap_or(&"").to_string();

    Ok(BattleEvent::EndItem {
        ident,
        item,
        from: parse_from(parts),
        of: parse_of(parts),
        eat: has_flag(parts, "[eat]"),
    })
}

/// Parse |-ability|POKEMON|ABILITY with optional [from]EFFECT
pub fn parse_ability(parts: &[&str]) -> Result<BattleEvent> {
    let ident = parse_pokemon(parts, 2)?;
    let ability = parts.get(3).unwrap_or(&"").to_string();

    Ok(BattleEvent::Ability {
        ident,
        ability,
        from: parse_from(parts),
        of: parse_of(parts),
    })
}

/// Parse |-endability|POKEMON
pub fn parse_endability(parts: &[&str]) -> Result<BattleEvent> {
    let ident = parse_pokemon(parts, 2)?;
    Ok(BattleEvent::EndAbility {
        ident,
        from: parse_from(parts),
    })
}

/// Parse |-transform|POKEMON|TARGET
pub fn parse_transform(parts: &[&str]) -> Result<BattleEvent> {
    let source = parse_pokemon(parts, 2)?;
    let target = parse_pokemon(parts, 3)?;

    Ok(BattleEvent::Transform { source, target })
}

/// Parse |-activate|EFFECT (with optional Pokemon and other fields)
pub fn parse_activate(parts: &[&str]) -> Result<BattleEvent> {
    // First part might be a Pokemon or an effect
    let ident = parts.get(2).and_then(|s| PokemonIdent::parse_position(s));
    let effect_index = if ident.is_some() || parts.get(2).is_some_and(|s| s.is_empty()) {
        3
    } else {
        2
    };
    let effect = parse_effect(parts, effect_index);
    let args = parts
        .iter()
        .skip(effect_index + 1)
        .filter(|p| !p.starts_with('['))
        .map(|s| s.to_string())
        .collect();

    Ok(BattleEvent::Activate {
        ident,
        effect,
        args,
        of: parse_of(parts),
    })
}

/// Parse |-fieldactivate|EFFECT
pub fn parse_fieldactivate(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::FieldActivate(parse_effect(parts, 2)))
}

/// Parse |-hint|MESSAGE
pub fn parse_hint(parts: &[&str]) -> Result<BattleEvent> {
    let message = parts.get(2).unwrap_or(&"").to_string();
    Ok(BattleEvent::Hint(message))
}

/// Parse |-center
pub fn parse_center(_parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::Center)
}

/// Parse |-message|MESSAGE
pub fn parse_message(parts: &[&str]) -> Result<BattleEvent> {
    let message = parts.get(2).unwrap_or(&"").to_string();
    Ok(BattleEvent::Message(message))
}

/// Parse |-prepare|ATTACKER|MOVE or |-prepare|ATTACKER|MOVE|DEFENDER
pub fn parse_prepare(parts: &[&str]) -> Result<BattleEvent> {
    let ident = parse_pokemon(parts, 2)?;
    let move_name = parts.get(3).unwrap_or(&"").to_string();
    let target = parse_optional_pokemon(parts, 4);

    Ok(BattleEvent::Prepare {
        ident,
        move_name,
        target,
    })
}

/// Parse |-mustrecharge|POKEMON
pub fn parse_mustrecharge(parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::MustRecharge(parse_pokemon(parts, 2)?))
}

/// Parse |-nothing
pub fn parse_nothing(_parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::Nothing)
}

/// Parse |-hitcount|POKEMON|NUM
pub fn parse_hitcount(parts: &[&str]) -> Result<BattleEvent> {
    let ident = parse_pokemon(parts, 2)?;
    let count = parts
        .get(3)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| anyhow::anyhow!("Missing hit count"))?;

    Ok(BattleEvent::HitCount { ident, count })
}

/// Parse |-singlemove|POKEMON|MOVE
pub fn parse_singlemove(parts: &[&str]) -> Result<BattleEvent> {
    let ident = parse_pokemon(parts, 2)?;
    let move_name = parts.get(3).unwrap_or(&"").to_string();

    Ok(BattleEvent::SingleMove { ident, move_name })
}

/// Parse |-singleturn|POKEMON|MOVE
pub fn parse_singleturn(parts: &[&str]) -> Result<BattleEvent> {
    let ident = parse_pokemon(parts, 2)?;
    let move_name = parts.get(3).unwrap_or(&"").to_string();

    Ok(BattleEvent::SingleTurn { ident, move_name })
}

/// Parse |-ohko
pub fn parse_ohko(_parts: &[&str]) -> Result<BattleEvent> {
    Ok(BattleEvent::Ohko)
}
