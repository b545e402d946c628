//! Legal choices for the current decision

use crate::dex::{MoveCategory, TrapKind};
use crate::error::Result;
use crate::state::{BattleState, LinkKind, PokemonKey, normalize_move_id};
use crate::types::Type;
use sleuth_protocol::{Choice, SideId};

/// Every legal choice, moves by slot first, then switches by team slot.
///
/// When no move is usable the only choice is `move 1`, which the server
/// turns into Struggle. Switches are left out entirely once any trapping
/// effect on our active pokemon is known.
pub fn get_choices(state: &BattleState, switch_only: bool) -> Result<Vec<Choice>> {
    let Some(side) = state.our_side else {
        return Ok(Vec::new());
    };
    let active = state.active_key(side).filter(|&key| {
        state
            .pokemon(key)
            .is_ok_and(|pokemon| !pokemon.is_fainted())
    });

    let mut choices = Vec::new();
    if !switch_only && let Some(key) = active {
        for (slot, id, usable) in move_slots(state, key)? {
            if usable && move_allowed(state, key, &id)? {
                choices.push(Choice::Move(slot));
            }
        }
        if choices.is_empty() {
            return Ok(vec![Choice::Move(1)]);
        }
        if is_trapped(state, key)? {
            return Ok(choices);
        }
    }
    choices.extend(switch_choices(state, side));
    Ok(choices)
}

/// Our active pokemon's move slots as (slot, move id, has PP and is not
/// disabled by the server). The request is authoritative when present.
pub(super) fn move_slots(state: &BattleState, key: PokemonKey) -> Result<Vec<(u8, String, bool)>> {
    let requested = state
        .request
        .as_ref()
        .and_then(|request| request.active.as_ref())
        .and_then(|active| active.first());
    if let Some(active) = requested {
        let slots = active
            .moves
            .iter()
            .take(4)
            .zip(1u8..)
            .map(|(slot, n)| {
                let (id, _) = normalize_move_id(&slot.id);
                (n, id, !slot.disabled && slot.pp > 0)
            })
            .collect();
        return Ok(slots);
    }

    let slots = state
        .moveset(key)?
        .moves()
        .iter()
        .take(4)
        .zip(1u8..)
        .map(|(known, n)| (n, known.name().to_string(), known.pp() > 0))
        .collect();
    Ok(slots)
}

fn move_allowed(state: &BattleState, key: PokemonKey, id: &str) -> Result<bool> {
    let Some(volatile) = state.volatile(key) else {
        return Ok(true);
    };
    let is_status = state
        .dex()
        .move_data(id)
        .is_some_and(|data| data.category == MoveCategory::Status);
    if volatile.taunt.is_active() && is_status {
        return Ok(false);
    }
    if volatile.disabled.is_active() && volatile.disabled_move.as_deref() == Some(id) {
        return Ok(false);
    }
    if volatile.encore.is_active()
        && let Some(encored) = volatile.encore_move.as_deref()
        && encored != id
    {
        return Ok(false);
    }
    if let Some(locked) = volatile.choice_lock.as_deref()
        && locked != id
        && !state.item_suppressed(key)
    {
        return Ok(false);
    }
    if let Some(opponent) = state.opponent_of(key)
        && state.volatile(opponent).is_some_and(|v| v.imprison)
        && state.moveset(opponent)?.is_known(id)
    {
        return Ok(false);
    }
    Ok(true)
}

/// Whether any known effect keeps `key` from switching out
pub(super) fn is_trapped(state: &BattleState, key: PokemonKey) -> Result<bool> {
    let flagged = state
        .request
        .as_ref()
        .and_then(|request| request.active.as_ref())
        .and_then(|active| active.first())
        .is_some_and(|active| active.trapped);
    if flagged {
        return Ok(true);
    }
    if state.pokemon(key)?.known_item() == Some("shedshell") {
        return Ok(false);
    }
    if state.links.source_of(LinkKind::Trap, key).is_some() {
        return Ok(true);
    }
    if state
        .volatile(key)
        .is_some_and(|v| v.partially_trapped.is_active() || v.ingrain)
    {
        return Ok(true);
    }

    let Some(opponent) = state.opponent_of(key) else {
        return Ok(false);
    };
    if state.pokemon(opponent)?.is_fainted() {
        return Ok(false);
    }
    let trap = state
        .known_ability(opponent)
        .and_then(|id| state.dex().ability(id))
        .and_then(|data| data.trap);
    match trap {
        Some(trap) => traps(state, trap, key),
        None => Ok(false),
    }
}

/// Whether a trapping ability of this kind holds `key` in place
pub(super) fn traps(state: &BattleState, trap: TrapKind, key: PokemonKey) -> Result<bool> {
    Ok(match trap {
        TrapKind::ShadowTag => state.known_ability(key) != Some("shadowtag"),
        TrapKind::ArenaTrap => state.is_grounded(key)?,
        TrapKind::MagnetPull => state.types(key)?.contains(&Type::Steel),
    })
}

fn switch_choices(state: &BattleState, side: SideId) -> Vec<Choice> {
    let team = state.team(side);
    team.order()
        .iter()
        .zip(1u8..)
        .filter(|&(&index, _)| {
            Some(index) != team.active_index()
                && team.pokemon(index).is_some_and(|pokemon| !pokemon.is_fainted())
        })
        .map(|(_, slot)| Choice::Switch(slot))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::testing::{event, request_line, state_with};
    use sleuth_protocol::{BattleEvent, HpStatus, PokemonDetails, PokemonIdent};

    const TEAM: [&str; 3] = ["Scizor", "Salamence", "Starmie"];

    /// Our team from a request, Scizor on the field facing `foe`
    fn battle(moves: &[(&str, u32)], foe: &str) -> (BattleState, PokemonKey, PokemonKey) {
        let mut state = state_with();
        let BattleEvent::Request(request) = event(&request_line(&TEAM, moves, false)) else {
            panic!("not a request");
        };
        state.reconcile_request(&request).unwrap();
        let hp = HpStatus::parse("100/100").unwrap();
        let ours = state
            .switch_in(
                &PokemonIdent::parse("p1a: Scizor").unwrap(),
                &PokemonDetails::parse("Scizor, L80"),
                &hp,
            )
            .unwrap();
        let theirs = state
            .switch_in(
                &PokemonIdent::parse(&format!("p2a: {foe}")).unwrap(),
                &PokemonDetails::parse(foe),
                &hp,
            )
            .unwrap();
        (state, ours, theirs)
    }

    const MOVES: [(&str, u32); 4] = [
        ("bulletpunch", 48),
        ("swordsdance", 32),
        ("uturn", 32),
        ("protect", 16),
    ];

    #[test]
    fn test_moves_then_switches() {
        let (state, _, _) = battle(&MOVES, "Snorlax");
        let choices = get_choices(&state, false).unwrap();
        assert_eq!(
            choices,
            vec![
                Choice::Move(1),
                Choice::Move(2),
                Choice::Move(3),
                Choice::Move(4),
                Choice::Switch(2),
                Choice::Switch(3),
            ]
        );
        assert_eq!(get_choices(&state, false).unwrap(), choices);
        assert_eq!(
            get_choices(&state, true).unwrap(),
            vec![Choice::Switch(2), Choice::Switch(3)]
        );
    }

    #[test]
    fn test_no_pp_left_means_struggle() {
        let moves = MOVES.map(|(id, _)| (id, 0));
        let (state, _, _) = battle(&moves, "Snorlax");
        assert_eq!(get_choices(&state, false).unwrap(), vec![Choice::Move(1)]);
        assert_eq!(
            get_choices(&state, true).unwrap(),
            vec![Choice::Switch(2), Choice::Switch(3)]
        );
    }

    #[test]
    fn test_taunt_and_choice_lock_filter_moves() {
        let (mut state, ours, _) = battle(&MOVES, "Snorlax");
        state.volatile_mut(ours).unwrap().taunt.start();
        let moves: Vec<Choice> = get_choices(&state, false)
            .unwrap()
            .into_iter()
            .filter(Choice::is_move)
            .collect();
        assert_eq!(moves, vec![Choice::Move(1), Choice::Move(3)]);

        let volatile = state.volatile_mut(ours).unwrap();
        volatile.taunt.end();
        volatile.choice_lock = Some("uturn".to_string());
        let moves: Vec<Choice> = get_choices(&state, false)
            .unwrap()
            .into_iter()
            .filter(Choice::is_move)
            .collect();
        assert_eq!(moves, vec![Choice::Move(3)]);
    }

    #[test]
    fn test_imprison_blocks_shared_moves() {
        let (mut state, _, theirs) = battle(&MOVES, "Skarmory");
        state.moveset_mut(theirs).unwrap().reveal("protect").unwrap();
        state.volatile_mut(theirs).unwrap().imprison = true;
        let choices = get_choices(&state, false).unwrap();
        assert!(!choices.contains(&Choice::Move(4)));
        assert!(choices.contains(&Choice::Move(1)));
    }

    #[test]
    fn test_magnet_pull_traps_steel_types() {
        let (mut state, _, theirs) = battle(&MOVES, "Magnezone");
        assert!(get_choices(&state, false).unwrap().iter().any(Choice::is_switch));

        state
            .ability_mut(theirs)
            .unwrap()
            .narrow(["magnetpull".to_string()])
            .unwrap();
        let choices = get_choices(&state, false).unwrap();
        assert!(!choices.iter().any(Choice::is_switch));
        // A forced switch ignores trapping
        assert_eq!(get_choices(&state, true).unwrap().len(), 2);
    }

    #[test]
    fn test_mean_look_link_traps() {
        let (mut state, ours, theirs) = battle(&MOVES, "Snorlax");
        state.links.link(LinkKind::Trap, theirs, ours);
        assert!(is_trapped(&state, ours).unwrap());
        assert!(!get_choices(&state, false).unwrap().iter().any(Choice::is_switch));
    }
}
