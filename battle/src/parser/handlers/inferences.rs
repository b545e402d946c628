//! Builders for the event inferences the handlers open, and the parsers
//! that recognise the events confirming them.

use super::resolve;
use crate::dex::{OnStart, PostDamageItem, ResidualItem};
use crate::error::Result;
use crate::inference::{
    AbilityReason, Acceptor, EventInference, InferenceParser, ItemReason, MoveTypeReason,
    SubInference, SubReason,
};
use crate::parser::{BattleParserContext, dispatch};
use crate::state::{BattleState, PokemonKey};
use crate::types::MajorStatus;
use async_trait::async_trait;
use sleuth_protocol::{BattleEvent, BoostStat, Effect, to_id};
use std::sync::Arc;

pub(crate) const ON_START: &str = "on-start ability";
pub(crate) const ABSORB: &str = "absorbing ability";
pub(crate) const POST_DAMAGE: &str = "post-damage item";
pub(crate) const RESIDUAL_HEAL: &str = "residual healing item";
pub(crate) const RESIDUAL_ITEM: &str = "residual item";
pub(crate) const SPEED_BOOST: &str = "residual ability";

/// Accepts the events an ability of `holder` produces by itself
pub(crate) struct AbilityEffectParser {
    holder: PokemonKey,
    /// Case `i` is `abilities[i]`
    abilities: Vec<String>,
}

impl AbilityEffectParser {
    /// The ability this event is attributed to, if it concerns the holder
    fn attributed(&self, state: &BattleState, event: &BattleEvent) -> Option<String> {
        let (subject, ability) = match event {
            BattleEvent::Ability {
                ident,
                ability,
                from: None,
                ..
            } => (Some(ident), to_id(ability)),
            BattleEvent::Weather {
                from: Some(effect),
                of,
                upkeep: false,
                ..
            } => (of.as_ref(), effect.ability_id()?),
            BattleEvent::Immune {
                ident,
                from: Some(effect),
                ..
            }
            | BattleEvent::Heal {
                ident,
                from: Some(effect),
                ..
            }
            | BattleEvent::Boost {
                ident,
                from: Some(effect),
                ..
            } => (Some(ident), effect.ability_id()?),
            BattleEvent::VolatileStart { ident, effect, .. } => (Some(ident), effect.ability_id()?),
            _ => return None,
        };
        // Weather announcements may omit the holder
        if let Some(subject) = subject
            && resolve(state, subject).ok()? != self.holder
        {
            return None;
        }
        Some(ability)
    }
}

#[async_trait]
impl InferenceParser for AbilityEffectParser {
    async fn parse(&self, ctx: &mut BattleParserContext, accept: &mut Acceptor) -> Result<()> {
        let event = ctx.peek().await?;
        let case = self
            .attributed(&ctx.state, &event)
            .and_then(|ability| self.abilities.iter().position(|a| *a == ability));
        if let Some(case) = case {
            accept.accept(ctx, case)?;
            dispatch(ctx).await?;
        }
        Ok(())
    }
}

/// Accepts damage, healing or status `holder` takes from its own item
pub(crate) struct ItemEffectParser {
    holder: PokemonKey,
    /// Case `i` is `items[i]`
    items: Vec<String>,
}

impl ItemEffectParser {
    fn attributed(&self, state: &BattleState, event: &BattleEvent) -> Option<String> {
        let (ident, effect) = match event {
            BattleEvent::Damage {
                ident,
                from: Some(effect @ Effect::Item(_)),
                ..
            }
            | BattleEvent::Heal {
                ident,
                from: Some(effect @ Effect::Item(_)),
                ..
            }
            | BattleEvent::Status {
                ident,
                from: Some(effect @ Effect::Item(_)),
                ..
            } => (ident, effect),
            _ => return None,
        };
        (resolve(state, ident).ok()? == self.holder)
            .then(|| effect.item_id())
            .flatten()
    }
}

#[async_trait]
impl InferenceParser for ItemEffectParser {
    async fn parse(&self, ctx: &mut BattleParserContext, accept: &mut Acceptor) -> Result<()> {
        let event = ctx.peek().await?;
        let case = self
            .attributed(&ctx.state, &event)
            .and_then(|item| self.items.iter().position(|i| *i == item));
        if let Some(case) = case {
            accept.accept(ctx, case)?;
            dispatch(ctx).await?;
        }
        Ok(())
    }
}

/// Keep the cases that are still open, along with their labels
fn open_labeled(
    state: &BattleState,
    cases: Vec<(String, SubInference)>,
) -> Result<(Vec<String>, Vec<SubInference>)> {
    let mut labels = Vec::new();
    let mut open = Vec::new();
    for (label, case) in cases {
        if case.is_possible(state)? && !case.is_certain(state)? {
            labels.push(label);
            open.push(case);
        }
    }
    Ok((labels, open))
}

fn sorted_candidates(state: &BattleState, key: PokemonKey) -> Result<Vec<String>> {
    let mut candidates: Vec<String> = state.ability(key)?.possible_values().iter().cloned().collect();
    candidates.sort();
    Ok(candidates)
}

fn ability_inference(
    state: &BattleState,
    label: &'static str,
    holder: PokemonKey,
    cases: Vec<(String, SubInference)>,
) -> Result<Option<EventInference>> {
    let (abilities, cases) = open_labeled(state, cases)?;
    if cases.is_empty() {
        return Ok(None);
    }
    let parser = AbilityEffectParser { holder, abilities };
    Ok(Some(
        EventInference::new(label, cases, parser).with_subject(holder),
    ))
}

fn item_inference(
    state: &BattleState,
    label: &'static str,
    holder: PokemonKey,
    cases: Vec<(String, SubInference)>,
) -> Result<Option<EventInference>> {
    let (items, cases) = open_labeled(state, cases)?;
    if cases.is_empty() {
        return Ok(None);
    }
    let parser = ItemEffectParser { holder, items };
    Ok(Some(
        EventInference::new(label, cases, parser).with_subject(holder),
    ))
}

/// Abilities that announce themselves when `key` enters the field
pub(crate) fn on_start(state: &BattleState, key: PokemonKey) -> Result<Option<EventInference>> {
    if !state.is_opponent(key.side) || state.ability(key)?.len() <= 1 {
        return Ok(None);
    }
    let weather = state.room.current_weather();
    let cases = sorted_candidates(state, key)?
        .into_iter()
        .filter(|id| match state.dex().ability(id).and_then(|a| a.on_start.as_ref()) {
            Some(OnStart::Announce | OnStart::Intimidate) => true,
            Some(OnStart::Weather { weather: started }) => weather != Some(*started),
            None => false,
        })
        .map(|id| {
            let case = SubInference::new(vec![AbilityReason::have(key, [id.as_str()])]);
            (id, case)
        })
        .collect();
    ability_inference(state, ON_START, key, cases)
}

fn ignoring_abilities(state: &BattleState) -> Vec<String> {
    state.dex().abilities_where(|a| a.ignores_abilities)
}

fn item_suppressors(state: &BattleState) -> Vec<String> {
    state.dex().abilities_where(|a| a.suppresses_item)
}

fn not_having(holder: PokemonKey, abilities: &[String]) -> Arc<dyn SubReason> {
    AbilityReason::not_have(holder, abilities.iter().map(String::as_str))
}

/// `target` may absorb the move `user` is using into an ability effect
pub(crate) fn absorb(
    state: &BattleState,
    user: PokemonKey,
    target: PokemonKey,
    move_id: &str,
) -> Result<Option<EventInference>> {
    if user.side == target.side || !state.is_opponent(target.side) {
        return Ok(None);
    }
    if !state.dex().move_data(move_id).is_some_and(|m| m.targets_foe()) {
        return Ok(None);
    }
    let ignoring = ignoring_abilities(state);
    let mut cases = Vec::new();
    for id in sorted_candidates(state, target)? {
        let Some(absorb) = state.dex().ability(&id).and_then(|a| a.absorb.as_ref()) else {
            continue;
        };
        let reasons = vec![
            AbilityReason::have(target, [id.as_str()]),
            MoveTypeReason::is_type(state, user, move_id, absorb.types.iter().copied())?,
            not_having(user, &ignoring),
        ];
        cases.push((id, SubInference::new(reasons)));
    }
    ability_inference(state, ABSORB, target, cases)
}

/// Items that react after `user` deals damage
pub(crate) fn post_damage(
    state: &BattleState,
    user: PokemonKey,
    move_id: &str,
) -> Result<Option<EventInference>> {
    if !state.is_opponent(user.side) || state.item_suppressed(user) {
        return Ok(None);
    }
    if state.dex().move_data(move_id).is_none_or(|m| m.is_status()) {
        return Ok(None);
    }
    let suppressors = item_suppressors(state);
    let magic_guard = state.dex().abilities_where(|a| a.magic_guard);
    let full_hp = state.pokemon(user)?.hp.is_full();

    let mut items = state.dex().items_where(|i| i.post_damage.is_some());
    items.sort();
    let mut cases = Vec::new();
    for id in items {
        let mut reasons = vec![
            ItemReason::have(user, [id.as_str()]),
            not_having(user, &suppressors),
        ];
        match state.dex().item(&id).and_then(|i| i.post_damage) {
            Some(PostDamageItem::Recoil) => reasons.push(not_having(user, &magic_guard)),
            Some(PostDamageItem::Drain) if full_hp => continue,
            _ => {}
        }
        cases.push((id, SubInference::new(reasons)));
    }
    item_inference(state, POST_DAMAGE, user, cases)
}

/// End-of-turn item and ability effects of every opposing active pokemon
pub(crate) fn residual(state: &BattleState) -> Result<Vec<EventInference>> {
    let mut inferences = Vec::new();
    for side in [sleuth_protocol::SideId::P1, sleuth_protocol::SideId::P2] {
        if !state.is_opponent(side) {
            continue;
        }
        let Some(key) = state.active_key(side) else {
            continue;
        };
        let pokemon = state.pokemon(key)?;
        if pokemon.is_fainted() {
            continue;
        }
        let Some(volatile) = state.volatile(key) else {
            continue;
        };

        if !state.item_suppressed(key) {
            let (heal, other) = residual_item_cases(state, key)?;
            inferences.extend(item_inference(state, RESIDUAL_HEAL, key, heal)?);
            inferences.extend(item_inference(state, RESIDUAL_ITEM, key, other)?);
        }

        if volatile.active_turns > 0 && volatile.boosts.get(BoostStat::Spe) < 6 {
            let cases = sorted_candidates(state, key)?
                .into_iter()
                .filter(|id| state.dex().ability(id).is_some_and(|a| a.residual.is_some()))
                .map(|id| {
                    let case = SubInference::new(vec![AbilityReason::have(key, [id.as_str()])]);
                    (id, case)
                })
                .collect();
            inferences.extend(ability_inference(state, SPEED_BOOST, key, cases)?);
        }
    }
    Ok(inferences)
}

type LabeledCases = Vec<(String, SubInference)>;

/// Cases for residual items, split into healing and everything else
fn residual_item_cases(state: &BattleState, key: PokemonKey) -> Result<(LabeledCases, LabeledCases)> {
    let pokemon = state.pokemon(key)?;
    let types = state.types(key)?;
    let volatile = state.volatile(key);
    let can_heal = !pokemon.hp.is_full() && !volatile.is_some_and(|v| v.heal_block.is_active());
    let suppressors = item_suppressors(state);
    let magic_guard = state.dex().abilities_where(|a| a.magic_guard);

    let mut items = state.dex().items_where(|i| i.residual.is_some());
    items.sort();

    let mut heal = Vec::new();
    let mut other = Vec::new();
    for id in items {
        let Some(residual) = state.dex().item(&id).and_then(|i| i.residual.as_ref()) else {
            continue;
        };
        let mut reasons = vec![
            ItemReason::have(key, [id.as_str()]),
            not_having(key, &suppressors),
        ];
        let heals = match residual {
            ResidualItem::Heal => true,
            ResidualItem::TypeDependent { heal_type } => types.contains(heal_type),
            ResidualItem::Damage => false,
            ResidualItem::Status {
                status,
                immune_types,
            } => {
                let status_free = pokemon.major_status.current().is_none();
                let immune = immune_types.iter().any(|t| types.contains(t));
                if !status_free || immune || MajorStatus::from_protocol(status).is_none() {
                    continue;
                }
                other.push((id, SubInference::new(reasons)));
                continue;
            }
        };
        if heals {
            if can_heal {
                heal.push((id, SubInference::new(reasons)));
            }
        } else {
            reasons.push(not_having(key, &magic_guard));
            other.push((id, SubInference::new(reasons)));
        }
    }
    Ok((heal, other))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::testing::{opponent, ours, state_with};
    use crate::types::Type;

    #[test]
    fn test_on_start_cases_skip_quiet_abilities() {
        let mut state = state_with();
        let arcanine = opponent(&mut state, "Arcanine", "Arcanine, L80, M");
        let inference = on_start(&state, arcanine).unwrap().unwrap();
        // Intimidate announces itself, Flash Fire does not
        assert_eq!(inference.cases().len(), 1);

        let starmie = opponent(&mut state, "Starmie", "Starmie");
        // Illuminate and Natural Cure are both silent on entry
        assert!(on_start(&state, starmie).unwrap().is_none());
    }

    #[test]
    fn test_on_start_ignores_our_side() {
        let mut state = state_with();
        let arcanine = ours(&mut state, "Arcanine", "Arcanine");
        assert!(on_start(&state, arcanine).unwrap().is_none());
    }

    #[test]
    fn test_absorb_cases_need_matching_candidates() {
        let mut state = state_with();
        let user = ours(&mut state, "Garchomp", "Garchomp");
        let bronzong = opponent(&mut state, "Bronzong", "Bronzong");
        let inference = absorb(&state, user, bronzong, "earthquake").unwrap().unwrap();
        assert_eq!(inference.label(), ABSORB);
        assert_eq!(inference.cases().len(), 1);

        let snorlax = opponent(&mut state, "Snorlax", "Snorlax");
        assert!(absorb(&state, user, snorlax, "earthquake").unwrap().is_none());
    }

    #[test]
    fn test_residual_heal_needs_missing_hp() {
        let mut state = state_with();
        let snorlax = opponent(&mut state, "Snorlax", "Snorlax");
        state.volatile_mut(snorlax).unwrap().active_turns = 1;
        let labels: Vec<_> = residual(&state).unwrap().iter().map(|i| i.label().to_string()).collect();
        assert_eq!(labels, vec![RESIDUAL_ITEM.to_string()]);

        state.pokemon_mut(snorlax).unwrap().hp.set(50, 100);
        let labels: Vec<_> = residual(&state).unwrap().iter().map(|i| i.label().to_string()).collect();
        assert_eq!(labels, vec![RESIDUAL_HEAL.to_string(), RESIDUAL_ITEM.to_string()]);
    }

    #[test]
    fn test_status_orbs_skip_immune_types() {
        let mut state = state_with();
        let skarmory = opponent(&mut state, "Skarmory", "Skarmory");
        assert!(state.types(skarmory).unwrap().contains(&Type::Steel));
        let (_, other) = residual_item_cases(&state, skarmory).unwrap();
        let ids: Vec<_> = other.iter().map(|(id, _)| id.as_str()).collect();
        assert!(!ids.contains(&"toxicorb"));
        assert!(ids.contains(&"flameorb"));
        assert!(ids.contains(&"stickybarb"));
    }
}
