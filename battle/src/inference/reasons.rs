//! Concrete claims about items, abilities and move types

use super::sub_reason::{DelayCallback, Membership, SubReason};
use crate::error::{BattleError, Result};
use crate::state::{BattleState, NO_ITEM, PokemonKey};
use crate::types::{Type, Weather};
use std::sync::Arc;

/// "`holder` holds one of `items`"
#[derive(Debug)]
pub struct ItemReason {
    holder: PokemonKey,
    items: Membership<String>,
}

impl ItemReason {
    pub fn have<'a>(holder: PokemonKey, items: impl IntoIterator<Item = &'a str>) -> Arc<dyn SubReason> {
        Arc::new(ItemReason {
            holder,
            items: Membership::new(items.into_iter().map(str::to_string), false),
        })
    }

    pub fn not_have<'a>(holder: PokemonKey, items: impl IntoIterator<Item = &'a str>) -> Arc<dyn SubReason> {
        Arc::new(ItemReason {
            holder,
            items: Membership::new(items.into_iter().map(str::to_string), true),
        })
    }
}

impl SubReason for ItemReason {
    fn can_hold(&self, state: &BattleState) -> Result<Option<bool>> {
        Ok(self.items.can_hold(&state.pokemon(self.holder)?.item))
    }

    fn assert(&self, state: &mut BattleState) -> Result<()> {
        self.items.commit(&mut state.pokemon_mut(self.holder)?.item, true)
    }

    fn reject(&self, state: &mut BattleState) -> Result<()> {
        self.items.commit(&mut state.pokemon_mut(self.holder)?.item, false)
    }

    fn delay(&self, state: &mut BattleState, callback: DelayCallback) -> Result<()> {
        self.items.delay(&mut state.pokemon_mut(self.holder)?.item, callback);
        Ok(())
    }
}

/// "`holder` has one of `abilities`"
#[derive(Debug)]
pub struct AbilityReason {
    holder: PokemonKey,
    abilities: Membership<String>,
}

impl AbilityReason {
    pub fn have<'a>(
        holder: PokemonKey,
        abilities: impl IntoIterator<Item = &'a str>,
    ) -> Arc<dyn SubReason> {
        Arc::new(AbilityReason {
            holder,
            abilities: Membership::new(abilities.into_iter().map(str::to_string), false),
        })
    }

    pub fn not_have<'a>(
        holder: PokemonKey,
        abilities: impl IntoIterator<Item = &'a str>,
    ) -> Arc<dyn SubReason> {
        Arc::new(AbilityReason {
            holder,
            abilities: Membership::new(abilities.into_iter().map(str::to_string), true),
        })
    }
}

impl SubReason for AbilityReason {
    fn can_hold(&self, state: &BattleState) -> Result<Option<bool>> {
        Ok(self.abilities.can_hold(state.ability(self.holder)?))
    }

    fn assert(&self, state: &mut BattleState) -> Result<()> {
        self.abilities.commit(state.ability_mut(self.holder)?, true)
    }

    fn reject(&self, state: &mut BattleState) -> Result<()> {
        self.abilities.commit(state.ability_mut(self.holder)?, false)
    }

    fn delay(&self, state: &mut BattleState, callback: DelayCallback) -> Result<()> {
        self.abilities.delay(state.ability_mut(self.holder)?, callback);
        Ok(())
    }
}

/// Where a move's type comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeSource {
    /// Known from the move itself (and the weather, for Weather Ball)
    Fixed(Type),
    /// Hidden Power: the user's hidden power type
    HiddenPower,
    /// Judgment: the user's plate
    Plate,
}

/// "the move `user` is using has one of `types`"
#[derive(Debug)]
pub struct MoveTypeReason {
    user: PokemonKey,
    move_id: String,
    source: TypeSource,
    types: Membership<Type>,
    /// Items that would make Judgment one of `types`
    plates: Membership<String>,
}

impl MoveTypeReason {
    pub fn is_type(
        state: &BattleState,
        user: PokemonKey,
        move_id: &str,
        types: impl IntoIterator<Item = Type>,
    ) -> Result<Arc<dyn SubReason>> {
        Ok(Arc::new(Self::build(state, user, move_id, types, false)?))
    }

    /// The negated claim: the move has none of `types`
    pub fn isnt_type(
        state: &BattleState,
        user: PokemonKey,
        move_id: &str,
        types: impl IntoIterator<Item = Type>,
    ) -> Result<Arc<dyn SubReason>> {
        Ok(Arc::new(Self::build(state, user, move_id, types, true)?))
    }

    fn build(
        state: &BattleState,
        user: PokemonKey,
        move_id: &str,
        types: impl IntoIterator<Item = Type>,
        negative: bool,
    ) -> Result<Self> {
        let source = match move_id {
            "hiddenpower" => TypeSource::HiddenPower,
            "judgment" => TypeSource::Plate,
            "weatherball" => TypeSource::Fixed(match state.room.current_weather() {
                Some(Weather::Sun) => Type::Fire,
                Some(Weather::Rain) => Type::Water,
                Some(Weather::Sand) => Type::Rock,
                Some(Weather::Hail) => Type::Ice,
                None => Type::Normal,
            }),
            _ => TypeSource::Fixed(state.dex().require_move(move_id)?.move_type),
        };
        let types = Membership::new(types, negative);

        let dex = state.dex();
        let mut plates: Vec<String> = dex
            .items_where(|item| item.plate_type.is_some_and(|t| types.set.contains(&t)))
            .into_iter()
            .collect();
        if types.set.contains(&Type::Normal) {
            plates.extend(dex.items_where(|item| item.plate_type.is_none()));
            plates.push(NO_ITEM.to_string());
        }

        Ok(MoveTypeReason {
            user,
            move_id: move_id.to_string(),
            source,
            plates: Membership::new(plates, negative),
            types,
        })
    }

    fn fixed_holds(&self, move_type: Type) -> bool {
        self.types.set.contains(&move_type) != self.types.negative
    }

    fn fixed_commit(&self, move_type: Type, holds: bool) -> Result<()> {
        if self.fixed_holds(move_type) == holds {
            Ok(())
        } else {
            Err(BattleError::Contradiction(format!(
                "{} is {move_type}, not {:?}",
                self.move_id, self.types
            )))
        }
    }

    fn commit(&self, state: &mut BattleState, holds: bool) -> Result<()> {
        match self.source {
            TypeSource::Fixed(t) => self.fixed_commit(t, holds),
            TypeSource::HiddenPower => self
                .types
                .commit(&mut state.pokemon_mut(self.user)?.hp_type, holds),
            TypeSource::Plate => self
                .plates
                .commit(&mut state.pokemon_mut(self.user)?.item, holds),
        }
    }
}

impl SubReason for MoveTypeReason {
    fn can_hold(&self, state: &BattleState) -> Result<Option<bool>> {
        Ok(match self.source {
            TypeSource::Fixed(t) => Some(self.fixed_holds(t)),
            TypeSource::HiddenPower => self.types.can_hold(&state.pokemon(self.user)?.hp_type),
            TypeSource::Plate => self.plates.can_hold(&state.pokemon(self.user)?.item),
        })
    }

    fn assert(&self, state: &mut BattleState) -> Result<()> {
        self.commit(state, true)
    }

    fn reject(&self, state: &mut BattleState) -> Result<()> {
        self.commit(state, false)
    }

    fn delay(&self, state: &mut BattleState, callback: DelayCallback) -> Result<()> {
        match self.source {
            TypeSource::Fixed(t) => callback(self.fixed_holds(t)),
            TypeSource::HiddenPower => self
                .types
                .delay(&mut state.pokemon_mut(self.user)?.hp_type, callback),
            TypeSource::Plate => self
                .plates
                .delay(&mut state.pokemon_mut(self.user)?.item, callback),
        }
        Ok(())
    }
}
