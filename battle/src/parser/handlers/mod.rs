//! Handlers for each event family. Every handler consumes its event
//! before touching the belief state.

pub(super) mod effects;
pub(super) mod field;
pub(super) mod inferences;
pub(super) mod moves;
pub(super) mod progress;
pub(super) mod residual;
pub(super) mod switching;

use crate::error::{BattleError, Result};
use crate::state::{BattleState, PokemonKey};
use sleuth_protocol::{Effect, PokemonIdent};

/// Resolve an ident, falling back to the active slot for nameless ones
pub(super) fn resolve(state: &BattleState, ident: &PokemonIdent) -> Result<PokemonKey> {
    if ident.name.is_empty() {
        return state
            .active_key(ident.side)
            .ok_or_else(|| BattleError::UnknownPokemon(ident.to_string()));
    }
    state.resolve(ident)
}

/// The holder of `ability` is revealed. A value already ruled out fails
/// with the over-narrowing error.
pub(super) fn reveal_ability(state: &mut BattleState, key: PokemonKey, ability: &str) -> Result<()> {
    state.ability_mut(key)?.narrow([ability.to_string()])
}

/// Same as [`reveal_ability`], for the held item
pub(super) fn reveal_item(state: &mut BattleState, key: PokemonKey, item: &str) -> Result<()> {
    state.pokemon_mut(key)?.reveal_item(item)
}

/// Reveal whatever an item or ability effect says about its holder
pub(super) fn reveal_effect(state: &mut BattleState, holder: PokemonKey, effect: &Effect) -> Result<()> {
    if let Some(item) = effect.item_id() {
        reveal_item(state, holder, &item)?;
    } else if let Some(ability) = effect.ability_id() {
        reveal_ability(state, holder, &ability)?;
    }
    Ok(())
}
