//! Belief-state entities.
//!
//! A [`BattleState`] owns both [`Team`]s, each team owns its [`Pokemon`],
//! and the active pokemon's [`VolatileStatus`] lives on the team. Pokemon
//! refer to each other only through [`PokemonKey`]s, stored in the
//! symmetric [`LinkTable`].

mod battle_state;
mod hp;
mod item_temp_status;
mod links;
mod major_status_counter;
mod moveset;
mod pokemon;
mod pokemon_traits;
mod possibility_class;
mod room_status;
mod stat_table;
mod team;
mod team_status;
mod temp_status;
mod volatile_status;

pub use battle_state::BattleState;
pub use hp::Hp;
pub use item_temp_status::{DurationInference, ItemTempStatus};
pub use links::{LinkKind, LinkTable};
pub use major_status_counter::MajorStatusCounter;
pub use moveset::{Move, Moveset};
pub use pokemon::{NO_ITEM, Pokemon, normalize_move_id};
pub use pokemon_traits::PokemonTraits;
pub use possibility_class::{ListenerId, PossibilityClass};
pub use room_status::RoomStatus;
pub use stat_table::{StatRange, StatTable};
pub use team::Team;
pub use team_status::TeamStatus;
pub use temp_status::{TempStatus, VariableTempStatus};
pub use volatile_status::VolatileStatus;

use sleuth_protocol::SideId;
use std::fmt;

/// Stable address of a pokemon: its side and its slot in the team roster.
///
/// Slots never move once assigned, switching only reorders the team's
/// active order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PokemonKey {
    pub side: SideId,
    pub index: usize,
}

impl PokemonKey {
    pub fn new(side: SideId, index: usize) -> Self {
        PokemonKey { side, index }
    }
}

impl fmt::Display for PokemonKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.side, self.index)
    }
}
