use super::{Pokemon, TeamStatus, VolatileStatus};
use crate::dex::SelfSwitchKind;
use sleuth_protocol::SideId;

/// One player's team.
///
/// `pokemon` is the roster in order of first appearance and never
/// reorders, so roster indices are stable keys. `order` mirrors the
/// server's slot order (used for switch choices): `order[0]` is the active
/// slot and a switch swaps the incoming pokemon into it.
#[derive(Debug)]
pub struct Team {
    side: SideId,
    /// Announced team size
    pub size: usize,
    pokemon: Vec<Pokemon>,
    order: Vec<usize>,
    active: Option<usize>,
    pub volatile: VolatileStatus,
    pub status: TeamStatus,
}

impl Team {
    pub fn new(side: SideId, size: usize) -> Self {
        Team {
            side,
            size,
            pokemon: Vec::new(),
            order: Vec::new(),
            active: None,
            volatile: VolatileStatus::new(),
            status: TeamStatus::new(),
        }
    }

    pub fn side(&self) -> SideId {
        self.side
    }

    pub fn roster(&self) -> &[Pokemon] {
        &self.pokemon
    }

    pub fn pokemon(&self, index: usize) -> Option<&Pokemon> {
        self.pokemon.get(index)
    }

    pub fn pokemon_mut(&mut self, index: usize) -> Option<&mut Pokemon> {
        self.pokemon.get_mut(index)
    }

    /// Roster indices in server slot order
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active(&self) -> Option<&Pokemon> {
        self.active.and_then(|i| self.pokemon.get(i))
    }

    pub fn active_mut(&mut self) -> Option<&mut Pokemon> {
        self.active.and_then(|i| self.pokemon.get_mut(i))
    }

    pub fn find(&self, nickname: &str) -> Option<usize> {
        self.pokemon.iter().position(|p| p.nickname == nickname)
    }

    /// Add a newly seen pokemon, returning its roster index
    pub fn add(&mut self, pokemon: Pokemon) -> usize {
        self.pokemon.push(pokemon);
        let index = self.pokemon.len() - 1;
        self.order.push(index);
        self.size = self.size.max(self.pokemon.len());
        index
    }

    /// Pokemon that have not fainted
    pub fn alive_count(&self) -> usize {
        self.pokemon.iter().filter(|p| !p.is_fainted()).count()
    }

    /// Put `index` on the field. The volatile status is rebuilt according to
    /// the pending self-switch: Baton Pass keeps the passable fields, any
    /// self-switch keeps `last_move`, a plain switch keeps nothing.
    pub fn switch_in(&mut self, index: usize) {
        if let Some(previous) = self.active_mut() {
            previous.major_status.on_switch_out();
        }

        let mut volatile = self.volatile.shallow_clone();
        match self.status.self_switch.take() {
            Some(SelfSwitchKind::CopyVolatile) => {}
            Some(SelfSwitchKind::Normal) => volatile.clear_passable(),
            None => {
                volatile.clear_passable();
                volatile.clear_self_switch_passable();
            }
        }
        self.volatile = volatile;

        if let Some(slot) = self.order.iter().position(|&i| i == index) {
            self.order.swap(0, slot);
        }
        self.active = Some(index);
    }

    /// Adopt the server's slot order, given as nicknames
    pub fn sync_order<'a>(&mut self, nicknames: impl IntoIterator<Item = &'a str>) {
        let order: Vec<usize> = nicknames
            .into_iter()
            .filter_map(|name| self.find(name))
            .collect();
        if order.len() == self.pokemon.len() {
            self.order = order;
        }
    }
}
