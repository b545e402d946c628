//! Statuses that last only while a pokemon stays on the field.
//!
//! Fields fall into three groups, cleared separately:
//!
//! - passable: carried over by Baton Pass, dropped by any other switch
//! - self-switch passable: survives any self-switch move (just `last_move`)
//! - unpassable: always dropped when the pokemon leaves
//!
//! Links to other pokemon (Lock-On, trapping) are kept in the battle's
//! [`LinkTable`](super::LinkTable), not here.

use super::{Moveset, PokemonTraits, TempStatus, VariableTempStatus};
use crate::types::{BoostTable, Type};

#[derive(Debug)]
pub struct VolatileStatus {
    // passable
    pub boosts: BoostTable,
    pub confusion: TempStatus,
    pub embargo: TempStatus,
    pub focus_energy: bool,
    pub gastro_acid: bool,
    pub ingrain: bool,
    pub leech_seed: bool,
    pub magnet_rise: TempStatus,
    /// Turns left on the perish count, 0 when not counting down
    pub perish: u8,
    pub power_trick: bool,
    pub substitute: bool,
    pub curse: bool,
    pub aqua_ring: bool,

    // self-switch passable
    pub last_move: Option<String>,

    // unpassable
    pub attract: bool,
    pub bide: TempStatus,
    pub charge: TempStatus,
    /// Move the choice item locked in
    pub choice_lock: Option<String>,
    /// Took damage from a move this turn
    pub damaged: bool,
    pub defense_curl: bool,
    pub destiny_bond: bool,
    pub disabled_move: Option<String>,
    pub disabled: TempStatus,
    pub encore_move: Option<String>,
    pub encore: TempStatus,
    pub flash_fire: bool,
    pub foresight: bool,
    pub grudge: bool,
    pub heal_block: TempStatus,
    pub imprison: bool,
    /// Outrage-like rampage, keyed by move
    pub lock_move: VariableTempStatus<String>,
    pub magic_coat: bool,
    pub minimize: bool,
    pub miracle_eye: bool,
    pub must_recharge: bool,
    pub nightmare: bool,
    pub partially_trapped: TempStatus,
    pub rage: bool,
    pub rollout: VariableTempStatus<String>,
    pub roost: bool,
    pub slow_start: TempStatus,
    pub snatch: bool,
    /// Consecutive successful Protect-like moves
    pub stall_turns: u32,
    /// A stalling move succeeded this turn
    pub stalled: bool,
    pub stockpile: u8,
    pub taunt: TempStatus,
    pub torment: bool,
    /// Truant holder will loaf around on its next turn
    pub truant_next: bool,
    pub two_turn: VariableTempStatus<String>,
    pub uproar: TempStatus,
    pub yawn: TempStatus,
    /// Traits copied by Transform
    pub override_traits: Option<PokemonTraits>,
    pub override_moveset: Option<Moveset>,
    /// Types changed by an effect such as Color Change
    pub override_types: Option<Vec<Type>>,
    /// Full turns spent on the field
    pub active_turns: u32,
}

impl Default for VolatileStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl VolatileStatus {
    pub fn new() -> Self {
        VolatileStatus {
            boosts: BoostTable::new(),
            confusion: TempStatus::new("confusion", 5, false),
            embargo: TempStatus::new("embargo", 5, false),
            focus_energy: false,
            gastro_acid: false,
            ingrain: false,
            leech_seed: false,
            magnet_rise: TempStatus::new("magnet rise", 5, false),
            perish: 0,
            power_trick: false,
            substitute: false,
            curse: false,
            aqua_ring: false,

            last_move: None,

            attract: false,
            bide: TempStatus::new("bide", 3, false),
            charge: TempStatus::new("charge", 2, true),
            choice_lock: None,
            damaged: false,
            defense_curl: false,
            destiny_bond: false,
            disabled_move: None,
            disabled: TempStatus::new("disable", 7, false),
            encore_move: None,
            encore: TempStatus::new("encore", 8, false),
            flash_fire: false,
            foresight: false,
            grudge: false,
            heal_block: TempStatus::new("heal block", 5, false),
            imprison: false,
            lock_move: VariableTempStatus::new("lock move", 3, true),
            magic_coat: false,
            minimize: false,
            miracle_eye: false,
            must_recharge: false,
            nightmare: false,
            partially_trapped: TempStatus::new("partially trapped", 5, false),
            rage: false,
            rollout: VariableTempStatus::new("rollout", 5, true),
            roost: false,
            slow_start: TempStatus::new("slow start", 5, false),
            snatch: false,
            stall_turns: 0,
            stalled: false,
            stockpile: 0,
            taunt: TempStatus::new("taunt", 5, false),
            torment: false,
            truant_next: false,
            two_turn: VariableTempStatus::new("two turn", 2, true),
            uproar: TempStatus::new("uproar", 5, false),
            yawn: TempStatus::new("yawn", 2, true),
            override_traits: None,
            override_moveset: None,
            override_types: None,
            active_turns: 0,
        }
    }

    /// Reset everything
    pub fn clear(&mut self) {
        self.clear_passable();
        self.clear_self_switch_passable();
        self.clear_unpassable();
    }

    /// Reset the fields Baton Pass would carry over
    pub fn clear_passable(&mut self) {
        let fresh = Self::new();
        self.boosts = fresh.boosts;
        self.confusion = fresh.confusion;
        self.embargo = fresh.embargo;
        self.focus_energy = false;
        self.gastro_acid = false;
        self.ingrain = false;
        self.leech_seed = false;
        self.magnet_rise = fresh.magnet_rise;
        self.perish = 0;
        self.power_trick = false;
        self.substitute = false;
        self.curse = false;
        self.aqua_ring = false;
    }

    pub fn clear_self_switch_passable(&mut self) {
        self.last_move = None;
    }

    /// Reset the fields no switch carries over
    pub fn clear_unpassable(&mut self) {
        let fresh = Self::new();
        self.attract = false;
        self.bide = fresh.bide;
        self.charge = fresh.charge;
        self.choice_lock = None;
        self.damaged = false;
        self.defense_curl = false;
        self.destiny_bond = false;
        self.disabled_move = None;
        self.disabled = fresh.disabled;
        self.encore_move = None;
        self.encore = fresh.encore;
        self.flash_fire = false;
        self.foresight = false;
        self.grudge = false;
        self.heal_block = fresh.heal_block;
        self.imprison = false;
        self.lock_move = fresh.lock_move;
        self.magic_coat = false;
        self.minimize = false;
        self.miracle_eye = false;
        self.must_recharge = false;
        self.nightmare = false;
        self.partially_trapped = fresh.partially_trapped;
        self.rage = false;
        self.rollout = fresh.rollout;
        self.roost = false;
        self.slow_start = fresh.slow_start;
        self.snatch = false;
        self.stall_turns = 0;
        self.stalled = false;
        self.stockpile = 0;
        self.taunt = fresh.taunt;
        self.torment = false;
        self.truant_next = false;
        self.two_turn = fresh.two_turn;
        self.uproar = fresh.uproar;
        self.yawn = fresh.yawn;
        self.override_traits = None;
        self.override_moveset = None;
        self.override_types = None;
        self.active_turns = 0;
    }

    /// Copy the passable and self-switch passable fields; everything else
    /// starts fresh
    pub fn shallow_clone(&self) -> Self {
        VolatileStatus {
            boosts: self.boosts,
            confusion: self.confusion.clone(),
            embargo: self.embargo.clone(),
            focus_energy: self.focus_energy,
            gastro_acid: self.gastro_acid,
            ingrain: self.ingrain,
            leech_seed: self.leech_seed,
            magnet_rise: self.magnet_rise.clone(),
            perish: self.perish,
            power_trick: self.power_trick,
            substitute: self.substitute,
            curse: self.curse,
            aqua_ring: self.aqua_ring,
            last_move: self.last_move.clone(),
            ..Self::new()
        }
    }

    /// Whether a Protect-like move is in effect this turn
    pub fn is_stalling(&self) -> bool {
        self.stalled
    }

    /// Record a Protect-like move: success extends the streak
    pub fn stall(&mut self, success: bool) {
        self.stalled = success;
        if success {
            self.stall_turns += 1;
        } else {
            self.stall_turns = 0;
        }
    }

    /// End-of-turn bookkeeping for statuses no message updates.
    /// `ability` is the holder's ability, when definitely known.
    pub fn post_turn(&mut self, ability: Option<&str>) {
        self.active_turns += 1;

        self.charge.tick();
        self.disabled.tick();
        if !self.disabled.is_active() {
            self.disabled_move = None;
        }
        self.embargo.tick();
        self.encore.tick();
        if !self.encore.is_active() {
            self.encore_move = None;
        }
        self.heal_block.tick();
        self.magnet_rise.tick();
        self.partially_trapped.tick();
        self.slow_start.tick();
        self.taunt.tick();
        self.two_turn.tick();
        self.uproar.tick();
        self.yawn.tick();

        if ability == Some("truant") {
            self.truant_next = !self.truant_next;
        } else {
            self.truant_next = false;
        }

        // Single-turn flags
        self.damaged = false;
        self.magic_coat = false;
        self.roost = false;
        self.snatch = false;
        if !self.stalled {
            self.stall_turns = 0;
        }
        self.stalled = false;
    }

    /// The pokemon could not act this turn, breaking any move lock that
    /// needs the move to keep executing
    pub fn inactive(&mut self) {
        self.lock_move.end();
        self.rollout.end();
        self.two_turn.end();
        self.stall(false);
    }

    /// Copy another pokemon's traits, boosts and moves
    pub fn transform(&mut self, traits: PokemonTraits, moveset: Moveset, boosts: BoostTable) {
        self.boosts = boosts;
        self.override_types = Some(traits.types.clone());
        self.override_traits = Some(traits);
        self.override_moveset = Some(moveset);
    }

    pub fn is_transformed(&self) -> bool {
        self.override_traits.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sleuth_protocol::BoostStat;

    /// Set every field to a non-default value
    fn everything() -> VolatileStatus {
        let mut v = VolatileStatus::new();
        v.boosts.boost(BoostStat::Atk, 2);
        v.confusion.start();
        v.embargo.start();
        v.focus_energy = true;
        v.gastro_acid = true;
        v.ingrain = true;
        v.leech_seed = true;
        v.magnet_rise.start();
        v.perish = 3;
        v.power_trick = true;
        v.substitute = true;
        v.curse = true;
        v.aqua_ring = true;
        v.last_move = Some("batonpass".to_string());
        v.attract = true;
        v.bide.start();
        v.charge.start();
        v.choice_lock = Some("uturn".to_string());
        v.damaged = true;
        v.defense_curl = true;
        v.destiny_bond = true;
        v.disabled_move = Some("earthquake".to_string());
        v.disabled.start();
        v.encore_move = Some("protect".to_string());
        v.encore.start();
        v.flash_fire = true;
        v.foresight = true;
        v.grudge = true;
        v.heal_block.start();
        v.imprison = true;
        v.lock_move.start("outrage".to_string());
        v.magic_coat = true;
        v.minimize = true;
        v.miracle_eye = true;
        v.must_recharge = true;
        v.nightmare = true;
        v.partially_trapped.start();
        v.rage = true;
        v.rollout.start("rollout".to_string());
        v.roost = true;
        v.slow_start.start();
        v.snatch = true;
        v.stall(true);
        v.stockpile = 2;
        v.taunt.start();
        v.torment = true;
        v.truant_next = true;
        v.two_turn.start("solarbeam".to_string());
        v.uproar.start();
        v.yawn.start();
        v.override_types = Some(vec![Type::Water]);
        v.active_turns = 4;
        v
    }

    #[test]
    fn test_shallow_clone_survives_clear() {
        let mut original = everything();
        let clone = original.shallow_clone();
        original.clear();

        // Passable fields carried over
        assert_eq!(clone.boosts.get(BoostStat::Atk), 2);
        assert!(clone.confusion.is_active());
        assert!(clone.embargo.is_active());
        assert!(clone.focus_energy && clone.gastro_acid && clone.ingrain);
        assert!(clone.leech_seed && clone.substitute && clone.curse && clone.aqua_ring);
        assert!(clone.magnet_rise.is_active());
        assert_eq!(clone.perish, 3);
        assert!(clone.power_trick);
        assert_eq!(clone.last_move.as_deref(), Some("batonpass"));

        // Unpassable fields start fresh
        assert!(!clone.attract && !clone.damaged && !clone.destiny_bond);
        assert!(!clone.bide.is_active() && !clone.charge.is_active());
        assert!(clone.choice_lock.is_none() && clone.disabled_move.is_none());
        assert!(!clone.disabled.is_active() && !clone.encore.is_active());
        assert!(!clone.heal_block.is_active() && !clone.taunt.is_active());
        assert!(!clone.lock_move.is_active() && !clone.rollout.is_active());
        assert!(!clone.two_turn.is_active() && !clone.uproar.is_active());
        assert!(!clone.partially_trapped.is_active() && !clone.slow_start.is_active());
        assert!(!clone.yawn.is_active());
        assert!(!clone.flash_fire && !clone.imprison && !clone.must_recharge);
        assert!(!clone.roost && !clone.snatch && !clone.magic_coat && !clone.truant_next);
        assert_eq!(clone.stall_turns, 0);
        assert_eq!(clone.stockpile, 0);
        assert!(clone.override_types.is_none());
        assert_eq!(clone.active_turns, 0);

        // And the original is fully reset
        assert!(original.boosts.is_clear());
        assert!(original.last_move.is_none());
        assert!(!original.taunt.is_active());
    }

    #[test]
    fn test_clear_groups_are_disjoint() {
        let mut v = everything();
        v.clear_self_switch_passable();
        assert!(v.last_move.is_none());
        assert!(v.substitute);
        assert!(v.taunt.is_active());

        v.clear_unpassable();
        assert!(v.substitute);
        assert!(!v.taunt.is_active());

        v.clear_passable();
        assert!(!v.substitute);
    }

    #[test]
    fn test_post_turn_resets_single_turn_flags() {
        let mut v = VolatileStatus::new();
        v.roost = true;
        v.stall(true);
        v.post_turn(None);
        assert!(!v.roost);
        assert_eq!(v.stall_turns, 1);

        // No stalling move this turn, so the streak resets
        v.post_turn(None);
        assert_eq!(v.stall_turns, 0);
        assert_eq!(v.active_turns, 2);
    }

    #[test]
    fn test_post_turn_ticks_taunt_and_truant() {
        let mut v = VolatileStatus::new();
        v.taunt.start();
        for _ in 0..5 {
            v.post_turn(Some("truant"));
        }
        assert!(!v.taunt.is_active());
        assert!(v.truant_next);
    }

    #[test]
    fn test_inactive_breaks_move_locks() {
        let mut v = VolatileStatus::new();
        v.lock_move.start("outrage".to_string());
        v.two_turn.start("solarbeam".to_string());
        v.inactive();
        assert!(!v.lock_move.is_active());
        assert!(!v.two_turn.is_active());
    }
}
