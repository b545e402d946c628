//! Conditions on one side of the field

use super::{DurationInference, ItemTempStatus, TempStatus};
use crate::dex::SelfSwitchKind;
use sleuth_protocol::to_id;

#[derive(Debug, Clone)]
pub struct TeamStatus {
    pub reflect: ItemTempStatus<()>,
    pub light_screen: ItemTempStatus<()>,
    pub lucky_chant: TempStatus,
    pub mist: TempStatus,
    pub safeguard: TempStatus,
    pub tailwind: TempStatus,
    pub spikes: u8,
    pub toxic_spikes: u8,
    pub stealth_rock: bool,
    /// Next pokemon to switch in gets healed
    pub healing_wish: bool,
    pub lunar_dance: bool,
    pub wish: TempStatus,
    pub future_sight: TempStatus,
    pub doom_desire: TempStatus,
    /// The active pokemon used a self-switch move and is about to leave
    pub self_switch: Option<SelfSwitchKind>,
}

impl Default for TeamStatus {
    fn default() -> Self {
        TeamStatus {
            reflect: ItemTempStatus::new("reflect", 5, 8),
            light_screen: ItemTempStatus::new("light screen", 5, 8),
            lucky_chant: TempStatus::new("lucky chant", 5, false),
            mist: TempStatus::new("mist", 5, false),
            safeguard: TempStatus::new("safeguard", 5, false),
            tailwind: TempStatus::new("tailwind", 3, false),
            spikes: 0,
            toxic_spikes: 0,
            stealth_rock: false,
            healing_wish: false,
            lunar_dance: false,
            wish: TempStatus::new("wish", 2, true),
            future_sight: TempStatus::new("future sight", 3, true),
            doom_desire: TempStatus::new("doom desire", 3, true),
            self_switch: None,
        }
    }
}

impl TeamStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tick the turn-counted conditions, collecting what screen expiry
    /// (or survival) says about the setter's item
    pub fn post_turn(&mut self) -> Vec<DurationInference> {
        let inferences = [self.reflect.tick(), self.light_screen.tick()]
            .into_iter()
            .flatten()
            .collect();
        self.lucky_chant.tick();
        self.mist.tick();
        self.safeguard.tick();
        self.tailwind.tick();
        self.wish.tick();
        self.future_sight.tick();
        self.doom_desire.tick();
        inferences
    }

    /// A |-sidestart| condition. Returns false if it is not tracked.
    pub fn start(&mut self, condition: &str) -> bool {
        match to_id(condition).as_str() {
            "spikes" => self.spikes = (self.spikes + 1).min(3),
            "toxicspikes" => self.toxic_spikes = (self.toxic_spikes + 1).min(2),
            "stealthrock" => self.stealth_rock = true,
            "luckychant" => self.lucky_chant.start(),
            "mist" => self.mist.start(),
            "safeguard" => self.safeguard.start(),
            "tailwind" => self.tailwind.start(),
            _ => return false,
        }
        true
    }

    /// A |-sideend| condition. Screens return their duration inference.
    pub fn end(&mut self, condition: &str) -> Option<DurationInference> {
        match to_id(condition).as_str() {
            "reflect" => return self.reflect.end(),
            "lightscreen" => return self.light_screen.end(),
            "spikes" => self.spikes = 0,
            "toxicspikes" => self.toxic_spikes = 0,
            "stealthrock" => self.stealth_rock = false,
            "luckychant" => self.lucky_chant.end(),
            "mist" => self.mist.end(),
            "safeguard" => self.safeguard.end(),
            "tailwind" => self.tailwind.end(),
            _ => {}
        }
        None
    }

    /// Hazards are cleared (Rapid Spin)
    pub fn clear_hazards(&mut self) {
        self.spikes = 0;
        self.toxic_spikes = 0;
        self.stealth_rock = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::PokemonKey;
    use sleuth_protocol::SideId;

    #[test]
    fn test_hazard_layers_cap() {
        let mut status = TeamStatus::new();
        for _ in 0..4 {
            status.start("Spikes");
        }
        assert_eq!(status.spikes, 3);
        for _ in 0..3 {
            status.start("Toxic Spikes");
        }
        assert_eq!(status.toxic_spikes, 2);
        assert!(!status.start("Gravity"));
        status.clear_hazards();
        assert_eq!(status.spikes, 0);
    }

    #[test]
    fn test_screen_ending_on_time_rules_out_light_clay() {
        let source = PokemonKey::new(SideId::P2, 1);
        let mut status = TeamStatus::new();
        status
            .reflect
            .start((), Some(source), Some("lightclay".to_string()), false);
        for _ in 0..4 {
            assert!(status.post_turn().is_empty());
        }
        assert_eq!(
            status.end("Reflect"),
            Some(DurationInference::NotExtended {
                source,
                item: "lightclay".to_string()
            })
        );
    }
}
