//! Conditions on the whole field

use super::{DurationInference, ItemTempStatus, TempStatus};
use crate::types::Weather;

#[derive(Debug, Clone)]
pub struct RoomStatus {
    /// Ticked by `|-weather|...|[upkeep]` messages rather than by
    /// [`RoomStatus::post_turn`]
    pub weather: ItemTempStatus<Weather>,
    pub gravity: TempStatus,
    pub trick_room: TempStatus,
}

impl Default for RoomStatus {
    fn default() -> Self {
        RoomStatus {
            weather: ItemTempStatus::new("weather", 5, 8),
            gravity: TempStatus::new("gravity", 5, false),
            trick_room: TempStatus::new("trick room", 5, false),
        }
    }
}

impl RoomStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_weather(&self) -> Option<Weather> {
        self.weather.kind().copied()
    }

    /// Weather announced its continuation at end of turn
    pub fn weather_upkeep(&mut self) -> Option<DurationInference> {
        self.weather.tick()
    }

    pub fn post_turn(&mut self) {
        self.gravity.tick();
        self.trick_room.tick();
    }

    /// A |-fieldstart| condition. Returns false if it is not tracked.
    pub fn start(&mut self, condition: &str) -> bool {
        match sleuth_protocol::to_id(condition).as_str() {
            "gravity" => self.gravity.start(),
            "trickroom" => self.trick_room.start(),
            _ => return false,
        }
        true
    }

    pub fn end(&mut self, condition: &str) {
        match sleuth_protocol::to_id(condition).as_str() {
            "gravity" => self.gravity.end(),
            "trickroom" => self.trick_room.end(),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::PokemonKey;
    use sleuth_protocol::SideId;

    #[test]
    fn test_rain_past_five_turns_needs_damp_rock() {
        let source = PokemonKey::new(SideId::P2, 0);
        let mut room = RoomStatus::new();
        room.weather
            .start(Weather::Rain, Some(source), Some("damprock".to_string()), false);

        for _ in 0..4 {
            assert_eq!(room.weather_upkeep(), None);
        }
        assert_eq!(
            room.weather_upkeep(),
            Some(DurationInference::Extended {
                source,
                item: "damprock".to_string()
            })
        );
        assert_eq!(room.current_weather(), Some(Weather::Rain));
    }

    #[test]
    fn test_ability_weather_never_expires() {
        let mut room = RoomStatus::new();
        room.weather.start(Weather::Sand, None, None, true);
        for _ in 0..20 {
            assert_eq!(room.weather_upkeep(), None);
        }
        assert_eq!(room.current_weather(), Some(Weather::Sand));
        assert!(!room.start("Magic Room"));
        assert!(room.start("Trick Room"));
        assert!(room.trick_room.is_active());
    }
}
