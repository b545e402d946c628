//! Statuses whose length depends on the source's held item

use super::PokemonKey;
use tracing::warn;

/// What the observed length of an [`ItemTempStatus`] reveals about the
/// item its source held when the status started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DurationInference {
    /// Lasted past the normal duration: the source holds the extender
    Extended { source: PokemonKey, item: String },
    /// Ended exactly at the normal duration: the source lacks it
    NotExtended { source: PokemonKey, item: String },
}

/// Weather or screen whose duration is `normal` turns, or `extended`
/// turns when the pokemon that started it holds `extender`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemTempStatus<T> {
    name: &'static str,
    normal: u32,
    extended: u32,
    kind: Option<T>,
    turns: u32,
    source: Option<PokemonKey>,
    extender: Option<String>,
    infinite: bool,
}

impl<T: Clone + PartialEq> ItemTempStatus<T> {
    pub fn new(name: &'static str, normal: u32, extended: u32) -> Self {
        ItemTempStatus {
            name,
            normal,
            extended,
            kind: None,
            turns: 0,
            source: None,
            extender: None,
            infinite: false,
        }
    }

    pub fn kind(&self) -> Option<&T> {
        self.kind.as_ref()
    }

    pub fn turns(&self) -> u32 {
        self.turns
    }

    pub fn source(&self) -> Option<PokemonKey> {
        self.source
    }

    pub fn is_active(&self) -> bool {
        self.turns > 0
    }

    pub fn is_infinite(&self) -> bool {
        self.infinite
    }

    /// Start the status. `extender` is the item that would lengthen it
    /// when held by `source`; `infinite` statuses never tick out.
    pub fn start(
        &mut self,
        kind: T,
        source: Option<PokemonKey>,
        extender: Option<String>,
        infinite: bool,
    ) {
        self.kind = Some(kind);
        self.turns = 1;
        self.source = source;
        self.extender = extender;
        self.infinite = infinite;
    }

    /// Advance one turn. Surviving past the normal duration proves the
    /// source holds the extender.
    pub fn tick(&mut self) -> Option<DurationInference> {
        if !self.is_active() || self.infinite {
            return None;
        }
        if self.turns >= self.extended {
            warn!(
                status = self.name,
                turns = self.turns,
                "status outlasted its extended duration"
            );
            self.reset();
            return None;
        }
        let inference = if self.turns == self.normal {
            self.source
                .zip(self.extender.clone())
                .map(|(source, item)| DurationInference::Extended { source, item })
        } else {
            None
        };
        self.turns += 1;
        inference
    }

    /// End the status. Ending right at the normal duration proves the
    /// source lacked the extender.
    pub fn end(&mut self) -> Option<DurationInference> {
        let inference = if self.is_active() && !self.infinite && self.turns == self.normal {
            self.source
                .zip(self.extender.clone())
                .map(|(source, item)| DurationInference::NotExtended { source, item })
        } else {
            None
        };
        self.reset();
        inference
    }

    fn reset(&mut self) {
        self.kind = None;
        self.turns = 0;
        self.source = None;
        self.extender = None;
        self.infinite = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sleuth_protocol::SideId;

    fn source() -> PokemonKey {
        PokemonKey::new(SideId::P2, 0)
    }

    fn rain() -> ItemTempStatus<&'static str> {
        let mut status = ItemTempStatus::new("weather", 5, 8);
        status.start("RainDance", Some(source()), Some("damprock".to_string()), false);
        status
    }

    #[test]
    fn test_end_at_normal_duration() {
        let mut status = rain();
        for _ in 0..4 {
            assert_eq!(status.tick(), None);
        }
        assert_eq!(
            status.end(),
            Some(DurationInference::NotExtended {
                source: source(),
                item: "damprock".to_string()
            })
        );
        assert!(!status.is_active());
    }

    #[test]
    fn test_survive_past_normal_duration() {
        let mut status = rain();
        for _ in 0..4 {
            status.tick();
        }
        assert_eq!(
            status.tick(),
            Some(DurationInference::Extended {
                source: source(),
                item: "damprock".to_string()
            })
        );
        assert_eq!(status.turns(), 6);
    }

    #[test]
    fn test_early_end_and_infinite() {
        let mut status = rain();
        status.tick();
        assert_eq!(status.end(), None);

        status.start("Sandstorm", Some(source()), None, true);
        for _ in 0..10 {
            assert_eq!(status.tick(), None);
        }
        assert!(status.is_active());
    }
}
