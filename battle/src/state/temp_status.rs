//! Turn-counted statuses

use tracing::warn;

/// A status that lasts a bounded number of turns.
///
/// `turns` counts the turns the status has been active, starting at 1 and
/// never exceeding `duration`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TempStatus {
    name: &'static str,
    duration: u32,
    /// Whether the status may expire without a game message
    silent: bool,
    turns: u32,
}

impl TempStatus {
    pub fn new(name: &'static str, duration: u32, silent: bool) -> Self {
        TempStatus {
            name,
            duration,
            silent,
            turns: 0,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn turns(&self) -> u32 {
        self.turns
    }

    pub fn is_active(&self) -> bool {
        self.turns > 0
    }

    /// Start (or restart) the status
    pub fn start(&mut self) {
        self.turns = 1;
    }

    /// Advance one turn, ending the status once its duration is used up
    pub fn tick(&mut self) {
        if !self.is_active() {
            return;
        }
        if self.turns >= self.duration {
            if !self.silent {
                warn!(
                    status = self.name,
                    duration = self.duration,
                    "status outlasted its duration without an end message"
                );
            }
            self.end();
            return;
        }
        self.turns += 1;
    }

    pub fn end(&mut self) {
        self.turns = 0;
    }
}

/// A [`TempStatus`] that also remembers which variant is active
/// (the locked move, the two-turn move being charged, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableTempStatus<T> {
    inner: TempStatus,
    kind: Option<T>,
}

impl<T: Clone + PartialEq> VariableTempStatus<T> {
    pub fn new(name: &'static str, duration: u32, silent: bool) -> Self {
        VariableTempStatus {
            inner: TempStatus::new(name, duration, silent),
            kind: None,
        }
    }

    pub fn kind(&self) -> Option<&T> {
        self.kind.as_ref()
    }

    pub fn turns(&self) -> u32 {
        self.inner.turns()
    }

    pub fn is_active(&self) -> bool {
        self.inner.is_active()
    }

    pub fn start(&mut self, kind: T) {
        self.kind = Some(kind);
        self.inner.start();
    }

    pub fn tick(&mut self) {
        self.inner.tick();
        if !self.inner.is_active() {
            self.kind = None;
        }
    }

    pub fn end(&mut self) {
        self.inner.end();
        self.kind = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_ends_at_duration() {
        for duration in 1..=8 {
            let mut status = TempStatus::new("taunt", duration, true);
            status.start();
            let mut ended_at = None;
            for tick in 1..=duration {
                status.tick();
                if !status.is_active() && ended_at.is_none() {
                    ended_at = Some(tick);
                }
                assert!(status.turns() <= duration);
            }
            assert_eq!(ended_at, Some(duration));
        }
    }

    #[test]
    fn test_inactive_tick_is_noop() {
        let mut status = TempStatus::new("embargo", 5, false);
        status.tick();
        assert!(!status.is_active());
        assert_eq!(status.turns(), 0);
    }

    #[test]
    fn test_restart_resets_counter() {
        let mut status = TempStatus::new("confusion", 5, true);
        status.start();
        status.tick();
        status.tick();
        assert_eq!(status.turns(), 3);
        status.start();
        assert_eq!(status.turns(), 1);
        status.end();
        assert!(!status.is_active());
    }

    #[test]
    fn test_variable_status_clears_kind() {
        let mut lock = VariableTempStatus::new("lockedmove", 2, true);
        lock.start("outrage".to_string());
        assert_eq!(lock.kind().map(String::as_str), Some("outrage"));
        lock.tick();
        assert!(lock.is_active());
        lock.tick();
        assert!(!lock.is_active());
        assert!(lock.kind().is_none());
    }
}
