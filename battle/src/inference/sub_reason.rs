use crate::error::Result;
use crate::state::{BattleState, PossibilityClass};
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

/// Invoked once a delayed reason is decided, with whether it held
pub type DelayCallback = Box<dyn FnOnce(bool) + Send + Sync>;

/// An atomic claim about the belief state, such as "this pokemon holds
/// one of these items".
pub trait SubReason: fmt::Debug + Send + Sync {
    /// Some(true) if the claim must hold, Some(false) if it cannot, None
    /// while the state allows both
    fn can_hold(&self, state: &BattleState) -> Result<Option<bool>>;

    /// Commit the state to the claim being true
    fn assert(&self, state: &mut BattleState) -> Result<()>;

    /// Commit the state to the claim being false
    fn reject(&self, state: &mut BattleState) -> Result<()>;

    /// Call `callback` once the claim is decided, immediately if it already is
    fn delay(&self, state: &mut BattleState, callback: DelayCallback) -> Result<()>;
}

/// Claims of the form "value is in `set`", negated when `negative`
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Membership<T: Eq + Hash> {
    pub set: HashSet<T>,
    pub negative: bool,
}

impl<T> Membership<T>
where
    T: Eq + Hash + Clone + fmt::Debug,
{
    pub fn new(set: impl IntoIterator<Item = T>, negative: bool) -> Self {
        Membership {
            set: set.into_iter().collect(),
            negative,
        }
    }

    pub fn can_hold(&self, class: &PossibilityClass<T>) -> Option<bool> {
        class.check(&self.set).map(|inside| inside != self.negative)
    }

    /// Narrow `class` so the claim becomes `holds`
    pub fn commit(&self, class: &mut PossibilityClass<T>, holds: bool) -> Result<()> {
        if holds != self.negative {
            class.narrow(self.set.iter().cloned())
        } else {
            class.remove(self.set.iter().cloned())
        }
    }

    pub fn delay(&self, class: &mut PossibilityClass<T>, callback: DelayCallback) {
        class.on_update(self.set.iter().cloned(), self.negative, callback);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn class() -> PossibilityClass<&'static str> {
        PossibilityClass::new("ability", ["levitate", "flashfire", "pressure"])
    }

    #[test]
    fn test_negative_membership_inverts() {
        let mut class = class();
        let not_levitate = Membership::new(["levitate"], true);
        assert_eq!(not_levitate.can_hold(&class), None);

        not_levitate.commit(&mut class, true).unwrap();
        assert!(!class.is_set(&"levitate"));
        assert_eq!(not_levitate.can_hold(&class), Some(true));
    }

    #[test]
    fn test_delay_fires_on_decision() {
        let mut class = class();
        let has_pressure = Membership::new(["pressure"], false);
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        has_pressure.delay(
            &mut class,
            Box::new(move |held| flag.store(!held, Ordering::SeqCst)),
        );
        assert!(!fired.load(Ordering::SeqCst));

        class.narrow(["levitate", "flashfire"]).unwrap();
        assert!(fired.load(Ordering::SeqCst));
    }
}
