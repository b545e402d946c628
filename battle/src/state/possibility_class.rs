//! Narrowing candidate sets for hidden values.

use crate::error::{BattleError, Result};
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

/// Handle returned by [`PossibilityClass::on_update`], used to cancel the
/// subscription before it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Callback = Box<dyn FnOnce(bool) + Send + Sync>;

struct Listener<T> {
    id: ListenerId,
    target: HashSet<T>,
    negative: bool,
    callback: Callback,
}

impl<T: Eq + Hash> Listener<T> {
    /// Whether the claim ("value is in target", or its negation) is now
    /// decided, and which way.
    fn decide(&self, values: &HashSet<T>) -> Option<bool> {
        containment(values, &self.target).map(|held| held != self.negative)
    }
}

/// Some(true) if every value is in `target`, Some(false) if none is
fn containment<T: Eq + Hash>(values: &HashSet<T>, target: &HashSet<T>) -> Option<bool> {
    if values.iter().all(|v| target.contains(v)) {
        Some(true)
    } else if values.iter().all(|v| !target.contains(v)) {
        Some(false)
    } else {
        None
    }
}

/// A hidden value known to be one of several candidates.
///
/// The candidate set only ever shrinks. Operations that would empty it
/// fail with [`BattleError::OverNarrowed`] and leave the set untouched.
pub struct PossibilityClass<T> {
    kind: &'static str,
    values: HashSet<T>,
    listeners: Vec<Listener<T>>,
    next_id: u64,
}

impl<T> PossibilityClass<T>
where
    T: Eq + Hash + Clone + fmt::Debug,
{
    /// Create a class over a full candidate universe. `kind` names the
    /// tracked datum in error messages ("item", "ability", ...).
    pub fn new(kind: &'static str, values: impl IntoIterator<Item = T>) -> Self {
        PossibilityClass {
            kind,
            values: values.into_iter().collect(),
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    /// Create an already-definite class
    pub fn definite(kind: &'static str, value: T) -> Self {
        Self::new(kind, [value])
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn possible_values(&self) -> &HashSet<T> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether `value` is still a candidate
    pub fn is_set(&self, value: &T) -> bool {
        self.values.contains(value)
    }

    pub fn is_definite(&self) -> bool {
        self.values.len() == 1
    }

    /// The value, once only one candidate remains
    pub fn definite_value(&self) -> Option<&T> {
        if self.is_definite() {
            self.values.iter().next()
        } else {
            None
        }
    }

    /// Whether the value is known to be in `target` (Some(true)), known not
    /// to be (Some(false)), or still undecided
    pub fn check(&self, target: &HashSet<T>) -> Option<bool> {
        containment(&self.values, target)
    }

    /// Intersect the candidates with `values`
    pub fn narrow(&mut self, values: impl IntoIterator<Item = T>) -> Result<()> {
        let keep: HashSet<T> = values.into_iter().collect();
        let narrowed: HashSet<T> = self
            .values
            .iter()
            .filter(|v| keep.contains(*v))
            .cloned()
            .collect();
        if narrowed.is_empty() {
            return Err(self.over_narrowed(format!("narrow to {:?}", keep)));
        }
        self.replace(narrowed);
        Ok(())
    }

    /// Remove `values` from the candidates
    pub fn remove(&mut self, values: impl IntoIterator<Item = T>) -> Result<()> {
        let drop: HashSet<T> = values.into_iter().collect();
        let remaining: HashSet<T> = self
            .values
            .iter()
            .filter(|v| !drop.contains(*v))
            .cloned()
            .collect();
        if remaining.is_empty() {
            return Err(self.over_narrowed(format!("remove {:?}", drop)));
        }
        self.replace(remaining);
        Ok(())
    }

    /// Subscribe to the moment the candidates become a subset of `target`
    /// or disjoint from it. The callback receives whether the claim holds,
    /// where the claim is "value is in target" (or "is not", when
    /// `negative`). Fires exactly once, immediately if already decided.
    pub fn on_update(
        &mut self,
        target: impl IntoIterator<Item = T>,
        negative: bool,
        callback: impl FnOnce(bool) + Send + Sync + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        let listener = Listener {
            id,
            target: target.into_iter().collect(),
            negative,
            callback: Box::new(callback),
        };
        match listener.decide(&self.values) {
            Some(held) => (listener.callback)(held),
            None => self.listeners.push(listener),
        }
        id
    }

    /// Drop a pending subscription. Returns false if it already fired.
    pub fn cancel(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        self.listeners.len() != before
    }

    /// Copy of the current candidates without any subscriptions
    pub fn snapshot(&self) -> Self {
        Self::new(self.kind, self.values.iter().cloned())
    }

    fn replace(&mut self, values: HashSet<T>) {
        if values.len() == self.values.len() {
            return;
        }
        self.values = values;

        let mut fired = Vec::new();
        let mut pending = Vec::new();
        for listener in self.listeners.drain(..) {
            match listener.decide(&self.values) {
                Some(held) => fired.push((listener.callback, held)),
                None => pending.push(listener),
            }
        }
        self.listeners = pending;
        for (callback, held) in fired {
            callback(held);
        }
    }

    fn over_narrowed(&self, operation: String) -> BattleError {
        BattleError::OverNarrowed {
            what: format!("{} {:?}", self.kind, self.values),
            operation,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for PossibilityClass<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PossibilityClass")
            .field("kind", &self.kind)
            .field("values", &self.values)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn items() -> PossibilityClass<&'static str> {
        PossibilityClass::new("item", ["leftovers", "lifeorb", "choiceband", "blacksludge"])
    }

    #[test]
    fn test_narrow_is_monotonic() {
        let mut class = items();
        let before = class.possible_values().clone();
        class.narrow(["leftovers", "lifeorb", "expertbelt"]).unwrap();
        assert!(class.possible_values().is_subset(&before));
        assert_eq!(class.len(), 2);

        let before = class.possible_values().clone();
        class.remove(["lifeorb"]).unwrap();
        assert!(class.possible_values().is_subset(&before));
        assert_eq!(class.definite_value(), Some(&"leftovers"));
    }

    #[test]
    fn test_over_narrow_leaves_class_unchanged() {
        let mut class = items();
        let before = class.possible_values().clone();

        let err = class.narrow(["expertbelt"]).unwrap_err();
        assert!(matches!(err, BattleError::OverNarrowed { .. }));
        assert_eq!(class.possible_values(), &before);

        let err = class.remove(before.iter().copied()).unwrap_err();
        assert!(matches!(err, BattleError::OverNarrowed { .. }));
        assert_eq!(class.possible_values(), &before);
    }

    #[test]
    fn test_listener_fires_once_when_decided() {
        let mut class = items();
        let calls = Arc::new(AtomicUsize::new(0));
        let held = Arc::new(AtomicUsize::new(0));

        let (c, h) = (calls.clone(), held.clone());
        class.on_update(["leftovers", "blacksludge"], false, move |result| {
            c.fetch_add(1, Ordering::SeqCst);
            if result {
                h.fetch_add(1, Ordering::SeqCst);
            }
        });

        class.remove(["choiceband"]).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        class.remove(["lifeorb"]).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(held.load(Ordering::SeqCst), 1);

        class.narrow(["leftovers"]).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_negative_listener_and_immediate_fire() {
        let mut class = items();
        class.narrow(["lifeorb", "choiceband"]).unwrap();

        let held = Arc::new(AtomicUsize::new(0));
        let h = held.clone();
        // Already disjoint from the target, so "not leftovers" holds now
        class.on_update(["leftovers"], true, move |result| {
            assert!(result);
            h.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(held.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_check_containment() {
        let class = items();
        let healing: HashSet<_> = ["leftovers", "blacksludge"].into_iter().collect();
        assert_eq!(class.check(&healing), None);

        let mut class = class;
        class.narrow(["leftovers"]).unwrap();
        assert_eq!(class.check(&healing), Some(true));
        class.narrow(["leftovers"]).unwrap();
        let orbs: HashSet<_> = ["toxicorb"].into_iter().collect();
        assert_eq!(class.check(&orbs), Some(false));
    }

    #[test]
    fn test_cancel_listener() {
        let mut class = items();
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        let id = class.on_update(["leftovers"], false, move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        assert!(class.cancel(id));
        class.narrow(["leftovers"]).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!class.cancel(id));
    }
}
