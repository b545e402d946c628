//! Rejections that wait for the state to narrow.
//!
//! Rejecting "A and B" when neither is decided says only that one of them
//! is false. The open reasons are kept here, each subscribed through
//! [`SubReason::delay`]; a firing subscription marks the registry dirty
//! and the next [`settle_deferred`] re-examines every record.

use super::sub_inference::{Rejection, reject_reasons};
use super::sub_reason::SubReason;
use crate::error::Result;
use crate::state::BattleState;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

#[derive(Debug, Default)]
pub struct DeferredRejections {
    pending: Vec<Vec<Arc<dyn SubReason>>>,
    dirty: Arc<AtomicBool>,
}

impl DeferredRejections {
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Register a rejection of `reasons`, all of which are still undecided
pub(crate) fn defer_rejection(
    state: &mut BattleState,
    reasons: Vec<Arc<dyn SubReason>>,
) -> Result<()> {
    let dirty = Arc::clone(&state.deferred.dirty);
    for reason in &reasons {
        let dirty = Arc::clone(&dirty);
        reason.delay(
            state,
            Box::new(move |_| dirty.store(true, Ordering::Release)),
        )?;
    }
    debug!(reasons = ?reasons, "rejection deferred");
    state.deferred.pending.push(reasons);
    Ok(())
}

/// Resolve every record that has become decidable
pub fn settle_deferred(state: &mut BattleState) -> Result<()> {
    while state.deferred.dirty.swap(false, Ordering::AcqRel) {
        let records = std::mem::take(&mut state.deferred.pending);
        let mut kept = Vec::with_capacity(records.len());
        for reasons in records {
            match reject_reasons(state, &reasons)? {
                Rejection::Resolved => debug!(reasons = ?reasons, "deferred rejection resolved"),
                Rejection::Pending(open) => kept.push(open),
            }
        }
        // Records registered while resolving go after the survivors
        kept.append(&mut state.deferred.pending);
        state.deferred.pending = kept;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dex::Dex;
    use crate::error::BattleError;
    use crate::inference::{AbilityReason, ItemReason, SubInference};
    use crate::state::PokemonKey;
    use sleuth_protocol::{HpStatus, PokemonDetails, PokemonIdent};

    fn state() -> (BattleState, PokemonKey) {
        let mut state = BattleState::new(Dex::gen4().unwrap());
        let key = state
            .switch_in(
                &PokemonIdent::parse("p2a: Clefable").unwrap(),
                &PokemonDetails::parse("Clefable, F"),
                &HpStatus::parse("80/100").unwrap(),
            )
            .unwrap();
        (state, key)
    }

    fn hypothesis(key: PokemonKey) -> SubInference {
        SubInference::new(vec![
            ItemReason::have(key, ["stickybarb"]),
            AbilityReason::not_have(key, ["magicguard"]),
        ])
    }

    #[test]
    fn test_last_open_reason_is_rejected() {
        let (mut state, key) = state();
        hypothesis(key).reject(&mut state).unwrap();
        assert_eq!(state.deferred.len(), 1);

        state.pokemon_mut(key).unwrap().item.narrow(["stickybarb".to_string()]).unwrap();
        state.settle_inferences().unwrap();
        assert!(state.deferred.is_empty());
        assert_eq!(state.known_ability(key), Some("magicguard"));
    }

    #[test]
    fn test_record_dropped_when_a_reason_fails() {
        let (mut state, key) = state();
        hypothesis(key).reject(&mut state).unwrap();

        state.ability_mut(key).unwrap().narrow(["magicguard".to_string()]).unwrap();
        let items = state.pokemon(key).unwrap().item.len();
        state.settle_inferences().unwrap();
        assert!(state.deferred.is_empty());
        assert_eq!(state.pokemon(key).unwrap().item.len(), items);
    }

    #[test]
    fn test_all_reasons_holding_is_fatal() {
        let (mut state, key) = state();
        hypothesis(key).reject(&mut state).unwrap();

        state.pokemon_mut(key).unwrap().item.narrow(["stickybarb".to_string()]).unwrap();
        state.ability_mut(key).unwrap().narrow(["cutecharm".to_string()]).unwrap();
        assert!(matches!(
            state.settle_inferences(),
            Err(BattleError::Contradiction(_))
        ));
    }

    #[test]
    fn test_settle_without_changes_keeps_records() {
        let (mut state, key) = state();
        hypothesis(key).reject(&mut state).unwrap();
        state.settle_inferences().unwrap();
        assert_eq!(state.deferred.len(), 1);
    }
}
