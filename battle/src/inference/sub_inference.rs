use super::deferred::defer_rejection;
use super::sub_reason::SubReason;
use crate::error::{BattleError, Result};
use crate::state::BattleState;
use std::sync::Arc;

/// One hypothesis: a conjunction of reasons that must all hold together.
#[derive(Debug, Clone, Default)]
pub struct SubInference {
    reasons: Vec<Arc<dyn SubReason>>,
}

/// What rejecting a set of reasons came to
pub(crate) enum Rejection {
    /// Done: some reason was already false, or the last open one was rejected
    Resolved,
    /// More than one reason is still open
    Pending(Vec<Arc<dyn SubReason>>),
}

impl SubInference {
    pub fn new(reasons: Vec<Arc<dyn SubReason>>) -> Self {
        SubInference { reasons }
    }

    pub fn reasons(&self) -> &[Arc<dyn SubReason>] {
        &self.reasons
    }

    /// No reason is known to be false
    pub fn is_possible(&self, state: &BattleState) -> Result<bool> {
        for reason in &self.reasons {
            if reason.can_hold(state)? == Some(false) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Every reason is known to hold already
    pub fn is_certain(&self, state: &BattleState) -> Result<bool> {
        for reason in &self.reasons {
            if reason.can_hold(state)? != Some(true) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// The hypothesis is true: every reason holds
    pub fn accept(&self, state: &mut BattleState) -> Result<()> {
        for reason in &self.reasons {
            reason.assert(state)?;
        }
        Ok(())
    }

    /// The hypothesis is false: at least one reason fails. When more than
    /// one is still undecided the rejection waits for the state to narrow.
    pub fn reject(&self, state: &mut BattleState) -> Result<()> {
        match reject_reasons(state, &self.reasons)? {
            Rejection::Resolved => Ok(()),
            Rejection::Pending(open) => defer_rejection(state, open),
        }
    }
}

/// Reject a conjunction as far as the current state allows
pub(crate) fn reject_reasons(
    state: &mut BattleState,
    reasons: &[Arc<dyn SubReason>],
) -> Result<Rejection> {
    let mut open = Vec::new();
    for reason in reasons {
        match reason.can_hold(state)? {
            Some(false) => return Ok(Rejection::Resolved),
            Some(true) => {}
            None => open.push(Arc::clone(reason)),
        }
    }
    match open.len() {
        0 => Err(BattleError::Contradiction(format!(
            "rejected hypothesis holds: {reasons:?}"
        ))),
        1 => {
            open[0].reject(state)?;
            Ok(Rejection::Resolved)
        }
        _ => Ok(Rejection::Pending(open)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dex::Dex;
    use crate::inference::{AbilityReason, ItemReason};
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

    fn leftovers_without_klutz(key: PokemonKey) -> SubInference {
        SubInference::new(vec![
            ItemReason::have(key, ["leftovers"]),
            AbilityReason::not_have(key, ["klutz"]),
        ])
    }

    #[test]
    fn test_reject_with_one_open_reason() {
        let (mut state, key) = state();
        state.ability_mut(key).unwrap().narrow(["magicguard".to_string()]).unwrap();

        leftovers_without_klutz(key).reject(&mut state).unwrap();
        assert!(!state.pokemon(key).unwrap().item.is_set(&"leftovers".to_string()));
        assert!(state.deferred.is_empty());
    }

    #[test]
    fn test_reject_already_false_is_noop() {
        let (mut state, key) = state();
        state.pokemon_mut(key).unwrap().item.remove(["leftovers".to_string()]).unwrap();
        let before = state.pokemon(key).unwrap().item.len();

        leftovers_without_klutz(key).reject(&mut state).unwrap();
        assert_eq!(state.pokemon(key).unwrap().item.len(), before);
    }

    #[test]
    fn test_reject_certain_hypothesis_is_contradiction() {
        let (mut state, key) = state();
        let hypothesis = leftovers_without_klutz(key);
        hypothesis.accept(&mut state).unwrap();
        assert!(hypothesis.is_certain(&state).unwrap());
        assert!(matches!(
            hypothesis.reject(&mut state),
            Err(BattleError::Contradiction(_))
        ));
    }
}
