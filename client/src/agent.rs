use anyhow::Result;
use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use sleuth_battle::{BattleAgent, BattleState};
use sleuth_protocol::Choice;

/// Prefers legal choices in a random order
pub struct RandomAgent {
    rng: StdRng,
}

impl RandomAgent {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Same choices for the same seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BattleAgent for RandomAgent {
    async fn decide(&mut self, _state: &BattleState, choices: &mut Vec<Choice>) -> Result<()> {
        choices.shuffle(&mut self.rng);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sleuth_battle::Dex;

    #[tokio::test]
    async fn test_shuffle_keeps_every_choice() {
        let state = BattleState::new(Dex::gen4().unwrap());
        let original = vec![
            Choice::Move(1),
            Choice::Move(2),
            Choice::Switch(2),
            Choice::Switch(5),
        ];

        let mut first = original.clone();
        RandomAgent::seeded(42).decide(&state, &mut first).await.unwrap();
        let mut sorted = first.clone();
        sorted.sort_by_key(|c| c.to_string());
        let mut expected = original.clone();
        expected.sort_by_key(|c| c.to_string());
        assert_eq!(sorted, expected);

        let mut second = original.clone();
        RandomAgent::seeded(42).decide(&state, &mut second).await.unwrap();
        assert_eq!(first, second);
    }
}
