//! The send/retry loop run whenever the server wants a choice

use super::SenderResult;
use super::choices::{get_choices, move_slots, traps};
use crate::error::{BattleError, Result};
use crate::parser::BattleParserContext;
use crate::state::{BattleState, LinkKind, PokemonKey};
use sleuth_protocol::Choice;
use tracing::{debug, warn};

/// Pick and send a choice, narrowing the state on informative rejections
/// and retrying until one is accepted.
pub async fn decide(ctx: &mut BattleParserContext, switch_only: bool) -> Result<()> {
    let mut choices = get_choices(&ctx.state, switch_only)?;
    if choices.is_empty() {
        return Err(BattleError::NoChoices);
    }
    ask_agent(ctx, &mut choices).await?;

    loop {
        let Some(&choice) = choices.first() else {
            return Err(BattleError::NoChoices);
        };
        debug!(turn = ctx.state.turn, %choice, "sending choice");
        let result = ctx
            .sender
            .send(choice)
            .await
            .map_err(|e| BattleError::Sender(e.to_string()))?;

        match result {
            SenderResult::Accepted => {
                debug!(%choice, "choice accepted");
                return Ok(());
            }
            SenderResult::Rejected => {
                warn!(%choice, "choice rejected without a reason, dropping it");
                choices.remove(0);
            }
            SenderResult::Disabled => {
                let Choice::Move(slot) = choice else {
                    return Err(mismatch(choice, "disabled"));
                };
                disabled(&mut ctx.state, slot)?;
                choices.remove(0);
                ask_agent(ctx, &mut choices).await?;
            }
            SenderResult::Trapped => {
                if !choice.is_switch() {
                    return Err(mismatch(choice, "trapped"));
                }
                choices.retain(|c| !c.is_switch());
                trapped(&mut ctx.state)?;
                ask_agent(ctx, &mut choices).await?;
            }
        }
    }
}

async fn ask_agent(ctx: &mut BattleParserContext, choices: &mut Vec<Choice>) -> Result<()> {
    if choices.is_empty() {
        return Ok(());
    }
    ctx.agent
        .decide(&ctx.state, choices)
        .await
        .map_err(|e| BattleError::Agent(e.to_string()))
}

fn mismatch(choice: Choice, reason: &str) -> BattleError {
    BattleError::RejectMismatch {
        choice: choice.to_string(),
        reason: reason.to_string(),
    }
}

fn our_active(state: &BattleState) -> Option<PokemonKey> {
    state.our_side.and_then(|side| state.active_key(side))
}

/// The move in `slot` is blocked by something we have not seen. Under the
/// opponent's Imprison that means the opponent knows it too, otherwise the
/// move is treated as disabled for the rest of this decision.
fn disabled(state: &mut BattleState, slot: u8) -> Result<()> {
    let Some(ours) = our_active(state) else {
        return Ok(());
    };
    let Some((_, id, _)) = move_slots(state, ours)?
        .into_iter()
        .find(|(n, _, _)| *n == slot)
    else {
        return Ok(());
    };

    let imprisoner = state
        .opponent_of(ours)
        .filter(|&opponent| state.volatile(opponent).is_some_and(|v| v.imprison));
    match imprisoner {
        Some(opponent) => {
            let moveset = state.moveset_mut(opponent)?;
            if moveset.could_have(&id) {
                debug!(%opponent, move_id = %id, "imprison reveals a shared move");
                moveset.reveal(&id)?;
            }
        }
        None => {
            debug!(move_id = %id, "move disabled by an unseen effect");
            if let Some(volatile) = state.volatile_mut(ours) {
                volatile.disabled.start();
                volatile.disabled_move = Some(id);
            }
        }
    }
    Ok(())
}

/// A switch was refused: the opponent is trapping us, with a trapping
/// ability if nothing visible explains it
fn trapped(state: &mut BattleState) -> Result<()> {
    let Some(ours) = our_active(state) else {
        return Ok(());
    };
    let Some(opponent) = state.opponent_of(ours) else {
        return Ok(());
    };
    state.links.link(LinkKind::Trap, opponent, ours);

    let mut trappers = Vec::new();
    for id in state.ability(opponent)?.possible_values() {
        let trap = state.dex().ability(id).and_then(|data| data.trap);
        if let Some(trap) = trap
            && traps(state, trap, ours)?
        {
            trappers.push(id.clone());
        }
    }
    if trappers.is_empty() {
        debug!(%opponent, "trapped without a candidate trapping ability");
        return Ok(());
    }
    debug!(%opponent, ?trappers, "trapped by an ability");
    state.ability_mut(opponent)?.narrow(trappers)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::decision::SenderResult;
    use crate::decision::get_choices;
    use crate::error::BattleError;
    use crate::parser::testing::{Harness, request_line};
    use crate::state::LinkKind;
    use sleuth_protocol::{Choice, PokemonIdent};

    const MOVES: [(&str, u32); 4] = [
        ("bulletpunch", 48),
        ("swordsdance", 32),
        ("uturn", 32),
        ("protect", 16),
    ];

    fn lead(foe: &str) -> Vec<String> {
        vec![
            request_line(&["Scizor", "Salamence", "Starmie"], &MOVES, false),
            "|switch|p1a: Scizor|Scizor, L80, M|100/100".to_string(),
            format!("|switch|p2a: {foe}|{foe}, L80|100/100"),
            "|turn|1".to_string(),
            "#halt decide".to_string(),
        ]
    }

    async fn run(harness: &Harness, lines: &[String]) -> crate::error::Result<()> {
        let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
        harness.feed(&lines).await
    }

    fn key_of(state: &crate::state::BattleState, ident: &str) -> crate::state::PokemonKey {
        state.resolve(&PokemonIdent::parse(ident).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_first_choice_is_sent() {
        let harness = Harness::start(vec![SenderResult::Accepted]);
        run(&harness, &lead("Snorlax")).await.unwrap();
        let sent = harness.sent();
        assert_eq!(sent, vec![Choice::Move(1)]);
        assert_eq!(harness.shown().len(), 1);
        let (_, result) = harness.finish().await;
        result.unwrap();
    }

    #[tokio::test]
    async fn test_trapped_rejection_drops_switches() {
        let harness = Harness::start(vec![SenderResult::Trapped, SenderResult::Accepted]);
        harness.prefer(Choice::Switch(2));
        run(&harness, &lead("Magnezone")).await.unwrap();

        assert_eq!(harness.sent(), vec![Choice::Switch(2), Choice::Move(1)]);
        let shown = harness.shown();
        assert_eq!(shown.len(), 2);
        assert!(!shown[1].iter().any(Choice::is_switch));

        let (ctx, result) = harness.finish().await;
        result.unwrap();
        let scizor = key_of(&ctx.state, "p1a: Scizor");
        let magnezone = key_of(&ctx.state, "p2a: Magnezone");
        assert_eq!(ctx.state.links.source_of(LinkKind::Trap, scizor), Some(magnezone));
        assert_eq!(ctx.state.known_ability(magnezone), Some("magnetpull"));
    }

    #[tokio::test]
    async fn test_disabled_switch_is_a_mismatch() {
        let harness = Harness::start(vec![SenderResult::Disabled]);
        harness.prefer(Choice::Switch(3));
        let fed = run(&harness, &lead("Snorlax")).await;
        assert!(matches!(fed, Err(BattleError::RejectMismatch { .. })));
        let (_, result) = harness.finish().await;
        assert!(matches!(result, Err(BattleError::RejectMismatch { .. })));
    }

    #[tokio::test]
    async fn test_opaque_rejections_exhaust_choices() {
        let harness = Harness::start(vec![SenderResult::Rejected; 6]);
        let fed = run(&harness, &lead("Snorlax")).await;
        assert!(matches!(fed, Err(BattleError::NoChoices)));
        assert_eq!(harness.sent().len(), 6);
        let (_, result) = harness.finish().await;
        assert!(matches!(result, Err(BattleError::NoChoices)));
    }

    #[tokio::test]
    async fn test_disabled_under_imprison_reveals_opponent_move() {
        let harness = Harness::start(vec![SenderResult::Disabled, SenderResult::Accepted]);
        let mut lines = lead("Skarmory");
        lines.pop();
        lines.extend([
            "|move|p2a: Skarmory|Imprison|p2a: Skarmory".to_string(),
            "|-start|p2a: Skarmory|move: Imprison".to_string(),
            "|upkeep".to_string(),
            "|turn|2".to_string(),
            "#halt decide".to_string(),
        ]);
        run(&harness, &lines).await.unwrap();
        assert_eq!(harness.sent(), vec![Choice::Move(1), Choice::Move(2)]);

        let (ctx, result) = harness.finish().await;
        result.unwrap();
        let skarmory = key_of(&ctx.state, "p2a: Skarmory");
        assert!(ctx.state.moveset(skarmory).unwrap().is_known("bulletpunch"));
    }

    #[tokio::test]
    async fn test_disabled_rejection_marks_the_move() {
        let harness = Harness::start(vec![SenderResult::Disabled, SenderResult::Accepted]);
        run(&harness, &lead("Snorlax")).await.unwrap();
        assert_eq!(harness.sent(), vec![Choice::Move(1), Choice::Move(2)]);

        let (ctx, result) = harness.finish().await;
        result.unwrap();
        let scizor = key_of(&ctx.state, "p1a: Scizor");
        let volatile = ctx.state.volatile(scizor).unwrap();
        assert!(volatile.disabled.is_active());
        assert_eq!(volatile.disabled_move.as_deref(), Some("bulletpunch"));

        let choices = get_choices(&ctx.state, false).unwrap();
        assert!(!choices.contains(&Choice::Move(1)));
        assert!(choices.contains(&Choice::Move(2)));
    }
}
