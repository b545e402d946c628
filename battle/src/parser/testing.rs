//! Test doubles and a harness that runs the real parser over protocol lines

use super::bridge::{EventFeeder, event_channel};
use super::{BattleParser, BattleParserContext, ParserFuture, run_battle};
use crate::decision::{BattleAgent, ChoiceSender, SenderResult};
use crate::dex::Dex;
use crate::error::Result;
use crate::state::{BattleState, PokemonKey};
use async_trait::async_trait;
use serde_json::json;
use sleuth_protocol::{
    BattleEvent, Choice, HaltReason, HpStatus, PokemonDetails, PokemonIdent, ServerLine, SideId,
    parse_server_line,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

/// Parse one protocol line. `#halt REASON` stands for the driver's
/// synthetic halt events.
pub(crate) fn event(line: &str) -> BattleEvent {
    if let Some(reason) = line.strip_prefix("#halt ") {
        let reason = match reason {
            "gameover" => HaltReason::GameOver,
            "wait" => HaltReason::Wait,
            "switch" => HaltReason::Switch,
            "decide" => HaltReason::Decide,
            other => panic!("unknown halt reason {other}"),
        };
        return BattleEvent::Halt(reason);
    }
    match parse_server_line(line).unwrap() {
        Some(ServerLine::Event(event)) => event,
        other => panic!("{line:?} is not a battle event: {other:?}"),
    }
}

/// A `|request|` line for side p1. `team` lists species with the active
/// pokemon first; every member knows `moves`, given as (id, pp).
pub(crate) fn request_line(team: &[&str], moves: &[(&str, u32)], trapped: bool) -> String {
    let ids: Vec<&str> = moves.iter().map(|(id, _)| *id).collect();
    let pokemon: Vec<serde_json::Value> = team
        .iter()
        .enumerate()
        .map(|(i, species)| {
            json!({
                "ident": format!("p1: {species}"),
                "details": format!("{species}, L80"),
                "condition": "250/250",
                "active": i == 0,
                "stats": {"atk": 200, "def": 200, "spa": 200, "spd": 200, "spe": 200},
                "moves": ids,
                "baseAbility": "",
                "item": "leftovers",
            })
        })
        .collect();
    let slots: Vec<serde_json::Value> = moves
        .iter()
        .map(|(id, pp)| {
            json!({"move": id, "id": id, "pp": pp, "maxpp": 48, "target": "normal", "disabled": false})
        })
        .collect();
    let request = json!({
        "rqid": 1,
        "active": [{"moves": slots, "trapped": trapped}],
        "side": {"name": "me", "id": "p1", "pokemon": pokemon},
    });
    format!("|request|{request}")
}

/// A fresh state playing side p1
pub(crate) fn state_with() -> BattleState {
    let mut state = BattleState::new(Dex::gen4().unwrap());
    state.our_side = Some(SideId::P1);
    state
}

fn enter(state: &mut BattleState, side: &str, name: &str, details: &str) -> PokemonKey {
    state
        .switch_in(
            &PokemonIdent::parse(&format!("{side}a: {name}")).unwrap(),
            &PokemonDetails::parse(details),
            &HpStatus::parse("100/100").unwrap(),
        )
        .unwrap()
}

/// Switch an opposing pokemon in
pub(crate) fn opponent(state: &mut BattleState, name: &str, details: &str) -> PokemonKey {
    enter(state, "p2", name, details)
}

/// Switch one of ours in
pub(crate) fn ours(state: &mut BattleState, name: &str, details: &str) -> PokemonKey {
    enter(state, "p1", name, details)
}

fn whole_battle(ctx: &mut BattleParserContext) -> ParserFuture<'_, ()> {
    Box::pin(run_battle(ctx))
}

/// Keeps the order it is given, except that preferred choices move to the
/// front. Records every list it was shown.
struct ScriptedAgent {
    prefer: Arc<Mutex<Vec<Choice>>>,
    shown: Arc<Mutex<Vec<Vec<Choice>>>>,
}

#[async_trait]
impl BattleAgent for ScriptedAgent {
    async fn decide(&mut self, _: &BattleState, choices: &mut Vec<Choice>) -> anyhow::Result<()> {
        self.shown.lock().unwrap().push(choices.clone());
        let prefer = self.prefer.lock().unwrap();
        choices.sort_by_key(|c| prefer.iter().position(|p| p == c).unwrap_or(usize::MAX));
        Ok(())
    }
}

/// Answers with the scripted results in order, then accepts everything
struct ScriptedSender {
    results: VecDeque<SenderResult>,
    sent: Arc<Mutex<Vec<Choice>>>,
}

#[async_trait]
impl ChoiceSender for ScriptedSender {
    async fn send(&mut self, choice: Choice) -> anyhow::Result<SenderResult> {
        self.sent.lock().unwrap().push(choice);
        Ok(self.results.pop_front().unwrap_or(SenderResult::Accepted))
    }
}

/// The parser running on its own task, fed line by line
pub(crate) struct Harness {
    feeder: EventFeeder,
    task: JoinHandle<(BattleParserContext, Result<()>)>,
    prefer: Arc<Mutex<Vec<Choice>>>,
    shown: Arc<Mutex<Vec<Vec<Choice>>>>,
    sent: Arc<Mutex<Vec<Choice>>>,
}

impl Harness {
    /// Play side p1 as "me", with the sender answering `results` first
    pub(crate) fn start(results: Vec<SenderResult>) -> Self {
        let mut state = state_with();
        state.our_username = Some("me".to_string());
        Self::spawn(state, results, whole_battle)
    }

    /// Run `parser` alone over the fed lines instead of a whole battle
    pub(crate) fn with_parser(state: BattleState, parser: BattleParser) -> Self {
        Self::spawn(state, Vec::new(), parser)
    }

    /// Play whichever side `username` turns out to be on
    pub(crate) fn with_username(username: &str) -> Self {
        let mut state = BattleState::new(Dex::gen4().unwrap());
        state.our_username = Some(username.to_string());
        Self::spawn(state, Vec::new(), whole_battle)
    }

    fn spawn(state: BattleState, results: Vec<SenderResult>, parser: BattleParser) -> Self {
        let prefer = Arc::new(Mutex::new(Vec::new()));
        let shown = Arc::new(Mutex::new(Vec::new()));
        let sent = Arc::new(Mutex::new(Vec::new()));
        let agent = ScriptedAgent {
            prefer: Arc::clone(&prefer),
            shown: Arc::clone(&shown),
        };
        let sender = ScriptedSender {
            results: results.into(),
            sent: Arc::clone(&sent),
        };

        let (feeder, reader) = event_channel();
        let mut ctx = BattleParserContext::new(state, Box::new(agent), Box::new(sender), reader);
        let task = tokio::spawn(async move {
            let result = parser(&mut ctx).await;
            // Release the feeder however the parser ended
            match &result {
                Ok(()) => ctx.close(),
                Err(e) => ctx.fail(e.clone()),
            }
            (ctx, result)
        });
        Harness {
            feeder,
            task,
            prefer,
            shown,
            sent,
        }
    }

    /// Have the agent put `choice` first whenever it is offered
    pub(crate) fn prefer(&self, choice: Choice) {
        self.prefer.lock().unwrap().push(choice);
    }

    pub(crate) fn shown(&self) -> Vec<Vec<Choice>> {
        self.shown.lock().unwrap().clone()
    }

    pub(crate) fn sent(&self) -> Vec<Choice> {
        self.sent.lock().unwrap().clone()
    }

    /// Feed each line, stopping early if the parser stops taking events
    pub(crate) async fn feed(&self, lines: &[&str]) -> Result<()> {
        for line in lines {
            if !self.feeder.next(event(line)).await? {
                break;
            }
        }
        Ok(())
    }

    /// End the stream and wait for the parser
    pub(crate) async fn finish(self) -> (BattleParserContext, Result<()>) {
        self.feeder.close();
        self.task.await.unwrap()
    }
}
