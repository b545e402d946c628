use std::sync::Arc;

use anyhow::Context;
use sleuth_battle::{
    BattleAgent, BattleError, BattleParserContext, BattleState, Dex, EventFeeder, SenderResult,
    event_channel, run_battle,
};
use sleuth_protocol::{
    BattleEvent, BattleRequest, ClientCommand, ClientMessage, HaltReason, ServerLine,
    parse_server_frame,
};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info_span, trace, warn};

use crate::config::DriverConfig;
use crate::error::DriverError;
use crate::sender::{PendingChoice, ProtocolSender, classify_error};

/// Runs the belief-state parser for one battle room.
///
/// Frames go in through [`handle_frame`](Self::handle_frame), which never
/// waits on the parser: events are queued for a feeding task, and replies
/// to the choice in flight are delivered straight to the sender. Each
/// `|request|` is held back until the battle log it belongs to has been
/// queued, then followed by the halt that asks for a decision.
pub struct BattleDriver {
    room: String,
    events: mpsc::UnboundedSender<BattleEvent>,
    rqid: watch::Sender<Option<u64>>,
    pending: PendingChoice,
    request: Option<Box<BattleRequest>>,
    game_over: bool,
    feeder: JoinHandle<Result<(), BattleError>>,
    parser: JoinHandle<(BattleState, Result<(), BattleError>)>,
}

impl BattleDriver {
    /// Spawn the parser for `room`. Choices go out on `outgoing`.
    pub fn start(
        room: impl Into<String>,
        config: DriverConfig,
        agent: Box<dyn BattleAgent>,
        outgoing: mpsc::Sender<ClientMessage>,
    ) -> Result<Self, DriverError> {
        let room = room.into();
        let mut state = BattleState::new(Dex::gen4()?);
        state.our_username = config.username.clone();

        let (rqid_tx, rqid_rx) = watch::channel(None);
        let pending = PendingChoice::default();
        let sender = ProtocolSender::new(
            room.clone(),
            outgoing.clone(),
            rqid_rx,
            Arc::clone(&pending),
        );

        let (feeder, reader) = event_channel();
        let mut ctx = BattleParserContext::new(state, agent, Box::new(sender), reader);
        let span = info_span!("battle", room = %room);

        let forfeit = config
            .forfeit_on_error
            .then(|| ClientMessage {
                room_id: Some(room.clone()),
                command: ClientCommand::Forfeit,
            });
        let parser = tokio::spawn(
            async move {
                let result = run_battle(&mut ctx).await;
                if result.is_err()
                    && let Some(forfeit) = forfeit
                    && outgoing.send(forfeit).await.is_err()
                {
                    warn!("could not forfeit, connection closed");
                }
                (ctx.state, result)
            }
            .instrument(span.clone()),
        );

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let feeder = tokio::spawn(feed(feeder, events_rx, config.log_events).instrument(span));

        Ok(Self {
            room,
            events: events_tx,
            rqid: rqid_tx,
            pending,
            request: None,
            game_over: false,
            feeder,
            parser,
        })
    }

    pub fn room(&self) -> &str {
        &self.room
    }

    /// Route one websocket frame. Frames for other rooms are ignored.
    pub fn handle_frame(&mut self, frame: &str) -> Result<(), DriverError> {
        let frame = parse_server_frame(frame).map_err(|e| DriverError::Frame(format!("{e:#}")))?;
        if let Some(room) = &frame.room_id
            && *room != self.room
        {
            debug!(%room, "frame for another room");
            return Ok(());
        }
        self.handle_lines(frame.lines);
        Ok(())
    }

    fn handle_lines(&mut self, lines: Vec<ServerLine>) {
        let mut rejected = false;
        let mut log = Vec::new();
        for line in lines {
            match line {
                ServerLine::Error(text) => {
                    rejected = true;
                    if !self.answer(classify_error(&text)) {
                        warn!(error = %text, "server error with no choice in flight");
                    }
                }
                ServerLine::Event(BattleEvent::Request(request)) => {
                    self.rqid.send_replace(request.rqid);
                    self.request = Some(request);
                }
                ServerLine::Event(event) => {
                    if matches!(event, BattleEvent::Win { .. } | BattleEvent::Tie) {
                        self.game_over = true;
                    }
                    log.push(event);
                }
            }
        }
        if log.is_empty() {
            return;
        }
        // The battle moved on, so the choice in flight went through
        if !rejected {
            self.answer(SenderResult::Accepted);
        }
        for event in log {
            self.push(event);
        }

        if self.game_over {
            self.request = None;
            self.push(BattleEvent::Halt(HaltReason::GameOver));
        } else if let Some(request) = self.request.take() {
            let reason = halt_reason(&request);
            self.push(BattleEvent::Request(request));
            if let Some(reason) = reason {
                self.push(BattleEvent::Halt(reason));
            }
        }
    }

    /// Deliver `result` to the choice in flight, if there is one
    fn answer(&self, result: SenderResult) -> bool {
        let reply = match self.pending.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        };
        match reply {
            Some(reply) => {
                debug!(?result, "choice answered");
                // The parser may already have given up on it
                let _ = reply.send(result);
                true
            }
            None => false,
        }
    }

    fn push(&self, event: BattleEvent) {
        if self.events.send(event).is_err() {
            trace!("parser finished, event dropped");
        }
    }

    /// End the event stream and wait for the parser's verdict
    pub async fn finish(self) -> anyhow::Result<BattleState> {
        let room = self.room;
        drop(self.events);
        // Nothing can answer a choice still in flight now
        if let Ok(mut slot) = self.pending.lock() {
            slot.take();
        }

        let fed = self.feeder.await.map_err(DriverError::from)?;
        let (state, parsed) = self.parser.await.map_err(DriverError::from)?;
        parsed
            .and(fed)
            .map_err(DriverError::from)
            .with_context(|| format!("battle {room} failed"))?;
        Ok(state)
    }
}

fn halt_reason(request: &BattleRequest) -> Option<HaltReason> {
    if request.wait {
        Some(HaltReason::Wait)
    } else if request.is_force_switch() {
        Some(HaltReason::Switch)
    } else if request.team_preview {
        debug!("team preview is not played");
        None
    } else if request.active.is_some() {
        Some(HaltReason::Decide)
    } else {
        None
    }
}

async fn feed(
    feeder: EventFeeder,
    mut events: mpsc::UnboundedReceiver<BattleEvent>,
    log_events: bool,
) -> Result<(), BattleError> {
    while let Some(event) = events.recv().await {
        if log_events {
            debug!(?event, "battle event");
        }
        if !feeder.next(event).await? {
            debug!("parser stopped taking events");
            return Ok(());
        }
    }
    feeder.close();
    Ok(())
}
