//! Rendezvous between whoever produces battle events and the parser task.
//!
//! The [`EventFeeder`] hands over one event at a time and waits until the
//! parser asks for the following one, so when `next` returns the parser has
//! finished reacting to that event. The [`EventReader`] suspends on every
//! peek until the feeder supplies an event.
//!
//! Closing either side ends the stream for both: later calls return the
//! "done" value instead of waiting. Failing either side delivers the same
//! error to every pending and later call on both sides.

use crate::error::{BattleError, BridgeError, Result};
use sleuth_protocol::BattleEvent;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::sync::{mpsc, oneshot};
use tracing::trace;

/// An event plus the signal that the parser wants the next one
type Delivery = (Arc<BattleEvent>, oneshot::Sender<()>);

#[derive(Debug, Default)]
struct Shared {
    failure: OnceLock<BattleError>,
    closed: AtomicBool,
}

impl Shared {
    fn fail(&self, error: BattleError) {
        // First failure wins
        let _ = self.failure.set(error);
        self.closed.store(true, Ordering::Release);
    }

    fn failure(&self) -> Option<BattleError> {
        self.failure.get().cloned()
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

/// Create a connected feeder/reader pair
pub fn event_channel() -> (EventFeeder, EventReader) {
    let (tx, rx) = mpsc::channel(1);
    let shared = Arc::new(Shared::default());
    let feeder = EventFeeder {
        tx,
        shared: Arc::clone(&shared),
        busy: AtomicBool::new(false),
    };
    let reader = EventReader {
        rx,
        shared,
        current: None,
        pending_ack: None,
        consumed: 0,
    };
    (feeder, reader)
}

/// Producer side of the bridge
#[derive(Debug)]
pub struct EventFeeder {
    tx: mpsc::Sender<Delivery>,
    shared: Arc<Shared>,
    busy: AtomicBool,
}

/// Clears the in-flight flag even if the call is cancelled
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl EventFeeder {
    /// Give the parser its next event and wait until it has dealt with it.
    ///
    /// Returns `Ok(false)` once the parser no longer takes events, and the
    /// parser's error if it failed. Only one call may be in flight.
    pub async fn next(&self, event: BattleEvent) -> Result<bool> {
        if self.busy.swap(true, Ordering::AcqRel) {
            return Err(BridgeError::InFlight.into());
        }
        let _in_flight = InFlight(&self.busy);

        if let Some(error) = self.shared.failure() {
            return Err(error);
        }
        if self.shared.is_closed() {
            return Ok(false);
        }

        trace!(kind = %event.kind(), "feeding event");
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send((Arc::new(event), ack_tx)).await.is_err() {
            return self.finished();
        }
        match ack_rx.await {
            Ok(()) => Ok(true),
            Err(_) => self.finished(),
        }
    }

    /// The reader went away: report its failure, if any
    fn finished(&self) -> Result<bool> {
        match self.shared.failure() {
            Some(error) => Err(error),
            None => Ok(false),
        }
    }

    /// End the stream; the parser sees no further events
    pub fn close(self) {
        self.shared.closed.store(true, Ordering::Release);
    }

    /// Fail both sides with `error`
    pub fn throw(self, error: BattleError) {
        self.shared.fail(error);
    }

    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }
}

/// Parser side of the bridge
#[derive(Debug)]
pub struct EventReader {
    rx: mpsc::Receiver<Delivery>,
    shared: Arc<Shared>,
    current: Option<Delivery>,
    /// Acknowledgement for the last consumed event, sent when the parser
    /// asks for the next one
    pending_ack: Option<oneshot::Sender<()>>,
    consumed: u64,
}

impl EventReader {
    /// The next event without consuming it. `None` at the end of the stream.
    pub async fn peek(&mut self) -> Result<Option<Arc<BattleEvent>>> {
        if let Some(error) = self.shared.failure() {
            return Err(error);
        }
        if let Some((event, _)) = &self.current {
            return Ok(Some(Arc::clone(event)));
        }
        if let Some(ack) = self.pending_ack.take() {
            let _ = ack.send(());
        }
        match self.rx.recv().await {
            Some(delivery) => {
                let event = Arc::clone(&delivery.0);
                self.current = Some(delivery);
                Ok(Some(event))
            }
            None => match self.shared.failure() {
                Some(error) => Err(error),
                None => Ok(None),
            },
        }
    }

    /// Commit to the peeked event
    pub fn consume(&mut self) -> Option<Arc<BattleEvent>> {
        let (event, ack) = self.current.take()?;
        self.pending_ack = Some(ack);
        self.consumed += 1;
        Some(event)
    }

    /// Peek and consume
    pub async fn next(&mut self) -> Result<Option<Arc<BattleEvent>>> {
        if self.peek().await?.is_none() {
            return Ok(None);
        }
        Ok(self.consume())
    }

    /// Number of events consumed so far
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    /// Stop taking events; a waiting feeder is released with "done"
    pub fn close(&mut self) {
        self.shared.closed.store(true, Ordering::Release);
        self.rx.close();
        self.current = None;
        self.pending_ack = None;
    }

    /// Fail both sides with `error`
    pub fn throw(&mut self, error: BattleError) {
        self.shared.fail(error);
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_feeder_waits_for_next_request() {
        let (feeder, mut reader) = event_channel();
        let parser = tokio::spawn(async move {
            let first = reader.next().await.unwrap().unwrap();
            assert_eq!(*first, BattleEvent::Start);
            assert_eq!(reader.peek().await.unwrap().as_deref(), Some(&BattleEvent::Upkeep));
            assert_eq!(reader.consumed(), 1);
            reader.consume();
            assert!(reader.peek().await.unwrap().is_none());
        });

        assert!(feeder.next(BattleEvent::Start).await.unwrap());
        assert!(feeder.next(BattleEvent::Upkeep).await.unwrap());
        feeder.close();
        parser.await.unwrap();
    }

    #[tokio::test]
    async fn test_reader_close_releases_feeder() {
        let (feeder, mut reader) = event_channel();
        let parser = tokio::spawn(async move {
            reader.next().await.unwrap();
            reader.close();
        });
        assert!(!feeder.next(BattleEvent::Start).await.unwrap());
        assert!(!feeder.next(BattleEvent::Upkeep).await.unwrap());
        parser.await.unwrap();
    }

    #[tokio::test]
    async fn test_reader_failure_reaches_feeder() {
        let (feeder, mut reader) = event_channel();
        let parser = tokio::spawn(async move {
            reader.next().await.unwrap();
            reader.throw(BattleError::NoChoices);
        });
        assert_eq!(
            feeder.next(BattleEvent::Start).await,
            Err(BattleError::NoChoices)
        );
        parser.await.unwrap();
        assert_eq!(
            feeder.next(BattleEvent::Upkeep).await,
            Err(BattleError::NoChoices)
        );
    }

    #[tokio::test]
    async fn test_feeder_failure_reaches_reader() {
        let (feeder, mut reader) = event_channel();
        feeder.throw(BattleError::StuckParser("Move".to_string()));
        assert_eq!(
            reader.peek().await,
            Err(BattleError::StuckParser("Move".to_string()))
        );
    }

    #[tokio::test]
    async fn test_second_call_in_flight_is_rejected() {
        let (feeder, mut reader) = event_channel();
        let feeder = Arc::new(feeder);
        let first = {
            let feeder = Arc::clone(&feeder);
            tokio::spawn(async move { feeder.next(BattleEvent::Start).await })
        };
        // The first call is parked until the reader asks for more
        assert_eq!(*reader.next().await.unwrap().unwrap(), BattleEvent::Start);
        assert_eq!(
            feeder.next(BattleEvent::Upkeep).await,
            Err(BattleError::Bridge(BridgeError::InFlight))
        );
        reader.close();
        assert!(!first.await.unwrap().unwrap());
    }
}
