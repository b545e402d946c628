use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use sleuth_battle::{ChoiceSender, SenderResult};
use sleuth_protocol::{Choice, ClientMessage};
use tokio::sync::{mpsc, oneshot, watch};

/// Where the driver delivers the server's answer to the choice in flight
pub(crate) type PendingChoice = Arc<Mutex<Option<oneshot::Sender<SenderResult>>>>;

/// Sends choices for one battle room and waits for the driver to report
/// how the server took them.
pub struct ProtocolSender {
    room: String,
    outgoing: mpsc::Sender<ClientMessage>,
    rqid: watch::Receiver<Option<u64>>,
    pending: PendingChoice,
}

impl ProtocolSender {
    pub(crate) fn new(
        room: String,
        outgoing: mpsc::Sender<ClientMessage>,
        rqid: watch::Receiver<Option<u64>>,
        pending: PendingChoice,
    ) -> Self {
        Self {
            room,
            outgoing,
            rqid,
            pending,
        }
    }
}

#[async_trait]
impl ChoiceSender for ProtocolSender {
    async fn send(&mut self, choice: Choice) -> Result<SenderResult> {
        let (tx, rx) = oneshot::channel();
        // Armed before sending so that any later frame answers this choice
        self.pending
            .lock()
            .map_err(|_| anyhow!("pending choice lock poisoned"))?
            .replace(tx);

        let rqid = *self.rqid.borrow();
        self.outgoing
            .send(ClientMessage::choose(&self.room, choice, rqid))
            .await
            .map_err(|_| anyhow!("Connection closed"))?;

        rx.await
            .map_err(|_| anyhow!("driver stopped before {choice} was answered"))
    }
}

/// Read a `|error|` line sent in reply to a choice
pub(crate) fn classify_error(text: &str) -> SenderResult {
    if !text.starts_with("[Unavailable choice]") {
        return SenderResult::Rejected;
    }
    if text.contains("is trapped") || text.contains("can't switch") {
        SenderResult::Trapped
    } else if text.contains("is disabled") {
        SenderResult::Disabled
    } else {
        SenderResult::Rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_error_lines() {
        assert_eq!(
            classify_error("[Unavailable choice] Can't switch: The active Pokémon is trapped"),
            SenderResult::Trapped
        );
        assert_eq!(
            classify_error("[Unavailable choice] Can't move: Scizor's Bullet Punch is disabled"),
            SenderResult::Disabled
        );
        assert_eq!(
            classify_error("[Invalid choice] Can't move: Scizor doesn't have a move 5"),
            SenderResult::Rejected
        );
    }

    #[tokio::test]
    async fn test_send_waits_for_the_answer() {
        let (out_tx, mut out_rx) = mpsc::channel(4);
        let (_rqid_tx, rqid_rx) = watch::channel(Some(7));
        let pending: PendingChoice = Arc::default();
        let mut sender = ProtocolSender::new("battle-1".into(), out_tx, rqid_rx, Arc::clone(&pending));

        let answer = tokio::spawn(async move { sender.send(Choice::Switch(3)).await });
        let message = out_rx.recv().await.unwrap();
        assert_eq!(message.to_wire_format(), "battle-1|/choose switch 3|7");

        let reply = pending.lock().unwrap().take().unwrap();
        reply.send(SenderResult::Accepted).unwrap();
        assert_eq!(answer.await.unwrap().unwrap(), SenderResult::Accepted);
    }
}
