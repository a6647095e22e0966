use crate::{GameError, GameSnapshot};
use futures::{
    channel::{mpsc, oneshot},
    SinkExt,
};
use liftoff_types::{Coins, Multiplier};
use tokio::sync::watch;
use tracing::{debug, warn};

/// Commands sent to the session.
pub enum Message {
    SetStakeAmount {
        amount: i64,
    },
    PlaceStake {
        response: oneshot::Sender<Result<(), GameError>>,
    },
    CashOut {
        response: oneshot::Sender<Option<Coins>>,
    },
    ClearError,
    ResizeViewport {
        width: f64,
    },
    RefreshBalance {
        response: oneshot::Sender<bool>,
    },
    Reset {
        response: oneshot::Sender<Result<(), GameError>>,
    },
    Teardown {
        response: oneshot::Sender<()>,
    },
}

fn closed() -> GameError {
    GameError::InternalState("session is closed".to_string())
}

/// Handle to a running session.
///
/// Dropping the last handle tears the session down.
#[derive(Clone)]
pub struct SessionHandle {
    sender: mpsc::Sender<Message>,
    snapshot: watch::Receiver<GameSnapshot>,
    multiplier: watch::Receiver<Multiplier>,
}

impl SessionHandle {
    pub(super) fn new(
        sender: mpsc::Sender<Message>,
        snapshot: watch::Receiver<GameSnapshot>,
        multiplier: watch::Receiver<Multiplier>,
    ) -> Self {
        Self {
            sender,
            snapshot,
            multiplier,
        }
    }

    /// Latest published state.
    pub fn snapshot(&self) -> GameSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<GameSnapshot> {
        self.snapshot.clone()
    }

    /// Multiplier updates only, for high-frequency redraw.
    pub fn multiplier(&self) -> watch::Receiver<Multiplier> {
        self.multiplier.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    pub async fn set_stake_amount(&mut self, amount: i64) {
        if self
            .sender
            .send(Message::SetStakeAmount { amount })
            .await
            .is_err()
        {
            warn!(amount, "session mailbox closed; stake amount dropped");
        }
    }

    /// Place the chosen stake. Resolves once the store has confirmed (or
    /// rejected) the debit.
    pub async fn place_stake(&mut self) -> Result<(), GameError> {
        let (response, receiver) = oneshot::channel();
        if self
            .sender
            .send(Message::PlaceStake { response })
            .await
            .is_err()
        {
            warn!("session mailbox closed; stake dropped");
            return Err(closed());
        }
        receiver.await.unwrap_or_else(|_| Err(closed()))
    }

    /// Cash out at the current multiplier, returning the winnings.
    ///
    /// `None` when there is nothing to cash out.
    pub async fn cash_out(&mut self) -> Option<Coins> {
        let (response, receiver) = oneshot::channel();
        if self
            .sender
            .send(Message::CashOut { response })
            .await
            .is_err()
        {
            warn!("session mailbox closed; cash-out dropped");
            return None;
        }
        receiver.await.ok().flatten()
    }

    pub async fn clear_error(&mut self) {
        if self.sender.send(Message::ClearError).await.is_err() {
            warn!("session mailbox closed; clear error dropped");
        }
    }

    pub async fn resize_viewport(&mut self, width: f64) {
        if self
            .sender
            .send(Message::ResizeViewport { width })
            .await
            .is_err()
        {
            warn!(width, "session mailbox closed; resize dropped");
        }
    }

    /// Re-read the balance from the store. Returns whether it was applied.
    pub async fn refresh_balance(&mut self) -> bool {
        let (response, receiver) = oneshot::channel();
        if self
            .sender
            .send(Message::RefreshBalance { response })
            .await
            .is_err()
        {
            warn!("session mailbox closed; refresh dropped");
            return false;
        }
        receiver.await.unwrap_or(false)
    }

    pub async fn reset(&mut self) -> Result<(), GameError> {
        let (response, receiver) = oneshot::channel();
        if self
            .sender
            .send(Message::Reset { response })
            .await
            .is_err()
        {
            warn!("session mailbox closed; reset dropped");
            return Err(closed());
        }
        receiver.await.unwrap_or_else(|_| Err(closed()))
    }

    /// Stop all timers and release the subscription. Safe to call repeatedly.
    pub async fn teardown(&mut self) {
        let (response, receiver) = oneshot::channel();
        if self
            .sender
            .send(Message::Teardown { response })
            .await
            .is_err()
        {
            debug!("session already torn down");
            return;
        }
        let _ = receiver.await;
    }
}
