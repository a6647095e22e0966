use liftoff_types::{Coins, PlayerId};
use std::future::Future;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, warn};

/// Capacity of the balance channel behind a [`Subscription`].
const SUBSCRIPTION_BUFFER: usize = 64;

/// Trait for the remote record store holding player balances.
pub trait BalanceStore: Clone + Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch the current balance of a player.
    fn get_balance(
        &self,
        player: &PlayerId,
    ) -> impl Future<Output = Result<Coins, Self::Error>> + Send;

    /// Replace a player's balance with `coins` (not an increment).
    fn set_balance(
        &self,
        player: &PlayerId,
        coins: Coins,
    ) -> impl Future<Output = Result<Coins, Self::Error>> + Send;

    /// Receive every remote change to a player's balance.
    fn subscribe_balance(
        &self,
        player: &PlayerId,
    ) -> impl Future<Output = Result<Subscription, Self::Error>> + Send;

    fn is_authenticated(&self) -> bool;

    fn current_player_id(&self) -> Option<PlayerId>;
}

/// Balance pushes for one player.
///
/// Dropping (or cancelling) the subscription stops the task feeding it.
pub struct Subscription {
    receiver: mpsc::Receiver<Coins>,
    handle: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Wrap a channel fed by `handle`.
    pub fn new(receiver: mpsc::Receiver<Coins>, handle: Option<JoinHandle<()>>) -> Self {
        Self { receiver, handle }
    }

    /// A subscription and the sender feeding it.
    pub fn channel(capacity: usize) -> (mpsc::Sender<Coins>, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (tx, Self::new(rx, None))
    }

    /// Next pushed balance; `None` once the feed has ended.
    pub async fn recv(&mut self) -> Option<Coins> {
        self.receiver.recv().await
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.receiver.close();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl BalanceStore for liftoff_client::Client {
    type Error = liftoff_client::Error;

    async fn get_balance(&self, player: &PlayerId) -> Result<Coins, Self::Error> {
        Ok(self.get_player(player).await?.coins)
    }

    async fn set_balance(&self, player: &PlayerId, coins: Coins) -> Result<Coins, Self::Error> {
        Ok(self.update_coins(player, coins).await?.coins)
    }

    async fn subscribe_balance(&self, player: &PlayerId) -> Result<Subscription, Self::Error> {
        let mut stream = self.subscribe_player(player).await?;
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let player = player.clone();
        let handle = tokio::spawn(async move {
            while let Some(event) = stream.next().await {
                let event = match event {
                    Ok(event) => event,
                    Err(err) => {
                        warn!(%player, ?err, "balance subscription ended");
                        return;
                    }
                };
                if event.record.id != player {
                    continue;
                }
                let Some(coins) = event.updated_coins() else {
                    debug!(%player, action = event.action.as_str(), "ignoring record event");
                    continue;
                };
                if tx.send(coins).await.is_err() {
                    return;
                }
            }
        });
        Ok(Subscription::new(rx, Some(handle)))
    }

    fn is_authenticated(&self) -> bool {
        liftoff_client::Client::is_authenticated(self)
    }

    fn current_player_id(&self) -> Option<PlayerId> {
        liftoff_client::Client::current_player_id(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscription_channel() {
        let (tx, mut subscription) = Subscription::channel(4);
        tx.send(42).await.unwrap();
        assert_eq!(subscription.recv().await, Some(42));
        drop(tx);
        assert_eq!(subscription.recv().await, None);
    }

    #[tokio::test]
    async fn test_cancel_closes_feed() {
        let (tx, mut subscription) = Subscription::channel(4);
        subscription.cancel();
        assert!(tx.send(1).await.is_err());
        assert_eq!(subscription.recv().await, None);
    }
}
