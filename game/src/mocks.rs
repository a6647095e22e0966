//! In-memory balance store for tests.

use crate::store::{BalanceStore, Subscription};
use liftoff_types::{Coins, PlayerId};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryStoreError {
    #[error("record not found")]
    NotFound,
    #[error("network error")]
    Network,
}

#[derive(Default)]
struct Inner {
    balances: HashMap<PlayerId, Coins>,
    current: Option<PlayerId>,
    fail_sets: usize,
    panic_sets: usize,
    fail_gets: bool,
    fail_subscribe: bool,
    set_delay: Option<Duration>,
    set_calls: Vec<(PlayerId, Coins)>,
    subscribers: Vec<(PlayerId, mpsc::Sender<Coins>)>,
}

/// A [`BalanceStore`] backed by a map, with injectable failures.
///
/// Successful writes are echoed to subscribers, like the hosted store does.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    /// An empty store with nobody signed in.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding `coins` for `player`, signed in as `player`.
    pub fn with_player(player: impl Into<PlayerId>, coins: Coins) -> Self {
        let store = Self::new();
        let player = player.into();
        {
            let mut inner = store.inner.lock().unwrap();
            inner.balances.insert(player.clone(), coins);
            inner.current = Some(player);
        }
        store
    }

    pub fn sign_out(&self) {
        self.inner.lock().unwrap().current = None;
    }

    pub fn balance(&self, player: &PlayerId) -> Option<Coins> {
        self.inner.lock().unwrap().balances.get(player).copied()
    }

    /// Fail the next `count` balance writes.
    pub fn fail_next_sets(&self, count: usize) {
        self.inner.lock().unwrap().fail_sets = count;
    }

    /// Make the next `count` balance writes panic, as a crashed task would.
    pub fn panic_next_sets(&self, count: usize) {
        self.inner.lock().unwrap().panic_sets = count;
    }

    pub fn fail_gets(&self, fail: bool) {
        self.inner.lock().unwrap().fail_gets = fail;
    }

    pub fn fail_subscribe(&self, fail: bool) {
        self.inner.lock().unwrap().fail_subscribe = fail;
    }

    /// Hold every balance write for `delay` before applying or failing it.
    pub fn set_delay(&self, delay: Duration) {
        self.inner.lock().unwrap().set_delay = Some(delay);
    }

    /// Every balance write received, in order, including failed ones.
    pub fn set_calls(&self) -> Vec<(PlayerId, Coins)> {
        self.inner.lock().unwrap().set_calls.clone()
    }

    /// Open subscriptions.
    pub fn subscriber_count(&self) -> usize {
        let mut inner = self.inner.lock().unwrap();
        inner.subscribers.retain(|(_, sender)| !sender.is_closed());
        inner.subscribers.len()
    }

    /// Change a balance as another client would and notify subscribers.
    pub fn push_remote(&self, player: &PlayerId, coins: Coins) {
        let mut inner = self.inner.lock().unwrap();
        inner.balances.insert(player.clone(), coins);
        Self::notify(&mut inner, player, coins);
    }

    fn notify(inner: &mut Inner, player: &PlayerId, coins: Coins) {
        inner.subscribers.retain(|(subscribed, sender)| {
            if subscribed != player {
                return !sender.is_closed();
            }
            match sender.try_send(coins) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => true,
                Err(mpsc::error::TrySendError::Closed(_)) => false,
            }
        });
    }
}

impl BalanceStore for MemoryStore {
    type Error = MemoryStoreError;

    async fn get_balance(&self, player: &PlayerId) -> Result<Coins, Self::Error> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_gets {
            return Err(MemoryStoreError::Network);
        }
        inner
            .balances
            .get(player)
            .copied()
            .ok_or(MemoryStoreError::NotFound)
    }

    async fn set_balance(&self, player: &PlayerId, coins: Coins) -> Result<Coins, Self::Error> {
        let (delay, fail, panic) = {
            let mut inner = self.inner.lock().unwrap();
            inner.set_calls.push((player.clone(), coins));
            let fail = inner.fail_sets > 0;
            inner.fail_sets = inner.fail_sets.saturating_sub(1);
            let panic = inner.panic_sets > 0;
            inner.panic_sets = inner.panic_sets.saturating_sub(1);
            (inner.set_delay, fail, panic)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if panic {
            panic!("balance write for {player} panicked");
        }
        if fail {
            return Err(MemoryStoreError::Network);
        }

        let mut inner = self.inner.lock().unwrap();
        if !inner.balances.contains_key(player) {
            return Err(MemoryStoreError::NotFound);
        }
        inner.balances.insert(player.clone(), coins);
        Self::notify(&mut inner, player, coins);
        Ok(coins)
    }

    async fn subscribe_balance(&self, player: &PlayerId) -> Result<Subscription, Self::Error> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_subscribe {
            return Err(MemoryStoreError::Network);
        }
        let (sender, subscription) = Subscription::channel(64);
        inner.subscribers.push((player.clone(), sender));
        Ok(subscription)
    }

    fn is_authenticated(&self) -> bool {
        self.inner.lock().unwrap().current.is_some()
    }

    fn current_player_id(&self) -> Option<PlayerId> {
        self.inner.lock().unwrap().current.clone()
    }
}
