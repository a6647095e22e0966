//! Local stand-in for the hosted record store.
//!
//! Serves the subset of the store API the game needs: password auth, token
//! refresh, fetching and patching a player's own record, and a realtime
//! WebSocket feed of record events.

use liftoff_types::{Coins, PlayerId, PlayerRecord, RecordAction, RecordEvent};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

mod api;
pub use api::Api;

mod state;
pub use state::{PlayerSeed, SeedError, SimulatorConfig, State};

pub struct Simulator {
    config: SimulatorConfig,
    state: Arc<RwLock<State>>,
    update_tx: broadcast::Sender<RecordEvent>,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulator {
    pub fn new() -> Self {
        Self::new_with_config(SimulatorConfig::default())
    }

    pub fn new_with_config(config: SimulatorConfig) -> Self {
        let (update_tx, _) = broadcast::channel(config.updates_broadcast_capacity());
        Self {
            config,
            state: Arc::new(RwLock::new(State::default())),
            update_tx,
        }
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Register a player (or overwrite the password and balance of an
    /// existing one with the same e-mail).
    pub async fn add_player(&self, seed: PlayerSeed) -> PlayerRecord {
        let record = self.state.write().await.add_player(seed);
        tracing::info!(
            player = %record.id,
            email = %record.email,
            coins = record.coins,
            "player added"
        );
        record
    }

    pub async fn authenticate(
        &self,
        identity: &str,
        password: &str,
    ) -> Option<(String, PlayerRecord)> {
        let result = self.state.write().await.authenticate(identity, password);
        match &result {
            Some((_, record)) => tracing::debug!(player = %record.id, "authenticated"),
            None => tracing::debug!(%identity, "authentication rejected"),
        }
        result
    }

    pub async fn refresh(&self, token: &str) -> Option<(String, PlayerRecord)> {
        self.state.write().await.refresh(token)
    }

    pub async fn player_for_token(&self, token: &str) -> Option<PlayerId> {
        self.state.read().await.player_for_token(token).cloned()
    }

    pub async fn get_player(&self, id: &PlayerId) -> Option<PlayerRecord> {
        self.state.read().await.player(id).cloned()
    }

    /// Replace a player's balance and notify realtime subscribers.
    pub async fn set_coins(&self, id: &PlayerId, coins: Coins) -> Option<PlayerRecord> {
        let record = self.state.write().await.set_coins(id, coins)?;
        tracing::debug!(player = %id, coins, "coins updated");
        // No receivers is not an error.
        let _ = self.update_tx.send(RecordEvent {
            action: RecordAction::Update,
            record: record.clone(),
        });
        Some(record)
    }

    pub fn update_subscriber(&self) -> broadcast::Receiver<RecordEvent> {
        self.update_tx.subscribe()
    }

    pub async fn player_count(&self) -> usize {
        self.state.read().await.player_count()
    }
}
