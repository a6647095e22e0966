//! The game session actor and its handle.

use crate::{store::BalanceStore, GameError, SessionConfig};
use liftoff_execution::{CrashPointSource, RandomCrashPoints};
use liftoff_types::PlayerId;

mod actor;
pub use actor::Actor;
mod ingress;
pub use ingress::{Message, SessionHandle};


/// Entry point for starting game sessions.
pub struct Session;

impl Session {
    /// Initialize a session for `player` and run it on the current runtime.
    ///
    /// Crash points come from `config.seed` when set, otherwise from the OS.
    pub async fn spawn<S: BalanceStore>(
        store: S,
        player: PlayerId,
        config: SessionConfig,
    ) -> Result<SessionHandle, GameError> {
        let crash_points = match config.seed {
            Some(seed) => RandomCrashPoints::seeded(seed),
            None => RandomCrashPoints::from_entropy(),
        };
        Self::spawn_with_source(store, player, config, crash_points).await
    }

    pub async fn spawn_with_source<S: BalanceStore, C: CrashPointSource>(
        store: S,
        player: PlayerId,
        config: SessionConfig,
        crash_points: C,
    ) -> Result<SessionHandle, GameError> {
        let (actor, handle) = Actor::init(store, player, config, crash_points).await?;
        actor.start();
        Ok(handle)
    }
}
