//! Liftoff game session.
//!
//! A [`Session`] runs one player's crash game as a single tokio task: it
//! loads the balance from a [`BalanceStore`], counts down between rounds,
//! ticks the multiplier, mirrors every stake and cash-out to the store and
//! publishes a [`GameSnapshot`] after each change.
//!
//! Local coin movements are applied first and written to the store one at a
//! time (see [`sync`]). A failed stake debit is rolled back; a failed
//! cash-out credit is kept locally and reported through the snapshot's
//! `error` field.
//!
//! ```no_run
//! use liftoff_client::Client;
//! use liftoff_game::{Session, SessionConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new("http://127.0.0.1:8090")?;
//! let auth = client.auth_with_password("ada@example.com", "hunter22").await?;
//! let mut session = Session::spawn(client, auth.record.id, SessionConfig::default()).await?;
//!
//! session.set_stake_amount(20).await;
//! session.place_stake().await?;
//! let mut snapshots = session.subscribe();
//! while snapshots.changed().await.is_ok() {
//!     let snapshot = snapshots.borrow_and_update().clone();
//!     if snapshot.multiplier.hundredths() >= 200 {
//!         session.cash_out().await;
//!         break;
//!     }
//! }
//! session.teardown().await;
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
pub mod session;
pub mod store;
pub mod sync;
pub mod view;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

pub use config::SessionConfig;
pub use error::GameError;
pub use liftoff_execution::RoundMode;
pub use session::{Session, SessionHandle};
pub use store::{BalanceStore, Subscription};
pub use sync::BalanceSynchronizer;
pub use view::GameSnapshot;
