//! Request and response bodies of the record store HTTP API.

use crate::player::{Coins, PlayerRecord};
use serde::{Deserialize, Serialize};

/// Collection holding player records.
pub const USERS_COLLECTION: &str = "users";

/// Body of `POST /api/collections/users/auth-with-password`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthWithPassword {
    /// E-mail or username.
    pub identity: String,
    pub password: String,
}

/// Returned by password auth and token refresh.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub record: PlayerRecord,
}

/// Body of `PATCH /api/collections/users/records/{id}`.
///
/// Replaces the balance; it is never an increment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinsUpdate {
    pub coins: Coins,
}

/// Error document returned by the store on non-2xx responses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: u16,
    pub message: String,
}
