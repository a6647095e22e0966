use liftoff_types::{Coins, PlayerId, PlayerRecord};
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

const PLAYER_ID_LEN: usize = 15;

#[derive(Clone, Debug, Default)]
pub struct SimulatorConfig {
    /// Max queued record events in the broadcast channel (0 uses default).
    pub updates_broadcast_buffer: Option<usize>,
    /// Max queued WebSocket outbound messages per connection (0 uses default).
    pub ws_outbound_buffer: Option<usize>,
}

impl SimulatorConfig {
    const DEFAULT_UPDATES_BROADCAST_BUFFER: usize = 1_024;
    const DEFAULT_WS_OUTBOUND_BUFFER: usize = 64;

    pub fn updates_broadcast_capacity(&self) -> usize {
        match self.updates_broadcast_buffer {
            Some(0) | None => Self::DEFAULT_UPDATES_BROADCAST_BUFFER,
            Some(value) => value,
        }
    }

    pub fn ws_outbound_capacity(&self) -> usize {
        match self.ws_outbound_buffer {
            Some(0) | None => Self::DEFAULT_WS_OUTBOUND_BUFFER,
            Some(value) => value,
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SeedError {
    #[error("expected email:password:coins, got {0:?}")]
    Malformed(String),
    #[error("invalid coin amount {0:?}")]
    InvalidCoins(String),
}

/// A player registered at startup.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct PlayerSeed {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub coins: Coins,
}

impl FromStr for PlayerSeed {
    type Err = SeedError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        // Passwords may contain ':', so the coins are split off the right.
        let (rest, coins) = value
            .rsplit_once(':')
            .ok_or_else(|| SeedError::Malformed(value.to_string()))?;
        let (email, password) = rest
            .split_once(':')
            .ok_or_else(|| SeedError::Malformed(value.to_string()))?;
        if email.is_empty() || password.is_empty() {
            return Err(SeedError::Malformed(value.to_string()));
        }
        let coins = coins
            .trim()
            .parse()
            .map_err(|_| SeedError::InvalidCoins(coins.to_string()))?;
        Ok(Self {
            email: email.to_string(),
            password: password.to_string(),
            coins,
        })
    }
}

#[derive(Clone, Debug)]
struct Account {
    record: PlayerRecord,
    password: String,
}

/// In-memory user records and auth tokens.
#[derive(Default)]
pub struct State {
    accounts: HashMap<PlayerId, Account>,
    emails: HashMap<String, PlayerId>,
    tokens: HashMap<String, PlayerId>,
}

impl State {
    pub fn add_player(&mut self, seed: PlayerSeed) -> PlayerRecord {
        let email = seed.email.to_lowercase();
        if let Some(existing) = self.emails.get(&email).cloned() {
            if let Some(account) = self.accounts.get_mut(&existing) {
                account.password = seed.password;
                account.record.coins = seed.coins;
                return account.record.clone();
            }
        }

        let id = PlayerId::new(new_player_id());
        let username = email
            .split_once('@')
            .map(|(name, _)| name.to_string())
            .unwrap_or_else(|| email.clone());
        let record = PlayerRecord {
            id: id.clone(),
            email: email.clone(),
            username,
            coins: seed.coins,
            verified: true,
        };
        self.emails.insert(email, id.clone());
        self.accounts.insert(
            id,
            Account {
                record: record.clone(),
                password: seed.password,
            },
        );
        record
    }

    pub fn authenticate(
        &mut self,
        identity: &str,
        password: &str,
    ) -> Option<(String, PlayerRecord)> {
        let identity = identity.to_lowercase();
        let account = match self.emails.get(&identity) {
            Some(id) => self.accounts.get(id)?,
            None => self
                .accounts
                .values()
                .find(|account| account.record.username == identity)?,
        };
        if account.password != password {
            return None;
        }
        let record = account.record.clone();
        let token = new_token();
        self.tokens.insert(token.clone(), record.id.clone());
        Some((token, record))
    }

    /// Swap `token` for a fresh one.
    pub fn refresh(&mut self, token: &str) -> Option<(String, PlayerRecord)> {
        let id = self.tokens.remove(token)?;
        let record = self.accounts.get(&id)?.record.clone();
        let token = new_token();
        self.tokens.insert(token.clone(), id);
        Some((token, record))
    }

    pub fn player_for_token(&self, token: &str) -> Option<&PlayerId> {
        self.tokens.get(token)
    }

    pub fn player(&self, id: &PlayerId) -> Option<&PlayerRecord> {
        self.accounts.get(id).map(|account| &account.record)
    }

    pub fn set_coins(&mut self, id: &PlayerId, coins: Coins) -> Option<PlayerRecord> {
        let account = self.accounts.get_mut(id)?;
        account.record.coins = coins;
        Some(account.record.clone())
    }

    pub fn player_count(&self) -> usize {
        self.accounts.len()
    }
}

fn new_player_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(PLAYER_ID_LEN);
    id
}

fn new_token() -> String {
    Uuid::new_v4().simple().to_string()
}
