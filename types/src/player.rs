use serde::{Deserialize, Serialize};
use std::fmt;

/// Coin amounts are whole, non-negative units.
pub type Coins = u64;

/// Identifier of a player record in the store.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for PlayerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A player record as stored remotely.
///
/// Missing `coins` decode as zero.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: PlayerId,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub coins: Coins,
    #[serde(default)]
    pub verified: bool,
}

/// Kind of change carried by a realtime record event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordAction {
    Create,
    Update,
    Delete,
}

impl RecordAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordAction::Create => "create",
            RecordAction::Update => "update",
            RecordAction::Delete => "delete",
        }
    }
}

/// Realtime notification pushed by the store when a subscribed record changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordEvent {
    pub action: RecordAction,
    pub record: PlayerRecord,
}

impl RecordEvent {
    /// Coins carried by an `update` event, if any.
    pub fn updated_coins(&self) -> Option<Coins> {
        match self.action {
            RecordAction::Update => Some(self.record.coins),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_defaults_missing_coins() {
        let record: PlayerRecord =
            serde_json::from_str(r#"{"id":"abc","email":"a@b.c"}"#).unwrap();
        assert_eq!(record.id, PlayerId::from("abc"));
        assert_eq!(record.coins, 0);
        assert!(!record.verified);
    }

    #[test]
    fn test_event_action_encoding() {
        let event = RecordEvent {
            action: RecordAction::Update,
            record: PlayerRecord {
                id: "p1".into(),
                email: String::new(),
                username: "p1".to_string(),
                coins: 42,
                verified: true,
            },
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""action":"update""#));
        let decoded: RecordEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.updated_coins(), Some(42));
    }

    #[test]
    fn test_only_updates_carry_coins() {
        let mut event: RecordEvent = serde_json::from_str(
            r#"{"action":"delete","record":{"id":"p1","coins":5}}"#,
        )
        .unwrap();
        assert_eq!(event.updated_coins(), None);
        event.action = RecordAction::Create;
        assert_eq!(event.updated_coins(), None);
    }

    #[test]
    fn test_blank_player_id_is_empty() {
        assert!(PlayerId::from("  ").is_empty());
        assert!(!PlayerId::from("p1").is_empty());
    }
}
