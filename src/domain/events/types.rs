//! User domain events
//!
//! Defines the events published on state changes and the exchange /
//! queue descriptors used to route them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::user::PublicUser;

/// AMQP exchange kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExchangeType {
    #[default]
    Topic,
    Direct,
    Fanout,
}

impl fmt::Display for ExchangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExchangeType::Topic => write!(f, "topic"),
            ExchangeType::Direct => write!(f, "direct"),
            ExchangeType::Fanout => write!(f, "fanout"),
        }
    }
}

impl FromStr for ExchangeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "topic" => Ok(ExchangeType::Topic),
            "direct" => Ok(ExchangeType::Direct),
            "fanout" => Ok(ExchangeType::Fanout),
            other => Err(format!("unknown exchange type '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: ExchangeType,
}

impl Exchange {
    pub fn new(name: impl Into<String>, kind: ExchangeType) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Queue name plus the routing key it is bound with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueBinding {
    pub name: String,
    pub key: String,
}

/// Consumer set-up: bind `queue` to `exchange` and consume from it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenRequest {
    pub exchange: Exchange,
    pub queue: QueueBinding,
}

pub mod routing_keys {
    pub const USER_CREATED: &str = "user.created";
    pub const USER_UPDATED: &str = "user.updated";
    pub const USER_DROPPED: &str = "user.dropped";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDroppedPayload {
    pub id: String,
}

/// Events emitted by the account use-cases
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserEvent {
    Created(PublicUser),
    Updated(PublicUser),
    Dropped(UserDroppedPayload),
}

impl UserEvent {
    pub fn dropped(id: impl Into<String>) -> Self {
        UserEvent::Dropped(UserDroppedPayload { id: id.into() })
    }

    pub fn routing_key(&self) -> &'static str {
        match self {
            UserEvent::Created(_) => routing_keys::USER_CREATED,
            UserEvent::Updated(_) => routing_keys::USER_UPDATED,
            UserEvent::Dropped(_) => routing_keys::USER_DROPPED,
        }
    }

    pub fn user_id(&self) -> &str {
        match self {
            UserEvent::Created(u) | UserEvent::Updated(u) => &u.id,
            UserEvent::Dropped(p) => &p.id,
        }
    }

    /// JSON body sent on the wire
    pub fn payload(&self) -> Result<Vec<u8>, serde_json::Error> {
        match self {
            UserEvent::Created(u) | UserEvent::Updated(u) => serde_json::to_vec(u),
            UserEvent::Dropped(p) => serde_json::to_vec(p),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::UserRole;
    use chrono::Utc;

    fn public_user() -> PublicUser {
        PublicUser {
            id: "u-1".into(),
            name: "John Doe".into(),
            email: "johndoe@example.com".into(),
            role: UserRole::Member,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn routing_keys_follow_event_kind() {
        assert_eq!(UserEvent::Created(public_user()).routing_key(), "user.created");
        assert_eq!(UserEvent::Updated(public_user()).routing_key(), "user.updated");
        assert_eq!(UserEvent::dropped("u-1").routing_key(), "user.dropped");
    }

    #[test]
    fn dropped_payload_only_carries_the_id() {
        let payload = UserEvent::dropped("u-9").payload().unwrap();
        let json: serde_json::Value = serde_json::from_slice(&payload).unwrap();
        assert_eq!(json, serde_json::json!({ "id": "u-9" }));
    }

    #[test]
    fn exchange_type_parses_case_insensitively() {
        assert_eq!("Fanout".parse::<ExchangeType>().unwrap(), ExchangeType::Fanout);
        assert!("headers".parse::<ExchangeType>().is_err());
        assert_eq!(ExchangeType::Direct.to_string(), "direct");
    }
}
