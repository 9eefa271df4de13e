//! Map Grammers types to domain entities.
//!
//! Extracts RawMessage from grammers_client tl types.

use crate::domain::RawMessage;
use chrono::{DateTime, Utc};
use grammers_client::tl;

/// Map a grammers Message to a domain RawMessage.
///
/// Empty and service messages (joins, pins, topic events) carry no text
/// payload and are skipped.
pub fn message_to_raw(msg: &tl::enums::Message) -> Option<RawMessage> {
    match msg {
        tl::enums::Message::Empty(_) => None,
        tl::enums::Message::Service(_) => None,
        tl::enums::Message::Message(m) => {
            let sender_id = m.from_id.as_ref().and_then(|f| match f {
                tl::enums::Peer::User(u) => Some(u.user_id),
                _ => None,
            });
            Some(RawMessage {
                id: m.id,
                timestamp: DateTime::<Utc>::from_timestamp(i64::from(m.date), 0)
                    .unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
                sender_id,
                text: m.message.clone(),
            })
        }
    }
}

/// Extract the username from a GetUsers result entry.
pub fn username_from_user(user: &tl::enums::User) -> Option<String> {
    match user {
        tl::enums::User::User(u) => u.username.clone(),
        tl::enums::User::Empty(_) => None,
    }
}
