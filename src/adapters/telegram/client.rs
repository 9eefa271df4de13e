//! Implements ChatGateway using the grammers Client.
//!
//! Uses raw invoke for GetHistory (offset_date seeding + offset_id
//! pagination) and GetUsers (sender lookup). FloodWait (RPC 420) is mapped
//! to `DomainError::FloodWait` and surfaced as-is: retry and restart policy
//! belongs to the use cases, not this adapter.

use crate::adapters::telegram::mapper;
use crate::domain::{ChatRef, DomainError, RawMessage};
use crate::ports::ChatGateway;
use async_trait::async_trait;
use grammers_client::Client;
use grammers_client::InvocationError;
use grammers_client::tl;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

/// RPC error names that mean the chat itself is off limits for this account.
const ACCESS_DENIED_RPC: &[&str] = &["CHAT_ADMIN_REQUIRED", "CHANNEL_PRIVATE", "CHANNEL_INVALID"];

/// Telegram gateway adapter. Wraps a grammers Client (clone of the session
/// shared with the auth flow in main).
pub struct GrammersChatGateway {
    client: Client,
    /// InputPeer per chat_id, filled by resolve_chat so history paging does
    /// not re-run iter_dialogs (a getDialogs per page invites FLOOD_WAIT).
    peer_cache: Mutex<HashMap<i64, tl::enums::InputPeer>>,
}

impl GrammersChatGateway {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            peer_cache: Mutex::new(HashMap::new()),
        }
    }

    async fn cached_peer(&self, chat_id: i64) -> Result<tl::enums::InputPeer, DomainError> {
        self.peer_cache
            .lock()
            .await
            .get(&chat_id)
            .cloned()
            .ok_or_else(|| {
                DomainError::Resolution(format!("chat {} not resolved for this job", chat_id))
            })
    }

    fn map_invocation_error(e: InvocationError) -> DomainError {
        match e {
            InvocationError::Rpc(rpc) if rpc.code == 420 => DomainError::FloodWait {
                seconds: rpc.value.unwrap_or(60) as u64,
            },
            InvocationError::Rpc(rpc) if ACCESS_DENIED_RPC.contains(&rpc.name.as_str()) => {
                DomainError::Resolution(format!("access denied: {}", rpc.name))
            }
            e => DomainError::Gateway(e.to_string()),
        }
    }
}

#[async_trait]
impl ChatGateway for GrammersChatGateway {
    async fn resolve_chat(&self, chat_id: i64) -> Result<ChatRef, DomainError> {
        {
            let cache = self.peer_cache.lock().await;
            if cache.contains_key(&chat_id) {
                // Already resolved in this process; title is cosmetic here.
                return Ok(ChatRef {
                    id: chat_id,
                    title: chat_id.to_string(),
                });
            }
        }

        let mut dialogs = self.client.iter_dialogs();
        let peer = loop {
            match dialogs.next().await {
                Ok(Some(dialog)) => {
                    let p = dialog.peer();
                    if p.id().bot_api_dialog_id() == chat_id {
                        break p.clone();
                    }
                }
                Ok(None) => {
                    return Err(DomainError::Resolution(format!(
                        "chat {} not found among this account's dialogs",
                        chat_id
                    )));
                }
                Err(e) => return Err(Self::map_invocation_error(e)),
            }
        };

        let title = peer
            .name()
            .map(String::from)
            .unwrap_or_else(|| chat_id.to_string());
        let peer_ref = peer.to_ref().await.ok_or_else(|| {
            DomainError::Resolution(format!("chat {} not in session cache", chat_id))
        })?;
        let input_peer: tl::enums::InputPeer = peer_ref.into();
        self.peer_cache.lock().await.insert(chat_id, input_peer);

        debug!(chat_id, title = %title, "chat resolved");
        Ok(ChatRef { id: chat_id, title })
    }

    async fn history_page(
        &self,
        chat: &ChatRef,
        offset_id: i32,
        offset_date: i64,
        limit: i32,
    ) -> Result<Vec<RawMessage>, DomainError> {
        use tl::enums::messages::Messages;

        let peer = self.cached_peer(chat.id).await?;
        let req = tl::functions::messages::GetHistory {
            peer,
            offset_id,
            offset_date: offset_date as i32,
            add_offset: 0,
            limit,
            max_id: 0,
            min_id: 0,
            hash: 0,
        };

        let raw = self
            .client
            .invoke(&req)
            .await
            .map_err(Self::map_invocation_error)?;

        let messages = match raw {
            Messages::Messages(m) => m.messages,
            Messages::Slice(m) => m.messages,
            Messages::ChannelMessages(m) => m.messages,
            Messages::NotModified(_) => return Ok(vec![]),
        };

        Ok(messages
            .iter()
            .filter_map(mapper::message_to_raw)
            .collect())
    }

    async fn resolve_sender(&self, sender_id: i64) -> Result<Option<String>, DomainError> {
        let req = tl::functions::users::GetUsers {
            id: vec![tl::enums::InputUser::User(tl::types::InputUser {
                user_id: sender_id,
                access_hash: 0,
            })],
        };

        let users = match self.client.invoke(&req).await {
            Ok(users) => users,
            Err(e) => {
                return match Self::map_invocation_error(e) {
                    flood @ DomainError::FloodWait { .. } => Err(flood),
                    DomainError::Gateway(msg) => Err(DomainError::Resolution(format!(
                        "sender {}: {}",
                        sender_id, msg
                    ))),
                    other => Err(other),
                };
            }
        };

        Ok(users.first().and_then(mapper::username_from_user))
    }
}
