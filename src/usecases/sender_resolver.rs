//! Sender id → display name resolution with a job-scoped cache.
//!
//! One cache entry per sender for the lifetime of a job; no eviction, no
//! TTL, since sender metadata is assumed stable for a single run. A flood-wait
//! on the lookup suspends the pipeline for the signaled duration and retries
//! exactly once; a second signal escapes to the job boundary.

use crate::domain::DomainError;
use crate::ports::ChatGateway;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Name stored and reported when a sender is absent or has no username.
pub const UNKNOWN_SENDER: &str = "N/A";

/// Per-job sender resolver. Owns the append-only name cache.
pub struct SenderResolver {
    gateway: Arc<dyn ChatGateway>,
    cache: HashMap<i64, String>,
}

impl SenderResolver {
    pub fn new(gateway: Arc<dyn ChatGateway>) -> Self {
        Self {
            gateway,
            cache: HashMap::new(),
        }
    }

    /// Resolve a sender to a display name.
    ///
    /// `None` (anonymous/channel post) short-circuits to `"N/A"` without a
    /// network call or a cache write.
    pub async fn resolve(&mut self, sender_id: Option<i64>) -> Result<String, DomainError> {
        let Some(id) = sender_id else {
            return Ok(UNKNOWN_SENDER.to_string());
        };

        if let Some(name) = self.cache.get(&id) {
            return Ok(name.clone());
        }

        let username = match self.gateway.resolve_sender(id).await {
            Ok(username) => username,
            Err(DomainError::FloodWait { seconds }) => {
                info!(sender_id = id, wait_secs = seconds, "FloodWait, sleeping");
                tokio::time::sleep(Duration::from_secs(seconds)).await;
                // Exactly one local retry; a repeat signal propagates.
                self.gateway.resolve_sender(id).await?
            }
            Err(e) => return Err(e),
        };

        let name = username.unwrap_or_else(|| UNKNOWN_SENDER.to_string());
        debug!(sender_id = id, name = %name, "sender resolved");
        self.cache.insert(id, name.clone());
        Ok(name)
    }

    /// Number of senders resolved so far in this job.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChatRef, RawMessage};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// Scripted gateway: pops one canned response per resolve_sender call.
    struct ScriptedGateway {
        responses: Mutex<Vec<Result<Option<String>, DomainError>>>,
        calls: Mutex<usize>,
    }

    impl ScriptedGateway {
        fn new(mut responses: Vec<Result<Option<String>, DomainError>>) -> Self {
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl ChatGateway for ScriptedGateway {
        async fn resolve_chat(&self, _chat_id: i64) -> Result<ChatRef, DomainError> {
            unreachable!()
        }

        async fn history_page(
            &self,
            _chat: &ChatRef,
            _offset_id: i32,
            _offset_date: i64,
            _limit: i32,
        ) -> Result<Vec<RawMessage>, DomainError> {
            unreachable!()
        }

        async fn resolve_sender(&self, _sender_id: i64) -> Result<Option<String>, DomainError> {
            *self.calls.lock().unwrap() += 1;
            self.responses
                .lock()
                .unwrap()
                .pop()
                .expect("unexpected resolve_sender call")
        }
    }

    #[tokio::test]
    async fn anonymous_sender_needs_no_call() {
        let gateway = Arc::new(ScriptedGateway::new(vec![]));
        let mut resolver = SenderResolver::new(Arc::clone(&gateway) as Arc<dyn ChatGateway>);

        assert_eq!(resolver.resolve(None).await.unwrap(), "N/A");
        assert_eq!(gateway.calls(), 0);
        assert_eq!(resolver.cached(), 0);
    }

    #[tokio::test]
    async fn second_lookup_hits_the_cache() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Ok(Some("alice".into()))]));
        let mut resolver = SenderResolver::new(Arc::clone(&gateway) as Arc<dyn ChatGateway>);

        assert_eq!(resolver.resolve(Some(42)).await.unwrap(), "alice");
        assert_eq!(resolver.resolve(Some(42)).await.unwrap(), "alice");
        assert_eq!(gateway.calls(), 1);
        assert_eq!(resolver.cached(), 1);
    }

    #[tokio::test]
    async fn missing_username_is_cached_as_na() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Ok(None)]));
        let mut resolver = SenderResolver::new(Arc::clone(&gateway) as Arc<dyn ChatGateway>);

        assert_eq!(resolver.resolve(Some(9)).await.unwrap(), "N/A");
        assert_eq!(resolver.resolve(Some(9)).await.unwrap(), "N/A");
        assert_eq!(gateway.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn flood_wait_suspends_and_retries_once() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            Err(DomainError::FloodWait { seconds: 5 }),
            Ok(Some("bob".into())),
        ]));
        let mut resolver = SenderResolver::new(Arc::clone(&gateway) as Arc<dyn ChatGateway>);

        let before = Instant::now();
        let name = resolver.resolve(Some(7)).await.unwrap();

        assert_eq!(name, "bob");
        assert_eq!(before.elapsed(), Duration::from_secs(5));
        assert_eq!(gateway.calls(), 2);
        assert_eq!(resolver.cached(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_flood_wait_escapes_to_job_level() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            Err(DomainError::FloodWait { seconds: 5 }),
            Err(DomainError::FloodWait { seconds: 60 }),
        ]));
        let mut resolver = SenderResolver::new(Arc::clone(&gateway) as Arc<dyn ChatGateway>);

        match resolver.resolve(Some(7)).await {
            Err(DomainError::FloodWait { seconds }) => assert_eq!(seconds, 60),
            other => panic!("expected FloodWait, got {:?}", other),
        }
        assert_eq!(gateway.calls(), 2);
        assert_eq!(resolver.cached(), 0);
    }

    #[tokio::test]
    async fn resolution_error_propagates_without_retry() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Err(DomainError::Resolution(
            "user unreachable".into(),
        ))]));
        let mut resolver = SenderResolver::new(Arc::clone(&gateway) as Arc<dyn ChatGateway>);

        assert!(matches!(
            resolver.resolve(Some(7)).await,
            Err(DomainError::Resolution(_))
        ));
        assert_eq!(gateway.calls(), 1);
    }
}
