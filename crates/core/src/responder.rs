//! Coaching response generation.
//!
//! The contract is "produce a string reply given the message, the session
//! context, and the prior transcript". [`CannedResponder`] is the default
//! implementation: a uniform random pick from a fixed pool, ignoring its
//! inputs. The OpenAI-backed implementation lives in [`crate::llm`]; the
//! session logic never depends on which one is wired in.

use async_trait::async_trait;
use rand::seq::IndexedRandom;

use crate::session::TranscriptEntry;

#[async_trait]
pub trait CoachResponder: Send + Sync {
    async fn respond(
        &self,
        message: &str,
        context: &serde_json::Map<String, serde_json::Value>,
        history: &[TranscriptEntry],
    ) -> anyhow::Result<String>;
}

/// Input-independent stand-in responder.
pub struct CannedResponder {
    pool: Vec<String>,
}

impl CannedResponder {
    pub fn new() -> Self {
        Self::with_pool(
            [
                "Great work! Keep that pace going.",
                "Remember to breathe steadily through each rep.",
                "You're making solid progress. Stay consistent.",
                "Focus on your form before adding more weight.",
                "Nice effort today. Recovery matters as much as training.",
                "Let's keep the momentum going. One set at a time.",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
        )
    }

    pub fn with_pool(pool: Vec<String>) -> Self {
        Self { pool }
    }
}

impl Default for CannedResponder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CoachResponder for CannedResponder {
    async fn respond(
        &self,
        _message: &str,
        _context: &serde_json::Map<String, serde_json::Value>,
        _history: &[TranscriptEntry],
    ) -> anyhow::Result<String> {
        self.pool
            .choose(&mut rand::rng())
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("response pool is empty"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reply_comes_from_the_pool() {
        let responder = CannedResponder::new();
        let pool = CannedResponder::new().pool;

        for _ in 0..8 {
            let reply = responder
                .respond("how am I doing?", &serde_json::Map::new(), &[])
                .await
                .unwrap();
            assert!(pool.contains(&reply));
        }
    }

    #[tokio::test]
    async fn test_single_entry_pool_is_deterministic() {
        let responder = CannedResponder::with_pool(vec!["steady on".to_string()]);
        let reply = responder
            .respond("anything", &serde_json::Map::new(), &[])
            .await
            .unwrap();
        assert_eq!(reply, "steady on");
    }

    #[tokio::test]
    async fn test_empty_pool_is_an_error() {
        let responder = CannedResponder::with_pool(Vec::new());
        assert!(
            responder
                .respond("anything", &serde_json::Map::new(), &[])
                .await
                .is_err()
        );
    }
}
