//! Speech transcription capability.
//!
//! Voice capture arrives as an opaque audio payload; the transcriber turns
//! it into text for command matching. [`SimulatedTranscriber`] stands in for
//! a real recognition backend by sampling from a pool of plausible
//! utterances.

use async_trait::async_trait;
use rand::seq::IndexedRandom;

#[async_trait]
pub trait SpeechTranscriber: Send + Sync {
    async fn transcribe(&self, audio: &[u8]) -> anyhow::Result<String>;
}

/// Recognition stand-in: ignores the payload and returns a random phrase.
pub struct SimulatedTranscriber {
    phrases: Vec<String>,
}

impl SimulatedTranscriber {
    pub fn new() -> Self {
        Self::with_phrases(
            [
                "start workout",
                "pause workout",
                "resume workout",
                "next exercise",
                "end workout",
                "emergency stop",
                "how am I doing today",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
        )
    }

    pub fn with_phrases(phrases: Vec<String>) -> Self {
        Self { phrases }
    }
}

impl Default for SimulatedTranscriber {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechTranscriber for SimulatedTranscriber {
    async fn transcribe(&self, _audio: &[u8]) -> anyhow::Result<String> {
        self.phrases
            .choose(&mut rand::rng())
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("utterance pool is empty"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_transcript_comes_from_the_pool() {
        let transcriber = SimulatedTranscriber::new();
        let pool = SimulatedTranscriber::new().phrases;

        let transcript = transcriber.transcribe(&[0u8; 16]).await.unwrap();
        assert!(pool.contains(&transcript));
    }

    #[tokio::test]
    async fn test_single_phrase_pool_is_deterministic() {
        let transcriber = SimulatedTranscriber::with_phrases(vec!["start workout".to_string()]);
        assert_eq!(
            transcriber.transcribe(&[]).await.unwrap(),
            "start workout"
        );
    }
}
