//! User-alert capability.
//!
//! The dispatcher needs exactly one user-facing effect: a blocking,
//! two-choice confirmation before an emergency stop completes. Core issues
//! the prompt through this port and the runtime decides how to present it
//! (a WebSocket round trip in the api service, an auto-acknowledger in
//! headless runs and tests).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A two-choice confirmation prompt. `choices[0]` is the dismissing option,
/// `choices[1]` the confirming one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmPrompt {
    pub title: String,
    pub message: String,
    pub choices: [String; 2],
}

/// The user's answer to a [`ConfirmPrompt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Acknowledgement {
    /// The first choice: keep going, nothing happens.
    Dismissed,
    /// The second choice: proceed with the prompted action.
    Confirmed,
}

/// Presents a prompt and returns the user's choice to the caller.
#[async_trait]
pub trait AlertPort: Send + Sync {
    async fn confirm(&self, prompt: &ConfirmPrompt) -> anyhow::Result<Acknowledgement>;
}

/// Alert implementation that answers every prompt with a fixed choice.
/// The default confirms.
#[derive(Debug, Clone, Copy)]
pub struct AutoAcknowledge {
    choice: Acknowledgement,
}

impl AutoAcknowledge {
    pub fn new(choice: Acknowledgement) -> Self {
        Self { choice }
    }
}

impl Default for AutoAcknowledge {
    fn default() -> Self {
        Self::new(Acknowledgement::Confirmed)
    }
}

#[async_trait]
impl AlertPort for AutoAcknowledge {
    async fn confirm(&self, prompt: &ConfirmPrompt) -> anyhow::Result<Acknowledgement> {
        tracing::debug!(title = %prompt.title, choice = ?self.choice, "Auto-acknowledging confirmation prompt");
        Ok(self.choice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_auto_acknowledge_returns_configured_choice() {
        let prompt = ConfirmPrompt {
            title: "Check".to_string(),
            message: "Proceed?".to_string(),
            choices: ["No".to_string(), "Yes".to_string()],
        };

        let confirming = AutoAcknowledge::default();
        assert_eq!(
            confirming.confirm(&prompt).await.unwrap(),
            Acknowledgement::Confirmed
        );

        let dismissing = AutoAcknowledge::new(Acknowledgement::Dismissed);
        assert_eq!(
            dismissing.confirm(&prompt).await.unwrap(),
            Acknowledgement::Dismissed
        );
    }

    #[test]
    fn test_acknowledgement_serde_shape() {
        assert_eq!(
            serde_json::to_string(&Acknowledgement::Confirmed).unwrap(),
            "\"confirmed\""
        );
        let parsed: Acknowledgement = serde_json::from_str("\"dismissed\"").unwrap();
        assert_eq!(parsed, Acknowledgement::Dismissed);
    }
}
