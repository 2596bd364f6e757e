//! Bridges the core alert port onto a WebSocket connection.
//!
//! The dispatcher blocks on `confirm` until the user answers, so the alert
//! implementation forwards each prompt to the connection loop over a channel
//! and parks on a oneshot until the client's `confirm_reply` resolves it.

use anyhow::anyhow;
use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use spotter_core::alert::{Acknowledgement, AlertPort, ConfirmPrompt};

/// A prompt in flight, paired with the channel that resolves it.
pub struct ConfirmEnvelope {
    pub id: Uuid,
    pub prompt: ConfirmPrompt,
    pub reply_tx: oneshot::Sender<Acknowledgement>,
}

/// Alert implementation owned by one WebSocket connection.
#[derive(Clone)]
pub struct WsAlert {
    tx: mpsc::Sender<ConfirmEnvelope>,
}

impl WsAlert {
    /// Creates the alert and the receiving end the connection loop drains.
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<ConfirmEnvelope>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Self { tx }, rx)
    }
}

#[async_trait]
impl AlertPort for WsAlert {
    async fn confirm(&self, prompt: &ConfirmPrompt) -> anyhow::Result<Acknowledgement> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(ConfirmEnvelope {
                id: Uuid::new_v4(),
                prompt: prompt.clone(),
                reply_tx,
            })
            .await
            .map_err(|_| anyhow!("confirmation channel closed"))?;

        reply_rx
            .await
            .map_err(|_| anyhow!("confirmation prompt abandoned without a reply"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_prompt() -> ConfirmPrompt {
        ConfirmPrompt {
            title: "Emergency Stop".to_string(),
            message: "Stop the workout?".to_string(),
            choices: ["Cancel".to_string(), "Stop Workout".to_string()],
        }
    }

    #[tokio::test]
    async fn test_confirm_round_trips_through_the_channel() {
        let (alert, mut rx) = WsAlert::channel(1);

        let resolver = tokio::spawn(async move {
            let envelope = rx.recv().await.expect("prompt delivered");
            assert_eq!(envelope.prompt.title, "Emergency Stop");
            envelope.reply_tx.send(Acknowledgement::Confirmed).unwrap();
        });

        let choice = alert.confirm(&sample_prompt()).await.unwrap();
        assert_eq!(choice, Acknowledgement::Confirmed);
        resolver.await.unwrap();
    }

    #[tokio::test]
    async fn test_dropped_receiver_is_an_error() {
        let (alert, rx) = WsAlert::channel(1);
        drop(rx);

        assert!(alert.confirm(&sample_prompt()).await.is_err());
    }

    #[tokio::test]
    async fn test_abandoned_prompt_is_an_error() {
        let (alert, mut rx) = WsAlert::channel(1);

        tokio::spawn(async move {
            let envelope = rx.recv().await.expect("prompt delivered");
            // Drop the reply sender without answering.
            drop(envelope.reply_tx);
        });

        assert!(alert.confirm(&sample_prompt()).await.is_err());
    }
}
