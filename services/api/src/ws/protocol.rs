//! Defines the WebSocket message protocol between the mobile client and the API server.

use serde::{Deserialize, Serialize};
use spotter_core::alert::Acknowledgement;
use spotter_core::service::VoiceCommandResult;
use uuid::Uuid;

/// Messages sent from the client to the server.
#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Starts a voice session. This must be the first message.
    Init,
    /// An already-transcribed utterance.
    Utterance { text: String },
    /// A captured audio payload, base64 encoded.
    Audio { data: String },
    /// The user's answer to a pending confirmation prompt.
    ConfirmReply { id: Uuid, choice: Acknowledgement },
    /// Ends the voice session.
    End,
}

/// Messages sent from the server to the client.
#[derive(Serialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Confirms successful session initialization.
    Initialized { session_id: Uuid },
    /// The outcome of running one utterance through matching and dispatch.
    CommandResult { result: VoiceCommandResult },
    /// Asks the user to answer a two-choice confirmation prompt.
    ConfirmRequest {
        id: Uuid,
        title: String,
        message: String,
        choices: Vec<String>,
    },
    /// Reports an error to the client.
    Error { message: String },
}
