//! Manages the voice WebSocket connection lifecycle.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use tokio::sync::{Mutex, mpsc, oneshot};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use spotter_core::alert::Acknowledgement;

use super::{
    confirm::{ConfirmEnvelope, WsAlert},
    protocol::{ClientMessage, ServerMessage},
};
use crate::state::AppState;

/// Axum handler to upgrade an HTTP connection to a WebSocket.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Main handler for an individual WebSocket connection.
///
/// The first message must be `init`; it creates the voice session this
/// connection owns. Everything after that runs through the session loop, and
/// the session is ended when the connection goes away, however it goes away.
#[instrument(name = "voice_session", skip_all, fields(session_id))]
async fn handle_socket(socket: WebSocket, state: AppState) {
    info!("New WebSocket connection. Awaiting initialization...");
    let (socket_tx, mut socket_rx) = socket.split();
    let socket_tx = Arc::new(Mutex::new(socket_tx));

    let session = match socket_rx.next().await {
        Some(Ok(Message::Text(text))) => match serde_json::from_str::<ClientMessage>(&text) {
            Ok(ClientMessage::Init) => state.service.start_voice_recognition(),
            _ => None,
        },
        _ => {
            info!("Client disconnected before sending init message.");
            return;
        }
    };

    let Some(session) = session else {
        error!("Voice session initialization failed.");
        let mut sink = socket_tx.lock().await;
        let _ = send_msg(
            &mut sink,
            ServerMessage::Error {
                message: "Failed to start voice session. The first message must be `init`."
                    .to_string(),
            },
        )
        .await;
        return;
    };

    tracing::Span::current().record("session_id", tracing::field::display(session.id));
    info!("Voice session initialized.");

    if send_msg(
        &mut *socket_tx.lock().await,
        ServerMessage::Initialized {
            session_id: session.id,
        },
    )
    .await
    .is_err()
    {
        error!("Failed to send Initialized message to client.");
        state.service.end_session(session.id);
        return;
    }

    if let Err(e) = run_voice_session(&state, socket_tx, socket_rx, session.id).await {
        error!(error = ?e, "Voice session terminated with error.");
    }

    // The connection owns the session; closing it is the terminal transition.
    state.service.end_session(session.id);
    info!("Voice session finished.");
}

enum UtterancePayload {
    Text(String),
    Audio(Vec<u8>),
}

/// The main event loop for an active voice session.
///
/// Utterances are processed in spawned tasks so the loop keeps servicing the
/// socket while a dispatch is blocked on a confirmation prompt; the loop
/// relays prompts out and replies back through channels.
async fn run_voice_session(
    state: &AppState,
    socket_tx: Arc<Mutex<SplitSink<WebSocket, Message>>>,
    mut socket_rx: SplitStream<WebSocket>,
    session_id: Uuid,
) -> Result<()> {
    let (alert, mut confirm_rx) = WsAlert::channel(8);
    let (result_tx, mut result_rx) = mpsc::channel::<ServerMessage>(8);
    let mut pending: HashMap<Uuid, oneshot::Sender<Acknowledgement>> = HashMap::new();

    loop {
        tokio::select! {
            // Handle messages from the client WebSocket.
            Some(msg_result) = socket_rx.next() => {
                match msg_result {
                    Ok(ws_msg) => match ws_msg {
                        Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(ClientMessage::Utterance { text }) => {
                                spawn_utterance(state, &alert, &result_tx, session_id, UtterancePayload::Text(text));
                            }
                            Ok(ClientMessage::Audio { data }) => match BASE64.decode(data.as_bytes()) {
                                Ok(audio) => {
                                    spawn_utterance(state, &alert, &result_tx, session_id, UtterancePayload::Audio(audio));
                                }
                                Err(e) => {
                                    warn!(error = %e, "Discarding undecodable audio payload");
                                    let _ = result_tx.send(ServerMessage::Error {
                                        message: "Audio payload was not valid base64.".to_string(),
                                    }).await;
                                }
                            },
                            Ok(ClientMessage::ConfirmReply { id, choice }) => {
                                if let Some(reply_tx) = pending.remove(&id) {
                                    let _ = reply_tx.send(choice);
                                } else {
                                    warn!(%id, "Received confirmation reply for unknown prompt");
                                }
                            }
                            Ok(ClientMessage::End) => {
                                info!("Client requested session end.");
                                break;
                            }
                            Ok(ClientMessage::Init) => warn!("Ignoring duplicate init message."),
                            Err(e) => warn!(error = %e, "Ignoring malformed client message"),
                        },
                        Message::Close(_) => {
                            info!("Client sent close frame. Shutting down session.");
                            break;
                        }
                        Message::Binary(_) => {
                            warn!("Ignoring raw binary frame; audio must arrive base64 encoded.");
                        }
                        Message::Ping(_) | Message::Pong(_) => {}
                    },
                    Err(e) => {
                        error!("Error receiving from client WebSocket: {:?}", e);
                        break;
                    }
                }
            },
            // Relay confirmation prompts from an in-flight dispatch.
            Some(ConfirmEnvelope { id, prompt, reply_tx }) = confirm_rx.recv() => {
                pending.insert(id, reply_tx);
                send_msg(&mut *socket_tx.lock().await, ServerMessage::ConfirmRequest {
                    id,
                    title: prompt.title,
                    message: prompt.message,
                    choices: prompt.choices.to_vec(),
                }).await?;
            },
            // Relay command results from completed dispatch tasks.
            Some(server_msg) = result_rx.recv() => {
                send_msg(&mut *socket_tx.lock().await, server_msg).await?;
            },
            // If all channels close, exit the loop.
            else => break,
        }
    }

    Ok(())
}

/// Runs one utterance through the service off-loop and reports the result.
fn spawn_utterance(
    state: &AppState,
    alert: &WsAlert,
    result_tx: &mpsc::Sender<ServerMessage>,
    session_id: Uuid,
    payload: UtterancePayload,
) {
    let service = state.service.clone();
    let alert = alert.clone();
    let result_tx = result_tx.clone();

    tokio::spawn(async move {
        let result = match payload {
            UtterancePayload::Text(text) => {
                service.process_utterance(session_id, &text, &alert).await
            }
            UtterancePayload::Audio(audio) => {
                service.process_voice_command(session_id, &audio, &alert).await
            }
        };
        if result_tx
            .send(ServerMessage::CommandResult { result })
            .await
            .is_err()
        {
            warn!("Session loop gone before command result could be delivered.");
        }
    });
}

/// A helper function to serialize and send a `ServerMessage` to the client.
pub(crate) async fn send_msg(
    socket_tx: &mut SplitSink<WebSocket, Message>,
    msg: ServerMessage,
) -> Result<()> {
    let serialized = serde_json::to_string(&msg)?;
    socket_tx.send(Message::Text(serialized.into())).await?;
    Ok(())
}
