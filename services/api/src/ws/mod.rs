//! Voice WebSocket endpoint: session handshake, utterance processing, and
//! the emergency-stop confirmation round trip.

pub mod confirm;
pub mod protocol;
pub mod session;

pub use session::ws_handler;
