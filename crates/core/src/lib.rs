//! Spotter core: the domain library behind the fitness voice-coach service.
//!
//! Everything user-facing or durable is reached through capability traits
//! ([`alert::AlertPort`], [`kv::KvStore`], [`responder::CoachResponder`],
//! [`analysis::VisionAnalyzer`], [`workout::WorkoutPlanner`],
//! [`speech::SpeechTranscriber`]), each shipping with a canned default
//! implementation. [`service::CoachService`] ties them together around the
//! in-memory session store.

pub mod alert;
pub mod analysis;
pub mod command;
pub mod dispatch;
pub mod error;
pub mod kv;
pub mod llm;
pub mod responder;
pub mod service;
pub mod session;
pub mod settings;
pub mod speech;
pub mod workout;

pub use error::CoachError;
pub use service::{Capabilities, CoachService};
