//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds all shared,
//! clonable resources handed to handlers: the coach service facade and the
//! loaded configuration.

use crate::config::Config;
use spotter_core::CoachService;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<CoachService>,
    pub config: Arc<Config>,
}
