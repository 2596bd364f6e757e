//! Action dispatch.
//!
//! Maps opaque action identifiers (the targets of command bindings) to
//! handlers and invokes them. Every handler resolves to a success flag plus
//! a human-readable message; an unrecognized identifier is the only failure
//! mode the dispatcher itself introduces.

use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::alert::{Acknowledgement, AlertPort, ConfirmPrompt};
use crate::error::CoachError;

/// Emergency-stop prompt copy. These strings are a safety-relevant contract
/// with the client UI; tests pin them.
pub const EMERGENCY_STOP_TITLE: &str = "Emergency Stop";
pub const EMERGENCY_STOP_MESSAGE: &str =
    "Are you sure you want to stop your workout? Your progress will be saved.";
pub const EMERGENCY_STOP_CHOICES: [&str; 2] = ["Cancel", "Stop Workout"];

/// The structured result every action resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionOutcome {
    pub success: bool,
    pub message: String,
}

impl ActionOutcome {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// One registered action. Handlers look synchronous to callers but may do
/// asynchronous work before resolving.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    async fn run(&self, alert: &dyn AlertPort) -> anyhow::Result<ActionOutcome>;
}

/// Handler for the common case: acknowledge the command with a fixed reply.
struct ReplyAction {
    message: &'static str,
}

#[async_trait]
impl ActionHandler for ReplyAction {
    async fn run(&self, _alert: &dyn AlertPort) -> anyhow::Result<ActionOutcome> {
        Ok(ActionOutcome::ok(self.message))
    }
}

/// Emergency stop requires an explicit user acknowledgement before it
/// resolves. Both choices resolve successfully; the message records whether
/// the stop went through.
struct EmergencyStopAction;

#[async_trait]
impl ActionHandler for EmergencyStopAction {
    async fn run(&self, alert: &dyn AlertPort) -> anyhow::Result<ActionOutcome> {
        let prompt = ConfirmPrompt {
            title: EMERGENCY_STOP_TITLE.to_string(),
            message: EMERGENCY_STOP_MESSAGE.to_string(),
            choices: [
                EMERGENCY_STOP_CHOICES[0].to_string(),
                EMERGENCY_STOP_CHOICES[1].to_string(),
            ],
        };

        let outcome = match alert.confirm(&prompt).await? {
            Acknowledgement::Confirmed => ActionOutcome::ok("Workout stopped"),
            Acknowledgement::Dismissed => ActionOutcome::ok("Emergency stop cancelled"),
        };
        info!(message = %outcome.message, "Emergency stop acknowledged");
        Ok(outcome)
    }
}

/// Maps each action identifier to exactly one handler.
pub struct ActionDispatcher {
    handlers: HashMap<String, Arc<dyn ActionHandler>>,
}

impl ActionDispatcher {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Creates a dispatcher with the default workout actions registered.
    pub fn with_default_actions() -> Self {
        let mut dispatcher = Self::new();
        dispatcher.register(
            "startWorkout",
            Arc::new(ReplyAction {
                message: "Workout session started",
            }),
        );
        dispatcher.register(
            "pauseWorkout",
            Arc::new(ReplyAction {
                message: "Workout paused",
            }),
        );
        dispatcher.register(
            "resumeWorkout",
            Arc::new(ReplyAction {
                message: "Workout resumed",
            }),
        );
        dispatcher.register(
            "endWorkout",
            Arc::new(ReplyAction {
                message: "Workout complete. Great job!",
            }),
        );
        dispatcher.register(
            "nextExercise",
            Arc::new(ReplyAction {
                message: "Moving to the next exercise",
            }),
        );
        dispatcher.register("emergencyStop", Arc::new(EmergencyStopAction));
        dispatcher
    }

    pub fn register(&mut self, action: impl Into<String>, handler: Arc<dyn ActionHandler>) {
        self.handlers.insert(action.into(), handler);
    }

    /// Invokes the handler for `action`, failing with `UnknownAction` when
    /// no handler is registered for it.
    pub async fn dispatch(
        &self,
        action: &str,
        alert: &dyn AlertPort,
    ) -> Result<ActionOutcome, CoachError> {
        let handler = self
            .handlers
            .get(action)
            .ok_or_else(|| CoachError::UnknownAction(action.to_string()))?;

        info!(%action, "Dispatching action");
        let outcome = handler.run(alert).await?;
        Ok(outcome)
    }
}
