//! The coaching service facade.
//!
//! `CoachService` is the one context object the rest of the system talks
//! to: it owns the command registry, the action dispatcher, and the session
//! store, and fronts every injected capability. It is constructed once at
//! process start and shared via `Arc`; there is no hidden module-level
//! instance, so tests build isolated services freely.

use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::alert::AlertPort;
use crate::analysis::{FormAnalysis, NutritionAnalysis, ProgressAnalysis, VisionAnalyzer};
use crate::command::{CommandBinding, CommandRegistry};
use crate::dispatch::ActionDispatcher;
use crate::error::CoachError;
use crate::kv::KvStore;
use crate::responder::CoachResponder;
use crate::session::{Role, Session, SessionKind, SessionStore};
use crate::settings::ServiceSettings;
use crate::speech::SpeechTranscriber;
use crate::workout::{AthleteProfile, WorkoutPlan, WorkoutPlanner};

/// The injected capabilities a service instance is built from.
pub struct Capabilities {
    pub kv: Arc<dyn KvStore>,
    pub responder: Arc<dyn CoachResponder>,
    pub analyzer: Arc<dyn VisionAnalyzer>,
    pub planner: Arc<dyn WorkoutPlanner>,
    pub transcriber: Arc<dyn SpeechTranscriber>,
}

/// Result of running one voice utterance through matching and dispatch.
///
/// An utterance that matches no binding is a normal, unsuccessful outcome
/// with no `error`; taxonomy failures populate `error` instead.
#[derive(Debug, Clone, Serialize)]
pub struct VoiceCommandResult {
    pub success: bool,
    pub transcript: Option<String>,
    pub action: Option<String>,
    pub phrase: Option<String>,
    pub message: String,
    pub error: Option<String>,
}

impl VoiceCommandResult {
    fn no_match(transcript: String) -> Self {
        Self {
            success: false,
            transcript: Some(transcript),
            action: None,
            phrase: None,
            message: "No matching command recognized".to_string(),
            error: None,
        }
    }

    fn failed(err: &CoachError) -> Self {
        Self {
            success: false,
            transcript: None,
            action: None,
            phrase: None,
            message: "Could not process voice command".to_string(),
            error: Some(err.to_string()),
        }
    }
}

/// Result shape of `send_coaching_message`.
#[derive(Debug, Clone, Serialize)]
pub struct CoachingReply {
    pub success: bool,
    pub response: Option<String>,
    pub session_id: Option<Uuid>,
    pub error: Option<String>,
}

pub struct CoachService {
    registry: CommandRegistry,
    dispatcher: ActionDispatcher,
    store: SessionStore,
    kv: Arc<dyn KvStore>,
    responder: Arc<dyn CoachResponder>,
    analyzer: Arc<dyn VisionAnalyzer>,
    planner: Arc<dyn WorkoutPlanner>,
    transcriber: Arc<dyn SpeechTranscriber>,
    settings: Mutex<Option<ServiceSettings>>,
}

impl CoachService {
    /// Builds a service with the default command bindings and actions.
    pub fn new(capabilities: Capabilities, max_sessions: usize) -> Self {
        Self {
            registry: CommandRegistry::with_default_bindings(),
            dispatcher: ActionDispatcher::with_default_actions(),
            store: SessionStore::new(max_sessions),
            kv: capabilities.kv,
            responder: capabilities.responder,
            analyzer: capabilities.analyzer,
            planner: capabilities.planner,
            transcriber: capabilities.transcriber,
            settings: Mutex::new(None),
        }
    }

    /// Convenience constructor wiring every capability to its canned
    /// implementation. Used by tests and headless runs.
    pub fn with_canned(max_sessions: usize) -> Self {
        Self::new(
            Capabilities {
                kv: Arc::new(crate::kv::MemoryKvStore::default()),
                responder: Arc::new(crate::responder::CannedResponder::new()),
                analyzer: Arc::new(crate::analysis::CannedVisionAnalyzer),
                planner: Arc::new(crate::workout::TemplateWorkoutPlanner),
                transcriber: Arc::new(crate::speech::SimulatedTranscriber::new()),
            },
            max_sessions,
        )
    }

    /// Replaces the active command bindings.
    pub fn register_bindings(&mut self, bindings: Vec<CommandBinding>) {
        self.registry.register(bindings);
    }

    fn settings_lock(&self) -> MutexGuard<'_, Option<ServiceSettings>> {
        self.settings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Loads the persisted settings blobs, seeding defaults for missing
    /// keys. Idempotent in intent: calling it again reloads from the store.
    pub async fn initialize(&self) -> Result<(), CoachError> {
        let settings = ServiceSettings::load_or_init(self.kv.as_ref()).await?;
        info!(
            language = %settings.speech.language,
            persona = %settings.coaching.persona,
            "Coach service initialized"
        );
        *self.settings_lock() = Some(settings);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.settings_lock().is_some()
    }

    pub fn settings(&self) -> Option<ServiceSettings> {
        self.settings_lock().clone()
    }

    fn require_initialized(&self) -> Result<(), CoachError> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(CoachError::NotInitialized)
        }
    }

    // --- Voice sessions ---

    pub fn try_start_voice_session(&self) -> Result<Session, CoachError> {
        self.require_initialized()?;
        let session = self.store.create(SessionKind::Voice, serde_json::Map::new());
        info!(session_id = %session.id, "Voice session started");
        Ok(session)
    }

    pub fn start_voice_recognition(&self) -> Option<Session> {
        match self.try_start_voice_session() {
            Ok(session) => Some(session),
            Err(err) => {
                warn!(%err, "Failed to start voice session");
                None
            }
        }
    }

    /// Records an already-transcribed utterance in the session, resolves it
    /// against the command registry, and dispatches the matched action.
    pub async fn try_process_utterance(
        &self,
        session_id: Uuid,
        text: &str,
        alert: &dyn AlertPort,
    ) -> Result<VoiceCommandResult, CoachError> {
        self.require_initialized()?;
        self.store.append_message(session_id, Role::User, text)?;

        let Some(binding) = self.registry.matches(text).cloned() else {
            info!(session_id = %session_id, utterance = %text, "Utterance matched no command");
            return Ok(VoiceCommandResult::no_match(text.to_string()));
        };

        let outcome = self.dispatcher.dispatch(&binding.action, alert).await?;
        self.store
            .append_message(session_id, Role::Assistant, &outcome.message)?;

        Ok(VoiceCommandResult {
            success: outcome.success,
            transcript: Some(text.to_string()),
            action: Some(binding.action),
            phrase: Some(binding.phrase),
            message: outcome.message,
            error: None,
        })
    }

    /// Transcribes a raw audio payload and processes the resulting
    /// utterance.
    pub async fn try_process_voice_command(
        &self,
        session_id: Uuid,
        audio: &[u8],
        alert: &dyn AlertPort,
    ) -> Result<VoiceCommandResult, CoachError> {
        self.require_initialized()?;
        let transcript = self.transcriber.transcribe(audio).await?;
        self.try_process_utterance(session_id, &transcript, alert)
            .await
    }

    pub async fn process_utterance(
        &self,
        session_id: Uuid,
        text: &str,
        alert: &dyn AlertPort,
    ) -> VoiceCommandResult {
        match self.try_process_utterance(session_id, text, alert).await {
            Ok(result) => result,
            Err(err) => {
                warn!(session_id = %session_id, %err, "Utterance processing failed");
                VoiceCommandResult::failed(&err)
            }
        }
    }

    pub async fn process_voice_command(
        &self,
        session_id: Uuid,
        audio: &[u8],
        alert: &dyn AlertPort,
    ) -> VoiceCommandResult {
        match self.try_process_voice_command(session_id, audio, alert).await {
            Ok(result) => result,
            Err(err) => {
                warn!(session_id = %session_id, %err, "Voice command processing failed");
                VoiceCommandResult::failed(&err)
            }
        }
    }

    // --- Coaching sessions ---

    pub fn try_start_coaching_session(
        &self,
        context: serde_json::Map<String, serde_json::Value>,
    ) -> Result<Session, CoachError> {
        self.require_initialized()?;
        let session = self.store.create(SessionKind::Coaching, context);
        info!(session_id = %session.id, "Coaching session started");
        Ok(session)
    }

    pub fn start_coaching_session(
        &self,
        context: serde_json::Map<String, serde_json::Value>,
    ) -> Option<Session> {
        match self.try_start_coaching_session(context) {
            Ok(session) => Some(session),
            Err(err) => {
                warn!(%err, "Failed to start coaching session");
                None
            }
        }
    }

    /// Appends the user's message, obtains a reply from the responder, and
    /// appends it in turn. Returns the updated session and the reply text.
    pub async fn try_send_coaching_message(
        &self,
        session_id: Uuid,
        text: &str,
    ) -> Result<(Session, String), CoachError> {
        self.require_initialized()?;
        let session = self.store.append_message(session_id, Role::User, text)?;

        // The responder sees the transcript as it was before this message.
        let history = &session.transcript[..session.transcript.len() - 1];
        let reply = self
            .responder
            .respond(text, &session.context, history)
            .await?;

        let session = self
            .store
            .append_message(session_id, Role::Assistant, &reply)?;
        Ok((session, reply))
    }

    pub async fn send_coaching_message(&self, session_id: Uuid, text: &str) -> CoachingReply {
        match self.try_send_coaching_message(session_id, text).await {
            Ok((session, reply)) => CoachingReply {
                success: true,
                response: Some(reply),
                session_id: Some(session.id),
                error: None,
            },
            Err(err) => {
                warn!(session_id = %session_id, %err, "Coaching message failed");
                CoachingReply {
                    success: false,
                    response: None,
                    session_id: None,
                    error: Some(err.to_string()),
                }
            }
        }
    }

    // --- Analyses and workout generation ---

    pub async fn try_analyze_exercise_form(
        &self,
        media_ref: &str,
    ) -> Result<FormAnalysis, CoachError> {
        self.require_initialized()?;
        Ok(self.analyzer.analyze_form(media_ref).await?)
    }

    pub async fn analyze_exercise_form(&self, media_ref: &str) -> Option<FormAnalysis> {
        self.log_discarded(self.try_analyze_exercise_form(media_ref).await)
    }

    pub async fn try_analyze_progress_photo(
        &self,
        media_ref: &str,
    ) -> Result<ProgressAnalysis, CoachError> {
        self.require_initialized()?;
        Ok(self.analyzer.analyze_progress(media_ref).await?)
    }

    pub async fn analyze_progress_photo(&self, media_ref: &str) -> Option<ProgressAnalysis> {
        self.log_discarded(self.try_analyze_progress_photo(media_ref).await)
    }

    pub async fn try_analyze_nutrition(
        &self,
        media_ref: &str,
    ) -> Result<NutritionAnalysis, CoachError> {
        self.require_initialized()?;
        Ok(self.analyzer.analyze_nutrition(media_ref).await?)
    }

    pub async fn analyze_nutrition(&self, media_ref: &str) -> Option<NutritionAnalysis> {
        self.log_discarded(self.try_analyze_nutrition(media_ref).await)
    }

    pub async fn try_generate_personalized_workout(
        &self,
        profile: &AthleteProfile,
        goals: &[String],
        equipment: &[String],
    ) -> Result<WorkoutPlan, CoachError> {
        self.require_initialized()?;
        Ok(self.planner.generate(profile, goals, equipment).await?)
    }

    pub async fn generate_personalized_workout(
        &self,
        profile: &AthleteProfile,
        goals: &[String],
        equipment: &[String],
    ) -> Option<WorkoutPlan> {
        self.log_discarded(
            self.try_generate_personalized_workout(profile, goals, equipment)
                .await,
        )
    }

    fn log_discarded<T>(&self, result: Result<T, CoachError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                error!(%err, "Operation failed");
                None
            }
        }
    }

    // --- Session management ---

    pub fn get_active_session(&self, session_id: Uuid) -> Option<Session> {
        self.store.get(session_id)
    }

    pub fn end_session(&self, session_id: Uuid) -> Option<Session> {
        let ended = self.store.end(session_id);
        if ended.is_some() {
            info!(%session_id, "Session ended");
        }
        ended
    }

    pub fn get_all_active_sessions(&self) -> Vec<Session> {
        self.store.list_active()
    }

    /// Ends every active session and drops the loaded settings. Safe to call
    /// whether or not initialization ever succeeded.
    pub async fn cleanup(&self) -> usize {
        let ended = self.store.end_all();
        *self.settings_lock() = None;
        info!(sessions_ended = ended.len(), "Coach service cleaned up");
        ended.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::{Acknowledgement, AutoAcknowledge};
    use crate::analysis::CannedVisionAnalyzer;
    use crate::kv::MemoryKvStore;
    use crate::responder::CannedResponder;
    use crate::settings::SPEECH_SETTINGS_KEY;
    use crate::speech::SimulatedTranscriber;
    use crate::workout::TemplateWorkoutPlanner;

    /// A service whose transcriber and responder are deterministic
    /// single-entry pools.
    fn deterministic_service() -> CoachService {
        CoachService::new(
            Capabilities {
                kv: Arc::new(MemoryKvStore::default()),
                responder: Arc::new(CannedResponder::with_pool(vec![
                    "Keep pushing!".to_string(),
                ])),
                analyzer: Arc::new(CannedVisionAnalyzer),
                planner: Arc::new(TemplateWorkoutPlanner),
                transcriber: Arc::new(SimulatedTranscriber::with_phrases(vec![
                    "start workout".to_string(),
                ])),
            },
            8,
        )
    }

    #[tokio::test]
    async fn test_operations_before_initialize_fail() {
        let service = deterministic_service();

        assert!(matches!(
            service.try_start_voice_session(),
            Err(CoachError::NotInitialized)
        ));
        assert!(matches!(
            service.try_start_coaching_session(serde_json::Map::new()),
            Err(CoachError::NotInitialized)
        ));
        assert!(matches!(
            service.try_analyze_exercise_form("x.jpg").await,
            Err(CoachError::NotInitialized)
        ));

        let reply = service
            .send_coaching_message(Uuid::new_v4(), "hello")
            .await;
        assert!(!reply.success);
        assert_eq!(
            reply.error.as_deref(),
            Some("service has not been initialized")
        );
    }

    #[tokio::test]
    async fn test_initialize_seeds_settings_blobs() {
        let kv = Arc::new(MemoryKvStore::default());
        let service = CoachService::new(
            Capabilities {
                kv: kv.clone(),
                responder: Arc::new(CannedResponder::new()),
                analyzer: Arc::new(CannedVisionAnalyzer),
                planner: Arc::new(TemplateWorkoutPlanner),
                transcriber: Arc::new(SimulatedTranscriber::new()),
            },
            8,
        );

        assert!(!service.is_initialized());
        service.initialize().await.unwrap();
        assert!(service.is_initialized());
        assert!(kv.get(SPEECH_SETTINGS_KEY).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_voice_command_round_trip() {
        let service = deterministic_service();
        service.initialize().await.unwrap();
        let alert = AutoAcknowledge::default();

        let session = service.try_start_voice_session().unwrap();
        let result = service
            .process_voice_command(session.id, &[0u8; 4], &alert)
            .await;

        assert!(result.success);
        assert_eq!(result.transcript.as_deref(), Some("start workout"));
        assert_eq!(result.action.as_deref(), Some("startWorkout"));
        assert_eq!(result.phrase.as_deref(), Some("start workout"));
        assert_eq!(result.message, "Workout session started");
        assert!(result.error.is_none());

        // Both sides of the exchange land in the transcript, in order.
        let stored = service.get_active_session(session.id).unwrap();
        assert_eq!(stored.transcript.len(), 2);
        assert_eq!(stored.transcript[0].role, Role::User);
        assert_eq!(stored.transcript[0].content, "start workout");
        assert_eq!(stored.transcript[1].role, Role::Assistant);
        assert_eq!(stored.transcript[1].content, "Workout session started");
    }

    #[tokio::test]
    async fn test_unmatched_utterance_is_not_an_error() {
        let service = deterministic_service();
        service.initialize().await.unwrap();
        let alert = AutoAcknowledge::default();

        let session = service.try_start_voice_session().unwrap();
        let result = service
            .process_utterance(session.id, "tell me a story", &alert)
            .await;

        assert!(!result.success);
        assert!(result.error.is_none());
        assert!(result.action.is_none());
        assert_eq!(result.transcript.as_deref(), Some("tell me a story"));

        // The utterance is still recorded.
        let stored = service.get_active_session(session.id).unwrap();
        assert_eq!(stored.transcript.len(), 1);
    }

    #[tokio::test]
    async fn test_emergency_stop_through_the_service() {
        let service = deterministic_service();
        service.initialize().await.unwrap();
        let alert = AutoAcknowledge::new(Acknowledgement::Dismissed);

        let session = service.try_start_voice_session().unwrap();
        let result = service
            .process_utterance(session.id, "emergency stop", &alert)
            .await;

        assert!(result.success);
        assert_eq!(result.action.as_deref(), Some("emergencyStop"));
        assert_eq!(result.message, "Emergency stop cancelled");
    }

    #[tokio::test]
    async fn test_voice_command_on_ended_session_reports_error() {
        let service = deterministic_service();
        service.initialize().await.unwrap();
        let alert = AutoAcknowledge::default();

        let session = service.try_start_voice_session().unwrap();
        service.end_session(session.id);

        let result = service
            .process_voice_command(session.id, &[], &alert)
            .await;
        assert!(!result.success);
        assert!(result.error.is_some());
    }

    #[tokio::test]
    async fn test_coaching_message_round_trip() {
        let service = deterministic_service();
        service.initialize().await.unwrap();

        let session = service
            .try_start_coaching_session(serde_json::Map::new())
            .unwrap();
        let reply = service
            .send_coaching_message(session.id, "how's my progress?")
            .await;

        assert!(reply.success);
        assert_eq!(reply.response.as_deref(), Some("Keep pushing!"));
        assert_eq!(reply.session_id, Some(session.id));

        let stored = service.get_active_session(session.id).unwrap();
        assert_eq!(stored.transcript.len(), 2);
        assert_eq!(stored.transcript[0].content, "how's my progress?");
        assert_eq!(stored.transcript[1].content, "Keep pushing!");
    }

    #[tokio::test]
    async fn test_coaching_message_to_unknown_session_fails_uniformly() {
        let service = deterministic_service();
        service.initialize().await.unwrap();

        let bogus = Uuid::new_v4();
        let reply = service.send_coaching_message(bogus, "hello?").await;

        assert!(!reply.success);
        assert!(reply.response.is_none());
        assert!(reply.session_id.is_none());
        assert!(reply.error.unwrap().contains(&bogus.to_string()));
        // The failure never created or corrupted anything in the store.
        assert!(service.get_all_active_sessions().is_empty());
    }

    #[tokio::test]
    async fn test_analyses_and_workout_require_initialization_then_succeed() {
        let service = deterministic_service();
        assert!(service.analyze_exercise_form("a.jpg").await.is_none());

        service.initialize().await.unwrap();
        assert!(service.analyze_exercise_form("a.jpg").await.is_some());
        assert!(service.analyze_progress_photo("b.jpg").await.is_some());
        assert!(service.analyze_nutrition("c.jpg").await.is_some());

        let profile = AthleteProfile {
            experience_level: "intermediate".to_string(),
            sessions_per_week: 4,
        };
        let plan = service
            .generate_personalized_workout(&profile, &["strength".to_string()], &[])
            .await
            .unwrap();
        assert_eq!(plan.focus, vec!["strength".to_string()]);
    }

    #[tokio::test]
    async fn test_cleanup_ends_everything() {
        let service = deterministic_service();
        service.initialize().await.unwrap();

        for _ in 0..3 {
            service
                .try_start_coaching_session(serde_json::Map::new())
                .unwrap();
        }
        assert_eq!(service.get_all_active_sessions().len(), 3);

        let ended = service.cleanup().await;
        assert_eq!(ended, 3);
        assert!(service.get_all_active_sessions().is_empty());
        assert!(!service.is_initialized());
    }

    #[tokio::test]
    async fn test_custom_bindings_replace_defaults() {
        let mut service = deterministic_service();
        service.register_bindings(vec![CommandBinding::new("begin session", "startWorkout")]);
        service.initialize().await.unwrap();
        let alert = AutoAcknowledge::default();

        let session = service.try_start_voice_session().unwrap();
        let result = service
            .process_utterance(session.id, "begin session please", &alert)
            .await;
        assert!(result.success);

        let miss = service
            .process_utterance(session.id, "start workout", &alert)
            .await;
        assert!(!miss.success);
        assert!(miss.error.is_none());
    }
}
