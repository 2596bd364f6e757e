//! API Models
//!
//! REST-facing payloads and views over the core domain types, carrying the
//! serde and `utoipa` derives the OpenAPI surface needs. Core types stay
//! schema-free; these views convert from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use spotter_core::analysis::{FormAnalysis, NutritionAnalysis, ProgressAnalysis};
use spotter_core::service::CoachingReply;
use spotter_core::session::{Session, TranscriptEntry};
use spotter_core::workout::{AthleteProfile, WorkoutExercise, WorkoutPlan};

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct TranscriptEntryView {
    #[schema(example = "user")]
    pub role: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl From<TranscriptEntry> for TranscriptEntryView {
    fn from(entry: TranscriptEntry) -> Self {
        Self {
            role: entry.role.to_string(),
            content: entry.content,
            timestamp: entry.timestamp,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct SessionView {
    #[schema(value_type = String, format = Uuid)]
    pub id: Uuid,
    #[schema(example = "coaching")]
    pub kind: String,
    pub started_at: DateTime<Utc>,
    pub active: bool,
    pub transcript: Vec<TranscriptEntryView>,
    #[schema(value_type = Object)]
    pub context: serde_json::Value,
}

impl From<Session> for SessionView {
    fn from(session: Session) -> Self {
        Self {
            id: session.id,
            kind: session.kind.to_string(),
            started_at: session.started_at,
            active: session.active,
            transcript: session
                .transcript
                .into_iter()
                .map(TranscriptEntryView::from)
                .collect(),
            context: serde_json::Value::Object(session.context),
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct StartCoachingPayload {
    /// Opaque context attached to the session (goals, preferences, ...).
    #[schema(value_type = Object)]
    pub context: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Deserialize, ToSchema)]
pub struct SendMessagePayload {
    #[schema(example = "How is my squat progressing?")]
    pub text: String,
}

#[derive(Serialize, ToSchema, Debug)]
pub struct CoachingReplyView {
    pub success: bool,
    pub response: Option<String>,
    #[schema(value_type = Option<String>, format = Uuid)]
    pub session_id: Option<Uuid>,
    pub error: Option<String>,
}

impl From<CoachingReply> for CoachingReplyView {
    fn from(reply: CoachingReply) -> Self {
        Self {
            success: reply.success,
            response: reply.response,
            session_id: reply.session_id,
            error: reply.error,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct AnalyzePayload {
    /// Reference to the captured media (upload id, URI, ...).
    #[schema(example = "uploads/form-check-001.jpg")]
    pub media_ref: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct FormAnalysisView {
    pub exercise: String,
    pub overall_score: f32,
    pub observations: Vec<String>,
    pub corrections: Vec<String>,
}

impl From<FormAnalysis> for FormAnalysisView {
    fn from(analysis: FormAnalysis) -> Self {
        Self {
            exercise: analysis.exercise,
            overall_score: analysis.overall_score,
            observations: analysis.observations,
            corrections: analysis.corrections,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct ProgressAnalysisView {
    pub summary: String,
    pub changes: Vec<String>,
    pub encouragement: String,
}

impl From<ProgressAnalysis> for ProgressAnalysisView {
    fn from(analysis: ProgressAnalysis) -> Self {
        Self {
            summary: analysis.summary,
            changes: analysis.changes,
            encouragement: analysis.encouragement,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct NutritionAnalysisView {
    pub estimated_calories: u32,
    pub protein_grams: u32,
    pub carbs_grams: u32,
    pub fat_grams: u32,
    pub notes: Vec<String>,
}

impl From<NutritionAnalysis> for NutritionAnalysisView {
    fn from(analysis: NutritionAnalysis) -> Self {
        Self {
            estimated_calories: analysis.estimated_calories,
            protein_grams: analysis.protein_grams,
            carbs_grams: analysis.carbs_grams,
            fat_grams: analysis.fat_grams,
            notes: analysis.notes,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct AthleteProfilePayload {
    #[schema(example = "beginner")]
    pub experience_level: String,
    #[schema(example = 3)]
    pub sessions_per_week: u8,
}

impl From<AthleteProfilePayload> for AthleteProfile {
    fn from(payload: AthleteProfilePayload) -> Self {
        Self {
            experience_level: payload.experience_level,
            sessions_per_week: payload.sessions_per_week,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct WorkoutRequestPayload {
    pub profile: AthleteProfilePayload,
    #[schema(example = json!(["strength"]))]
    pub goals: Vec<String>,
    #[schema(example = json!(["dumbbells"]))]
    pub equipment: Vec<String>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct WorkoutExerciseView {
    pub name: String,
    pub sets: u8,
    pub reps: String,
    pub rest_seconds: u16,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct WorkoutPlanView {
    pub name: String,
    pub focus: Vec<String>,
    pub duration_minutes: u16,
    pub exercises: Vec<WorkoutExerciseView>,
    pub equipment: Vec<String>,
}

impl From<WorkoutExercise> for WorkoutExerciseView {
    fn from(exercise: WorkoutExercise) -> Self {
        Self {
            name: exercise.name,
            sets: exercise.sets,
            reps: exercise.reps,
            rest_seconds: exercise.rest_seconds,
        }
    }
}

impl From<WorkoutPlan> for WorkoutPlanView {
    fn from(plan: WorkoutPlan) -> Self {
        Self {
            name: plan.name,
            focus: plan.focus,
            duration_minutes: plan.duration_minutes,
            exercises: plan
                .exercises
                .into_iter()
                .map(WorkoutExerciseView::from)
                .collect(),
            equipment: plan.equipment,
        }
    }
}
