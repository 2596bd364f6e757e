//! Workout plan generation capability.
//!
//! Like the vision analyses, the planner is a stand-in for a real
//! generation backend: the response shape is the contract. The template
//! implementation folds the request into a fixed plan structure.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AthleteProfile {
    pub experience_level: String,
    pub sessions_per_week: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutExercise {
    pub name: String,
    pub sets: u8,
    pub reps: String,
    pub rest_seconds: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutPlan {
    pub name: String,
    pub focus: Vec<String>,
    pub duration_minutes: u16,
    pub exercises: Vec<WorkoutExercise>,
    pub equipment: Vec<String>,
}

#[async_trait]
pub trait WorkoutPlanner: Send + Sync {
    async fn generate(
        &self,
        profile: &AthleteProfile,
        goals: &[String],
        equipment: &[String],
    ) -> anyhow::Result<WorkoutPlan>;
}

/// Canned planner: a fixed full-body template echoing the request's goals
/// and equipment back into the plan.
pub struct TemplateWorkoutPlanner;

#[async_trait]
impl WorkoutPlanner for TemplateWorkoutPlanner {
    async fn generate(
        &self,
        profile: &AthleteProfile,
        goals: &[String],
        equipment: &[String],
    ) -> anyhow::Result<WorkoutPlan> {
        tracing::debug!(experience = %profile.experience_level, "Returning template workout plan");
        Ok(WorkoutPlan {
            name: "Full Body Foundation".to_string(),
            focus: goals.to_vec(),
            duration_minutes: 45,
            exercises: vec![
                WorkoutExercise {
                    name: "Goblet Squat".to_string(),
                    sets: 3,
                    reps: "8-12".to_string(),
                    rest_seconds: 90,
                },
                WorkoutExercise {
                    name: "Push-Up".to_string(),
                    sets: 3,
                    reps: "10-15".to_string(),
                    rest_seconds: 60,
                },
                WorkoutExercise {
                    name: "Single-Arm Row".to_string(),
                    sets: 3,
                    reps: "8-12".to_string(),
                    rest_seconds: 90,
                },
                WorkoutExercise {
                    name: "Plank".to_string(),
                    sets: 3,
                    reps: "30-45s".to_string(),
                    rest_seconds: 45,
                },
            ],
            equipment: equipment.to_vec(),
        })
    }
}
