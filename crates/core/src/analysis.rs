//! Vision analysis capability.
//!
//! Form checks, progress photos, and nutrition estimates are integration
//! points for a real perception backend. The contract that matters today is
//! the shape of each response record; [`CannedVisionAnalyzer`] returns one
//! fixed record per operation regardless of the media reference.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormAnalysis {
    pub exercise: String,
    pub overall_score: f32,
    pub observations: Vec<String>,
    pub corrections: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressAnalysis {
    pub summary: String,
    pub changes: Vec<String>,
    pub encouragement: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionAnalysis {
    pub estimated_calories: u32,
    pub protein_grams: u32,
    pub carbs_grams: u32,
    pub fat_grams: u32,
    pub notes: Vec<String>,
}

#[async_trait]
pub trait VisionAnalyzer: Send + Sync {
    async fn analyze_form(&self, media_ref: &str) -> anyhow::Result<FormAnalysis>;
    async fn analyze_progress(&self, media_ref: &str) -> anyhow::Result<ProgressAnalysis>;
    async fn analyze_nutrition(&self, media_ref: &str) -> anyhow::Result<NutritionAnalysis>;
}

/// Fixed-output stand-in for a real vision backend.
pub struct CannedVisionAnalyzer;

#[async_trait]
impl VisionAnalyzer for CannedVisionAnalyzer {
    async fn analyze_form(&self, media_ref: &str) -> anyhow::Result<FormAnalysis> {
        tracing::debug!(%media_ref, "Returning canned form analysis");
        Ok(FormAnalysis {
            exercise: "squat".to_string(),
            overall_score: 0.82,
            observations: vec![
                "Depth is below parallel".to_string(),
                "Knees track over the toes".to_string(),
            ],
            corrections: vec!["Keep your chest up through the ascent".to_string()],
        })
    }

    async fn analyze_progress(&self, media_ref: &str) -> anyhow::Result<ProgressAnalysis> {
        tracing::debug!(%media_ref, "Returning canned progress analysis");
        Ok(ProgressAnalysis {
            summary: "Noticeable definition gains in shoulders and upper back".to_string(),
            changes: vec![
                "Improved posture compared to the previous photo".to_string(),
                "Slight reduction in waist circumference".to_string(),
            ],
            encouragement: "The consistency is paying off. Keep it up!".to_string(),
        })
    }

    async fn analyze_nutrition(&self, media_ref: &str) -> anyhow::Result<NutritionAnalysis> {
        tracing::debug!(%media_ref, "Returning canned nutrition analysis");
        Ok(NutritionAnalysis {
            estimated_calories: 620,
            protein_grams: 38,
            carbs_grams: 55,
            fat_grams: 24,
            notes: vec![
                "Good protein portion".to_string(),
                "Consider adding leafy greens".to_string(),
            ],
        })
    }
}
