//! Persisted service settings.
//!
//! Three JSON blobs (speech, vision, coaching) are loaded through the
//! [`KvStore`] port during initialization. A missing blob is replaced by its
//! default and written back, so a fresh store ends up fully populated.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::kv::KvStore;

pub const SPEECH_SETTINGS_KEY: &str = "settings.speech";
pub const VISION_SETTINGS_KEY: &str = "settings.vision";
pub const COACHING_SETTINGS_KEY: &str = "settings.coaching";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechSettings {
    pub language: String,
    pub wake_word: String,
    pub sensitivity: f32,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            wake_word: "hey coach".to_string(),
            sensitivity: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionSettings {
    pub max_image_dimension: u32,
    pub accepted_formats: Vec<String>,
}

impl Default for VisionSettings {
    fn default() -> Self {
        Self {
            max_image_dimension: 1024,
            accepted_formats: vec!["jpeg".to_string(), "png".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoachingSettings {
    pub persona: String,
    pub max_history: usize,
}

impl Default for CoachingSettings {
    fn default() -> Self {
        Self {
            persona: "supportive".to_string(),
            max_history: 50,
        }
    }
}

/// The full set the service keeps in memory after initialization.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ServiceSettings {
    pub speech: SpeechSettings,
    pub vision: VisionSettings,
    pub coaching: CoachingSettings,
}

impl ServiceSettings {
    /// Loads all three blobs, seeding any missing one with its default.
    pub async fn load_or_init(kv: &dyn KvStore) -> anyhow::Result<Self> {
        Ok(Self {
            speech: load_blob(kv, SPEECH_SETTINGS_KEY).await?,
            vision: load_blob(kv, VISION_SETTINGS_KEY).await?,
            coaching: load_blob(kv, COACHING_SETTINGS_KEY).await?,
        })
    }
}

async fn load_blob<T>(kv: &dyn KvStore, key: &str) -> anyhow::Result<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    match kv.get(key).await? {
        Some(raw) => Ok(serde_json::from_str(&raw)?),
        None => {
            let value = T::default();
            kv.set(key, &serde_json::to_string(&value)?).await?;
            Ok(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKvStore;

    #[tokio::test]
    async fn test_load_or_init_seeds_defaults() {
        let kv = MemoryKvStore::default();
        let settings = ServiceSettings::load_or_init(&kv).await.unwrap();

        assert_eq!(settings, ServiceSettings::default());
        for key in [
            SPEECH_SETTINGS_KEY,
            VISION_SETTINGS_KEY,
            COACHING_SETTINGS_KEY,
        ] {
            assert!(kv.get(key).await.unwrap().is_some(), "missing {key}");
        }
    }

    #[tokio::test]
    async fn test_load_or_init_reads_existing_blobs() {
        let kv = MemoryKvStore::default();
        kv.set(
            COACHING_SETTINGS_KEY,
            r#"{"persona":"drill-sergeant","max_history":10}"#,
        )
        .await
        .unwrap();

        let settings = ServiceSettings::load_or_init(&kv).await.unwrap();
        assert_eq!(settings.coaching.persona, "drill-sergeant");
        assert_eq!(settings.coaching.max_history, 10);
        // Untouched blobs still come back as defaults.
        assert_eq!(settings.speech, SpeechSettings::default());
    }

    #[tokio::test]
    async fn test_partial_blob_fills_missing_fields() {
        let kv = MemoryKvStore::default();
        kv.set(SPEECH_SETTINGS_KEY, r#"{"language":"fr-FR"}"#)
            .await
            .unwrap();

        let settings = ServiceSettings::load_or_init(&kv).await.unwrap();
        assert_eq!(settings.speech.language, "fr-FR");
        assert_eq!(settings.speech.wake_word, "hey coach");
    }

    #[tokio::test]
    async fn test_corrupted_blob_is_an_error() {
        let kv = MemoryKvStore::default();
        kv.set(VISION_SETTINGS_KEY, "not json").await.unwrap();

        assert!(ServiceSettings::load_or_init(&kv).await.is_err());
    }
}
