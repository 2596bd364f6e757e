//! Trigger-phrase matching for voice commands.
//!
//! The registry holds a static set of phrase-to-action bindings and resolves
//! a free-text utterance to at most one of them. Matching is case-insensitive
//! substring containment; the first registered binding wins. A missed match
//! is a normal result, not an error.

use serde::{Deserialize, Serialize};

/// A single phrase-to-action mapping.
///
/// Bindings are loaded once at registry construction and are read-only
/// afterwards. The `action` is an opaque identifier resolved by the
/// [`ActionDispatcher`](crate::dispatch::ActionDispatcher).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandBinding {
    pub phrase: String,
    pub action: String,
}

impl CommandBinding {
    pub fn new(phrase: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            phrase: phrase.into(),
            action: action.into(),
        }
    }
}

/// Resolves utterances to command bindings.
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    bindings: Vec<CommandBinding>,
}

impl CommandRegistry {
    /// Creates a registry preloaded with the default workout command set.
    pub fn with_default_bindings() -> Self {
        let mut registry = Self::default();
        registry.register(default_bindings());
        registry
    }

    /// Replaces the active binding set. Iteration order is insertion order,
    /// which determines match priority.
    pub fn register(&mut self, bindings: Vec<CommandBinding>) {
        self.bindings = bindings;
    }

    /// Resolves an utterance to the first binding whose phrase it contains,
    /// comparing case-insensitively. Lower-casing is the only normalization.
    pub fn matches(&self, utterance: &str) -> Option<&CommandBinding> {
        let utterance = utterance.to_lowercase();
        self.bindings
            .iter()
            .find(|binding| utterance.contains(&binding.phrase.to_lowercase()))
    }

    pub fn bindings(&self) -> &[CommandBinding] {
        &self.bindings
    }
}

/// The command set the service ships with. Order matters: earlier bindings
/// shadow later ones when an utterance contains several phrases.
pub fn default_bindings() -> Vec<CommandBinding> {
    vec![
        CommandBinding::new("emergency stop", "emergencyStop"),
        CommandBinding::new("start workout", "startWorkout"),
        CommandBinding::new("pause workout", "pauseWorkout"),
        CommandBinding::new("resume workout", "resumeWorkout"),
        CommandBinding::new("end workout", "endWorkout"),
        CommandBinding::new("next exercise", "nextExercise"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_verbatim_phrase() {
        let registry = CommandRegistry::with_default_bindings();
        let binding = registry.matches("start workout").unwrap();
        assert_eq!(binding.action, "startWorkout");
    }

    #[test]
    fn test_match_phrase_inside_longer_utterance() {
        let mut registry = CommandRegistry::default();
        registry.register(vec![CommandBinding::new("start workout", "startWorkout")]);

        let binding = registry.matches("Please start workout now").unwrap();
        assert_eq!(binding.phrase, "start workout");
        assert_eq!(binding.action, "startWorkout");
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let registry = CommandRegistry::with_default_bindings();
        assert_eq!(
            registry.matches("START WORKOUT").unwrap().action,
            "startWorkout"
        );
        assert_eq!(
            registry.matches("Emergency STOP right now").unwrap().action,
            "emergencyStop"
        );
    }

    #[test]
    fn test_no_match_is_none() {
        let registry = CommandRegistry::with_default_bindings();
        assert!(registry.matches("what's the weather like").is_none());
        assert!(registry.matches("").is_none());
    }

    #[test]
    fn test_first_registered_binding_wins() {
        let mut registry = CommandRegistry::default();
        registry.register(vec![
            CommandBinding::new("stop", "firstAction"),
            CommandBinding::new("emergency stop", "secondAction"),
        ]);

        // Both phrases are contained in the utterance; insertion order decides.
        let binding = registry.matches("emergency stop please").unwrap();
        assert_eq!(binding.action, "firstAction");
    }

    #[test]
    fn test_register_replaces_previous_bindings() {
        let mut registry = CommandRegistry::with_default_bindings();
        registry.register(vec![CommandBinding::new("hydrate", "logWater")]);

        assert!(registry.matches("start workout").is_none());
        assert_eq!(registry.matches("time to hydrate").unwrap().action, "logWater");
        assert_eq!(registry.bindings().len(), 1);
    }
}
