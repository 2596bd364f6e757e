//! OpenAI-backed coaching responder.
//!
//! Drop-in replacement for the canned responder when a real model is
//! configured. The session context is folded into the system prompt and the
//! prior transcript is replayed as chat history.

use anyhow::{Context, Result, anyhow};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
};
use async_trait::async_trait;

use crate::responder::CoachResponder;
use crate::session::{Role, TranscriptEntry};

const DEFAULT_SYSTEM_PROMPT: &str = "You are a supportive personal fitness coach. \
Keep replies short, encouraging, and specific to the athlete's message.";

pub struct OpenAiResponder {
    client: Client<OpenAIConfig>,
    model: String,
    system_prompt: String,
}

impl OpenAiResponder {
    pub fn new(config: OpenAIConfig, model: String) -> Self {
        Self {
            client: Client::with_config(config),
            model,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: String) -> Self {
        self.system_prompt = system_prompt;
        self
    }
}

#[async_trait]
impl CoachResponder for OpenAiResponder {
    async fn respond(
        &self,
        message: &str,
        context: &serde_json::Map<String, serde_json::Value>,
        history: &[TranscriptEntry],
    ) -> Result<String> {
        let mut system_prompt = self.system_prompt.clone();
        if !context.is_empty() {
            let context_json = serde_json::to_string_pretty(context)?;
            system_prompt = format!(
                "{system_prompt}\n\n# Session Context\n```json\n{context_json}\n```"
            );
        }

        let mut messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system_prompt)
                .build()?
                .into(),
        ];
        for entry in history {
            match entry.role {
                Role::User => messages.push(
                    ChatCompletionRequestUserMessageArgs::default()
                        .content(entry.content.clone())
                        .build()?
                        .into(),
                ),
                Role::Assistant => messages.push(
                    ChatCompletionRequestAssistantMessageArgs::default()
                        .content(entry.content.clone())
                        .build()?
                        .into(),
                ),
            }
        }
        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(message.to_string())
                .build()?
                .into(),
        );

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .build()?;

        let response = self.client.chat().create(request).await?;
        let reply = response
            .choices
            .first()
            .context("No response choice from model")?
            .message
            .content
            .as_ref()
            .ok_or_else(|| anyhow!("Model response had no text content"))?;

        Ok(reply.clone())
    }
}
