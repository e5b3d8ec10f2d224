//! services/api/src/adapters/scout_llm.rs
//!
//! The chat model behind every scout. Implements the `TextModelService` port.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::info;
use trip_scout_core::ports::{PortError, PortResult, TextModelService};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// Sends one system and one user message and returns the first choice's text.
#[derive(Clone)]
pub struct OpenAiScoutAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiScoutAdapter {
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

//=========================================================================================
// `TextModelService` Trait Implementation
//=========================================================================================

#[async_trait]
impl TextModelService for OpenAiScoutAdapter {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        max_output_tokens: u32,
    ) -> PortResult<String> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .max_tokens(max_output_tokens)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        if let Some(usage) = &response.usage {
            info!(
                model = %self.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Model call complete"
            );
        }

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::Unexpected("Model response contained no text content.".to_string())
            })
    }
}
