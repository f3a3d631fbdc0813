use crate::config::ProviderSettings;
use crate::providers::traits::CompletionProvider;
use anyhow::{anyhow, Result};
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
        ChatCompletionRequestUserMessage, ChatCompletionRequestUserMessageContent,
        CreateChatCompletionRequestArgs, CreateEmbeddingRequestArgs, EmbeddingInput, Role,
    },
    Client,
};
use std::sync::{Arc, RwLock};

const EMBEDDING_DIMENSION: usize = 1536;

#[derive(Clone)]
pub struct OpenAIProvider {
    system_message: Arc<RwLock<String>>,
    client: Client<OpenAIConfig>,
    chat_model: String,
    embedding_model: String,
    temperature: f32,
}

impl OpenAIProvider {
    /// Same client and settings, different chat model. Used to build the
    /// cheaper variant for the rate-limit retry.
    pub fn with_model(mut self, model: &str) -> Self {
        self.chat_model = model.to_string();
        self
    }
}

#[async_trait::async_trait]
impl CompletionProvider for OpenAIProvider {
    async fn new(api_key: String, system_message: String) -> Result<Self> {
        let config = OpenAIConfig::new().with_api_key(api_key);
        let client = Client::with_config(config);
        let settings = ProviderSettings::from_env("openai");

        Ok(Self {
            system_message: Arc::new(RwLock::new(system_message)),
            client,
            chat_model: settings.model,
            embedding_model: settings.embedding_model,
            temperature: settings.temperature,
        })
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let system_message = self
            .system_message
            .read()
            .map_err(|e| anyhow!("Failed to read system message: {}", e))?
            .clone();

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.chat_model)
            .temperature(self.temperature)
            .messages(vec![
                ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                    role: Role::System,
                    content: system_message,
                    name: None,
                }),
                ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                    role: Role::User,
                    content: ChatCompletionRequestUserMessageContent::Text(prompt.to_string()),
                    name: None,
                }),
            ])
            .build()?;

        let response = self.client.chat().create(request).await?;

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| anyhow!("No response content"))
    }

    async fn generate_embedding(&self, text: &str) -> Result<Vec<f32>> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.embedding_model)
            .input(EmbeddingInput::String(text.to_string()))
            .build()?;

        let response = self.client.embeddings().create(request).await?;

        if let Some(embedding) = response.data.first() {
            Ok(embedding.embedding.clone())
        } else {
            Err(anyhow!("No embedding returned from OpenAI"))
        }
    }

    fn embedding_dimension(&self) -> usize {
        EMBEDDING_DIMENSION
    }

    fn model(&self) -> String {
        self.chat_model.clone()
    }

    fn get_system_message(&self) -> String {
        self.system_message.read().unwrap().clone()
    }

    fn clone_box(&self) -> Box<dyn CompletionProvider + Send + Sync> {
        Box::new(self.clone())
    }
}
