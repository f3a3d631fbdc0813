use crate::config::ProviderSettings;
use crate::providers::traits::CompletionProvider;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::{Arc, RwLock};

const EMBEDDING_DIMENSION: usize = 768;

#[derive(Clone)]
pub struct GeminiProvider {
    api_key: String,
    system_message: Arc<RwLock<String>>,
    client: Client,
    api_url: String,
    model: String,
    embedding_model: String,
    temperature: f32,
}

impl GeminiProvider {
    /// Same credentials and settings, different generation model. Used to
    /// build the cheaper variant for the rate-limit retry.
    pub fn clone_with_model(&self, model: &str) -> Self {
        Self {
            api_key: self.api_key.clone(),
            system_message: Arc::new(RwLock::new(self.get_system_message())),
            client: self.client.clone(),
            api_url: self.api_url.clone(),
            model: model.to_string(),
            embedding_model: self.embedding_model.clone(),
            temperature: self.temperature,
        }
    }
}

#[async_trait]
impl CompletionProvider for GeminiProvider {
    async fn new(api_key: String, system_message: String) -> Result<Self> {
        let settings = ProviderSettings::from_env("gemini");

        Ok(Self {
            api_key,
            system_message: Arc::new(RwLock::new(system_message)),
            client: Client::new(),
            api_url: settings.api_url,
            model: settings.model,
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

        // Gemini has no separate system role on this endpoint; the system
        // text is merged into the single user part.
        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.api_url, self.model
            ))
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({
                "contents": [{
                    "role": "user",
                    "parts": [{
                        "text": format!("{}\n\n{}", system_message, prompt)
                    }]
                }],
                "generationConfig": {
                    "temperature": self.temperature
                }
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            return Err(anyhow!(
                "API request failed: Status {}, Body: {}",
                status,
                error_text
            ));
        }

        let response_json: Value = response.json().await?;

        response_json["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(|s| s.trim().to_string())
            .ok_or_else(|| anyhow!("Invalid response format"))
    }

    async fn generate_embedding(&self, text: &str) -> Result<Vec<f32>> {
        let response = self
            .client
            .post(format!(
                "{}/models/{}:embedContent",
                self.api_url, self.embedding_model
            ))
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({
                "model": format!("models/{}", self.embedding_model),
                "content": {
                    "parts": [{ "text": text }]
                }
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            return Err(anyhow!(
                "Embedding request failed: Status {}, Body: {}",
                status,
                error_text
            ));
        }

        let response_json: Value = response.json().await?;

        let values = response_json["embedding"]["values"]
            .as_array()
            .ok_or_else(|| anyhow!("Invalid embedding response format"))?;

        values
            .iter()
            .map(|v| {
                v.as_f64()
                    .map(|f| f as f32)
                    .ok_or_else(|| anyhow!("Non-numeric value in embedding"))
            })
            .collect()
    }

    fn embedding_dimension(&self) -> usize {
        EMBEDDING_DIMENSION
    }

    fn model(&self) -> String {
        self.model.clone()
    }

    fn get_system_message(&self) -> String {
        self.system_message.read().unwrap().clone()
    }

    fn clone_box(&self) -> Box<dyn CompletionProvider + Send + Sync> {
        Box::new(self.clone())
    }
}
