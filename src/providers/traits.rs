use anyhow::Result;
use async_trait::async_trait;
use std::any::Any;
use std::sync::Arc;

#[async_trait]
pub trait CompletionProvider: Any + Send + Sync {
    async fn new(api_key: String, system_message: String) -> Result<Self>
    where
        Self: Sized;

    async fn complete(&self, prompt: &str) -> Result<String>;

    async fn generate_embedding(&self, text: &str) -> Result<Vec<f32>>;

    /// Dimension of the vectors returned by generate_embedding.
    fn embedding_dimension(&self) -> usize;

    fn model(&self) -> String;

    fn get_system_message(&self) -> String;

    fn clone_box(&self) -> Box<dyn CompletionProvider + Send + Sync>;
}

impl Clone for Box<dyn CompletionProvider + Send + Sync> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

pub type SharedProvider = Arc<dyn CompletionProvider + Send + Sync>;
