use crate::ingest::{split_text, Document, CHUNK_OVERLAP, CHUNK_SIZE};
use crate::providers::complete_with_fallback;
use crate::providers::traits::SharedProvider;
use crate::rag::store::VectorStore;
use crate::rag::templates;
use crate::session::ChatSession;
use anyhow::{anyhow, Result};
use lru::LruCache;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Mutex;
use uuid::Uuid;

pub const DEFAULT_TOP_K: u64 = 4;
pub const WELLNESS_COLLECTION: &str = "wellness";

const EMBEDDING_CACHE_SIZE: usize = 256;
const MAX_HISTORY_CHARS: usize = 2000;

#[derive(Debug, Clone)]
pub struct RetrievedChunk {
    pub text: String,
    pub score: f32,
}

/// Single-pass retrieval-augmented generation: ingest, embed, store,
/// retrieve, assemble prompt, complete. Control flow is strictly linear
/// per user action; there is no queueing or background work.
pub struct RagEngine {
    store: VectorStore,
    provider: SharedProvider,
    fallback: Option<SharedProvider>,
    embedding_cache: Mutex<LruCache<String, Vec<f32>>>,
    top_k: u64,
}

impl RagEngine {
    pub fn new(store: VectorStore, provider: SharedProvider, fallback: Option<SharedProvider>) -> Self {
        Self {
            store,
            provider,
            fallback,
            embedding_cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(EMBEDDING_CACHE_SIZE).unwrap(),
            )),
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn provider(&self) -> &SharedProvider {
        &self.provider
    }

    pub fn fallback(&self) -> Option<&SharedProvider> {
        self.fallback.as_ref()
    }

    pub async fn complete(&self, prompt: &str) -> Result<String> {
        complete_with_fallback(
            self.provider.as_ref(),
            self.fallback.as_deref(),
            prompt,
        )
        .await
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if let Ok(mut cache) = self.embedding_cache.lock() {
            if let Some(vector) = cache.get(text) {
                return Ok(vector.clone());
            }
        }

        let vector = self.provider.generate_embedding(text).await?;

        if let Ok(mut cache) = self.embedding_cache.lock() {
            cache.put(text.to_string(), vector.clone());
        }

        Ok(vector)
    }

    /// Chunk, embed and store a document into `collection`. Returns the
    /// number of chunks stored.
    pub async fn ingest_document(&self, collection: &str, doc: &Document) -> Result<usize> {
        let chunks = split_text(&doc.text, CHUNK_SIZE, CHUNK_OVERLAP);
        if chunks.is_empty() {
            return Err(anyhow!("Document {} produced no chunks", doc.source));
        }

        self.store
            .create_collection(collection, self.provider.embedding_dimension() as u64)
            .await?;

        for chunk in &chunks {
            let embedding = self.embed(&chunk.text).await?;

            let mut payload = HashMap::new();
            payload.insert(
                "text".to_string(),
                serde_json::Value::String(chunk.text.clone()),
            );
            payload.insert(
                "source".to_string(),
                serde_json::Value::String(doc.source.clone()),
            );
            payload.insert("chunk_index".to_string(), serde_json::json!(chunk.index));

            self.store
                .store_vector(collection, embedding, payload)
                .await?;
        }

        Ok(chunks.len())
    }

    pub async fn retrieve(
        &self,
        collection: &str,
        query: &str,
        limit: u64,
    ) -> Result<Vec<RetrievedChunk>> {
        let query_embedding = self.embed(query).await?;

        let results = self
            .store
            .search_vectors(collection, query_embedding, limit)
            .await?;

        Ok(results
            .into_iter()
            .filter_map(|(_, score, payload)| {
                let text = payload.get("text")?.as_str()?.to_string();
                Some(RetrievedChunk { text, score })
            })
            .collect())
    }

    /// Lesson summary over a one-shot collection. The collection lives only
    /// for this call and is dropped on both the success and error paths.
    pub async fn summarize_document(&self, doc: &Document) -> Result<String> {
        let collection = format!("lesson-{}", Uuid::new_v4());
        let outcome = self.summarize_in_collection(&collection, doc).await;

        if let Err(e) = self.store.delete_collection(&collection).await {
            log::warn!("Failed to drop collection {}: {}", collection, e);
        }

        outcome
    }

    async fn summarize_in_collection(&self, collection: &str, doc: &Document) -> Result<String> {
        self.ingest_document(collection, doc).await?;

        let retrieved = self
            .retrieve(collection, templates::SUMMARY_QUESTION, self.top_k)
            .await?;
        let texts: Vec<String> = retrieved.into_iter().map(|c| c.text).collect();
        let context = templates::assemble_context(&texts);

        let prompt = templates::lesson_summary_prompt(&context, templates::SUMMARY_QUESTION);
        let summary = self.complete(&prompt).await?;

        if summary.trim().is_empty() {
            return Err(anyhow!("No summary generated from the model"));
        }
        Ok(summary)
    }

    /// Add a document to the persistent counselling corpus.
    pub async fn add_wellness_corpus(&self, doc: &Document) -> Result<usize> {
        self.ingest_document(WELLNESS_COLLECTION, doc).await
    }

    /// One counselling turn: retrieve from the persistent wellness
    /// collection, fold in recent conversation history, complete, and
    /// record both turns on the session.
    pub async fn counsel(&self, session: &mut ChatSession, message: &str) -> Result<String> {
        self.store
            .create_collection(WELLNESS_COLLECTION, self.provider.embedding_dimension() as u64)
            .await?;

        let retrieved = self
            .retrieve(WELLNESS_COLLECTION, message, self.top_k)
            .await?;
        let texts: Vec<String> = retrieved.into_iter().map(|c| c.text).collect();
        let context = templates::assemble_context(&texts);

        let history = session.recent_context(MAX_HISTORY_CHARS);
        session.push("user", message);

        let prompt = templates::wellness_prompt(&context, &history, message);
        let response = self.complete(&prompt).await?;

        session.push("assistant", &response);
        Ok(response)
    }
}
