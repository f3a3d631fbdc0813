use qdrant_client::{
    config::QdrantConfig,
    qdrant::{
        point_id::PointIdOptions, with_payload_selector::SelectorOptions, CreateCollection,
        DeleteCollection, Distance, PointId, PointStruct, SearchPoints, UpsertPoints, Value,
        VectorParams, VectorsConfig, WithPayloadSelector,
    },
    Qdrant,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum VectorStoreError {
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Operation failed: {0}")]
    Operation(String),
}

/// Thin wrapper over qdrant. Similarity metric and eviction are entirely
/// the store's concern; callers only name collections.
#[derive(Clone)]
pub struct VectorStore {
    client: Arc<Qdrant>,
}

impl VectorStore {
    pub async fn connect(url: &str) -> Result<Self, VectorStoreError> {
        // Accept both plain host:port and a scheme-prefixed URL, and move
        // REST port 6333 over to the gRPC port.
        let clean_url = if url.contains("://") {
            url.split("://").nth(1).unwrap_or(url).to_string()
        } else {
            url.to_string()
        };
        let grpc_url = if clean_url.ends_with(":6333") {
            clean_url.replace(":6333", ":6334")
        } else {
            clean_url
        };
        let url_with_scheme = format!("http://{}", grpc_url);
        log::info!("Connecting to qdrant at {}", url_with_scheme);

        let mut config = QdrantConfig::from_url(&url_with_scheme);
        config.check_compatibility = false;
        config.timeout = Duration::from_secs(30);
        config.connect_timeout = Duration::from_secs(10);

        let client = Qdrant::new(config).map_err(|e| VectorStoreError::Connection(e.to_string()))?;

        client
            .list_collections()
            .await
            .map_err(|e| VectorStoreError::Connection(format!("Connection test failed: {}", e)))?;

        Ok(Self {
            client: Arc::new(client),
        })
    }

    pub async fn create_collection(
        &self,
        name: &str,
        vector_size: u64,
    ) -> Result<(), VectorStoreError> {
        let vectors_config = VectorsConfig {
            config: Some(qdrant_client::qdrant::vectors_config::Config::Params(
                VectorParams {
                    size: vector_size,
                    distance: Distance::Cosine.into(),
                    ..Default::default()
                },
            )),
        };

        let create_collection = CreateCollection {
            collection_name: name.to_string(),
            vectors_config: Some(vectors_config),
            ..Default::default()
        };

        match self.client.create_collection(create_collection).await {
            Ok(_) => Ok(()),
            Err(e) if e.to_string().contains("AlreadyExists") => {
                log::info!("Collection {} already exists, skipping creation", name);
                Ok(())
            }
            Err(e) => Err(VectorStoreError::Operation(e.to_string())),
        }
    }

    pub async fn store_vector(
        &self,
        collection: &str,
        vector: Vec<f32>,
        payload: HashMap<String, serde_json::Value>,
    ) -> Result<String, VectorStoreError> {
        let point_id = Uuid::new_v4().to_string();

        let payload: HashMap<String, Value> = payload
            .into_iter()
            .map(|(k, v)| (k, Value::from(v)))
            .collect();

        let point = PointStruct {
            id: Some(PointId {
                point_id_options: Some(PointIdOptions::Uuid(point_id.clone())),
            }),
            vectors: Some(vector.into()),
            payload,
        };

        let upsert_points = UpsertPoints {
            collection_name: collection.to_string(),
            points: vec![point],
            ..Default::default()
        };

        self.client
            .upsert_points(upsert_points)
            .await
            .map_err(|e| VectorStoreError::Operation(e.to_string()))?;

        Ok(point_id)
    }

    pub async fn search_vectors(
        &self,
        collection: &str,
        query_vector: Vec<f32>,
        limit: u64,
    ) -> Result<Vec<(String, f32, HashMap<String, serde_json::Value>)>, VectorStoreError> {
        let request = SearchPoints {
            collection_name: collection.to_string(),
            vector: query_vector,
            limit,
            with_payload: Some(WithPayloadSelector {
                selector_options: Some(SelectorOptions::Enable(true)),
            }),
            ..Default::default()
        };

        let results = self
            .client
            .search_points(request)
            .await
            .map_err(|e| VectorStoreError::Operation(e.to_string()))?;

        let points = results
            .result
            .into_iter()
            .map(|point| {
                let id = match point.id.and_then(|id| id.point_id_options) {
                    Some(PointIdOptions::Uuid(uuid)) => uuid,
                    _ => String::new(),
                };
                let score = point.score;
                let payload = point
                    .payload
                    .into_iter()
                    .map(|(k, v)| {
                        (
                            k,
                            serde_json::Value::try_from(v).unwrap_or(serde_json::Value::Null),
                        )
                    })
                    .collect();
                (id, score, payload)
            })
            .collect();

        Ok(points)
    }

    /// Collections for one-shot summarize sessions are dropped here once
    /// the answer is produced.
    pub async fn delete_collection(&self, name: &str) -> Result<(), VectorStoreError> {
        let delete_collection = DeleteCollection {
            collection_name: name.to_string(),
            ..Default::default()
        };

        self.client
            .delete_collection(delete_collection)
            .await
            .map_err(|e| VectorStoreError::Operation(e.to_string()))?;

        Ok(())
    }
}
