//! HTTP-backed encoders: Ollama for text, CLIP-style gateways for
//! cross-modal embeddings.

use async_trait::async_trait;
use base64::Engine;
use drishti_common::{CrossModalEncoder, DrishtiError, Result, TextEncoder, Vector};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Ollama text encoder configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Ollama server URL
    pub base_url: String,
    /// Model name
    pub model: String,
    /// Embedding dimension reported by the model
    pub dimension: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "mxbai-embed-large".to_string(),
            dimension: 1024,
            timeout_secs: 30,
        }
    }
}

/// Text encoder backed by an Ollama server.
pub struct OllamaTextEncoder {
    config: OllamaConfig,
    client: reqwest::Client,
}

impl std::fmt::Debug for OllamaTextEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OllamaTextEncoder")
            .field("config", &self.config)
            .finish()
    }
}

impl OllamaTextEncoder {
    /// Create a new Ollama text encoder.
    ///
    /// This does not contact the server; the first embed call will surface
    /// connectivity problems.
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DrishtiError::Embedding(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Check that the Ollama server is reachable and lists the model.
    pub async fn check_availability(&self) -> Result<()> {
        #[derive(Deserialize)]
        struct ModelInfo {
            name: String,
        }

        #[derive(Deserialize)]
        struct TagsResponse {
            models: Vec<ModelInfo>,
        }

        let url = format!("{}/api/tags", self.config.base_url);
        let response = self.client.get(&url).send().await.map_err(|e| {
            DrishtiError::Embedding(format!(
                "Cannot connect to Ollama at {}: {}",
                self.config.base_url, e
            ))
        })?;

        if !response.status().is_success() {
            return Err(DrishtiError::Embedding(format!(
                "Ollama server returned error status: {}",
                response.status()
            )));
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| DrishtiError::Embedding(format!("Failed to parse models list: {}", e)))?;

        if !tags.models.iter().any(|m| m.name.starts_with(&self.config.model)) {
            tracing::warn!("Model '{}' not listed by Ollama", self.config.model);
        }

        Ok(())
    }
}

#[async_trait]
impl TextEncoder for OllamaTextEncoder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vector>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        #[derive(Serialize)]
        struct Request {
            model: String,
            prompt: String,
        }

        #[derive(Deserialize)]
        struct Response {
            embedding: Vec<f32>,
        }

        let url = format!("{}/api/embeddings", self.config.base_url);
        let mut embeddings = Vec::with_capacity(texts.len());

        for text in texts {
            let request = Request {
                model: self.config.model.clone(),
                prompt: text.clone(),
            };

            let response = self
                .client
                .post(&url)
                .json(&request)
                .send()
                .await
                .map_err(|e| DrishtiError::Embedding(format!("API request failed: {}", e)))?;

            if !response.status().is_success() {
                let status = response.status();
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                return Err(DrishtiError::Embedding(format!(
                    "API returned error {}: {}",
                    status, error_text
                )));
            }

            let response_data: Response = response
                .json()
                .await
                .map_err(|e| DrishtiError::Embedding(format!("Failed to parse response: {}", e)))?;

            embeddings.push(response_data.embedding);
        }

        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

/// CLIP gateway configuration.
///
/// The gateway is any HTTP service exposing `/embed/image` (base64 payload)
/// and `/embed/text`, both returning `{"embedding": [...]}` in one shared
/// vector space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipGatewayConfig {
    /// Gateway base URL
    pub base_url: String,
    /// Model identifier forwarded to the gateway
    pub model: String,
    /// Embedding dimension of the shared space
    pub dimension: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ClipGatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8190".to_string(),
            model: "clip-vit-base-patch32".to_string(),
            dimension: 512,
            timeout_secs: 60,
        }
    }
}

/// Cross-modal encoder backed by a CLIP-style embedding gateway.
pub struct ClipGatewayEncoder {
    config: ClipGatewayConfig,
    client: reqwest::Client,
}

impl std::fmt::Debug for ClipGatewayEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipGatewayEncoder")
            .field("config", &self.config)
            .finish()
    }
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

impl ClipGatewayEncoder {
    /// Create a new gateway encoder.
    pub fn new(config: ClipGatewayConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DrishtiError::ModelLoad(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    async fn post_embed(&self, path: &str, body: serde_json::Value) -> Result<Vector> {
        let url = format!("{}{}", self.config.base_url, path);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| DrishtiError::Embedding(format!("Gateway request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(DrishtiError::Embedding(format!(
                "Gateway returned error {}: {}",
                status, error_text
            )));
        }

        let data: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| DrishtiError::Embedding(format!("Failed to parse response: {}", e)))?;

        Ok(data.embedding)
    }
}

#[async_trait]
impl CrossModalEncoder for ClipGatewayEncoder {
    async fn embed_image(&self, bytes: &[u8]) -> Result<Vector> {
        if bytes.is_empty() {
            return Err(DrishtiError::Embedding(
                "empty or unreadable image payload".to_string(),
            ));
        }

        let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
        self.post_embed(
            "/embed/image",
            serde_json::json!({
                "model": self.config.model,
                "image_b64": payload,
            }),
        )
        .await
    }

    async fn embed_text(&self, text: &str) -> Result<Vector> {
        self.post_embed(
            "/embed/text",
            serde_json::json!({
                "model": self.config.model,
                "text": text,
            }),
        )
        .await
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }

    fn name(&self) -> &str {
        "clip-gateway"
    }
}
