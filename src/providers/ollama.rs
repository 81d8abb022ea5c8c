//! Ollama-backed embedding and generation providers
//!
//! One [`OllamaClient`] talks to the Ollama HTTP API; [`OllamaEmbedder`] and
//! [`OllamaGenerator`] wrap it behind the provider traits and can share a
//! single client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::LlmConfig;
use crate::error::{Error, Result};
use crate::providers::{EmbeddingProvider, GenerationProvider};

/// Pause before the single retry of a failed transport attempt.
const RETRY_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Low-level HTTP client for one Ollama server.
///
/// Transport-level failures (connect errors, timeouts) are retried exactly
/// once after a short pause. HTTP error statuses are never retried.
pub struct OllamaClient {
    client: reqwest::Client,
    config: LlmConfig,
}

impl OllamaClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()
            .map_err(|e| Error::internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn post_json<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> std::result::Result<reqwest::Response, reqwest::Error> {
        let url = self.url(path);
        match self.client.post(&url).json(body).send().await {
            Ok(response) => Ok(response),
            Err(e) if is_transient(&e) => {
                warn!(url = %url, error = %e, "Ollama request failed, retrying once");
                tokio::time::sleep(RETRY_DELAY).await;
                self.client.post(&url).json(body).send().await
            }
            Err(e) => Err(e),
        }
    }

    /// Embed one text with the given model.
    pub async fn embed(&self, model: &str, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(Error::embedding("cannot embed empty text"));
        }

        let request = EmbedRequest {
            model,
            prompt: text,
        };
        let response = self
            .post_json("/api/embeddings", &request)
            .await
            .map_err(|e| Error::embedding(format!("request to Ollama failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::embedding(format!("Ollama returned {status}: {body}")));
        }

        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|e| Error::embedding(format!("invalid embedding response: {e}")))?;
        if parsed.embedding.is_empty() {
            return Err(Error::embedding(format!(
                "model '{model}' returned an empty embedding"
            )));
        }
        Ok(parsed.embedding)
    }

    /// Generate a non-streaming completion with the given model.
    pub async fn generate(&self, model: &str, prompt: &str, temperature: f32) -> Result<String> {
        let request = GenerateRequest {
            model,
            prompt,
            stream: false,
            options: GenerateOptions { temperature },
        };
        debug!(model, prompt_chars = prompt.chars().count(), "sending generation request");

        let response = self
            .post_json("/api/generate", &request)
            .await
            .map_err(|e| Error::generation(format!("request to Ollama failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::generation(format!(
                "Ollama returned {status}: {body}"
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::generation(format!("invalid generation response: {e}")))?;
        Ok(parsed.response)
    }

    /// Probe the server's model listing endpoint.
    pub async fn health_check(&self) -> Result<bool> {
        match self.client.get(self.url("/api/tags")).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }
}

fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect()
}

/// [`EmbeddingProvider`] backed by an Ollama embedding model.
pub struct OllamaEmbedder {
    client: Arc<OllamaClient>,
    model: String,
    dimensions: usize,
    concurrency: usize,
}

impl OllamaEmbedder {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        Ok(Self::from_client(Arc::new(OllamaClient::new(config)?)))
    }

    /// Build an embedder that shares an existing client.
    pub fn from_client(client: Arc<OllamaClient>) -> Self {
        Self {
            model: client.config.embed_model.clone(),
            dimensions: client.config.embed_dimensions,
            concurrency: client.config.embed_concurrency,
            client,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let vector = self.client.embed(&self.model, text).await?;
        if vector.len() != self.dimensions {
            return Err(Error::embedding(format!(
                "model '{}' returned a {}-dimensional vector, expected {}",
                self.model,
                vector.len(),
                self.dimensions
            )));
        }
        Ok(vector)
    }

    /// Overlap up to `embed_concurrency` requests while preserving order.
    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        // Materialized up front: feeding the closure to `stream::iter` lazily
        // trips a higher-ranked lifetime error against the boxed trait future.
        let requests: Vec<_> = texts.iter().map(|text| self.embed(text)).collect();
        stream::iter(requests)
            .buffered(self.concurrency.max(1))
            .try_collect()
            .await
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn health_check(&self) -> Result<bool> {
        self.client.health_check().await
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

/// [`GenerationProvider`] backed by an Ollama chat model.
pub struct OllamaGenerator {
    client: Arc<OllamaClient>,
    model: String,
    temperature: f32,
}

impl OllamaGenerator {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        Ok(Self::from_client(Arc::new(OllamaClient::new(config)?)))
    }

    /// Build a generator that shares an existing client.
    pub fn from_client(client: Arc<OllamaClient>) -> Self {
        Self {
            model: client.config.generate_model.clone(),
            temperature: client.config.temperature,
            client,
        }
    }
}

#[async_trait]
impl GenerationProvider for OllamaGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.client
            .generate(&self.model, prompt, self.temperature)
            .await
    }

    async fn health_check(&self) -> Result<bool> {
        self.client.health_check().await
    }

    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    async fn stub_embeddings(Json(request): Json<Value>) -> Response {
        let prompt = request["prompt"].as_str().unwrap_or_default();
        if prompt.contains("boom") {
            return (StatusCode::INTERNAL_SERVER_ERROR, "model melted").into_response();
        }
        // One deterministic component per request lets tests check ordering.
        Json(json!({ "embedding": [prompt.chars().count() as f32, 1.0, 2.0] })).into_response()
    }

    async fn stub_generate(Json(request): Json<Value>) -> Response {
        let prompt = request["prompt"].as_str().unwrap_or_default();
        if prompt.contains("explode") {
            return (StatusCode::INTERNAL_SERVER_ERROR, "model melted").into_response();
        }
        let model = request["model"].as_str().unwrap_or("?");
        assert_eq!(request["stream"], json!(false));
        Json(json!({ "response": format!("echo from {model}") })).into_response()
    }

    async fn stub_server() -> std::net::SocketAddr {
        let app = Router::new()
            .route("/api/embeddings", post(stub_embeddings))
            .route("/api/generate", post(stub_generate))
            .route("/api/tags", get(|| async { Json(json!({ "models": [] })) }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn stub_config(addr: std::net::SocketAddr) -> LlmConfig {
        LlmConfig {
            base_url: format!("http://{addr}"),
            embed_dimensions: 3,
            ..LlmConfig::default()
        }
    }

    #[tokio::test]
    async fn embeds_text_through_the_api() {
        let addr = stub_server().await;
        let embedder = OllamaEmbedder::new(&stub_config(addr)).unwrap();

        let vector = embedder.embed("hello").await.unwrap();
        assert_eq!(vector, vec![5.0, 1.0, 2.0]);
    }

    #[tokio::test]
    async fn refuses_to_embed_empty_text() {
        let addr = stub_server().await;
        let embedder = OllamaEmbedder::new(&stub_config(addr)).unwrap();

        let err = embedder.embed("   ").await.unwrap_err();
        assert!(matches!(err, Error::Embedding(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn rejects_vectors_of_the_wrong_dimension() {
        let addr = stub_server().await;
        let config = LlmConfig {
            embed_dimensions: 4,
            ..stub_config(addr)
        };
        let embedder = OllamaEmbedder::new(&config).unwrap();

        let err = embedder.embed("hello").await.unwrap_err();
        assert!(matches!(err, Error::Embedding(_)));
        assert!(err.to_string().contains("expected 4"));
    }

    #[tokio::test]
    async fn error_status_becomes_an_embedding_error() {
        let addr = stub_server().await;
        let embedder = OllamaEmbedder::new(&stub_config(addr)).unwrap();

        let err = embedder.embed("boom").await.unwrap_err();
        assert!(matches!(err, Error::Embedding(_)));
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn embed_many_preserves_input_order() {
        let addr = stub_server().await;
        let embedder = OllamaEmbedder::new(&stub_config(addr)).unwrap();

        let texts = vec!["a".to_string(), "bb".to_string(), "ccc".to_string()];
        let vectors = embedder.embed_many(&texts).await.unwrap();
        assert_eq!(vectors.len(), 3);
        for (text, vector) in texts.iter().zip(&vectors) {
            assert_eq!(vector[0], text.chars().count() as f32);
        }
    }

    #[tokio::test]
    async fn embed_many_handles_more_texts_than_the_concurrency_window() {
        let addr = stub_server().await;
        let config = LlmConfig {
            embed_concurrency: 2,
            ..stub_config(addr)
        };
        let embedder = OllamaEmbedder::new(&config).unwrap();

        let texts: Vec<String> = (1..=5).map(|n| "x".repeat(n)).collect();
        let vectors = embedder.embed_many(&texts).await.unwrap();
        let lengths: Vec<f32> = vectors.iter().map(|v| v[0]).collect();
        assert_eq!(lengths, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[tokio::test]
    async fn transport_timeout_is_retried_once_then_reported() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let app = Router::new().route(
            "/api/embeddings",
            post(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Json(json!({ "embedding": [1.0, 1.0, 2.0] }))
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let config = LlmConfig {
            timeout_secs: 1,
            ..stub_config(addr)
        };
        let embedder = OllamaEmbedder::new(&config).unwrap();

        let err = embedder.embed("hello").await.unwrap_err();
        assert!(matches!(err, Error::Embedding(_)), "got {err:?}");
        assert_eq!(hits.load(Ordering::SeqCst), 2, "one attempt plus one retry");
    }

    #[tokio::test]
    async fn transport_timeout_maps_to_a_generation_error() {
        let app = Router::new().route(
            "/api/generate",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Json(json!({ "response": "late" }))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let config = LlmConfig {
            timeout_secs: 1,
            ..stub_config(addr)
        };
        let generator = OllamaGenerator::new(&config).unwrap();

        let err = generator.generate("hello").await.unwrap_err();
        assert!(matches!(err, Error::Generation(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn connect_failure_is_retried_once_and_can_succeed() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        // Nothing is listening for the first attempt; the server comes up
        // during the retry pause.
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            let app = Router::new().route("/api/embeddings", post(stub_embeddings));
            let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
            axum::serve(listener, app).await.unwrap();
        });

        let embedder = OllamaEmbedder::new(&stub_config(addr)).unwrap();
        let vector = embedder.embed("hello").await.unwrap();
        assert_eq!(vector, vec![5.0, 1.0, 2.0]);
    }

    #[tokio::test]
    async fn generates_a_completion() {
        let addr = stub_server().await;
        let generator = OllamaGenerator::new(&stub_config(addr)).unwrap();

        let answer = generator.generate("What is a cat?").await.unwrap();
        assert_eq!(answer, "echo from llama2");
    }

    #[tokio::test]
    async fn generation_error_status_becomes_a_generation_error() {
        let addr = stub_server().await;
        let generator = OllamaGenerator::new(&stub_config(addr)).unwrap();

        let err = generator.generate("please explode").await.unwrap_err();
        assert!(matches!(err, Error::Generation(_)), "got {err:?}");
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn health_check_reports_reachability() {
        let addr = stub_server().await;
        let embedder = OllamaEmbedder::new(&stub_config(addr)).unwrap();
        assert!(embedder.health_check().await.unwrap());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let dead = listener.local_addr().unwrap();
        drop(listener);
        let unreachable = OllamaEmbedder::new(&LlmConfig {
            base_url: format!("http://{dead}"),
            ..LlmConfig::default()
        })
        .unwrap();
        assert!(!unreachable.health_check().await.unwrap());
    }
}
