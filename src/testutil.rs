//! Provider stubs and fixtures shared across test modules

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use tokio::sync::Semaphore;

use crate::error::{Error, Result};
use crate::providers::{EmbeddingProvider, GenerationProvider};

/// Build a minimal uncompressed PDF with one page per input string.
pub fn build_pdf(pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// Embeds text as `[mentions cats, mentions dogs, 1.0]`. Three dimensions
/// keep ranking assertions checkable by hand.
pub struct KeywordEmbedder;

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(Error::embedding("cannot embed empty text"));
        }
        let lower = text.to_lowercase();
        Ok(vec![
            if lower.contains("cat") { 1.0 } else { 0.0 },
            if lower.contains("dog") { 1.0 } else { 0.0 },
            1.0,
        ])
    }

    fn dimensions(&self) -> usize {
        3
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "keyword-stub"
    }
}

/// Blocks every embed on a semaphore with no permits, so a test can hold a
/// session mid-ingestion and release it when ready. Each embed consumes one
/// permit, so adding exactly as many permits as expected embeds leaves the
/// gate closed afterwards.
pub struct GateEmbedder {
    gate: Arc<Semaphore>,
}

impl GateEmbedder {
    pub fn new() -> Self {
        Self {
            gate: Arc::new(Semaphore::new(0)),
        }
    }

    pub fn gate(&self) -> Arc<Semaphore> {
        self.gate.clone()
    }
}

#[async_trait]
impl EmbeddingProvider for GateEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| Error::internal("gate closed"))?;
        permit.forget();
        KeywordEmbedder.embed(text).await
    }

    fn dimensions(&self) -> usize {
        3
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "gated-stub"
    }
}

/// Returns a fixed reply and counts how many times it was called.
pub struct CountingGenerator {
    reply: String,
    calls: AtomicUsize,
}

impl CountingGenerator {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationProvider for CountingGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        if prompt.trim().is_empty() {
            return Err(Error::generation("empty prompt"));
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "counting-stub"
    }

    fn model(&self) -> &str {
        "stub"
    }
}

/// Always fails, for error propagation tests.
pub struct FailingGenerator;

#[async_trait]
impl GenerationProvider for FailingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Err(Error::generation("model backend unavailable"))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(false)
    }

    fn name(&self) -> &str {
        "failing-stub"
    }

    fn model(&self) -> &str {
        "stub"
    }
}
