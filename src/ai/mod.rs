//! Generative-AI integration for vocabulary, meme, comic and image generation
//!
//! Text operations fail loudly with a typed error. Image generation is split
//! in two: [`ImageGenerationService`] is the fallible backend call, and
//! [`VisualGenerator`] wraps it so callers always receive an image.

pub mod gemini;
pub mod mime;
pub mod mock;
pub mod placeholder;
pub mod visual;

pub use gemini::{GeminiImageClient, GeminiTextClient};
pub use mock::{MockImageGenerationClient, MockTextClient};
pub use visual::VisualGenerator;

use crate::models::{ComicPanel, GeneratedImage, MemeConcept, VocabularyEntry};
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait TextGenerationService: Send + Sync {
    /// Identify the subject of a photo and return a matching vocabulary card.
    async fn lookup_word_from_image(&self, image_bytes: &[u8]) -> Result<VocabularyEntry>;

    /// Produce a meme concept, scoped to `topic` when one is given.
    async fn generate_meme_concept(&self, topic: Option<&str>) -> Result<MemeConcept>;

    /// Produce a comic script whose panels are numbered 1..=n in order.
    async fn generate_comic_script(&self, theme: &str) -> Result<Vec<ComicPanel>>;
}

#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    /// Generate one square image for a fully styled prompt.
    async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage>;
}
