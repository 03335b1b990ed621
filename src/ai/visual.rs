use super::placeholder::placeholder_url;
use super::ImageGenerationService;
use crate::models::GeneratedImage;
use crate::prompts;
use std::sync::Arc;

/// Soft-failing front for an image backend.
///
/// [`VisualGenerator::generate_visual`] never returns an error: any backend
/// failure resolves to a placeholder derived from the prompt.
#[derive(Clone)]
pub struct VisualGenerator {
    backend: Arc<dyn ImageGenerationService>,
    placeholder_base_url: String,
}

impl VisualGenerator {
    pub fn new(backend: Arc<dyn ImageGenerationService>, placeholder_base_url: String) -> Self {
        Self {
            backend,
            placeholder_base_url,
        }
    }

    /// Generate an image for a caller-styled prompt.
    ///
    /// The house style is appended before the backend call; the placeholder
    /// is keyed on `prompt` exactly as given.
    pub async fn generate_visual(&self, prompt: &str) -> GeneratedImage {
        let styled = prompts::render(prompts::VISUAL_STYLE, &[("prompt", prompt)]);

        match self.backend.generate_image(&styled).await {
            Ok(GeneratedImage::Inline { data, .. }) if data.is_empty() => {
                tracing::warn!("Image generation returned no bytes, falling back to placeholder");
                self.placeholder(prompt)
            }
            Ok(image) => image,
            Err(e) => {
                tracing::warn!(
                    "Image generation failed, falling back to placeholder: {}",
                    e
                );
                self.placeholder(prompt)
            }
        }
    }

    /// The fallback reference `generate_visual` would use for `prompt`.
    pub fn placeholder(&self, prompt: &str) -> GeneratedImage {
        GeneratedImage::Placeholder {
            url: placeholder_url(&self.placeholder_base_url, prompt),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockImageGenerationClient;

    const BASE: &str = "https://picsum.photos";

    #[tokio::test]
    async fn test_success_passes_image_through() {
        let backend = MockImageGenerationClient::new().with_image_response(vec![7, 7]);
        let visuals = VisualGenerator::new(Arc::new(backend.clone()), BASE.to_string());

        let image = visuals.generate_visual("a cup of coffee").await;
        assert!(!image.is_placeholder());
        assert_eq!(
            backend.get_prompts(),
            vec!["a cup of coffee, flat vector art style, minimalist, morandi colors, high quality"]
        );
    }

    #[tokio::test]
    async fn test_failure_yields_deterministic_placeholder() {
        let backend = MockImageGenerationClient::new().with_failure(true);
        let visuals = VisualGenerator::new(Arc::new(backend), BASE.to_string());

        let first = visuals.generate_visual("a cat meme").await;
        let second = visuals.generate_visual("a cat meme").await;

        assert!(first.is_placeholder());
        assert_eq!(first, second);
        assert_eq!(first, visuals.placeholder("a cat meme"));
        assert!(!first.src().is_empty());
    }

    #[tokio::test]
    async fn test_empty_payload_yields_placeholder() {
        let backend = MockImageGenerationClient::new().with_image_response(Vec::new());
        let visuals = VisualGenerator::new(Arc::new(backend), BASE.to_string());

        assert!(visuals.generate_visual("empty").await.is_placeholder());
    }
}
