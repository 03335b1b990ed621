use super::client::GeminiHttpClient;
use super::types::{
    Content, GenerateContentRequest, GenerateContentResponse, InlineData, Part,
    StructuredOutputConfig,
};
use crate::ai::{mime, TextGenerationService};
use crate::models::{
    validate_panel_sequence, ComicPanel, MemeConcept, VocabularyEntry, COMIC_PANEL_COUNT,
};
use crate::schema::ResponseKind;
use crate::{prompts, Error, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;

/// Structured-output text client for word lookups, memes and comic scripts.
pub struct GeminiTextClient {
    http: GeminiHttpClient,
}

impl GeminiTextClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(api_key, model, client),
        }
    }

    async fn generate_structured<T: DeserializeOwned>(
        &self,
        kind: ResponseKind,
        system: &str,
        parts: Vec<Part>,
    ) -> Result<T> {
        let request = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part::Text {
                    text: system.to_string(),
                }],
            },
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            generation_config: StructuredOutputConfig {
                response_mime_type: "application/json",
                response_schema: kind.schema(),
            },
        };

        tracing::debug!("Requesting {:?} from Gemini ({})", kind, self.http.model());
        let response: GenerateContentResponse = self.http.generate_content(&request).await?;

        let text = response
            .first_text()
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| {
                Error::EmptyResponse(format!("No {:?} content in Gemini response", kind))
            })?;

        parse_structured(kind, &text)
    }
}

super::impl_with_gemini_base_url!(GeminiTextClient);

/// Decode `text` as JSON, validate it against `kind`'s schema, then map it
/// onto `T`.
pub fn parse_structured<T: DeserializeOwned>(kind: ResponseKind, text: &str) -> Result<T> {
    let value: serde_json::Value = serde_json::from_str(text).map_err(|e| {
        tracing::error!("Gemini returned invalid JSON for {:?}: {}", kind, e);
        Error::Parse(format!("Invalid JSON in {:?} response: {}", kind, e))
    })?;

    kind.schema().validate(&value)?;

    serde_json::from_value(value)
        .map_err(|e| Error::Parse(format!("Unexpected {:?} response shape: {}", kind, e)))
}

fn text_part(text: String) -> Part {
    Part::Text { text }
}

#[async_trait]
impl TextGenerationService for GeminiTextClient {
    async fn lookup_word_from_image(&self, image_bytes: &[u8]) -> Result<VocabularyEntry> {
        if image_bytes.is_empty() {
            return Err(Error::Invariant("No image data to analyze".to_string()));
        }

        tracing::debug!("Looking up word for photo ({} bytes)", image_bytes.len());

        use base64::Engine as _;
        let parts = vec![
            Part::InlineData {
                inline_data: InlineData {
                    mime_type: mime::detect_image_mime(image_bytes).to_string(),
                    data: base64::engine::general_purpose::STANDARD.encode(image_bytes),
                },
            },
            text_part(prompts::LOOKUP_USER.to_string()),
        ];

        let mut entry: VocabularyEntry = self
            .generate_structured(ResponseKind::WordLookup, prompts::LOOKUP_SYSTEM, parts)
            .await?;
        entry.timestamp = None;

        tracing::info!("Photo matched word: {}", entry.word);
        Ok(entry)
    }

    async fn generate_meme_concept(&self, topic: Option<&str>) -> Result<MemeConcept> {
        let prompt = match topic.map(str::trim).filter(|t| !t.is_empty()) {
            Some(topic) => prompts::render(prompts::MEME_TOPIC, &[("topic", topic)]),
            None => prompts::MEME_RANDOM.to_string(),
        };

        let mut meme: MemeConcept = self
            .generate_structured(ResponseKind::Meme, prompts::MEME_SYSTEM, vec![text_part(prompt)])
            .await?;
        meme.entry.timestamp = None;

        tracing::info!("Meme concept for word: {}", meme.entry.word);
        Ok(meme)
    }

    async fn generate_comic_script(&self, theme: &str) -> Result<Vec<ComicPanel>> {
        let panels = COMIC_PANEL_COUNT.to_string();
        let prompt = prompts::render(
            prompts::COMIC_USER,
            &[("theme", theme.trim()), ("panels", &panels)],
        );

        let mut script: Vec<ComicPanel> = self
            .generate_structured(ResponseKind::Comic, prompts::COMIC_SYSTEM, vec![text_part(prompt)])
            .await?;

        validate_panel_sequence(&script)?;
        for panel in &mut script {
            panel.word_data.timestamp = None;
        }

        tracing::info!("Comic script for '{}' has {} panels", theme, script.len());
        Ok(script)
    }
}
