//! Data models and structures
//!
//! Defines the vocabulary records produced by the generation client, the
//! image references written into screen slots, and runtime configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One vocabulary card.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VocabularyEntry {
    pub word: String,
    pub pronunciation: String,
    pub meaning: String,
    pub sentence: String,
    pub translation: String,
    /// Epoch milliseconds, set only when the entry is saved to favorites.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl VocabularyEntry {
    /// Identity used by the favorites list.
    pub fn identity(&self) -> String {
        word_identity(&self.word)
    }
}

/// Normalized form of a word for identity comparisons.
pub fn word_identity(word: &str) -> String {
    word.trim().to_lowercase()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MemeConcept {
    #[serde(flatten)]
    pub entry: VocabularyEntry,
    pub caption: String,
    pub context: String,
    pub visual_prompt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ComicPanel {
    pub panel_number: u32,
    pub description: String,
    pub dialogue: String,
    pub visual_prompt: String,
    pub word_data: VocabularyEntry,
}

/// Panel count requested from the backend for every comic.
pub const COMIC_PANEL_COUNT: usize = 4;

/// Check that panel numbers run 1, 2, .., n in order.
pub fn validate_panel_sequence(panels: &[ComicPanel]) -> crate::Result<()> {
    if panels.is_empty() {
        return Err(crate::Error::Parse("Comic script has no panels".to_string()));
    }

    for (index, panel) in panels.iter().enumerate() {
        let expected = index as u32 + 1;
        if panel.panel_number != expected {
            return Err(crate::Error::Parse(format!(
                "Comic panel at position {} has panelNumber {} (expected {})",
                index + 1,
                panel.panel_number,
                expected
            )));
        }
    }

    Ok(())
}

/// An image resolved for a slot: real bytes or a fallback URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratedImage {
    Inline { mime_type: String, data: Vec<u8> },
    Placeholder { url: String },
}

impl GeneratedImage {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, GeneratedImage::Placeholder { .. })
    }

    /// Renderable source: a `data:` URL for inline payloads, otherwise the URL.
    pub fn src(&self) -> String {
        match self {
            GeneratedImage::Inline { mime_type, data } => {
                use base64::Engine as _;
                format!(
                    "data:{};base64,{}",
                    mime_type,
                    base64::engine::general_purpose::STANDARD.encode(data)
                )
            }
            GeneratedImage::Placeholder { url } => url.clone(),
        }
    }

    /// File extension matching the payload's MIME type.
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            GeneratedImage::Inline { mime_type, .. } => Some(match mime_type.as_str() {
                "image/jpeg" => "jpg",
                "image/webp" => "webp",
                "image/gif" => "gif",
                _ => "png",
            }),
            GeneratedImage::Placeholder { .. } => None,
        }
    }
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_base_url: Option<String>,
    pub text_model: String,
    pub image_model: String,
    pub placeholder_base_url: String,
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
}

pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "imagen-4.0-generate-001";
pub const DEFAULT_PLACEHOLDER_BASE_URL: &str = "https://picsum.photos";

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let gemini_api_key = get("GEMINI_API_KEY")
            .or_else(|| get("API_KEY"))
            .ok_or_else(|| crate::Error::Config("GEMINI_API_KEY not set".to_string()))?;

        Ok(Self {
            gemini_api_key,
            gemini_base_url: get("GEMINI_BASE_URL"),
            text_model: get("TEXT_MODEL").unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string()),
            image_model: get("IMAGE_MODEL").unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
            placeholder_base_url: get("PLACEHOLDER_BASE_URL")
                .unwrap_or_else(|| DEFAULT_PLACEHOLDER_BASE_URL.to_string()),
            data_dir: get("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data")),
            output_dir: get("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("output")),
        })
    }
}
