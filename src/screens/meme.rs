use super::state::{ScreenCore, ScreenState, SlotKey};
use crate::ai::{TextGenerationService, VisualGenerator};
use crate::models::MemeConcept;
use crate::prompts::MEME_STYLE_SUFFIX;
use crate::speech::Narrator;
use crate::Result;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

pub const MEME_FAILED_MESSAGE: &str = "Failed to generate a meme. Try again.";

pub struct MemeScreen {
    core: ScreenCore<MemeConcept>,
    text: Arc<dyn TextGenerationService>,
    narrator: Narrator,
}

impl MemeScreen {
    pub fn new(
        text: Arc<dyn TextGenerationService>,
        visuals: VisualGenerator,
        narrator: Narrator,
    ) -> Self {
        Self {
            core: ScreenCore::new("meme", visuals),
            text,
            narrator,
        }
    }

    pub fn state(&self) -> ScreenState<MemeConcept> {
        self.core.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<ScreenState<MemeConcept>> {
        self.core.subscribe()
    }

    /// Generate a meme concept, then start drawing its picture.
    ///
    /// Returns as soon as the concept is in; the picture lands in
    /// [`SlotKey::Single`] whenever it resolves.
    pub async fn generate(&self, topic: Option<&str>) -> Result<MemeConcept> {
        let epoch = self.core.begin();

        let meme = match self.text.generate_meme_concept(topic).await {
            Ok(meme) => meme,
            Err(e) => {
                warn!("[meme] Concept generation failed: {}", e);
                self.core.fail(epoch, MEME_FAILED_MESSAGE);
                return Err(e);
            }
        };

        if self.core.publish(epoch, meme.clone(), [SlotKey::Single]) {
            info!("[meme] Concept ready for '{}'", meme.entry.word);
            self.core.spawn_visual(
                epoch,
                SlotKey::Single,
                format!("{}{}", meme.visual_prompt, MEME_STYLE_SUFFIX),
            );
        }

        Ok(meme)
    }

    pub fn speak_word(&self) {
        let Some(word) = self.core.snapshot().content().map(|m| m.entry.word.clone()) else {
            return;
        };
        if let Err(e) = self.narrator.speak(&word) {
            warn!("[meme] Speech unavailable: {}", e);
        }
    }

    pub async fn wait_for_visuals(&self) {
        self.core.wait_for_visuals().await;
    }
}
