use super::state::{ScreenCore, ScreenState, SlotKey};
use crate::ai::{TextGenerationService, VisualGenerator};
use crate::camera::CameraSource;
use crate::image::{prepare_photo, CropRegion};
use crate::models::{GeneratedImage, VocabularyEntry};
use crate::speech::Narrator;
use crate::{ErrorKind, Result};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

pub const CAMERA_DENIED_MESSAGE: &str = "Unable to access camera. Please allow permissions.";
pub const LOOKUP_FAILED_MESSAGE: &str = "Failed to analyze image. Try again.";

/// Photo lookup: capture, crop, identify a word, speak it.
pub struct PhotoScreen {
    core: ScreenCore<VocabularyEntry>,
    text: Arc<dyn TextGenerationService>,
    narrator: Narrator,
}

impl PhotoScreen {
    pub fn new(
        text: Arc<dyn TextGenerationService>,
        visuals: VisualGenerator,
        narrator: Narrator,
    ) -> Self {
        Self {
            core: ScreenCore::new("photo", visuals),
            text,
            narrator,
        }
    }

    pub fn state(&self) -> ScreenState<VocabularyEntry> {
        self.core.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<ScreenState<VocabularyEntry>> {
        self.core.subscribe()
    }

    /// Capture a frame, look up its word, and speak the word once.
    ///
    /// The captured crop fills the screen's single slot right away. A camera
    /// refusal leaves the previous result alone and sets the persistent
    /// notice instead.
    pub async fn capture_and_lookup(
        &self,
        camera: &dyn CameraSource,
        crop: CropRegion,
    ) -> Result<VocabularyEntry> {
        let frame = match camera.capture().await {
            Ok(frame) => frame,
            Err(e) if e.kind() == ErrorKind::CapabilityDenied => {
                warn!("[photo] Camera unavailable: {}", e);
                self.core.set_notice(Some(CAMERA_DENIED_MESSAGE.to_string()));
                return Err(e);
            }
            Err(e) => return Err(e),
        };
        self.core.set_notice(None);

        let epoch = self.core.begin();

        let photo = match prepare_photo(frame, crop).await {
            Ok(photo) => photo,
            Err(e) => {
                warn!("[photo] Could not prepare captured frame: {}", e);
                self.core.fail(epoch, LOOKUP_FAILED_MESSAGE);
                return Err(e);
            }
        };

        self.core.set_slot(
            epoch,
            SlotKey::Single,
            GeneratedImage::Inline {
                mime_type: "image/jpeg".to_string(),
                data: photo.clone(),
            },
        );

        let entry = match self.text.lookup_word_from_image(&photo).await {
            Ok(entry) => entry,
            Err(e) => {
                warn!("[photo] Word lookup failed: {}", e);
                self.core.fail(epoch, LOOKUP_FAILED_MESSAGE);
                return Err(e);
            }
        };

        if self.core.publish(epoch, entry.clone(), []) {
            info!("[photo] Showing card for '{}'", entry.word);
            self.speak_word();
        }

        Ok(entry)
    }

    /// Speak the word on the current card, if any.
    pub fn speak_word(&self) {
        let Some(word) = self.core.snapshot().content().map(|e| e.word.clone()) else {
            return;
        };
        if let Err(e) = self.narrator.speak(&word) {
            warn!("[photo] Speech unavailable: {}", e);
        }
    }
}
