use super::state::{ScreenCore, ScreenState, SlotKey};
use crate::ai::{TextGenerationService, VisualGenerator};
use crate::models::ComicPanel;
use crate::prompts::COMIC_STYLE_SUFFIX;
use crate::Result;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::{info, warn};

pub const COMIC_FAILED_MESSAGE: &str = "Failed to create the comic. Try again.";

/// One whitespace-separated token of a panel's dialogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueToken {
    pub text: String,
    pub highlighted: bool,
}

/// Split `panel`'s dialogue on whitespace, marking tokens that contain the
/// panel's word (case-insensitive).
pub fn highlight_dialogue(panel: &ComicPanel) -> Vec<DialogueToken> {
    let target = panel.word_data.word.trim().to_lowercase();

    panel
        .dialogue
        .split_whitespace()
        .map(|token| DialogueToken {
            text: token.to_string(),
            highlighted: !target.is_empty() && token.to_lowercase().contains(&target),
        })
        .collect()
}

pub struct ComicScreen {
    core: ScreenCore<Vec<ComicPanel>>,
    text: Arc<dyn TextGenerationService>,
    active_panel: Mutex<Option<u32>>,
}

impl ComicScreen {
    pub fn new(text: Arc<dyn TextGenerationService>, visuals: VisualGenerator) -> Self {
        Self {
            core: ScreenCore::new("comic", visuals),
            text,
            active_panel: Mutex::new(None),
        }
    }

    pub fn state(&self) -> ScreenState<Vec<ComicPanel>> {
        self.core.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<ScreenState<Vec<ComicPanel>>> {
        self.core.subscribe()
    }

    /// Generate a script for `theme` and start one image task per panel.
    ///
    /// Returns `Ok(None)` for a blank theme, and when a newer story started
    /// while this script was being written (the script is then discarded).
    pub async fn start_story(&self, theme: &str) -> Result<Option<Vec<ComicPanel>>> {
        let theme = theme.trim();
        if theme.is_empty() {
            return Ok(None);
        }

        let epoch = self.core.begin();
        *self.active_panel.lock().unwrap_or_else(|e| e.into_inner()) = None;

        let script = match self.text.generate_comic_script(theme).await {
            Ok(script) => script,
            Err(e) => {
                warn!("[comic] Script generation failed: {}", e);
                self.core.fail(epoch, COMIC_FAILED_MESSAGE);
                return Err(e);
            }
        };

        let slots = script.iter().map(|panel| SlotKey::Panel(panel.panel_number));
        if !self.core.publish(epoch, script.clone(), slots) {
            return Ok(None);
        }

        info!("[comic] '{}' script ready, drawing {} panels", theme, script.len());
        for panel in &script {
            self.core.spawn_visual(
                epoch,
                SlotKey::Panel(panel.panel_number),
                format!("{}{}", panel.visual_prompt, COMIC_STYLE_SUFFIX),
            );
        }

        Ok(Some(script))
    }

    /// Reveal `panel_number`'s word, or hide it if already revealed.
    /// Returns the panel now revealed.
    pub fn toggle_active_panel(&self, panel_number: u32) -> Option<u32> {
        let exists = self
            .core
            .snapshot()
            .content()
            .is_some_and(|panels| panels.iter().any(|p| p.panel_number == panel_number));

        let mut active = self.active_panel.lock().unwrap_or_else(|e| e.into_inner());
        *active = match *active {
            Some(current) if current == panel_number => None,
            _ if exists => Some(panel_number),
            other => other,
        };
        *active
    }

    pub fn active_panel(&self) -> Option<u32> {
        *self.active_panel.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub async fn wait_for_visuals(&self) {
        self.core.wait_for_visuals().await;
    }
}
