//! Application wiring: backends, screens, favorites, and saved output.

use crate::ai::{
    GeminiImageClient, GeminiTextClient, ImageGenerationService, TextGenerationService,
    VisualGenerator,
};
use crate::favorites::{FavoritesStore, ToggleOutcome};
use crate::models::{Config, GeneratedImage, VocabularyEntry};
use crate::screens::{ComicScreen, MemeScreen, PhotoScreen, ScreenState, SlotKey, SlotState};
use crate::speech::{LoggingSynthesizer, Narrator, SpeechSynthesizer};
use crate::storage::{FileStore, KeyValueStore};
use crate::Result;
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// The three screens plus the favorites archive they share.
pub struct App {
    photo: PhotoScreen,
    meme: MemeScreen,
    comic: ComicScreen,
    favorites: FavoritesStore,
    output_dir: PathBuf,
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub text: Arc<dyn TextGenerationService>,
    pub images: Arc<dyn ImageGenerationService>,
    pub speech: Arc<dyn SpeechSynthesizer>,
    pub store: Box<dyn KeyValueStore>,
    pub placeholder_base_url: String,
}

impl App {
    /// Build an app from concrete service dependencies.
    ///
    /// Loads the favorites archive from `services.store`. Saved images go
    /// to `output_dir`, which is created on first save.
    pub fn with_services(services: AppServices, output_dir: PathBuf) -> Result<Self> {
        let visuals = VisualGenerator::new(services.images, services.placeholder_base_url);
        let narrator = Narrator::new(services.speech);

        Ok(Self {
            photo: PhotoScreen::new(
                Arc::clone(&services.text),
                visuals.clone(),
                narrator.clone(),
            ),
            meme: MemeScreen::new(Arc::clone(&services.text), visuals.clone(), narrator),
            comic: ComicScreen::new(services.text, visuals),
            favorites: FavoritesStore::load(services.store)?,
            output_dir,
        })
    }

    /// Construct an app against the Gemini backends named in `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        // Reuse one HTTP connection pool across both clients.
        let http_client = reqwest::Client::new();

        let mut text = GeminiTextClient::new_with_client(
            config.gemini_api_key.clone(),
            config.text_model.clone(),
            http_client.clone(),
        );
        let mut images = GeminiImageClient::new_with_client(
            config.gemini_api_key.clone(),
            config.image_model.clone(),
            http_client,
        );
        if let Some(base_url) = &config.gemini_base_url {
            info!("Using Gemini endpoint {}", base_url);
            text = text.with_base_url(base_url.clone());
            images = images.with_base_url(base_url.clone());
        }
        info!("Text provider: Gemini (model: {})", config.text_model);
        info!("Image provider: Gemini (model: {})", config.image_model);

        let store = FileStore::new(&config.data_dir)?;
        info!("Favorites stored under {}", config.data_dir.display());

        Self::with_services(
            AppServices {
                text: Arc::new(text),
                images: Arc::new(images),
                speech: Arc::new(LoggingSynthesizer),
                store: Box::new(store),
                placeholder_base_url: config.placeholder_base_url.clone(),
            },
            session_output_dir(&config.output_dir),
        )
    }

    pub fn photo(&self) -> &PhotoScreen {
        &self.photo
    }

    pub fn meme(&self) -> &MemeScreen {
        &self.meme
    }

    pub fn comic(&self) -> &ComicScreen {
        &self.comic
    }

    pub fn favorites(&self) -> &FavoritesStore {
        &self.favorites
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Heart button: save `entry` if its word is absent, otherwise unsave it.
    pub fn toggle_favorite(&mut self, entry: &VocabularyEntry) -> Result<ToggleOutcome> {
        self.favorites.toggle(entry)
    }

    /// Unsave `word` by toggling its stored entry. Returns `false` when the
    /// word is not saved.
    pub fn remove_favorite(&mut self, word: &str) -> Result<bool> {
        let Some(entry) = self.favorites.get(word).cloned() else {
            return Ok(false);
        };
        self.favorites.toggle(&entry)?;
        Ok(true)
    }

    /// Write every generated image in `state` to the output directory as
    /// `{label}_{slot}.{ext}`. Placeholders have no bytes and are only logged.
    pub fn save_images<T>(&self, label: &str, state: &ScreenState<T>) -> Result<Vec<PathBuf>> {
        let mut saved = Vec::new();

        for (key, slot) in &state.slots {
            let image = match slot {
                SlotState::Ready(image) => image,
                SlotState::Drawing => continue,
            };
            let slot_name = match key {
                SlotKey::Single => "image".to_string(),
                SlotKey::Panel(number) => format!("panel{}", number),
            };

            match image {
                GeneratedImage::Inline { data, .. } => {
                    if saved.is_empty() {
                        fs::create_dir_all(&self.output_dir)?;
                    }
                    let extension = image.extension().unwrap_or("png");
                    let path = self
                        .output_dir
                        .join(format!("{}_{}.{}", label, slot_name, extension));
                    fs::write(&path, data)?;
                    info!("Saved {} ({} bytes)", path.display(), data.len());
                    saved.push(path);
                }
                GeneratedImage::Placeholder { url } => {
                    info!("{} {} uses placeholder {}", label, slot_name, url);
                }
            }
        }

        Ok(saved)
    }
}

/// Per-session output directory: `{base}/{date}_{uuid}`.
pub fn session_output_dir(base: &Path) -> PathBuf {
    let date = Local::now().format("%Y-%m-%d").to_string();
    base.join(format!("{}_{}", date, Uuid::new_v4()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{MockImageGenerationClient, MockTextClient};
    use crate::camera::MockCamera;
    use crate::image::CropRegion;
    use crate::models::{ComicPanel, MemeConcept};
    use crate::speech::MockSynthesizer;
    use crate::storage::MemoryStore;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn aromatic() -> VocabularyEntry {
        VocabularyEntry {
            word: "aromatic".to_string(),
            pronunciation: "/ə'roʊmætɪk/".to_string(),
            meaning: "芳香的".to_string(),
            sentence: "I smell the aromatic coffee.".to_string(),
            translation: "我闻到了芳香的咖啡。".to_string(),
            timestamp: None,
        }
    }

    fn jpeg_frame() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(64, 48, image::Rgb([120, 80, 40]));
        let mut bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Jpeg)
            .unwrap();
        bytes
    }

    fn test_app(
        text: MockTextClient,
        images: MockImageGenerationClient,
        synth: MockSynthesizer,
        store: MemoryStore,
        output_dir: PathBuf,
    ) -> App {
        App::with_services(
            AppServices {
                text: Arc::new(text),
                images: Arc::new(images),
                speech: Arc::new(synth),
                store: Box::new(store),
                placeholder_base_url: "https://picsum.photos".to_string(),
            },
            output_dir,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_coffee_cup_lookup_then_save_favorite() {
        let dir = tempdir().unwrap();
        let synth = MockSynthesizer::new();
        let store = MemoryStore::new();
        let mut app = test_app(
            MockTextClient::new().with_word(aromatic()),
            MockImageGenerationClient::new(),
            synth.clone(),
            store.clone(),
            dir.path().to_path_buf(),
        );
        let camera = MockCamera::new().with_frame(jpeg_frame());

        let entry = app
            .photo()
            .capture_and_lookup(&camera, CropRegion::default())
            .await
            .unwrap();

        assert_eq!(entry.word, "aromatic");
        assert!(!entry.pronunciation.is_empty());
        assert!(!entry.meaning.is_empty());
        assert!(!entry.sentence.is_empty());
        assert!(!entry.translation.is_empty());
        assert_eq!(synth.get_spoken().len(), 1);

        assert_eq!(app.toggle_favorite(&entry).unwrap(), ToggleOutcome::Added);
        assert!(app.favorites().contains("Aromatic"));
        assert_eq!(store.get_write_count(), 1);

        assert_eq!(app.toggle_favorite(&entry).unwrap(), ToggleOutcome::Removed);
        assert!(app.favorites().is_empty());
    }

    #[tokio::test]
    async fn test_favorites_loaded_from_store() {
        let dir = tempdir().unwrap();
        let saved = serde_json::to_string(&vec![VocabularyEntry {
            timestamp: Some(1_700_000_000_000),
            ..aromatic()
        }])
        .unwrap();
        let mut app = test_app(
            MockTextClient::new(),
            MockImageGenerationClient::new(),
            MockSynthesizer::new(),
            MemoryStore::new().with_value(crate::favorites::FAVORITES_KEY, &saved),
            dir.path().to_path_buf(),
        );

        assert_eq!(app.favorites().len(), 1);
        assert!(app.remove_favorite(" AROMATIC ").unwrap());
        assert!(!app.remove_favorite("aromatic").unwrap());
        assert!(app.favorites().is_empty());
    }

    #[tokio::test]
    async fn test_save_images_writes_inline_and_skips_placeholders() {
        let dir = tempdir().unwrap();
        let output_dir = dir.path().join("session");
        let panels: Vec<ComicPanel> = (1..=4)
            .map(|n| ComicPanel {
                panel_number: n,
                description: format!("scene {}", n),
                dialogue: "aromatic!".to_string(),
                visual_prompt: format!("panel {}", n),
                word_data: aromatic(),
            })
            .collect();
        let app = test_app(
            MockTextClient::new().with_comic(panels),
            MockImageGenerationClient::new().with_failing_prompt("panel 3"),
            MockSynthesizer::new(),
            MemoryStore::new(),
            output_dir.clone(),
        );

        app.comic().start_story("Airport").await.unwrap();
        app.comic().wait_for_visuals().await;

        let saved = app.save_images("comic", &app.comic().state()).unwrap();
        let names: Vec<_> = saved
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec!["comic_panel1.png", "comic_panel2.png", "comic_panel4.png"]
        );
        assert!(output_dir.join("comic_panel1.png").exists());
    }

    #[tokio::test]
    async fn test_save_images_without_images_creates_nothing() {
        let dir = tempdir().unwrap();
        let output_dir = dir.path().join("session");
        let meme = MemeConcept {
            entry: aromatic(),
            caption: "caption".to_string(),
            context: "context".to_string(),
            visual_prompt: "prompt".to_string(),
        };
        let app = test_app(
            MockTextClient::new().with_meme(meme),
            MockImageGenerationClient::new().with_failure(true),
            MockSynthesizer::new(),
            MemoryStore::new(),
            output_dir.clone(),
        );

        app.meme().generate(None).await.unwrap();
        app.meme().wait_for_visuals().await;

        assert!(app.save_images("meme", &app.meme().state()).unwrap().is_empty());
        assert!(!output_dir.exists());
    }

    #[test]
    fn test_session_output_dir_layout() {
        let dir = session_output_dir(Path::new("output"));
        let name = dir.file_name().unwrap().to_string_lossy().into_owned();

        assert!(dir.starts_with("output"));
        let (date, id) = name.split_at(10);
        assert!(chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok());
        assert!(Uuid::parse_str(id.trim_start_matches('_')).is_ok());
    }
}
