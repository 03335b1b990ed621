//! Per-screen state, published through a watch channel.
//!
//! Every run bumps the screen's epoch. Writes carry the epoch they were
//! started under and are dropped once a newer run has begun, so a late image
//! from a superseded run never lands in the current result.

use crate::ai::VisualGenerator;
use crate::models::GeneratedImage;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Address of an image slot on a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SlotKey {
    /// The one image of the photo and meme screens.
    Single,
    /// A comic panel, by panel number.
    Panel(u32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotState {
    Drawing,
    Ready(GeneratedImage),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase<T> {
    Idle,
    Loading,
    Ready(T),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenState<T> {
    pub epoch: u64,
    pub phase: Phase<T>,
    pub slots: BTreeMap<SlotKey, SlotState>,
    /// Persistent inline message (camera permission); survives new runs.
    pub notice: Option<String>,
}

impl<T> Default for ScreenState<T> {
    fn default() -> Self {
        Self {
            epoch: 0,
            phase: Phase::Idle,
            slots: BTreeMap::new(),
            notice: None,
        }
    }
}

impl<T> ScreenState<T> {
    pub fn content(&self) -> Option<&T> {
        match &self.phase {
            Phase::Ready(content) => Some(content),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            Phase::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Loading)
    }

    pub fn image(&self, key: SlotKey) -> Option<&GeneratedImage> {
        match self.slots.get(&key) {
            Some(SlotState::Ready(image)) => Some(image),
            _ => None,
        }
    }
}

/// State owner shared by all screens: epoch bookkeeping plus the image
/// fan-out.
pub struct ScreenCore<T> {
    name: &'static str,
    state: Arc<watch::Sender<ScreenState<T>>>,
    visuals: VisualGenerator,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl<T> ScreenCore<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(name: &'static str, visuals: VisualGenerator) -> Self {
        let (state, _) = watch::channel(ScreenState::default());
        Self {
            name,
            state: Arc::new(state),
            visuals,
            tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn snapshot(&self) -> ScreenState<T> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ScreenState<T>> {
        self.state.subscribe()
    }

    /// Start a new run: clear results and slots, enter loading.
    pub fn begin(&self) -> u64 {
        let mut epoch = 0;
        self.state.send_modify(|state| {
            state.epoch += 1;
            state.phase = Phase::Loading;
            state.slots.clear();
            epoch = state.epoch;
        });
        tracing::debug!("[{}] Started run {}", self.name, epoch);
        epoch
    }

    fn modify_current<F>(&self, epoch: u64, what: &str, apply: F) -> bool
    where
        F: FnOnce(&mut ScreenState<T>),
    {
        let applied = apply_if_current(&self.state, epoch, apply);
        if !applied {
            tracing::debug!("[{}] Dropped stale {} from run {}", self.name, what, epoch);
        }
        applied
    }

    /// Publish text content and mark `slots` as drawing.
    pub fn publish<I>(&self, epoch: u64, content: T, slots: I) -> bool
    where
        I: IntoIterator<Item = SlotKey>,
    {
        self.modify_current(epoch, "content", |state| {
            state.phase = Phase::Ready(content);
            for key in slots {
                state.slots.insert(key, SlotState::Drawing);
            }
        })
    }

    pub fn fail(&self, epoch: u64, message: &str) -> bool {
        self.modify_current(epoch, "failure", |state| {
            state.phase = Phase::Failed(message.to_string());
        })
    }

    pub fn set_slot(&self, epoch: u64, key: SlotKey, image: GeneratedImage) -> bool {
        self.modify_current(epoch, "image", |state| {
            state.slots.insert(key, SlotState::Ready(image));
        })
    }

    pub fn set_notice(&self, notice: Option<String>) {
        self.state.send_modify(|state| state.notice = notice);
    }

    /// Launch one independent image task writing only `key`.
    pub fn spawn_visual(&self, epoch: u64, key: SlotKey, prompt: String) {
        let state = Arc::clone(&self.state);
        let visuals = self.visuals.clone();
        let name = self.name;

        let handle = tokio::spawn(async move {
            let image = visuals.generate_visual(&prompt).await;
            let placeholder = image.is_placeholder();
            if apply_if_current(&state, epoch, |s| {
                s.slots.insert(key, SlotState::Ready(image));
            }) {
                tracing::info!(
                    "[{}] Slot {:?} resolved{}",
                    name,
                    key,
                    if placeholder { " with placeholder" } else { "" }
                );
            } else {
                tracing::debug!("[{}] Dropped stale image for {:?} from run {}", name, key, epoch);
            }
        });

        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        tasks.retain(|task| !task.is_finished());
        tasks.push(handle);
    }

    /// Await every image task launched so far.
    ///
    /// The screen flow never waits on its images; this exists for drivers
    /// that must not exit while slots are still drawing.
    pub async fn wait_for_visuals(&self) {
        let tasks: Vec<_> = {
            let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
            tasks.drain(..).collect()
        };

        for task in tasks {
            if let Err(e) = task.await {
                tracing::warn!("[{}] Image task ended abnormally: {}", self.name, e);
            }
        }
    }
}

fn apply_if_current<T, F>(state: &watch::Sender<ScreenState<T>>, epoch: u64, apply: F) -> bool
where
    F: FnOnce(&mut ScreenState<T>),
{
    state.send_if_modified(|s| {
        if s.epoch != epoch {
            return false;
        }
        apply(s);
        true
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockImageGenerationClient;
    use std::time::Duration;

    fn core(backend: MockImageGenerationClient) -> ScreenCore<String> {
        ScreenCore::new(
            "test",
            VisualGenerator::new(Arc::new(backend), "https://picsum.photos".to_string()),
        )
    }

    #[test]
    fn test_begin_clears_previous_result() {
        let core = core(MockImageGenerationClient::new());
        let first = core.begin();
        core.publish(first, "old".to_string(), [SlotKey::Single]);

        let second = core.begin();
        let state = core.snapshot();
        assert_eq!(second, first + 1);
        assert!(state.is_loading());
        assert!(state.slots.is_empty());
    }

    #[test]
    fn test_stale_writes_are_dropped() {
        let core = core(MockImageGenerationClient::new());
        let stale = core.begin();
        let current = core.begin();

        assert!(!core.publish(stale, "late".to_string(), [SlotKey::Single]));
        assert!(!core.fail(stale, "late failure"));
        assert!(core.publish(current, "fresh".to_string(), []));
        assert_eq!(core.snapshot().content().map(String::as_str), Some("fresh"));
    }

    #[test]
    fn test_notice_survives_new_runs() {
        let core = core(MockImageGenerationClient::new());
        core.set_notice(Some("camera blocked".to_string()));
        core.begin();
        assert_eq!(core.snapshot().notice.as_deref(), Some("camera blocked"));
    }

    #[tokio::test]
    async fn test_spawned_visual_fills_its_slot() {
        let core = core(MockImageGenerationClient::new());
        let epoch = core.begin();
        core.publish(epoch, "x".to_string(), [SlotKey::Panel(1), SlotKey::Panel(2)]);

        core.spawn_visual(epoch, SlotKey::Panel(2), "panel two".to_string());
        core.wait_for_visuals().await;

        let state = core.snapshot();
        assert!(state.image(SlotKey::Panel(2)).is_some());
        assert_eq!(state.slots[&SlotKey::Panel(1)], SlotState::Drawing);
    }

    #[tokio::test]
    async fn test_late_visual_from_superseded_run_is_dropped() {
        let backend =
            MockImageGenerationClient::new().with_delay_for("slow", Duration::from_millis(100));
        let core = core(backend);

        let old = core.begin();
        core.publish(old, "old".to_string(), [SlotKey::Single]);
        core.spawn_visual(old, SlotKey::Single, "slow".to_string());

        let new = core.begin();
        core.publish(new, "new".to_string(), [SlotKey::Single]);
        core.wait_for_visuals().await;

        let state = core.snapshot();
        assert_eq!(state.slots[&SlotKey::Single], SlotState::Drawing);
    }

    #[tokio::test]
    async fn test_subscribers_see_progressive_updates() {
        let core = core(MockImageGenerationClient::new());
        let mut rx = core.subscribe();
        let epoch = core.begin();
        core.publish(epoch, "x".to_string(), [SlotKey::Single]);
        rx.borrow_and_update();

        core.spawn_visual(epoch, SlotKey::Single, "p".to_string());
        rx.changed().await.unwrap();
        assert!(rx.borrow().image(SlotKey::Single).is_some());
    }
}
