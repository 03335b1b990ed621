use super::{SpeechSynthesizer, Utterance, Voice};
use crate::{Error, Result};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub enum SpeechEvent {
    Cancel,
    Speak(Utterance),
}

/// Records every call; tracks the single utterance currently "playing".
#[derive(Clone, Default)]
pub struct MockSynthesizer {
    voices: Arc<Mutex<Vec<Voice>>>,
    events: Arc<Mutex<Vec<SpeechEvent>>>,
    playing: Arc<Mutex<Option<String>>>,
    denied: Arc<Mutex<bool>>,
}

impl MockSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_voice(self, name: &str, lang: &str) -> Self {
        self.voices.lock().unwrap().push(Voice {
            name: name.to_string(),
            lang: lang.to_string(),
        });
        self
    }

    /// Refuse every utterance, as a device without speech permission would.
    pub fn with_denied(self, denied: bool) -> Self {
        *self.denied.lock().unwrap() = denied;
        self
    }

    pub fn get_events(&self) -> Vec<SpeechEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn get_spoken(&self) -> Vec<Utterance> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|event| match event {
                SpeechEvent::Speak(utterance) => Some(utterance.clone()),
                SpeechEvent::Cancel => None,
            })
            .collect()
    }

    pub fn get_playing(&self) -> Option<String> {
        self.playing.lock().unwrap().clone()
    }
}

impl SpeechSynthesizer for MockSynthesizer {
    fn voices(&self) -> Vec<Voice> {
        self.voices.lock().unwrap().clone()
    }

    fn cancel(&self) {
        self.events.lock().unwrap().push(SpeechEvent::Cancel);
        *self.playing.lock().unwrap() = None;
    }

    fn speak(&self, utterance: Utterance) -> Result<()> {
        if *self.denied.lock().unwrap() {
            return Err(Error::CapabilityDenied(
                "Speech synthesis not permitted".to_string(),
            ));
        }

        *self.playing.lock().unwrap() = Some(utterance.text.clone());
        self.events.lock().unwrap().push(SpeechEvent::Speak(utterance));
        Ok(())
    }
}
