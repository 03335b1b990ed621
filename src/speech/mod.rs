//! Text-to-speech capability
//!
//! The synthesizer itself is injected; [`Narrator`] applies the utterance
//! settings and keeps at most one utterance in flight.

pub mod mock;

pub use mock::MockSynthesizer;

use crate::Result;
use std::sync::Arc;

pub const SPEECH_LANG: &str = "en-US";
pub const SPEECH_RATE: f32 = 0.9;
pub const SPEECH_PITCH: f32 = 1.0;

/// Voice names preferred when the platform offers them.
const PREFERRED_VOICES: [&str; 2] = ["Google US English", "Samantha"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub name: String,
    pub lang: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub lang: String,
    pub rate: f32,
    pub pitch: f32,
    pub voice: Option<Voice>,
}

pub trait SpeechSynthesizer: Send + Sync {
    fn voices(&self) -> Vec<Voice>;
    /// Stop whatever is currently playing.
    fn cancel(&self);
    fn speak(&self, utterance: Utterance) -> Result<()>;
}

/// Speaks vocabulary aloud through an injected synthesizer.
#[derive(Clone)]
pub struct Narrator {
    synth: Arc<dyn SpeechSynthesizer>,
}

impl Narrator {
    pub fn new(synth: Arc<dyn SpeechSynthesizer>) -> Self {
        Self { synth }
    }

    /// Speak `text`, cancelling any utterance still playing. Blank text is
    /// ignored.
    pub fn speak(&self, text: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }

        self.synth.cancel();

        let voices = self.synth.voices();
        let voice = voices
            .into_iter()
            .find(|v| PREFERRED_VOICES.iter().any(|name| v.name.contains(name)));

        self.synth.speak(Utterance {
            text: text.to_string(),
            lang: SPEECH_LANG.to_string(),
            rate: SPEECH_RATE,
            pitch: SPEECH_PITCH,
            voice,
        })
    }
}

/// Synthesizer for headless runs: writes utterances to the log.
#[derive(Debug, Default)]
pub struct LoggingSynthesizer;

impl SpeechSynthesizer for LoggingSynthesizer {
    fn voices(&self) -> Vec<Voice> {
        Vec::new()
    }

    fn cancel(&self) {}

    fn speak(&self, utterance: Utterance) -> Result<()> {
        tracing::info!(
            "Speaking \"{}\" ({}, rate {})",
            utterance.text,
            utterance.lang,
            utterance.rate
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::mock::SpeechEvent;

    #[test]
    fn test_speak_cancels_then_speaks_with_fixed_settings() {
        let synth = MockSynthesizer::new();
        let narrator = Narrator::new(Arc::new(synth.clone()));

        narrator.speak("aromatic").unwrap();

        let events = synth.get_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], SpeechEvent::Cancel);
        match &events[1] {
            SpeechEvent::Speak(utterance) => {
                assert_eq!(utterance.text, "aromatic");
                assert_eq!(utterance.lang, "en-US");
                assert_eq!(utterance.rate, 0.9);
                assert_eq!(utterance.pitch, 1.0);
                assert!(utterance.voice.is_none());
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_blank_text_is_ignored() {
        let synth = MockSynthesizer::new();
        let narrator = Narrator::new(Arc::new(synth.clone()));

        narrator.speak("   ").unwrap();
        assert!(synth.get_events().is_empty());
    }

    #[test]
    fn test_preferred_voice_is_selected() {
        let synth = MockSynthesizer::new()
            .with_voice("Alex", "en-US")
            .with_voice("Samantha", "en-US");
        let narrator = Narrator::new(Arc::new(synth.clone()));

        narrator.speak("serene").unwrap();

        let spoken = synth.get_spoken();
        assert_eq!(spoken.len(), 1);
        assert_eq!(spoken[0].voice.as_ref().unwrap().name, "Samantha");
    }

    #[test]
    fn test_new_utterance_replaces_playing_one() {
        let synth = MockSynthesizer::new();
        let narrator = Narrator::new(Arc::new(synth.clone()));

        narrator.speak("first").unwrap();
        narrator.speak("second").unwrap();

        assert_eq!(synth.get_playing().as_deref(), Some("second"));
        assert_eq!(synth.get_spoken().len(), 2);
    }
}
