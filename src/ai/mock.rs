use super::{ImageGenerationService, TextGenerationService};
use crate::models::{ComicPanel, GeneratedImage, MemeConcept, VocabularyEntry};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Failure a mock reports in place of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    Empty,
    Parse,
    Transport,
}

impl MockFailure {
    fn into_error(self) -> Error {
        match self {
            MockFailure::Empty => Error::EmptyResponse("Mock empty response".to_string()),
            MockFailure::Parse => Error::Parse("Mock parse failure".to_string()),
            MockFailure::Transport => Error::AiProvider("Mock transport failure".to_string()),
        }
    }
}

#[derive(Default)]
struct TextResponses {
    words: VecDeque<std::result::Result<VocabularyEntry, MockFailure>>,
    memes: VecDeque<std::result::Result<MemeConcept, MockFailure>>,
    comics: VecDeque<std::result::Result<Vec<ComicPanel>, MockFailure>>,
}

/// Scripted text backend. Queued responses are consumed in order; the last
/// one repeats once the queue is down to it.
#[derive(Clone, Default)]
pub struct MockTextClient {
    responses: Arc<Mutex<TextResponses>>,
    call_count: Arc<Mutex<usize>>,
    topics: Arc<Mutex<Vec<Option<String>>>>,
    delays: Arc<Mutex<VecDeque<Duration>>>,
}

fn next_response<T: Clone>(
    queue: &mut VecDeque<std::result::Result<T, MockFailure>>,
    what: &str,
) -> Result<T> {
    let response = if queue.len() > 1 {
        queue.pop_front()
    } else {
        queue.front().cloned()
    };

    match response {
        Some(Ok(value)) => Ok(value),
        Some(Err(failure)) => Err(failure.into_error()),
        None => Err(Error::EmptyResponse(format!("No mock {} configured", what))),
    }
}

impl MockTextClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_word(self, entry: VocabularyEntry) -> Self {
        self.responses.lock().unwrap().words.push_back(Ok(entry));
        self
    }

    pub fn with_word_failure(self, failure: MockFailure) -> Self {
        self.responses.lock().unwrap().words.push_back(Err(failure));
        self
    }

    pub fn with_meme(self, meme: MemeConcept) -> Self {
        self.responses.lock().unwrap().memes.push_back(Ok(meme));
        self
    }

    pub fn with_meme_failure(self, failure: MockFailure) -> Self {
        self.responses.lock().unwrap().memes.push_back(Err(failure));
        self
    }

    pub fn with_comic(self, panels: Vec<ComicPanel>) -> Self {
        self.responses.lock().unwrap().comics.push_back(Ok(panels));
        self
    }

    pub fn with_comic_failure(self, failure: MockFailure) -> Self {
        self.responses.lock().unwrap().comics.push_back(Err(failure));
        self
    }

    /// Queue a response delay. Delays are consumed one per call like
    /// responses; the last one repeats.
    pub fn with_delay(self, delay: Duration) -> Self {
        self.delays.lock().unwrap().push_back(delay);
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Topics passed to `generate_meme_concept`, in call order.
    pub fn get_topics(&self) -> Vec<Option<String>> {
        self.topics.lock().unwrap().clone()
    }

    fn next_delay(&self) -> Option<Duration> {
        let mut delays = self.delays.lock().unwrap();
        if delays.len() > 1 {
            delays.pop_front()
        } else {
            delays.front().copied()
        }
    }

    /// Count the call, then wait out its delay. The response is taken
    /// before waiting, so calls receive responses in call order.
    async fn finish_call<T>(&self, response: Result<T>) -> Result<T> {
        *self.call_count.lock().unwrap() += 1;
        if let Some(delay) = self.next_delay() {
            tokio::time::sleep(delay).await;
        }
        response
    }
}

#[async_trait]
impl TextGenerationService for MockTextClient {
    async fn lookup_word_from_image(&self, _image_bytes: &[u8]) -> Result<VocabularyEntry> {
        let response = next_response(&mut self.responses.lock().unwrap().words, "word");
        self.finish_call(response).await
    }

    async fn generate_meme_concept(&self, topic: Option<&str>) -> Result<MemeConcept> {
        self.topics
            .lock()
            .unwrap()
            .push(topic.map(|t| t.to_string()));
        let response = next_response(&mut self.responses.lock().unwrap().memes, "meme");
        self.finish_call(response).await
    }

    async fn generate_comic_script(&self, _theme: &str) -> Result<Vec<ComicPanel>> {
        let response = next_response(&mut self.responses.lock().unwrap().comics, "comic");
        self.finish_call(response).await
    }
}

/// Scripted image backend.
#[derive(Clone)]
pub struct MockImageGenerationClient {
    image_responses: Arc<Mutex<Vec<Vec<u8>>>>,
    call_count: Arc<Mutex<usize>>,
    prompts: Arc<Mutex<Vec<String>>>,
    should_fail: Arc<Mutex<bool>>,
    failing_prompts: Arc<Mutex<Vec<String>>>,
    delays: Arc<Mutex<Vec<(String, Duration)>>>,
}

impl MockImageGenerationClient {
    pub fn new() -> Self {
        Self {
            image_responses: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
            should_fail: Arc::new(Mutex::new(false)),
            failing_prompts: Arc::new(Mutex::new(Vec::new())),
            delays: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_image_response(self, response: Vec<u8>) -> Self {
        self.image_responses.lock().unwrap().push(response);
        self
    }

    pub fn with_failure(self, should_fail: bool) -> Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    /// Fail any prompt containing `fragment`.
    pub fn with_failing_prompt(self, fragment: &str) -> Self {
        self.failing_prompts
            .lock()
            .unwrap()
            .push(fragment.to_string());
        self
    }

    /// Delay any prompt containing `fragment` by `delay`.
    pub fn with_delay_for(self, fragment: &str, delay: Duration) -> Self {
        self.delays
            .lock()
            .unwrap()
            .push((fragment.to_string(), delay));
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    pub fn get_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Default for MockImageGenerationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageGenerationService for MockImageGenerationClient {
    async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage> {
        let count = {
            let mut count = self.call_count.lock().unwrap();
            *count += 1;
            *count
        };
        self.prompts.lock().unwrap().push(prompt.to_string());

        let delay = self
            .delays
            .lock()
            .unwrap()
            .iter()
            .find(|(fragment, _)| prompt.contains(fragment.as_str()))
            .map(|(_, delay)| *delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let fails = *self.should_fail.lock().unwrap()
            || self
                .failing_prompts
                .lock()
                .unwrap()
                .iter()
                .any(|fragment| prompt.contains(fragment.as_str()));
        if fails {
            return Err(Error::AiProvider("Mock image quota exceeded".to_string()));
        }

        let responses = self.image_responses.lock().unwrap();
        let data = if responses.is_empty() {
            // 1x1 PNG signature + IHDR, enough for MIME sniffing
            vec![
                0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48,
                0x44, 0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01,
            ]
        } else {
            responses[(count - 1) % responses.len()].clone()
        };

        Ok(GeneratedImage::Inline {
            mime_type: "image/png".to_string(),
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(word: &str) -> VocabularyEntry {
        VocabularyEntry {
            word: word.to_string(),
            pronunciation: String::new(),
            meaning: String::new(),
            sentence: String::new(),
            translation: String::new(),
            timestamp: None,
        }
    }

    #[tokio::test]
    async fn test_mock_text_client_consumes_queue_then_repeats_last() {
        let client = MockTextClient::new()
            .with_word(entry("first"))
            .with_word(entry("second"));

        assert_eq!(client.lookup_word_from_image(&[]).await.unwrap().word, "first");
        assert_eq!(client.lookup_word_from_image(&[]).await.unwrap().word, "second");
        assert_eq!(client.lookup_word_from_image(&[]).await.unwrap().word, "second");
        assert_eq!(client.get_call_count(), 3);
    }

    #[tokio::test]
    async fn test_mock_text_client_failures() {
        let client = MockTextClient::new().with_meme_failure(MockFailure::Parse);

        let err = client.generate_meme_concept(Some("cats")).await.unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
        assert_eq!(client.get_topics(), vec![Some("cats".to_string())]);

        let err = client.generate_comic_script("x").await.unwrap_err();
        assert!(matches!(err, Error::EmptyResponse(_)));
    }

    #[tokio::test]
    async fn test_mock_image_client_failing_prompt() {
        let client = MockImageGenerationClient::new().with_failing_prompt("panel 3");

        assert!(client.generate_image("panel 1").await.is_ok());
        assert!(client.generate_image("panel 3").await.is_err());
        assert_eq!(client.get_call_count(), 2);
        assert_eq!(client.get_prompts(), vec!["panel 1", "panel 3"]);
    }
}
