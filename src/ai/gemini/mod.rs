pub mod client;
pub mod image;
pub mod text;
pub mod types;

pub use client::GeminiHttpClient;
pub use image::GeminiImageClient;
pub use text::GeminiTextClient;

/// Forward `with_base_url` to the wrapped [`GeminiHttpClient`].
macro_rules! impl_with_gemini_base_url {
    ($client:ty) => {
        impl $client {
            pub fn with_base_url(mut self, base_url: String) -> Self {
                self.http = self.http.with_base_url(base_url);
                self
            }
        }
    };
}

pub(crate) use impl_with_gemini_base_url;

#[cfg(test)]
pub(crate) mod test_support {
    use wiremock::matchers::{method, path_regex};
    use wiremock::{Mock, MockBuilder};

    pub const GENERATE_CONTENT_PATH_REGEX: &str = r"^/v1beta/models/.+:generateContent$";
    pub const PREDICT_PATH_REGEX: &str = r"^/v1beta/models/.+:predict$";

    pub fn post_path_regex(regex: &str) -> MockBuilder {
        Mock::given(method("POST")).and(path_regex(regex))
    }

    /// Wrap `text` in a single-candidate `generateContent` envelope.
    pub fn text_envelope(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{ "text": text }]
                }
            }]
        })
    }
}
