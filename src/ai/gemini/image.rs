use super::client::GeminiHttpClient;
use super::types::{PredictInstance, PredictParameters, PredictRequest, PredictResponse};
use crate::ai::ImageGenerationService;
use crate::models::GeneratedImage;
use crate::{Error, Result};
use async_trait::async_trait;

/// Imagen client producing one square image per prompt.
pub struct GeminiImageClient {
    http: GeminiHttpClient,
}

impl GeminiImageClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(api_key, model, client),
        }
    }
}

super::impl_with_gemini_base_url!(GeminiImageClient);

#[async_trait]
impl ImageGenerationService for GeminiImageClient {
    async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage> {
        let request = PredictRequest {
            instances: vec![PredictInstance {
                prompt: prompt.to_string(),
            }],
            parameters: PredictParameters {
                sample_count: 1,
                aspect_ratio: "1:1".to_string(),
            },
        };

        let response: PredictResponse = self.http.predict(&request).await?;

        let prediction = response
            .predictions
            .into_iter()
            .next()
            .ok_or_else(|| Error::EmptyResponse("No predictions in Imagen response".to_string()))?;

        let encoded = prediction
            .bytes_base64_encoded
            .filter(|data| !data.is_empty())
            .ok_or_else(|| Error::EmptyResponse("No image bytes in Imagen response".to_string()))?;

        use base64::Engine as _;
        let data = base64::engine::general_purpose::STANDARD
            .decode(&encoded)
            .map_err(|e| Error::Parse(format!("Failed to decode Imagen base64 image: {}", e)))?;

        let mime_type = prediction
            .mime_type
            .unwrap_or_else(|| "image/png".to_string());

        tracing::debug!(
            "Imagen returned {} bytes of {}",
            data.len(),
            mime_type
        );

        Ok(GeneratedImage::Inline { mime_type, data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::gemini::test_support;
    use wiremock::matchers::body_string_contains;
    use wiremock::{MockServer, ResponseTemplate};

    const DEFAULT_MODEL: &str = "imagen-4.0-generate-001";

    fn make_client(server: &MockServer) -> GeminiImageClient {
        GeminiImageClient::new("key".to_string(), DEFAULT_MODEL.to_string())
            .with_base_url(server.uri())
    }

    #[tokio::test]
    async fn test_generate_image_decodes_prediction() {
        let server = MockServer::start().await;

        use base64::Engine as _;
        let fake_image = vec![0x89, 0x50, 0x4E, 0x47];
        let b64 = base64::engine::general_purpose::STANDARD.encode(&fake_image);

        test_support::post_path_regex(test_support::PREDICT_PATH_REGEX)
            .and(body_string_contains("\"aspectRatio\":\"1:1\""))
            .and(body_string_contains("\"sampleCount\":1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "predictions": [{ "bytesBase64Encoded": b64, "mimeType": "image/png" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let image = make_client(&server).generate_image("a dream").await.unwrap();
        assert_eq!(
            image,
            GeneratedImage::Inline {
                mime_type: "image/png".to_string(),
                data: fake_image,
            }
        );
    }

    #[tokio::test]
    async fn test_quota_error_is_transport_failure() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::PREDICT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let err = make_client(&server).generate_image("a dream").await.unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
    }

    #[tokio::test]
    async fn test_filtered_prompt_is_empty_response() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::PREDICT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let err = make_client(&server).generate_image("a dream").await.unwrap_err();
        assert!(matches!(err, Error::EmptyResponse(_)));
    }

    #[tokio::test]
    async fn test_invalid_base64_is_parse_error() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::PREDICT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "predictions": [{ "bytesBase64Encoded": "!!!invalid-base64!!!" }]
            })))
            .mount(&server)
            .await;

        let err = make_client(&server).generate_image("a dream").await.unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }
}
