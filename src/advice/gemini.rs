//! Google Gemini `generateContent` client.
//!
//! The key is read from `GEMINI_API_KEY` (or `GOOGLE_API_KEY`). Without a key
//! the client still constructs; every call then fails with
//! [`AdviceError::MissingApiKey`] and the caller falls back to canned advice.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use super::client::{AdviceClient, AdviceError};
use crate::config::GeminiConfig;

const PROMPT_TEMPLATE: &str = r#"You are a nutrition insights assistant.

You look at the meals a person ate today and their nutritional content, and give clear, friendly, practical feedback for a non-expert.

Respond with a JSON object containing:
- "summary": a short (about 50 words) explanation of the day's nutrition.
- "key_nutrients": a list of nutrients that stand out as high or low.
- "tips": practical guidance for balancing these meals.
- "warnings": optional warnings (for example high sugar, sodium or fat).

Meals:
{input_text}
"#;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn build_prompt(meals_summary: &str) -> String {
        PROMPT_TEMPLATE.replace("{input_text}", meals_summary)
    }

    fn build_request(&self, meals_summary: &str) -> GenerateRequest {
        GenerateRequest {
            contents: vec![Content {
                role: Some("user".into()),
                parts: vec![Part {
                    text: Some(Self::build_prompt(meals_summary)),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
            },
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Concatenates the text parts of the first candidate.
    fn extract_text(body: &str) -> Result<String, AdviceError> {
        let response: GenerateResponse = serde_json::from_str(body)?;
        if let Some(err) = response.error {
            return Err(AdviceError::Api {
                status: 200,
                message: err.message,
            });
        }
        let text: String = response
            .candidates
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        if text.trim().is_empty() {
            return Err(AdviceError::EmptyResponse);
        }
        Ok(text)
    }

    fn api_error(status: u16, body: &str) -> AdviceError {
        let message = serde_json::from_str::<GenerateResponse>(body)
            .ok()
            .and_then(|r| r.error)
            .map_or_else(|| body.to_owned(), |e| e.message);
        AdviceError::Api { status, message }
    }
}

#[async_trait]
impl AdviceClient for GeminiClient {
    #[instrument(skip(self, meals_summary), fields(model = %self.config.model))]
    async fn generate(&self, meals_summary: &str) -> Result<String, AdviceError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(AdviceError::MissingApiKey)?;

        debug!("sending advice request");
        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .json(&self.build_request(meals_summary))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            error!(%status, "advice API error");
            return Err(Self::api_error(status.as_u16(), &body));
        }

        let text = Self::extract_text(&body)?;
        debug!(chars = text.len(), "advice received");
        Ok(text)
    }
}
