use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdviceError {
    #[error("advice API key is not configured")]
    MissingApiKey,
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("advice API error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("could not decode advice response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("advice response contained no text")]
    EmptyResponse,
}

/// Text completion used to produce nutrition advice.
#[async_trait]
pub trait AdviceClient: Send + Sync {
    /// Sends the day's meal summary and returns the model's raw text.
    async fn generate(&self, meals_summary: &str) -> Result<String, AdviceError>;
}
