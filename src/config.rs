use std::path::PathBuf;

use serde::Deserialize;

const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub dataset_path: PathBuf,
    pub log_path: PathBuf,
    pub gemini: GeminiConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let gemini = GeminiConfig {
            api_key: std::env::var("GEMINI_API_KEY")
                .or_else(|_| std::env::var("GOOGLE_API_KEY"))
                .ok()
                .filter(|k| !k.trim().is_empty()),
            model: std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".into()),
            temperature: std::env::var("GEMINI_TEMPERATURE")
                .ok()
                .and_then(|v| v.parse::<f32>().ok())
                .unwrap_or(0.3),
            base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.into()),
        };
        anyhow::ensure!(
            (0.0..=2.0).contains(&gemini.temperature),
            "GEMINI_TEMPERATURE must be between 0 and 2, got {}",
            gemini.temperature
        );

        Ok(Self {
            dataset_path: std::env::var("DISHES_CSV")
                .unwrap_or_else(|_| "dishes.csv".into())
                .into(),
            log_path: std::env::var("CALORIE_LOG")
                .unwrap_or_else(|_| "calorie_log.json".into())
                .into(),
            gemini,
        })
    }
}
