use serde::{Deserialize, Serialize};

/// Structured nutrition advice. Keys the model leaves out decode to their
/// empty defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdviceResult {
    pub summary: String,
    pub key_nutrients: Vec<String>,
    pub tips: String,
    pub warnings: String,
}

impl AdviceResult {
    /// Shown when the advice service could not be reached at all.
    pub fn unavailable() -> Self {
        Self {
            summary: "Could not get AI advice.".into(),
            ..Self::default()
        }
    }
}
