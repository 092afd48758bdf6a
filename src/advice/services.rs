use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::client::AdviceClient;
use super::dto::AdviceResult;
use crate::meals::MealRow;
use crate::nutrients::Nutrient;

lazy_static! {
    static ref SUMMARY_RE: Regex = quoted_field("summary");
    static ref TIPS_RE: Regex = quoted_field("tips");
    static ref WARNINGS_RE: Regex = quoted_field("warnings");
    static ref KEY_NUTRIENTS_RE: Regex =
        Regex::new(r#"(?s)"key_nutrients"\s*:\s*\[(.*?)\]"#).unwrap();
}

fn quoted_field(key: &str) -> Regex {
    Regex::new(&format!(r#"(?s)"{key}"\s*:\s*"(.*?)""#)).unwrap()
}

/// One line per meal, in logging order.
pub fn compose_summary(meals: &[MealRow]) -> String {
    meals
        .iter()
        .map(|m| {
            format!(
                "{}: {} kcal, {}g protein, {}g fat, {}g carbs",
                m.dish_name,
                m.nutrient(Nutrient::Calories),
                m.nutrient(Nutrient::Protein),
                m.nutrient(Nutrient::Fats),
                m.nutrient(Nutrient::Carbohydrates),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Decodes the model output as JSON, falling back to [`extract_fields`] only
/// when the text is not JSON at all.
pub fn parse_advice(raw: &str) -> AdviceResult {
    match serde_json::from_str::<Value>(strip_code_fence(raw)) {
        Ok(Value::Object(fields)) => from_object(&fields),
        Ok(other) => {
            debug!(
                kind = json_kind(&other),
                "advice JSON is not an object; extracting fields"
            );
            extract_fields(raw)
        }
        Err(e) => {
            debug!(error = %e, "advice is not valid JSON; extracting fields");
            extract_fields(raw)
        }
    }
}

/// Maps a decoded object onto the four fields, whatever JSON type each
/// value came back as. Missing keys and nulls become the empty default.
fn from_object(fields: &Map<String, Value>) -> AdviceResult {
    let text = |key: &str| fields.get(key).map(value_text).unwrap_or_default();
    let key_nutrients = match fields.get("key_nutrients") {
        Some(Value::Array(items)) => items
            .iter()
            .map(value_text)
            .filter(|item| !item.is_empty())
            .collect(),
        Some(other) => Some(value_text(other))
            .filter(|item| !item.is_empty())
            .into_iter()
            .collect(),
        None => Vec::new(),
    };

    AdviceResult {
        summary: text("summary"),
        key_nutrients,
        tips: text("tips"),
        warnings: text("warnings"),
    }
}

/// Flattens any JSON value to display text: strings as-is, arrays joined
/// with "; ", objects as their values joined with ": ".
fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => join_texts(items.iter(), "; "),
        Value::Object(map) => join_texts(map.values(), ": "),
    }
}

fn join_texts<'a>(values: impl Iterator<Item = &'a Value>, sep: &str) -> String {
    values
        .map(value_text)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Pulls each field out of loosely JSON-shaped text on its own. Fields with
/// no match keep their empty default.
///
/// This is pattern matching, not parsing: a captured string ends at the next
/// `"` even if escaped, and `key_nutrients` ends at the first `]`.
pub fn extract_fields(raw: &str) -> AdviceResult {
    let capture = |re: &Regex| {
        re.captures(raw)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
    };

    AdviceResult {
        summary: capture(&SUMMARY_RE).unwrap_or_default(),
        key_nutrients: capture(&KEY_NUTRIENTS_RE)
            .map(|list| split_list(&list))
            .unwrap_or_default(),
        tips: capture(&TIPS_RE).unwrap_or_default(),
        warnings: capture(&WARNINGS_RE).unwrap_or_default(),
    }
}

// Both quote styles are stripped before the emptiness check, so `""` and
// `''` entries are dropped rather than kept as empty strings.
fn split_list(contents: &str) -> Vec<String> {
    contents
        .split(',')
        .map(|item| item.trim().trim_matches(|c| c == '"' || c == '\'').trim())
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

/// Asks the advice service about `meals`. Never fails: an unreachable
/// service yields [`AdviceResult::unavailable`].
pub async fn get_advice(client: &dyn AdviceClient, meals: &[MealRow]) -> AdviceResult {
    let summary = compose_summary(meals);
    match client.generate(&summary).await {
        Ok(raw) => parse_advice(&raw),
        Err(e) => {
            warn!(error = %e, "advice generation failed");
            AdviceResult::unavailable()
        }
    }
}
