use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct LogMealForm {
    pub dish_name: Option<String>,
}
