use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::dishes::DishRecord;
use crate::nutrients::{coerce_value, Nutrient, NAME_COLUMN};

/// A dish as it was when logged. Stored as the raw JSON object so entries
/// with missing or odd values still load; numbers are read through
/// [`coerce_value`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MealSnapshot(Map<String, Value>);

impl MealSnapshot {
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn dish_name(&self) -> String {
        match self.0.get(NAME_COLUMN) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    pub fn nutrient(&self, n: Nutrient) -> f64 {
        coerce_value(self.0.get(n.column()))
    }
}

impl From<&DishRecord> for MealSnapshot {
    fn from(dish: &DishRecord) -> Self {
        let mut fields = Map::new();
        fields.insert(NAME_COLUMN.to_string(), Value::String(dish.name.clone()));
        for n in Nutrient::ALL {
            fields.insert(n.column().to_string(), Value::from(dish.nutrient(n)));
        }
        Self(fields)
    }
}

/// Logged meals keyed by `YYYY-MM-DD`, each day in logging order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DailyLog(BTreeMap<String, Vec<MealSnapshot>>);

impl DailyLog {
    pub fn day(&self, key: &str) -> &[MealSnapshot] {
        self.0.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn push(&mut self, key: &str, meal: MealSnapshot) {
        self.0.entry(key.to_string()).or_default().push(meal);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
