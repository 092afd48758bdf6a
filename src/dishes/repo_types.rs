use serde::Serialize;

use crate::nutrients::{Nutrient, Totals};

/// One catalog row. Every nutrient is present; blanks were coerced to 0 at load.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DishRecord {
    pub name: String,
    pub nutrients: Totals,
}

impl DishRecord {
    pub fn nutrient(&self, n: Nutrient) -> f64 {
        self.nutrients.get(&n).copied().unwrap_or(0.0)
    }
}
