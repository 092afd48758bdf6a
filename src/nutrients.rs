use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// Column holding the dish name in both the catalog and the log file.
pub const NAME_COLUMN: &str = "Dish_Name";

/// The fixed set of nutrient fields tracked per dish.
///
/// Variant order is the display order, so maps keyed by `Nutrient` iterate
/// the same way the catalog columns are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Nutrient {
    Calories,
    Carbohydrates,
    Protein,
    Fats,
    #[serde(rename = "Free_Sugar")]
    FreeSugar,
    Fibre,
    Sodium,
    Calcium,
    Iron,
    VitaminC,
    Folate,
}

impl Nutrient {
    pub const ALL: [Nutrient; 11] = [
        Nutrient::Calories,
        Nutrient::Carbohydrates,
        Nutrient::Protein,
        Nutrient::Fats,
        Nutrient::FreeSugar,
        Nutrient::Fibre,
        Nutrient::Sodium,
        Nutrient::Calcium,
        Nutrient::Iron,
        Nutrient::VitaminC,
        Nutrient::Folate,
    ];

    /// Column name used in the catalog header and in persisted snapshots.
    pub const fn column(self) -> &'static str {
        match self {
            Nutrient::Calories => "Calories",
            Nutrient::Carbohydrates => "Carbohydrates",
            Nutrient::Protein => "Protein",
            Nutrient::Fats => "Fats",
            Nutrient::FreeSugar => "Free_Sugar",
            Nutrient::Fibre => "Fibre",
            Nutrient::Sodium => "Sodium",
            Nutrient::Calcium => "Calcium",
            Nutrient::Iron => "Iron",
            Nutrient::VitaminC => "VitaminC",
            Nutrient::Folate => "Folate",
        }
    }
}

/// Per-nutrient amounts, ordered by [`Nutrient`].
pub type Totals = BTreeMap<Nutrient, f64>;

/// Every nutrient mapped to zero.
pub fn zeroed() -> Totals {
    Nutrient::ALL.iter().map(|n| (*n, 0.0)).collect()
}

/// Parses a raw cell into a number; blank, non-numeric and non-finite input
/// all become 0.
pub fn coerce_str(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Same rule as [`coerce_str`] for values read back from the log file.
/// A missing value (`None`) is 0 as well.
pub fn coerce_value(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0),
        Some(Value::String(s)) => coerce_str(s),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coerce_str_handles_blank_and_garbage() {
        assert_eq!(coerce_str("250"), 250.0);
        assert_eq!(coerce_str(" 12.5 "), 12.5);
        assert_eq!(coerce_str(""), 0.0);
        assert_eq!(coerce_str("n/a"), 0.0);
        assert_eq!(coerce_str("NaN"), 0.0);
        assert_eq!(coerce_str("inf"), 0.0);
    }

    #[test]
    fn coerce_value_accepts_numbers_and_numeric_strings() {
        assert_eq!(coerce_value(Some(&json!(18))), 18.0);
        assert_eq!(coerce_value(Some(&json!(6.5))), 6.5);
        assert_eq!(coerce_value(Some(&json!("7"))), 7.0);
        assert_eq!(coerce_value(Some(&json!(null))), 0.0);
        assert_eq!(coerce_value(Some(&json!([1, 2]))), 0.0);
        assert_eq!(coerce_value(None), 0.0);
    }

    #[test]
    fn nutrient_serializes_as_column_name() {
        for n in Nutrient::ALL {
            let s = serde_json::to_value(n).unwrap();
            assert_eq!(s, json!(n.column()));
        }
    }

    #[test]
    fn zeroed_covers_every_field() {
        let z = zeroed();
        assert_eq!(z.len(), 11);
        assert!(z.values().all(|v| *v == 0.0));
    }
}
