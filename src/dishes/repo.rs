use std::io::Read;
use std::path::Path;

use anyhow::Context;
use csv::{ReaderBuilder, Trim};
use tracing::{info, warn};

use super::repo_types::DishRecord;
use crate::nutrients::{coerce_str, Nutrient, NAME_COLUMN};

const MAX_SUGGESTIONS: usize = 5;

/// The dish catalog, loaded once and read-only afterwards.
#[derive(Debug, Default)]
pub struct DishIndex {
    dishes: Vec<DishRecord>,
    // lowercased names, parallel to `dishes`
    lowered: Vec<String>,
}

impl DishIndex {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("open dish catalog {}", path.display()))?;
        Self::from_reader(file).with_context(|| format!("load dish catalog {}", path.display()))
    }

    /// Parses a catalog with a header row. Header names are trimmed; that is
    /// the only schema massaging done. `Dish_Name` must exist, nutrient
    /// columns that are absent read as 0.
    pub fn from_reader<R: Read>(reader: R) -> anyhow::Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::Headers)
            .from_reader(reader);

        let headers = rdr.headers().context("read catalog header")?.clone();
        let name_idx = headers
            .iter()
            .position(|h| h == NAME_COLUMN)
            .ok_or_else(|| anyhow::anyhow!("Column '{}' not found", NAME_COLUMN))?;

        let columns: Vec<(Nutrient, Option<usize>)> = Nutrient::ALL
            .iter()
            .map(|n| (*n, headers.iter().position(|h| h == n.column())))
            .collect();
        for (n, idx) in &columns {
            if idx.is_none() {
                warn!(column = n.column(), "nutrient column missing; values default to 0");
            }
        }

        let mut dishes = Vec::new();
        for (row, result) in rdr.records().enumerate() {
            let record = result.with_context(|| format!("read catalog row {}", row + 1))?;
            let name = record.get(name_idx).unwrap_or_default().to_string();
            let nutrients = columns
                .iter()
                .map(|(n, idx)| {
                    let value = idx.and_then(|i| record.get(i)).map(coerce_str).unwrap_or(0.0);
                    (*n, value)
                })
                .collect();
            dishes.push(DishRecord { name, nutrients });
        }

        info!(dishes = dishes.len(), "dish catalog loaded");
        Ok(Self::from_records(dishes))
    }

    pub fn from_records(dishes: Vec<DishRecord>) -> Self {
        let lowered = dishes.iter().map(|d| d.name.to_lowercase()).collect();
        Self { dishes, lowered }
    }

    pub fn len(&self) -> usize {
        self.dishes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dishes.is_empty()
    }

    /// Up to five names containing `query` (case-insensitive), in catalog order.
    pub fn suggest(&self, query: &str) -> Vec<String> {
        let needle = query.to_lowercase();
        self.lowered
            .iter()
            .zip(&self.dishes)
            .filter(|(lower, _)| lower.contains(&needle))
            .take(MAX_SUGGESTIONS)
            .map(|(_, dish)| dish.name.clone())
            .collect()
    }

    /// Case-insensitive exact match; the first matching row wins.
    pub fn lookup(&self, name: &str) -> Option<&DishRecord> {
        let needle = name.to_lowercase();
        self.lowered
            .iter()
            .position(|lower| *lower == needle)
            .map(|i| &self.dishes[i])
    }
}
