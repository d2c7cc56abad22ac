//! Static menu reference set

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use super::{DataError, DataResult};

/// A distinct (name, category) pair from the reference dataset
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MenuItem {
    pub name: String,
    pub category: String,
}

impl MenuItem {
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
        }
    }
}

/// Only the two columns the predictor needs; everything else in the
/// historical order dataset is ignored.
#[derive(Debug, Deserialize)]
struct MenuRecord {
    food_item_name: String,
    food_item_category: String,
}

/// Load the distinct menu items from a CSV file.
pub fn load_menu<P: AsRef<Path>>(path: P) -> DataResult<Vec<MenuItem>> {
    let file = std::fs::File::open(path.as_ref())?;
    read_menu(file)
}

/// Read menu items from any CSV source, de-duplicating on (name, category)
/// and keeping first-appearance order. Values are kept verbatim: the model
/// schema's `food_item_name_<value>` columns were built from the raw text.
pub fn read_menu<R: Read>(reader: R) -> DataResult<Vec<MenuItem>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let mut seen = HashSet::new();
    let mut items = Vec::new();

    for record in csv_reader.deserialize::<MenuRecord>() {
        let record = record?;
        if record.food_item_name.trim().is_empty() {
            return Err(DataError::validation_error(
                "food_item_name",
                "Menu item name cannot be empty",
            ));
        }

        let item = MenuItem::new(record.food_item_name, record.food_item_category);
        if seen.insert(item.clone()) {
            items.push(item);
        }
    }

    if items.is_empty() {
        return Err(DataError::validation_error(
            "menu",
            "Reference dataset contains no menu items",
        ));
    }

    tracing::debug!("Loaded {} distinct menu items", items.len());
    Ok(items)
}
