//! Reduce per-row probabilities into the overall ranking and the
//! per-order-type breakdown

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::ml::{FeatureRow, OrderType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallPrediction {
    pub food_item_name: String,
    pub probability: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedPrediction {
    pub food_item_name: String,
    #[serde(rename = "Dine In")]
    pub dine_in: String,
    #[serde(rename = "Take Away")]
    pub take_away: String,
}

/// Probability as a percentage with two decimals, e.g. `0.7326` → `"73.26%"`
pub fn format_percent(probability: f64) -> String {
    format!("{:.2}%", probability * 100.0)
}

#[derive(Debug, Default, Clone, Copy)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn value(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Mean probability per item, highest first.
///
/// Items are grouped in first-appearance (menu) order and the sort is
/// stable, so ties keep menu order.
pub fn overall_ranking(rows: &[FeatureRow], probabilities: &[f64]) -> Vec<OverallPrediction> {
    let mut order: Vec<(&str, Mean)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for (row, &p) in rows.iter().zip(probabilities) {
        let name = row.item.name.as_str();
        let slot = *index.entry(name).or_insert_with(|| {
            order.push((name, Mean::default()));
            order.len() - 1
        });
        order[slot].1.push(p);
    }

    let mut ranked: Vec<(&str, f64)> = order.into_iter().map(|(name, m)| (name, m.value())).collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    ranked
        .into_iter()
        .map(|(name, p)| OverallPrediction {
            food_item_name: name.to_string(),
            probability: format_percent(p),
        })
        .collect()
}

/// One row per item with its dine-in and takeaway probabilities, ordered by
/// item name. A missing combination reads as 0.
pub fn detailed_breakdown(rows: &[FeatureRow], probabilities: &[f64]) -> Vec<DetailedPrediction> {
    let mut pivot: BTreeMap<&str, [Mean; 2]> = BTreeMap::new();

    for (row, &p) in rows.iter().zip(probabilities) {
        let cells = pivot.entry(row.item.name.as_str()).or_default();
        let column = match row.order_type {
            OrderType::DineIn => 0,
            OrderType::TakeAway => 1,
        };
        cells[column].push(p);
    }

    pivot
        .into_iter()
        .map(|(name, [dine_in, take_away])| DetailedPrediction {
            food_item_name: name.to_string(),
            dine_in: format_percent(dine_in.value()),
            take_away: format_percent(take_away.value()),
        })
        .collect()
}
