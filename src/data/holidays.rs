//! Holiday calendar for a fixed country/region

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use super::DataResult;

/// One entry of the holiday calendar file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HolidayEntry {
    pub date: NaiveDate,
    pub name: String,
    pub country: String,
    /// Entries without a region apply to the whole country
    #[serde(default)]
    pub region: Option<String>,
}

/// Read-only membership test over public holidays
#[derive(Debug, Clone)]
pub struct HolidayCalendar {
    country: String,
    region: Option<String>,
    holidays: HashMap<NaiveDate, String>,
}

impl HolidayCalendar {
    /// Build a calendar keeping only entries for `country` and `region`
    pub fn new(country: &str, region: Option<&str>, entries: Vec<HolidayEntry>) -> Self {
        let holidays = entries
            .into_iter()
            .filter(|e| e.country.eq_ignore_ascii_case(country))
            .filter(|e| match (&e.region, region) {
                (None, _) => true,
                (Some(r), Some(wanted)) => r.eq_ignore_ascii_case(wanted),
                (Some(_), None) => false,
            })
            .map(|e| (e.date, e.name))
            .collect();

        Self {
            country: country.to_string(),
            region: region.map(str::to_string),
            holidays,
        }
    }

    /// Load a JSON array of holiday entries from disk
    pub fn load<P: AsRef<Path>>(path: P, country: &str, region: Option<&str>) -> DataResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let entries: Vec<HolidayEntry> = serde_json::from_str(&raw)?;
        let calendar = Self::new(country, region, entries);

        tracing::debug!(
            "Loaded {} holidays for {}{}",
            calendar.len(),
            calendar.country,
            calendar.region.as_deref().map(|r| format!("-{}", r)).unwrap_or_default()
        );

        Ok(calendar)
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains_key(&date)
    }

    pub fn holiday_name(&self, date: NaiveDate) -> Option<&str> {
        self.holidays.get(&date).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.holidays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holidays.is_empty()
    }
}
