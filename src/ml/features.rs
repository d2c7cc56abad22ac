//! Feature rows and schema alignment
//!
//! Each request expands the menu into one synthetic row per (item, order type),
//! then one-hot encodes the categorical fields and projects the result onto the
//! exact column list the classifier was trained with.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{FeatureMatrix, ModelResult, ModelSchema};
use crate::data::{HolidayCalendar, MenuItem, WeatherSlice};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    #[serde(rename = "Dine In")]
    DineIn,
    #[serde(rename = "Take Away")]
    TakeAway,
}

impl OrderType {
    pub const ALL: [OrderType; 2] = [OrderType::DineIn, OrderType::TakeAway];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::DineIn => "Dine In",
            OrderType::TakeAway => "Take Away",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayType {
    Weekday,
    Weekend,
}

impl DayType {
    pub fn from_weekday(day: Weekday) -> Self {
        match day {
            Weekday::Sat | Weekday::Sun => DayType::Weekend,
            _ => DayType::Weekday,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DayType::Weekday => "Weekday",
            DayType::Weekend => "Weekend",
        }
    }
}

/// Full English day name, as the model's training data spells it
pub fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Calendar facts derived from the target date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarFacts {
    pub weekday: Weekday,
    pub day_type: DayType,
    pub is_holiday: bool,
}

impl CalendarFacts {
    pub fn for_date(date: NaiveDate, holidays: &HolidayCalendar) -> Self {
        let weekday = date.weekday();
        Self {
            weekday,
            day_type: DayType::from_weekday(weekday),
            is_holiday: holidays.is_holiday(date),
        }
    }

    pub fn day_name(&self) -> &'static str {
        day_name(self.weekday)
    }
}

/// One hypothetical (item, order type, time, weather, calendar) record
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub hour: u32,
    pub item: MenuItem,
    pub day_of_week: &'static str,
    pub day_type: DayType,
    pub weather: WeatherSlice,
    pub is_holiday: bool,
    pub is_special_event: bool,
    pub order_type: OrderType,
}

impl FeatureRow {
    /// Expanded (column, value) pairs: numeric fields under their own name,
    /// categorical fields as `<field>_<value>` indicators.
    pub fn encoded(&self) -> Vec<(String, f32)> {
        let flag = |b: bool| if b { 1.0 } else { 0.0 };

        vec![
            ("hour".to_string(), self.hour as f32),
            ("temperature_c".to_string(), self.weather.temp_c as f32),
            ("wind_kph".to_string(), self.weather.wind_kph as f32),
            ("precipitation_mm".to_string(), self.weather.precip_mm as f32),
            ("cloud".to_string(), self.weather.cloud as f32),
            ("humidity".to_string(), self.weather.humidity as f32),
            ("pressure_mb".to_string(), self.weather.pressure_mb as f32),
            ("is_holiday".to_string(), flag(self.is_holiday)),
            ("is_special_event".to_string(), flag(self.is_special_event)),
            (format!("food_item_name_{}", self.item.name), 1.0),
            (format!("food_item_category_{}", self.item.category), 1.0),
            (format!("day_of_the_week_{}", self.day_of_week), 1.0),
            (format!("day_type_{}", self.day_type.as_str()), 1.0),
            (format!("order_type_{}", self.order_type.as_str()), 1.0),
        ]
    }
}

/// Expand every menu item into one row per order type.
///
/// Rows come out in menu order, `Dine In` before `Take Away`, so the result
/// always holds exactly `2 * menu.len()` rows.
pub fn build_feature_rows(
    hour: u32,
    is_special_event: bool,
    calendar: &CalendarFacts,
    weather: &WeatherSlice,
    menu: &[MenuItem],
) -> Vec<FeatureRow> {
    let mut rows = Vec::with_capacity(menu.len() * OrderType::ALL.len());

    for item in menu {
        for order_type in OrderType::ALL {
            rows.push(FeatureRow {
                hour,
                item: item.clone(),
                day_of_week: calendar.day_name(),
                day_type: calendar.day_type,
                weather: weather.clone(),
                is_holiday: calendar.is_holiday,
                is_special_event,
                order_type,
            });
        }
    }

    rows
}

/// Re-express feature rows against the model schema.
///
/// Columns the schema names but the rows never produce are 0; columns the
/// rows produce but the schema lacks are dropped; column order is the
/// schema's.
pub fn align_to_schema(rows: &[FeatureRow], schema: &ModelSchema) -> ModelResult<FeatureMatrix> {
    let index: HashMap<&str, usize> = schema
        .columns()
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect();

    let n_cols = schema.len();
    let mut values = vec![0.0f32; rows.len() * n_cols];

    for (r, row) in rows.iter().enumerate() {
        let offset = r * n_cols;
        for (name, value) in row.encoded() {
            if let Some(&c) = index.get(name.as_str()) {
                values[offset + c] = value;
            }
        }
    }

    FeatureMatrix::new(n_cols, values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weather() -> WeatherSlice {
        WeatherSlice {
            temp_c: 22.0,
            wind_kph: 5.0,
            precip_mm: 0.0,
            cloud: 10.0,
            humidity: 50.0,
            pressure_mb: 1012.0,
        }
    }

    fn wednesday() -> CalendarFacts {
        let date = NaiveDate::from_ymd_opt(2024, 12, 25).unwrap();
        CalendarFacts::for_date(date, &HolidayCalendar::new("IN", Some("TN"), vec![]))
    }

    fn menu() -> Vec<MenuItem> {
        vec![MenuItem::new("A", "Snacks"), MenuItem::new("B", "Drinks")]
    }

    #[test]
    fn test_calendar_facts() {
        let facts = wednesday();
        assert_eq!(facts.day_name(), "Wednesday");
        assert_eq!(facts.day_type, DayType::Weekday);
        assert!(!facts.is_holiday);

        let saturday = NaiveDate::from_ymd_opt(2024, 12, 28).unwrap();
        let facts = CalendarFacts::for_date(saturday, &HolidayCalendar::new("IN", None, vec![]));
        assert_eq!(facts.day_type, DayType::Weekend);
    }

    #[test]
    fn test_build_two_rows_per_item() {
        let rows = build_feature_rows(19, true, &wednesday(), &weather(), &menu());
        assert_eq!(rows.len(), 4);

        assert_eq!(rows[0].item.name, "A");
        assert_eq!(rows[0].order_type, OrderType::DineIn);
        assert_eq!(rows[1].item.name, "A");
        assert_eq!(rows[1].order_type, OrderType::TakeAway);
        assert_eq!(rows[2].item.name, "B");

        // Rows for the same item differ only by order type
        let mut twin = rows[1].clone();
        twin.order_type = OrderType::DineIn;
        assert_eq!(twin, rows[0]);
        assert!(rows.iter().all(|r| r.is_special_event && r.hour == 19));
    }

    #[test]
    fn test_build_empty_menu() {
        assert!(build_feature_rows(0, false, &wednesday(), &weather(), &[]).is_empty());
    }

    #[test]
    fn test_align_fills_drops_and_orders() {
        let schema = ModelSchema::new(vec![
            "order_type_Take Away".to_string(),
            "food_item_name_A".to_string(),
            "food_item_name_Z".to_string(),
            "hour".to_string(),
            "is_special_event".to_string(),
            "day_of_the_week_Wednesday".to_string(),
        ])
        .unwrap();

        let rows = build_feature_rows(19, false, &wednesday(), &weather(), &menu());
        let matrix = align_to_schema(&rows, &schema).unwrap();

        assert_eq!(matrix.n_rows(), 4);
        assert_eq!(matrix.n_cols(), 6);
        // A / Dine In
        assert_eq!(matrix.row(0).unwrap(), &[0.0, 1.0, 0.0, 19.0, 0.0, 1.0]);
        // A / Take Away
        assert_eq!(matrix.row(1).unwrap(), &[1.0, 1.0, 0.0, 19.0, 0.0, 1.0]);
        // B / Take Away: unknown item column stays zero
        assert_eq!(matrix.row(3).unwrap(), &[1.0, 0.0, 0.0, 19.0, 0.0, 1.0]);
    }

    #[test]
    fn test_align_weather_and_flags() {
        let schema = ModelSchema::new(vec![
            "temperature_c".to_string(),
            "precipitation_mm".to_string(),
            "pressure_mb".to_string(),
            "is_holiday".to_string(),
            "is_special_event".to_string(),
        ])
        .unwrap();

        let rows = build_feature_rows(8, true, &wednesday(), &weather(), &menu()[..1]);
        let matrix = align_to_schema(&rows, &schema).unwrap();
        assert_eq!(matrix.row(0).unwrap(), &[22.0, 0.0, 1012.0, 0.0, 1.0]);
    }
}
