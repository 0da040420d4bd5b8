use std::collections::HashMap;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ServiceVariant {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price_original_eur: Option<f64>,
    #[serde(default)]
    pub price_discounted_eur: Option<f64>,
    #[serde(default)]
    pub duration: Option<String>,
}

impl ServiceVariant {
    /// Discounted price when present, else the original price.
    pub fn price(&self) -> Option<f64> {
        self.price_discounted_eur.or(self.price_original_eur)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ServiceCategory {
    pub category: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub variants: Vec<ServiceVariant>,
    #[serde(default)]
    pub price_original_eur: Option<f64>,
    #[serde(default)]
    pub price_discounted_eur: Option<f64>,
    #[serde(default)]
    pub duration: Option<String>,
}

impl ServiceCategory {
    /// Flat price for categories sold without variants.
    pub fn flat_price(&self) -> Option<f64> {
        self.price_discounted_eur.or(self.price_original_eur)
    }

    pub fn variant_prices(&self) -> Vec<f64> {
        self.variants.iter().filter_map(ServiceVariant::price).collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Catalog {
    #[serde(default)]
    pub services: Vec<ServiceCategory>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TransitLine {
    pub line: String,
    #[serde(default)]
    pub stop: Option<String>,
    #[serde(default)]
    pub distance: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PublicTransport {
    #[serde(default)]
    pub bus: Option<Vec<TransitLine>>,
    #[serde(default)]
    pub metro: Option<Vec<TransitLine>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Location {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub directions: Option<String>,
    #[serde(default)]
    pub public_transport: Option<PublicTransport>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ParkingOption {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub distance: String,
    #[serde(default)]
    pub cost: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Parking {
    #[serde(default)]
    pub options: Vec<ParkingOption>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Schedule {
    #[serde(default)]
    pub business_hours: Option<HashMap<String, String>>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub parking: Option<Parking>,
}

impl Schedule {
    /// Business hours in Monday-first order. Keys that are not weekday names
    /// keep their spelling and go last, sorted alphabetically.
    pub fn ordered_hours(&self) -> Vec<(DayKey, &str)> {
        let Some(hours) = self.business_hours.as_ref() else {
            return Vec::new();
        };

        let mut days: Vec<(DayKey, &str)> = hours
            .iter()
            .map(|(day, range)| (DayKey::parse(day), range.as_str()))
            .collect();
        days.sort_by(|a, b| a.0.cmp(&b.0));
        days
    }

    pub fn hours_for(&self, weekday: Weekday) -> Option<&str> {
        self.ordered_hours()
            .into_iter()
            .find(|(day, _)| *day == DayKey::Weekday(weekday))
            .map(|(_, range)| range)
    }
}

/// A business-hours key: a recognised weekday or free text like "holidays".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayKey {
    Weekday(Weekday),
    Other(String),
}

impl DayKey {
    pub fn parse(s: &str) -> Self {
        match s.trim().parse::<Weekday>() {
            Ok(day) => DayKey::Weekday(day),
            Err(_) => DayKey::Other(s.to_string()),
        }
    }
}

impl PartialOrd for DayKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DayKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use std::cmp::Ordering;
        match (self, other) {
            (DayKey::Weekday(a), DayKey::Weekday(b)) => a
                .num_days_from_monday()
                .cmp(&b.num_days_from_monday()),
            (DayKey::Weekday(_), DayKey::Other(_)) => Ordering::Less,
            (DayKey::Other(_), DayKey::Weekday(_)) => Ordering::Greater,
            (DayKey::Other(a), DayKey::Other(b)) => a.cmp(b),
        }
    }
}

/// Everything the response generator reads. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KnowledgeBase {
    pub catalog: Catalog,
    pub schedule: Schedule,
}

impl KnowledgeBase {
    pub fn services(&self) -> &[ServiceCategory] {
        &self.catalog.services
    }

    /// Every price in the catalogue: variant prices, plus flat prices of
    /// categories that have no variants.
    pub fn all_prices(&self) -> Vec<f64> {
        self.catalog
            .services
            .iter()
            .flat_map(|category| {
                if category.variants.is_empty() {
                    category.flat_price().into_iter().collect::<Vec<_>>()
                } else {
                    category.variant_prices()
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_price_prefers_discount() {
        let variant = ServiceVariant {
            name: "Manicura completa".to_string(),
            price_original_eur: Some(20.0),
            price_discounted_eur: Some(15.0),
            ..Default::default()
        };
        assert_eq!(variant.price(), Some(15.0));

        let variant = ServiceVariant {
            price_discounted_eur: None,
            ..variant
        };
        assert_eq!(variant.price(), Some(20.0));
    }

    #[test]
    fn test_ordered_hours_monday_first() {
        let schedule: Schedule = serde_json::from_str(
            r#"{"business_hours":{"sunday":"Closed","holidays":"Closed","monday":"9:30 AM - 8:30 PM","Saturday":"9:30 AM - 2:30 PM"}}"#,
        )
        .unwrap();

        let days: Vec<DayKey> = schedule.ordered_hours().into_iter().map(|(d, _)| d).collect();
        assert_eq!(
            days,
            vec![
                DayKey::Weekday(Weekday::Mon),
                DayKey::Weekday(Weekday::Sat),
                DayKey::Weekday(Weekday::Sun),
                DayKey::Other("holidays".to_string()),
            ]
        );
        assert_eq!(schedule.hours_for(Weekday::Sat), Some("9:30 AM - 2:30 PM"));
        assert_eq!(schedule.hours_for(Weekday::Tue), None);
    }

    #[test]
    fn test_all_prices_uses_flat_price_without_variants() {
        let kb = KnowledgeBase {
            catalog: serde_json::from_str(
                r#"{"services":[
                    {"category":"Packs","price_original_eur":60},
                    {"category":"Manicuras","variants":[
                        {"name":"Manicura express","price_original_eur":12},
                        {"name":"Manicura gel","price_original_eur":25,"price_discounted_eur":22}
                    ]}
                ]}"#,
            )
            .unwrap(),
            schedule: Schedule::default(),
        };
        assert_eq!(kb.all_prices(), vec![60.0, 12.0, 22.0]);
    }
}
