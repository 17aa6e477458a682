//! Price parsing and conversion to American odds

use serde::{Deserialize, Serialize};

use crate::model::AmericanOdds;

/// A price as it appears in a provider payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceValue {
    Integer(i64),
    Decimal(f64),
    Text(String),
}

impl PriceValue {
    /// Normalize to American odds. `None` means the provider posted no usable price.
    pub fn to_american(&self) -> Option<AmericanOdds> {
        match self {
            PriceValue::Integer(v) => from_number(*v as f64),
            PriceValue::Decimal(v) => from_number(*v),
            PriceValue::Text(s) => parse_text(s),
        }
    }

    /// Read as a spread or total point (e.g. -3.5, "+3.5", "47.5")
    pub fn to_point(&self) -> Option<f64> {
        let point = match self {
            PriceValue::Integer(v) => *v as f64,
            PriceValue::Decimal(v) => *v,
            PriceValue::Text(s) => clean_text(s).parse::<f64>().ok()?,
        };
        point.is_finite().then_some(point)
    }
}

impl From<i64> for PriceValue {
    fn from(v: i64) -> Self {
        PriceValue::Integer(v)
    }
}

impl From<&str> for PriceValue {
    fn from(v: &str) -> Self {
        PriceValue::Text(v.to_string())
    }
}

fn clean_text(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            '\u{2212}' | '\u{2013}' => '-',
            other => other,
        })
        .filter(|c| *c != '+' && !c.is_whitespace())
        .collect()
}

fn parse_text(raw: &str) -> Option<AmericanOdds> {
    let cleaned = clean_text(raw);
    match cleaned.to_ascii_uppercase().as_str() {
        "EVEN" | "EV" => return Some(100),
        "" => return None,
        _ => {}
    }

    cleaned.parse::<f64>().ok().and_then(from_number)
}

fn from_number(v: f64) -> Option<AmericanOdds> {
    if !v.is_finite() {
        return None;
    }
    if v.abs() >= 100.0 {
        let price = v.round() as AmericanOdds;
        // -100 and +100 are both even money
        Some(if price == -100 { 100 } else { price })
    } else if v > 1.0 {
        Some(decimal_to_american(v))
    } else {
        None
    }
}

/// Convert decimal odds (e.g. 1.91) to American odds (e.g. -110)
pub fn decimal_to_american(decimal: f64) -> AmericanOdds {
    if decimal >= 2.0 {
        ((decimal - 1.0) * 100.0).round() as AmericanOdds
    } else {
        (-100.0 / (decimal - 1.0)).round() as AmericanOdds
    }
}

/// Implied win probability of an American price, as a percentage
pub fn implied_probability(price: AmericanOdds) -> f64 {
    let p = price as f64;
    if price < 0 {
        p.abs() / (p.abs() + 100.0) * 100.0
    } else {
        100.0 / (p + 100.0) * 100.0
    }
}
