//! Tabular records as the core sees them.
//!
//! Rows arrive loosely typed (database `NUMERIC`s, JSON exports with numbers
//! stored as text). [`BrandRecord::from_raw`] and [`RtmRecord::from_raw`] are
//! the only places where text is trimmed and numbers are coerced; a value
//! that does not coerce becomes `None` instead of travelling downstream.

use serde::{Deserialize, Serialize};

/// A numeric cell before coercion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(f64),
    Text(String),
}

impl RawNumber {
    /// Coerces to a finite `f64`, or `None`.
    #[must_use]
    pub fn coerce(&self) -> Option<f64> {
        let value = match self {
            RawNumber::Number(n) => *n,
            RawNumber::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

impl From<f64> for RawNumber {
    fn from(value: f64) -> Self {
        RawNumber::Number(value)
    }
}

fn coerce(raw: Option<&RawNumber>) -> Option<f64> {
    raw.and_then(RawNumber::coerce)
}

fn clean_text(raw: Option<String>) -> String {
    raw.map(|s| s.trim().to_string()).unwrap_or_default()
}

/// One brand-performance row as delivered by the data-access layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBrandRow {
    #[serde(default)]
    pub brand_name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub market: Option<String>,
    #[serde(default)]
    pub market_share: Option<RawNumber>,
    #[serde(default)]
    pub competitor_strength: Option<RawNumber>,
    #[serde(default)]
    pub white_space_score: Option<RawNumber>,
}

/// One brand's performance in one market/category combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandRecord {
    pub brand_name: String,
    pub category: String,
    /// Free-text geography label; resolved through the alias table at
    /// aggregation time.
    pub market: String,
    /// Percentage.
    pub market_share: Option<f64>,
    pub competitor_strength: Option<f64>,
    /// 0-100 opportunity score; lower means less untapped opportunity.
    pub white_space_score: Option<f64>,
}

impl BrandRecord {
    /// Trims text fields and coerces numeric fields.
    #[must_use]
    pub fn from_raw(raw: RawBrandRow) -> Self {
        Self {
            market_share: coerce(raw.market_share.as_ref()),
            competitor_strength: coerce(raw.competitor_strength.as_ref()),
            white_space_score: coerce(raw.white_space_score.as_ref()),
            brand_name: clean_text(raw.brand_name),
            category: clean_text(raw.category),
            market: clean_text(raw.market),
        }
    }

    /// Converts a batch of raw rows, logging how many numeric cells were
    /// nulled by coercion.
    #[must_use]
    pub fn from_raw_rows(rows: Vec<RawBrandRow>) -> Vec<Self> {
        let mut dropped_cells = 0usize;
        let records: Vec<Self> = rows
            .into_iter()
            .map(|raw| {
                let supplied = [
                    raw.market_share.is_some(),
                    raw.competitor_strength.is_some(),
                    raw.white_space_score.is_some(),
                ];
                let record = Self::from_raw(raw);
                let kept = [
                    record.market_share.is_some(),
                    record.competitor_strength.is_some(),
                    record.white_space_score.is_some(),
                ];
                dropped_cells += supplied
                    .iter()
                    .zip(kept.iter())
                    .filter(|(s, k)| **s && !**k)
                    .count();
                record
            })
            .collect();
        if dropped_cells > 0 {
            tracing::warn!(
                dropped_cells,
                rows = records.len(),
                "numeric brand cells failed coercion and were nulled"
            );
        }
        records
    }
}

/// One route-to-market sales row before coercion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRtmRow {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub territory: Option<String>,
    #[serde(default)]
    pub county: Option<String>,
    #[serde(default)]
    pub distributor: Option<String>,
    #[serde(default)]
    pub territory_name: Option<String>,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub qty_kg: Option<RawNumber>,
    #[serde(default)]
    pub value_sold: Option<RawNumber>,
    #[serde(default)]
    pub white_space_score: Option<RawNumber>,
}

/// One route-to-market sales row: volume and value moved by a distributor
/// to a customer in a county.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RtmRecord {
    pub category: String,
    pub brand: String,
    pub territory: String,
    pub county: String,
    pub distributor: String,
    pub territory_name: String,
    pub customer: String,
    pub qty_kg: Option<f64>,
    pub value_sold: Option<f64>,
    pub white_space_score: Option<f64>,
}

impl RtmRecord {
    #[must_use]
    pub fn from_raw(raw: RawRtmRow) -> Self {
        Self {
            qty_kg: coerce(raw.qty_kg.as_ref()),
            value_sold: coerce(raw.value_sold.as_ref()),
            white_space_score: coerce(raw.white_space_score.as_ref()),
            category: clean_text(raw.category),
            brand: clean_text(raw.brand),
            territory: clean_text(raw.territory),
            county: clean_text(raw.county),
            distributor: clean_text(raw.distributor),
            territory_name: clean_text(raw.territory_name),
            customer: clean_text(raw.customer),
        }
    }
}
