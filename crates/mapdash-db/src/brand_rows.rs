//! Brand-performance rows for the modern-trade and general-trade channels.

use std::fmt;
use std::str::FromStr;

use mapdash_core::{RawBrandRow, RawNumber};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

/// Sales channel: modern trade (supermarkets) or general trade (dukas).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Mt,
    Gt,
}

impl Channel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mt => "mt",
            Self::Gt => "gt",
        }
    }

    fn table(self) -> &'static str {
        match self {
            Self::Mt => "mt_brand_performance",
            Self::Gt => "gt_brand_performance",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mt" => Ok(Self::Mt),
            "gt" => Ok(Self::Gt),
            other => Err(format!("unknown channel '{other}' (expected mt or gt)")),
        }
    }
}

/// A row from `mt_brand_performance` / `gt_brand_performance`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BrandPerformanceRow {
    pub brand_name: Option<String>,
    pub category: Option<String>,
    pub market: Option<String>,
    pub market_share: Option<Decimal>,
    pub competitor_strength: Option<Decimal>,
    pub white_space_score: Option<Decimal>,
}

pub(crate) fn decimal_cell(value: Option<Decimal>) -> Option<RawNumber> {
    value.and_then(|d| d.to_f64()).map(RawNumber::Number)
}

impl From<BrandPerformanceRow> for RawBrandRow {
    fn from(row: BrandPerformanceRow) -> Self {
        Self {
            brand_name: row.brand_name,
            category: row.category,
            market: row.market,
            market_share: decimal_cell(row.market_share),
            competitor_strength: decimal_cell(row.competitor_strength),
            white_space_score: decimal_cell(row.white_space_score),
        }
    }
}

fn select_sql(channel: Channel) -> String {
    let table = channel.table();
    match channel {
        Channel::Mt => format!(
            "SELECT brand_name, category, market, market_share, competitor_strength, \
                    white_space_score \
             FROM {table}"
        ),
        // General trade is re-snapshotted; only the latest snapshot is current.
        Channel::Gt => format!(
            "SELECT brand_name, category, market, market_share, competitor_strength, \
                    white_space_score \
             FROM {table} \
             WHERE snapshot_date = (SELECT MAX(snapshot_date) FROM {table})"
        ),
    }
}

/// Returns every current brand-performance row for `channel`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the table is empty, or [`DbError::Sqlx`]
/// if the query fails.
pub async fn list_brand_rows(pool: &PgPool, channel: Channel) -> Result<Vec<RawBrandRow>, DbError> {
    let rows = sqlx::query_as::<_, BrandPerformanceRow>(&select_sql(channel))
        .fetch_all(pool)
        .await?;
    if rows.is_empty() {
        return Err(DbError::NotFound {
            table: channel.table(),
        });
    }
    tracing::debug!(%channel, rows = rows.len(), "loaded brand-performance rows");
    Ok(rows.into_iter().map(RawBrandRow::from).collect())
}
