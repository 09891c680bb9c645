//! Route-to-market sales rows.

use mapdash_core::RawRtmRow;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::brand_rows::decimal_cell;
use crate::DbError;

/// A row from `rtm_sales`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RtmSalesRow {
    pub category: Option<String>,
    pub brand: Option<String>,
    pub territory: Option<String>,
    pub county: Option<String>,
    pub distributor: Option<String>,
    pub territory_name: Option<String>,
    pub customer: Option<String>,
    pub qty_kg: Option<Decimal>,
    pub value_sold: Option<Decimal>,
    pub white_space_score: Option<Decimal>,
}

impl From<RtmSalesRow> for RawRtmRow {
    fn from(row: RtmSalesRow) -> Self {
        Self {
            category: row.category,
            brand: row.brand,
            territory: row.territory,
            county: row.county,
            distributor: row.distributor,
            territory_name: row.territory_name,
            customer: row.customer,
            qty_kg: decimal_cell(row.qty_kg),
            value_sold: decimal_cell(row.value_sold),
            white_space_score: decimal_cell(row.white_space_score),
        }
    }
}

/// Returns all route-to-market sales rows.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_rtm_rows(pool: &PgPool) -> Result<Vec<RawRtmRow>, DbError> {
    let rows = sqlx::query_as::<_, RtmSalesRow>(
        "SELECT category, brand, territory, county, distributor, territory_name, customer, \
                qty_kg, value_sold, white_space_score \
         FROM rtm_sales",
    )
    .fetch_all(pool)
    .await?;
    tracing::debug!(rows = rows.len(), "loaded route-to-market rows");
    Ok(rows.into_iter().map(RawRtmRow::from).collect())
}
