//! Left join of boundary features against geography aggregates.

use std::collections::{HashMap, HashSet};

use mapdash_geo::BoundarySet;
use serde::Serialize;

use crate::aggregate::GeoAggregate;

/// One map row: a boundary feature plus its metrics, if any market matched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotRow {
    pub canonical_key: String,
    pub slug_id: String,
    pub raw_name: String,
    pub aggregate: Option<GeoAggregate>,
}

impl PlotRow {
    #[must_use]
    pub fn is_matched(&self) -> bool {
        self.aggregate.is_some()
    }

    #[must_use]
    pub fn white_space_score(&self) -> Option<f64> {
        self.aggregate.as_ref().and_then(|a| a.white_space_score.mean)
    }

    #[must_use]
    pub fn market_share(&self) -> Option<f64> {
        self.aggregate.as_ref().and_then(|a| a.market_share.mean)
    }

    #[must_use]
    pub fn competitor_strength(&self) -> Option<f64> {
        self.aggregate.as_ref().and_then(|a| a.competitor_strength.mean)
    }

    #[must_use]
    pub fn brand_count(&self) -> Option<usize> {
        self.aggregate.as_ref().map(|a| a.brand_count)
    }
}

/// Joins every boundary feature with the aggregate sharing its canonical key.
///
/// Features drive the join: the result has exactly one row per feature, in
/// feature order, and features without a matching market carry `None`.
#[must_use]
pub fn join_boundaries(boundaries: &BoundarySet, aggregates: &[GeoAggregate]) -> Vec<PlotRow> {
    // Blank keys come from unnamed features and blank markets; they never join.
    let by_key: HashMap<&str, &GeoAggregate> = aggregates
        .iter()
        .filter(|agg| !agg.canonical_key.is_empty())
        .map(|agg| (agg.canonical_key.as_str(), agg))
        .collect();

    let rows: Vec<PlotRow> = boundaries
        .features()
        .iter()
        .map(|feature| PlotRow {
            canonical_key: feature.canonical_key.clone(),
            slug_id: feature.slug_id.clone(),
            raw_name: feature.raw_name.clone(),
            aggregate: by_key
                .get(feature.canonical_key.as_str())
                .map(|agg| (*agg).clone()),
        })
        .collect();

    let matched = rows.iter().filter(|row| row.is_matched()).count();
    tracing::debug!(
        level = %boundaries.level(),
        features = rows.len(),
        matched,
        "joined aggregates onto boundaries"
    );
    rows
}

/// Aggregates whose canonical key has no boundary feature. These markets
/// would silently vanish from the map.
#[must_use]
pub fn unmatched_markets<'a>(
    boundaries: &BoundarySet,
    aggregates: &'a [GeoAggregate],
) -> Vec<&'a GeoAggregate> {
    let keys: HashSet<&str> = boundaries.keys().filter(|key| !key.is_empty()).collect();
    let unmatched: Vec<&GeoAggregate> = aggregates
        .iter()
        .filter(|agg| !keys.contains(agg.canonical_key.as_str()))
        .collect();
    if !unmatched.is_empty() {
        tracing::warn!(
            level = %boundaries.level(),
            count = unmatched.len(),
            "markets without a matching boundary feature"
        );
    }
    unmatched
}
