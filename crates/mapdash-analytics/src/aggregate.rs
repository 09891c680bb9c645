//! Per-geography aggregation of brand records.
//!
//! Markets are canonicalized *before* grouping so "Uasin-Gishu",
//! "UASIN GISHU" and "uasin gishu" land in one row.

use std::collections::BTreeMap;

use mapdash_core::{builtin_aliases, AliasTable, BrandRecord};
use serde::Serialize;

/// Mean and sum of one metric over the values that were present.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricStats {
    /// `None` when no row carried a value.
    pub mean: Option<f64>,
    pub sum: f64,
    /// Number of non-null values folded in.
    pub observed: usize,
}

impl MetricStats {
    /// Folds an iterator of optional values; `None`s are skipped.
    pub fn collect<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let mut acc = Accumulator::default();
        for value in values {
            acc.add(value);
        }
        acc.finish()
    }
}

#[derive(Debug, Default)]
pub(crate) struct Accumulator {
    sum: f64,
    observed: usize,
}

impl Accumulator {
    pub(crate) fn add(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.observed += 1;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn finish(&self) -> MetricStats {
        MetricStats {
            mean: (self.observed > 0).then(|| self.sum / self.observed as f64),
            sum: self.sum,
            observed: self.observed,
        }
    }
}

/// One row per distinct canonical market key.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoAggregate {
    pub canonical_key: String,
    /// First raw market label seen for this key, kept for display.
    pub market: String,
    pub white_space_score: MetricStats,
    pub market_share: MetricStats,
    pub competitor_strength: MetricStats,
    /// Number of brand rows folded into this market.
    pub brand_count: usize,
}

#[derive(Default)]
struct Group {
    market: String,
    white_space_score: Accumulator,
    market_share: Accumulator,
    competitor_strength: Accumulator,
    rows: usize,
}

/// Aggregates records by canonical market key using the built-in aliases.
///
/// Output is sorted by canonical key; empty input gives empty output.
#[must_use]
pub fn aggregate_by_geography<'a, I>(records: I) -> Vec<GeoAggregate>
where
    I: IntoIterator<Item = &'a BrandRecord>,
{
    aggregate_by_geography_with(builtin_aliases(), records)
}

/// Aggregates records by canonical market key using `aliases`.
#[must_use]
pub fn aggregate_by_geography_with<'a, I>(aliases: &AliasTable, records: I) -> Vec<GeoAggregate>
where
    I: IntoIterator<Item = &'a BrandRecord>,
{
    let mut groups: BTreeMap<String, Group> = BTreeMap::new();
    let mut input_rows = 0usize;

    for record in records {
        input_rows += 1;
        let key = aliases.canonicalize(&record.market);
        let group = groups.entry(key).or_insert_with(|| Group {
            market: record.market.clone(),
            ..Group::default()
        });
        group.white_space_score.add(record.white_space_score);
        group.market_share.add(record.market_share);
        group.competitor_strength.add(record.competitor_strength);
        group.rows += 1;
    }

    tracing::debug!(
        input_rows,
        markets = groups.len(),
        "aggregated brand records by geography"
    );

    groups
        .into_iter()
        .map(|(canonical_key, group)| GeoAggregate {
            canonical_key,
            market: group.market,
            white_space_score: group.white_space_score.finish(),
            market_share: group.market_share.finish(),
            competitor_strength: group.competitor_strength.finish(),
            brand_count: group.rows,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(market: &str, ws: Option<f64>, share: Option<f64>) -> BrandRecord {
        BrandRecord {
            brand_name: "Salit".to_string(),
            category: "Cooking Oil".to_string(),
            market: market.to_string(),
            market_share: share,
            competitor_strength: Some(4.0),
            white_space_score: ws,
        }
    }

    #[test]
    fn empty_input_gives_empty_output() {
        let records: Vec<BrandRecord> = Vec::new();
        assert!(aggregate_by_geography(&records).is_empty());
    }

    #[test]
    fn alias_variants_merge_into_one_row() {
        let records = vec![
            record("Uasin-Gishu", Some(40.0), Some(10.0)),
            record("UASIN GISHU", Some(60.0), Some(20.0)),
            record("uasin gishu", Some(50.0), None),
        ];
        let rows = aggregate_by_geography(&records);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.canonical_key, "UASIN GISHU");
        assert_eq!(row.market, "Uasin-Gishu");
        assert_eq!(row.brand_count, 3);
        assert_eq!(row.white_space_score.mean, Some(50.0));
        assert_eq!(row.white_space_score.sum, 150.0);
        assert_eq!(row.market_share.mean, Some(15.0));
        assert_eq!(row.market_share.observed, 2);
        assert_eq!(row.competitor_strength.sum, 12.0);
    }

    #[test]
    fn output_keys_are_unique_and_sorted() {
        let records = vec![
            record("Nakuru", Some(1.0), None),
            record("Kisumu", Some(2.0), None),
            record("nakuru ", Some(3.0), None),
            record("Nairobi City", Some(4.0), None),
            record("Nairobi", Some(6.0), None),
        ];
        let rows = aggregate_by_geography(&records);
        let keys: Vec<&str> = rows.iter().map(|r| r.canonical_key.as_str()).collect();
        assert_eq!(keys, vec!["KISUMU", "NAIROBI", "NAKURU"]);
        assert_eq!(rows[1].white_space_score.mean, Some(5.0));
    }

    #[test]
    fn all_null_metric_has_no_mean() {
        let records = vec![record("Kisumu", None, None)];
        let rows = aggregate_by_geography(&records);
        assert_eq!(rows[0].white_space_score.mean, None);
        assert_eq!(rows[0].white_space_score.sum, 0.0);
        assert_eq!(rows[0].brand_count, 1);
    }

    #[test]
    fn empty_market_is_its_own_group() {
        let records = vec![record("", Some(10.0), None), record("  ", Some(20.0), None)];
        let rows = aggregate_by_geography(&records);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].canonical_key, "");
        assert_eq!(rows[0].brand_count, 2);
    }

    #[test]
    fn custom_aliases_are_applied_before_grouping() {
        let mut aliases = AliasTable::empty();
        aliases.insert("MSA", "MOMBASA").unwrap();
        let records = vec![record("msa", Some(1.0), None), record("Mombasa", Some(3.0), None)];
        let rows = aggregate_by_geography_with(&aliases, &records);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].canonical_key, "MOMBASA");
        assert_eq!(rows[0].white_space_score.mean, Some(2.0));
    }

    #[test]
    fn metric_stats_collect_skips_nulls() {
        let stats = MetricStats::collect([Some(2.0), None, Some(4.0)]);
        assert_eq!(stats.mean, Some(3.0));
        assert_eq!(stats.observed, 2);
    }
}
