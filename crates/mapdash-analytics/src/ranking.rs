//! Record filtering, headline KPIs, and best/worst brand rankings.

use std::collections::{BTreeMap, BTreeSet};

use mapdash_core::{widget_id, BrandRecord};
use serde::{Deserialize, Serialize};

use crate::aggregate::{Accumulator, MetricStats};

/// Exact-match selection on category, brand and market. Unset fields match
/// everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilter {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub market: Option<String>,
}

impl RecordFilter {
    #[must_use]
    pub fn matches(&self, record: &BrandRecord) -> bool {
        field_matches(self.category.as_deref(), &record.category)
            && field_matches(self.brand.as_deref(), &record.brand_name)
            && field_matches(self.market.as_deref(), &record.market)
    }

    #[must_use]
    pub fn apply<'a>(&self, records: &'a [BrandRecord]) -> Vec<&'a BrandRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

/// A blank or absent filter value matches every record.
pub(crate) fn field_matches(wanted: Option<&str>, actual: &str) -> bool {
    wanted.is_none_or(|w| w.trim().is_empty() || w.trim() == actual)
}

/// Headline numbers for the current selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiSummary {
    pub white_space_score: MetricStats,
    pub market_share: MetricStats,
    pub competitor_strength: MetricStats,
    pub distinct_brands: usize,
    pub distinct_markets: usize,
    pub rows: usize,
}

#[must_use]
pub fn summarize<'a, I>(records: I) -> KpiSummary
where
    I: IntoIterator<Item = &'a BrandRecord>,
{
    let mut ws = Accumulator::default();
    let mut share = Accumulator::default();
    let mut strength = Accumulator::default();
    let mut brands = BTreeSet::new();
    let mut markets = BTreeSet::new();
    let mut rows = 0usize;

    for record in records {
        ws.add(record.white_space_score);
        share.add(record.market_share);
        strength.add(record.competitor_strength);
        brands.insert(record.brand_name.as_str());
        markets.insert(record.market.as_str());
        rows += 1;
    }

    KpiSummary {
        white_space_score: ws.finish(),
        market_share: share.finish(),
        competitor_strength: strength.finish(),
        distinct_brands: brands.len(),
        distinct_markets: markets.len(),
        rows,
    }
}

/// One (brand, category, market) group in a ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedBrand {
    /// Stable UI identifier, unique within its list.
    pub widget_id: String,
    pub brand_name: String,
    pub category: String,
    pub market: String,
    /// Mean white-space score of the group.
    pub white_space_score: f64,
    /// Summed market share of the group.
    pub market_share: f64,
    /// Summed competitor strength of the group.
    pub competitor_strength: f64,
    /// `100 - white_space_score`, clamped to 0..=100.
    pub performance_pct: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BrandRanking {
    /// Lowest white-space scores first.
    pub top: Vec<RankedBrand>,
    /// Highest white-space scores first.
    pub bottom: Vec<RankedBrand>,
}

#[derive(Default)]
struct RankGroup {
    ws: Accumulator,
    share: Accumulator,
    strength: Accumulator,
}

/// Ranks (brand, category, market) groups by mean white-space score.
///
/// A lower score means the brand already covers the market, so `top` holds
/// the `limit` smallest means and `bottom` the `limit` largest. Groups with
/// no score are left out. Ties keep (brand, category, market) order.
#[must_use]
pub fn rank_brands<'a, I>(records: I, limit: usize) -> BrandRanking
where
    I: IntoIterator<Item = &'a BrandRecord>,
{
    let mut groups: BTreeMap<(&str, &str, &str), RankGroup> = BTreeMap::new();
    for record in records {
        let group = groups
            .entry((
                record.brand_name.as_str(),
                record.category.as_str(),
                record.market.as_str(),
            ))
            .or_default();
        group.ws.add(record.white_space_score);
        group.share.add(record.market_share);
        group.strength.add(record.competitor_strength);
    }

    let scored: Vec<Scored<'_>> = groups
        .into_iter()
        .filter_map(|(key, group)| {
            let ws = group.ws.finish().mean?;
            Some(Scored {
                key,
                ws,
                share: group.share.finish().sum,
                strength: group.strength.finish().sum,
            })
        })
        .collect();

    let mut ascending = scored.clone();
    ascending.sort_by(|a, b| a.ws.total_cmp(&b.ws));
    let mut descending = scored;
    descending.sort_by(|a, b| b.ws.total_cmp(&a.ws));

    BrandRanking {
        top: ranked_list("top", ascending, limit),
        bottom: ranked_list("bottom", descending, limit),
    }
}

#[derive(Clone)]
struct Scored<'a> {
    key: (&'a str, &'a str, &'a str),
    ws: f64,
    share: f64,
    strength: f64,
}

fn ranked_list(prefix: &str, rows: Vec<Scored<'_>>, limit: usize) -> Vec<RankedBrand> {
    rows.into_iter()
        .take(limit)
        .enumerate()
        .map(|(idx, row)| {
            let (brand, category, market) = row.key;
            RankedBrand {
                widget_id: widget_id(prefix, idx, &[brand, market]),
                brand_name: brand.to_string(),
                category: category.to_string(),
                market: market.to_string(),
                white_space_score: row.ws,
                market_share: row.share,
                competitor_strength: row.strength,
                performance_pct: (100.0 - row.ws).clamp(0.0, 100.0),
            }
        })
        .collect()
}
