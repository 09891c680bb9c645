//! Route-to-market roll-ups: county volumes and distributor sales.

use std::collections::{BTreeMap, BTreeSet};

use mapdash_core::RtmRecord;
use serde::{Deserialize, Serialize};

use crate::aggregate::Accumulator;
use crate::ranking::field_matches;

/// Exact-match selection on RTM rows; unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RtmFilter {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub territory: Option<String>,
}

impl RtmFilter {
    #[must_use]
    pub fn matches(&self, record: &RtmRecord) -> bool {
        field_matches(self.category.as_deref(), &record.category)
            && field_matches(self.brand.as_deref(), &record.brand)
            && field_matches(self.territory.as_deref(), &record.territory)
    }

    #[must_use]
    pub fn apply<'a>(&self, records: &'a [RtmRecord]) -> Vec<&'a RtmRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountyVolume {
    pub county: String,
    pub qty_kg: f64,
    pub white_space_score: Option<f64>,
    /// Volume relative to the leading county, 0..=100.
    pub share_of_leader: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributorSales {
    pub distributor: String,
    pub territory_name: String,
    pub value_sold: f64,
    /// Distinct non-empty customers served.
    pub customer_count: usize,
    /// Value relative to the leading distributor, 0..=100.
    pub share_of_leader: f64,
}

fn share_of(value: f64, leader: f64) -> f64 {
    if leader > 0.0 {
        (value * 100.0 / leader).clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// The `limit` counties moving the most volume, largest first.
#[must_use]
pub fn top_counties<'a, I>(records: I, limit: usize) -> Vec<CountyVolume>
where
    I: IntoIterator<Item = &'a RtmRecord>,
{
    let mut groups: BTreeMap<&str, (Accumulator, Accumulator)> = BTreeMap::new();
    for record in records {
        let (qty, ws) = groups.entry(record.county.as_str()).or_default();
        qty.add(record.qty_kg);
        ws.add(record.white_space_score);
    }

    let mut rows: Vec<CountyVolume> = groups
        .into_iter()
        .map(|(county, (qty, ws))| CountyVolume {
            county: county.to_string(),
            qty_kg: qty.finish().sum,
            white_space_score: ws.finish().mean,
            share_of_leader: 0.0,
        })
        .collect();
    rows.sort_by(|a, b| b.qty_kg.total_cmp(&a.qty_kg));
    rows.truncate(limit);

    let leader = rows.first().map_or(0.0, |r| r.qty_kg);
    for row in &mut rows {
        row.share_of_leader = share_of(row.qty_kg, leader);
    }
    rows
}

/// The `limit` (distributor, territory) pairs with the highest sales value.
#[must_use]
pub fn top_distributors<'a, I>(records: I, limit: usize) -> Vec<DistributorSales>
where
    I: IntoIterator<Item = &'a RtmRecord>,
{
    let mut groups: BTreeMap<(&str, &str), (Accumulator, BTreeSet<&str>)> = BTreeMap::new();
    for record in records {
        let (value, customers) = groups
            .entry((record.distributor.as_str(), record.territory_name.as_str()))
            .or_default();
        value.add(record.value_sold);
        if !record.customer.is_empty() {
            customers.insert(record.customer.as_str());
        }
    }

    let mut rows: Vec<DistributorSales> = groups
        .into_iter()
        .map(|((distributor, territory_name), (value, customers))| DistributorSales {
            distributor: distributor.to_string(),
            territory_name: territory_name.to_string(),
            value_sold: value.finish().sum,
            customer_count: customers.len(),
            share_of_leader: 0.0,
        })
        .collect();
    rows.sort_by(|a, b| b.value_sold.total_cmp(&a.value_sold));
    rows.truncate(limit);

    let leader = rows.first().map_or(0.0, |r| r.value_sold);
    for row in &mut rows {
        row.share_of_leader = share_of(row.value_sold, leader);
    }
    tracing::debug!(rows = rows.len(), "ranked distributors by value sold");
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rtm(county: &str, distributor: &str, customer: &str, qty: f64, value: f64) -> RtmRecord {
        RtmRecord {
            category: "Cooking Oil".to_string(),
            brand: "Salit".to_string(),
            territory: "Rift Valley".to_string(),
            county: county.to_string(),
            distributor: distributor.to_string(),
            territory_name: "North Rift".to_string(),
            customer: customer.to_string(),
            qty_kg: Some(qty),
            value_sold: Some(value),
            white_space_score: Some(40.0),
        }
    }

    fn sample() -> Vec<RtmRecord> {
        vec![
            rtm("Nakuru", "Acme", "Duka A", 100.0, 1_000.0),
            rtm("Nakuru", "Acme", "Duka B", 100.0, 1_000.0),
            rtm("Kericho", "Acme", "Duka A", 50.0, 500.0),
            rtm("Bomet", "Zeta", "", 150.0, 500.0),
            rtm("Bomet", "Zeta", "Duka C", 0.0, 0.0),
        ]
    }

    #[test]
    fn counties_are_sorted_and_normalized_to_leader() {
        let rows = top_counties(&sample(), 2);
        let names: Vec<&str> = rows.iter().map(|r| r.county.as_str()).collect();
        assert_eq!(names, vec!["Nakuru", "Bomet"]);
        assert_eq!(rows[0].qty_kg, 200.0);
        assert_eq!(rows[0].share_of_leader, 100.0);
        assert_eq!(rows[1].share_of_leader, 75.0);
        assert_eq!(rows[0].white_space_score, Some(40.0));
    }

    #[test]
    fn distributors_count_distinct_customers() {
        let rows = top_distributors(&sample(), 10);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].distributor, "Acme");
        assert_eq!(rows[0].value_sold, 2_500.0);
        assert_eq!(rows[0].customer_count, 2);
        assert_eq!(rows[1].customer_count, 1);
        assert_eq!(rows[1].share_of_leader, 20.0);
    }

    #[test]
    fn zero_volume_leader_gives_zero_shares() {
        let records = vec![rtm("Bomet", "Zeta", "Duka C", 0.0, 0.0)];
        let rows = top_counties(&records, 5);
        assert_eq!(rows[0].share_of_leader, 0.0);
    }

    #[test]
    fn filter_selects_territory() {
        let mut records = sample();
        records[0].territory = "Nyanza".to_string();
        let filter = RtmFilter {
            territory: Some("Nyanza".to_string()),
            ..RtmFilter::default()
        };
        assert_eq!(filter.apply(&records).len(), 1);
        assert_eq!(RtmFilter::default().apply(&records).len(), 5);
    }
}
