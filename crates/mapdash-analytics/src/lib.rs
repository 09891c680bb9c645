//! Aggregations over brand and route-to-market records.

pub mod aggregate;
pub mod distribution;
pub mod join;
pub mod ranking;

pub use aggregate::{aggregate_by_geography, aggregate_by_geography_with, GeoAggregate, MetricStats};
pub use distribution::{top_counties, top_distributors, CountyVolume, DistributorSales, RtmFilter};
pub use join::{join_boundaries, unmatched_markets, PlotRow};
pub use ranking::{rank_brands, summarize, BrandRanking, KpiSummary, RankedBrand, RecordFilter};
