//! Map, ranking and distribution commands.

use std::path::PathBuf;

use mapdash_analytics::{
    aggregate_by_geography_with, join_boundaries, rank_brands, summarize, top_counties,
    top_distributors, unmatched_markets, RecordFilter, RtmFilter,
};
use mapdash_core::AppConfig;
use mapdash_db::Channel;
use mapdash_geo::BoundaryLevel;
use serde_json::json;

use crate::inputs;
use crate::FilterArgs;

impl From<FilterArgs> for RecordFilter {
    fn from(args: FilterArgs) -> Self {
        Self {
            category: args.category,
            brand: args.brand,
            market: args.market,
        }
    }
}

pub(crate) fn run_boundaries(
    config: &AppConfig,
    level: BoundaryLevel,
    path: Option<PathBuf>,
) -> anyhow::Result<()> {
    let cache = inputs::boundary_cache(config)?;
    let path = path.unwrap_or_else(|| inputs::boundary_path(config, level));
    let boundaries = cache.load(&path, level)?;
    inputs::print_json(&json!({
        "level": level.to_string(),
        "path": path.display().to_string(),
        "features": boundaries.features(),
    }))
}

pub(crate) async fn run_aggregate(
    config: &AppConfig,
    channel: Channel,
    level: BoundaryLevel,
    records: Option<PathBuf>,
    filter: FilterArgs,
) -> anyhow::Result<()> {
    let cache = inputs::boundary_cache(config)?;
    let boundaries = cache.load(&inputs::boundary_path(config, level), level)?;
    let records = inputs::brand_records(config, channel, records.as_deref()).await?;

    let filter = RecordFilter::from(filter);
    let selected = filter.apply(&records);
    let aggregates = aggregate_by_geography_with(cache.aliases(), selected.iter().copied());
    let rows = join_boundaries(&boundaries, &aggregates);
    let unmatched = unmatched_markets(&boundaries, &aggregates);

    inputs::print_json(&json!({
        "channel": channel.as_str(),
        "level": level.to_string(),
        "kpis": summarize(selected.iter().copied()),
        "rows": rows,
        "unmatched": unmatched,
    }))
}

pub(crate) async fn run_rank(
    config: &AppConfig,
    channel: Channel,
    records: Option<PathBuf>,
    limit: usize,
    filter: FilterArgs,
) -> anyhow::Result<()> {
    let records = inputs::brand_records(config, channel, records.as_deref()).await?;
    let selected = RecordFilter::from(filter).apply(&records);
    let ranking = rank_brands(selected.iter().copied(), limit);
    inputs::print_json(&serde_json::to_value(ranking)?)
}

pub(crate) async fn run_distribution(
    config: &AppConfig,
    records: Option<PathBuf>,
    limit: usize,
    filter: RtmFilter,
) -> anyhow::Result<()> {
    let records = inputs::rtm_records(config, records.as_deref()).await?;
    let selected = filter.apply(&records);
    inputs::print_json(&json!({
        "topCounties": top_counties(selected.iter().copied(), limit),
        "topDistributors": top_distributors(selected.iter().copied(), limit),
    }))
}
