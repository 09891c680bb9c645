//! Shared input loading: alias table, boundary paths, and records from a
//! JSON file or the database.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use mapdash_core::{AliasTable, AppConfig, BrandRecord, RawBrandRow, RawRtmRow, RtmRecord};
use mapdash_db::Channel;
use mapdash_geo::{BoundaryCache, BoundaryLevel};
use serde_json::Value;

/// Built-in aliases, extended with the configured alias file if any.
pub(crate) fn alias_table(config: &AppConfig) -> anyhow::Result<AliasTable> {
    match &config.aliases_path {
        Some(path) => AliasTable::load(path)
            .with_context(|| format!("loading alias file {}", path.display())),
        None => Ok(AliasTable::builtin()),
    }
}

pub(crate) fn boundary_cache(config: &AppConfig) -> anyhow::Result<BoundaryCache> {
    Ok(BoundaryCache::new(Arc::new(alias_table(config)?)))
}

pub(crate) fn boundary_path(config: &AppConfig, level: BoundaryLevel) -> PathBuf {
    match level {
        BoundaryLevel::Territory => config.territory_boundaries_path.clone(),
        BoundaryLevel::County => config.county_boundaries_path.clone(),
    }
}

async fn read_json_array<T>(path: &Path) -> anyhow::Result<Vec<T>>
where
    T: serde::de::DeserializeOwned,
{
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

pub(crate) async fn brand_records(
    config: &AppConfig,
    channel: Channel,
    records: Option<&Path>,
) -> anyhow::Result<Vec<BrandRecord>> {
    let rows: Vec<RawBrandRow> = match records {
        Some(path) => read_json_array(path).await?,
        None => {
            let pool = mapdash_db::connect_pool_from_config(config).await?;
            mapdash_db::list_brand_rows(&pool, channel).await?
        }
    };
    tracing::info!(%channel, rows = rows.len(), "loaded brand rows");
    Ok(BrandRecord::from_raw_rows(rows))
}

pub(crate) async fn rtm_records(
    config: &AppConfig,
    records: Option<&Path>,
) -> anyhow::Result<Vec<RtmRecord>> {
    let rows: Vec<RawRtmRow> = match records {
        Some(path) => read_json_array(path).await?,
        None => {
            let pool = mapdash_db::connect_pool_from_config(config).await?;
            mapdash_db::list_rtm_rows(&pool).await?
        }
    };
    tracing::info!(rows = rows.len(), "loaded route-to-market rows");
    Ok(rows.into_iter().map(RtmRecord::from_raw).collect())
}

pub(crate) fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
