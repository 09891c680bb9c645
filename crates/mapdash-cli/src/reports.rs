//! Report download and content generation commands.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use mapdash_core::AppConfig;
use mapdash_reports::{
    encode_image, DisplayResult, GenerationClient, GenerationRequest, ReportClient, ReportKind,
    BinaryReport, ReportPayload, TextVariant,
};
use serde_json::json;

use crate::inputs;

pub(crate) fn payload(brand: String, category: String, territory: Option<String>) -> ReportPayload {
    ReportPayload {
        brand,
        category,
        territory: territory.filter(|t| !t.trim().is_empty()),
    }
}

pub(crate) async fn run_report(
    config: &AppConfig,
    kind: &str,
    payload: &ReportPayload,
    out: Option<PathBuf>,
) -> anyhow::Result<()> {
    let kind: ReportKind = kind.parse()?;
    let client = ReportClient::from_config(config)?;

    match kind {
        ReportKind::Binary(report) => {
            let path = out.unwrap_or_else(|| PathBuf::from(payload.file_name(report)));
            let bytes = download_report(&client, report, payload, &path).await?;
            inputs::print_json(&json!({
                "report": report.name(),
                "path": path.display().to_string(),
                "bytes": bytes,
            }))
        }
        ReportKind::Json(report) => {
            let value = client.fetch_json_report(report, payload).await?;
            match out {
                Some(path) => {
                    tokio::fs::write(&path, serde_json::to_vec_pretty(&value)?)
                        .await
                        .with_context(|| format!("writing {}", path.display()))?;
                    tracing::info!(path = %path.display(), "wrote report");
                    Ok(())
                }
                None => inputs::print_json(&value),
            }
        }
    }
}

/// Streams a binary report into `<path>.part` and renames it to `path` once
/// the whole body has arrived. A failed download leaves nothing behind.
pub(crate) async fn download_report(
    client: &ReportClient,
    report: BinaryReport,
    payload: &ReportPayload,
    path: &Path,
) -> anyhow::Result<u64> {
    let mut partial = path.as_os_str().to_owned();
    partial.push(".part");
    let partial = PathBuf::from(partial);

    let mut file = tokio::fs::File::create(&partial)
        .await
        .with_context(|| format!("creating {}", partial.display()))?;
    let streamed = client.stream_binary_report(report, payload, &mut file).await;
    drop(file);

    match streamed {
        Ok(bytes) => {
            tokio::fs::rename(&partial, path)
                .await
                .with_context(|| format!("moving download to {}", path.display()))?;
            Ok(bytes)
        }
        Err(err) => {
            if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
                tracing::warn!(
                    path = %partial.display(),
                    error = %cleanup,
                    "could not remove partial download"
                );
            }
            Err(err.into())
        }
    }
}

pub(crate) async fn run_generate(
    config: &AppConfig,
    payload: &ReportPayload,
    image: Option<PathBuf>,
    language: Option<String>,
    out_dir: &Path,
) -> anyhow::Result<()> {
    let reports = ReportClient::from_config(config)?;
    let mut brief = reports.fetch_llm_input(payload).await?;
    if let Some(language) = language {
        brief.language = Some(language);
    }

    let image_data = match image {
        Some(path) => {
            let bytes = tokio::fs::read(&path)
                .await
                .with_context(|| format!("reading image {}", path.display()))?;
            Some(encode_image(&bytes)?)
        }
        None => None,
    };
    let request = GenerationRequest::from_llm_input(&brief, image_data)?;

    let generator = GenerationClient::from_config(config)?;
    let output = generator.run_with_retry(&request).await?;

    let files = write_display(out_dir, &output.display).await?;
    inputs::print_json(&json!({
        "outputType": request.output_kind().name(),
        "attempts": output.attempts,
        "elapsedMinutes": minutes(output.elapsed),
        "files": files.iter().map(|p| p.display().to_string()).collect::<Vec<_>>(),
    }))
}

fn minutes(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() / 60.0 * 100.0).round() / 100.0
}

/// Markdown for one text variant: each section as a bold title, its body,
/// and a rule.
pub(crate) fn render_text_variant(variant: &TextVariant) -> String {
    let mut out = String::new();
    for (title, body) in &variant.sections {
        let _ = write!(out, "**{title}**\n\n{body}\n\n---\n\n");
    }
    out
}

async fn write_display(out_dir: &Path, display: &DisplayResult) -> anyhow::Result<Vec<PathBuf>> {
    tokio::fs::create_dir_all(out_dir)
        .await
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut files = Vec::new();
    for variant in display.text_variants() {
        let path = out_dir.join(format!("{}.md", variant.label));
        tokio::fs::write(&path, render_text_variant(variant)).await?;
        files.push(path);
    }
    for image in display.images() {
        let path = out_dir.join(format!("{}.png", image.label));
        tokio::fs::write(&path, &image.bytes).await?;
        files.push(path);
    }
    Ok(files)
}
