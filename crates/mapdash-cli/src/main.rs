mod analytics;
mod inputs;
mod reports;

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use mapdash_db::Channel;
use mapdash_geo::BoundaryLevel;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "mapdash")]
#[command(about = "Regional market-discovery analytics")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LevelArg {
    Territory,
    County,
}

impl From<LevelArg> for BoundaryLevel {
    fn from(level: LevelArg) -> Self {
        match level {
            LevelArg::Territory => BoundaryLevel::Territory,
            LevelArg::County => BoundaryLevel::County,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ChannelArg {
    Mt,
    Gt,
}

impl From<ChannelArg> for Channel {
    fn from(channel: ChannelArg) -> Self {
        match channel {
            ChannelArg::Mt => Channel::Mt,
            ChannelArg::Gt => Channel::Gt,
        }
    }
}

/// Exact-match brand record filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
struct FilterArgs {
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    brand: Option<String>,
    #[arg(long)]
    market: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Load a boundary file and list its canonical keys
    Boundaries {
        #[arg(long, value_enum, default_value = "county")]
        level: LevelArg,
        /// Override the configured boundary file
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Aggregate brand records by geography and join them onto boundaries
    Aggregate {
        #[arg(long, value_enum, default_value = "gt")]
        channel: ChannelArg,
        #[arg(long, value_enum, default_value = "county")]
        level: LevelArg,
        /// JSON array of raw brand rows; reads the database when omitted
        #[arg(long)]
        records: Option<PathBuf>,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Best and worst performing brands by white space score
    Rank {
        #[arg(long, value_enum, default_value = "gt")]
        channel: ChannelArg,
        #[arg(long)]
        records: Option<PathBuf>,
        #[arg(long, default_value = "5")]
        limit: usize,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Top counties and distributors from route-to-market sales
    Distribution {
        /// JSON array of raw RTM rows; reads the database when omitted
        #[arg(long)]
        records: Option<PathBuf>,
        #[arg(long, default_value = "10")]
        limit: usize,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        brand: Option<String>,
        #[arg(long)]
        territory: Option<String>,
    },
    /// Download a report (PDF reports are written to disk)
    Report {
        /// Report name, e.g. `gt_territory_report` or `gt_llm_input`
        kind: String,
        #[arg(long)]
        brand: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        territory: Option<String>,
        /// Output file; defaults to a name derived from the selection
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Fetch the LLM brief for a selection and generate content from it
    Generate {
        #[arg(long)]
        brand: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        territory: Option<String>,
        /// PNG reference image (required for image output types)
        #[arg(long)]
        image: Option<PathBuf>,
        /// Override the brief's target language
        #[arg(long)]
        language: Option<String>,
        #[arg(long, default_value = "generated")]
        out_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse first so `--help` and usage errors work without a valid env.
    let cli = Cli::parse();
    let config = mapdash_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Boundaries { level, path }) => {
            analytics::run_boundaries(&config, level.into(), path)?;
        }
        Some(Commands::Aggregate {
            channel,
            level,
            records,
            filter,
        }) => {
            analytics::run_aggregate(&config, channel.into(), level.into(), records, filter)
                .await?;
        }
        Some(Commands::Rank {
            channel,
            records,
            limit,
            filter,
        }) => {
            analytics::run_rank(&config, channel.into(), records, limit, filter).await?;
        }
        Some(Commands::Distribution {
            records,
            limit,
            category,
            brand,
            territory,
        }) => {
            let filter = mapdash_analytics::RtmFilter {
                category,
                brand,
                territory,
            };
            analytics::run_distribution(&config, records, limit, filter).await?;
        }
        Some(Commands::Report {
            kind,
            brand,
            category,
            territory,
            out,
        }) => {
            let payload = reports::payload(brand, category, territory);
            reports::run_report(&config, &kind, &payload, out).await?;
        }
        Some(Commands::Generate {
            brand,
            category,
            territory,
            image,
            language,
            out_dir,
        }) => {
            let payload = reports::payload(brand, category, territory);
            reports::run_generate(&config, &payload, image, language, &out_dir).await?;
        }
        None => Cli::command().print_help()?,
    }

    Ok(())
}
