//! Rewards Calculator: splits a catalog into price tiers, suggests a point
//! cost per tier, and prices each item's redemption.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use rewards_core::{AppConfig, TierNaming};
use rewards_loyalty::{load_catalog, Catalog, RewardsSession};
use rewards_reporting::{
    render_table, result_rows, tier_point_rows, tier_summaries, to_csv_string, to_json,
    ExportRow,
};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "rewards-calculator")]
#[command(about = "Points rewards program calculator: tier a catalog and price its redemptions")]
#[command(version)]
struct Cli {
    /// Optional TOML configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    /// Points earned per dollar spent (overrides config)
    #[arg(long, global = true, env = "REWARDS_CALCULATOR__PROGRAM__POINTS_PER_DOLLAR")]
    points_per_dollar: Option<f64>,

    /// Payback rate in percent (overrides config)
    #[arg(long, global = true, env = "REWARDS_CALCULATOR__PROGRAM__PAYBACK_RATE")]
    payback_rate: Option<f64>,

    /// COGS margin in percent (overrides config)
    #[arg(long, global = true, env = "REWARDS_CALCULATOR__PROGRAM__COGS_MARGIN")]
    cogs_margin: Option<f64>,

    /// How tiers are labelled
    #[arg(long, global = true, value_enum)]
    tier_naming: Option<NamingArg>,

    /// Emit logs as JSON
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate tiers from a catalog and print their summaries
    Tiers {
        /// Catalog CSV file with a header row
        #[arg(short, long)]
        catalog: String,

        #[arg(long, value_enum, default_value = "table")]
        format: TierFormat,
    },

    /// Generate tiers, apply overrides, and export per-item reward economics
    Calculate {
        /// Catalog CSV file with a header row
        #[arg(short, long)]
        catalog: String,

        /// Item names to leave out of the calculation (repeatable)
        #[arg(long)]
        exclude: Vec<String>,

        /// Tier point override as ID=POINTS (repeatable)
        #[arg(long = "tier-points", value_parser = parse_tier_points)]
        tier_points: Vec<(u8, String)>,

        #[arg(long, value_enum, default_value = "per-item")]
        lens: Lens,

        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum NamingArg {
    PointCost,
    Sequential,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TierFormat {
    Table,
    Json,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Lens {
    /// Point cost from each item's own retail price
    PerItem,
    /// Point cost from the item's tier, including manual overrides
    TierPoints,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ExportFormat {
    Csv,
    Json,
}

fn parse_tier_points(s: &str) -> Result<(u8, String), String> {
    let (id, points) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ID=POINTS, got '{s}'"))?;
    let id = id
        .trim()
        .parse::<u8>()
        .map_err(|e| format!("invalid tier id '{id}': {e}"))?;
    Ok((id, points.to_string()))
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rewards_calculator=info,rewards_loyalty=info".into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// File and environment settings with CLI flags layered on top. A missing
/// file falls back to defaults; an unreadable or invalid one is an error.
fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut config = AppConfig::load(cli.config.as_deref())
        .with_context(|| format!("Failed to load config {:?}", cli.config))?;

    if let Some(v) = cli.points_per_dollar {
        config.program.points_per_dollar = v;
    }
    if let Some(v) = cli.payback_rate {
        config.program.payback_rate = v;
    }
    if let Some(v) = cli.cogs_margin {
        config.program.cogs_margin = v;
    }
    if let Some(naming) = cli.tier_naming {
        config.tiers.naming = match naming {
            NamingArg::PointCost => TierNaming::PointCost,
            NamingArg::Sequential => TierNaming::Sequential,
        };
    }
    config.validate().context("Invalid program configuration")?;
    Ok(config)
}

async fn read_catalog(path: &str) -> anyhow::Result<Catalog> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to open '{}'", path))?;
    let catalog = load_catalog(bytes.as_slice()).with_context(|| format!("Failed to parse '{}'", path))?;
    Ok(catalog)
}

fn print_notices(session: &mut RewardsSession) {
    for notice in session.drain_notices() {
        eprintln!("Notice: {}", notice.message);
    }
}

async fn emit(rendered: String, output: Option<&str>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            tokio::fs::write(path, rendered)
                .await
                .with_context(|| format!("Failed to write '{}'", path))?;
            info!(path, "Export written");
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config = load_config(&cli)?;

    info!(
        points_per_dollar = config.program.points_per_dollar,
        payback_rate = config.program.payback_rate,
        cogs_margin = config.program.cogs_margin,
        tier_count = config.tiers.tier_count,
        "Configuration loaded"
    );

    let mut session = RewardsSession::new(&config);

    match cli.command {
        Commands::Tiers { catalog, format } => {
            session.load_catalog(read_catalog(&catalog).await?);
            session.generate_tiers();
            let summaries = tier_summaries(session.tiers(), session.catalog());
            if summaries.is_empty() {
                eprintln!("Notice: no included items, no tiers generated");
            }
            let rendered = match format {
                TierFormat::Table => render_table(&summaries),
                TierFormat::Json => serde_json::to_string_pretty(&summaries)? + "\n",
            };
            emit(rendered, None).await?;
        }

        Commands::Calculate {
            catalog,
            exclude,
            tier_points,
            lens,
            format,
            output,
        } => {
            session.load_catalog(read_catalog(&catalog).await?);

            for name in &exclude {
                let target = session
                    .catalog()
                    .find_by_name(name)
                    .filter(|i| i.included)
                    .map(|i| i.id);
                match target {
                    Some(id) => {
                        session.toggle_item(&id)?;
                    }
                    None => warn!(name = %name, "Excluded item not found in catalog"),
                }
            }

            session.generate_tiers();
            for (tier_id, raw) in &tier_points {
                if let Err(e) = session.set_tier_point_cost_input(*tier_id, raw) {
                    warn!(tier_id, error = %e, "Tier override skipped");
                }
            }

            let rows: Vec<ExportRow> = match lens {
                Lens::PerItem => match session.calculate() {
                    Ok(set) => {
                        let summary = set.summary();
                        info!(
                            items = summary.item_count,
                            total_retail_value = summary.total_retail_value,
                            average_point_cost = summary.average_point_cost,
                            average_profit_impact = ?summary.average_profit_impact,
                            "Result set computed"
                        );
                        result_rows(set)
                    }
                    Err(e) if e.is_empty_precondition() => Vec::new(),
                    Err(e) => return Err(e.into()),
                },
                Lens::TierPoints => match session.tier_points_view() {
                    Ok(view) => tier_point_rows(&view),
                    Err(e) if e.is_empty_precondition() => Vec::new(),
                    Err(e) => return Err(e.into()),
                },
            };
            print_notices(&mut session);
            if rows.is_empty() {
                return Ok(());
            }

            let rendered = match format {
                ExportFormat::Csv => to_csv_string(&rows)?,
                ExportFormat::Json => to_json(&rows)? + "\n",
            };
            emit(rendered, output.as_deref()).await?;
        }
    }

    Ok(())
}
