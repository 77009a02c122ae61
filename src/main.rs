use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use proximity_oracle::analysis::{analyze_site, score_facility_set};
use proximity_oracle::config::{Config, ConfigOverrides};
use proximity_oracle::facility::{Coordinate, FacilitySet};
use proximity_oracle::output::csv::{score_to_csv, statistics_to_csv};
use proximity_oracle::output::json::render_json;
use proximity_oracle::output::table::{
    render_improvements_table, render_score_table, render_statistics_table,
};
use proximity_oracle::providers::provider_from_config;
use proximity_oracle::recommendations::build_improvements;
use proximity_oracle::scoring::engine::classify;
use proximity_oracle::scoring::SiteAnalysis;
use proximity_oracle::server::run_server;
use proximity_oracle::standards::FacilityCategory;
use tracing::warn;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Parser)]
#[command(
    name = "proximity-oracle",
    about = "Site proximity intelligence for housing land analysis"
)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    #[arg(short, long)]
    provider: Option<String>,
    #[arg(long = "kakao-api-key")]
    kakao_api_key: Option<String>,
    #[arg(short, long)]
    radius: Option<f64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch facilities around a coordinate and score the site.
    Analyze {
        #[arg(long)]
        lat: f64,
        #[arg(long)]
        lng: f64,
    },
    /// Score facility lists from a JSON file without fetching anything.
    Score {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        lat: Option<f64>,
        #[arg(long)]
        lng: Option<f64>,
    },
    /// Classify a single distance for one category.
    Classify {
        #[arg(long)]
        category: String,
        #[arg(long)]
        distance: f64,
    },
    /// Rank the categories whose improvement recovers the most points.
    Improve {
        #[arg(long)]
        lat: f64,
        #[arg(long)]
        lng: f64,
        #[arg(long, default_value_t = 4)]
        top: usize,
    },
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = 3001)]
        port: u16,
    },
    Config {
        #[arg(long)]
        init: bool,
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(&config_path))?;
    config.apply_overrides(ConfigOverrides {
        provider_kind: cli.provider.clone(),
        kakao_api_key: cli.kakao_api_key.clone(),
        search_radius_m: cli.radius,
    });

    if matches!(cli.command, Commands::Config { .. }) {
        return handle_config_command(&cli.command, &config, &config_path);
    }
    if let Commands::Serve { host, port } = &cli.command {
        let bind = format!("{host}:{port}");
        let addr: SocketAddr = bind
            .parse()
            .map_err(|e| anyhow!("invalid bind address {bind}: {e}"))?;
        return run_server(config, addr).await;
    }

    let standard = config.resolved_standard()?;

    match &cli.command {
        Commands::Analyze { lat, lng } => {
            let origin = Coordinate::new(*lat, *lng)?;
            let provider = provider_from_config(&config.provider)?;
            let analysis = analyze_site(provider.as_ref(), &standard, origin).await?;
            print_analysis(&analysis, cli.output)?;
        }
        Commands::Score { input, lat, lng } => {
            let data = fs::read_to_string(input)
                .with_context(|| format!("failed reading facilities: {}", input.display()))?;
            let facilities: FacilitySet = serde_json::from_str(&data)
                .with_context(|| format!("invalid facility JSON: {}", input.display()))?;
            facilities.validate()?;
            let origin = Coordinate::new(lat.unwrap_or_default(), lng.unwrap_or_default())?;
            let analysis = score_facility_set(&standard, origin, &facilities);
            print_analysis(&analysis, cli.output)?;
        }
        Commands::Classify { category, distance } => {
            let category = FacilityCategory::from_str(category)?;
            if !distance.is_finite() || *distance < 0.0 {
                return Err(anyhow!("distance must be a non-negative number"));
            }
            let tier = classify(&standard, category, *distance);
            match cli.output {
                OutputFormat::Json => {
                    let payload = serde_json::json!({
                        "category": category,
                        "distance_m": distance,
                        "tier": tier,
                        "label": tier.label(),
                        "color": tier.color(),
                    });
                    println!("{}", render_json(&payload)?);
                }
                _ => println!("{category} at {distance}m: {tier}"),
            }
        }
        Commands::Improve { lat, lng, top } => {
            let origin = Coordinate::new(*lat, *lng)?;
            let provider = provider_from_config(&config.provider)?;
            let analysis = analyze_site(provider.as_ref(), &standard, origin).await?;
            let improvements = build_improvements(&standard, &analysis.score, (*top).max(1));
            match cli.output {
                OutputFormat::Table => {
                    println!("{}", render_score_table(&analysis.score));
                    println!("{}", render_improvements_table(&improvements));
                }
                OutputFormat::Json => println!("{}", render_json(&improvements)?),
                OutputFormat::Csv => {
                    warn!("CSV output for improve not implemented, using JSON");
                    println!("{}", render_json(&improvements)?);
                }
            }
        }
        Commands::Config { .. } => {}
        Commands::Serve { .. } => unreachable!("serve command handled before dispatch"),
    }

    Ok(())
}

fn handle_config_command(command: &Commands, config: &Config, config_path: &Path) -> Result<()> {
    let Commands::Config { init, show } = command else {
        return Ok(());
    };
    if *init {
        Config::write_template(config_path)?;
        println!("Wrote config template to {}", config_path.display());
    }
    if *show || !*init {
        println!("{}", render_json(config)?);
    }
    Ok(())
}

fn print_analysis(analysis: &SiteAnalysis, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            println!("{}", render_statistics_table(&analysis.statistics));
            println!("{}", render_score_table(&analysis.score));
            println!();
            for sentence in &analysis.summary {
                println!("{sentence}");
            }
        }
        OutputFormat::Json => println!("{}", render_json(analysis)?),
        OutputFormat::Csv => {
            println!("{}", statistics_to_csv(&analysis.statistics)?);
            println!("{}", score_to_csv(&analysis.score)?);
        }
    }
    Ok(())
}
