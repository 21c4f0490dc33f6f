//! Billboard readability CLI
//!
//! Analyzes creatives against a site and scores candidate sites. Results are
//! printed as JSON on stdout; logs go to stderr.

mod config;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use billboard_analysis::{
    ai::OpenAIVisionAnalyzer, rank_locations, score_location, AnalysisConfig, AnalysisContext,
    AnalysisRequest, BillboardAnalyzer, BillboardCatalog, BillboardLocation, ImageUpload,
};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vision_client::VisionClient;

use crate::config::Config;

/// Slack on the HTTP client beyond the per-call deadline.
const HTTP_TIMEOUT_SLACK_SECS: u64 = 5;

#[derive(Parser)]
#[command(name = "billboard")]
#[command(about = "Billboard creative readability analysis and site scoring")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a creative for a site
    Analyze {
        /// Image file (PNG, JPEG, WebP or GIF)
        image: PathBuf,

        /// Catalog id or free-text location
        #[arg(long)]
        location: String,

        /// Viewing distance override in meters
        #[arg(long)]
        distance: Option<f64>,
    },

    /// Show legibility thresholds for a site
    Thresholds {
        /// Catalog id or free-text location
        location: String,

        #[arg(long)]
        distance: Option<f64>,
    },

    /// Score one catalog site
    Score { id: String },

    /// Rank catalog sites, best first
    Rank {
        #[arg(long)]
        district: Option<String>,

        #[arg(long)]
        road: Option<String>,

        #[arg(long)]
        limit: Option<usize>,
    },

    /// List the site catalog
    Catalog,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ThresholdsResponse<'a> {
    location: &'a str,
    viewing_distance_m: f64,
    speed_kmh: f64,
    road_category: &'static str,
    thresholds: billboard_analysis::GeometryThresholds,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn context_for(location: &str, distance: Option<f64>) -> AnalysisContext {
    match BillboardCatalog::lookup(location) {
        Ok(site) => AnalysisContext::from_location(site, distance),
        Err(_) => AnalysisContext::defaults(location, distance),
    }
}

fn build_analyzer(config: &Config) -> Result<BillboardAnalyzer<OpenAIVisionAnalyzer>> {
    let mut client = VisionClient::new(config.require_api_key()?).with_timeout(
        Duration::from_secs(config.analysis_timeout_secs + HTTP_TIMEOUT_SLACK_SECS),
    )?;
    if let Some(url) = &config.openai_base_url {
        client = client.with_base_url(url);
    }

    let vision = OpenAIVisionAnalyzer::new(client).with_model(&config.vision_model);
    let analysis_config = AnalysisConfig::default()
        .with_max_retries(config.analysis_max_retries)
        .with_call_timeout_secs(config.analysis_timeout_secs);

    Ok(BillboardAnalyzer::new(vision).with_config(analysis_config))
}

async fn analyze(
    config: &Config,
    image: PathBuf,
    location: String,
    distance: Option<f64>,
) -> Result<()> {
    let analyzer = build_analyzer(config)?;

    let bytes = tokio::fs::read(&image)
        .await
        .with_context(|| format!("Failed to read image {}", image.display()))?;
    let file_name = image
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| image.display().to_string());

    let mut request = AnalysisRequest::new(ImageUpload::new(file_name, bytes), location);
    if let Some(d) = distance {
        request = request.with_distance(d);
    }

    let result = analyzer.analyze_billboard(&request).await;
    print_json(&result)
}

fn rank(district: Option<String>, road: Option<String>, limit: Option<usize>) -> Result<()> {
    let sites: Vec<&BillboardLocation> = match (&district, &road) {
        (Some(d), _) => BillboardCatalog::in_district(d),
        (None, Some(r)) => BillboardCatalog::on_road(r),
        (None, None) => BillboardCatalog::all().iter().collect(),
    };
    let sites = sites
        .into_iter()
        .filter(|s| road.as_deref().map_or(true, |r| s.road.eq_ignore_ascii_case(r)));

    let mut ranked = rank_locations(sites);
    if let Some(limit) = limit {
        ranked.truncate(limit);
    }
    print_json(&ranked)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,billboard_analysis=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    match cli.command {
        Commands::Analyze {
            image,
            location,
            distance,
        } => analyze(&config, image, location, distance).await,

        Commands::Thresholds { location, distance } => {
            let ctx = context_for(&location, distance);
            print_json(&ThresholdsResponse {
                location: &ctx.location_label,
                viewing_distance_m: ctx.viewing_distance_m,
                speed_kmh: ctx.speed.kmh,
                road_category: ctx.speed.road_category.label(),
                thresholds: ctx.thresholds(),
            })
        }

        Commands::Score { id } => {
            let site = BillboardCatalog::lookup(&id)?;
            tracing::debug!(id = %site.id, "Scoring site");
            print_json(&score_location(site))
        }

        Commands::Rank {
            district,
            road,
            limit,
        } => rank(district, road, limit),

        Commands::Catalog => print_json(&BillboardCatalog::all()),
    }
}
