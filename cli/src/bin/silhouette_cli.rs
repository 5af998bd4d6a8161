use clap::{Parser, Subcommand};
use cli::RankerConfig;
use color_eyre::eyre::{Result, eyre};
use serde_json::json;
use silhouette::{BinaryMask, Metric, ObjectRef, RankingEngine, RankingResult};
use std::fs;
use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;
use tracing::info;
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available similarity metrics
    Metrics,
    /// Find the reference silhouette most similar to a mask
    Rank {
        /// Path to the TOML or JSON ranker configuration
        #[arg(short, long)]
        config: PathBuf,
        /// Mask image, or a JSON array of 0/1 rows
        #[arg(short, long)]
        mask: PathBuf,
        /// Reference category to compare against
        #[arg(long)]
        category: String,
        /// Metric name (every metric if omitted)
        #[arg(long)]
        metric: Option<String>,
        /// Object id within the source image
        #[arg(long, default_value = "0")]
        object_id: u32,
        /// Source image file name used for the silhouette URL (defaults to the mask file name)
        #[arg(long)]
        image_file_name: Option<String>,
        /// Grey levels above this are foreground when loading a mask image
        #[arg(long, default_value = "127")]
        threshold: u8,
        /// Also print every reference score for the chosen metric
        #[arg(long)]
        scores: bool,
    },
    /// Print the JSON schema of a ranking result
    Schema,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Metrics => list_metrics(),
        Commands::Rank {
            config,
            mask,
            category,
            metric,
            object_id,
            image_file_name,
            threshold,
            scores,
        } => {
            let config = RankerConfig::from_file(config)?;
            info!(categories = config.categories.len(), "loaded ranker configuration");
            let engine = config.build_engine()?;

            let query = load_mask(mask, *threshold)?;
            let file_name = match image_file_name {
                Some(name) => name.clone(),
                None => mask
                    .file_name()
                    .and_then(|name| name.to_str())
                    .map(str::to_string)
                    .ok_or_else(|| eyre!("Cannot derive an image file name from {}", mask.display()))?,
            };
            let object = ObjectRef::new(file_name, *object_id);

            match metric {
                Some(name) => rank_one(&engine, &query, category, &object, name, *scores)?,
                None => {
                    let results = engine.rank_all(&query, category, &object)?;
                    println!("{}", serde_json::to_string_pretty(&results)?);
                }
            }
        }
        Commands::Schema => {
            println!("{}", serde_json::to_string_pretty(&RankingResult::schema())?);
        }
    }

    Ok(())
}

fn list_metrics() {
    for metric in Metric::iter() {
        println!("{:<10} {:<10} {}", metric.name(), metric.range(), metric.description());
    }
}

fn load_mask(path: &Path, threshold: u8) -> Result<BinaryMask> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let mask = if is_json {
        BinaryMask::from_json(&fs::read_to_string(path)?)?
    } else {
        BinaryMask::open(path, threshold)?
    };
    info!(path = %path.display(), shape = %mask.shape(), "loaded query mask");
    Ok(mask)
}

fn rank_one(
    engine: &RankingEngine,
    query: &BinaryMask,
    category: &str,
    object: &ObjectRef,
    metric_name: &str,
    with_scores: bool,
) -> Result<()> {
    let metric = Metric::parse(metric_name)?;
    let result = engine.rank(query, category, object, metric)?;
    if with_scores {
        let table = engine.score_table(query, category, metric.as_metric())?;
        let output = json!({ "result": result, "scores": table });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }
    Ok(())
}
