use clap::Parser;
use discfind::io::{load_gray_matrix, response_to_gray_image, save_gray_image};
use discfind::{response_map, Profile, SearchConfig, SearchEngine, SearchObserver, SearchResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "discfind CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ProfileConfig {
    Fhat2d,
    Fhat,
    Mhat,
}

impl From<ProfileConfig> for Profile {
    fn from(value: ProfileConfig) -> Self {
        match value {
            ProfileConfig::Fhat2d => Profile::Fhat2d,
            ProfileConfig::Fhat => Profile::Fhat,
            ProfileConfig::Mhat => Profile::Mhat,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct SearchConfigJson {
    intervals: usize,
    iterations: usize,
    performance_criterion: u32,
    min_matrix_side: usize,
    min_diameter_px: f32,
    kernel_ratio: f32,
    outside_value: i32,
    profile: ProfileConfig,
    parallel: bool,
    threads: usize,
}

impl Default for SearchConfigJson {
    fn default() -> Self {
        let cfg = SearchConfig::default();
        Self {
            intervals: cfg.intervals,
            iterations: cfg.iterations,
            performance_criterion: cfg.performance_criterion,
            min_matrix_side: cfg.min_matrix_side,
            min_diameter_px: cfg.min_diameter_px,
            kernel_ratio: cfg.kernel_ratio,
            outside_value: cfg.outside_value,
            profile: ProfileConfig::Fhat2d,
            parallel: cfg.parallel,
            threads: cfg.threads,
        }
    }
}

impl From<SearchConfigJson> for SearchConfig {
    fn from(value: SearchConfigJson) -> Self {
        SearchConfig {
            intervals: value.intervals,
            iterations: value.iterations,
            performance_criterion: value.performance_criterion,
            min_matrix_side: value.min_matrix_side,
            min_diameter_px: value.min_diameter_px,
            kernel_ratio: value.kernel_ratio,
            outside_value: value.outside_value,
            profile: value.profile.into(),
            parallel: value.parallel,
            threads: value.threads,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    image_path: String,
    output_path: Option<String>,
    /// Grayscale rendering of the winning diameter's response.
    response_map_path: Option<String>,
    search: SearchConfigJson,
}

#[derive(Debug, Serialize)]
struct Output {
    width: usize,
    height: usize,
    center_x: f32,
    center_y: f32,
    diameter: f32,
    relative_diameter: f32,
    response: i32,
}

impl Output {
    fn new(width: usize, height: usize, result: SearchResult) -> Self {
        Self {
            width,
            height,
            center_x: result.center_x,
            center_y: result.center_y,
            diameter: result.diameter,
            relative_diameter: result.relative_diameter,
            response: result.response,
        }
    }
}

struct LogProgress;

impl SearchObserver for LogProgress {
    fn on_progress(&self, percent: u8) {
        tracing::info!(percent, "search progress");
    }

    fn on_finished(&self, result: &SearchResult) {
        tracing::info!(
            diameter = result.diameter,
            center_x = result.center_x,
            center_y = result.center_y,
            "search finished"
        );
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("discfind=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.image_path.is_empty() {
        return Err("image_path must be set in the config".into());
    }

    let matrix = Arc::new(load_gray_matrix(&config.image_path)?);
    let search_cfg = SearchConfig::from(config.search);
    let engine = SearchEngine::new(search_cfg)?.with_observer(Arc::new(LogProgress));
    let result = engine.start_search(Arc::clone(&matrix))?.wait()?;

    if let Some(path) = &config.response_map_path {
        if let Some(map) = response_map(&matrix, result.relative_diameter, &search_cfg)? {
            save_gray_image(&response_to_gray_image(&map.response)?, path)?;
        }
    }

    let output = Output::new(matrix.width(), matrix.height(), result);
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
