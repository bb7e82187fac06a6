use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tone_matrix::{FilterKind, FilterParameters};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use walltone::models::{AppConfig, GeometricTransform, Surface, Vector2, WallpaperTarget};
use walltone::services::{
    cancel_pair, CommitOutcome, CommitPipeline, CommitRequest, DirectorySurface, FilterStore,
};

#[derive(Parser)]
#[command(name = "walltone")]
#[command(about = "Walltone - apply color-filtered wallpapers")]
struct Cli {
    /// Config file (overrides CONFIG_FILE)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, filter and apply a wallpaper
    Set {
        /// Wallpaper id from the configured catalog
        #[arg(long, conflicts_with = "url", required_unless_present = "url")]
        id: Option<String>,

        /// Image URL to fetch directly
        #[arg(long)]
        url: Option<String>,

        /// Surface to set: home, lock or both
        #[arg(short, long, default_value = "home")]
        target: WallpaperTarget,

        /// Directory standing in for the wallpaper surface
        #[arg(short, long)]
        out: PathBuf,

        /// Filter adjustment as kind=value (repeatable, e.g. sepia=0.6)
        #[arg(short, long = "filter", value_parser = parse_filter)]
        filters: Vec<(FilterKind, f32)>,

        /// Home screen zoom
        #[arg(long, default_value_t = 1.0)]
        home_scale: f32,

        /// Home screen pan as x,y in UI units
        #[arg(long, default_value = "0,0", allow_hyphen_values = true)]
        home_offset: Vector2,

        /// Lock screen zoom
        #[arg(long, default_value_t = 1.0)]
        lock_scale: f32,

        /// Lock screen pan as x,y in UI units
        #[arg(long, default_value = "0,0", allow_hyphen_values = true)]
        lock_offset: Vector2,
    },
    /// Print the color matrix for a set of filters
    Matrix {
        /// Filter adjustment as kind=value (repeatable)
        #[arg(short, long = "filter", value_parser = parse_filter)]
        filters: Vec<(FilterKind, f32)>,
    },
    /// List the configured wallpaper catalog
    Catalog,
}

fn parse_filter(s: &str) -> Result<(FilterKind, f32), String> {
    let (kind, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected kind=value, got '{s}'"))?;
    let kind: FilterKind = kind.parse().map_err(|e| format!("{e}"))?;
    let value: f32 = value
        .trim()
        .parse()
        .map_err(|e| format!("bad value in '{s}': {e}"))?;
    Ok((kind, value))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Set {
            id,
            url,
            target,
            out,
            filters,
            home_scale,
            home_offset,
            lock_scale,
            lock_offset,
        }) => {
            init_tracing();
            let config = load_config(cli.config);
            let image_url = match (id.as_deref(), url) {
                (_, Some(url)) => url,
                (Some(id), None) => config
                    .get_wallpaper(id)
                    .map(|w| w.image_url.clone())
                    .ok_or_else(|| anyhow::anyhow!("No wallpaper with id '{id}' in catalog"))?,
                (None, None) => anyhow::bail!("Either --id or --url is required"),
            };
            let session_key = id.unwrap_or_else(|| image_url.clone());

            // catalog defaults first, command-line filters on top
            let store = FilterStore::new();
            store.seed(&config.wallpapers).await;
            for (kind, value) in filters {
                store.adjust(&session_key, kind, value).await;
            }

            let request = CommitRequest::new(image_url, target)
                .with_filters(store.get(&session_key).await)
                .with_transform(Surface::Home, GeometricTransform::new(home_scale, home_offset))
                .with_transform(Surface::Lock, GeometricTransform::new(lock_scale, lock_offset));

            run_set_command(config, request, out).await
        }
        Some(Commands::Matrix { filters }) => {
            run_matrix_command(filters).await;
            Ok(())
        }
        Some(Commands::Catalog) => {
            init_tracing();
            run_catalog_command(&load_config(cli.config));
            Ok(())
        }
        None => {
            run_status_command(cli.config);
            Ok(())
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "walltone=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn config_path(flag: Option<PathBuf>) -> Option<PathBuf> {
    flag.or_else(|| std::env::var("CONFIG_FILE").ok().map(PathBuf::from))
}

fn load_config(flag: Option<PathBuf>) -> AppConfig {
    AppConfig::load(config_path(flag).as_deref())
}

/// Run the pipeline against a directory surface; Ctrl-C cancels
async fn run_set_command(
    config: AppConfig,
    request: CommitRequest,
    out: PathBuf,
) -> anyhow::Result<()> {
    let surface = Arc::new(DirectorySurface::new(&out));
    let pipeline = CommitPipeline::with_http(config.pipeline, surface)?;

    let (canceller, token) = cancel_pair();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, cancelling commit");
            canceller.cancel();
        }
    });

    let result = pipeline.commit(&request, &token).await;

    match CommitOutcome::of(&result) {
        CommitOutcome::Committed => println!("Wallpaper set ({})", request.target),
        CommitOutcome::PendingUserAction => {
            println!("Handed to picker; see {}", out.join("picker.log").display())
        }
        CommitOutcome::Cancelled => println!("Cancelled"),
        CommitOutcome::Failed => {}
    }

    match result {
        Ok(report) => {
            for s in &report.surfaces {
                println!("  {:<5} {:?}", s.surface.name(), s.status);
            }
            Ok(())
        }
        Err(walltone::error::CommitError::Cancelled) => Ok(()),
        Err(e) => {
            for s in e.surfaces() {
                println!("  {:<5} {:?} {}", s.surface.name(), s.status, s.errors.join("; "));
            }
            Err(e.into())
        }
    }
}

/// Print the matrix that a set of filters produces
async fn run_matrix_command(filters: Vec<(FilterKind, f32)>) {
    let store = FilterStore::new();
    store
        .update("cli", FilterParameters::from_pairs(filters))
        .await;

    let params = store.get("cli").await;
    let matrix = store.matrix_for("cli").await;

    for kind in FilterKind::ALL {
        println!("  {:<16} {}", kind.name(), params.get(kind));
    }
    println!();
    for (label, row) in ["R", "G", "B", "A"].iter().zip(matrix.rows()) {
        println!(
            "  {label}  {:>9.4} {:>9.4} {:>9.4} {:>9.4} {:>9.3}",
            row[0], row[1], row[2], row[3], row[4]
        );
    }
}

fn run_catalog_command(config: &AppConfig) {
    if config.wallpapers.is_empty() {
        println!("No wallpapers configured.");
        return;
    }

    for w in &config.wallpapers {
        let size = w
            .dimensions_hint()
            .map(|(width, height)| format!("{width}x{height}"))
            .unwrap_or_else(|| "?".to_string());
        println!("  {:<16} {:<24} {:<10} {}", w.id, w.title, size, w.image_url);
        if !w.filters.is_empty() {
            let filters: Vec<String> =
                w.filters.0.iter().map(|(k, v)| format!("{k}={v}")).collect();
            println!("  {:<16} filters: {}", "", filters.join(", "));
        }
    }
}

/// Display status and configuration information
fn run_status_command(flag: Option<PathBuf>) {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    let config_file = std::env::var("CONFIG_FILE").ok();
    let rust_log = std::env::var("RUST_LOG").ok();

    println!("Walltone v{VERSION}");
    println!("Color-filtered wallpaper pipeline\n");

    println!("Environment Variables:");
    println!(
        "  CONFIG_FILE = {}",
        config_file.as_deref().unwrap_or("(not set)")
    );
    println!(
        "  RUST_LOG    = {}",
        rust_log.as_deref().unwrap_or("walltone=info (default)")
    );

    println!("\nConfiguration:");
    let path = config_path(flag);
    let source = match &path {
        Some(p) if p.exists() => p.display().to_string(),
        Some(_) => "defaults (file not found)".to_string(),
        None => "defaults".to_string(),
    };
    let config = AppConfig::load(path.as_deref());
    println!("  Source:     {source}");
    println!("  Wallpapers: {}", config.wallpapers.len());
    println!("  Cache dir:  {}", config.pipeline.cache_dir().display());
    println!("  Max size:   {}px", config.pipeline.max_dimension);

    println!("\nCommands:");
    println!("  walltone set       Fetch, filter and apply a wallpaper");
    println!("  walltone matrix    Print the color matrix for filters");
    println!("  walltone catalog   List configured wallpapers");
    println!("\nRun 'walltone --help' for more details.");
}
