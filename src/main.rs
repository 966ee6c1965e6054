use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ditter::models::{AppConfig, Catalog, CONFIG_ENV};
use ditter::rendering::{read_png, write_png};
use ditter::services::{capability, Completion, Coordinator, FileWatcher, Runner};
use ditter_core::registry::{algorithms, algorithms_in};
use ditter_core::{AlgorithmSelector, Category, PaletteSpec, PixelBuffer, ProcessingParams};

#[derive(Parser)]
#[command(name = "ditter")]
#[command(about = "Ditter - dither images with error diffusion, ordered and pattern algorithms")]
struct Cli {
    /// Config file (defaults to $DITTER_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Overrides applied on top of the params file or config defaults.
#[derive(clap::Args, Debug, Default)]
struct ParamOverrides {
    /// Algorithm category (error-diffusion, ordered, halftone, ...)
    #[arg(short, long)]
    category: Option<Category>,

    /// Algorithm id within the category (see `ditter list`)
    #[arg(short, long)]
    algorithm: Option<String>,

    /// Built-in palette name, or comma-separated hex colors ("#000,#fff")
    #[arg(short, long)]
    palette: Option<String>,

    /// Levels per channel when no palette is set
    #[arg(short, long)]
    levels: Option<u32>,

    /// Seed for noise-based algorithms
    #[arg(long)]
    seed: Option<u32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Dither a PNG file
    Render {
        /// Input PNG file
        #[arg(short, long)]
        input: PathBuf,

        /// Output PNG file
        #[arg(short, long)]
        output: PathBuf,

        /// YAML or JSON processing parameters
        #[arg(long)]
        params: Option<PathBuf>,

        #[command(flatten)]
        overrides: ParamOverrides,

        /// Never use the GPU
        #[arg(long)]
        cpu_only: bool,
    },
    /// List algorithms and palettes
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Re-render whenever the params file changes
    Watch {
        /// Input PNG file
        #[arg(short, long)]
        input: PathBuf,

        /// Output PNG file, rewritten after each render
        #[arg(short, long)]
        output: PathBuf,

        /// YAML or JSON processing parameters to watch
        #[arg(long)]
        params: PathBuf,

        /// Never use the GPU
        #[arg(long)]
        cpu_only: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ditter=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let config = AppConfig::load(cli.config.as_deref());

    match cli.command {
        Some(Commands::Render {
            input,
            output,
            params,
            overrides,
            cpu_only,
        }) => run_render_command(&config, &input, &output, params.as_deref(), &overrides, cpu_only).await,
        Some(Commands::List { json }) => run_list_command(json),
        Some(Commands::Watch {
            input,
            output,
            params,
            cpu_only,
        }) => run_watch_command(&config, &input, &output, &params, cpu_only).await,
        None => run_status_command(&config, cli.config.as_deref()).await,
    }
}

async fn make_runner(config: &AppConfig, cpu_only: bool) -> anyhow::Result<Runner> {
    if cpu_only {
        return Ok(Runner::cpu_only());
    }
    let config = config.clone();
    // The probe blocks on device creation.
    tokio::task::spawn_blocking(move || Runner::from_config(&config))
        .await
        .context("GPU probe task failed")
}

async fn load_source(path: &Path) -> anyhow::Result<PixelBuffer> {
    let path_buf = path.to_path_buf();
    tokio::task::spawn_blocking(move || read_png(&path_buf))
        .await?
        .with_context(|| format!("Failed to read {}", path.display()))
}

async fn save_output(path: &Path, image: PixelBuffer) -> anyhow::Result<()> {
    let path_buf = path.to_path_buf();
    tokio::task::spawn_blocking(move || write_png(&path_buf, &image))
        .await?
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn load_params(path: &Path) -> anyhow::Result<ProcessingParams> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    // YAML is a superset of JSON, so one parser covers both.
    serde_yaml::from_str(&content).with_context(|| format!("Invalid params in {}", path.display()))
}

fn apply_overrides(mut params: ProcessingParams, overrides: &ParamOverrides) -> anyhow::Result<ProcessingParams> {
    match (overrides.category, &overrides.algorithm) {
        (Some(category), Some(id)) => params.algorithm = AlgorithmSelector::builtin(category, id),
        (None, Some(id)) => {
            let entry = algorithms()
                .iter()
                .find(|e| e.id.eq_ignore_ascii_case(id))
                .with_context(|| format!("Unknown algorithm '{id}' (see `ditter list`)"))?;
            params.algorithm = AlgorithmSelector::builtin(entry.category, entry.id);
        }
        (Some(category), None) => {
            let entry = algorithms_in(category)
                .next()
                .with_context(|| format!("No algorithms in category {category}"))?;
            params.algorithm = AlgorithmSelector::builtin(category, entry.id);
        }
        (None, None) => {}
    }

    if let Some(palette) = &overrides.palette {
        params.palette = Some(if palette.contains('#') {
            PaletteSpec::Colors(palette.split(',').map(|c| c.trim().to_string()).collect())
        } else {
            PaletteSpec::Named(palette.clone())
        });
    }
    if let Some(levels) = overrides.levels {
        params.levels = levels;
        if overrides.palette.is_none() {
            params.palette = None;
        }
    }
    if let Some(seed) = overrides.seed {
        params.extras.seed = seed;
    }
    Ok(params)
}

async fn run_render_command(
    config: &AppConfig,
    input: &Path,
    output: &Path,
    params: Option<&Path>,
    overrides: &ParamOverrides,
    cpu_only: bool,
) -> anyhow::Result<()> {
    let base = match params {
        Some(path) => load_params(path)?,
        None => config.defaults.clone(),
    };
    let params = apply_overrides(base, overrides)?;

    let source = load_source(input).await?;
    let runner = make_runner(config, cpu_only).await?;
    let (mut coordinator, mut completions) = Coordinator::spawn(runner);

    coordinator.submit(source, &params)?;
    drop(coordinator);

    let Some(completion) = completions.recv().await else {
        anyhow::bail!("Coordinator stopped without a result");
    };
    let image = completion.result?;
    save_output(output, image).await?;

    println!(
        "Rendered {} -> {} on {} in {} ms",
        input.display(),
        output.display(),
        completion.backend,
        completion.elapsed.as_millis()
    );
    Ok(())
}

async fn run_watch_command(
    config: &AppConfig,
    input: &Path,
    output: &Path,
    params_path: &Path,
    cpu_only: bool,
) -> anyhow::Result<()> {
    let source = Arc::new(load_source(input).await?);
    let runner = make_runner(config, cpu_only).await?;
    let (mut coordinator, mut completions) = Coordinator::spawn(runner);

    let watcher = FileWatcher::new(params_path);
    if !watcher.is_active() {
        anyhow::bail!("Cannot watch {}", params_path.display());
    }
    let mut changes = watcher.subscribe();

    let submit = |coordinator: &mut Coordinator| match load_params(params_path) {
        Ok(params) => {
            if let Err(e) = coordinator.submit(Arc::clone(&source), &params) {
                tracing::warn!(error = %e, "Rejected params");
            }
        }
        Err(e) => tracing::warn!(error = %format!("{e:#}"), "Skipping params update"),
    };
    submit(&mut coordinator);

    println!(
        "Watching {} (Ctrl+C to stop), writing {}",
        params_path.display(),
        output.display()
    );

    loop {
        tokio::select! {
            change = changes.recv() => match change {
                Ok(_) => submit(&mut coordinator),
                Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => submit(&mut coordinator),
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            },
            completion = completions.recv() => match completion {
                Some(completion) => handle_preview(output, completion).await,
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}

async fn handle_preview(output: &Path, completion: Completion) {
    if completion.superseded {
        tracing::debug!(job = completion.id, "Skipping superseded preview");
        return;
    }
    match completion.result {
        Ok(image) => match save_output(output, image).await {
            Ok(()) => println!(
                "Job {} rendered on {} in {} ms",
                completion.id,
                completion.backend,
                completion.elapsed.as_millis()
            ),
            Err(e) => tracing::warn!(error = %format!("{e:#}"), "Failed to write preview"),
        },
        Err(e) => tracing::warn!(job = completion.id, error = %e, "Render failed"),
    }
}

fn run_list_command(json: bool) -> anyhow::Result<()> {
    let catalog = Catalog::build();
    if json {
        println!("{}", serde_json::to_string_pretty(&catalog)?);
        return Ok(());
    }

    for category in &catalog.categories {
        println!("{}:", category.id);
        for algo in &category.algorithms {
            let gpu = if algo.gpu { "  [gpu]" } else { "" };
            println!("  {:<28} {}{gpu}", algo.id, algo.name);
        }
    }
    println!("\nPalettes:");
    for palette in &catalog.palettes {
        let colors: Vec<String> = palette.colors.iter().map(|c| c.to_hex()).collect();
        println!("  {:<14} {:<8} {}", palette.name, palette.category, colors.join(" "));
    }
    Ok(())
}

async fn run_status_command(config: &AppConfig, explicit: Option<&Path>) -> anyhow::Result<()> {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    println!("Ditter v{VERSION}");
    println!("Palette dithering with CPU and GPU engines\n");

    println!("Configuration:");
    let env_value = std::env::var(CONFIG_ENV).ok();
    println!(
        "  {CONFIG_ENV} = {}",
        env_value.as_deref().unwrap_or("(not set)")
    );
    let source = match AppConfig::locate(explicit) {
        Some(path) if path.exists() => path.display().to_string(),
        Some(path) => format!("{} (file not found, using defaults)", path.display()),
        None => "defaults".to_string(),
    };
    println!("  Config: {source}");

    let catalog = Catalog::build();
    println!("\nRegistry:");
    println!("  Algorithms: {}", catalog.algorithm_count());
    println!("  Palettes:   {}", catalog.palettes.len());

    let probe_config = config.clone();
    let status = tokio::task::spawn_blocking(move || capability::status(&probe_config)).await?;
    println!("\nGPU: {status}");

    println!("\nRun 'ditter --help' for available commands.");
    Ok(())
}
