//! `codefall`: falling code keywords.
//!
//! Opens a window with the animation by default. `--headless` runs a fixed
//! number of ticks instead and can dump the last frame and a state snapshot.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use codefall_engine::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "codefall", version, about = "Falling code keywords bouncing off control blocks")]
struct Args {
    /// JSON scene config; missing fields take their defaults.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for layout and spawn choices.
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    width: Option<f64>,
    #[arg(long)]
    height: Option<f64>,
    /// Run without a window.
    #[arg(long)]
    headless: bool,
    /// Ticks to simulate in headless mode.
    #[arg(long, default_value_t = 600)]
    ticks: u64,
    /// Write the final headless frame as PNG.
    #[arg(long)]
    dump_frame: Option<PathBuf>,
    /// Write the final headless snapshot as JSON.
    #[arg(long)]
    dump_snapshot: Option<PathBuf>,
    /// Log at info level unless RUST_LOG says otherwise.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = load_config(&args)?;
    let scene = Scene::new(config).context("failed to build scene")?;

    if args.headless {
        run_headless(scene, &args)
    } else {
        run_window(scene, &args)
    }
}

#[cfg(feature = "renderer")]
fn run_window(scene: Scene, _args: &Args) -> anyhow::Result<()> {
    codefall_engine::render::run_windowed(scene, "codefall")
}

#[cfg(not(feature = "renderer"))]
fn run_window(scene: Scene, args: &Args) -> anyhow::Result<()> {
    tracing::warn!("built without the renderer feature, running headless");
    run_headless(scene, args)
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

fn load_config(args: &Args) -> anyhow::Result<SceneConfig> {
    let mut config = match &args.config {
        Some(path) => SceneConfig::load(path)?,
        None => SceneConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    config.validate()?;
    Ok(config)
}

fn run_headless(mut scene: Scene, args: &Args) -> anyhow::Result<()> {
    let spawned = scene.run_ticks(args.ticks);
    tracing::info!(
        ticks = scene.tick_count(),
        seed = scene.seed(),
        spawned,
        culled = scene.culled_total(),
        controls = scene.control_count(),
        variables = scene.variable_count(),
        "headless run finished"
    );

    if let Some(path) = &args.dump_frame {
        let mut canvas = scene.new_canvas();
        scene.render(&mut canvas);
        canvas.save_png(path)?;
        tracing::info!(path = %path.display(), "frame dumped");
    }

    if let Some(path) = &args.dump_snapshot {
        let json = scene.snapshot()?.to_json()?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write snapshot to {}", path.display()))?;
        tracing::info!(path = %path.display(), "snapshot dumped");
    }

    let summary = serde_json::json!({
        "seed": scene.seed(),
        "ticks": scene.tick_count(),
        "spawned": scene.spawned_total(),
        "culled": scene.culled_total(),
        "bodies": scene.body_count(),
    });
    println!("{summary}");
    Ok(())
}
