//! Lumen CLI
//!
//! Runs the demo scene headlessly against a recording surface and reports
//! what each frame drew.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lumen_core::{RecordingSurface, RenderConfig, SurfaceId};
use lumen_layout::NodeLifecycle;
use lumen_paint::Scene;

mod scenes;

use scenes::DemoScene;

#[derive(Parser)]
#[command(name = "lumen")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run the Lumen demo scene", long_about = None)]
struct Cli {
    /// Number of frames to render
    #[arg(short, long, default_value = "60")]
    frames: u32,

    /// Render configuration (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the drawing commands of the last frame as JSON
    #[arg(long)]
    dump: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let config = match &cli.config {
        Some(path) => RenderConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => RenderConfig::default(),
    };

    run(&cli, config)
}

fn run(cli: &Cli, config: RenderConfig) -> Result<()> {
    let surface = RecordingSurface::new(config.viewport.size());
    let mut scene = Scene::new(SurfaceId(0), surface, config);
    let mut demo = DemoScene::new()?;

    let root = scene.mount_root("root", &demo.element())?;
    info!("Mounted demo scene with {} nodes", scene.tree().len());

    for _ in 0..cli.frames {
        demo.advance();
        scene.update(root, &demo.element())?;

        scene.surface_mut().clear();
        let stats = scene.frame()?;
        let (x, y) = demo.pointer();
        debug!(
            "Frame {}: pointer ({:.0}, {:.0}), {} nodes painted, {} hidden, {} draw calls",
            scene.frame_count(),
            x,
            y,
            stats.paint.nodes_painted,
            stats.paint.nodes_hidden,
            stats.paint.draw_calls
        );
    }

    info!(
        "Rendered {} frames, last frame issued {} draw calls",
        scene.frame_count(),
        scene.surface().draw_count()
    );

    if cli.dump {
        let json = serde_json::to_string_pretty(scene.surface().commands())?;
        println!("{}", json);
    }

    Ok(())
}
