//! Render one viewport from tile fixtures to an SVG file.

use crate::source::DirectoryTileSource;
use crate::svg::SvgSurface;
use clap::Args;
use slipmap::cache::LruTileCache;
use slipmap::camera::{Camera, CameraOptions, ScreenDimensions, SharedCamera};
use slipmap::scheduler::{SchedulerConfig, TileScheduler};
use slipmap::style::{StyleDocument, StyleEngine};
use slipmap::surface::OutputSurface;
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Style document (JSON)
    #[arg(long)]
    pub style: PathBuf,

    /// Tile fixture directory laid out as {z}/{x}/{y}.json
    #[arg(long)]
    pub tiles: PathBuf,

    /// Source name the fixtures serve (defaults to the first source in the
    /// style document)
    #[arg(long)]
    pub source: Option<String>,

    /// Longitude in decimal degrees
    #[arg(long)]
    pub lon: f64,

    /// Latitude in decimal degrees
    #[arg(long)]
    pub lat: f64,

    /// Zoom level
    #[arg(long, default_value = "10")]
    pub zoom: f64,

    /// Viewport width in pixels
    #[arg(long, default_value = "1024")]
    pub width: f64,

    /// Viewport height in pixels
    #[arg(long, default_value = "768")]
    pub height: f64,

    /// Output SVG path
    #[arg(long, short)]
    pub output: PathBuf,
}

pub async fn run(args: RenderArgs) -> Result<(), Box<dyn Error>> {
    let style_json = tokio::fs::read_to_string(&args.style).await?;
    let document: StyleDocument = serde_json::from_str(&style_json)?;

    let source_name = match args.source.clone() {
        Some(name) => name,
        None => document
            .sources
            .keys()
            .next()
            .cloned()
            .ok_or("style document declares no sources; pass --source")?,
    };

    let engine = Arc::new(StyleEngine::new(document));
    let layer_order: Vec<String> = engine.layer_names().iter().map(|s| s.to_string()).collect();

    let camera = SharedCamera::new(Camera::new(CameraOptions {
        longitude: args.lon,
        latitude: args.lat,
        zoom: args.zoom,
        screen: ScreenDimensions {
            width: args.width,
            height: args.height,
        },
        ..Default::default()
    }));
    let snapshot = camera.snapshot();

    let surface = Arc::new(SvgSurface::new(layer_order, snapshot.zoom()));
    surface.set_view_box(snapshot.view_box());
    surface.set_background(engine.background());

    let source = Arc::new(DirectoryTileSource::new(source_name, args.tiles));
    let scheduler = TileScheduler::new(
        SchedulerConfig::default(),
        Arc::new(LruTileCache::default()),
    );

    // One background cycle materializes and attaches the wanted grid; no
    // loops are needed for a single still frame.
    let (mut worker, _) = scheduler.workers(camera, source, engine, surface.clone());
    worker.run_cycle().await;

    let stats = scheduler.stats().snapshot();
    info!(
        tiles = stats.tiles_attached,
        failed = stats.tiles_failed,
        "rendered viewport"
    );

    tokio::fs::write(&args.output, surface.to_svg()).await?;
    println!("Wrote {}", args.output.display());
    Ok(())
}
