//! Print the wanted tile set for a camera position.

use clap::Args;
use slipmap::camera::{Camera, CameraOptions};
use slipmap::coord::wanted_tiles;
use std::error::Error;

#[derive(Debug, Args)]
pub struct TilesArgs {
    /// Longitude in decimal degrees
    #[arg(long)]
    pub lon: f64,

    /// Latitude in decimal degrees
    #[arg(long)]
    pub lat: f64,

    /// Zoom level
    #[arg(long, default_value = "10")]
    pub zoom: f64,

    /// Print the minimal viewport cover instead of the 3x3 prefetch grid
    #[arg(long)]
    pub minimal: bool,
}

pub fn run(args: &TilesArgs) -> Result<(), Box<dyn Error>> {
    let camera = Camera::new(CameraOptions {
        longitude: args.lon,
        latitude: args.lat,
        zoom: args.zoom,
        ..Default::default()
    });

    let tiles = wanted_tiles(camera.x(), camera.y(), camera.z(), !args.minimal);
    println!(
        "camera x={:.4} y={:.4} z={}",
        camera.x(),
        camera.y(),
        camera.z()
    );
    for tile in tiles {
        println!("{tile}");
    }
    Ok(())
}
