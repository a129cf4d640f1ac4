//! Islands: generate one island tile from `config.ron` and write it as a PNG.
//!
//! Usage: `islands [config.ron]`

mod config;
mod texture;

use anyhow::{Context, Result};
use procgen::{FalloffMask, IVec2, MapGenerator};
use std::path::PathBuf;

use config::{DrawMode, IslandsConfig};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(config::default_path);
    let mut config = IslandsConfig::load(&path);
    config.sanitize();

    let seed = config.seed.unwrap_or_else(rand::random);
    log::info!(
        "Generating {0}x{0} island (seed {1}, {2:?})",
        config.size,
        seed,
        config.draw_mode
    );

    let image = match config.draw_mode {
        DrawMode::FalloffMap => {
            let mask = FalloffMask::new(config.size, config.falloff_shape())
                .context("invalid falloff settings")?;
            texture::height_image(&mask.generate())?
        }
        mode => {
            let regions = config.region_table().context("invalid terrain regions")?;
            let generator = MapGenerator::new(&config.map_settings(seed), regions)
                .context("invalid map settings")?;
            let position = IVec2::new(config.position.0, config.position.1);
            let map = generator.generate(position)?;
            if mode == DrawMode::NoiseMap {
                texture::height_image(&map.heights)?
            } else {
                texture::colour_image(&map.colors)?
            }
        }
    };

    image
        .save(&config.output)
        .with_context(|| format!("could not write {}", config.output.display()))?;
    log::info!("Wrote {}", config.output.display());

    Ok(())
}
