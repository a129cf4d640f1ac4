//! Turn generated grids into images.

use anyhow::{Context, Result};
use image::RgbImage;
use procgen::{Grid, Rgb};

/// Greyscale image of a height-like grid (black at 0, white at 1).
pub fn height_image(grid: &Grid<f32>) -> Result<RgbImage> {
    to_image(grid.size(), grid.as_slice().iter().map(|&h| Rgb::grey(h)))
}

/// RGB image of a colour map.
pub fn colour_image(grid: &Grid<Rgb>) -> Result<RgbImage> {
    to_image(grid.size(), grid.as_slice().iter().copied())
}

fn to_image(size: usize, colours: impl Iterator<Item = Rgb>) -> Result<RgbImage> {
    let pixels: Vec<[u8; 3]> = colours.map(Rgb::to_u8).collect();
    let side = u32::try_from(size).context("map too large for an image")?;
    RgbImage::from_raw(side, side, bytemuck::cast_slice(&pixels).to_vec())
        .context("pixel buffer does not match image dimensions")
}
