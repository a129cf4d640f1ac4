//! Height and colour generation for one square terrain tile.
//!
//! **Tile continuity:** cell `(x, y)` of the tile at `position` samples noise at
//! `((x + position.x) / scale, (y − position.y) / scale)`. The y offset is
//! subtracted on purpose so neighbouring tiles line up.

use glam::IVec2;

use crate::color::Rgb;
use crate::error::{ProcgenError, Result};
use crate::grid::{ensure_positive_size, ensure_size, Grid};
use crate::noise::NoiseField;

/// One terrain class: everything at or above `min_height` (up to the next
/// region) gets `color`.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainType {
    pub name: String,
    pub min_height: f32,
    pub color: Rgb,
}

impl TerrainType {
    pub fn new(name: impl Into<String>, min_height: f32, color: Rgb) -> Self {
        Self {
            name: name.into(),
            min_height,
            color,
        }
    }
}

/// Terrain types sorted by ascending `min_height`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionTable {
    regions: Vec<TerrainType>,
}

impl RegionTable {
    /// Validate ordering up front so classification never depends on how the
    /// caller happened to list the regions.
    pub fn new(regions: Vec<TerrainType>) -> Result<Self> {
        for (index, region) in regions.iter().enumerate() {
            if !region.min_height.is_finite() {
                return Err(ProcgenError::config(
                    "terrain region",
                    format!("'{}' has non-finite min height", region.name),
                ));
            }
            if index > 0 && region.min_height < regions[index - 1].min_height {
                return Err(ProcgenError::UnsortedRegions { index });
            }
        }
        Ok(Self { regions })
    }

    pub fn regions(&self) -> &[TerrainType] {
        &self.regions
    }

    /// The last region whose threshold `height` meets, if any.
    pub fn classify(&self, height: f32) -> Option<&TerrainType> {
        let matched = self.regions.partition_point(|r| r.min_height <= height);
        matched.checked_sub(1).map(|i| &self.regions[i])
    }

    /// Colour for `height`, or black when no region claims it.
    pub fn color_for(&self, height: f32) -> Rgb {
        self.classify(height).map_or(Rgb::BLACK, |r| r.color)
    }
}

/// Output of one generation pass. Both grids share the same size.
#[derive(Debug, Clone)]
pub struct MapData {
    pub heights: Grid<f32>,
    pub colors: Grid<Rgb>,
}

impl MapData {
    pub fn size(&self) -> usize {
        self.heights.size()
    }
}

/// Generates height and colour grids for `size × size` tiles.
#[derive(Debug, Clone)]
pub struct TerrainGenerator {
    size: usize,
    noise: NoiseField,
    noise_scale: f32,
    regions: RegionTable,
    falloff: Option<Grid<f32>>,
}

impl TerrainGenerator {
    pub fn new(size: usize, noise: NoiseField, noise_scale: f32, regions: RegionTable) -> Result<Self> {
        ensure_positive_size(size)?;
        if !(noise_scale.is_finite() && noise_scale > 0.0) {
            return Err(ProcgenError::config(
                "noise scale",
                format!("{} must be finite and > 0", noise_scale),
            ));
        }
        Ok(Self {
            size,
            noise,
            noise_scale,
            regions,
            falloff: None,
        })
    }

    /// Attach a precomputed falloff grid. It must match the tile size.
    pub fn set_falloff(&mut self, falloff: Grid<f32>) -> Result<()> {
        ensure_size(&falloff, self.size)?;
        self.falloff = Some(falloff);
        Ok(())
    }

    pub fn falloff(&self) -> Option<&Grid<f32>> {
        self.falloff.as_ref()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn regions(&self) -> &RegionTable {
        &self.regions
    }

    /// Normalized `[0, 1]`-ish height at cell `(x, y)` of the tile at `position`,
    /// before any falloff.
    ///
    /// Any `i32` offset is accepted. The cell coordinate is summed in `f64`, so
    /// tiles at the ends of the range sample distant noise instead of overflowing.
    pub fn raw_height(&self, position: IVec2, x: usize, y: usize) -> f32 {
        let sx = (x as f64 + f64::from(position.x)) as f32 / self.noise_scale;
        let sy = (y as f64 - f64::from(position.y)) as f32 / self.noise_scale;
        (self.noise.sample(sx, sy) + 1.0) / 2.0
    }

    /// Generate the tile at `position`.
    ///
    /// With `use_falloff`, each height has the falloff value subtracted and is
    /// clamped to `[0, 1]`.
    pub fn generate(&self, position: IVec2, use_falloff: bool) -> Result<MapData> {
        let falloff = if use_falloff {
            let falloff = self.falloff.as_ref().ok_or(ProcgenError::MissingFalloff)?;
            ensure_size(falloff, self.size)?;
            Some(falloff)
        } else {
            None
        };

        let heights = Grid::par_from_fn(self.size, |x, y| {
            let h = self.raw_height(position, x, y);
            match falloff {
                Some(mask) => (h - *mask.get(x, y)).clamp(0.0, 1.0),
                None => h,
            }
        });
        let colors = self.classify(&heights)?;

        Ok(MapData { heights, colors })
    }

    /// Colour every cell of `heights` with the region table.
    pub fn classify(&self, heights: &Grid<f32>) -> Result<Grid<Rgb>> {
        ensure_size(heights, self.size)?;
        Ok(Grid::par_from_fn(self.size, |x, y| {
            self.regions.color_for(*heights.get(x, y))
        }))
    }
}
