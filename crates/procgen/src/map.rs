//! One-call island generation: noise, optional falloff, classification and
//! optional sun shading, in that order.

use glam::IVec2;

use crate::error::Result;
use crate::falloff::{FalloffMask, FalloffShape};
use crate::grid::Grid;
use crate::noise::{FractalConfig, NoiseConfig, NoiseField};
use crate::shadow::{ShadowConfig, ShadowSimulator};
use crate::terrain::{MapData, RegionTable, TerrainGenerator};

/// Default tile side length.
pub const MAP_SIZE: usize = 500;

/// Everything needed to build a [`MapGenerator`] except the region table.
#[derive(Debug, Clone, PartialEq)]
pub struct MapSettings {
    pub size: usize,
    pub noise: NoiseConfig,
    /// Divides cell coordinates before noise sampling (higher = larger features).
    pub noise_scale: f32,
    /// `None` disables the island mask.
    pub falloff: Option<FalloffShape>,
    /// `None` disables shading.
    pub sun_azimuth: Option<f32>,
    pub shadow: ShadowConfig,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            size: MAP_SIZE,
            noise: NoiseConfig {
                fractal: Some(FractalConfig::default()),
                ..Default::default()
            },
            noise_scale: 4.0,
            falloff: Some(FalloffShape::RadialPolynomial { strength: 0.5 }),
            sun_azimuth: Some(3.0 * std::f32::consts::FRAC_PI_4),
            shadow: ShadowConfig::default(),
        }
    }
}

/// Owns every stage for one tile size.
#[derive(Debug, Clone)]
pub struct MapGenerator {
    terrain: TerrainGenerator,
    use_falloff: bool,
    shadows: Option<ShadowSimulator>,
}

impl MapGenerator {
    /// Validate the settings and precompute the falloff mask.
    pub fn new(settings: &MapSettings, regions: RegionTable) -> Result<Self> {
        let noise = NoiseField::new(settings.noise)?;
        let mut terrain = TerrainGenerator::new(settings.size, noise, settings.noise_scale, regions)?;

        if let Some(shape) = settings.falloff {
            let mask = FalloffMask::new(settings.size, shape)?;
            terrain.set_falloff(mask.generate())?;
        }

        let shadows = match settings.sun_azimuth {
            Some(azimuth) => {
                let mut sim = ShadowSimulator::new(settings.size, settings.shadow)?;
                sim.set_sun_position(azimuth)?;
                Some(sim)
            }
            None => None,
        };

        Ok(Self {
            terrain,
            use_falloff: settings.falloff.is_some(),
            shadows,
        })
    }

    pub fn terrain(&self) -> &TerrainGenerator {
        &self.terrain
    }

    pub fn shadows(&self) -> Option<&ShadowSimulator> {
        self.shadows.as_ref()
    }

    /// The precomputed falloff mask, if one is configured.
    pub fn falloff_grid(&self) -> Option<&Grid<f32>> {
        self.terrain.falloff()
    }

    /// Move the sun for every later [`Self::generate`]. No-op when shading is disabled.
    pub fn set_sun_position(&mut self, azimuth: f32) -> Result<()> {
        match self.shadows.as_mut() {
            Some(sim) => sim.set_sun_position(azimuth),
            None => Ok(()),
        }
    }

    /// Generate the tile at `position`.
    pub fn generate(&self, position: IVec2) -> Result<MapData> {
        let mut map = self.terrain.generate(position, self.use_falloff)?;
        if let Some(sim) = &self.shadows {
            let stats = sim.shade(&mut map)?;
            log::debug!(
                "Tile {} shaded: {} shadowed, {} overhead",
                position,
                stats.shadowed,
                stats.overhead
            );
        }
        Ok(map)
    }
}
