//! Generator settings. Loaded from `config.ron` at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use procgen::{
    FalloffShape, FractalConfig, MapSettings, NoiseConfig, RegionTable, Rgb, ShadowConfig,
    TerrainType, MAX_OCTAVES,
};

/// Which grid ends up in the output image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawMode {
    /// Heights as greyscale.
    NoiseMap,
    /// Region colours, shaded if ray tracing is on.
    #[default]
    ColourMap,
    /// The falloff mask as greyscale.
    FalloffMap,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FalloffKind {
    #[default]
    Radial,
    Square,
}

/// One terrain type as written in the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionConfig {
    pub name: String,
    /// Minimum normalized height for this region.
    pub height: f32,
    pub colour: [u8; 3],
}

impl RegionConfig {
    fn new(name: &str, height: f32, colour: [u8; 3]) -> Self {
        Self {
            name: name.to_string(),
            height,
            colour,
        }
    }
}

/// Persistent generator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IslandsConfig {
    /// Tile side length in cells.
    #[serde(default = "default_size")]
    pub size: usize,
    #[serde(default)]
    pub draw_mode: DrawMode,
    /// Noise seed; random when absent.
    #[serde(default)]
    pub seed: Option<i32>,
    #[serde(default = "default_frequency")]
    pub frequency: f32,
    #[serde(default = "default_true")]
    pub fractal: bool,
    #[serde(default = "default_octaves")]
    pub octaves: i32,
    #[serde(default = "default_gain")]
    pub gain: f32,
    #[serde(default = "default_lacunarity")]
    pub lacunarity: f32,
    #[serde(default = "default_noise_scale")]
    pub noise_scale: f32,
    #[serde(default = "default_true")]
    pub use_falloff: bool,
    #[serde(default)]
    pub falloff_shape: FalloffKind,
    /// Strength of the radial falloff (larger = bigger island).
    #[serde(default = "default_island_effect")]
    pub island_effect: f32,
    #[serde(default = "default_true")]
    pub use_ray_tracing: bool,
    /// Sun azimuth in radians.
    #[serde(default = "default_sun_angle")]
    pub sun_angle: f32,
    /// Tile offset in cells.
    #[serde(default)]
    pub position: (i32, i32),
    #[serde(default = "default_regions")]
    pub regions: Vec<RegionConfig>,
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

fn default_size() -> usize {
    procgen::MAP_SIZE
}
fn default_frequency() -> f32 {
    0.1
}
fn default_true() -> bool {
    true
}
fn default_octaves() -> i32 {
    5
}
fn default_gain() -> f32 {
    0.75
}
fn default_lacunarity() -> f32 {
    1.75
}
fn default_noise_scale() -> f32 {
    4.0
}
fn default_island_effect() -> f32 {
    0.5
}
fn default_sun_angle() -> f32 {
    2.35
}
fn default_output() -> PathBuf {
    PathBuf::from("island.png")
}
fn default_regions() -> Vec<RegionConfig> {
    vec![
        RegionConfig::new("deep water", 0.0, [25, 60, 140]),
        RegionConfig::new("shallow water", 0.22, [50, 100, 190]),
        RegionConfig::new("sand", 0.3, [210, 200, 130]),
        RegionConfig::new("grass", 0.36, [85, 150, 45]),
        RegionConfig::new("forest", 0.5, [60, 105, 35]),
        RegionConfig::new("rock", 0.65, [110, 90, 75]),
        RegionConfig::new("snow", 0.8, [240, 240, 245]),
    ]
}

impl Default for IslandsConfig {
    fn default() -> Self {
        Self {
            size: default_size(),
            draw_mode: DrawMode::default(),
            seed: None,
            frequency: default_frequency(),
            fractal: true,
            octaves: default_octaves(),
            gain: default_gain(),
            lacunarity: default_lacunarity(),
            noise_scale: default_noise_scale(),
            use_falloff: true,
            falloff_shape: FalloffKind::default(),
            island_effect: default_island_effect(),
            use_ray_tracing: true,
            sun_angle: default_sun_angle(),
            position: (0, 0),
            regions: default_regions(),
            output: default_output(),
        }
    }
}

impl IslandsConfig {
    /// Load config from `path`. If the file is missing or invalid, returns default config.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(data) => match ron::from_str(&data) {
                Ok(c) => return c,
                Err(e) => log::warn!("Invalid config at {:?}: {}, using defaults", path, e),
            },
            Err(_) => log::info!("No config at {:?}, using defaults", path),
        }
        Self::default()
    }

    /// Pull hand-edited values back into range instead of refusing to run.
    pub fn sanitize(&mut self) {
        if self.lacunarity < 1.0 {
            log::warn!("lacunarity {} < 1, clamping to 1", self.lacunarity);
            self.lacunarity = 1.0;
        }
        if self.octaves < 0 {
            log::warn!("octaves {} < 0, clamping to 0", self.octaves);
            self.octaves = 0;
        }
        if self.octaves > MAX_OCTAVES as i32 {
            log::warn!("octaves {} > {}, clamping", self.octaves, MAX_OCTAVES);
            self.octaves = MAX_OCTAVES as i32;
        }
        if self.gain < 0.0 {
            log::warn!("gain {} < 0, clamping to 0", self.gain);
            self.gain = 0.0;
        }
    }

    pub fn falloff_shape(&self) -> FalloffShape {
        match self.falloff_shape {
            FalloffKind::Radial => FalloffShape::RadialPolynomial {
                strength: self.island_effect,
            },
            FalloffKind::Square => FalloffShape::SquareSmoothstep,
        }
    }

    /// Library settings for `seed`. Call [`Self::sanitize`] first.
    pub fn map_settings(&self, seed: i32) -> MapSettings {
        let fractal = self.fractal.then(|| FractalConfig {
            octaves: self.octaves.max(0) as u32,
            gain: self.gain,
            lacunarity: self.lacunarity,
        });
        MapSettings {
            size: self.size,
            noise: NoiseConfig {
                seed,
                frequency: self.frequency,
                fractal,
            },
            noise_scale: self.noise_scale,
            falloff: self.use_falloff.then(|| self.falloff_shape()),
            sun_azimuth: self.use_ray_tracing.then_some(self.sun_angle),
            shadow: ShadowConfig::default(),
        }
    }

    pub fn region_table(&self) -> procgen::Result<RegionTable> {
        RegionTable::new(
            self.regions
                .iter()
                .map(|r| TerrainType::new(r.name.clone(), r.height, Rgb::from_u8(r.colour)))
                .collect(),
        )
    }
}

/// `config.ron` in the current directory.
pub fn default_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("config.ron")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_fills_defaults() {
        let c: IslandsConfig = ron::from_str("(size: 64, draw_mode: NoiseMap, seed: Some(7))").unwrap();
        assert_eq!(c.size, 64);
        assert_eq!(c.draw_mode, DrawMode::NoiseMap);
        assert_eq!(c.seed, Some(7));
        assert_eq!(c.regions, default_regions());
        assert!(c.use_falloff);
    }

    #[test]
    fn sanitize_clamps_interactive_ranges() {
        let mut c = IslandsConfig {
            octaves: -3,
            lacunarity: 0.5,
            gain: -1.0,
            ..Default::default()
        };
        c.sanitize();
        assert_eq!(c.octaves, 0);
        assert_eq!(c.lacunarity, 1.0);
        assert_eq!(c.gain, 0.0);

        c.octaves = 40;
        c.sanitize();
        assert_eq!(c.octaves, MAX_OCTAVES as i32);
    }

    #[test]
    fn toggles_map_to_optional_stages() {
        let c = IslandsConfig {
            fractal: false,
            use_falloff: false,
            use_ray_tracing: false,
            ..Default::default()
        };
        let s = c.map_settings(3);
        assert_eq!(s.noise.seed, 3);
        assert!(s.noise.fractal.is_none());
        assert!(s.falloff.is_none());
        assert!(s.sun_azimuth.is_none());
    }

    #[test]
    fn default_regions_are_valid() {
        let table = IslandsConfig::default().region_table().unwrap();
        assert_eq!(table.regions().len(), default_regions().len());
    }

    #[test]
    fn square_falloff_ignores_island_effect() {
        let c = IslandsConfig {
            falloff_shape: FalloffKind::Square,
            island_effect: 0.0,
            ..Default::default()
        };
        assert_eq!(c.falloff_shape(), FalloffShape::SquareSmoothstep);
    }
}
