//! Directional sun occlusion over a heightmap by 2D ray marching.
//!
//! For each cell we walk from the cell toward the sun's ground projection and
//! compare every visited cell's height against a straight ray falling from
//! the sun to the cell. The walk uses integer-truncated steps (see
//! [`grid_coord`]), so it can revisit or skip cells; this is an approximation
//! of a ray cast, not an exact one.

use glam::{IVec2, Vec2, Vec3};
use rayon::prelude::*;

use crate::color::Rgb;
use crate::error::{ProcgenError, Result};
use crate::grid::{ensure_positive_size, ensure_size, grid_coord, Grid};
use crate::terrain::MapData;

/// Tunables for the shadow pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowConfig {
    /// Sun orbit radius as a multiple of the grid size.
    pub orbit_factor: f32,
    /// Height of the sun above the ground plane.
    pub sun_height: f32,
    /// Heights are floored here; terrain at or below it casts no shadow.
    pub water_level: f32,
    /// HSV value multiplier applied to shadowed cells.
    pub dimming: f32,
    /// Half-size of the box (in cells) searched around each cell.
    pub search_radius: i32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            orbit_factor: 1.52,
            sun_height: 5.0,
            water_level: 0.3,
            dimming: 0.4,
            search_radius: 40,
        }
    }
}

impl ShadowConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.orbit_factor.is_finite() && self.orbit_factor >= 0.0) {
            return Err(ProcgenError::config(
                "sun orbit factor",
                format!("{} must be finite and >= 0", self.orbit_factor),
            ));
        }
        if !self.sun_height.is_finite() || !self.water_level.is_finite() {
            return Err(ProcgenError::config("sun height", "sun and water heights must be finite"));
        }
        if !(0.0..=1.0).contains(&self.dimming) {
            return Err(ProcgenError::config(
                "dimming",
                format!("{} must be within [0, 1]", self.dimming),
            ));
        }
        if self.search_radius < 1 {
            return Err(ProcgenError::config(
                "search radius",
                format!("{} must be at least 1", self.search_radius),
            ));
        }
        Ok(())
    }
}

/// Sun placement on a circle around the map centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sun {
    pub azimuth: f32,
    pub orbit_radius: f32,
    pub height: f32,
    /// World position: x/z on the ground plane, y up.
    pub position: Vec3,
    /// `position` projected onto the ground plane.
    pub ground: Vec2,
}

impl Sun {
    fn place(azimuth: f32, orbit_radius: f32, height: f32, size: usize) -> Self {
        let center = (size / 2) as f32;
        let position = Vec3::new(
            orbit_radius * azimuth.cos() + center,
            height,
            orbit_radius * azimuth.sin() + center,
        );
        Self {
            azimuth,
            orbit_radius,
            height,
            position,
            ground: Vec2::new(position.x, position.z),
        }
    }

    /// Fail unless every cell of a `size × size` grid is a finite distance
    /// from the ground projection. The corners bound every cell.
    fn ensure_reachable(&self, size: usize) -> Result<()> {
        let far = size as f32;
        let corners = [Vec2::ZERO, Vec2::new(far, 0.0), Vec2::new(0.0, far), Vec2::splat(far)];
        if self.position.is_finite() && corners.iter().all(|c| c.distance(self.ground).is_finite()) {
            Ok(())
        } else {
            Err(ProcgenError::config(
                "sun position",
                format!(
                    "{} (azimuth {}, orbit radius {}) is not a finite distance from the map",
                    self.position, self.azimuth, self.orbit_radius
                ),
            ))
        }
    }
}

/// `h(t) = slope · t + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub slope: f32,
    pub intercept: f32,
}

impl Line {
    /// Line through two points with distinct x.
    pub fn through(p1: Vec2, p2: Vec2) -> Self {
        let slope = (p1.y - p2.y) / (p1.x - p2.x);
        Self {
            slope,
            intercept: p2.y - slope * p2.x,
        }
    }

    #[inline]
    pub fn evaluate(&self, t: f32) -> f32 {
        self.slope * t + self.intercept
    }
}

/// Result of marching one cell toward the sun.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occlusion {
    Lit,
    /// Light is blocked by the terrain at `by`.
    Shadowed { by: IVec2 },
}

/// Counters for one shadow pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShadowStats {
    pub shadowed: usize,
    /// Cells directly under the sun; left lit since nothing can stand between them.
    pub overhead: usize,
}

impl ShadowStats {
    fn merge(self, other: Self) -> Self {
        Self {
            shadowed: self.shadowed + other.shadowed,
            overhead: self.overhead + other.overhead,
        }
    }
}

/// Shades cells of one terrain size under a movable sun.
#[derive(Debug, Clone)]
pub struct ShadowSimulator {
    size: usize,
    config: ShadowConfig,
    sun: Sun,
}

impl ShadowSimulator {
    /// Create a simulator with the sun at azimuth 0.
    pub fn new(size: usize, config: ShadowConfig) -> Result<Self> {
        ensure_positive_size(size)?;
        config.validate()?;
        let orbit_radius = config.orbit_factor * size as f32;
        let sun = Sun::place(0.0, orbit_radius, config.sun_height, size);
        sun.ensure_reachable(size)?;
        Ok(Self { size, config, sun })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn config(&self) -> &ShadowConfig {
        &self.config
    }

    pub fn sun(&self) -> &Sun {
        &self.sun
    }

    /// Move the sun to `azimuth` radians (measured from +x toward +z). Every
    /// later pass uses this position until it is set again. A non-finite
    /// azimuth is rejected and leaves the sun where it was.
    pub fn set_sun_position(&mut self, azimuth: f32) -> Result<()> {
        let sun = Sun::place(azimuth, self.sun.orbit_radius, self.sun.height, self.size);
        sun.ensure_reachable(self.size)?;
        self.sun = sun;
        log::debug!("New sun position: {}", self.sun.position);
        Ok(())
    }

    /// Height of the ray from the sun down to `point` as a function of the
    /// ground distance from `point`. `point.y` is the height at the cell.
    pub fn ray_height(&self, point: Vec3) -> Line {
        let d = Vec2::new(point.x, point.z).distance(self.sun.ground);
        Line::through(Vec2::new(0.0, point.y), Vec2::new(d, self.sun.height))
    }

    /// Decide whether cell `(x, y)` is in shadow.
    pub fn evaluate_occlusion(&self, heights: &Grid<f32>, x: usize, y: usize) -> Result<Occlusion> {
        ensure_size(heights, self.size)?;
        if x >= self.size || y >= self.size {
            return Err(ProcgenError::OutOfBounds { x, y, size: self.size });
        }
        self.march(heights, x, y)
            .ok_or(ProcgenError::DegenerateGeometry { x, y })
    }

    /// `None` when the sun's ground projection sits exactly on the cell.
    fn march(&self, heights: &Grid<f32>, x: usize, y: usize) -> Option<Occlusion> {
        let water = self.config.water_level;
        let height = heights.get(x, y).max(water);

        let origin = IVec2::new(x as i32, y as i32);
        let start = origin.as_vec2();
        let to_sun = start.distance(self.sun.ground);
        if to_sun <= 0.0 {
            return None;
        }
        let ray = self.ray_height(Vec3::new(start.x, height, start.y));
        let direction = (self.sun.ground - start) / to_sun;

        // Search box; the grid edge is enforced by `try_get` below.
        let reach = IVec2::splat(self.config.search_radius);
        let min = origin.saturating_sub(reach);
        let max = origin.saturating_add(reach);
        let in_box = |p: IVec2| p.x >= min.x && p.x < max.x && p.y >= min.y && p.y < max.y;

        let mut current = origin;
        let mut last = origin;
        let mut step = 0u32;
        while in_box(current) {
            let Some(&blocker) = heights.try_get(current.x, current.y) else {
                break;
            };
            if current != last {
                let travelled = current.as_vec2().distance(start);
                if travelled > to_sun {
                    break;
                }
                if blocker > water && ray.evaluate(travelled) < blocker {
                    return Some(Occlusion::Shadowed { by: current });
                }
            }
            last = current;
            step += 1;
            let next = start + direction * step as f32;
            current = IVec2::new(grid_coord(next.x), grid_coord(next.y));
        }
        Some(Occlusion::Lit)
    }

    /// Darken every occluded cell of `colors` in place.
    ///
    /// Cells are independent, so the pass runs in parallel; `heights` is only read.
    pub fn cast_shadows(&self, heights: &Grid<f32>, colors: &mut Grid<Rgb>) -> Result<ShadowStats> {
        ensure_size(heights, self.size)?;
        ensure_size(colors, self.size)?;
        let dimming = self.config.dimming;

        let stats = colors
            .par_iter_mut()
            .map(|(x, y, color)| match self.march(heights, x, y) {
                Some(Occlusion::Shadowed { .. }) => {
                    *color = color.darken(dimming);
                    ShadowStats { shadowed: 1, overhead: 0 }
                }
                Some(Occlusion::Lit) => ShadowStats::default(),
                None => ShadowStats { shadowed: 0, overhead: 1 },
            })
            .reduce(ShadowStats::default, ShadowStats::merge);

        if stats.overhead > 0 {
            log::debug!("{} cell(s) directly under the sun left lit", stats.overhead);
        }
        log::debug!(
            "Shadow pass: {} of {} cells shadowed",
            stats.shadowed,
            self.size * self.size
        );
        Ok(stats)
    }

    /// Shade a generated map in place.
    pub fn shade(&self, map: &mut MapData) -> Result<ShadowStats> {
        self.cast_shadows(&map.heights, &mut map.colors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRASS: Rgb = Rgb::new(0.2, 0.6, 0.4);

    fn flat(size: usize, height: f32) -> (Grid<f32>, Grid<Rgb>) {
        (Grid::new_with(size, height), Grid::new_with(size, GRASS))
    }

    fn spike(size: usize) -> Grid<f32> {
        let mut heights = Grid::new_with(size, 0.5);
        heights.set(size / 2, size / 2, 50.0);
        heights
    }

    /// Which cells one shadow pass darkens.
    fn shadow_mask(sim: &ShadowSimulator, heights: &Grid<f32>) -> Grid<bool> {
        let mut colors = Grid::new_with(heights.size(), GRASS);
        sim.cast_shadows(heights, &mut colors).unwrap();
        Grid::par_from_fn(heights.size(), |x, y| *colors.get(x, y) != GRASS)
    }

    #[test]
    fn line_through_two_points() {
        let line = Line::through(Vec2::new(0.0, 1.0), Vec2::new(4.0, 5.0));
        assert!((line.slope - 1.0).abs() < 1e-6);
        assert!((line.intercept - 1.0).abs() < 1e-6);
        assert!((line.evaluate(2.0) - 3.0).abs() < 1e-6);
    }

    #[test]
    fn sun_position_orbits_map_centre() {
        let mut sim = ShadowSimulator::new(10, ShadowConfig::default()).unwrap();
        assert!((sim.sun().position - Vec3::new(20.2, 5.0, 5.0)).length() < 1e-4);

        sim.set_sun_position(std::f32::consts::FRAC_PI_2).unwrap();
        let sun = sim.sun();
        assert!((sun.position - Vec3::new(5.0, 5.0, 20.2)).length() < 1e-4);
        assert_eq!(sun.ground, Vec2::new(sun.position.x, sun.position.z));
    }

    #[test]
    fn ray_height_runs_from_point_to_sun() {
        let sim = ShadowSimulator::new(10, ShadowConfig::default()).unwrap();
        let point = Vec3::new(5.0, 0.5, 5.0);
        let line = sim.ray_height(point);
        let d = Vec2::new(5.0, 5.0).distance(sim.sun().ground);
        assert!((line.evaluate(0.0) - 0.5).abs() < 1e-5);
        assert!((line.evaluate(d) - 5.0).abs() < 1e-5);
    }

    #[test]
    fn flat_terrain_casts_no_shadow() {
        let mut sim = ShadowSimulator::new(10, ShadowConfig::default()).unwrap();
        for k in 0..8 {
            sim.set_sun_position(k as f32 * std::f32::consts::FRAC_PI_4).unwrap();
            let (heights, mut colors) = flat(10, 0.5);
            let stats = sim.cast_shadows(&heights, &mut colors).unwrap();
            assert_eq!(stats, ShadowStats::default(), "azimuth step {}", k);
            assert!(colors.iter().all(|(_, _, &c)| c == GRASS));
        }
    }

    #[test]
    fn spike_shades_far_side_only() {
        let sim = ShadowSimulator::new(20, ShadowConfig::default()).unwrap();
        // azimuth 0 puts the sun due +x, level with row 10
        let (mut heights, mut colors) = flat(20, 0.5);
        heights.set(10, 10, 50.0);
        sim.cast_shadows(&heights, &mut colors).unwrap();

        for x in 0..10 {
            let c = *colors.get(x, 10);
            assert!((c.brightness() - 0.24).abs() < 1e-5, "cell ({}, 10) should be shadowed", x);
        }
        for x in 10..20 {
            assert_eq!(*colors.get(x, 10), GRASS, "cell ({}, 10) should be lit", x);
        }
    }

    #[test]
    fn last_sun_position_drives_later_passes() {
        let mut sim = ShadowSimulator::new(20, ShadowConfig::default()).unwrap();
        let heights = spike(20);

        let east = shadow_mask(&sim, &heights);
        assert!((0..10).all(|x| *east.get(x, 11)));
        assert!((11..20).all(|x| !*east.get(x, 11)));

        // sun due -x: the shadow swings to the other side of the spike
        sim.set_sun_position(std::f32::consts::PI).unwrap();
        let west = shadow_mask(&sim, &heights);
        assert!((11..=15).all(|x| *west.get(x, 11)));
        assert!((0..10).all(|x| !*west.get(x, 10) && !*west.get(x, 11)));

        assert_eq!(shadow_mask(&sim, &heights), west);
    }

    #[test]
    fn diagonal_sun_shades_along_the_diagonal() {
        let mut sim = ShadowSimulator::new(20, ShadowConfig::default()).unwrap();
        sim.set_sun_position(3.0 * std::f32::consts::FRAC_PI_4).unwrap();
        let mask = shadow_mask(&sim, &spike(20));

        for (x, y) in [(11, 10), (12, 9), (13, 8), (14, 7)] {
            assert!(*mask.get(x, y), "cell ({}, {}) should be shadowed", x, y);
        }
        for (x, y, &shadowed) in mask.iter() {
            if x <= 10 || y >= 11 {
                assert!(!shadowed, "cell ({}, {}) faces the sun", x, y);
            }
        }
    }

    #[test]
    fn huge_search_radius_covers_the_grid() {
        let config = ShadowConfig {
            search_radius: i32::MAX,
            ..Default::default()
        };
        let sim = ShadowSimulator::new(20, config).unwrap();
        let wide = shadow_mask(&sim, &spike(20));
        let default = ShadowSimulator::new(20, ShadowConfig::default()).unwrap();
        assert_eq!(wide, shadow_mask(&default, &spike(20)));
    }

    #[test]
    fn sun_must_stay_a_finite_distance_away() {
        for orbit_factor in [f32::MAX, 1e20] {
            let config = ShadowConfig {
                orbit_factor,
                ..Default::default()
            };
            assert!(matches!(
                ShadowSimulator::new(10, config),
                Err(ProcgenError::Configuration { name: "sun position", .. })
            ));
        }

        let mut sim = ShadowSimulator::new(10, ShadowConfig::default()).unwrap();
        let before = *sim.sun();
        assert!(sim.set_sun_position(f32::NAN).is_err());
        assert!(sim.set_sun_position(f32::INFINITY).is_err());
        assert_eq!(*sim.sun(), before);
    }

    #[test]
    fn occluder_is_reported() {
        let sim = ShadowSimulator::new(20, ShadowConfig::default()).unwrap();
        let (mut heights, _) = flat(20, 0.5);
        heights.set(10, 10, 50.0);
        assert_eq!(
            sim.evaluate_occlusion(&heights, 4, 10).unwrap(),
            Occlusion::Shadowed { by: IVec2::new(10, 10) }
        );
        assert_eq!(sim.evaluate_occlusion(&heights, 15, 10).unwrap(), Occlusion::Lit);
    }

    #[test]
    fn submerged_terrain_casts_no_shadow() {
        let sim = ShadowSimulator::new(20, ShadowConfig::default()).unwrap();
        let (mut heights, mut colors) = flat(20, 0.1);
        heights.set(10, 10, 0.29);
        let stats = sim.cast_shadows(&heights, &mut colors).unwrap();
        assert_eq!(stats.shadowed, 0);
    }

    #[test]
    fn sun_overhead_cell_is_degenerate() {
        let config = ShadowConfig {
            orbit_factor: 0.0,
            ..Default::default()
        };
        let sim = ShadowSimulator::new(10, config).unwrap();
        let (heights, mut colors) = flat(10, 0.5);
        assert_eq!(
            sim.evaluate_occlusion(&heights, 5, 5),
            Err(ProcgenError::DegenerateGeometry { x: 5, y: 5 })
        );
        let stats = sim.cast_shadows(&heights, &mut colors).unwrap();
        assert_eq!(stats.overhead, 1);
        assert_eq!(*colors.get(5, 5), GRASS);
    }

    #[test]
    fn mismatched_grids_fail_fast() {
        let sim = ShadowSimulator::new(10, ShadowConfig::default()).unwrap();
        let heights = Grid::new_with(10, 0.5f32);
        let mut colors = Grid::new_with(12, GRASS);
        assert_eq!(
            sim.cast_shadows(&heights, &mut colors),
            Err(ProcgenError::DimensionMismatch { expected: 10, actual: 12 })
        );
        assert!(matches!(
            sim.evaluate_occlusion(&heights, 10, 0),
            Err(ProcgenError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = ShadowConfig {
            dimming: 1.5,
            ..Default::default()
        };
        assert!(ShadowSimulator::new(10, config).is_err());
        assert!(ShadowSimulator::new(0, ShadowConfig::default()).is_err());
    }
}
