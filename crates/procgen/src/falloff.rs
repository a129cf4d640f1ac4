//! Falloff masks that push generated terrain toward island shapes.
//!
//! Both shapes are pure functions of the grid size, so a mask can be computed
//! once and reused until the size or strength changes.

use crate::error::{ProcgenError, Result};
use crate::grid::{ensure_positive_size, Grid};

/// Exponent of the square falloff curve.
const CURVE_EXPONENT: f32 = 3.0;
/// Bias of the square falloff curve (how far the flat centre reaches).
const CURVE_BIAS: f32 = 2.2;

/// Which falloff formula to evaluate. The two are not interchangeable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FalloffShape {
    /// Squared distance from the centre over `strength · N²`. Unbounded above;
    /// meant to be subtracted from `[0, 1]` heights and clamped afterwards.
    RadialPolynomial { strength: f32 },
    /// Chebyshev distance pushed through a rational S-curve, giving a square
    /// island with values in `[0, 1]`.
    SquareSmoothstep,
}

impl FalloffShape {
    pub fn validate(&self) -> Result<()> {
        match *self {
            FalloffShape::RadialPolynomial { strength } => {
                if strength.is_finite() && strength > 0.0 {
                    Ok(())
                } else {
                    Err(ProcgenError::config(
                        "falloff strength",
                        format!("{} must be finite and > 0", strength),
                    ))
                }
            }
            FalloffShape::SquareSmoothstep => Ok(()),
        }
    }
}

/// A validated falloff shape bound to a grid size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FalloffMask {
    size: usize,
    shape: FalloffShape,
}

impl FalloffMask {
    pub fn new(size: usize, shape: FalloffShape) -> Result<Self> {
        ensure_positive_size(size)?;
        shape.validate()?;
        Ok(Self { size, shape })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn shape(&self) -> FalloffShape {
        self.shape
    }

    /// Attenuation at cell `(i, j)`.
    pub fn value_at(&self, i: usize, j: usize) -> f32 {
        match self.shape {
            FalloffShape::RadialPolynomial { strength } => radial_polynomial(self.size, strength, i, j),
            FalloffShape::SquareSmoothstep => square_smoothstep(self.size, i, j),
        }
    }

    /// Evaluate the mask over the whole grid.
    pub fn generate(&self) -> Grid<f32> {
        Grid::par_from_fn(self.size, |i, j| self.value_at(i, j))
    }
}

fn radial_polynomial(size: usize, strength: f32, i: usize, j: usize) -> f32 {
    let center = (size / 2) as f32;
    let dx = (i + 1) as f32 - center;
    let dy = (j + 1) as f32 - center;
    let n = size as f32;
    (dx * dx + dy * dy) / (strength * n * n)
}

fn square_smoothstep(size: usize, i: usize, j: usize) -> f32 {
    let n = size as f32;
    let x = i as f32 / n * 2.0 - 1.0;
    let y = j as f32 / n * 2.0 - 1.0;
    smoothstep_curve(x.abs().max(y.abs()))
}

/// `vᵃ / (vᵃ + (b − b·v)ᵃ)`: 0 at `v = 0`, 1 at `v = 1`, non-decreasing between.
pub fn smoothstep_curve(v: f32) -> f32 {
    let a = v.powf(CURVE_EXPONENT);
    a / (a + (CURVE_BIAS - CURVE_BIAS * v).powf(CURVE_EXPONENT))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_mask_centre_low_corner_high() {
        let grid = FalloffMask::new(4, FalloffShape::SquareSmoothstep).unwrap().generate();
        let centre = *grid.get(2, 2);
        let corner = *grid.get(0, 0);
        assert!(centre.abs() < 1e-6, "centre = {}", centre);
        assert!((corner - 1.0).abs() < 1e-6, "corner = {}", corner);
        assert!(*grid.get(1, 2) < corner);
        assert!(*grid.get(1, 2) > centre);
    }

    #[test]
    fn smoothstep_curve_is_monotonic() {
        let mut last = smoothstep_curve(0.0);
        assert_eq!(last, 0.0);
        for k in 1..=100 {
            let v = smoothstep_curve(k as f32 / 100.0);
            assert!(v >= last, "curve decreased at {}: {} < {}", k, v, last);
            assert!((0.0..=1.0).contains(&v));
            last = v;
        }
        assert!((last - 1.0).abs() < 1e-6);
    }

    #[test]
    fn radial_mask_matches_formula() {
        let mask = FalloffMask::new(10, FalloffShape::RadialPolynomial { strength: 0.5 }).unwrap();
        let grid = mask.generate();
        // (i+1, j+1) = (5, 5) is the integer centre.
        assert_eq!(*grid.get(4, 4), 0.0);
        // corner (0, 0): (1-5)² + (1-5)² = 32, / (0.5 · 100)
        assert!((*grid.get(0, 0) - 0.64).abs() < 1e-6);
        // unclamped past the edge
        assert!(*grid.get(9, 0) > 0.0);
    }

    #[test]
    fn radial_mask_grows_away_from_centre() {
        let mask = FalloffMask::new(9, FalloffShape::RadialPolynomial { strength: 1.0 }).unwrap();
        let row: Vec<f32> = (3..9).map(|i| mask.value_at(i, 3)).collect();
        assert!(row.windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn invalid_masks_are_rejected() {
        assert!(FalloffMask::new(0, FalloffShape::SquareSmoothstep).is_err());
        assert!(FalloffMask::new(8, FalloffShape::RadialPolynomial { strength: 0.0 }).is_err());
        assert!(FalloffMask::new(8, FalloffShape::RadialPolynomial { strength: f32::NAN }).is_err());
    }
}
