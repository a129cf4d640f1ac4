//! Seeded 2D gradient noise with optional fractal accumulation.
//!
//! **Determinism:** output depends only on the configuration and the query
//! point. The permutation table is compiled in, so a seed reproduces the same
//! terrain across runs and machines.

use crate::error::{ProcgenError, Result};

/// Upper bound on extra fractal layers.
pub const MAX_OCTAVES: u32 = 10;

/// Base permutation of `0..=255`.
const PERMUTATION: [u8; 256] = [
    182, 104,  35, 233,  62,  52,  70, 183, 187, 115, 223, 177, 146,  85, 138, 161,
     53, 137,  92, 186,  49,   8, 244,   6, 130, 106,  84, 253, 248,  66, 149, 228,
    204, 164, 112,  16,  68, 191, 226,  28, 122, 102, 156,  71, 150, 196, 175,  82,
    210, 169,  51,  94, 172, 202, 205, 231, 126, 255,  65, 239, 159, 215, 131,  37,
     78, 198,  36,  40,  21,  43, 119, 218, 123, 251, 207,  22, 147,  48,   0, 129,
    250, 224, 189,  89, 180, 245, 127,  93, 206,  72, 160, 214,  83, 120,  55, 227,
    252,  30, 181, 163, 117,  46,  77,  74,  95, 219, 197,  64, 243,  11,   4, 155,
     54, 133,  80, 114, 238, 134, 225, 109,  69, 247,  18,  13, 105,  12, 100, 249,
     47,  20,  73, 185,  79,  19, 220,  96, 152, 125, 208,  33,  56, 144, 230, 121,
     34,  14, 132, 211, 229,   3,  63, 158, 103,  38, 194,  50,   5, 174, 213,  81,
    209, 167,  29,  39, 178,  23, 188, 235,  44, 110, 173, 139, 184,  99,  98, 153,
     86, 168, 128, 236,  42, 217,  90, 165, 203, 232,  26,   1, 193, 199,  31,  87,
    200, 170, 254,  27,  41, 148,  75,  10, 145, 166,  57, 141,   2, 201,  45, 221,
    246,  58,  67,  24, 212, 113,  97, 154, 240,  17,  60,  32,  88, 157, 136, 135,
    108, 241,   9, 107, 162, 190, 143, 140, 101, 216, 242, 171, 142, 237, 179,  91,
    124,   7, 118,  25,  15, 195, 222, 234,  76,  61, 116, 192, 151, 111, 176,  59,
];

/// [`PERMUTATION`] repeated twice so `perm[x + perm[y] + 1]` never needs wrapping.
static PERM: [u8; 512] = double_table(PERMUTATION);

const fn double_table(base: [u8; 256]) -> [u8; 512] {
    let mut out = [0u8; 512];
    let mut i = 0;
    while i < 512 {
        out[i] = base[i & 255];
        i += 1;
    }
    out
}

/// Lattice gradients, picked with `perm[..] & 7`.
const GRADIENTS: [[f32; 2]; 8] = [
    [-1.0, -1.0],
    [1.0, -1.0],
    [-1.0, 1.0],
    [1.0, 1.0],
    [0.0, -1.0],
    [-1.0, 0.0],
    [0.0, 1.0],
    [1.0, 0.0],
];

/// Fractal (multi-octave) parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FractalConfig {
    /// Extra layers on top of the base octave.
    pub octaves: u32,
    /// Amplitude multiplier per layer.
    pub gain: f32,
    /// Coordinate multiplier per layer.
    pub lacunarity: f32,
}

impl Default for FractalConfig {
    fn default() -> Self {
        Self {
            octaves: 5,
            gain: 0.75,
            lacunarity: 1.75,
        }
    }
}

/// Configuration for a [`NoiseField`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseConfig {
    pub seed: i32,
    /// Scale applied to query coordinates (lower = smoother).
    pub frequency: f32,
    /// `None` samples a single octave.
    pub fractal: Option<FractalConfig>,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            seed: 1337,
            frequency: 0.1,
            fractal: None,
        }
    }
}

impl NoiseConfig {
    /// Check every parameter against its valid range.
    pub fn validate(&self) -> Result<()> {
        if !(self.frequency.is_finite() && self.frequency > 0.0) {
            return Err(ProcgenError::config(
                "frequency",
                format!("{} must be finite and > 0", self.frequency),
            ));
        }
        if let Some(fractal) = &self.fractal {
            if fractal.octaves > MAX_OCTAVES {
                return Err(ProcgenError::config(
                    "octaves",
                    format!("{} exceeds the maximum of {}", fractal.octaves, MAX_OCTAVES),
                ));
            }
            if !(fractal.gain.is_finite() && fractal.gain >= 0.0) {
                return Err(ProcgenError::config(
                    "gain",
                    format!("{} must be finite and >= 0", fractal.gain),
                ));
            }
            if !(fractal.lacunarity.is_finite() && fractal.lacunarity >= 1.0) {
                return Err(ProcgenError::config(
                    "lacunarity",
                    format!("{} must be finite and >= 1", fractal.lacunarity),
                ));
            }
        }
        Ok(())
    }

    /// Largest magnitude [`NoiseField::sample`] can return: `1 + Σ gainᵏ`.
    pub fn amplitude_bound(&self) -> f32 {
        match &self.fractal {
            None => 1.0,
            Some(f) => {
                let mut amp = 1.0;
                let mut total = 1.0;
                for _ in 0..f.octaves {
                    amp *= f.gain;
                    total += amp;
                }
                total
            }
        }
    }
}

/// Gradient-noise evaluator. Immutable once built; cheap to share across threads.
#[derive(Debug, Clone)]
pub struct NoiseField {
    config: NoiseConfig,
}

impl NoiseField {
    pub fn new(config: NoiseConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &NoiseConfig {
        &self.config
    }

    /// Signed noise at `(x, y)`. A single octave stays within `[-1, 1]`; fractal
    /// output is bounded by [`NoiseConfig::amplitude_bound`] instead.
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        let x = self.config.frequency * x;
        let y = self.config.frequency * y;
        match &self.config.fractal {
            Some(fractal) => fractal_gradient(self.config.seed, x, y, fractal),
            None => gradient(self.config.seed, x, y),
        }
    }
}

fn fractal_gradient(seed: i32, mut x: f32, mut y: f32, fractal: &FractalConfig) -> f32 {
    let mut seed = seed;
    let mut sum = gradient(seed, x, y);
    let mut amp = 1.0;

    for _ in 0..fractal.octaves {
        x *= fractal.lacunarity;
        y *= fractal.lacunarity;
        amp *= fractal.gain;
        seed = seed.wrapping_add(1);
        sum += gradient(seed, x, y) * amp;
    }

    sum
}

#[inline]
fn smootherstep(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    (1.0 - t) * a + t * b
}

#[inline]
fn corner(hash: u8, dx: f32, dy: f32) -> f32 {
    let g = GRADIENTS[(hash & 7) as usize];
    g[0] * dx + g[1] * dy
}

/// One octave of gradient noise on the integer lattice.
fn gradient(seed: i32, x: f32, y: f32) -> f32 {
    let xf = x.floor();
    let yf = y.floor();
    let fx = x - xf;
    let fy = y - yf;
    let x0 = ((xf as i32).wrapping_add(seed) & 255) as usize;
    let y0 = ((yf as i32).wrapping_add(seed) & 255) as usize;

    let row0 = PERM[y0] as usize;
    let row1 = PERM[y0 + 1] as usize;
    let g00 = corner(PERM[x0 + row0], fx, fy);
    let g10 = corner(PERM[x0 + 1 + row0], fx - 1.0, fy);
    let g01 = corner(PERM[x0 + row1], fx, fy - 1.0);
    let g11 = corner(PERM[x0 + 1 + row1], fx - 1.0, fy - 1.0);

    let u = smootherstep(fx);
    let v = smootherstep(fy);
    lerp(lerp(g00, g10, u), lerp(g01, g11, u), v)
}
