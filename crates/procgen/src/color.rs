//! Linear RGB colours for the colour map, plus the HSV round trip used for shading.

use bytemuck::{Pod, Zeroable};

/// RGB colour, each channel in `0.0..=1.0`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

/// Hue, saturation, value; all three in `0.0..=1.0` (hue wraps at 1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    pub h: f32,
    pub s: f32,
    pub v: f32,
}

impl Rgb {
    /// Colour of a cell no terrain region claimed.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_u8(rgb: [u8; 3]) -> Self {
        Self::new(
            rgb[0] as f32 / 255.0,
            rgb[1] as f32 / 255.0,
            rgb[2] as f32 / 255.0,
        )
    }

    pub fn to_u8(self) -> [u8; 3] {
        [
            (self.r.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.g.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.b.clamp(0.0, 1.0) * 255.0).round() as u8,
        ]
    }

    /// Grey level `t` (black at 0, white at 1).
    pub fn grey(t: f32) -> Self {
        Self::BLACK.lerp(Self::WHITE, t.clamp(0.0, 1.0))
    }

    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
        )
    }

    pub fn to_hsv(self) -> Hsv {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        let delta = max - min;

        if max <= 0.0 {
            return Hsv { h: 0.0, s: 0.0, v: 0.0 };
        }
        let s = delta / max;
        if delta <= 0.0 {
            return Hsv { h: 0.0, s, v: max };
        }

        let sector = if max == self.r {
            (self.g - self.b) / delta
        } else if max == self.g {
            2.0 + (self.b - self.r) / delta
        } else {
            4.0 + (self.r - self.g) / delta
        };
        let h = (sector / 6.0).rem_euclid(1.0);
        Hsv { h, s, v: max }
    }

    /// Scale the HSV value channel by `coef`, leaving hue and saturation alone.
    pub fn darken(self, coef: f32) -> Self {
        let mut hsv = self.to_hsv();
        hsv.v *= coef;
        hsv.to_rgb()
    }

    /// Perceived brightness (HSV value).
    pub fn brightness(self) -> f32 {
        self.r.max(self.g).max(self.b)
    }
}

impl Hsv {
    pub fn to_rgb(self) -> Rgb {
        if self.s <= 0.0 {
            return Rgb::new(self.v, self.v, self.v);
        }
        let h = self.h.rem_euclid(1.0) * 6.0;
        let sector = h.floor();
        let f = h - sector;
        let p = self.v * (1.0 - self.s);
        let q = self.v * (1.0 - self.s * f);
        let t = self.v * (1.0 - self.s * (1.0 - f));

        match sector as u32 {
            0 => Rgb::new(self.v, t, p),
            1 => Rgb::new(q, self.v, p),
            2 => Rgb::new(p, self.v, t),
            3 => Rgb::new(p, q, self.v),
            4 => Rgb::new(t, p, self.v),
            _ => Rgb::new(self.v, p, q),
        }
    }
}
