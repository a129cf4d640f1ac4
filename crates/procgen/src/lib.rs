//! Procedural island terrain: seeded gradient noise, falloff masks, terrain
//! classification and 2D sun occlusion.

pub mod color;
pub mod error;
pub mod falloff;
pub mod grid;
pub mod map;
pub mod noise;
pub mod shadow;
pub mod terrain;

pub use color::*;
pub use error::*;
pub use falloff::*;
pub use grid::*;
pub use map::*;
pub use noise::*;
pub use shadow::*;
pub use terrain::*;

pub use glam::IVec2;
