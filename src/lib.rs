//! PixelStack — a layered image processing engine.
//!
//! The model is a stack of same-sized images ([`layer::Layer`]) holding
//! row-major rasters ([`raster::Image`]) of clamped RGB pixels
//! ([`pixel::Pixel`]). Modifiers ([`ops::Modifier`]) are pure pixel-list
//! transformations: spatial kernel filters, linear color transforms, a
//! clustering mosaic, and nearest-neighbor downscaling. Stacks blend to a
//! single image by per-channel averaging of the visible slots.
//!
//! [`io`] supplies the raster codecs and the exact-round-trip layer state
//! text format; [`script`] is the line-oriented command interface the
//! `pixelstack` binary drives.

pub mod cli;
pub mod error;
pub mod io;
pub mod layer;
pub mod logger;
pub mod ops;
pub mod pixel;
pub mod raster;
pub mod script;

pub use error::{Error, Result};
pub use layer::{Layer, LayerProps};
pub use ops::{Kernel, Modifier};
pub use pixel::Pixel;
pub use raster::Image;
