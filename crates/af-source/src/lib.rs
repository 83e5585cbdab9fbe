//! Raster sources for glyphtile.

pub mod image;
