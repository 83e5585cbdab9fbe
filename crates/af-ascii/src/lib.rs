//! Brightness-matching engine: glyph catalog, normalisation, resolution cache
//! and the matcher that ties them to an image.

pub mod cache;
pub mod catalog;
pub mod matcher;
pub mod normalize;
pub mod raster;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::ResolutionCache;
pub use catalog::GlyphCatalog;
pub use matcher::{ConversionStats, Matcher, column_bounds};
pub use normalize::{BrightnessMap, normalize};
pub use raster::FontRasterizer;
