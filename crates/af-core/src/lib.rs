//! Shared types for glyphtile: grids, character pool, config and seam traits.

pub mod charset;
pub mod config;
pub mod frame;
pub mod traits;
