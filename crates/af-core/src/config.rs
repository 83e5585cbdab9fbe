//! Render configuration, loaded from TOML.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::charset::DEFAULT_POOL;

/// Where `render` sends the character grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    #[default]
    Html,
    Console,
}

/// Runtime configuration.
///
/// Every field has a default, so a partial (or missing) file is valid.
///
/// # Example
/// ```
/// use af_core::config::{OutputMode, RenderConfig};
/// let config = RenderConfig::from_toml_str("initial_columns = 32\noutput = \"console\"").unwrap();
/// assert_eq!(config.initial_columns, 32);
/// assert_eq!(config.output, OutputMode::Console);
/// assert_eq!(config.cache_capacity, 12);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Nom de la police : clé du catalogue et famille CSS de la sortie HTML.
    pub font: String,
    /// Fichier TTF/OTF explicite. Sinon recherche dans les dossiers système.
    pub font_path: Option<PathBuf>,
    /// Côté N de la bitmap N×N d'un glyphe.
    pub glyph_resolution: u32,
    /// Colonnes au démarrage (bornées ensuite par l'image).
    pub initial_columns: u32,
    /// Pixels minimum par colonne de caractères.
    pub min_pixels_per_char: u32,
    /// Capacité du cache de résolutions.
    pub cache_capacity: usize,
    pub output: OutputMode,
    pub html_path: PathBuf,
    /// Pool de caractères initial.
    pub initial_chars: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            font: "Courier New".to_string(),
            font_path: None,
            glyph_resolution: 16,
            initial_columns: 64,
            min_pixels_per_char: 2,
            cache_capacity: 12,
            output: OutputMode::Html,
            html_path: PathBuf::from("out.html"),
            initial_chars: DEFAULT_POOL.to_string(),
        }
    }
}

impl RenderConfig {
    /// Parse a TOML document.
    ///
    /// # Errors
    /// Returns an error if the document is not valid TOML for this schema.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Invalid render configuration")?;
        Ok(config.sanitized())
    }

    /// Load from `path`. A missing path (or `None`) yields the defaults.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read config {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("Cannot parse {}", path.display()))
    }

    /// Clamp values that would make the engine meaningless.
    fn sanitized(mut self) -> Self {
        if self.glyph_resolution == 0 {
            log::warn!("glyph_resolution = 0, falling back to 16");
            self.glyph_resolution = 16;
        }
        if self.cache_capacity == 0 {
            log::warn!("cache_capacity = 0, falling back to 1");
            self.cache_capacity = 1;
        }
        self.min_pixels_per_char = self.min_pixels_per_char.max(1);
        self.initial_columns = self.initial_columns.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_is_default() {
        assert_eq!(RenderConfig::from_toml_str("").unwrap(), RenderConfig::default());
    }

    #[test]
    fn zero_values_are_sanitized() {
        let config = RenderConfig::from_toml_str("glyph_resolution = 0\ncache_capacity = 0").unwrap();
        assert_eq!(config.glyph_resolution, 16);
        assert_eq!(config.cache_capacity, 1);
    }

    #[test]
    fn unknown_output_mode_is_rejected() {
        assert!(RenderConfig::from_toml_str("output = \"pdf\"").is_err());
    }

    #[test]
    fn load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = RenderConfig::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config, RenderConfig::default());
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "font = \"DejaVu Sans Mono\"\nhtml_path = \"art.html\"").unwrap();
        let config = RenderConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.font, "DejaVu Sans Mono");
        assert_eq!(config.html_path, PathBuf::from("art.html"));
    }

    #[test]
    fn load_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "initial_columns = \"many\"").unwrap();
        assert!(RenderConfig::load(Some(file.path())).is_err());
    }
}
