//! Command-line arguments.

use std::path::PathBuf;

use af_core::config::{OutputMode, RenderConfig};
use clap::Parser;

/// Convert an image to brightness-matched character art from an interactive prompt
#[derive(Parser, Debug)]
#[command(name = "glyphtile")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Image to convert (PNG, JPEG, BMP or GIF)
    pub image: PathBuf,

    /// TOML configuration file
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Font name used for glyph measurement and in the HTML page
    #[arg(long)]
    pub font: Option<String>,

    /// Explicit TTF/OTF file for the font
    #[arg(long)]
    pub font_path: Option<PathBuf>,

    /// Characters per row at startup
    #[arg(long)]
    pub columns: Option<u32>,

    /// Start with console output instead of HTML
    #[arg(long, conflicts_with = "html")]
    pub console: bool,

    /// HTML output file
    #[arg(long, value_name = "PATH")]
    pub html: Option<PathBuf>,
}

impl Cli {
    /// Les options de la ligne de commande écrasent celles du fichier.
    pub fn apply(&self, config: &mut RenderConfig) {
        if let Some(ref font) = self.font {
            config.font.clone_from(font);
        }
        if let Some(ref path) = self.font_path {
            config.font_path = Some(path.clone());
        }
        if let Some(columns) = self.columns {
            config.initial_columns = columns;
        }
        if self.console {
            config.output = OutputMode::Console;
        }
        if let Some(ref path) = self.html {
            config.html_path.clone_from(path);
            config.output = OutputMode::Html;
        }
    }
}
