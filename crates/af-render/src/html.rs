use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use af_core::frame::CharGrid;
use af_core::traits::AsciiOutput;
use anyhow::{Context, Result};

/// Taille de police par défaut dans la page (px).
pub const DEFAULT_FONT_SIZE: u32 = 4;

/// Writes the grid as a standalone HTML page, one `<br>`-terminated line per row.
pub struct HtmlOutput {
    path: PathBuf,
    font: String,
    font_size: u32,
}

impl HtmlOutput {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, font: &str) -> Self {
        Self {
            path: path.into(),
            font: sanitize_font(font),
            font_size: DEFAULT_FONT_SIZE,
        }
    }

    #[must_use]
    pub fn with_font_size(mut self, font_size: u32) -> Self {
        self.font_size = font_size.max(1);
        self
    }

    /// Full document for `grid`.
    #[must_use]
    pub fn document(&self, grid: &CharGrid) -> String {
        let mut body = String::new();
        for row in grid.rows() {
            for &c in row {
                push_escaped(&mut body, c);
            }
            body.push_str("<br>\n");
        }
        format!(
            "<!DOCTYPE html>\n\
             <html>\n\
             <head>\n<meta charset=\"utf-8\">\n<title>glyphtile</title>\n</head>\n\
             <body style=\"margin:0;background:#fff;color:#000\">\n\
             <div style=\"font-family:'{font}',monospace;font-size:{size}px;line-height:{size}px;letter-spacing:0\">\n\
             {body}\
             </div>\n\
             </body>\n\
             </html>\n",
            font = self.font,
            size = self.font_size,
        )
    }
}

/// Keep the font name safe inside a quoted CSS value in an attribute.
fn sanitize_font(font: &str) -> String {
    font.chars()
        .filter(|c| !matches!(c, '\'' | '"' | '<' | '>' | '&' | ';'))
        .collect()
}

fn push_escaped(out: &mut String, c: char) {
    match c {
        ' ' => out.push_str("&nbsp;"),
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        '\'' => out.push_str("&#39;"),
        _ => out.push(c),
    }
}

impl AsciiOutput for HtmlOutput {
    fn output(&mut self, grid: &CharGrid) -> Result<()> {
        let file = File::create(&self.path)
            .with_context(|| format!("Cannot create {}", self.path.display()))?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(self.document(grid).as_bytes())
            .and_then(|()| writer.flush())
            .with_context(|| format!("Cannot write {}", self.path.display()))?;
        log::info!(
            "Wrote {}x{} grid to {}",
            grid.width(),
            grid.height(),
            self.path.display()
        );
        Ok(())
    }
}
