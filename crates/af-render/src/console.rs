use std::io::Write;

use af_core::frame::CharGrid;
use af_core::traits::AsciiOutput;
use anyhow::{Context, Result};

/// Prints each row with its characters separated by single spaces.
///
/// The extra space roughly compensates for terminal cells being taller than wide.
///
/// # Example
/// ```
/// use af_core::frame::CharGrid;
/// use af_core::traits::AsciiOutput;
/// use af_render::ConsoleOutput;
///
/// let mut out = ConsoleOutput::new(Vec::new());
/// out.output(&CharGrid::filled(3, 1, '#')).unwrap();
/// assert_eq!(out.into_inner(), b"# # #\n");
/// ```
pub struct ConsoleOutput<W: Write> {
    writer: W,
}

impl<W: Write> ConsoleOutput<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// One row, characters joined by a space.
#[must_use]
pub fn format_row(row: &[char]) -> String {
    let mut line = String::with_capacity(row.len() * 2);
    for (i, c) in row.iter().enumerate() {
        if i > 0 {
            line.push(' ');
        }
        line.push(*c);
    }
    line
}

impl<W: Write> AsciiOutput for ConsoleOutput<W> {
    fn output(&mut self, grid: &CharGrid) -> Result<()> {
        for row in grid.rows() {
            writeln!(self.writer, "{}", format_row(row)).context("Console write failed")?;
        }
        self.writer.flush().context("Console flush failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_space_joined() {
        let mut grid = CharGrid::filled(2, 2, '.');
        grid.set(0, 1, '@');
        let mut out = ConsoleOutput::new(Vec::new());
        out.output(&grid).unwrap();
        assert_eq!(String::from_utf8(out.into_inner()).unwrap(), ". .\n@ .\n");
    }

    #[test]
    fn empty_grid_prints_nothing() {
        let mut out = ConsoleOutput::new(Vec::new());
        out.output(&CharGrid::filled(0, 0, ' ')).unwrap();
        assert!(out.into_inner().is_empty());
    }
}
