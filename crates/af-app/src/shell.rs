//! Interactive prompt: edit the character pool, change the resolution, render.

use std::io::{BufRead, Write};

use af_ascii::{ConversionStats, Matcher, column_bounds};
use af_core::charset::{CharPool, PoolEdit};
use af_core::config::{OutputMode, RenderConfig};
use af_core::frame::floor_power_of_two;
use af_core::traits::AsciiOutput;
use af_render::{ConsoleOutput, HtmlOutput};
use anyhow::{Context, Result};

pub const PROMPT: &str = ">>> ";

const ADD_FORMAT_ERROR: &str = "Did not add due to incorrect format";
const REMOVE_FORMAT_ERROR: &str = "Did not remove due to incorrect format";
const RES_BOUNDARIES_ERROR: &str = "Did not change due to exceeding boundaries";
const INCORRECT_COMMAND_ERROR: &str = "Did not execute due to incorrect command";
const NO_CHARS_ERROR: &str = "Did not execute due to lack of chars";
const CONVERSION_ERROR: &str = "Did not execute due to unsupported resolution";
const OUTPUT_ERROR: &str = "Did not execute due to output failure";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Exit,
    Chars,
    Console,
    Html,
    Render,
    Add(String),
    Remove(String),
    Res(String),
    Unknown,
}

impl Command {
    /// Split on the first space: a word alone (or followed by nothing) is a
    /// single-word command, otherwise the rest is the argument.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);
        match line.split_once(' ') {
            Some((cmd, arg)) if !arg.is_empty() => match cmd {
                "add" => Self::Add(arg.to_string()),
                "remove" => Self::Remove(arg.to_string()),
                "res" => Self::Res(arg.to_string()),
                _ => Self::Unknown,
            },
            Some((cmd, _)) => Self::single(cmd),
            None => Self::single(line),
        }
    }

    fn single(word: &str) -> Self {
        match word {
            "exit" => Self::Exit,
            "chars" => Self::Chars,
            "console" => Self::Console,
            "html" => Self::Html,
            "render" => Self::Render,
            _ => Self::Unknown,
        }
    }
}

/// Read-eval loop over `input`, writing prompts and messages to `out`.
pub struct Shell<R: BufRead, W: Write> {
    input: R,
    out: W,
    matcher: Matcher,
    pool: CharPool,
    columns: u32,
    min_columns: u32,
    max_columns: u32,
    mode: OutputMode,
    html: HtmlOutput,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    /// The starting column count is `initial_columns` rounded down to a power
    /// of two, then clamped into the image's bounds. Initial characters are
    /// measured immediately.
    pub fn new(mut matcher: Matcher, config: &RenderConfig, input: R, out: W) -> Self {
        let (min_columns, max_columns) =
            column_bounds(matcher.image(), config.min_pixels_per_char);
        let columns = floor_power_of_two(config.initial_columns).clamp(min_columns, max_columns);
        let pool = CharPool::from_chars(config.initial_chars.chars());
        for c in pool.iter() {
            matcher.ensure_glyph(c);
        }
        log::info!("Shell ready: {columns} columns (bounds {min_columns}..={max_columns})");
        Self {
            input,
            out,
            html: HtmlOutput::new(&config.html_path, matcher.font()),
            matcher,
            pool,
            columns,
            min_columns,
            max_columns,
            mode: config.output,
        }
    }

    #[must_use]
    pub fn columns(&self) -> u32 {
        self.columns
    }

    #[must_use]
    pub fn pool(&self) -> &CharPool {
        &self.pool
    }

    #[must_use]
    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    #[must_use]
    pub fn stats(&self) -> ConversionStats {
        self.matcher.stats()
    }

    /// Run until `exit` or end of input.
    ///
    /// # Errors
    /// Returns an error if reading input or writing to the output fails.
    pub fn run(&mut self) -> Result<()> {
        let mut line = String::new();
        loop {
            write!(self.out, "{PROMPT}").context("Cannot write prompt")?;
            self.out.flush().context("Cannot flush prompt")?;
            line.clear();
            if self.input.read_line(&mut line).context("Cannot read input")? == 0 {
                writeln!(self.out).context("Cannot write output")?;
                return Ok(());
            }
            if !self.execute(Command::parse(&line))? {
                return Ok(());
            }
        }
    }

    /// Execute one command. Returns false on `exit`.
    ///
    /// # Errors
    /// Returns an error if writing to the output fails.
    pub fn execute(&mut self, command: Command) -> Result<bool> {
        match command {
            Command::Exit => return Ok(false),
            Command::Chars => writeln!(self.out, "{}", self.pool)?,
            Command::Console => self.mode = OutputMode::Console,
            Command::Html => self.mode = OutputMode::Html,
            Command::Render => self.render()?,
            Command::Add(arg) => self.add(&arg)?,
            Command::Remove(arg) => self.remove(&arg)?,
            Command::Res(arg) => self.resolution(&arg)?,
            Command::Unknown => writeln!(self.out, "{INCORRECT_COMMAND_ERROR}")?,
        }
        Ok(true)
    }

    fn add(&mut self, instruction: &str) -> Result<()> {
        let Some(edit) = PoolEdit::parse(instruction) else {
            writeln!(self.out, "{ADD_FORMAT_ERROR}")?;
            return Ok(());
        };
        for c in self.pool.insert_edit(edit) {
            self.matcher.ensure_glyph(c);
        }
        Ok(())
    }

    fn remove(&mut self, instruction: &str) -> Result<()> {
        match PoolEdit::parse(instruction) {
            Some(edit) => {
                let removed = self.pool.remove_edit(edit);
                log::debug!("Removed {removed} characters");
            }
            None => writeln!(self.out, "{REMOVE_FORMAT_ERROR}")?,
        }
        Ok(())
    }

    fn resolution(&mut self, instruction: &str) -> Result<()> {
        let next = match instruction {
            "up" => self
                .columns
                .checked_mul(2)
                .filter(|&c| c <= self.max_columns),
            "down" => Some(self.columns / 2).filter(|&c| c >= self.min_columns),
            _ => None,
        };
        match next {
            Some(columns) => {
                self.columns = columns;
                writeln!(self.out, "Width set to {columns}")?;
            }
            None => writeln!(self.out, "{RES_BOUNDARIES_ERROR}")?,
        }
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        if self.pool.is_empty() {
            writeln!(self.out, "{NO_CHARS_ERROR}")?;
            return Ok(());
        }
        let chars = self.pool.chars();
        let grid = match self.matcher.convert(&chars, self.columns) {
            Ok(grid) => grid,
            Err(e) => {
                log::error!("Conversion failed: {e:#}");
                writeln!(self.out, "{CONVERSION_ERROR}")?;
                return Ok(());
            }
        };
        let written = match self.mode {
            OutputMode::Html => self.html.output(grid),
            OutputMode::Console => ConsoleOutput::new(&mut self.out).output(grid),
        };
        if let Err(e) = written {
            log::error!("Render failed: {e:#}");
            writeln!(self.out, "{OUTPUT_ERROR}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use af_ascii::GlyphCatalog;
    use af_core::frame::{GlyphBitmap, RasterImage, Rgb};
    use af_core::traits::GlyphRasterizer;

    use super::*;

    /// '#' fully inked, '.' fully blank, anything else half blank.
    struct Stub;

    impl GlyphRasterizer for Stub {
        fn render(&self, ch: char, size: u32, _font: &str) -> GlyphBitmap {
            let mut bitmap = GlyphBitmap::blank(size);
            let inked = match ch {
                '#' => size * size,
                '.' | ' ' => 0,
                _ => size * size / 2,
            };
            for i in 0..inked {
                bitmap.ink(i % size, i / size);
            }
            bitmap
        }
    }

    fn left_dark_image() -> RasterImage {
        let mut pixels = Vec::new();
        for _y in 0..8 {
            for x in 0..8 {
                let v = if x < 4 { 0 } else { 255 };
                pixels.push(Rgb::new(v, v, v));
            }
        }
        RasterImage::from_pixels(8, 8, pixels).unwrap()
    }

    fn config(initial_chars: &str, columns: u32) -> RenderConfig {
        RenderConfig {
            initial_chars: initial_chars.to_string(),
            initial_columns: columns,
            output: OutputMode::Console,
            ..RenderConfig::default()
        }
    }

    fn run(config: &RenderConfig, script: &str) -> String {
        let matcher = Matcher::new(
            left_dark_image(),
            "mono",
            GlyphCatalog::with_resolution(Box::new(Stub), 4),
        );
        let mut out = Vec::new();
        Shell::new(matcher, config, Cursor::new(script.as_bytes()), &mut out)
            .run()
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    fn messages(output: &str) -> Vec<String> {
        output
            .split(PROMPT)
            .map(|s| s.trim_end_matches('\n').to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    #[test]
    fn parse_commands() {
        assert_eq!(Command::parse("exit\n"), Command::Exit);
        assert_eq!(Command::parse("add a-z\r\n"), Command::Add("a-z".into()));
        assert_eq!(Command::parse("add space"), Command::Add("space".into()));
        assert_eq!(Command::parse("res up"), Command::Res("up".into()));
        assert_eq!(Command::parse("render "), Command::Render);
        assert_eq!(Command::parse("add"), Command::Unknown);
        assert_eq!(Command::parse("jump up"), Command::Unknown);
        assert_eq!(Command::parse(""), Command::Unknown);
    }

    #[test]
    fn coarse_pixel_budget_still_renders() {
        // 32 px wide, 3 px per char: the upper bound rounds 10 down to 8.
        let matcher = Matcher::new(
            RasterImage::filled(32, 32, Rgb::new(0, 0, 0)),
            "mono",
            GlyphCatalog::with_resolution(Box::new(Stub), 4),
        );
        let config = RenderConfig {
            min_pixels_per_char: 3,
            ..config("#.", 64)
        };
        let mut out = Vec::new();
        let mut shell = Shell::new(
            matcher,
            &config,
            Cursor::new(&b"render\nres up\nres down\nrender\nexit\n"[..]),
            &mut out,
        );
        assert_eq!(shell.columns(), 8);
        shell.run().unwrap();
        assert_eq!(shell.stats().conversions, 2);
        drop(shell);

        let out = String::from_utf8(out).unwrap();
        let messages = messages(&out);
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0], vec!["# # # # # # # #"; 8].join("\n"));
        assert_eq!(messages[1], RES_BOUNDARIES_ERROR);
        assert_eq!(messages[2], "Width set to 4");
        assert_eq!(messages[3], vec!["# # # #"; 4].join("\n"));
    }

    #[test]
    fn output_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let config = RenderConfig {
            html_path: dir.path().join("missing").join("art.html"),
            output: OutputMode::Html,
            ..config("#.", 2)
        };
        let out = run(&config, "render\nexit\n");
        assert_eq!(messages(&out), vec![OUTPUT_ERROR]);
    }

    #[test]
    fn chars_lists_pool_in_code_order() {
        let out = run(&config("0123456789", 4), "add z-x\nremove 5\nchars\nexit\n");
        assert_eq!(messages(&out), vec!["0 1 2 3 4 6 7 8 9 x y z"]);
    }

    #[test]
    fn bad_instructions_report_format_errors() {
        let out = run(&config("0", 4), "add ab\nremove a-\nadd \u{e9}\nexit\n");
        assert_eq!(
            messages(&out),
            vec![ADD_FORMAT_ERROR, REMOVE_FORMAT_ERROR, ADD_FORMAT_ERROR]
        );
    }

    #[test]
    fn resolution_respects_bounds() {
        // 8x8 image, 2 px per char: columns in 1..=4.
        let out = run(
            &config("0", 64),
            "res up\nres down\nres down\nres down\nres down\nres sideways\nexit\n",
        );
        assert_eq!(
            messages(&out),
            vec![
                RES_BOUNDARIES_ERROR.to_string(),
                "Width set to 2".to_string(),
                "Width set to 1".to_string(),
                RES_BOUNDARIES_ERROR.to_string(),
                RES_BOUNDARIES_ERROR.to_string(),
                RES_BOUNDARIES_ERROR.to_string(),
            ]
        );
    }

    #[test]
    fn initial_columns_are_clamped() {
        let matcher = Matcher::new(
            left_dark_image(),
            "mono",
            GlyphCatalog::with_resolution(Box::new(Stub), 4),
        );
        let shell = Shell::new(matcher, &config("0", 3), Cursor::new(&b""[..]), Vec::new());
        assert_eq!(shell.columns(), 2);
    }

    #[test]
    fn render_to_console() {
        let out = run(&config("#.", 4), "render\nexit\n");
        assert_eq!(messages(&out), vec!["# # . .\n# # . .\n# # . .\n# # . ."]);
    }

    #[test]
    fn render_with_empty_pool() {
        let out = run(&config("", 4), "render\nexit\n");
        assert_eq!(messages(&out), vec![NO_CHARS_ERROR]);
    }

    #[test]
    fn unknown_command() {
        let out = run(&config("0", 4), "dance\nexit\n");
        assert_eq!(messages(&out), vec![INCORRECT_COMMAND_ERROR]);
    }

    #[test]
    fn end_of_input_stops_the_loop() {
        let out = run(&config("0", 4), "chars\n");
        assert_eq!(messages(&out), vec!["0"]);
    }

    #[test]
    fn html_mode_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("art.html");
        let config = RenderConfig {
            html_path: path.clone(),
            ..config("#.", 2)
        };
        let out = run(&config, "console\nhtml\nrender\nexit\n");
        assert!(messages(&out).is_empty());
        let page = std::fs::read_to_string(&path).unwrap();
        assert!(page.contains("#.<br>"));
        assert!(page.contains("font-family:'mono'"));
    }

    #[test]
    fn repeated_render_hits_memo() {
        let matcher = Matcher::new(
            left_dark_image(),
            "mono",
            GlyphCatalog::with_resolution(Box::new(Stub), 4),
        );
        let mut out = Vec::new();
        let mut shell = Shell::new(
            matcher,
            &config("#.", 4),
            Cursor::new(&b"render\nrender\nexit\n"[..]),
            &mut out,
        );
        shell.run().unwrap();
        assert_eq!(shell.stats().memo_hits, 1);
        assert_eq!(shell.mode(), OutputMode::Console);
        assert_eq!(shell.pool().len(), 2);
    }
}
