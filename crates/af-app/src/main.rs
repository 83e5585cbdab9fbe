mod cli;
mod shell;

use std::io;

use af_ascii::{FontRasterizer, GlyphCatalog, Matcher, ResolutionCache};
use af_core::config::RenderConfig;
use anyhow::Result;
use clap::Parser;

use crate::cli::Cli;
use crate::shell::Shell;

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut config = RenderConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config);

    let image = af_source::image::load_image(&cli.image)?;
    let rasterizer = FontRasterizer::discover(&config.font, config.font_path.as_deref())?;
    let catalog = GlyphCatalog::with_resolution(Box::new(rasterizer), config.glyph_resolution);
    let matcher = Matcher::with_cache(
        image,
        config.font.clone(),
        catalog,
        ResolutionCache::new(config.cache_capacity),
    );

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut shell = Shell::new(matcher, &config, stdin.lock(), stdout.lock());
    shell.run()?;

    let stats = shell.stats();
    log::debug!(
        "{} conversions, {} memo hits, {} cache hits, {} cache misses",
        stats.conversions,
        stats.memo_hits,
        stats.cache_hits,
        stats.cache_misses
    );
    Ok(())
}
