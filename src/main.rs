use std::fs::File;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use simplelog::WriteLogger;

use gridsnake::config::Config;
use gridsnake::game::SnakeGame;

fn main() -> Result<()> {
    let config = Config::parse();
    init_logging(&config)?;

    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    info!("Starting gridsnake, seed {:?}, canvas {}px", config.seed, config.canvas_size());

    let mut game = SnakeGame::new(&config, rng).context("opening the terminal")?;
    game.run()
}

fn init_logging(config: &Config) -> Result<()> {
    let file = File::create(&config.log_file)
        .with_context(|| format!("creating log file {}", config.log_file.display()))?;
    WriteLogger::init(config.log_level, simplelog::Config::default(), file)
        .context("installing the logger")
}
