use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

use crate::GRID_SIZE;

const MIN_CANVAS_PX: u32 = 64;
const MAX_CANVAS_PX: u32 = 4096;

#[derive(Parser, Debug, Clone)]
#[command(name = "gridsnake", version, about = "Snake on a 16×16 grid, in the terminal")]
pub struct Config {
    /// Seed for food placement; random when omitted
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log destination. The screen belongs to the game
    #[arg(long, default_value = "gridsnake.log")]
    pub log_file: PathBuf,

    #[arg(long, default_value_t = LevelFilter::Info)]
    pub log_level: LevelFilter,

    /// Raster size in pixels, rounded down to a multiple of 32 (64..=4096)
    #[arg(long, default_value_t = 320)]
    pub canvas_px: u32,
}

impl Config {
    /// Side of the square canvas. Each terminal sample then averages the same
    /// number of pixels.
    pub fn canvas_size(&self) -> u32 {
        let unit = 2 * GRID_SIZE as u32;
        (self.canvas_px / unit * unit).clamp(MIN_CANVAS_PX, MAX_CANVAS_PX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["gridsnake"]).unwrap();
        assert_eq!(config.seed, None);
        assert_eq!(config.log_file, PathBuf::from("gridsnake.log"));
        assert_eq!(config.log_level, LevelFilter::Info);
        assert_eq!(config.canvas_size(), 320);
    }

    #[test]
    fn explicit_options() {
        let config = Config::try_parse_from([
            "gridsnake", "--seed", "5", "--log-level", "debug", "--canvas-px", "100",
        ])
        .unwrap();
        assert_eq!(config.seed, Some(5));
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert_eq!(config.canvas_size(), 96);
    }

    #[test]
    fn tiny_canvas_is_raised() {
        let config = Config::try_parse_from(["gridsnake", "--canvas-px", "10"]).unwrap();
        assert_eq!(config.canvas_size(), MIN_CANVAS_PX);
    }

    #[test]
    fn huge_canvas_is_capped() {
        let config = Config::try_parse_from(["gridsnake", "--canvas-px", "4294967295"]).unwrap();
        assert_eq!(config.canvas_size(), MAX_CANVAS_PX);

        let config = Config::try_parse_from(["gridsnake", "--canvas-px", "5000"]).unwrap();
        assert_eq!(config.canvas_size(), MAX_CANVAS_PX);
    }

    #[test]
    fn bad_level_is_rejected() {
        assert!(Config::try_parse_from(["gridsnake", "--log-level", "loud"]).is_err());
    }
}
