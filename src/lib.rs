//! A 16×16 grid snake game: a tick-driven simulation, a raster renderer and
//! the input/host glue that drives both from a terminal.

pub mod canvas;
pub mod config;
pub mod game;
pub mod host;
pub mod input;
pub mod render;
pub mod sched;
pub mod sim;
pub mod snake;
pub mod term;

use std::time::Duration;

pub type GridInt = i16;

/// A grid cell as `(x, y)`, origin in the top-left corner.
pub type Cell = (GridInt, GridInt);

/// Cells per side of the square play area.
pub const GRID_SIZE: GridInt = 16;

pub const START_SNAKE: [Cell; 3] = [(7, 8), (6, 8), (5, 8)];

pub const BASE_TICK: Duration = Duration::from_millis(120);
pub const MIN_TICK: Duration = Duration::from_millis(60);
pub const TICK_STEP: Duration = Duration::from_millis(8);

/// The tick speeds up every time the score reaches a multiple of this.
pub const SPEEDUP_EVERY: u32 = 5;

pub fn in_bounds(cell: Cell) -> bool {
    (0..GRID_SIZE).contains(&cell.0) && (0..GRID_SIZE).contains(&cell.1)
}

pub use render::Overlay;
pub use sched::{IntervalTimer, Scheduler, TimerId};
pub use sim::{Frontend, GameState, Phase, Simulation};
pub use snake::{Crash, Direction, MoveResult, Snake};
