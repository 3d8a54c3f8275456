//! The game state machine: Running, Paused and GameOver.

use std::time::Duration;

use log::{debug, info};
use rand::Rng;

use crate::render::Overlay;
use crate::sched::{IntervalTimer, Scheduler, TimerId};
use crate::snake::{Direction, MoveResult, Snake};
use crate::{Cell, BASE_TICK, GRID_SIZE, MIN_TICK, SPEEDUP_EVERY, START_SNAKE, TICK_STEP};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Running,
    Paused,
    GameOver
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    snake: Snake,
    food: Cell,
    score: u32,
    alive: bool,
    paused: bool,
    tick: Duration,
}

impl GameState {
    /// A running game at base speed with no score.
    ///
    /// Panics if `food` lies on the snake.
    pub fn new(snake: Snake, food: Cell) -> Self {
        assert!(!snake.contains(food), "food {:?} placed on the snake", food);
        GameState { snake, food, score: 0, alive: true, paused: false, tick: BASE_TICK }
    }

    pub fn with_score(mut self, score: u32) -> Self {
        self.score = score;
        self
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick.max(MIN_TICK);
        self
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn direction(&self) -> Direction {
        self.snake.get_direction()
    }

    pub fn food(&self) -> Cell {
        self.food
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn alive(&self) -> bool {
        self.alive
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick
    }

    pub fn phase(&self) -> Phase {
        match (self.alive, self.paused) {
            (false, _) => Phase::GameOver,
            (true, true) => Phase::Paused,
            (true, false) => Phase::Running,
        }
    }

    pub fn overlay(&self) -> Overlay {
        match self.phase() {
            Phase::Running => Overlay::None,
            Phase::Paused => Overlay::Paused,
            Phase::GameOver => Overlay::GameOver,
        }
    }
}

/// Receives everything the simulation wants shown.
pub trait Frontend {
    fn draw(&mut self, state: &GameState, overlay: Overlay);

    /// Called once per game, right after the final frame is drawn.
    fn game_over(&mut self, _state: &GameState) {}
}

pub struct Simulation<S: Scheduler, R: Rng> {
    state: GameState,
    scheduler: S,
    timer: Option<TimerId>,
    rng: R,
}

impl<S: Scheduler, R: Rng> Simulation<S, R> {
    /// A fresh game, already scheduled. Nothing is drawn until the first
    /// operation that renders.
    pub fn new(scheduler: S, mut rng: R) -> Self {
        let state = fresh_state(&mut rng);
        Self::from_state(state, scheduler, rng)
    }

    /// Resumes from an arbitrary state, scheduling it if it is running.
    pub fn from_state(state: GameState, scheduler: S, rng: R) -> Self {
        let mut sim = Simulation { state, scheduler, timer: None, rng };
        if sim.state.phase() == Phase::Running {
            sim.schedule();
        }
        sim
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn reset(&mut self, ui: &mut impl Frontend) {
        self.state = fresh_state(&mut self.rng);
        self.schedule();
        info!("New game, food at {:?}", self.state.food);
        self.redraw(ui);
    }

    /// Requests a turn for the next step. Silently ignored when paused,
    /// dead, or when it would reverse a snake longer than one cell.
    pub fn set_direction(&mut self, direction: Direction) {
        if self.state.phase() != Phase::Running {
            return;
        }
        if !self.state.snake.set_direction(direction) {
            debug!("Ignored reversal to {:?}", direction);
        }
    }

    /// Flips the paused flag, or forces it when `force` is given.
    pub fn toggle_pause(&mut self, force: Option<bool>, ui: &mut impl Frontend) {
        if !self.state.alive {
            return;
        }

        let paused = force.unwrap_or(!self.state.paused);
        if paused == self.state.paused {
            return;
        }
        self.state.paused = paused;

        if paused {
            self.halt();
            info!("Paused at score {}", self.state.score);
        } else {
            self.schedule();
            info!("Resumed at {:?} per tick", self.state.tick);
        }
        self.redraw(ui);
    }

    /// Advances the game by one cell.
    pub fn step(&mut self, ui: &mut impl Frontend) {
        if self.state.phase() != Phase::Running {
            return;
        }

        let eats = self.state.snake.next_head() == self.state.food;

        match self.state.snake.move_step(eats) {
            MoveResult::Crashed(crash) => {
                self.state.alive = false;
                self.halt();
                info!("Game over ({:?}), score {}", crash, self.state.score);
                ui.draw(&self.state, Overlay::GameOver);
                ui.game_over(&self.state);
            }
            MoveResult::Moved { new_head } => {
                if eats {
                    self.state.score += 1;
                    self.state.food = spawn_food(&self.state.snake, &mut self.rng);
                    debug!(
                        "Ate at {:?}, score {}, food now at {:?}",
                        new_head, self.state.score, self.state.food
                    );

                    if self.state.score % SPEEDUP_EVERY == 0 && self.state.tick > MIN_TICK {
                        self.state.tick = self.state.tick.saturating_sub(TICK_STEP).max(MIN_TICK);
                        self.schedule();
                        info!("Speed up to {:?} per tick", self.state.tick);
                    }
                }
                ui.draw(&self.state, Overlay::None);
            }
        }
    }

    /// Draws the current state with the overlay its phase calls for.
    pub fn redraw(&self, ui: &mut impl Frontend) {
        ui.draw(&self.state, self.state.overlay());
    }

    ///////////////////////////////////////////////////////////////////////////

    fn schedule(&mut self) {
        self.halt();
        self.timer = Some(self.scheduler.start(self.state.tick));
    }

    fn halt(&mut self) {
        if let Some(id) = self.timer.take() {
            self.scheduler.cancel(id);
        }
    }
}

impl<R: Rng> Simulation<IntervalTimer, R> {
    /// Steps once if the tick is due at `now`. Returns whether it stepped.
    pub fn poll(&mut self, now: std::time::Instant, ui: &mut impl Frontend) -> bool {
        if !self.scheduler.due(now) {
            return false;
        }
        self.step(ui);
        true
    }
}

fn fresh_state<R: Rng>(rng: &mut R) -> GameState {
    let snake = Snake::from_cells(START_SNAKE, Direction::Right);
    let food = spawn_food(&snake, rng);
    GameState::new(snake, food)
}

/// Picks a uniformly random free cell by rejection sampling.
///
/// Terminates as long as the snake leaves some cell free; in this ruleset the
/// board is never close to full, so the expected number of draws stays small.
pub fn spawn_food<R: Rng>(snake: &Snake, rng: &mut R) -> Cell {
    debug_assert!(snake.len() < (GRID_SIZE as usize).pow(2));
    loop {
        let cell = (rng.gen_range(0..GRID_SIZE), rng.gen_range(0..GRID_SIZE));
        if !snake.contains(cell) {
            return cell;
        }
    }
}
