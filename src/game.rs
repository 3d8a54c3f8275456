use std::io;
use std::time::Instant;

use anyhow::Context;
use crossterm::event::{Event, KeyCode, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use embedded_graphics::pixelcolor::Rgb888;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::Rng;

use crate::canvas::Canvas;
use crate::config::Config;
use crate::host::{score_label, Host, Popup};
use crate::input::{self, char_to_px, ControlPad, Intent, SwipeTracker};
use crate::render::{self, Overlay, TEXT_COLOR};
use crate::sched::{IntervalTimer, Scheduler};
use crate::sim::{Frontend, GameState, Simulation};
use crate::term::{Coords, TermInt, TermManager};
use crate::GRID_SIZE;

const BOARD_COLS: TermInt = GRID_SIZE as TermInt * 2;
const BOARD_ROWS: TermInt = GRID_SIZE as TermInt;

const HINT: &str = "wasd/arrows · space pause · q";
const HINT_COLOR: Rgb888 = Rgb888::new(0x64, 0x74, 0x8b);

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit
}

/// A frame sink that may be holding a modal popup.
trait Screen: Frontend {
    fn modal_open(&self) -> bool;
    fn close_modal(&mut self);

    /// Everything outside the next frame is garbage; wipe it first.
    fn invalidate(&mut self);
}

pub struct SnakeGame {
    sim: Simulation<IntervalTimer, StdRng>,
    view: View,
    controls: Controls,
}

/// Screen positions, centered in the terminal.
struct Layout {
    score: Coords,
    board: Coords,
    pad: Coords,
    hint: Coords,
}

/// Maps terminal events onto simulation operations.
struct Controls {
    layout: Layout,
    pad: ControlPad,
    swipe: SwipeTracker,
}

struct View {
    term: TermManager,
    canvas: Canvas,
    score: u32,
    overlay: Overlay,
    dirty: bool,
    stale: bool,
    popup: Option<Popup>,
}

impl SnakeGame {
    pub fn new(config: &Config, rng: StdRng) -> io::Result<Self> {
        let term = TermManager::new()?;
        let controls = Controls::new(term.get_terminal_size());
        let side = config.canvas_size();

        let view = View {
            term,
            canvas: Canvas::new(side, side),
            score: 0,
            overlay: Overlay::None,
            dirty: false,
            stale: true,
            popup: None,
        };

        let sim = Simulation::new(IntervalTimer::new(), rng);
        Ok(SnakeGame { sim, view, controls })
    }

    /// Runs until the player quits. The terminal is restored on every exit
    /// path; an error from the game wins over one from restoring.
    pub fn run(&mut self) -> anyhow::Result<()> {
        let res = self.view.term.setup().context("setting up the terminal");
        let res = res.and_then(|()| self.play());
        settle(res, self.view.term.restore())
    }

    ///////////////////////////////////////////////////////////////////////////

    fn play(&mut self) -> anyhow::Result<()> {
        self.view.term.ready()?;
        self.view.term.expand()?;

        self.sim.reset(&mut self.view);
        self.view.flush(&self.controls)?;

        loop {
            let timeout = self.sim.scheduler().timeout(Instant::now());

            for ev in self.view.term.poll_events(timeout)? {
                if self.controls.handle(ev, &mut self.sim, &mut self.view) == Flow::Quit {
                    info!("Quit with score {}", self.sim.state().score());
                    return Ok(());
                }
            }

            self.sim.poll(Instant::now(), &mut self.view);
            self.view.flush(&self.controls)?;
        }
    }
}

impl Layout {
    fn new(term_size: Coords) -> Self {
        let height = 1 + BOARD_ROWS + 1 + ControlPad::HEIGHT + 1;
        let left = term_size.0.saturating_sub(BOARD_COLS) / 2;
        let top = term_size.1.saturating_sub(height) / 2;

        Layout {
            score: (left, top),
            board: (left, top + 1),
            pad: (left + (BOARD_COLS - ControlPad::WIDTH) / 2, top + 2 + BOARD_ROWS),
            hint: (left, top + 2 + BOARD_ROWS + ControlPad::HEIGHT),
        }
    }

    fn on_board(&self, col: TermInt, row: TermInt) -> bool {
        let (x, y) = self.board;
        (x..x + BOARD_COLS).contains(&col) && (y..y + BOARD_ROWS).contains(&row)
    }
}

impl Controls {
    fn new(term_size: Coords) -> Self {
        let layout = Layout::new(term_size);
        let pad = ControlPad::new(layout.pad);
        Controls { layout, pad, swipe: SwipeTracker::default() }
    }

    fn handle<S, R, V>(&mut self, ev: Event, sim: &mut Simulation<S, R>, ui: &mut V) -> Flow
    where
        S: Scheduler,
        R: Rng,
        V: Screen,
    {
        match ev {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                if ui.modal_open() {
                    if input::is_ctrl_c(&key) || key.code == KeyCode::Char('q') {
                        return Flow::Quit;
                    }
                    dismiss(sim, ui);
                    return Flow::Continue;
                }

                match input::key_intent(&key) {
                    Some(intent) => apply(intent, sim, ui),
                    None => Flow::Continue,
                }
            }
            Event::Mouse(mouse) => self.handle_mouse(mouse, sim, ui),
            Event::FocusLost => apply(Intent::Hidden, sim, ui),
            Event::Resize(w, h) => {
                *self = Controls::new((w, h));
                ui.invalidate();
                sim.redraw(ui);
                Flow::Continue
            }
            _ => Flow::Continue,
        }
    }

    fn handle_mouse<S, R, V>(
        &mut self,
        mouse: MouseEvent,
        sim: &mut Simulation<S, R>,
        ui: &mut V,
    ) -> Flow
    where
        S: Scheduler,
        R: Rng,
        V: Screen,
    {
        let MouseEvent { kind, column, row, .. } = mouse;

        match kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.swipe.cancel();
                if ui.modal_open() {
                    dismiss(sim, ui);
                    return Flow::Continue;
                }
                if let Some(intent) = self.pad.hit(column, row) {
                    return apply(intent, sim, ui);
                }
                if self.layout.on_board(column, row) {
                    let (x, y) = char_to_px(column, row);
                    self.swipe.begin(x, y);
                }
                Flow::Continue
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let (x, y) = char_to_px(column, row);
                match self.swipe.end(x, y) {
                    Some(dir) => apply(Intent::Turn(dir), sim, ui),
                    None => Flow::Continue,
                }
            }
            _ => Flow::Continue,
        }
    }
}

fn apply<S, R, V>(intent: Intent, sim: &mut Simulation<S, R>, ui: &mut V) -> Flow
where
    S: Scheduler,
    R: Rng,
    V: Frontend,
{
    match intent {
        Intent::Turn(dir) => sim.set_direction(dir),
        Intent::TogglePause => sim.toggle_pause(None, ui),
        Intent::Restart => sim.reset(ui),
        Intent::Hidden => {
            if sim.state().alive() && !sim.state().paused() {
                info!("Lost focus, pausing");
            }
            sim.toggle_pause(Some(true), ui);
        }
        Intent::Quit => return Flow::Quit,
    }
    Flow::Continue
}

/// Merges the game's outcome with the terminal restore's.
fn settle(res: anyhow::Result<()>, restored: io::Result<()>) -> anyhow::Result<()> {
    if let Err(e) = restored {
        warn!("Could not restore the terminal: {}", e);
        if res.is_ok() {
            return Err(e).context("restoring the terminal");
        }
    }
    res
}

fn dismiss<S: Scheduler, R: Rng, V: Screen>(sim: &mut Simulation<S, R>, ui: &mut V) {
    ui.close_modal();
    sim.redraw(ui);
}

impl View {
    /// Pushes pending drawing to the terminal.
    fn flush(&mut self, controls: &Controls) -> io::Result<()> {
        if !self.dirty {
            return Ok(());
        }
        self.dirty = false;

        if self.stale {
            self.stale = false;
            self.term.clear()?;
        }

        let layout = &controls.layout;
        let score = format!("{:<width$}", score_label(self.score), width = BOARD_COLS as usize);
        self.term.print_text(layout.score, &score, TEXT_COLOR, None)?;
        let size = (BOARD_COLS, BOARD_ROWS);
        self.term.present(&self.canvas, layout.board, size, self.overlay.label())?;

        for button in controls.pad.buttons() {
            self.term.print_text((button.col, button.row), button.label, TEXT_COLOR, None)?;
        }
        self.term.print_text(layout.hint, HINT, HINT_COLOR, None)?;

        match &self.popup {
            Some(popup) => self.term.show_popup(popup),
            None => self.term.flush(),
        }
    }
}

impl Frontend for View {
    fn draw(&mut self, state: &GameState, overlay: Overlay) {
        render::render(&mut self.canvas, state, overlay);
        self.score = state.score();
        self.overlay = overlay;
        self.dirty = true;
    }

    fn game_over(&mut self, state: &GameState) {
        self.popup = Some(Popup::game_over(state.score()));
    }
}

impl Screen for View {
    fn modal_open(&self) -> bool {
        self.popup.is_some()
    }

    fn close_modal(&mut self) {
        self.popup = None;
        self.stale = true;
    }

    fn invalidate(&mut self) {
        self.stale = true;
    }
}
