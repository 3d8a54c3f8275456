//! Turns raw key, pointer and focus events into game intents.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::snake::Direction::{self, *};
use crate::term::TermInt;

/// Swipes shorter than this on both axes count as taps.
pub const SWIPE_DEAD_ZONE: f32 = 12.0;

/// Rough pixel size of a terminal character cell, for swipe distances.
pub const CHAR_PX: (f32, f32) = (8.0, 16.0);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    Turn(Direction),
    TogglePause,
    Restart,
    Quit,
    /// The view went into the background.
    Hidden
}

pub fn key_intent(ev: &KeyEvent) -> Option<Intent> {
    if ev.kind == KeyEventKind::Release {
        return None;
    }
    if is_ctrl_c(ev) {
        return Some(Intent::Quit);
    }

    match ev.code {
        KeyCode::Char('w') | KeyCode::Up => Some(Intent::Turn(Up)),
        KeyCode::Char('a') | KeyCode::Left => Some(Intent::Turn(Left)),
        KeyCode::Char('s') | KeyCode::Down => Some(Intent::Turn(Down)),
        KeyCode::Char('d') | KeyCode::Right => Some(Intent::Turn(Right)),
        KeyCode::Char(' ') | KeyCode::Char('p') | KeyCode::Esc => Some(Intent::TogglePause),
        KeyCode::Char('r') => Some(Intent::Restart),
        KeyCode::Char('q') => Some(Intent::Quit),
        _ => None,
    }
}

pub fn is_ctrl_c(ev: &KeyEvent) -> bool {
    ev.code == KeyCode::Char('c') && ev.modifiers.contains(KeyModifiers::CONTROL)
}

/// Single-pointer swipe recognizer.
#[derive(Default)]
pub struct SwipeTracker {
    start: Option<(f32, f32)>,
}

impl SwipeTracker {
    pub fn begin(&mut self, x: f32, y: f32) {
        self.start = Some((x, y));
    }

    /// Ends the gesture. The dominant axis wins; ties go vertical.
    pub fn end(&mut self, x: f32, y: f32) -> Option<Direction> {
        let (sx, sy) = self.start.take()?;
        let (dx, dy) = (x - sx, y - sy);

        if dx.abs() < SWIPE_DEAD_ZONE && dy.abs() < SWIPE_DEAD_ZONE {
            return None;
        }

        if dx.abs() > dy.abs() {
            Some(if dx > 0.0 { Right } else { Left })
        } else {
            Some(if dy > 0.0 { Down } else { Up })
        }
    }

    pub fn cancel(&mut self) {
        self.start = None;
    }
}

pub fn char_to_px(col: TermInt, row: TermInt) -> (f32, f32) {
    (col as f32 * CHAR_PX.0, row as f32 * CHAR_PX.1)
}

pub struct Button {
    pub label: &'static str,
    pub col: TermInt,
    pub row: TermInt,
    pub intent: Intent,
}

impl Button {
    pub fn width(&self) -> TermInt {
        self.label.chars().count() as TermInt
    }

    fn hit(&self, col: TermInt, row: TermInt) -> bool {
        row == self.row && col >= self.col && col < self.col + self.width()
    }
}

/// On-screen directional pad plus pause and restart buttons.
pub struct ControlPad {
    buttons: Vec<Button>,
}

impl ControlPad {
    pub const HEIGHT: TermInt = 2;
    pub const WIDTH: TermInt = 26;

    /// Lays the pad out in two rows starting at `top_left`.
    pub fn new(top_left: (TermInt, TermInt)) -> Self {
        let (x, y) = top_left;
        let buttons = vec![
            Button { label: "[ ▲ ]", col: x + 5, row: y, intent: Intent::Turn(Up) },
            Button { label: "[ ◀ ]", col: x, row: y + 1, intent: Intent::Turn(Left) },
            Button { label: "[ ▼ ]", col: x + 5, row: y + 1, intent: Intent::Turn(Down) },
            Button { label: "[ ▶ ]", col: x + 10, row: y + 1, intent: Intent::Turn(Right) },
            Button { label: "[ Pause ]", col: x + 17, row: y, intent: Intent::TogglePause },
            Button { label: "[Restart]", col: x + 17, row: y + 1, intent: Intent::Restart },
        ];
        ControlPad { buttons }
    }

    pub fn buttons(&self) -> &[Button] {
        &self.buttons
    }

    pub fn hit(&self, col: TermInt, row: TermInt) -> Option<Intent> {
        self.buttons.iter().find(|b| b.hit(col, row)).map(|b| b.intent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn keys_map_to_intents() {
        assert_eq!(key_intent(&key(KeyCode::Up)), Some(Intent::Turn(Up)));
        assert_eq!(key_intent(&key(KeyCode::Char('a'))), Some(Intent::Turn(Left)));
        assert_eq!(key_intent(&key(KeyCode::Char(' '))), Some(Intent::TogglePause));
        assert_eq!(key_intent(&key(KeyCode::Esc)), Some(Intent::TogglePause));
        assert_eq!(key_intent(&key(KeyCode::Char('r'))), Some(Intent::Restart));
        assert_eq!(key_intent(&key(KeyCode::Char('x'))), None);

        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(key_intent(&ctrl_c), Some(Intent::Quit));
    }

    #[test]
    fn key_release_is_ignored() {
        let mut ev = key(KeyCode::Left);
        ev.kind = KeyEventKind::Release;
        assert_eq!(key_intent(&ev), None);
    }

    #[test]
    fn swipe_picks_dominant_axis() {
        let mut swipe = SwipeTracker::default();
        swipe.begin(100.0, 100.0);
        assert_eq!(swipe.end(140.0, 90.0), Some(Right));

        swipe.begin(100.0, 100.0);
        assert_eq!(swipe.end(95.0, 40.0), Some(Up));

        swipe.begin(100.0, 100.0);
        assert_eq!(swipe.end(70.0, 110.0), Some(Left));
    }

    #[test]
    fn short_swipe_is_a_tap() {
        let mut swipe = SwipeTracker::default();
        swipe.begin(100.0, 100.0);
        assert_eq!(swipe.end(111.0, 89.0), None);

        // A single column of drag stays inside the dead zone, a row does not.
        swipe.begin(char_to_px(3, 3).0, char_to_px(3, 3).1);
        assert_eq!(swipe.end(char_to_px(4, 3).0, char_to_px(4, 3).1), None);
        swipe.begin(char_to_px(3, 3).0, char_to_px(3, 3).1);
        assert_eq!(swipe.end(char_to_px(3, 4).0, char_to_px(3, 4).1), Some(Down));
    }

    #[test]
    fn end_without_begin_does_nothing() {
        let mut swipe = SwipeTracker::default();
        assert_eq!(swipe.end(0.0, 500.0), None);

        swipe.begin(0.0, 0.0);
        swipe.cancel();
        assert_eq!(swipe.end(0.0, 500.0), None);
    }

    #[test]
    fn pad_hit_testing() {
        let pad = ControlPad::new((10, 20));
        assert_eq!(pad.hit(15, 20), Some(Intent::Turn(Up)));
        assert_eq!(pad.hit(19, 20), Some(Intent::Turn(Up)));
        assert_eq!(pad.hit(20, 20), None);
        assert_eq!(pad.hit(10, 21), Some(Intent::Turn(Left)));
        assert_eq!(pad.hit(22, 21), Some(Intent::Turn(Right)));
        assert_eq!(pad.hit(27, 20), Some(Intent::TogglePause));
        assert_eq!(pad.hit(35, 21), Some(Intent::Restart));
        assert_eq!(pad.hit(10, 22), None);
    }
}
