//! Optional host integration: readiness, full-viewport requests and modal
//! popups. Every call is a no-op unless the host overrides it.

use std::io;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Popup {
    pub title: String,
    pub message: String,
    pub button: String,
}

impl Popup {
    pub fn game_over(score: u32) -> Self {
        Popup {
            title: "Игра окончена".to_string(),
            message: score_label(score),
            button: "OK".to_string(),
        }
    }
}

pub fn score_label(score: u32) -> String {
    format!("Счёт: {}", score)
}

pub trait Host {
    fn ready(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn expand(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn show_popup(&mut self, _popup: &Popup) -> io::Result<()> {
        Ok(())
    }
}

/// Stands in when nothing hosts the game.
pub struct NoHost;

impl Host for NoHost {}
