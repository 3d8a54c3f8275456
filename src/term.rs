use std::io::{self, Stdout, Write};
use std::time::Duration;

use crossterm::event::{
    poll, read, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
    Event,
};
use crossterm::style::Color;
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue, style, terminal};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::RgbColor;
use log::info;

use crate::canvas::Canvas;
use crate::host::{Host, Popup};
use crate::render::TEXT_COLOR;

pub type TermInt = u16;
pub type Coords = (TermInt, TermInt);

/// What shows through the transparent parts of a canvas.
pub const BACKDROP: Rgb888 = Rgb888::new(0x0f, 0x17, 0x2a);

const UPPER_HALF_BLOCK: char = '▀';

pub struct TermManager<W: Write = Stdout> {
    width: TermInt,
    height: TermInt,
    out: W,
    active: bool,
}

impl TermManager {
    pub fn new() -> io::Result<Self> {
        let size = terminal::size()?;
        Ok(Self::with_writer(io::stdout(), size))
    }
}

impl<W: Write> TermManager<W> {
    pub fn with_writer(out: W, size: Coords) -> Self {
        TermManager { width: size.0, height: size.1, out, active: false }
    }

    pub fn writer(&self) -> &W {
        &self.out
    }

    /// Marks the terminal as taken before touching it, so a failure halfway
    /// through still gets undone by `restore`.
    pub fn setup(&mut self) -> io::Result<()> {
        self.active = true;
        execute!(self.out, EnterAlternateScreen, EnableMouseCapture, EnableFocusChange)?;
        terminal::enable_raw_mode()?;
        execute!(self.out, cursor::Hide, cursor::DisableBlinking)
    }

    /// Undoes every setup step, even when one of them fails. Returns the
    /// first error.
    pub fn restore(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        let raw = terminal::disable_raw_mode();
        let screen = execute!(
            self.out,
            style::ResetColor,
            cursor::Show,
            cursor::EnableBlinking,
            DisableFocusChange,
            DisableMouseCapture,
            LeaveAlternateScreen
        );
        raw.and(screen)
    }

    /// Waits up to `timeout` for input, then drains whatever else is queued.
    pub fn poll_events(&mut self, timeout: Duration) -> io::Result<Vec<Event>> {
        let mut events = vec![];

        if poll(timeout)? {
            events.push(read()?);
            while poll(Duration::ZERO)? {
                events.push(read()?);
            }
        }

        for ev in &events {
            if let Event::Resize(w, h) = ev {
                self.width = *w;
                self.height = *h;
            }
        }

        Ok(events)
    }

    pub fn get_terminal_size(&self) -> Coords {
        (self.width, self.height)
    }

    /// Paints `canvas` into a `cols × rows` block of characters at `top_left`,
    /// two vertical samples per character. Raster text is illegible at this
    /// scale, so `caption` is printed over the block's center instead.
    pub fn present(
        &mut self,
        canvas: &Canvas,
        top_left: Coords,
        (cols, rows): Coords,
        caption: Option<&str>,
    ) -> io::Result<()> {
        let samples = canvas.downsample(cols as u32, rows as u32 * 2, BACKDROP);
        let at = |row: TermInt, col: TermInt| samples[row as usize * cols as usize + col as usize];

        for row in 0..rows {
            queue!(self.out, cursor::MoveTo(top_left.0, top_left.1 + row))?;
            for col in 0..cols {
                queue!(
                    self.out,
                    style::SetForegroundColor(term_color(at(row * 2, col))),
                    style::SetBackgroundColor(term_color(at(row * 2 + 1, col))),
                    style::Print(UPPER_HALF_BLOCK)
                )?;
            }
        }

        if let Some(text) = caption {
            let len = text.chars().count() as TermInt;
            let (col, row) = (cols / 2, rows / 2);
            let pos = (top_left.0 + col.saturating_sub(len / 2), top_left.1 + row);
            self.print_text(pos, text, TEXT_COLOR, Some(at(row * 2, col)))?;
        }

        queue!(self.out, style::ResetColor)
    }

    pub fn print_text(
        &mut self,
        pos: Coords,
        text: &str,
        fg: Rgb888,
        bg: Option<Rgb888>,
    ) -> io::Result<()> {
        queue!(self.out, cursor::MoveTo(pos.0, pos.1), style::SetForegroundColor(term_color(fg)))?;
        if let Some(bg) = bg {
            queue!(self.out, style::SetBackgroundColor(term_color(bg)))?;
        }
        queue!(self.out, style::Print(text), style::ResetColor)
    }

    pub fn show_message(&mut self, lines: &[&str]) -> io::Result<()> {
        let msg_height = (lines.len() + 2) as TermInt;
        let msg_width = (lines.iter().map(|x| x.chars().count()).max().unwrap_or(0) + 4) as TermInt;
        let center = (self.width / 2, self.height / 2);
        let top_left = (
            center.0.saturating_sub(msg_width / 2),
            center.1.saturating_sub(msg_height / 2),
        );

        let blank = " ".repeat(msg_width as usize);
        for y in [top_left.1, top_left.1 + msg_height - 1] {
            self.print_text((top_left.0, y), &blank, TEXT_COLOR, Some(BACKDROP))?;
        }

        for (i, line) in lines.iter().enumerate() {
            let padded_line = format!("{line: ^width$}", line = line, width = msg_width as usize);
            let y = top_left.1 + i as TermInt + 1;
            self.print_text((top_left.0, y), &padded_line, TEXT_COLOR, Some(BACKDROP))?;
        }

        self.flush()
    }

    pub fn clear(&mut self) -> io::Result<()> {
        queue!(self.out, style::ResetColor, terminal::Clear(ClearType::All))
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

impl<W: Write> Host for TermManager<W> {
    fn ready(&mut self) -> io::Result<()> {
        info!("Terminal ready at {}x{}", self.width, self.height);
        Ok(())
    }

    fn expand(&mut self) -> io::Result<()> {
        self.clear()?;
        self.flush()
    }

    fn show_popup(&mut self, popup: &Popup) -> io::Result<()> {
        let button = format!("[ {} ]", popup.button);
        self.show_message(&[&popup.title, &popup.message, "", &button])
    }
}

impl<W: Write> Drop for TermManager<W> {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

fn term_color(c: Rgb888) -> Color {
    Color::Rgb { r: c.r(), g: c.g(), b: c.b() }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEAVE_ALT_SCREEN: &str = "\x1b[?1049l";
    const MOUSE_OFF: &str = "\x1b[?1000l";

    fn output(term: &TermManager<Vec<u8>>) -> String {
        String::from_utf8_lossy(term.writer()).into_owned()
    }

    #[test]
    fn restore_without_setup_writes_nothing() {
        let mut term = TermManager::with_writer(Vec::new(), (80, 24));
        assert!(term.restore().is_ok());
        assert!(output(&term).is_empty());
    }

    #[test]
    fn restore_undoes_setup_even_if_setup_failed() {
        // Raw mode may or may not be available to the test process; either
        // way the alternate screen and mouse capture are undone.
        let mut term = TermManager::with_writer(Vec::new(), (80, 24));
        let _ = term.setup();
        let _ = term.restore();

        let out = output(&term);
        assert!(out.contains(LEAVE_ALT_SCREEN), "{:?}", out);
        assert!(out.contains(MOUSE_OFF), "{:?}", out);

        // A second restore is a no-op.
        let len = term.writer().len();
        let _ = term.restore();
        assert_eq!(term.writer().len(), len);
    }

    #[test]
    fn popup_box_carries_title_message_and_button() {
        let mut term = TermManager::with_writer(Vec::new(), (80, 24));
        term.show_popup(&Popup::game_over(7)).unwrap();

        let out = output(&term);
        assert!(out.contains("Игра окончена"));
        assert!(out.contains("Счёт: 7"));
        assert!(out.contains("[ OK ]"));
    }

    #[test]
    fn present_prints_caption() {
        let mut term = TermManager::with_writer(Vec::new(), (80, 24));
        let canvas = Canvas::new(64, 64);
        term.present(&canvas, (0, 0), (32, 16), Some("PAUSED")).unwrap();

        let out = output(&term);
        assert_eq!(out.matches(UPPER_HALF_BLOCK).count(), 32 * 16);
        assert!(out.contains("PAUSED"));
    }
}
