//! Paints a game state onto a [`Canvas`].

use embedded_graphics::mono_font::ascii::{FONT_10X20, FONT_6X10};
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle, Rectangle, RoundedRectangle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};

use crate::canvas::Canvas;
use crate::sim::GameState;
use crate::{Cell, GRID_SIZE};

pub const FOOD_COLOR: Rgb888 = Rgb888::new(0xff, 0x4d, 0x4d);
pub const HEAD_COLOR: Rgb888 = Rgb888::new(0x7c, 0xff, 0x6b);
pub const BODY_COLOR: Rgb888 = Rgb888::new(0x38, 0xbd, 0xf8);
pub const TEXT_COLOR: Rgb888 = Rgb888::new(0xff, 0xff, 0xff);

pub const GRID_COLOR: Rgb888 = Rgb888::new(0xff, 0xff, 0xff);
pub const GRID_ALPHA: u8 = 31;
pub const SHADE_COLOR: Rgb888 = Rgb888::new(0, 0, 0);
pub const SHADE_ALPHA: u8 = 0xaa;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Overlay {
    None,
    Paused,
    GameOver
}

impl Overlay {
    pub fn label(self) -> Option<&'static str> {
        match self {
            Overlay::None => None,
            Overlay::Paused => Some("PAUSED"),
            Overlay::GameOver => Some("GAME OVER"),
        }
    }
}

/// Draws one full frame. Depends on nothing but its arguments.
pub fn render(canvas: &mut Canvas, state: &GameState, overlay: Overlay) {
    let size = canvas.size();
    let cell = size.width as i32 / GRID_SIZE as i32;
    let (right, bottom) = (size.width as i32 - 1, size.height as i32 - 1);

    canvas.erase();

    let grid = PrimitiveStyle::with_stroke(GRID_COLOR, 1);
    let mut faint = canvas.translucent(GRID_ALPHA);
    for i in 1..GRID_SIZE as i32 {
        let at = i * cell;
        let column = Line::new(Point::new(at, 0), Point::new(at, bottom));
        let row = Line::new(Point::new(0, at), Point::new(right, at));
        let _ = column.into_styled(grid).draw(&mut faint);
        let _ = row.into_styled(grid).draw(&mut faint);
    }

    draw_cell(canvas, cell, state.food(), FOOD_COLOR);

    for (i, pos) in state.snake().body().iter().enumerate() {
        let color = if i == 0 { HEAD_COLOR } else { BODY_COLOR };
        draw_cell(canvas, cell, *pos, color);
    }

    if let Some(label) = overlay.label() {
        let _ = Rectangle::new(Point::zero(), size)
            .into_styled(PrimitiveStyle::with_fill(SHADE_COLOR))
            .draw(&mut canvas.translucent(SHADE_ALPHA));

        let font = if size.width >= 160 { &FONT_10X20 } else { &FONT_6X10 };
        let centered = TextStyleBuilder::new()
            .alignment(Alignment::Center)
            .baseline(Baseline::Middle)
            .build();
        let center = Point::new(size.width as i32 / 2, size.height as i32 / 2);
        let _ = Text::with_text_style(label, center, MonoTextStyle::new(font, TEXT_COLOR), centered)
            .draw(canvas);
    }
}

/// A rounded square inset from the cell edges.
fn draw_cell(canvas: &mut Canvas, cell: i32, pos: Cell, color: Rgb888) {
    let pad = (cell * 3 / 40).max(1);
    let side = (cell - pad * 2).max(1) as u32;
    let radius = (cell * 6 / 20) as u32;

    let square = Rectangle::new(
        Point::new(pos.0 as i32 * cell + pad, pos.1 as i32 * cell + pad),
        Size::new(side, side),
    );
    let _ = RoundedRectangle::with_equal_corners(square, Size::new(radius, radius))
        .into_styled(PrimitiveStyle::with_fill(color))
        .draw(canvas);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Rgba;
    use crate::snake::{Direction, Snake};

    fn state() -> GameState {
        GameState::new(Snake::from_cells([(7, 8), (6, 8)], Direction::Right), (0, 0))
    }

    fn text_pixels(canvas: &Canvas) -> usize {
        let white = Rgba::opaque(TEXT_COLOR);
        (140..180)
            .flat_map(|y| (80..240).map(move |x| (x, y)))
            .filter(|&(x, y)| canvas.pixel(x, y) == white)
            .count()
    }

    #[test]
    fn frame_has_cells_and_faint_grid() {
        let mut canvas = Canvas::new(320, 320);
        render(&mut canvas, &state(), Overlay::None);

        // Cell centers.
        assert_eq!(canvas.pixel(150, 170), Rgba::opaque(HEAD_COLOR));
        assert_eq!(canvas.pixel(130, 170), Rgba::opaque(BODY_COLOR));
        assert_eq!(canvas.pixel(10, 10), Rgba::opaque(FOOD_COLOR));
        // Padding between cells stays clear, grid lines are faint.
        assert_eq!(canvas.pixel(210, 10).a, 0);
        let line = canvas.pixel(200, 50);
        assert_eq!(line.a, GRID_ALPHA);
        assert_eq!(text_pixels(&canvas), 0);
    }

    #[test]
    fn cell_corners_are_rounded() {
        let mut canvas = Canvas::new(320, 320);
        render(&mut canvas, &state(), Overlay::None);
        // Top-left corner of the head's cell is rounded away.
        assert_eq!(canvas.pixel(141, 161).a, 0);
    }

    #[test]
    fn game_over_text_is_rasterized() {
        let mut canvas = Canvas::new(320, 320);
        render(&mut canvas, &state(), Overlay::GameOver);

        assert!(text_pixels(&canvas) > 50, "label pixels: {}", text_pixels(&canvas));
        // Shade over the empty board.
        assert_eq!(canvas.pixel(310, 310).a, SHADE_ALPHA);
        assert!(canvas.pixel(150, 177).g < HEAD_COLOR.g());
    }

    #[test]
    fn paused_overlay_differs_from_game_over() {
        let mut paused = Canvas::new(320, 320);
        let mut over = Canvas::new(320, 320);
        render(&mut paused, &state(), Overlay::Paused);
        render(&mut over, &state(), Overlay::GameOver);

        assert!(text_pixels(&paused) > 0);
        let differs = (140..180).any(|y| (80..240).any(|x| paused.pixel(x, y) != over.pixel(x, y)));
        assert!(differs);
    }

    #[test]
    fn render_is_idempotent() {
        let mut once = Canvas::new(128, 128);
        let mut twice = Canvas::new(128, 128);
        render(&mut once, &state(), Overlay::Paused);
        render(&mut twice, &state(), Overlay::None);
        render(&mut twice, &state(), Overlay::Paused);

        for y in 0..128 {
            for x in 0..128 {
                assert_eq!(once.pixel(x, y), twice.pixel(x, y), "at {},{}", x, y);
            }
        }
    }
}
