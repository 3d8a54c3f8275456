//! In-memory RGBA framebuffer for `embedded-graphics`.
//!
//! Pixels keep an alpha channel so untouched areas stay transparent for
//! whoever presents the canvas. Drawing straight onto the canvas is opaque;
//! [`Canvas::translucent`] gives a target that blends at a fixed alpha.

use core::convert::Infallible;

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Rgba { r, g, b, a }
    }

    pub fn opaque(c: Rgb888) -> Self {
        Rgba::new(c.r(), c.g(), c.b(), 0xff)
    }
}

pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

/// Draws onto a canvas at a fixed opacity.
pub struct Translucent<'a> {
    canvas: &'a mut Canvas,
    alpha: u8,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        let pixels = vec![Rgba::TRANSPARENT; width as usize * height as usize];
        Canvas { width, height, pixels }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        self.pixels[self.width as usize * y as usize + x as usize]
    }

    /// Resets every pixel to transparent.
    pub fn erase(&mut self) {
        self.pixels.iter_mut().for_each(|px| *px = Rgba::TRANSPARENT);
    }

    pub fn translucent(&mut self, alpha: u8) -> Translucent<'_> {
        Translucent { canvas: self, alpha }
    }

    /// Box-filters the canvas into `cols × rows` samples, composited over
    /// `backdrop`. Row-major.
    pub fn downsample(&self, cols: u32, rows: u32, backdrop: Rgb888) -> Vec<Rgb888> {
        let base = Rgba::opaque(backdrop);
        let mut out = Vec::with_capacity(cols as usize * rows as usize);

        for row in 0..rows {
            let (y0, y1) = span(row, rows, self.height);
            for col in 0..cols {
                let (x0, x1) = span(col, cols, self.width);
                let mut sum = [0u32; 3];
                let mut n = 0u32;

                for y in y0..y1 {
                    for x in x0..x1 {
                        let px = blend(base, self.pixel(x, y));
                        sum[0] += px.r as u32;
                        sum[1] += px.g as u32;
                        sum[2] += px.b as u32;
                        n += 1;
                    }
                }

                out.push(match n {
                    0 => backdrop,
                    n => Rgb888::new((sum[0] / n) as u8, (sum[1] / n) as u8, (sum[2] / n) as u8),
                });
            }
        }

        out
    }

    ///////////////////////////////////////////////////////////////////////////

    fn blend_at(&mut self, at: Point, color: Rgb888, alpha: u8) {
        if at.x < 0 || at.y < 0 || at.x >= self.width as i32 || at.y >= self.height as i32 {
            return;
        }
        let idx = self.width as usize * at.y as usize + at.x as usize;
        let src = Rgba::new(color.r(), color.g(), color.b(), alpha);
        self.pixels[idx] = blend(self.pixels[idx], src);
    }
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for Canvas {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(at, color) in pixels {
            self.blend_at(at, color, 0xff);
        }
        Ok(())
    }
}

impl Dimensions for Translucent<'_> {
    fn bounding_box(&self) -> Rectangle {
        self.canvas.bounding_box()
    }
}

impl DrawTarget for Translucent<'_> {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(at, color) in pixels {
            self.canvas.blend_at(at, color, self.alpha);
        }
        Ok(())
    }
}

/// Source-over compositing of straight-alpha colors.
pub fn blend(dst: Rgba, src: Rgba) -> Rgba {
    let sa = src.a as f32 / 255.0;
    let da = dst.a as f32 / 255.0;
    let oa = sa + da * (1.0 - sa);
    if oa <= 0.0 {
        return Rgba::TRANSPARENT;
    }

    let mix = |s: u8, d: u8| ((s as f32 * sa + d as f32 * da * (1.0 - sa)) / oa).round() as u8;
    Rgba::new(
        mix(src.r, dst.r),
        mix(src.g, dst.g),
        mix(src.b, dst.b),
        (oa * 255.0).round() as u8,
    )
}

fn span(i: u32, parts: u32, len: u32) -> (u32, u32) {
    let start = (i as u64 * len as u64 / parts as u64) as u32;
    let end = ((i as u64 + 1) * len as u64 / parts as u64) as u32;
    (start, end)
}
