// Upstair - Screen Rendering
//
// Text-only layout of each view on the 128x64 monochrome panel, drawn with
// embedded-graphics into any `DrawTarget`.  `FrameBuffer` is the SSD1306
// page-ordered buffer the display driver flushes.

use core::convert::Infallible;
use core::fmt::Write;

use embedded_graphics::mono_font::ascii::{FONT_5X8, FONT_6X10};
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle};
use embedded_graphics::text::{Baseline, Text};
use heapless::String;

use crate::config::*;
use crate::platform::Frame;
use crate::view::{MenuItem, View};

const HEADER_RULE_Y: i32 = 11;
const CONTENT_Y: i32 = 14;

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Clear `target` and draw `frame`.
pub fn draw_frame<D>(target: &mut D, frame: &Frame<'_>) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let normal = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
    let small = MonoTextStyle::new(&FONT_5X8, BinaryColor::On);

    target.clear(BinaryColor::Off)?;

    // ---- header: unread marker + battery ----
    if frame.unread {
        Text::with_baseline("MAIL", Point::new(0, 0), normal, Baseline::Top).draw(target)?;
    }
    let mut battery: String<8> = String::new();
    let _ = write!(battery, "{:>3}%", frame.battery_level.min(100));
    Text::with_baseline(&battery, Point::new(SCREEN_WIDTH as i32 - 24, 0), normal, Baseline::Top)
        .draw(target)?;
    Line::new(
        Point::new(0, HEADER_RULE_Y),
        Point::new(SCREEN_WIDTH as i32 - 1, HEADER_RULE_Y),
    )
    .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
    .draw(target)?;

    // ---- view body ----
    let mut line: String<32> = String::new();
    match frame.nav.view {
        View::Main => {
            Text::with_baseline(
                frame.activity.display_name(),
                Point::new(4, CONTENT_Y + 6),
                normal,
                Baseline::Top,
            )
            .draw(target)?;
            let _ = write!(line, "Score {}", frame.score);
            Text::with_baseline(&line, Point::new(4, CONTENT_Y + 26), normal, Baseline::Top)
                .draw(target)?;
        }

        View::Menu => {
            let cursor = frame.nav.menu.position() as usize;
            for (i, item) in MenuItem::ALL.iter().enumerate() {
                line.clear();
                let marker = if i == cursor { '>' } else { ' ' };
                let _ = write!(line, "{} {}", marker, item.label());
                let y = CONTENT_Y + 12 * i as i32;
                Text::with_baseline(&line, Point::new(2, y), normal, Baseline::Top).draw(target)?;
            }
        }

        View::Messages => {
            if frame.messages.is_empty() {
                Text::with_baseline("No messages", Point::new(4, CONTENT_Y), normal, Baseline::Top)
                    .draw(target)?;
            }
            for (i, message) in frame.messages.iter().enumerate() {
                let y = CONTENT_Y + 8 * i as i32;
                Text::with_baseline(message.as_str(), Point::new(2, y), small, Baseline::Top)
                    .draw(target)?;
            }
        }

        View::Stats => {
            let _ = write!(line, "Points: {}", frame.score);
            Text::with_baseline(&line, Point::new(4, CONTENT_Y + 6), normal, Baseline::Top)
                .draw(target)?;
        }

        View::Settings => {
            let check = if frame.auto_sleep { 'x' } else { ' ' };
            let _ = write!(line, "> [{}] Auto-sleep", check);
            Text::with_baseline(&line, Point::new(2, CONTENT_Y + 6), normal, Baseline::Top)
                .draw(target)?;
        }

        View::ConfirmShutdown => {
            Text::with_baseline("Are you sure?", Point::new(4, CONTENT_Y + 6), normal, Baseline::Top)
                .draw(target)?;
            Text::with_baseline("1: back  2: off", Point::new(4, CONTENT_Y + 30), small, Baseline::Top)
                .draw(target)?;
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// SSD1306 frame buffer
// ---------------------------------------------------------------------------

/// 1 bit per pixel, 8 vertical pixels per byte, pages of `SCREEN_WIDTH` bytes.
#[derive(Clone)]
pub struct FrameBuffer {
    buf: [u8; DISPLAY_BUFFER_SIZE],
}

impl FrameBuffer {
    pub const fn new() -> Self {
        Self {
            buf: [0; DISPLAY_BUFFER_SIZE],
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn pixel(&self, x: u32, y: u32) -> bool {
        if x >= SCREEN_WIDTH || y >= SCREEN_HEIGHT {
            return false;
        }
        let (idx, bit) = Self::locate(x, y);
        self.buf[idx] & bit != 0
    }

    pub fn lit_pixels(&self) -> u32 {
        self.buf.iter().map(|b| b.count_ones()).sum()
    }

    fn locate(x: u32, y: u32) -> (usize, u8) {
        let idx = x as usize + (y as usize / 8) * SCREEN_WIDTH as usize;
        (idx, 1 << (y % 8))
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(SCREEN_WIDTH, SCREEN_HEIGHT)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let (Ok(x), Ok(y)) = (u32::try_from(point.x), u32::try_from(point.y)) else {
                continue;
            };
            if x >= SCREEN_WIDTH || y >= SCREEN_HEIGHT {
                continue;
            }
            let (idx, bit) = Self::locate(x, y);
            match color {
                BinaryColor::On => self.buf[idx] |= bit,
                BinaryColor::Off => self.buf[idx] &= !bit,
            }
        }
        Ok(())
    }
}
