//! Character-grid terminal over the OLED framebuffer.

use embedded_graphics::{
    Drawable,
    geometry::Point,
    mono_font::{
        MonoTextStyle,
        ascii::{FONT_6X10, FONT_9X15},
    },
    pixelcolor::BinaryColor,
    text::{Baseline, Text},
};
use embedded_hal::i2c::I2c;
use shiftwatch_core::terminal::{StatusTerminal, TextSize};
use ug2864::FrameBuffer;

use crate::platform::display::{DisplayError, Oled};

fn cell_size(size: TextSize) -> (i32, i32) {
    match size {
        TextSize::Small => (6, 10),
        TextSize::Large => (9, 15),
    }
}

/// [`StatusTerminal`] implementation drawing mono-font text into a
/// framebuffer and committing it over I2C.
///
/// Borrows the frame and the display for one render pass; the board loop
/// keeps owning both between passes.
pub struct OledTerminal<'a, I2C> {
    frame: &'a mut FrameBuffer,
    display: &'a mut Oled<I2C>,
    size: TextSize,
    col: u8,
    row: u8,
}

impl<'a, I2C> OledTerminal<'a, I2C>
where
    I2C: I2c,
{
    pub fn new(frame: &'a mut FrameBuffer, display: &'a mut Oled<I2C>) -> Self {
        Self {
            frame,
            display,
            size: TextSize::Small,
            col: 0,
            row: 0,
        }
    }
}

impl<I2C> StatusTerminal for OledTerminal<'_, I2C>
where
    I2C: I2c,
{
    type Error = DisplayError<I2C::Error>;

    fn clear(&mut self) -> Result<(), Self::Error> {
        self.frame.clear(false);
        self.size = TextSize::Small;
        self.col = 0;
        self.row = 0;
        Ok(())
    }

    fn set_text_size(&mut self, size: TextSize) -> Result<(), Self::Error> {
        self.size = size;
        Ok(())
    }

    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), Self::Error> {
        self.col = col;
        self.row = row;
        Ok(())
    }

    fn print_line(&mut self, text: &str) -> Result<(), Self::Error> {
        let (cell_w, cell_h) = cell_size(self.size);
        let origin = Point::new(self.col as i32 * cell_w, self.row as i32 * cell_h);

        let style = match self.size {
            TextSize::Small => MonoTextStyle::new(&FONT_6X10, BinaryColor::On),
            TextSize::Large => MonoTextStyle::new(&FONT_9X15, BinaryColor::On),
        };

        // Drawing into the framebuffer cannot fail; clipping happens at
        // the pixel level.
        let _ = Text::with_baseline(text, origin, style, Baseline::Top).draw(self.frame);

        self.row = self.row.saturating_add(1);
        Ok(())
    }

    fn commit(&mut self) -> Result<(), Self::Error> {
        self.display.flush_frame(self.frame)
    }
}
