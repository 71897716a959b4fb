//! Display primitive and the clock face compositor.
//!
//! The face is five fixed text rows, 10 px apart:
//!
//! ```text
//! row 0  Date:2024.03.25
//! row 1  Time:13:20:31
//! row 2  (spacer)
//! row 3  Temp: 21C
//! row 4  Humidity: 40%
//! ```
//!
//! Rows 3 and 4 are left blank until the sensor has produced a value.

use core::fmt::Write;

use heapless::String;

use crate::state::ClockState;

/// Vertical distance between text rows, in pixels.
pub const LINE_HEIGHT: i32 = 10;
/// Number of text rows on the face.
pub const ROWS: usize = 5;
/// Longest line kept, in bytes. Longer text is cut at a character boundary.
pub const LINE_CAPACITY: usize = 24;

const DATE_ROW: usize = 0;
const TIME_ROW: usize = 1;
const TEMPERATURE_ROW: usize = 3;
const HUMIDITY_ROW: usize = 4;

/// One line of display text.
pub type Line = String<LINE_CAPACITY>;

/// Text-only display primitive.
///
/// Implementations usually draw into a framebuffer on [`write_text`] and
/// push it to the panel on [`flush`].
///
/// [`write_text`]: TextDisplay::write_text
/// [`flush`]: TextDisplay::flush
pub trait TextDisplay {
    type Error;

    /// Blanks the whole display.
    fn clear(&mut self) -> Result<(), Self::Error>;

    /// Draws `text` with its top-left corner at (`x`, `y`) pixels.
    fn write_text(&mut self, text: &str, x: i32, y: i32) -> Result<(), Self::Error>;

    /// Makes everything drawn since the last flush visible.
    fn flush(&mut self) -> Result<(), Self::Error>;
}

impl<T: TextDisplay + ?Sized> TextDisplay for &mut T {
    type Error = T::Error;

    fn clear(&mut self) -> Result<(), Self::Error> {
        T::clear(self)
    }

    fn write_text(&mut self, text: &str, x: i32, y: i32) -> Result<(), Self::Error> {
        T::write_text(self, text, x, y)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        T::flush(self)
    }
}

/// A fully composed screen: each row either has text or stays blank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    rows: [Option<Line>; ROWS],
}

impl Frame {
    /// Builds a frame from consecutive lines starting at row 0.
    ///
    /// Lines beyond [`ROWS`] are dropped.
    pub fn from_lines(lines: &[&str]) -> Self {
        let mut frame = Frame::default();
        for (slot, text) in frame.rows.iter_mut().zip(lines) {
            *slot = Some(fit(text));
        }
        frame
    }

    /// Text of `row`, or `None` if the row is blank or out of range.
    pub fn row(&self, row: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.as_deref())
    }

    /// Draws the frame: clear, every non-blank row, flush.
    pub fn draw<D: TextDisplay>(&self, display: &mut D) -> Result<(), D::Error> {
        display.clear()?;
        for (row, text) in self.rows.iter().enumerate() {
            if let Some(text) = text {
                display.write_text(text, 0, row as i32 * LINE_HEIGHT)?;
            }
        }
        display.flush()
    }
}

/// Composes the clock face for the current state.
pub fn compose(state: &ClockState) -> Frame {
    let mut frame = Frame::default();

    let mut date = Line::new();
    match state.date {
        Some(d) => {
            let _ = write!(date, "Date:{}", d);
        }
        None => {
            let _ = date.push_str("Date:----.--.--");
        }
    }
    frame.rows[DATE_ROW] = Some(date);

    let mut time = Line::new();
    let _ = write!(time, "Time:{}", state.time);
    frame.rows[TIME_ROW] = Some(time);

    if let Some(t) = state.reading.temperature {
        let mut line = Line::new();
        let _ = write!(line, "Temp: {}C", t);
        frame.rows[TEMPERATURE_ROW] = Some(line);
    }
    if let Some(h) = state.reading.humidity {
        let mut line = Line::new();
        let _ = write!(line, "Humidity: {}%", h);
        frame.rows[HUMIDITY_ROW] = Some(line);
    }

    frame
}

/// Copies `text` into a [`Line`], cutting it at the last character that fits.
pub fn fit(text: &str) -> Line {
    let mut line = Line::new();
    for c in text.chars() {
        if line.push(c).is_err() {
            break;
        }
    }
    line
}
