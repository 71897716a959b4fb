//! The display owner and error reporter.
//!
//! [`Console`] is the only thing that touches the display. Besides drawing
//! the clock face it shows status lines during startup and implements
//! [`Report`], which every adapter uses to surface a failure: the message
//! and its details go to the screen, stay there for the configured hold, and
//! are logged.

use embedded_hal::delay::DelayNs;

use crate::display::{Frame, TextDisplay};

/// Sink for user-visible error reports.
pub trait Report {
    /// Shows and logs an error. May block while the message is on screen.
    fn report(&mut self, message: &str, details: &str);
}

impl<R: Report + ?Sized> Report for &mut R {
    fn report(&mut self, message: &str, details: &str) {
        R::report(self, message, details)
    }
}

pub struct Console<D, W> {
    display: D,
    delay: W,
    hold_ms: u32,
}

impl<D: TextDisplay, W: DelayNs> Console<D, W> {
    /// Creates a console.
    ///
    /// # Arguments
    /// * `display` - The display primitive
    /// * `delay` - Used to keep error reports and status lines visible
    /// * `hold_ms` - How long an error report stays on screen
    pub fn new(display: D, delay: W, hold_ms: u32) -> Self {
        Self {
            display,
            delay,
            hold_ms,
        }
    }

    /// Replaces the screen with `frame`.
    pub fn draw(&mut self, frame: &Frame) -> Result<(), D::Error> {
        frame.draw(&mut self.display)
    }

    /// Replaces the screen with a single status line.
    pub fn status(&mut self, text: &str) -> Result<(), D::Error> {
        debug!("status: {}", text);
        self.draw(&Frame::from_lines(&[text]))
    }

    /// Blocks for `ms` milliseconds, leaving the screen as it is.
    pub fn hold(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}

impl<D: TextDisplay, W: DelayNs> Report for Console<D, W> {
    fn report(&mut self, message: &str, details: &str) {
        error!("{} {}", message, details);
        if self.draw(&Frame::from_lines(&[message, details])).is_err() {
            warn!("display unavailable, error report is only logged");
        }
        self.delay.delay_ms(self.hold_ms);
    }
}
