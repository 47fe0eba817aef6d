//! Terminal colour support

use std::fmt::Display;

use owo_colors::{OwoColorize, Style};

/// Whether stdout accepts ANSI colours.
fn supports_color() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

/// Extension trait for colorizing output
pub trait Colorize {
    /// Color as success (green)
    fn success(&self) -> String;
    /// Color as warning (amber)
    fn warning(&self) -> String;
    /// Color as info (blue)
    fn info(&self) -> String;
    /// Dim the text
    fn dim(&self) -> String;
}

fn paint<T: Display + ?Sized>(value: &T, style: Style) -> String {
    if supports_color() {
        value.style(style).to_string()
    } else {
        value.to_string()
    }
}

impl<T: Display + ?Sized> Colorize for T {
    fn success(&self) -> String {
        paint(self, Style::new().green())
    }

    fn warning(&self) -> String {
        paint(self, Style::new().yellow())
    }

    fn info(&self) -> String {
        paint(self, Style::new().bright_blue())
    }

    fn dim(&self) -> String {
        paint(self, Style::new().dimmed())
    }
}
