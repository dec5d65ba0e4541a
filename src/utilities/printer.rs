//! Console printer for operator-facing output.
//!
//! Step inputs and outputs are shown to the operator in colour; structured
//! logging goes through the `log` facade separately.

use serde::{Deserialize, Serialize};

/// Available colors for printed output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrinterColor {
    Red,
    Green,
    Yellow,
    Cyan,
    BoldRed,
    BoldGreen,
    BoldYellow,
    BoldCyan,
    BoldPurple,
}

impl PrinterColor {
    /// ANSI escape code for this color.
    fn ansi_code(&self) -> &'static str {
        match self {
            Self::Red => "\x1b[31m",
            Self::Green => "\x1b[32m",
            Self::Yellow => "\x1b[33m",
            Self::Cyan => "\x1b[36m",
            Self::BoldRed => "\x1b[1;31m",
            Self::BoldGreen => "\x1b[1;32m",
            Self::BoldYellow => "\x1b[1;33m",
            Self::BoldCyan => "\x1b[1;36m",
            Self::BoldPurple => "\x1b[1;35m",
        }
    }
}

/// ANSI reset code.
const RESET: &str = "\x1b[0m";

/// Printer for console output with color support.
///
/// A quiet printer swallows everything, which keeps test output clean.
#[derive(Debug, Clone)]
pub struct Printer {
    enabled: bool,
}

impl Default for Printer {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Printer {
    /// Create a new `Printer`.
    pub fn new() -> Self {
        Self::default()
    }

    /// A printer that prints nothing.
    pub fn quiet() -> Self {
        Self { enabled: false }
    }

    /// Print a message with the specified color.
    pub fn print(&self, content: &str, color: PrinterColor) {
        if self.enabled {
            println!("{}{}{}", color.ansi_code(), content, RESET);
        }
    }

    /// Print a labelled block: the label in bold, the body uncoloured.
    pub fn print_section(&self, label: &str, body: &str, color: PrinterColor) {
        if self.enabled {
            println!("{}{}{}\n{}", color.ansi_code(), label, RESET, body);
        }
    }
}
