//! Output sinks for styled evaluation progress lines.
//!
//! The evaluator reports progress through an [`OutputSink`] so it
//! never references a concrete output medium; the CLI wires up an ANSI
//! console and tests use [`RecordingSink`] or [`DiscardSink`].

/// Style of one reported line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    /// Section header (e.g. "Validating Test Results").
    Section,
    /// Checkpoint banner.
    Checkpoint,
    /// Passing detail line.
    Pass,
    /// Failing detail line.
    Fail,
    /// Non-fatal warning line.
    Warn,
    /// Neutral informational line.
    Note,
}

/// Destination for styled evaluation output.
pub trait OutputSink {
    fn line(&mut self, style: LineStyle, text: &str);
}

const RED: &str = "\x1b[0;31m";
const GREEN: &str = "\x1b[0;32m";
const YELLOW: &str = "\x1b[1;33m";
const BLUE: &str = "\x1b[0;34m";
const RESET: &str = "\x1b[0m";

/// ANSI color console sink.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleSink {
    color: bool,
}

impl ConsoleSink {
    /// Colored output.
    pub fn new() -> Self {
        Self { color: true }
    }

    /// Plain output without escape codes.
    pub fn plain() -> Self {
        Self { color: false }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputSink for ConsoleSink {
    fn line(&mut self, style: LineStyle, text: &str) {
        match style {
            LineStyle::Section => println!("\n{}\n", self.paint(BLUE, text)),
            LineStyle::Checkpoint => {
                println!("{} {}", self.paint(YELLOW, "[Checkpoint]"), text)
            }
            LineStyle::Pass => println!("  {} {}", self.paint(GREEN, "\u{2713}"), text),
            LineStyle::Fail => println!("  {} {}", self.paint(RED, "\u{2717}"), text),
            LineStyle::Warn => println!("  {} {}", self.paint(YELLOW, "!"), text),
            LineStyle::Note => println!("  {}", text),
        }
    }
}

/// Sink that drops all output.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardSink;

impl OutputSink for DiscardSink {
    fn line(&mut self, _style: LineStyle, _text: &str) {}
}

/// Sink that records every line for assertions.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub lines: Vec<(LineStyle, String)>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded texts with a given style.
    pub fn texts(&self, style: LineStyle) -> Vec<&str> {
        self.lines
            .iter()
            .filter(|(s, _)| *s == style)
            .map(|(_, t)| t.as_str())
            .collect()
    }
}

impl OutputSink for RecordingSink {
    fn line(&mut self, style: LineStyle, text: &str) {
        self.lines.push((style, text.to_string()));
    }
}
