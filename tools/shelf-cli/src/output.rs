//! Output formatting for the CLI.

use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use shelf_shop::QueryStatus;

/// Output handler for CLI messages.
#[derive(Clone)]
pub struct Output {
    verbose: bool,
    json: bool,
    term: Term,
}

impl Output {
    /// Create a new output handler.
    pub fn new(verbose: bool, json: bool) -> Self {
        Self {
            verbose,
            json,
            term: Term::stdout(),
        }
    }

    /// Print an info message.
    pub fn info(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("ℹ").blue(), msg);
    }

    /// Print a success message.
    pub fn success(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("✓").green(), msg);
    }

    /// Print a warning message.
    pub fn warn(&self, msg: &str) {
        if self.json {
            return;
        }
        eprintln!("{} {}", style("⚠").yellow(), msg);
    }

    /// Print an error message.
    pub fn error(&self, msg: &str) {
        if self.json {
            eprintln!("{}", serde_json::json!({ "error": msg }));
            return;
        }
        eprintln!("{} {}", style("✗").red(), style(msg).red());
    }

    /// Print a debug message (only in verbose mode).
    pub fn debug(&self, msg: &str) {
        if !self.verbose || self.json {
            return;
        }
        eprintln!("{} {}", style("→").dim(), style(msg).dim());
    }

    /// Print a header/title.
    pub fn header(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print JSON output.
    pub fn json<T: serde::Serialize>(&self, value: &T) {
        if let Ok(json) = serde_json::to_string_pretty(value) {
            println!("{}", json);
        }
    }

    /// Print a key-value pair.
    pub fn kv(&self, key: &str, value: &str) {
        if self.json {
            return;
        }
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a table row.
    pub fn table_row(&self, cols: &[&str], widths: &[usize]) {
        if self.json {
            return;
        }
        let formatted: Vec<String> = cols
            .iter()
            .zip(widths.iter())
            .map(|(col, width)| pad(col, *width))
            .collect();
        let line = formatted.join("  ");
        let max = self.term_width().saturating_sub(2);
        if max > 0 {
            println!("  {}", console::truncate_str(&line, max, "…"));
        } else {
            println!("  {}", line);
        }
    }

    /// Spinner shown while a request is in flight.
    pub fn spinner(&self, msg: &str) -> ProgressBar {
        if self.json {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(spinner_style);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }

    /// Check if JSON mode is enabled.
    pub fn is_json(&self) -> bool {
        self.json
    }

    /// Get terminal width; 0 when not a terminal.
    pub fn term_width(&self) -> usize {
        if self.term.is_term() {
            self.term.size().1 as usize
        } else {
            0
        }
    }
}

/// Pad to a display width; Persian text is not one column per byte.
fn pad(text: &str, width: usize) -> String {
    console::pad_str(text, width, console::Alignment::Left, Some("…")).into_owned()
}

/// Colored label for a listing status.
pub fn status_badge(status: &QueryStatus) -> String {
    let label = status.as_str();
    match status {
        QueryStatus::Ready => style(label).green().to_string(),
        QueryStatus::Loading => style(label).yellow().to_string(),
        QueryStatus::Failed(_) => style(label).red().to_string(),
        QueryStatus::Idle | QueryStatus::Empty => style(label).dim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_data::FetchError;

    #[test]
    fn test_pad_uses_display_width() {
        assert_eq!(console::measure_text_width(&pad("شعر", 6)), 6);
        assert_eq!(console::measure_text_width(&pad("a long title", 5)), 5);
    }

    #[test]
    fn test_status_badge_keeps_label() {
        let badge = status_badge(&QueryStatus::Failed(FetchError::Timeout));
        assert_eq!(console::strip_ansi_codes(&badge), "failed");
    }
}
