//! TUI rendering for recurra-core types.
//!
//! Extension traits that add colored terminal rendering to occurrences
//! using owo_colors. Colors are only emitted when stdout supports them, so
//! piped output and files written with `--output` stay plain.

use owo_colors::{OwoColorize, Stream};
use recurra_core::ActivityOccurrence;
use recurra_core::summary::pluralize;
use recurra_core::time::format_time;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for ActivityOccurrence {
    fn render(&self) -> String {
        let date = self.date.format("%a %Y-%m-%d").to_string();
        let mut time = format!("{}-{}", format_time(self.start_time), format_time(self.end_time));
        if self.ends_next_day() {
            time.push_str(" (+1)");
        }
        let capacity = format!("cap {}", self.capacity);

        if !self.is_available {
            let reason = self
                .cancellation_reason
                .as_deref()
                .map(|r| format!(" ({})", r))
                .unwrap_or_default();
            return format!(
                "{} {} {} {}{}",
                red("x"),
                red(&date),
                red(&time),
                red("cancelled"),
                dimmed(&reason)
            );
        }

        let marker = if self.is_modified {
            yellow("~")
        } else {
            green("•")
        };

        format!(
            "{} {} {} {} {}",
            marker,
            bold(&date),
            time,
            dimmed(&capacity),
            dimmed(&self.id)
        )
    }
}

/// Render a list of occurrences with a trailing count line
pub fn render_occurrences(occurrences: &[ActivityOccurrence]) -> Vec<String> {
    if occurrences.is_empty() {
        return vec![dimmed("No occurrences")];
    }

    let mut lines: Vec<String> = occurrences
        .iter()
        .map(|o| format!("  {}", o.render()))
        .collect();

    let cancelled = occurrences.iter().filter(|o| !o.is_available).count();
    let mut footer = format!(
        "{} {}",
        occurrences.len(),
        pluralize("occurrence", occurrences.len())
    );
    if cancelled > 0 {
        footer.push_str(&format!(", {} cancelled", cancelled));
    }
    lines.push(String::new());
    lines.push(dimmed(&footer));

    lines
}

// Stdout styling, plain when colors are unsupported or overridden off

pub fn red(text: &str) -> String {
    text.if_supports_color(Stream::Stdout, |t| t.red()).to_string()
}

pub fn green(text: &str) -> String {
    text.if_supports_color(Stream::Stdout, |t| t.green()).to_string()
}

pub fn yellow(text: &str) -> String {
    text.if_supports_color(Stream::Stdout, |t| t.yellow()).to_string()
}

pub fn bold(text: &str) -> String {
    text.if_supports_color(Stream::Stdout, |t| t.bold()).to_string()
}

pub fn dimmed(text: &str) -> String {
    text.if_supports_color(Stream::Stdout, |t| t.dimmed()).to_string()
}
