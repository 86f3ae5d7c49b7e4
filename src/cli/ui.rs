use crate::core::format::{ChangeIndicator, Direction};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::time::Duration;

pub const LOADING_LABEL: &str = "Loading...";

/// Terminals narrower than this get the compact layout.
const NARROW_WIDTH: u16 = 80;

/// Layout capability derived once from the terminal and handed to the views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub narrow: bool,
    width: usize,
}

impl Viewport {
    /// A viewport of the default width; `narrow` picks the compact layout.
    pub fn new(narrow: bool) -> Self {
        Self {
            narrow,
            width: NARROW_WIDTH as usize,
        }
    }

    /// Measures the terminal once. Without a terminal the default width is used.
    pub fn detect(force_narrow: bool) -> Self {
        let width = console::Term::stdout()
            .size_checked()
            .map(|(_, w)| w)
            .unwrap_or(NARROW_WIDTH);
        Self {
            narrow: force_narrow || width < NARROW_WIDTH,
            width: width as usize,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(false)
    }
}

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    Label,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::Label => style(text).bold(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

pub fn right_cell(text: &str) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

/// Creates a cell for a 24h change: glyph and color follow the sign.
pub fn change_cell(change: &ChangeIndicator) -> Cell {
    let color = match change.direction {
        Direction::Up => Color::Green,
        Direction::Down => Color::Red,
    };
    Cell::new(change.to_string())
        .fg(color)
        .set_alignment(CellAlignment::Right)
}

/// Styled text for a 24h change outside of tables.
pub fn change_text(change: &ChangeIndicator) -> String {
    let text = change.to_string();
    match change.direction {
        Direction::Up => style(text).green().to_string(),
        Direction::Down => style(text).red().to_string(),
    }
}

pub fn error_line(error: &impl std::fmt::Display) -> String {
    style_text(&format!("Failed to load: {error}"), StyleType::Error)
}

/// Creates a spinner used as the loading placeholder.
pub fn new_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Shows the loading placeholder until `future` completes.
pub async fn with_spinner<F: Future>(future: F) -> F::Output {
    let pb = new_spinner(LOADING_LABEL);
    let output = future.await;
    pb.finish_and_clear();
    output
}

/// Prints a separator line across the viewport.
pub fn print_separator(viewport: Viewport) {
    println!("\n{}", "─".repeat(viewport.width()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::MarketDataError;

    #[test]
    fn test_viewport_width_is_fixed_at_creation() {
        let viewport = Viewport::new(true);
        assert!(viewport.narrow);
        assert_eq!(viewport.width(), 80);
        assert_eq!(Viewport::default(), Viewport::new(false));

        let detected = Viewport::detect(true);
        assert!(detected.narrow);
        assert_eq!(detected.width(), detected.width());
    }

    #[test]
    fn test_error_line() {
        let line = error_line(&MarketDataError::NotFound("asset nope".to_string()));
        assert!(line.contains("Failed to load: Not found: asset nope"));
    }
}
