use crate::core::notify::LogNotifier;
use crate::core::{Notification, Notifier, QuoteRecord};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    Quote,
    Category,
    Success,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::Quote => style(text).bold(),
        StyleType::Category => style(text).italic().dim(),
        StyleType::Success => style(text).green(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Two line rendering of a quote: the text in quotes, then its category.
pub fn render_quote(quote: &QuoteRecord) -> String {
    format!(
        "{}\n{}",
        style_text(&format!("\"{}\"", quote.text), StyleType::Quote),
        style_text(&format!("Category: {}", quote.category), StyleType::Category)
    )
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

/// Table of quotes with their position in the view.
pub fn quotes_table(quotes: &[&QuoteRecord]) -> Table {
    let mut table = new_styled_table();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Quote"),
        header_cell("Category"),
    ]);
    for (i, quote) in quotes.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1).set_alignment(CellAlignment::Right),
            Cell::new(&quote.text),
            Cell::new(&quote.category).fg(Color::DarkGrey),
        ]);
    }
    table
}

/// Spinner shown while waiting on the network.
pub fn new_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
        pb.set_style(spinner_style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Prints notifications to the terminal, the CLI counterpart of a toast.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    pub fn message(notification: &Notification) -> String {
        match notification {
            Notification::QuoteAdded(_) => {
                style_text("New quote added successfully!", StyleType::Success)
            }
            Notification::Imported { added } => style_text(
                &format!("Quotes imported successfully! ({added} new)"),
                StyleType::Success,
            ),
            Notification::Synced { added: 0 } => {
                style_text("Quotes are up to date with the server.", StyleType::Subtle)
            }
            Notification::Synced { added } => style_text(
                &format!("Quotes synced with server! ({added} new)"),
                StyleType::Success,
            ),
            Notification::SyncFailed { reason } => style_text(
                &format!("Could not reach the server, will retry later. {reason}"),
                StyleType::Error,
            ),
            Notification::SyncSkipped => {
                style_text("A sync is already running.", StyleType::Subtle)
            }
        }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: &Notification) {
        LogNotifier.notify(notification);
        let message = Self::message(notification);
        match notification {
            Notification::SyncFailed { .. } => eprintln!("{message}"),
            _ => println!("{message}"),
        }
    }
}
