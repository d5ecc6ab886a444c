use super::ui;
use crate::App;
use crate::core::quote_store::ALL_CATEGORIES;
use crate::core::{Notification, QuoteRecord};
use anyhow::Result;
use tracing::debug;

fn print_quote(quote: Option<&QuoteRecord>) {
    match quote {
        Some(quote) => println!("{}", ui::render_quote(quote)),
        None => println!(
            "{}",
            ui::style_text("No quotes available for this category.", ui::StyleType::Subtle)
        ),
    }
}

/// Shows a quote from the current view. With `last`, prefers the quote
/// viewed last in this session; session state only outlives a single
/// command inside `watch`.
pub async fn show(app: &App, category: Option<&str>, last: bool) -> Result<()> {
    let mut store = app.store.lock().await;
    if let Some(category) = category {
        store.select_category(category).await?;
    }

    let restored = if last {
        store.restore_last_viewed().await
    } else {
        None
    };
    let quote = match restored {
        Some(quote) => Some(quote),
        None => store.show_random().await,
    };
    print_quote(quote.as_ref());
    Ok(())
}

/// Adds a quote, then pushes it and pulls from the server. A failed sync
/// does not fail the command; the add is already persisted.
pub async fn add(app: &App, text: &str, category: &str) -> Result<()> {
    let record = app.store.lock().await.add(text, category).await?;
    app.notifier
        .notify(&Notification::QuoteAdded(record.clone()));
    print_quote(Some(&record));

    if let Err(e) = app.agent.after_local_add(&record).await {
        debug!("Sync after add failed: {}", e);
    }
    Ok(())
}

pub async fn list(app: &App, category: Option<&str>) -> Result<()> {
    let store = app.store.lock().await;
    let category = category.unwrap_or(store.selected_category());
    let view = store.filtered_view(category);

    println!(
        "Category: {}\n",
        ui::style_text(category, ui::StyleType::Title)
    );
    if view.is_empty() {
        print_quote(None);
    } else {
        println!("{}", ui::quotes_table(&view));
    }
    Ok(())
}

pub async fn categories(app: &App) -> Result<()> {
    let store = app.store.lock().await;
    let selected = store.selected_category();
    for category in store.categories() {
        if category == selected {
            println!("* {}", ui::style_text(&category, ui::StyleType::Title));
        } else {
            println!("  {category}");
        }
    }
    Ok(())
}

pub async fn filter(app: &App, category: &str) -> Result<()> {
    let mut store = app.store.lock().await;
    store.select_category(category).await?;
    let count = store.current_view().len();
    let label = if category == ALL_CATEGORIES {
        "all categories".to_string()
    } else {
        format!("category '{category}'")
    };
    println!(
        "{}",
        ui::style_text(
            &format!("Showing {label} ({count} quotes)"),
            ui::StyleType::Success
        )
    );
    Ok(())
}
