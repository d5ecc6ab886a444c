use super::ui;
use crate::App;
use crate::core::Notification;
use crate::core::quote::parse_candidates;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Merges quotes from a JSON file. Nothing is written when the file is not
/// a JSON array.
pub async fn import(app: &App, path: &Path) -> Result<()> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read import file: {}", path.display()))?;
    let candidates = parse_candidates(&text)?;

    let mut store = app.store.lock().await;
    let added = store.import_merge(&candidates).await?;
    info!(added, path = %path.display(), "Imported quotes");
    app.notifier.notify(&Notification::Imported { added });

    if added > 0
        && let Some(quote) = store.displayed()
    {
        println!("{}", ui::render_quote(quote));
    }
    Ok(())
}

/// Writes the pretty printed snapshot to `output`, or stdout for `-`.
pub async fn export(app: &App, output: &Path) -> Result<()> {
    let snapshot = app.store.lock().await.export_snapshot()?;

    if output == Path::new("-") {
        println!("{snapshot}");
        return Ok(());
    }

    tokio::fs::write(output, snapshot.as_bytes())
        .await
        .with_context(|| format!("Failed to write export file: {}", output.display()))?;
    println!(
        "{}",
        ui::style_text(
            &format!("Exported quotes to {}", output.display()),
            ui::StyleType::Success
        )
    );
    Ok(())
}
