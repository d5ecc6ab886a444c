use super::ui;
use crate::App;
use crate::sync::SyncOutcome;
use anyhow::Result;

/// One-off sync with a spinner. Fetch failures are returned so the exit
/// status reflects them.
pub async fn sync(app: &App) -> Result<()> {
    let spinner = ui::new_spinner("Syncing quotes with server...");
    let result = app.agent.sync().await;
    spinner.finish_and_clear();

    match result? {
        SyncOutcome::Added(_) => {}
        SyncOutcome::AlreadyInProgress => return Ok(()),
    }

    let store = app.store.lock().await;
    if let Some(at) = store.last_synced().await {
        println!(
            "{}",
            ui::style_text(
                &format!(
                    "{} quotes, last synced {}",
                    store.len(),
                    at.format("%Y-%m-%d %H:%M:%S UTC")
                ),
                ui::StyleType::Subtle
            )
        );
    }
    Ok(())
}
