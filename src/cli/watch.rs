use super::{quotes, ui};
use crate::App;
use crate::core::Notification;
use anyhow::Result;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

const HELP: &str = "Commands: next | last | add <text> | <category> | filter <category> | list | categories | sync | help | quit";

#[derive(Debug, PartialEq, Eq)]
enum WatchCommand {
    Next,
    Last,
    Add { text: String, category: String },
    Filter(String),
    List,
    Categories,
    Sync,
    Help,
    Quit,
}

fn parse_line(line: &str) -> std::result::Result<WatchCommand, String> {
    let line = line.trim();
    let (verb, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(v, r)| (v, r.trim()));

    match verb {
        "" | "next" | "n" => Ok(WatchCommand::Next),
        "last" => Ok(WatchCommand::Last),
        "add" => {
            let (text, category) = rest
                .split_once('|')
                .ok_or_else(|| "usage: add <text> | <category>".to_string())?;
            Ok(WatchCommand::Add {
                text: text.trim().to_string(),
                category: category.trim().to_string(),
            })
        }
        "filter" if !rest.is_empty() => Ok(WatchCommand::Filter(rest.to_string())),
        "filter" => Err("usage: filter <category>".to_string()),
        "list" | "ls" => Ok(WatchCommand::List),
        "categories" => Ok(WatchCommand::Categories),
        "sync" => Ok(WatchCommand::Sync),
        "help" | "?" => Ok(WatchCommand::Help),
        "quit" | "exit" | "q" => Ok(WatchCommand::Quit),
        other => Err(format!("unknown command '{other}', type 'help'")),
    }
}

/// Runs the periodic sync and a line oriented prompt until `quit`, end of
/// input or Ctrl-C.
pub async fn watch(app: &App) -> Result<()> {
    let schedule = app.agent.start(app.config.sync.interval());

    {
        let mut store = app.store.lock().await;
        let quote = match store.restore_last_viewed().await {
            Some(quote) => Some(quote),
            None => store.show_random().await,
        };
        if let Some(quote) = quote {
            println!("{}", ui::render_quote(&quote));
        }
    }
    println!("{}", ui::style_text(HELP, ui::StyleType::Subtle));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_line(&line) {
                    Ok(WatchCommand::Quit) => break,
                    Ok(command) => {
                        if let Err(e) = run(app, command).await {
                            eprintln!("{}", ui::style_text(&e.to_string(), ui::StyleType::Error));
                        }
                    }
                    Err(usage) => eprintln!("{}", ui::style_text(&usage, ui::StyleType::Error)),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    schedule.stop();
    info!("Watch stopped");
    Ok(())
}

async fn run(app: &App, command: WatchCommand) -> Result<()> {
    match command {
        WatchCommand::Next => quotes::show(app, None, false).await,
        WatchCommand::Last => quotes::show(app, None, true).await,
        WatchCommand::Add { text, category } => {
            let record = app.store.lock().await.add(&text, &category).await?;
            app.notifier.notify(&Notification::QuoteAdded(record.clone()));
            println!("{}", ui::render_quote(&record));

            // Keep the prompt responsive while the server round trip runs
            let agent = Arc::clone(&app.agent);
            tokio::spawn(async move {
                if let Err(e) = agent.after_local_add(&record).await {
                    debug!("Sync after add failed: {}", e);
                }
            });
            Ok(())
        }
        WatchCommand::Filter(category) => quotes::filter(app, &category).await,
        WatchCommand::List => quotes::list(app, None).await,
        WatchCommand::Categories => quotes::categories(app).await,
        WatchCommand::Sync => {
            if let Err(e) = app.agent.sync().await {
                debug!("Manual sync failed: {}", e);
            }
            Ok(())
        }
        WatchCommand::Help => {
            println!("{HELP}");
            Ok(())
        }
        WatchCommand::Quit => Ok(()),
    }
}
