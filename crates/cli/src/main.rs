//! TaskFlow command-line client

mod command;
mod config;
mod render;

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use taskflow_core::clock::{Clock, SystemClock};
use taskflow_core::remote::{ApiClient, HttpIdentityProvider, HttpTaskRepository};
use taskflow_core::session::LocalIdentityProvider;
use taskflow_core::storage::LocalStorage;
use taskflow_core::task::LocalTaskRepository;
use taskflow_core::TaskFlowApp;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::command::{Command, HELP};
use crate::config::BackendConfig;
use crate::render::render_screen;

async fn build_app(config: &BackendConfig, clock: Arc<dyn Clock>) -> anyhow::Result<TaskFlowApp> {
    match config {
        BackendConfig::Local { data_dir } => {
            let path = data_dir.join("taskflow.json");
            tracing::info!("Using local storage at {:?}", path);
            let storage = Arc::new(
                LocalStorage::open(&path)
                    .await
                    .with_context(|| format!("Failed to open {:?}", path))?,
            );
            let provider = LocalIdentityProvider::new(Arc::clone(&storage)).await?;
            Ok(TaskFlowApp::new(
                Arc::new(provider),
                Arc::new(LocalTaskRepository::new(storage)),
                clock,
            ))
        }
        BackendConfig::Remote { api_url, token } => {
            tracing::info!("Using TaskFlow server at {}", api_url);
            let client = Arc::new(ApiClient::new(api_url.as_str()));
            let provider = HttpIdentityProvider::new(Arc::clone(&client));
            if let Some(token) = token {
                if let Err(err) = provider.resume(token).await {
                    tracing::warn!("Could not resume session from TASKFLOW_TOKEN: {}", err);
                }
            }
            Ok(TaskFlowApp::new(
                Arc::new(provider),
                Arc::new(HttpTaskRepository::new(client)),
                clock,
            ))
        }
    }
}

/// Run one command; returns false when the session should end
async fn execute(app: &TaskFlowApp, command: Command) -> bool {
    // Failures already surface as notices on the next screen
    let outcome = match command {
        Command::Register { email, secret } => app.register(&email, &secret).await.map(drop),
        Command::Login { email, secret } => app.login(&email, &secret).await.map(drop),
        Command::Logout => app.logout().await,
        Command::Add(draft) => app.add_task(draft).await.map(drop),
        Command::Toggle(position) => match card_id(app, position).await {
            Some(id) => app.toggle_task(&id).await.map(drop),
            None => return missing_position(position),
        },
        Command::Remove(position) => match card_id(app, position).await {
            Some(id) => app.delete_task(&id).await.map(drop),
            None => return missing_position(position),
        },
        Command::View(filter) => {
            app.set_filter(filter).await;
            Ok(())
        }
        Command::List => Ok(()),
        Command::Help => {
            println!("{}", HELP);
            Ok(())
        }
        Command::Quit => return false,
    };

    if let Err(err) = outcome {
        tracing::debug!("Command failed: {}", err);
    }
    true
}

async fn card_id(app: &TaskFlowApp, position: usize) -> Option<String> {
    app.view()
        .await
        .cards
        .get(position - 1)
        .map(|card| card.id.clone())
}

fn missing_position(position: usize) -> bool {
    println!("No task number {} in this view.", position);
    true
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so the screen on stdout stays readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskflow=warn,taskflow_core=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let config = BackendConfig::from_env();
    let app = Arc::new(build_app(&config, Arc::clone(&clock)).await?);

    if let Err(err) = app.restore().await {
        tracing::warn!("Failed to restore session: {}", err);
    }
    let listener = app.spawn_session_listener();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print!("{}", render_screen(&app.screen().await));
    app.dismiss_notice();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let keep_going = match Command::parse(&line, clock.today()) {
            Ok(command) => execute(&app, command).await,
            Err(err) => {
                println!("❗ {}", err);
                true
            }
        };
        if !keep_going {
            break;
        }

        print!("{}", render_screen(&app.screen().await));
        app.dismiss_notice();
    }

    listener.abort();
    Ok(())
}
