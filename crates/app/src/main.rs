//! JTC - join-to-create voice rooms
//!
//! Connects to the platform gateway, turns members entering a trigger room
//! into personal rooms, and deletes those rooms once they empty out.

use std::sync::{Arc, Mutex};

use jtc_core::{Database, EventProcessor, Orchestrator, SharedTriggers};
use jtc_net::GatewayEvent;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod dispatch;
mod error;
mod gateway;

#[cfg(test)]
mod testing;

use commands::CommandHandler;
use config::Config;
use dispatch::Dispatcher;
use error::{AppError, Result};
use gateway::{connect_with_backoff, GatewaySlot};

fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("Starting JTC");

    if let Err(e) = run() {
        tracing::error!(error = %e, "JTC stopped");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = Config::load()?;
    let runtime = tokio::runtime::Runtime::new().map_err(AppError::Runtime)?;
    runtime.block_on(serve(config))
}

async fn serve(config: Config) -> Result<()> {
    let db_path = config
        .database_path
        .clone()
        .ok_or(AppError::NoProjectDirs)?;
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).map_err(jtc_core::Error::Io)?;
    }
    let db = Database::open(&db_path)?;
    info!(
        path = %db_path.display(),
        schema_version = db.schema_version(),
        "Database ready"
    );
    let triggers: SharedTriggers = Arc::new(Mutex::new(db));

    let gateway = Arc::new(GatewaySlot::new());
    let processor = Arc::new(
        EventProcessor::new(gateway.clone(), triggers.clone())
            .with_orchestrator(Orchestrator::new(config.room_name_template.clone())),
    );
    let commands = Arc::new(CommandHandler::new(
        triggers,
        processor.clone(),
        gateway.clone(),
        gateway.clone(),
    ));
    let mut dispatcher = Dispatcher::new(processor.clone(), config.max_in_flight);

    let outcome = tokio::select! {
        result = pump_events(&config, &gateway, &commands, &mut dispatcher) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown requested");
            Ok(())
        }
    };

    // In-flight events still need the gateway; one provisioning is three calls
    dispatcher
        .drain_within(config.request_timeout() * 3)
        .await;
    if let Some(handle) = gateway.handle().await {
        handle.disconnect().await;
    }

    let snapshot = processor.snapshot().await;
    if !snapshot.dynamic_rooms.is_empty() {
        match snapshot.to_json() {
            Ok(json) => warn!(
                rooms = snapshot.dynamic_rooms.len(),
                snapshot = %json,
                "Exiting with rooms still owned by JTC"
            ),
            Err(e) => warn!(error = %e, "Failed to serialize lifecycle snapshot"),
        }
    }
    outcome
}

/// Feed gateway events to the dispatcher, reconnecting whenever the
/// connection drops
///
/// Events missed while disconnected are lost; rooms whose last member left
/// during an outage stay until someone passes through them again.
async fn pump_events(
    config: &Config,
    gateway: &GatewaySlot,
    commands: &Arc<CommandHandler>,
    dispatcher: &mut Dispatcher,
) -> Result<()> {
    loop {
        let mut client = connect_with_backoff(config).await?;
        let handle = client.handle();
        gateway.set(Some(handle.clone())).await;

        while let Some(event) = client.next_event().await {
            match event {
                GatewayEvent::VoiceStateUpdate(event) => dispatcher.dispatch(event).await,
                GatewayEvent::Interaction(interaction) => {
                    let commands = commands.clone();
                    let handle = handle.clone();
                    tokio::spawn(async move {
                        let reply = commands.respond(&interaction).await;
                        if let Err(e) = handle.reply(&interaction.id, reply).await {
                            warn!(
                                interaction_id = %interaction.id,
                                error = %e,
                                "Failed to reply to command"
                            );
                        }
                    });
                }
                GatewayEvent::Disconnected => break,
            }
        }

        gateway.set(None).await;
        warn!("Gateway connection lost, reconnecting");
    }
}
