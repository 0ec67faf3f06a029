use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    navigation_context, ControllerEvent, HttpOrderRepository, OrderLifecycleController,
    PrimaryAction, ScreenInputs, TransitionOutcome, DEFAULT_STATUS,
};
use shared::domain::{OrderId, OrderStatus, UserId};
use storage::Storage;
use tokio::sync::{broadcast::error::RecvError, watch};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::{
    list_orders, render_screen, run_transition, screen_status, show_order, LOGIN_HINT,
};
use config::{load_settings, Settings};

#[derive(Parser, Debug)]
#[command(name = "operator", about = "Order list client for delivery operators")]
struct Cli {
    #[arg(long, default_value = "operator.toml")]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Store the operator identity used for order queries.
    Login { user_id: String },
    /// Forget the stored operator identity.
    Logout,
    /// List orders for a status.
    List {
        #[arg(long)]
        status: Option<OrderStatus>,
    },
    /// Show the details of one order from a status list.
    Show {
        order_id: OrderId,
        #[arg(long)]
        status: Option<OrderStatus>,
    },
    /// Move an accepted order to in-progress.
    Start { order_id: OrderId },
    /// Move an in-progress order to complete.
    Complete { order_id: OrderId },
    /// Keep the list mounted and refetch on an interval.
    Watch {
        #[arg(long)]
        status: Option<OrderStatus>,
        #[arg(long, default_value_t = 30)]
        interval_secs: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = load_settings(&cli.config);
    info!(
        orders_url = %settings.orders_url,
        schema = %settings.order_schema,
        "loaded operator settings"
    );

    let storage = Storage::new(&settings.identity_db_url)
        .await
        .with_context(|| format!("failed to open identity store '{}'", settings.identity_db_url))?;

    match cli.command {
        Command::Login { user_id } => {
            let user_id = user_id.trim();
            if user_id.is_empty() {
                bail!("user id must not be empty");
            }
            storage.set_user_id(&UserId(user_id.to_string())).await?;
            println!("Signed in as user_id={user_id}");
        }
        Command::Logout => {
            if storage.clear_user_id().await? {
                println!("Signed out");
            } else {
                println!("No stored identity");
            }
        }
        Command::List { status } => {
            let controller = build_controller(&settings, storage)?;
            print!("{}", list_orders(&controller, screen_status(status)).await?);
        }
        Command::Show { order_id, status } => {
            let controller = build_controller(&settings, storage)?;
            print!(
                "{}",
                show_order(&controller, screen_status(status), order_id).await?
            );
        }
        Command::Start { order_id } => {
            let controller = build_controller(&settings, storage)?;
            transition(&controller, PrimaryAction::StartProgress, order_id).await?;
        }
        Command::Complete { order_id } => {
            let controller = build_controller(&settings, storage)?;
            transition(&controller, PrimaryAction::Complete, order_id).await?;
        }
        Command::Watch {
            status,
            interval_secs,
        } => {
            let controller = build_controller(&settings, storage)?;
            watch_orders(&controller, status, Duration::from_secs(interval_secs.max(1))).await?;
        }
    }

    Ok(())
}

fn build_controller(settings: &Settings, storage: Storage) -> Result<Arc<OrderLifecycleController>> {
    let repository = HttpOrderRepository::new(settings.endpoints()?)
        .context("failed to build order http client")?;
    Ok(OrderLifecycleController::new(
        Arc::new(repository),
        Arc::new(storage),
        DEFAULT_STATUS,
    ))
}

async fn transition(
    controller: &Arc<OrderLifecycleController>,
    action: PrimaryAction,
    order_id: OrderId,
) -> Result<()> {
    let (outcome, screen) = run_transition(controller, action, order_id).await?;
    print!("{screen}");
    if outcome == TransitionOutcome::Rejected {
        bail!("order {order_id} was not updated");
    }
    Ok(())
}

async fn watch_orders(
    controller: &Arc<OrderLifecycleController>,
    status: Option<OrderStatus>,
    interval: Duration,
) -> Result<()> {
    let mut events = controller.subscribe_events();
    let (inputs_tx, inputs_rx) = watch::channel(ScreenInputs::new(status.map(navigation_context)));
    controller.mount(inputs_rx).await;

    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await;

    let result = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break Ok(()),
            _ = ticker.tick() => {
                inputs_tx.send_modify(|inputs| inputs.refresh_token += 1);
            }
            event = events.recv() => match event {
                Ok(ControllerEvent::OrdersReplaced { .. }) => {
                    print!("{}", render_screen(&controller.snapshot().await));
                }
                Ok(ControllerEvent::Banner { message, .. }) => println!("{message}"),
                Ok(ControllerEvent::LoginRequired) => break Err(anyhow!(LOGIN_HINT)),
                Ok(ControllerEvent::LoadingChanged(_)) => {}
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "controller events lagged"),
                Err(RecvError::Closed) => break Ok(()),
            },
        }
    };

    controller.unmount().await;
    result
}
