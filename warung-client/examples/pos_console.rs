// warung-client/examples/pos_console.rs
// Console POS: log in, poll the floor plan and print what changes

use anyhow::Context;
use shared::models::{OrderCounts, TableCounts};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use warung_client::{ChannelNotifier, ClientConfig, DiningTable, Food, Order, PosSession};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,warung_client=debug")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config = ClientConfig::from_env();
    tracing::info!(base_url = %config.base_url, "Connecting");

    let mut client = config.build_http_client()?;
    match (args.get(1), args.get(2)) {
        (Some(email), Some(password)) => {
            let resp = client
                .login(email, password)
                .await
                .context("login failed")?;
            tracing::info!(user = %resp.user.fullname, role = %resp.user.role, "Logged in");
        }
        _ if client.token().is_none() => {
            println!("Usage: {} <email> <password>", args[0]);
            println!("  or set WARUNG_TOKEN in the environment / .env");
            return Ok(());
        }
        _ => {}
    }

    let notifier = ChannelNotifier::default();
    let mut toasts = notifier.subscribe();
    let mut session = PosSession::new(client, &config).with_notifier(Arc::new(notifier));

    let mut tables = session.subscribe::<DiningTable>();
    let mut orders = session.subscribe::<Order>();
    session.start_polling();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = tables.changed() => {
                changed?;
                let counts = TableCounts::from_tables(&tables.current());
                println!(
                    "tables: {} available, {} occupied, {} reserved, {} inactive",
                    counts.available, counts.occupied, counts.reserved, counts.inactive
                );
            }
            changed = orders.changed() => {
                changed?;
                let counts = OrderCounts::from_orders(&orders.current());
                println!("orders: {} total, {} open, {} closed", counts.total, counts.open, counts.closed);
            }
            Ok(toast) = toasts.recv() => {
                println!("[{:?}] {}", toast.level, toast.message);
            }
        }
    }

    let menu = session.cache::<Food>().get();
    tracing::info!(foods = menu.len(), active = menu.iter().filter(|f| f.is_active).count(), "Menu at exit");
    session.stop_polling().await;
    Ok(())
}
