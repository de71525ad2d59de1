use std::{io::BufRead, sync::Arc, thread};

use anyhow::Context;
use hotel_front_desk::{console, Desk, DeskConfig, FrontDesk, RoomCatalog};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = DeskConfig::default();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.worker_threads)
        .max_blocking_threads(config.worker_threads)
        .enable_all()
        .build()
        .context("failed to build the desk runtime")?;

    runtime.block_on(run(config))
}

async fn run(config: DeskConfig) -> anyhow::Result<()> {
    let catalog = Arc::new(RoomCatalog::seeded());
    let (desk, mut notices) = FrontDesk::start(catalog.clone(), &config);
    info!(rooms = catalog.len(), "front desk open");

    // stdin blocks, so it gets its own thread
    let (line_tx, mut lines) = mpsc::channel::<String>(config.notice_buffer);
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line_tx.blocking_send(line).is_err() {
                break;
            }
        }
    });

    println!("{}", console::HELP);

    // This task is the presentation thread: it alone prints
    let report = console::run_session(&desk, &mut notices, &mut lines, &mut std::io::stdout())
        .await
        .context("failed to write to stdout")?;

    let stats = desk.stats();
    info!(
        shown = report.shown,
        dispatched = stats.dispatched,
        succeeded = stats.succeeded,
        failed = stats.failed,
        total_revenue = catalog.total_revenue(),
        "front desk closed"
    );
    Ok(())
}
