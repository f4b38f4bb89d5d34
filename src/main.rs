use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use clap::Parser;
use crossbeam_channel::{bounded, unbounded};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use netsentry::config::Cli;
use netsentry::report::ConsoleSink;
use netsentry::{sniff, AnomalyEvaluator, Pipeline, WindowAggregator};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if cli.list_devices {
        for device in sniff::list_devices()? {
            println!("{}\t{}", device.name, device.desc.as_deref().unwrap_or(""));
        }
        return Ok(());
    }

    let window = cli.window_config()?;
    let rules = cli.rules();
    info!(?window, ?rules, "monitor configured");

    let (tx, rx) = unbounded();
    let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
    let running = Arc::new(AtomicBool::new(true));

    let running_clone = running.clone();
    ctrlc::set_handler(move || {
        running_clone.store(false, Ordering::SeqCst);
        let _ = shutdown_tx.try_send(());
    })?;

    let interface = cli.interface.clone();
    let running_clone = running.clone();
    let capture_thread = thread::spawn(move || {
        if let Err(e) = sniff::start_capture(interface.as_deref(), tx, running_clone) {
            error!(error = %e, "packet capture failed");
        }
    });

    let mut pipeline = Pipeline::new(
        WindowAggregator::new(window),
        AnomalyEvaluator::new(rules),
        ConsoleSink::stdout(cli.format),
    );
    let summary = pipeline.run_until(&rx, &shutdown_rx);

    running.store(false, Ordering::SeqCst);
    drop(rx);
    if capture_thread.join().is_err() {
        error!("capture thread panicked");
    }

    println!("\nStopping packet capture ({} packets, {} windows, {} alerts)",
        summary.events, summary.windows, summary.alerts);
    Ok(())
}
