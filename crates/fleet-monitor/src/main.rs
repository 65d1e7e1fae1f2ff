//! Mining Fleet Monitor - Main Entry Point

use fleet_monitor::{init_logging, load_config, FleetMonitor};
use reports::ReportKind;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;

    info!("=== Mining Fleet Monitor v{} ===", env!("CARGO_PKG_VERSION"));

    // Optional config file path as the only argument
    let config_path = std::env::args().nth(1);
    let config = load_config(config_path.as_deref())?;
    let mut monitor = FleetMonitor::from_config(config);

    let overheated = monitor.monitor_temperature()?;
    info!("{} machines above threshold", overheated.len());
    monitor.diagnose_faults()?;

    monitor.record_price(0.16)?;
    info!("{}", monitor.pricing().display_price());

    for kind in [ReportKind::Financial, ReportKind::Performance] {
        info!("\n{}", monitor.report(kind));
    }

    let mut operation = monitor.restart_operation(&overheated);
    operation.execute_restart().await;
    info!("{}", operation.provide_feedback());
    println!("{}", serde_json::to_string_pretty(&operation.summary())?);

    let snapshots: Vec<_> = monitor.registry().all().iter().map(|d| d.snapshot()).collect();
    for device in monitor.registry().all() {
        info!("{}", device.monitor_status());
    }
    println!("{}", serde_json::to_string_pretty(&snapshots)?);

    Ok(())
}
