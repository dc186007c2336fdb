//! Status command implementation

use crate::cli::output::{format_report, format_report_json};
use crate::cli::StatusArgs;
use crate::dashboard::{DashboardClient, Poller};
use std::sync::Arc;

/// Handle `gluetun-webui status`: one poll of every instance.
pub async fn handle_status(args: &StatusArgs) -> Result<String, Box<dyn std::error::Error>> {
    let client = DashboardClient::new(&args.remote.url, args.remote.timeout())?;
    let poller = Poller::new(Arc::new(client));

    if !poller.load_instances().await {
        tracing::warn!(url = %args.remote.url, "Instance list unavailable, using defaults");
    }

    let report = poller
        .poll()
        .await
        .ok_or("a poll is already in progress")?;

    if args.json {
        Ok(format_report_json(&report))
    } else {
        Ok(format_report(&report))
    }
}
