//! VPN start/stop command implementation

use crate::api::VpnAction;
use crate::cli::VpnArgs;
use crate::dashboard::{DashboardClient, HealthSource};

/// Handle `gluetun-webui vpn start|stop --instance N`.
pub async fn handle_vpn(
    action: VpnAction,
    args: &VpnArgs,
) -> Result<String, Box<dyn std::error::Error>> {
    let client = DashboardClient::new(&args.remote.url, args.remote.timeout())?;
    client.vpn_action(args.instance, action).await?;
    Ok(format!(
        "✓ VPN {} command sent (instance {})",
        action.as_str(),
        args.instance
    ))
}
