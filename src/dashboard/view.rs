//! Mapping of a health snapshot onto display fields.
//!
//! Every function here is pure: the same snapshot always yields the same
//! [`InstanceView`]. Payloads are read leniently, so a field with an
//! unexpected shape renders as a placeholder instead of failing the card.

use super::types::{
    Badge, Badges, BannerState, CoarseState, InstanceView, IpFields, VpnFields, PLACEHOLDER,
};
use crate::api::{HealthSnapshot, InstanceSummary, SubResult};
use crate::config::InstanceId;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Read one field, turning a value of the wrong type into `None` so that
/// the rest of the payload still renders.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RunStatus {
    #[serde(deserialize_with = "lenient")]
    status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PublicIp {
    #[serde(deserialize_with = "lenient")]
    public_ip: Option<String>,
    #[serde(deserialize_with = "lenient")]
    ip: Option<String>,
    #[serde(rename = "IP", deserialize_with = "lenient")]
    ip_upper: Option<String>,
    #[serde(deserialize_with = "lenient")]
    country: Option<String>,
    #[serde(deserialize_with = "lenient")]
    region: Option<String>,
    #[serde(deserialize_with = "lenient")]
    city: Option<String>,
    #[serde(deserialize_with = "lenient")]
    org: Option<String>,
    #[serde(deserialize_with = "lenient")]
    organization: Option<String>,
    #[serde(deserialize_with = "lenient")]
    hostname: Option<String>,
}

impl PublicIp {
    /// Address used in banner subtitles.
    fn banner_address(&self) -> Option<&str> {
        non_empty(self.public_ip.as_deref()).or_else(|| non_empty(self.ip.as_deref()))
    }

    fn display_address(&self) -> Option<&str> {
        self.banner_address()
            .or_else(|| non_empty(self.ip_upper.as_deref()))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PortForward {
    #[serde(deserialize_with = "lenient")]
    port: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Settings {
    #[serde(rename = "type", deserialize_with = "lenient")]
    vpn_type: Option<String>,
    #[serde(deserialize_with = "lenient")]
    provider: Option<Provider>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Provider {
    #[serde(deserialize_with = "lenient")]
    name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    server_selection: Option<ServerSelection>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ServerSelection {
    #[serde(deserialize_with = "lenient")]
    hostnames: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient")]
    names: Option<Vec<String>>,
}

/// Payload of a successful sub-result, or `None` when it failed.
///
/// A payload that is not an object reads as `T::default()`.
fn payload<T: DeserializeOwned + Default>(result: &SubResult) -> Option<T> {
    if !result.ok {
        return None;
    }
    Some(
        result
            .data()
            .and_then(|value| serde_json::from_value(value.clone()).ok())
            .unwrap_or_default(),
    )
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn or_placeholder(value: Option<&str>) -> String {
    value.unwrap_or(PLACEHOLDER).to_string()
}

fn first(list: Option<&Vec<String>>) -> Option<&str> {
    list.and_then(|items| items.first()).map(String::as_str)
}

/// Banner title and subtitle for a state.
pub fn banner_text(id: InstanceId, state: BannerState, ip: Option<&str>) -> (String, String) {
    match state {
        BannerState::Connected => (
            "VPN Connected".to_string(),
            match ip {
                Some(ip) => format!("Public IP: {}", ip),
                None => "Tunnel is up".to_string(),
            },
        ),
        BannerState::Paused => (
            "VPN Paused".to_string(),
            match ip {
                Some(ip) => format!("Gluetun active – exit IP: {}", ip),
                None => "Gluetun active – VPN process stopped".to_string(),
            },
        ),
        BannerState::Disconnected => (
            "VPN Disconnected".to_string(),
            "Tunnel is down – traffic may be unprotected".to_string(),
        ),
        BannerState::Unconfigured => (
            "Not Configured".to_string(),
            format!("Set GLUETUN_{}_URL to enable this instance", id),
        ),
        BannerState::Unknown => (
            "Status Unknown".to_string(),
            "Could not reach Gluetun control API".to_string(),
        ),
    }
}

/// Render one instance from its latest snapshot.
pub fn render_snapshot(summary: &InstanceSummary, snapshot: &HealthSnapshot) -> InstanceView {
    let run: Option<RunStatus> = payload(&snapshot.vpn_status);
    let ip: Option<PublicIp> = payload(&snapshot.public_ip);
    let port: Option<PortForward> = payload(&snapshot.port_forwarded);
    let dns: Option<RunStatus> = payload(&snapshot.dns_status);
    let settings: Settings = payload(&snapshot.vpn_settings).unwrap_or_default();

    let (state, vpn, vpn_badge) = match &run {
        None => (
            CoarseState::Unknown,
            VpnFields::empty("Unreachable"),
            Badge::Error,
        ),
        Some(run) => {
            let state = CoarseState::from_run_status(run.status.as_deref());
            let provider = settings.provider.as_ref();
            let selection = provider.and_then(|p| p.server_selection.as_ref());
            let server = ip
                .as_ref()
                .and_then(|ip| non_empty(ip.hostname.as_deref()))
                .or_else(|| first(selection.and_then(|s| s.hostnames.as_ref())))
                .or_else(|| first(selection.and_then(|s| s.names.as_ref())));
            let fields = VpnFields {
                status: or_placeholder(run.status.as_deref()),
                provider: or_placeholder(provider.and_then(|p| p.name.as_deref())),
                protocol: or_placeholder(settings.vpn_type.as_deref()),
                country: or_placeholder(ip.as_ref().and_then(|ip| ip.country.as_deref())),
                city: or_placeholder(ip.as_ref().and_then(|ip| ip.city.as_deref())),
                server: or_placeholder(server),
            };
            let badge = match state {
                CoarseState::Connected => Badge::Ok,
                CoarseState::Paused => Badge::Warn,
                _ => Badge::Error,
            };
            (state, fields, badge)
        }
    };

    let (ip_fields, ip_badge) = match &ip {
        None => (IpFields::default(), Badge::Error),
        Some(ip) => (
            IpFields {
                address: or_placeholder(ip.display_address()),
                country: or_placeholder(ip.country.as_deref()),
                region: or_placeholder(ip.region.as_deref()),
                city: or_placeholder(ip.city.as_deref()),
                org: or_placeholder(ip.org.as_deref().or(ip.organization.as_deref())),
            },
            Badge::Ok,
        ),
    };

    let (port_text, port_badge) = match port {
        None => ("N/A".to_string(), Badge::Warn),
        Some(PortForward { port: Some(p) }) if p > 0 => (p.to_string(), Badge::Ok),
        Some(_) => ("Not forwarded".to_string(), Badge::Warn),
    };

    let (dns_text, dns_badge) = match dns {
        None => ("Unavailable".to_string(), Badge::Warn),
        Some(dns) => (dns.status.unwrap_or_else(|| "OK".to_string()), Badge::Ok),
    };

    let banner = BannerState::from(state);
    let (title, mut subtitle) = banner_text(
        summary.id,
        banner,
        ip.as_ref().and_then(PublicIp::banner_address),
    );
    if snapshot.auth_error {
        subtitle = format!("Unauthorized: configure GLUETUN_{}_API_KEY", summary.id);
    }

    InstanceView {
        id: summary.id,
        name: summary.name.clone(),
        banner,
        title,
        subtitle,
        vpn,
        ip: ip_fields,
        port: port_text,
        dns: dns_text,
        badges: Badges {
            vpn: vpn_badge,
            ip: ip_badge,
            port: port_badge,
            dns: dns_badge,
        },
        controls_enabled: true,
        auth_error: snapshot.auth_error,
    }
}

fn render_empty(
    summary: &InstanceSummary,
    banner: BannerState,
    controls_enabled: bool,
) -> InstanceView {
    let (title, subtitle) = banner_text(summary.id, banner, None);
    InstanceView {
        id: summary.id,
        name: summary.name.clone(),
        banner,
        title,
        subtitle,
        vpn: VpnFields::empty(PLACEHOLDER),
        ip: IpFields::default(),
        port: PLACEHOLDER.to_string(),
        dns: PLACEHOLDER.to_string(),
        badges: Badges {
            vpn: Badge::Error,
            ip: Badge::Error,
            port: Badge::Warn,
            dns: Badge::Warn,
        },
        controls_enabled,
        auth_error: false,
    }
}

/// View of an instance slot without base URL. Controls are disabled.
pub fn render_unconfigured(summary: &InstanceSummary) -> InstanceView {
    render_empty(summary, BannerState::Unconfigured, false)
}

/// View of an instance whose aggregate could not be fetched.
pub fn render_unreachable(summary: &InstanceSummary) -> InstanceView {
    let mut view = render_empty(summary, BannerState::Unknown, true);
    view.vpn.status = "Unreachable".to_string();
    view
}
