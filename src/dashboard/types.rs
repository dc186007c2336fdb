//! Display types shared by the renderer, the poller and the terminal views.

use crate::config::InstanceId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Placeholder shown for a field with no value.
pub const PLACEHOLDER: &str = "–";

/// Connection state recorded in the history strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoarseState {
    Connected,
    Paused,
    Disconnected,
    Unknown,
}

impl CoarseState {
    pub const ALL: [CoarseState; 4] = [
        CoarseState::Connected,
        CoarseState::Paused,
        CoarseState::Disconnected,
        CoarseState::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CoarseState::Connected => "connected",
            CoarseState::Paused => "paused",
            CoarseState::Disconnected => "disconnected",
            CoarseState::Unknown => "unknown",
        }
    }

    /// Map a Gluetun run status onto a coarse state.
    pub fn from_run_status(status: Option<&str>) -> Self {
        match status {
            Some("running") => CoarseState::Connected,
            Some("stopped") => CoarseState::Paused,
            _ => CoarseState::Disconnected,
        }
    }
}

impl fmt::Display for CoarseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoarseState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CoarseState::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| format!("unknown state '{}'", s))
    }
}

/// State of an instance's banner. Adds `Unconfigured` to [`CoarseState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BannerState {
    Unconfigured,
    Connected,
    Paused,
    Disconnected,
    Unknown,
}

impl BannerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BannerState::Unconfigured => "unconfigured",
            BannerState::Connected => "connected",
            BannerState::Paused => "paused",
            BannerState::Disconnected => "disconnected",
            BannerState::Unknown => "unknown",
        }
    }
}

impl From<CoarseState> for BannerState {
    fn from(state: CoarseState) -> Self {
        match state {
            CoarseState::Connected => BannerState::Connected,
            CoarseState::Paused => BannerState::Paused,
            CoarseState::Disconnected => BannerState::Disconnected,
            CoarseState::Unknown => BannerState::Unknown,
        }
    }
}

/// Colour class of a card badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Badge {
    Ok,
    Warn,
    Error,
}

impl Badge {
    pub fn label(&self) -> &'static str {
        match self {
            Badge::Ok => "OK",
            Badge::Warn => "Warn",
            Badge::Error => "Error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badges {
    pub vpn: Badge,
    pub ip: Badge,
    pub port: Badge,
    pub dns: Badge,
}

/// Fields of the VPN card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VpnFields {
    pub status: String,
    pub provider: String,
    pub protocol: String,
    pub country: String,
    pub city: String,
    pub server: String,
}

impl VpnFields {
    pub fn empty(status: &str) -> Self {
        Self {
            status: status.to_string(),
            provider: PLACEHOLDER.to_string(),
            protocol: PLACEHOLDER.to_string(),
            country: PLACEHOLDER.to_string(),
            city: PLACEHOLDER.to_string(),
            server: PLACEHOLDER.to_string(),
        }
    }
}

/// Fields of the exit IP card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpFields {
    pub address: String,
    pub country: String,
    pub region: String,
    pub city: String,
    pub org: String,
}

impl Default for IpFields {
    fn default() -> Self {
        Self {
            address: PLACEHOLDER.to_string(),
            country: PLACEHOLDER.to_string(),
            region: PLACEHOLDER.to_string(),
            city: PLACEHOLDER.to_string(),
            org: PLACEHOLDER.to_string(),
        }
    }
}

/// Everything the UI shows for one instance after a poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceView {
    pub id: InstanceId,
    pub name: String,
    pub banner: BannerState,
    pub title: String,
    pub subtitle: String,
    pub vpn: VpnFields,
    pub ip: IpFields,
    pub port: String,
    pub dns: String,
    pub badges: Badges,
    /// Start/stop buttons usable
    pub controls_enabled: bool,
    /// The control API rejected the configured credentials
    pub auth_error: bool,
}

impl InstanceView {
    /// History tick for this view; unconfigured instances record nothing.
    pub fn coarse_state(&self) -> Option<CoarseState> {
        match self.banner {
            BannerState::Unconfigured => None,
            BannerState::Connected => Some(CoarseState::Connected),
            BannerState::Paused => Some(CoarseState::Paused),
            BannerState::Disconnected => Some(CoarseState::Disconnected),
            BannerState::Unknown => Some(CoarseState::Unknown),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

/// Short-lived notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

impl Toast {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Error,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_status_mapping() {
        assert_eq!(
            CoarseState::from_run_status(Some("running")),
            CoarseState::Connected
        );
        assert_eq!(
            CoarseState::from_run_status(Some("stopped")),
            CoarseState::Paused
        );
        assert_eq!(
            CoarseState::from_run_status(Some("crashed")),
            CoarseState::Disconnected
        );
        assert_eq!(CoarseState::from_run_status(None), CoarseState::Disconnected);
    }

    #[test]
    fn test_coarse_state_parse() {
        for state in CoarseState::ALL {
            assert_eq!(state.as_str().parse::<CoarseState>().unwrap(), state);
        }
        assert!("unconfigured".parse::<CoarseState>().is_err());
        assert!("Connected".parse::<CoarseState>().is_err());
    }

    #[test]
    fn test_serialization_is_lowercase() {
        assert_eq!(
            serde_json::to_string(&CoarseState::Paused).unwrap(),
            "\"paused\""
        );
        assert_eq!(
            serde_json::to_string(&BannerState::Unconfigured).unwrap(),
            "\"unconfigured\""
        );
        assert_eq!(serde_json::to_string(&Badge::Warn).unwrap(), "\"warn\"");
    }

    #[test]
    fn test_banner_from_coarse() {
        for state in CoarseState::ALL {
            assert_eq!(BannerState::from(state).as_str(), state.as_str());
        }
    }
}
