//! Per-instance Gluetun control API configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of one of the two fixed instance slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InstanceId {
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
}

impl InstanceId {
    /// Every slot, in display order.
    pub const ALL: [InstanceId; 2] = [InstanceId::One, InstanceId::Two];

    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceId::One => "1",
            InstanceId::Two => "2",
        }
    }

    /// Name used when neither the config file nor the environment sets one.
    pub fn default_name(&self) -> String {
        format!("Gluetun {}", self.as_str())
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstanceId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(InstanceId::One),
            "2" => Ok(InstanceId::Two),
            other => Err(format!("Unknown instance: {}", other)),
        }
    }
}

/// Credential scheme forwarded to the control API.
#[derive(Clone, PartialEq, Eq, Default)]
pub enum Credentials {
    #[default]
    None,
    /// Sent as `X-API-Key`
    ApiKey(String),
    /// Sent as HTTP basic auth
    Basic {
        username: String,
        password: Option<String>,
    },
}

// Secrets stay out of `?config` debug logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::None => f.write_str("None"),
            Credentials::ApiKey(_) => f.write_str("ApiKey(***)"),
            Credentials::Basic { username, .. } => {
                write!(f, "Basic {{ username: {:?}, password: *** }}", username)
            }
        }
    }
}

/// Raw `[instances.N]` table as written in the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstanceSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl InstanceSettings {
    /// Resolve the table into an [`InstanceConfig`] for the given slot.
    ///
    /// Blank strings count as unset. An API key wins over basic credentials
    /// when both are present.
    pub fn resolve(&self, id: InstanceId) -> InstanceConfig {
        let name = non_empty(&self.name).unwrap_or_else(|| id.default_name());
        let url = non_empty(&self.url).map(|u| u.trim_end_matches('/').to_string());

        let credentials = match (non_empty(&self.api_key), non_empty(&self.username)) {
            (Some(key), _) => Credentials::ApiKey(key),
            (None, Some(username)) => Credentials::Basic {
                username,
                password: non_empty(&self.password),
            },
            (None, None) => Credentials::None,
        };

        InstanceConfig {
            id,
            name,
            url,
            credentials,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Fully resolved configuration for one instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceConfig {
    pub id: InstanceId,
    pub name: String,
    /// Base URL of the control API, without trailing slash
    pub url: Option<String>,
    pub credentials: Credentials,
}

impl InstanceConfig {
    /// An instance is usable only once a base URL is set.
    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }
}

/// The two instance slots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstancesConfig {
    #[serde(rename = "1")]
    pub one: InstanceSettings,
    #[serde(rename = "2")]
    pub two: InstanceSettings,
}

impl InstancesConfig {
    pub fn settings(&self, id: InstanceId) -> &InstanceSettings {
        match id {
            InstanceId::One => &self.one,
            InstanceId::Two => &self.two,
        }
    }

    pub fn settings_mut(&mut self, id: InstanceId) -> &mut InstanceSettings {
        match id {
            InstanceId::One => &mut self.one,
            InstanceId::Two => &mut self.two,
        }
    }

    /// Resolve both slots in id order.
    pub fn resolve_all(&self) -> Vec<InstanceConfig> {
        InstanceId::ALL
            .iter()
            .map(|id| self.settings(*id).resolve(*id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_id_parse() {
        assert_eq!("1".parse::<InstanceId>().unwrap(), InstanceId::One);
        assert_eq!("2".parse::<InstanceId>().unwrap(), InstanceId::Two);
        assert!("3".parse::<InstanceId>().is_err());
        assert!("".parse::<InstanceId>().is_err());
        assert!("one".parse::<InstanceId>().is_err());
    }

    #[test]
    fn test_instance_id_serde() {
        assert_eq!(serde_json::to_string(&InstanceId::Two).unwrap(), "\"2\"");
        let id: InstanceId = serde_json::from_str("\"1\"").unwrap();
        assert_eq!(id, InstanceId::One);
    }

    #[test]
    fn test_resolve_defaults() {
        let config = InstanceSettings::default().resolve(InstanceId::Two);
        assert_eq!(config.name, "Gluetun 2");
        assert!(!config.is_configured());
        assert_eq!(config.credentials, Credentials::None);
    }

    #[test]
    fn test_resolve_trims_trailing_slash() {
        let settings = InstanceSettings {
            url: Some("http://gluetun:8000/".to_string()),
            ..Default::default()
        };
        let config = settings.resolve(InstanceId::One);
        assert_eq!(config.url.as_deref(), Some("http://gluetun:8000"));
        assert!(config.is_configured());
    }

    #[test]
    fn test_blank_url_is_unconfigured() {
        let settings = InstanceSettings {
            url: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(!settings.resolve(InstanceId::One).is_configured());
    }

    #[test]
    fn test_api_key_wins_over_basic() {
        let settings = InstanceSettings {
            api_key: Some("secret".to_string()),
            username: Some("admin".to_string()),
            password: Some("pw".to_string()),
            ..Default::default()
        };
        assert_eq!(
            settings.resolve(InstanceId::One).credentials,
            Credentials::ApiKey("secret".to_string())
        );
    }

    #[test]
    fn test_basic_credentials() {
        let settings = InstanceSettings {
            username: Some("admin".to_string()),
            ..Default::default()
        };
        assert_eq!(
            settings.resolve(InstanceId::One).credentials,
            Credentials::Basic {
                username: "admin".to_string(),
                password: None
            }
        );
    }

    #[test]
    fn test_credentials_debug_hides_secrets() {
        let creds = Credentials::ApiKey("super-secret".to_string());
        assert!(!format!("{:?}", creds).contains("super-secret"));

        let basic = Credentials::Basic {
            username: "admin".to_string(),
            password: Some("hunter2".to_string()),
        };
        let debug = format!("{:?}", basic);
        assert!(debug.contains("admin"));
        assert!(!debug.contains("hunter2"));
    }
}
