//! Output formatting helpers for CLI commands

use crate::config::InstanceConfig;
use crate::dashboard::{Badge, BannerState, CoarseState, InstanceView, PollReport, Toast, ToastKind};
use colored::{ColoredString, Colorize};
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde_json::json;
use std::fmt::Write;

/// View model for instance slot display
#[derive(Debug, Clone, serde::Serialize)]
pub struct InstanceRow {
    pub id: String,
    pub name: String,
    pub configured: bool,
    pub url: Option<String>,
    pub auth: &'static str,
}

impl From<&InstanceConfig> for InstanceRow {
    fn from(instance: &InstanceConfig) -> Self {
        Self {
            id: instance.id.to_string(),
            name: instance.name.clone(),
            configured: instance.is_configured(),
            url: instance.url.clone(),
            auth: match instance.credentials {
                crate::config::Credentials::None => "none",
                crate::config::Credentials::ApiKey(_) => "api key",
                crate::config::Credentials::Basic { .. } => "basic",
            },
        }
    }
}

/// Format instance slots as a table
pub fn format_instances_table(rows: &[InstanceRow]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["ID", "Name", "Status", "URL", "Auth"]);

    for row in rows {
        let status = if row.configured {
            "Configured".green().to_string()
        } else {
            "Not configured".dimmed().to_string()
        };
        table.add_row(vec![
            Cell::new(&row.id),
            Cell::new(&row.name),
            Cell::new(status),
            Cell::new(row.url.as_deref().unwrap_or("-")),
            Cell::new(row.auth),
        ]);
    }

    table.to_string()
}

/// Format instance slots as JSON
pub fn format_instances_json(rows: &[InstanceRow]) -> String {
    serde_json::to_string_pretty(&json!({ "instances": rows })).unwrap_or_default()
}

fn banner_colored(view: &InstanceView) -> ColoredString {
    let title = view.title.as_str();
    match view.banner {
        BannerState::Connected => title.green().bold(),
        BannerState::Paused => title.yellow().bold(),
        BannerState::Disconnected => title.red().bold(),
        BannerState::Unknown => title.magenta().bold(),
        BannerState::Unconfigured => title.dimmed(),
    }
}

fn badge_colored(badge: Badge) -> ColoredString {
    match badge {
        Badge::Ok => badge.label().green(),
        Badge::Warn => badge.label().yellow(),
        Badge::Error => badge.label().red(),
    }
}

/// One coloured block per tick, oldest first.
pub fn history_strip(states: &[CoarseState]) -> String {
    states
        .iter()
        .map(|state| {
            let block = "■";
            match state {
                CoarseState::Connected => block.green().to_string(),
                CoarseState::Paused => block.yellow().to_string(),
                CoarseState::Disconnected => block.red().to_string(),
                CoarseState::Unknown => block.dimmed().to_string(),
            }
        })
        .collect()
}

/// Card-style table for one instance.
pub fn format_view(view: &InstanceView, history: &[CoarseState]) -> String {
    let mut output = String::new();
    let _ = writeln!(
        output,
        "{} {}  {}",
        format!("[{}]", view.id).bold(),
        view.name,
        banner_colored(view)
    );
    let _ = writeln!(output, "    {}", view.subtitle);

    if view.banner != BannerState::Unconfigured {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["", "Value", ""]);
        let rows = [
            ("VPN status", &view.vpn.status, Some(view.badges.vpn)),
            ("Provider", &view.vpn.provider, None),
            ("Protocol", &view.vpn.protocol, None),
            ("Server", &view.vpn.server, None),
            ("Public IP", &view.ip.address, Some(view.badges.ip)),
            ("Location", &location(view), None),
            ("Org", &view.ip.org, None),
            ("Forwarded port", &view.port, Some(view.badges.port)),
            ("DNS", &view.dns, Some(view.badges.dns)),
        ];
        for (label, value, badge) in rows {
            table.add_row(vec![
                Cell::new(label),
                Cell::new(value),
                Cell::new(badge.map(|b| badge_colored(b).to_string()).unwrap_or_default()),
            ]);
        }
        let _ = writeln!(output, "{}", table);
    }

    if !history.is_empty() {
        let _ = writeln!(output, "    History: {}", history_strip(history));
    }
    output
}

fn location(view: &InstanceView) -> String {
    [&view.ip.city, &view.ip.region, &view.ip.country]
        .into_iter()
        .filter(|part| part.as_str() != crate::dashboard::types::PLACEHOLDER)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ")
}

/// Every view of a poll plus its toasts.
pub fn format_report(report: &PollReport) -> String {
    let mut output = String::new();
    for view in &report.views {
        let history = report.history.states(view.id);
        let _ = writeln!(output, "{}", format_view(view, &history));
    }
    for toast in &report.toasts {
        let _ = writeln!(output, "{}", format_toast(toast));
    }
    let _ = write!(
        output,
        "{}",
        format!("Updated {}", report.completed_at.format("%H:%M:%S")).dimmed()
    );
    output
}

/// A poll report as JSON.
pub fn format_report_json(report: &PollReport) -> String {
    serde_json::to_string_pretty(&json!({
        "instances": report.views,
        "history": report.history.snapshot(),
        "toasts": report.toasts,
        "updated": report.completed_at,
    }))
    .unwrap_or_default()
}

pub fn format_toast(toast: &Toast) -> String {
    match toast.kind {
        ToastKind::Info => format!("{} {}", "•".cyan(), toast.message),
        ToastKind::Success => format!("{} {}", "✓".green(), toast.message),
        ToastKind::Error => format!("{} {}", "✗".red(), toast.message.red()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::InstanceSummary;
    use crate::config::{Credentials, InstanceId};
    use crate::dashboard::{render_unconfigured, render_unreachable, HistoryStore};
    use chrono::Utc;

    fn summary(id: InstanceId) -> InstanceSummary {
        InstanceSummary {
            id,
            name: id.default_name(),
            configured: id == InstanceId::One,
        }
    }

    #[test]
    fn test_format_instances_table_empty() {
        let output = format_instances_table(&[]);
        assert!(output.contains("Name"));
    }

    #[test]
    fn test_instance_row_hides_secrets() {
        let instance = InstanceConfig {
            id: InstanceId::One,
            name: "Home".to_string(),
            url: Some("http://gluetun:8000".to_string()),
            credentials: Credentials::ApiKey("hunter2".to_string()),
        };
        let rows = vec![InstanceRow::from(&instance)];

        let table = format_instances_table(&rows);
        assert!(table.contains("http://gluetun:8000"));
        assert!(table.contains("api key"));
        assert!(!table.contains("hunter2"));

        let json = format_instances_json(&rows);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["instances"][0]["configured"], true);
        assert!(!json.contains("hunter2"));
    }

    #[test]
    fn test_history_strip_one_block_per_tick() {
        colored::control::set_override(false);
        let strip = history_strip(&[CoarseState::Connected, CoarseState::Unknown]);
        assert_eq!(strip, "■■");
    }

    #[test]
    fn test_unconfigured_view_has_no_table() {
        colored::control::set_override(false);
        let output = format_view(&render_unconfigured(&summary(InstanceId::Two)), &[]);
        assert!(output.contains("Not Configured"));
        assert!(output.contains("GLUETUN_2_URL"));
        assert!(!output.contains("Public IP"));
    }

    #[test]
    fn test_report_lists_every_instance() {
        colored::control::set_override(false);
        let mut history = HistoryStore::new();
        history.push(InstanceId::One, CoarseState::Unknown);
        let report = PollReport {
            views: vec![
                render_unreachable(&summary(InstanceId::One)),
                render_unconfigured(&summary(InstanceId::Two)),
            ],
            toasts: vec![Toast::error("Instance 1: Failed to reach server: boom")],
            history,
            completed_at: Utc::now(),
        };

        let text = format_report(&report);
        assert!(text.contains("Status Unknown"));
        assert!(text.contains("Not Configured"));
        assert!(text.contains("History: ■"));
        assert!(text.contains("Failed to reach server"));

        let json: serde_json::Value = serde_json::from_str(&format_report_json(&report)).unwrap();
        assert_eq!(json["instances"].as_array().unwrap().len(), 2);
        assert_eq!(json["history"]["1"][0], "unknown");
    }
}
