//! Web dashboard: the embedded browser UI and its Rust twin.
//!
//! - [`handler`] serves `dashboard/` (HTML, JS, CSS) for every non-API path
//! - [`view`] maps a health snapshot onto banner, badges and fields
//! - [`history`] keeps the last 30 connection states per instance
//! - [`poller`] polls the API on a timer and reacts to commands; the
//!   terminal `status` and `watch` commands are built on it

pub mod client;
pub mod handler;
pub mod history;
pub mod poller;
pub mod types;
pub mod view;

pub use client::{ClientError, DashboardClient, HealthSource};
pub use handler::serve_ui;
pub use history::{HistoryStore, HistoryTrack, MAX_HISTORY};
pub use poller::{Poller, PollerCommand, PollerEvent, PollReport};
pub use types::{Badge, BannerState, CoarseState, InstanceView, Toast, ToastKind};
pub use view::{render_snapshot, render_unconfigured, render_unreachable};
