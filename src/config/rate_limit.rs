//! Rate limit budgets for the HTTP surface

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One fixed-window budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowBudget {
    pub max_requests: u32,
    pub window_seconds: u64,
}

impl WindowBudget {
    pub const fn new(max_requests: u32, window_seconds: u64) -> Self {
        Self {
            max_requests,
            window_seconds,
        }
    }

    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_seconds)
    }
}

/// Budgets per route group, counted per client IP
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// GET `/api/*`
    pub read: WindowBudget,
    /// PUT `/api/vpn/*`
    pub action: WindowBudget,
    /// Static assets and the UI shell
    pub ui: WindowBudget,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            read: WindowBudget::new(120, 60),
            action: WindowBudget::new(10, 60),
            ui: WindowBudget::new(500, 15 * 60),
        }
    }
}
