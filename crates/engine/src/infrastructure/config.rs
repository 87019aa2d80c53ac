//! Application configuration

use std::env;

use anyhow::{anyhow, Context, Result};

const DEFAULT_BROADCAST_CAPACITY: usize = 256;

/// Which progression notifier the engine wires in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifierKind {
    /// Emit every progression message through `tracing`
    Log,
    /// Fan messages out to in-process subscribers
    Broadcast,
    /// Do not publish progression changes
    None,
}

impl std::fmt::Display for NotifierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotifierKind::Log => write!(f, "log"),
            NotifierKind::Broadcast => write!(f, "broadcast"),
            NotifierKind::None => write!(f, "none"),
        }
    }
}

impl std::str::FromStr for NotifierKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "log" | "tracing" => Ok(NotifierKind::Log),
            "broadcast" | "channel" => Ok(NotifierKind::Broadcast),
            "none" | "off" | "disabled" => Ok(NotifierKind::None),
            _ => Err(()),
        }
    }
}

/// Application configuration loaded from environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Progression notifier backend
    pub notifier: NotifierKind,
    /// Buffered messages per broadcast subscriber before it starts lagging
    pub broadcast_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            notifier: NotifierKind::Log,
            broadcast_capacity: DEFAULT_BROADCAST_CAPACITY,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let raw_notifier = lookup("GAMEBLITZ_NOTIFIER").unwrap_or_else(|| "log".to_string());
        let notifier = raw_notifier.parse().map_err(|_| {
            anyhow!("GAMEBLITZ_NOTIFIER must be one of log, broadcast, none (got {raw_notifier:?})")
        })?;

        let broadcast_capacity: usize = lookup("GAMEBLITZ_BROADCAST_CAPACITY")
            .unwrap_or_else(|| DEFAULT_BROADCAST_CAPACITY.to_string())
            .trim()
            .parse()
            .context("GAMEBLITZ_BROADCAST_CAPACITY must be a positive integer")?;
        if broadcast_capacity == 0 {
            return Err(anyhow!("GAMEBLITZ_BROADCAST_CAPACITY must be greater than zero"));
        }

        Ok(Self {
            notifier,
            broadcast_capacity,
        })
    }
}
