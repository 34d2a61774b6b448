//! Local book configuration.
//!
//! Settings are fixed at construction. They can be built in code, deserialized,
//! or loaded from `ORDERBOOK_*` environment variables.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How excess bid levels are removed when the book exceeds `max_depth`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrimPolicy {
    /// Historical index arithmetic: the lowest bid survives the trim and one
    /// fewer top bid is kept in its place.
    #[default]
    Legacy,
    /// Keep exactly the best `max_per_side` bids.
    Exact,
}

impl fmt::Display for TrimPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy => write!(f, "legacy"),
            Self::Exact => write!(f, "exact"),
        }
    }
}

impl FromStr for TrimPolicy {
    type Err = ParseTrimPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "legacy" => Ok(Self::Legacy),
            "exact" | "strict" => Ok(Self::Exact),
            _ => Err(ParseTrimPolicyError(s.to_string())),
        }
    }
}

/// Error parsing a trim policy string.
#[derive(Debug, Clone)]
pub struct ParseTrimPolicyError(String);

impl fmt::Display for ParseTrimPolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid trim policy '{}', expected 'legacy' or 'exact'",
            self.0
        )
    }
}

impl std::error::Error for ParseTrimPolicyError {}

/// What a snapshot does with levels already in the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotMode {
    /// Snapshot levels are merged into existing content.
    #[default]
    Accumulate,
    /// Both sides are cleared before the snapshot is applied.
    Replace,
}

impl fmt::Display for SnapshotMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accumulate => write!(f, "accumulate"),
            Self::Replace => write!(f, "replace"),
        }
    }
}

impl FromStr for SnapshotMode {
    type Err = ParseSnapshotModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "accumulate" | "append" | "merge" => Ok(Self::Accumulate),
            "replace" | "reset" => Ok(Self::Replace),
            _ => Err(ParseSnapshotModeError(s.to_string())),
        }
    }
}

/// Error parsing a snapshot mode string.
#[derive(Debug, Clone)]
pub struct ParseSnapshotModeError(String);

impl fmt::Display for ParseSnapshotModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid snapshot mode '{}', expected 'accumulate' or 'replace'",
            self.0
        )
    }
}

impl std::error::Error for ParseSnapshotModeError {}

/// Configuration for a [`LocalBook`](crate::LocalBook).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookConfig {
    /// Reject deltas whose update id is below the last applied one.
    pub check_update_id: bool,

    /// Maximum number of levels kept across both sides combined.
    /// Zero means the trimmed view is always empty.
    pub max_depth: usize,

    /// How excess bids are trimmed.
    pub trim_policy: TrimPolicy,

    /// Whether snapshots merge into or replace existing content.
    pub snapshot_mode: SnapshotMode,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            check_update_id: true,
            max_depth: 0,
            trim_policy: TrimPolicy::Legacy,
            snapshot_mode: SnapshotMode::Accumulate,
        }
    }
}

impl BookConfig {
    /// Create a new config with all default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to enable or disable update id checks.
    pub fn with_check_update_id(mut self, enabled: bool) -> Self {
        self.check_update_id = enabled;
        self
    }

    /// Builder method to set the maximum depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Builder method to set the trim policy.
    pub fn with_trim_policy(mut self, policy: TrimPolicy) -> Self {
        self.trim_policy = policy;
        self
    }

    /// Builder method to set the snapshot mode.
    pub fn with_snapshot_mode(mut self, mode: SnapshotMode) -> Self {
        self.snapshot_mode = mode;
        self
    }

    /// Levels kept per side when trimming, `max_depth / 2` rounded half up.
    pub fn max_per_side(&self) -> usize {
        self.max_depth / 2 + self.max_depth % 2
    }

    /// Load config from environment variables.
    ///
    /// Reads `ORDERBOOK_CHECK_UPDATE_ID`, `ORDERBOOK_MAX_DEPTH`,
    /// `ORDERBOOK_TRIM_POLICY` and `ORDERBOOK_SNAPSHOT_MODE`. Missing or
    /// invalid values keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            check_update_id: lookup("ORDERBOOK_CHECK_UPDATE_ID")
                .and_then(|s| parse_bool(&s))
                .unwrap_or(defaults.check_update_id),
            max_depth: lookup("ORDERBOOK_MAX_DEPTH")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.max_depth),
            trim_policy: lookup("ORDERBOOK_TRIM_POLICY")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.trim_policy),
            snapshot_mode: lookup("ORDERBOOK_SNAPSHOT_MODE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.snapshot_mode),
        }
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
