use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::config::SimpleSettings;
use crate::plugin_system::error::PluginSystemError;
use crate::registry::NodeWriter;

/// How a getter takes a new configuration file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadMode {
    /// `update_config` is applied while acquisition keeps running
    HotReload,
    /// The manager stops the getter, reconfigures it and starts it again
    Restart,
}

/// Lifecycle state of one configured getter, tracked by the manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GetterState {
    Uninitialized,
    Initialized,
    Running,
    Reconfiguring,
    Stopped,
    Failed,
}

impl GetterState {
    pub fn as_str(&self) -> &'static str {
        match self {
            GetterState::Uninitialized => "uninitialized",
            GetterState::Initialized => "initialized",
            GetterState::Running => "running",
            GetterState::Reconfiguring => "reconfiguring",
            GetterState::Stopped => "stopped",
            GetterState::Failed => "failed",
        }
    }
}

impl fmt::Display for GetterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a getter receives at initialize time.
///
/// `cancel` is a child of the manager's token. A getter that supports being
/// restarted should derive a fresh child token per run instead of cancelling
/// this one.
#[derive(Debug, Clone)]
pub struct GetterContext {
    pub getter_id: String,
    pub config_path: Option<PathBuf>,
    pub test_mode: bool,
    pub settings: SimpleSettings,
    pub writer: NodeWriter,
    pub cancel: CancellationToken,
}

/// Contract every data-source plugin implements.
///
/// The manager drives the calls in order: `initialize`, then `start`, then
/// any number of `update_config`, then `stop`. Dropping a getter must be safe
/// at any point, including before `start`.
#[async_trait]
pub trait DataGetter: Send + Sync {
    /// Catalog type name of this implementation
    fn type_name(&self) -> &'static str;

    fn reload_mode(&self) -> ReloadMode;

    /// Bind the getter to its id, settings and registry writer. A failure
    /// must not leave background work behind.
    async fn initialize(&mut self, ctx: GetterContext) -> Result<(), PluginSystemError>;

    /// Apply a new configuration file. Only valid after `initialize`.
    async fn update_config(&mut self, path: &Path) -> Result<(), PluginSystemError>;

    /// Begin acquisition. Returns `false` when preconditions are not met.
    async fn start(&mut self) -> bool;

    /// Cancel acquisition and wait for it to finish.
    async fn stop(&mut self) -> Result<(), PluginSystemError>;
}
