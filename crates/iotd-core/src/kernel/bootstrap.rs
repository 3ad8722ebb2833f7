use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Local;
use tokio::sync::Mutex;

use crate::config::ServerSettings;
use crate::frontend::QueryService;
use crate::kernel::component::KernelComponent;
use crate::kernel::constants;
use crate::kernel::error::{Error, KernelLifecyclePhase, Result};
use crate::plugin_system::{DataGetterManager, GetterCatalog, LifecycleReport, PluginSystemError};
use crate::registry::NodeRegistry;

/// The data server: one registry, the getters feeding it and the query
/// front-end reading it.
///
/// Start brings up the getters before the front-end; stop tears them down in
/// the opposite order so no query runs while writers are being revoked.
pub struct DataServer {
    settings: ServerSettings,
    catalog: GetterCatalog,
    registry: Arc<NodeRegistry>,
    frontend: Arc<QueryService>,
    // Built on every start, dropped on stop
    manager: Mutex<Option<Arc<DataGetterManager>>>,
    last_report: parking_lot::Mutex<Option<LifecycleReport>>,
    running: AtomicBool,
}

impl DataServer {
    pub fn new(settings: ServerSettings, catalog: GetterCatalog) -> Self {
        log::info!("Initializing {} v{}", constants::APP_NAME, constants::APP_VERSION);
        let registry = Arc::new(NodeRegistry::new());
        let frontend = Arc::new(QueryService::new(Arc::clone(&registry), settings.service_port));
        Self {
            settings,
            catalog,
            registry,
            frontend,
            manager: Mutex::new(None),
            last_report: parking_lot::Mutex::new(None),
            running: AtomicBool::new(false),
        }
    }

    /// Start getters, then the front-end. Returns `false` on any error or
    /// when a required getter failed; nothing is left running in that case.
    pub async fn start(&self) -> bool {
        if self.is_running() {
            log::warn!("{} is already running", constants::APP_NAME);
            return true;
        }
        match self.try_start().await {
            Ok(()) => true,
            Err(e) => {
                log::error!("Failed to start {}: {}", constants::APP_NAME, e);
                false
            }
        }
    }

    async fn try_start(&self) -> Result<()> {
        let mut slot = self.manager.lock().await;
        // A concurrent start got here first
        if slot.is_some() {
            log::warn!("{} is already running", constants::APP_NAME);
            return Ok(());
        }

        log::info!("Starting component: {}", constants::GETTER_MANAGER_NAME);
        let manager =
            Arc::new(DataGetterManager::new(&self.settings.getters, &self.catalog, Arc::clone(&self.registry)).await);
        let report = manager.start().await;
        *self.last_report.lock() = Some(report.clone());
        if !report.is_success() {
            manager.stop().await;
            return Err(Error::lifecycle(
                KernelLifecyclePhase::Start,
                manager.name(),
                "required getter failed",
                Some(PluginSystemError::RequiredGettersFailed(report.required_failures()).into()),
            ));
        }

        log::info!("Starting component: {}", self.frontend.name());
        let frontend_started = match self.frontend.initialize().await {
            Ok(()) => self.frontend.start().await,
            Err(e) => Err(e),
        };
        if let Err(e) = frontend_started {
            manager.stop().await;
            return Err(Error::lifecycle(
                KernelLifecyclePhase::Start,
                self.frontend.name(),
                "front-end failed to start",
                Some(e),
            ));
        }

        *slot = Some(manager);
        self.running.store(true, Ordering::Release);
        log::info!("{} started with {} getter(s)", constants::APP_NAME, self.settings.getters.len());
        Ok(())
    }

    /// Stop the front-end, then every getter. Returns `false` if anything
    /// failed to stop cleanly; the server is stopped either way.
    pub async fn stop(&self) -> bool {
        let mut slot = self.manager.lock().await;
        let mut clean = true;

        log::info!("Stopping component: {}", self.frontend.name());
        if let Err(e) = self.frontend.stop().await {
            log::error!("Error stopping component {}: {}", self.frontend.name(), e);
            clean = false;
        }

        if let Some(manager) = slot.take() {
            log::info!("Stopping component: {}", manager.name());
            let report = manager.stop().await;
            for failure in &report.failures {
                log::error!("{}", failure);
            }
            clean &= report.failures.is_empty();
            *self.last_report.lock() = Some(report);
        }

        self.running.store(false, Ordering::Release);
        log::info!("{} stopped", constants::APP_NAME);
        clean
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn settings(&self) -> &ServerSettings {
        &self.settings
    }

    pub fn registry(&self) -> Arc<NodeRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn frontend(&self) -> Arc<QueryService> {
        Arc::clone(&self.frontend)
    }

    /// Manager of the current run, if started
    pub async fn manager(&self) -> Option<Arc<DataGetterManager>> {
        self.manager.lock().await.clone()
    }

    /// Report of the most recent start or stop
    pub fn last_report(&self) -> Option<LifecycleReport> {
        self.last_report.lock().clone()
    }

    /// Reconfigure one running getter from a new config file
    pub async fn update_getter_config(&self, getter_id: &str, path: &Path) -> Result<()> {
        let manager = self.manager().await.ok_or_else(|| {
            Error::lifecycle(
                KernelLifecyclePhase::Reconfigure,
                constants::GETTER_MANAGER_NAME,
                "server is not running",
                None,
            )
        })?;
        manager.update_config(getter_id, path).await?;
        Ok(())
    }

    /// Evict nodes not updated within `stale_after_secs`; no-op when unset
    pub fn sweep_stale(&self) -> Vec<String> {
        let Some(secs) = self.settings.stale_after_secs else {
            return Vec::new();
        };
        let Ok(age) = chrono::Duration::from_std(Duration::from_secs(secs)) else {
            return Vec::new();
        };
        let Some(cutoff) = Local::now().checked_sub_signed(age) else {
            log::warn!("Stale age of {}s is out of range, skipping sweep", secs);
            return Vec::new();
        };
        let evicted = self.registry.evict_stale(cutoff);
        if !evicted.is_empty() {
            log::info!("Evicted {} stale node(s): {}", evicted.len(), evicted.join(", "));
        }
        evicted
    }
}

impl std::fmt::Debug for DataServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataServer")
            .field("settings", &self.settings)
            .field("catalog", &self.catalog)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}
