use std::collections::{BTreeMap, HashSet};
use std::fmt::{self, Debug};
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, error, info, warn};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::config::GetterSetting;
use crate::kernel::component::KernelComponent;
use crate::kernel::constants;
use crate::kernel::error::Result;
use crate::plugin_system::catalog::GetterCatalog;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::report::{GetterFailure, LifecyclePhase, LifecycleReport};
use crate::plugin_system::traits::{DataGetter, GetterContext, GetterState, ReloadMode};
use crate::registry::{NodeRegistry, NodeWriter};

/// A getter that made it through initialize, with everything bound to it
struct GetterSlot {
    setting: GetterSetting,
    getter: Box<dyn DataGetter>,
    writer: NodeWriter,
    cancel: CancellationToken,
    state: GetterState,
}

impl GetterSlot {
    fn failure(&self, phase: LifecyclePhase, reason: impl Into<String>) -> GetterFailure {
        failure_for(&self.setting, phase, reason)
    }

    /// Cut the getter off from the registry and its background work
    fn release(&self) {
        self.cancel.cancel();
        self.writer.revoke();
    }
}

fn failure_for(setting: &GetterSetting, phase: LifecyclePhase, reason: impl Into<String>) -> GetterFailure {
    GetterFailure {
        getter_id: setting.id.clone(),
        type_name: setting.type_name.clone(),
        phase,
        reason: reason.into(),
        required: setting.required,
    }
}

/// Owns every configured getter and drives their lifecycle as a group.
///
/// One getter failing never stops the others: failures are recorded as
/// [`GetterFailure`]s and surfaced through [`LifecycleReport`]s.
pub struct DataGetterManager {
    name: &'static str,
    registry: Arc<NodeRegistry>,
    // Initialized getters, in configuration order
    slots: Mutex<Vec<GetterSlot>>,
    // Ids that never got a slot (resolve or initialize failed)
    rejected: Vec<String>,
    // Resolve/initialize failures, replayed into every start report
    setup_failures: Vec<GetterFailure>,
    history: parking_lot::Mutex<Vec<GetterFailure>>,
    cancel: CancellationToken,
}

impl DataGetterManager {
    /// Resolve every configured getter against `catalog` and initialize it.
    pub async fn new(configs: &[GetterSetting], catalog: &GetterCatalog, registry: Arc<NodeRegistry>) -> Self {
        let cancel = CancellationToken::new();
        let mut slots = Vec::new();
        let mut rejected = Vec::new();
        let mut setup_failures = Vec::new();
        let mut seen = HashSet::new();

        for setting in configs {
            if !seen.insert(setting.id.clone()) {
                let reason = PluginSystemError::DuplicateGetter(setting.id.clone()).to_string();
                warn!("Skipping getter '{}': {}", setting.id, reason);
                setup_failures.push(failure_for(setting, LifecyclePhase::Initialize, reason));
                continue;
            }

            let Some(mut getter) = catalog.create(&setting.type_name) else {
                let err = PluginSystemError::Resolution {
                    getter_id: setting.id.clone(),
                    type_name: setting.type_name.clone(),
                };
                error!("{}", err);
                setup_failures.push(failure_for(setting, LifecyclePhase::Resolve, err.to_string()));
                rejected.push(setting.id.clone());
                continue;
            };

            let writer = NodeWriter::new(Arc::clone(&registry), setting.id.as_str());
            let child = cancel.child_token();
            let ctx = GetterContext {
                getter_id: setting.id.clone(),
                config_path: setting.config_path.clone(),
                test_mode: setting.test_mode,
                settings: setting.settings.clone(),
                writer: writer.clone(),
                cancel: child.clone(),
            };

            info!("Initializing getter '{}' ({})", setting.id, setting.type_name);
            match getter.initialize(ctx).await {
                Ok(()) => slots.push(GetterSlot {
                    setting: setting.clone(),
                    getter,
                    writer,
                    cancel: child,
                    state: GetterState::Initialized,
                }),
                Err(e) => {
                    error!("Failed to initialize getter '{}': {}", setting.id, e);
                    child.cancel();
                    writer.revoke();
                    setup_failures.push(failure_for(setting, LifecyclePhase::Initialize, e.to_string()));
                    rejected.push(setting.id.clone());
                }
            }
        }

        info!(
            "Getter manager ready: {} initialized, {} failed",
            slots.len(),
            setup_failures.len()
        );

        Self {
            name: constants::GETTER_MANAGER_NAME,
            registry,
            slots: Mutex::new(slots),
            rejected,
            history: parking_lot::Mutex::new(setup_failures.clone()),
            setup_failures,
            cancel,
        }
    }

    /// The registry every getter writes into
    pub fn registry(&self) -> &Arc<NodeRegistry> {
        &self.registry
    }

    /// Start every initialized getter. The report also carries the
    /// resolve/initialize failures from construction.
    pub async fn start(&self) -> LifecycleReport {
        let mut report = LifecycleReport::new(LifecyclePhase::Start);
        report.failures.extend(self.setup_failures.iter().cloned());

        let mut slots = self.slots.lock().await;
        for slot in slots.iter_mut() {
            match slot.state {
                GetterState::Initialized => {}
                GetterState::Running => {
                    report.succeeded.push(slot.setting.id.clone());
                    continue;
                }
                _ => continue,
            }

            info!("Starting getter '{}'", slot.setting.id);
            if slot.getter.start().await {
                slot.state = GetterState::Running;
                report.succeeded.push(slot.setting.id.clone());
            } else {
                error!("Getter '{}' refused to start", slot.setting.id);
                slot.state = GetterState::Failed;
                slot.release();
                let failure = slot.failure(LifecyclePhase::Start, "start returned false");
                self.history.lock().push(failure.clone());
                report.failures.push(failure);
            }
        }

        for failure in &report.failures {
            if failure.required {
                error!("Required {}", failure);
            } else {
                warn!("Optional {}", failure);
            }
        }
        report
    }

    /// Stop every getter, newest first. Errors are collected, never raised;
    /// every writer is revoked before this returns.
    pub async fn stop(&self) -> LifecycleReport {
        let mut report = LifecycleReport::new(LifecyclePhase::Stop);

        let mut slots = self.slots.lock().await;
        for slot in slots.iter_mut().rev() {
            match slot.state {
                GetterState::Running | GetterState::Reconfiguring => {
                    info!("Stopping getter '{}'", slot.setting.id);
                    let result = slot.getter.stop().await;
                    slot.release();
                    match result {
                        Ok(()) => {
                            slot.state = GetterState::Stopped;
                            report.succeeded.push(slot.setting.id.clone());
                        }
                        Err(e) => {
                            error!("Error stopping getter '{}': {}", slot.setting.id, e);
                            slot.state = GetterState::Failed;
                            let failure = slot.failure(LifecyclePhase::Stop, e.to_string());
                            self.history.lock().push(failure.clone());
                            report.failures.push(failure);
                        }
                    }
                }
                GetterState::Initialized => {
                    slot.release();
                    slot.state = GetterState::Stopped;
                    report.succeeded.push(slot.setting.id.clone());
                }
                GetterState::Uninitialized | GetterState::Stopped | GetterState::Failed => slot.release(),
            }
        }
        self.cancel.cancel();
        report.succeeded.reverse();
        report
    }

    /// Hand a new configuration file to one getter, following its reload mode
    pub async fn update_config(&self, getter_id: &str, path: &Path) -> std::result::Result<(), PluginSystemError> {
        let mut slots = self.slots.lock().await;
        let Some(slot) = slots.iter_mut().find(|slot| slot.setting.id == getter_id) else {
            return Err(PluginSystemError::UnknownGetter(getter_id.to_string()));
        };

        let result = match (slot.state, slot.getter.reload_mode()) {
            (GetterState::Initialized, _) => slot.getter.update_config(path).await,
            (GetterState::Running, ReloadMode::HotReload) => {
                slot.state = GetterState::Reconfiguring;
                let result = slot.getter.update_config(path).await;
                slot.state = GetterState::Running;
                result
            }
            (GetterState::Running, ReloadMode::Restart) => Self::restart_with(slot, path).await,
            (state, _) => return Err(PluginSystemError::invalid_state(getter_id, state, "reconfigure")),
        };

        match result {
            Ok(()) => {
                info!("Getter '{}' reconfigured from {}", getter_id, path.display());
                slot.setting.config_path = Some(path.to_path_buf());
                Ok(())
            }
            Err(e) => {
                error!("Failed to reconfigure getter '{}': {}", getter_id, e);
                self.history
                    .lock()
                    .push(slot.failure(LifecyclePhase::Reconfigure, e.to_string()));
                Err(e)
            }
        }
    }

    async fn restart_with(slot: &mut GetterSlot, path: &Path) -> std::result::Result<(), PluginSystemError> {
        debug!("Restarting getter '{}' to apply new configuration", slot.setting.id);
        if let Err(e) = slot.getter.stop().await {
            slot.state = GetterState::Failed;
            slot.release();
            return Err(e);
        }
        slot.state = GetterState::Reconfiguring;
        let reconfigured = slot.getter.update_config(path).await;

        // The old configuration is still valid on error, so restart either way
        if slot.getter.start().await {
            slot.state = GetterState::Running;
            reconfigured
        } else {
            slot.state = GetterState::Failed;
            slot.release();
            Err(PluginSystemError::Start {
                getter_id: slot.setting.id.clone(),
                message: "restart after reconfiguration returned false".to_string(),
            })
        }
    }

    /// State of every configured getter, by id
    pub async fn states(&self) -> BTreeMap<String, GetterState> {
        let slots = self.slots.lock().await;
        let mut states: BTreeMap<String, GetterState> = slots
            .iter()
            .map(|slot| (slot.setting.id.clone(), slot.state))
            .collect();
        for id in &self.rejected {
            states.entry(id.clone()).or_insert(GetterState::Failed);
        }
        states
    }

    pub async fn state(&self, getter_id: &str) -> Option<GetterState> {
        self.states().await.remove(getter_id)
    }

    /// Every failure recorded so far, oldest first
    pub fn failures(&self) -> Vec<GetterFailure> {
        self.history.lock().clone()
    }
}

impl Debug for DataGetterManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataGetterManager")
            .field("name", &self.name)
            .field("rejected", &self.rejected)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl KernelComponent for DataGetterManager {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn initialize(&self) -> Result<()> {
        // Getters are initialized during construction
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        let report = DataGetterManager::start(self).await;
        if report.is_success() {
            Ok(())
        } else {
            Err(PluginSystemError::RequiredGettersFailed(report.required_failures()).into())
        }
    }

    async fn stop(&self) -> Result<()> {
        let report = DataGetterManager::stop(self).await;
        if !report.failures.is_empty() {
            warn!("{} getter(s) failed to stop cleanly", report.failures.len());
        }
        Ok(())
    }
}
