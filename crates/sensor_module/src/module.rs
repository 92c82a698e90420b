//! SensorMasterModule

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use contracts::{MessageDescriptor, RegistryConfig, SensorClass, SensorType, WorldView};
use ingestion::{IngestionMetrics, MetricsSnapshot, SensorMessageListener};
use registry::{FilingStatsSnapshot, Sensor, SensorRegistry};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::error::{ModuleError, Result};

/// Lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleState {
    Uninitialized,
    Active,
    /// Terminal
    ShutDown,
}

impl fmt::Display for ModuleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Uninitialized => "uninitialized",
            Self::Active => "active",
            Self::ShutDown => "shut_down",
        };
        f.write_str(s)
    }
}

enum Lifecycle {
    Uninitialized,
    Active {
        registry: Arc<SensorRegistry>,
        listener: SensorMessageListener,
    },
    ShutDown,
}

/// Point-in-time summary of a module
#[derive(Debug, Clone, Serialize)]
pub struct ModuleStatus {
    pub state: ModuleState,
    pub ready: bool,
    pub type_count: usize,
    pub sensor_count: usize,
    pub filing: FilingStatsSnapshot,
    pub ingestion: MetricsSnapshot,
}

/// Sensor master module
///
/// `Uninitialized -> Active -> ShutDown`. While not active every query
/// answers "not ready": `false`, `None` or an empty list.
pub struct SensorMasterModule {
    lifecycle: RwLock<Lifecycle>,
    metrics: Arc<IngestionMetrics>,
}

impl Default for SensorMasterModule {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorMasterModule {
    pub fn new() -> Self {
        Self {
            lifecycle: RwLock::new(Lifecycle::Uninitialized),
            metrics: Arc::new(IngestionMetrics::new()),
        }
    }

    /// Construct and start in one call.
    pub fn start_new(world_view: Arc<dyn WorldView>, config: &RegistryConfig) -> Result<Self> {
        let module = Self::new();
        module.start(world_view, config)?;
        Ok(module)
    }

    /// Create the registry, then subscribe the listener that feeds it.
    ///
    /// On a subscription failure the module stays uninitialized.
    #[instrument(name = "module_start", skip_all, fields(unknown_sensors = ?config.unknown_sensors))]
    pub fn start(&self, world_view: Arc<dyn WorldView>, config: &RegistryConfig) -> Result<()> {
        let mut lifecycle = self.lifecycle.write().unwrap_or_else(PoisonError::into_inner);
        match *lifecycle {
            Lifecycle::Uninitialized => {}
            Lifecycle::Active { .. } => return Err(ModuleError::AlreadyStarted),
            Lifecycle::ShutDown => return Err(ModuleError::ShutDown),
        }

        let registry = Arc::new(SensorRegistry::from_config(config));
        let listener =
            SensorMessageListener::subscribe(world_view, registry.clone(), self.metrics.clone())?;

        *lifecycle = Lifecycle::Active { registry, listener };
        info!("sensor module started");
        Ok(())
    }

    /// Unsubscribe, then discard the registry.
    ///
    /// Returns `true` on the call that moved the module to `ShutDown`; every
    /// later call is a no-op returning `false`.
    #[instrument(name = "module_shutdown", skip(self))]
    pub fn shutdown(&self) -> bool {
        let previous = {
            let mut lifecycle = self.lifecycle.write().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *lifecycle, Lifecycle::ShutDown)
        };

        match previous {
            Lifecycle::Active { registry, listener } => {
                listener.unsubscribe();
                let filing = registry.stats();
                drop(registry);
                info!(
                    created = filing.created,
                    updated = filing.updated,
                    dropped = filing.dropped(),
                    "sensor module shut down"
                );
                true
            }
            Lifecycle::Uninitialized => {
                debug!("shutting down a module that never started");
                true
            }
            Lifecycle::ShutDown => false,
        }
    }

    pub fn state(&self) -> ModuleState {
        match *self.lifecycle.read().unwrap_or_else(PoisonError::into_inner) {
            Lifecycle::Uninitialized => ModuleState::Uninitialized,
            Lifecycle::Active { .. } => ModuleState::Active,
            Lifecycle::ShutDown => ModuleState::ShutDown,
        }
    }

    /// The live registry, while active
    pub fn registry(&self) -> Option<Arc<SensorRegistry>> {
        match &*self.lifecycle.read().unwrap_or_else(PoisonError::into_inner) {
            Lifecycle::Active { registry, .. } => Some(registry.clone()),
            _ => None,
        }
    }

    pub fn ingestion_metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn status(&self) -> ModuleStatus {
        let state = self.state();
        let registry = self.registry();
        ModuleStatus {
            state,
            ready: registry.as_ref().is_some_and(|r| r.is_ready()),
            type_count: registry.as_ref().map_or(0, |r| r.type_count()),
            sensor_count: registry.as_ref().map_or(0, |r| r.len()),
            filing: registry.as_ref().map(|r| r.stats()).unwrap_or_default(),
            ingestion: self.metrics.snapshot(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.with_registry(false, |r| r.is_ready())
    }

    pub fn is_sensor_ready(&self, sensor_type: SensorType) -> bool {
        self.with_registry(false, |r| r.is_sensor_ready(sensor_type))
    }

    pub fn sensors_by_type(&self, type_tag: &str) -> Option<Vec<Sensor>> {
        self.with_registry(None, |r| r.sensors_by_type(type_tag))
    }

    pub fn sensors_by_sensor_type(&self, sensor_type: SensorType) -> Vec<Sensor> {
        self.with_registry(Vec::new(), |r| r.sensors_by_sensor_type(sensor_type))
    }

    pub fn sensors_by_class(&self, class: impl Into<SensorClass>) -> Vec<Sensor> {
        let class = class.into();
        self.with_registry(Vec::new(), |r| r.sensors_by_class(class))
    }

    pub fn sensor_by_type_name(&self, type_tag: &str, name: &str) -> Option<Sensor> {
        self.with_registry(None, |r| r.sensor_by_type_name(type_tag, name))
    }

    pub fn non_empty_descriptions(&self) -> Vec<MessageDescriptor> {
        self.with_registry(Vec::new(), |r| r.non_empty_descriptions())
    }

    fn with_registry<T>(&self, inactive: T, query: impl FnOnce(&SensorRegistry) -> T) -> T {
        match self.registry() {
            Some(registry) => query(&registry),
            None => inactive,
        }
    }
}

impl fmt::Debug for SensorMasterModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SensorMasterModule")
            .field("state", &self.state())
            .finish()
    }
}
