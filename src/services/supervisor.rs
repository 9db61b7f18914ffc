//! Supervisor
//!
//! Owns the registry and one poller thread per machine. All configuration
//! changes go through here; pollers only ever read the registry.
//!
//! Updates are picked up by the running poller on its next cycle. Pollers are
//! never restarted for a config change.

use super::poller::{MachinePoller, PollerSettings};
use super::registry::Registry;
use super::signal::StopSignal;
use super::snapshot::{MachineSnapshot, MachineState, PlantSnapshot};
use crate::alerts::{AlertDispatcher, AlertPayload, AlertRouter, DispatchReport, Notifier};
use crate::config::{Config, MachineConfig, MachinePatch};
use crate::device::DeviceReader;
use crate::domain::{MachineId, Technician};
use crate::error::{AppError, ConfigError};

use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// How often a bounded join checks whether a poller has exited
const JOIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Supervisor settings
#[derive(Debug, Clone, Copy)]
pub struct SupervisorSettings {
    /// Settings handed to every poller
    pub poller: PollerSettings,
    /// Upper bound on waiting for a stopped poller to exit
    pub shutdown_grace: Duration,
    /// Timeout for `test_connection`
    pub probe_timeout: Duration,
}

impl Default for SupervisorSettings {
    fn default() -> Self {
        Self {
            poller: PollerSettings::default(),
            shutdown_grace: Duration::from_secs(2),
            probe_timeout: Duration::from_secs(3),
        }
    }
}

struct PollerHandle {
    stop: StopSignal,
    state: Arc<RwLock<MachineState>>,
    thread: JoinHandle<()>,
}

/// Runs and reconfigures the machine pollers
pub struct Supervisor<R: DeviceReader + 'static> {
    registry: Arc<RwLock<Registry>>,
    reader: Arc<R>,
    dispatcher: Arc<AlertDispatcher>,
    settings: SupervisorSettings,
    /// Also serializes configuration changes
    pollers: Mutex<HashMap<MachineId, PollerHandle>>,
}

impl<R: DeviceReader + 'static> Supervisor<R> {
    /// Create a supervisor with no machines
    pub fn new(reader: Arc<R>, dispatcher: AlertDispatcher, settings: SupervisorSettings) -> Self {
        Self::with_registry(reader, dispatcher, settings, Registry::new())
    }

    /// Create a supervisor over an existing registry without starting pollers
    pub fn with_registry(
        reader: Arc<R>,
        dispatcher: AlertDispatcher,
        settings: SupervisorSettings,
        registry: Registry,
    ) -> Self {
        Self {
            registry: Arc::new(RwLock::new(registry)),
            reader,
            dispatcher: Arc::new(dispatcher),
            settings,
            pollers: Mutex::new(HashMap::new()),
        }
    }

    /// Create a supervisor from a loaded configuration and start every machine
    pub fn from_config(
        config: &Config,
        reader: Arc<R>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, AppError> {
        config.general.validate()?;
        let registry = config.registry()?;
        let ids: Vec<MachineId> = registry.machines().map(|m| m.id.clone()).collect();

        let dispatcher = AlertDispatcher::new(AlertRouter::new(config.templates.clone()), notifier);
        let supervisor = Self::with_registry(
            reader,
            dispatcher,
            config.general.supervisor_settings(),
            registry,
        );

        let mut pollers = supervisor.lock_pollers();
        for id in ids {
            let handle = supervisor.start_poller(&id)?;
            pollers.insert(id, handle);
        }
        drop(pollers);

        Ok(supervisor)
    }

    /// Replace the technician list
    pub fn set_technicians(&self, technicians: Vec<Technician>) {
        self.write_registry().set_technicians(technicians);
    }

    /// Add a machine, or update the machine already using its endpoint
    ///
    /// Returns the id of the added or updated machine. A new machine gets a
    /// poller; an updated one is picked up by its running poller.
    pub fn add_machine(&self, config: MachineConfig) -> Result<MachineId, AppError> {
        let mut pollers = self.lock_pollers();
        let mut registry = self.write_registry();

        let explicit = config.explicit_id();
        let owner = registry.find_by_endpoint(&config.endpoint).cloned();

        if let Some(owner) = owner {
            if let Some(given) = explicit.filter(|given| *given != owner) {
                log::debug!("Machine {} cannot take endpoint of {}", given, owner);
                return Err(ConfigError::EndpointInUse {
                    endpoint: config.endpoint.trim().to_string(),
                    owner: owner.to_string(),
                }
                .into());
            }

            let spec = config.to_spec(owner.clone())?;
            registry.insert(spec);
            drop(registry);
            log::info!("Updated machine {} in place (same endpoint)", owner);

            if !pollers.contains_key(&owner) {
                let handle = self.start_poller(&owner)?;
                pollers.insert(owner.clone(), handle);
            }
            return Ok(owner);
        }

        let id = match explicit {
            Some(id) if registry.contains(&id) => {
                return Err(ConfigError::DuplicateId(id.to_string()).into());
            }
            Some(id) => id,
            None => registry.next_id(),
        };

        let spec = config.to_spec(id.clone())?;
        registry.insert(spec);
        drop(registry);

        match self.start_poller(&id) {
            Ok(handle) => {
                pollers.insert(id.clone(), handle);
                log::info!("Added machine {}", id);
                Ok(id)
            }
            Err(e) => {
                self.write_registry().remove(&id);
                Err(e)
            }
        }
    }

    /// Remove a machine and stop its poller
    ///
    /// Waits at most the shutdown grace period for the poller to exit. Its
    /// alert state is discarded with it.
    pub fn remove_machine(&self, id: &MachineId) -> Result<(), ConfigError> {
        let handle = {
            let mut pollers = self.lock_pollers();
            if self.write_registry().remove(id).is_none() {
                return Err(ConfigError::UnknownMachine(id.to_string()));
            }
            pollers.remove(id)
        };

        if let Some(handle) = handle {
            handle.stop.stop();
            join_within(id, handle.thread, Instant::now() + self.settings.shutdown_grace);
        }
        log::info!("Removed machine {}", id);
        Ok(())
    }

    /// Merge a partial update into a machine
    pub fn update_machine(&self, id: &MachineId, patch: &MachinePatch) -> Result<(), ConfigError> {
        let _pollers = self.lock_pollers();
        let mut registry = self.write_registry();

        let current = registry
            .machine(id)
            .ok_or_else(|| ConfigError::UnknownMachine(id.to_string()))?;
        let updated = patch.apply(current)?;

        if let Some(owner) = registry.find_by_endpoint(&updated.endpoint) {
            if owner != id {
                return Err(ConfigError::EndpointInUse {
                    endpoint: updated.endpoint.clone(),
                    owner: owner.to_string(),
                });
            }
        }

        registry.insert(updated);
        log::info!("Updated machine {}", id);
        Ok(())
    }

    /// Immutable copy of every machine's current state
    pub fn snapshot(&self) -> PlantSnapshot {
        let pollers = self.lock_pollers();
        let specs: Vec<_> = self.read_registry().machines().cloned().collect();

        let machines = specs
            .iter()
            .map(|spec| {
                let state = pollers
                    .get(&spec.id)
                    .map(|h| h.state.read().unwrap_or_else(PoisonError::into_inner).clone())
                    .unwrap_or_default();
                MachineSnapshot::build(spec, &state)
            })
            .collect();

        PlantSnapshot {
            taken_at: Utc::now(),
            machines,
        }
    }

    /// Copy of the registry
    pub fn registry(&self) -> Registry {
        self.read_registry().clone()
    }

    /// Check whether an endpoint accepts a session, outside the poll cycle
    pub fn test_connection(&self, endpoint: &str) -> bool {
        self.reader.probe(endpoint.trim(), self.settings.probe_timeout)
    }

    /// Route and deliver an alert detected elsewhere
    ///
    /// A payload with a destination goes only to that address. Otherwise it
    /// is routed like a polled alert and its machine must be registered.
    pub fn ingest_alert(&self, payload: &AlertPayload) -> Result<DispatchReport, ConfigError> {
        let registry = self.registry();
        let event = payload.to_event();

        let destination = payload
            .destination
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty());

        let routed = match destination {
            Some(address) => self.dispatcher.router().route_to(&event, &registry, address),
            None => {
                if !registry.contains(&event.machine_id) {
                    return Err(ConfigError::UnknownMachine(event.machine_id.to_string()));
                }
                self.dispatcher.router().route(&event, &registry)
            }
        };

        Ok(self.dispatcher.deliver(&routed))
    }

    /// Number of running pollers
    pub fn poller_count(&self) -> usize {
        self.lock_pollers().len()
    }

    /// Stop every poller, waiting at most the grace period in total
    pub fn shutdown(&self) {
        let handles: Vec<_> = self.lock_pollers().drain().collect();
        if handles.is_empty() {
            return;
        }

        log::info!("Stopping {} poller(s)", handles.len());
        for (_, handle) in &handles {
            handle.stop.stop();
        }

        let deadline = Instant::now() + self.settings.shutdown_grace;
        for (id, handle) in handles {
            join_within(&id, handle.thread, deadline);
        }
    }

    fn start_poller(&self, id: &MachineId) -> Result<PollerHandle, AppError> {
        let stop = StopSignal::new();
        let poller = MachinePoller::new(
            id.clone(),
            Arc::clone(&self.registry),
            Arc::clone(&self.reader),
            Arc::clone(&self.dispatcher),
            stop.clone(),
            self.settings.poller,
        );
        let state = poller.state_handle();
        let thread = poller.spawn()?;

        Ok(PollerHandle {
            stop,
            state,
            thread,
        })
    }

    fn lock_pollers(&self) -> MutexGuard<'_, HashMap<MachineId, PollerHandle>> {
        self.pollers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_registry(&self) -> RwLockReadGuard<'_, Registry> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_registry(&self) -> RwLockWriteGuard<'_, Registry> {
        self.registry.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<R: DeviceReader + 'static> Drop for Supervisor<R> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Join a stopped poller, detaching it if it outlives `deadline`
fn join_within(machine_id: &MachineId, thread: JoinHandle<()>, deadline: Instant) {
    while !thread.is_finished() && Instant::now() < deadline {
        thread::sleep(JOIN_POLL_INTERVAL);
    }

    if !thread.is_finished() {
        log::warn!(
            "Poller for machine {} did not stop in time; detaching it",
            machine_id
        );
        return;
    }
    if thread.join().is_err() {
        log::error!("Poller for machine {} panicked", machine_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::AlertKind;
    use crate::config::VariableConfig;
    use crate::domain::{Direction, MachineStatus, VariableId};
    use crate::mock::{MockReader, RecordingNotifier};

    fn lathe(endpoint: &str) -> MachineConfig {
        MachineConfig::new("CNC Lathe 1", endpoint).with_variable(
            VariableConfig::new("V001", "ns=2;i=1", 20.0, 15.0, Direction::AtMost)
                .described("Oil level", "%"),
        )
    }

    fn fixture(reader: &MockReader) -> (Supervisor<MockReader>, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::new());
        let dispatcher = AlertDispatcher::new(AlertRouter::default(), notifier.clone());
        let settings = SupervisorSettings {
            poller: PollerSettings {
                default_interval: Duration::from_millis(20),
                ..PollerSettings::default()
            },
            shutdown_grace: Duration::from_secs(2),
            probe_timeout: Duration::from_millis(100),
        };
        let supervisor = Supervisor::new(Arc::new(reader.clone()), dispatcher, settings);
        supervisor.set_technicians(vec![
            Technician::new("T001", "Joao", "+5554999123456").responsible_for("M001")
        ]);
        (supervisor, notifier)
    }

    fn wait_for<F: Fn() -> bool>(condition: F) -> bool {
        for _ in 0..200 {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(10));
        }
        false
    }

    #[test]
    fn test_add_assigns_id_and_polls() {
        let reader = MockReader::new().with_value("ns=2;i=1", 50.0);
        let (supervisor, _) = fixture(&reader);

        let id = supervisor.add_machine(lathe("opc.tcp://a:4840")).unwrap();
        assert_eq!(id, MachineId::new("M001"));
        assert!(wait_for(|| {
            supervisor.snapshot().machines[0].status == MachineStatus::Online
        }));
        assert_eq!(
            supervisor.snapshot().machines[0].variables[0].value,
            Some(50.0)
        );
    }

    #[test]
    fn test_add_same_endpoint_updates_in_place() {
        let reader = MockReader::new().with_value("ns=2;i=1", 50.0);
        let (supervisor, _) = fixture(&reader);

        let first = supervisor.add_machine(lathe("opc.tcp://a:4840")).unwrap();
        let mut renamed = lathe("opc.tcp://a:4840");
        renamed.name = "Renamed".to_string();
        let second = supervisor.add_machine(renamed).unwrap();

        assert_eq!(first, second);
        assert_eq!(supervisor.poller_count(), 1);
        let snapshot = supervisor.snapshot();
        assert_eq!(snapshot.machines.len(), 1);
        assert_eq!(snapshot.machines[0].name, "Renamed");
    }

    #[test]
    fn test_add_rejects_invalid_and_duplicate_id() {
        let reader = MockReader::new();
        let (supervisor, _) = fixture(&reader);

        assert!(matches!(
            supervisor.add_machine(MachineConfig::new("", "opc.tcp://a:4840")),
            Err(AppError::Config(ConfigError::InvalidMachine { .. }))
        ));

        supervisor
            .add_machine(lathe("opc.tcp://a:4840").with_id("M001"))
            .unwrap();
        assert!(matches!(
            supervisor.add_machine(lathe("opc.tcp://b:4840").with_id("M001")),
            Err(AppError::Config(ConfigError::DuplicateId(_)))
        ));
        assert_eq!(supervisor.poller_count(), 1);
    }

    #[test]
    fn test_remove_machine() {
        let reader = MockReader::new().with_value("ns=2;i=1", 50.0);
        let (supervisor, _) = fixture(&reader);
        let id = supervisor.add_machine(lathe("opc.tcp://a:4840")).unwrap();

        supervisor.remove_machine(&id).unwrap();
        assert!(!supervisor.snapshot().contains(&id));
        assert_eq!(supervisor.poller_count(), 0);
        assert!(matches!(
            supervisor.remove_machine(&id),
            Err(ConfigError::UnknownMachine(_))
        ));
    }

    #[test]
    fn test_update_endpoint_conflict() {
        let reader = MockReader::new();
        let (supervisor, _) = fixture(&reader);
        supervisor.add_machine(lathe("opc.tcp://a:4840")).unwrap();
        let b = supervisor.add_machine(lathe("opc.tcp://b:4840")).unwrap();

        let patch = MachinePatch::default().endpoint("opc.tcp://a:4840");
        let result = supervisor.update_machine(&b, &patch);
        assert!(matches!(result, Err(ConfigError::EndpointInUse { .. })));

        assert!(matches!(
            supervisor.update_machine(&MachineId::new("M999"), &MachinePatch::default()),
            Err(ConfigError::UnknownMachine(_))
        ));
    }

    #[test]
    fn test_update_thresholds_applies_next_cycle() {
        let reader = MockReader::new().with_value("ns=2;i=1", 22.0);
        let (supervisor, notifier) = fixture(&reader);
        let id = supervisor.add_machine(lathe("opc.tcp://a:4840")).unwrap();
        assert!(wait_for(|| {
            supervisor.snapshot().machines[0].status == MachineStatus::Online
        }));
        assert!(notifier.deliveries().is_empty());

        let raised = vec![VariableConfig::new(
            "V001",
            "ns=2;i=1",
            25.0,
            15.0,
            Direction::AtMost,
        )];
        supervisor
            .update_machine(&id, &MachinePatch::default().variables(raised))
            .unwrap();

        assert!(wait_for(|| notifier.deliveries().len() == 1));
        let snapshot = supervisor.snapshot();
        let variable = &snapshot.machines[0].variables[0];
        assert_eq!(variable.id, VariableId::new("V001"));
        assert_eq!(variable.alert_threshold, 25.0);
    }

    #[test]
    fn test_ingest_with_destination_bypasses_routing() {
        let reader = MockReader::new();
        let (supervisor, notifier) = fixture(&reader);

        let payload = AlertPayload {
            machine_id: MachineId::new("X9"),
            variable_id: VariableId::new("V1"),
            severity: AlertKind::Critical,
            value: 3.0,
            threshold: 5.0,
            timestamp: Utc::now(),
            destination: Some("+5511000000000".to_string()),
        };
        let report = supervisor.ingest_alert(&payload).unwrap();
        assert_eq!(report.delivered, vec!["+5511000000000"]);
        assert_eq!(notifier.deliveries().len(), 1);

        let unrouted = AlertPayload {
            destination: None,
            ..payload
        };
        assert!(matches!(
            supervisor.ingest_alert(&unrouted),
            Err(ConfigError::UnknownMachine(_))
        ));
    }

    #[test]
    fn test_ingest_routes_to_technicians() {
        let reader = MockReader::new();
        let (supervisor, notifier) = fixture(&reader);
        reader.set_unreachable("opc.tcp://a:4840", true);
        supervisor.add_machine(lathe("opc.tcp://a:4840")).unwrap();

        let payload = AlertPayload {
            machine_id: MachineId::new("M001"),
            variable_id: VariableId::new("V001"),
            severity: AlertKind::Warning,
            value: 18.0,
            threshold: 20.0,
            timestamp: Utc::now(),
            destination: None,
        };
        let report = supervisor.ingest_alert(&payload).unwrap();
        assert_eq!(report.delivered, vec!["+5554999123456"]);
        assert!(notifier.deliveries()[0].1.contains("Oil level"));
    }

    #[test]
    fn test_connection_probe() {
        let reader = MockReader::new();
        let (supervisor, _) = fixture(&reader);
        reader.set_unreachable("opc.tcp://down:4840", true);

        assert!(supervisor.test_connection("opc.tcp://up:4840"));
        assert!(!supervisor.test_connection("opc.tcp://down:4840"));
    }

    #[test]
    fn test_shutdown_stops_all() {
        let reader = MockReader::new().with_value("ns=2;i=1", 50.0);
        let (supervisor, _) = fixture(&reader);
        supervisor.add_machine(lathe("opc.tcp://a:4840")).unwrap();
        supervisor.add_machine(lathe("opc.tcp://b:4840")).unwrap();

        let start = Instant::now();
        supervisor.shutdown();
        assert_eq!(supervisor.poller_count(), 0);
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn test_from_config_starts_machines() {
        let config = Config {
            machines: vec![lathe("opc.tcp://a:4840"), lathe("opc.tcp://b:4840")],
            ..Config::default()
        };
        let reader = MockReader::new().with_value("ns=2;i=1", 50.0);
        let supervisor = Supervisor::from_config(
            &config,
            Arc::new(reader),
            Arc::new(RecordingNotifier::new()),
        )
        .unwrap();

        assert_eq!(supervisor.poller_count(), 2);
        assert_eq!(supervisor.snapshot().machines.len(), 2);
    }
}
