//! Machine poller
//!
//! One poller owns one machine: its device session, its alert state and the
//! only writer of its observable state. It re-reads the machine's spec from
//! the registry every cycle, so configuration changes apply on the next poll.

use super::registry::Registry;
use super::signal::StopSignal;
use super::snapshot::{MachineState, VariableState};
use crate::alerts::{AlertDispatcher, AlertEvent, AlertTracker, AlertTrackerConfig, Severity};
use crate::device::{ConnectOptions, DeviceReader, DeviceSession};
use crate::domain::{MachineId, MachineSpec, MachineStatus, VariableId};
use crate::error::DeviceError;

use chrono::Utc;
use std::io;
use std::sync::{Arc, PoisonError, RwLock};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Largest backoff exponent; keeps the multiplier well inside `u32`
const MAX_BACKOFF_EXPONENT: u32 = 16;

/// Settings shared by every poller
#[derive(Debug, Clone, Copy)]
pub struct PollerSettings {
    /// Interval used when a machine does not set its own
    pub default_interval: Duration,
    /// Ceiling for the reconnect backoff
    pub max_backoff: Duration,
    /// Session timeouts
    pub connect: ConnectOptions,
    /// Alert tracker behavior
    pub tracker: AlertTrackerConfig,
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            default_interval: Duration::from_secs(30),
            max_backoff: Duration::from_secs(300),
            connect: ConnectOptions::default(),
            tracker: AlertTrackerConfig::default(),
        }
    }
}

/// Outcome of reading one variable
#[derive(Debug, Clone, PartialEq)]
pub struct VariableReading {
    pub variable_id: VariableId,
    pub outcome: Result<(f64, Severity), DeviceError>,
}

/// Outcome of one poll cycle
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// Machine status after the cycle
    pub status: MachineStatus,
    /// Per-variable results in spec order
    pub readings: Vec<VariableReading>,
    /// Alert events emitted by the cycle
    pub events: Vec<AlertEvent>,
    /// Delay before the next cycle
    pub next_delay: Duration,
}

/// Delay before the next attempt after `failures` consecutive failures
pub fn backoff_delay(interval: Duration, max_backoff: Duration, failures: u32) -> Duration {
    if failures == 0 {
        return interval;
    }
    let exponent = (failures - 1).min(MAX_BACKOFF_EXPONENT);
    let ceiling = max_backoff.max(interval);
    interval.saturating_mul(1 << exponent).min(ceiling)
}

/// Polls one machine until stopped or removed from the registry
pub struct MachinePoller<R: DeviceReader> {
    machine_id: MachineId,
    registry: Arc<RwLock<Registry>>,
    reader: Arc<R>,
    dispatcher: Arc<AlertDispatcher>,
    state: Arc<RwLock<MachineState>>,
    stop: StopSignal,
    settings: PollerSettings,
    tracker: AlertTracker,
    session: Option<(String, R::Session)>,
    applied: Option<Arc<MachineSpec>>,
    failures: u32,
}

impl<R: DeviceReader> MachinePoller<R> {
    /// Create a poller for a registered machine
    pub fn new(
        machine_id: MachineId,
        registry: Arc<RwLock<Registry>>,
        reader: Arc<R>,
        dispatcher: Arc<AlertDispatcher>,
        stop: StopSignal,
        settings: PollerSettings,
    ) -> Self {
        Self {
            machine_id,
            registry,
            reader,
            dispatcher,
            state: Arc::new(RwLock::new(MachineState::default())),
            stop,
            tracker: AlertTracker::new(settings.tracker),
            settings,
            session: None,
            applied: None,
            failures: 0,
        }
    }

    /// Machine this poller owns
    pub fn machine_id(&self) -> &MachineId {
        &self.machine_id
    }

    /// Shared handle to the observable state
    pub fn state_handle(&self) -> Arc<RwLock<MachineState>> {
        Arc::clone(&self.state)
    }

    /// Run one poll cycle
    ///
    /// Returns `None` when the poller should exit: stop was requested or the
    /// machine is no longer registered. A stopped cycle leaves state untouched.
    pub fn poll_once(&mut self) -> Option<CycleReport> {
        if self.stop.is_stopped() {
            return None;
        }

        let spec = self
            .registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .machine_arc(&self.machine_id);
        let Some(spec) = spec else {
            let dropped = self.tracker.reset_machine(&self.machine_id);
            self.applied = None;
            log::info!(
                "Machine {} no longer registered, dropped {} alert state(s)",
                self.machine_id,
                dropped
            );
            return None;
        };

        self.apply_spec(&spec);
        let interval = spec.poll_interval.unwrap_or(self.settings.default_interval);

        if !self.ensure_session(&spec)? {
            return Some(self.offline_report(interval, Vec::new(), Vec::new()));
        }

        let timestamp = Utc::now();
        let read_timeout = self.settings.connect.read_timeout;
        let mut readings = Vec::with_capacity(spec.variables.len());
        let mut events = Vec::new();
        let mut lost = None;

        for variable in &spec.variables {
            if self.stop.is_stopped() {
                return None;
            }
            let Some((_, session)) = self.session.as_mut() else {
                break;
            };

            let started = Instant::now();
            let outcome = match session.read(&variable.node) {
                // Late values are stale
                Ok(_) if started.elapsed() > read_timeout => Err(DeviceError::Timeout {
                    node: variable.node.clone(),
                    timeout: read_timeout,
                }),
                Ok(value) if !value.is_finite() => Err(DeviceError::InvalidValue {
                    node: variable.node.clone(),
                    value: value.to_string(),
                }),
                other => other,
            };

            match outcome {
                Ok(value) => {
                    let (severity, event) =
                        self.tracker
                            .observe(&self.machine_id, variable, value, timestamp);
                    events.extend(event);
                    readings.push(VariableReading {
                        variable_id: variable.id.clone(),
                        outcome: Ok((value, severity)),
                    });
                }
                Err(e) if e.is_connectivity() => {
                    log::warn!("Lost session to machine {}: {}", self.machine_id, e);
                    readings.push(VariableReading {
                        variable_id: variable.id.clone(),
                        outcome: Err(e.clone()),
                    });
                    lost = Some(e);
                    break;
                }
                Err(e) => {
                    log::warn!(
                        "Failed to read {}/{} ({}): {}",
                        self.machine_id,
                        variable.id,
                        variable.node,
                        e
                    );
                    readings.push(VariableReading {
                        variable_id: variable.id.clone(),
                        outcome: Err(e),
                    });
                }
            }
        }

        if self.stop.is_stopped() {
            return None;
        }

        let report = match lost {
            Some(e) => {
                self.close_session();
                self.failures = self.failures.saturating_add(1);
                self.mark_offline(&e);
                self.offline_report(interval, readings, events)
            }
            None => {
                self.failures = 0;
                self.store_readings(&readings);
                CycleReport {
                    status: MachineStatus::Online,
                    readings,
                    events,
                    next_delay: interval,
                }
            }
        };

        self.dispatch(&report.events);
        Some(report)
    }

    /// Poll until stopped or removed, then close the session
    pub fn run(mut self) {
        log::info!("Poller for machine {} started", self.machine_id);
        while let Some(report) = self.poll_once() {
            log::debug!(
                "Machine {} cycle: {} ({} readings, {} events), next in {:?}",
                self.machine_id,
                report.status,
                report.readings.len(),
                report.events.len(),
                report.next_delay
            );
            if self.stop.wait_timeout(report.next_delay) {
                break;
            }
        }
        self.close_session();
        log::info!(
            "Poller for machine {} stopped ({} variable(s) tracked)",
            self.machine_id,
            self.tracker.tracked_count()
        );
    }

    /// Run the poller on its own named thread
    pub fn spawn(self) -> io::Result<JoinHandle<()>>
    where
        R: 'static,
    {
        thread::Builder::new()
            .name(format!("poller-{}", self.machine_id))
            .spawn(move || self.run())
    }

    /// Reconcile alert and observable state with a changed spec
    fn apply_spec(&mut self, spec: &Arc<MachineSpec>) {
        let previous = match self.applied.clone() {
            Some(previous) if Arc::ptr_eq(&previous, spec) => return,
            previous => previous,
        };

        if let Some(previous) = previous {
            if previous.endpoint != spec.endpoint {
                log::info!(
                    "Machine {} endpoint changed to {}",
                    self.machine_id,
                    spec.endpoint
                );
                self.close_session();
                self.failures = 0;
            }

            // Alert state only carries over for variables read and judged the same way
            self.tracker.retain_variables(&self.machine_id, |id| {
                match (previous.variable(id), spec.variable(id)) {
                    (Some(old), Some(new)) => {
                        old.node == new.node && old.thresholds == new.thresholds
                    }
                    _ => false,
                }
            });
        }

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.variables.retain(|id, _| spec.variable(id).is_some());
        for (id, variable) in state.variables.iter_mut() {
            variable.severity = self.tracker.state(&self.machine_id, id);
        }
        drop(state);

        self.applied = Some(Arc::clone(spec));
    }

    /// Make sure a session to the machine's endpoint is open
    ///
    /// Returns `None` if stopped while connecting, `Some(false)` on failure.
    fn ensure_session(&mut self, spec: &MachineSpec) -> Option<bool> {
        if matches!(&self.session, Some((endpoint, _)) if *endpoint == spec.endpoint) {
            return Some(true);
        }
        self.close_session();

        self.write_state(|state| state.status = MachineStatus::Connecting);
        let result = self.reader.connect(&spec.endpoint, &self.settings.connect);

        if self.stop.is_stopped() {
            if let Ok(session) = result {
                session.disconnect();
            }
            return None;
        }

        match result {
            Ok(session) => {
                log::info!("Connected to machine {} at {}", self.machine_id, spec.endpoint);
                self.session = Some((spec.endpoint.clone(), session));
                Some(true)
            }
            Err(e) => {
                self.failures = self.failures.saturating_add(1);
                if self.failures == 1 {
                    log::warn!("Cannot connect to machine {}: {}", self.machine_id, e);
                } else {
                    log::debug!(
                        "Machine {} still unreachable ({} attempts): {}",
                        self.machine_id,
                        self.failures,
                        e
                    );
                }
                self.mark_offline(&e);
                Some(false)
            }
        }
    }

    fn close_session(&mut self) {
        if let Some((endpoint, session)) = self.session.take() {
            log::debug!("Closing session to {}", endpoint);
            session.disconnect();
        }
    }

    fn mark_offline(&self, error: &DeviceError) {
        let message = error.to_string();
        self.write_state(|state| {
            state.status = MachineStatus::Offline;
            state.last_poll = Some(Utc::now());
            state.last_error = Some(message);
            state.clear_values();
        });
    }

    fn store_readings(&self, readings: &[VariableReading]) {
        let now = Utc::now();
        self.write_state(|state| {
            state.status = MachineStatus::Online;
            state.last_poll = Some(now);
            state.last_error = None;

            for reading in readings {
                let entry = state
                    .variables
                    .entry(reading.variable_id.clone())
                    .or_insert_with(VariableState::default);
                match &reading.outcome {
                    Ok((value, severity)) => {
                        entry.value = Some(*value);
                        entry.severity = *severity;
                        entry.last_error = None;
                    }
                    Err(e) => {
                        entry.value = None;
                        entry.last_error = Some(e.to_string());
                    }
                }
            }
        });
    }

    fn offline_report(
        &self,
        interval: Duration,
        readings: Vec<VariableReading>,
        events: Vec<AlertEvent>,
    ) -> CycleReport {
        CycleReport {
            status: MachineStatus::Offline,
            readings,
            events,
            next_delay: backoff_delay(interval, self.settings.max_backoff, self.failures),
        }
    }

    fn write_state<F>(&self, update: F)
    where
        F: FnOnce(&mut MachineState),
    {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        update(&mut state);
    }

    fn dispatch(&self, events: &[AlertEvent]) {
        if events.is_empty() {
            return;
        }
        // Route against a copy so delivery never holds the registry lock
        let registry = self
            .registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for event in events {
            self.dispatcher.dispatch(event, &registry);
        }
    }
}

impl<R: DeviceReader> Drop for MachinePoller<R> {
    fn drop(&mut self) {
        self.close_session();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::{AlertKind, AlertRouter};
    use crate::domain::{Direction, Technician, Thresholds, VariableSpec};
    use crate::mock::{MockReader, RecordingNotifier};

    const ENDPOINT: &str = "opc.tcp://10.0.0.1:4840";

    fn machine() -> MachineSpec {
        let level = Thresholds::new(20.0, 15.0, Direction::AtMost).unwrap();
        let temp = Thresholds::new(80.0, 95.0, Direction::AtLeast).unwrap();
        MachineSpec::new("M001", "CNC Lathe 1", ENDPOINT)
            .with_variable(VariableSpec::new("V001", "Oil level", "%", "ns=2;i=1", level))
            .with_variable(VariableSpec::new("V002", "Spindle temp", "C", "ns=2;i=2", temp))
            .with_variable(VariableSpec::new("V003", "Coolant level", "%", "ns=2;i=3", level))
    }

    struct Fixture {
        registry: Arc<RwLock<Registry>>,
        reader: MockReader,
        notifier: Arc<RecordingNotifier>,
        stop: StopSignal,
        poller: MachinePoller<MockReader>,
    }

    fn fixture(settings: PollerSettings) -> Fixture {
        fixture_with(settings, RecordingNotifier::new())
    }

    fn fixture_with(settings: PollerSettings, notifier: RecordingNotifier) -> Fixture {
        let mut registry = Registry::new();
        registry.insert(machine());
        registry.set_technicians(vec![
            Technician::new("T001", "Joao", "+5554999123456").responsible_for("M001")
        ]);
        let registry = Arc::new(RwLock::new(registry));

        let reader = MockReader::new()
            .with_value("ns=2;i=1", 50.0)
            .with_value("ns=2;i=2", 60.0)
            .with_value("ns=2;i=3", 50.0);
        let notifier = Arc::new(notifier);
        let dispatcher = Arc::new(AlertDispatcher::new(
            AlertRouter::default(),
            notifier.clone(),
        ));
        let stop = StopSignal::new();

        let poller = MachinePoller::new(
            MachineId::new("M001"),
            Arc::clone(&registry),
            Arc::new(reader.clone()),
            dispatcher,
            stop.clone(),
            settings,
        );

        Fixture {
            registry,
            reader,
            notifier,
            stop,
            poller,
        }
    }

    #[test]
    fn test_backoff_delay() {
        let interval = Duration::from_secs(30);
        let max = Duration::from_secs(300);
        assert_eq!(backoff_delay(interval, max, 0), interval);
        assert_eq!(backoff_delay(interval, max, 1), interval);
        assert_eq!(backoff_delay(interval, max, 2), Duration::from_secs(60));
        assert_eq!(backoff_delay(interval, max, 4), Duration::from_secs(240));
        assert_eq!(backoff_delay(interval, max, 5), max);
        assert_eq!(backoff_delay(interval, max, u32::MAX), max);
    }

    #[test]
    fn test_backoff_never_below_interval() {
        let interval = Duration::from_secs(600);
        assert_eq!(
            backoff_delay(interval, Duration::from_secs(300), 3),
            interval
        );
    }

    #[test]
    fn test_healthy_cycle() {
        let mut f = fixture(PollerSettings::default());
        let report = f.poller.poll_once().unwrap();

        assert_eq!(report.status, MachineStatus::Online);
        assert_eq!(report.readings.len(), 3);
        assert!(report.events.is_empty());
        assert_eq!(report.next_delay, Duration::from_secs(30));

        let state = f.poller.state_handle();
        let state = state.read().unwrap();
        assert_eq!(state.status, MachineStatus::Online);
        assert_eq!(state.variables[&VariableId::new("V001")].value, Some(50.0));
        assert!(f.notifier.deliveries().is_empty());
    }

    #[test]
    fn test_alert_dispatched_once() {
        let mut f = fixture(PollerSettings::default());
        f.reader.set_value("ns=2;i=1", 10.0);

        let first = f.poller.poll_once().unwrap();
        assert_eq!(first.events.len(), 1);
        assert_eq!(first.events[0].kind, AlertKind::Critical);
        assert_eq!(first.events[0].threshold, 15.0);

        let second = f.poller.poll_once().unwrap();
        assert!(second.events.is_empty());

        let deliveries = f.notifier.deliveries();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].0, "+5554999123456");
        assert!(deliveries[0].1.contains("CNC Lathe 1"));
    }

    #[test]
    fn test_read_error_isolated_to_variable() {
        let mut f = fixture(PollerSettings::default());
        f.reader.fail_node(
            "ns=2;i=2",
            DeviceError::Read {
                node: "ns=2;i=2".into(),
                reason: "bad node".into(),
            },
        );
        f.reader.set_value("ns=2;i=3", 18.0);

        let report = f.poller.poll_once().unwrap();
        assert_eq!(report.status, MachineStatus::Online);
        assert!(report.readings[0].outcome.is_ok());
        assert!(report.readings[1].outcome.is_err());
        assert_eq!(report.readings[2].outcome, Ok((18.0, Severity::Warning)));

        let state = f.poller.state_handle();
        let state = state.read().unwrap();
        let failed = &state.variables[&VariableId::new("V002")];
        assert_eq!(failed.value, None);
        assert!(failed.last_error.is_some());
        assert_eq!(
            state.variables[&VariableId::new("V003")].severity,
            Severity::Warning
        );
    }

    #[test]
    fn test_non_finite_value_rejected() {
        let mut f = fixture(PollerSettings::default());
        f.reader.set_value("ns=2;i=1", f64::NAN);

        let report = f.poller.poll_once().unwrap();
        assert!(matches!(
            report.readings[0].outcome,
            Err(DeviceError::InvalidValue { .. })
        ));
        assert!(report.events.is_empty());
    }

    #[test]
    fn test_unreachable_goes_offline_with_backoff() {
        let mut f = fixture(PollerSettings::default());
        f.reader.set_unreachable(ENDPOINT, true);

        let first = f.poller.poll_once().unwrap();
        assert_eq!(first.status, MachineStatus::Offline);
        assert_eq!(first.next_delay, Duration::from_secs(30));

        let second = f.poller.poll_once().unwrap();
        assert_eq!(second.next_delay, Duration::from_secs(60));

        let state = f.poller.state_handle();
        assert_eq!(state.read().unwrap().status, MachineStatus::Offline);
        assert!(state.read().unwrap().last_error.is_some());

        f.reader.set_unreachable(ENDPOINT, false);
        let third = f.poller.poll_once().unwrap();
        assert_eq!(third.status, MachineStatus::Online);
        assert_eq!(third.next_delay, Duration::from_secs(30));
    }

    #[test]
    fn test_session_loss_clears_values() {
        let mut f = fixture(PollerSettings::default());
        f.poller.poll_once().unwrap();

        f.reader.set_unreachable(ENDPOINT, true);
        let report = f.poller.poll_once().unwrap();
        assert_eq!(report.status, MachineStatus::Offline);

        let state = f.poller.state_handle();
        let state = state.read().unwrap();
        assert!(state.variables.values().all(|v| v.value.is_none()));
    }

    #[test]
    fn test_reuses_session() {
        let mut f = fixture(PollerSettings::default());
        f.poller.poll_once().unwrap();
        f.poller.poll_once().unwrap();
        assert_eq!(f.reader.connect_count(), 1);
    }

    #[test]
    fn test_stopped_poller_exits() {
        let mut f = fixture(PollerSettings::default());
        f.stop.stop();
        assert!(f.poller.poll_once().is_none());
        assert_eq!(
            f.poller.state_handle().read().unwrap().status,
            MachineStatus::Configured
        );
    }

    #[test]
    fn test_removed_machine_exits() {
        let mut f = fixture(PollerSettings::default());
        f.registry
            .write()
            .unwrap()
            .remove(&MachineId::new("M001"));
        assert!(f.poller.poll_once().is_none());
    }

    #[test]
    fn test_removal_discards_alert_state() {
        let mut f = fixture(PollerSettings::default());
        f.reader.set_value("ns=2;i=1", 10.0);
        assert_eq!(f.poller.poll_once().unwrap().events.len(), 1);

        f.registry
            .write()
            .unwrap()
            .remove(&MachineId::new("M001"));
        assert!(f.poller.poll_once().is_none());

        // Re-registered machine starts from ok and alerts again
        f.registry.write().unwrap().insert(machine());
        let report = f.poller.poll_once().unwrap();
        assert_eq!(report.events.len(), 1);
        assert_eq!(report.events[0].kind, AlertKind::Critical);
    }

    #[test]
    fn test_delivery_failure_keeps_alert_state() {
        let mut f = fixture_with(
            PollerSettings::default(),
            RecordingNotifier::new().failing_for("+5554999123456"),
        );
        f.reader.set_value("ns=2;i=1", 10.0);

        let first = f.poller.poll_once().unwrap();
        assert_eq!(first.status, MachineStatus::Online);
        assert_eq!(first.readings.len(), 3);
        assert_eq!(first.events.len(), 1);
        assert!(f.notifier.deliveries().is_empty());
        assert_eq!(
            f.poller.state_handle().read().unwrap().variables[&VariableId::new("V001")].severity,
            Severity::Critical
        );

        // Detection stands; the failed alert is not re-emitted
        let second = f.poller.poll_once().unwrap();
        assert_eq!(second.status, MachineStatus::Online);
        assert!(second.events.is_empty());
    }

    #[test]
    fn test_late_read_is_timeout() {
        let mut settings = PollerSettings::default();
        settings.connect.read_timeout = Duration::from_millis(10);
        let mut f = fixture(settings);
        f.reader.set_value("ns=2;i=1", 10.0);
        f.reader.set_read_delay(Duration::from_millis(30));

        let report = f.poller.poll_once().unwrap();
        assert_eq!(report.status, MachineStatus::Online);
        assert!(report.readings.iter().all(|r| matches!(
            r.outcome,
            Err(DeviceError::Timeout { .. })
        )));
        assert!(report.events.is_empty());
        assert_eq!(f.reader.connect_count(), 1);
    }

    #[test]
    fn test_drop_disconnects_session() {
        let mut f = fixture(PollerSettings::default());
        f.poller.poll_once().unwrap();
        assert_eq!(f.reader.disconnect_count(), 0);

        drop(f.poller);
        assert_eq!(f.reader.disconnect_count(), 1);
    }

    #[test]
    fn test_threshold_change_resets_alert_state() {
        let mut f = fixture(PollerSettings::default());
        f.reader.set_value("ns=2;i=1", 18.0);
        assert_eq!(f.poller.poll_once().unwrap().events.len(), 1);

        // Same thresholds, new spec instance: state carries over
        f.registry.write().unwrap().insert(machine());
        assert!(f.poller.poll_once().unwrap().events.is_empty());

        let mut changed = machine();
        changed.variables[0].thresholds = Thresholds::new(25.0, 15.0, Direction::AtMost).unwrap();
        f.registry.write().unwrap().insert(changed);
        let report = f.poller.poll_once().unwrap();
        assert_eq!(report.events.len(), 1);
        assert_eq!(report.events[0].threshold, 25.0);
    }

    #[test]
    fn test_endpoint_change_reconnects() {
        let mut f = fixture(PollerSettings::default());
        f.poller.poll_once().unwrap();

        let mut moved = machine();
        moved.endpoint = "opc.tcp://10.0.0.9:4840".to_string();
        f.registry.write().unwrap().insert(moved);
        f.poller.poll_once().unwrap();

        assert_eq!(f.reader.connect_count(), 2);
    }

    #[test]
    fn test_machine_interval_overrides_default() {
        let mut f = fixture(PollerSettings::default());
        f.registry
            .write()
            .unwrap()
            .insert(machine().with_poll_interval(Duration::from_secs(5)));
        assert_eq!(
            f.poller.poll_once().unwrap().next_delay,
            Duration::from_secs(5)
        );
    }

    #[test]
    fn test_spawned_poller_stops_promptly() {
        let f = fixture(PollerSettings::default());
        let state = f.poller.state_handle();
        let handle = f.poller.spawn().unwrap();

        for _ in 0..100 {
            if state.read().unwrap().status == MachineStatus::Online {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }
        f.stop.stop();
        handle.join().unwrap();
        assert_eq!(state.read().unwrap().status, MachineStatus::Online);
    }
}
