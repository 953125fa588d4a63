// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Status cache facade.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::sync::broadcast;

use crate::error::{Error, Result};
use crate::event::{Event, EventContext, EventValue, StatusChange, StatusEventBus};
use crate::processor::EventProcessorChain;
use crate::sensor::{Sensor, SensorRegistry};
use crate::store::{SensorValueStore, StateSnapshot};
use crate::tracker::{ChangedStatusTable, PollResult, PollingKey, WakeReason};
use crate::types::SensorId;

use super::{CacheConfig, CacheState};

/// In-memory store of the last known value of every sensor, with long-poll
/// change notification.
///
/// # Concurrency
///
/// [`register_sensor`](Self::register_sensor), [`update`](Self::update) and
/// [`shutdown`](Self::shutdown) run inside one exclusive section, so the
/// value store and the change table are always updated together. Queries and
/// snapshots never take that section. Long-poll waiters block on their own
/// record and are released by changes, timeouts or shutdown.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// use status_cache::event::{Event, EventValue};
/// use status_cache::processor::EventProcessorChain;
/// use status_cache::sensor::{DistinctStates, StateSensor};
/// use status_cache::tracker::PollingKey;
/// use status_cache::types::SensorId;
/// use status_cache::{CacheConfig, StatusCache};
///
/// # fn main() -> status_cache::Result<()> {
/// let cache = Arc::new(StatusCache::new(CacheConfig::default(), EventProcessorChain::new()));
/// cache.start()?;
///
/// let id = SensorId::new(42);
/// let sensor = Arc::new(StateSensor::new(
///     id,
///     "kitchen-switch",
///     DistinctStates::new().with_state("on").with_state("off"),
/// ));
/// cache.register_sensor(sensor.clone())?;
/// sensor.start(&cache);
///
/// assert!(cache.query_status(id).is_unknown());
///
/// sensor.update("off");
/// assert_eq!(cache.query_status(id), EventValue::custom("off"));
///
/// let key = PollingKey::from("p1");
/// let result = cache.wait_for_changes(&key, &[id].into(), Some(Duration::from_millis(10)));
/// assert!(result.is_timed_out());
///
/// cache.shutdown();
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct StatusCache {
    config: CacheConfig,
    chain: EventProcessorChain,
    store: SensorValueStore,
    tracker: ChangedStatusTable,
    bus: StatusEventBus,
    /// The exclusive section; also owns the sensor references.
    exclusive: Mutex<SensorRegistry>,
    /// Written only while holding `exclusive`.
    state: RwLock<CacheState>,
}

impl StatusCache {
    /// Creates a cache in the [`CacheState::Created`] state.
    #[must_use]
    pub fn new(config: CacheConfig, chain: EventProcessorChain) -> Self {
        let bus = StatusEventBus::with_capacity(config.event_bus_capacity);
        Self {
            config,
            chain,
            store: SensorValueStore::new(),
            tracker: ChangedStatusTable::new(),
            bus,
            exclusive: Mutex::new(SensorRegistry::new()),
            state: RwLock::new(CacheState::Created),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> CacheState {
        *self.state.read()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Starts the event processor chain.
    ///
    /// # Errors
    ///
    /// Returns `Error::AlreadyStarted` or `Error::ShutDown` if the cache is
    /// not in the `Created` state, or `Error::Processor` if a processor fails
    /// to start (the cache then stays in `Created`).
    pub fn start(&self) -> Result<()> {
        let _exclusive = self.exclusive.lock();
        match self.state() {
            CacheState::Created => {}
            CacheState::Started => return Err(Error::AlreadyStarted),
            CacheState::ShuttingDown | CacheState::ShutDown => return Err(Error::ShutDown),
        }

        self.chain.start()?;
        *self.state.write() = CacheState::Started;
        tracing::info!(processors = self.chain.len(), "Status cache started");
        Ok(())
    }

    /// Stops the cache permanently.
    ///
    /// Stops the processor chain and every registered sensor, releases every
    /// blocked long-poll waiter, then clears all values and records. A sensor
    /// that fails to stop is logged and does not interrupt the sequence.
    /// Calling this again has no effect.
    pub fn shutdown(&self) {
        let mut sensors = self.exclusive.lock();
        let previous = self.state();
        if previous.is_stopping() {
            tracing::debug!(state = %previous, "Shutdown already performed");
            return;
        }
        *self.state.write() = CacheState::ShuttingDown;
        tracing::info!(sensors = sensors.len(), records = self.tracker.len(), "Shutting down status cache");

        if previous.is_running() {
            self.chain.stop();
        }

        let failures = sensors.stop_all();
        if failures > 0 {
            tracing::warn!(failures, "Some sensors did not stop cleanly");
        }

        self.tracker.shutdown();
        self.store.clear();
        sensors.clear();

        *self.state.write() = CacheState::ShutDown;
        tracing::info!("Status cache shut down");
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Registers a sensor and seeds its value as unknown.
    ///
    /// Registration after shutdown has begun is ignored.
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateSensorId` if the ID is already registered
    /// (the existing sensor keeps its state), or `Error::NotStarted` if the
    /// cache was never started.
    pub fn register_sensor(&self, sensor: Arc<dyn Sensor>) -> Result<()> {
        if self.state().is_stopping() {
            tracing::debug!(sensor_id = %sensor.id(), "Ignoring registration, cache is shutting down");
            return Ok(());
        }

        let mut sensors = self.exclusive.lock();
        match self.state() {
            CacheState::Started => {}
            CacheState::Created => return Err(Error::NotStarted),
            state @ (CacheState::ShuttingDown | CacheState::ShutDown) => {
                tracing::debug!(sensor_id = %sensor.id(), %state, "Ignoring registration, cache is shutting down");
                return Ok(());
            }
        }

        sensors.insert(Arc::clone(&sensor))?;
        self.store.init(sensor.as_ref());
        tracing::info!(
            sensor_id = %sensor.id(),
            sensor = sensor.name(),
            sensor_type = ?sensor.sensor_type(),
            "Registered sensor"
        );
        Ok(())
    }

    /// Commits an incoming event.
    ///
    /// The event runs through the processor chain; a terminated event is
    /// dropped. Otherwise it is stored, and if the value differs from the
    /// current one every record polling the sensor is notified and the
    /// change is published on the status bus.
    ///
    /// Returns `true` if a change was committed. Events arriving before
    /// `start` or after shutdown has begun are dropped.
    pub fn update(&self, event: Event) -> bool {
        if self.state().is_stopping() {
            tracing::debug!(sensor_id = %event.source_id(), "Dropping event, cache is shutting down");
            return false;
        }

        let _exclusive = self.exclusive.lock();
        let state = self.state();
        if !state.is_running() {
            tracing::debug!(sensor_id = %event.source_id(), %state, "Dropping event, cache is not running");
            return false;
        }

        let ctx = self.chain.push(EventContext::new(event));
        if ctx.is_terminated() {
            tracing::info!(sensor_id = %ctx.event().source_id(), "Event dropped by processor chain");
            return false;
        }

        let event = ctx.into_event();
        let sensor_id = event.source_id();
        let Some(change) = self.store.update(event) else {
            tracing::trace!(sensor_id = %sensor_id, "Value unchanged");
            return false;
        };

        let notified = self.tracker.update_status_changed_ids(sensor_id);
        tracing::debug!(
            sensor_id = %sensor_id,
            value = %change.current.value(),
            notified,
            "Status changed"
        );
        self.bus.publish(change);
        true
    }

    /// Parses a raw reading for a registered sensor and commits it.
    ///
    /// The reading is parsed against the sensor's [`SensorType`]; the unknown
    /// marker always parses. Returns whether a change was committed. Readings
    /// arriving after shutdown has begun are dropped.
    ///
    /// # Errors
    ///
    /// Returns `Error::SensorNotFound` if no sensor is registered under `id`,
    /// or `Error::Value` if the reading is invalid for the sensor type.
    ///
    /// [`SensorType`]: crate::sensor::SensorType
    pub fn update_raw(&self, id: SensorId, raw: &str) -> Result<bool> {
        if self.state().is_stopping() {
            tracing::debug!(sensor_id = %id, "Dropping reading, cache is shutting down");
            return Ok(false);
        }

        let sensor = self
            .exclusive
            .lock()
            .get(id)
            .ok_or_else(|| Error::SensorNotFound(id.to_string()))?;
        let value = EventValue::parse(&sensor.sensor_type(), raw)?;
        Ok(self.update(Event::new(id, sensor.name(), value)))
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Returns the current value of a sensor.
    ///
    /// An unregistered ID yields [`EventValue::Unknown`].
    #[must_use]
    pub fn query_status(&self, id: SensorId) -> EventValue {
        if let Some(event) = self.store.current_state(id) {
            return event.value().clone();
        }
        tracing::info!(sensor_id = %id, "Status requested for unknown sensor");
        EventValue::Unknown
    }

    /// Returns the current values of several sensors.
    ///
    /// Unregistered IDs map to [`EventValue::Unknown`].
    pub fn query_statuses(
        &self,
        ids: impl IntoIterator<Item = SensorId>,
    ) -> BTreeMap<SensorId, EventValue> {
        ids.into_iter()
            .map(|id| (id, self.query_status(id)))
            .collect()
    }

    /// Returns the current event of a sensor by name.
    ///
    /// # Errors
    ///
    /// Returns `Error::SensorNotFound` if no sensor is registered under
    /// `name`.
    pub fn query_status_by_name(&self, name: &str) -> Result<Event> {
        self.store.get(name)
    }

    /// Returns the current event of a sensor, if one is stored.
    #[must_use]
    pub fn query_event(&self, id: SensorId) -> Option<Event> {
        self.store.current_state(id)
    }

    /// Looks up a sensor ID by name.
    #[must_use]
    pub fn sensor_id(&self, name: &str) -> Option<SensorId> {
        self.store.sensor_id(name)
    }

    /// Returns a lazy point-in-time sequence over all current values.
    ///
    /// See [`SensorValueStore::snapshot`] for the consistency guarantees.
    #[must_use]
    pub fn state_snapshot(&self) -> StateSnapshot<'_> {
        self.store.snapshot()
    }

    /// Subscribes to every committed change.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StatusChange> {
        self.bus.subscribe()
    }

    /// Returns the table of polling records.
    #[must_use]
    pub fn changed_status_table(&self) -> &ChangedStatusTable {
        &self.tracker
    }

    // =========================================================================
    // Long-poll
    // =========================================================================

    /// Blocks until one of `sensor_ids` changes, the timeout elapses, or the
    /// cache shuts down.
    ///
    /// The session's record is created on first use and reused while the
    /// sensor set stays the same. Changes recorded since the previous call
    /// are returned immediately. `timeout` is resolved through
    /// [`CacheConfig::effective_poll_timeout`].
    ///
    /// The record outlives the call and keeps accumulating changes until
    /// [`remove_poll`](Self::remove_poll) or shutdown. Callers keying
    /// sessions by client must remove them when the client goes away.
    pub fn wait_for_changes(
        &self,
        key: &PollingKey,
        sensor_ids: &BTreeSet<SensorId>,
        timeout: Option<Duration>,
    ) -> PollResult {
        if self.state().is_stopping() {
            return PollResult {
                changed: BTreeSet::new(),
                reason: WakeReason::Shutdown,
            };
        }

        let timeout = self.config.effective_poll_timeout(timeout);
        let record = self.tracker.query_or_insert(key, sensor_ids);
        let result = record.wait_for_changes(timeout);
        tracing::debug!(
            key = %key,
            reason = ?result.reason,
            changed = result.changed.len(),
            "Long-poll returned"
        );
        result
    }

    /// Async variant of [`wait_for_changes`](Self::wait_for_changes).
    ///
    /// The wait runs on tokio's blocking pool so the calling task's worker
    /// thread stays free.
    ///
    /// # Errors
    ///
    /// Returns `Error::PollAborted` if the blocking task panicked or was
    /// cancelled.
    pub async fn poll_changes(
        self: &Arc<Self>,
        key: PollingKey,
        sensor_ids: BTreeSet<SensorId>,
        timeout: Option<Duration>,
    ) -> Result<PollResult> {
        let cache = Arc::clone(self);
        tokio::task::spawn_blocking(move || cache.wait_for_changes(&key, &sensor_ids, timeout))
            .await
            .map_err(|e| Error::PollAborted(e.to_string()))
    }

    /// Ends a polling session, releasing any waiter on it.
    ///
    /// Sessions are never expired by the cache; this is the only way to
    /// drop one before shutdown.
    ///
    /// Returns `true` if the session existed.
    pub fn remove_poll(&self, key: &PollingKey) -> bool {
        self.tracker.remove(key)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::error::{ProcessorError, SensorError, ValueError};
    use crate::processor::EventProcessor;
    use crate::sensor::SensorType;
    use crate::types::SwitchState;

    struct TestSensor {
        id: SensorId,
        name: &'static str,
        stopped: AtomicBool,
    }

    impl TestSensor {
        fn new(id: u32, name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                id: SensorId::new(id),
                name,
                stopped: AtomicBool::new(false),
            })
        }
    }

    impl Sensor for TestSensor {
        fn id(&self) -> SensorId {
            self.id
        }

        fn name(&self) -> &str {
            self.name
        }

        fn sensor_type(&self) -> SensorType {
            SensorType::Switch
        }

        fn stop(&self) -> std::result::Result<(), SensorError> {
            self.stopped.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    struct RejectOff;

    impl EventProcessor for RejectOff {
        fn name(&self) -> &str {
            "reject-off"
        }

        fn push(&self, ctx: &mut EventContext) {
            if ctx.event().value() == &EventValue::Switch(SwitchState::Off) {
                ctx.terminate();
            }
        }
    }

    struct BrokenStart;

    impl EventProcessor for BrokenStart {
        fn name(&self) -> &str {
            "broken"
        }

        fn start(&self) -> std::result::Result<(), ProcessorError> {
            Err(ProcessorError::StartFailed {
                processor: "broken".to_string(),
                reason: "boom".to_string(),
            })
        }

        fn push(&self, _ctx: &mut EventContext) {}
    }

    fn started() -> StatusCache {
        let cache = StatusCache::new(CacheConfig::default(), EventProcessorChain::new());
        cache.start().unwrap();
        cache
    }

    fn switch(id: u32, state: SwitchState) -> Event {
        Event::switch(SensorId::new(id), "kitchen-switch", state)
    }

    #[test]
    fn lifecycle_transitions() {
        let cache = StatusCache::new(CacheConfig::default(), EventProcessorChain::new());
        assert_eq!(cache.state(), CacheState::Created);

        cache.start().unwrap();
        assert_eq!(cache.state(), CacheState::Started);
        assert!(matches!(cache.start(), Err(Error::AlreadyStarted)));

        cache.shutdown();
        assert_eq!(cache.state(), CacheState::ShutDown);
        assert!(matches!(cache.start(), Err(Error::ShutDown)));
    }

    #[test]
    fn failed_start_stays_created() {
        let chain = EventProcessorChain::new().with_processor(BrokenStart);
        let cache = StatusCache::new(CacheConfig::default(), chain);
        assert!(matches!(cache.start(), Err(Error::Processor(_))));
        assert_eq!(cache.state(), CacheState::Created);
    }

    #[test]
    fn register_before_start_fails() {
        let cache = StatusCache::new(CacheConfig::default(), EventProcessorChain::new());
        let err = cache
            .register_sensor(TestSensor::new(1, "a"))
            .unwrap_err();
        assert!(matches!(err, Error::NotStarted));
    }

    #[test]
    fn unknown_before_first_write() {
        let cache = started();
        cache.register_sensor(TestSensor::new(42, "kitchen-switch")).unwrap();
        assert!(cache.query_status(SensorId::new(42)).is_unknown());

        assert!(cache.update(switch(42, SwitchState::On)));
        assert_eq!(
            cache.query_status(SensorId::new(42)),
            EventValue::Switch(SwitchState::On)
        );
    }

    #[test]
    fn duplicate_registration_keeps_first_state() {
        let cache = started();
        cache.register_sensor(TestSensor::new(42, "kitchen-switch")).unwrap();
        cache.update(switch(42, SwitchState::On));

        let err = cache
            .register_sensor(TestSensor::new(42, "other"))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateSensorId(id) if id == SensorId::new(42)));
        assert_eq!(
            cache.query_status(SensorId::new(42)),
            EventValue::Switch(SwitchState::On)
        );
        assert_eq!(cache.sensor_id("other"), None);
    }

    #[test]
    fn identical_updates_change_once() {
        let cache = started();
        cache.register_sensor(TestSensor::new(42, "kitchen-switch")).unwrap();

        assert!(cache.update(switch(42, SwitchState::Off)));
        assert!(!cache.update(switch(42, SwitchState::Off)));
    }

    #[test]
    fn terminated_events_never_reach_store() {
        let chain = EventProcessorChain::new().with_processor(RejectOff);
        let cache = StatusCache::new(CacheConfig::default(), chain);
        cache.start().unwrap();
        cache.register_sensor(TestSensor::new(42, "kitchen-switch")).unwrap();

        assert!(!cache.update(switch(42, SwitchState::Off)));
        assert!(cache.query_status(SensorId::new(42)).is_unknown());
        assert!(cache.update(switch(42, SwitchState::On)));
    }

    #[test]
    fn update_before_start_is_dropped() {
        let cache = StatusCache::new(CacheConfig::default(), EventProcessorChain::new());
        assert!(!cache.update(switch(1, SwitchState::On)));
        assert!(cache.query_event(SensorId::new(1)).is_none());
    }

    #[test]
    fn raw_reading_parses_by_sensor_type() {
        let cache = started();
        cache.register_sensor(TestSensor::new(42, "kitchen-switch")).unwrap();

        assert!(cache.update_raw(SensorId::new(42), "on").unwrap());
        assert_eq!(
            cache.query_status(SensorId::new(42)),
            EventValue::Switch(SwitchState::On)
        );

        let err = cache.update_raw(SensorId::new(42), "maybe").unwrap_err();
        assert!(matches!(err, Error::Value(ValueError::InvalidSwitchState(_))));
        assert!(matches!(
            cache.update_raw(SensorId::new(7), "on"),
            Err(Error::SensorNotFound(_))
        ));
    }

    #[test]
    fn raw_reading_after_shutdown_is_dropped() {
        let cache = started();
        cache.register_sensor(TestSensor::new(42, "kitchen-switch")).unwrap();
        cache.shutdown();
        assert!(!cache.update_raw(SensorId::new(42), "on").unwrap());
    }

    #[test]
    fn query_statuses_marks_unknown_ids() {
        let cache = started();
        cache.register_sensor(TestSensor::new(1, "a")).unwrap();
        cache.update(switch(1, SwitchState::On));

        let statuses = cache.query_statuses([SensorId::new(1), SensorId::new(99)]);
        assert_eq!(statuses[&SensorId::new(1)], EventValue::Switch(SwitchState::On));
        assert!(statuses[&SensorId::new(99)].is_unknown());
    }

    #[test]
    fn query_by_name() {
        let cache = started();
        cache.register_sensor(TestSensor::new(42, "kitchen-switch")).unwrap();

        assert!(cache.query_status_by_name("kitchen-switch").unwrap().is_unknown());
        assert!(matches!(
            cache.query_status_by_name("garage"),
            Err(Error::SensorNotFound(_))
        ));
    }

    #[test]
    fn shutdown_stops_sensors_and_clears() {
        let cache = started();
        let sensor = TestSensor::new(42, "kitchen-switch");
        cache.register_sensor(sensor.clone()).unwrap();
        cache.update(switch(42, SwitchState::On));

        cache.shutdown();

        assert!(sensor.stopped.load(Ordering::SeqCst));
        assert_eq!(cache.state_snapshot().count(), 0);
        assert!(cache.changed_status_table().is_empty());
        assert!(!cache.update(switch(42, SwitchState::Off)));
        assert!(cache.register_sensor(TestSensor::new(7, "late")).is_ok());
        assert_eq!(cache.sensor_id("late"), None);
    }

    #[test]
    fn shutdown_twice_is_harmless() {
        let cache = started();
        cache.shutdown();
        cache.shutdown();
        assert_eq!(cache.state(), CacheState::ShutDown);
    }

    #[test]
    fn wait_after_shutdown_returns_immediately() {
        let cache = started();
        cache.shutdown();
        let result = cache.wait_for_changes(
            &PollingKey::from("p1"),
            &[SensorId::new(1)].into(),
            Some(Duration::from_secs(30)),
        );
        assert_eq!(result.reason, WakeReason::Shutdown);
    }

    #[test]
    fn committed_change_is_published() {
        let cache = started();
        let mut rx = cache.subscribe();
        cache.register_sensor(TestSensor::new(42, "kitchen-switch")).unwrap();

        cache.update(switch(42, SwitchState::On));
        cache.update(switch(42, SwitchState::On));

        let change = rx.try_recv().unwrap();
        assert!(change.is_first_value());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn session_outlives_wait_until_removed() {
        let cache = started();
        let key = PollingKey::for_client("dashboard", &[SensorId::new(1)].into());
        let ids: BTreeSet<_> = [SensorId::new(1)].into();

        let result = cache.wait_for_changes(&key, &ids, Some(Duration::from_millis(5)));
        assert!(result.is_timed_out());
        assert!(cache.changed_status_table().query(&key).is_some());

        assert!(cache.remove_poll(&key));
        assert!(cache.changed_status_table().query(&key).is_none());
    }

    #[test]
    fn remove_poll_drops_record() {
        let cache = started();
        let key = PollingKey::from("p1");
        let ids: BTreeSet<_> = [SensorId::new(1)].into();

        cache.changed_status_table().query_or_insert(&key, &ids);
        assert!(cache.remove_poll(&key));
        assert!(!cache.remove_poll(&key));
    }
}
