// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for cache lifecycle, registration and the update path.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use status_cache::event::{Event, EventContext};
use status_cache::processor::{EventProcessor, EventProcessorChain};
use status_cache::sensor::{DistinctStates, Sensor, SensorType, StateSensor};
use status_cache::types::{Level, SensorId, SwitchState};
use status_cache::{
    CacheConfig, CacheState, Error, EventValue, ProcessorError, SensorError, StatusCache,
};

fn running_cache(chain: EventProcessorChain) -> Arc<StatusCache> {
    let cache = Arc::new(StatusCache::new(CacheConfig::default(), chain));
    cache.start().unwrap();
    cache
}

/// Sensor that counts stop calls and can be told to fail them.
struct CountingSensor {
    id: SensorId,
    name: String,
    fail_stop: bool,
    stops: AtomicUsize,
}

impl CountingSensor {
    fn new(id: u32, name: &str, fail_stop: bool) -> Arc<Self> {
        Arc::new(Self {
            id: SensorId::new(id),
            name: name.to_string(),
            fail_stop,
            stops: AtomicUsize::new(0),
        })
    }
}

impl Sensor for CountingSensor {
    fn id(&self) -> SensorId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn sensor_type(&self) -> SensorType {
        SensorType::Level
    }

    fn stop(&self) -> Result<(), SensorError> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        if self.fail_stop {
            return Err(SensorError::StopFailed {
                id: self.id,
                reason: "device unreachable".to_string(),
            });
        }
        Ok(())
    }
}

// ============================================================================
// Registration
// ============================================================================

mod registration {
    use super::*;

    #[test]
    fn registered_sensor_starts_unknown() {
        let cache = running_cache(EventProcessorChain::new());
        cache
            .register_sensor(CountingSensor::new(7, "dimmer", false))
            .unwrap();

        let event = cache.query_status_by_name("dimmer").unwrap();
        assert!(event.is_unknown());
        assert_eq!(event.serialize(), status_cache::UNKNOWN_STATUS);
        assert_eq!(cache.sensor_id("dimmer"), Some(SensorId::new(7)));
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let cache = running_cache(EventProcessorChain::new());
        cache
            .register_sensor(CountingSensor::new(7, "dimmer", false))
            .unwrap();
        cache.update(Event::level(SensorId::new(7), "dimmer", Level::new(60).unwrap()));

        let err = cache
            .register_sensor(CountingSensor::new(7, "dimmer-2", false))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateSensorId(_)));
        assert_eq!(
            cache.query_status(SensorId::new(7)),
            EventValue::Level(Level::new(60).unwrap())
        );
    }

    #[test]
    fn unregistered_id_reads_unknown() {
        let cache = running_cache(EventProcessorChain::new());
        assert!(cache.query_status(SensorId::new(999)).is_unknown());
        assert!(cache.query_event(SensorId::new(999)).is_none());
    }

    #[test]
    fn unknown_name_is_an_error() {
        let cache = running_cache(EventProcessorChain::new());
        let err = cache.query_status_by_name("nowhere").unwrap_err();
        assert!(matches!(err, Error::SensorNotFound(name) if name == "nowhere"));
    }

    #[test]
    fn concurrent_registration_keeps_one_winner() {
        let cache = running_cache(EventProcessorChain::new());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    cache.register_sensor(CountingSensor::new(5, &format!("racer-{i}"), false))
                })
            })
            .collect();

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(Result::is_ok)
            .count();
        assert_eq!(successes, 1);
        assert_eq!(cache.state_snapshot().count(), 1);
    }
}

// ============================================================================
// Update path
// ============================================================================

mod update_path {
    use super::*;

    /// Drops levels above a threshold.
    struct LevelCeiling(u8);

    impl EventProcessor for LevelCeiling {
        fn name(&self) -> &str {
            "level-ceiling"
        }

        fn push(&self, ctx: &mut EventContext) {
            if let EventValue::Level(level) = ctx.event().value()
                && level.value() > self.0
            {
                ctx.terminate();
            }
        }
    }

    /// Rewrites every switch event to `On`.
    struct ForceOn;

    impl EventProcessor for ForceOn {
        fn name(&self) -> &str {
            "force-on"
        }

        fn push(&self, ctx: &mut EventContext) {
            if matches!(ctx.event().value(), EventValue::Switch(_)) {
                let event = ctx.event().with_value(EventValue::Switch(SwitchState::On));
                ctx.set_event(event);
            }
        }
    }

    #[test]
    fn terminated_event_leaves_value_untouched() {
        let chain = EventProcessorChain::new().with_processor(LevelCeiling(80));
        let cache = running_cache(chain);
        let id = SensorId::new(7);
        cache
            .register_sensor(CountingSensor::new(7, "dimmer", false))
            .unwrap();

        assert!(cache.update(Event::level(id, "dimmer", Level::new(50).unwrap())));
        assert!(!cache.update(Event::level(id, "dimmer", Level::new(95).unwrap())));
        assert_eq!(
            cache.query_status(id),
            EventValue::Level(Level::new(50).unwrap())
        );
    }

    #[test]
    fn processor_rewrite_is_what_commits() {
        let cache = running_cache(EventProcessorChain::new().with_processor(ForceOn));
        let id = SensorId::new(1);
        cache
            .register_sensor(CountingSensor::new(1, "porch", false))
            .unwrap();

        assert!(cache.update(Event::switch(id, "porch", SwitchState::Off)));
        assert_eq!(cache.query_status(id), EventValue::Switch(SwitchState::On));
        assert!(!cache.update(Event::switch(id, "porch", SwitchState::Off)));
    }

    #[test]
    fn event_for_unregistered_id_is_stored() {
        let cache = running_cache(EventProcessorChain::new());
        let id = SensorId::new(31);

        assert!(cache.update(Event::switch(id, "orphan", SwitchState::On)));
        assert_eq!(cache.query_status(id), EventValue::Switch(SwitchState::On));
        assert_eq!(cache.sensor_id("orphan"), None);
    }

    #[test]
    fn state_sensor_delivers_mapped_values() {
        let cache = running_cache(EventProcessorChain::new());
        let door = Arc::new(StateSensor::new(
            SensorId::new(5),
            "front-door",
            DistinctStates::new()
                .with_mapping("1", "open")
                .with_mapping("0", "closed"),
        ));
        cache.register_sensor(door.clone()).unwrap();
        door.start(&cache);
        assert!(door.is_running());

        assert!(door.update("1"));
        assert_eq!(cache.query_status(SensorId::new(5)).serialize(), "open");

        // Undeclared reading is reported as unknown again
        assert!(door.update("jammed"));
        assert!(cache.query_status(SensorId::new(5)).is_unknown());
    }

    #[test]
    fn snapshot_lists_every_sensor_in_id_order() {
        let cache = running_cache(EventProcessorChain::new());
        for (id, name) in [(3, "c"), (1, "a"), (2, "b")] {
            cache
                .register_sensor(CountingSensor::new(id, name, false))
                .unwrap();
        }
        cache.update(Event::level(SensorId::new(2), "b", Level::new(10).unwrap()));

        let snapshot: Vec<_> = cache.state_snapshot().collect();
        let ids: Vec<_> = snapshot.iter().map(Event::source_id).collect();
        assert_eq!(ids, [1, 2, 3].map(SensorId::new));
        assert!(snapshot[0].is_unknown());
        assert_eq!(snapshot[1].serialize(), "10");
    }

    #[test]
    fn snapshot_tolerates_concurrent_updates() {
        let cache = running_cache(EventProcessorChain::new());
        cache
            .register_sensor(CountingSensor::new(1, "a", false))
            .unwrap();
        cache
            .register_sensor(CountingSensor::new(2, "b", false))
            .unwrap();

        let mut snapshot = cache.state_snapshot();
        assert!(snapshot.next().is_some());
        cache.update(Event::level(SensorId::new(2), "b", Level::new(70).unwrap()));
        let last = snapshot.next().unwrap();
        assert_eq!(last.serialize(), "70");
        assert!(snapshot.next().is_none());
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

mod lifecycle {
    use super::*;

    struct FailingStart;

    impl EventProcessor for FailingStart {
        fn name(&self) -> &str {
            "failing-start"
        }

        fn start(&self) -> Result<(), ProcessorError> {
            Err(ProcessorError::StartFailed {
                processor: self.name().to_string(),
                reason: "rules missing".to_string(),
            })
        }

        fn push(&self, _ctx: &mut EventContext) {}
    }

    #[test]
    fn processor_start_failure_surfaces() {
        let cache = StatusCache::new(
            CacheConfig::default(),
            EventProcessorChain::new().with_processor(FailingStart),
        );
        let err = cache.start().unwrap_err();
        assert!(matches!(err, Error::Processor(_)));
        assert_eq!(cache.state(), CacheState::Created);
    }

    #[test]
    fn shutdown_stops_every_sensor_despite_failures() {
        let cache = running_cache(EventProcessorChain::new());
        let failing = CountingSensor::new(1, "flaky", true);
        let healthy = CountingSensor::new(2, "steady", false);
        cache.register_sensor(failing.clone()).unwrap();
        cache.register_sensor(healthy.clone()).unwrap();

        cache.shutdown();

        assert_eq!(failing.stops.load(Ordering::SeqCst), 1);
        assert_eq!(healthy.stops.load(Ordering::SeqCst), 1);
        assert_eq!(cache.state(), CacheState::ShutDown);
    }

    #[test]
    fn calls_after_shutdown_are_absorbed() {
        let cache = running_cache(EventProcessorChain::new());
        cache
            .register_sensor(CountingSensor::new(1, "a", false))
            .unwrap();
        cache.shutdown();

        assert!(!cache.update(Event::level(SensorId::new(1), "a", Level::new(1).unwrap())));
        assert!(cache
            .register_sensor(CountingSensor::new(2, "b", false))
            .is_ok());
        assert!(cache.query_status(SensorId::new(1)).is_unknown());
        assert_eq!(cache.state_snapshot().count(), 0);
        assert!(matches!(cache.start(), Err(Error::ShutDown)));
    }

    #[test]
    fn shutdown_unbinds_state_sensor() {
        let cache = running_cache(EventProcessorChain::new());
        let sensor = Arc::new(StateSensor::new(
            SensorId::new(9),
            "mode",
            DistinctStates::new().with_state("eco"),
        ));
        cache.register_sensor(sensor.clone()).unwrap();
        sensor.start(&cache);

        cache.shutdown();

        assert!(!sensor.is_running());
        assert!(!sensor.update("eco"));
    }

    #[test]
    fn concurrent_updates_and_shutdown_settle() {
        let cache = running_cache(EventProcessorChain::new());
        cache
            .register_sensor(CountingSensor::new(1, "a", false))
            .unwrap();

        let writers: Vec<_> = (0..4u8)
            .map(|t| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for i in 0..200u8 {
                        let level = Level::clamped(i.wrapping_add(t) % 101);
                        cache.update(Event::level(SensorId::new(1), "a", level));
                    }
                })
            })
            .collect();

        cache.shutdown();
        for writer in writers {
            writer.join().unwrap();
        }

        assert_eq!(cache.state(), CacheState::ShutDown);
        assert_eq!(cache.state_snapshot().count(), 0);
    }
}
