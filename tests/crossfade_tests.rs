//! Crossfade scheduler scenarios, driven deterministically by a manually
//! pumped driver.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempoline::{
    AudioOutput, CrossfadeSession, Easing, EventBus, SourceId, TempolineError, TempolineEvent,
    TweenDriver,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Play(SourceId),
    Stop(SourceId),
}

#[derive(Default)]
struct RecordingOutput {
    levels: Mutex<HashMap<SourceId, f32>>,
    calls: Mutex<Vec<Call>>,
    failing: Mutex<HashSet<SourceId>>,
}

impl RecordingOutput {
    fn level(&self, source: SourceId) -> f32 {
        self.levels
            .lock()
            .unwrap()
            .get(&source)
            .copied()
            .unwrap_or(0.0)
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn fail_on(&self, source: SourceId) {
        self.failing.lock().unwrap().insert(source);
    }
}

impl AudioOutput for RecordingOutput {
    fn play(&self, source: SourceId) -> tempoline::Result<()> {
        if self.failing.lock().unwrap().contains(&source) {
            return Err(TempolineError::Output(format!(
                "source {source} unavailable"
            )));
        }
        self.calls.lock().unwrap().push(Call::Play(source));
        Ok(())
    }

    fn stop(&self, source: SourceId) {
        self.calls.lock().unwrap().push(Call::Stop(source));
    }

    fn set_level(&self, source: SourceId, level: f32) {
        self.levels.lock().unwrap().insert(source, level);
    }
}

struct Fixture {
    output: Arc<RecordingOutput>,
    driver: Arc<TweenDriver>,
    session: CrossfadeSession,
    bus: EventBus,
}

fn fixture() -> Fixture {
    let output = Arc::new(RecordingOutput::default());
    let driver = Arc::new(TweenDriver::manual());
    let bus = EventBus::new();
    let session = CrossfadeSession::new(
        Arc::clone(&output) as Arc<dyn AudioOutput>,
        Arc::clone(&driver),
        Duration::from_secs(1),
        Easing::Linear,
    )
    .with_events(bus.sender());
    Fixture {
        output,
        driver,
        session,
        bus,
    }
}

fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-5,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn first_selection_fades_in_from_silence() {
    let mut fx = fixture();
    let meadow = SourceId::new_v4();

    fx.session.select(Some(meadow)).unwrap();
    assert_eq!(fx.output.calls(), vec![Call::Play(meadow)]);
    assert_eq!(fx.output.level(meadow), 0.0);
    assert!(fx.session.is_transitioning());

    fx.driver.pump(0.5).unwrap();
    assert_close(fx.output.level(meadow), 0.5);

    fx.driver.pump(0.5).unwrap();
    assert_close(fx.output.level(meadow), 1.0);
    assert!(!fx.session.is_transitioning());
    assert_eq!(fx.session.selected(), Some(meadow));

    let events = fx.bus.try_drain();
    assert_eq!(
        events,
        vec![
            TempolineEvent::TransitionStarted {
                from: None,
                to: Some(meadow)
            },
            TempolineEvent::TransitionCompleted { to: meadow },
        ]
    );
}

#[test]
fn handoff_ramps_run_in_parallel() {
    let mut fx = fixture();
    let a = SourceId::new_v4();
    let b = SourceId::new_v4();

    fx.session.select(Some(a)).unwrap();
    fx.driver.pump(1.0).unwrap();

    fx.session.select(Some(b)).unwrap();
    fx.driver.pump(0.25).unwrap();
    assert_close(fx.output.level(a), 0.75);
    assert_close(fx.output.level(b), 0.25);

    fx.driver.pump(0.75).unwrap();
    assert_close(fx.output.level(a), 0.0);
    assert_close(fx.output.level(b), 1.0);
    assert!(fx.output.calls().contains(&Call::Stop(a)));
}

#[test]
fn reversal_resumes_from_in_flight_levels() {
    let mut fx = fixture();
    let a = SourceId::new_v4();
    let b = SourceId::new_v4();

    fx.session.select(Some(a)).unwrap();
    fx.driver.pump(1.0).unwrap();
    fx.bus.try_drain();

    // A -> B, reversed at t=0.3.
    fx.session.select(Some(b)).unwrap();
    fx.driver.pump(0.3).unwrap();
    assert_close(fx.output.level(a), 0.7);
    assert_close(fx.output.level(b), 0.3);

    let a_level = fx.output.level(a);
    let b_level = fx.output.level(b);
    fx.session.select(Some(a)).unwrap();
    // The new ramps start exactly where the cancelled ones left off.
    assert_eq!(fx.output.level(a), a_level);
    assert_eq!(fx.output.level(b), b_level);

    // Both ramps run over a fresh full duration.
    fx.driver.pump(0.5).unwrap();
    assert_close(fx.output.level(a), 0.7 + 0.5 * 0.3);
    assert_close(fx.output.level(b), 0.3 - 0.5 * 0.3);

    fx.driver.pump(0.5).unwrap();
    assert_close(fx.output.level(a), 1.0);
    assert_close(fx.output.level(b), 0.0);
    assert!(fx.output.calls().contains(&Call::Stop(b)));
    // A was never stopped; it was reclaimed mid-fade.
    assert!(!fx.output.calls().contains(&Call::Stop(a)));
}

#[test]
fn deselecting_fades_to_silence_without_incoming() {
    let mut fx = fixture();
    let a = SourceId::new_v4();

    fx.session.select(Some(a)).unwrap();
    fx.driver.pump(1.0).unwrap();
    fx.bus.try_drain();

    fx.session.select(None).unwrap();
    assert_eq!(fx.session.selected(), None);

    fx.driver.pump(0.6).unwrap();
    assert_close(fx.output.level(a), 0.4);

    fx.driver.pump(0.4).unwrap();
    assert_close(fx.output.level(a), 0.0);
    assert!(fx.output.calls().contains(&Call::Stop(a)));

    let events = fx.bus.try_drain();
    assert_eq!(
        events,
        vec![
            TempolineEvent::TransitionStarted {
                from: Some(a),
                to: None
            },
            TempolineEvent::FadeOutCompleted { source: a },
        ]
    );
}

#[test]
fn failed_target_is_fail_soft() {
    let mut fx = fixture();
    let a = SourceId::new_v4();
    let b = SourceId::new_v4();
    fx.output.fail_on(b);

    fx.session.select(Some(a)).unwrap();
    fx.driver.pump(1.0).unwrap();
    fx.bus.try_drain();

    let err = fx.session.select(Some(b)).unwrap_err();
    assert!(matches!(err, TempolineError::Output(_)));
    assert_eq!(fx.session.selected(), None);

    // The outgoing fade still completes within its configured duration.
    fx.driver.pump(1.0).unwrap();
    assert_close(fx.output.level(a), 0.0);
    assert!(fx.output.calls().contains(&Call::Stop(a)));
    assert!(!fx.output.calls().contains(&Call::Play(b)));
    assert_eq!(fx.output.level(b), 0.0);
}

#[test]
fn rapid_three_way_retarget_keeps_draining_the_oldest_source() {
    let mut fx = fixture();
    let a = SourceId::new_v4();
    let b = SourceId::new_v4();
    let c = SourceId::new_v4();

    fx.session.select(Some(a)).unwrap();
    fx.driver.pump(1.0).unwrap();

    fx.session.select(Some(b)).unwrap();
    fx.driver.pump(0.3).unwrap();
    assert_close(fx.output.level(a), 0.7);
    assert_close(fx.output.level(b), 0.3);

    fx.session.select(Some(c)).unwrap();
    // A's drain was not cut: it finishes its original 1s timeline.
    fx.driver.pump(0.7).unwrap();
    assert_close(fx.output.level(a), 0.0);
    assert!(fx.output.calls().contains(&Call::Stop(a)));
    // B fades out from its captured level over the fresh duration.
    assert_close(fx.output.level(b), 0.3 - 0.7 * 0.3);
    assert_close(fx.output.level(c), 0.7);

    fx.driver.pump(0.3).unwrap();
    assert_close(fx.output.level(b), 0.0);
    assert!(fx.output.calls().contains(&Call::Stop(b)));
    assert_close(fx.output.level(c), 1.0);
}

#[test]
fn reselecting_a_source_still_draining_from_an_earlier_retarget() {
    let mut fx = fixture();
    let a = SourceId::new_v4();
    let b = SourceId::new_v4();
    let c = SourceId::new_v4();

    fx.session.select(Some(a)).unwrap();
    fx.driver.pump(1.0).unwrap();

    // Two quick retargets leave A draining from an old ramp.
    fx.session.select(Some(b)).unwrap();
    fx.driver.pump(0.3).unwrap();
    fx.session.select(Some(c)).unwrap();
    fx.driver.pump(0.2).unwrap();
    assert_close(fx.output.level(a), 0.5);
    assert_close(fx.output.level(b), 0.3 - 0.2 * 0.3);
    assert_close(fx.output.level(c), 0.2);

    // Coming back to A reclaims its drain: the incoming ramp starts at
    // A's exact current level, not at silence.
    let a_level = fx.output.level(a);
    fx.session.select(Some(a)).unwrap();
    assert_eq!(fx.output.level(a), a_level);

    fx.driver.pump(0.5).unwrap();
    assert_close(fx.output.level(a), 0.5 + 0.5 * 0.5);
    assert_close(fx.output.level(c), 0.2 - 0.5 * 0.2);

    fx.driver.pump(0.5).unwrap();
    assert_close(fx.output.level(a), 1.0);
    assert_close(fx.output.level(b), 0.0);
    assert_close(fx.output.level(c), 0.0);
    // The old ramp's stop never fires against the re-selected source.
    assert!(!fx.output.calls().contains(&Call::Stop(a)));
    assert!(fx.output.calls().contains(&Call::Stop(b)));
    assert!(fx.output.calls().contains(&Call::Stop(c)));
    assert_eq!(fx.session.selected(), Some(a));
    assert!(!fx.session.is_transitioning());
}

#[test]
fn reselecting_current_source_is_a_noop() {
    let mut fx = fixture();
    let a = SourceId::new_v4();

    fx.session.select(Some(a)).unwrap();
    fx.driver.pump(1.0).unwrap();
    fx.bus.try_drain();
    let calls_before = fx.output.calls().len();

    fx.session.select(Some(a)).unwrap();
    assert_eq!(fx.output.calls().len(), calls_before);
    assert!(fx.bus.try_drain().is_empty());
}

#[test]
fn per_request_duration_override_wins() {
    let mut fx = fixture();
    let a = SourceId::new_v4();

    fx.session
        .select_with(Some(a), Some(Duration::from_secs(2)), None)
        .unwrap();
    fx.driver.pump(1.0).unwrap();
    assert_close(fx.output.level(a), 0.5);
    fx.driver.pump(1.0).unwrap();
    assert_close(fx.output.level(a), 1.0);
}

#[test]
fn zero_duration_override_is_rejected() {
    let mut fx = fixture();
    let a = SourceId::new_v4();
    assert!(matches!(
        fx.session
            .select_with(Some(a), Some(Duration::ZERO), None),
        Err(TempolineError::InvalidDuration(_))
    ));
    // Nothing was started.
    assert!(fx.output.calls().is_empty());
    assert_eq!(fx.session.selected(), None);
}

#[test]
fn eased_fades_still_meet_endpoints() {
    let mut fx = fixture();
    let a = SourceId::new_v4();
    let b = SourceId::new_v4();

    fx.session
        .select_with(Some(a), None, Some(Easing::SineInOut))
        .unwrap();
    fx.driver.pump(1.0).unwrap();
    assert_close(fx.output.level(a), 1.0);

    fx.session
        .select_with(Some(b), None, Some(Easing::SineInOut))
        .unwrap();
    fx.driver.pump(1.0).unwrap();
    assert_close(fx.output.level(a), 0.0);
    assert_close(fx.output.level(b), 1.0);
}
