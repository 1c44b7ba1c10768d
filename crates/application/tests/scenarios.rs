//! End-to-end behavioral scenarios for the translation loop, expressed
//! as pure event sequences against the state machine.

use signwave_application::{Effect, LoopEvent, TranslatorMachine};
use signwave_protocol::{ConnectionState, Detection};

fn streaming_machine() -> TranslatorMachine {
    let mut m = TranslatorMachine::default();
    m.apply(LoopEvent::ProbeChanged(ConnectionState::up()));
    m.apply(LoopEvent::Start);
    m.apply(LoopEvent::CameraOpened);
    m
}

/// Run one full tick: issue the tick, feed the detection back under the
/// epoch the classify effect carried, and return the result's effects.
fn tick_with(m: &mut TranslatorMachine, detection: Detection) -> Vec<Effect> {
    let effects = m.apply(LoopEvent::Tick);
    let epoch = match effects.as_slice() {
        [Effect::Classify { epoch }] => *epoch,
        other => panic!("expected a classify effect, got {other:?}"),
    };
    m.apply(LoopEvent::Result { epoch, detection })
}

fn speech_events(effects: &[Effect]) -> Vec<&str> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::Speak(text) => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

#[test]
fn s1_basic_detection() {
    let mut m = streaming_machine();
    let effects = tick_with(&mut m, Detection::of("Hello", 0.9));

    assert_eq!(speech_events(&effects), vec!["Hello"]);
    let view = m.view();
    assert_eq!(view.current_sign.as_deref(), Some("Hello"));
    assert_eq!(view.confidence_pct, 90);
    assert_eq!(view.history.len(), 1);
    assert_eq!(view.history[0].sign, "Hello");
}

#[test]
fn s2_consecutive_identical_detections_dedup() {
    let mut m = streaming_machine();
    let mut spoken = 0;
    for _ in 0..3 {
        let effects = tick_with(&mut m, Detection::of("Hello", 0.85));
        spoken += speech_events(&effects).len();
    }

    assert_eq!(m.view().history.len(), 1);
    assert_eq!(spoken, 1, "exactly one speech event total");
}

#[test]
fn s3_confidence_at_threshold_is_discarded() {
    let mut m = streaming_machine();
    let effects = tick_with(&mut m, Detection::of("Hello", 0.70));

    assert!(effects.is_empty());
    assert_eq!(m.view().current_sign, None);
    assert!(m.view().history.is_empty());
}

#[test]
fn s4_null_detection_is_discarded() {
    let mut m = streaming_machine();
    let effects = tick_with(&mut m, Detection::none());

    assert!(effects.is_empty());
    assert_eq!(m.view().current_sign, None);
    assert!(m.view().history.is_empty());
}

#[test]
fn s5_result_arriving_after_stop_is_dropped() {
    let mut m = streaming_machine();
    tick_with(&mut m, Detection::of("Hello", 0.9));

    // Next classification goes in flight, then the user stops.
    let epoch = match m.apply(LoopEvent::Tick).as_slice() {
        [Effect::Classify { epoch }] => *epoch,
        other => panic!("expected a classify effect, got {other:?}"),
    };
    m.apply(LoopEvent::Stop);
    m.apply(LoopEvent::CameraClosed);

    let effects = m.apply(LoopEvent::Result {
        epoch,
        detection: Detection::of("Yes", 0.95),
    });

    assert!(effects.is_empty());
    let view = m.view();
    assert_eq!(view.current_sign, None, "current detection cleared on stop");
    assert_eq!(view.history.len(), 1, "late result must not touch history");
    assert_eq!(view.history[0].sign, "Hello");
}

#[test]
fn s6_history_bounded_to_ten_newest_first() {
    let mut m = streaming_machine();
    for sign in ["A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L"] {
        tick_with(&mut m, Detection::of(sign, 0.9));
    }

    let signs: Vec<&str> = m.view().history.iter().map(|h| h.sign.as_str()).collect();
    assert_eq!(signs, vec!["L", "K", "J", "I", "H", "G", "F", "E", "D", "C"]);
}

#[test]
fn s7_probe_loss_banners_but_keeps_ticking() {
    let mut m = streaming_machine();
    m.apply(LoopEvent::ProbeChanged(ConnectionState::down(
        "cannot reach backend",
    )));

    let view = m.view();
    assert!(!view.connected);
    assert_eq!(view.last_error.as_deref(), Some("cannot reach backend"));
    assert!(view.streaming, "connectivity loss does not stop capture");

    // A subsequent successful tick still updates state.
    tick_with(&mut m, Detection::of("Help", 0.8));
    assert_eq!(m.view().current_sign.as_deref(), Some("Help"));
    assert_eq!(m.view().confidence_pct, 80);
}
