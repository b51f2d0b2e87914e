//! Interpreter semantics exercised through the public API.

use keystate::builder::{InvokeBuilder, MachineBuilder, StateNodeBuilder, TransitionBuilder};
use keystate::core::{Event, Machine, MachineEvent, MachineSnapshot, Status};
use keystate::effects::{Action, ActionError};
use keystate::graph::StateGraph;
use keystate::runtime::{Interpreter, InterpreterError, InterpreterOptions, Subscription};
use keystate::state_enum;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use stillwater::effect::BoxedEffect;
use stillwater::prelude::*;
use tokio::time::sleep;

state_enum! {
    enum Phase {
        Idle,
        Heating,
        Brewing,
        Ping,
        Pong,
        Off,
    }
    final: [Off]
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
enum Knob {
    Press,
    Nudge,
    Hold,
    Brew,
    Spin,
    Finish,
}

impl MachineEvent for Knob {
    type Kind = Knob;

    fn kind(&self) -> Knob {
        *self
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
struct Dial {
    entries: u32,
    nudges: u32,
    timeouts: u32,
    brewed: Option<u32>,
    failure: Option<String>,
}

#[derive(Clone, Default)]
struct Sensors {
    stuck: Arc<AtomicBool>,
    dry: Arc<AtomicBool>,
}

struct Kettle;

impl Machine for Kettle {
    type State = Phase;
    type Context = Dial;
    type Event = Knob;
    type Output = u32;
    type Error = String;
    type Env = Sensors;
}

type Node = StateNodeBuilder<Kettle>;
type Edge = TransitionBuilder<Kettle>;
type Act = Action<Kettle>;
type Snap = MachineSnapshot<Kettle>;

const HEAT: Duration = Duration::from_millis(100);
const BREW: Duration = Duration::from_millis(50);

fn brew(_: &Dial, _: &Event<Kettle>) -> BoxedEffect<u32, String, Sensors> {
    from_async(|sensors: &Sensors| {
        let dry = sensors.dry.load(Ordering::SeqCst);
        async move {
            sleep(BREW).await;
            if dry {
                Err("boiled dry".to_string())
            } else {
                Ok(7)
            }
        }
    })
    .boxed()
}

fn graph(initial: Phase) -> StateGraph<Kettle> {
    MachineBuilder::<Kettle>::new("kettle")
        .initial(initial)
        .context(Dial::default())
        .state(
            Node::new(Phase::Idle)
                .on(Knob::Press, Edge::new().to(Phase::Heating))
                .on(Knob::Brew, Edge::new().to(Phase::Brewing))
                .on(Knob::Spin, Edge::new().to(Phase::Ping))
                .on(Knob::Finish, Edge::new().to(Phase::Off)),
        )
        .state(
            Node::new(Phase::Heating)
                .entry(Act::assign("count", |d: &Dial, _| Dial {
                    entries: d.entries + 1,
                    ..d.clone()
                }))
                .after(
                    HEAT,
                    Edge::new().to(Phase::Idle).assign("timeout", |d: &Dial, _| Dial {
                        timeouts: d.timeouts + 1,
                        ..d.clone()
                    }),
                )
                .on(Knob::Press, Edge::new().to(Phase::Heating))
                .on(
                    Knob::Nudge,
                    Edge::new().assign("nudge", |d: &Dial, _| Dial {
                        nudges: d.nudges + 1,
                        ..d.clone()
                    }),
                )
                .on(
                    Knob::Hold,
                    Edge::new().to(Phase::Idle).effect("release", |_, _, sensors: &Sensors| {
                        if sensors.stuck.load(Ordering::SeqCst) {
                            Err(ActionError::new("knob is stuck"))
                        } else {
                            Ok(())
                        }
                    }),
                ),
        )
        .state(
            Node::new(Phase::Brewing)
                .invoke(
                    InvokeBuilder::<Kettle>::new("brew", brew)
                        .on_done(Edge::new().to(Phase::Idle).assign(
                            "brewed",
                            |d: &Dial, event: &Event<Kettle>| Dial {
                                brewed: event.output().copied(),
                                ..d.clone()
                            },
                        ).effect("pour", |_, _, sensors: &Sensors| {
                            if sensors.stuck.load(Ordering::SeqCst) {
                                Err(ActionError::new("spout is blocked"))
                            } else {
                                Ok(())
                            }
                        }))
                        .on_error(Edge::new().to(Phase::Idle).assign(
                            "failed",
                            |d: &Dial, event: &Event<Kettle>| Dial {
                                failure: event.error().cloned(),
                                ..d.clone()
                            },
                        )),
                )
                .on(Knob::Press, Edge::new().to(Phase::Idle)),
        )
        .state(Node::new(Phase::Ping).always(Edge::new().to(Phase::Pong)))
        .state(Node::new(Phase::Pong).always(Edge::new().to(Phase::Ping)))
        .state(Node::new(Phase::Off))
        .build()
        .unwrap()
}

fn kettle() -> (Interpreter<Kettle>, Sensors) {
    let sensors = Sensors::default();
    (Interpreter::new(graph(Phase::Idle), sensors.clone()), sensors)
}

fn record(interpreter: &Interpreter<Kettle>) -> Arc<Mutex<Vec<Snap>>> {
    let published = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&published);
    let _ = interpreter.subscribe(move |snapshot: &Snap| recorder.lock().push(snapshot.clone()));
    published
}

#[tokio::test(start_paused = true)]
async fn self_transition_restarts_delay() {
    let (interpreter, _) = kettle();
    interpreter.start().unwrap();
    interpreter.send(Knob::Press).unwrap();

    sleep(Duration::from_millis(60)).await;
    interpreter.send(Knob::Press).unwrap();
    assert_eq!(interpreter.snapshot().context.entries, 2);

    sleep(Duration::from_millis(60)).await;
    assert_eq!(interpreter.snapshot().state, Phase::Heating);

    sleep(Duration::from_millis(50)).await;
    let snapshot = interpreter.snapshot();
    assert_eq!(snapshot.state, Phase::Idle);
    assert_eq!(snapshot.context.timeouts, 1);
}

#[tokio::test(start_paused = true)]
async fn internal_transition_keeps_delay() {
    let (interpreter, _) = kettle();
    interpreter.start().unwrap();
    interpreter.send(Knob::Press).unwrap();
    let published = record(&interpreter);
    let recorded = interpreter.history().len();

    sleep(Duration::from_millis(60)).await;
    interpreter.send(Knob::Nudge).unwrap();

    let snapshot = interpreter.snapshot();
    assert_eq!(snapshot.state, Phase::Heating);
    assert_eq!(snapshot.context.nudges, 1);
    assert_eq!(snapshot.context.entries, 1);
    assert_eq!(interpreter.history().len(), recorded);
    assert_eq!(published.lock().len(), 1);

    sleep(Duration::from_millis(50)).await;
    assert_eq!(interpreter.snapshot().state, Phase::Idle);
    assert_eq!(interpreter.snapshot().context.timeouts, 1);
}

#[tokio::test(start_paused = true)]
async fn service_output_reaches_done_transition() {
    let (interpreter, _) = kettle();
    interpreter.start().unwrap();

    interpreter.send(Knob::Brew).unwrap();
    assert_eq!(interpreter.snapshot().state, Phase::Brewing);
    sleep(BREW * 2).await;

    let snapshot = interpreter.snapshot();
    assert_eq!(snapshot.state, Phase::Idle);
    assert_eq!(snapshot.context.brewed, Some(7));
    assert_eq!(snapshot.context.failure, None);
}

#[tokio::test(start_paused = true)]
async fn service_error_reaches_error_transition() {
    let (interpreter, sensors) = kettle();
    sensors.dry.store(true, Ordering::SeqCst);
    interpreter.start().unwrap();

    interpreter.send(Knob::Brew).unwrap();
    sleep(BREW * 2).await;

    let snapshot = interpreter.snapshot();
    assert_eq!(snapshot.state, Phase::Idle);
    assert_eq!(snapshot.context.failure.as_deref(), Some("boiled dry"));
    assert_eq!(snapshot.context.brewed, None);
}

#[tokio::test(start_paused = true)]
async fn service_of_exited_state_is_ignored() {
    let (interpreter, _) = kettle();
    interpreter.start().unwrap();
    interpreter.send(Knob::Brew).unwrap();
    interpreter.send(Knob::Press).unwrap();

    interpreter.send(Knob::Brew).unwrap();
    sleep(BREW / 2).await;
    interpreter.send(Knob::Press).unwrap();
    let published = record(&interpreter);
    sleep(BREW * 4).await;

    assert_eq!(interpreter.snapshot().state, Phase::Idle);
    assert_eq!(interpreter.snapshot().context.brewed, None);
    assert!(published.lock().is_empty());
}

#[tokio::test(start_paused = true)]
async fn failing_service_outcome_fails_the_interpreter() {
    let (interpreter, sensors) = kettle();
    interpreter.start().unwrap();
    sensors.stuck.store(true, Ordering::SeqCst);
    interpreter.send(Knob::Brew).unwrap();
    let published = record(&interpreter);

    sleep(BREW * 2).await;

    assert_eq!(interpreter.status(), Status::Failed);
    assert_eq!(
        interpreter.fault(),
        Some(InterpreterError::EffectFailed {
            state: "Brewing".to_string(),
            action: "pour",
            source: ActionError::new("spout is blocked"),
        })
    );
    {
        let published = published.lock();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].state, Phase::Brewing);
        assert_eq!(published[0].status, Status::Failed);
        assert_eq!(published[0].context.brewed, None);
    }

    sensors.stuck.store(false, Ordering::SeqCst);
    interpreter.send(Knob::Press).unwrap();
    interpreter.stop();
    assert_eq!(interpreter.snapshot().state, Phase::Brewing);
    assert_eq!(interpreter.status(), Status::Failed);
    assert_eq!(published.lock().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn final_state_completes_the_interpreter() {
    let (interpreter, _) = kettle();
    let published = record(&interpreter);
    interpreter.start().unwrap();

    interpreter.send(Knob::Finish).unwrap();
    assert_eq!(interpreter.status(), Status::Done);

    interpreter.send(Knob::Press).unwrap();

    let published = published.lock().clone();
    assert_eq!(published.len(), 2);
    assert_eq!(published[1].state, Phase::Off);
    assert_eq!(published[1].status, Status::Done);
    assert_eq!(interpreter.snapshot().state, Phase::Off);
}

#[tokio::test(start_paused = true)]
async fn eventless_cycle_fails_start() {
    let interpreter = Interpreter::with_options(
        graph(Phase::Ping),
        Sensors::default(),
        InterpreterOptions::default().with_max_microsteps(4),
    );
    let published = record(&interpreter);

    let err = interpreter.start().unwrap_err();

    assert!(matches!(err, InterpreterError::MicrostepLimit { limit: 4, .. }));
    assert_eq!(interpreter.status(), Status::NotStarted);
    assert!(published.lock().is_empty());
    assert!(interpreter.history().is_empty());
}

#[tokio::test(start_paused = true)]
async fn eventless_cycle_abandons_the_step() {
    let (interpreter, _) = kettle();
    interpreter.start().unwrap();

    let err = interpreter.send(Knob::Spin).unwrap_err();

    assert!(matches!(err, InterpreterError::MicrostepLimit { .. }));
    assert_eq!(interpreter.snapshot().state, Phase::Idle);
    assert_eq!(interpreter.status(), Status::Running);
}

#[tokio::test(start_paused = true)]
async fn failing_effect_leaves_state_untouched() {
    let (interpreter, sensors) = kettle();
    interpreter.start().unwrap();
    interpreter.send(Knob::Press).unwrap();
    let published = record(&interpreter);
    let before = interpreter.snapshot();

    sensors.stuck.store(true, Ordering::SeqCst);
    let err = interpreter.send(Knob::Hold).unwrap_err();

    assert_eq!(
        err,
        InterpreterError::EffectFailed {
            state: "Heating".to_string(),
            action: "release",
            source: ActionError::new("knob is stuck"),
        }
    );
    assert_eq!(interpreter.snapshot(), before);
    assert!(published.lock().is_empty());

    // The timer of the live instance is still armed.
    sleep(HEAT + Duration::from_millis(10)).await;
    assert_eq!(interpreter.snapshot().state, Phase::Idle);
}

#[tokio::test(start_paused = true)]
async fn send_from_a_subscriber_is_queued() {
    let (interpreter, _) = kettle();
    let published = record(&interpreter);
    let nested = Arc::new(Mutex::new(Vec::new()));

    let handle = interpreter.clone();
    let results = Arc::clone(&nested);
    let _ = interpreter.subscribe(move |snapshot: &Snap| {
        if snapshot.state == Phase::Heating && snapshot.context.nudges == 0 {
            let result = handle.send(Knob::Nudge);
            // The outer send has not finished yet.
            results.lock().push((result, handle.snapshot().context.nudges));
        }
    });

    interpreter.start().unwrap();
    interpreter.send(Knob::Press).unwrap();

    assert_eq!(nested.lock().clone(), vec![(Ok(()), 0)]);
    let states: Vec<_> = published
        .lock()
        .iter()
        .map(|s| (s.state, s.context.nudges))
        .collect();
    assert_eq!(
        states,
        vec![(Phase::Idle, 0), (Phase::Heating, 0), (Phase::Heating, 1)]
    );

    interpreter.stop();
}

#[tokio::test(start_paused = true)]
async fn unsubscribing_during_delivery() {
    let (interpreter, _) = kettle();
    let once = Arc::new(AtomicUsize::new(0));
    let always = Arc::new(AtomicUsize::new(0));
    let slot: Arc<Mutex<Option<Subscription<Kettle>>>> = Arc::new(Mutex::new(None));

    let calls = Arc::clone(&once);
    let own = Arc::clone(&slot);
    let subscription = interpreter.subscribe(move |_: &Snap| {
        calls.fetch_add(1, Ordering::SeqCst);
        if let Some(subscription) = own.lock().take() {
            assert!(subscription.unsubscribe());
        }
    });
    *slot.lock() = Some(subscription);

    let calls = Arc::clone(&always);
    let _ = interpreter.subscribe(move |_: &Snap| {
        calls.fetch_add(1, Ordering::SeqCst);
    });

    interpreter.start().unwrap();
    interpreter.send(Knob::Press).unwrap();

    assert_eq!(once.load(Ordering::SeqCst), 1);
    assert_eq!(always.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn stop_is_idempotent() {
    let (interpreter, _) = kettle();
    let published = record(&interpreter);
    interpreter.start().unwrap();
    interpreter.send(Knob::Press).unwrap();

    interpreter.stop();
    interpreter.stop();
    sleep(HEAT * 2).await;

    let published = published.lock().clone();
    assert_eq!(published.len(), 3);
    assert_eq!(published[2].status, Status::Stopped);
    assert_eq!(published[2].state, Phase::Heating);
    assert_eq!(interpreter.snapshot().context.timeouts, 0);
    assert_eq!(interpreter.start().err(), Some(InterpreterError::AlreadyStarted));
}

#[test]
fn stop_before_start_is_final() {
    let (interpreter, _) = kettle();

    interpreter.stop();

    assert_eq!(interpreter.status(), Status::Stopped);
    assert_eq!(interpreter.send(Knob::Press), Ok(()));
    assert_eq!(interpreter.start().err(), Some(InterpreterError::AlreadyStarted));
}

#[tokio::test(start_paused = true)]
async fn unmatched_event_publishes_nothing() {
    let (interpreter, _) = kettle();
    interpreter.start().unwrap();
    let published = record(&interpreter);

    interpreter.send(Knob::Nudge).unwrap();
    interpreter.send(Knob::Hold).unwrap();

    assert!(published.lock().is_empty());
    assert!(interpreter.history().is_empty());
    assert_eq!(interpreter.snapshot().state, Phase::Idle);
}

#[tokio::test(start_paused = true)]
async fn history_is_bounded_by_options() {
    let interpreter = Interpreter::with_options(
        graph(Phase::Idle),
        Sensors::default(),
        InterpreterOptions::default().with_history_limit(3),
    );
    interpreter.start().unwrap();

    for _ in 0..5 {
        interpreter.send(Knob::Press).unwrap();
        interpreter.send(Knob::Hold).unwrap();
    }

    let history = interpreter.history();
    assert_eq!(history.len(), 3);
    let triggers: Vec<_> = history.transitions().map(|t| t.trigger.clone()).collect();
    assert_eq!(triggers, vec!["Hold", "Press", "Hold"]);
    assert_eq!(interpreter.snapshot().context.entries, 5);
}
