//! Run-to-completion interpreter.

use crate::core::{
    Event, Generation, Machine, MachineSnapshot, Origin, Snapshot, State, StateHistory, Status,
};
use crate::graph::StateGraph;
use crate::runtime::activity::{spawn_service, spawn_timer, Activities};
use crate::runtime::error::InterpreterError;
use crate::runtime::options::InterpreterOptions;
use crate::runtime::step::{Step, Stepper};
use crate::runtime::subscription::{Subscribers, Subscription};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use uuid::Uuid;

/// A live instance of a [`StateGraph`].
///
/// The interpreter owns the current state and context, a FIFO mailbox and
/// the activities of the live state instance. Events are processed one at a
/// time, each to completion, by whichever caller finds the mailbox idle.
/// Guards, actions and listeners run without any internal lock held, so they
/// may call back into the interpreter; events sent that way are queued
/// behind the one being processed.
///
/// Cloning yields another handle to the same instance. Services and timers
/// only hold weak references, so dropping the last handle cancels them.
///
/// # Example
///
/// ```rust
/// use keystate::builder::{MachineBuilder, StateNodeBuilder, TransitionBuilder};
/// use keystate::core::{Machine, MachineEvent, Status};
/// use keystate::runtime::Interpreter;
/// use keystate::state_enum;
///
/// state_enum! {
///     pub enum Door {
///         Closed,
///         Open,
///     }
/// }
///
/// #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
/// pub enum DoorEvent {
///     Push,
///     Pull,
/// }
///
/// impl MachineEvent for DoorEvent {
///     type Kind = DoorEvent;
///     fn kind(&self) -> DoorEvent {
///         *self
///     }
/// }
///
/// pub struct DoorMachine;
///
/// impl Machine for DoorMachine {
///     type State = Door;
///     type Context = u32;
///     type Event = DoorEvent;
///     type Output = ();
///     type Error = ();
///     type Env = ();
/// }
///
/// let graph = MachineBuilder::<DoorMachine>::new("door")
///     .initial(Door::Closed)
///     .context(0)
///     .state(StateNodeBuilder::new(Door::Closed).on(
///         DoorEvent::Push,
///         TransitionBuilder::new()
///             .to(Door::Open)
///             .assign("count", |opened: &u32, _| opened + 1),
///     ))
///     .state(StateNodeBuilder::new(Door::Open).on(
///         DoorEvent::Pull,
///         TransitionBuilder::new().to(Door::Closed),
///     ))
///     .build()
///     .unwrap();
///
/// let door = Interpreter::new(graph, ());
/// door.start().unwrap();
/// door.send(DoorEvent::Push).unwrap();
///
/// let snapshot = door.snapshot();
/// assert_eq!(snapshot.state, Door::Open);
/// assert_eq!(snapshot.context, 1);
/// assert_eq!(snapshot.status, Status::Running);
/// ```
pub struct Interpreter<M: Machine> {
    shared: Arc<Shared<M>>,
}

impl<M: Machine> Clone for Interpreter<M> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

struct Shared<M: Machine> {
    id: Uuid,
    graph: Arc<StateGraph<M>>,
    env: M::Env,
    options: InterpreterOptions,
    core: Mutex<Core<M>>,
    mailbox: Mutex<VecDeque<Event<M>>>,
    draining: AtomicBool,
    subscribers: Arc<Subscribers<M>>,
}

/// Mutable interpreter state, only touched under the `core` lock.
struct Core<M: Machine> {
    status: Status,
    state: M::State,
    context: M::Context,
    generation: Generation,
    activities: Activities,
    history: StateHistory<M::State>,
    runtime: Option<Handle>,
    fault: Option<InterpreterError>,
}

impl<M: Machine> Core<M> {
    fn snapshot(&self) -> MachineSnapshot<M> {
        Snapshot {
            state: self.state,
            context: self.context.clone(),
            status: self.status,
        }
    }

    fn origin(&self) -> Origin<M::State> {
        Origin {
            state: self.state,
            generation: self.generation,
        }
    }
}

impl<M: Machine> Interpreter<M> {
    /// Create an interpreter with default options. Nothing runs until
    /// [`start`](Self::start).
    pub fn new(graph: impl Into<Arc<StateGraph<M>>>, env: M::Env) -> Self {
        Self::with_options(graph, env, InterpreterOptions::default())
    }

    pub fn with_options(
        graph: impl Into<Arc<StateGraph<M>>>,
        env: M::Env,
        options: InterpreterOptions,
    ) -> Self {
        let graph = graph.into();
        let core = Core {
            status: Status::NotStarted,
            state: graph.initial(),
            context: graph.initial_context().clone(),
            generation: Generation::default(),
            activities: Activities::default(),
            history: StateHistory::bounded(options.history_limit),
            runtime: None,
            fault: None,
        };

        Self {
            shared: Arc::new(Shared {
                id: Uuid::new_v4(),
                graph,
                env,
                options,
                core: Mutex::new(core),
                mailbox: Mutex::new(VecDeque::new()),
                draining: AtomicBool::new(false),
                subscribers: Arc::new(Subscribers::new()),
            }),
        }
    }

    /// Unique id of this instance, used in log fields.
    pub fn id(&self) -> Uuid {
        self.shared.id
    }

    /// Id of the graph this instance runs.
    pub fn machine_id(&self) -> &str {
        self.shared.graph.id()
    }

    pub fn options(&self) -> &InterpreterOptions {
        &self.shared.options
    }

    pub fn status(&self) -> Status {
        self.shared.core.lock().status
    }

    /// The current state, context and status.
    pub fn snapshot(&self) -> MachineSnapshot<M> {
        self.shared.core.lock().snapshot()
    }

    /// The error that moved the interpreter to [`Status::Failed`], if any.
    pub fn fault(&self) -> Option<InterpreterError> {
        self.shared.core.lock().fault.clone()
    }

    /// Transitions taken so far, oldest first, up to the history limit.
    pub fn history(&self) -> StateHistory<M::State> {
        self.shared.core.lock().history.clone()
    }

    /// Enter the initial state and settle it.
    ///
    /// Runs the initial state's entry actions with [`Event::Init`], follows
    /// eventless transitions, starts the settled state's service and timer
    /// and publishes the first snapshot, which is also returned. On failure
    /// nothing is committed and the interpreter stays startable.
    ///
    /// Must be called inside a tokio runtime if any state invokes a service
    /// or arms a delay.
    pub fn start(&self) -> Result<MachineSnapshot<M>, InterpreterError> {
        let shared = &self.shared;
        {
            let mut core = shared.core.lock();
            if core.status != Status::NotStarted {
                return Err(InterpreterError::AlreadyStarted);
            }
            let runtime = Handle::try_current().ok();
            if runtime.is_none() && shared.graph.requires_runtime() {
                return Err(InterpreterError::NoRuntime);
            }
            core.status = Status::Running;
            core.runtime = runtime;
            shared.draining.store(true, Ordering::Release);
        }

        let stepped = Stepper::new(&shared.graph, &shared.env, shared.options.max_microsteps)
            .initial();
        let step = match stepped {
            Ok(step) => step,
            Err(err) => {
                {
                    let mut core = shared.core.lock();
                    core.status = Status::NotStarted;
                    core.runtime = None;
                }
                shared.mailbox.lock().clear();
                shared.draining.store(false, Ordering::Release);
                tracing::warn!(
                    machine = shared.graph.id(),
                    interpreter = %shared.id,
                    error = %err,
                    "interpreter failed to start"
                );
                return Err(err);
            }
        };

        let snapshot = match self.commit(step) {
            Some(snapshot) => {
                tracing::info!(
                    machine = shared.graph.id(),
                    interpreter = %shared.id,
                    state = snapshot.state.name(),
                    "interpreter started"
                );
                shared.subscribers.notify(&snapshot);
                snapshot
            }
            None => self.snapshot(),
        };

        shared.draining.store(false, Ordering::Release);
        if let Err(err) = self.drain() {
            tracing::error!(
                machine = shared.graph.id(),
                interpreter = %shared.id,
                error = %err,
                "event queued during start failed"
            );
        }
        Ok(snapshot)
    }

    /// Send an event.
    ///
    /// While running, the event is queued and, unless another caller is
    /// already processing the mailbox, every queued event is processed
    /// before this returns. The first error met while draining is returned;
    /// later events are still processed. Events sent to a stopped, done or
    /// failed interpreter are dropped.
    pub fn send(&self, event: M::Event) -> Result<(), InterpreterError> {
        self.enqueue(Event::External(event))
    }

    /// Stop the interpreter.
    ///
    /// Cancels the live service and timer, publishes a final snapshot with
    /// [`Status::Stopped`], then releases every subscription and queued
    /// event. Calling it again, or on a failed interpreter, does nothing.
    pub fn stop(&self) {
        let shared = &self.shared;
        let snapshot = {
            let mut core = shared.core.lock();
            if matches!(core.status, Status::Stopped | Status::Failed) {
                return;
            }
            core.activities.cancel();
            core.status = Status::Stopped;
            core.snapshot()
        };
        shared.mailbox.lock().clear();

        tracing::info!(
            machine = shared.graph.id(),
            interpreter = %shared.id,
            state = snapshot.state.name(),
            "interpreter stopped"
        );
        shared.subscribers.notify(&snapshot);
        shared.subscribers.clear();
    }

    /// Register a listener for every snapshot published from now on.
    pub fn subscribe<F>(&self, listener: F) -> Subscription<M>
    where
        F: Fn(&MachineSnapshot<M>) + Send + Sync + 'static,
    {
        let registry = &self.shared.subscribers;
        let id = registry.add(Arc::new(listener));
        Subscription::new(id, registry)
    }

    fn enqueue(&self, event: Event<M>) -> Result<(), InterpreterError> {
        match self.status() {
            Status::NotStarted => return Err(InterpreterError::NotStarted),
            Status::Done | Status::Stopped | Status::Failed => {
                self.dropped(&event);
                return Ok(());
            }
            Status::Running => {}
        }
        self.shared.mailbox.lock().push_back(event);
        self.drain()
    }

    /// Process queued events until the mailbox is empty, unless another
    /// caller is already doing so.
    fn drain(&self) -> Result<(), InterpreterError> {
        let shared = &self.shared;
        let mut first_error = None;

        while shared
            .draining
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            loop {
                let next = shared.mailbox.lock().pop_front();
                let Some(event) = next else {
                    break;
                };
                if let Err(err) = self.process(event) {
                    first_error.get_or_insert(err);
                }
            }
            shared.draining.store(false, Ordering::Release);

            // An event queued between the last pop and the release would
            // otherwise wait for the next send.
            if shared.mailbox.lock().is_empty() {
                break;
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    /// Run one macrostep for `event` and commit it.
    fn process(&self, event: Event<M>) -> Result<(), InterpreterError> {
        let shared = &self.shared;
        let (state, context) = {
            let core = shared.core.lock();
            if core.status != Status::Running {
                drop(core);
                self.dropped(&event);
                return Ok(());
            }
            if let Some(origin) = event.origin() {
                if origin != core.origin() {
                    tracing::debug!(
                        machine = shared.graph.id(),
                        interpreter = %shared.id,
                        state = origin.state.name(),
                        generation = %origin.generation,
                        event = %event.label(),
                        "discarding outcome of exited state"
                    );
                    return Ok(());
                }
            }
            (core.state, core.context.clone())
        };

        let step = Stepper::new(&shared.graph, &shared.env, shared.options.max_microsteps)
            .react(state, context, &event)
            .inspect_err(|err| {
                tracing::warn!(
                    machine = shared.graph.id(),
                    interpreter = %shared.id,
                    state = state.name(),
                    event = %event.label(),
                    error = %err,
                    "step abandoned"
                );
                // Nothing would resend an activity outcome.
                if event.origin().is_some() {
                    self.fail(err);
                }
            })?;

        if let Some(snapshot) = self.commit(step) {
            shared.subscribers.notify(&snapshot);
        }
        Ok(())
    }

    /// Apply a computed step. Returns the snapshot to publish, or `None`
    /// when nothing was taken or the interpreter stopped meanwhile.
    fn commit(&self, step: Step<M>) -> Option<MachineSnapshot<M>> {
        let shared = &self.shared;
        let mut core = shared.core.lock();
        if core.status != Status::Running || !step.taken {
            return None;
        }

        let Step {
            state,
            context,
            entry,
            records,
            ..
        } = step;
        let from = core.state;
        core.state = state;
        core.context = context;
        for record in records {
            core.history = core.history.record(record);
        }

        if let Some(entry) = entry {
            core.activities.cancel();
            core.generation = core.generation.next();
            let origin = core.origin();

            if state.is_final() {
                core.status = Status::Done;
            } else if let Some(runtime) = core.runtime.clone() {
                if let Some(service) = entry.service {
                    let handle = spawn_service::<M, _>(
                        &runtime,
                        service,
                        shared.env.clone(),
                        origin,
                        self.deliverer(),
                    );
                    core.activities.track(handle);
                }
                if let Some(delay) = entry.delay {
                    let handle =
                        spawn_timer::<M, _>(&runtime, delay, origin, self.deliverer());
                    core.activities.track(handle);
                }
            }

            tracing::info!(
                machine = shared.graph.id(),
                interpreter = %shared.id,
                from = from.name(),
                to = state.name(),
                generation = %core.generation,
                "state entered"
            );
        }

        Some(core.snapshot())
    }

    /// Move to [`Status::Failed`] after an activity outcome could not be
    /// processed. Publishes the failed snapshot, then releases every
    /// subscription and queued event like [`stop`](Self::stop).
    fn fail(&self, err: &InterpreterError) {
        let shared = &self.shared;
        let snapshot = {
            let mut core = shared.core.lock();
            if core.status != Status::Running {
                return;
            }
            core.activities.cancel();
            core.status = Status::Failed;
            core.fault = Some(err.clone());
            core.snapshot()
        };
        shared.mailbox.lock().clear();

        tracing::error!(
            machine = shared.graph.id(),
            interpreter = %shared.id,
            state = snapshot.state.name(),
            error = %err,
            "interpreter failed"
        );
        shared.subscribers.notify(&snapshot);
        shared.subscribers.clear();
    }

    /// Callback used by activities to feed their outcome back in.
    fn deliverer(&self) -> impl FnOnce(Event<M>) + Send + 'static {
        let shared: Weak<Shared<M>> = Arc::downgrade(&self.shared);
        move |event| {
            let Some(shared) = shared.upgrade() else {
                return;
            };
            let interpreter = Interpreter { shared };
            if let Err(err) = interpreter.enqueue(event) {
                tracing::error!(
                    machine = interpreter.machine_id(),
                    interpreter = %interpreter.id(),
                    error = %err,
                    "background delivery failed"
                );
            }
        }
    }

    fn dropped(&self, event: &Event<M>) {
        tracing::debug!(
            machine = self.shared.graph.id(),
            interpreter = %self.shared.id,
            event = %event.label(),
            "interpreter is not running, dropping event"
        );
    }
}
