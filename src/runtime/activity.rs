//! Invoked services and delayed transitions of the live state instance.
//!
//! Both run as tokio tasks that report back through a delivery callback
//! with an event tagged by the instance's [`Origin`]. Exiting the instance
//! aborts the tasks; anything that still slips through is rejected by the
//! interpreter's generation check.

use crate::core::{Event, Machine, Origin};
use std::time::Duration;
use stillwater::effect::BoxedEffect;
use stillwater::prelude::*;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;

/// Tasks owned by the live state instance.
#[derive(Default)]
pub(crate) struct Activities {
    handles: Vec<AbortHandle>,
}

impl Activities {
    pub fn track(&mut self, handle: AbortHandle) {
        self.handles.push(handle);
    }

    /// Abort every tracked task. Returns how many were still running.
    pub fn cancel(&mut self) -> usize {
        self.handles
            .drain(..)
            .filter(|handle| !handle.is_finished())
            .map(|handle| handle.abort())
            .count()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl Drop for Activities {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Run a service effect and deliver `Done` or `Failed` for `origin`.
pub(crate) fn spawn_service<M, D>(
    runtime: &Handle,
    service: BoxedEffect<M::Output, M::Error, M::Env>,
    env: M::Env,
    origin: Origin<M::State>,
    deliver: D,
) -> AbortHandle
where
    M: Machine,
    D: FnOnce(Event<M>) + Send + 'static,
{
    runtime
        .spawn(async move {
            let event = match service.run(&env).await {
                Ok(output) => Event::Done { origin, output },
                Err(error) => Event::Failed { origin, error },
            };
            deliver(event);
        })
        .abort_handle()
}

/// Deliver `After` for `origin` once `delay` has elapsed.
pub(crate) fn spawn_timer<M, D>(
    runtime: &Handle,
    delay: Duration,
    origin: Origin<M::State>,
    deliver: D,
) -> AbortHandle
where
    M: Machine,
    D: FnOnce(Event<M>) + Send + 'static,
{
    runtime
        .spawn(async move {
            tokio::time::sleep(delay).await;
            deliver(Event::After { origin });
        })
        .abort_handle()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Generation, MachineEvent};
    use crate::state_enum;
    use tokio::sync::mpsc;

    state_enum! {
        enum Fetch {
            Loading,
        }
    }

    #[derive(Debug)]
    struct Nothing;

    impl MachineEvent for Nothing {
        type Kind = ();

        fn kind(&self) {}
    }

    struct FetchMachine;

    impl Machine for FetchMachine {
        type State = Fetch;
        type Context = ();
        type Event = Nothing;
        type Output = u32;
        type Error = String;
        type Env = u32;
    }

    fn origin() -> Origin<Fetch> {
        Origin {
            state: Fetch::Loading,
            generation: Generation::default().next(),
        }
    }

    fn channel() -> (
        impl FnOnce(Event<FetchMachine>) + Send + 'static,
        mpsc::UnboundedReceiver<Event<FetchMachine>>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            move |event| {
                let _ = tx.send(event);
            },
            rx,
        )
    }

    #[tokio::test]
    async fn service_success_is_delivered_as_done() {
        let (deliver, mut rx) = channel();
        let service = from_fn(|base: &u32| Ok::<_, String>(base * 2)).boxed();

        spawn_service::<FetchMachine, _>(&Handle::current(), service, 21, origin(), deliver);

        match rx.recv().await {
            Some(Event::Done { origin: from, output }) => {
                assert_eq!(from, origin());
                assert_eq!(output, 42);
            }
            other => panic!("unexpected delivery: {other:?}"),
        }
    }

    #[tokio::test]
    async fn service_failure_is_delivered_as_failed() {
        let (deliver, mut rx) = channel();
        let service: BoxedEffect<u32, String, u32> = fail("unreachable".to_string()).boxed();

        spawn_service::<FetchMachine, _>(&Handle::current(), service, 0, origin(), deliver);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.error().map(String::as_str), Some("unreachable"));
    }

    #[tokio::test(start_paused = true)]
    async fn timer_fires_after_delay() {
        let (deliver, mut rx) = channel();

        spawn_timer::<FetchMachine, _>(
            &Handle::current(),
            Duration::from_secs(30),
            origin(),
            deliver,
        );

        tokio::time::sleep(Duration::from_secs(29)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(matches!(rx.try_recv(), Ok(Event::After { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_activities_never_deliver() {
        let (deliver, mut rx) = channel();
        let mut activities = Activities::default();
        activities.track(spawn_timer::<FetchMachine, _>(
            &Handle::current(),
            Duration::from_secs(1),
            origin(),
            deliver,
        ));

        assert_eq!(activities.cancel(), 1);
        assert!(activities.is_empty());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.recv().await.is_none());
    }
}
