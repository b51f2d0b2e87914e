//! Invoked services.
//!
//! A service is an asynchronous operation owned by the state that declares
//! it. It is described as a stillwater effect over the machine environment
//! and created fresh on every entry into the state.

use crate::core::{Event, Machine};
use crate::effects::transition::Transition;
use std::sync::Arc;
use stillwater::effect::BoxedEffect;

/// Factory creating the service effect from the context and the event that
/// caused the state to be entered.
pub type ServiceFactory<M> = Arc<
    dyn Fn(
            &<M as Machine>::Context,
            &Event<M>,
        ) -> BoxedEffect<<M as Machine>::Output, <M as Machine>::Error, <M as Machine>::Env>
        + Send
        + Sync,
>;

/// A service declaration and the transitions its outcomes take.
pub struct Invoke<M: Machine> {
    pub id: &'static str,
    pub src: ServiceFactory<M>,
    pub on_done: Vec<Transition<M>>,
    pub on_error: Vec<Transition<M>>,
}

impl<M: Machine> Invoke<M> {
    /// Create a fresh effect for one state instance.
    pub fn create(
        &self,
        context: &M::Context,
        event: &Event<M>,
    ) -> BoxedEffect<M::Output, M::Error, M::Env> {
        (self.src)(context, event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MachineEvent;
    use crate::state_enum;
    use stillwater::prelude::*;

    state_enum! {
        enum Fetch {
            Loading,
        }
    }

    #[derive(Debug)]
    struct Reload;

    impl MachineEvent for Reload {
        type Kind = ();

        fn kind(&self) {}
    }

    #[derive(Clone)]
    struct Backend {
        answer: u32,
    }

    struct Fetcher;

    impl Machine for Fetcher {
        type State = Fetch;
        type Context = u32;
        type Event = Reload;
        type Output = u32;
        type Error = String;
        type Env = Backend;
    }

    fn invoke() -> Invoke<Fetcher> {
        Invoke {
            id: "fetch",
            src: Arc::new(|offset: &u32, _: &Event<Fetcher>| {
                let offset = *offset;
                from_fn(move |backend: &Backend| {
                    if offset > 100 {
                        Err("offset out of range".to_string())
                    } else {
                        Ok(backend.answer + offset)
                    }
                })
                .boxed()
            }),
            on_done: Vec::new(),
            on_error: Vec::new(),
        }
    }

    #[tokio::test]
    async fn service_effect_runs_against_environment() {
        let env = Backend { answer: 40 };

        let output = invoke().create(&2, &Event::Init).run(&env).await;

        assert_eq!(output, Ok(42));
    }

    #[tokio::test]
    async fn service_effect_reports_failure() {
        let env = Backend { answer: 40 };

        let output = invoke().create(&500, &Event::Init).run(&env).await;

        assert_eq!(output, Err("offset out of range".to_string()));
    }

    #[tokio::test]
    async fn each_entry_gets_a_fresh_effect() {
        let env = Backend { answer: 1 };
        let invoke = invoke();

        let first = invoke.create(&1, &Event::Init).run(&env).await;
        let second = invoke.create(&2, &Event::Init).run(&env).await;

        assert_eq!((first, second), (Ok(2), Ok(3)));
    }
}
