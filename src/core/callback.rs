//! Guard, action, and handler callbacks.
//!
//! Every callback receives the caller's context by reference. Guards see it
//! immutably; actions and handlers may mutate it. Each kind has an
//! infallible constructor matching the plain call signatures and a `try_`
//! constructor for callbacks that can signal failure.

use super::id::{EventId, StateId};
use std::error::Error;
use std::fmt;

/// Failure raised by a user callback.
pub type CallbackError = Box<dyn Error + Send + Sync + 'static>;

/// Snapshot of the dispatch in progress, handed to actions and handlers.
///
/// `current` is read from the machine at the moment the callback runs: it
/// still equals `from` inside an action and already equals `to` inside a
/// handler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Step {
    pub from: StateId,
    pub event: EventId,
    pub to: StateId,
    pub current: StateId,
}

type GuardFn<C> = Box<dyn Fn(&C) -> Result<bool, CallbackError> + Send + Sync>;
type ActionFn<C> = Box<dyn Fn(&mut C, &Step) -> Result<(), CallbackError> + Send + Sync>;
type HandlerFn<C> = Box<dyn Fn(&mut C, &Step) -> Result<(), CallbackError> + Send + Sync>;

/// Predicate that decides whether a transition is eligible.
///
/// # Example
///
/// ```rust
/// use fluxstate::Guard;
///
/// struct Battery {
///     level: u8,
/// }
///
/// let charged = Guard::new(|b: &Battery| b.level >= 90);
///
/// assert!(charged.check(&Battery { level: 95 }).unwrap());
/// assert!(!charged.check(&Battery { level: 40 }).unwrap());
/// ```
pub struct Guard<C> {
    predicate: GuardFn<C>,
}

impl<C> Guard<C> {
    /// Create a guard from a plain predicate.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Box::new(move |ctx| Ok(predicate(ctx))),
        }
    }

    /// Create a guard whose evaluation can fail.
    ///
    /// A failing guard aborts the dispatch; it is not treated as `false`.
    pub fn try_new<F>(predicate: F) -> Self
    where
        F: Fn(&C) -> Result<bool, CallbackError> + Send + Sync + 'static,
    {
        Guard {
            predicate: Box::new(predicate),
        }
    }

    /// Evaluate the guard against the context.
    pub fn check(&self, ctx: &C) -> Result<bool, CallbackError> {
        (self.predicate)(ctx)
    }
}

impl<C> fmt::Debug for Guard<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Guard(..)")
    }
}

/// Side effect run when a transition is taken, before the state changes.
pub struct Action<C> {
    run: ActionFn<C>,
}

impl<C> Action<C> {
    /// Create an action from a callback over the context.
    pub fn new<F>(action: F) -> Self
    where
        F: Fn(&mut C) + Send + Sync + 'static,
    {
        Action {
            run: Box::new(move |ctx, _| {
                action(ctx);
                Ok(())
            }),
        }
    }

    /// Create an action that also inspects the pending [`Step`].
    pub fn with_step<F>(action: F) -> Self
    where
        F: Fn(&mut C, &Step) + Send + Sync + 'static,
    {
        Action {
            run: Box::new(move |ctx, step| {
                action(ctx, step);
                Ok(())
            }),
        }
    }

    /// Create an action that can fail. A failure aborts the transition.
    pub fn try_new<F>(action: F) -> Self
    where
        F: Fn(&mut C, &Step) -> Result<(), CallbackError> + Send + Sync + 'static,
    {
        Action {
            run: Box::new(action),
        }
    }

    pub fn run(&self, ctx: &mut C, step: &Step) -> Result<(), CallbackError> {
        (self.run)(ctx, step)
    }
}

impl<C> fmt::Debug for Action<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Action(..)")
    }
}

/// Entry handler invoked after the machine commits to a state.
pub struct Handler<C> {
    run: HandlerFn<C>,
}

impl<C> Handler<C> {
    /// Create a handler from a callback over `(context, event)`.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&mut C, EventId) + Send + Sync + 'static,
    {
        Handler {
            run: Box::new(move |ctx, step| {
                handler(ctx, step.event);
                Ok(())
            }),
        }
    }

    /// Create a handler that receives the full [`Step`] and can fail.
    ///
    /// A failure is reported to the caller, but the state change it
    /// follows is already committed.
    pub fn try_new<F>(handler: F) -> Self
    where
        F: Fn(&mut C, &Step) -> Result<(), CallbackError> + Send + Sync + 'static,
    {
        Handler {
            run: Box::new(handler),
        }
    }

    pub fn run(&self, ctx: &mut C, step: &Step) -> Result<(), CallbackError> {
        (self.run)(ctx, step)
    }
}

impl<C> fmt::Debug for Handler<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Handler(..)")
    }
}
