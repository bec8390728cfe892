//! Structural checks over a machine's transition graph.
//!
//! Uses Stillwater's `Validation` so that every problem is reported in one
//! pass instead of stopping at the first one. Guards are opaque, so the
//! checks treat every guarded transition as possibly eligible.

use crate::core::{StateId, Transition};
use crate::machine::Machine;
use std::collections::{BTreeSet, VecDeque};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

/// A structural problem in a machine definition.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GraphViolation {
    #[error("Transition #{index} can never fire: #{shadowed_by} is unguarded for the same source and event")]
    ShadowedTransition { index: usize, shadowed_by: usize },

    #[error("State {state} is unreachable from initial state {initial}")]
    UnreachableState { state: StateId, initial: StateId },

    #[error("Handler for state {state} never fires: no transition enters it")]
    HandlerNeverFires { state: StateId },
}

type Check = Validation<(), NonEmptyVec<GraphViolation>>;

/// Run every check, accumulating ALL violations.
///
/// # Example
///
/// ```rust
/// use fluxstate::graph::{validate, GraphViolation};
/// use fluxstate::{Machine, Transition};
/// use stillwater::validation::Validation;
///
/// let mut ctx = ();
/// let mut machine = Machine::new(0, &mut ctx);
/// machine.add_transition(Transition::new(0, 1, 1)).unwrap();
/// machine.add_transition(Transition::new(0, 1, 2)).unwrap();
///
/// match validate(&machine) {
///     Validation::Failure(errors) => {
///         assert!(errors.iter().any(|e| matches!(
///             e,
///             GraphViolation::ShadowedTransition { index: 1, shadowed_by: 0 }
///         )));
///     }
///     Validation::Success(_) => panic!("expected a shadowed transition"),
/// }
/// ```
pub fn validate<C>(machine: &Machine<'_, C>) -> Check {
    let transitions: Vec<&Transition<C>> = machine.transitions().iter().collect();

    let mut checks: Vec<Check> = Vec::new();
    checks.extend(check_shadowed(&transitions));
    checks.extend(check_reachable(machine.initial_state(), &transitions));
    checks.extend(
        machine
            .handlers()
            .states()
            .into_iter()
            .map(|state| check_handler_fires(state, &transitions)),
    );

    Validation::all_vec(checks).map(|_| ())
}

fn check_shadowed<C>(transitions: &[&Transition<C>]) -> Vec<Check> {
    transitions
        .iter()
        .enumerate()
        .map(|(index, later)| {
            let shadowing = transitions[..index].iter().position(|earlier| {
                !earlier.is_guarded()
                    && earlier.event == later.event
                    && (earlier.from == later.from || earlier.from.is_any())
            });
            match shadowing {
                Some(shadowed_by) => Validation::fail(GraphViolation::ShadowedTransition {
                    index,
                    shadowed_by,
                }),
                None => Validation::success(()),
            }
        })
        .collect()
}

fn check_reachable<C>(initial: StateId, transitions: &[&Transition<C>]) -> Vec<Check> {
    let mut reached = BTreeSet::from([initial]);
    let mut queue = VecDeque::from([initial]);

    while let Some(state) = queue.pop_front() {
        for transition in transitions {
            if transition.from.admits(state) && reached.insert(transition.to) {
                queue.push_back(transition.to);
            }
        }
    }

    let mentioned: BTreeSet<StateId> = transitions
        .iter()
        .flat_map(|t| t.from.state().into_iter().chain([t.to]))
        .collect();

    mentioned
        .into_iter()
        .map(|state| {
            if reached.contains(&state) {
                Validation::success(())
            } else {
                Validation::fail(GraphViolation::UnreachableState { state, initial })
            }
        })
        .collect()
}

fn check_handler_fires<C>(state: StateId, transitions: &[&Transition<C>]) -> Check {
    if transitions.iter().any(|t| t.to == state) {
        Validation::success(())
    } else {
        Validation::fail(GraphViolation::HandlerNeverFires { state })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Handler;

    struct Ctx {
        ready: bool,
    }

    fn violations<C>(machine: &Machine<'_, C>) -> Vec<GraphViolation> {
        match validate(machine) {
            Validation::Success(_) => Vec::new(),
            Validation::Failure(errors) => errors.into_vec(),
        }
    }

    #[test]
    fn well_formed_machine_passes() {
        let mut ctx = Ctx { ready: true };
        let mut machine = Machine::new(0, &mut ctx);
        machine
            .add_transition(Transition::new(0, 0, 1).when(|c: &Ctx| c.ready))
            .unwrap();
        machine.add_transition(Transition::new(0, 0, 2)).unwrap();
        machine.add_transition(Transition::new(1, 1, 0)).unwrap();
        machine.add_transition(Transition::new(2, 1, 0)).unwrap();
        machine
            .set_handler(2, Handler::new(|_: &mut Ctx, _| {}))
            .unwrap();

        assert!(validate(&machine).is_success());
    }

    #[test]
    fn guarded_earlier_transition_does_not_shadow() {
        let mut ctx = Ctx { ready: false };
        let mut machine = Machine::new(0, &mut ctx);
        machine
            .add_transition(Transition::new(0, 0, 1).when(|c: &Ctx| c.ready))
            .unwrap();
        machine.add_transition(Transition::new(0, 0, 1)).unwrap();

        assert!(violations(&machine).is_empty());
    }

    #[test]
    fn unguarded_wildcard_shadows_later_concrete_transition() {
        let mut ctx = Ctx { ready: true };
        let mut machine = Machine::new(0, &mut ctx);
        machine.add_transition(Transition::from_any(5, 0)).unwrap();
        machine.add_transition(Transition::new(0, 5, 0)).unwrap();

        assert_eq!(
            violations(&machine),
            vec![GraphViolation::ShadowedTransition {
                index: 1,
                shadowed_by: 0
            }]
        );
    }

    #[test]
    fn minus_one_source_shadows_only_itself() {
        let mut ctx = Ctx { ready: true };
        let mut machine = Machine::new(-1, &mut ctx);
        machine.add_transition(Transition::new(-1, 5, 0)).unwrap();
        machine.add_transition(Transition::new(0, 5, -1)).unwrap();

        assert!(violations(&machine).is_empty());
    }

    #[test]
    fn validation_accumulates_all_violations() {
        let mut ctx = Ctx { ready: true };
        let mut machine = Machine::new(0, &mut ctx);
        machine.add_transition(Transition::new(0, 1, 1)).unwrap();
        machine.add_transition(Transition::new(0, 1, 2)).unwrap();
        machine.add_transition(Transition::new(7, 1, 8)).unwrap();
        machine
            .set_handler(0, Handler::new(|_: &mut Ctx, _| {}))
            .unwrap();

        let found = violations(&machine);

        assert!(found.contains(&GraphViolation::ShadowedTransition {
            index: 1,
            shadowed_by: 0
        }));
        assert!(found.contains(&GraphViolation::UnreachableState {
            state: StateId(7),
            initial: StateId(0)
        }));
        assert!(found.contains(&GraphViolation::UnreachableState {
            state: StateId(8),
            initial: StateId(0)
        }));
        assert!(found.contains(&GraphViolation::HandlerNeverFires { state: StateId(0) }));
        // State 2 is reachable in the graph even though the shadowed edge
        // cannot fire: reachability ignores ordering.
        assert!(!found.contains(&GraphViolation::UnreachableState {
            state: StateId(2),
            initial: StateId(0)
        }));
    }

    #[test]
    fn violation_messages_are_descriptive() {
        let message = GraphViolation::HandlerNeverFires { state: StateId(3) }.to_string();
        assert_eq!(message, "Handler for state 3 never fires: no transition enters it");
    }
}
