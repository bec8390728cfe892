//! Event dispatch.

use super::{Machine, Outcome};
use crate::core::{EventId, StateId, Step, TransitionRecord};
use crate::error::{FsmError, Result};
use chrono::Utc;
use std::time::Instant;
use tracing::{debug, trace, warn};

/// Result of scanning the table for an event.
enum Selection {
    Chosen { index: usize, to: StateId },
    NoMatch,
    AllRejected(usize),
}

impl<C> Machine<'_, C> {
    /// Feed one event to the machine.
    ///
    /// 1. Candidates are the transitions registered for the current state
    ///    (or built with [`Transition::from_any`](crate::Transition::from_any))
    ///    and `event`, scanned in registration order. The first one whose guard passes is selected;
    ///    later candidates are fallbacks only.
    /// 2. No candidate at all gives [`Outcome::NoMatch`]; candidates that
    ///    were all rejected give [`Outcome::GuardRejected`]. Neither is an
    ///    error and neither changes anything.
    /// 3. The selected transition's action runs while the machine is still
    ///    in the source state. If it fails, the state is left unchanged.
    /// 4. The state is committed and recorded in history.
    /// 5. The entry handler of the new state runs, if one is registered. If
    ///    it fails, the error is returned but the commit stands.
    ///
    /// A guard that fails (as opposed to returning false) aborts the scan.
    /// The machine stays usable after any error.
    pub fn process_event(&mut self, event: impl Into<EventId>) -> Result<Outcome> {
        let event = event.into();
        self.stats.events += 1;

        if let Err(err) = self.config.check_event(event) {
            self.stats.invalid_events += 1;
            warn!(event = %event, "Rejected event outside configured range");
            return Err(err);
        }

        let state = self.current;
        let (index, to) = match self.select(event)? {
            Selection::Chosen { index, to } => (index, to),
            Selection::NoMatch => {
                self.stats.unmatched_events += 1;
                debug!(state = %state, event = %event, "No transition for event");
                return Ok(Outcome::NoMatch { state, event });
            }
            Selection::AllRejected(candidates) => {
                debug!(state = %state, event = %event, candidates, "All guards rejected event");
                return Ok(Outcome::GuardRejected {
                    state,
                    event,
                    candidates,
                });
            }
        };

        let started = Instant::now();
        let result = self.take(index, event, to);
        match &result {
            Ok(_) => self.stats.record_transition(started.elapsed()),
            Err(err) => {
                self.stats.failures += 1;
                if err.state_committed() {
                    self.stats.record_transition(started.elapsed());
                }
            }
        }
        result
    }

    fn select(&mut self, event: EventId) -> Result<Selection> {
        let state = self.current;
        let mut candidates = 0;

        for (index, transition) in self.transitions.candidates(state, event) {
            candidates += 1;
            let permitted = transition.permits(&*self.context).map_err(|source| {
                self.stats.failures += 1;
                warn!(state = %state, event = %event, index, error = %source, "Guard failed");
                FsmError::GuardFailed {
                    from: state,
                    event,
                    to: transition.to,
                    source,
                }
            })?;

            if permitted {
                trace!(index, "Guard accepted candidate");
                return Ok(Selection::Chosen {
                    index,
                    to: transition.to,
                });
            }
            trace!(index, "Guard rejected candidate");
            self.stats.guard_rejections += 1;
        }

        if candidates == 0 {
            Ok(Selection::NoMatch)
        } else {
            Ok(Selection::AllRejected(candidates))
        }
    }

    fn take(&mut self, index: usize, event: EventId, to: StateId) -> Result<Outcome> {
        let from = self.current;
        let action = self
            .transitions
            .get(index)
            .and_then(|transition| transition.action.as_ref());

        if let Some(action) = action {
            let step = Step {
                from,
                event,
                to,
                current: self.current,
            };
            action.run(&mut *self.context, &step).map_err(|source| {
                warn!(from = %from, event = %event, to = %to, error = %source, "Action failed");
                FsmError::ActionFailed {
                    from,
                    event,
                    to,
                    source,
                }
            })?;
        }

        self.current = to;
        self.history.record(TransitionRecord {
            from,
            event,
            to,
            timestamp: Utc::now(),
        });
        debug!(from = %from, event = %event, to = %to, "Transition committed");

        if let Some(handler) = self.handlers.get(to) {
            let step = Step {
                from,
                event,
                to,
                current: self.current,
            };
            handler.run(&mut *self.context, &step).map_err(|source| {
                warn!(state = %to, event = %event, error = %source, "Entry handler failed");
                FsmError::HandlerFailed {
                    from,
                    event,
                    to,
                    source,
                }
            })?;
        }

        Ok(Outcome::Transitioned { from, event, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Action, Guard, Handler, Transition};
    use crate::MachineConfig;
    use crate::IdRange;

    #[derive(Default, Debug)]
    struct Ctx {
        counter: i32,
        log: Vec<String>,
        seen_in_action: Vec<StateId>,
        seen_in_handler: Vec<StateId>,
    }

    #[test]
    fn taken_transition_runs_action_then_handler() {
        let mut ctx = Ctx::default();
        let mut machine = Machine::new(1, &mut ctx);
        machine
            .add_transition(Transition::new(1, 100, 2).then(|c: &mut Ctx| {
                c.counter += 1;
                c.log.push("action".into());
            }))
            .unwrap();
        machine
            .set_handler(2, Handler::new(|c: &mut Ctx, _| c.log.push("handler".into())))
            .unwrap();

        let outcome = machine.process_event(100).unwrap();

        assert_eq!(
            outcome,
            Outcome::Transitioned {
                from: StateId(1),
                event: EventId(100),
                to: StateId(2)
            }
        );
        assert_eq!(machine.current_state(), StateId(2));
        assert_eq!(machine.context().counter, 1);
        assert_eq!(machine.context().log, vec!["action", "handler"]);
    }

    #[test]
    fn unmatched_event_is_not_an_error() {
        let mut ctx = Ctx::default();
        let mut machine = Machine::new(1, &mut ctx);
        machine.add_transition(Transition::new(1, 100, 2)).unwrap();

        let outcome = machine.process_event(999).unwrap();

        assert_eq!(
            outcome,
            Outcome::NoMatch {
                state: StateId(1),
                event: EventId(999)
            }
        );
        assert_eq!(machine.stats().unmatched_events, 1);
        assert_eq!(machine.stats().transitions, 0);
    }

    #[test]
    fn rejected_guard_falls_through_to_next_candidate() {
        let mut ctx = Ctx::default();
        let mut machine = Machine::new(1, &mut ctx);
        machine
            .add_transition(Transition::new(1, 100, 2).when(|_: &Ctx| false))
            .unwrap();
        machine.add_transition(Transition::new(1, 100, 3)).unwrap();

        machine.process_event(100).unwrap();

        assert_eq!(machine.current_state(), StateId(3));
        assert_eq!(machine.stats().guard_rejections, 1);
    }

    #[test]
    fn all_guards_rejecting_reports_candidates() {
        let mut ctx = Ctx::default();
        let mut machine = Machine::new(1, &mut ctx);
        machine
            .add_transition(Transition::new(1, 100, 2).when(|_: &Ctx| false))
            .unwrap();
        machine
            .add_transition(Transition::new(1, 100, 3).when(|_: &Ctx| false))
            .unwrap();

        let outcome = machine.process_event(100).unwrap();

        assert_eq!(
            outcome,
            Outcome::GuardRejected {
                state: StateId(1),
                event: EventId(100),
                candidates: 2
            }
        );
        assert_eq!(machine.current_state(), StateId(1));
    }

    #[test]
    fn first_registered_eligible_transition_wins() {
        let mut ctx = Ctx::default();
        let mut machine = Machine::new(1, &mut ctx);
        machine.add_transition(Transition::new(1, 100, 2)).unwrap();
        machine.add_transition(Transition::new(1, 100, 3)).unwrap();

        machine.process_event(100).unwrap();

        assert_eq!(machine.current_state(), StateId(2));
    }

    #[test]
    fn action_sees_source_state_and_handler_sees_target() {
        let mut ctx = Ctx::default();
        let mut machine = Machine::new(1, &mut ctx);
        machine
            .add_transition(
                Transition::new(1, 100, 2)
                    .action(Action::with_step(|c: &mut Ctx, s| c.seen_in_action.push(s.current))),
            )
            .unwrap();
        machine
            .set_handler(
                2,
                Handler::try_new(|c: &mut Ctx, s| {
                    c.seen_in_handler.push(s.current);
                    Ok(())
                }),
            )
            .unwrap();

        machine.process_event(100).unwrap();

        assert_eq!(machine.context().seen_in_action, vec![StateId(1)]);
        assert_eq!(machine.context().seen_in_handler, vec![StateId(2)]);
    }

    #[test]
    fn failing_action_aborts_transition() {
        let mut ctx = Ctx::default();
        let mut machine = Machine::new(1, &mut ctx);
        machine
            .add_transition(
                Transition::new(1, 100, 2).action(Action::try_new(|_: &mut Ctx, _| {
                    Err("disk full".into())
                })),
            )
            .unwrap();
        machine
            .set_handler(2, Handler::new(|c: &mut Ctx, _| c.counter += 1))
            .unwrap();

        let err = machine.process_event(100).unwrap_err();

        assert!(matches!(err, FsmError::ActionFailed { .. }));
        assert!(!err.state_committed());
        assert_eq!(machine.current_state(), StateId(1));
        assert_eq!(machine.context().counter, 0);
        assert!(machine.history().is_empty());
        assert_eq!(machine.stats().failures, 1);
    }

    #[test]
    fn failing_handler_keeps_committed_state() {
        let mut ctx = Ctx::default();
        let mut machine = Machine::new(1, &mut ctx);
        machine.add_transition(Transition::new(1, 100, 2)).unwrap();
        machine
            .set_handler(2, Handler::try_new(|_: &mut Ctx, _| Err("refused".into())))
            .unwrap();

        let err = machine.process_event(100).unwrap_err();

        assert!(matches!(err, FsmError::HandlerFailed { .. }));
        assert!(err.state_committed());
        assert_eq!(machine.current_state(), StateId(2));
        assert_eq!(machine.history().len(), 1);
        assert_eq!(machine.stats().transitions, 1);
        assert_eq!(machine.stats().failures, 1);
    }

    #[test]
    fn failing_guard_aborts_scan() {
        let mut ctx = Ctx::default();
        let mut machine = Machine::new(1, &mut ctx);
        machine
            .add_transition(
                Transition::new(1, 100, 2).guard(Guard::try_new(|_: &Ctx| Err("no data".into()))),
            )
            .unwrap();
        machine
            .add_transition(Transition::new(1, 100, 3).then(|c: &mut Ctx| c.counter += 1))
            .unwrap();

        let err = machine.process_event(100).unwrap_err();

        assert!(matches!(
            err,
            FsmError::GuardFailed { to, .. } if to == StateId(2)
        ));
        assert_eq!(machine.current_state(), StateId(1));
        assert_eq!(machine.context().counter, 0);
    }

    #[test]
    fn machine_is_usable_after_failure() {
        let mut ctx = Ctx::default();
        let mut machine = Machine::new(1, &mut ctx);
        machine
            .add_transition(Transition::new(1, 100, 2).action(Action::try_new(
                |c: &mut Ctx, _| {
                    c.counter += 1;
                    if c.counter == 1 {
                        Err("first attempt fails".into())
                    } else {
                        Ok(())
                    }
                },
            )))
            .unwrap();

        assert!(machine.process_event(100).is_err());
        assert!(machine.process_event(100).unwrap().is_transitioned());
        assert_eq!(machine.current_state(), StateId(2));
    }

    #[test]
    fn wildcard_transition_applies_in_every_state() {
        let mut ctx = Ctx::default();
        let mut machine = Machine::new(0, &mut ctx);
        machine.add_transition(Transition::new(0, 1, 1)).unwrap();
        machine.add_transition(Transition::new(1, 1, 2)).unwrap();
        machine.add_transition(Transition::from_any(9, 0)).unwrap();

        machine.process_event(1).unwrap();
        machine.process_event(1).unwrap();
        assert_eq!(machine.current_state(), StateId(2));

        machine.process_event(9).unwrap();
        assert_eq!(machine.current_state(), StateId(0));
    }

    #[test]
    fn minus_one_source_is_compared_by_equality() {
        let mut ctx = Ctx::default();
        let mut machine = Machine::new(0, &mut ctx);
        machine.add_transition(Transition::new(-1, 5, 0)).unwrap();
        machine.add_transition(Transition::new(0, 1, 1)).unwrap();
        machine.add_transition(Transition::new(1, 2, -1)).unwrap();

        machine.process_event(1).unwrap();
        assert_eq!(
            machine.process_event(5).unwrap(),
            Outcome::NoMatch {
                state: StateId(1),
                event: EventId(5)
            }
        );

        machine.process_event(2).unwrap();
        assert_eq!(machine.current_state(), StateId(-1));
        assert!(machine.process_event(5).unwrap().is_transitioned());
        assert_eq!(machine.current_state(), StateId(0));
    }

    #[test]
    fn selected_transition_without_action_commits() {
        let mut ctx = Ctx::default();
        let mut machine = Machine::new(3, &mut ctx);
        machine
            .add_transition(Transition::new(3, 4, 5).when(|_: &Ctx| true))
            .unwrap();

        let outcome = machine.process_event(4).unwrap();

        assert_eq!(
            outcome,
            Outcome::Transitioned {
                from: StateId(3),
                event: EventId(4),
                to: StateId(5)
            }
        );
        assert!(machine.context().log.is_empty());
    }

    #[test]
    fn self_transition_fires_handler() {
        let mut ctx = Ctx::default();
        let mut machine = Machine::new(1, &mut ctx);
        machine.add_transition(Transition::new(1, 7, 1)).unwrap();
        machine
            .set_handler(1, Handler::new(|c: &mut Ctx, _| c.counter += 1))
            .unwrap();

        machine.process_event(7).unwrap();
        machine.process_event(7).unwrap();

        assert_eq!(machine.context().counter, 2);
    }

    #[test]
    fn event_outside_range_is_rejected() {
        let mut ctx = Ctx::default();
        let config = MachineConfig::default().events(IdRange::new(0, 10));
        let mut machine = Machine::with_config(1, &mut ctx, config).unwrap();

        let err = machine.process_event(50).unwrap_err();

        assert!(matches!(err, FsmError::InvalidEvent { event } if event == EventId(50)));
        assert_eq!(machine.stats().invalid_events, 1);
        assert_eq!(machine.stats().events, 1);
    }

    #[test]
    fn history_records_each_commit() {
        let mut ctx = Ctx::default();
        let mut machine = Machine::new(0, &mut ctx);
        machine.add_transition(Transition::new(0, 1, 1)).unwrap();
        machine.add_transition(Transition::new(1, 2, 2)).unwrap();

        machine.process_event(1).unwrap();
        machine.process_event(5).unwrap();
        machine.process_event(2).unwrap();

        assert_eq!(
            machine.history().path(),
            vec![StateId(0), StateId(1), StateId(2)]
        );
        assert_eq!(machine.stats().events, 3);
        assert_eq!(machine.stats().transitions, 2);
    }
}
