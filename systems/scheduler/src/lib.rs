#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Cooperative round-robin scheduler that alternates actor strategies.
//!
//! Actors run in registration order. Autonomous strategies complete their turn
//! synchronously while the human strategy suspends the scheduler until the
//! host forwards input through [`TurnScheduler::provide_input`].

use log::{debug, info};
use rogue_chase_core::{ActorId, Event, RawInput};
use rogue_chase_system_input::{HumanInput, InputResolution};
use rogue_chase_system_pursuit::{PathfindingPursuit, PursuitAction};
use rogue_chase_world::{MoveArbiter, WorldError};
use thiserror::Error;

/// Failures raised by [`TurnScheduler`].
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    /// The actor is already registered.
    #[error("actor {0} is already scheduled")]
    DuplicateActor(ActorId),
    /// A strategy addressed an actor the world does not know.
    #[error(transparent)]
    World(#[from] WorldError),
}

/// Behaviour attached to a scheduled actor.
#[derive(Clone, Debug)]
pub enum ActionStrategy {
    /// Waits for keyboard input from the host.
    HumanInput(HumanInput),
    /// Chases the tracked human along a shortest path.
    Pursuit(PathfindingPursuit),
}

impl ActionStrategy {
    /// Strategy for a human actor with default key bindings.
    #[must_use]
    pub fn human() -> Self {
        Self::HumanInput(HumanInput::default())
    }

    /// Strategy for a pursuing actor.
    #[must_use]
    pub fn pursuit() -> Self {
        Self::Pursuit(PathfindingPursuit::new())
    }

    const fn is_human(&self) -> bool {
        matches!(self, Self::HumanInput(_))
    }
}

/// Lifecycle of the scheduler.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SchedulerStatus {
    /// The next call to [`TurnScheduler::run_turn`] dispatches a strategy.
    #[default]
    Ready,
    /// A human strategy is waiting for input.
    Suspended {
        /// Actor whose turn is pending.
        actor: ActorId,
    },
    /// A pursuer captured the human; no further turns are dispatched.
    GameOver {
        /// Human actor that was captured, if one is scheduled.
        captured: Option<ActorId>,
        /// Pursuer that made the capture.
        by: ActorId,
    },
}

/// Outcome of a scheduling step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TurnReport {
    /// An autonomous actor completed its turn.
    Completed {
        /// Actor that played.
        actor: ActorId,
        /// What the actor did.
        action: PursuitAction,
    },
    /// The scheduler is suspended until the human's input arrives.
    AwaitingInput {
        /// Actor whose turn is pending.
        actor: ActorId,
    },
    /// The session ended with a capture.
    GameOver {
        /// Human actor that was captured, if one is scheduled.
        captured: Option<ActorId>,
        /// Pursuer that made the capture.
        by: ActorId,
    },
    /// No actors are scheduled.
    Empty,
    /// The turn budget ran out before the scheduler blocked.
    BudgetExhausted,
}

/// Cyclic queue of actors with a single suspension point.
#[derive(Clone, Debug, Default)]
pub struct TurnScheduler {
    queue: Vec<(ActorId, ActionStrategy)>,
    cursor: usize,
    status: SchedulerStatus,
    turns_taken: u64,
}

impl TurnScheduler {
    /// Creates an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an actor to the end of the turn order.
    pub fn add(&mut self, actor: ActorId, strategy: ActionStrategy) -> Result<(), SchedulerError> {
        if self.contains(actor) {
            return Err(SchedulerError::DuplicateActor(actor));
        }
        debug!(target: "scheduler", "scheduled {actor} at slot {}", self.queue.len());
        self.queue.push((actor, strategy));
        Ok(())
    }

    /// Removes an actor from the turn order and returns its strategy.
    ///
    /// The actor that would have played next keeps its turn.
    pub fn remove(&mut self, actor: ActorId) -> Option<ActionStrategy> {
        let index = self.index_of(actor)?;
        let (_, strategy) = self.queue.remove(index);
        if index < self.cursor {
            self.cursor -= 1;
        }
        if self.cursor >= self.queue.len() {
            self.cursor = 0;
        }
        if self.status == (SchedulerStatus::Suspended { actor }) {
            self.status = SchedulerStatus::Ready;
        }
        debug!(target: "scheduler", "unscheduled {actor}");
        Some(strategy)
    }

    /// Reports whether the actor is scheduled.
    #[must_use]
    pub fn contains(&self, actor: ActorId) -> bool {
        self.index_of(actor).is_some()
    }

    /// Number of scheduled actors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Reports whether no actors are scheduled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Actor whose turn is next, or pending while suspended.
    #[must_use]
    pub fn current(&self) -> Option<ActorId> {
        self.queue.get(self.cursor).map(|(actor, _)| *actor)
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn status(&self) -> SchedulerStatus {
        self.status
    }

    /// Number of turns that have been consumed.
    #[must_use]
    pub const fn turns_taken(&self) -> u64 {
        self.turns_taken
    }

    /// Strategy attached to an actor.
    #[must_use]
    pub fn strategy(&self, actor: ActorId) -> Option<&ActionStrategy> {
        self.queue
            .iter()
            .find(|(candidate, _)| *candidate == actor)
            .map(|(_, strategy)| strategy)
    }

    /// Dispatches the next actor's strategy.
    ///
    /// While suspended the pending actor is reported again without advancing.
    /// Once the game is over nothing is dispatched.
    pub fn run_turn(&mut self, arbiter: &mut MoveArbiter<'_>) -> Result<TurnReport, SchedulerError> {
        match self.status {
            SchedulerStatus::GameOver { captured, by } => {
                return Ok(TurnReport::GameOver { captured, by });
            }
            SchedulerStatus::Suspended { actor } => {
                return Ok(TurnReport::AwaitingInput { actor });
            }
            SchedulerStatus::Ready => {}
        }

        let captured = self.human();
        let Some((actor, strategy)) = self.queue.get_mut(self.cursor) else {
            return Ok(TurnReport::Empty);
        };
        let actor = *actor;

        match strategy {
            ActionStrategy::HumanInput(human) => {
                human.begin_turn();
                self.status = SchedulerStatus::Suspended { actor };
                debug!(target: "scheduler", "suspended for {actor}");
                Ok(TurnReport::AwaitingInput { actor })
            }
            ActionStrategy::Pursuit(pursuit) => {
                let action = pursuit.take_turn(arbiter, actor)?;
                self.advance();

                if let PursuitAction::Captured { at } = action {
                    info!(target: "scheduler", "{actor} captured the human at {at}");
                    arbiter.announce(&Event::Captured { actor, at });
                    self.status = SchedulerStatus::GameOver { captured, by: actor };
                    return Ok(TurnReport::GameOver {
                        captured,
                        by: actor,
                    });
                }

                Ok(TurnReport::Completed { actor, action })
            }
        }
    }

    /// Forwards host input to the suspended human strategy.
    ///
    /// Recognized input resumes the scheduler and advances the turn order by
    /// exactly one actor. Unrecognized input, or input while not suspended, is
    /// ignored.
    pub fn provide_input(
        &mut self,
        input: RawInput,
        arbiter: &mut MoveArbiter<'_>,
    ) -> Result<InputResolution, SchedulerError> {
        let SchedulerStatus::Suspended { actor } = self.status else {
            return Ok(InputResolution::Ignored);
        };
        let Some(index) = self.index_of(actor) else {
            return Ok(InputResolution::Ignored);
        };
        let ActionStrategy::HumanInput(human) = &mut self.queue[index].1 else {
            return Ok(InputResolution::Ignored);
        };

        let resolution = human.handle_input(input, arbiter, actor)?;
        if resolution.consumed_turn() {
            self.status = SchedulerStatus::Ready;
            self.advance();
            debug!(target: "scheduler", "{actor} resolved its turn: {resolution:?}");
        }
        Ok(resolution)
    }

    /// Runs turns until the scheduler suspends, the game ends, or `max_turns`
    /// turns have been dispatched.
    pub fn run_until_blocked(
        &mut self,
        arbiter: &mut MoveArbiter<'_>,
        max_turns: u64,
    ) -> Result<TurnReport, SchedulerError> {
        for _ in 0..max_turns {
            match self.run_turn(arbiter)? {
                TurnReport::Completed { .. } => {}
                blocked => return Ok(blocked),
            }
        }
        debug!(target: "scheduler", "turn budget of {max_turns} exhausted");
        Ok(TurnReport::BudgetExhausted)
    }

    fn advance(&mut self) {
        self.turns_taken += 1;
        if !self.queue.is_empty() {
            self.cursor = (self.cursor + 1) % self.queue.len();
        }
    }

    fn index_of(&self, actor: ActorId) -> Option<usize> {
        self.queue.iter().position(|(candidate, _)| *candidate == actor)
    }

    fn human(&self) -> Option<ActorId> {
        self.queue
            .iter()
            .find(|(_, strategy)| strategy.is_human())
            .map(|(actor, _)| *actor)
    }
}
