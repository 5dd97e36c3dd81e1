#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Autonomous strategy that chases the tracked human along shortest paths.

use std::collections::VecDeque;

use log::debug;
use rogue_chase_core::{ActorId, Coordinate, MoveOutcome, RejectReason};
use rogue_chase_world::{navigation::find_path, MoveArbiter, WorldError};

/// What a pursuer did with its turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PursuitAction {
    /// The pursuer advanced one waypoint.
    Moved {
        /// Cell the pursuer now occupies.
        to: Coordinate,
    },
    /// The arbiter refused the step; the cached path was discarded.
    Rejected {
        /// Why the arbiter refused the step.
        reason: RejectReason,
    },
    /// The pursuer stands on or next to the tracked human.
    Captured {
        /// Position of the pursuer at the time of capture.
        at: Coordinate,
    },
    /// No route to the human exists, or no human is tracked.
    Passed,
}

/// Strategy that walks an A* path toward the tracked human one step per turn.
///
/// The only state kept between turns is the cached list of waypoints. The
/// path is recomputed whenever its final waypoint no longer matches the
/// tracked human position.
#[derive(Clone, Debug, Default)]
pub struct PathfindingPursuit {
    path: VecDeque<Coordinate>,
}

impl PathfindingPursuit {
    /// Creates a pursuer with no cached path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waypoints still queued on the cached path.
    #[must_use]
    pub fn planned_steps(&self) -> usize {
        self.path.len()
    }

    /// Final waypoint of the cached path.
    #[must_use]
    pub fn destination(&self) -> Option<Coordinate> {
        self.path.back().copied()
    }

    /// Plays one turn for `actor`.
    pub fn take_turn(
        &mut self,
        arbiter: &mut MoveArbiter<'_>,
        actor: ActorId,
    ) -> Result<PursuitAction, WorldError> {
        let position = arbiter.position_of(actor)?;
        let Some(target) = arbiter.tracked_player() else {
            debug!(target: "pursuit", "{actor} has no human to chase");
            return Ok(PursuitAction::Passed);
        };

        if position.manhattan_distance(target) <= 1 {
            debug!(target: "pursuit", "{actor} caught the human at {target}");
            return Ok(PursuitAction::Captured { at: position });
        }

        if !self.is_current(position, target) && !self.replan(arbiter, actor, position, target) {
            return Ok(PursuitAction::Passed);
        }

        let Some(next) = self.path.pop_front() else {
            return Ok(PursuitAction::Passed);
        };

        match arbiter.attempt_move(actor, next)? {
            MoveOutcome::Committed => Ok(PursuitAction::Moved { to: next }),
            MoveOutcome::Rejected { reason } => {
                debug!(target: "pursuit", "{actor} step to {next} rejected: {reason:?}");
                self.path.clear();
                Ok(PursuitAction::Rejected { reason })
            }
        }
    }

    fn is_current(&self, position: Coordinate, target: Coordinate) -> bool {
        match (self.path.front(), self.path.back()) {
            (Some(next), Some(last)) => {
                *last == target && position.manhattan_distance(*next) == 1
            }
            _ => false,
        }
    }

    fn replan(
        &mut self,
        arbiter: &MoveArbiter<'_>,
        actor: ActorId,
        position: Coordinate,
        target: Coordinate,
    ) -> bool {
        self.path.clear();
        let (width, height) = arbiter.bounds();
        match find_path(position, target, width, height, |cell| arbiter.is_passable(cell)) {
            Some(waypoints) => {
                debug!(
                    target: "pursuit",
                    "{actor} planned {} steps from {position} to {target}",
                    waypoints.len()
                );
                self.path.extend(waypoints);
                true
            }
            None => {
                debug!(target: "pursuit", "{actor} has no route from {position} to {target}");
                false
            }
        }
    }
}
