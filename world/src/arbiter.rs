//! The move arbiter and the observer list it broadcasts through.

use std::fmt;

use log::warn;
use rogue_chase_core::{
    ActorId, ActorKind, Coordinate, Event, EventObserver, GameOracle, InteractOutcome, MoveOutcome,
};

use crate::{query, World, WorldError};

/// Ordered list of observers that receive every broadcast event.
#[derive(Default)]
pub struct EventDispatcher {
    observers: Vec<Box<dyn EventObserver>>,
}

impl EventDispatcher {
    /// Creates a dispatcher with no observers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an observer; observers are notified in registration order.
    pub fn register(&mut self, observer: Box<dyn EventObserver>) {
        self.observers.push(observer);
    }

    /// Number of registered observers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// Reports whether no observers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Notifies every observer of the event.
    ///
    /// A failing observer is logged and skipped; it never prevents later
    /// observers from running and is not retried. Returns the number of
    /// observers that failed.
    pub fn dispatch(&mut self, event: &Event) -> usize {
        let mut failures = 0;
        for (position, observer) in self.observers.iter_mut().enumerate() {
            if let Err(error) = observer.notify(event) {
                failures += 1;
                warn!(target: "arbiter", "observer {position} rejected {event:?}: {error}");
            }
        }
        failures
    }

    /// Notifies every observer of each event in order.
    pub fn dispatch_all(&mut self, events: &[Event]) -> usize {
        events.iter().map(|event| self.dispatch(event)).sum()
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("observers", &self.observers.len())
            .finish()
    }
}

/// Single gateway through which strategies change the world during a turn.
///
/// The arbiter borrows the world, the oracle and the observer list for the
/// duration of one turn, so nothing else can mutate them while a strategy
/// runs. Every committed change is broadcast before the call returns.
pub struct MoveArbiter<'a> {
    world: &'a mut World,
    oracle: &'a mut dyn GameOracle,
    dispatcher: &'a mut EventDispatcher,
}

impl<'a> MoveArbiter<'a> {
    /// Bundles the turn's collaborators.
    pub fn new(
        world: &'a mut World,
        oracle: &'a mut dyn GameOracle,
        dispatcher: &'a mut EventDispatcher,
    ) -> Self {
        Self {
            world,
            oracle,
            dispatcher,
        }
    }

    /// Validates and, when legal, commits a move, then broadcasts it.
    pub fn attempt_move(
        &mut self,
        actor: ActorId,
        target: Coordinate,
    ) -> Result<MoveOutcome, WorldError> {
        let mut events = Vec::new();
        let outcome =
            crate::attempt_move(&mut *self.world, &mut *self.oracle, actor, target, &mut events)?;
        let _ = self.dispatcher.dispatch_all(&events);
        Ok(outcome)
    }

    /// Interacts with the actor's cell through the oracle and broadcasts it.
    pub fn interact(&mut self, actor: ActorId) -> Result<InteractOutcome, WorldError> {
        let mut events = Vec::new();
        let outcome = crate::interact(&mut *self.world, &mut *self.oracle, actor, &mut events)?;
        let _ = self.dispatcher.dispatch_all(&events);
        Ok(outcome)
    }

    /// Broadcasts an event that does not change the world, such as a capture.
    pub fn announce(&mut self, event: &Event) {
        let _ = self.dispatcher.dispatch(event);
    }

    /// Current position of a live actor.
    pub fn position_of(&self, actor: ActorId) -> Result<Coordinate, WorldError> {
        query::position_of(&*self.world, actor).ok_or(WorldError::UnboundActor(actor))
    }

    /// Role of a live actor.
    pub fn kind_of(&self, actor: ActorId) -> Result<ActorKind, WorldError> {
        query::actor(&*self.world, actor)
            .map(|state| state.kind())
            .ok_or(WorldError::UnboundActor(actor))
    }

    /// Last committed position of the human actor.
    #[must_use]
    pub fn tracked_player(&self) -> Option<Coordinate> {
        query::tracked_player(&*self.world)
    }

    /// Passability as reported by the oracle.
    #[must_use]
    pub fn is_passable(&self, cell: Coordinate) -> bool {
        self.oracle.is_passable(cell)
    }

    /// Map width and height in cells.
    #[must_use]
    pub fn bounds(&self) -> (u32, u32) {
        query::bounds(&*self.world)
    }
}

impl fmt::Debug for MoveArbiter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MoveArbiter")
            .field("world", &self.world)
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}
