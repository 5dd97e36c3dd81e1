#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Rogue Chase.
//!
//! The world owns the actors, the free cell pool and the player tracker.
//! Every position change flows through [`attempt_move`], which consults the
//! [`GameOracle`] before committing and reports the resulting [`Event`]
//! values to the caller.

mod arbiter;
mod free_cells;
pub mod navigation;

use log::{debug, info};
use rand::Rng;
use rogue_chase_core::{
    ActorColor, ActorId, ActorKind, Coordinate, Event, GameOracle, InteractOutcome, MoveOutcome,
    RejectReason,
};
use thiserror::Error;

pub use arbiter::{EventDispatcher, MoveArbiter};
pub use free_cells::{FreeCellPool, PoolError};

/// Failures raised while mutating the world.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum WorldError {
    /// The actor has no spatial binding; it was never spawned or was removed.
    #[error("actor {0} has no spatial binding")]
    UnboundActor(ActorId),
    /// Another actor already stands on the requested spawn cell.
    #[error("cell {0} is already occupied")]
    CellOccupied(Coordinate),
    /// The free cell pool could not satisfy the request.
    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// Mutable record describing a single live actor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActorState {
    id: ActorId,
    kind: ActorKind,
    position: Coordinate,
    glyph: char,
    color: ActorColor,
}

impl ActorState {
    /// Identifier of the actor.
    #[must_use]
    pub const fn id(&self) -> ActorId {
        self.id
    }

    /// Role of the actor.
    #[must_use]
    pub const fn kind(&self) -> ActorKind {
        self.kind
    }

    /// Cell the actor currently occupies.
    #[must_use]
    pub const fn position(&self) -> Coordinate {
        self.position
    }

    /// Glyph drawn for the actor.
    #[must_use]
    pub const fn glyph(&self) -> char {
        self.glyph
    }

    /// Color applied to the actor's glyph.
    #[must_use]
    pub const fn color(&self) -> ActorColor {
        self.color
    }
}

/// Appearance and role requested when spawning an actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActorTemplate {
    /// Role of the actor.
    pub kind: ActorKind,
    /// Glyph drawn for the actor.
    pub glyph: char,
    /// Color applied to the glyph.
    pub color: ActorColor,
}

impl ActorTemplate {
    /// Yellow `@` controlled by the player.
    pub const HUMAN: Self = Self {
        kind: ActorKind::Human,
        glyph: '@',
        color: ActorColor::from_rgb(0xff, 0xff, 0x00),
    };

    /// Red `B` that chases the player.
    pub const PURSUER: Self = Self {
        kind: ActorKind::Pursuer,
        glyph: 'B',
        color: ActorColor::from_rgb(0xff, 0x00, 0x00),
    };
}

/// Last committed position of the human actor.
///
/// Pursuers read the human's position exclusively through the tracker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlayerTracker {
    position: Option<Coordinate>,
}

impl PlayerTracker {
    /// Position recorded by the most recent spawn or committed move.
    #[must_use]
    pub const fn position(&self) -> Option<Coordinate> {
        self.position
    }

    fn set(&mut self, position: Coordinate) {
        self.position = Some(position);
    }

    fn clear(&mut self) {
        self.position = None;
    }
}

/// Represents the authoritative Rogue Chase world state.
#[derive(Clone, Debug, Default)]
pub struct World {
    width: u32,
    height: u32,
    free_cells: FreeCellPool,
    actors: Vec<ActorState>,
    tracker: PlayerTracker,
    next_actor_id: u32,
}

impl World {
    /// Creates an empty world for a map of the provided dimensions.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    fn actor_index(&self, actor: ActorId) -> Option<usize> {
        self.actors.iter().position(|state| state.id == actor)
    }

    fn occupant(&self, cell: Coordinate) -> Option<ActorId> {
        self.actors
            .iter()
            .find(|state| state.position == cell)
            .map(|state| state.id)
    }

    fn allocate_id(&mut self) -> ActorId {
        let id = ActorId::new(self.next_actor_id);
        self.next_actor_id = self.next_actor_id.saturating_add(1);
        id
    }
}

/// Seeds the free cell pool and returns how many cells were new.
pub fn seed_free_cells<I>(world: &mut World, cells: I) -> usize
where
    I: IntoIterator<Item = Coordinate>,
{
    world.free_cells.extend(cells)
}

/// Removes a uniformly selected free cell from the pool.
pub fn claim_free_cell<R>(world: &mut World, rng: &mut R) -> Result<Coordinate, WorldError>
where
    R: Rng,
{
    Ok(world.free_cells.pop_random(rng)?)
}

/// Places a new actor on the provided cell.
///
/// Spawning the human also initialises the player tracker.
pub fn spawn(
    world: &mut World,
    template: ActorTemplate,
    at: Coordinate,
    out_events: &mut Vec<Event>,
) -> Result<ActorId, WorldError> {
    if world.occupant(at).is_some() {
        return Err(WorldError::CellOccupied(at));
    }

    let id = world.allocate_id();
    let _ = world.free_cells.remove(at);
    world.actors.push(ActorState {
        id,
        kind: template.kind,
        position: at,
        glyph: template.glyph,
        color: template.color,
    });

    if template.kind == ActorKind::Human {
        world.tracker.set(at);
    }

    info!(target: "arbiter", "spawned {:?} {id} at {at}", template.kind);
    out_events.push(Event::ActorSpawned {
        actor: id,
        kind: template.kind,
        at,
        glyph: template.glyph,
        color: template.color,
    });
    Ok(id)
}

/// Removes an actor and returns its cell to the free cell pool.
pub fn despawn(world: &mut World, actor: ActorId) -> Result<Coordinate, WorldError> {
    let index = world
        .actor_index(actor)
        .ok_or(WorldError::UnboundActor(actor))?;
    let state = world.actors.remove(index);
    let _ = world.free_cells.insert(state.position);

    if state.kind == ActorKind::Human && world.tracker.position() == Some(state.position) {
        world.tracker.clear();
    }

    info!(target: "arbiter", "despawned {actor} from {}", state.position);
    Ok(state.position)
}

/// Validates a move against the oracle and the actor set, committing it when legal.
///
/// Checks run in order and stop at the first failure: the oracle must report
/// the target as passable, then no other live actor may stand on it. A
/// rejected move leaves the world untouched and produces no events. A
/// committed move takes the target out of the free cell pool and returns the
/// vacated cell to it.
pub fn attempt_move<O>(
    world: &mut World,
    oracle: &mut O,
    actor: ActorId,
    target: Coordinate,
    out_events: &mut Vec<Event>,
) -> Result<MoveOutcome, WorldError>
where
    O: GameOracle + ?Sized,
{
    let index = world
        .actor_index(actor)
        .ok_or(WorldError::UnboundActor(actor))?;

    if !oracle.is_passable(target) {
        debug!(target: "arbiter", "{actor} blocked at {target}");
        return Ok(MoveOutcome::Rejected {
            reason: RejectReason::Blocked,
        });
    }

    if let Some(occupant) = world.occupant(target) {
        if occupant != actor {
            debug!(target: "arbiter", "{actor} bumped into {occupant} at {target}");
            return Ok(MoveOutcome::Rejected {
                reason: RejectReason::Occupied,
            });
        }
    }

    let state = &mut world.actors[index];
    let from = state.position;
    state.position = target;
    let kind = state.kind;

    let _ = world.free_cells.remove(target);
    let _ = world.free_cells.insert(from);
    if kind == ActorKind::Human {
        world.tracker.set(target);
    }

    let effect = oracle.apply_move(actor, from, target);
    debug!(target: "arbiter", "{actor} moved {from} -> {target}");
    out_events.push(Event::PieceMoved {
        actor,
        from,
        to: target,
    });
    if effect.promoted {
        info!(target: "arbiter", "{actor} promoted at {target}");
        out_events.push(Event::ActorPromoted { actor, at: target });
    }

    Ok(MoveOutcome::Committed)
}

/// Lets an actor interact with the cell it stands on.
pub fn interact<O>(
    world: &mut World,
    oracle: &mut O,
    actor: ActorId,
    out_events: &mut Vec<Event>,
) -> Result<InteractOutcome, WorldError>
where
    O: GameOracle + ?Sized,
{
    let at = query::position_of(world, actor).ok_or(WorldError::UnboundActor(actor))?;
    let outcome = oracle.interact(actor, at);
    debug!(target: "arbiter", "{actor} interacted at {at}: {outcome:?}");
    out_events.push(Event::Interacted { actor, at, outcome });
    Ok(outcome)
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use rogue_chase_core::{ActorId, Coordinate};

    use super::{ActorState, FreeCellPool, World};

    /// Map width and height in cells.
    #[must_use]
    pub fn bounds(world: &World) -> (u32, u32) {
        (world.width, world.height)
    }

    /// Looks up a live actor.
    #[must_use]
    pub fn actor(world: &World, id: ActorId) -> Option<&ActorState> {
        world.actors.iter().find(|state| state.id == id)
    }

    /// Current position of a live actor.
    #[must_use]
    pub fn position_of(world: &World, actor: ActorId) -> Option<Coordinate> {
        self::actor(world, actor).map(ActorState::position)
    }

    /// Live actors in spawn order.
    #[must_use]
    pub fn actors(world: &World) -> &[ActorState] {
        &world.actors
    }

    /// Actor standing on the provided cell, if any.
    #[must_use]
    pub fn occupant(world: &World, cell: Coordinate) -> Option<ActorId> {
        world.occupant(cell)
    }

    /// Last committed position of the human actor.
    #[must_use]
    pub fn tracked_player(world: &World) -> Option<Coordinate> {
        world.tracker.position()
    }

    /// Read-only view of the free cell pool.
    #[must_use]
    pub fn free_cells(world: &World) -> &FreeCellPool {
        &world.free_cells
    }
}
