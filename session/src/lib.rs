#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session orchestration for Rogue Chase.
//!
//! A [`GameSession`] generates the map, places the boxes, spawns the human
//! and its pursuers, and then drives the turn scheduler until the human is
//! captured.

use std::collections::BTreeMap;

use log::{info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rogue_chase_core::{
    ActorId, Coordinate, Event, EventObserver, GameOracle, MapGenerator, ObjectKind,
    PassabilityGrid, RawInput,
};
use rogue_chase_system_input::{HumanInput, InputResolution, KeyAction, KeyMap};
use rogue_chase_system_scheduler::{ActionStrategy, SchedulerError, TurnReport, TurnScheduler};
use rogue_chase_world::{
    self as world, query, ActorTemplate, EventDispatcher, MoveArbiter, PoolError, World,
    WorldError,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tunable parameters of a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Map width in cells.
    pub width: u32,
    /// Map height in cells.
    pub height: u32,
    /// Number of boxes to place; the last one holds the prize.
    pub box_count: usize,
    /// Number of pursuers spawned after the human.
    pub pursuer_count: usize,
    /// Seed driving every random choice of the session.
    pub seed: u64,
    /// Maximum number of autonomous turns run between two human turns.
    pub max_turns: u64,
    /// Character bindings layered over the default key map.
    pub keys: BTreeMap<String, KeyAction>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            width: 125,
            height: 40,
            box_count: 10,
            pursuer_count: 1,
            seed: 0,
            max_turns: 10_000,
            keys: BTreeMap::new(),
        }
    }
}

impl SessionConfig {
    /// Builds the key map described by the configuration.
    pub fn keymap(&self) -> Result<KeyMap, SessionError> {
        let mut keymap = KeyMap::default();
        for (key, action) in &self.keys {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(symbol), None) => keymap.bind_char(symbol, *action),
                _ => return Err(SessionError::InvalidBinding(key.clone())),
            }
        }
        Ok(keymap)
    }
}

/// Failures raised while building or driving a session.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The free cell pool could not satisfy a placement.
    #[error("cell placement failed: {0}")]
    Pool(PoolError),
    /// The map generator produced an unusable map.
    #[error("malformed map: {0}")]
    MalformedMap(String),
    /// A key binding does not name exactly one character.
    #[error("key binding `{0}` must be a single character")]
    InvalidBinding(String),
    /// The world rejected an operation.
    #[error(transparent)]
    World(WorldError),
    /// The scheduler rejected an operation.
    #[error(transparent)]
    Scheduler(SchedulerError),
}

impl From<WorldError> for SessionError {
    fn from(error: WorldError) -> Self {
        match error {
            WorldError::Pool(pool) => Self::Pool(pool),
            other => Self::World(other),
        }
    }
}

impl From<SchedulerError> for SessionError {
    fn from(error: SchedulerError) -> Self {
        match error {
            SchedulerError::World(world) => Self::from(world),
            other => Self::Scheduler(other),
        }
    }
}

impl From<PoolError> for SessionError {
    fn from(error: PoolError) -> Self {
        Self::Pool(error)
    }
}

/// Lifecycle of a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    /// Built but not yet started, or paused after a turn budget ran out.
    #[default]
    Running,
    /// Waiting for the player to choose the human's action.
    AwaitingInput {
        /// Actor whose turn is pending.
        actor: ActorId,
    },
    /// A pursuer caught the human.
    GameOver {
        /// Human actor that was captured, if one is scheduled.
        captured: Option<ActorId>,
        /// Pursuer that made the capture.
        by: ActorId,
    },
}

/// A single playthrough: world, oracle, observers and scheduler.
pub struct GameSession<O> {
    config: SessionConfig,
    grid: PassabilityGrid,
    world: World,
    oracle: O,
    dispatcher: EventDispatcher,
    scheduler: TurnScheduler,
    human: ActorId,
    pursuers: Vec<ActorId>,
    phase: SessionPhase,
}

impl<O> GameSession<O>
where
    O: GameOracle,
{
    /// Generates the map, places objects and spawns every actor.
    ///
    /// Construction is all-or-nothing: any failure returns an error and no
    /// event reaches the observers.
    pub fn new<G>(
        config: SessionConfig,
        generator: &mut G,
        mut oracle: O,
        observers: Vec<Box<dyn EventObserver>>,
    ) -> Result<Self, SessionError>
    where
        G: MapGenerator + ?Sized,
    {
        let keymap = config.keymap()?;
        let map = generator.generate(config.height, config.width);
        validate_map(&config, &map.grid, &map.free_cells)?;

        oracle.load_map(&map.grid);
        let mut world = World::new(config.width, config.height);
        let seeded = world::seed_free_cells(&mut world, map.free_cells);
        info!(
            target: "session",
            "loaded a {}x{} map with {seeded} free cells",
            config.width, config.height
        );

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let mut events = Vec::new();

        for index in 0..config.box_count {
            let at = world::claim_free_cell(&mut world, &mut rng)?;
            let kind = if index + 1 == config.box_count {
                ObjectKind::Prize
            } else {
                ObjectKind::Box
            };
            oracle.place_object(at, kind);
            events.push(Event::ObjectPlaced { at, kind });
        }

        let mut scheduler = TurnScheduler::new();
        let at = world::claim_free_cell(&mut world, &mut rng)?;
        let human = world::spawn(&mut world, ActorTemplate::HUMAN, at, &mut events)?;
        scheduler.add(human, ActionStrategy::HumanInput(HumanInput::new(keymap)))?;

        let mut pursuers = Vec::with_capacity(config.pursuer_count);
        for _ in 0..config.pursuer_count {
            let at = world::claim_free_cell(&mut world, &mut rng)?;
            let pursuer = world::spawn(&mut world, ActorTemplate::PURSUER, at, &mut events)?;
            scheduler.add(pursuer, ActionStrategy::pursuit())?;
            pursuers.push(pursuer);
        }

        let mut dispatcher = EventDispatcher::new();
        for observer in observers {
            dispatcher.register(observer);
        }
        let failures = dispatcher.dispatch_all(&events);
        if failures > 0 {
            warn!(target: "session", "{failures} observer notifications failed during setup");
        }

        Ok(Self {
            config,
            grid: map.grid,
            world,
            oracle,
            dispatcher,
            scheduler,
            human,
            pursuers,
            phase: SessionPhase::Running,
        })
    }

    /// Runs turns until the human must act or the game ends.
    pub fn start(&mut self) -> Result<SessionPhase, SessionError> {
        if let SessionPhase::GameOver { .. } = self.phase {
            return Ok(self.phase);
        }

        let budget = self.config.max_turns;
        let mut arbiter = MoveArbiter::new(&mut self.world, &mut self.oracle, &mut self.dispatcher);
        let report = self.scheduler.run_until_blocked(&mut arbiter, budget)?;
        self.settle(report);
        Ok(self.phase)
    }

    /// Forwards host input to the human and resumes the scheduler.
    ///
    /// Unrecognized input leaves the session waiting.
    pub fn handle_input(&mut self, input: RawInput) -> Result<SessionPhase, SessionError> {
        let resolution = {
            let mut arbiter =
                MoveArbiter::new(&mut self.world, &mut self.oracle, &mut self.dispatcher);
            self.scheduler.provide_input(input, &mut arbiter)?
        };

        if resolution == InputResolution::Ignored {
            return Ok(self.phase);
        }
        self.phase = SessionPhase::Running;
        self.start()
    }

    /// Removes an actor from the world and the turn order.
    ///
    /// Its cell returns to the free cell pool.
    pub fn despawn(&mut self, actor: ActorId) -> Result<Coordinate, SessionError> {
        let cell = world::despawn(&mut self.world, actor)?;
        let _ = self.scheduler.remove(actor);
        self.pursuers.retain(|pursuer| *pursuer != actor);
        if self.phase == (SessionPhase::AwaitingInput { actor }) {
            self.phase = SessionPhase::Running;
        }
        info!(target: "session", "{actor} left the map at {cell}");
        Ok(cell)
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Configuration the session was built from.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Passability grid produced by the map generator.
    #[must_use]
    pub fn grid(&self) -> &PassabilityGrid {
        &self.grid
    }

    /// Authoritative world state.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Game oracle driving the session.
    #[must_use]
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Identifier of the human actor.
    #[must_use]
    pub const fn human(&self) -> ActorId {
        self.human
    }

    /// Identifiers of the live pursuers in spawn order.
    #[must_use]
    pub fn pursuers(&self) -> &[ActorId] {
        &self.pursuers
    }

    /// Current position of a live actor.
    #[must_use]
    pub fn position_of(&self, actor: ActorId) -> Option<Coordinate> {
        query::position_of(&self.world, actor)
    }

    /// Number of turns consumed so far.
    #[must_use]
    pub const fn turns_taken(&self) -> u64 {
        self.scheduler.turns_taken()
    }

    fn settle(&mut self, report: TurnReport) {
        match report {
            TurnReport::AwaitingInput { actor } => {
                self.phase = SessionPhase::AwaitingInput { actor };
            }
            TurnReport::GameOver { captured, by } => {
                if matches!(self.phase, SessionPhase::GameOver { .. }) {
                    return;
                }
                info!(target: "session", "game over: {by} caught {captured:?}");
                let _ = self.dispatcher.dispatch(&Event::GameOver { captured, by });
                self.phase = SessionPhase::GameOver { captured, by };
            }
            TurnReport::Completed { .. } | TurnReport::Empty | TurnReport::BudgetExhausted => {
                self.phase = SessionPhase::Running;
            }
        }
    }
}

fn validate_map(
    config: &SessionConfig,
    grid: &PassabilityGrid,
    free_cells: &[Coordinate],
) -> Result<(), SessionError> {
    if grid.width() != config.width || grid.height() != config.height {
        return Err(SessionError::MalformedMap(format!(
            "expected a {}x{} grid, generator produced {}x{}",
            config.width,
            config.height,
            grid.width(),
            grid.height()
        )));
    }

    if let Some(cell) = free_cells.iter().find(|cell| !grid.is_passable(**cell)) {
        return Err(SessionError::MalformedMap(format!(
            "free cell {cell} is outside the grid or not passable"
        )));
    }

    Ok(())
}
