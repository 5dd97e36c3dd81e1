use rogue_chase_core::{
    ActorId, Coordinate, Event, EventObserver, GameOracle, InteractOutcome, MoveEffect,
    MoveOutcome, ObjectKind, ObserverError, PassabilityGrid, RejectReason,
};
use rogue_chase_system_pursuit::{PathfindingPursuit, PursuitAction};
use rogue_chase_world::{self as world, query, ActorTemplate, EventDispatcher, MoveArbiter, World};
use std::{cell::RefCell, rc::Rc};

struct GridOracle(PassabilityGrid);

impl GameOracle for GridOracle {
    fn load_map(&mut self, grid: &PassabilityGrid) {
        self.0 = grid.clone();
    }

    fn is_passable(&self, cell: Coordinate) -> bool {
        self.0.is_passable(cell)
    }

    fn apply_move(&mut self, _actor: ActorId, _from: Coordinate, _to: Coordinate) -> MoveEffect {
        MoveEffect::default()
    }

    fn place_object(&mut self, _cell: Coordinate, _kind: ObjectKind) {}

    fn interact(&mut self, _actor: ActorId, _at: Coordinate) -> InteractOutcome {
        InteractOutcome::NothingHere
    }
}

struct Recorder(Rc<RefCell<Vec<Event>>>);

impl EventObserver for Recorder {
    fn notify(&mut self, event: &Event) -> Result<(), ObserverError> {
        self.0.borrow_mut().push(event.clone());
        Ok(())
    }
}

struct Scenario {
    world: World,
    oracle: GridOracle,
    dispatcher: EventDispatcher,
    events: Rc<RefCell<Vec<Event>>>,
}

impl Scenario {
    fn new(rows: &[&str]) -> Self {
        Self::with_grid(PassabilityGrid::from_rows(rows))
    }

    fn open(width: u32, height: u32) -> Self {
        Self::with_grid(PassabilityGrid::open(width, height))
    }

    fn with_grid(grid: PassabilityGrid) -> Self {
        let events: Rc<RefCell<Vec<Event>>> = Rc::default();
        let mut dispatcher = EventDispatcher::new();
        dispatcher.register(Box::new(Recorder(Rc::clone(&events))));
        Self {
            world: World::new(grid.width(), grid.height()),
            oracle: GridOracle(grid),
            dispatcher,
            events,
        }
    }

    fn spawn(&mut self, template: ActorTemplate, x: i32, y: i32) -> ActorId {
        world::spawn(
            &mut self.world,
            template,
            Coordinate::new(x, y),
            &mut Vec::new(),
        )
        .expect("cell is free")
    }

    fn arbiter(&mut self) -> MoveArbiter<'_> {
        MoveArbiter::new(&mut self.world, &mut self.oracle, &mut self.dispatcher)
    }
}

#[test]
fn pursuer_replans_when_the_human_moves() {
    let mut scenario = Scenario::open(10, 10);
    let human = scenario.spawn(ActorTemplate::HUMAN, 0, 0);
    let pursuer = scenario.spawn(ActorTemplate::PURSUER, 9, 9);
    let mut pursuit = PathfindingPursuit::new();

    let first = pursuit
        .take_turn(&mut scenario.arbiter(), pursuer)
        .expect("pursuer is live");
    assert!(matches!(first, PursuitAction::Moved { .. }));
    assert_eq!(pursuit.destination(), Some(Coordinate::new(0, 0)));
    assert_eq!(pursuit.planned_steps(), 17);

    let human_step = scenario
        .arbiter()
        .attempt_move(human, Coordinate::new(0, 1))
        .expect("human is live");
    assert_eq!(human_step, MoveOutcome::Committed);

    let stale_remaining = pursuit.planned_steps();
    let second = pursuit
        .take_turn(&mut scenario.arbiter(), pursuer)
        .expect("pursuer is live");
    assert!(matches!(second, PursuitAction::Moved { .. }));
    assert_eq!(pursuit.destination(), Some(Coordinate::new(0, 1)));

    let position = query::position_of(&scenario.world, pursuer).expect("pursuer is live");
    assert_eq!(position.manhattan_distance(Coordinate::new(0, 1)), 15);
    assert_eq!(pursuit.planned_steps(), 15);
    assert!(pursuit.planned_steps() + 1 < stale_remaining);
}

#[test]
fn pursuer_closes_in_one_cell_per_turn_until_capture() {
    let mut scenario = Scenario::open(10, 10);
    let _ = scenario.spawn(ActorTemplate::HUMAN, 0, 0);
    let pursuer = scenario.spawn(ActorTemplate::PURSUER, 9, 9);
    let mut pursuit = PathfindingPursuit::new();

    for turn in 1..=17 {
        let action = pursuit
            .take_turn(&mut scenario.arbiter(), pursuer)
            .expect("pursuer is live");
        assert!(
            matches!(action, PursuitAction::Moved { .. }),
            "turn {turn} produced {action:?}"
        );
        let position = query::position_of(&scenario.world, pursuer).expect("pursuer is live");
        assert_eq!(position.manhattan_distance(Coordinate::new(0, 0)), 18 - turn);
    }

    let last = pursuit
        .take_turn(&mut scenario.arbiter(), pursuer)
        .expect("pursuer is live");
    assert!(matches!(last, PursuitAction::Captured { .. }));
    assert_eq!(scenario.events.borrow().len(), 17);
}

#[test]
fn rejected_step_discards_the_cached_path() {
    let mut scenario = Scenario::new(&["....."]);
    let _ = scenario.spawn(ActorTemplate::HUMAN, 0, 0);
    let blocker = scenario.spawn(ActorTemplate::PURSUER, 3, 0);
    let pursuer = scenario.spawn(ActorTemplate::PURSUER, 4, 0);
    let mut pursuit = PathfindingPursuit::new();

    let action = pursuit
        .take_turn(&mut scenario.arbiter(), pursuer)
        .expect("pursuer is live");

    assert_eq!(
        action,
        PursuitAction::Rejected {
            reason: RejectReason::Occupied
        }
    );
    assert_eq!(pursuit.planned_steps(), 0);
    assert_eq!(
        query::position_of(&scenario.world, pursuer),
        Some(Coordinate::new(4, 0))
    );
    assert_eq!(
        query::position_of(&scenario.world, blocker),
        Some(Coordinate::new(3, 0))
    );
    assert!(scenario.events.borrow().is_empty());
}

#[test]
fn unreachable_human_passes_the_turn() {
    let mut scenario = Scenario::new(&["..#..", "..#.."]);
    let _ = scenario.spawn(ActorTemplate::HUMAN, 0, 0);
    let pursuer = scenario.spawn(ActorTemplate::PURSUER, 4, 1);
    let mut pursuit = PathfindingPursuit::new();

    for _ in 0..3 {
        let action = pursuit
            .take_turn(&mut scenario.arbiter(), pursuer)
            .expect("pursuer is live");
        assert_eq!(action, PursuitAction::Passed);
    }

    assert_eq!(pursuit.planned_steps(), 0);
    assert!(scenario.events.borrow().is_empty());
}
