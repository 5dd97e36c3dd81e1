use rogue_chase_core::{
    ActorId, Coordinate, Event, EventObserver, GameOracle, InteractOutcome, MoveEffect,
    MoveOutcome, ObjectKind, ObserverError, PassabilityGrid, RawInput, RejectReason,
};
use rogue_chase_system_input::{HumanInput, InputResolution, InputState};
use rogue_chase_world::{self as world, query, ActorTemplate, EventDispatcher, MoveArbiter, World};
use std::{cell::RefCell, rc::Rc};

struct WalledOracle {
    grid: PassabilityGrid,
}

impl GameOracle for WalledOracle {
    fn load_map(&mut self, grid: &PassabilityGrid) {
        self.grid = grid.clone();
    }

    fn is_passable(&self, cell: Coordinate) -> bool {
        self.grid.is_passable(cell)
    }

    fn apply_move(&mut self, _actor: ActorId, _from: Coordinate, _to: Coordinate) -> MoveEffect {
        MoveEffect::default()
    }

    fn place_object(&mut self, _cell: Coordinate, _kind: ObjectKind) {}

    fn interact(&mut self, _actor: ActorId, _at: Coordinate) -> InteractOutcome {
        InteractOutcome::PrizeFound
    }
}

struct Recorder(Rc<RefCell<Vec<Event>>>);

impl EventObserver for Recorder {
    fn notify(&mut self, event: &Event) -> Result<(), ObserverError> {
        self.0.borrow_mut().push(event.clone());
        Ok(())
    }
}

struct Harness {
    world: World,
    oracle: WalledOracle,
    dispatcher: EventDispatcher,
    events: Rc<RefCell<Vec<Event>>>,
    human: ActorId,
}

impl Harness {
    fn new() -> Self {
        let mut world = World::new(3, 3);
        let human = world::spawn(
            &mut world,
            ActorTemplate::HUMAN,
            Coordinate::new(1, 1),
            &mut Vec::new(),
        )
        .expect("spawn human");
        let events: Rc<RefCell<Vec<Event>>> = Rc::default();
        let mut dispatcher = EventDispatcher::new();
        dispatcher.register(Box::new(Recorder(Rc::clone(&events))));

        Self {
            world,
            oracle: WalledOracle {
                grid: PassabilityGrid::from_rows(&["...", "..#", "..."]),
            },
            dispatcher,
            events,
            human,
        }
    }

    fn send(&mut self, strategy: &mut HumanInput, input: RawInput) -> InputResolution {
        let mut arbiter = MoveArbiter::new(&mut self.world, &mut self.oracle, &mut self.dispatcher);
        strategy
            .handle_input(input, &mut arbiter, self.human)
            .expect("human is live")
    }
}

#[test]
fn unrecognized_input_is_idempotent() {
    let mut harness = Harness::new();
    let mut strategy = HumanInput::default();
    strategy.begin_turn();

    for key in ['x', 'q', '?'] {
        assert_eq!(
            harness.send(&mut strategy, RawInput::Char(key)),
            InputResolution::Ignored
        );
        assert_eq!(strategy.state(), InputState::AwaitingInput);
    }
    assert_eq!(
        harness.send(&mut strategy, RawInput::KeyCode(999)),
        InputResolution::Ignored
    );

    assert_eq!(strategy.state(), InputState::AwaitingInput);
    assert_eq!(
        query::position_of(&harness.world, harness.human),
        Some(Coordinate::new(1, 1))
    );
    assert!(harness.events.borrow().is_empty());
}

#[test]
fn blocked_move_consumes_the_turn_without_events() {
    let mut harness = Harness::new();
    let mut strategy = HumanInput::default();
    strategy.begin_turn();

    let resolution = harness.send(&mut strategy, RawInput::KeyCode(39));

    assert_eq!(
        resolution,
        InputResolution::Moved(MoveOutcome::Rejected {
            reason: RejectReason::Blocked
        })
    );
    assert!(resolution.consumed_turn());
    assert_eq!(strategy.state(), InputState::Resolved);
    assert_eq!(
        query::position_of(&harness.world, harness.human),
        Some(Coordinate::new(1, 1))
    );
    assert!(harness.events.borrow().is_empty());
}

#[test]
fn diagonal_move_commits_and_updates_tracker() {
    let mut harness = Harness::new();
    let mut strategy = HumanInput::default();
    strategy.begin_turn();

    let resolution = harness.send(&mut strategy, RawInput::Char('y'));

    assert_eq!(resolution, InputResolution::Moved(MoveOutcome::Committed));
    assert_eq!(
        query::tracked_player(&harness.world),
        Some(Coordinate::new(0, 0))
    );
    assert_eq!(
        *harness.events.borrow(),
        vec![Event::PieceMoved {
            actor: harness.human,
            from: Coordinate::new(1, 1),
            to: Coordinate::new(0, 0),
        }]
    );
}

#[test]
fn input_outside_a_turn_is_ignored() {
    let mut harness = Harness::new();
    let mut strategy = HumanInput::default();

    assert_eq!(
        harness.send(&mut strategy, RawInput::KeyCode(38)),
        InputResolution::Ignored
    );
    assert_eq!(strategy.state(), InputState::Idle);

    strategy.begin_turn();
    assert_eq!(
        harness.send(&mut strategy, RawInput::KeyCode(13)),
        InputResolution::Interacted(InteractOutcome::PrizeFound)
    );
    assert_eq!(
        harness.send(&mut strategy, RawInput::KeyCode(38)),
        InputResolution::Ignored
    );
    assert_eq!(strategy.state(), InputState::Resolved);
}
