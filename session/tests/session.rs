use std::{cell::RefCell, rc::Rc};

use rogue_chase_core::{
    ActorColor, ActorKind, Event, EventObserver, GeneratedMap, MapGenerator, ObjectKind,
    ObserverError, PassabilityGrid, RawInput,
};
use rogue_chase_dungeon::{Digger, Dungeon};
use rogue_chase_session::{GameSession, SessionConfig, SessionError, SessionPhase};
use rogue_chase_world::{query, PoolError};

type Log = Rc<RefCell<Vec<Event>>>;

struct Recorder(Log);

impl EventObserver for Recorder {
    fn notify(&mut self, event: &Event) -> Result<(), ObserverError> {
        self.0.borrow_mut().push(event.clone());
        Ok(())
    }
}

struct FixedMap(PassabilityGrid);

impl MapGenerator for FixedMap {
    fn generate(&mut self, _height: u32, _width: u32) -> GeneratedMap {
        GeneratedMap {
            grid: self.0.clone(),
            free_cells: self.0.passable_cells().collect(),
        }
    }
}

fn recorder() -> (Log, Vec<Box<dyn EventObserver>>) {
    let log: Log = Rc::default();
    let observers: Vec<Box<dyn EventObserver>> = vec![Box::new(Recorder(Rc::clone(&log)))];
    (log, observers)
}

fn classic(seed: u64) -> (GameSession<Dungeon>, Log) {
    let (log, observers) = recorder();
    let config = SessionConfig {
        seed,
        ..SessionConfig::default()
    };
    let mut digger = Digger::new(seed);
    let session =
        GameSession::new(config, &mut digger, Dungeon::new(), observers).expect("valid session");
    (session, log)
}

fn corridor(width: usize, pursuer_count: usize) -> SessionConfig {
    SessionConfig {
        width: u32::try_from(width).expect("small width"),
        height: 1,
        box_count: 0,
        pursuer_count,
        ..SessionConfig::default()
    }
}

#[test]
fn setup_places_boxes_then_spawns_human_and_pursuer() {
    let (session, log) = classic(11);
    let events = log.borrow();

    assert_eq!(events.len(), 12);
    let kinds: Vec<_> = events[..10]
        .iter()
        .map(|event| match event {
            Event::ObjectPlaced { kind, .. } => *kind,
            other => panic!("unexpected setup event {other:?}"),
        })
        .collect();
    assert!(kinds[..9].iter().all(|kind| *kind == ObjectKind::Box));
    assert_eq!(kinds[9], ObjectKind::Prize);

    assert_eq!(
        events[10],
        Event::ActorSpawned {
            actor: session.human(),
            kind: ActorKind::Human,
            at: session.position_of(session.human()).expect("human is live"),
            glyph: '@',
            color: ActorColor::from_hex("#ff0").expect("valid color"),
        }
    );
    assert!(matches!(
        events[11],
        Event::ActorSpawned {
            kind: ActorKind::Pursuer,
            glyph: 'B',
            ..
        }
    ));

    assert_eq!(session.phase(), SessionPhase::Running);
    assert_eq!(session.pursuers().len(), 1);
    assert_eq!(
        query::tracked_player(session.world()),
        session.position_of(session.human())
    );
    assert_eq!(session.oracle().boxes_remaining(), 10);
}

#[test]
fn start_suspends_on_the_human() {
    let (mut session, _) = classic(5);
    let human = session.human();
    assert_eq!(
        session.start().expect("session runs"),
        SessionPhase::AwaitingInput { actor: human }
    );
    assert_eq!(session.turns_taken(), 0);

    assert_eq!(
        session.handle_input(RawInput::Char('x')).expect("session runs"),
        SessionPhase::AwaitingInput { actor: human }
    );
    assert_eq!(session.turns_taken(), 0);
}

#[test]
fn capture_emits_game_over_exactly_once() {
    let (log, observers) = recorder();
    let mut generator = FixedMap(PassabilityGrid::open(6, 1));
    let mut session = GameSession::new(corridor(6, 1), &mut generator, Dungeon::new(), observers)
        .expect("valid session");
    let human = session.human();
    let pursuer = session.pursuers()[0];

    let mut phase = session.start().expect("session runs");
    let mut guard = 0;
    while let SessionPhase::AwaitingInput { .. } = phase {
        phase = session.handle_input(RawInput::Char(' ')).expect("session runs");
        guard += 1;
        assert!(guard < 20, "pursuer never arrived");
    }

    assert_eq!(
        phase,
        SessionPhase::GameOver {
            captured: Some(human),
            by: pursuer,
        }
    );
    let game_overs = |log: &Log| {
        log.borrow()
            .iter()
            .filter(|event| matches!(event, Event::GameOver { .. }))
            .count()
    };
    assert_eq!(game_overs(&log), 1);
    assert_eq!(
        log.borrow().last(),
        Some(&Event::GameOver {
            captured: Some(human),
            by: pursuer,
        })
    );

    let recorded = log.borrow().len();
    assert_eq!(session.start().expect("session ended"), phase);
    assert_eq!(
        session.handle_input(RawInput::KeyCode(37)).expect("session ended"),
        phase
    );
    assert_eq!(log.borrow().len(), recorded);
    assert_eq!(game_overs(&log), 1);
}

#[test]
fn exhausted_pool_aborts_construction() {
    let (log, observers) = recorder();
    let mut generator = FixedMap(PassabilityGrid::open(3, 1));
    let config = SessionConfig {
        width: 3,
        height: 1,
        ..SessionConfig::default()
    };

    let result = GameSession::new(config, &mut generator, Dungeon::new(), observers);

    assert!(matches!(result, Err(SessionError::Pool(PoolError::Empty))));
    assert!(log.borrow().is_empty());
}

#[test]
fn mismatched_map_is_malformed() {
    let (_, observers) = recorder();
    let mut generator = FixedMap(PassabilityGrid::open(8, 8));
    let result = GameSession::new(corridor(6, 1), &mut generator, Dungeon::new(), observers);
    assert!(matches!(result, Err(SessionError::MalformedMap(_))));
}

#[test]
fn despawned_pursuer_frees_its_cell_and_stops_playing() {
    let (_, observers) = recorder();
    let mut generator = FixedMap(PassabilityGrid::open(10, 1));
    let mut session = GameSession::new(corridor(10, 2), &mut generator, Dungeon::new(), observers)
        .expect("valid session");
    let doomed = session.pursuers()[1];
    let free_before = query::free_cells(session.world()).len();

    let cell = session.despawn(doomed).expect("pursuer is live");

    assert!(query::free_cells(session.world()).contains(cell));
    assert_eq!(query::free_cells(session.world()).len(), free_before + 1);
    assert_eq!(session.pursuers().len(), 1);
    assert_eq!(session.position_of(doomed), None);
    assert!(matches!(
        session.despawn(doomed),
        Err(SessionError::World(_))
    ));
}
