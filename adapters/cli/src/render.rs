//! Glyph grid rendering of the session event stream.

use std::{
    cell::RefCell,
    collections::{BTreeMap, HashMap},
    fmt::Write as _,
    rc::Rc,
};

use rogue_chase_core::{
    ActorColor, ActorId, Coordinate, Event, EventObserver, InteractOutcome, ObjectKind,
    ObserverError, PassabilityGrid,
};
use rogue_chase_dungeon::Tile;

const MESSAGE_HISTORY: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Sprite {
    at: Coordinate,
    glyph: char,
    color: ActorColor,
}

/// Terminal picture of the dungeon assembled from session events.
#[derive(Clone, Debug)]
pub(crate) struct Screen {
    grid: PassabilityGrid,
    objects: HashMap<Coordinate, ObjectKind>,
    actors: BTreeMap<ActorId, Sprite>,
    messages: Vec<String>,
    color: bool,
}

impl Screen {
    /// Creates a screen that draws nothing until a grid is loaded.
    pub(crate) fn new(color: bool) -> Self {
        Self {
            grid: PassabilityGrid::blocked(0, 0),
            objects: HashMap::new(),
            actors: BTreeMap::new(),
            messages: Vec::new(),
            color,
        }
    }

    /// Replaces the dungeon layout drawn beneath objects and actors.
    pub(crate) fn load_grid(&mut self, grid: &PassabilityGrid) {
        self.grid = grid.clone();
    }

    /// Applies a session event to the picture.
    pub(crate) fn apply(&mut self, event: &Event) -> Result<(), ObserverError> {
        match event {
            Event::ActorSpawned {
                actor,
                at,
                glyph,
                color,
                ..
            } => {
                let _ = self.actors.insert(
                    *actor,
                    Sprite {
                        at: *at,
                        glyph: *glyph,
                        color: *color,
                    },
                );
            }
            Event::ObjectPlaced { at, kind } => {
                let _ = self.objects.insert(*at, *kind);
            }
            Event::PieceMoved { actor, to, .. } => {
                let sprite = self
                    .actors
                    .get_mut(actor)
                    .ok_or_else(|| ObserverError::new(format!("no sprite for actor {actor}")))?;
                sprite.at = *to;
            }
            Event::ActorPromoted { actor, at } => {
                self.say(format!("{actor} was promoted at {at}."));
            }
            Event::Interacted { at, outcome, .. } => {
                let message = match outcome {
                    InteractOutcome::NothingHere => "There's no prize box here.",
                    InteractOutcome::Trap { .. } => "Uh, oh; it's a trap!",
                    InteractOutcome::PrizeFound => "Congratulations! You've found the prize!!",
                };
                if *outcome != InteractOutcome::NothingHere {
                    let _ = self.objects.remove(at);
                }
                self.say(message.to_owned());
            }
            Event::Captured { .. } => {
                self.say("The Borrowmir has caught you!".to_owned());
            }
            Event::GameOver { .. } => {
                self.say("Game over.".to_owned());
            }
        }
        Ok(())
    }

    /// Draws the dungeon followed by the most recent messages.
    pub(crate) fn render(&self) -> String {
        let sprites: HashMap<Coordinate, Sprite> = self
            .actors
            .values()
            .map(|sprite| (sprite.at, *sprite))
            .collect();

        let mut frame = String::new();
        for y in 0..self.grid.height() {
            for x in 0..self.grid.width() {
                let (Ok(x), Ok(y)) = (i32::try_from(x), i32::try_from(y)) else {
                    continue;
                };
                let cell = Coordinate::new(x, y);
                match sprites.get(&cell) {
                    Some(sprite) => self.draw_sprite(&mut frame, sprite),
                    None => frame.push(self.terrain(cell).glyph()),
                }
            }
            frame.push('\n');
        }
        for message in &self.messages {
            frame.push_str(message);
            frame.push('\n');
        }
        frame
    }

    fn terrain(&self, cell: Coordinate) -> Tile {
        if self.objects.contains_key(&cell) {
            Tile::Box
        } else if self.grid.is_passable(cell) {
            Tile::Floor
        } else {
            Tile::Wall
        }
    }

    fn draw_sprite(&self, frame: &mut String, sprite: &Sprite) {
        if self.color {
            let color = sprite.color;
            let _ = write!(
                frame,
                "\x1b[38;2;{};{};{}m{}\x1b[0m",
                color.red(),
                color.green(),
                color.blue(),
                sprite.glyph
            );
        } else {
            frame.push(sprite.glyph);
        }
    }

    fn say(&mut self, message: String) {
        self.messages.push(message);
        if self.messages.len() > MESSAGE_HISTORY {
            let _ = self.messages.remove(0);
        }
    }
}

/// Observer that forwards session events into a shared [`Screen`].
pub(crate) struct ScreenObserver {
    screen: Rc<RefCell<Screen>>,
}

impl ScreenObserver {
    /// Wraps a shared screen.
    pub(crate) fn new(screen: Rc<RefCell<Screen>>) -> Self {
        Self { screen }
    }
}

impl EventObserver for ScreenObserver {
    fn notify(&mut self, event: &Event) -> Result<(), ObserverError> {
        self.screen.borrow_mut().apply(event)
    }
}
