#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Keyboard-driven strategy for the human actor.
//!
//! The strategy is a three-state machine. The scheduler calls
//! [`HumanInput::begin_turn`] and then suspends until the host forwards raw
//! input through [`HumanInput::handle_input`]. Only recognized input
//! resolves the turn.

use std::collections::BTreeMap;

use log::debug;
use rogue_chase_core::{ActorId, Direction, Intent, InteractOutcome, MoveOutcome, RawInput};
use rogue_chase_world::{MoveArbiter, WorldError};
use serde::{Deserialize, Serialize};

/// Lifecycle of a human turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum InputState {
    /// No turn has been offered yet.
    #[default]
    Idle,
    /// The scheduler is suspended until recognized input arrives.
    AwaitingInput,
    /// The last offered turn was consumed.
    Resolved,
}

/// Result of forwarding one raw input to the strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputResolution {
    /// The input was unrecognized or arrived outside of a turn.
    Ignored,
    /// A directional intent was submitted to the arbiter.
    Moved(MoveOutcome),
    /// An interaction was submitted to the arbiter.
    Interacted(InteractOutcome),
}

impl InputResolution {
    /// Reports whether the input consumed the human's turn.
    #[must_use]
    pub const fn consumed_turn(&self) -> bool {
        !matches!(self, Self::Ignored)
    }
}

/// Action a key can be bound to in configuration files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyAction {
    /// Step north.
    North,
    /// Step north-east.
    NorthEast,
    /// Step east.
    East,
    /// Step south-east.
    SouthEast,
    /// Step south.
    South,
    /// Step south-west.
    SouthWest,
    /// Step west.
    West,
    /// Step north-west.
    NorthWest,
    /// Interact with the current cell.
    Interact,
}

impl From<KeyAction> for Intent {
    fn from(action: KeyAction) -> Self {
        let direction = match action {
            KeyAction::North => Direction::North,
            KeyAction::NorthEast => Direction::NorthEast,
            KeyAction::East => Direction::East,
            KeyAction::SouthEast => Direction::SouthEast,
            KeyAction::South => Direction::South,
            KeyAction::SouthWest => Direction::SouthWest,
            KeyAction::West => Direction::West,
            KeyAction::NorthWest => Direction::NorthWest,
            KeyAction::Interact => return Intent::Interact,
        };
        Intent::Move(direction)
    }
}

/// Browser key codes in the clockwise direction order starting from north.
const DIRECTION_KEY_CODES: [u32; 8] = [38, 33, 39, 34, 40, 35, 37, 36];
const INTERACT_KEY_CODES: [u32; 2] = [13, 32];
const VI_KEYS: [char; 8] = ['k', 'u', 'l', 'n', 'j', 'b', 'h', 'y'];
const NUMPAD_KEYS: [char; 8] = ['8', '9', '6', '3', '2', '1', '4', '7'];
const DIRECTION_ACTIONS: [KeyAction; 8] = [
    KeyAction::North,
    KeyAction::NorthEast,
    KeyAction::East,
    KeyAction::SouthEast,
    KeyAction::South,
    KeyAction::SouthWest,
    KeyAction::West,
    KeyAction::NorthWest,
];

/// Translation table from raw host input to intents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyMap {
    codes: BTreeMap<u32, KeyAction>,
    chars: BTreeMap<char, KeyAction>,
}

impl KeyMap {
    /// Creates a key map with no bindings.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            codes: BTreeMap::new(),
            chars: BTreeMap::new(),
        }
    }

    /// Binds a numeric key code, replacing any previous binding.
    pub fn bind_code(&mut self, code: u32, action: KeyAction) {
        let _ = self.codes.insert(code, action);
    }

    /// Binds a typed character, replacing any previous binding.
    pub fn bind_char(&mut self, key: char, action: KeyAction) {
        let _ = self.chars.insert(key, action);
    }

    /// Removes a character binding. Returns the action it was bound to.
    pub fn unbind_char(&mut self, key: char) -> Option<KeyAction> {
        self.chars.remove(&key)
    }

    /// Maps raw input to an intent, or `None` when the input is unbound.
    #[must_use]
    pub fn resolve(&self, input: RawInput) -> Option<Intent> {
        let action = match input {
            RawInput::KeyCode(code) => self.codes.get(&code),
            RawInput::Char(key) => self.chars.get(&key),
        };
        action.copied().map(Intent::from)
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        let mut map = Self::empty();
        for (index, action) in DIRECTION_ACTIONS.into_iter().enumerate() {
            map.bind_code(DIRECTION_KEY_CODES[index], action);
            map.bind_char(VI_KEYS[index], action);
            map.bind_char(NUMPAD_KEYS[index], action);
        }
        for code in INTERACT_KEY_CODES {
            map.bind_code(code, KeyAction::Interact);
        }
        for key in [' ', '\r', '\n'] {
            map.bind_char(key, KeyAction::Interact);
        }
        map
    }
}

/// Strategy that waits for the player to choose the human's action.
#[derive(Clone, Debug, Default)]
pub struct HumanInput {
    state: InputState,
    keymap: KeyMap,
}

impl HumanInput {
    /// Creates a strategy using the provided key bindings.
    #[must_use]
    pub fn new(keymap: KeyMap) -> Self {
        Self {
            state: InputState::Idle,
            keymap,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> InputState {
        self.state
    }

    /// Key bindings consulted by [`HumanInput::handle_input`].
    #[must_use]
    pub fn keymap(&self) -> &KeyMap {
        &self.keymap
    }

    /// Offers the human a new turn; the caller must suspend afterwards.
    pub fn begin_turn(&mut self) {
        self.state = InputState::AwaitingInput;
    }

    /// Resolves the pending turn with raw host input.
    ///
    /// Unrecognized input and input arriving outside of a turn are ignored and
    /// leave the state untouched. A recognized intent always consumes the
    /// turn, including a move the arbiter rejects.
    pub fn handle_input(
        &mut self,
        input: RawInput,
        arbiter: &mut MoveArbiter<'_>,
        actor: ActorId,
    ) -> Result<InputResolution, WorldError> {
        if self.state != InputState::AwaitingInput {
            debug!(target: "scheduler", "{actor} ignored {input:?} outside of its turn");
            return Ok(InputResolution::Ignored);
        }

        let Some(intent) = self.keymap.resolve(input) else {
            debug!(target: "scheduler", "{actor} ignored unbound input {input:?}");
            return Ok(InputResolution::Ignored);
        };

        let resolution = match intent {
            Intent::Move(direction) => {
                let target = arbiter.position_of(actor)?.offset(direction);
                InputResolution::Moved(arbiter.attempt_move(actor, target)?)
            }
            Intent::Interact => InputResolution::Interacted(arbiter.interact(actor)?),
        };
        self.state = InputState::Resolved;
        Ok(resolution)
    }
}
