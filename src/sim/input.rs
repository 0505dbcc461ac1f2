//! Key events to intents
//!
//! Raw key-down/key-up events are folded into a held set plus a latched
//! "pressed since last sample" set. The tick samples once, so key auto-repeat
//! never moves the player more than once per tick, and a quick tap between
//! two ticks is still seen.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Normalized input actions, independent of the physical key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    /// Fire / flap
    PrimaryAction,
    /// Alternate action (fire for flap-controlled games)
    SecondaryAction,
}

impl Intent {
    pub const ALL: [Intent; 6] = [
        Intent::MoveLeft,
        Intent::MoveRight,
        Intent::MoveUp,
        Intent::MoveDown,
        Intent::PrimaryAction,
        Intent::SecondaryAction,
    ];

    #[inline]
    fn bit(self) -> u8 {
        1 << (self as u8)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "moveleft" | "left" => Some(Intent::MoveLeft),
            "moveright" | "right" => Some(Intent::MoveRight),
            "moveup" | "up" => Some(Intent::MoveUp),
            "movedown" | "down" => Some(Intent::MoveDown),
            "primaryaction" | "primary" | "fire" => Some(Intent::PrimaryAction),
            "secondaryaction" | "secondary" => Some(Intent::SecondaryAction),
            _ => None,
        }
    }
}

/// Compact set of intents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IntentFlags(u8);

impl IntentFlags {
    #[inline]
    pub fn contains(self, intent: Intent) -> bool {
        self.0 & intent.bit() != 0
    }

    #[inline]
    pub fn insert(&mut self, intent: Intent) {
        self.0 |= intent.bit();
    }

    #[inline]
    pub fn remove(&mut self, intent: Intent) {
        self.0 &= !intent.bit();
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// One tick's view of the input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IntentSet {
    /// Intents whose key is currently down
    pub held: IntentFlags,
    /// Intents that went down since the previous sample
    pub pressed: IntentFlags,
}

impl IntentSet {
    pub fn held(&self, intent: Intent) -> bool {
        self.held.contains(intent)
    }

    pub fn pressed(&self, intent: Intent) -> bool {
        self.pressed.contains(intent)
    }

    /// Build a set with the given intents both held and freshly pressed
    pub fn from_pressed(intents: &[Intent]) -> Self {
        let mut set = Self::default();
        for &intent in intents {
            set.held.insert(intent);
            set.pressed.insert(intent);
        }
        set
    }

    /// Build a set with the given intents held but not freshly pressed
    pub fn from_held(intents: &[Intent]) -> Self {
        let mut set = Self::default();
        for &intent in intents {
            set.held.insert(intent);
        }
        set
    }

    /// Horizontal axis from held left/right (-1, 0, +1)
    pub fn axis_x(&self) -> f32 {
        (self.held(Intent::MoveRight) as i8 - self.held(Intent::MoveLeft) as i8) as f32
    }

    /// Vertical axis from held up/down (-1 up, +1 down, screen space)
    pub fn axis_y(&self) -> f32 {
        (self.held(Intent::MoveDown) as i8 - self.held(Intent::MoveUp) as i8) as f32
    }
}

/// Key name (DOM `KeyboardEvent.key` spelling) to intent table
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeyBindings {
    keys: HashMap<String, Intent>,
}

impl KeyBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arrow keys to move, space for primary, shift for secondary
    pub fn arrows_and_space() -> Self {
        let mut bindings = Self::new();
        bindings.bind("ArrowLeft", Intent::MoveLeft);
        bindings.bind("ArrowRight", Intent::MoveRight);
        bindings.bind("ArrowUp", Intent::MoveUp);
        bindings.bind("ArrowDown", Intent::MoveDown);
        bindings.bind(" ", Intent::PrimaryAction);
        bindings.bind("Shift", Intent::SecondaryAction);
        bindings
    }

    /// WASD to move, space for primary, `e` for secondary
    pub fn wasd() -> Self {
        let mut bindings = Self::new();
        bindings.bind("a", Intent::MoveLeft);
        bindings.bind("d", Intent::MoveRight);
        bindings.bind("w", Intent::MoveUp);
        bindings.bind("s", Intent::MoveDown);
        bindings.bind(" ", Intent::PrimaryAction);
        bindings.bind("e", Intent::SecondaryAction);
        bindings
    }

    /// Arrows and WASD together
    pub fn arrows_and_wasd() -> Self {
        let mut bindings = Self::arrows_and_space();
        for (key, intent) in Self::wasd().keys {
            bindings.keys.entry(key).or_insert(intent);
        }
        bindings
    }

    /// Bind a key, replacing any existing binding for it
    pub fn bind(&mut self, key: impl Into<String>, intent: Intent) {
        self.keys.insert(normalize_key(&key.into()), intent);
    }

    pub fn unbind(&mut self, key: &str) {
        self.keys.remove(&normalize_key(key));
    }

    pub fn lookup(&self, key: &str) -> Option<Intent> {
        self.keys.get(&normalize_key(key)).copied()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Single letters are case-insensitive so caps lock doesn't break WASD
fn normalize_key(key: &str) -> String {
    if key.chars().count() == 1 {
        key.to_lowercase()
    } else {
        key.to_string()
    }
}

/// Stateful mapper fed by the shell's key events, sampled by the tick
#[derive(Debug, Clone, Default)]
pub struct InputMapper {
    bindings: KeyBindings,
    /// Physical keys currently down (for auto-repeat suppression)
    down_keys: HashSet<String>,
    pressed: IntentFlags,
}

impl InputMapper {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            down_keys: HashSet::new(),
            pressed: IntentFlags::default(),
        }
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    /// Key went down. Returns the mapped intent, or `None` for unbound keys.
    pub fn key_down(&mut self, key: &str) -> Option<Intent> {
        let Some(intent) = self.bindings.lookup(key) else {
            log::trace!("Ignoring unbound key {:?}", key);
            return None;
        };
        // Auto-repeat: key is already down, don't latch another press
        if self.down_keys.insert(normalize_key(key)) {
            self.pressed.insert(intent);
        }
        Some(intent)
    }

    /// Key went up
    pub fn key_up(&mut self, key: &str) -> Option<Intent> {
        let intent = self.bindings.lookup(key)?;
        self.down_keys.remove(&normalize_key(key));
        Some(intent)
    }

    /// Current held flags (any bound key down)
    pub fn held(&self) -> IntentFlags {
        let mut held = IntentFlags::default();
        for key in &self.down_keys {
            if let Some(intent) = self.bindings.lookup(key) {
                held.insert(intent);
            }
        }
        held
    }

    /// Take this tick's snapshot and clear the latched presses
    pub fn sample(&mut self) -> IntentSet {
        let set = IntentSet {
            held: self.held(),
            pressed: self.pressed,
        };
        self.pressed = IntentFlags::default();
        set
    }

    /// Forget all keys (focus loss, pause, stop)
    pub fn release_all(&mut self) {
        self.down_keys.clear();
        self.pressed = IntentFlags::default();
    }
}
