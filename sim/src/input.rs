//! Keyboard state table consulted by the vehicle and the road-kit editor.
//!
//! The client feeds key-down/key-up events in at the top of the frame; the
//! simulation only ever reads a settled snapshot during a tick.

use std::collections::HashSet;

/// Logical keys the simulation cares about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    ArrowUp,
    ArrowLeft,
    ArrowDown,
    ArrowRight,
    Space,
    E,
    Q,
    Delete,
}

/// Pressed/released table keyed by [`Key`].
///
/// Never reset implicitly: a key only goes up on an explicit `release`.
#[derive(Clone, Debug, Default)]
pub struct InputState {
    pressed: HashSet<Key>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: Key) {
        self.pressed.insert(key);
    }

    pub fn release(&mut self, key: Key) {
        self.pressed.remove(&key);
    }

    #[inline]
    pub fn is_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    #[inline]
    pub fn any_pressed(&self, keys: &[Key]) -> bool {
        keys.iter().any(|k| self.is_pressed(*k))
    }

    pub fn forward(&self) -> bool {
        self.any_pressed(&[Key::W, Key::ArrowUp])
    }

    pub fn back(&self) -> bool {
        self.any_pressed(&[Key::S, Key::ArrowDown])
    }

    pub fn left(&self) -> bool {
        self.any_pressed(&[Key::A, Key::ArrowLeft])
    }

    pub fn right(&self) -> bool {
        self.any_pressed(&[Key::D, Key::ArrowRight])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_alias_wasd() {
        let mut input = InputState::new();
        input.press(Key::ArrowUp);
        assert!(input.forward());
        input.release(Key::ArrowUp);
        assert!(!input.forward());

        input.press(Key::D);
        input.press(Key::ArrowLeft);
        assert!(input.left());
        assert!(input.right());
    }

    #[test]
    fn release_of_unpressed_key_is_harmless() {
        let mut input = InputState::new();
        input.release(Key::Space);
        assert!(!input.is_pressed(Key::Space));
    }
}
