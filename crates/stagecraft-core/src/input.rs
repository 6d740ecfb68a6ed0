//! # Input Module
//!
//! Keyboard state with named actions, passed explicitly to
//! `Scene::handle_input`.
//!
//! The platform layer reports key transitions with `set_key_state` and calls
//! `end_frame` once per frame; "just pressed/released" compare the current
//! frame against the previous one.

use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Platform key code.
pub type KeyCode = u32;

#[derive(Debug, Default, Clone)]
pub struct InputState {
    actions: HashMap<String, KeyCode>,
    current: HashSet<KeyCode>,
    previous: HashSet<KeyCode>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds an action name to a key, replacing any previous binding.
    pub fn map_action(&mut self, action: &str, key: KeyCode) {
        debug!(action, key, "action mapped");
        self.actions.insert(action.to_string(), key);
    }

    pub fn action_key(&self, action: &str) -> Option<KeyCode> {
        self.actions.get(action).copied()
    }

    pub fn clear_actions(&mut self) {
        self.actions.clear();
    }

    pub fn set_key_state(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            self.current.insert(key);
        } else {
            self.current.remove(&key);
        }
    }

    /// Rolls the current key states over into the previous frame.
    pub fn end_frame(&mut self) {
        self.previous.clone_from(&self.current);
    }

    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.current.contains(&key)
    }

    pub fn is_key_just_pressed(&self, key: KeyCode) -> bool {
        self.current.contains(&key) && !self.previous.contains(&key)
    }

    pub fn is_key_just_released(&self, key: KeyCode) -> bool {
        !self.current.contains(&key) && self.previous.contains(&key)
    }

    /// Unmapped actions are never pressed.
    pub fn is_action_pressed(&self, action: &str) -> bool {
        self.action_key(action)
            .is_some_and(|k| self.is_key_pressed(k))
    }

    pub fn is_action_just_pressed(&self, action: &str) -> bool {
        self.action_key(action)
            .is_some_and(|k| self.is_key_just_pressed(k))
    }

    pub fn is_action_just_released(&self, action: &str) -> bool {
        self.action_key(action)
            .is_some_and(|k| self.is_key_just_released(k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_just_pressed_lasts_one_frame() {
        let mut input = InputState::new();
        input.map_action("jump", 32);
        input.set_key_state(32, true);
        assert!(input.is_action_just_pressed("jump"));
        input.end_frame();
        assert!(input.is_action_pressed("jump"));
        assert!(!input.is_action_just_pressed("jump"));
        input.set_key_state(32, false);
        assert!(input.is_action_just_released("jump"));
        assert!(!input.is_action_pressed("missing"));
    }
}
