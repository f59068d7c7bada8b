//! Control mapping
//!
//! Keyboard and touch events arrive asynchronously between frames. They are
//! folded into a `ControlState`, and the frame loop polls one `TickInput`
//! snapshot from it before each tick.

use crate::sim::tick::TickInput;

/// A logical control, whatever device it came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Left,
    Right,
    Jump,
    Crouch,
}

impl Control {
    /// Map a `KeyboardEvent` by its `key` and `code`
    pub fn from_key(key: &str, code: &str) -> Option<Self> {
        match (key, code) {
            ("a" | "A" | "ArrowLeft", _) => Some(Control::Left),
            ("d" | "D" | "ArrowRight", _) => Some(Control::Right),
            ("Shift", _) => Some(Control::Crouch),
            (_, "Space") => Some(Control::Jump),
            _ => None,
        }
    }

    /// Map an on-screen touch button by element id
    pub fn from_button_id(id: &str) -> Option<Self> {
        match id {
            "left-btn" => Some(Control::Left),
            "right-btn" => Some(Control::Right),
            "jump-btn" => Some(Control::Jump),
            "crouch-btn" => Some(Control::Crouch),
            _ => None,
        }
    }

    /// Element ids of the touch buttons, in binding order
    pub const BUTTON_IDS: [&'static str; 4] = ["left-btn", "right-btn", "jump-btn", "crouch-btn"];
}

/// Held controls plus a latched jump press
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlState {
    left: bool,
    right: bool,
    crouch: bool,
    jump_held: bool,
    /// Set on a fresh jump press, consumed by the next snapshot
    jump_pending: bool,
}

impl ControlState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, control: Control) {
        match control {
            Control::Left => self.left = true,
            Control::Right => self.right = true,
            Control::Crouch => self.crouch = true,
            Control::Jump => {
                // Key repeat must not queue another jump
                if !self.jump_held {
                    self.jump_pending = true;
                }
                self.jump_held = true;
            }
        }
    }

    pub fn release(&mut self, control: Control) {
        match control {
            Control::Left => self.left = false,
            Control::Right => self.right = false,
            Control::Crouch => self.crouch = false,
            Control::Jump => self.jump_held = false,
        }
    }

    /// Returns true when the key is bound
    pub fn key_down(&mut self, key: &str, code: &str) -> bool {
        match Control::from_key(key, code) {
            Some(control) => {
                self.press(control);
                true
            }
            None => false,
        }
    }

    pub fn key_up(&mut self, key: &str, code: &str) -> bool {
        match Control::from_key(key, code) {
            Some(control) => {
                self.release(control);
                true
            }
            None => false,
        }
    }

    /// Intent for the next tick; a jump press is delivered exactly once
    pub fn snapshot(&mut self) -> TickInput {
        let input = TickInput {
            move_left: self.left,
            move_right: self.right,
            jump_requested: self.jump_pending,
            crouch_held: self.crouch,
        };
        self.jump_pending = false;
        input
    }

    /// Drop everything (focus lost, new run)
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
