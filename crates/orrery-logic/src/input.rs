//! Control intents produced by the raw input adapters.
//!
//! Boolean intents persist until an explicit release (key-up, touch-end).
//! Pointer and touch deltas accumulate between frames and are consumed
//! once by the navigation controller.

/// A movement intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    Forward,
    Backward,
    StrafeLeft,
    StrafeRight,
    Ascend,
    Descend,
    Boost,
}

/// Keys the adapters care about, independent of any windowing library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Space,
    KeyC,
    Escape,
}

/// Mouse buttons relevant to the controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
}

/// Key binding table. `Escape` has no intent; the gate handles it.
pub fn intent_for_key(key: Key) -> Option<Intent> {
    match key {
        Key::ArrowUp => Some(Intent::Forward),
        Key::ArrowDown => Some(Intent::Backward),
        Key::ArrowLeft => Some(Intent::StrafeLeft),
        Key::ArrowRight => Some(Intent::StrafeRight),
        Key::Space => Some(Intent::Ascend),
        Key::KeyC => Some(Intent::Descend),
        Key::Escape => None,
    }
}

/// Holding the right button boosts.
pub fn intent_for_button(button: PointerButton) -> Option<Intent> {
    match button {
        PointerButton::Right => Some(Intent::Boost),
        _ => None,
    }
}

/// Per-frame control input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControlState {
    pub move_forward: bool,
    pub move_backward: bool,
    pub strafe_left: bool,
    pub strafe_right: bool,
    pub ascend: bool,
    pub descend: bool,
    pub boost: bool,
    /// Accumulated mouse movement (pixels) since last consumption.
    pub pointer_delta: (f64, f64),
    /// Accumulated touch-drag movement (pixels) since last consumption.
    pub touch_delta: (f64, f64),
}

impl ControlState {
    pub fn set_intent(&mut self, intent: Intent, active: bool) {
        match intent {
            Intent::Forward => self.move_forward = active,
            Intent::Backward => self.move_backward = active,
            Intent::StrafeLeft => self.strafe_left = active,
            Intent::StrafeRight => self.strafe_right = active,
            Intent::Ascend => self.ascend = active,
            Intent::Descend => self.descend = active,
            Intent::Boost => self.boost = active,
        }
    }

    /// Apply a key press or release. Returns `true` if the key is bound.
    pub fn apply_key(&mut self, key: Key, pressed: bool) -> bool {
        match intent_for_key(key) {
            Some(intent) => {
                self.set_intent(intent, pressed);
                true
            }
            None => false,
        }
    }

    /// Whether any of the six movement intents is active. Boost alone does
    /// not count.
    pub fn any_movement(&self) -> bool {
        self.move_forward
            || self.move_backward
            || self.strafe_left
            || self.strafe_right
            || self.ascend
            || self.descend
    }

    pub fn add_pointer_delta(&mut self, dx: f64, dy: f64) {
        self.pointer_delta.0 += dx;
        self.pointer_delta.1 += dy;
    }

    pub fn add_touch_delta(&mut self, dx: f64, dy: f64) {
        self.touch_delta.0 += dx;
        self.touch_delta.1 += dy;
    }

    /// Take and zero the accumulated pointer and touch deltas.
    pub fn take_deltas(&mut self) -> ((f64, f64), (f64, f64)) {
        (
            std::mem::take(&mut self.pointer_delta),
            std::mem::take(&mut self.touch_delta),
        )
    }

    /// Release every intent and discard pending deltas.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Apply the on-screen joystick. Only the four planar intents are
    /// touched; ascend/descend/boost keep their own buttons.
    pub fn apply_joystick(&mut self, joystick: JoystickIntents) {
        self.move_forward = joystick.forward;
        self.move_backward = joystick.backward;
        self.strafe_left = joystick.left;
        self.strafe_right = joystick.right;
    }

    pub fn release_joystick(&mut self) {
        self.apply_joystick(JoystickIntents::default());
    }
}

/// Radius (pixels) the joystick knob can travel from its centre.
pub const JOYSTICK_RADIUS: f64 = 35.0;

/// Normalised axis magnitude below which the joystick reports nothing.
pub const JOYSTICK_DEAD_ZONE: f64 = 0.15;

/// Planar intents derived from a joystick drag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoystickIntents {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

/// Map a drag offset from the joystick centre (screen pixels, `+y` down)
/// to planar intents.
pub fn joystick_intents(dx: f64, dy: f64) -> JoystickIntents {
    let distance = (dx * dx + dy * dy).sqrt();
    let (x, y) = if distance > JOYSTICK_RADIUS {
        (dx / distance * JOYSTICK_RADIUS, dy / distance * JOYSTICK_RADIUS)
    } else {
        (dx, dy)
    };
    let nx = x / JOYSTICK_RADIUS;
    let ny = y / JOYSTICK_RADIUS;

    let mut out = JoystickIntents::default();
    if ny.abs() > JOYSTICK_DEAD_ZONE {
        if ny < 0.0 {
            out.forward = true;
        } else {
            out.backward = true;
        }
    }
    if nx.abs() > JOYSTICK_DEAD_ZONE {
        if nx < 0.0 {
            out.left = true;
        } else {
            out.right = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrow_bindings() {
        let mut c = ControlState::default();
        assert!(c.apply_key(Key::ArrowUp, true));
        assert!(c.apply_key(Key::Space, true));
        assert!(c.move_forward && c.ascend);
        c.apply_key(Key::ArrowUp, false);
        assert!(!c.move_forward);
        assert!(c.ascend, "intents persist until released");
    }

    #[test]
    fn escape_is_not_an_intent() {
        let mut c = ControlState::default();
        assert!(!c.apply_key(Key::Escape, true));
        assert_eq!(c, ControlState::default());
    }

    #[test]
    fn boost_alone_is_not_movement() {
        let mut c = ControlState::default();
        c.set_intent(Intent::Boost, true);
        assert!(!c.any_movement());
        c.set_intent(Intent::Descend, true);
        assert!(c.any_movement());
    }

    #[test]
    fn right_button_boosts() {
        assert_eq!(intent_for_button(PointerButton::Right), Some(Intent::Boost));
        assert_eq!(intent_for_button(PointerButton::Left), None);
    }

    #[test]
    fn deltas_are_zeroed_after_take() {
        let mut c = ControlState::default();
        c.add_pointer_delta(3.0, -2.0);
        c.add_pointer_delta(1.0, 1.0);
        c.add_touch_delta(5.0, 0.0);
        let (pointer, touch) = c.take_deltas();
        assert_eq!(pointer, (4.0, -1.0));
        assert_eq!(touch, (5.0, 0.0));
        assert_eq!(c.take_deltas(), ((0.0, 0.0), (0.0, 0.0)));
    }

    #[test]
    fn joystick_dead_zone() {
        assert_eq!(joystick_intents(3.0, -4.0), JoystickIntents::default());
    }

    #[test]
    fn joystick_up_left_diagonal() {
        let j = joystick_intents(-30.0, -30.0);
        assert!(j.forward && j.left);
        assert!(!j.backward && !j.right);
    }

    #[test]
    fn joystick_clamps_far_drags() {
        // Far below the knob radius horizontally: only backward survives.
        let j = joystick_intents(2.0, 500.0);
        assert!(j.backward);
        assert!(!j.left && !j.right);
    }

    #[test]
    fn joystick_release_keeps_vertical_and_boost() {
        let mut c = ControlState::default();
        c.ascend = true;
        c.boost = true;
        c.apply_joystick(joystick_intents(0.0, -35.0));
        assert!(c.move_forward);
        c.release_joystick();
        assert!(!c.move_forward);
        assert!(c.ascend && c.boost);
    }
}
