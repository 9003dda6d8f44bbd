//! Raw input adapters: keyboard, mouse, touch and window focus.
//!
//! Translates Bevy input into session calls. All decisions (what a click
//! means, whether motion counts) are made by the session.

use bevy::input::mouse::MouseMotion;
use bevy::input::touch::Touch;
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, PrimaryWindow, WindowFocused};
use orrery_logic::input::{Key, PointerButton};
use orrery_logic::interaction::{ClickOutcome, PointerLockPort};

use crate::state::{CursorLock, ModalView, Session, TouchRoles};

const KEY_BINDINGS: [(KeyCode, Key); 7] = [
    (KeyCode::ArrowUp, Key::ArrowUp),
    (KeyCode::ArrowDown, Key::ArrowDown),
    (KeyCode::ArrowLeft, Key::ArrowLeft),
    (KeyCode::ArrowRight, Key::ArrowRight),
    (KeyCode::Space, Key::Space),
    (KeyCode::KeyC, Key::KeyC),
    (KeyCode::Escape, Key::Escape),
];

const QUICK_TRAVEL: [KeyCode; 9] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
    KeyCode::Digit8,
    KeyCode::Digit9,
];

/// Touches starting in the left third of the screen drive the joystick.
const JOYSTICK_ZONE_FRACTION: f32 = 1.0 / 3.0;

pub fn keyboard_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut session: ResMut<Session>,
    mut lock: ResMut<CursorLock>,
) {
    for (code, key) in KEY_BINDINGS {
        if keyboard.just_pressed(code) {
            let handled = session.0.on_key(key, true);
            // Escape with no modal to close gives the cursor back.
            if key == Key::Escape && !handled && lock.is_engaged() {
                lock.release();
                session.0.on_pointer_lock_changed(false, &mut *lock);
            }
        }
        if keyboard.just_released(code) {
            session.0.on_key(key, false);
        }
    }

    if !session.0.startup().controls_enabled() {
        return;
    }
    for (i, code) in QUICK_TRAVEL.iter().enumerate() {
        if keyboard.just_pressed(*code) {
            let name = session.0.scene().bodies().get(i).map(|b| b.name.clone());
            if let Some(name) = name {
                session.0.navigate_to(&name);
            }
        }
    }
}

pub fn mouse_input(
    buttons: Res<ButtonInput<MouseButton>>,
    mut motion_events: EventReader<MouseMotion>,
    mut session: ResMut<Session>,
    mut modal: ResMut<ModalView>,
    mut lock: ResMut<CursorLock>,
) {
    for (code, button) in [
        (MouseButton::Left, PointerButton::Left),
        (MouseButton::Right, PointerButton::Right),
    ] {
        if buttons.just_pressed(code) {
            let outcome = session.0.on_pointer_button(button, true, &mut *modal, &mut *lock);
            if outcome != ClickOutcome::Ignored {
                debug!("click: {outcome:?}");
            }
        }
        if buttons.just_released(code) {
            session.0.on_pointer_button(button, false, &mut *modal, &mut *lock);
        }
    }

    let mut delta = Vec2::ZERO;
    for event in motion_events.read() {
        delta += event.delta;
    }
    if delta != Vec2::ZERO {
        session.0.on_pointer_motion(delta.x as f64, delta.y as f64, &*lock);
    }
}

/// Left-third touches act as a virtual joystick; any other single touch
/// drags the view. Every new touch also counts as a tap for the
/// post-close cooldown.
pub fn touch_input(
    touches: Res<Touches>,
    window_q: Query<&Window, With<PrimaryWindow>>,
    mut roles: ResMut<TouchRoles>,
    mut session: ResMut<Session>,
) {
    let Ok(window) = window_q.get_single() else {
        return;
    };
    let zone = window.width() * JOYSTICK_ZONE_FRACTION;

    for touch in touches.iter_just_pressed() {
        roles.touch_seen = true;
        if let ClickOutcome::Swallowed { remaining } = session.0.on_tap() {
            debug!("tap swallowed, {remaining} left");
        }
        if touch.start_position().x < zone && roles.joystick.is_none() {
            roles.joystick = Some(touch.id());
        } else if roles.look.is_none() {
            roles.look = Some(touch.id());
        }
    }

    for touch in touches.iter() {
        if roles.joystick == Some(touch.id()) {
            let offset = joystick_offset(touch);
            session.0.on_joystick(Some((offset.x as f64, offset.y as f64)));
        } else if roles.look == Some(touch.id()) {
            let delta = touch.delta();
            if delta != Vec2::ZERO {
                session.0.on_touch_drag(delta.x as f64, delta.y as f64);
            }
        }
    }

    for touch in touches.iter_just_released().chain(touches.iter_just_canceled()) {
        if roles.joystick == Some(touch.id()) {
            roles.joystick = None;
            session.0.on_joystick(None);
        }
        if roles.look == Some(touch.id()) {
            roles.look = None;
        }
    }
}

fn joystick_offset(touch: &Touch) -> Vec2 {
    touch.position() - touch.start_position()
}

/// Losing focus drops the cursor grab, like a browser leaving pointer lock.
pub fn window_focus(
    mut focus_events: EventReader<WindowFocused>,
    mut session: ResMut<Session>,
    mut lock: ResMut<CursorLock>,
) {
    for event in focus_events.read() {
        if !event.focused && lock.is_engaged() {
            lock.release();
            session.0.on_pointer_lock_changed(false, &mut *lock);
        }
    }
}

/// Push pending grab changes to the primary window and report engagement
/// back to the gate.
pub fn apply_cursor_lock(
    mut lock: ResMut<CursorLock>,
    mut session: ResMut<Session>,
    mut window_q: Query<&mut Window, With<PrimaryWindow>>,
) {
    if !lock.dirty {
        return;
    }
    lock.dirty = false;
    let Ok(mut window) = window_q.get_single_mut() else {
        return;
    };
    let engaged = lock.engaged;
    if engaged {
        window.cursor_options.grab_mode = CursorGrabMode::Locked;
        window.cursor_options.visible = false;
    } else {
        window.cursor_options.grab_mode = CursorGrabMode::None;
        window.cursor_options.visible = true;
    }
    session.0.on_pointer_lock_changed(engaged, &mut *lock);
}
