//! Resources and marker components shared by the viewer systems.
//!
//! `ModalView` and `CursorLock` are the Bevy-side implementations of the
//! gate's ports. They only record what the session asked for; the UI and
//! window systems apply it afterwards.

use bevy::prelude::*;
use orrery_logic::input::Intent;
use orrery_logic::interaction::{ModalPort, PointerLockPort};
use orrery_logic::scene::BodyId;
use orrery_logic::session::{HudSnapshot, Orrery};
use orrery_logic::startup::StartupError;

// ============================================================================
// RESOURCES
// ============================================================================

#[derive(Resource)]
pub struct Session(pub Orrery);

/// Content window contents and visibility.
#[derive(Resource, Default)]
pub struct ModalView {
    pub open: bool,
    pub title: String,
    pub body: String,
    pub dirty: bool,
}

impl ModalPort for ModalView {
    fn open(&mut self, title: &str, body: &str) {
        self.open = true;
        self.title = title.to_string();
        self.body = body.to_string();
        self.dirty = true;
    }

    fn close(&mut self) {
        self.open = false;
        self.dirty = true;
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

/// Cursor grab state. Requests take effect immediately on desktop; the
/// window is updated by `apply_cursor_lock`.
#[derive(Resource, Default)]
pub struct CursorLock {
    pub engaged: bool,
    pub dirty: bool,
}

impl PointerLockPort for CursorLock {
    fn request(&mut self) {
        if !self.engaged {
            self.engaged = true;
            self.dirty = true;
        }
    }

    fn release(&mut self) {
        if self.engaged {
            self.engaged = false;
            self.dirty = true;
        }
    }

    fn is_engaged(&self) -> bool {
        self.engaged
    }
}

/// Latest frame output, read by the UI.
#[derive(Resource, Default)]
pub struct FrameState {
    pub hud: Option<HudSnapshot>,
    pub fatal: Option<StartupError>,
}

/// Which role each active touch plays.
#[derive(Resource, Default)]
pub struct TouchRoles {
    pub joystick: Option<u64>,
    pub look: Option<u64>,
    /// Set by the first touch; shows the on-screen buttons.
    pub touch_seen: bool,
}

// ============================================================================
// COMPONENTS
// ============================================================================

#[derive(Component)]
pub struct MainCamera;

#[derive(Component)]
pub struct SunMarker;

#[derive(Component)]
pub struct BodyMarker(pub BodyId);

#[derive(Component)]
pub struct Starfield;

#[derive(Component)]
pub struct HudText;

#[derive(Component)]
pub struct PromptText;

#[derive(Component)]
pub struct EnrichmentText;

#[derive(Component)]
pub struct ModalRoot;

#[derive(Component)]
pub struct ModalTitle;

#[derive(Component)]
pub struct ModalBody;

#[derive(Component)]
pub struct ModalCloseButton;

#[derive(Component)]
pub struct ModalBackdrop;

#[derive(Component)]
pub struct LoadingRoot;

#[derive(Component)]
pub struct LoadingText;

#[derive(Component)]
pub struct LoadingBar;

#[derive(Component)]
pub struct WelcomeRoot;

#[derive(Component)]
pub struct WelcomeButton;

#[derive(Component)]
pub struct InteractButton;

/// On-screen hold button for an intent the joystick cannot express.
#[derive(Component)]
pub struct IntentButton(pub Intent);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modal_view_marks_changes() {
        let mut modal = ModalView::default();
        modal.open("Earth", "Projects");
        assert!(modal.is_open() && modal.dirty);
        assert_eq!(modal.title, "Earth");
        modal.dirty = false;
        modal.close();
        assert!(!modal.is_open() && modal.dirty);
    }

    #[test]
    fn cursor_lock_only_dirty_on_change() {
        let mut lock = CursorLock::default();
        lock.release();
        assert!(!lock.dirty);
        lock.request();
        assert!(lock.is_engaged() && lock.dirty);
        lock.dirty = false;
        lock.request();
        assert!(!lock.dirty);
    }
}
