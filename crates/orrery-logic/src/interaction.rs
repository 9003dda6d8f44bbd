//! Interaction gate: decides whether a click means "enter planet".
//!
//! Opening the modal releases pointer lock, and the clicks a user makes to
//! take control back must not reopen it. The gate is an explicit state
//! machine:
//!
//! | State | Event | Next |
//! |-------|-------|------|
//! | `Idle` | body in range | `TargetAcquired` |
//! | `TargetAcquired` | body out of range | `Idle` |
//! | `TargetAcquired` | left click, lock engaged, body has content | `ModalOpen` |
//! | `ModalOpen` | close (Escape, button, backdrop) | `CooldownAfterClose(n)` |
//! | `CooldownAfterClose(n)` | left click, `n > 1` | `CooldownAfterClose(n - 1)` |
//! | `CooldownAfterClose(1)` | left click | `Idle`, then proximity re-applied |
//!
//! Closing schedules two deferred actions instead of timers: hide the modal
//! once its fade-out ends, then re-request pointer lock. Both are tagged with
//! the gate epoch, which advances whenever a modal opens, so an action made
//! obsolete by a later open is dropped when it comes due.
//!
//! The modal and the pointer lock are reached only through [`ModalPort`] and
//! [`PointerLockPort`]; the gate never inspects host UI state otherwise.

use log::{debug, info, warn};

use crate::config::InteractionConfig;
use crate::input::PointerButton;
use crate::scene::{BodyId, ProximityHit, SceneModel};
use crate::schedule::DeferredQueue;

/// Modal dialog capability provided by the host UI.
pub trait ModalPort {
    fn open(&mut self, title: &str, body: &str);
    fn close(&mut self);
    fn is_open(&self) -> bool;
}

/// Pointer-lock capability provided by the host window.
pub trait PointerLockPort {
    fn request(&mut self);
    fn release(&mut self);
    fn is_engaged(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Idle,
    TargetAcquired(BodyId),
    ModalOpen(BodyId),
    CooldownAfterClose { clicks_remaining: u32 },
}

impl GateState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::TargetAcquired(_) => "target-acquired",
            Self::ModalOpen(_) => "modal-open",
            Self::CooldownAfterClose { .. } => "cooldown",
        }
    }
}

/// How the user dismissed the modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    Escape,
    Button,
    Backdrop,
}

/// What a click (or touch interaction) did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Nothing to do: wrong button, modal already open, or no target.
    Ignored,
    /// Absorbed by the post-close cooldown.
    Swallowed { remaining: u32 },
    Opened(BodyId),
    /// Target has no content payload.
    NoContent(BodyId),
    /// Click used to (re-)engage pointer lock.
    RequestedLock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GateAction {
    HideModal,
    RequestLock,
}

pub struct InteractionGate {
    config: InteractionConfig,
    state: GateState,
    /// Latest proximity reading, tracked in every state.
    last_hit: Option<ProximityHit>,
    epoch: u64,
    pending: DeferredQueue<GateAction>,
    opens: u64,
}

impl InteractionGate {
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            config,
            state: GateState::Idle,
            last_hit: None,
            epoch: 0,
            pending: DeferredQueue::new(),
            opens: 0,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    /// Current proximity reading, regardless of state.
    pub fn current_target(&self) -> Option<ProximityHit> {
        self.last_hit
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Number of times a modal has been opened.
    pub fn open_count(&self) -> u64 {
        self.opens
    }

    pub fn pending_actions(&self) -> usize {
        self.pending.len()
    }

    pub fn activation_radius(&self) -> f64 {
        self.config.activation_radius
    }

    fn transition(&mut self, next: GateState) {
        if next != self.state {
            debug!("gate: {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }

    /// Feed this frame's proximity result.
    pub fn update(&mut self, hit: Option<ProximityHit>) {
        self.last_hit = hit;
        self.resolve_proximity();
    }

    fn resolve_proximity(&mut self) {
        match (self.state, self.last_hit) {
            (GateState::Idle | GateState::TargetAcquired(_), Some(hit)) => {
                self.transition(GateState::TargetAcquired(hit.id));
            }
            (GateState::TargetAcquired(_), None) => self.transition(GateState::Idle),
            _ => {}
        }
    }

    fn open(
        &mut self,
        id: BodyId,
        scene: &SceneModel,
        modal: &mut impl ModalPort,
        lock: &mut impl PointerLockPort,
    ) -> ClickOutcome {
        let Some(body) = scene.body(id) else {
            return ClickOutcome::Ignored;
        };
        let Some(content) = body.content.as_ref() else {
            debug!("gate: {} has no content", body.name);
            return ClickOutcome::NoContent(id);
        };
        modal.open(&content.title, &content.body);
        if lock.is_engaged() {
            lock.release();
        }
        self.epoch += 1;
        self.opens += 1;
        info!("modal opened for {}", body.name);
        self.transition(GateState::ModalOpen(id));
        ClickOutcome::Opened(id)
    }

    /// Handle a click on the 3D view. Only the left button interacts.
    pub fn on_click(
        &mut self,
        button: PointerButton,
        scene: &SceneModel,
        modal: &mut impl ModalPort,
        lock: &mut impl PointerLockPort,
    ) -> ClickOutcome {
        if button != PointerButton::Left {
            return ClickOutcome::Ignored;
        }
        match self.state {
            GateState::ModalOpen(_) => ClickOutcome::Ignored,
            GateState::CooldownAfterClose { clicks_remaining } => {
                if !lock.is_engaged() && !modal.is_open() {
                    lock.request();
                }
                self.count_cooldown_click(clicks_remaining)
            }
            GateState::Idle => {
                if lock.is_engaged() {
                    ClickOutcome::Ignored
                } else {
                    lock.request();
                    ClickOutcome::RequestedLock
                }
            }
            GateState::TargetAcquired(id) => {
                if lock.is_engaged() {
                    self.open(id, scene, modal, lock)
                } else {
                    lock.request();
                    ClickOutcome::RequestedLock
                }
            }
        }
    }

    fn count_cooldown_click(&mut self, clicks_remaining: u32) -> ClickOutcome {
        let remaining = clicks_remaining.saturating_sub(1);
        if remaining == 0 {
            self.transition(GateState::Idle);
            self.resolve_proximity();
        } else {
            self.transition(GateState::CooldownAfterClose {
                clicks_remaining: remaining,
            });
        }
        ClickOutcome::Swallowed { remaining }
    }

    /// A touch tap anywhere on screen. Counts toward the post-close cooldown
    /// like a click but never asks for pointer lock.
    pub fn on_tap(&mut self) -> ClickOutcome {
        match self.state {
            GateState::CooldownAfterClose { clicks_remaining } => {
                self.count_cooldown_click(clicks_remaining)
            }
            _ => ClickOutcome::Ignored,
        }
    }

    /// Touch "visit" button: interacts without pointer lock.
    pub fn interact_touch(
        &mut self,
        scene: &SceneModel,
        modal: &mut impl ModalPort,
        lock: &mut impl PointerLockPort,
    ) -> ClickOutcome {
        match self.state {
            GateState::TargetAcquired(id) => self.open(id, scene, modal, lock),
            _ => ClickOutcome::Ignored,
        }
    }

    /// Open a body's content directly, bypassing proximity. Ignored while a
    /// modal is already open.
    pub fn force_open(
        &mut self,
        id: BodyId,
        scene: &SceneModel,
        modal: &mut impl ModalPort,
        lock: &mut impl PointerLockPort,
    ) -> ClickOutcome {
        if matches!(self.state, GateState::ModalOpen(_)) {
            return ClickOutcome::Ignored;
        }
        self.open(id, scene, modal, lock)
    }

    /// Dismiss the modal. No effect unless one is open.
    pub fn on_close(&mut self, reason: CloseReason, now: f64) -> bool {
        let GateState::ModalOpen(id) = self.state else {
            return false;
        };
        info!("modal closed ({reason:?}) for body {}", id.0);
        let clicks = self.config.cooldown_clicks;
        if clicks == 0 {
            self.transition(GateState::Idle);
            self.resolve_proximity();
        } else {
            self.transition(GateState::CooldownAfterClose {
                clicks_remaining: clicks,
            });
        }
        self.pending.schedule(
            now + self.config.close_animation_secs,
            self.epoch,
            GateAction::HideModal,
        );
        true
    }

    /// Host notification that pointer lock changed.
    pub fn on_pointer_lock_changed(&mut self, engaged: bool, lock: &mut impl PointerLockPort) {
        debug!("pointer lock engaged: {engaged}");
        if engaged && matches!(self.state, GateState::ModalOpen(_)) {
            lock.release();
        }
    }

    /// Fire deferred actions due at `now`.
    pub fn tick(
        &mut self,
        now: f64,
        modal: &mut impl ModalPort,
        lock: &mut impl PointerLockPort,
    ) {
        // Actions may schedule follow-ups that are already due.
        loop {
            let due = self.pending.drain_due(now);
            if due.is_empty() {
                break;
            }
            for scheduled in due {
                if scheduled.epoch != self.epoch {
                    warn!(
                        "dropping stale {:?} from epoch {} (now {})",
                        scheduled.action, scheduled.epoch, self.epoch
                    );
                    continue;
                }
                if matches!(self.state, GateState::ModalOpen(_)) {
                    warn!("dropping {:?}: modal open again", scheduled.action);
                    continue;
                }
                debug!("firing {:?} due at {:.3}", scheduled.action, scheduled.due);
                match scheduled.action {
                    GateAction::HideModal => {
                        modal.close();
                        self.pending.schedule(
                            scheduled.due + self.config.relock_delay_secs,
                            self.epoch,
                            GateAction::RequestLock,
                        );
                    }
                    GateAction::RequestLock => {
                        if !lock.is_engaged() {
                            lock.request();
                        }
                    }
                }
            }
        }
    }

    /// Prompt text for the current target, if any.
    pub fn prompt(&self, scene: &SceneModel) -> Option<String> {
        match self.state {
            GateState::TargetAcquired(id) => scene
                .body(id)
                .map(|b| format!("Click to explore {}", b.name)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContentPayload;
    use crate::scene::Body;

    #[derive(Default)]
    struct FakeModal {
        open: bool,
        title: String,
        opened: u32,
        closed: u32,
    }

    impl ModalPort for FakeModal {
        fn open(&mut self, title: &str, _body: &str) {
            self.open = true;
            self.title = title.to_string();
            self.opened += 1;
        }
        fn close(&mut self) {
            self.open = false;
            self.closed += 1;
        }
        fn is_open(&self) -> bool {
            self.open
        }
    }

    #[derive(Default)]
    struct FakeLock {
        engaged: bool,
        requests: u32,
        releases: u32,
    }

    impl PointerLockPort for FakeLock {
        fn request(&mut self) {
            self.engaged = true;
            self.requests += 1;
        }
        fn release(&mut self) {
            self.engaged = false;
            self.releases += 1;
        }
        fn is_engaged(&self) -> bool {
            self.engaged
        }
    }

    fn scene() -> SceneModel {
        SceneModel::new(vec![
            Body::new("A", 200.0, 0.0, 0.0, 0.0).with_content(ContentPayload::new("Alpha", "a")),
            Body::new("Empty", 300.0, 0.0, 0.0, 0.0),
        ])
    }

    fn hit(i: usize) -> Option<ProximityHit> {
        Some(ProximityHit {
            id: BodyId(i),
            distance: 10.0,
        })
    }

    fn engaged() -> FakeLock {
        FakeLock {
            engaged: true,
            ..FakeLock::default()
        }
    }

    #[test]
    fn proximity_drives_idle_and_target() {
        let mut gate = InteractionGate::new(InteractionConfig::default());
        gate.update(hit(0));
        assert_eq!(gate.state(), GateState::TargetAcquired(BodyId(0)));
        gate.update(hit(1));
        assert_eq!(gate.state(), GateState::TargetAcquired(BodyId(1)));
        gate.update(None);
        assert_eq!(gate.state(), GateState::Idle);
    }

    #[test]
    fn click_without_lock_only_requests_lock() {
        let scene = scene();
        let mut gate = InteractionGate::new(InteractionConfig::default());
        let (mut modal, mut lock) = (FakeModal::default(), FakeLock::default());
        gate.update(hit(0));
        let outcome = gate.on_click(PointerButton::Left, &scene, &mut modal, &mut lock);
        assert_eq!(outcome, ClickOutcome::RequestedLock);
        assert!(!modal.open);
        assert!(lock.engaged);
    }

    #[test]
    fn open_releases_lock_and_ignores_proximity() {
        let scene = scene();
        let mut gate = InteractionGate::new(InteractionConfig::default());
        let (mut modal, mut lock) = (FakeModal::default(), engaged());
        gate.update(hit(0));
        let outcome = gate.on_click(PointerButton::Left, &scene, &mut modal, &mut lock);
        assert_eq!(outcome, ClickOutcome::Opened(BodyId(0)));
        assert_eq!(modal.title, "Alpha");
        assert!(!lock.engaged);
        gate.update(None);
        assert_eq!(gate.state(), GateState::ModalOpen(BodyId(0)));
        assert_eq!(
            gate.on_click(PointerButton::Left, &scene, &mut modal, &mut lock),
            ClickOutcome::Ignored
        );
    }

    #[test]
    fn right_click_never_interacts() {
        let scene = scene();
        let mut gate = InteractionGate::new(InteractionConfig::default());
        let (mut modal, mut lock) = (FakeModal::default(), engaged());
        gate.update(hit(0));
        assert_eq!(
            gate.on_click(PointerButton::Right, &scene, &mut modal, &mut lock),
            ClickOutcome::Ignored
        );
        assert_eq!(modal.opened, 0);
    }

    #[test]
    fn body_without_content_is_a_no_op() {
        let scene = scene();
        let mut gate = InteractionGate::new(InteractionConfig::default());
        let (mut modal, mut lock) = (FakeModal::default(), engaged());
        gate.update(hit(1));
        let outcome = gate.on_click(PointerButton::Left, &scene, &mut modal, &mut lock);
        assert_eq!(outcome, ClickOutcome::NoContent(BodyId(1)));
        assert_eq!(gate.state(), GateState::TargetAcquired(BodyId(1)));
        assert!(lock.engaged);
    }

    #[test]
    fn two_clicks_swallowed_then_third_reopens() {
        let scene = scene();
        let mut gate = InteractionGate::new(InteractionConfig::default());
        let (mut modal, mut lock) = (FakeModal::default(), engaged());
        gate.update(hit(0));
        gate.on_click(PointerButton::Left, &scene, &mut modal, &mut lock);
        assert!(gate.on_close(CloseReason::Escape, 1.0));
        assert_eq!(
            gate.state(),
            GateState::CooldownAfterClose {
                clicks_remaining: 2
            }
        );

        gate.tick(1.5, &mut modal, &mut lock);
        assert!(!modal.open);
        assert!(lock.engaged);

        assert_eq!(
            gate.on_click(PointerButton::Left, &scene, &mut modal, &mut lock),
            ClickOutcome::Swallowed { remaining: 1 }
        );
        assert_eq!(
            gate.on_click(PointerButton::Left, &scene, &mut modal, &mut lock),
            ClickOutcome::Swallowed { remaining: 0 }
        );
        assert_eq!(gate.state(), GateState::TargetAcquired(BodyId(0)));
        assert_eq!(modal.opened, 1);

        assert_eq!(
            gate.on_click(PointerButton::Left, &scene, &mut modal, &mut lock),
            ClickOutcome::Opened(BodyId(0))
        );
        assert_eq!(modal.opened, 2);
    }

    #[test]
    fn cooldown_ends_idle_when_target_gone() {
        let scene = scene();
        let mut gate = InteractionGate::new(InteractionConfig::default());
        let (mut modal, mut lock) = (FakeModal::default(), engaged());
        gate.update(hit(0));
        gate.on_click(PointerButton::Left, &scene, &mut modal, &mut lock);
        gate.on_close(CloseReason::Button, 0.0);
        gate.update(None);
        gate.on_click(PointerButton::Left, &scene, &mut modal, &mut lock);
        gate.on_click(PointerButton::Left, &scene, &mut modal, &mut lock);
        assert_eq!(gate.state(), GateState::Idle);
    }

    #[test]
    fn zero_cooldown_goes_straight_back() {
        let scene = scene();
        let config = InteractionConfig {
            cooldown_clicks: 0,
            ..InteractionConfig::default()
        };
        let mut gate = InteractionGate::new(config);
        let (mut modal, mut lock) = (FakeModal::default(), engaged());
        gate.update(hit(0));
        gate.on_click(PointerButton::Left, &scene, &mut modal, &mut lock);
        gate.on_close(CloseReason::Backdrop, 0.0);
        assert_eq!(gate.state(), GateState::TargetAcquired(BodyId(0)));
    }

    #[test]
    fn close_is_ignored_unless_modal_open() {
        let mut gate = InteractionGate::new(InteractionConfig::default());
        assert!(!gate.on_close(CloseReason::Escape, 0.0));
        assert_eq!(gate.pending_actions(), 0);
    }

    #[test]
    fn hide_then_relock_follow_the_configured_delays() {
        let scene = scene();
        let mut gate = InteractionGate::new(InteractionConfig::default());
        let (mut modal, mut lock) = (FakeModal::default(), engaged());
        gate.update(hit(0));
        gate.on_click(PointerButton::Left, &scene, &mut modal, &mut lock);
        gate.on_close(CloseReason::Escape, 10.0);

        gate.tick(10.29, &mut modal, &mut lock);
        assert!(modal.open);
        gate.tick(10.31, &mut modal, &mut lock);
        assert!(!modal.open);
        assert!(!lock.engaged);
        gate.tick(10.39, &mut modal, &mut lock);
        assert!(!lock.engaged);
        gate.tick(10.41, &mut modal, &mut lock);
        assert!(lock.engaged);
        assert_eq!(gate.pending_actions(), 0);
    }

    #[test]
    fn relock_skipped_when_already_engaged() {
        let scene = scene();
        let mut gate = InteractionGate::new(InteractionConfig::default());
        let (mut modal, mut lock) = (FakeModal::default(), engaged());
        gate.update(hit(0));
        gate.on_click(PointerButton::Left, &scene, &mut modal, &mut lock);
        gate.on_close(CloseReason::Escape, 0.0);
        gate.tick(0.31, &mut modal, &mut lock);
        lock.engaged = true;
        let before = lock.requests;
        gate.tick(1.0, &mut modal, &mut lock);
        assert_eq!(lock.requests, before);
    }

    #[test]
    fn stale_hide_is_dropped_after_reopen() {
        let scene = scene();
        let config = InteractionConfig {
            cooldown_clicks: 0,
            ..InteractionConfig::default()
        };
        let mut gate = InteractionGate::new(config);
        let (mut modal, mut lock) = (FakeModal::default(), FakeLock::default());
        gate.update(hit(0));
        gate.interact_touch(&scene, &mut modal, &mut lock);
        gate.on_close(CloseReason::Escape, 0.0);
        // Reopened during the fade-out.
        gate.interact_touch(&scene, &mut modal, &mut lock);
        gate.tick(5.0, &mut modal, &mut lock);
        assert!(modal.open, "stale hide must not close the new modal");
        assert_eq!(modal.closed, 0);
        assert_eq!(lock.requests, 0);
    }

    #[test]
    fn touch_interaction_needs_no_lock_but_respects_cooldown() {
        let scene = scene();
        let mut gate = InteractionGate::new(InteractionConfig::default());
        let (mut modal, mut lock) = (FakeModal::default(), FakeLock::default());
        gate.update(hit(0));
        assert_eq!(
            gate.interact_touch(&scene, &mut modal, &mut lock),
            ClickOutcome::Opened(BodyId(0))
        );
        gate.on_close(CloseReason::Button, 0.0);
        assert_eq!(
            gate.interact_touch(&scene, &mut modal, &mut lock),
            ClickOutcome::Ignored
        );
    }

    #[test]
    fn lock_engaging_while_modal_open_is_reverted() {
        let scene = scene();
        let mut gate = InteractionGate::new(InteractionConfig::default());
        let (mut modal, mut lock) = (FakeModal::default(), engaged());
        gate.update(hit(0));
        gate.on_click(PointerButton::Left, &scene, &mut modal, &mut lock);
        lock.engaged = true;
        gate.on_pointer_lock_changed(true, &mut lock);
        assert!(!lock.engaged);
    }

    #[test]
    fn force_open_bypasses_proximity() {
        let scene = scene();
        let mut gate = InteractionGate::new(InteractionConfig::default());
        let (mut modal, mut lock) = (FakeModal::default(), FakeLock::default());
        assert_eq!(
            gate.force_open(BodyId(0), &scene, &mut modal, &mut lock),
            ClickOutcome::Opened(BodyId(0))
        );
        assert_eq!(
            gate.force_open(BodyId(0), &scene, &mut modal, &mut lock),
            ClickOutcome::Ignored
        );
    }

    #[test]
    fn prompt_names_the_target() {
        let scene = scene();
        let mut gate = InteractionGate::new(InteractionConfig::default());
        assert!(gate.prompt(&scene).is_none());
        gate.update(hit(0));
        assert_eq!(gate.prompt(&scene).as_deref(), Some("Click to explore A"));
    }

    #[test]
    fn taps_drain_cooldown_without_pointer_lock() {
        let scene = scene();
        let mut gate = InteractionGate::new(InteractionConfig::default());
        let mut modal = FakeModal::default();
        let mut lock = FakeLock::default();
        assert_eq!(gate.on_tap(), ClickOutcome::Ignored);

        gate.update(hit(0));
        assert_eq!(
            gate.interact_touch(&scene, &mut modal, &mut lock),
            ClickOutcome::Opened(BodyId(0))
        );
        assert_eq!(gate.on_tap(), ClickOutcome::Ignored, "taps ignored while open");
        assert!(gate.on_close(CloseReason::Button, 0.0));
        assert_eq!(gate.interact_touch(&scene, &mut modal, &mut lock), ClickOutcome::Ignored);

        assert_eq!(gate.on_tap(), ClickOutcome::Swallowed { remaining: 1 });
        assert_eq!(gate.on_tap(), ClickOutcome::Swallowed { remaining: 0 });
        assert_eq!(gate.state(), GateState::TargetAcquired(BodyId(0)));
        assert_eq!(lock.requests, 0);
        assert_eq!(
            gate.interact_touch(&scene, &mut modal, &mut lock),
            ClickOutcome::Opened(BodyId(0))
        );
    }
}
