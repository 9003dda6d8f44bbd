//! Frame driver tying the components together.
//!
//! [`Orrery::frame`] is the single per-frame entry point. After startup has
//! finished it runs, in order:
//!
//! 1. navigation (or the approach tween),
//! 2. scene orbits and spins,
//! 3. the proximity query against this frame's camera position,
//! 4. the interaction gate and its due deferred actions.
//!
//! Raw input is forwarded through the `on_*` methods between frames.

use log::{debug, info};

use crate::approach::{approach_point, CameraTween, APPROACH_DURATION};
use crate::config::{ContentPayload, OrreryConfig};
use crate::enrichment::{render_items, EnrichmentState, FetchError, RepoItem};
use crate::input::{
    intent_for_button, joystick_intents, ControlState, Intent, Key, PointerButton,
};
use crate::interaction::{ClickOutcome, CloseReason, InteractionGate, ModalPort, PointerLockPort};
use crate::navigation::{EngineStatus, NavigationController};
use crate::scene::{BodyId, SceneModel};
use crate::startup::{StartupError, StartupEvent, StartupSequence};
use crate::thruster::ThrusterSound;
use crate::vector::Vec3;

/// Largest frame step fed to the simulation (seconds).
pub const MAX_FRAME_DT: f64 = 0.1;

/// Portfolio section that receives the repository listing.
pub const ENRICHED_SECTION: &str = "Projects";

#[derive(Debug, Clone, PartialEq)]
pub struct TargetInfo {
    pub id: BodyId,
    pub name: String,
    pub distance: f64,
}

/// Everything the HUD shows for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct HudSnapshot {
    pub speed: f64,
    pub position: Vec3,
    pub status: EngineStatus,
    pub target: Option<TargetInfo>,
    pub prompt: Option<String>,
    pub modal_open: bool,
}

impl HudSnapshot {
    pub fn target_label(&self) -> &str {
        self.target.as_ref().map_or("None", |t| t.name.as_str())
    }

    pub fn distance_label(&self) -> String {
        match &self.target {
            Some(t) => format!("{:.0} km", t.distance),
            None => "-- km".to_string(),
        }
    }

    pub fn speed_label(&self) -> String {
        format!("{:.1}", self.speed)
    }

    pub fn position_label(&self) -> String {
        format!(
            "X: {:.0}, Y: {:.0}, Z: {:.0}",
            self.position.x, self.position.y, self.position.z
        )
    }
}

/// What one frame produced.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub hud: HudSnapshot,
    pub startup_events: Vec<StartupEvent>,
}

pub struct Orrery {
    config: OrreryConfig,
    scene: SceneModel,
    navigation: NavigationController,
    gate: InteractionGate,
    controls: ControlState,
    startup: StartupSequence,
    tween: Option<CameraTween>,
    thruster: ThrusterSound,
    enrichment: EnrichmentState,
    clock: f64,
}

impl Orrery {
    pub fn new(config: OrreryConfig) -> Self {
        Self::with_startup(config, StartupSequence::simulated())
    }

    pub fn with_startup(config: OrreryConfig, startup: StartupSequence) -> Self {
        let scene = SceneModel::from_config(&config);
        let navigation = NavigationController::new(config.controls.clone(), config.camera_start());
        let gate = InteractionGate::new(config.controls.interaction.clone());
        let thruster = ThrusterSound::new(config.controls.thruster.clone());
        Self {
            config,
            scene,
            navigation,
            gate,
            controls: ControlState::default(),
            startup,
            tween: None,
            thruster,
            enrichment: EnrichmentState::default(),
            clock: 0.0,
        }
    }

    /// Environment and config checks, then the first loading stage.
    pub fn start(&mut self, environment_supported: bool) -> Result<Vec<StartupEvent>, StartupError> {
        self.startup.begin(environment_supported, &self.config)
    }

    pub fn frame(
        &mut self,
        dt: f64,
        modal: &mut impl ModalPort,
        lock: &mut impl PointerLockPort,
    ) -> FrameReport {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        self.clock += dt;

        let startup_events = self.startup.advance(dt);
        for event in &startup_events {
            if *event == StartupEvent::RequestPointerLock && !modal.is_open() && !lock.is_engaged()
            {
                lock.request();
            }
        }

        if self.startup.is_loaded() {
            self.step(dt, modal, lock);
        }

        FrameReport {
            hud: self.hud(modal),
            startup_events,
        }
    }

    fn step(&mut self, dt: f64, modal: &mut impl ModalPort, lock: &mut impl PointerLockPort) {
        if self.startup.controls_enabled() {
            self.navigation.update(dt, &mut self.controls);
        } else {
            self.controls.take_deltas();
            self.navigation.update(dt, &mut ControlState::default());
        }
        if let Some(tween) = &mut self.tween {
            let position = tween.step(dt);
            let finished = tween.is_finished();
            self.navigation.set_position(position);
            if finished {
                debug!("approach finished at {position:?}");
                self.tween = None;
            }
        }

        let moving = self.navigation.status() != EngineStatus::Idle;
        self.thruster
            .update(dt, moving, self.navigation.speed(), self.controls.boost);

        self.scene.advance(dt);

        // Unshaken position, so the activation boundary and HUD distance
        // do not jitter with the shake offset.
        let camera = self.navigation.base_position();
        let hit = self.scene.nearest(camera, self.gate.activation_radius());
        self.gate.update(hit);
        self.gate.tick(self.clock, modal, lock);
    }

    pub fn hud(&self, modal: &impl ModalPort) -> HudSnapshot {
        let target = self.gate.current_target().and_then(|hit| {
            self.scene.body(hit.id).map(|body| TargetInfo {
                id: hit.id,
                name: body.name.clone(),
                distance: hit.distance,
            })
        });
        HudSnapshot {
            speed: self.navigation.speed(),
            position: self.navigation.pose().position,
            status: self.navigation.status(),
            target,
            prompt: self.gate.prompt(&self.scene),
            modal_open: modal.is_open(),
        }
    }

    /// Keyboard input. Escape closes the modal; other bound keys set intents.
    pub fn on_key(&mut self, key: Key, pressed: bool) -> bool {
        if key == Key::Escape {
            return pressed && self.gate.on_close(CloseReason::Escape, self.clock);
        }
        self.controls.apply_key(key, pressed)
    }

    pub fn on_pointer_button(
        &mut self,
        button: PointerButton,
        pressed: bool,
        modal: &mut impl ModalPort,
        lock: &mut impl PointerLockPort,
    ) -> ClickOutcome {
        if let Some(intent) = intent_for_button(button) {
            self.controls.set_intent(intent, pressed);
            return ClickOutcome::Ignored;
        }
        if !pressed || !self.startup.controls_enabled() {
            return ClickOutcome::Ignored;
        }
        self.gate.on_click(button, &self.scene, modal, lock)
    }

    /// Mouse movement counts only while pointer lock is engaged.
    pub fn on_pointer_motion(&mut self, dx: f64, dy: f64, lock: &impl PointerLockPort) {
        if lock.is_engaged() {
            self.controls.add_pointer_delta(dx, dy);
        }
    }

    /// Hold-style on-screen buttons (boost, up, down).
    pub fn on_intent(&mut self, intent: Intent, active: bool) {
        self.controls.set_intent(intent, active);
    }

    /// A touch tap on the view; only counts during the post-close cooldown.
    pub fn on_tap(&mut self) -> ClickOutcome {
        self.gate.on_tap()
    }

    pub fn on_touch_drag(&mut self, dx: f64, dy: f64) {
        self.controls.add_touch_delta(dx, dy);
    }

    /// Joystick drag offset from its centre, or `None` on release.
    pub fn on_joystick(&mut self, offset: Option<(f64, f64)>) {
        match offset {
            Some((dx, dy)) => self.controls.apply_joystick(joystick_intents(dx, dy)),
            None => self.controls.release_joystick(),
        }
    }

    pub fn on_touch_interact(
        &mut self,
        modal: &mut impl ModalPort,
        lock: &mut impl PointerLockPort,
    ) -> ClickOutcome {
        self.gate.interact_touch(&self.scene, modal, lock)
    }

    pub fn on_modal_close(&mut self, reason: CloseReason) -> bool {
        self.gate.on_close(reason, self.clock)
    }

    pub fn on_pointer_lock_changed(&mut self, engaged: bool, lock: &mut impl PointerLockPort) {
        self.gate.on_pointer_lock_changed(engaged, lock);
    }

    pub fn acknowledge_welcome(&mut self) {
        self.startup.acknowledge_welcome();
    }

    /// Fly to a stand-off point in front of the named body.
    pub fn navigate_to(&mut self, name: &str) -> bool {
        let Some((_, body)) = self.scene.lookup(name) else {
            return false;
        };
        let target = approach_point(body.position, body.orbit_radius);
        info!("approaching {name}");
        self.tween = Some(CameraTween::new(
            self.navigation.base_position(),
            target,
            APPROACH_DURATION,
        ));
        true
    }

    /// Open the named body's content regardless of distance.
    pub fn force_interaction(
        &mut self,
        name: &str,
        modal: &mut impl ModalPort,
        lock: &mut impl PointerLockPort,
    ) -> ClickOutcome {
        match self.scene.lookup(name) {
            Some((id, _)) => self.gate.force_open(id, &self.scene, modal, lock),
            None => ClickOutcome::Ignored,
        }
    }

    /// Mark the enrichment fetch as started. `false` if already started.
    pub fn begin_enrichment(&mut self) -> bool {
        self.enrichment.start()
    }

    /// Store the fetch result and, on success, append the listing to the
    /// projects body.
    pub fn finish_enrichment(&mut self, result: Result<Vec<RepoItem>, FetchError>) {
        self.enrichment.finish(result);
        let items = self.enrichment.items();
        if items.is_empty() {
            return;
        }
        let Some(index) = self
            .config
            .bodies
            .iter()
            .position(|b| b.section == ENRICHED_SECTION)
        else {
            return;
        };
        let id = BodyId(index);
        let Some(current) = self.scene.body(id).and_then(|b| b.content.clone()) else {
            return;
        };
        let listing = render_items(items);
        let content = ContentPayload::new(
            current.title.clone(),
            format!("{}\n\n{}", current.body, listing.trim_end()),
        );
        self.scene.set_content(id, content);
    }

    pub fn config(&self) -> &OrreryConfig {
        &self.config
    }

    pub fn scene(&self) -> &SceneModel {
        &self.scene
    }

    pub fn navigation(&self) -> &NavigationController {
        &self.navigation
    }

    pub fn gate(&self) -> &InteractionGate {
        &self.gate
    }

    pub fn controls(&self) -> &ControlState {
        &self.controls
    }

    pub fn startup(&self) -> &StartupSequence {
        &self.startup
    }

    pub fn startup_mut(&mut self) -> &mut StartupSequence {
        &mut self.startup
    }

    pub fn thruster(&self) -> &ThrusterSound {
        &self.thruster
    }

    pub fn enrichment(&self) -> &EnrichmentState {
        &self.enrichment
    }

    pub fn is_approaching(&self) -> bool {
        self.tween.is_some()
    }

    /// Logical time since the session was created (seconds).
    pub fn clock(&self) -> f64 {
        self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Modal(bool);

    impl ModalPort for Modal {
        fn open(&mut self, _title: &str, _body: &str) {
            self.0 = true;
        }
        fn close(&mut self) {
            self.0 = false;
        }
        fn is_open(&self) -> bool {
            self.0
        }
    }

    #[derive(Default)]
    struct Lock(bool);

    impl PointerLockPort for Lock {
        fn request(&mut self) {
            self.0 = true;
        }
        fn release(&mut self) {
            self.0 = false;
        }
        fn is_engaged(&self) -> bool {
            self.0
        }
    }

    fn loaded() -> (Orrery, Modal, Lock) {
        let mut orrery = Orrery::new(OrreryConfig::default());
        orrery.start(true).unwrap();
        let (mut modal, mut lock) = (Modal::default(), Lock::default());
        for _ in 0..120 {
            orrery.frame(1.0 / 60.0, &mut modal, &mut lock);
        }
        assert!(orrery.startup().is_loaded());
        (orrery, modal, lock)
    }

    /// Loaded, welcome shown and acknowledged: controls are live.
    fn flying() -> (Orrery, Modal, Lock) {
        let (mut orrery, mut modal, mut lock) = loaded();
        for _ in 0..180 {
            orrery.frame(1.0 / 60.0, &mut modal, &mut lock);
        }
        assert!(orrery.startup().welcome_visible());
        orrery.acknowledge_welcome();
        assert!(orrery.startup().controls_enabled());
        (orrery, modal, lock)
    }

    #[test]
    fn nothing_moves_before_loading_finishes() {
        let mut orrery = Orrery::new(OrreryConfig::default());
        orrery.start(true).unwrap();
        let (mut modal, mut lock) = (Modal::default(), Lock::default());
        let before = orrery.scene().bodies()[0].position;
        orrery.frame(0.05, &mut modal, &mut lock);
        assert_eq!(orrery.scene().bodies()[0].position, before);
    }

    #[test]
    fn huge_and_negative_dt_are_clamped() {
        let (mut orrery, mut modal, mut lock) = loaded();
        let clock = orrery.clock();
        orrery.frame(5.0, &mut modal, &mut lock);
        assert!((orrery.clock() - clock - MAX_FRAME_DT).abs() < 1e-12);
        orrery.frame(-1.0, &mut modal, &mut lock);
        orrery.frame(f64::NAN, &mut modal, &mut lock);
        assert!((orrery.clock() - clock - MAX_FRAME_DT).abs() < 1e-12);
    }

    #[test]
    fn pointer_motion_ignored_without_lock() {
        let (mut orrery, _, lock) = loaded();
        orrery.on_pointer_motion(10.0, 10.0, &lock);
        assert_eq!(orrery.controls().pointer_delta, (0.0, 0.0));
        orrery.on_pointer_motion(10.0, 10.0, &Lock(true));
        assert_eq!(orrery.controls().pointer_delta, (10.0, 10.0));
    }

    #[test]
    fn right_button_holds_boost() {
        let (mut orrery, mut modal, mut lock) = loaded();
        orrery.on_pointer_button(PointerButton::Right, true, &mut modal, &mut lock);
        assert!(orrery.controls().boost);
        orrery.on_pointer_button(PointerButton::Right, false, &mut modal, &mut lock);
        assert!(!orrery.controls().boost);
    }

    #[test]
    fn navigate_to_flies_next_to_the_body() {
        let (mut orrery, mut modal, mut lock) = loaded();
        assert!(!orrery.navigate_to("Pluto"));
        assert!(orrery.navigate_to("Mercury"));
        for _ in 0..130 {
            orrery.frame(1.0 / 60.0, &mut modal, &mut lock);
        }
        assert!(!orrery.is_approaching());
        let report = orrery.frame(1.0 / 60.0, &mut modal, &mut lock);
        let target = report.hud.target.expect("Mercury in range");
        assert_eq!(target.name, "Mercury");
        assert!(target.distance < 60.0);
    }

    #[test]
    fn force_interaction_opens_by_name() {
        let (mut orrery, mut modal, mut lock) = loaded();
        assert_eq!(
            orrery.force_interaction("Nope", &mut modal, &mut lock),
            ClickOutcome::Ignored
        );
        assert!(matches!(
            orrery.force_interaction("Saturn", &mut modal, &mut lock),
            ClickOutcome::Opened(_)
        ));
        assert!(modal.0);
        assert!(orrery.on_key(Key::Escape, true));
    }

    #[test]
    fn enrichment_appends_to_projects() {
        let (mut orrery, _, _) = loaded();
        assert!(orrery.begin_enrichment());
        orrery.finish_enrichment(Ok(vec![RepoItem {
            name: "orrery".into(),
            description: None,
            html_url: "https://example.com".into(),
            language: Some("Rust".into()),
            stargazers_count: 0,
            fork: false,
        }]));
        let (_, earth) = orrery.scene().lookup("Earth").unwrap();
        let body = &earth.content.as_ref().unwrap().body;
        assert!(body.contains("Latest repositories"));
        assert!(body.contains("- orrery [Rust]"));
    }

    #[test]
    fn enrichment_failure_leaves_content_alone() {
        let (mut orrery, _, _) = loaded();
        let before = orrery.scene().lookup("Earth").unwrap().1.content.clone();
        orrery.begin_enrichment();
        orrery.finish_enrichment(Err(FetchError::Transport("offline".into())));
        let after = orrery.scene().lookup("Earth").unwrap().1.content.clone();
        assert_eq!(before, after);
        assert!(orrery.enrichment().status_line().contains("offline"));
    }

    #[test]
    fn hud_labels_without_target() {
        let (mut orrery, mut modal, mut lock) = loaded();
        let hud = orrery.frame(1.0 / 60.0, &mut modal, &mut lock).hud;
        assert_eq!(hud.target_label(), "None");
        assert_eq!(hud.distance_label(), "-- km");
        assert_eq!(hud.status, EngineStatus::Idle);
    }
    #[test]
    fn hold_buttons_drive_ascend_and_boost() {
        let (mut orrery, mut modal, mut lock) = flying();
        let start_y = orrery.navigation().base_position().y;
        orrery.on_intent(Intent::Ascend, true);
        orrery.on_intent(Intent::Boost, true);
        assert!(orrery.controls().boost);
        for _ in 0..30 {
            orrery.frame(1.0 / 60.0, &mut modal, &mut lock);
        }
        assert!(orrery.navigation().base_position().y > start_y);
        assert!(orrery.thruster().is_thrusting());
        assert!(orrery.thruster().pitch() > 1.0);

        orrery.on_intent(Intent::Ascend, false);
        orrery.on_intent(Intent::Boost, false);
        assert!(!orrery.controls().boost);
        for _ in 0..60 {
            orrery.frame(1.0 / 60.0, &mut modal, &mut lock);
        }
        assert!(!orrery.thruster().is_thrusting());
        assert!(!orrery.thruster().is_audible());
    }

    #[test]
    fn thruster_silent_while_welcome_blocks_controls() {
        let (mut orrery, mut modal, mut lock) = loaded();
        for _ in 0..180 {
            orrery.frame(1.0 / 60.0, &mut modal, &mut lock);
        }
        assert!(orrery.startup().welcome_visible());
        orrery.on_intent(Intent::Forward, true);
        for _ in 0..30 {
            orrery.frame(1.0 / 60.0, &mut modal, &mut lock);
        }
        assert!(!orrery.thruster().is_audible());
    }

    #[test]
    fn target_distance_measured_from_unshaken_camera() {
        let (mut orrery, mut modal, mut lock) = flying();
        assert!(orrery.navigate_to("Mercury"));
        for _ in 0..140 {
            orrery.frame(1.0 / 60.0, &mut modal, &mut lock);
        }
        let report = orrery.frame(1.0 / 60.0, &mut modal, &mut lock);
        let target = report.hud.target.expect("Mercury in range");
        let body = orrery.scene().body(target.id).unwrap();
        let expected = (body.position - orrery.navigation().base_position()).length();
        assert!((target.distance - expected).abs() < 1e-9);
        assert_ne!(
            orrery.navigation().pose().position,
            orrery.navigation().base_position(),
            "idle shake offsets the rendered pose"
        );
    }
}
