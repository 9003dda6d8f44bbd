//! Orrery Headless Harness
//!
//! Validates the navigation and interaction core without a renderer.
//! Runs entirely in-process: no window, no GPU, no network.
//!
//! Usage:
//!   cargo run -p orrery-simtest
//!   cargo run -p orrery-simtest -- --verbose
//!   cargo run -p orrery-simtest -- --config my_system.json
//!   cargo run -p orrery-simtest -- --dump-config > default.json
//!
//! Set `RUST_LOG=debug` to see gate transitions and deferred actions.

use std::f64::consts::{FRAC_PI_2, TAU};

use log::info;
use orrery_logic::config::{validate_config, OrreryConfig};
use orrery_logic::enrichment::{
    parse_listing, ContentSource, EnrichmentState, FetchError, RepoItem, RepoQuery,
};
use orrery_logic::input::{ControlState, Key, PointerButton};
use orrery_logic::interaction::{
    ClickOutcome, CloseReason, GateState, InteractionGate, ModalPort, PointerLockPort,
};
use orrery_logic::navigation::{EngineStatus, NavigationController};
use orrery_logic::scene::{BodyId, SceneModel};
use orrery_logic::session::Orrery;
use orrery_logic::shake::CameraShake;
use orrery_logic::startup::{StartupError, StartupEvent, StartupSequence};
use orrery_logic::vector::Vec3;

// ── Canned repository listing (stands in for the remote fetch) ──────────
const SAMPLE_REPOS_JSON: &str = include_str!("../../../data/sample_repos.json");

const DT: f64 = 1.0 / 60.0;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

struct Args {
    verbose: bool,
    config_path: Option<String>,
    dump_config: bool,
}

fn parse_args() -> Args {
    let mut args = Args {
        verbose: false,
        config_path: None,
        dump_config: false,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--verbose" => args.verbose = true,
            "--dump-config" => args.dump_config = true,
            "--config" => args.config_path = iter.next(),
            other => eprintln!("ignoring unknown argument {other}"),
        }
    }
    args
}

fn load_config(path: Option<&str>) -> Result<OrreryConfig, String> {
    match path {
        None => Ok(OrreryConfig::default()),
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|e| format!("{path}: {e}"))?;
            OrreryConfig::from_json(&text).map_err(|e| format!("{path}: {e}"))
        }
    }
}

fn main() {
    env_logger::init();
    let args = parse_args();

    if args.dump_config {
        match serde_json::to_string_pretty(&OrreryConfig::default()) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("could not serialise default config: {e}");
                std::process::exit(2);
            }
        }
        return;
    }

    let config = match load_config(args.config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("config error: {e}");
            std::process::exit(2);
        }
    };
    let verbose = args.verbose;
    println!("=== Orrery Simulation Harness ===\n");
    info!("running with {} bodies", config.bodies.len());

    let mut results = Vec::new();

    // 1. Configuration
    results.extend(validate_configuration(&config, verbose));

    // 2. Orbits and proximity
    results.extend(validate_scene(&config, verbose));

    // 3. Navigation integrator
    results.extend(validate_navigation(&config, verbose));

    // 4. Camera shake
    results.extend(validate_shake(&config));

    // 5. Interaction gate
    results.extend(validate_gate(&config));

    // 6. Startup sequencing
    results.extend(validate_startup(&config));

    // 7. Remote enrichment (canned)
    results.extend(validate_enrichment(verbose));

    // 8. Scripted session
    results.extend(validate_session(&config, verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── In-memory ports ─────────────────────────────────────────────────────

#[derive(Default)]
struct HeadlessModal {
    open: bool,
    opened: u32,
}

impl ModalPort for HeadlessModal {
    fn open(&mut self, _title: &str, _body: &str) {
        self.open = true;
        self.opened += 1;
    }
    fn close(&mut self) {
        self.open = false;
    }
    fn is_open(&self) -> bool {
        self.open
    }
}

#[derive(Default)]
struct HeadlessLock {
    engaged: bool,
    requests: u32,
}

impl PointerLockPort for HeadlessLock {
    fn request(&mut self) {
        self.engaged = true;
        self.requests += 1;
    }
    fn release(&mut self) {
        self.engaged = false;
    }
    fn is_engaged(&self) -> bool {
        self.engaged
    }
}

struct CannedSource(&'static str);

impl ContentSource for CannedSource {
    fn fetch(&self, _query: &RepoQuery) -> Result<Vec<RepoItem>, FetchError> {
        parse_listing(self.0)
    }
}

struct OfflineSource;

impl ContentSource for OfflineSource {
    fn fetch(&self, _query: &RepoQuery) -> Result<Vec<RepoItem>, FetchError> {
        Err(FetchError::Transport("connection refused".into()))
    }
}

// ── 1. Configuration ────────────────────────────────────────────────────

fn validate_configuration(config: &OrreryConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Configuration ---");
    let mut results = Vec::new();

    let errors = validate_config(config);
    results.push(TestResult {
        name: "config_valid".into(),
        passed: errors.is_empty(),
        detail: if errors.is_empty() {
            format!("{} bodies, no errors", config.bodies.len())
        } else {
            format!("{:?}", errors)
        },
    });

    let with_content = config.bodies.iter().filter(|b| b.content.is_some()).count();
    results.push(TestResult {
        name: "config_content_present".into(),
        passed: with_content > 0,
        detail: format!("{}/{} bodies carry content", with_content, config.bodies.len()),
    });

    let round_trip = config
        .to_json_pretty()
        .and_then(|json| OrreryConfig::from_json(&json));
    results.push(TestResult {
        name: "config_json_round_trip".into(),
        passed: round_trip.as_ref().map_or(false, |c| c == config),
        detail: match &round_trip {
            Ok(_) => "serialise → parse is lossless".into(),
            Err(e) => format!("round trip failed: {}", e),
        },
    });

    if verbose {
        println!("  Bodies:");
        for body in &config.bodies {
            println!(
                "    {:<8} {:<13} r={:>5.0} ω={:.3} spin={:+.3}",
                body.name, body.section, body.orbit_radius, body.orbital_speed, body.spin_speed
            );
        }
    }

    results
}

// ── 2. Orbits & Proximity ───────────────────────────────────────────────

fn validate_scene(config: &OrreryConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Orbits & Proximity ---");
    let mut results = Vec::new();

    // Angle additivity: advance(t1); advance(t2) == advance(t1 + t2)
    let mut split = SceneModel::from_config(config);
    let mut whole = SceneModel::from_config(config);
    split.advance(12.5);
    split.advance(7.25);
    whole.advance(19.75);
    let max_err = split
        .bodies()
        .iter()
        .zip(whole.bodies())
        .map(|(a, b)| {
            let diff = (a.angle - b.angle).rem_euclid(TAU);
            diff.min(TAU - diff)
        })
        .fold(0.0f64, f64::max);
    results.push(TestResult {
        name: "scene_angle_additive".into(),
        passed: max_err < 1e-9,
        detail: format!("max angle error {:.2e} rad", max_err),
    });

    // Orbits stay circular
    let mut scene = SceneModel::from_config(config);
    let mut max_drift = 0.0f64;
    for _ in 0..10_000 {
        scene.advance(DT);
        for body in scene.bodies() {
            max_drift = max_drift.max((body.position.length() - body.orbit_radius).abs());
        }
    }
    results.push(TestResult {
        name: "scene_orbits_circular".into(),
        passed: max_drift < 1e-6,
        detail: format!("max radial drift {:.2e} over 10k frames", max_drift),
    });

    // None in range of the sun
    let scene = SceneModel::from_config(config);
    let closest = scene
        .bodies()
        .iter()
        .map(|b| b.position.length())
        .fold(f64::INFINITY, f64::min);
    let at_origin = scene.nearest(Vec3::ZERO, 100.0);
    results.push(TestResult {
        name: "scene_origin_out_of_range".into(),
        passed: at_origin.is_none() == (closest > 100.0),
        detail: format!("closest body {:.0} units from origin", closest),
    });

    // Within 50 of the innermost body
    if let Some(first) = scene.bodies().first() {
        let direction = first.position.try_normalize().unwrap_or(Vec3::new(1.0, 0.0, 0.0));
        let camera = first.position - direction * 40.0 + Vec3::new(0.0, 10.0, 0.0);
        let expected = camera.distance(&first.position);
        let hit = scene.nearest(camera, 100.0);
        results.push(TestResult {
            name: "scene_nearest_innermost".into(),
            passed: hit.map_or(false, |h| {
                h.id == BodyId(0) && (h.distance - expected).abs() < 1e-6
            }),
            detail: format!(
                "{} at {:.3} (expected {:.3})",
                first.name,
                hit.map_or(-1.0, |h| h.distance),
                expected
            ),
        });

        // Inclusive boundary
        let exact = scene.nearest(first.position + Vec3::new(0.0, 100.0, 0.0), 100.0);
        results.push(TestResult {
            name: "scene_nearest_boundary_inclusive".into(),
            passed: exact.is_some(),
            detail: "distance == maxDistance qualifies".into(),
        });
    }

    // Lookup
    let names_ok = config.bodies.iter().all(|b| {
        let upper = b.name.to_uppercase();
        scene.lookup(&b.name).is_some() && (upper == b.name || scene.lookup(&upper).is_none())
    });
    results.push(TestResult {
        name: "scene_lookup_exact".into(),
        passed: names_ok,
        detail: "every configured name resolves, case-sensitively".into(),
    });

    if verbose {
        let mut scene = SceneModel::from_config(config);
        scene.advance(60.0);
        println!("  Positions after 60 s:");
        for body in scene.bodies() {
            println!(
                "    {:<8} angle={:>6.3} pos=({:>7.1}, {:>7.1})",
                body.name, body.angle, body.position.x, body.position.z
            );
        }
    }

    results
}

// ── 3. Navigation ───────────────────────────────────────────────────────

fn validate_navigation(config: &OrreryConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Navigation ---");
    let mut results = Vec::new();
    let controls = &config.controls;

    // Accelerate, then coast
    let mut nav = NavigationController::new(controls.clone(), Vec3::ZERO);
    let mut input = ControlState::default();
    input.apply_key(Key::ArrowUp, true);
    input.boost = true;
    let mut peak = 0.0f64;
    for _ in 0..600 {
        nav.update(DT, &mut input);
        peak = peak.max(nav.speed());
    }
    results.push(TestResult {
        name: "nav_speed_capped".into(),
        passed: peak <= controls.movement.max_speed + 1e-9,
        detail: format!("peak {:.3} ≤ max {:.1}", peak, controls.movement.max_speed),
    });

    let mut idle = ControlState::default();
    let mut monotone = true;
    let mut last = nav.speed();
    let mut curve = Vec::new();
    for frame in 0..600 {
        nav.update(DT, &mut idle);
        let speed = nav.speed();
        if speed > last || speed < 0.0 {
            monotone = false;
        }
        if frame % 60 == 0 {
            curve.push(speed);
        }
        last = speed;
    }
    results.push(TestResult {
        name: "nav_decay_monotone".into(),
        passed: monotone && last < 1e-6,
        detail: format!("speed after 10 s idle: {:.2e}", last),
    });

    // Opposing intents cancel; no NaN
    let mut nav = NavigationController::new(controls.clone(), Vec3::ZERO);
    let mut opposed = ControlState::default();
    opposed.apply_key(Key::ArrowLeft, true);
    opposed.apply_key(Key::ArrowRight, true);
    nav.update(DT, &mut opposed);
    results.push(TestResult {
        name: "nav_zero_direction_safe".into(),
        passed: nav.velocity() == Vec3::ZERO && nav.base_position().x.is_finite(),
        detail: "left+right yields zero direction without normalising".into(),
    });

    // Pitch clamp under absurd input
    let mut nav = NavigationController::new(controls.clone(), Vec3::ZERO);
    let mut look = ControlState::default();
    let mut worst = 0.0f64;
    for i in 0..400 {
        let dy = if i % 200 < 100 { -1.0e7 } else { 1.0e7 };
        look.add_pointer_delta(0.0, dy);
        nav.update(DT, &mut look);
        worst = worst.max(nav.orientation().pitch.abs());
        worst = worst.max(nav.target_angles().1.abs());
    }
    results.push(TestResult {
        name: "nav_pitch_clamped".into(),
        passed: worst <= FRAC_PI_2,
        detail: format!("max |pitch| {:.6} ≤ π/2", worst),
    });

    // Engine status derivation
    let mut c = ControlState::default();
    let idle_status = EngineStatus::from_controls(&c);
    c.boost = true;
    let boost_only = EngineStatus::from_controls(&c);
    c.apply_key(Key::Space, true);
    let boosting = EngineStatus::from_controls(&c);
    results.push(TestResult {
        name: "nav_engine_status".into(),
        passed: idle_status == EngineStatus::Idle
            && boost_only == EngineStatus::Idle
            && boosting == EngineStatus::Boost,
        detail: "idle / boost-without-movement idle / boost".into(),
    });

    if verbose {
        println!("  Coasting speed per second:");
        for (second, speed) in curve.iter().enumerate() {
            println!("    t={:>2}s  {:.5}", second, speed);
        }
    }

    results
}

// ── 4. Camera Shake ─────────────────────────────────────────────────────

fn validate_shake(config: &OrreryConfig) -> Vec<TestResult> {
    println!("--- Camera Shake ---");
    let mut results = Vec::new();
    let shake_config = &config.controls.shake;

    let mut still = CameraShake::default();
    let mut all_zero = true;
    for i in 0..1000 {
        still.time = i as f64 * 0.013;
        still.frequency = shake_config.boost.frequency;
        all_zero &= still.offset() == Vec3::ZERO && still.roll() == 0.0;
    }
    results.push(TestResult {
        name: "shake_zero_intensity_still".into(),
        passed: all_zero,
        detail: "intensity 0 → offset exactly zero for all t".into(),
    });

    let mut shake = CameraShake::default();
    for _ in 0..600 {
        shake.update(DT, shake_config.boost, shake_config.blend_rate);
    }
    let gap = (shake.intensity - shake_config.boost.intensity).abs();
    results.push(TestResult {
        name: "shake_converges_to_preset".into(),
        passed: gap < 1e-6,
        detail: format!("intensity {:.5} after 10 s", shake.intensity),
    });

    results
}

// ── 5. Interaction Gate ─────────────────────────────────────────────────

fn validate_gate(config: &OrreryConfig) -> Vec<TestResult> {
    println!("--- Interaction Gate ---");
    let mut results = Vec::new();
    let scene = SceneModel::from_config(config);
    let Some(first) = scene.bodies().first() else {
        return results;
    };
    let near_first = first.position - first.position.try_normalize().unwrap_or(Vec3::ZERO) * 10.0;
    let radius = config.controls.interaction.activation_radius;

    // [proximity, click, close, click, click, click]
    let mut gate = InteractionGate::new(config.controls.interaction.clone());
    let mut modal = HeadlessModal::default();
    let mut lock = HeadlessLock {
        engaged: true,
        ..HeadlessLock::default()
    };
    gate.update(scene.nearest(near_first, radius));
    let acquired = gate.state() == GateState::TargetAcquired(BodyId(0));
    let open = gate.on_click(PointerButton::Left, &scene, &mut modal, &mut lock);
    gate.on_close(CloseReason::Escape, 0.0);
    gate.tick(1.0, &mut modal, &mut lock);
    let cooldown = config.controls.interaction.cooldown_clicks;
    let swallowed: Vec<ClickOutcome> = (0..cooldown)
        .map(|_| gate.on_click(PointerButton::Left, &scene, &mut modal, &mut lock))
        .collect();
    let opens_before_live = modal.opened;
    let live = gate.on_click(PointerButton::Left, &scene, &mut modal, &mut lock);

    results.push(TestResult {
        name: "gate_click_sequence".into(),
        passed: acquired
            && open == ClickOutcome::Opened(BodyId(0))
            && swallowed
                .iter()
                .all(|o| matches!(o, ClickOutcome::Swallowed { .. }))
            && opens_before_live == 1
            && live == ClickOutcome::Opened(BodyId(0)),
        detail: format!(
            "open, {} swallowed, click {} live",
            swallowed.len(),
            swallowed.len() + 1
        ),
    });

    // Stale deferred hide must not close a reopened modal
    let mut quick = config.controls.interaction.clone();
    quick.cooldown_clicks = 0;
    let mut gate = InteractionGate::new(quick);
    let mut modal = HeadlessModal::default();
    let mut lock = HeadlessLock::default();
    gate.update(scene.nearest(near_first, radius));
    gate.interact_touch(&scene, &mut modal, &mut lock);
    gate.on_close(CloseReason::Button, 0.0);
    gate.interact_touch(&scene, &mut modal, &mut lock);
    gate.tick(10.0, &mut modal, &mut lock);
    results.push(TestResult {
        name: "gate_stale_action_dropped".into(),
        passed: modal.open && lock.requests == 0,
        detail: format!("epoch {}, modal still open", gate.epoch()),
    });

    // Right click never interacts
    let mut gate = InteractionGate::new(config.controls.interaction.clone());
    let mut modal = HeadlessModal::default();
    gate.update(scene.nearest(near_first, radius));
    let right = gate.on_click(
        PointerButton::Right,
        &scene,
        &mut modal,
        &mut HeadlessLock {
            engaged: true,
            ..HeadlessLock::default()
        },
    );
    results.push(TestResult {
        name: "gate_left_button_only".into(),
        passed: right == ClickOutcome::Ignored && modal.opened == 0,
        detail: "right click ignored".into(),
    });

    results
}

// ── 6. Startup ──────────────────────────────────────────────────────────

fn validate_startup(config: &OrreryConfig) -> Vec<TestResult> {
    println!("--- Startup ---");
    let mut results = Vec::new();

    let mut seq = StartupSequence::simulated();
    let mut events = seq.begin(true, config).unwrap_or_default();
    let mut loaded_at = None;
    for frame in 0..300 {
        let step = seq.advance(DT);
        if loaded_at.is_none() && step.contains(&StartupEvent::Loaded) {
            loaded_at = Some(frame as f64 * DT);
        }
        events.extend(step);
    }
    let stages = events
        .iter()
        .filter(|e| matches!(e, StartupEvent::StageStarted { .. }))
        .count();
    results.push(TestResult {
        name: "startup_stages".into(),
        passed: stages == 5 && seq.progress() == 100 && loaded_at.is_some(),
        detail: format!(
            "{} stages, loaded after {:.2} s",
            stages,
            loaded_at.unwrap_or(f64::NAN)
        ),
    });
    results.push(TestResult {
        name: "startup_welcome".into(),
        passed: events.contains(&StartupEvent::ShowWelcome) && !seq.controls_enabled(),
        detail: "welcome shown, controls held until acknowledged".into(),
    });

    let mut unsupported = StartupSequence::simulated();
    results.push(TestResult {
        name: "startup_unsupported_fatal".into(),
        passed: unsupported.begin(false, config) == Err(StartupError::UnsupportedEnvironment),
        detail: "no 3D support → fatal".into(),
    });

    let mut stalled = StartupSequence::new();
    let _ = stalled.begin(true, config);
    let mut timed_out = false;
    for _ in 0..(31.0 / DT) as usize {
        timed_out |= stalled
            .advance(DT)
            .iter()
            .any(|e| matches!(e, StartupEvent::Failed(StartupError::TimedOut(_))));
    }
    results.push(TestResult {
        name: "startup_timeout".into(),
        passed: timed_out,
        detail: "stalled stage fails after 30 s".into(),
    });

    results
}

// ── 7. Enrichment ───────────────────────────────────────────────────────

fn validate_enrichment(verbose: bool) -> Vec<TestResult> {
    println!("--- Enrichment ---");
    let mut results = Vec::new();
    let query = RepoQuery::new("orrery-portfolio", 6);

    let mut state = EnrichmentState::default();
    state.load_from(&CannedSource(SAMPLE_REPOS_JSON), &query);
    let items = state.items().len();
    results.push(TestResult {
        name: "enrichment_parse_listing".into(),
        passed: items == 4,
        detail: format!("{} non-fork repositories ({})", items, state.status_line()),
    });

    let mut failed = EnrichmentState::default();
    failed.load_from(&OfflineSource, &query);
    results.push(TestResult {
        name: "enrichment_failure_inline".into(),
        passed: matches!(failed, EnrichmentState::Failed(_)) && failed.items().is_empty(),
        detail: failed.status_line(),
    });

    if verbose {
        println!("  Query: {}", query.url());
        for item in state.items() {
            println!("    {} ({})", item.name, item.html_url);
        }
    }

    results
}

// ── 8. Scripted Session ─────────────────────────────────────────────────

fn validate_session(config: &OrreryConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Scripted Session ---");
    let mut results = Vec::new();
    let Some(target) = config.bodies.first().map(|b| b.name.clone()) else {
        return results;
    };

    let mut orrery = Orrery::new(config.clone());
    let mut modal = HeadlessModal::default();
    let mut lock = HeadlessLock::default();
    if let Err(e) = orrery.start(true) {
        results.push(TestResult {
            name: "session_start".into(),
            passed: false,
            detail: e.to_string(),
        });
        return results;
    }

    for _ in 0..300 {
        orrery.frame(DT, &mut modal, &mut lock);
    }
    orrery.acknowledge_welcome();
    for _ in 0..10 {
        orrery.frame(DT, &mut modal, &mut lock);
    }
    results.push(TestResult {
        name: "session_lock_after_welcome".into(),
        passed: lock.engaged,
        detail: format!("{} lock request(s)", lock.requests),
    });

    orrery.navigate_to(&target);
    let mut hud = orrery.frame(DT, &mut modal, &mut lock).hud;
    for _ in 0..150 {
        hud = orrery.frame(DT, &mut modal, &mut lock).hud;
    }
    results.push(TestResult {
        name: "session_approach_acquires".into(),
        passed: hud.target_label() == target,
        detail: format!("{} at {}", hud.target_label(), hud.distance_label()),
    });

    let clicked = orrery.on_pointer_button(PointerButton::Left, true, &mut modal, &mut lock);
    orrery.on_key(Key::Escape, true);
    for _ in 0..30 {
        orrery.frame(DT, &mut modal, &mut lock);
    }
    results.push(TestResult {
        name: "session_open_close_relock".into(),
        passed: matches!(clicked, ClickOutcome::Opened(_)) && !modal.open && lock.engaged,
        detail: format!("gate now {}", orrery.gate().state().label()),
    });

    if verbose {
        println!(
            "  HUD: speed={} {} status={}",
            hud.speed_label(),
            hud.position_label(),
            hud.status.label()
        );
    }

    results
}
