//! Orrery Viewer - Bevy front end for the portfolio solar system
//!
//! Renders the scene, feeds raw input into the `orrery-logic` session and
//! shows its HUD, modal and startup screens. Per frame: input adapters,
//! then `Orrery::frame` (navigation, scene, gate), then audio, transform sync
//! and UI.
//!
//! Usage: `orrery-viewer [--config <file.json>] [--github-user <name>]`

mod audio;
mod enrichment;
mod input;
mod scene;
mod state;
mod ui;

use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::prelude::*;
use orrery_logic::config::OrreryConfig;
use orrery_logic::enrichment::RepoQuery;
use orrery_logic::session::Orrery;
use orrery_logic::startup::{LoadingStage, StartupEvent, StartupSequence};

use audio::{drive_thruster_audio, ThrusterAudioPlugin};
use enrichment::{poll_enrichment, start_enrichment, EnrichmentSettings, EnrichmentTask};
use input::{apply_cursor_lock, keyboard_input, mouse_input, touch_input, window_focus};
use scene::{setup_scene, sync_transforms};
use state::{BodyMarker, CursorLock, FrameState, HudText, MainCamera, ModalView, Session, TouchRoles};
use ui::{
    intent_buttons, interact_button, modal_buttons, setup_ui, update_hud, update_modal,
    update_overlays,
};

const REPO_LIMIT: u32 = 6;

struct Args {
    config_path: Option<String>,
    github_user: Option<String>,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args {
        config_path: None,
        github_user: None,
    };
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" if i + 1 < args.len() => {
                parsed.config_path = Some(args[i + 1].clone());
                i += 2;
            }
            "--github-user" | "-u" if i + 1 < args.len() => {
                parsed.github_user = Some(args[i + 1].clone());
                i += 2;
            }
            _ => i += 1,
        }
    }
    parsed
}

fn load_config(path: Option<&str>) -> OrreryConfig {
    let Some(path) = path else {
        return OrreryConfig::default();
    };
    match std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|json| OrreryConfig::from_json(&json).map_err(|e| e.to_string()))
    {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config {path}: {e}; using defaults");
            OrreryConfig::default()
        }
    }
}

fn main() {
    let args = parse_args();
    let config = load_config(args.config_path.as_deref());

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Orrery - Portfolio Solar System".to_string(),
                resolution: (1280.0, 720.0).into(),
                present_mode: bevy::window::PresentMode::AutoVsync,
                ..default()
            }),
            ..default()
        }))
        .add_plugins(FrameTimeDiagnosticsPlugin)
        .add_plugins(ThrusterAudioPlugin)
        .insert_resource(Session(Orrery::with_startup(config, StartupSequence::new())))
        .insert_resource(ModalView::default())
        .insert_resource(CursorLock::default())
        .insert_resource(FrameState::default())
        .insert_resource(TouchRoles::default())
        .insert_resource(EnrichmentSettings {
            query: args.github_user.map(|user| RepoQuery::new(user, REPO_LIMIT)),
        })
        .insert_resource(EnrichmentTask::default())
        .add_systems(Startup, (setup_scene, setup_ui, begin_startup).chain())
        .add_systems(
            Update,
            (
                mark_stages_ready,
                keyboard_input,
                mouse_input,
                touch_input,
                window_focus,
                modal_buttons,
                interact_button,
                intent_buttons,
                drive_frame,
                start_enrichment,
                poll_enrichment,
                apply_cursor_lock,
                drive_thruster_audio,
                sync_transforms,
                update_modal,
                update_hud,
                update_overlays,
            )
                .chain(),
        )
        .run();
}

/// Reaching the render loop means a window and GPU surface exist.
fn begin_startup(mut session: ResMut<Session>, mut frame: ResMut<FrameState>) {
    match session.0.start(true) {
        Ok(events) => {
            for event in events {
                debug!("startup: {event:?}");
            }
        }
        Err(e) => {
            error!("Startup failed: {e}");
            frame.fatal = Some(e);
        }
    }
}

/// Tell the startup sequence which stages the app has actually completed.
fn mark_stages_ready(
    mut session: ResMut<Session>,
    mut done: Local<bool>,
    camera_q: Query<(), With<MainCamera>>,
    bodies_q: Query<(), With<BodyMarker>>,
    hud_q: Query<(), With<HudText>>,
) {
    if *done {
        return;
    }
    let renderer_up = !camera_q.is_empty();
    let bodies_built = bodies_q.iter().count() == session.0.scene().len();
    let interface_up = !hud_q.is_empty();

    let startup = session.0.startup_mut();
    if renderer_up {
        startup.mark_ready(LoadingStage::InitRenderer);
    }
    if bodies_built {
        startup.mark_ready(LoadingStage::BuildSolarSystem);
    }
    // Input systems run every frame from here on.
    startup.mark_ready(LoadingStage::ConfigureControls);
    if interface_up {
        startup.mark_ready(LoadingStage::PrepareInterface);
    }
    startup.mark_ready(LoadingStage::Finalize);
    *done = renderer_up && bodies_built && interface_up;
}

fn drive_frame(
    time: Res<Time>,
    mut session: ResMut<Session>,
    mut modal: ResMut<ModalView>,
    mut lock: ResMut<CursorLock>,
    mut frame: ResMut<FrameState>,
) {
    let dt = time.delta_secs() as f64;
    let report = session.0.frame(dt, &mut *modal, &mut *lock);
    for event in report.startup_events {
        match event {
            StartupEvent::Failed(e) => {
                error!("Startup failed: {e}");
                frame.fatal = Some(e);
            }
            StartupEvent::Loaded => info!("Solar system ready"),
            other => debug!("startup: {other:?}"),
        }
    }
    frame.hud = Some(report.hud);
}
