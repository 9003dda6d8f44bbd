//! Startup choreography: environment check, staged loading, welcome.
//!
//! Loading runs through five ordered stages. Each stage has a minimum
//! dwell time for the loading screen and completes once the host has marked
//! it ready. Every stage shown adds 20 % to the progress bar. If loading has
//! not reached the last stage within the timeout, startup fails.
//!
//! Once loaded, a welcome message appears after a short delay. Controls are
//! disabled while it is visible; acknowledging it re-enables them and asks
//! for pointer lock a moment later.

use log::{info, warn};
use thiserror::Error;

use crate::config::{validate_config, ConfigError, OrreryConfig};
use crate::schedule::DeferredQueue;

pub const LOADING_TIMEOUT_SECS: f64 = 30.0;
pub const WELCOME_DELAY_SECS: f64 = 2.0;
pub const WELCOME_RELOCK_DELAY_SECS: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadingStage {
    InitRenderer,
    BuildSolarSystem,
    ConfigureControls,
    PrepareInterface,
    Finalize,
}

impl LoadingStage {
    pub const ALL: [LoadingStage; 5] = [
        LoadingStage::InitRenderer,
        LoadingStage::BuildSolarSystem,
        LoadingStage::ConfigureControls,
        LoadingStage::PrepareInterface,
        LoadingStage::Finalize,
    ];

    pub fn message(self) -> &'static str {
        match self {
            Self::InitRenderer => "Initialising 3D engine...",
            Self::BuildSolarSystem => "Building the solar system...",
            Self::ConfigureControls => "Configuring controls...",
            Self::PrepareInterface => "Preparing the interface...",
            Self::Finalize => "Finalising...",
        }
    }

    /// Minimum time the stage stays on screen.
    pub fn dwell_secs(self) -> f64 {
        match self {
            Self::InitRenderer => 0.3,
            Self::BuildSolarSystem => 0.5,
            Self::ConfigureControls => 0.2,
            Self::PrepareInterface => 0.2,
            Self::Finalize => 0.5,
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StartupError {
    #[error("3D rendering is not supported on this device")]
    UnsupportedEnvironment,
    #[error("invalid configuration: {0:?}")]
    InvalidConfig(Vec<ConfigError>),
    #[error("loading is taking too long ({0:.0} s)")]
    TimedOut(f64),
}

impl StartupError {
    /// Suggestions shown under the error message.
    pub fn remediation(&self) -> &'static [&'static str] {
        match self {
            Self::UnsupportedEnvironment => &[
                "Use a recent browser or graphics driver",
                "Enable hardware acceleration",
                "Reload the page",
            ],
            Self::InvalidConfig(_) => &["Check the configuration file", "Reload the page"],
            Self::TimedOut(_) => &["Check your internet connection", "Reload the page"],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StartupEvent {
    StageStarted { stage: LoadingStage, progress: u8 },
    Loaded,
    ShowWelcome,
    RequestPointerLock,
    Failed(StartupError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum StartupPhase {
    NotStarted,
    Loading { stage: LoadingStage, elapsed: f64 },
    Running,
    Failed(StartupError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cue {
    ShowWelcome,
    RequestPointerLock,
}

pub struct StartupSequence {
    phase: StartupPhase,
    ready: [bool; 5],
    progress: u8,
    clock: f64,
    cues: DeferredQueue<Cue>,
    welcome_visible: bool,
}

impl StartupSequence {
    /// Stages complete only when marked ready by the host.
    pub fn new() -> Self {
        Self {
            phase: StartupPhase::NotStarted,
            ready: [false; 5],
            progress: 0,
            clock: 0.0,
            cues: DeferredQueue::new(),
            welcome_visible: false,
        }
    }

    /// Every stage is ready up front; only the dwell times apply.
    pub fn simulated() -> Self {
        Self {
            ready: [true; 5],
            ..Self::new()
        }
    }

    /// Check the environment and configuration, then enter the first stage.
    pub fn begin(
        &mut self,
        environment_supported: bool,
        config: &OrreryConfig,
    ) -> Result<Vec<StartupEvent>, StartupError> {
        if !environment_supported {
            return Err(self.fail(StartupError::UnsupportedEnvironment));
        }
        let errors = validate_config(config);
        if !errors.is_empty() {
            return Err(self.fail(StartupError::InvalidConfig(errors)));
        }
        Ok(vec![self.enter(LoadingStage::InitRenderer)])
    }

    fn fail(&mut self, error: StartupError) -> StartupError {
        warn!("startup failed: {error}");
        self.phase = StartupPhase::Failed(error.clone());
        error
    }

    fn enter(&mut self, stage: LoadingStage) -> StartupEvent {
        self.progress = (self.progress + 20).min(100);
        info!("loading: {} ({}%)", stage.message(), self.progress);
        self.phase = StartupPhase::Loading {
            stage,
            elapsed: 0.0,
        };
        StartupEvent::StageStarted {
            stage,
            progress: self.progress,
        }
    }

    pub fn mark_ready(&mut self, stage: LoadingStage) {
        self.ready[stage.index()] = true;
    }

    /// Advance the logical clock and report what happened.
    pub fn advance(&mut self, dt: f64) -> Vec<StartupEvent> {
        let mut events = Vec::new();
        self.clock += dt;

        if let StartupPhase::Loading { stage, elapsed } = &mut self.phase {
            *elapsed += dt;
            let (stage, elapsed) = (*stage, *elapsed);
            if stage != LoadingStage::Finalize && self.clock >= LOADING_TIMEOUT_SECS {
                let error = self.fail(StartupError::TimedOut(LOADING_TIMEOUT_SECS));
                events.push(StartupEvent::Failed(error));
                return events;
            }
            if self.ready[stage.index()] && elapsed >= stage.dwell_secs() {
                match LoadingStage::ALL.get(stage.index() + 1) {
                    Some(next) => events.push(self.enter(*next)),
                    None => {
                        info!("loading complete after {:.2} s", self.clock);
                        self.phase = StartupPhase::Running;
                        self.cues
                            .schedule(self.clock + WELCOME_DELAY_SECS, 0, Cue::ShowWelcome);
                        events.push(StartupEvent::Loaded);
                    }
                }
            }
        }

        for cue in self.cues.drain_due(self.clock) {
            match cue.action {
                Cue::ShowWelcome => {
                    self.welcome_visible = true;
                    events.push(StartupEvent::ShowWelcome);
                }
                Cue::RequestPointerLock => events.push(StartupEvent::RequestPointerLock),
            }
        }
        events
    }

    /// User dismissed the welcome message.
    pub fn acknowledge_welcome(&mut self) {
        if self.welcome_visible {
            self.welcome_visible = false;
            self.cues.schedule(
                self.clock + WELCOME_RELOCK_DELAY_SECS,
                0,
                Cue::RequestPointerLock,
            );
        }
    }

    pub fn phase(&self) -> &StartupPhase {
        &self.phase
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn is_loaded(&self) -> bool {
        self.phase == StartupPhase::Running
    }

    pub fn welcome_visible(&self) -> bool {
        self.welcome_visible
    }

    pub fn controls_enabled(&self) -> bool {
        self.is_loaded() && !self.welcome_visible
    }

    pub fn status_text(&self) -> String {
        match &self.phase {
            StartupPhase::NotStarted => String::new(),
            StartupPhase::Loading { stage, .. } => stage.message().to_string(),
            StartupPhase::Running => "Ready".to_string(),
            StartupPhase::Failed(error) => error.to_string(),
        }
    }
}

impl Default for StartupSequence {
    fn default() -> Self {
        Self::new()
    }
}
