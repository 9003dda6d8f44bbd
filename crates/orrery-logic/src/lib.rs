//! Pure navigation and interaction logic for Orrery.
//!
//! Everything the solar-system portfolio does between raw input and
//! rendering lives here: orbiting bodies, spaceship-style camera controls,
//! the click gate around the content modal, and startup choreography.
//! Nothing depends on a renderer or windowing library; hosts plug in through
//! the [`interaction::ModalPort`] and [`interaction::PointerLockPort`]
//! traits and feed input through [`session::Orrery`].
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`approach`] | Stand-off point and eased camera flight to a named body |
//! | [`config`] | Bodies, control tunables, environment; validation |
//! | [`enrichment`] | Best-effort repository listing for the projects planet |
//! | [`input`] | Key/button bindings, control intents, virtual joystick |
//! | [`interaction`] | Click gate state machine around the content modal |
//! | [`navigation`] | Velocity/decay integrator, orientation smoothing, engine status |
//! | [`scene`] | Circular orbits, self-rotation, nearest-body query |
//! | [`schedule`] | Deferred actions on a logical clock with epoch tags |
//! | [`session`] | Per-frame driver and HUD snapshot |
//! | [`shake`] | Procedural camera shake |
//! | [`startup`] | Loading stages, timeout, welcome message |
//! | [`thruster`] | Engine hum gain envelope and speed-following tone |
//! | [`vector`] | `Vec3` and YXZ Euler orientation |

pub mod approach;
pub mod config;
pub mod enrichment;
pub mod input;
pub mod interaction;
pub mod navigation;
pub mod scene;
pub mod schedule;
pub mod session;
pub mod shake;
pub mod startup;
pub mod thruster;
pub mod vector;
