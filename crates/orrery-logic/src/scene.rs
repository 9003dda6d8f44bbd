//! Scene model: orbiting bodies, their kinematics, and proximity queries.
//!
//! Bodies move on circles in the horizontal (XZ) plane:
//! `position = (cos(angle)·r, 0, sin(angle)·r)`. The sun and the starfield
//! only spin in place.

use std::sync::Arc;

use crate::config::{ContentPayload, OrreryConfig};
use crate::vector::Vec3;

/// Stable handle to a body: its index in configuration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyId(pub usize);

/// An orbiting celestial object.
#[derive(Debug, Clone)]
pub struct Body {
    pub name: String,
    pub orbit_radius: f64,
    pub orbital_speed: f64,
    pub spin_speed: f64,
    /// Current orbital angle (radians, unbounded).
    pub angle: f64,
    /// Accumulated self-rotation (radians, unbounded).
    pub spin: f64,
    pub position: Vec3,
    pub content: Option<Arc<ContentPayload>>,
}

impl Body {
    pub fn new(
        name: impl Into<String>,
        orbit_radius: f64,
        orbital_speed: f64,
        spin_speed: f64,
        angle: f64,
    ) -> Self {
        let mut body = Self {
            name: name.into(),
            orbit_radius,
            orbital_speed,
            spin_speed,
            angle,
            spin: 0.0,
            position: Vec3::ZERO,
            content: None,
        };
        body.position = body.orbit_position();
        body
    }

    pub fn with_content(mut self, content: ContentPayload) -> Self {
        self.content = Some(Arc::new(content));
        self
    }

    fn orbit_position(&self) -> Vec3 {
        Vec3::new(
            self.angle.cos() * self.orbit_radius,
            0.0,
            self.angle.sin() * self.orbit_radius,
        )
    }

    fn advance(&mut self, dt: f64) {
        self.angle += self.orbital_speed * dt;
        self.position = self.orbit_position();
        self.spin += self.spin_speed * dt;
    }
}

/// Result of a nearest-body query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityHit {
    pub id: BodyId,
    pub distance: f64,
}

/// Owns the bodies and advances them once per frame.
#[derive(Debug, Clone)]
pub struct SceneModel {
    bodies: Vec<Body>,
    pub sun_spin: f64,
    sun_spin_speed: f64,
    pub starfield_spin: f64,
    starfield_spin_speed: f64,
}

impl SceneModel {
    pub fn new(bodies: Vec<Body>) -> Self {
        Self {
            bodies,
            sun_spin: 0.0,
            sun_spin_speed: 0.0,
            starfield_spin: 0.0,
            starfield_spin_speed: 0.0,
        }
    }

    pub fn from_config(config: &OrreryConfig) -> Self {
        let bodies = config
            .bodies
            .iter()
            .map(|b| {
                let start = b.start_position();
                let body = Body::new(
                    b.name.clone(),
                    b.orbit_radius,
                    b.orbital_speed,
                    b.spin_speed,
                    start.z.atan2(start.x),
                );
                match &b.content {
                    Some(content) => body.with_content(content.clone()),
                    None => body,
                }
            })
            .collect();
        Self {
            bodies,
            sun_spin: 0.0,
            sun_spin_speed: config.sun.spin_speed,
            starfield_spin: 0.0,
            starfield_spin_speed: config.environment.starfield.spin_speed,
        }
    }

    /// Advance orbits and spins by `dt` seconds. `dt` is trusted to be
    /// non-negative.
    pub fn advance(&mut self, dt: f64) {
        for body in &mut self.bodies {
            body.advance(dt);
        }
        self.sun_spin += self.sun_spin_speed * dt;
        self.starfield_spin += self.starfield_spin_speed * dt;
    }

    /// Closest body within `max_distance` (inclusive) of `point`.
    ///
    /// On equal distances the body earlier in configuration order wins.
    pub fn nearest(&self, point: Vec3, max_distance: f64) -> Option<ProximityHit> {
        let mut best: Option<ProximityHit> = None;
        for (i, body) in self.bodies.iter().enumerate() {
            let distance = point.distance(&body.position);
            if distance > max_distance {
                continue;
            }
            if best.map_or(true, |b| distance < b.distance) {
                best = Some(ProximityHit {
                    id: BodyId(i),
                    distance,
                });
            }
        }
        best
    }

    /// Exact, case-sensitive name match.
    pub fn lookup(&self, name: &str) -> Option<(BodyId, &Body)> {
        self.bodies
            .iter()
            .enumerate()
            .find(|(_, b)| b.name == name)
            .map(|(i, b)| (BodyId(i), b))
    }

    /// Replace a body's content payload. Returns `false` for an unknown id.
    pub fn set_content(&mut self, id: BodyId, content: ContentPayload) -> bool {
        match self.bodies.get_mut(id.0) {
            Some(body) => {
                body.content = Some(Arc::new(content));
                true
            }
            None => false,
        }
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id.0)
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::TAU;

    fn default_scene() -> SceneModel {
        SceneModel::from_config(&OrreryConfig::default())
    }

    #[test]
    fn bodies_start_on_positive_x_axis() {
        let scene = default_scene();
        for body in scene.bodies() {
            assert!((body.position.x - body.orbit_radius).abs() < 1e-9);
            assert!(body.position.z.abs() < 1e-9);
        }
    }

    #[test]
    fn advance_is_angle_additive() {
        let mut a = default_scene();
        let mut b = default_scene();
        a.advance(3.0);
        a.advance(4.5);
        b.advance(7.5);
        for (x, y) in a.bodies().iter().zip(b.bodies()) {
            let diff = (x.angle - y.angle).rem_euclid(TAU);
            assert!(diff < 1e-9 || TAU - diff < 1e-9);
            assert!(x.position.distance(&y.position) < 1e-9);
        }
    }

    #[test]
    fn advance_keeps_bodies_on_their_orbit() {
        let mut scene = default_scene();
        scene.advance(123.4);
        for body in scene.bodies() {
            assert!((body.position.length() - body.orbit_radius).abs() < 1e-9);
            assert_eq!(body.position.y, 0.0);
        }
    }

    #[test]
    fn spin_accumulates_including_retrograde() {
        let mut scene = default_scene();
        scene.advance(10.0);
        let (_, venus) = scene.lookup("Venus").unwrap();
        assert!((venus.spin - (-0.2)).abs() < 1e-12);
        assert!(scene.sun_spin > 0.0);
        assert!(scene.starfield_spin > 0.0);
    }

    #[test]
    fn zero_dt_is_a_no_op() {
        let mut scene = default_scene();
        let before: Vec<Vec3> = scene.bodies().iter().map(|b| b.position).collect();
        scene.advance(0.0);
        let after: Vec<Vec3> = scene.bodies().iter().map(|b| b.position).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn nearest_none_when_everything_out_of_range() {
        let scene = default_scene();
        assert!(scene.nearest(Vec3::ZERO, 100.0).is_none());
    }

    #[test]
    fn nearest_includes_boundary_distance() {
        let scene = default_scene();
        let hit = scene.nearest(Vec3::ZERO, 200.0).unwrap();
        assert_eq!(hit.id, BodyId(0));
        assert!((hit.distance - 200.0).abs() < 1e-9);
    }

    #[test]
    fn nearest_picks_minimum() {
        let scene = default_scene();
        // Between Venus (300) and Earth (400), closer to Earth.
        let hit = scene.nearest(Vec3::new(380.0, 0.0, 0.0), 100.0).unwrap();
        assert_eq!(scene.body(hit.id).unwrap().name, "Earth");
        assert!((hit.distance - 20.0).abs() < 1e-9);
    }

    #[test]
    fn nearest_tie_goes_to_first_body() {
        let scene = SceneModel::new(vec![
            Body::new("A", 10.0, 0.0, 0.0, 0.0),
            Body::new("B", 10.0, 0.0, 0.0, std::f64::consts::PI),
        ]);
        let hit = scene.nearest(Vec3::ZERO, 50.0).unwrap();
        assert_eq!(hit.id, BodyId(0));
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let scene = default_scene();
        assert!(scene.lookup("Mars").is_some());
        assert!(scene.lookup("mars").is_none());
        assert!(scene.lookup("Pluto").is_none());
    }
}
