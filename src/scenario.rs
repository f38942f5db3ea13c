use crate::body::Body;
use crate::config::Config;
use ultraviolet::DVec2;

/// Distance kept between the accretion disk's center and its innermost satellite.
pub const DISK_INNER_GAP: f64 = 50.0;

/// Axis-aligned region the scenarios are laid out in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: DVec2,
    pub max: DVec2,
}

impl Bounds {
    pub fn new(min: DVec2, max: DVec2) -> Self {
        Self { min, max }
    }

    /// Bounds of a `width` x `height` viewport anchored at the origin.
    pub fn from_size(width: f64, height: f64) -> Self {
        Self::new(DVec2::zero(), DVec2::new(width, height))
    }

    pub fn center(&self) -> DVec2 {
        (self.min + self.max) * 0.5
    }
}

/// Generates `count` unit-mass bodies spread uniformly over a disc of `radius`
/// around the center of `bounds`, each moving at `speed` in a random direction.
pub fn random_field(
    count: usize,
    speed: f64,
    radius: f64,
    bounds: Bounds,
    config: &Config,
    rng: &mut fastrand::Rng,
) -> Vec<Body> {
    let center = bounds.center();

    (0..count)
        .map(|_| {
            // Uniform over the disc area
            let r = radius * rng.f64().sqrt();
            let a = rng.f64() * std::f64::consts::TAU;
            let pos = center + polar(a) * r;

            let heading = rng.f64() * std::f64::consts::TAU;
            let vel = polar(heading) * speed;

            Body::with_mass(pos, vel, config.unit_mass, config.unit_mass, config.base_radius)
        })
        .collect()
}

/// Generates a static central mass surrounded by `count` unit-mass satellites
/// on approximately circular, counter-clockwise orbits.
///
/// Satellites sit at a random distance in `[50, disk_radius + 50)` from the
/// center, moving tangentially at `sqrt(center_mass * G / distance)`.
pub fn accretion_disk(
    count: usize,
    disk_radius: f64,
    center_mass: f64,
    bounds: Bounds,
    config: &Config,
    rng: &mut fastrand::Rng,
) -> Vec<Body> {
    let center = bounds.center();
    let mut bodies: Vec<Body> = Vec::with_capacity(count + 1);

    let core = Body::with_mass(center, DVec2::zero(), center_mass, config.unit_mass, config.base_radius);
    bodies.push(core.pinned());

    for _ in 0..count {
        let dist = rng.f64() * disk_radius + DISK_INNER_GAP;
        let a = rng.f64() * std::f64::consts::TAU;
        let (sin, cos) = a.sin_cos();

        let pos = center + DVec2::new(cos, sin) * dist;

        // Circular orbit: v = sqrt(GM / r), perpendicular to the radius
        let v = (center_mass * config.g / dist).sqrt();
        let vel = DVec2::new(-sin, cos) * v;

        bodies.push(Body::with_mass(pos, vel, config.unit_mass, config.unit_mass, config.base_radius));
    }

    bodies
}

fn polar(angle: f64) -> DVec2 {
    let (sin, cos) = angle.sin_cos();
    DVec2::new(cos, sin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn random_field_stays_inside_disc() {
        let config = Config::default();
        let bounds = Bounds::from_size(1000.0, 720.0);
        let mut rng = fastrand::Rng::with_seed(7);

        let bodies = random_field(200, 0.5, 300.0, bounds, &config, &mut rng);

        assert_eq!(bodies.len(), 200);
        for body in &bodies {
            assert!((body.pos - bounds.center()).mag() <= 300.0);
            assert_relative_eq!(body.vel.mag(), 0.5, epsilon = 1e-12);
            assert!(!body.is_static);
            assert_relative_eq!(body.radius, config.base_radius, epsilon = 1e-12);
        }
    }

    #[test]
    fn accretion_disk_orbits_are_tangential() {
        let config = Config::default();
        let bounds = Bounds::from_size(1000.0, 720.0);
        let mut rng = fastrand::Rng::with_seed(11);

        let bodies = accretion_disk(100, 720.0, 1000.0, bounds, &config, &mut rng);

        assert_eq!(bodies.len(), 101);
        let core = bodies[0];
        assert!(core.is_static);
        assert_eq!(core.pos, bounds.center());
        assert_relative_eq!(core.radius, 1.5 * 10.0, epsilon = 1e-9);

        for body in &bodies[1..] {
            let r = body.pos - core.pos;
            let dist = r.mag();
            assert!((DISK_INNER_GAP..720.0 + DISK_INNER_GAP).contains(&dist));
            assert_relative_eq!(body.vel.mag(), (1000.0 / dist).sqrt(), epsilon = 1e-9);
            assert_relative_eq!(r.dot(body.vel), 0.0, epsilon = 1e-6);
            // Counter-clockwise
            assert!(r.x * body.vel.y - r.y * body.vel.x > 0.0);
        }
    }

    #[test]
    fn same_seed_same_scenario() {
        let config = Config::default();
        let bounds = Bounds::from_size(100.0, 100.0);
        let a = random_field(10, 1.0, 40.0, bounds, &config, &mut fastrand::Rng::with_seed(3));
        let b = random_field(10, 1.0, 40.0, bounds, &config, &mut fastrand::Rng::with_seed(3));
        assert_eq!(a, b);
    }
}
