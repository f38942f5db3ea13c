use ultraviolet::DVec2;

/// Represents a spherical body in the simulation.
///
/// Field order matches the flat record layout used by persistence and by
/// native kernels: x, y, vel_x, vel_y, radius, mass, is_static, is_dead.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    /// Position vector.
    pub pos: DVec2,
    /// Velocity vector.
    pub vel: DVec2,
    /// Radius of the body. Tracks mass as an equal-density sphere.
    pub radius: f64,
    /// Mass of the body.
    pub mass: f64,
    /// Pinned bodies never move but still attract and absorb others.
    pub is_static: bool,
    /// Tombstone set when the body is absorbed during a tick.
    pub is_dead: bool,
}

impl Default for Body {
    fn default() -> Self {
        Self::new(DVec2::zero(), DVec2::zero(), 1.0, 1.0)
    }
}

impl Body {
    /// Creates a new dynamic Body with the given properties.
    pub fn new(pos: DVec2, vel: DVec2, mass: f64, radius: f64) -> Self {
        Self {
            pos,
            vel,
            radius,
            mass,
            is_static: false,
            is_dead: false,
        }
    }

    /// Creates a body whose radius is derived from its mass:
    /// `base_radius * cbrt(mass / unit_mass)`.
    pub fn with_mass(pos: DVec2, vel: DVec2, mass: f64, unit_mass: f64, base_radius: f64) -> Self {
        Self::new(pos, vel, mass, radius_for(mass, unit_mass, base_radius))
    }

    /// Marks the body as static. Its velocity is zeroed immediately.
    pub fn pinned(mut self) -> Self {
        self.is_static = true;
        self.vel = DVec2::zero();
        self
    }

    /// Linear momentum, `mass * vel`.
    pub fn momentum(&self) -> DVec2 {
        self.vel * self.mass
    }

    /// Whether `self` may absorb `other` at distance `dist`.
    ///
    /// A zero distance always satisfies the overlap test.
    #[inline(always)]
    pub fn can_absorb(&self, other: &Body, dist: f64) -> bool {
        let overlapping = dist < other.radius || dist < self.radius;
        overlapping && (self.mass >= other.mass || self.is_static) && !other.is_static
    }

    /// Perfectly inelastic merge of `other` into `self`.
    /// Conserves mass and momentum; volumes add.
    pub fn absorb(&mut self, other: &Body) {
        let total = self.mass + other.mass;
        self.vel = (self.vel * self.mass + other.vel * other.mass) / total;
        self.mass = total;
        self.radius = (other.radius.powi(3) + self.radius.powi(3)).cbrt();
    }

    /// Updates the body's position and velocity from the accumulated
    /// velocity change `dv` and time step `dt`.
    /// Uses semi-implicit Euler integration (velocity update first, then position).
    pub fn update(&mut self, dv: DVec2, dt: f64) {
        self.vel += dv;
        if self.is_static {
            self.vel = DVec2::zero();
        }
        self.pos += self.vel * dt;
    }

    /// Live bodies must carry a positive mass and radius and finite state.
    pub fn is_valid(&self) -> bool {
        self.mass > 0.0
            && self.radius > 0.0
            && self.mass.is_finite()
            && self.radius.is_finite()
            && self.pos.x.is_finite()
            && self.pos.y.is_finite()
            && self.vel.x.is_finite()
            && self.vel.y.is_finite()
    }
}

/// Equal-density sphere radius for `mass`.
pub fn radius_for(mass: f64, unit_mass: f64, base_radius: f64) -> f64 {
    base_radius * (mass / unit_mass).cbrt()
}
