use crate::{
    backend::{Backend, Tick},
    body::Body,
    buffer::KernelBuffer,
    config::Config,
    error::{Result, SimError},
    scenario::{self, Bounds},
    store::BodyStore,
};

use ultraviolet::DVec2;

/// Advances `bodies` by one fixed time step `dt` under gravitational constant
/// `g`, resolving merges. Dead bodies never appear in the result.
pub fn advance(bodies: Vec<Body>, dt: f64, g: f64) -> Vec<Body> {
    Backend::sequential().tick(&bodies, dt, g).bodies
}

/// Counters for the most recent tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub bodies: usize,
    pub merges: usize,
}

/// Owns the body store between ticks and drives it forward.
#[derive(Debug)]
pub struct Simulation {
    /// Current frame count.
    pub frame: usize,
    config: Config,
    store: BodyStore,
    backend: Backend,
    staging: Option<KernelBuffer>,
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            frame: 0,
            config: Config::default(),
            store: BodyStore::new(),
            backend: Backend::Sequential,
            staging: None,
        }
    }
}

impl Simulation {
    /// Default scenario sizes.
    pub const DEFAULT_DISK_BODIES: usize = 2000;
    pub const DEFAULT_CENTER_MASS: f64 = 1000.0;
    pub const DEFAULT_FIELD_BODIES: usize = 30;
    pub const DEFAULT_FIELD_SPEED: f64 = 0.5;

    /// Initializes an empty simulation. Fails if the configuration is invalid
    /// or the requested worker pool cannot be created.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let backend = Backend::with_workers(config.workers)?;
        let store = match config.capacity {
            Some(capacity) => BodyStore::bounded(capacity),
            None => BodyStore::new(),
        };
        Ok(Self {
            frame: 0,
            config,
            store,
            backend,
            staging: None,
        })
    }

    /// Initializes a simulation with the given bodies.
    pub fn with_bodies(bodies: Vec<Body>, config: Config) -> Result<Self> {
        let mut sim = Self::new(config)?;
        sim.store = BodyStore::from_bodies(bodies, sim.config.capacity)?;
        Ok(sim)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub fn bodies(&self) -> &[Body] {
        self.store.as_slice()
    }

    pub fn store(&self) -> &BodyStore {
        &self.store
    }

    /// Advances the simulation by one step.
    pub fn step(&mut self) -> TickReport {
        let Tick { bodies, merges } = self.backend.tick(self.store.as_slice(), self.config.dt, self.config.g);
        self.store.replace(bodies);
        self.frame += 1;
        TickReport {
            bodies: self.store.len(),
            merges: merges.len(),
        }
    }

    /// Runs `steps` ticks and returns the total number of merges.
    pub fn run(&mut self, steps: usize) -> usize {
        (0..steps).map(|_| self.step().merges).sum()
    }

    /// Appends a body with unit mass at `pos`, optionally pinned in place.
    pub fn spawn(&mut self, pos: DVec2, vel: DVec2, is_static: bool) -> Result<()> {
        let body = Body::with_mass(pos, vel, self.config.unit_mass, self.config.unit_mass, self.config.base_radius);
        self.add_body(if is_static { body.pinned() } else { body })
    }

    pub fn add_body(&mut self, body: Body) -> Result<()> {
        self.store.push(body)
    }

    pub fn clear(&mut self) {
        self.store.clear();
        self.frame = 0;
    }

    /// Replaces all bodies with an accretion disk.
    pub fn reset_accretion_disk(
        &mut self,
        count: usize,
        disk_radius: f64,
        center_mass: f64,
        bounds: Bounds,
        rng: &mut fastrand::Rng,
    ) -> Result<()> {
        let bodies = scenario::accretion_disk(count, disk_radius, center_mass, bounds, &self.config, rng);
        self.store = BodyStore::from_bodies(bodies, self.config.capacity)?;
        self.frame = 0;
        log::info!("accretion disk: {} bodies around mass {center_mass}", count);
        Ok(())
    }

    /// Adds a random field of bodies to the current ones.
    pub fn add_random_field(
        &mut self,
        count: usize,
        speed: f64,
        radius: f64,
        bounds: Bounds,
        rng: &mut fastrand::Rng,
    ) -> Result<()> {
        let bodies = scenario::random_field(count, speed, radius, bounds, &self.config, rng);
        let requested = self.store.len() + bodies.len();
        if let Some(capacity) = self.config.capacity {
            if requested > capacity {
                return Err(SimError::CapacityExceeded { capacity, requested });
            }
        }
        for body in bodies {
            self.store.push(body)?;
        }
        log::info!("random field: {count} bodies added, {} total", self.store.len());
        Ok(())
    }

    /// Uploads the current bodies into the fixed-layout kernel buffer.
    ///
    /// The buffer is sized to the configured capacity, or to the current body
    /// count when the store is unbounded.
    pub fn kernel_buffer(&mut self) -> Result<&mut KernelBuffer> {
        let capacity = self.config.capacity.unwrap_or(self.store.len());
        let staging = match self.staging.take() {
            Some(buffer) if buffer.capacity() >= capacity => buffer,
            _ => KernelBuffer::with_capacity(capacity),
        };
        let staging = self.staging.insert(staging);
        staging.upload(self.store.as_slice())?;
        Ok(staging)
    }

    /// Staging buffers of the last upload, if any.
    pub fn staging_mut(&mut self) -> Option<&mut KernelBuffer> {
        self.staging.as_mut()
    }

    /// Replaces the bodies with what an externally executed kernel wrote
    /// into the staging output buffer. Dead records are dropped.
    pub fn commit_kernel_output(&mut self) -> Result<()> {
        let bodies = self
            .staging
            .as_mut()
            .and_then(KernelBuffer::download)
            .ok_or(SimError::KernelNotUploaded)?;
        self.store = BodyStore::from_bodies(bodies, self.config.capacity)?;
        self.frame += 1;
        Ok(())
    }

    pub fn total_mass(&self) -> f64 {
        self.store.iter().map(|body| body.mass).sum()
    }

    pub fn total_momentum(&self) -> DVec2 {
        self.store
            .iter()
            .fold(DVec2::zero(), |acc, body| acc + body.momentum())
    }
}
