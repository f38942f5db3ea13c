use bytemuck::{Pod, Zeroable};
use ultraviolet::DVec2;

use crate::body::Body;
use crate::error::{Result, SimError};

/// Fixed-layout body record shared with native kernels.
///
/// Fields are laid out in the order x, y, vel_x, vel_y, radius, mass,
/// is_static, is_dead. Flags are stored as 0/1 words so the struct has no
/// padding and can be copied to a device as raw bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct KernelBody {
    pub x: f64,
    pub y: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    pub radius: f64,
    pub mass: f64,
    pub is_static: u32,
    pub is_dead: u32,
}

impl From<&Body> for KernelBody {
    fn from(body: &Body) -> Self {
        Self {
            x: body.pos.x,
            y: body.pos.y,
            vel_x: body.vel.x,
            vel_y: body.vel.y,
            radius: body.radius,
            mass: body.mass,
            is_static: body.is_static as u32,
            is_dead: body.is_dead as u32,
        }
    }
}

impl From<&KernelBody> for Body {
    fn from(record: &KernelBody) -> Self {
        Self {
            pos: DVec2::new(record.x, record.y),
            vel: DVec2::new(record.vel_x, record.vel_y),
            radius: record.radius,
            mass: record.mass,
            is_static: record.is_static != 0,
            is_dead: record.is_dead != 0,
        }
    }
}

/// Input/output record buffers of identical layout and capacity.
///
/// The capacity is fixed at construction; uploading more bodies than it holds
/// fails instead of truncating. Each upload can be downloaded once.
#[derive(Clone, Debug)]
pub struct KernelBuffer {
    input: Vec<KernelBody>,
    output: Vec<KernelBody>,
    capacity: usize,
    pending: bool,
}

impl KernelBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            input: Vec::with_capacity(capacity),
            output: Vec::with_capacity(capacity),
            capacity,
            pending: false,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Body count scalar handed to the kernel alongside the buffers.
    pub fn count(&self) -> u32 {
        self.input.len() as u32
    }

    /// Copies `bodies` into the input buffer and sizes the output to match.
    pub fn upload(&mut self, bodies: &[Body]) -> Result<()> {
        if bodies.len() > self.capacity {
            return Err(SimError::CapacityExceeded {
                capacity: self.capacity,
                requested: bodies.len(),
            });
        }
        self.input.clear();
        self.input.extend(bodies.iter().map(KernelBody::from));
        self.output.clear();
        self.output.resize(bodies.len(), KernelBody::zeroed());
        self.pending = true;
        Ok(())
    }

    pub fn input(&self) -> &[KernelBody] {
        &self.input
    }

    pub fn output_mut(&mut self) -> &mut [KernelBody] {
        &mut self.output
    }

    /// Live bodies from the output buffer, in order, or `None` if nothing
    /// was uploaded since the last download.
    pub fn download(&mut self) -> Option<Vec<Body>> {
        if !std::mem::take(&mut self.pending) {
            return None;
        }
        let live = self
            .output
            .iter()
            .filter(|record| record.is_dead == 0)
            .map(Body::from)
            .collect();
        Some(live)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_layout_is_packed() {
        assert_eq!(std::mem::size_of::<KernelBody>(), 6 * 8 + 2 * 4);
        assert_eq!(std::mem::offset_of!(KernelBody, mass), 5 * 8);
        assert_eq!(std::mem::offset_of!(KernelBody, is_dead), 6 * 8 + 4);
    }

    #[test]
    fn upload_past_capacity_fails() {
        let mut buffer = KernelBuffer::with_capacity(1);
        let bodies = [Body::default(), Body::default()];
        let err = buffer.upload(&bodies).unwrap_err();
        assert!(matches!(
            err,
            SimError::CapacityExceeded { capacity: 1, requested: 2 }
        ));
        assert_eq!(buffer.count(), 0);
    }

    #[test]
    fn download_skips_dead_records() {
        let mut buffer = KernelBuffer::with_capacity(4);
        let bodies = [Body::default().pinned(), Body::default()];
        buffer.upload(&bodies).unwrap();
        buffer.output_mut().copy_from_slice(&[KernelBody::from(&bodies[0]), KernelBody {
            is_dead: 1,
            ..KernelBody::from(&bodies[1])
        }]);

        assert_eq!(buffer.download(), Some(vec![bodies[0]]));
        assert_eq!(buffer.download(), None);
    }
}
