use crate::body::Body;
use crate::error::{Result, SimError};

/// Ordered, indexable collection of bodies owned by a single writer.
///
/// Index stability only holds within a tick; compaction shifts later bodies
/// down while keeping their relative order.
#[derive(Clone, Debug, Default)]
pub struct BodyStore {
    bodies: Vec<Body>,
    capacity: Option<usize>,
}

impl BodyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that refuses to hold more than `capacity` bodies.
    pub fn bounded(capacity: usize) -> Self {
        Self {
            bodies: Vec::with_capacity(capacity),
            capacity: Some(capacity),
        }
    }

    /// Builds a store from existing bodies, validating each one.
    pub fn from_bodies(bodies: Vec<Body>, capacity: Option<usize>) -> Result<Self> {
        if let Some(capacity) = capacity {
            if bodies.len() > capacity {
                return Err(SimError::CapacityExceeded {
                    capacity,
                    requested: bodies.len(),
                });
            }
        }
        for (i, body) in bodies.iter().enumerate() {
            check(body).map_err(|e| SimError::InvalidBody(format!("body {i}: {e}")))?;
        }
        Ok(Self { bodies, capacity })
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Number of bodies held, dead ones included until compaction.
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Appends a validated body, failing at capacity.
    pub fn push(&mut self, body: Body) -> Result<()> {
        if let Some(capacity) = self.capacity {
            if self.bodies.len() >= capacity {
                return Err(SimError::CapacityExceeded {
                    capacity,
                    requested: self.bodies.len() + 1,
                });
            }
        }
        check(&body).map_err(SimError::InvalidBody)?;
        self.bodies.push(body);
        Ok(())
    }

    /// Body at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<&Body> {
        self.bodies.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Body> {
        self.bodies.get_mut(index)
    }

    /// Removes the body at `index`, shifting later bodies down.
    pub fn remove(&mut self, index: usize) -> Option<Body> {
        (index < self.bodies.len()).then(|| self.bodies.remove(index))
    }

    pub fn clear(&mut self) {
        self.bodies.clear();
    }

    /// Drops every tombstoned body. Returns how many were removed.
    pub fn compact(&mut self) -> usize {
        let before = self.bodies.len();
        self.bodies.retain(|body| !body.is_dead);
        before - self.bodies.len()
    }

    pub fn as_slice(&self) -> &[Body] {
        &self.bodies
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Body> {
        self.bodies.iter()
    }

    /// Swaps in the result of a tick. The replacement must fit the capacity.
    pub(crate) fn replace(&mut self, bodies: Vec<Body>) {
        debug_assert!(self.capacity.is_none_or(|c| bodies.len() <= c));
        self.bodies = bodies;
    }

    pub fn into_vec(self) -> Vec<Body> {
        self.bodies
    }
}

fn check(body: &Body) -> std::result::Result<(), String> {
    if body.is_dead {
        return Err("body is already tombstoned".into());
    }
    if !body.is_valid() {
        return Err(format!(
            "mass {} and radius {} must be positive and state finite",
            body.mass, body.radius
        ));
    }
    Ok(())
}

impl std::ops::Index<usize> for BodyStore {
    type Output = Body;

    fn index(&self, index: usize) -> &Body {
        &self.bodies[index]
    }
}

impl std::ops::IndexMut<usize> for BodyStore {
    fn index_mut(&mut self, index: usize) -> &mut Body {
        &mut self.bodies[index]
    }
}

impl<'a> IntoIterator for &'a BodyStore {
    type Item = &'a Body;
    type IntoIter = std::slice::Iter<'a, Body>;

    fn into_iter(self) -> Self::IntoIter {
        self.bodies.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ultraviolet::DVec2;

    fn body_at(x: f64) -> Body {
        Body::new(DVec2::new(x, 0.0), DVec2::zero(), 1.0, 1.0)
    }

    #[test]
    fn compact_preserves_relative_order() {
        let mut store = BodyStore::new();
        for x in 0..5 {
            store.push(body_at(x as f64)).unwrap();
        }
        store[1].is_dead = true;
        store[3].is_dead = true;

        assert_eq!(store.compact(), 2);
        let xs: Vec<f64> = store.iter().map(|b| b.pos.x).collect();
        assert_eq!(xs, vec![0.0, 2.0, 4.0]);
    }

    #[test]
    fn bounded_store_rejects_overflow() {
        let mut store = BodyStore::bounded(2);
        store.push(body_at(0.0)).unwrap();
        store.push(body_at(1.0)).unwrap();
        let err = store.push(body_at(2.0)).unwrap_err();
        assert!(matches!(
            err,
            SimError::CapacityExceeded { capacity: 2, requested: 3 }
        ));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn rejects_massless_bodies() {
        let mut store = BodyStore::new();
        let err = store.push(Body::new(DVec2::zero(), DVec2::zero(), 0.0, 1.0)).unwrap_err();
        assert!(matches!(err, SimError::InvalidBody(_)));
    }

    #[test]
    fn remove_out_of_range_is_none() {
        let mut store = BodyStore::new();
        store.push(body_at(0.0)).unwrap();
        assert!(store.remove(3).is_none());
        assert_eq!(store.remove(0).map(|b| b.pos.x), Some(0.0));
        assert!(store.is_empty());
    }
}
