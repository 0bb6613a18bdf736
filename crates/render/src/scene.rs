use glam::Vec3;

/// Ordered collection of drawable objects lit by one point light.
///
/// No validation or deduplication: the same object may appear twice and
/// overlapping objects are fine. Iteration order is insertion order.
#[derive(Debug, Clone)]
pub struct Scene<O> {
    objects: Vec<O>,
    /// World-space point light, typically animated by the driving loop.
    pub light_position: Vec3,
}

impl<O> Default for Scene<O> {
    fn default() -> Self {
        Self {
            objects: Vec::new(),
            light_position: Scene::<O>::DEFAULT_LIGHT_POSITION,
        }
    }
}

impl<O> Scene<O> {
    pub const DEFAULT_LIGHT_POSITION: Vec3 = Vec3::new(0.0, 2.0, 2.0);

    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, object: O) {
        self.objects.push(object);
    }

    pub fn objects(&self) -> &[O] {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> &mut [O] {
        &mut self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
