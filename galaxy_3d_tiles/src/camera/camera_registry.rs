/// CameraRegistry - cameras registered explicitly by the host, by id.

use std::collections::BTreeMap;
use super::camera::Camera;
use super::camera_collector::{CameraCollectionContext, CameraProvider, CameraSource};

#[derive(Debug, Default)]
pub struct CameraRegistry {
    cameras: BTreeMap<i32, Camera>,
    next_id: i32,
}

impl CameraRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a camera. Returns its id.
    pub fn add_camera(&mut self, camera: Camera) -> i32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        self.cameras.insert(id, camera);
        id
    }

    /// Returns false if `id` is unknown
    pub fn remove_camera(&mut self, id: i32) -> bool {
        self.cameras.remove(&id).is_some()
    }

    /// Returns false if `id` is unknown
    pub fn update_camera(&mut self, id: i32, camera: Camera) -> bool {
        match self.cameras.get_mut(&id) {
            Some(slot) => {
                *slot = camera;
                true
            }
            None => false,
        }
    }

    pub fn camera(&self, id: i32) -> Option<&Camera> {
        self.cameras.get(&id)
    }

    pub fn len(&self) -> usize {
        self.cameras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }
}

impl CameraProvider for CameraRegistry {
    fn source(&self) -> CameraSource {
        CameraSource::Registered
    }

    fn collect_cameras(&self, _context: &CameraCollectionContext, cameras: &mut Vec<Camera>) {
        cameras.extend(self.cameras.values().copied());
    }
}
