//! Explicit camera-to-scheduler registry.
//!
//! The host keys cameras by an opaque u64 identifier; schedulers are created
//! lazily the first frame a camera is observed and dropped when the host
//! removes the camera. The registry is passed explicitly to the integration
//! layer; there is no global instance.

use std::collections::HashMap;

use crate::scheduler::CameraFrameScheduler;

pub type CameraId = u64;

#[derive(Debug, Default)]
pub struct CameraRegistry {
    cameras: HashMap<CameraId, CameraFrameScheduler>,
}

impl CameraRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scheduler for `id`, creating one on first observation.
    pub fn scheduler(&mut self, id: CameraId) -> &mut CameraFrameScheduler {
        self.cameras.entry(id).or_insert_with(|| {
            log::debug!("registering camera {id}");
            CameraFrameScheduler::new()
        })
    }

    pub fn get_mut(&mut self, id: CameraId) -> Option<&mut CameraFrameScheduler> {
        self.cameras.get_mut(&id)
    }

    /// Drop the scheduler for a disabled or destroyed camera. The caller is
    /// responsible for disposing the camera's pipeline resources.
    pub fn remove(&mut self, id: CameraId) -> Option<CameraFrameScheduler> {
        let removed = self.cameras.remove(&id);
        if removed.is_some() {
            log::debug!("removing camera {id}");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.cameras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lazy_creation_and_removal() {
        let mut registry = CameraRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get_mut(7).is_none());

        registry.scheduler(7).attach();
        assert_eq!(registry.len(), 1);
        assert!(registry.get_mut(7).unwrap().is_attached());

        // Same id returns the same scheduler, not a fresh one.
        assert!(registry.scheduler(7).is_attached());
        assert_eq!(registry.len(), 1);

        assert!(registry.remove(7).is_some());
        assert!(registry.remove(7).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_cameras_are_independent() {
        let mut registry = CameraRegistry::new();
        registry.scheduler(1).attach();
        registry.scheduler(2);
        assert!(registry.get_mut(1).unwrap().is_attached());
        assert!(!registry.get_mut(2).unwrap().is_attached());
    }
}
