//! Identifiers and a simple allocator for host-side objects.

use serde::{Deserialize, Serialize};

/// Handle to a camera object owned by an [`AnimationHost`](crate::host::AnimationHost).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct CameraId(pub u32);

impl std::fmt::Display for CameraId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "camera#{}", self.0)
    }
}

/// Monotonic allocator for CameraId.
/// Dense indices double as positions in a host's camera table.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_camera: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_camera(&mut self) -> CameraId {
        let id = CameraId(self.next_camera);
        self.next_camera = self.next_camera.wrapping_add(1);
        id
    }
}
