//! Collaborator contracts for streamed assets
//!
//! Geometry and animation frames arrive asynchronously from an asset
//! streamer outside this crate. Composition only asks whether something is
//! loaded and, if so, borrows it; a miss is reported upward as "not ready"
//! and never waited on.

use std::collections::{HashMap, HashSet};

use crate::mesh::{Frame, Mesh};

/// Source of imported base geometry, keyed by geometry id.
pub trait GeometryProvider {
    /// Whether geometry `id` has arrived.
    fn is_loaded(&self, id: u32) -> bool;

    /// The geometry, if it has arrived.
    fn geometry(&self, id: u32) -> Option<&Mesh>;

    /// Ask the streamer to fetch `id`. Must not block.
    fn request(&self, id: u32);
}

/// Source of skeletal animation frames, keyed by packed frame id.
pub trait FrameSource {
    fn frame(&self, id: u32) -> Option<&Frame>;
}

/// [`GeometryProvider`] backed by a map, recording every request.
#[derive(Debug, Default)]
pub struct MemoryGeometry {
    meshes: HashMap<u32, Mesh>,
    requested: parking_lot::Mutex<HashSet<u32>>,
}

impl MemoryGeometry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: u32, mesh: Mesh) {
        self.meshes.insert(id, mesh);
    }

    #[must_use]
    pub fn with_mesh(mut self, id: u32, mesh: Mesh) -> Self {
        self.insert(id, mesh);
        self
    }

    pub fn remove(&mut self, id: u32) -> Option<Mesh> {
        self.meshes.remove(&id)
    }

    /// Ids requested so far, sorted.
    #[must_use]
    pub fn requested(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.requested.lock().iter().copied().collect();
        ids.sort_unstable();
        ids
    }
}

impl GeometryProvider for MemoryGeometry {
    fn is_loaded(&self, id: u32) -> bool {
        self.meshes.contains_key(&id)
    }

    fn geometry(&self, id: u32) -> Option<&Mesh> {
        self.meshes.get(&id)
    }

    fn request(&self, id: u32) {
        self.requested.lock().insert(id);
    }
}

/// [`FrameSource`] backed by a map.
#[derive(Debug, Default, Clone)]
pub struct MemoryFrames {
    frames: HashMap<u32, Frame>,
}

impl MemoryFrames {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: u32, frame: Frame) {
        self.frames.insert(id, frame);
    }

    #[must_use]
    pub fn with_frame(mut self, id: u32, frame: Frame) -> Self {
        self.insert(id, frame);
        self
    }
}

impl FrameSource for MemoryFrames {
    fn frame(&self, id: u32) -> Option<&Frame> {
        self.frames.get(&id)
    }
}
