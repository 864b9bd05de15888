/// AmortizedDestructor - deferred, retried destruction of device resources.
///
/// `destroy()` tries to tear a resource down immediately. Resources that
/// are not ready (GPU still using them, upload in flight) move into an
/// owning arena and are retried once per `tick()`. Retry keys cycle
/// between two queues: the one being drained this tick and the one
/// collecting keys for the next tick, so a resource re-queued during a
/// tick is not retried again before the next one.

use std::sync::Arc;
use slotmap::{new_key_type, SlotMap};
use crate::graphics_device::{
    RenderResource, ResourceLifecycle, Texture, Mesh, CollisionMesh,
};
use crate::scene::TileNode;

new_key_type! {
    /// Non-owning handle into the destructor's resource arena
    pub struct PendingKey;
}

/// A device resource handed over for destruction
#[derive(Clone)]
pub enum DestroyableResource {
    Texture(Arc<dyn Texture>),
    Mesh(Arc<dyn Mesh>),
    CollisionMesh(Arc<dyn CollisionMesh>),
    /// Any other resource; finalization only flips its lifecycle
    Other(Arc<dyn RenderResource>),
}

impl DestroyableResource {
    pub fn name(&self) -> &str {
        match self {
            DestroyableResource::Texture(r) => r.name(),
            DestroyableResource::Mesh(r) => r.name(),
            DestroyableResource::CollisionMesh(r) => r.name(),
            DestroyableResource::Other(r) => r.name(),
        }
    }

    pub fn lifecycle(&self) -> &ResourceLifecycle {
        match self {
            DestroyableResource::Texture(r) => r.lifecycle(),
            DestroyableResource::Mesh(r) => r.lifecycle(),
            DestroyableResource::CollisionMesh(r) => r.lifecycle(),
            DestroyableResource::Other(r) => r.lifecycle(),
        }
    }

    fn begin_destroy(&self) {
        match self {
            DestroyableResource::Texture(r) => r.begin_destroy(),
            DestroyableResource::Mesh(r) => r.begin_destroy(),
            DestroyableResource::CollisionMesh(r) => r.begin_destroy(),
            DestroyableResource::Other(r) => r.begin_destroy(),
        }
    }

    fn is_ready_for_finish_destroy(&self) -> bool {
        match self {
            DestroyableResource::Texture(r) => r.is_ready_for_finish_destroy(),
            DestroyableResource::Mesh(r) => r.is_ready_for_finish_destroy(),
            DestroyableResource::CollisionMesh(r) => r.is_ready_for_finish_destroy(),
            DestroyableResource::Other(r) => r.is_ready_for_finish_destroy(),
        }
    }

    /// Kind-specific release of the heavy data
    fn finalize(&self) {
        match self {
            DestroyableResource::Texture(r) => r.release_platform_data(),
            DestroyableResource::Mesh(r) => r.release_render_data(),
            DestroyableResource::CollisionMesh(r) => r.clear_cooked_data(),
            DestroyableResource::Other(_) => {}
        }
    }
}

/// Destruction queue ticked once per frame
pub struct AmortizedDestructor {
    /// Owning storage for resources awaiting destruction
    resources: SlotMap<PendingKey, DestroyableResource>,
    /// Keys to retry on the next tick
    pending: Vec<PendingKey>,
    /// Keys being retried during the current tick
    next_pending: Vec<PendingKey>,
}

impl AmortizedDestructor {
    pub fn new() -> Self {
        Self {
            resources: SlotMap::with_key(),
            pending: Vec::new(),
            next_pending: Vec::new(),
        }
    }

    /// Destroy a resource now, or queue it for retry.
    ///
    /// Returns true if the resource is fully destroyed on return.
    pub fn destroy(&mut self, resource: DestroyableResource) -> bool {
        if Self::run_destruction(&resource) {
            return true;
        }
        crate::engine_trace!(
            "galaxy3d::tiles::AmortizedDestructor",
            "'{}' not ready for final destruction, deferring", resource.name()
        );
        let key = self.resources.insert(resource);
        self.pending.push(key);
        false
    }

    /// Hand every device resource of a removed tile node to the destructor
    pub fn destroy_tile_node(&mut self, node: TileNode) {
        for texture in node.textures() {
            self.destroy(DestroyableResource::Texture(texture));
        }
        for tile_mesh in node.meshes {
            if let Some(collision) = tile_mesh.collision {
                self.destroy(DestroyableResource::CollisionMesh(collision));
            }
            self.destroy(DestroyableResource::Mesh(tile_mesh.mesh));
        }
    }

    /// Retry every resource queued before this call, once
    pub fn tick(&mut self) {
        std::mem::swap(&mut self.next_pending, &mut self.pending);
        self.pending.clear();

        let keys = std::mem::take(&mut self.next_pending);
        for &key in &keys {
            // A key without a resource was released elsewhere
            let Some(resource) = self.resources.get(key) else {
                continue;
            };
            if Self::run_destruction(resource) {
                self.resources.remove(key);
            } else {
                self.pending.push(key);
            }
        }
        // Keep the allocation for the next swap
        self.next_pending = keys;
        self.next_pending.clear();
    }

    /// Number of resources still waiting for final destruction
    pub fn pending_count(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Drop every queued resource without finalizing it
    pub fn clear(&mut self) {
        self.resources.clear();
        self.pending.clear();
        self.next_pending.clear();
    }

    /// One destruction attempt. Returns true once the resource is finished.
    fn run_destruction(resource: &DestroyableResource) -> bool {
        let lifecycle = resource.lifecycle();
        lifecycle.mark_garbage();

        if lifecycle.is_destroyed() {
            return true;
        }

        if lifecycle.try_begin_destroy() {
            resource.begin_destroy();
        }

        if resource.is_ready_for_finish_destroy() {
            if lifecycle.try_finish_destroy() {
                resource.finalize();
            }
            return true;
        }

        false
    }
}

impl Default for AmortizedDestructor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "amortized_destructor_tests.rs"]
mod tests;
