/// RenderResource trait and destruction lifecycle flags.
///
/// Every device object handed out by a GraphicsDevice carries a
/// ResourceLifecycle. The AmortizedDestructor drives it through
/// GARBAGE -> BEGIN_DESTROYED -> FINISH_DESTROYED; each transition
/// happens at most once, whatever the number of threads or ticks.

use std::sync::atomic::{AtomicU8, Ordering};
use bitflags::bitflags;

bitflags! {
    /// Destruction stages reached by a device resource
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LifecycleFlags: u8 {
        /// Marked for destruction, no longer referenced by the scene
        const GARBAGE          = 1 << 0;
        /// `begin_destroy()` has been issued
        const BEGIN_DESTROYED  = 1 << 1;
        /// Render data released, the object is dead
        const FINISH_DESTROYED = 1 << 2;
    }
}

/// Atomic holder for LifecycleFlags
#[derive(Debug, Default)]
pub struct ResourceLifecycle {
    flags: AtomicU8,
}

impl ResourceLifecycle {
    pub fn new() -> Self {
        Self { flags: AtomicU8::new(0) }
    }

    /// Current flags
    pub fn flags(&self) -> LifecycleFlags {
        LifecycleFlags::from_bits_truncate(self.flags.load(Ordering::Acquire))
    }

    pub fn is_garbage(&self) -> bool {
        self.flags().contains(LifecycleFlags::GARBAGE)
    }

    pub fn has_begun_destroy(&self) -> bool {
        self.flags().contains(LifecycleFlags::BEGIN_DESTROYED)
    }

    pub fn is_destroyed(&self) -> bool {
        self.flags().contains(LifecycleFlags::FINISH_DESTROYED)
    }

    pub fn mark_garbage(&self) {
        self.flags.fetch_or(LifecycleFlags::GARBAGE.bits(), Ordering::AcqRel);
    }

    /// Set BEGIN_DESTROYED. Returns true only for the caller that set it.
    pub fn try_begin_destroy(&self) -> bool {
        self.set_once(LifecycleFlags::BEGIN_DESTROYED)
    }

    /// Set FINISH_DESTROYED. Returns true only for the caller that set it.
    pub fn try_finish_destroy(&self) -> bool {
        self.set_once(LifecycleFlags::FINISH_DESTROYED)
    }

    fn set_once(&self, flag: LifecycleFlags) -> bool {
        let previous = self.flags.fetch_or(flag.bits(), Ordering::AcqRel);
        previous & flag.bits() == 0
    }
}

/// Base trait of every device-side object created for a tile
///
/// Backends override `begin_destroy` / `is_ready_for_finish_destroy` when
/// teardown must wait on the GPU (in-flight command buffers, pending
/// streaming requests). The defaults describe an object that can be
/// finalized immediately.
pub trait RenderResource: Send + Sync {
    /// Debug name
    fn name(&self) -> &str;

    /// Destruction state shared with the AmortizedDestructor
    fn lifecycle(&self) -> &ResourceLifecycle;

    /// Start asynchronous teardown (fence, deferred upload cancel, ...)
    fn begin_destroy(&self) {}

    /// Whether the final release can run now
    fn is_ready_for_finish_destroy(&self) -> bool {
        true
    }
}

#[cfg(test)]
#[path = "render_resource_tests.rs"]
mod tests;
