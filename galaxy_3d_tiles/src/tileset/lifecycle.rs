/// TilesetLifecycle - ownership of the selection engine handle.
///
/// Creates the engine through the host factory, keeps attachments
/// registered across reloads, and tears the engine down asynchronously.
/// The owner may only be finally destroyed once every asynchronous
/// destruction it started has completed.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use crate::error::Result;
use crate::selection::{
    AssetAccessor, LoadError, LoadErrorCallback, MainThreadQueue, SelectionEngine,
    SelectionEngineFactory, SelectionOptions, TilesetAttachment, TilesetExternals, TilesetSource,
};
use super::load_failure::LoadFailureNotifier;

const SOURCE: &str = "galaxy3d::tiles::TilesetLifecycle";

pub struct TilesetLifecycle {
    engine: Option<Box<dyn SelectionEngine>>,
    /// Overlays and excluders, re-added to every new engine
    attachments: Vec<Arc<dyn TilesetAttachment>>,
    /// Asynchronous destructions started but not yet completed
    pending_destructions: Arc<AtomicUsize>,
    asset_accessor: Arc<dyn AssetAccessor>,
    main_thread_queue: Arc<MainThreadQueue>,
    load_failures: Arc<LoadFailureNotifier>,
}

impl TilesetLifecycle {
    pub fn new(asset_accessor: Arc<dyn AssetAccessor>, main_thread_queue: Arc<MainThreadQueue>) -> Self {
        Self {
            engine: None,
            attachments: Vec::new(),
            pending_destructions: Arc::new(AtomicUsize::new(0)),
            asset_accessor,
            main_thread_queue,
            load_failures: Arc::new(LoadFailureNotifier::new()),
        }
    }

    // ===== ENGINE =====

    /// Create a new engine, destroying the current one first.
    ///
    /// On failure no engine is held afterwards.
    pub fn load(
        &mut self,
        factory: &dyn SelectionEngineFactory,
        source: &TilesetSource,
        externals: TilesetExternals,
        options: SelectionOptions,
    ) -> Result<()> {
        self.destroy();

        let mut engine = factory.create(source, externals, options, self.load_error_callback())
            .map_err(|e| crate::engine_err!(SOURCE, "Selection engine creation failed for {:?}: {}", source, e))?;

        for attachment in &self.attachments {
            engine.add_attachment(attachment.clone());
        }
        crate::engine_debug!(
            SOURCE,
            "Selection engine created for {:?} with {} attachments",
            source, self.attachments.len()
        );
        self.engine = Some(engine);
        Ok(())
    }

    /// Engine failures come from any thread; subscribers only ever see
    /// them from `MainThreadQueue::dispatch`.
    fn load_error_callback(&self) -> LoadErrorCallback {
        let queue = self.main_thread_queue.clone();
        let notifier = self.load_failures.clone();
        Arc::new(move |error: LoadError| {
            let notifier = notifier.clone();
            queue.post(Box::new(move || notifier.broadcast(&error)));
        })
    }

    pub fn engine(&self) -> Option<&dyn SelectionEngine> {
        self.engine.as_deref()
    }

    pub fn engine_mut(&mut self) -> Option<&mut (dyn SelectionEngine + 'static)> {
        self.engine.as_deref_mut()
    }

    pub fn has_engine(&self) -> bool {
        self.engine.is_some()
    }

    /// Detach every attachment, then start asynchronous destruction of
    /// the engine and release the handle. No-op without an engine.
    pub fn destroy(&mut self) {
        let Some(mut engine) = self.engine.take() else {
            return;
        };

        for attachment in &self.attachments {
            if !engine.remove_attachment(attachment) {
                crate::engine_warn!(SOURCE, "Attachment '{}' was not registered", attachment.name());
            }
        }

        self.pending_destructions.fetch_add(1, Ordering::SeqCst);
        let pending = self.pending_destructions.clone();
        let queue = self.main_thread_queue.clone();
        engine.begin_async_destruction(Box::new(move || {
            queue.post(Box::new(move || {
                pending.fetch_sub(1, Ordering::SeqCst);
            }));
        }));

        crate::engine_debug!(SOURCE, "Selection engine destruction started");
    }

    /// True when no asynchronous destruction is outstanding.
    ///
    /// While destructions are pending, pumps the asset accessor and the
    /// main-thread queue so completions can arrive before the next check.
    pub fn is_ready_for_finish_destroy(&self) -> bool {
        let ready = self.pending_destructions.load(Ordering::SeqCst) == 0;
        if !ready {
            self.asset_accessor.tick();
            self.main_thread_queue.dispatch();
        }
        ready
    }

    pub fn pending_destructions(&self) -> usize {
        self.pending_destructions.load(Ordering::SeqCst)
    }

    // ===== ATTACHMENTS =====

    pub fn add_attachment(&mut self, attachment: Arc<dyn TilesetAttachment>) {
        if let Some(engine) = self.engine.as_mut() {
            engine.add_attachment(attachment.clone());
        }
        self.attachments.push(attachment);
    }

    /// Returns false if `attachment` was never added
    pub fn remove_attachment(&mut self, attachment: &Arc<dyn TilesetAttachment>) -> bool {
        let Some(index) = self.attachments.iter().position(|a| Arc::ptr_eq(a, attachment)) else {
            return false;
        };
        let attachment = self.attachments.remove(index);
        if let Some(engine) = self.engine.as_mut() {
            engine.remove_attachment(&attachment);
        }
        true
    }

    pub fn attachments(&self) -> &[Arc<dyn TilesetAttachment>] {
        &self.attachments
    }

    pub fn load_failures(&self) -> &Arc<LoadFailureNotifier> {
        &self.load_failures
    }
}

impl Drop for TilesetLifecycle {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
