/// Collaborators injected into a selection engine at construction

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use crate::error::Result;
use crate::occlusion::OcclusionProxyPool;
use crate::preparer::PrepareRendererResources;
use super::selection_engine::{SelectionEngine, SelectionOptions, LoadErrorCallback};

/// Network access used by the engine; `tick` pumps completed requests
pub trait AssetAccessor: Send + Sync {
    fn tick(&self);
}

/// Background worker pool supplied by the host
pub trait TaskProcessor: Send + Sync {
    fn start_task(&self, task: Box<dyn FnOnce() + Send>);
}

/// Attribution sink for dataset credits
pub trait CreditSink: Send + Sync {
    fn add_credit(&self, html: &str, show_on_screen: bool);
}

/// Work posted from any thread, executed on the main thread by `dispatch`
#[derive(Default)]
pub struct MainThreadQueue {
    tasks: Mutex<VecDeque<Box<dyn FnOnce() + Send>>>,
}

impl MainThreadQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a task. Never runs it inline, even on the main thread.
    pub fn post(&self, task: Box<dyn FnOnce() + Send>) {
        if let Ok(mut tasks) = self.tasks.lock() {
            tasks.push_back(task);
        }
    }

    /// Run every task queued before this call. Returns how many ran.
    ///
    /// Tasks posted while dispatching run on the next dispatch.
    pub fn dispatch(&self) -> usize {
        let batch: Vec<_> = match self.tasks.lock() {
            Ok(mut tasks) => tasks.drain(..).collect(),
            Err(_) => return 0,
        };
        let count = batch.len();
        for task in batch {
            task();
        }
        count
    }

    pub fn len(&self) -> usize {
        self.tasks.lock().map(|t| t.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Everything a selection engine needs from its host
#[derive(Clone)]
pub struct TilesetExternals {
    pub asset_accessor: Arc<dyn AssetAccessor>,
    pub preparer: Arc<dyn PrepareRendererResources>,
    pub task_processor: Arc<dyn TaskProcessor>,
    pub credit_sink: Option<Arc<dyn CreditSink>>,
    pub main_thread_queue: Arc<MainThreadQueue>,
    pub occlusion_pool: Option<Arc<Mutex<OcclusionProxyPool>>>,
}

/// Where the dataset comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TilesetSource {
    Url(String),
    Ion { asset_id: i64, access_token: String, server_url: String },
}

/// Creates selection engines (implemented by the host's tiles library binding)
pub trait SelectionEngineFactory: Send + Sync {
    fn create(
        &self,
        source: &TilesetSource,
        externals: TilesetExternals,
        options: SelectionOptions,
        on_load_error: LoadErrorCallback,
    ) -> Result<Box<dyn SelectionEngine>>;
}
