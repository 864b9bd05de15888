/// Galaxy3D Engine - Singleton manager for process-wide tiles subsystems
///
/// Holds the global logger and the process-wide AmortizedDestructor that
/// every tileset hands its released device resources to. Thread-safe
/// static storage with RwLock, the same way for every singleton.

use std::sync::{OnceLock, RwLock, Arc, Mutex};
use std::time::SystemTime;
use crate::lifetime::AmortizedDestructor;
use crate::error::{Result, Error};
use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};

// ===== INTERNAL STATE =====

/// Global engine state storage
static ENGINE_STATE: OnceLock<EngineState> = OnceLock::new();

/// Global logger (initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

/// Internal state structure holding all engine singletons
struct EngineState {
    /// Deferred destruction queue shared by every tileset
    amortized_destructor: RwLock<Option<Arc<Mutex<AmortizedDestructor>>>>,
}

impl EngineState {
    fn new() -> Self {
        Self {
            amortized_destructor: RwLock::new(None),
        }
    }
}

// ===== PUBLIC API =====

/// Main engine singleton manager
///
/// # Example
///
/// ```no_run
/// use galaxy_3d_tiles::galaxy3d::Engine;
///
/// Engine::initialize()?;
/// Engine::create_amortized_destructor()?;
///
/// // once per frame, after every tileset ticked
/// Engine::tick();
///
/// Engine::shutdown();
/// # Ok::<(), galaxy_3d_tiles::galaxy3d::Error>(())
/// ```
pub struct Engine;

impl Engine {
    /// Log errors before returning them (internal use)
    fn log_and_return_error(error: Error) -> Error {
        match &error {
            Error::InitializationFailed(msg) => {
                crate::engine_error!("galaxy3d::Engine", "Initialization failed: {}", msg);
            }
            Error::BackendError(msg) => {
                crate::engine_error!("galaxy3d::Engine", "Backend error: {}", msg);
            }
            _ => {
                crate::engine_error!("galaxy3d::Engine", "Engine error: {}", error);
            }
        }
        error
    }

    /// Initialize the engine. Idempotent.
    pub fn initialize() -> Result<()> {
        ENGINE_STATE.get_or_init(EngineState::new);
        Ok(())
    }

    /// Destroy all singletons.
    ///
    /// Resources still waiting in the amortized destructor are dropped
    /// without finalization; drain it with `tick()` first for a clean exit.
    pub fn shutdown() {
        if let Some(state) = ENGINE_STATE.get() {
            if let Ok(mut lock) = state.amortized_destructor.write() {
                if let Some(destructor) = lock.take() {
                    if let Ok(mut destructor) = destructor.lock() {
                        if !destructor.is_empty() {
                            crate::engine_warn!(
                                "galaxy3d::Engine",
                                "Shutdown with {} resources pending destruction",
                                destructor.pending_count()
                            );
                        }
                        destructor.clear();
                    }
                }
            }
        }
    }

    // ===== AMORTIZED DESTRUCTOR API =====

    /// Create and register the amortized destructor singleton
    ///
    /// # Errors
    ///
    /// Returns an error if the engine is not initialized or the destructor
    /// already exists.
    pub fn create_amortized_destructor() -> Result<()> {
        let state = ENGINE_STATE.get()
            .ok_or_else(|| Self::log_and_return_error(
                Error::InitializationFailed("Engine not initialized. Call Engine::initialize() first.".to_string())
            ))?;

        let mut lock = state.amortized_destructor.write()
            .map_err(|_| Self::log_and_return_error(
                Error::BackendError("AmortizedDestructor lock poisoned".to_string())
            ))?;

        if lock.is_some() {
            return Err(Self::log_and_return_error(
                Error::InitializationFailed("AmortizedDestructor already exists. Call Engine::destroy_amortized_destructor() first.".to_string())
            ));
        }

        *lock = Some(Arc::new(Mutex::new(AmortizedDestructor::new())));

        crate::engine_info!("galaxy3d::Engine", "AmortizedDestructor singleton created successfully");

        Ok(())
    }

    /// Get the amortized destructor singleton
    ///
    /// # Errors
    ///
    /// Returns an error if the engine is not initialized or the destructor
    /// has not been created.
    pub fn amortized_destructor() -> Result<Arc<Mutex<AmortizedDestructor>>> {
        let state = ENGINE_STATE.get()
            .ok_or_else(|| Self::log_and_return_error(
                Error::InitializationFailed("Engine not initialized. Call Engine::initialize() first.".to_string())
            ))?;

        let lock = state.amortized_destructor.read()
            .map_err(|_| Self::log_and_return_error(
                Error::BackendError("AmortizedDestructor lock poisoned".to_string())
            ))?;

        lock.clone()
            .ok_or_else(|| Self::log_and_return_error(
                Error::InitializationFailed("AmortizedDestructor not created. Call Engine::create_amortized_destructor() first.".to_string())
            ))
    }

    /// Destroy the amortized destructor singleton
    pub fn destroy_amortized_destructor() -> Result<()> {
        let state = ENGINE_STATE.get()
            .ok_or_else(|| Self::log_and_return_error(
                Error::InitializationFailed("Engine not initialized".to_string())
            ))?;

        let mut lock = state.amortized_destructor.write()
            .map_err(|_| Self::log_and_return_error(
                Error::BackendError("AmortizedDestructor lock poisoned".to_string())
            ))?;

        *lock = None;

        crate::engine_info!("galaxy3d::Engine", "AmortizedDestructor singleton destroyed");

        Ok(())
    }

    /// Per-frame engine work: retry pending resource destruction.
    ///
    /// Does nothing when the engine or the destructor does not exist.
    pub fn tick() {
        let Some(state) = ENGINE_STATE.get() else {
            return;
        };
        let destructor = match state.amortized_destructor.read() {
            Ok(lock) => lock.clone(),
            Err(_) => None,
        };
        if let Some(destructor) = destructor {
            if let Ok(mut destructor) = destructor.lock() {
                destructor.tick();
            }
        }
    }

    /// Reset all singletons for testing (only available in test builds)
    #[cfg(test)]
    pub fn reset_for_testing() {
        if let Some(state) = ENGINE_STATE.get() {
            if let Ok(mut lock) = state.amortized_destructor.write() {
                *lock = None;
            }
        }
    }

    // ===== LOGGING API =====

    /// Replace the default logger with a custom implementation
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(mut lock) = logger_lock.write() {
            *lock = Box::new(logger);
        }
    }

    /// Reset logger to DefaultLogger
    pub fn reset_logger() {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(mut lock) = logger_lock.write() {
            *lock = Box::new(DefaultLogger);
        }
    }

    /// Log without file:line (used by engine_info!, engine_warn!, ...)
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(lock) = logger_lock.read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: None,
                line: None,
            });
        }
    }

    /// Log with file:line (used by engine_error!)
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(lock) = logger_lock.read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: Some(file),
                line: Some(line),
            });
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
