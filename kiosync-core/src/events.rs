//! Event System
//!
//! Callbacks for sync lifecycle events. The UI layer subscribes here
//! instead of polling the orchestrator.

use std::sync::{Arc, RwLock};

/// Events emitted by the sync engine.
#[derive(Debug, Clone)]
pub enum SyncEvent {
    /// The persisted snapshot (or mock content) was published at startup.
    CacheLoaded {
        /// Languages now available to the UI.
        languages: Vec<String>,
        /// True if the data came from the snapshot store, false if mock.
        from_cache: bool,
    },

    /// A sync cycle began.
    SyncStarted,

    /// One language's resolved snapshot was published.
    LanguagePublished {
        /// Language code.
        lang: String,
        /// True if this language's content differs from the cache.
        changed: bool,
    },

    /// The cycle finished and the new snapshot was persisted.
    SyncCompleted {
        /// Languages whose content changed this cycle.
        changed_languages: Vec<String>,
    },

    /// The cycle failed after cache load; previously published data stands.
    SyncRecovered {
        /// Error description.
        error: String,
    },

    /// A cycle was requested while another was already running.
    SyncSkipped,
}

/// Event handler trait.
///
/// Implement this trait to receive sync events.
pub trait EventHandler: Send + Sync {
    /// Called when an event occurs.
    fn on_event(&self, event: SyncEvent);
}

/// Simple callback-based event handler.
pub struct CallbackHandler<F>
where
    F: Fn(SyncEvent) + Send + Sync,
{
    callback: F,
}

impl<F> CallbackHandler<F>
where
    F: Fn(SyncEvent) + Send + Sync,
{
    /// Creates a new callback handler.
    pub fn new(callback: F) -> Self {
        CallbackHandler { callback }
    }
}

impl<F> EventHandler for CallbackHandler<F>
where
    F: Fn(SyncEvent) + Send + Sync,
{
    fn on_event(&self, event: SyncEvent) {
        (self.callback)(event);
    }
}

/// Event dispatcher fanning out to all registered handlers.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: RwLock<Vec<Arc<dyn EventHandler>>>,
}

impl EventDispatcher {
    /// Creates an empty dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler.
    pub fn register(&self, handler: Arc<dyn EventHandler>) {
        if let Ok(mut handlers) = self.handlers.write() {
            handlers.push(handler);
        }
    }

    /// Dispatches an event to every handler.
    pub fn dispatch(&self, event: SyncEvent) {
        if let Ok(handlers) = self.handlers.read() {
            for handler in handlers.iter() {
                handler.on_event(event.clone());
            }
        }
    }
}
