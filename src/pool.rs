//! Bounded pool of reusable inferrers

use std::num::NonZeroUsize;
use std::thread;

use parking_lot::Mutex;
use tracing::trace;

use crate::inferrer::TypeInferrer;

type Factory = Box<dyn Fn() -> TypeInferrer + Send + Sync>;

/// Keeps idle inferrers for reuse across columns
///
/// Released inferrers are reset before they go back into the pool. Once the
/// pool holds `capacity` idle inferrers, further releases are dropped.
pub struct InferrerPool {
    factory: Factory,
    idle: Mutex<Vec<TypeInferrer>>,
    capacity: usize,
}

impl InferrerPool {
    /// Pool sized to twice the available parallelism
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> TypeInferrer + Send + Sync + 'static,
    {
        Self::with_capacity(Self::default_capacity(), factory)
    }

    pub fn with_capacity<F>(capacity: usize, factory: F) -> Self
    where
        F: Fn() -> TypeInferrer + Send + Sync + 'static,
    {
        Self {
            factory: Box::new(factory),
            idle: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn default_capacity() -> usize {
        thread::available_parallelism().map_or(1, NonZeroUsize::get) * 2
    }

    /// An idle inferrer, or a fresh one from the factory
    pub fn rent(&self) -> TypeInferrer {
        let pooled = self.idle.lock().pop();
        pooled.unwrap_or_else(|| (self.factory)())
    }

    /// Return an inferrer for reuse
    pub fn release(&self, mut inferrer: TypeInferrer) {
        inferrer.reset();
        let mut idle = self.idle.lock();
        if idle.len() < self.capacity {
            idle.push(inferrer);
        } else {
            trace!("Inferrer pool full ({}), dropping released inferrer", self.capacity);
        }
    }

    pub fn idle_count(&self) -> usize {
        self.idle.lock().len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl std::fmt::Debug for InferrerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferrerPool")
            .field("capacity", &self.capacity)
            .field("idle", &self.idle_count())
            .finish()
    }
}
