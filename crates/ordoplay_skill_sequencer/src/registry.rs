// SPDX-License-Identifier: MIT OR Apache-2.0
//! Process registry and instance pool.
//!
//! The registry is an explicit `(ClipType, PlayMode) -> constructor` table.
//! Each process module contributes its rows through a `register` function;
//! nothing is discovered implicitly. The pool keeps a free list per concrete
//! process type so repeated sessions do not allocate new instances.

use crate::clip::{Clip, ClipType};
use crate::process::{PlayMode, Process};
use parking_lot::Mutex;
use std::any::TypeId;
use std::collections::{BTreeMap, HashMap};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

type ProcessConstructor = Arc<dyn Fn() -> Box<dyn Process> + Send + Sync>;

/// One row of the binding table
#[derive(Clone)]
pub struct ProcessBinding {
    /// Concrete process type
    pub process_type: TypeId,
    /// Concrete process type name, for diagnostics
    pub type_name: &'static str,
    constructor: ProcessConstructor,
}

impl ProcessBinding {
    fn construct(&self) -> Box<dyn Process> {
        (self.constructor)()
    }
}

impl std::fmt::Debug for ProcessBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessBinding")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Binding table from clip type and mode to a process implementation
#[derive(Debug, Clone, Default)]
pub struct ProcessRegistry {
    bindings: BTreeMap<(ClipType, PlayMode), ProcessBinding>,
}

impl ProcessRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with every built-in process registered
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        crate::processes::register_builtin(&mut registry);
        registry
    }

    /// Bind a default-constructible process type
    pub fn register<P>(&mut self, clip_type: ClipType, mode: PlayMode)
    where
        P: Process + Default + 'static,
    {
        self.register_with(clip_type, mode, P::default);
    }

    /// Bind a process type with a custom constructor.
    ///
    /// A later registration for the same key replaces the earlier one.
    pub fn register_with<P, F>(&mut self, clip_type: ClipType, mode: PlayMode, constructor: F)
    where
        P: Process + 'static,
        F: Fn() -> P + Send + Sync + 'static,
    {
        let binding = ProcessBinding {
            process_type: TypeId::of::<P>(),
            type_name: std::any::type_name::<P>(),
            constructor: Arc::new(move || Box::new(constructor()) as Box<dyn Process>),
        };
        if let Some(previous) = self.bindings.insert((clip_type, mode), binding) {
            tracing::debug!(
                "Replaced {} binding for {} clips in {} mode",
                previous.type_name,
                clip_type.name(),
                mode.name()
            );
        }
    }

    /// Remove a binding
    pub fn unregister(&mut self, clip_type: ClipType, mode: PlayMode) -> bool {
        self.bindings.remove(&(clip_type, mode)).is_some()
    }

    /// Get the binding for a clip type and mode
    pub fn binding(&self, clip_type: ClipType, mode: PlayMode) -> Option<&ProcessBinding> {
        self.bindings.get(&(clip_type, mode))
    }

    /// Whether a binding exists
    pub fn contains(&self, clip_type: ClipType, mode: PlayMode) -> bool {
        self.bindings.contains_key(&(clip_type, mode))
    }

    /// All bindings, ordered by clip type then mode
    pub fn bindings(&self) -> impl Iterator<Item = (ClipType, PlayMode, &ProcessBinding)> {
        self.bindings.iter().map(|(&(clip_type, mode), b)| (clip_type, mode, b))
    }

    /// Number of bindings
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// A process checked out of the pool
pub struct PooledProcess {
    process_type: TypeId,
    process: Box<dyn Process>,
}

impl PooledProcess {
    /// Concrete process type
    pub fn process_type(&self) -> TypeId {
        self.process_type
    }
}

impl Deref for PooledProcess {
    type Target = dyn Process;

    fn deref(&self) -> &Self::Target {
        self.process.as_ref()
    }
}

impl DerefMut for PooledProcess {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.process.as_mut()
    }
}

/// Pool usage counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    /// Instances constructed
    pub created: usize,
    /// Instances handed out from a free list
    pub reused: usize,
    /// Instances currently idle in the pool
    pub idle: usize,
}

/// Free lists of idle processes, per concrete type
pub struct ProcessPool {
    free: HashMap<TypeId, Vec<Box<dyn Process>>>,
    capacity_per_type: usize,
    created: usize,
    reused: usize,
}

impl ProcessPool {
    /// Default number of idle instances kept per type
    pub const DEFAULT_CAPACITY: usize = 64;

    /// Create an empty pool
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create an empty pool keeping at most `capacity_per_type` idle instances per type
    pub fn with_capacity(capacity_per_type: usize) -> Self {
        Self {
            free: HashMap::new(),
            capacity_per_type,
            created: 0,
            reused: 0,
        }
    }

    /// Take an instance for a binding, resetting it if recycled
    pub fn acquire(&mut self, binding: &ProcessBinding) -> PooledProcess {
        let recycled = self
            .free
            .get_mut(&binding.process_type)
            .and_then(Vec::pop);

        let process = match recycled {
            Some(mut process) => {
                process.reset();
                self.reused += 1;
                process
            }
            None => {
                self.created += 1;
                binding.construct()
            }
        };

        PooledProcess {
            process_type: binding.process_type,
            process,
        }
    }

    /// Put an instance back on its free list.
    ///
    /// The instance is not reset here; that happens on the next `acquire`.
    pub fn release(&mut self, process: PooledProcess) {
        let list = self.free.entry(process.process_type).or_default();
        if list.len() < self.capacity_per_type {
            list.push(process.process);
        }
    }

    /// Idle instances of one type
    pub fn idle_count(&self, process_type: TypeId) -> usize {
        self.free.get(&process_type).map_or(0, Vec::len)
    }

    /// Usage counters
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            created: self.created,
            reused: self.reused,
            idle: self.free.values().map(Vec::len).sum(),
        }
    }

    /// Drop every idle instance
    pub fn clear(&mut self) {
        self.free.clear();
    }
}

impl Default for ProcessPool {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared handle over a registry and a pool.
///
/// Clones share the same pool, so several runners can recycle each other's
/// instances.
#[derive(Clone)]
pub struct ProcessFactory {
    registry: Arc<ProcessRegistry>,
    pool: Arc<Mutex<ProcessPool>>,
}

impl ProcessFactory {
    /// Create a factory with its own pool
    pub fn new(registry: ProcessRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            pool: Arc::new(Mutex::new(ProcessPool::new())),
        }
    }

    /// Create a factory over an existing pool
    pub fn with_pool(registry: Arc<ProcessRegistry>, pool: Arc<Mutex<ProcessPool>>) -> Self {
        Self { registry, pool }
    }

    /// Factory over the built-in processes
    pub fn builtin() -> Self {
        Self::new(ProcessRegistry::with_builtin())
    }

    /// The binding table
    pub fn registry(&self) -> &ProcessRegistry {
        &self.registry
    }

    /// The shared pool
    pub fn pool(&self) -> &Arc<Mutex<ProcessPool>> {
        &self.pool
    }

    /// Get a process for a clip, or `None` if its type has no binding in `mode`
    pub fn create(&self, clip: &Clip, mode: PlayMode) -> Option<PooledProcess> {
        let binding = self.registry.binding(clip.clip_type(), mode)?;
        Some(self.pool.lock().acquire(binding))
    }

    /// Return a process to the pool
    pub fn release(&self, process: PooledProcess) {
        self.pool.lock().release(process);
    }
}

impl Default for ProcessFactory {
    fn default() -> Self {
        Self::builtin()
    }
}
