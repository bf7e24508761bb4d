// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-session execution context.
//!
//! One context is shared by every process of a session. It provides:
//! - A service locator for host capabilities (`Arc<dyn Trait>` keyed by type)
//! - A layered override stack for animation layer masks
//! - Deduplicated system-level cleanup actions, run once at session end
//! - The owning actor and a global speed multiplier

use crate::binding::{ActorId, AssetRef};
use crate::process::PlayMode;
use crate::services::AnimationBridge;
use indexmap::IndexMap;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

type ServiceBox = Box<dyn Any + Send + Sync>;
type ServiceFactory = Box<dyn Fn() -> Option<ServiceBox> + Send + Sync>;

/// System cleanup action, run at session end
pub type CleanupAction = Box<dyn FnOnce(&mut ExecutionContext) + Send>;

/// Type-keyed service storage with optional lazy provisioning
#[derive(Default)]
pub struct ServiceLocator {
    /// Services added by the host; survive `clear`
    registered: HashMap<TypeId, ServiceBox>,
    /// Services produced by a factory; dropped on `clear`
    memoized: HashMap<TypeId, ServiceBox>,
    /// Lazy factories
    factories: HashMap<TypeId, ServiceFactory>,
}

impl ServiceLocator {
    /// Create an empty locator
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a service instance
    pub fn add<T: ?Sized + Send + Sync + 'static>(&mut self, service: Arc<T>) {
        self.registered.insert(TypeId::of::<T>(), Box::new(service));
    }

    /// Remove a registered service
    pub fn remove<T: ?Sized + Send + Sync + 'static>(&mut self) -> Option<Arc<T>> {
        let boxed = self.registered.remove(&TypeId::of::<T>())?;
        boxed.downcast::<Arc<T>>().ok().map(|service| *service)
    }

    /// Install a factory consulted when no instance is cached
    pub fn set_factory<T, F>(&mut self, factory: F)
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn() -> Option<Arc<T>> + Send + Sync + 'static,
    {
        self.factories.insert(
            TypeId::of::<T>(),
            Box::new(move || factory().map(|service| Box::new(service) as ServiceBox)),
        );
    }

    /// Look up a service, provisioning and memoizing it through its factory
    /// on first use
    pub fn get<T: ?Sized + Send + Sync + 'static>(&mut self) -> Option<Arc<T>> {
        let key = TypeId::of::<T>();
        if let Some(service) = self.peek::<T>() {
            return Some(service);
        }

        let boxed = self.factories.get(&key).and_then(|factory| factory())?;
        let service = boxed.downcast_ref::<Arc<T>>().cloned();
        if service.is_some() {
            self.memoized.insert(key, boxed);
        }
        service
    }

    /// Look up a cached service without consulting factories
    pub fn peek<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        let key = TypeId::of::<T>();
        self.registered
            .get(&key)
            .or_else(|| self.memoized.get(&key))
            .and_then(|boxed| boxed.downcast_ref::<Arc<T>>())
            .cloned()
    }

    /// Whether a service is cached or can be provisioned
    pub fn contains<T: ?Sized + Send + Sync + 'static>(&self) -> bool {
        let key = TypeId::of::<T>();
        self.registered.contains_key(&key)
            || self.memoized.contains_key(&key)
            || self.factories.contains_key(&key)
    }

    /// Drop memoized lookups; registered services and factories stay
    pub fn clear_cache(&mut self) {
        self.memoized.clear();
    }
}

/// Override stack of one animation layer
#[derive(Debug, Clone, Default)]
struct LayerMaskState {
    /// Mask the layer had before the first override
    original: Option<AssetRef>,
    /// Active overrides, top last
    stack: Vec<AssetRef>,
}

/// Shared state for one play session
pub struct ExecutionContext {
    owner: Option<ActorId>,
    mode: PlayMode,
    speed: f32,
    time: f32,
    services: ServiceLocator,
    layer_masks: HashMap<u32, LayerMaskState>,
    cleanups: IndexMap<String, CleanupAction>,
}

impl ExecutionContext {
    /// Create a context for a play mode
    pub fn new(mode: PlayMode) -> Self {
        Self {
            owner: None,
            mode,
            speed: 1.0,
            time: 0.0,
            services: ServiceLocator::new(),
            layer_masks: HashMap::new(),
            cleanups: IndexMap::new(),
        }
    }

    /// Set the owning actor
    pub fn with_owner(mut self, owner: ActorId) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Owning actor
    pub fn owner(&self) -> Option<ActorId> {
        self.owner
    }

    /// Change the owning actor
    pub fn set_owner(&mut self, owner: Option<ActorId>) {
        self.owner = owner;
    }

    /// Play mode of the session
    pub fn mode(&self) -> PlayMode {
        self.mode
    }

    /// Global speed multiplier
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Set the global speed multiplier (negative values clamp to zero)
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed.max(0.0);
    }

    /// Session time of the scan currently being evaluated
    pub fn time(&self) -> f32 {
        self.time
    }

    pub(crate) fn set_time(&mut self, time: f32) {
        self.time = time;
    }

    // --- Services ---

    /// Register a host-owned service
    pub fn add_service<T: ?Sized + Send + Sync + 'static>(&mut self, service: Arc<T>) {
        self.services.add(service);
    }

    /// Install a lazy service factory
    pub fn set_service_factory<T, F>(&mut self, factory: F)
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn() -> Option<Arc<T>> + Send + Sync + 'static,
    {
        self.services.set_factory(factory);
    }

    /// Look up a service
    pub fn service<T: ?Sized + Send + Sync + 'static>(&mut self) -> Option<Arc<T>> {
        self.services.get::<T>()
    }

    /// Direct access to the locator
    pub fn services(&mut self) -> &mut ServiceLocator {
        &mut self.services
    }

    // --- Layer masks ---

    /// Push a mask override onto a layer and apply it
    pub fn push_layer_mask(&mut self, layer: u32, mask: AssetRef) {
        let bridge = self.service::<dyn AnimationBridge>();
        let state = self.layer_masks.entry(layer).or_insert_with(|| LayerMaskState {
            original: bridge.as_ref().and_then(|b| b.layer_mask(layer)),
            stack: Vec::new(),
        });
        state.stack.push(mask);

        if let Some(bridge) = bridge {
            bridge.set_layer_mask(layer, state.stack.last());
        }
    }

    /// Remove one specific override from a layer.
    ///
    /// The override need not be on top. Once the stack empties the original
    /// mask is restored and the layer is forgotten.
    pub fn pop_layer_mask(&mut self, layer: u32, mask: &AssetRef) {
        let Some(state) = self.layer_masks.get_mut(&layer) else {
            tracing::debug!("pop_layer_mask on untouched layer {}", layer);
            return;
        };
        let Some(idx) = state.stack.iter().rposition(|m| m == mask) else {
            tracing::debug!("Mask {} not pushed on layer {}", mask, layer);
            return;
        };
        state.stack.remove(idx);

        let bridge = self.service::<dyn AnimationBridge>();
        let Some(state) = self.layer_masks.get(&layer) else {
            return;
        };
        if state.stack.is_empty() {
            if let Some(bridge) = &bridge {
                bridge.set_layer_mask(layer, state.original.as_ref());
            }
            self.layer_masks.remove(&layer);
        } else if let Some(bridge) = &bridge {
            bridge.set_layer_mask(layer, state.stack.last());
        }
    }

    /// Number of overrides currently pushed on a layer
    pub fn layer_mask_depth(&self, layer: u32) -> usize {
        self.layer_masks.get(&layer).map_or(0, |s| s.stack.len())
    }

    // --- System cleanup ---

    /// Register a system cleanup action under `key`.
    ///
    /// Returns `true` if this call registered it; later registrations of the
    /// same key are ignored.
    pub fn register_system_cleanup<F>(&mut self, key: impl Into<String>, action: F) -> bool
    where
        F: FnOnce(&mut ExecutionContext) + Send + 'static,
    {
        let key = key.into();
        if self.cleanups.contains_key(&key) {
            return false;
        }
        self.cleanups.insert(key, Box::new(action));
        true
    }

    /// Whether a cleanup key is registered
    pub fn has_system_cleanup(&self, key: &str) -> bool {
        self.cleanups.contains_key(key)
    }

    /// Run and drop every system cleanup, in registration order
    pub fn run_system_cleanups(&mut self) {
        let cleanups = std::mem::take(&mut self.cleanups);
        for (key, action) in cleanups {
            tracing::debug!("Running system cleanup '{}'", key);
            action(self);
        }
    }

    /// Wipe session state: memoized services, layer masks, cleanup actions.
    ///
    /// Pending cleanups are dropped without running.
    pub fn clear(&mut self) {
        self.services.clear_cache();
        self.layer_masks.clear();
        self.cleanups.clear();
        self.time = 0.0;
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new(PlayMode::default())
    }
}
