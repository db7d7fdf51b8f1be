//! The world: facade over entity lifecycle, component storage, messaging,
//! services, the scheduler, and plugin/component ownership bookkeeping.

use std::any::TypeId;
use std::collections::{HashMap, VecDeque};

use indexmap::IndexMap;

use crate::column::{AnyColumn, Column};
use crate::dynamic_column::DynamicColumn;
use crate::entity::Entity;
use crate::error::{ScheduleResult, WorldError, WorldResult};
use crate::ids::PluginId;
use crate::message_bus::{AnyBus, Bus};
use crate::query::QuerySpec;
use crate::scheduler::Scheduler;
use crate::service::ServiceRegistry;
use crate::system::{Group, System};
use crate::vtable::ComponentVTable;

/// Constructor configuration for [`World::new`]. Mirrors the embedder API's
/// `create_world(max_entities=5000, logger?)` (base spec §6) as a plain
/// struct rather than named/optional arguments — the logger half of that
/// signature is ambient `tracing`, wired up by the embedder, not passed in.
#[derive(Debug, Clone, Copy)]
pub struct WorldConfig {
    pub max_entities: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self { max_entities: 5000 }
    }
}

/// A component type usable with the dynamic-invoke/inspection surface:
/// cloneable and serializable so a [`ComponentVTable`] can be built for it.
pub trait Component: 'static + Clone + serde::Serialize + serde::de::DeserializeOwned {}
impl<T> Component for T where T: 'static + Clone + serde::Serialize + serde::de::DeserializeOwned {}

pub type ParamMap = HashMap<String, serde_json::Value>;
pub type EntityFn = Box<dyn Fn(Entity, &mut World, &ParamMap) -> WorldResult<serde_json::Value>>;

/// Metadata an embedder or plugin registers when it calls
/// `World::register_plugin` (base spec §3's Plugin record, minus the
/// `initialize`/`uninitialize` callbacks, which live on the plugin host
/// side of the boundary in `crucible-plugin`).
#[derive(Debug, Clone, serde::Serialize)]
pub struct PluginMetadata {
    pub name: String,
    pub version: String,
    pub author: String,
    pub description: String,
    pub prefix: String,
}

pub struct World {
    config: WorldConfig,
    generation: Vec<i32>,
    alive: Vec<bool>,
    free: VecDeque<u32>,
    next_id: u32,

    columns: HashMap<TypeId, Box<dyn AnyColumn>>,
    component_names: HashMap<TypeId, &'static str>,
    dynamic_columns: HashMap<String, DynamicColumn>,
    buses: HashMap<TypeId, Box<dyn AnyBus>>,

    services: ServiceRegistry,
    scheduler: Scheduler,

    plugins: IndexMap<String, PluginMetadata>,
    component_owner: HashMap<TypeId, PluginId>,
    component_vtables: IndexMap<String, ComponentVTable>,

    functions: HashMap<String, EntityFn>,
}

impl World {
    pub fn new(config: WorldConfig) -> Self {
        let capacity = config.max_entities as usize + 1;
        Self {
            config,
            generation: vec![0; capacity],
            alive: vec![false; capacity],
            free: VecDeque::new(),
            next_id: 1,
            columns: HashMap::new(),
            component_names: HashMap::new(),
            dynamic_columns: HashMap::new(),
            buses: HashMap::new(),
            services: ServiceRegistry::new(),
            scheduler: Scheduler::new(),
            plugins: IndexMap::new(),
            component_owner: HashMap::new(),
            component_vtables: IndexMap::new(),
            functions: HashMap::new(),
        }
    }

    fn sparse_capacity(&self) -> u32 {
        self.config.max_entities + 1
    }

    // ---- entity lifecycle -------------------------------------------------

    pub fn create_entity(&mut self) -> WorldResult<Entity> {
        let id = if let Some(id) = self.free.pop_front() {
            id
        } else {
            if self.next_id > self.config.max_entities {
                return Err(WorldError::CapacityExceeded { max_entities: self.config.max_entities });
            }
            let id = self.next_id;
            self.next_id += 1;
            id
        };
        self.alive[id as usize] = true;
        let generation = self.generation[id as usize];
        Ok(Entity::new(id, generation))
    }

    pub fn is_valid(&self, e: Entity) -> bool {
        let id = e.id() as usize;
        id != 0 && id < self.alive.len() && self.alive[id] && self.generation[id] == e.generation()
    }

    fn check_valid(&self, e: Entity) -> WorldResult<()> {
        if self.is_valid(e) {
            Ok(())
        } else {
            Err(WorldError::InvalidEntity(e))
        }
    }

    /// Runs the entity's on-destroy hook (if any), sweeps it out of every
    /// column and dynamic column, then recycles its id with a bumped
    /// generation (base spec §3a, §4.5).
    pub fn destroy_entity(&mut self, e: Entity) -> WorldResult<()> {
        self.check_valid(e)?;

        if let Some(mut hook) = self.remove_component::<crate::system::DestroyHook>(e) {
            (hook.0)(e, self);
        }

        for column in self.columns.values_mut() {
            column.remove_untyped(e);
        }
        for dynamic in self.dynamic_columns.values_mut() {
            dynamic.remove(e);
        }

        let id = e.id() as usize;
        self.alive[id] = false;
        self.generation[id] = self.generation[id].wrapping_add(1);
        self.free.push_back(e.id());
        Ok(())
    }

    // ---- typed components ---------------------------------------------------

    fn column_mut<T: 'static>(&mut self) -> &mut Column<T> {
        let capacity = self.sparse_capacity();
        self.component_names.entry(TypeId::of::<T>()).or_insert_with(std::any::type_name::<T>);
        self.columns
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(Column::<T>::new(capacity)))
            .as_any_mut()
            .downcast_mut::<Column<T>>()
            .expect("column type mismatch")
    }

    fn column<T: 'static>(&self) -> Option<&Column<T>> {
        self.columns.get(&TypeId::of::<T>())?.as_any().downcast_ref::<Column<T>>()
    }

    pub fn set_component<T: 'static>(&mut self, e: Entity, value: T) -> WorldResult<()> {
        self.check_valid(e)?;
        self.column_mut::<T>().set(e, value);
        Ok(())
    }

    pub fn get_component<T: Clone + 'static>(&self, e: Entity) -> WorldResult<T> {
        self.check_valid(e)?;
        self.column::<T>()
            .and_then(|col| col.get(e))
            .cloned()
            .ok_or(WorldError::ComponentNotFound { entity: e, component: std::any::type_name::<T>() })
    }

    pub fn get_component_mut<T: 'static>(&mut self, e: Entity) -> WorldResult<&mut T> {
        self.check_valid(e)?;
        let type_name = std::any::type_name::<T>();
        self.columns
            .get_mut(&TypeId::of::<T>())
            .and_then(|col| col.as_any_mut().downcast_mut::<Column<T>>())
            .and_then(|col| col.get_mut(e))
            .ok_or(WorldError::ComponentNotFound { entity: e, component: type_name })
    }

    pub fn has_component<T: 'static>(&self, e: Entity) -> bool {
        self.column::<T>().map(|col| col.has(e)).unwrap_or(false)
    }

    pub fn remove_component<T: 'static>(&mut self, e: Entity) -> Option<T> {
        self.columns
            .get_mut(&TypeId::of::<T>())?
            .as_any_mut()
            .downcast_mut::<Column<T>>()
            .and_then(|col| col.remove(e))
    }

    // ---- dynamic components -------------------------------------------------

    pub fn set_dynamic_component(
        &mut self,
        e: Entity,
        name: impl Into<String>,
        value: serde_json::Value,
    ) -> WorldResult<()> {
        self.check_valid(e)?;
        self.dynamic_columns.entry(name.into()).or_default().set(e, value);
        Ok(())
    }

    pub fn get_dynamic_component(&self, e: Entity, name: &str) -> Option<&serde_json::Value> {
        self.dynamic_columns.get(name)?.get(e)
    }

    pub fn has_dynamic_component(&self, e: Entity, name: &str) -> bool {
        self.dynamic_columns.get(name).map(|col| col.has(e)).unwrap_or(false)
    }

    pub fn remove_dynamic_component(&mut self, e: Entity, name: &str) -> Option<serde_json::Value> {
        self.dynamic_columns.get_mut(name)?.remove(e)
    }

    pub fn dynamic_components(&self, e: Entity) -> Vec<(&str, &serde_json::Value)> {
        self.dynamic_columns.iter().filter_map(|(name, col)| col.get(e).map(|v| (name.as_str(), v))).collect()
    }

    // ---- queries -------------------------------------------------------------

    fn query_inner(&self, ids: &[TypeId]) -> (Vec<Entity>, usize) {
        let mut cols = Vec::with_capacity(ids.len());
        for id in ids {
            match self.columns.get(id) {
                Some(col) => cols.push(col.as_ref()),
                None => return (Vec::new(), 0),
            }
        }

        let driver_pos = (0..cols.len()).min_by_key(|&i| cols[i].len()).expect("non-empty query");
        let driver_entities = cols[driver_pos].iter_entities_dyn();

        let mut probes = 0usize;
        let mut result = Vec::new();
        'driver: for e in driver_entities {
            for (i, col) in cols.iter().enumerate() {
                if i == driver_pos {
                    continue;
                }
                probes += 1;
                if !col.has_untyped(e) {
                    continue 'driver;
                }
            }
            result.push(e);
        }
        (result, probes)
    }

    pub fn query<Q: QuerySpec>(&self) -> Vec<Entity> {
        self.query_inner(&Q::type_ids()).0
    }

    /// Same as [`World::query`] but also returns the number of `has` probes
    /// performed, purely so tests can verify the smallest-column-as-driver
    /// optimization (base spec §8, invariant 4) without instrumenting
    /// production code paths.
    #[doc(hidden)]
    pub fn query_with_probe_count<Q: QuerySpec>(&self) -> (Vec<Entity>, usize) {
        self.query_inner(&Q::type_ids())
    }

    // ---- messages --------------------------------------------------------

    pub fn publish_message<T: 'static>(&mut self, message: T) {
        self.buses
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(Bus::<T>::new()))
            .as_any_mut()
            .downcast_mut::<Bus<T>>()
            .expect("bus type mismatch")
            .publish(message);
    }

    pub fn read_messages<T: 'static>(&self) -> &[T] {
        self.buses
            .get(&TypeId::of::<T>())
            .and_then(|bus| bus.as_any().downcast_ref::<Bus<T>>())
            .map(|bus| bus.read())
            .unwrap_or(&[])
    }

    pub(crate) fn drain_all_buses(&mut self) {
        for bus in self.buses.values_mut() {
            bus.clear();
        }
    }

    // ---- services ----------------------------------------------------------

    pub fn register_service<T: 'static>(&mut self, instance: T, owner: Option<PluginId>) {
        self.services.register(instance, owner);
    }

    pub fn unregister_service<T: 'static>(&mut self) -> bool {
        self.services.unregister::<T>()
    }

    pub fn get_service<T: 'static>(&self) -> WorldResult<&T> {
        self.services.get::<T>().ok_or(WorldError::ServiceNotFound(std::any::type_name::<T>()))
    }

    pub fn get_service_mut<T: 'static>(&mut self) -> WorldResult<&mut T> {
        self.services.get_mut::<T>().ok_or(WorldError::ServiceNotFound(std::any::type_name::<T>()))
    }

    pub fn services_owned_by(&self, owner: &PluginId) -> Vec<&'static str> {
        self.services.owned_by(owner)
    }

    pub fn service_count(&self) -> usize {
        self.services.len()
    }

    /// `(type_name, owner)` for every registered service, for the
    /// inspection surface's service list (base spec §6).
    pub fn services_all(&self) -> Vec<(&'static str, Option<PluginId>)> {
        self.services.all().map(|(name, owner)| (name, owner.cloned())).collect()
    }

    // ---- plugins -------------------------------------------------------------

    pub fn register_plugin(&mut self, meta: PluginMetadata) -> WorldResult<()> {
        if self.plugins.contains_key(&meta.prefix) {
            return Err(WorldError::DuplicatePluginPrefix(meta.prefix));
        }
        tracing::info!(prefix = %meta.prefix, name = %meta.name, "plugin registered");
        self.plugins.insert(meta.prefix.clone(), meta);
        Ok(())
    }

    pub fn unregister_plugin(&mut self, prefix: &str) -> Option<PluginMetadata> {
        tracing::info!(prefix, "plugin unregistered");
        self.plugins.shift_remove(prefix)
    }

    pub fn plugins(&self) -> impl Iterator<Item = &PluginMetadata> {
        self.plugins.values()
    }

    pub fn plugin(&self, prefix: &str) -> Option<&PluginMetadata> {
        self.plugins.get(prefix)
    }

    // ---- component ownership & the inspection vtable ----------------------

    pub fn register_component_owner<T: Component>(&mut self, owner: PluginId) {
        let type_name = std::any::type_name::<T>();
        self.component_owner.insert(TypeId::of::<T>(), owner);
        self.component_names.entry(TypeId::of::<T>()).or_insert(type_name);
        self.component_vtables.entry(type_name.to_string()).or_insert_with(ComponentVTable::of::<T>);
    }

    pub fn register_component_type<T: Component>(&mut self) {
        let type_name = std::any::type_name::<T>();
        self.component_names.entry(TypeId::of::<T>()).or_insert(type_name);
        self.component_vtables.entry(type_name.to_string()).or_insert_with(ComponentVTable::of::<T>);
    }

    pub fn component_owner_of(&self, type_id: TypeId) -> Option<&PluginId> {
        self.component_owner.get(&type_id)
    }

    pub fn component_vtable(&self, type_name: &str) -> Option<&ComponentVTable> {
        self.component_vtables.get(type_name)
    }

    pub fn component_type_names(&self) -> Vec<(TypeId, &'static str)> {
        self.component_names.iter().map(|(id, name)| (*id, *name)).collect()
    }

    /// Counts every registered component type, typed or owner-only — not
    /// just the ones with a column allocated. A plugin that calls
    /// `register_component_owner::<T>` before any instance of `T` is ever
    /// `set` has no column for `T` yet, but `component_type_names()` (and
    /// the inspection surface built on it) already lists it, so this count
    /// must agree with that list rather than with `self.columns.len()`.
    pub fn component_type_count(&self) -> usize {
        self.component_names.len()
    }

    /// Component type names owned by `owner`, for the inspection surface's
    /// plugin-detail view (base spec §6).
    pub fn components_owned_by(&self, owner: &PluginId) -> Vec<&'static str> {
        self.component_names
            .iter()
            .filter(|(id, _)| self.component_owner.get(id) == Some(owner))
            .map(|(_, name)| *name)
            .collect()
    }

    // ---- systems -------------------------------------------------------------

    pub fn register_system(&mut self, system: Box<dyn System>, owner: Option<PluginId>) -> WorldResult<()> {
        match self.scheduler.register(system, owner) {
            None => Ok(()),
            Some(name) => Err(WorldError::DuplicateSystemName(name)),
        }
    }

    pub fn remove_system_by_name(&mut self, name: &str) -> WorldResult<()> {
        if self.scheduler.remove_by_name(name) {
            Ok(())
        } else {
            Err(WorldError::SystemNotFound(name.to_string()))
        }
    }

    pub fn remove_system_by_type<T: System>(&mut self) -> Vec<String> {
        self.scheduler.remove_by_type(TypeId::of::<T>())
    }

    pub fn enable_system_by_name(&mut self, name: &str) -> WorldResult<()> {
        if self.scheduler.set_enabled_by_name(name, true) {
            Ok(())
        } else {
            Err(WorldError::SystemNotFound(name.to_string()))
        }
    }

    pub fn disable_system_by_name(&mut self, name: &str) -> WorldResult<()> {
        if self.scheduler.set_enabled_by_name(name, false) {
            Ok(())
        } else {
            Err(WorldError::SystemNotFound(name.to_string()))
        }
    }

    pub fn enable_system_by_type<T: System>(&mut self) -> usize {
        self.scheduler.set_enabled_by_type(TypeId::of::<T>(), true)
    }

    pub fn disable_system_by_type<T: System>(&mut self) -> usize {
        self.scheduler.set_enabled_by_type(TypeId::of::<T>(), false)
    }

    pub fn systems_owned_by(&self, owner: &PluginId) -> Vec<String> {
        self.scheduler.owned_by(owner)
    }

    pub fn system_count(&self) -> usize {
        self.scheduler.system_count()
    }

    pub fn systems(&self) -> Vec<(String, bool, Option<PluginId>)> {
        self.scheduler.names()
    }

    // ---- named entity functions ------------------------------------------

    pub fn register_function(&mut self, name: impl Into<String>, f: EntityFn) {
        self.functions.insert(name.into(), f);
    }

    pub fn invoke_function(
        &mut self,
        entity: Entity,
        name: &str,
        params: &ParamMap,
    ) -> WorldResult<serde_json::Value> {
        self.check_valid(entity)?;
        let f = self.functions.remove(name).ok_or_else(|| WorldError::FunctionNotFound(name.to_string()))?;
        let result = f(entity, self, params);
        self.functions.insert(name.to_string(), f);
        result
    }

    // ---- scheduler facade --------------------------------------------------

    pub fn tick(&mut self, dt: f32) -> ScheduleResult<()> {
        self.advance(dt, false)
    }

    pub fn step(&mut self, dt: f32) -> ScheduleResult<()> {
        self.advance(dt, true)
    }

    /// Walks one frame in place. The scheduler is never detached from
    /// `self` for the walk's duration: each system is taken out of its own
    /// slot only while its own `update` runs, the same take-call-restore
    /// shape `invoke_function` above uses for named functions. That keeps
    /// the rest of the schedule live and reachable the whole time, so a
    /// system that calls `world.register_system`/`remove_system_by_name`/
    /// etc. from inside its own `update` lands on the real scheduler —
    /// new registrations are picked up by the next resort, and removals or
    /// enable/disable toggles of other systems take effect immediately —
    /// instead of mutating a throwaway copy that gets discarded once the
    /// tick ends (base spec §4.6 step 3).
    fn advance(&mut self, dt: f32, force: bool) -> ScheduleResult<()> {
        if self.scheduler.should_defer_tick(force) {
            self.scheduler.record_paused_delta(dt);
            return Ok(());
        }

        self.scheduler.ensure_sorted()?;

        for group in Group::ALL {
            let snapshot = self.scheduler.group_snapshot(group);
            for idx in snapshot {
                let Some(mut entry) = self.scheduler.take_entry(idx) else {
                    continue;
                };
                if entry.enabled {
                    entry.system.update(self, dt);
                }
                self.scheduler.restore_entry(idx, entry);
            }
        }

        self.scheduler.finish_tick(dt);
        self.drain_all_buses();
        Ok(())
    }

    pub fn pause(&mut self) {
        self.scheduler.pause();
    }

    pub fn resume(&mut self) {
        self.scheduler.resume();
    }

    pub fn is_paused(&self) -> bool {
        self.scheduler.is_paused()
    }

    pub fn tick_count(&self) -> u64 {
        self.scheduler.tick_count()
    }

    // ---- status -----------------------------------------------------------

    pub fn max_entities(&self) -> u32 {
        self.config.max_entities
    }

    pub fn recycled_count(&self) -> usize {
        self.free.len()
    }
}
