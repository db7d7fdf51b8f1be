//! Per-group topological system scheduler.
//!
//! Systems are stored in a slot vector (the same "index stays stable, free
//! list recycles holes" idiom as entity ids in [`crate::world::World`]) so a
//! system can add or remove another system mid-tick without invalidating the
//! snapshot currently being walked — the base spec requires such changes to
//! only affect the *next* tick.

use std::any::TypeId;
use std::collections::{BTreeSet, HashMap};

use crate::error::{ScheduleError, ScheduleResult};
use crate::ids::PluginId;
use crate::system::{Group, System};

/// A system's slot contents. `World::advance` takes one of these out of its
/// slot for the duration of that system's own `update` call and restores it
/// afterward, so `system` and `enabled` need to be visible to `world.rs`.
pub(crate) struct SystemEntry {
    pub(crate) system: Box<dyn System>,
    pub(crate) enabled: bool,
    owner: Option<PluginId>,
    type_id: TypeId,
    name: String,
}

/// Grouped, topologically sorted, restartable tick driver.
pub struct Scheduler {
    entries: Vec<Option<SystemEntry>>,
    free: Vec<usize>,
    by_name: HashMap<String, usize>,
    order: HashMap<Group, Vec<usize>>,
    dirty: bool,
    paused: bool,
    tick_count: u64,
    last_delta: f32,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            free: Vec::new(),
            by_name: HashMap::new(),
            order: HashMap::new(),
            dirty: true,
            paused: false,
            tick_count: 0,
            last_delta: 0.0,
        }
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn register(&mut self, system: Box<dyn System>, owner: Option<PluginId>) -> Option<String> {
        let name = system.name().to_string();
        if self.by_name.contains_key(&name) {
            return Some(name);
        }
        let type_id = system.as_any().type_id();
        let entry = SystemEntry { system, enabled: true, owner, type_id, name: name.clone() };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.entries[idx] = Some(entry);
                idx
            }
            None => {
                self.entries.push(Some(entry));
                self.entries.len() - 1
            }
        };
        self.by_name.insert(name, idx);
        self.dirty = true;
        tracing::debug!(system = %self.entries[idx].as_ref().unwrap().name, "system registered, scheduler marked dirty");
        None
    }

    pub fn remove_by_name(&mut self, name: &str) -> bool {
        let Some(idx) = self.by_name.remove(name) else {
            return false;
        };
        self.entries[idx] = None;
        self.free.push(idx);
        self.dirty = true;
        true
    }

    pub fn remove_by_type(&mut self, type_id: TypeId) -> Vec<String> {
        let mut removed = Vec::new();
        for (idx, slot) in self.entries.iter_mut().enumerate() {
            if slot.as_ref().map(|e| e.type_id) == Some(type_id) {
                let name = slot.as_ref().unwrap().name.clone();
                *slot = None;
                self.by_name.remove(&name);
                self.free.push(idx);
                removed.push(name);
            }
        }
        if !removed.is_empty() {
            self.dirty = true;
        }
        removed
    }

    pub fn set_enabled_by_name(&mut self, name: &str, enabled: bool) -> bool {
        match self.by_name.get(name).and_then(|idx| self.entries[*idx].as_mut()) {
            Some(entry) => {
                entry.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn set_enabled_by_type(&mut self, type_id: TypeId, enabled: bool) -> usize {
        let mut count = 0;
        for slot in self.entries.iter_mut().flatten() {
            if slot.type_id == type_id {
                slot.enabled = enabled;
                count += 1;
            }
        }
        count
    }

    pub fn is_enabled_by_name(&self, name: &str) -> Option<bool> {
        self.by_name.get(name).and_then(|idx| self.entries[*idx].as_ref()).map(|e| e.enabled)
    }

    pub fn owned_by(&self, owner: &PluginId) -> Vec<String> {
        self.entries
            .iter()
            .flatten()
            .filter(|e| e.owner.as_ref() == Some(owner))
            .map(|e| e.name.clone())
            .collect()
    }

    pub fn system_count(&self) -> usize {
        self.by_name.len()
    }

    pub fn names(&self) -> Vec<(String, bool, Option<PluginId>)> {
        self.entries
            .iter()
            .flatten()
            .map(|e| (e.name.clone(), e.enabled, e.owner.clone()))
            .collect()
    }

    /// True when `tick`'s suppressible pause applies (base spec §4.6 step
    /// 1) — `step`'s `force=true` always advances regardless.
    pub(crate) fn should_defer_tick(&self, force: bool) -> bool {
        self.paused && !force
    }

    pub(crate) fn record_paused_delta(&mut self, dt: f32) {
        self.last_delta = dt;
    }

    /// Resorts if dirty. On failure the previous `order` is left untouched
    /// and `dirty` stays set, so the next tick attempt retries.
    pub(crate) fn ensure_sorted(&mut self) -> ScheduleResult<()> {
        if self.dirty {
            self.resort()?;
            self.dirty = false;
        }
        Ok(())
    }

    pub(crate) fn group_snapshot(&self, group: Group) -> Vec<usize> {
        self.order.get(&group).cloned().unwrap_or_default()
    }

    /// Takes the entry at `idx` out of its slot, leaving it empty for the
    /// duration of that system's own `update` call.
    pub(crate) fn take_entry(&mut self, idx: usize) -> Option<SystemEntry> {
        self.entries.get_mut(idx).and_then(|slot| slot.take())
    }

    /// Restores an entry taken by `take_entry`, unless the system removed
    /// itself (or something else claimed its slot) while it was running —
    /// detected by `by_name` no longer pointing `entry.name` at `idx`, in
    /// which case the entry is left gone rather than silently resurrected.
    pub(crate) fn restore_entry(&mut self, idx: usize, entry: SystemEntry) {
        if self.by_name.get(&entry.name) == Some(&idx) {
            if let Some(slot) = self.entries.get_mut(idx) {
                *slot = Some(entry);
            }
        }
    }

    pub(crate) fn finish_tick(&mut self, dt: f32) {
        self.tick_count += 1;
        self.last_delta = dt;
    }

    /// Rebuilds `order` for every group from scratch via Kahn's algorithm.
    /// On failure the previous `order` is left untouched and `dirty` is not
    /// cleared by the caller, so the next tick attempt retries the sort.
    fn resort(&mut self) -> ScheduleResult<()> {
        let mut new_order = HashMap::new();
        for group in Group::ALL {
            new_order.insert(group, self.sort_group(group)?);
        }
        tracing::info!("scheduler dirty flag consumed, systems resorted");
        self.order = new_order;
        Ok(())
    }

    fn sort_group(&self, group: Group) -> ScheduleResult<Vec<usize>> {
        let nodes: Vec<usize> = self
            .entries
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().filter(|e| e.system.group() == group).map(|_| idx))
            .collect();

        let mut type_index: HashMap<TypeId, Vec<usize>> = HashMap::new();
        let mut name_index: HashMap<&str, usize> = HashMap::new();
        for (local, &global) in nodes.iter().enumerate() {
            let entry = self.entries[global].as_ref().unwrap();
            type_index.entry(entry.type_id).or_default().push(local);
            name_index.insert(entry.name.as_str(), local);
        }

        let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
        let mut in_degree = vec![0usize; nodes.len()];

        for (local, &global) in nodes.iter().enumerate() {
            let entry = self.entries[global].as_ref().unwrap();

            for tag in entry.system.after() {
                let targets = type_index.get(&tag.id).cloned().unwrap_or_default();
                if targets.is_empty() {
                    return Err(ScheduleError::UnresolvedDependency {
                        system: entry.name.clone(),
                        missing: tag.name().to_string(),
                        group,
                    });
                }
                for target in targets {
                    adjacency[target].push(local);
                    in_degree[local] += 1;
                }
            }

            for tag in entry.system.before() {
                let targets = type_index.get(&tag.id).cloned().unwrap_or_default();
                if targets.is_empty() {
                    return Err(ScheduleError::UnresolvedDependency {
                        system: entry.name.clone(),
                        missing: tag.name().to_string(),
                        group,
                    });
                }
                for target in targets {
                    adjacency[local].push(target);
                    in_degree[target] += 1;
                }
            }

            for dep_name in entry.system.dependencies() {
                let Some(&target) = name_index.get(dep_name.as_str()) else {
                    return Err(ScheduleError::UnresolvedDependency {
                        system: entry.name.clone(),
                        missing: dep_name,
                        group,
                    });
                };
                adjacency[target].push(local);
                in_degree[local] += 1;
            }
        }

        // Kahn's algorithm; a BTreeSet of ready local indices always pops the
        // lowest index first, which is insertion order within this group.
        let mut ready: BTreeSet<usize> =
            in_degree.iter().enumerate().filter(|(_, &d)| d == 0).map(|(i, _)| i).collect();
        let mut sorted_local = Vec::with_capacity(nodes.len());

        while let Some(&next) = ready.iter().next() {
            ready.remove(&next);
            sorted_local.push(next);
            for &dependent in &adjacency[next] {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    ready.insert(dependent);
                }
            }
        }

        if sorted_local.len() != nodes.len() {
            let residual: Vec<String> = (0..nodes.len())
                .filter(|local| !sorted_local.contains(local))
                .map(|local| self.entries[nodes[local]].as_ref().unwrap().name.clone())
                .collect();
            return Err(ScheduleError::CycleDetected { residual });
        }

        Ok(sorted_local.into_iter().map(|local| nodes[local]).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::SystemTypeTag;
    use crate::world::{World, WorldConfig};
    use std::any::Any;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<&'static str>>>;

    macro_rules! recording_system {
        ($ty:ident, $name:literal, $group:expr, $after:expr, $deps:expr) => {
            struct $ty(Log);
            impl System for $ty {
                fn name(&self) -> &str {
                    $name
                }
                fn group(&self) -> Group {
                    $group
                }
                fn after(&self) -> Vec<SystemTypeTag> {
                    $after
                }
                fn dependencies(&self) -> Vec<String> {
                    $deps
                }
                fn update(&mut self, _world: &mut World, _dt: f32) {
                    self.0.borrow_mut().push($name);
                }
                fn as_any(&self) -> &dyn Any {
                    self
                }
            }
        };
    }

    recording_system!(ASys, "A", Group::Initialization, vec![], vec![]);
    recording_system!(CSys, "C", Group::Simulation, vec![], vec![]);
    recording_system!(BSys, "B", Group::Simulation, vec![SystemTypeTag::of::<CSys>()], vec![]);
    recording_system!(DSys, "D", Group::Presentation, vec![SystemTypeTag::of::<BSys>()], vec![]);

    fn world() -> World {
        World::new(WorldConfig::default())
    }

    /// S3: topological ordering across groups, exercised through
    /// `World::tick` so the scheduler lives inside `World` the whole time,
    /// the same way every caller outside this module drives it.
    #[test]
    fn topological_order_across_groups() {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let mut w = world();

        w.register_system(Box::new(ASys(log.clone())), None).unwrap();
        w.register_system(Box::new(CSys(log.clone())), None).unwrap();
        w.register_system(Box::new(BSys(log.clone())), None).unwrap();
        w.register_system(Box::new(DSys(log.clone())), None).unwrap();

        w.tick(1.0 / 60.0).unwrap();
        assert_eq!(*log.borrow(), vec!["A", "C", "B", "D"]);
    }

    /// S3 (continued): removing C's instance makes B's `after` edge
    /// unresolvable, since B's dependency target no longer has any
    /// registered instance in its group.
    #[test]
    fn removing_type_dependency_target_raises_unresolved() {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let mut w = world();
        w.register_system(Box::new(ASys(log.clone())), None).unwrap();
        w.register_system(Box::new(CSys(log.clone())), None).unwrap();
        w.register_system(Box::new(BSys(log.clone())), None).unwrap();
        w.remove_system_by_name("C").unwrap();

        let err = w.tick(1.0 / 60.0).unwrap_err();
        match err {
            ScheduleError::UnresolvedDependency { missing, system, .. } => {
                assert_eq!(system, "B");
                assert!(missing.contains("CSys"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unresolved_named_dependency_is_reported() {
        struct NeedsGhost;
        impl System for NeedsGhost {
            fn name(&self) -> &str {
                "needs-ghost"
            }
            fn dependencies(&self) -> Vec<String> {
                vec!["ghost".to_string()]
            }
            fn update(&mut self, _world: &mut World, _dt: f32) {}
            fn as_any(&self) -> &dyn Any {
                self
            }
        }
        let mut w = world();
        w.register_system(Box::new(NeedsGhost), None).unwrap();
        let err = w.tick(0.1).unwrap_err();
        match err {
            ScheduleError::UnresolvedDependency { missing, .. } => assert_eq!(missing, "ghost"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    /// S4: cycle detection.
    #[test]
    fn cycle_is_detected() {
        struct Named(&'static str, &'static str);
        impl System for Named {
            fn name(&self) -> &str {
                self.0
            }
            fn dependencies(&self) -> Vec<String> {
                vec![self.1.to_string()]
            }
            fn update(&mut self, _world: &mut World, _dt: f32) {}
            fn as_any(&self) -> &dyn Any {
                self
            }
        }
        let mut w = world();
        w.register_system(Box::new(Named("X", "Z")), None).unwrap();
        w.register_system(Box::new(Named("Y", "X")), None).unwrap();
        w.register_system(Box::new(Named("Z", "Y")), None).unwrap();
        let err = w.tick(0.1).unwrap_err();
        match err {
            ScheduleError::CycleDetected { mut residual } => {
                residual.sort();
                assert_eq!(residual, vec!["X".to_string(), "Y".to_string(), "Z".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn pause_suppresses_tick_but_step_always_advances() {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let mut w = world();
        w.register_system(Box::new(ASys(log.clone())), None).unwrap();
        w.pause();
        w.tick(1.0).unwrap();
        assert_eq!(w.tick_count(), 0);
        assert!(log.borrow().is_empty());

        w.step(1.0).unwrap();
        assert_eq!(w.tick_count(), 1);
        assert_eq!(*log.borrow(), vec!["A"]);

        w.resume();
        w.tick(1.0).unwrap();
        assert_eq!(w.tick_count(), 2);
    }

    #[test]
    fn register_marks_dirty_and_remove_by_name_drops_entry() {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let mut w = world();
        w.register_system(Box::new(ASys(log)), None).unwrap();
        assert_eq!(w.system_count(), 1);
        w.remove_system_by_name("A").unwrap();
        assert_eq!(w.system_count(), 0);
        assert!(w.remove_system_by_name("A").is_err());
    }

    /// A system that registers another system mid-tick must see it picked
    /// up by the very next tick, not lose it because the scheduler was
    /// ever detached from `World` during the walk (base spec §4.6 step 3).
    #[test]
    fn system_registered_mid_tick_runs_on_the_next_tick() {
        struct Bootstrap(Log);
        impl System for Bootstrap {
            fn name(&self) -> &str {
                "bootstrap"
            }
            fn update(&mut self, world: &mut World, _dt: f32) {
                self.0.borrow_mut().push("bootstrap");
                if world.system_count() == 1 {
                    world
                        .register_system(Box::new(ASys(self.0.clone())), None)
                        .unwrap();
                }
            }
            fn as_any(&self) -> &dyn Any {
                self
            }
        }

        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let mut w = world();
        w.register_system(Box::new(Bootstrap(log.clone())), None).unwrap();

        w.tick(1.0 / 60.0).unwrap();
        assert_eq!(*log.borrow(), vec!["bootstrap"]);
        assert_eq!(w.system_count(), 2);

        log.borrow_mut().clear();
        w.tick(1.0 / 60.0).unwrap();
        assert_eq!(*log.borrow(), vec!["bootstrap", "A"]);
    }

    /// A system may remove a different, already-registered system mid-tick
    /// and have that removal land on the live scheduler immediately,
    /// rather than spuriously reporting `SystemNotFound` because the real
    /// schedule was swapped out for an empty one during the walk.
    #[test]
    fn system_removed_mid_tick_is_actually_removed() {
        struct Remover(Log);
        impl System for Remover {
            fn name(&self) -> &str {
                "remover"
            }
            fn group(&self) -> Group {
                Group::Initialization
            }
            fn update(&mut self, world: &mut World, _dt: f32) {
                self.0.borrow_mut().push("remover");
                world.remove_system_by_name("A").unwrap();
            }
            fn as_any(&self) -> &dyn Any {
                self
            }
        }

        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let mut w = world();
        w.register_system(Box::new(Remover(log.clone())), None).unwrap();
        w.register_system(Box::new(ASys(log.clone())), None).unwrap();
        assert_eq!(w.system_count(), 2);

        w.tick(1.0 / 60.0).unwrap();
        assert_eq!(w.system_count(), 1);
        assert_eq!(*log.borrow(), vec!["remover"]);
    }
}
