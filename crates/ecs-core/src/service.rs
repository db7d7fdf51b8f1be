//! Type-keyed singleton service locator.
//!
//! One instance per service type, looked up by `TypeId` the same way columns
//! are (base spec §4.4). Re-registering a type overwrites the previous
//! instance and its owner tag; `unregister` drops both together.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use crate::ids::PluginId;

struct ServiceEntry {
    instance: Box<dyn Any>,
    type_name: &'static str,
    owner: Option<PluginId>,
}

#[derive(Default)]
pub struct ServiceRegistry {
    entries: HashMap<TypeId, ServiceEntry>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: 'static>(&mut self, instance: T, owner: Option<PluginId>) {
        self.entries.insert(
            TypeId::of::<T>(),
            ServiceEntry {
                instance: Box::new(instance),
                type_name: std::any::type_name::<T>(),
                owner,
            },
        );
    }

    pub fn unregister<T: 'static>(&mut self) -> bool {
        self.entries.remove(&TypeId::of::<T>()).is_some()
    }

    pub fn get<T: 'static>(&self) -> Option<&T> {
        self.entries
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.instance.downcast_ref::<T>())
    }

    pub fn get_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.entries
            .get_mut(&TypeId::of::<T>())
            .and_then(|entry| entry.instance.downcast_mut::<T>())
    }

    pub fn owner<T: 'static>(&self) -> Option<&PluginId> {
        self.entries.get(&TypeId::of::<T>())?.owner.as_ref()
    }

    /// Drops every service whose owner matches, returning their type names
    /// for logging. Used by inspection to report orphaned/reclaimed state;
    /// the world itself never calls this on a plugin's behalf (base spec
    /// §4.7: "the world does not enforce that uninitialize completed the
    /// reversal").
    pub fn owned_by(&self, owner: &PluginId) -> Vec<&'static str> {
        self.entries
            .values()
            .filter(|entry| entry.owner.as_ref() == Some(owner))
            .map(|entry| entry.type_name)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn type_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.values().map(|entry| entry.type_name)
    }

    /// `(type_name, owner)` for every registered service, for the
    /// inspection surface's service list — it needs every entry's name and
    /// owner without knowing any of their concrete Rust types up front.
    pub fn all(&self) -> impl Iterator<Item = (&'static str, Option<&PluginId>)> + '_ {
        self.entries.values().map(|entry| (entry.type_name, entry.owner.as_ref()))
    }
}
