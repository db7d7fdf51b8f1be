//! Reflection-free component vtable for the inspection surface.
//!
//! The source resolves component type names and payloads through runtime
//! reflection. Per the base spec's redesign note (§9), this is re-architected
//! as a small table of plain function pointers captured at registration
//! time — grounded in the teacher's own pure-Rust `ModuleVTable`
//! (`api/src/vtable.rs`: "no extern \"C\"!") rather than an `extern "C"` ABI,
//! since everything here stays in-process.

use crate::entity::Entity;
use crate::world::World;

/// Per-component-type operations the inspection adapter needs without
/// knowing the concrete Rust type: parse a JSON payload and write it,
/// remove by entity, and snapshot back to JSON.
pub struct ComponentVTable {
    pub type_name: &'static str,
    pub set_from_json: fn(&mut World, Entity, serde_json::Value) -> Result<(), String>,
    pub remove: fn(&mut World, Entity),
    pub snapshot: fn(&World, Entity) -> Option<serde_json::Value>,
}

impl ComponentVTable {
    pub fn of<T>() -> Self
    where
        T: 'static + Clone + serde::Serialize + serde::de::DeserializeOwned,
    {
        Self {
            type_name: std::any::type_name::<T>(),
            set_from_json: |world, entity, payload| {
                let value: T = serde_json::from_value(payload).map_err(|err| err.to_string())?;
                world.set_component(entity, value).map_err(|err| err.to_string())
            },
            remove: |world, entity| {
                world.remove_component::<T>(entity);
            },
            snapshot: |world, entity| {
                world
                    .get_component::<T>(entity)
                    .ok()
                    .and_then(|value| serde_json::to_value(value).ok())
            },
        }
    }
}

impl std::fmt::Debug for ComponentVTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentVTable").field("type_name", &self.type_name).finish()
    }
}
