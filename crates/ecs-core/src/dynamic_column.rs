//! Name-keyed heterogeneous component storage for tooling and prototyping.
//!
//! A dynamic column has the same per-entity contract as a typed
//! [`Column`](crate::column::Column) but is keyed by a runtime string rather
//! than a Rust type, and holds an untyped JSON payload instead of a concrete
//! `T`. This is what the inspection surface's "set component from structured
//! payload" endpoint writes through when the caller only knows a type name.

use std::collections::HashMap;

use crate::entity::Entity;

/// One name-keyed pseudo-component store: `Entity -> value`.
#[derive(Default)]
pub(crate) struct DynamicColumn {
    values: HashMap<Entity, serde_json::Value>,
}

impl DynamicColumn {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set(&mut self, entity: Entity, value: serde_json::Value) {
        self.values.insert(entity, value);
    }

    pub(crate) fn get(&self, entity: Entity) -> Option<&serde_json::Value> {
        self.values.get(&entity)
    }

    pub(crate) fn has(&self, entity: Entity) -> bool {
        self.values.contains_key(&entity)
    }

    pub(crate) fn remove(&mut self, entity: Entity) -> Option<serde_json::Value> {
        self.values.remove(&entity)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (Entity, &serde_json::Value)> {
        self.values.iter().map(|(e, v)| (*e, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn e(id: u32) -> Entity {
        Entity::new(id, 0)
    }

    #[test]
    fn set_then_get_round_trips() {
        let mut col = DynamicColumn::new();
        col.set(e(1), json!({"hp": 10}));
        assert_eq!(col.get(e(1)), Some(&json!({"hp": 10})));
    }

    #[test]
    fn remove_clears_entry() {
        let mut col = DynamicColumn::new();
        col.set(e(1), json!(1));
        col.remove(e(1));
        assert!(!col.has(e(1)));
    }
}
