//! Sparse-set backed component storage.
//!
//! One `Column<T>` is created lazily per component type the first time it is
//! used. Indices are entity ids; membership and removal are O(1), and the
//! dense region stays packed by swap-and-pop so iteration never walks a hole.

use std::any::Any;

use crate::entity::Entity;

/// Absent marker for a sparse slot.
const ABSENT: i32 = -1;

/// Type-erased column operations the world needs without knowing `T`.
///
/// Grounded in the type-erased `ComponentStorage` pattern (downcast via
/// `as_any`/`as_any_mut`) used to keep a heterogeneous map of component
/// stores keyed by `TypeId`.
pub(crate) trait AnyColumn: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn remove_untyped(&mut self, entity: Entity);
    fn has_untyped(&self, entity: Entity) -> bool;
    fn len(&self) -> usize;
    /// Owners of every live entry, for query planning over type-erased
    /// columns (the driver column is picked without knowing its `T`).
    fn iter_entities_dyn(&self) -> Vec<Entity>;
}

impl<T: 'static> AnyColumn for Column<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn remove_untyped(&mut self, entity: Entity) {
        self.remove(entity);
    }

    fn has_untyped(&self, entity: Entity) -> bool {
        self.has(entity)
    }

    fn len(&self) -> usize {
        self.count
    }

    fn iter_entities_dyn(&self) -> Vec<Entity> {
        self.entities[..self.count].to_vec()
    }
}

/// Sparse-set storage for every live instance of one component type.
pub(crate) struct Column<T> {
    dense: Vec<T>,
    entities: Vec<Entity>,
    /// Fixed-size `max_entities` table mapping entity id -> dense index, or
    /// `ABSENT`. Allocated once, sized to the world's entity capacity.
    sparse: Vec<i32>,
    count: usize,
}

impl<T> Column<T> {
    pub(crate) fn new(max_entities: u32) -> Self {
        Self {
            dense: Vec::new(),
            entities: Vec::new(),
            sparse: vec![ABSENT; max_entities as usize],
            count: 0,
        }
    }

    fn slot(&self, entity: Entity) -> Option<usize> {
        let id = entity.id() as usize;
        let slot = *self.sparse.get(id)?;
        if slot == ABSENT {
            return None;
        }
        let slot = slot as usize;
        if slot >= self.count || self.entities[slot] != entity {
            return None;
        }
        Some(slot)
    }

    pub(crate) fn has(&self, entity: Entity) -> bool {
        self.slot(entity).is_some()
    }

    /// Grows the dense/entities buffers, doubling capacity (seeding at 4 the
    /// first time), mirroring the spec's explicit growth policy rather than
    /// leaning on `Vec`'s own amortized growth.
    fn ensure_capacity(&mut self) {
        if self.count < self.dense.capacity() {
            return;
        }
        let capacity = self.dense.capacity();
        let target = if capacity == 0 { 4 } else { capacity * 2 };
        self.dense.reserve_exact(target - capacity);
        self.entities.reserve_exact(target - capacity);
    }

    pub(crate) fn set(&mut self, entity: Entity, value: T) {
        if let Some(slot) = self.slot(entity) {
            self.dense[slot] = value;
            return;
        }
        self.ensure_capacity();
        let id = entity.id() as usize;
        if id >= self.sparse.len() {
            self.sparse.resize(id + 1, ABSENT);
        }
        self.sparse[id] = self.count as i32;
        self.dense.push(value);
        self.entities.push(entity);
        self.count += 1;
    }

    pub(crate) fn get(&self, entity: Entity) -> Option<&T> {
        self.slot(entity).map(|slot| &self.dense[slot])
    }

    pub(crate) fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        let slot = self.slot(entity)?;
        Some(&mut self.dense[slot])
    }

    /// Swap-and-pop removal. No-op if the entity has no component here.
    pub(crate) fn remove(&mut self, entity: Entity) -> Option<T> {
        let slot = self.slot(entity)?;
        let last = self.count - 1;
        let id = entity.id() as usize;
        self.sparse[id] = ABSENT;

        if slot == last {
            self.count -= 1;
            self.entities.pop();
            return self.dense.pop();
        }

        self.entities[slot] = self.entities[last];
        self.dense.swap(slot, last);
        let moved_id = self.entities[slot].id() as usize;
        self.sparse[moved_id] = slot as i32;

        self.count -= 1;
        self.entities.pop();
        self.dense.pop()
    }

    pub(crate) fn iter_entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities[..self.count].iter().copied()
    }

    pub(crate) fn iter_components(&self) -> impl Iterator<Item = &T> {
        self.dense[..self.count].iter()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.entities[..self.count]
            .iter()
            .copied()
            .zip(self.dense[..self.count].iter())
    }

    pub(crate) fn len(&self) -> usize {
        self.count
    }
}
