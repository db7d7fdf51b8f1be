//! Versioned entity handles.

use std::fmt;

/// Reserved id meaning "no entity". Never returned by `World::create_entity`.
pub const NULL_ENTITY_ID: u32 = 0;

/// A versioned handle into a [`World`](crate::world::World).
///
/// Entities are plain values: copying one does not clone any component data,
/// and holding one does not keep anything alive. Validity is checked against
/// the world's alive set and generation table at the point of use, per
/// `(id, generation)` — see the column store's edge case on cross-world reuse.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Entity {
    pub(crate) id: u32,
    pub(crate) generation: i32,
}

impl Entity {
    pub(crate) fn new(id: u32, generation: i32) -> Self {
        Self { id, generation }
    }

    /// The null entity: `id == 0`. Never alive, never returned by `create_entity`.
    pub const NULL: Entity = Entity {
        id: NULL_ENTITY_ID,
        generation: 0,
    };

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn generation(&self) -> i32 {
        self.generation
    }

    pub fn is_null(&self) -> bool {
        self.id == NULL_ENTITY_ID
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("generation", &self.generation)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_entity_has_reserved_id() {
        assert_eq!(Entity::NULL.id(), NULL_ENTITY_ID);
        assert!(Entity::NULL.is_null());
    }

    #[test]
    fn equality_is_by_id_and_generation() {
        let a = Entity::new(3, 1);
        let b = Entity::new(3, 1);
        let c = Entity::new(3, 2);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
