//! System trait, execution groups, and type-level dependency tags.

use std::any::{Any, TypeId};
use std::fmt;

use crate::world::World;

/// One of the three fixed execution phases a tick walks in order.
///
/// Custom groups are not part of the core (base spec §4.6): an unknown tag
/// read from tooling or a plugin manifest is coerced to `Simulation` via
/// [`Group::from_tag`], with a `warn!` logged at the call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Group {
    Initialization,
    Simulation,
    Presentation,
}

impl Default for Group {
    fn default() -> Self {
        Group::Simulation
    }
}

impl Group {
    /// All groups, in fixed tick order.
    pub const ALL: [Group; 3] = [Group::Initialization, Group::Simulation, Group::Presentation];

    /// Parses a group tag from tooling (e.g. a plugin manifest's raw string
    /// field) that isn't known statically. Unrecognized tags map to
    /// `Simulation` and log a warning, mirroring the source's tolerance for
    /// unknown reflection-discovered group tags.
    pub fn from_tag(tag: &str) -> Group {
        match tag {
            "Initialization" => Group::Initialization,
            "Simulation" => Group::Simulation,
            "Presentation" => Group::Presentation,
            other => {
                tracing::warn!(tag = other, "unknown system group tag, defaulting to Simulation");
                Group::Simulation
            }
        }
    }
}

/// A type-level reference to a system, used by `after`/`before` edges.
///
/// Carries a readable name alongside the `TypeId` so scheduler errors can
/// name the missing target instead of printing an opaque type id.
#[derive(Clone, Copy)]
pub struct SystemTypeTag {
    pub(crate) id: TypeId,
    pub(crate) name: &'static str,
}

impl SystemTypeTag {
    pub fn of<T: System>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for SystemTypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SystemTypeTag").field(&self.name).finish()
    }
}

impl PartialEq for SystemTypeTag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for SystemTypeTag {}

/// A unit of per-tick logic.
///
/// `name()` must be stable and unique (the world rejects duplicate
/// registrations). `after`/`before` declare type-based edges that apply to
/// every instance of the target type; `dependencies` declares name-based
/// edges that apply only to the one named instance. Both are resolved
/// within the system's own group (base spec §4.6).
pub trait System: 'static {
    fn name(&self) -> &str;

    fn group(&self) -> Group {
        Group::Simulation
    }

    fn after(&self) -> Vec<SystemTypeTag> {
        Vec::new()
    }

    fn before(&self) -> Vec<SystemTypeTag> {
        Vec::new()
    }

    fn dependencies(&self) -> Vec<String> {
        Vec::new()
    }

    fn update(&mut self, world: &mut World, dt: f32);

    fn as_any(&self) -> &dyn Any;
}

/// An entity-scoped teardown callback, stored as an ordinary component
/// (base spec §3a) so `destroy_entity` can drain it through the same
/// sparse-set machinery as every other column instead of a second,
/// global observer registry.
pub struct DestroyHook(pub Box<dyn FnMut(crate::entity::Entity, &mut World)>);

impl DestroyHook {
    pub fn new(f: impl FnMut(crate::entity::Entity, &mut World) + 'static) -> Self {
        Self(Box::new(f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct A;
    struct B;

    impl System for A {
        fn name(&self) -> &str {
            "a"
        }
        fn update(&mut self, _world: &mut World, _dt: f32) {}
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    impl System for B {
        fn name(&self) -> &str {
            "b"
        }
        fn update(&mut self, _world: &mut World, _dt: f32) {}
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn type_tags_compare_by_type_not_name_string() {
        assert_eq!(SystemTypeTag::of::<A>(), SystemTypeTag::of::<A>());
        assert_ne!(SystemTypeTag::of::<A>(), SystemTypeTag::of::<B>());
    }

    #[test]
    fn unknown_group_tag_defaults_to_simulation() {
        assert_eq!(Group::from_tag("Nonsense"), Group::Simulation);
        assert_eq!(Group::from_tag("Presentation"), Group::Presentation);
    }
}
