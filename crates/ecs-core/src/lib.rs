//! The core of the crucible ECS runtime: entity/component storage, the
//! per-group system scheduler, message buses, and the service registry.
//!
//! This crate is the single-threaded data model every other crate builds
//! on. `crucible-plugin` hot-reloads code that talks to a [`World`] through
//! this crate's public API only; `crucible-inspect` reads the same world
//! read-only. Neither depends on the other.

mod column;
mod dynamic_column;
mod entity;
mod error;
mod ids;
mod message_bus;
mod query;
mod scheduler;
mod service;
mod system;
mod vtable;
mod world;

pub use entity::{Entity, NULL_ENTITY_ID};
pub use error::{ScheduleError, ScheduleResult, WorldError, WorldResult};
pub use ids::PluginId;
pub use query::QuerySpec;
pub use service::ServiceRegistry;
pub use system::{DestroyHook, Group, System, SystemTypeTag};
pub use vtable::ComponentVTable;
pub use world::{Component, EntityFn, ParamMap, PluginMetadata, World, WorldConfig};
