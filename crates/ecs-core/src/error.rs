//! Error taxonomy for the world and scheduler.

use thiserror::Error;

use crate::entity::Entity;

pub type WorldResult<T> = Result<T, WorldError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorldError {
    #[error("entity {0:?} is not valid (destroyed, recycled, or never created)")]
    InvalidEntity(Entity),

    #[error("entity {entity:?} has no component of type {component}")]
    ComponentNotFound { entity: Entity, component: &'static str },

    #[error("world is at capacity ({max_entities} entities)")]
    CapacityExceeded { max_entities: u32 },

    #[error("a system named '{0}' is already registered")]
    DuplicateSystemName(String),

    #[error("no system named '{0}' is registered")]
    SystemNotFound(String),

    #[error("no service registered for type {0}")]
    ServiceNotFound(&'static str),

    #[error("a plugin with prefix '{0}' is already registered")]
    DuplicatePluginPrefix(String),

    #[error("no plugin with prefix '{0}' is registered")]
    PluginNotFound(String),

    #[error("no function named '{0}' is registered")]
    FunctionNotFound(String),

    #[error("no component type named '{0}' is registered for dynamic access")]
    UnknownComponentType(String),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("system '{system}' depends on '{missing}', which is not registered in group {group:?}")]
    UnresolvedDependency {
        system: String,
        missing: String,
        group: crate::system::Group,
    },

    #[error("cycle detected among systems: {residual:?}")]
    CycleDetected { residual: Vec<String> },
}
