//! Error taxonomy for the inspection adapter.
//!
//! Per base spec §7, the adapter catches and reports structured errors
//! rather than propagating the core's own error types unchanged — hence
//! the `From` impls, which let adapter code still use `?` against
//! `WorldResult`/`ScheduleResult` while keeping one flat enum for callers.

use thiserror::Error;

pub type InspectResult<T> = Result<T, InspectError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InspectError {
    #[error("unknown component type '{0}'")]
    UnknownComponentType(String),

    #[error("unknown service type '{0}'")]
    UnknownServiceType(String),

    #[error("service '{service}' has no method named '{method}'")]
    UnknownMethod { service: String, method: String },

    #[error("missing required parameter '{0}'")]
    MissingParameter(String),

    #[error("failed to deserialize payload: {0}")]
    DeserializationFailed(String),

    #[error("no plugin with prefix '{0}'")]
    PluginNotFound(String),

    #[error(transparent)]
    World(#[from] crucible_core::WorldError),
}
