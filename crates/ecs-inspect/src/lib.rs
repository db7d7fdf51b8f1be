//! Read-only inspection and dynamic-invoke surface for the crucible ECS
//! runtime (base spec §6, §9).
//!
//! This crate only fixes data shapes and a reflection-free dispatch table;
//! it carries no transport of its own — wiring it behind HTTP, gRPC, or
//! anything else is left to the embedder.

mod adapter;
mod error;
mod methods;
mod snapshot;

pub use adapter::InspectAdapter;
pub use error::{InspectError, InspectResult};
pub use methods::{InspectRegistry, ParamSpec, ServiceMethod, ServiceVTable};
pub use snapshot::{
    ComponentSnapshot, ComponentTypeSummary, PluginDetail, PluginSummary, ServiceSummary, SystemSummary, WorldStatus,
};
