//! The crucible ECS runtime: public facade over entity/component storage,
//! the system scheduler, hot-reloadable plugins, and read-only inspection.
//!
//! Embedders depend on this crate alone; `crucible-core`, `crucible-plugin`,
//! and `crucible-inspect` are the implementation crates it re-exports.

pub use crucible_core::*;
pub use crucible_inspect as inspect;
pub use crucible_plugin as plugin;

/// Convenience constructor matching the embedder API's
/// `create_world(max_entities=5000, logger?) -> World` (base spec §6). The
/// logger half of that signature is ambient `tracing`: call
/// `tracing_subscriber::fmt::init()` (or any other subscriber) before this,
/// as the demo binaries do.
pub fn create_world(max_entities: u32) -> World {
    World::new(WorldConfig { max_entities })
}
