//! Hot-reloadable plugin host for the crucible ECS runtime.
//!
//! A plugin is a `cdylib` exporting a `crucible_plugin_create` symbol. The
//! host loads it into an isolated `libloading::Library`, calls
//! `initialize(world)`, and on reload calls `uninitialize(world)` before
//! dropping the library so a rebuilt version can be loaded fresh. See
//! [`PluginHost`] for the full lifecycle.

mod error;
mod host;
mod plugin;
mod watcher;

pub use error::{PluginError, PluginResult};
pub use host::{PluginHost, PluginHostConfig};
pub use plugin::{CreatePluginFn, Plugin, CREATE_SYMBOL};
pub use watcher::{ChangeKind, DirectoryWatcher, PathChange};
