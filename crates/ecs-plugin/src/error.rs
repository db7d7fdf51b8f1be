//! Error taxonomy for the plugin host.

use std::path::PathBuf;

use thiserror::Error;

pub type PluginResult<T> = Result<T, PluginError>;

#[derive(Error, Debug)]
pub enum PluginError {
    #[error("failed to load plugin at {path}: {reason}")]
    LoadFailed { path: PathBuf, reason: String },

    #[error("no plugin loaded from {0}")]
    NotFound(PathBuf),

    #[error("a plugin is already loaded from {0}")]
    AlreadyLoaded(PathBuf),

    #[error("uninitialize failed for plugin at {path}: {reason}")]
    UninitFailed { path: PathBuf, reason: String },

    #[error("io error watching {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("file watcher error: {0}")]
    Watch(#[from] notify::Error),
}
