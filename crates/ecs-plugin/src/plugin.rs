//! The plugin trait and the C-style entry points a plugin `cdylib` exports.
//!
//! Grounded in the teacher's `core/plugin/src/trait.rs`: a plugin is a boxed
//! trait object produced by an `unsafe extern "C" fn() -> *mut dyn Plugin`
//! symbol. `dyn Plugin` is not a C-ABI type, which is why the teacher
//! annotates this with `#![allow(improper_ctypes_definitions)]` rather than
//! flattening the vtable by hand — the call never crosses an actual C
//! boundary, only a dylib one within the same Rust compiler.

#![allow(improper_ctypes_definitions)]

use crucible_core::{PluginMetadata, World};

/// The symbol every plugin `cdylib` must export to produce its instance.
pub const CREATE_SYMBOL: &[u8] = b"crucible_plugin_create\0";

/// A hot-reloadable unit of world extension.
///
/// `initialize` is expected to call `world.register_plugin`, then register
/// every system/service/component type the plugin owns (base spec §4.7).
/// `uninitialize` is the inverse, in reverse order; the host calls it and
/// then drops the plugin and its library regardless of whether it
/// succeeded (base spec §4.7 "Unload").
pub trait Plugin: 'static {
    fn metadata(&self) -> PluginMetadata;

    fn initialize(&mut self, world: &mut World) -> Result<(), String>;

    fn uninitialize(&mut self, world: &mut World);
}

/// Signature of the `crucible_plugin_create` symbol a plugin `cdylib` must
/// export. Instantiable without arguments, per the base spec's plugin
/// interface (§6). Returns an owned `Box` directly, matching how the
/// teacher's actual plugin crates export `create_plugin` (its own
/// `core/plugin` trait module declares a raw-pointer signature that none of
/// its plugins use in practice; this follows the one the plugins do).
pub type CreatePluginFn = unsafe extern "C" fn() -> Box<dyn Plugin>;

/// Declares the `crucible_plugin_create` export for a plugin crate. Used in
/// `demos/sample-plugin`.
#[macro_export]
macro_rules! export_plugin {
    ($make:expr) => {
        #[no_mangle]
        pub extern "C" fn crucible_plugin_create() -> Box<dyn $crate::Plugin> {
            Box::new($make)
        }
    };
}
