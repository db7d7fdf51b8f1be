//! Manual verification steps for S6 (base spec §8) against a real on-disk
//! plugin, exercised by hand rather than in CI — building a second,
//! differently-versioned copy of `demos/sample-plugin` at test time is out
//! of scope for an automated suite (see SPEC_FULL.md §2d).
//!
//! 1. `cargo build -p crucible-demo-combat-plugin --release`
//! 2. Start `demos/runtime` pointed at a plugin directory, copy the built
//!    `libcombat_plugin.{so,dylib,dll}` into it.
//! 3. Observe (via tracing output) that `HealthRegenSystem` runs every tick.
//! 4. Bump `CombatPlugin::metadata().version`, rebuild, overwrite the file
//!    in place.
//! 5. Within one debounce window, observe an `unload` then `load` log pair
//!    and the new version reported by `World::plugin("combat")`.

#[test]
#[ignore = "requires building and swapping a real cdylib by hand; see module docs"]
fn hot_reload_swaps_plugin_version_on_overwrite() {
    unreachable!("manual verification only");
}
