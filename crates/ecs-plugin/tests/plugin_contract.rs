//! Exercises the `Plugin::initialize`/`uninitialize` contract (base spec
//! §4.7) against an in-process fake instead of a real `cdylib`, per the
//! test-tooling plan in SPEC_FULL.md §2d: building and loading an actual
//! `.so` isn't reachable without a working toolchain invocation here.

use crucible_core::{Group, PluginId, PluginMetadata, System, World, WorldConfig};
use crucible_plugin::Plugin;
use std::any::Any;

#[derive(Clone, serde::Serialize, serde::Deserialize)]
struct Health(u32);

struct ClockService {
    ticks: u32,
}

struct HealthRegenSystem;

impl System for HealthRegenSystem {
    fn name(&self) -> &str {
        "combat.health_regen"
    }

    fn group(&self) -> Group {
        Group::Simulation
    }

    fn update(&mut self, world: &mut World, _dt: f32) {
        let _ = world.get_service::<ClockService>();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct CombatPlugin {
    prefix: PluginId,
}

impl CombatPlugin {
    fn new() -> Self {
        Self { prefix: PluginId::new("combat") }
    }
}

impl Plugin for CombatPlugin {
    fn metadata(&self) -> PluginMetadata {
        PluginMetadata {
            name: "Combat".into(),
            version: "1.0.0".into(),
            author: "crucible-contributors".into(),
            description: "adds health and a regen system".into(),
            prefix: self.prefix.as_str().into(),
        }
    }

    fn initialize(&mut self, world: &mut World) -> Result<(), String> {
        world.register_plugin(self.metadata()).map_err(|err| err.to_string())?;
        world.register_system(Box::new(HealthRegenSystem), Some(self.prefix.clone())).map_err(|err| err.to_string())?;
        world.register_service(ClockService { ticks: 0 }, Some(self.prefix.clone()));
        world.register_component_owner::<Health>(self.prefix.clone());
        Ok(())
    }

    fn uninitialize(&mut self, world: &mut World) {
        for name in world.systems_owned_by(&self.prefix) {
            let _ = world.remove_system_by_name(&name);
        }
        world.unregister_service::<ClockService>();
        world.unregister_plugin(self.prefix.as_str());
    }
}

#[test]
fn initialize_registers_everything_uninitialize_reverses_it() {
    let mut world = World::new(WorldConfig::default());
    let mut plugin = CombatPlugin::new();

    plugin.initialize(&mut world).unwrap();
    assert!(world.plugin("combat").is_some());
    assert_eq!(world.system_count(), 1);
    assert!(world.get_service::<ClockService>().is_ok());

    world.tick(1.0 / 60.0).unwrap();

    plugin.uninitialize(&mut world);
    assert!(world.plugin("combat").is_none());
    assert_eq!(world.system_count(), 0);
    assert!(world.get_service::<ClockService>().is_err());
}

#[test]
fn reinitializing_after_uninitialize_does_not_collide_with_previous_instance() {
    let mut world = World::new(WorldConfig::default());
    let mut v1 = CombatPlugin::new();
    v1.initialize(&mut world).unwrap();
    v1.uninitialize(&mut world);

    let mut v2 = CombatPlugin::new();
    v2.initialize(&mut world).unwrap();
    assert_eq!(world.system_count(), 1);
    assert!(world.plugin("combat").is_some());
}
