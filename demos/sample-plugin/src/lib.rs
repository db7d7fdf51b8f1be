//! Sample plugin for the demo runtime (base spec §10): a `Health`
//! component, a `ClockService`, and a system that regenerates health over
//! time. Built as a `cdylib` so `demos/runtime` can hot-load it, and as an
//! `rlib` so its own tests can exercise the `Plugin` impl directly.

use std::any::Any;

use crucible_core::{PluginId, PluginMetadata, System, World, WorldResult};
use crucible_plugin::{export_plugin, Plugin};

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

/// Tracks how many ticks this plugin instance has run, mostly so the demo
/// runtime has something visible to poke through the inspection adapter.
pub struct ClockService {
    pub ticks_seen: u64,
}

pub struct HealthRegenSystem {
    pub per_second: f32,
}

impl System for HealthRegenSystem {
    fn name(&self) -> &str {
        "combat.health_regen"
    }

    fn update(&mut self, world: &mut World, dt: f32) {
        if let Ok(clock) = world.get_service_mut::<ClockService>() {
            clock.ticks_seen += 1;
        }
        for e in world.query::<(Health,)>() {
            if let Ok(health) = world.get_component_mut::<Health>(e) {
                health.current = (health.current + self.per_second * dt).min(health.max);
            }
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Default)]
pub struct CombatPlugin;

impl CombatPlugin {
    fn owner(&self) -> PluginId {
        PluginId::new("combat")
    }
}

impl Plugin for CombatPlugin {
    fn metadata(&self) -> PluginMetadata {
        PluginMetadata {
            name: "Combat".to_string(),
            version: "0.1.0".to_string(),
            author: "Crucible Contributors".to_string(),
            description: "Health regeneration over time".to_string(),
            prefix: "combat".to_string(),
        }
    }

    fn initialize(&mut self, world: &mut World) -> Result<(), String> {
        world.register_plugin(self.metadata()).map_err(|err| err.to_string())?;
        world.register_component_owner::<Health>(self.owner());
        world.register_service(ClockService { ticks_seen: 0 }, Some(self.owner()));
        world
            .register_system(Box::new(HealthRegenSystem { per_second: 1.0 }), Some(self.owner()))
            .map_err(|err| err.to_string())?;
        tracing::info!("combat plugin initialized");
        Ok(())
    }

    fn uninitialize(&mut self, world: &mut World) {
        world.remove_system_by_type::<HealthRegenSystem>();
        world.unregister_service::<ClockService>();
        world.unregister_plugin("combat");
        tracing::info!("combat plugin uninitialized");
    }
}

export_plugin!(CombatPlugin::default());

/// Entity-scoped helper the demo runtime uses to seed a combatant; not part
/// of the `Plugin` contract.
pub fn spawn_combatant(world: &mut World, max_health: f32) -> WorldResult<crucible_core::Entity> {
    let e = world.create_entity()?;
    world.set_component(e, Health { current: max_health * 0.5, max: max_health })?;
    Ok(e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crucible_core::WorldConfig;

    #[test]
    fn initialize_registers_everything_and_uninitialize_reverses_it() {
        let mut world = World::new(WorldConfig::default());
        let mut plugin = CombatPlugin::default();

        plugin.initialize(&mut world).unwrap();
        assert!(world.plugin("combat").is_some());
        assert_eq!(world.system_count(), 1);
        assert!(world.get_service::<ClockService>().is_ok());

        plugin.uninitialize(&mut world);
        assert!(world.plugin("combat").is_none());
        assert_eq!(world.system_count(), 0);
        assert!(world.get_service::<ClockService>().is_err());
    }

    #[test]
    fn health_regen_system_heals_toward_max_without_overshoot() {
        let mut world = World::new(WorldConfig::default());
        let mut plugin = CombatPlugin::default();
        plugin.initialize(&mut world).unwrap();

        let e = spawn_combatant(&mut world, 100.0).unwrap();
        for _ in 0..1000 {
            world.tick(1.0).unwrap();
        }

        let health = world.get_component::<Health>(e).unwrap();
        assert_eq!(health.current, 100.0);
    }
}
