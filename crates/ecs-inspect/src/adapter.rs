//! Read-only world snapshots and dynamic-invoke endpoints (base spec §6).
//!
//! `InspectAdapter` borrows the world (and, for writes, borrows it
//! mutably) per call; it holds no state of its own beyond the
//! [`InspectRegistry`] of service method tables, matching "the ECS core
//! consumes [the inspection adapter] only through ... an optional
//! inspection adapter that reads world snapshots" (base spec §1).

use crucible_core::{Entity, ParamMap, World};

use crate::error::{InspectError, InspectResult};
use crate::methods::InspectRegistry;
use crate::snapshot::{
    ComponentSnapshot, ComponentTypeSummary, PluginDetail, PluginSummary, ServiceSummary, SystemSummary, WorldStatus,
};

pub struct InspectAdapter {
    registry: InspectRegistry,
}

impl InspectAdapter {
    pub fn new(registry: InspectRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &InspectRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut InspectRegistry {
        &mut self.registry
    }

    pub fn world_status(&self, world: &World) -> WorldStatus {
        WorldStatus {
            max_entities: world.max_entities(),
            recycled_count: world.recycled_count(),
            system_count: world.system_count(),
            component_type_count: world.component_type_count(),
            service_count: world.service_count(),
            tick_count: world.tick_count(),
            paused: world.is_paused(),
        }
    }

    pub fn plugins(&self, world: &World) -> Vec<PluginSummary> {
        world.plugins().map(plugin_summary).collect()
    }

    pub fn plugin_detail(&self, world: &World, prefix: &str) -> InspectResult<PluginDetail> {
        let meta = world.plugin(prefix).ok_or_else(|| InspectError::PluginNotFound(prefix.to_string()))?;
        let owner = crucible_core::PluginId::new(prefix);
        Ok(PluginDetail {
            summary: plugin_summary(meta),
            provided_systems: world.systems_owned_by(&owner),
            provided_services: world.services_owned_by(&owner).into_iter().map(str::to_string).collect(),
            provided_components: world.components_owned_by(&owner).into_iter().map(str::to_string).collect(),
        })
    }

    pub fn systems(&self, world: &World) -> Vec<SystemSummary> {
        world
            .systems()
            .into_iter()
            .map(|(name, enabled, owner)| SystemSummary { name, enabled, plugin_owner: owner.map(|id| id.to_string()) })
            .collect()
    }

    pub fn component_types(&self, world: &World) -> Vec<ComponentTypeSummary> {
        world
            .component_type_names()
            .into_iter()
            .map(|(type_id, name)| ComponentTypeSummary {
                type_name: name.to_string(),
                plugin_owner: world.component_owner_of(type_id).map(|id| id.to_string()),
            })
            .collect()
    }

    pub fn services(&self, world: &World) -> Vec<ServiceSummary> {
        world
            .services_all()
            .into_iter()
            .map(|(type_name, owner)| ServiceSummary {
                type_name: type_name.to_string(),
                methods: self.registry.service_by_name(type_name).map(|vt| vt.method_names()).unwrap_or_default(),
                plugin_owner: owner.map(|id| id.to_string()),
            })
            .collect()
    }

    /// Every registered (typed or dynamic) component present on `entity`.
    pub fn entity_components(&self, world: &World, entity: Entity) -> Vec<ComponentSnapshot> {
        let mut snapshots = Vec::new();
        for (type_id, type_name) in world.component_type_names() {
            if let Some(vtable) = world.component_vtable(type_name) {
                if let Some(data) = (vtable.snapshot)(world, entity) {
                    snapshots.push(ComponentSnapshot {
                        type_name: type_name.to_string(),
                        data,
                        plugin_owner: world.component_owner_of(type_id).map(|id| id.to_string()),
                        is_dynamic: false,
                    });
                }
            }
        }
        for (name, value) in world.dynamic_components(entity) {
            snapshots.push(ComponentSnapshot {
                type_name: name.to_string(),
                data: value.clone(),
                plugin_owner: None,
                is_dynamic: true,
            });
        }
        snapshots
    }

    /// Sets a component on `entity` from a structured `{type name, data}`
    /// payload, via the vtable captured at registration time rather than
    /// any runtime type scan (base spec §9's redesign note).
    pub fn set_component(&self, world: &mut World, entity: Entity, type_name: &str, data: serde_json::Value) -> InspectResult<()> {
        let vtable =
            world.component_vtable(type_name).ok_or_else(|| InspectError::UnknownComponentType(type_name.to_string()))?;
        let set_from_json = vtable.set_from_json;
        set_from_json(world, entity, data).map_err(InspectError::DeserializationFailed)
    }

    pub fn remove_component(&self, world: &mut World, entity: Entity, type_name: &str) -> InspectResult<()> {
        let remove = world
            .component_vtable(type_name)
            .map(|vtable| vtable.remove)
            .ok_or_else(|| InspectError::UnknownComponentType(type_name.to_string()))?;
        remove(world, entity);
        Ok(())
    }

    pub fn invoke_service_method(
        &self,
        world: &mut World,
        type_name: &str,
        method: &str,
        params: &ParamMap,
    ) -> InspectResult<serde_json::Value> {
        self.registry.invoke_by_name(world, type_name, method, params)
    }
}

fn plugin_summary(meta: &crucible_core::PluginMetadata) -> PluginSummary {
    PluginSummary {
        name: meta.name.clone(),
        version: meta.version.clone(),
        author: meta.author.clone(),
        description: meta.description.clone(),
        prefix: meta.prefix.clone(),
        url: format!("/plugins/{}", meta.prefix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crucible_core::{PluginMetadata, WorldConfig};

    #[derive(Clone, serde::Serialize, serde::Deserialize, PartialEq, Debug)]
    struct Health(u32);

    fn world_with_plugin() -> (World, crucible_core::PluginId) {
        let mut world = World::new(WorldConfig::default());
        let owner = crucible_core::PluginId::new("combat");
        world
            .register_plugin(PluginMetadata {
                name: "Combat".into(),
                version: "1.0.0".into(),
                author: "me".into(),
                description: "desc".into(),
                prefix: "combat".into(),
            })
            .unwrap();
        world.register_component_owner::<Health>(owner.clone());
        (world, owner)
    }

    #[test]
    fn world_status_reports_counts() {
        let adapter = InspectAdapter::new(InspectRegistry::new());
        let mut world = World::new(WorldConfig { max_entities: 10 });
        world.create_entity().unwrap();
        let status = adapter.world_status(&world);
        assert_eq!(status.max_entities, 10);
        assert_eq!(status.recycled_count, 0);
    }

    #[test]
    fn plugin_detail_lists_owned_components() {
        let adapter = InspectAdapter::new(InspectRegistry::new());
        let (world, _owner) = world_with_plugin();
        let detail = adapter.plugin_detail(&world, "combat").unwrap();
        assert_eq!(detail.provided_components, vec![std::any::type_name::<Health>()]);
        assert_eq!(detail.summary.url, "/plugins/combat");
    }

    #[test]
    fn plugin_detail_for_unknown_prefix_errors() {
        let adapter = InspectAdapter::new(InspectRegistry::new());
        let world = World::new(WorldConfig::default());
        assert!(adapter.plugin_detail(&world, "ghost").is_err());
    }

    #[test]
    fn set_then_snapshot_then_remove_component_round_trips() {
        let adapter = InspectAdapter::new(InspectRegistry::new());
        let (mut world, _owner) = world_with_plugin();
        let entity = world.create_entity().unwrap();

        adapter.set_component(&mut world, entity, std::any::type_name::<Health>(), serde_json::json!(7)).unwrap();
        let snapshots = adapter.entity_components(&world, entity);
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].data, serde_json::json!(7));
        assert!(!snapshots[0].is_dynamic);

        adapter.remove_component(&mut world, entity, std::any::type_name::<Health>()).unwrap();
        assert!(adapter.entity_components(&world, entity).is_empty());
    }

    #[test]
    fn set_unknown_component_type_errors() {
        let adapter = InspectAdapter::new(InspectRegistry::new());
        let mut world = World::new(WorldConfig::default());
        let entity = world.create_entity().unwrap();
        let err = adapter.set_component(&mut world, entity, "nonexistent::Type", serde_json::json!(1)).unwrap_err();
        assert_eq!(err, InspectError::UnknownComponentType("nonexistent::Type".to_string()));
    }

    #[test]
    fn dynamic_component_is_reported_as_dynamic() {
        let adapter = InspectAdapter::new(InspectRegistry::new());
        let mut world = World::new(WorldConfig::default());
        let entity = world.create_entity().unwrap();
        world.set_dynamic_component(entity, "custom_tag", serde_json::json!("x")).unwrap();
        let snapshots = adapter.entity_components(&world, entity);
        assert_eq!(snapshots.len(), 1);
        assert!(snapshots[0].is_dynamic);
    }
}
