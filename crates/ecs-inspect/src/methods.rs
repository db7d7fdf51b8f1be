//! Reflection-free service method dispatch for the dynamic-invoke adapter.
//!
//! Per the base spec's redesign note (§9): "services register method
//! handlers explicitly in a `name -> fn(param_map) -> result` map; the
//! world never scans types." `crucible-core` has no notion of this table —
//! it is purely an inspection-side concern, registered by whoever wires up
//! the adapter, parallel to how [`crucible_core::ComponentVTable`] is a
//! vtable captured at registration time rather than a runtime type scan.

use std::any::TypeId;
use std::collections::HashMap;

use indexmap::IndexMap;

use crucible_core::{ParamMap, World};

use crate::error::{InspectError, InspectResult};

/// One named parameter a method declares, with an optional default used
/// when the caller omits it (base spec §6: "missing params use declared
/// defaults, otherwise `MissingParameter`").
pub struct ParamSpec {
    pub name: &'static str,
    pub default: Option<serde_json::Value>,
}

impl ParamSpec {
    pub fn required(name: &'static str) -> Self {
        Self { name, default: None }
    }

    pub fn with_default(name: &'static str, default: serde_json::Value) -> Self {
        Self { name, default: Some(default) }
    }
}

type MethodHandler = Box<dyn Fn(&mut World, &ParamMap) -> InspectResult<serde_json::Value> + Send + Sync>;

/// One dynamically invocable method on a service type.
pub struct ServiceMethod {
    name: &'static str,
    params: Vec<ParamSpec>,
    handler: MethodHandler,
}

impl ServiceMethod {
    pub fn new<F>(name: &'static str, params: Vec<ParamSpec>, handler: F) -> Self
    where
        F: Fn(&mut World, &ParamMap) -> InspectResult<serde_json::Value> + Send + Sync + 'static,
    {
        Self { name, params, handler: Box::new(handler) }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Matches `provided` against this method's declared parameters
    /// case-insensitively, filling in defaults for anything omitted, then
    /// invokes the handler with the resolved map.
    fn invoke(&self, world: &mut World, provided: &ParamMap) -> InspectResult<serde_json::Value> {
        let lower: HashMap<String, &serde_json::Value> =
            provided.iter().map(|(k, v)| (k.to_lowercase(), v)).collect();

        let mut resolved = ParamMap::new();
        for spec in &self.params {
            if let Some(value) = lower.get(&spec.name.to_lowercase()) {
                resolved.insert(spec.name.to_string(), (*value).clone());
            } else if let Some(default) = &spec.default {
                resolved.insert(spec.name.to_string(), default.clone());
            } else {
                return Err(InspectError::MissingParameter(spec.name.to_string()));
            }
        }

        (self.handler)(world, &resolved)
    }
}

/// Every dynamically invocable method for one service type.
pub struct ServiceVTable {
    pub type_name: &'static str,
    methods: IndexMap<&'static str, ServiceMethod>,
}

impl ServiceVTable {
    pub fn method_names(&self) -> Vec<String> {
        self.methods.keys().map(|name| name.to_string()).collect()
    }
}

/// Registry of service method tables, keyed by the service's `TypeId` so
/// registration stays statically typed (`register::<ClockService>(...)`)
/// while lookup by the adapter — which only has a runtime type-name string
/// from a caller — goes through [`InspectRegistry::service_by_name`].
#[derive(Default)]
pub struct InspectRegistry {
    services: HashMap<TypeId, ServiceVTable>,
}

impl InspectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_service<T: 'static>(&mut self, methods: Vec<ServiceMethod>) {
        let type_name = std::any::type_name::<T>();
        let methods = methods.into_iter().map(|m| (m.name, m)).collect();
        self.services.insert(TypeId::of::<T>(), ServiceVTable { type_name, methods });
    }

    pub fn service(&self, type_id: TypeId) -> Option<&ServiceVTable> {
        self.services.get(&type_id)
    }

    pub fn service_by_name(&self, type_name: &str) -> Option<&ServiceVTable> {
        self.services.values().find(|vt| vt.type_name == type_name)
    }

    pub fn invoke_by_name(
        &self,
        world: &mut World,
        type_name: &str,
        method: &str,
        params: &ParamMap,
    ) -> InspectResult<serde_json::Value> {
        let vtable = self
            .service_by_name(type_name)
            .ok_or_else(|| InspectError::UnknownServiceType(type_name.to_string()))?;
        let handler = vtable.methods.get(method).ok_or_else(|| InspectError::UnknownMethod {
            service: type_name.to_string(),
            method: method.to_string(),
        })?;
        handler.invoke(world, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crucible_core::WorldConfig;

    struct Clock {
        ticks: u32,
    }

    #[test]
    fn default_fills_in_when_param_omitted() {
        let mut registry = InspectRegistry::new();
        registry.register_service::<Clock>(vec![ServiceMethod::new(
            "advance",
            vec![ParamSpec::with_default("by", serde_json::json!(1))],
            |world, params| {
                let by = params["by"].as_u64().unwrap() as u32;
                let clock = world.get_service_mut::<Clock>().map_err(InspectError::World)?;
                clock.ticks += by;
                Ok(serde_json::json!(clock.ticks))
            },
        )]);

        let mut world = World::new(WorldConfig::default());
        world.register_service(Clock { ticks: 0 }, None);

        let result = registry.invoke_by_name(&mut world, std::any::type_name::<Clock>(), "advance", &ParamMap::new());
        assert_eq!(result.unwrap(), serde_json::json!(1));
    }

    #[test]
    fn params_match_case_insensitively() {
        let mut registry = InspectRegistry::new();
        registry.register_service::<Clock>(vec![ServiceMethod::new(
            "advance",
            vec![ParamSpec::required("by")],
            |world, params| {
                let by = params["by"].as_u64().unwrap() as u32;
                let clock = world.get_service_mut::<Clock>().map_err(InspectError::World)?;
                clock.ticks += by;
                Ok(serde_json::json!(clock.ticks))
            },
        )]);

        let mut world = World::new(WorldConfig::default());
        world.register_service(Clock { ticks: 10 }, None);

        let mut params = ParamMap::new();
        params.insert("BY".to_string(), serde_json::json!(5));
        let result = registry.invoke_by_name(&mut world, std::any::type_name::<Clock>(), "advance", &params);
        assert_eq!(result.unwrap(), serde_json::json!(15));
    }

    #[test]
    fn missing_required_param_without_default_errors() {
        let mut registry = InspectRegistry::new();
        registry.register_service::<Clock>(vec![ServiceMethod::new(
            "advance",
            vec![ParamSpec::required("by")],
            |_world, params| Ok(params["by"].clone()),
        )]);
        let mut world = World::new(WorldConfig::default());
        world.register_service(Clock { ticks: 0 }, None);

        let err = registry
            .invoke_by_name(&mut world, std::any::type_name::<Clock>(), "advance", &ParamMap::new())
            .unwrap_err();
        assert_eq!(err, InspectError::MissingParameter("by".to_string()));
    }

    #[test]
    fn unknown_method_is_reported() {
        let mut registry = InspectRegistry::new();
        registry.register_service::<Clock>(vec![]);
        let mut world = World::new(WorldConfig::default());
        world.register_service(Clock { ticks: 0 }, None);

        let err = registry
            .invoke_by_name(&mut world, std::any::type_name::<Clock>(), "ghost", &ParamMap::new())
            .unwrap_err();
        assert_eq!(
            err,
            InspectError::UnknownMethod { service: std::any::type_name::<Clock>().to_string(), method: "ghost".to_string() }
        );
    }
}
