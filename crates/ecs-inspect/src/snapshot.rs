//! Read-only data shapes the inspection adapter hands back (base spec §6).
//!
//! These are plain serializable structs, not a transport — whoever bolts a
//! REST layer onto a [`crate::InspectAdapter`] owns the HTTP framing; this
//! module only fixes what goes in the response body.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct WorldStatus {
    pub max_entities: u32,
    pub recycled_count: usize,
    pub system_count: usize,
    pub component_type_count: usize,
    pub service_count: usize,
    pub tick_count: u64,
    pub paused: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PluginSummary {
    pub name: String,
    pub version: String,
    pub author: String,
    pub description: String,
    pub prefix: String,
    /// Derived from `prefix`; the inspection adapter fixes only this data
    /// shape, not the routing that would make the URL resolvable (§6).
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PluginDetail {
    #[serde(flatten)]
    pub summary: PluginSummary,
    pub provided_systems: Vec<String>,
    pub provided_services: Vec<String>,
    pub provided_components: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemSummary {
    pub name: String,
    pub enabled: bool,
    pub plugin_owner: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComponentTypeSummary {
    pub type_name: String,
    pub plugin_owner: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComponentSnapshot {
    pub type_name: String,
    pub data: serde_json::Value,
    pub plugin_owner: Option<String>,
    pub is_dynamic: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceSummary {
    pub type_name: String,
    pub methods: Vec<String>,
    pub plugin_owner: Option<String>,
}
