//! The fixed enumeration of permissions the console recognizes.
//!
//! A catalog entry's `id` is the wire string itself (`"users:read"`); the
//! rest of the record is display metadata and plays no part in evaluation.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::authz::evaluator::{PermissionSet, WILDCARD_ACTION};

/// One catalog record: a resource-action pair plus display metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionDef {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub resource: String,
    pub action: String,
    pub created_at: DateTime<Utc>,
}

impl PermissionDef {
    pub fn new(resource: &str, action: &str, description: &str) -> Self {
        Self {
            id: format!("{resource}:{action}"),
            name: format!("{} {}", format_action_name(action), format_resource_name(resource)),
            description: Some(description.to_string()),
            resource: resource.to_string(),
            action: action.to_string(),
            created_at: Utc::now(),
        }
    }

    /// Whether this is the group's "every action" entry (`action == "all"`).
    pub fn is_wildcard(&self) -> bool {
        self.action == WILDCARD_ACTION
    }
}

/// Immutable permission catalog with id lookup and per-resource grouping.
#[derive(Debug, Clone)]
pub struct Catalog {
    defs: Vec<PermissionDef>,
    by_id: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(defs: Vec<PermissionDef>) -> Self {
        let mut by_id = HashMap::with_capacity(defs.len());
        for (i, def) in defs.iter().enumerate() {
            // First definition wins on duplicate ids.
            by_id.entry(def.id.clone()).or_insert(i);
        }
        Self { defs, by_id }
    }

    /// The console's built-in permission set.
    pub fn builtin() -> Self {
        let mut defs = Vec::new();
        for resource in ["users", "teams", "roles", "schedules"] {
            defs.push(PermissionDef::new(resource, "read", "View and list"));
            defs.push(PermissionDef::new(resource, "create", "Create new entries"));
            defs.push(PermissionDef::new(resource, "update", "Edit existing entries"));
            defs.push(PermissionDef::new(resource, "delete", "Remove entries"));
            defs.push(PermissionDef::new(resource, "all", "Every action on this resource"));
        }
        defs.push(PermissionDef::new("settings", "read", "View organization settings"));
        defs.push(PermissionDef::new("settings", "update", "Change organization settings"));
        defs.push(PermissionDef::new("settings", "all", "Every action on settings"));
        defs.push(PermissionDef::new("swaps", "approve", "Approve shift swap requests"));
        defs.push(PermissionDef::new("swaps", "reject", "Reject shift swap requests"));
        defs.push(PermissionDef::new("swaps", "all", "Every action on shift swaps"));
        // Personal schedule access has no wildcard entry on purpose.
        defs.push(PermissionDef::new("own_schedule", "view", "View own schedule"));
        defs.push(PermissionDef::new("own_schedule", "request", "Request changes to own schedule"));
        Self::new(defs)
    }

    pub fn get(&self, id: &str) -> Option<&PermissionDef> {
        self.by_id.get(id).map(|&i| &self.defs[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PermissionDef> {
        self.defs.iter()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Records grouped by resource, resources in sorted order.
    pub fn grouped(&self) -> BTreeMap<&str, Vec<&PermissionDef>> {
        let mut groups: BTreeMap<&str, Vec<&PermissionDef>> = BTreeMap::new();
        for def in &self.defs {
            groups.entry(def.resource.as_str()).or_default().push(def);
        }
        groups
    }

    /// The `resource:all` entry for a resource, if the catalog carries one.
    pub fn wildcard_for(&self, resource: &str) -> Option<&PermissionDef> {
        self.get(&format!("{resource}:{WILDCARD_ACTION}"))
    }

    /// All non-wildcard entries for a resource.
    pub fn individuals_for(&self, resource: &str) -> Vec<&PermissionDef> {
        self.defs
            .iter()
            .filter(|d| d.resource == resource && !d.is_wildcard())
            .collect()
    }
}

/// A named grouping of permissions, as the backend stores it. The core only
/// ever reads its permission list; create/rename/delete live upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: String,
    pub name: String,
    pub description: String,
    pub is_system: bool,
    pub is_default: bool,
    pub permissions: Vec<String>,
}

impl Role {
    pub fn permission_set(&self) -> PermissionSet {
        self.permissions.iter().cloned().collect()
    }
}

/// Display form of a resource name: capitalized, separators spaced out.
pub fn format_resource_name(resource: &str) -> String {
    capitalize(&resource.replace(['-', '_'], " "))
}

/// Display form of an action name.
pub fn format_action_name(action: &str) -> String {
    capitalize(action)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
