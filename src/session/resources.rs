use crate::model::flow::Flow;
use crate::shared::ids::ResourceId;
use serde_json::Value;
use std::collections::BTreeMap;

/// Session-scoped store of externally supplied resources. Values are
/// opaque to this layer; validating their content is a collaborator's
/// concern. Owned by exactly one session, never shared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceStore {
    values: BTreeMap<ResourceId, Value>,
}

impl ResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites. Idempotent; re-adding a satisfied id
    /// changes nothing observable through `missing`.
    pub fn put(&mut self, id: ResourceId, value: Value) {
        self.values.insert(id, value);
    }

    pub fn get(&self, id: &str) -> Option<&Value> {
        self.values.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.values.contains_key(id)
    }

    /// The flow's required resources not yet present in the store, in
    /// the flow's declared order. Empty means ready.
    pub fn missing(&self, flow: &Flow) -> Vec<ResourceId> {
        flow.required_resources
            .iter()
            .filter(|id| !self.contains(id.as_str()))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}
