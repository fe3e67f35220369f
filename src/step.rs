use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Opaque step identifier.
///
/// Callers may supply numeric or string identifiers; both deserialize into
/// the same opaque value and nothing downstream inspects the shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct StepId(String);

impl StepId {
    pub fn new(id: impl Into<String>) -> Self {
        StepId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StepId {
    fn from(id: &str) -> Self {
        StepId(id.to_string())
    }
}

impl From<String> for StepId {
    fn from(id: String) -> Self {
        StepId(id)
    }
}

impl From<u64> for StepId {
    fn from(id: u64) -> Self {
        StepId(id.to_string())
    }
}

impl<'de> Deserialize<'de> for StepId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct StepIdVisitor;

        impl Visitor<'_> for StepIdVisitor {
            type Value = StepId;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a string or integer step id")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<StepId, E> {
                Ok(StepId(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<StepId, E> {
                Ok(StepId(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<StepId, E> {
                Ok(StepId(v.to_string()))
            }
        }

        deserializer.deserialize_any(StepIdVisitor)
    }
}

/// A step: a unit of work with optional prerequisite steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub id: StepId,
    pub title: String,
    /// Detailed description of the step (body, acceptance criteria, etc.)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub completed: bool,
    /// Steps that must be completed before this one can start
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<StepId>,
    /// Timestamp when the step was created (ISO 8601 / RFC 3339)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Timestamp when the step was marked complete (ISO 8601 / RFC 3339)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
}

fn is_false(val: &bool) -> bool {
    !*val
}

/// The step graph: an id-keyed collection of steps.
///
/// Iteration follows insertion order, which keeps every downstream
/// computation (including layout) deterministic for a given store.
#[derive(Debug, Clone, Default)]
pub struct StepGraph {
    order: Vec<StepId>,
    steps: HashMap<StepId, Step>,
}

impl StepGraph {
    pub fn new() -> Self {
        Self {
            order: Vec::new(),
            steps: HashMap::new(),
        }
    }

    /// Insert a step. Re-adding an existing id replaces the step in place,
    /// keeping its original position.
    pub fn add_step(&mut self, step: Step) {
        let id = step.id.clone();
        if self.steps.insert(id.clone(), step).is_none() {
            self.order.push(id);
        }
    }

    pub fn get_step(&self, id: &StepId) -> Option<&Step> {
        self.steps.get(id)
    }

    pub fn get_step_mut(&mut self, id: &StepId) -> Option<&mut Step> {
        self.steps.get_mut(id)
    }

    pub fn remove_step(&mut self, id: &StepId) -> Option<Step> {
        let removed = self.steps.remove(id);
        if removed.is_some() {
            self.order.retain(|existing| existing != id);
        }
        removed
    }

    pub fn contains(&self, id: &StepId) -> bool {
        self.steps.contains_key(id)
    }

    /// Iterate steps in insertion order.
    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.order.iter().filter_map(|id| self.steps.get(id))
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::make_step;

    #[test]
    fn test_stepgraph_new_is_empty() {
        let graph = StepGraph::new();
        assert!(graph.is_empty());
        assert_eq!(graph.len(), 0);
    }

    #[test]
    fn test_add_and_get_step() {
        let mut graph = StepGraph::new();
        graph.add_step(make_step("paint", "Paint the shed"));

        assert_eq!(graph.len(), 1);
        let retrieved = graph.get_step(&StepId::from("paint")).unwrap();
        assert_eq!(retrieved.title, "Paint the shed");
    }

    #[test]
    fn test_get_nonexistent_returns_none() {
        let graph = StepGraph::new();
        assert!(graph.get_step(&StepId::from("nonexistent")).is_none());
    }

    #[test]
    fn test_remove_step() {
        let mut graph = StepGraph::new();
        graph.add_step(make_step("s1", "Step 1"));
        assert_eq!(graph.len(), 1);

        let removed = graph.remove_step(&StepId::from("s1"));
        assert!(removed.is_some());
        assert!(graph.is_empty());
    }

    #[test]
    fn test_steps_iterate_in_insertion_order() {
        let mut graph = StepGraph::new();
        graph.add_step(make_step("c", "Third"));
        graph.add_step(make_step("a", "First"));
        graph.add_step(make_step("b", "Second"));

        let ids: Vec<&str> = graph.steps().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_readd_replaces_in_place() {
        let mut graph = StepGraph::new();
        graph.add_step(make_step("a", "Old title"));
        graph.add_step(make_step("b", "Other"));
        graph.add_step(make_step("a", "New title"));

        assert_eq!(graph.len(), 2);
        let ids: Vec<&str> = graph.steps().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(graph.get_step(&StepId::from("a")).unwrap().title, "New title");
    }

    #[test]
    fn test_step_id_deserializes_from_string() {
        let id: StepId = serde_json::from_str("\"design\"").unwrap();
        assert_eq!(id, StepId::from("design"));
    }

    #[test]
    fn test_step_id_deserializes_from_number() {
        let id: StepId = serde_json::from_str("42").unwrap();
        assert_eq!(id, StepId::from("42"));
    }

    #[test]
    fn test_step_id_serializes_as_string() {
        let json = serde_json::to_string(&StepId::from(7u64)).unwrap();
        assert_eq!(json, "\"7\"");
    }

    #[test]
    fn test_step_deserialization_with_numeric_ids() {
        let json = r#"{"id":1,"title":"Test","dependencies":[2,"three"]}"#;
        let step: Step = serde_json::from_str(json).unwrap();
        assert_eq!(step.id, StepId::from("1"));
        assert_eq!(
            step.dependencies,
            vec![StepId::from("2"), StepId::from("three")]
        );
        assert!(!step.completed);
    }

    #[test]
    fn test_step_serialization_omits_empty_fields() {
        let step = make_step("s1", "Test step");
        let json = serde_json::to_string(&step).unwrap();
        assert!(!json.contains("description"));
        assert!(!json.contains("dependencies"));
        assert!(!json.contains("completed"));
        assert!(!json.contains("created_at"));
    }

    #[test]
    fn test_step_roundtrip() {
        let mut step = make_step("deploy", "Deploy to prod");
        step.description = Some("After signoff".to_string());
        step.completed = true;
        step.dependencies = vec![StepId::from("build"), StepId::from("review")];
        step.completed_at = Some("2024-03-01T10:00:00Z".to_string());

        let json = serde_json::to_string(&step).unwrap();
        let back: Step = serde_json::from_str(&json).unwrap();
        assert_eq!(back, step);
    }
}
