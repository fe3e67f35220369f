use crate::step::{Step, StepGraph, StepId};

/// Steps that can be started now: not yet completed, with every known
/// prerequisite completed. Dependency ids with no matching step do not
/// block.
pub fn available_steps(graph: &StepGraph) -> Vec<&Step> {
    graph
        .steps()
        .filter(|step| !step.completed)
        .filter(|step| {
            step.dependencies.iter().all(|dep| {
                graph
                    .get_step(dep)
                    .is_none_or(|prerequisite| prerequisite.completed)
            })
        })
        .collect()
}

/// The incomplete direct prerequisites of a step.
pub fn blocking_steps<'a>(graph: &'a StepGraph, id: &StepId) -> Vec<&'a Step> {
    let Some(step) = graph.get_step(id) else {
        return Vec::new();
    };

    step.dependencies
        .iter()
        .filter_map(|dep| graph.get_step(dep))
        .filter(|prerequisite| !prerequisite.completed)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{make_step, make_step_with_deps};

    #[test]
    fn test_step_without_dependencies_is_available() {
        let mut graph = StepGraph::new();
        graph.add_step(make_step("a", "A"));

        let available = available_steps(&graph);
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].id.as_str(), "a");
    }

    #[test]
    fn test_step_with_incomplete_dependency_is_not_available() {
        let mut graph = StepGraph::new();
        graph.add_step(make_step("a", "A"));
        graph.add_step(make_step_with_deps("b", "B", &["a"]));

        let ids: Vec<&str> = available_steps(&graph).iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);
    }

    #[test]
    fn test_completed_dependency_unblocks() {
        let mut graph = StepGraph::new();
        let mut a = make_step("a", "A");
        a.completed = true;
        graph.add_step(a);
        graph.add_step(make_step_with_deps("b", "B", &["a"]));

        let ids: Vec<&str> = available_steps(&graph).iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["b"]);
    }

    #[test]
    fn test_completed_steps_are_not_available() {
        let mut graph = StepGraph::new();
        let mut a = make_step("a", "A");
        a.completed = true;
        graph.add_step(a);

        assert!(available_steps(&graph).is_empty());
    }

    #[test]
    fn test_missing_dependency_does_not_block() {
        let mut graph = StepGraph::new();
        graph.add_step(make_step_with_deps("a", "A", &["ghost"]));

        let ids: Vec<&str> = available_steps(&graph).iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);
    }

    #[test]
    fn test_blocking_steps_lists_incomplete_prerequisites() {
        let mut graph = StepGraph::new();
        let mut done = make_step("done", "Done");
        done.completed = true;
        graph.add_step(done);
        graph.add_step(make_step("open", "Open"));
        graph.add_step(make_step_with_deps("top", "Top", &["done", "open", "ghost"]));

        let ids: Vec<&str> = blocking_steps(&graph, &StepId::from("top"))
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(ids, vec!["open"]);
    }

    #[test]
    fn test_blocking_steps_for_unknown_id_is_empty() {
        let graph = StepGraph::new();
        assert!(blocking_steps(&graph, &StepId::from("nope")).is_empty());
    }
}
