//! Explicit inheritance graph for deduplicated resolution.
//!
//! Nodes are the calendars reachable from a root through `extends`; each
//! node's edges are its parents. Nodes are stored in post-order (parents in
//! `extends` order before the child), so iterating the graph yields a valid
//! merge order in which every calendar appears exactly once.

use almanac_core::{CalendarSpec, SpecRegistry};
use indexmap::IndexMap;

use crate::error::{EngineResult, ResolveError};

/// The `extends` graph reachable from one root calendar.
#[derive(Debug, Clone)]
pub struct InheritanceGraph<'r> {
    nodes: IndexMap<String, &'r CalendarSpec>,
}

impl<'r> InheritanceGraph<'r> {
    /// Builds the graph rooted at `root_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::NotFound`] for a missing calendar and
    /// [`ResolveError::CircularDependency`] when a calendar is reachable from
    /// itself.
    pub fn build<R: SpecRegistry>(registry: &'r R, root_id: &str) -> EngineResult<Self> {
        let mut nodes = IndexMap::new();
        let mut stack = Vec::new();
        visit(registry, root_id, &mut stack, &mut nodes)?;
        Ok(Self { nodes })
    }

    /// The root calendar (always the last node).
    pub fn root(&self) -> &'r CalendarSpec {
        // `build` always inserts the root last and never yields an empty graph.
        self.nodes[self.nodes.len() - 1]
    }

    /// Calendars in merge order, each once.
    pub fn topological_order(&self) -> impl Iterator<Item = &'r CalendarSpec> + '_ {
        self.nodes.values().copied()
    }

    /// Number of distinct calendars.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a built graph contains at least its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of `extends` edges between distinct calendars.
    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|spec| spec.extends.len()).sum()
    }
}

fn visit<'r, R: SpecRegistry>(
    registry: &'r R,
    id: &str,
    stack: &mut Vec<String>,
    nodes: &mut IndexMap<String, &'r CalendarSpec>,
) -> EngineResult<()> {
    if stack.iter().any(|on_stack| on_stack == id) {
        return Err(ResolveError::cycle(stack, id));
    }
    if nodes.contains_key(id) {
        return Ok(());
    }

    let calendar = registry
        .calendar(id)
        .ok_or_else(|| ResolveError::calendar_not_found(id))?;

    stack.push(id.to_string());
    for parent in &calendar.extends {
        visit(registry, parent, stack, nodes)?;
    }
    stack.pop();

    nodes.insert(id.to_string(), calendar);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use almanac_core::InMemoryRegistry;

    fn ids<'a>(graph: &'a InheritanceGraph<'_>) -> Vec<&'a str> {
        graph.topological_order().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn single_node() {
        let registry = InMemoryRegistry::new().with_calendar(CalendarSpec::new("solo"));
        let graph = InheritanceGraph::build(&registry, "solo").unwrap();
        assert_eq!(graph.len(), 1);
        assert!(!graph.is_empty());
        assert_eq!(graph.root().id, "solo");
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn diamond_visits_shared_ancestor_once() {
        let registry = InMemoryRegistry::new()
            .with_calendar(CalendarSpec::new("base"))
            .with_calendar(CalendarSpec::new("a").extending("base"))
            .with_calendar(CalendarSpec::new("b").extending("base"))
            .with_calendar(CalendarSpec::new("c").extending("a").extending("b"));

        let graph = InheritanceGraph::build(&registry, "c").unwrap();
        assert_eq!(ids(&graph), vec!["base", "a", "b", "c"]);
        assert_eq!(graph.edge_count(), 4);
        assert_eq!(graph.root().id, "c");
    }

    #[test]
    fn parents_precede_children_in_extends_order() {
        let registry = InMemoryRegistry::new()
            .with_calendar(CalendarSpec::new("g"))
            .with_calendar(CalendarSpec::new("p2").extending("g"))
            .with_calendar(CalendarSpec::new("p1"))
            .with_calendar(CalendarSpec::new("c").extending("p1").extending("p2"));

        let graph = InheritanceGraph::build(&registry, "c").unwrap();
        assert_eq!(ids(&graph), vec!["p1", "g", "p2", "c"]);
    }

    #[test]
    fn cycle_reports_stack() {
        let registry = InMemoryRegistry::new()
            .with_calendar(CalendarSpec::new("a").extending("b"))
            .with_calendar(CalendarSpec::new("b").extending("c"))
            .with_calendar(CalendarSpec::new("c").extending("a"));

        let err = InheritanceGraph::build(&registry, "a").unwrap_err();
        assert_eq!(err.to_string(), "circular dependency: a -> b -> c -> a");
    }

    #[test]
    fn missing_parent() {
        let registry =
            InMemoryRegistry::new().with_calendar(CalendarSpec::new("a").extending("ghost"));
        let err = InheritanceGraph::build(&registry, "a").unwrap_err();
        assert_eq!(err, ResolveError::calendar_not_found("ghost"));
    }
}
