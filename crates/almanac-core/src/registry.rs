//! Specification registry seam.
//!
//! The engine never loads specifications itself. It reads them through
//! [`SpecRegistry`], implemented by whatever owns the loaded definitions.
//! [`InMemoryRegistry`] is the plain map-backed implementation used by
//! loaders and tests.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::spec::{CalendarSpec, ModuleSpec};

/// Read-only lookup of calendar and module specifications.
///
/// Absence is a valid answer; callers decide whether it is an error.
pub trait SpecRegistry {
    /// Returns the calendar with the given identifier.
    fn calendar(&self, id: &str) -> Option<&CalendarSpec>;

    /// Returns the module with the given identifier.
    fn module(&self, id: &str) -> Option<&ModuleSpec>;
}

impl<R: SpecRegistry + ?Sized> SpecRegistry for &R {
    fn calendar(&self, id: &str) -> Option<&CalendarSpec> {
        (**self).calendar(id)
    }

    fn module(&self, id: &str) -> Option<&ModuleSpec> {
        (**self).module(id)
    }
}

impl<R: SpecRegistry + ?Sized> SpecRegistry for Box<R> {
    fn calendar(&self, id: &str) -> Option<&CalendarSpec> {
        (**self).calendar(id)
    }

    fn module(&self, id: &str) -> Option<&ModuleSpec> {
        (**self).module(id)
    }
}

impl<R: SpecRegistry + ?Sized> SpecRegistry for Arc<R> {
    fn calendar(&self, id: &str) -> Option<&CalendarSpec> {
        (**self).calendar(id)
    }

    fn module(&self, id: &str) -> Option<&ModuleSpec> {
        (**self).module(id)
    }
}

/// A map-backed registry.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistry {
    calendars: HashMap<String, CalendarSpec>,
    modules: HashMap<String, ModuleSpec>,
}

impl InMemoryRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a calendar, replacing any previous definition with the same id.
    pub fn insert_calendar(&mut self, spec: CalendarSpec) {
        let id = spec.id.clone();
        if self.calendars.insert(id.clone(), spec).is_some() {
            debug!(id = %id, "Replaced calendar definition");
        }
    }

    /// Inserts a module, replacing any previous definition with the same id.
    pub fn insert_module(&mut self, spec: ModuleSpec) {
        let id = spec.id.clone();
        if self.modules.insert(id.clone(), spec).is_some() {
            debug!(id = %id, "Replaced module definition");
        }
    }

    /// Builder method to add a calendar.
    pub fn with_calendar(mut self, spec: CalendarSpec) -> Self {
        self.insert_calendar(spec);
        self
    }

    /// Builder method to add a module.
    pub fn with_module(mut self, spec: ModuleSpec) -> Self {
        self.insert_module(spec);
        self
    }

    /// Returns all calendar identifiers, sorted.
    pub fn calendar_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.calendars.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Returns all module identifiers, sorted.
    pub fn module_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.modules.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Returns the total number of calendars and modules.
    pub fn len(&self) -> usize {
        self.calendars.len() + self.modules.len()
    }

    /// Returns true if the registry holds nothing.
    pub fn is_empty(&self) -> bool {
        self.calendars.is_empty() && self.modules.is_empty()
    }
}

impl SpecRegistry for InMemoryRegistry {
    fn calendar(&self, id: &str) -> Option<&CalendarSpec> {
        self.calendars.get(id)
    }

    fn module(&self, id: &str) -> Option<&ModuleSpec> {
        self.modules.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::EventSource;

    fn sample_registry() -> InMemoryRegistry {
        InMemoryRegistry::new()
            .with_calendar(CalendarSpec::new("us-federal"))
            .with_calendar(CalendarSpec::new("nyse").extending("us-federal"))
            .with_module(ModuleSpec::new("sat-sun"))
    }

    #[test]
    fn lookup() {
        let registry = sample_registry();
        assert_eq!(registry.calendar("nyse").map(|c| c.extends.len()), Some(1));
        assert!(registry.module("sat-sun").is_some());
        assert!(registry.calendar("sat-sun").is_none());
        assert!(registry.module("missing").is_none());
    }

    #[test]
    fn ids_are_sorted() {
        let registry = sample_registry();
        assert_eq!(registry.calendar_ids(), vec!["nyse", "us-federal"]);
        assert_eq!(registry.module_ids(), vec!["sat-sun"]);
        assert_eq!(registry.len(), 3);
        assert!(!registry.is_empty());
        assert!(InMemoryRegistry::new().is_empty());
    }

    #[test]
    fn insert_replaces() {
        let mut registry = sample_registry();
        registry.insert_module(
            ModuleSpec::new("sat-sun").with_source(EventSource::new("k", "K")),
        );
        assert_eq!(registry.module("sat-sun").unwrap().event_sources.len(), 1);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn works_through_references_and_pointers() {
        fn count_parents(registry: &impl SpecRegistry, id: &str) -> usize {
            registry.calendar(id).map_or(0, |c| c.extends.len())
        }

        let registry = sample_registry();
        assert_eq!(count_parents(&&registry, "nyse"), 1);
        assert_eq!(count_parents(&Arc::new(registry.clone()), "nyse"), 1);

        let boxed: Box<dyn SpecRegistry> = Box::new(registry);
        assert_eq!(count_parents(&boxed, "nyse"), 1);
    }
}
