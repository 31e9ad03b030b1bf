//! Specification resolver.
//!
//! Flattens a calendar's `extends`/`uses` graph into one [`ResolvedSpec`].
//!
//! Layers merge low → high priority:
//! 1. parents, in `extends` order (later parents overwrite earlier ones)
//! 2. modules, in `uses` order (sources and weekend days only)
//! 3. the calendar's own content (highest priority)
//!
//! Event sources and deltas are appended, classifications are overlaid, and
//! weekend days are unioned. Every visited layer is recorded in the
//! resolution chain.

use std::collections::HashMap;
use std::sync::Arc;

use almanac_core::{
    CalendarSpec, ClassificationMap, Delta, EventSource, ModuleSpec, ResolvedSpec, SpecRegistry,
    WeekendPolicy, calendar_link, module_link,
};
use tracing::{debug, instrument, trace};

use crate::cache::ResolutionCache;
use crate::config::{ResolutionMode, ResolverConfig};
use crate::error::{EngineResult, ResolveError};
use crate::graph::InheritanceGraph;

/// Resolves calendar identifiers against a registry.
///
/// One resolver per resolution session. Top-level results are cached by
/// calendar id for the resolver's lifetime; interior parent lookups never
/// consult the cache.
#[derive(Debug)]
pub struct SpecResolver<R> {
    registry: R,
    config: ResolverConfig,
    cache: ResolutionCache,
}

impl<R: SpecRegistry> SpecResolver<R> {
    /// Creates a resolver with the default configuration.
    pub fn new(registry: R) -> Self {
        Self::with_config(registry, ResolverConfig::default())
    }

    /// Creates a resolver with the given configuration.
    pub fn with_config(registry: R, config: ResolverConfig) -> Self {
        Self {
            registry,
            config,
            cache: ResolutionCache::new(),
        }
    }

    /// Returns the registry.
    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Returns the resolution cache.
    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    /// Checks if `calendar_id` has a cached resolution.
    pub fn is_cached(&self, calendar_id: &str) -> bool {
        self.cache.contains(calendar_id)
    }

    /// Resolves a calendar, returning the cached result when available.
    ///
    /// Repeated calls for the same id return the same `Arc`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::NotFound`] if the calendar or any calendar or
    /// module it references is missing, and [`ResolveError::CircularDependency`]
    /// if a calendar extends itself directly or transitively.
    #[instrument(level = "debug", skip(self), fields(mode = ?self.config.mode))]
    pub fn resolve(&mut self, calendar_id: &str) -> EngineResult<Arc<ResolvedSpec>> {
        if self.config.cache_enabled {
            if let Some(cached) = self.cache.get(calendar_id) {
                trace!(id = %calendar_id, "Resolution cache hit");
                return Ok(cached);
            }
        }

        let resolved = Arc::new(self.resolve_uncached(calendar_id)?);
        debug!(
            id = %calendar_id,
            sources = resolved.event_sources().len(),
            classifications = resolved.classifications().len(),
            deltas = resolved.deltas().len(),
            chain = resolved.resolution_chain().len(),
            "Resolved calendar"
        );

        if self.config.cache_enabled {
            self.cache.put(calendar_id, Arc::clone(&resolved));
        }
        Ok(resolved)
    }

    /// Resolves a calendar without reading or writing the cache.
    pub fn resolve_uncached(&self, calendar_id: &str) -> EngineResult<ResolvedSpec> {
        match self.config.mode {
            ResolutionMode::Compatible => self.resolve_along_path(calendar_id, &[]),
            ResolutionMode::Deduplicated => self.resolve_deduplicated(calendar_id),
        }
    }

    /// Invalidates all cached resolutions.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Depth-first, pre-order merge with a path-scoped visited list.
    ///
    /// Each child call receives its own copy of the path, so a shared ancestor
    /// reached through two parents is resolved (and merged) twice, while an id
    /// recurring along one path is a cycle.
    fn resolve_along_path(&self, calendar_id: &str, path: &[String]) -> EngineResult<ResolvedSpec> {
        if path.iter().any(|visited| visited == calendar_id) {
            return Err(ResolveError::cycle(path, calendar_id));
        }

        let calendar = self
            .registry
            .calendar(calendar_id)
            .ok_or_else(|| ResolveError::calendar_not_found(calendar_id))?;

        let mut child_path = path.to_vec();
        child_path.push(calendar_id.to_string());

        let mut layers = LayerAccumulator::default();
        for parent_id in &calendar.extends {
            let parent = self.resolve_along_path(parent_id, &child_path)?;
            layers.absorb_parent(&parent);
        }
        for module_id in &calendar.uses {
            layers.absorb_module(self.module(module_id)?);
        }
        layers.absorb_own(calendar);

        Ok(layers.finish(calendar))
    }

    /// Single pass over the explicit inheritance graph, each node merged once.
    fn resolve_deduplicated(&self, calendar_id: &str) -> EngineResult<ResolvedSpec> {
        let graph = InheritanceGraph::build(&self.registry, calendar_id)?;
        trace!(
            id = %calendar_id,
            nodes = graph.len(),
            edges = graph.edge_count(),
            "Built inheritance graph"
        );

        let mut layers = LayerAccumulator::default();
        let mut applied_modules: Vec<&str> = Vec::new();
        // Resolved (defaulted) weekend per node, so parents contribute the
        // same policy they would when resolved on their own.
        let mut weekends: HashMap<&str, WeekendPolicy> = HashMap::new();
        for calendar in graph.topological_order() {
            let mut weekend = calendar
                .extends
                .iter()
                .filter_map(|parent| weekends.get(parent.as_str()))
                .fold(WeekendPolicy::empty(), |acc, parent| acc.union(parent));

            for module_id in &calendar.uses {
                let module = self.module(module_id)?;
                if let Some(fragment) = &module.weekend {
                    weekend = weekend.union(fragment);
                }
                if applied_modules.contains(&module_id.as_str()) {
                    continue;
                }
                layers.absorb_module(module);
                applied_modules.push(module_id);
            }
            layers.absorb_own(calendar);
            weekends.insert(calendar.id.as_str(), weekend.or_default_weekend());
        }

        let root = graph.root();
        layers.weekend = weekends
            .get(root.id.as_str())
            .copied()
            .unwrap_or_else(WeekendPolicy::sat_sun);
        Ok(layers.finish(root))
    }

    fn module(&self, module_id: &str) -> EngineResult<&ModuleSpec> {
        self.registry
            .module(module_id)
            .ok_or_else(|| ResolveError::module_not_found(module_id))
    }
}

/// Running merge state for one resolution.
#[derive(Debug, Default)]
struct LayerAccumulator {
    event_sources: Vec<EventSource>,
    classifications: ClassificationMap,
    deltas: Vec<Delta>,
    weekend: WeekendPolicy,
    chain: Vec<String>,
}

impl LayerAccumulator {
    /// Merges a fully resolved parent, chain included.
    fn absorb_parent(&mut self, parent: &ResolvedSpec) {
        trace!(parent = %parent.id(), "Merging parent");
        self.event_sources.extend(parent.event_sources().iter().cloned());
        self.classifications.extend(
            parent
                .classifications()
                .iter()
                .map(|(key, classification)| (key.clone(), *classification)),
        );
        self.deltas.extend(parent.deltas().iter().cloned());
        self.weekend = self.weekend.union(&parent.weekend_policy());
        self.chain.extend(parent.resolution_chain().iter().cloned());
    }

    /// Merges a module. Modules contribute sources and weekend days only.
    fn absorb_module(&mut self, module: &ModuleSpec) {
        trace!(module = %module.id, "Merging module");
        if let Some(weekend) = &module.weekend {
            self.weekend = self.weekend.union(weekend);
        }
        self.event_sources.extend(module.event_sources.iter().cloned());
        self.chain.push(module_link(&module.id));
    }

    /// Merges a calendar's own content at the highest priority.
    fn absorb_own(&mut self, calendar: &CalendarSpec) {
        trace!(calendar = %calendar.id, "Merging calendar");
        self.event_sources.extend(calendar.event_sources.iter().cloned());
        self.classifications.extend(
            calendar
                .classifications
                .iter()
                .map(|(key, classification)| (key.clone(), *classification)),
        );
        self.deltas.extend(calendar.deltas.iter().cloned());
        self.chain.push(calendar_link(&calendar.id));
    }

    fn finish(self, calendar: &CalendarSpec) -> ResolvedSpec {
        ResolvedSpec::builder(calendar.id.clone())
            .metadata(calendar.metadata.clone())
            .weekend_policy(self.weekend)
            .event_sources(self.event_sources)
            .classifications(self.classifications)
            .deltas(self.deltas)
            .resolution_chain(self.chain)
            .build()
    }
}
