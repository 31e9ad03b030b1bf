//! Overlay merge primitives.
//!
//! These compose specifications outside the inheritance graph, for example a
//! base calendar with an environment-specific overlay. Unlike the resolver's
//! inline merge they never recurse and never record a resolution chain entry
//! of their own.
//!
//! - Same source key: the overlay entry replaces the base entry in place
//! - Different keys: all are kept, base order first

use almanac_core::{ClassificationMap, EventSource, ResolvedSpec};
use indexmap::IndexMap;

/// Overlays event sources by key.
///
/// The result keeps first-seen key order: base order, then overlay-only keys
/// in overlay order. A key repeated inside one input keeps its first
/// position and its last definition.
pub fn merge_event_sources(base: &[EventSource], overlay: &[EventSource]) -> Vec<EventSource> {
    let mut merged: IndexMap<&str, &EventSource> = IndexMap::new();
    for source in base.iter().chain(overlay) {
        merged.insert(source.key.as_str(), source);
    }
    merged.into_values().cloned().collect()
}

/// Overlays classification maps; overlay entries win on key collision.
pub fn merge_classifications(
    base: &ClassificationMap,
    overlay: &ClassificationMap,
) -> ClassificationMap {
    let mut merged = base.clone();
    merged.extend(overlay.iter().map(|(k, v)| (k.clone(), *v)));
    merged
}

/// Composes two resolved specifications.
///
/// Sources and classifications use the primitives above, deltas and
/// resolution chains are concatenated base first, and weekend policies are
/// unioned. The id and metadata come from the overlay.
pub fn merge_specs(base: &ResolvedSpec, overlay: &ResolvedSpec) -> ResolvedSpec {
    let deltas = base
        .deltas()
        .iter()
        .chain(overlay.deltas())
        .cloned()
        .collect();
    let chain = base
        .resolution_chain()
        .iter()
        .chain(overlay.resolution_chain())
        .cloned()
        .collect();

    ResolvedSpec::builder(overlay.id())
        .metadata(overlay.metadata().clone())
        .weekend_policy(base.weekend_policy().union(&overlay.weekend_policy()))
        .event_sources(merge_event_sources(
            base.event_sources(),
            overlay.event_sources(),
        ))
        .classifications(merge_classifications(
            base.classifications(),
            overlay.classifications(),
        ))
        .deltas(deltas)
        .resolution_chain(chain)
        .build()
}
