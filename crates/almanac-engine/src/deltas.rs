//! Occurrence-level delta application.
//!
//! Runs before classification: `Add` introduces an occurrence that no
//! generator produced and `Remove` suppresses one that was generated.
//! `Reclassify` has no effect here; the classifier handles it.

use almanac_core::{Delta, Occurrence, ResolvedSpec};
use tracing::trace;

/// Provenance recorded on occurrences introduced by an `Add` delta.
pub const DELTA_PROVENANCE: &str = "delta";

/// Applies the deltas of `spec` to generated occurrences, in delta order.
///
/// An `Add` for a (key, date) that already exists is a no-op, so the input
/// order of generated occurrences is preserved and added ones are appended.
/// Added occurrences are named after the delta, then the matching event
/// source, then the key itself.
pub fn apply_deltas(mut occurrences: Vec<Occurrence>, spec: &ResolvedSpec) -> Vec<Occurrence> {
    for delta in spec.deltas() {
        match delta {
            Delta::Add { key, date, name, .. } => {
                if occurrences.iter().any(|o| o.key == *key && o.date == *date) {
                    continue;
                }
                let name = name
                    .clone()
                    .or_else(|| spec.event_source(key).map(|s| s.name.clone()))
                    .unwrap_or_else(|| key.clone());
                trace!(key = %key, date = %date, "Adding occurrence");
                occurrences
                    .push(Occurrence::new(key, *date, name).with_provenance(DELTA_PROVENANCE));
            }
            Delta::Remove { key, date } => {
                let before = occurrences.len();
                occurrences.retain(|o| !(o.key == *key && o.date == *date));
                trace!(
                    key = %key,
                    date = %date,
                    removed = before - occurrences.len(),
                    "Removing occurrence"
                );
            }
            Delta::Reclassify { .. } => {}
        }
    }
    occurrences
}

#[cfg(test)]
mod tests {
    use super::*;
    use almanac_core::{EventSource, EventType};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn keys(occurrences: &[Occurrence]) -> Vec<(&str, NaiveDate)> {
        occurrences.iter().map(|o| (o.key.as_str(), o.date)).collect()
    }

    #[test]
    fn no_deltas_is_identity() {
        let spec = ResolvedSpec::builder("cal").build();
        let input = vec![Occurrence::new("xmas", date(2024, 12, 25), "Christmas")];
        assert_eq!(apply_deltas(input.clone(), &spec), input);
    }

    #[test]
    fn add_appends_with_source_name() {
        let spec = ResolvedSpec::builder("cal")
            .event_sources(vec![EventSource::new("funeral", "National Day of Mourning")])
            .deltas(vec![Delta::add("funeral", date(2025, 1, 9))])
            .build();
        let input = vec![Occurrence::new("xmas", date(2024, 12, 25), "Christmas")];

        let out = apply_deltas(input, &spec);
        assert_eq!(
            keys(&out),
            vec![("xmas", date(2024, 12, 25)), ("funeral", date(2025, 1, 9))]
        );
        assert_eq!(out[1].name, "National Day of Mourning");
        assert_eq!(out[1].provenance, DELTA_PROVENANCE);
    }

    #[test]
    fn add_name_falls_back_to_key() {
        let spec = ResolvedSpec::builder("cal")
            .deltas(vec![Delta::add("closure", date(2024, 3, 1))])
            .build();
        let out = apply_deltas(Vec::new(), &spec);
        assert_eq!(out[0].name, "closure");
    }

    #[test]
    fn add_prefers_delta_name() {
        let spec = ResolvedSpec::builder("cal")
            .event_sources(vec![EventSource::new("eve", "Eve")])
            .deltas(vec![Delta::add_classified(
                "eve",
                date(2024, 12, 24),
                "Christmas Eve",
                EventType::EarlyClose,
            )])
            .build();
        let out = apply_deltas(Vec::new(), &spec);
        assert_eq!(out[0].name, "Christmas Eve");
    }

    #[test]
    fn add_existing_is_noop() {
        let day = date(2024, 12, 25);
        let spec = ResolvedSpec::builder("cal")
            .deltas(vec![Delta::add("xmas", day)])
            .build();
        let input = vec![Occurrence::new("xmas", day, "Christmas").with_provenance("fixed")];
        assert_eq!(apply_deltas(input.clone(), &spec), input);
    }

    #[test]
    fn remove_drops_only_matching_date() {
        let spec = ResolvedSpec::builder("cal")
            .deltas(vec![Delta::remove("good_friday", date(2024, 3, 29))])
            .build();
        let input = vec![
            Occurrence::new("good_friday", date(2024, 3, 29), "Good Friday"),
            Occurrence::new("good_friday", date(2025, 4, 18), "Good Friday"),
        ];
        let out = apply_deltas(input, &spec);
        assert_eq!(keys(&out), vec![("good_friday", date(2025, 4, 18))]);
    }

    #[test]
    fn deltas_apply_in_order() {
        let day = date(2024, 6, 19);
        let spec = ResolvedSpec::builder("cal")
            .deltas(vec![
                Delta::remove("juneteenth", day),
                Delta::add("juneteenth", day),
                Delta::reclassify("juneteenth", day, EventType::Notable),
            ])
            .build();
        let input = vec![Occurrence::new("juneteenth", day, "Juneteenth").with_provenance("fixed")];

        let out = apply_deltas(input, &spec);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].provenance, DELTA_PROVENANCE);
    }
}
