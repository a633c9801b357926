//! Completeness check between the source table and the grouped views.
//!
//! Splitting every joined field back on [`SEPARATOR`] must give exactly the
//! (crop, state) pairs of the source: nothing dropped, nothing invented.
//! Source values are split the same way, so a value that itself contains the
//! separator still balances; such values are counted in the report because a
//! reader of the output cannot tell them apart from two values.

use std::collections::BTreeMap;

use crate::error::ValidationError;
use crate::models::{CropGroup, GroupRow, SourceRecord, StateGroup};
use crate::transform::grouper::SEPARATOR;

/// Outcome of a successful check
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompletenessReport {
    /// Source rows accounted for in each view
    pub pairs: usize,
    /// Source values that contain the separator
    pub ambiguous_values: Vec<String>,
}

type PairCounts<'a> = BTreeMap<(&'a str, &'a str), usize>;

fn count_source<'a>(
    records: &'a [SourceRecord],
    key: impl Fn(&'a SourceRecord) -> &'a str,
    value: impl Fn(&'a SourceRecord) -> &'a str,
) -> PairCounts<'a> {
    let mut counts = PairCounts::new();
    for record in records {
        for token in value(record).split(SEPARATOR) {
            *counts.entry((key(record), token)).or_default() += 1;
        }
    }
    counts
}

fn count_groups<G: GroupRow>(groups: &[G]) -> PairCounts<'_> {
    let mut counts = PairCounts::new();
    for group in groups {
        for token in group.joined().split(SEPARATOR) {
            *counts.entry((group.key(), token)).or_default() += 1;
        }
    }
    counts
}

fn compare<'a>(
    view: &'static str,
    source: &PairCounts<'a>,
    grouped: &PairCounts<'a>,
) -> Result<(), ValidationError> {
    let keys = source.keys().chain(grouped.keys().filter(|k| !source.contains_key(*k)));

    for pair in keys {
        let source_count = source.get(pair).copied().unwrap_or(0);
        let grouped_count = grouped.get(pair).copied().unwrap_or(0);
        if source_count != grouped_count {
            return Err(ValidationError::PairMismatch {
                view,
                key: pair.0.to_string(),
                value: pair.1.to_string(),
                grouped: grouped_count,
                source_count,
            });
        }
    }
    Ok(())
}

/// Check that both views account for every source pair exactly once.
pub fn check_completeness(
    records: &[SourceRecord],
    by_crop: &[CropGroup],
    by_state: &[StateGroup],
) -> Result<CompletenessReport, ValidationError> {
    let crop_source = count_source(records, |r| r.crop.as_str(), |r| r.state.as_str());
    compare("by-crop", &crop_source, &count_groups(by_crop))?;

    let state_source = count_source(records, |r| r.state.as_str(), |r| r.crop.as_str());
    compare("by-state", &state_source, &count_groups(by_state))?;

    let mut ambiguous_values: Vec<String> = records
        .iter()
        .flat_map(|r| [r.crop.as_str(), r.state.as_str()])
        .filter(|v| v.contains(SEPARATOR))
        .map(String::from)
        .collect();
    ambiguous_values.sort();
    ambiguous_values.dedup();

    Ok(CompletenessReport {
        pairs: records.len(),
        ambiguous_values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::grouper::{group_by_crop, group_by_state};
    use proptest::prelude::*;

    fn rows(pairs: &[(&str, &str)]) -> Vec<SourceRecord> {
        pairs.iter().map(|(c, s)| SourceRecord::new(*c, *s)).collect()
    }

    #[test]
    fn test_grouped_views_are_complete() {
        let records = rows(&[("Corn", "Iowa"), ("Corn", "Nebraska"), ("Wheat", "Iowa")]);
        let report =
            check_completeness(&records, &group_by_crop(&records), &group_by_state(&records))
                .unwrap();

        assert_eq!(report.pairs, 3);
        assert!(report.ambiguous_values.is_empty());
    }

    #[test]
    fn test_dropped_pair_detected() {
        let records = rows(&[("Corn", "Iowa"), ("Corn", "Nebraska")]);
        let by_crop = vec![CropGroup { crop: "Corn".into(), states: "Iowa".into() }];

        let err = check_completeness(&records, &by_crop, &group_by_state(&records)).unwrap_err();
        let ValidationError::PairMismatch { view, value, grouped, source_count, .. } = err;
        assert_eq!(view, "by-crop");
        assert_eq!(value, "Nebraska");
        assert_eq!((grouped, source_count), (0, 1));
    }

    #[test]
    fn test_invented_pair_detected() {
        let records = rows(&[("Corn", "Iowa")]);
        let by_state = vec![StateGroup { state: "Iowa".into(), crops: "Corn,Rye".into() }];

        let err = check_completeness(&records, &group_by_crop(&records), &by_state).unwrap_err();
        assert!(err.to_string().contains("Rye"));
    }

    #[test]
    fn test_values_with_separator_reported() {
        let records = rows(&[("Beans, dry", "Idaho"), ("Corn", "Iowa")]);
        let report =
            check_completeness(&records, &group_by_crop(&records), &group_by_state(&records))
                .unwrap();

        assert_eq!(report.ambiguous_values, vec!["Beans, dry"]);
    }

    proptest! {
        #[test]
        fn prop_grouping_is_complete(
            pairs in prop::collection::vec(("[A-C]{0,2}(,[a-c])?", "[X-Z]{0,2}"), 0..30)
        ) {
            let records: Vec<SourceRecord> =
                pairs.into_iter().map(|(c, s)| SourceRecord::new(c, s)).collect();
            let result = check_completeness(
                &records,
                &group_by_crop(&records),
                &group_by_state(&records),
            );
            prop_assert!(result.is_ok(), "{:?}", result);
        }
    }
}
