//! Group source rows by crop or by state.
//!
//! ```text
//! Source rows            By crop                     By state
//! ┌────────────────┐    ┌───────────────────────┐   ┌─────────────────────┐
//! │ Corn  Iowa     │    │ Corn  "Iowa,Nebraska" │   │ Iowa     "Corn,Wheat"│
//! │ Corn  Nebraska │ →  │ Wheat "Iowa"          │   │ Nebraska "Corn"      │
//! │ Wheat Iowa     │    └───────────────────────┘   └─────────────────────┘
//! └────────────────┘
//! ```
//!
//! Groups come out in first-occurrence order of their key; values inside a
//! group keep source row order and are not deduplicated. Empty keys are
//! grouped like any other value.

use indexmap::IndexMap;

use crate::models::{CropGroup, SourceRecord, StateGroup};

/// Separator placed between values of a joined field.
pub const SEPARATOR: &str = ",";

/// Single pass over `records`, mapping each key to its values in row order.
pub fn collect_groups<'a, K, V>(
    records: &'a [SourceRecord],
    key: K,
    value: V,
) -> IndexMap<&'a str, Vec<&'a str>>
where
    K: Fn(&'a SourceRecord) -> &'a str,
    V: Fn(&'a SourceRecord) -> &'a str,
{
    let mut groups: IndexMap<&str, Vec<&str>> = IndexMap::new();
    for record in records {
        groups.entry(key(record)).or_default().push(value(record));
    }
    groups
}

/// One [`CropGroup`] per distinct crop, listing its states.
pub fn group_by_crop(records: &[SourceRecord]) -> Vec<CropGroup> {
    collect_groups(records, |r| r.crop.as_str(), |r| r.state.as_str())
        .into_iter()
        .map(|(crop, states)| CropGroup {
            crop: crop.to_string(),
            states: states.join(SEPARATOR),
        })
        .collect()
}

/// One [`StateGroup`] per distinct state, listing its crops.
pub fn group_by_state(records: &[SourceRecord]) -> Vec<StateGroup> {
    collect_groups(records, |r| r.state.as_str(), |r| r.crop.as_str())
        .into_iter()
        .map(|(state, crops)| StateGroup {
            state: state.to_string(),
            crops: crops.join(SEPARATOR),
        })
        .collect()
}
