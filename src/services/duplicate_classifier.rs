//! Duplicate classification
//!
//! Pure decision step: splits each duplicate group into protected and
//! removable members against the referenced set. Matching is exact
//! relative-path equality between normalized forms; substring containment is
//! rejected because a short filename can match inside an unrelated longer
//! path and separator boundaries can defeat a prefix.
//!
//! Guarantees, per group:
//! - no member whose normalized form appears in the referenced set is ever
//!   removable
//! - `protected` and `removable` partition the members
//! - at least one member always survives: when nothing in a group is
//!   referenced, the primary (first-observed) member is retained

use crate::types::{CanonicalKey, ClassificationResult, DuplicateGroup, TrackRef};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Classify every group against the referenced set. Pure; no side effects.
pub fn classify(
    groups: &BTreeMap<CanonicalKey, DuplicateGroup>,
    referenced: &HashSet<TrackRef>,
    library_root: &Path,
) -> BTreeMap<CanonicalKey, ClassificationResult> {
    groups
        .iter()
        .map(|(key, group)| {
            let result = classify_group(group, referenced, library_root);
            tracing::debug!(
                key = %key,
                protected = result.protected.len(),
                removable = result.removable.len(),
                "Classified group"
            );
            (key.clone(), result)
        })
        .collect()
}

fn classify_group(
    group: &DuplicateGroup,
    referenced: &HashSet<TrackRef>,
    library_root: &Path,
) -> ClassificationResult {
    let mut protected = Vec::new();
    let mut removable = Vec::new();

    for member in &group.members {
        let track_ref = TrackRef::from_library_path(member, library_root);
        if referenced.contains(&track_ref) {
            protected.push(member.clone());
        } else {
            removable.push(member.clone());
        }
    }

    // Keep-at-least-one: with no referenced member, the primary is retained
    // as the group's surviving copy.
    if protected.is_empty() {
        let primary = group.primary().to_path_buf();
        removable.retain(|path| path != &primary);
        protected.push(primary);
    }

    ClassificationResult {
        protected,
        removable,
    }
}
