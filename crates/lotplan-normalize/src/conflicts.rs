//! Same-resource overlap detection
//!
//! Overlapping bars are valid output; this only reports them so the
//! viewer can see the conflict.

use lotplan_core::{hours_between, Overlap, ScheduleEntry};

/// Every intersecting pair of entries on the same resource.
///
/// Pairs are reported once with the lower index first, grouped by resource
/// in first-appearance order and sorted by start inside each group.
/// Touching intervals do not overlap.
pub fn find_overlaps(entries: &[ScheduleEntry]) -> Vec<Overlap> {
    let mut groups: Vec<(&str, Vec<usize>)> = Vec::new();
    for (idx, entry) in entries.iter().enumerate() {
        match groups.iter_mut().find(|(r, _)| *r == entry.resource) {
            Some((_, members)) => members.push(idx),
            None => groups.push((entry.resource.as_str(), vec![idx])),
        }
    }

    let mut overlaps = Vec::new();
    for (resource, mut members) in groups {
        members.sort_by_key(|&idx| (entries[idx].start, idx));

        for (pos, &a) in members.iter().enumerate() {
            for &b in &members[pos + 1..] {
                let (ea, eb) = (&entries[a], &entries[b]);
                if eb.start >= ea.end {
                    break;
                }
                if !ea.overlaps(eb) {
                    continue;
                }
                let shared = hours_between(ea.start.max(eb.start), ea.end.min(eb.end));
                overlaps.push(Overlap {
                    resource: resource.to_string(),
                    first: a.min(b),
                    second: a.max(b),
                    hours: shared,
                });
            }
        }
    }

    overlaps
}
