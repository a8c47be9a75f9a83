//! Selection of the most relevant record when the upstream returns several

/// Where statuses missing from the priority table rank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownStatusRank {
    /// Unknown statuses rank behind every known one
    #[default]
    Last,
    /// Unknown statuses rank level with "active" (legacy behaviour)
    First,
}

/// Returns the preference of an upstream status code (lower is better)
///
/// active=0, landed=1, incident=diverted=2, scheduled=3, cancelled=4.
pub fn status_priority(code: &str, unknown: UnknownStatusRank) -> u8 {
    match code {
        "active" => 0,
        "landed" => 1,
        "incident" | "diverted" => 2,
        "scheduled" => 3,
        "cancelled" => 4,
        _ => match unknown {
            UnknownStatusRank::Last => 5,
            UnknownStatusRank::First => 0,
        },
    }
}

/// Picks the record with the best status priority
///
/// Among equal priorities the earliest record wins, so upstream order is the
/// tie-break. Returns `None` only for an empty slice.
pub fn pick_best<'a, T, F>(records: &'a [T], status_of: F, unknown: UnknownStatusRank) -> Option<&'a T>
where
    F: Fn(&T) -> &str,
{
    let mut iter = records.iter();
    let mut best = iter.next()?;
    let mut best_priority = status_priority(status_of(best), unknown);

    for record in iter {
        let priority = status_priority(status_of(record), unknown);
        if priority < best_priority {
            best = record;
            best_priority = priority;
        }
    }

    Some(best)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// (status, tag) pairs so tests can tell equal statuses apart
    fn pick<'a>(records: &'a [(&'a str, u32)], unknown: UnknownStatusRank) -> Option<&'a (&'a str, u32)> {
        pick_best(records, |r| r.0, unknown)
    }

    #[test]
    fn test_active_beats_scheduled_and_landed() {
        let records = [("scheduled", 1), ("active", 2), ("landed", 3)];
        assert_eq!(pick(&records, UnknownStatusRank::Last), Some(&("active", 2)));
    }

    #[test]
    fn test_landed_beats_incident() {
        let records = [("landed", 1), ("incident", 2)];
        assert_eq!(pick(&records, UnknownStatusRank::Last), Some(&("landed", 1)));
    }

    #[test]
    fn test_first_seen_wins_ties() {
        let records = [("diverted", 1), ("diverted", 2)];
        assert_eq!(pick(&records, UnknownStatusRank::Last), Some(&("diverted", 1)));

        let mixed = [("cancelled", 1), ("incident", 2), ("diverted", 3)];
        assert_eq!(pick(&mixed, UnknownStatusRank::Last), Some(&("incident", 2)));
    }

    #[test]
    fn test_empty_input_has_no_candidate() {
        let records: [(&str, u32); 0] = [];
        assert_eq!(pick(&records, UnknownStatusRank::Last), None);
    }

    #[test]
    fn test_unknown_status_ranks_last_by_default() {
        let records = [("boarding", 1), ("cancelled", 2)];
        assert_eq!(pick(&records, UnknownStatusRank::default()), Some(&("cancelled", 2)));
    }

    #[test]
    fn test_legacy_rank_treats_unknown_like_active() {
        let records = [("boarding", 1), ("landed", 2), ("active", 3)];
        assert_eq!(pick(&records, UnknownStatusRank::First), Some(&("boarding", 1)));
    }

    #[test]
    fn test_single_unknown_record_is_still_chosen() {
        let records = [("boarding", 1)];
        assert_eq!(pick(&records, UnknownStatusRank::Last), Some(&("boarding", 1)));
    }
}
