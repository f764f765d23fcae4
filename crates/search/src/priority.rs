//! The order candidates are enumerated in before any query is typed.

use std::collections::HashMap;

use tabjump_protocol::{Snapshot, TabRecord};

use crate::candidate::{Candidate, ClosedSession, OpenTab};

/// Moves the first item matching `is_active` to the end, keeping the rest in order.
pub fn move_active_to_end<T>(items: &mut Vec<T>, is_active: impl Fn(&T) -> bool) {
    if let Some(idx) = items.iter().position(is_active) {
        let active = items.remove(idx);
        items.push(active);
    }
}

/// Sorts tabs by their position in `mru` (most recent first). Tabs missing from
/// `mru` keep their enumeration order after the listed ones.
#[must_use]
pub fn order_by_recency<'a>(tabs: &'a [TabRecord], mru: &[u64]) -> Vec<&'a TabRecord> {
    let mut rank: HashMap<u64, usize> = HashMap::with_capacity(mru.len());
    for (idx, id) in mru.iter().enumerate() {
        rank.entry(*id).or_insert(idx);
    }

    let mut ordered: Vec<&TabRecord> = tabs.iter().collect();
    ordered.sort_by_key(|tab| rank.get(&tab.id).copied().unwrap_or(usize::MAX));
    ordered
}

/// Builds the candidate enumeration for one ranking pass: open tabs by recency with
/// the active tab last, then recently closed sessions in the order supplied.
#[must_use]
pub fn candidates_from_snapshot(snapshot: &Snapshot) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = order_by_recency(&snapshot.tabs, &snapshot.mru)
        .into_iter()
        .map(|tab| Candidate::OpenTab(OpenTab::from(tab)))
        .collect();
    move_active_to_end(&mut candidates, Candidate::is_active);

    candidates.extend(
        snapshot
            .closed
            .iter()
            .map(|session| Candidate::ClosedSession(ClosedSession::from(session))),
    );

    log::debug!(
        "enumerated {} open and {} closed candidates",
        snapshot.tabs.len(),
        snapshot.closed.len()
    );
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::TabLike;
    use pretty_assertions::assert_eq;
    use tabjump_protocol::SessionRecord;

    fn record(id: u64, title: &str, active: bool) -> TabRecord {
        TabRecord {
            id,
            title: Some(title.to_string()),
            url: None,
            fav_icon_url: None,
            window_id: 1,
            active,
            audible: false,
        }
    }

    #[test]
    fn moves_only_the_first_active_item() {
        let mut items = vec![(1, true), (2, false), (3, true)];
        move_active_to_end(&mut items, |item| item.1);
        assert_eq!(items, vec![(2, false), (3, true), (1, true)]);

        let mut none = vec![(1, false)];
        move_active_to_end(&mut none, |item| item.1);
        assert_eq!(none, vec![(1, false)]);
    }

    #[test]
    fn recency_puts_unlisted_tabs_last_in_enumeration_order() {
        let tabs = vec![
            record(10, "a", false),
            record(11, "b", false),
            record(12, "c", false),
            record(13, "d", false),
        ];
        let ordered: Vec<u64> = order_by_recency(&tabs, &[12, 10, 12])
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ordered, vec![12, 10, 11, 13]);
    }

    #[test]
    fn snapshot_enumeration_relegates_active_before_closed() {
        let snapshot = Snapshot {
            schema_version: None,
            tabs: vec![record(1, "current", true), record(2, "previous", false)],
            closed: vec![SessionRecord {
                session_id: "s".to_string(),
                title: Some("gone".to_string()),
                url: None,
                fav_icon_url: None,
            }],
            mru: vec![1, 2],
        };
        let titles: Vec<String> = candidates_from_snapshot(&snapshot)
            .iter()
            .map(TabLike::display_title)
            .collect();
        assert_eq!(titles, vec!["previous", "current", "gone"]);
    }
}
