//! Best-scoring subsequence alignment of a query inside a haystack.
//!
//! Both inputs are expected to be normalized already (see [`crate::fields::normalize`]).
//! Offsets are char offsets, not byte offsets.

use crate::fields::is_boundary;

const MATCH_SCORE: f64 = 10.0;
const CONSECUTIVE_BONUS: f64 = 8.0;
const BOUNDARY_BONUS: f64 = 6.0;
const MAX_GAP_PENALTY: usize = 6;

const SUBSTRING_CHAR_SCORE: f64 = 20.0;
const SUBSTRING_BOUNDARY_BONUS: f64 = 30.0;
const SUBSTRING_PREFIX_BONUS: f64 = 20.0;

const MAX_LENGTH_PENALTY: f64 = 10.0;
const LENGTH_PENALTY_DIVISOR: f64 = 50.0;

/// Local score at which the remaining positions for a query char are skipped.
const GOOD_ENOUGH: f64 = 16.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    pub score: f64,
    /// Haystack offsets consumed by the winning alignment, ascending.
    pub positions: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aligner {
    prune: bool,
}

impl Default for Aligner {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Aligner {
    /// With `prune` set, a query char stops considering later positions once one
    /// scores [`GOOD_ENOUGH`] locally. This trades a few optimal alignments for speed.
    #[must_use]
    pub const fn new(prune: bool) -> Self {
        Self { prune }
    }

    #[must_use]
    pub const fn prunes(&self) -> bool {
        self.prune
    }

    /// Returns `None` when `query` is not a subsequence of `haystack`.
    #[must_use]
    pub fn align(&self, haystack: &str, query: &str) -> Option<f64> {
        self.run(haystack, query, false).map(|a| a.score)
    }

    /// Like [`Aligner::align`], also reporting the matched offsets for highlighting.
    #[must_use]
    pub fn align_with_positions(&self, haystack: &str, query: &str) -> Option<Alignment> {
        self.run(haystack, query, true)
    }

    fn run(&self, haystack: &str, query: &str, track: bool) -> Option<Alignment> {
        if query.is_empty() {
            return Some(Alignment {
                score: 0.0,
                positions: Vec::new(),
            });
        }

        let needle: Vec<char> = query.chars().collect();
        let hay: Vec<char> = haystack.chars().collect();
        if needle.len() > hay.len() {
            return None;
        }

        if let Some(byte_start) = haystack.find(query) {
            let start = haystack[..byte_start].chars().count();
            let mut score = needle.len() as f64 * SUBSTRING_CHAR_SCORE;
            if start == 0 || is_boundary(hay[start - 1]) {
                score += SUBSTRING_BOUNDARY_BONUS;
            }
            if start == 0 {
                score += SUBSTRING_PREFIX_BONUS;
            }
            let positions = if track {
                (start..start + needle.len()).collect()
            } else {
                Vec::new()
            };
            return Some(Alignment {
                score: score - length_penalty(hay.len()),
                positions,
            });
        }

        let bounds = SubsequenceBounds::find(&hay, &needle)?;
        let (best, positions) = solve(&hay, &needle, &bounds, self.prune, track);
        if best == f64::NEG_INFINITY {
            return None;
        }

        Some(Alignment {
            score: best - length_penalty(hay.len()),
            positions,
        })
    }
}

/// Penalty that slightly favors shorter haystacks.
#[must_use]
pub fn length_penalty(haystack_chars: usize) -> f64 {
    (haystack_chars as f64 / LENGTH_PENALTY_DIVISOR).min(MAX_LENGTH_PENALTY)
}

/// Earliest and latest offset at which each query char can sit in any alignment.
struct SubsequenceBounds {
    earliest: Vec<usize>,
    latest: Vec<usize>,
}

impl SubsequenceBounds {
    /// Greedy scans from both ends; `None` when `needle` is not a subsequence.
    fn find(hay: &[char], needle: &[char]) -> Option<Self> {
        let mut earliest = Vec::with_capacity(needle.len());
        let mut from = 0;
        for &c in needle {
            let at = from + hay[from..].iter().position(|&h| h == c)?;
            earliest.push(at);
            from = at + 1;
        }

        let mut latest = vec![0; needle.len()];
        let mut until = hay.len();
        for (qi, &c) in needle.iter().enumerate().rev() {
            let at = hay[..until].iter().rposition(|&h| h == c)?;
            latest[qi] = at;
            until = at;
        }

        Some(Self { earliest, latest })
    }

    /// Columns of row `qi` that a feasible alignment can query: `ti` is one past the
    /// previous char's match, or 0 for the first char.
    fn columns(&self, qi: usize) -> (usize, usize) {
        if qi == 0 {
            (0, 0)
        } else {
            (self.earliest[qi - 1] + 1, self.latest[qi - 1] + 1)
        }
    }
}

/// Scores the best alignment of `needle` with every match at or after offset 0.
///
/// Rows are solved from the last query char back to the first; row `qi` at column
/// `ti` holds the best score for `needle[qi..]` with every match at or after `ti`.
/// Only two rows are kept, plus the per-cell choices when positions are tracked.
fn solve(
    hay: &[char],
    needle: &[char],
    bounds: &SubsequenceBounds,
    prune: bool,
    track: bool,
) -> (f64, Vec<usize>) {
    let m = hay.len();
    let n = needle.len();
    let width = m + 1;

    let mut next = vec![0.0; width];
    let mut row = vec![f64::NEG_INFINITY; width];
    let mut choice = if track {
        vec![usize::MAX; n * width]
    } else {
        Vec::new()
    };
    // (offset, MATCH_SCORE + boundary bonus + best of the rest), ascending offsets.
    let mut candidates: Vec<(usize, f64)> = Vec::new();
    // suffix[k]: best candidate value and offset among candidates[k..], earliest on ties.
    let mut suffix: Vec<(f64, usize)> = Vec::new();

    for qi in (0..n).rev() {
        let (lo, hi) = bounds.columns(qi);

        candidates.clear();
        for i in lo.max(bounds.earliest[qi])..=bounds.latest[qi] {
            if hay[i] != needle[qi] || next[i + 1] == f64::NEG_INFINITY {
                continue;
            }
            let boundary = i == 0 || is_boundary(hay[i - 1]);
            candidates.push((i, MATCH_SCORE + bonus(boundary, BOUNDARY_BONUS) + next[i + 1]));
        }

        suffix.clear();
        suffix.resize(candidates.len() + 1, (f64::NEG_INFINITY, usize::MAX));
        for k in (0..candidates.len()).rev() {
            let (i, value) = candidates[k];
            suffix[k] = if value >= suffix[k + 1].0 {
                (value, i)
            } else {
                suffix[k + 1]
            };
        }

        row.fill(f64::NEG_INFINITY);
        let mut window_start = 0;
        let mut window_end = 0;
        for ti in lo..=hi.min(m) {
            while window_start < candidates.len() && candidates[window_start].0 < ti {
                window_start += 1;
            }
            window_end = window_end.max(window_start);
            while window_end < candidates.len()
                && candidates[window_end].0 < ti + MAX_GAP_PENALTY
            {
                window_end += 1;
            }

            let mut cur = f64::NEG_INFINITY;
            let mut at = usize::MAX;
            let mut cut = false;
            for &(i, value) in &candidates[window_start..window_end] {
                let consecutive = bonus(qi > 0 && i == ti, CONSECUTIVE_BONUS);
                let gap = (i - ti) as f64;
                if value + consecutive - gap > cur {
                    cur = value + consecutive - gap;
                    at = i;
                }
                let boundary = i == 0 || is_boundary(hay[i - 1]);
                let local = MATCH_SCORE + consecutive + bonus(boundary, BOUNDARY_BONUS) - gap;
                if prune && local >= GOOD_ENOUGH {
                    cut = true;
                    break;
                }
            }

            // Past the window the gap penalty is flat and the local score is at most
            // 10, below GOOD_ENOUGH, so pruning never stops the scan there.
            if !cut {
                let (far, far_at) = suffix[window_end];
                let far = far - MAX_GAP_PENALTY as f64;
                if far > cur {
                    cur = far;
                    at = far_at;
                }
            }

            row[ti] = cur;
            if track {
                choice[qi * width + ti] = at;
            }
        }

        std::mem::swap(&mut next, &mut row);
    }

    let best = next[0];
    if !track || best == f64::NEG_INFINITY {
        return (best, Vec::new());
    }

    let mut positions = Vec::with_capacity(n);
    let mut ti = 0;
    for qi in 0..n {
        let i = choice[qi * width + ti];
        if i == usize::MAX {
            break;
        }
        positions.push(i);
        ti = i + 1;
    }
    (best, positions)
}

const fn bonus(applies: bool, amount: f64) -> f64 {
    if applies {
        amount
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    /// Direct recursion over every match position, scanning offsets in ascending order.
    fn reference_score(hay: &str, query: &str, prune: bool) -> Option<f64> {
        fn best(hay: &[char], needle: &[char], qi: usize, ti: usize, prune: bool) -> f64 {
            if qi == needle.len() {
                return 0.0;
            }
            let mut cur = f64::NEG_INFINITY;
            for i in ti..hay.len() {
                if hay[i] != needle[qi] {
                    continue;
                }
                let rest = best(hay, needle, qi + 1, i + 1, prune);
                if rest == f64::NEG_INFINITY {
                    continue;
                }
                let local = MATCH_SCORE
                    + bonus(qi > 0 && i == ti, CONSECUTIVE_BONUS)
                    + bonus(i == 0 || is_boundary(hay[i - 1]), BOUNDARY_BONUS)
                    - (i - ti).min(MAX_GAP_PENALTY) as f64;
                cur = cur.max(local + rest);
                if prune && local >= GOOD_ENOUGH {
                    break;
                }
            }
            cur
        }

        let hay: Vec<char> = hay.chars().collect();
        let needle: Vec<char> = query.chars().collect();
        let score = best(&hay, &needle, 0, 0, prune);
        (score > f64::NEG_INFINITY).then(|| score - length_penalty(hay.len()))
    }

    #[test]
    fn subsequence_bounds_bracket_every_alignment() {
        let hay: Vec<char> = "abcabc".chars().collect();
        let needle: Vec<char> = "bc".chars().collect();
        let bounds = SubsequenceBounds::find(&hay, &needle).unwrap();
        assert_eq!(bounds.earliest, vec![1, 2]);
        assert_eq!(bounds.latest, vec![4, 5]);
        assert_eq!(bounds.columns(1), (2, 5));

        let reversed: Vec<char> = "cb".chars().collect();
        let hay: Vec<char> = "bc".chars().collect();
        assert!(SubsequenceBounds::find(&hay, &reversed).is_none());
    }

    #[test]
    fn long_haystack_without_the_chars_is_rejected() {
        let hay = "x".repeat(2_000);
        assert_eq!(Aligner::new(false).align(&hay, "pthsgmnt"), None);
        assert_eq!(Aligner::new(true).align_with_positions(&hay, "xy"), None);
    }

    #[test]
    fn empty_query_is_a_trivial_match() {
        let aligner = Aligner::default();
        let alignment = aligner.align_with_positions("github.com", "").unwrap();
        assert_eq!(alignment.score, 0.0);
        assert!(alignment.positions.is_empty());
        assert_eq!(aligner.align("", ""), Some(0.0));
    }

    #[test]
    fn rejects_queries_longer_than_haystack() {
        let aligner = Aligner::default();
        assert_eq!(aligner.align("gh", "github"), None);
        assert_eq!(aligner.align("", "a"), None);
    }

    #[test]
    fn substring_at_start_gets_boundary_and_prefix_bonus() {
        let alignment = Aligner::default()
            .align_with_positions("github.com", "git")
            .unwrap();
        assert!(approx(alignment.score, 60.0 + 30.0 + 20.0 - 0.2));
        assert_eq!(alignment.positions, vec![0, 1, 2]);
    }

    #[test]
    fn substring_after_boundary_gets_boundary_bonus_only() {
        let score = Aligner::default().align("my-hub", "hub").unwrap();
        assert!(approx(score, 60.0 + 30.0 - 0.12));
    }

    #[test]
    fn substring_mid_word_gets_no_bonus() {
        let score = Aligner::default().align("github", "ith").unwrap();
        assert!(approx(score, 60.0 - 0.12));
    }

    #[test]
    fn length_penalty_is_capped() {
        assert!(approx(length_penalty(25), 0.5));
        assert!(approx(length_penalty(5_000), 10.0));
    }

    #[test]
    fn scattered_match_scores_each_char() {
        let alignment = Aligner::default()
            .align_with_positions("github", "gh")
            .unwrap();
        // g@0: 10 + 6 (start); h@3: 10 - 2 (gap)
        assert!(approx(alignment.score, 24.0 - 0.12));
        assert_eq!(alignment.positions, vec![0, 3]);
    }

    #[test]
    fn missing_char_is_no_match() {
        assert_eq!(Aligner::default().align("google docs", "git"), None);
    }

    #[test]
    fn exhaustive_search_finds_the_later_word_start() {
        let hay = "axxxxxx-abxc";
        let full = Aligner::new(false).align_with_positions(hay, "abc").unwrap();
        assert!(approx(full.score, 37.0 - 0.24));
        assert_eq!(full.positions, vec![8, 9, 11]);
    }

    #[test]
    fn pruning_keeps_the_first_good_enough_position() {
        let hay = "axxxxxx-abxc";
        let pruned = Aligner::new(true).align_with_positions(hay, "abc").unwrap();
        assert!(approx(pruned.score, 29.0 - 0.24));
        assert_eq!(pruned.positions, vec![0, 9, 11]);
    }

    #[test]
    fn long_gaps_use_the_capped_penalty() {
        // a@0: 16; b@20: 10 - 6
        let hay = format!("a{}b", "x".repeat(19));
        let score = Aligner::new(false).align(&hay, "ab").unwrap();
        assert!(approx(score, 20.0 - length_penalty(21)));
    }

    proptest! {
        #[test]
        fn positions_are_an_increasing_subsequence(
            hay in "[a-e /:._-]{0,40}",
            query in "[a-e]{1,5}",
            prune in any::<bool>(),
        ) {
            let aligner = Aligner::new(prune);
            let hay_chars: Vec<char> = hay.chars().collect();
            if let Some(alignment) = aligner.align_with_positions(&hay, &query) {
                prop_assert_eq!(alignment.positions.len(), query.chars().count());
                for pair in alignment.positions.windows(2) {
                    prop_assert!(pair[0] < pair[1]);
                }
                for (pos, ch) in alignment.positions.iter().zip(query.chars()) {
                    prop_assert_eq!(hay_chars[*pos], ch);
                }
                prop_assert_eq!(aligner.align(&hay, &query), Some(alignment.score));
            } else {
                prop_assert_eq!(aligner.align(&hay, &query), None);
            }
        }

        #[test]
        fn matches_direct_recursion(
            hay in "[a-c /-]{0,14}",
            query in "[a-c]{1,4}",
            prune in any::<bool>(),
        ) {
            // Literal substrings take the fast path instead.
            if !hay.contains(query.as_str()) {
                let fast = Aligner::new(prune).align(&hay, &query);
                let slow = reference_score(&hay, &query, prune);
                prop_assert_eq!(fast.is_some(), slow.is_some());
                if let (Some(f), Some(s)) = (fast, slow) {
                    prop_assert!(approx(f, s), "{} != {}", f, s);
                }
            }
        }

        #[test]
        fn pruning_never_beats_the_exhaustive_search(
            hay in "[a-d /-]{0,30}",
            query in "[a-d]{1,4}",
        ) {
            let pruned = Aligner::new(true).align(&hay, &query);
            let full = Aligner::new(false).align(&hay, &query);
            prop_assert_eq!(pruned.is_some(), full.is_some());
            if let (Some(p), Some(f)) = (pruned, full) {
                prop_assert!(p <= f + 1e-9);
            }
        }

        #[test]
        fn substring_matches_dominate_scattered_ones(
            hay in "[a-f /:._-]{0,40}",
            query in "[a-f]{1,6}",
        ) {
            let floor = query.len() as f64 * SUBSTRING_CHAR_SCORE;
            if let Some(score) = Aligner::new(false).align(&hay, &query) {
                let raw = score + length_penalty(hay.chars().count());
                if hay.contains(query.as_str()) {
                    prop_assert!(raw >= floor - 1e-9);
                } else {
                    prop_assert!(raw < floor);
                }
            }
        }
    }
}
