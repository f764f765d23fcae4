use crate::candidate::{Candidate, TabLike};
use crate::fields::{normalize, strip_protocol, Query};
use crate::highlight::MatchSpan;
use crate::profile::ScoringProfile;
use crate::scorer::FieldScorer;

/// Display groups, in the order they are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Section {
    Audible,
    Open,
    Closed,
}

impl Section {
    pub const ORDER: [Self; 3] = [Self::Audible, Self::Open, Self::Closed];

    #[must_use]
    pub const fn of(candidate: &Candidate) -> Self {
        match candidate {
            Candidate::ClosedSession(_) => Self::Closed,
            _ if candidate.is_audible() => Self::Audible,
            Candidate::OpenTab(_) => Self::Open,
        }
    }

    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Audible => "audible",
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Audible => "Playing audio",
            Self::Open => "Open tabs",
            Self::Closed => "Recently closed",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<'a> {
    pub candidate: &'a Candidate,
    /// Position in the enumeration passed to [`Ranker::rank`].
    pub origin: usize,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry<'a> {
    pub candidate: &'a Candidate,
    pub origin: usize,
    pub score: f64,
    pub section: Section,
    pub title: String,
    pub title_span: MatchSpan,
    pub url_span: MatchSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionGroup<'a> {
    pub section: Section,
    pub entries: Vec<RankedEntry<'a>>,
}

/// Ranked results grouped into non-empty sections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Presentation<'a> {
    sections: Vec<SectionGroup<'a>>,
}

impl<'a> Presentation<'a> {
    #[must_use]
    pub fn sections(&self) -> &[SectionGroup<'a>] {
        &self.sections
    }

    /// Entries in display order: sections concatenated.
    pub fn iter(&self) -> impl Iterator<Item = &RankedEntry<'a>> {
        self.sections.iter().flat_map(|group| group.entries.iter())
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&RankedEntry<'a>> {
        self.iter().nth(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.iter().map(|group| group.entries.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct Ranker {
    scorer: FieldScorer,
}

impl Ranker {
    #[must_use]
    pub fn new(profile: ScoringProfile) -> Self {
        Self {
            scorer: FieldScorer::new(profile),
        }
    }

    #[must_use]
    pub const fn scorer(&self) -> &FieldScorer {
        &self.scorer
    }

    /// Scores, filters and sorts `candidates` for `query`.
    ///
    /// An empty query keeps the enumeration order, except that the active tab moves
    /// to the end. Otherwise results are sorted by descending score, ties broken by
    /// ascending enumeration index.
    #[must_use]
    pub fn rank<'a>(&self, candidates: &'a [Candidate], query: &str) -> Vec<Ranked<'a>> {
        self.rank_query(candidates, &Query::parse(query))
    }

    /// Ranks, groups into sections and computes highlight spans for at most `limit`
    /// displayed entries.
    #[must_use]
    pub fn present<'a>(
        &self,
        candidates: &'a [Candidate],
        query: &str,
        limit: Option<usize>,
    ) -> Presentation<'a> {
        let query = Query::parse(query);
        let ranked = self.rank_query(candidates, &query);
        let mut budget = limit.unwrap_or(usize::MAX);

        let mut sections = Vec::new();
        for section in Section::ORDER {
            if budget == 0 {
                break;
            }
            let entries: Vec<RankedEntry<'a>> = ranked
                .iter()
                .filter(|r| Section::of(r.candidate) == section)
                .take(budget)
                .map(|r| self.entry(r, section, &query))
                .collect();
            if entries.is_empty() {
                continue;
            }
            budget -= entries.len();
            sections.push(SectionGroup { section, entries });
        }

        Presentation { sections }
    }

    fn rank_query<'a>(&self, candidates: &'a [Candidate], query: &Query) -> Vec<Ranked<'a>> {
        if query.is_empty() {
            let mut ranked: Vec<Ranked<'a>> = candidates
                .iter()
                .enumerate()
                .map(|(origin, candidate)| Ranked {
                    candidate,
                    origin,
                    score: 0.0,
                })
                .collect();
            move_active_to_section_end(&mut ranked);
            return ranked;
        }

        let mut ranked: Vec<Ranked<'a>> = candidates
            .iter()
            .enumerate()
            .filter_map(|(origin, candidate)| {
                let score = self.scorer.score(&candidate.fields(), query)?;
                Some(Ranked {
                    candidate,
                    origin,
                    score,
                })
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.origin.cmp(&b.origin))
        });

        log::debug!(
            "query {:?} matched {} of {} candidates",
            query.whole(),
            ranked.len(),
            candidates.len()
        );
        ranked
    }

    fn entry<'a>(&self, ranked: &Ranked<'a>, section: Section, query: &Query) -> RankedEntry<'a> {
        let title = ranked.candidate.display_title();
        let (title_span, url_span) = if query.is_empty() {
            (MatchSpan::default(), MatchSpan::default())
        } else {
            // Aligned without the protocol, like scoring; offsets index the full URL.
            let url = ranked.candidate.url().unwrap_or_default();
            let bare = strip_protocol(url);
            let protocol_chars = url[..url.len() - bare.len()].chars().count();
            (
                self.scorer.highlight(&normalize(&title), query),
                self.scorer
                    .highlight(&normalize(bare), query)
                    .shifted(protocol_chars),
            )
        };

        RankedEntry {
            candidate: ranked.candidate,
            origin: ranked.origin,
            score: ranked.score,
            section,
            title,
            title_span,
            url_span,
        }
    }
}

/// Moves the first active entry behind the last entry of its own section. A list in
/// which some active entry already closes its section is left untouched, which keeps
/// an enumeration from [`crate::candidates_from_snapshot`] in its given order.
fn move_active_to_section_end(ranked: &mut Vec<Ranked<'_>>) {
    let closes_section = |idx: usize| {
        let section = Section::of(ranked[idx].candidate);
        ranked[idx + 1..]
            .iter()
            .all(|r| Section::of(r.candidate) != section)
    };
    let mut active = ranked
        .iter()
        .enumerate()
        .filter(|(_, r)| r.candidate.is_active())
        .map(|(idx, _)| idx);
    let Some(first) = active.next() else {
        return;
    };
    if closes_section(first) || active.any(closes_section) {
        return;
    }

    let section = Section::of(ranked[first].candidate);
    let Some(last) = ranked
        .iter()
        .rposition(|r| Section::of(r.candidate) == section)
    else {
        return;
    };
    let entry = ranked.remove(first);
    ranked.insert(last, entry);
}
