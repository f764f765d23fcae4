//! Ranking engine for a tab quick-switcher.
//!
//! A query is matched against every candidate's host, URL and title with a fuzzy
//! character aligner; per-field scores are weighted into one score, and results are
//! sorted with a stable tie-break and grouped into display sections.
//!
//! ```
//! use tabjump_search::{Candidate, OpenTab, Ranker};
//!
//! let tabs = vec![Candidate::OpenTab(OpenTab {
//!     id: 1,
//!     window_id: 1,
//!     title: Some("GitHub".into()),
//!     url: Some("https://github.com".into()),
//!     favicon: None,
//!     active: false,
//!     audible: false,
//! })];
//! let ranked = Ranker::default().rank(&tabs, "git");
//! assert_eq!(ranked.len(), 1);
//! ```

mod align;
mod candidate;
mod error;
mod fields;
mod highlight;
mod priority;
mod profile;
mod ranker;
mod scorer;
mod state;

pub use align::{length_penalty, Aligner, Alignment};
pub use candidate::{Candidate, ClosedSession, OpenTab, TabLike};
pub use error::{Result, SearchError};
pub use fields::{is_boundary, normalize, strip_protocol, tokenize, CandidateFields, HostParts, Query};
pub use highlight::MatchSpan;
pub use priority::{candidates_from_snapshot, move_active_to_end, order_by_recency};
pub use profile::{Bonuses, FieldWeights, QualifyPolicy, ScoringProfile, BUILTIN_PROFILES};
pub use ranker::{Presentation, Ranked, RankedEntry, Ranker, Section, SectionGroup};
pub use scorer::{Explanation, FieldScorer, TokenBreakdown};
pub use state::SwitcherState;
