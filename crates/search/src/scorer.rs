//! Combines per-field alignment scores into one score per candidate.
//!
//! Every query token has to qualify in at least one field group (host, url, title);
//! a single token that qualifies nowhere rejects the candidate.

use serde::Serialize;

use crate::align::Aligner;
use crate::fields::{CandidateFields, Query};
use crate::highlight::MatchSpan;
use crate::profile::ScoringProfile;

/// Qualifying scores of one token, per field group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenBreakdown {
    pub token: String,
    pub host: Option<f64>,
    pub url: Option<f64>,
    pub title: Option<f64>,
    pub contribution: f64,
}

impl TokenBreakdown {
    #[must_use]
    pub fn qualified(&self) -> bool {
        self.host.is_some() || self.url.is_some() || self.title.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Explanation {
    pub tokens: Vec<TokenBreakdown>,
    pub whole_query_bonus: f64,
    /// `None` when the candidate is excluded.
    pub total: Option<f64>,
    /// First token that qualified in no field group.
    pub rejected_by: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct FieldScorer {
    profile: ScoringProfile,
    aligner: Aligner,
}

impl FieldScorer {
    #[must_use]
    pub fn new(profile: ScoringProfile) -> Self {
        let aligner = profile.aligner();
        Self { profile, aligner }
    }

    #[must_use]
    pub const fn profile(&self) -> &ScoringProfile {
        &self.profile
    }

    /// Returns `None` when some token qualifies in no field group.
    #[must_use]
    pub fn score(&self, fields: &CandidateFields, query: &Query) -> Option<f64> {
        if query.is_empty() {
            return Some(0.0);
        }

        let mut total = 0.0;
        for token in query.tokens() {
            let breakdown = self.score_token(fields, token);
            if !breakdown.qualified() {
                return None;
            }
            total += breakdown.contribution;
        }
        Some(total + self.whole_query_bonus(fields, query))
    }

    /// Same computation as [`FieldScorer::score`], keeping the intermediate values.
    #[must_use]
    pub fn explain(&self, fields: &CandidateFields, query: &Query) -> Explanation {
        let tokens: Vec<TokenBreakdown> = query
            .tokens()
            .iter()
            .map(|token| self.score_token(fields, token))
            .collect();
        let rejected_by = tokens
            .iter()
            .find(|b| !b.qualified())
            .map(|b| b.token.clone());
        let whole_query_bonus = if query.is_empty() {
            0.0
        } else {
            self.whole_query_bonus(fields, query)
        };
        let total = rejected_by.is_none().then(|| {
            tokens.iter().map(|b| b.contribution).sum::<f64>() + whole_query_bonus
        });

        Explanation {
            tokens,
            whole_query_bonus,
            total,
            rejected_by,
        }
    }

    /// Offsets in `text` matched by every token that qualifies against it.
    #[must_use]
    pub fn highlight(&self, text: &str, query: &Query) -> MatchSpan {
        let mut positions = Vec::new();
        for token in query.tokens() {
            if let Some(alignment) = self.aligner.align_with_positions(text, token) {
                if self.qualifies(alignment.score, token) {
                    positions.extend(alignment.positions);
                }
            }
        }
        MatchSpan::from_positions(positions)
    }

    fn score_token(&self, fields: &CandidateFields, token: &str) -> TokenBreakdown {
        let host = [&fields.host.full, &fields.host.host, &fields.host.base]
            .into_iter()
            .filter_map(|text| self.aligner.align(text, token))
            .reduce(f64::max)
            .filter(|&s| self.qualifies(s, token));
        let url = self
            .aligner
            .align(&fields.url_no_proto, token)
            .filter(|&s| self.qualifies(s, token));
        let title = self
            .aligner
            .align(&fields.title, token)
            .filter(|&s| self.qualifies(s, token));

        let weights = self.profile.weights();
        let mut contribution = 0.0;
        if let Some(s) = host {
            contribution += self.profile.bonuses().domain_match + weights.host * s;
        }
        if let Some(s) = url {
            contribution += weights.url * s;
        }
        if let Some(s) = title {
            contribution += weights.title * s;
        }

        log::trace!(
            "token {token:?} host={host:?} url={url:?} title={title:?} -> {contribution:.2}"
        );

        TokenBreakdown {
            token: token.to_string(),
            host,
            url,
            title,
            contribution,
        }
    }

    fn whole_query_bonus(&self, fields: &CandidateFields, query: &Query) -> f64 {
        let whole = query.whole();
        let bonuses = self.profile.bonuses();
        let mut bonus = 0.0;
        if fields.host.full.contains(whole) {
            bonus += bonuses.whole_query_substring * bonuses.host_substring_multiplier;
        }
        if fields.url_no_proto.contains(whole) {
            bonus += bonuses.whole_query_substring;
        }
        if fields.title.contains(whole) {
            bonus += bonuses.whole_query_substring;
        }
        bonus
    }

    fn qualifies(&self, score: f64, token: &str) -> bool {
        self.profile.qualify().qualifies(score, token.chars().count())
    }
}
