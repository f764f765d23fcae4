use serde::Serialize;
use tabjump_protocol::{Highlights, ItemOutput, RankOutput, SectionOutput};
use tabjump_search::{
    Candidate, Explanation, FieldScorer, Presentation, Query, RankedEntry, TabLike,
};

const MARK_OPEN: &str = "[";
const MARK_CLOSE: &str = "]";

pub fn rank_output(presentation: &Presentation<'_>, query: &str, profile: &str) -> RankOutput {
    RankOutput {
        query: query.to_string(),
        profile: profile.to_string(),
        total: presentation.len(),
        sections: presentation
            .sections()
            .iter()
            .map(|group| SectionOutput {
                id: group.section.id().to_string(),
                title: group.section.title().to_string(),
                items: group.entries.iter().map(item_output).collect(),
            })
            .collect(),
    }
}

fn item_output(entry: &RankedEntry<'_>) -> ItemOutput {
    let (window_id, session_id) = match entry.candidate {
        Candidate::OpenTab(tab) => (Some(tab.window_id), None),
        Candidate::ClosedSession(session) => (None, Some(session.session_id.clone())),
    };
    ItemOutput {
        kind: entry.candidate.kind(),
        origin: entry.origin,
        score: entry.score,
        title: entry.title.clone(),
        url: entry.candidate.url().unwrap_or_default().to_string(),
        favicon: entry.candidate.favicon().map(str::to_string),
        tab_id: entry.candidate.tab_id(),
        window_id,
        session_id,
        highlights: Highlights {
            title: entry.title_span.ranges(),
            url: entry.url_span.ranges(),
        },
    }
}

pub fn render_text(presentation: &Presentation<'_>) -> String {
    if presentation.is_empty() {
        return "No matches\n".to_string();
    }

    let mut out = String::new();
    let mut position = 0usize;
    for group in presentation.sections() {
        out.push_str(group.section.title());
        out.push('\n');
        for entry in &group.entries {
            position += 1;
            let title = entry.title_span.mark(&entry.title, MARK_OPEN, MARK_CLOSE);
            out.push_str(&format!("{position:>3}. {title}"));
            if entry.score != 0.0 {
                out.push_str(&format!("  (score: {:.1})", entry.score));
            }
            out.push('\n');
            if let Some(url) = entry.candidate.url().filter(|u| !u.is_empty()) {
                let url = entry.url_span.mark(url, MARK_OPEN, MARK_CLOSE);
                out.push_str(&format!("     {url}\n"));
            }
        }
    }
    let noun = if position == 1 { "tab" } else { "tabs" };
    out.push_str(&format!("{position} {noun}\n"));
    out
}

#[derive(Debug, Serialize)]
pub struct ExplainItem {
    pub origin: usize,
    pub title: String,
    pub url: String,
    #[serde(flatten)]
    pub explanation: Explanation,
}

pub fn explain_items(scorer: &FieldScorer, candidates: &[Candidate], query: &str) -> Vec<ExplainItem> {
    let query = Query::parse(query);
    candidates
        .iter()
        .enumerate()
        .map(|(origin, candidate)| ExplainItem {
            origin,
            title: candidate.display_title(),
            url: candidate.url().unwrap_or_default().to_string(),
            explanation: scorer.explain(&candidate.fields(), &query),
        })
        .collect()
}
