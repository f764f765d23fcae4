//! Text normalization and the per-candidate fields the scorer matches against.

use url::Url;

/// Characters that start a new word or URL segment.
pub const BOUNDARY_CHARS: [char; 6] = [' ', '/', ':', '-', '_', '.'];

pub const UNTITLED: &str = "(untitled)";

#[must_use]
pub fn is_boundary(c: char) -> bool {
    BOUNDARY_CHARS.contains(&c)
}

/// Case-folds `text` one char at a time.
///
/// Each input char maps to exactly one output char, so offsets computed on the
/// normalized text index the original text as well.
#[must_use]
pub fn normalize(text: &str) -> String {
    text.chars()
        .map(|c| c.to_lowercase().next().unwrap_or(c))
        .collect()
}

#[must_use]
pub fn tokenize(query: &str) -> Vec<String> {
    normalize(query)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Strips a leading `http://` or `https://`, ignoring ASCII case.
#[must_use]
pub fn strip_protocol(url: &str) -> &str {
    for prefix in ["https://", "http://"] {
        if let Some(head) = url.get(..prefix.len()) {
            if head.eq_ignore_ascii_case(prefix) {
                return &url[prefix.len()..];
            }
        }
    }
    url
}

/// A normalized user query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    whole: String,
    tokens: Vec<String>,
}

impl Query {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        Self {
            whole: normalize(raw.trim()),
            tokens: tokenize(raw),
        }
    }

    /// True when the query has no tokens; every candidate matches with score 0.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// The untokenized query, used for whole-query substring bonuses.
    #[must_use]
    pub fn whole(&self) -> &str {
        &self.whole
    }
}

/// Hostname-derived fields. All empty when the URL does not parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostParts {
    pub host: String,
    /// Last two dot-separated labels, or the whole host when it has fewer.
    pub base: String,
    /// `"{host} {base}"`, trimmed.
    pub full: String,
}

impl HostParts {
    #[must_use]
    pub fn from_url(raw: &str) -> Self {
        let parsed = match Url::parse(raw) {
            Ok(parsed) => parsed,
            Err(err) => {
                if !raw.is_empty() {
                    log::debug!("Unparseable url {raw:?}: {err}");
                }
                return Self::default();
            }
        };

        let host = normalize(parsed.host_str().unwrap_or_default());
        let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();
        let base = if labels.len() >= 2 {
            labels[labels.len() - 2..].join(".")
        } else {
            host.clone()
        };
        let full = format!("{host} {base}").trim().to_string();

        Self { host, base, full }
    }
}

/// The normalized text fields of one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFields {
    pub title: String,
    pub url: String,
    pub url_no_proto: String,
    pub host: HostParts,
}

impl CandidateFields {
    #[must_use]
    pub fn new(title: Option<&str>, url: Option<&str>) -> Self {
        let url = url.unwrap_or_default();
        Self {
            title: normalize(&display_title(title, url)),
            url: normalize(url),
            url_no_proto: normalize(strip_protocol(url)),
            host: HostParts::from_url(url),
        }
    }
}

/// The line shown as a candidate's title: its title, else its URL, else a placeholder.
#[must_use]
pub fn display_title(title: Option<&str>, url: &str) -> String {
    match title.filter(|t| !t.is_empty()) {
        Some(title) => title.to_string(),
        None if !url.is_empty() => url.to_string(),
        None => UNTITLED.to_string(),
    }
}
